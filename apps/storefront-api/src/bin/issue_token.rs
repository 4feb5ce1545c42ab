//! # Development Token Issuer
//!
//! Prints a signed bearer token so the API can be exercised locally.
//! Uses the same `JWT_SECRET` / `JWT_LIFETIME_SECS` environment as the server.
//!
//! ## Usage
//! ```bash
//! cargo run -p storefront-api --bin issue-token -- --sub user-1 --username alice
//! cargo run -p storefront-api --bin issue-token -- --sub admin-1 --staff
//! ```

use std::env;

use storefront_api::{ApiConfig, JwtManager};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut sub: Option<String> = None;
    let mut username: Option<String> = None;
    let mut staff = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sub" | "-s" => {
                if i + 1 < args.len() {
                    sub = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--username" | "-u" => {
                if i + 1 < args.len() {
                    username = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--staff" => staff = true,
            "--help" | "-h" => {
                println!("Usage: issue-token --sub <ID> [--username <NAME>] [--staff]");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let sub = sub.ok_or_else(|| anyhow::anyhow!("--sub is required"))?;
    let username = username.unwrap_or_else(|| sub.clone());

    let config = ApiConfig::load()?;
    if config.uses_dev_secret() {
        eprintln!("warning: JWT_SECRET is not set, signing with the development secret");
    }

    let jwt = JwtManager::new(config.jwt_secret, config.jwt_lifetime_secs);
    let token = jwt
        .issue(&sub, &username, staff)
        .map_err(|e| anyhow::anyhow!(e.message))?;

    println!("{}", token);
    Ok(())
}

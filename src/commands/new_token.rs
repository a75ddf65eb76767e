use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::TokenKeys;
use crate::config::Config;

/// Mint a paste token and print it on stdout.
pub fn run(config: &Config) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        warn!("signing with the built-in secret, this token is only good for testing");
    }

    let keys = TokenKeys::new(&config.secret, &config.domain);
    info!("generating new token for issuer '{}'", keys.issuer());

    let token = keys.issue(Utc::now()).context("failed to sign token")?;
    println!("{token}");

    Ok(())
}

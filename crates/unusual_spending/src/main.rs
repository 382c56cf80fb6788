// Rust guideline compliant 2026-10-18

//! Unusual-spending notifier entry point.
//!
//! Wires the live calendar, payments API client and e-mail service, checks
//! one customer and exits. Configuration comes from `UNUSUAL_SPENDING_*`
//! environment variables on top of local-development defaults.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=debug UNUSUAL_SPENDING_CUSTOMER_ID=customer-42 cargo run
//! ```

mod config;

use anyhow::Context as _;
use application::{Application, Outcome};
use config::AppConfig;
use infrastructure::{Calendar, EmailService, PaymentsClient};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("failed to read configuration")?;
    tracing::debug!(?config, "main.config_loaded");

    let payments = PaymentsClient::create(config.payments).context("failed to build payments client")?;
    let app = Application::new(Calendar::create(), payments, EmailService::create(config.email));

    let outcome = app
        .trigger_unusual_spending_email(&config.customer_id)
        .await
        .with_context(|| format!("unusual spending check failed for customer {}", config.customer_id))?;

    tracing::info!(
        customer_id = %config.customer_id,
        notified = outcome == Outcome::Notified,
        "check successful"
    );
    Ok(())
}

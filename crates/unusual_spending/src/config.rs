// Rust guideline compliant 2026-10-18

//! Start-up configuration of the notifier binary.

use domain::CustomerId;
use infrastructure::email_service::CUSTOMER_MAIL_DOMAIN;
use infrastructure::smtp_client::validate_address;
use infrastructure::{EmailServiceConfig, PaymentsApiConfig, SmtpServerAddress};
use url::Url;

/// Default payments API location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";
/// Default SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "localhost";
/// Default SMTP port.
pub const DEFAULT_SMTP_PORT: u16 = 2525;
/// Default `From` address.
pub const DEFAULT_SENDER_ADDRESS: &str = "unusual-spending@my-bank.example.com";
/// Customer checked when none is configured.
pub const DEFAULT_CUSTOMER_ID: &str = "customer-123";

const ENV_CUSTOMER_ID: &str = "UNUSUAL_SPENDING_CUSTOMER_ID";
const ENV_BASE_URL: &str = "UNUSUAL_SPENDING_BASE_URL";
const ENV_SMTP_HOST: &str = "UNUSUAL_SPENDING_SMTP_HOST";
const ENV_SMTP_PORT: &str = "UNUSUAL_SPENDING_SMTP_PORT";
const ENV_SENDER_ADDRESS: &str = "UNUSUAL_SPENDING_SENDER_ADDRESS";

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors raised while assembling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A value is missing or malformed.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidConfig { reason: reason.into() }
}

// ---------------------------------------------------------------------------
// AppConfig + builder
// ---------------------------------------------------------------------------

/// Everything the binary needs to wire the live collaborators.
///
/// Construct via [`AppConfig::builder`] or [`AppConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Customer to check.
    pub customer_id: CustomerId,
    /// Payments API location.
    pub payments: PaymentsApiConfig,
    /// SMTP server and sender.
    pub email: EmailServiceConfig,
}

/// Builder for [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AppConfigBuilder {
    customer_id: String,
    base_url: String,
    smtp_host: String,
    smtp_port: u16,
    sender_address: String,
}

impl AppConfig {
    /// Create a builder for `customer_id` with all other values defaulted.
    #[must_use]
    pub fn builder(customer_id: impl Into<String>) -> AppConfigBuilder {
        AppConfigBuilder {
            customer_id: customer_id.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            smtp_host: DEFAULT_SMTP_HOST.to_owned(),
            smtp_port: DEFAULT_SMTP_PORT,
            sender_address: DEFAULT_SENDER_ADDRESS.to_owned(),
        }
    }

    /// Defaults overridden by the `UNUSUAL_SPENDING_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when a variable holds an
    /// invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when a variable holds an
    /// invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let customer_id = lookup(ENV_CUSTOMER_ID).unwrap_or_else(|| DEFAULT_CUSTOMER_ID.to_owned());
        let mut builder = Self::builder(customer_id);
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(base_url);
        }
        if let Some(host) = lookup(ENV_SMTP_HOST) {
            builder = builder.smtp_host(host);
        }
        if let Some(port) = lookup(ENV_SMTP_PORT) {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|error| invalid(format!("{ENV_SMTP_PORT}={port:?}: {error}")))?;
            builder = builder.smtp_port(port);
        }
        if let Some(sender) = lookup(ENV_SENDER_ADDRESS) {
            builder = builder.sender_address(sender);
        }
        builder.build()
    }
}

impl AppConfigBuilder {
    /// Override the payments API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the SMTP host.
    #[must_use]
    pub fn smtp_host(mut self, host: impl Into<String>) -> Self {
        self.smtp_host = host.into();
        self
    }

    /// Override the SMTP port.
    #[must_use]
    pub fn smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    /// Override the `From` address.
    #[must_use]
    pub fn sender_address(mut self, sender_address: impl Into<String>) -> Self {
        self.sender_address = sender_address.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] when the customer id does not
    /// form a plain mailbox under the customer mail domain (or is `.`/`..`),
    /// the base URL is not an absolute `http(s)` URL, the SMTP host is empty,
    /// the port is zero, or the sender is not a plain `local@domain` mailbox.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let customer_id = self.customer_id.trim();
        let mailbox = format!("{customer_id}@{CUSTOMER_MAIL_DOMAIN}");
        if matches!(customer_id, "." | "..") || validate_address(&mailbox).is_err() {
            return Err(invalid(format!(
                "customer id {customer_id:?} must be a non-empty mail local part without spaces, control characters or '<>@'"
            )));
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|error| invalid(format!("base url {:?}: {error}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("base url {base_url} must use http or https")));
        }

        let smtp_host = self.smtp_host.trim();
        if smtp_host.is_empty() {
            return Err(invalid("smtp host must not be empty"));
        }
        if self.smtp_port == 0 {
            return Err(invalid("smtp port must be >= 1"));
        }

        let sender_address = self.sender_address.trim();
        if validate_address(sender_address).is_err() {
            return Err(invalid(format!("sender address {sender_address:?} must look like local@domain")));
        }

        Ok(AppConfig {
            customer_id: CustomerId::new(customer_id),
            payments: PaymentsApiConfig { base_url },
            email: EmailServiceConfig {
                smtp_server: SmtpServerAddress::new(smtp_host, self.smtp_port),
                sender_address: sender_address.to_owned(),
            },
        })
    }
}

// Rust guideline compliant 2026-10-18

//! Mail transport collaborator.
//!
//! [`SmtpClient::send_email`] opens a connection, transmits one
//! single-recipient message and closes the connection, then publishes
//! [`SmtpEvent::MailSent`]. The live connector speaks SMTP over TCP (see
//! [`crate::smtp_tcp`]); [`NullConnector`] completes immediately and can be
//! told to fail.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use event_bus::{Event, EventBus};

use crate::smtp_tcp::TcpConnector;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Host and port of an SMTP server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SmtpServerAddress {
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl SmtpServerAddress {
    /// Create an address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for SmtpServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A plain-text message with exactly one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

/// Events published by [`SmtpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    /// The server accepted the message.
    MailSent {
        /// Server the message was handed to.
        server: SmtpServerAddress,
        /// The message as sent.
        email: Email,
    },
}

impl Event for SmtpEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::MailSent { .. } => "mail_sent",
        }
    }
}

/// Errors from the mail transport.
///
/// `Clone` so a stand-in can return the same configured error on every send.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SmtpError {
    /// Socket-level failure (connection refused, reset, DNS).
    #[error("smtp connection error: {0}")]
    Io(#[source] Arc<io::Error>),
    /// The server answered a command with an unexpected reply code.
    #[error("smtp server rejected {command}: {code} {message}")]
    Rejected {
        /// Command verb that was rejected (e.g. `RCPT`).
        command: String,
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },
    /// An envelope address would not fit in a single `MAIL`/`RCPT` command.
    #[error("invalid mail address {address:?}")]
    InvalidAddress {
        /// Offending address.
        address: String,
    },
    /// The server sent something that is not an SMTP reply.
    #[error("malformed smtp reply: {line:?}")]
    MalformedReply {
        /// Offending line.
        line: String,
    },
    /// A protocol step did not finish in time.
    #[error("smtp {step} timed out after {timeout:?}")]
    Timeout {
        /// Step that timed out (`connect`, `send`).
        step: &'static str,
        /// Configured limit.
        timeout: Duration,
    },
}

/// Check that `address` is a plain ASCII `local@domain` mailbox.
///
/// Whitespace, control characters and angle brackets are rejected so the
/// address cannot escape its `<...>` in the SMTP envelope.
///
/// # Errors
///
/// Returns [`SmtpError::InvalidAddress`].
pub fn validate_address(address: &str) -> Result<(), SmtpError> {
    let well_formed = address
        .bytes()
        .all(|b| b.is_ascii_graphic() && b != b'<' && b != b'>')
        && matches!(
            address.split_once('@'),
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        );
    if well_formed {
        Ok(())
    } else {
        Err(SmtpError::InvalidAddress { address: address.to_owned() })
    }
}

impl From<io::Error> for SmtpError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

// ---------------------------------------------------------------------------
// Connection seam
// ---------------------------------------------------------------------------

/// Opens connections to an SMTP server.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Connector {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Open a connection to `server`, ready to accept a message.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpError`] when the server cannot be reached or greets badly.
    async fn connect(&self, server: &SmtpServerAddress) -> Result<Self::Connection, SmtpError>;
}

/// An open connection to an SMTP server.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait Connection {
    /// Transmit `email`.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpError`] when the server refuses the message.
    async fn send(&mut self, email: &Email) -> Result<(), SmtpError>;

    /// Release the connection. Best effort: failures are logged, not returned.
    async fn close(self);
}

/// Stand-in configuration for [`NullConnector`].
#[derive(Debug, Clone, Default)]
pub struct NullSmtpConfig {
    /// When set, every send fails with exactly this error.
    pub error_on_send: Option<SmtpError>,
}

impl NullSmtpConfig {
    /// Sends succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends fail with `error`.
    #[must_use]
    pub fn error_on_send(error: SmtpError) -> Self {
        Self { error_on_send: Some(error) }
    }
}

/// Stand-in connector: no socket, immediate completion.
#[derive(Debug, Clone, Default)]
pub struct NullConnector {
    config: NullSmtpConfig,
}

/// Connection produced by [`NullConnector`].
#[derive(Debug)]
pub struct NullConnection {
    error_on_send: Option<SmtpError>,
}

impl Connector for NullConnector {
    type Connection = NullConnection;

    async fn connect(&self, _server: &SmtpServerAddress) -> Result<NullConnection, SmtpError> {
        Ok(NullConnection { error_on_send: self.config.error_on_send.clone() })
    }
}

impl Connection for NullConnection {
    async fn send(&mut self, _email: &Email) -> Result<(), SmtpError> {
        match &self.error_on_send {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn close(self) {}
}

// ---------------------------------------------------------------------------
// SmtpClient
// ---------------------------------------------------------------------------

/// Sends single messages over SMTP and announces each accepted message.
///
/// Build with [`SmtpClient::create`] (real SMTP) or [`SmtpClient::create_null`].
#[derive(Debug)]
pub struct SmtpClient<C = TcpConnector> {
    connector: C,
    events: EventBus<SmtpEvent>,
}

impl SmtpClient<TcpConnector> {
    /// Live client speaking SMTP over TCP.
    #[must_use]
    pub fn create() -> Self {
        Self::new(TcpConnector::new())
    }
}

impl SmtpClient<NullConnector> {
    /// Stand-in client; see [`NullSmtpConfig`].
    #[must_use]
    pub fn create_null(config: NullSmtpConfig) -> Self {
        Self::new(NullConnector { config })
    }
}

impl<C: Connector> SmtpClient<C> {
    /// Wrap an arbitrary connector.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self { connector, events: EventBus::new() }
    }

    /// Event stream of this client.
    #[must_use]
    pub fn events(&self) -> &EventBus<SmtpEvent> {
        &self.events
    }

    /// Connect to `server`, transmit `email`, close.
    ///
    /// The connection is closed whether or not the transmission succeeded.
    /// [`SmtpEvent::MailSent`] is published only after a successful
    /// transmission.
    ///
    /// # Errors
    ///
    /// Returns [`SmtpError::InvalidAddress`] before connecting when either
    /// address is unusable, otherwise the connect or send [`SmtpError`]
    /// unchanged.
    pub async fn send_email(&self, server: &SmtpServerAddress, email: &Email) -> Result<(), SmtpError> {
        validate_address(&email.from)?;
        validate_address(&email.to)?;
        let mut connection = self.connector.connect(server).await?;
        let sent = connection.send(email).await;
        connection.close().await;
        sent?;

        tracing::info!(server = %server, to = %email.to, "smtp_client.mail_sent");
        self.events.publish(&SmtpEvent::MailSent {
            server: server.clone(),
            email: email.clone(),
        });
        Ok(())
    }
}

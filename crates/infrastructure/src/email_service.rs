// Rust guideline compliant 2026-10-18

//! Customer notification collaborator.
//!
//! [`EmailService`] implements `domain::CustomerNotifier` by mailing the
//! customer at `{customer_id}@customer.my-bank.com` through an
//! [`SmtpClient`], then publishing [`NotificationEvent::CustomerNotified`].

use domain::{CustomerId, CustomerNotifier};
use event_bus::{Event, EventBus};

use crate::smtp_client::{
    Connector, Email, NullConnector, NullSmtpConfig, SmtpClient, SmtpError, SmtpEvent,
    SmtpServerAddress,
};
use crate::smtp_tcp::TcpConnector;

/// Mail domain under which every customer has a mailbox.
pub const CUSTOMER_MAIL_DOMAIN: &str = "customer.my-bank.com";

const NULL_SMTP_HOST: &str = "null-smtp.example.org";
const NULL_SMTP_PORT: u16 = 1;
const NULL_SENDER_ADDRESS: &str = "null-sender@example.org";

/// Where notifications are sent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailServiceConfig {
    /// SMTP server accepting the messages.
    pub smtp_server: SmtpServerAddress,
    /// `From` address of every notification.
    pub sender_address: String,
}

/// Events published by [`EmailService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A customer was notified.
    CustomerNotified {
        /// Recipient customer.
        customer_id: CustomerId,
        /// Subject line sent.
        subject: String,
        /// Body sent.
        body: String,
    },
}

impl Event for NotificationEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::CustomerNotified { .. } => "customer_notified",
        }
    }
}

/// Mails customers through SMTP.
#[derive(Debug)]
pub struct EmailService<C = TcpConnector> {
    config: EmailServiceConfig,
    smtp: SmtpClient<C>,
    events: EventBus<NotificationEvent>,
}

impl EmailService<TcpConnector> {
    /// Live service talking to `config.smtp_server`.
    #[must_use]
    pub fn create(config: EmailServiceConfig) -> Self {
        Self::new(config, SmtpClient::create())
    }
}

impl EmailService<NullConnector> {
    /// Stand-in service whose sends always succeed.
    #[must_use]
    pub fn create_null() -> Self {
        Self::create_null_with(NullSmtpConfig::new())
    }

    /// Stand-in service backed by an SMTP stand-in configured with `smtp`.
    #[must_use]
    pub fn create_null_with(smtp: NullSmtpConfig) -> Self {
        let config = EmailServiceConfig {
            smtp_server: SmtpServerAddress::new(NULL_SMTP_HOST, NULL_SMTP_PORT),
            sender_address: NULL_SENDER_ADDRESS.to_owned(),
        };
        Self::new(config, SmtpClient::create_null(smtp))
    }
}

impl<C: Connector> EmailService<C> {
    /// Combine a configuration with an SMTP client.
    #[must_use]
    pub fn new(config: EmailServiceConfig, smtp: SmtpClient<C>) -> Self {
        Self { config, smtp, events: EventBus::new() }
    }

    /// Notifications sent by this service.
    #[must_use]
    pub fn events(&self) -> &EventBus<NotificationEvent> {
        &self.events
    }

    /// Messages handed to the SMTP server.
    #[must_use]
    pub fn smtp_events(&self) -> &EventBus<SmtpEvent> {
        self.smtp.events()
    }
}

impl<C: Connector> CustomerNotifier for EmailService<C> {
    type Error = SmtpError;

    async fn notify_customer(
        &self,
        customer_id: &CustomerId,
        subject: &str,
        body: &str,
    ) -> Result<(), SmtpError> {
        let email = Email {
            from: self.config.sender_address.clone(),
            to: customer_address(customer_id),
            subject: subject.to_owned(),
            text: body.to_owned(),
        };
        self.smtp.send_email(&self.config.smtp_server, &email).await?;

        tracing::info!(%customer_id, "email_service.customer_notified");
        self.events.publish(&NotificationEvent::CustomerNotified {
            customer_id: customer_id.clone(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

fn customer_address(customer_id: &CustomerId) -> String {
    format!("{customer_id}@{CUSTOMER_MAIL_DOMAIN}")
}

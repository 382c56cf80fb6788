// Rust guideline compliant 2026-10-18

//! Adapters for the domain ports.
//!
//! Every collaborator comes in two flavours built from the same type:
//! `create(..)` talks to the outside world, `create_null(..)` answers from
//! configuration without any I/O. Both publish the same events, so tests
//! written against the stand-in observe exactly what production would do.
//!
//! | Collaborator       | Port               | Events                |
//! |--------------------|--------------------|-----------------------|
//! | [`Calendar`]       | `Clock`            | none                  |
//! | [`HttpClient`]     | -                  | [`HttpEvent`]         |
//! | [`SmtpClient`]     | -                  | [`SmtpEvent`]         |
//! | [`PaymentsClient`] | `PaymentsApi`      | [`HttpEvent`]         |
//! | [`EmailService`]   | `CustomerNotifier` | [`NotificationEvent`] |

pub mod calendar;
pub mod email_service;
pub mod http_client;
pub mod payments_api;
pub mod smtp_client;
pub mod smtp_tcp;

pub use calendar::Calendar;
pub use email_service::{EmailService, EmailServiceConfig, NotificationEvent};
pub use http_client::{
    HttpClient, HttpError, HttpEvent, HttpRequest, HttpResponse, NullHttpConfig, NullResponse,
};
pub use payments_api::{PaymentsApiConfig, PaymentsApiError, PaymentsClient, PaymentsFixture};
pub use smtp_client::{Email, NullSmtpConfig, SmtpClient, SmtpError, SmtpEvent, SmtpServerAddress};
pub use smtp_tcp::TcpConnector;

// Rust guideline compliant 2026-10-18

//! Payments lookup collaborator.
//!
//! [`PaymentsClient`] implements the `domain::PaymentsApi` port on top of
//! [`HttpClient`]: it appends the canonical
//! `payments-by-month/{customer}/{YYYY}-{MM}` segments to the base URL, sends
//! a `GET` and validates the JSON body. The customer id is percent-encoded as
//! a single segment. The stand-in re-expresses payment fixtures as
//! canned HTTP responses, so parsing and validation run in both modes.

use domain::{CustomerId, DomainError, MonthInYear, Payment, PaymentsApi};
use event_bus::EventBus;
use url::Url;

use crate::http_client::{
    Fetch, HttpClient, HttpError, HttpEvent, HttpRequest, NullFetch, NullHttpConfig, NullResponse,
    ReqwestFetch,
};

/// First path segment of the payments endpoint.
pub const PAYMENTS_PATH: &str = "payments-by-month";

const NULL_BASE_URL: &str = "https://example.com/";

/// Where the payments API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentsApiConfig {
    /// Base URL; the endpoint segments are appended to its path. Query and
    /// fragment are dropped.
    pub base_url: Url,
}

/// Payments the stand-in returns for one customer and month.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentsFixture {
    /// Customer the payments belong to.
    pub customer_id: CustomerId,
    /// Billing period.
    pub month_in_year: MonthInYear,
    /// Payments returned for that key.
    pub payments: Vec<Payment>,
}

/// Why a response body was not a valid payment list.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Body is not JSON or does not have the payment-list shape.
    #[error("body is not a payment list: {0}")]
    Json(#[from] serde_json::Error),
    /// An element has the right shape but breaks a payment invariant.
    #[error("payment #{index} is invalid: {source}")]
    InvalidPayment {
        /// Position in the returned array.
        index: usize,
        /// Violated invariant.
        #[source]
        source: DomainError,
    },
}

/// Errors from the payments lookup.
#[derive(Debug, thiserror::Error)]
pub enum PaymentsApiError {
    /// HTTP transport failure, passed through unchanged.
    #[error(transparent)]
    Transport(#[from] HttpError),
    /// The server answered with something that is not a valid payment list.
    #[error("failed to fetch payments for customer \"{customer_id}\": invalid response from server")]
    InvalidResponse {
        /// Customer whose payments were requested.
        customer_id: CustomerId,
        /// Parse or validation failure.
        #[source]
        source: ResponseError,
    },
    /// No payments URL can be built for this customer below the base URL.
    #[error("cannot build payments url below {base_url} for customer \"{customer_id}\": {reason}")]
    InvalidUrl {
        /// Configured base URL.
        base_url: Url,
        /// Customer whose payments were requested.
        customer_id: CustomerId,
        /// What is wrong.
        reason: &'static str,
    },
}

/// `PaymentsApi` adapter over an [`HttpClient`].
#[derive(Debug)]
pub struct PaymentsClient<F = ReqwestFetch> {
    config: PaymentsApiConfig,
    http: HttpClient<F>,
}

impl PaymentsClient<ReqwestFetch> {
    /// Live client talking to `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when the HTTP client cannot be initialised.
    pub fn create(config: PaymentsApiConfig) -> Result<Self, HttpError> {
        Ok(Self::new(config, HttpClient::create()?))
    }
}

impl PaymentsClient<NullFetch> {
    /// Stand-in client returning `fixtures`; any other customer or month
    /// yields an empty list.
    #[must_use]
    pub fn create_null(fixtures: Vec<PaymentsFixture>) -> Self {
        let base_url = null_base_url();
        let mut http_config = NullHttpConfig::new()
            .default_response(NullResponse::new().status(200).body("[]"));
        for fixture in fixtures {
            let url = match payments_url(&base_url, &fixture.customer_id, fixture.month_in_year) {
                Ok(url) => url,
                Err(error) => {
                    tracing::warn!(%error, "payments_api.fixture_skipped");
                    continue;
                }
            };
            let body = serde_json::Value::from(
                fixture.payments.iter().map(payment_json).collect::<Vec<_>>(),
            );
            http_config =
                http_config.respond(url.path(), NullResponse::new().status(200).body(body.to_string()));
        }

        let config = PaymentsApiConfig { base_url };
        Self::new(config, HttpClient::create_null(http_config))
    }
}

impl<F: Fetch> PaymentsClient<F> {
    /// Combine a configuration with an HTTP client.
    #[must_use]
    pub fn new(config: PaymentsApiConfig, http: HttpClient<F>) -> Self {
        Self { config, http }
    }

    /// Events of the underlying HTTP client.
    #[must_use]
    pub fn events(&self) -> &EventBus<HttpEvent> {
        self.http.events()
    }
}

impl<F: Fetch> PaymentsApi for PaymentsClient<F> {
    type Error = PaymentsApiError;

    /// `GET` the month's payments and validate them. Status codes are not
    /// interpreted; only the body shape counts.
    async fn fetch_payments_for_month(
        &self,
        customer_id: &CustomerId,
        month_in_year: MonthInYear,
    ) -> Result<Vec<Payment>, PaymentsApiError> {
        let url = payments_url(&self.config.base_url, customer_id, month_in_year)?;
        let response = self.http.send_request(HttpRequest::get(url)).await?;
        let payments = parse_payments(&response.body).map_err(|source| {
            tracing::warn!(%customer_id, status = response.status, %source, "payments_api.invalid_response");
            PaymentsApiError::InvalidResponse { customer_id: customer_id.clone(), source }
        })?;
        tracing::debug!(
            %customer_id,
            month = %month_in_year,
            count = payments.len(),
            "payments_api.fetched"
        );
        Ok(payments)
    }
}

/// `{base_url}/payments-by-month/{customer_id}/{YYYY}-{MM}`, one path
/// segment per component.
fn payments_url(
    base_url: &Url,
    customer_id: &CustomerId,
    month_in_year: MonthInYear,
) -> Result<Url, PaymentsApiError> {
    let invalid = |reason: &'static str| PaymentsApiError::InvalidUrl {
        base_url: base_url.clone(),
        customer_id: customer_id.clone(),
        reason,
    };
    // `.` and `..` would be dropped as segments instead of being encoded.
    if matches!(customer_id.as_str(), "" | "." | "..") {
        return Err(invalid("customer id is not a usable path segment"));
    }

    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| invalid("base url cannot have path segments"))?
        .pop_if_empty()
        .push(PAYMENTS_PATH)
        .push(customer_id.as_str())
        .push(&month_in_year.to_string());
    Ok(url)
}

fn parse_payments(body: &str) -> Result<Vec<Payment>, ResponseError> {
    let payments: Vec<Payment> = serde_json::from_str(body)?;
    for (index, payment) in payments.iter().enumerate() {
        payment.validate().map_err(|source| ResponseError::InvalidPayment { index, source })?;
    }
    Ok(payments)
}

fn payment_json(payment: &Payment) -> serde_json::Value {
    serde_json::json!({
        "price": payment.price,
        "category": payment.category,
        "description": payment.description,
    })
}

fn null_base_url() -> Url {
    // A constant, well-formed URL; parsing cannot fail.
    Url::parse(NULL_BASE_URL).unwrap_or_else(|error| unreachable!("{NULL_BASE_URL}: {error}"))
}

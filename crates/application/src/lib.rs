// Rust guideline compliant 2026-10-18

//! Unusual-spending check for one customer.
//!
//! [`Application`] reads the billing period from a `Clock`, fetches the
//! current and previous month's payments from a `PaymentsApi`, and mails the
//! customer through a `CustomerNotifier` when any category grew by 50 % or
//! more. It depends only on the domain ports; wiring happens in the binary
//! and in tests.

use domain::{
    Clock, CustomerId, CustomerNotifier, PaymentsApi, detect_unusual_spending,
    render_email_message,
};

// ---------------------------------------------------------------------------
// Outcome / ApplicationError
// ---------------------------------------------------------------------------

/// Result of one successful check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing qualified; no message was sent.
    NoUnusualSpending,
    /// The customer was notified.
    Notified,
}

/// Failure of a check, carrying the collaborator's own error unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError<P, N> {
    /// Fetching payments failed.
    #[error(transparent)]
    Payments(P),
    /// Sending the notification failed.
    #[error(transparent)]
    Notification(N),
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Orchestrates clock, payments lookup and notification.
///
/// Generic over the three ports for static dispatch; holds no concrete
/// adapter type.
#[derive(Debug)]
pub struct Application<C, P, N> {
    clock: C,
    payments: P,
    notifier: N,
}

impl<C, P, N> Application<C, P, N>
where
    C: Clock,
    P: PaymentsApi,
    N: CustomerNotifier,
{
    /// Wire the three collaborators.
    #[must_use]
    pub fn new(clock: C, payments: P, notifier: N) -> Self {
        Self { clock, payments, notifier }
    }

    /// The clock collaborator.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The payments collaborator.
    #[must_use]
    pub fn payments(&self) -> &P {
        &self.payments
    }

    /// The notification collaborator.
    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Check `customer_id` and notify them if their spending jumped.
    ///
    /// Payments are fetched sequentially, current month first. At most one
    /// notification is sent. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::Payments`] when either lookup fails (no
    /// message is sent) and [`ApplicationError::Notification`] when the
    /// message cannot be delivered.
    pub async fn trigger_unusual_spending_email(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Outcome, ApplicationError<P::Error, N::Error>> {
        let current_month = self.clock.current_month_year();
        let previous_month = self.clock.previous_month_year();
        tracing::debug!(
            %customer_id,
            current = %current_month,
            previous = %previous_month,
            "application.check_started"
        );

        let current = self
            .payments
            .fetch_payments_for_month(customer_id, current_month)
            .await
            .map_err(ApplicationError::Payments)?;
        let previous = self
            .payments
            .fetch_payments_for_month(customer_id, previous_month)
            .await
            .map_err(ApplicationError::Payments)?;

        let Some(unusual) = detect_unusual_spending(&previous, &current) else {
            tracing::info!(%customer_id, month = %current_month, "application.no_unusual_spending");
            return Ok(Outcome::NoUnusualSpending);
        };

        let message = render_email_message(current_month, &unusual);
        self.notifier
            .notify_customer(customer_id, &message.subject, &message.body)
            .await
            .map_err(ApplicationError::Notification)?;

        tracing::info!(
            %customer_id,
            month = %current_month,
            categories = unusual.len(),
            "application.notified"
        );
        Ok(Outcome::Notified)
    }
}

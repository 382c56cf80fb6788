// Rust guideline compliant 2026-10-18

//! Shared domain types for the unusual-spending notifier.
//!
//! Defines the billing-period and payment types, the pure spending
//! computation (`group_by_category`, `detect_unusual_spending`,
//! `render_email_message`) and the hexagonal port traits `Clock`,
//! `PaymentsApi` and `CustomerNotifier`. All other crates depend on this one;
//! it performs no I/O.

use std::fmt;

use chrono::{Datelike as _, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Growth factor at or above which a category's spending is unusual.
pub const UNUSUAL_SPENDING_FACTOR: f64 = 1.5;

// ---------------------------------------------------------------------------
// DomainError
// ---------------------------------------------------------------------------

/// Errors raised by domain constructors and validators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Month outside `[1, 12]`.
    #[error("invalid month {month}: expected a value in 1..=12")]
    InvalidMonth {
        /// The rejected month value.
        month: u32,
    },
    /// An unusual-spending result was built from zero categories.
    #[error("cannot create unusual spending from an empty set of categories")]
    EmptyUnusualSpending,
    /// Payment price is zero, negative or not a number.
    #[error("payment price must be positive, got {price}")]
    NonPositivePrice {
        /// The rejected price.
        price: f64,
    },
    /// Payment category is the empty string.
    #[error("payment category must not be empty")]
    EmptyCategory,
}

// ---------------------------------------------------------------------------
// Identifiers and periods
// ---------------------------------------------------------------------------

/// Opaque customer identifier, as used by the payments API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomerId(String);

impl CustomerId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A billing period: calendar month (1-based) within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthInYear {
    month: u32,
    year: i32,
}

impl MonthInYear {
    /// January 1970.
    pub const EPOCH: Self = Self { month: 1, year: 1970 };

    /// Create a period.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMonth`] when `month` is not in `1..=12`.
    pub fn new(month: u32, year: i32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth { month });
        }
        Ok(Self { month, year })
    }

    /// Month number, `1..=12`.
    #[must_use]
    pub fn month(self) -> u32 {
        self.month
    }

    /// Four-digit year.
    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    /// The period immediately before this one. January wraps to December of
    /// the previous year.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month > 1 {
            Self { month: self.month - 1, year: self.year }
        } else {
            Self { month: 12, year: self.year - 1 }
        }
    }
}

impl From<NaiveDate> for MonthInYear {
    fn from(date: NaiveDate) -> Self {
        Self { month: date.month(), year: date.year() }
    }
}

/// Formats as `YYYY-MM` with a zero-padded month.
impl fmt::Display for MonthInYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// A single card payment as reported by the payments API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Amount paid, strictly positive.
    pub price: f64,
    /// Spending category, non-empty (e.g. `"electronics"`).
    pub category: String,
    /// Free-form description.
    pub description: String,
}

impl Payment {
    /// Check the payment invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NonPositivePrice`] or
    /// [`DomainError::EmptyCategory`].
    pub fn validate(&self) -> Result<(), DomainError> {
        // Written so that NaN is rejected as well.
        if !(self.price > 0.0) {
            return Err(DomainError::NonPositivePrice { price: self.price });
        }
        if self.category.is_empty() {
            return Err(DomainError::EmptyCategory);
        }
        Ok(())
    }
}

/// Total spending per category, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorySpending(IndexMap<String, f64>);

impl CategorySpending {
    /// Total for `category`; 0 when the category never appeared.
    #[must_use]
    pub fn get(&self, category: &str) -> f64 {
        self.0.get(category).copied().unwrap_or(0.0)
    }

    /// Iterate `(category, total)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(category, total)| (category.as_str(), *total))
    }

    /// Number of distinct categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when no payment was grouped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Current and previous spending of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingChange {
    /// Total spent in the current period.
    pub spending: f64,
    /// Total spent in the previous period (0 if nothing was spent).
    pub before: f64,
}

/// Categories whose spending grew by at least 50 %.
///
/// Never empty: "no unusual spending" is represented by `None` from
/// [`detect_unusual_spending`], not by an empty value.
#[derive(Debug, Clone, PartialEq)]
pub struct UnusualSpending(IndexMap<String, SpendingChange>);

impl UnusualSpending {
    /// Build from explicit entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyUnusualSpending`] when `entries` is empty.
    pub fn try_from_entries<I, S>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, SpendingChange)>,
        S: Into<String>,
    {
        let map: IndexMap<String, SpendingChange> =
            entries.into_iter().map(|(category, change)| (category.into(), change)).collect();
        if map.is_empty() {
            return Err(DomainError::EmptyUnusualSpending);
        }
        Ok(Self(map))
    }

    /// Change recorded for `category`, if it was unusual.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&SpendingChange> {
        self.0.get(category)
    }

    /// Iterate `(category, change)` pairs in detection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpendingChange)> {
        self.0.iter().map(|(category, change)| (category.as_str(), change))
    }

    /// Number of unusual categories, always at least 1.
    #[expect(
        clippy::len_without_is_empty,
        reason = "never empty by construction; absence is `None`"
    )]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sum of the current-period spending over all unusual categories.
    #[must_use]
    pub fn total_spending(&self) -> f64 {
        self.0.values().map(|change| change.spending).sum()
    }
}

/// Subject and plain-text body of a customer notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Mail subject line.
    pub subject: String,
    /// Plain-text body, lines joined with `\n`.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Pure computation
// ---------------------------------------------------------------------------

/// Sum payment prices per category.
#[must_use]
pub fn group_by_category(payments: &[Payment]) -> CategorySpending {
    let mut totals: IndexMap<String, f64> = IndexMap::new();
    for payment in payments {
        *totals.entry(payment.category.clone()).or_insert(0.0) += payment.price;
    }
    CategorySpending(totals)
}

/// `true` when `spending` is at least [`UNUSUAL_SPENDING_FACTOR`] times `before`.
#[must_use]
pub fn is_unusual(spending: f64, before: f64) -> bool {
    spending >= before * UNUSUAL_SPENDING_FACTOR
}

/// Compare two months of payments and keep the categories that grew by 50 % or more.
///
/// Only categories present in `current` are examined; a category with no
/// previous spending always qualifies. Returns `None` when nothing qualifies.
#[must_use]
pub fn detect_unusual_spending(previous: &[Payment], current: &[Payment]) -> Option<UnusualSpending> {
    let before = group_by_category(previous);
    let now = group_by_category(current);

    let unusual: IndexMap<String, SpendingChange> = now
        .iter()
        .map(|(category, spending)| {
            (category, SpendingChange { spending, before: before.get(category) })
        })
        .filter(|(_, change)| is_unusual(change.spending, change.before))
        .map(|(category, change)| (category.to_owned(), change))
        .collect();

    (!unusual.is_empty()).then_some(UnusualSpending(unusual))
}

/// Render the notification sent to a customer for `month_in_year`.
///
/// Amounts are printed with two decimals.
#[must_use]
pub fn render_email_message(month_in_year: MonthInYear, unusual: &UnusualSpending) -> EmailMessage {
    debug_assert!(!unusual.0.is_empty(), "unusual spending is never empty");

    let subject = format!("Unusual spending of {} detected!", format_amount(unusual.total_spending()));

    let mut lines = vec![
        "Hello card user!".to_owned(),
        String::new(),
        format!(
            "We have detected unusually high spending on your card in these categories in {month_in_year}:"
        ),
        String::new(),
    ];
    lines.extend(unusual.iter().map(|(category, change)| {
        format!("* You spent {} on {category}", format_amount(change.spending))
    }));
    lines.extend(
        ["", "Love,", "", "The Credit Card Company"].into_iter().map(str::to_owned),
    );

    EmailMessage { subject, body: lines.join("\n") }
}

fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: source of the current billing period.
pub trait Clock {
    /// The month containing "today".
    fn current_month_year(&self) -> MonthInYear;

    /// The month before [`current_month_year`](Self::current_month_year).
    fn previous_month_year(&self) -> MonthInYear {
        self.current_month_year().previous()
    }
}

/// Hexagonal port: lookup of a customer's payments for one month.
///
/// The orchestrator depends exclusively on this trait -- never on the HTTP
/// adapter.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait PaymentsApi {
    /// Error surfaced by the adapter (transport or schema failure).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch all payments of `customer_id` in `month_in_year`.
    ///
    /// # Errors
    ///
    /// Returns the adapter error when the lookup fails; never retried here.
    async fn fetch_payments_for_month(
        &self,
        customer_id: &CustomerId,
        month_in_year: MonthInYear,
    ) -> Result<Vec<Payment>, Self::Error>;
}

/// Hexagonal port: delivery of a notification to a customer.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait CustomerNotifier {
    /// Error surfaced by the underlying transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `subject` and `body` to the customer.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged when delivery fails.
    async fn notify_customer(
        &self,
        customer_id: &CustomerId,
        subject: &str,
        body: &str,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(price: f64, category: &str) -> Payment {
        Payment {
            price,
            category: category.to_owned(),
            description: "irrelevant".to_owned(),
        }
    }

    fn month(month: u32, year: i32) -> MonthInYear {
        MonthInYear::new(month, year).unwrap()
    }

    // ------------------------------------------------------------------
    // MonthInYear
    // ------------------------------------------------------------------

    #[test]
    fn month_in_year_rejects_out_of_range() {
        assert_eq!(MonthInYear::new(0, 2024), Err(DomainError::InvalidMonth { month: 0 }));
        assert_eq!(MonthInYear::new(13, 2024), Err(DomainError::InvalidMonth { month: 13 }));
        assert!(MonthInYear::new(12, 2024).is_ok());
    }

    #[test]
    fn previous_month_same_year() {
        assert_eq!(month(6, 2024).previous(), month(5, 2024));
    }

    #[test]
    fn previous_month_wraps_year() {
        assert_eq!(month(1, 2024).previous(), month(12, 2023));
    }

    #[test]
    fn month_in_year_from_date() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        assert_eq!(MonthInYear::from(date), month(6, 2024));
    }

    #[test]
    fn month_in_year_display_is_zero_padded() {
        assert_eq!(month(3, 2024).to_string(), "2024-03");
        assert_eq!(month(11, 2024).to_string(), "2024-11");
    }

    // ------------------------------------------------------------------
    // Payment validation
    // ------------------------------------------------------------------

    #[test]
    fn payment_validation() {
        assert!(payment(0.01, "home").validate().is_ok());
        assert_eq!(
            payment(0.0, "home").validate(),
            Err(DomainError::NonPositivePrice { price: 0.0 })
        );
        assert!(matches!(
            payment(f64::NAN, "home").validate(),
            Err(DomainError::NonPositivePrice { .. })
        ));
        assert_eq!(payment(1.0, "").validate(), Err(DomainError::EmptyCategory));
    }

    // ------------------------------------------------------------------
    // group_by_category
    // ------------------------------------------------------------------

    #[test]
    fn group_empty_is_empty() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn group_sums_per_category_in_first_seen_order() {
        let grouped = group_by_category(&[
            payment(10.0, "home"),
            payment(2.5, "beauty"),
            payment(5.0, "home"),
        ]);
        let pairs: Vec<(&str, f64)> = grouped.iter().collect();
        assert_eq!(pairs, vec![("home", 15.0), ("beauty", 2.5)]);
        assert!(grouped.get("travel").abs() < f64::EPSILON, "absent category reads as 0");
    }

    #[test]
    fn group_preserves_total() {
        let payments = [
            payment(99.99, "electronics"),
            payment(149.99, "electronics"),
            payment(29.99, "home"),
            payment(150.99, "clothing"),
        ];
        let grouped_total: f64 = group_by_category(&payments).iter().map(|(_, t)| t).sum();
        let price_total: f64 = payments.iter().map(|p| p.price).sum();
        assert!((grouped_total - price_total).abs() < 1e-9);
    }

    // ------------------------------------------------------------------
    // is_unusual / detect_unusual_spending
    // ------------------------------------------------------------------

    #[test]
    fn unusual_boundary_is_inclusive() {
        assert!(is_unusual(150.0, 100.0));
        let just_below = f64::from_bits(150.0_f64.to_bits() - 1);
        assert!(!is_unusual(just_below, 100.0));
    }

    #[test]
    fn zero_before_always_qualifies() {
        assert!(is_unusual(0.01, 0.0));
    }

    #[test]
    fn detect_reports_new_category() {
        let detected = detect_unusual_spending(&[], &[payment(1.0, "groceries")]).unwrap();
        assert_eq!(detected.len(), 1);
        assert_eq!(
            detected.get("groceries"),
            Some(&SpendingChange { spending: 1.0, before: 0.0 })
        );
    }

    #[test]
    fn detect_ignores_categories_missing_from_current_month() {
        let detected = detect_unusual_spending(
            &[payment(100.0, "clothing")],
            &[payment(10.0, "home")],
        )
        .unwrap();
        assert!(detected.get("clothing").is_none());
        assert!(detected.get("home").is_some());
    }

    #[test]
    fn detect_returns_none_when_nothing_grew() {
        let previous = [
            payment(99.99, "electronics"),
            payment(149.99, "electronics"),
            payment(29.99, "home"),
            payment(150.99, "clothing"),
        ];
        let current = [
            payment(70.89, "electronics"),
            payment(39.99, "home"),
            payment(200.49, "clothing"),
        ];
        assert_eq!(detect_unusual_spending(&previous, &current), None);
    }

    #[test]
    fn detect_returns_none_for_two_empty_months() {
        assert_eq!(detect_unusual_spending(&[], &[]), None);
    }

    #[test]
    fn unusual_spending_cannot_be_empty() {
        let entries: Vec<(String, SpendingChange)> = vec![];
        assert_eq!(
            UnusualSpending::try_from_entries(entries),
            Err(DomainError::EmptyUnusualSpending)
        );
    }

    #[test]
    fn detected_unusual_spending_has_at_least_one_category() {
        let unusual = detect_unusual_spending(&[], &[payment(2.0, "a"), payment(3.0, "a")]).unwrap();
        assert_eq!(unusual.len(), 1);
        assert!(unusual.iter().next().is_some());
    }

    // ------------------------------------------------------------------
    // render_email_message
    // ------------------------------------------------------------------

    #[test]
    fn render_lists_categories_in_order() {
        let unusual = UnusualSpending::try_from_entries([
            ("electronics", SpendingChange { spending: 445.89, before: 249.98 }),
            ("beauty", SpendingChange { spending: 200.49, before: 0.0 }),
        ])
        .unwrap();

        let message = render_email_message(month(11, 2024), &unusual);

        assert_eq!(message.subject, "Unusual spending of $646.38 detected!");
        assert_eq!(
            message.body,
            [
                "Hello card user!",
                "",
                "We have detected unusually high spending on your card in these categories in 2024-11:",
                "",
                "* You spent $445.89 on electronics",
                "* You spent $200.49 on beauty",
                "",
                "Love,",
                "",
                "The Credit Card Company",
            ]
            .join("\n")
        );
    }

    #[test]
    fn render_always_prints_two_decimals() {
        let unusual = UnusualSpending::try_from_entries([(
            "groceries",
            SpendingChange { spending: 1.0, before: 0.0 },
        )])
        .unwrap();
        let message = render_email_message(month(2, 2025), &unusual);
        assert_eq!(message.subject, "Unusual spending of $1.00 detected!");
        assert!(message.body.contains("in 2025-02:"));
        assert!(message.body.contains("* You spent $1.00 on groceries"));
    }

    // ------------------------------------------------------------------
    // Ports -- compile checks
    // ------------------------------------------------------------------

    /// Verify that minimal port implementations compile and work together.
    #[tokio::test]
    async fn port_traits_compile_with_minimal_impls() {
        struct FixedClock;

        impl Clock for FixedClock {
            fn current_month_year(&self) -> MonthInYear {
                MonthInYear { month: 1, year: 2000 }
            }
        }

        struct NoPayments;

        impl PaymentsApi for NoPayments {
            type Error = DomainError;

            async fn fetch_payments_for_month(
                &self,
                _customer_id: &CustomerId,
                _month_in_year: MonthInYear,
            ) -> Result<Vec<Payment>, DomainError> {
                Ok(vec![])
            }
        }

        struct SilentNotifier;

        impl CustomerNotifier for SilentNotifier {
            type Error = DomainError;

            async fn notify_customer(
                &self,
                _customer_id: &CustomerId,
                _subject: &str,
                _body: &str,
            ) -> Result<(), DomainError> {
                Ok(())
            }
        }

        let clock = FixedClock;
        assert_eq!(clock.previous_month_year(), month(12, 1999));
        let customer = CustomerId::from("c-1");
        let payments = NoPayments
            .fetch_payments_for_month(&customer, clock.current_month_year())
            .await
            .unwrap();
        assert!(payments.is_empty());
        SilentNotifier.notify_customer(&customer, "s", "b").await.unwrap();
    }
}

// Rust guideline compliant 2026-10-18

//! End-to-end checks wired with the infrastructure stand-ins.

use application::{Application, ApplicationError, Outcome};
use domain::{CustomerId, MonthInYear, Payment, detect_unusual_spending};
use infrastructure::email_service::NotificationEvent;
use infrastructure::http_client::NullFetch;
use infrastructure::smtp_client::NullConnector;
use infrastructure::{
    Calendar, EmailService, HttpClient, HttpEvent, NullHttpConfig, NullResponse, NullSmtpConfig,
    PaymentsApiConfig, PaymentsApiError, PaymentsClient, PaymentsFixture, SmtpError,
};

type NullApplication = Application<Calendar, PaymentsClient<NullFetch>, EmailService<NullConnector>>;

fn customer() -> CustomerId {
    CustomerId::from("customer-123")
}

fn november() -> MonthInYear {
    MonthInYear::new(11, 2024).unwrap()
}

fn october() -> MonthInYear {
    MonthInYear::new(10, 2024).unwrap()
}

fn payments(entries: &[(f64, &str)]) -> Vec<Payment> {
    entries
        .iter()
        .map(|&(price, category)| Payment {
            price,
            category: category.to_owned(),
            description: format!("{category} purchase"),
        })
        .collect()
}

fn previous_month_payments() -> Vec<Payment> {
    payments(&[
        (99.99, "electronics"),
        (149.99, "electronics"),
        (29.99, "home"),
        (150.99, "clothing"),
    ])
}

fn null_application(previous: Vec<Payment>, current: Vec<Payment>) -> NullApplication {
    Application::new(
        Calendar::create_null_at(november()),
        PaymentsClient::create_null(vec![
            PaymentsFixture { customer_id: customer(), month_in_year: october(), payments: previous },
            PaymentsFixture { customer_id: customer(), month_in_year: november(), payments: current },
        ]),
        EmailService::create_null(),
    )
}

#[tokio::test]
async fn notifies_about_categories_that_jumped() {
    let app = null_application(
        previous_month_payments(),
        payments(&[
            (70.89, "electronics"),
            (375.00, "electronics"),
            (39.99, "home"),
            (200.49, "beauty"),
        ]),
    );
    let notifications = app.notifier().events().track();

    let outcome = app.trigger_unusual_spending_email(&customer()).await.unwrap();

    assert_eq!(outcome, Outcome::Notified);
    let expected_body = [
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
    .join("\n");
    assert_eq!(
        notifications.data(),
        vec![NotificationEvent::CustomerNotified {
            customer_id: customer(),
            subject: "Unusual spending of $646.38 detected!".to_owned(),
            body: expected_body,
        }]
    );
}

#[tokio::test]
async fn sends_nothing_when_no_category_jumped() {
    let app = null_application(
        previous_month_payments(),
        payments(&[(70.89, "electronics"), (39.99, "home"), (200.49, "clothing")]),
    );
    let notifications = app.notifier().events().track();
    let mails = app.notifier().smtp_events().track();

    let outcome = app.trigger_unusual_spending_email(&customer()).await.unwrap();

    assert_eq!(outcome, Outcome::NoUnusualSpending);
    assert!(notifications.data().is_empty());
    assert!(mails.data().is_empty());
}

#[test]
fn first_spending_in_a_category_is_unusual() {
    let unusual = detect_unusual_spending(&[], &payments(&[(1.00, "groceries")])).unwrap();

    assert_eq!(unusual.len(), 1);
    let groceries = unusual.get("groceries").unwrap();
    assert!((groceries.spending - 1.0).abs() < f64::EPSILON);
    assert!(groceries.before.abs() < f64::EPSILON);
}

#[tokio::test]
async fn first_spending_in_a_category_triggers_a_notification() {
    let app = null_application(vec![], payments(&[(1.00, "groceries")]));
    let notifications = app.notifier().events().track();

    app.trigger_unusual_spending_email(&customer()).await.unwrap();

    let events = notifications.data();
    assert_eq!(events.len(), 1);
    let NotificationEvent::CustomerNotified { subject, body, .. } = &events[0];
    assert_eq!(subject, "Unusual spending of $1.00 detected!");
    assert!(body.contains("* You spent $1.00 on groceries"));
}

#[tokio::test]
async fn queries_current_month_before_previous_month() {
    let app = null_application(vec![], vec![]);
    let requests = app.payments().events().track();

    app.trigger_unusual_spending_email(&customer()).await.unwrap();

    let paths: Vec<String> = requests
        .data()
        .into_iter()
        .map(|HttpEvent::RequestCompleted { request, .. }| request.url.path().to_owned())
        .collect();
    assert_eq!(
        paths,
        vec![
            "/payments-by-month/customer-123/2024-11",
            "/payments-by-month/customer-123/2024-10",
        ]
    );
}

#[tokio::test]
async fn wraps_around_the_year_boundary() {
    let app = Application::new(
        Calendar::create_null_at(MonthInYear::new(1, 2025).unwrap()),
        PaymentsClient::create_null(vec![]),
        EmailService::create_null(),
    );
    let requests = app.payments().events().track();

    app.trigger_unusual_spending_email(&customer()).await.unwrap();

    let last = requests.data().pop().unwrap();
    let HttpEvent::RequestCompleted { request, .. } = last;
    assert_eq!(request.url.path(), "/payments-by-month/customer-123/2024-12");
}

#[tokio::test]
async fn mail_failure_is_reported_and_nothing_is_announced() {
    let app = Application::new(
        Calendar::create_null_at(november()),
        PaymentsClient::create_null(vec![PaymentsFixture {
            customer_id: customer(),
            month_in_year: november(),
            payments: payments(&[(10.0, "travel")]),
        }]),
        EmailService::create_null_with(NullSmtpConfig::error_on_send(SmtpError::Rejected {
            command: "RCPT".to_owned(),
            code: 550,
            message: "no such user".to_owned(),
        })),
    );
    let notifications = app.notifier().events().track();

    let error = app.trigger_unusual_spending_email(&customer()).await.unwrap_err();

    assert!(
        matches!(error, ApplicationError::Notification(SmtpError::Rejected { code: 550, .. })),
        "got {error:?}"
    );
    assert!(notifications.data().is_empty());
}

#[tokio::test]
async fn invalid_payments_response_is_reported_and_nothing_is_sent() {
    let http = HttpClient::create_null(
        NullHttpConfig::new().default_response(NullResponse::new().body(r#"{"error": "oops"}"#)),
    );
    let app = Application::new(
        Calendar::create_null_at(november()),
        PaymentsClient::new(
            PaymentsApiConfig { base_url: url_of("https://payments.example.com/") },
            http,
        ),
        EmailService::create_null(),
    );
    let mails = app.notifier().smtp_events().track();

    let error = app.trigger_unusual_spending_email(&customer()).await.unwrap_err();

    assert!(
        matches!(&error, ApplicationError::Payments(PaymentsApiError::InvalidResponse { customer_id, .. }) if customer_id == &customer()),
        "got {error:?}"
    );
    assert_eq!(
        error.to_string(),
        "failed to fetch payments for customer \"customer-123\": invalid response from server"
    );
    assert!(mails.data().is_empty());
}

fn url_of(text: &str) -> url::Url {
    url::Url::parse(text).unwrap()
}

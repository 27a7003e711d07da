//! Payments panel tests

use chrono::NaiveDate;
use serde_json::json;

use school_portal_client::error::GENERIC_APOLOGY;
use school_portal_client::models::{FeeStatus, Installment, PaymentPlanDraft, PaymentStatus, Role};
use school_portal_client::panels::PaymentsPanel;
use school_portal_client::view::{LoadOutcome, Phase};

use super::support::{clock, context, MockBackend};

fn admin_routes(mock: &MockBackend) {
    mock.on(
        "GET",
        "/fee-structure",
        200,
        json!({"fee_structure": [
            {"name": "Tuition", "amount": 850000},
            {"name": "Lunch", "amount": "400,000"}
        ]}),
    );
    mock.on(
        "GET",
        "/payments",
        200,
        json!({"payments": [
            {"id": 1, "amount": 500000, "status": "completed"},
            {"id": 2, "amount": 250000, "status": "processing"}
        ]}),
    );
    mock.on(
        "GET",
        "/payment-plans",
        200,
        json!({"plans": [{"id": 4, "name": "Term 2", "installments": [
            {"amount": 600000, "due_date": "2025-05-01"},
            {"amount": 650000, "due_date": "2025-06-01"}
        ]}]}),
    );
}

fn draft() -> PaymentPlanDraft {
    PaymentPlanDraft {
        name: "Term 3".into(),
        student_id: "31".into(),
        total_amount: 1_000_000,
        installments: vec![
            Installment {
                amount: 400_000,
                due_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                paid: false,
            },
            Installment {
                amount: 600_000,
                due_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                paid: false,
            },
        ],
    }
}

#[tokio::test]
async fn test_admin_sees_payments_and_plans() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Admin, "1", &clock()));
    assert_eq!(panel.mount().await, LoadOutcome::Loaded);

    let data = panel.data().await;
    assert_eq!(data.fee_structure_total(), 1_250_000);
    assert_eq!(data.payments[1].status, PaymentStatus::Pending);
    assert_eq!(data.plans[0].total_amount, 1_250_000);
    assert!(data.fee_balance.is_empty());
    assert!(mock.requests().iter().all(|r| !r.path.starts_with("/fee-balance")));

    let view = panel.view().await;
    assert_eq!(view.totals.fee_structure, "UGX 1,250,000");
    assert_eq!(view.totals.collected, "UGX 500,000");
}

#[tokio::test]
async fn test_parent_sees_own_balance_only() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    mock.on("GET", "/fee-balance/7", 200, json!({"total_fees": 1250000, "amount_paid": 500000}));
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Parent, "7", &clock()));
    panel.mount().await;

    let data = panel.data().await;
    assert_eq!(data.fee_balance.balance, 750_000);
    assert_eq!(data.fee_balance.status, Some(FeeStatus::Partial));
    assert!(data.payments.is_empty());
    assert!(data.plans.is_empty());
    assert!(mock.requests_to("GET", "/payments").is_empty());
    assert_eq!(panel.view().await.totals.balance, "UGX 750,000");
}

#[tokio::test]
async fn test_one_failing_section_empties_only_itself() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    mock.on("GET", "/payments", 500, json!({"message": "ledger offline"}));
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Admin, "1", &clock()));
    assert_eq!(panel.mount().await, LoadOutcome::Loaded);

    let data = panel.data().await;
    assert!(data.payments.is_empty());
    assert_eq!(data.fee_structure.len(), 2);
    assert_eq!(data.plans.len(), 1);
}

#[tokio::test]
async fn test_all_sections_failing_is_an_error_state() {
    let mock = MockBackend::new();
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Student, "9", &clock()));
    assert_eq!(panel.mount().await, LoadOutcome::FellBack);

    let view = panel.view().await;
    assert_eq!(view.state.phase, Phase::Error);
    assert_eq!(view.state.data, Default::default());
    assert_eq!(view.totals.balance, "UGX 0");
}

#[tokio::test]
async fn test_admin_creates_plan_and_refreshes() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    mock.on("POST", "/payment-plans", 201, json!({"plan": {"id": 10, "name": "Term 3", "total_amount": 1000000}}));
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Admin, "1", &clock()));
    panel.mount().await;

    let created = panel.create_plan(&draft()).await.unwrap().unwrap();
    assert_eq!(created.id, "10");

    let posted = &mock.requests_to("POST", "/payment-plans")[0];
    assert_eq!(posted.body["student_id"], "31");
    assert_eq!(posted.body["installments"][0]["due_date"], "2025-09-01");
    assert_eq!(mock.requests_to("GET", "/payment-plans").len(), 2);
}

#[tokio::test]
async fn test_invalid_plan_alerts_before_network() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Admin, "1", &clock()));
    panel.mount().await;

    let mut bad = draft();
    bad.total_amount = 900_000;
    assert!(panel.create_plan(&bad).await.is_err());
    assert_eq!(panel.take_alert().unwrap().message, "Installments must add up to the plan amount");
    assert!(mock.requests_to("POST", "/payment-plans").is_empty());
}

#[tokio::test]
async fn test_failed_write_shows_apology() {
    let mock = MockBackend::new();
    admin_routes(&mock);
    mock.on("DELETE", "/payment-plans/4", 500, json!({"message": "constraint violation"}));
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Admin, "1", &clock()));
    panel.mount().await;

    assert!(panel.delete_plan("4").await.is_err());
    assert_eq!(panel.take_alert().unwrap().message, GENERIC_APOLOGY);
}

#[tokio::test]
async fn test_plan_management_is_admin_only() {
    let mock = MockBackend::new();
    let base = mock.start().await;

    let panel = PaymentsPanel::new(context(&base, Role::Teacher, "3", &clock()));
    assert!(panel.update_plan("4", &draft()).await.is_err());
    assert_eq!(panel.take_alert().unwrap().error_code, "Forbidden");
    assert!(mock.requests().is_empty());
}

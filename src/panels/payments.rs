//! Payments panel
//!
//! Fetches the fee balance, fee structure, payment history and payment plans
//! in parallel. Which sections load depends on the role; each one falls back
//! to empty on its own.

use serde::Serialize;

use super::PanelContext;
use crate::error::{ClientError, ClientResult};
use crate::logging::log_fetch_failure;
use crate::models::payment::saturating_sum;
use crate::models::{
    format_ugx, Capability, FeeBalance, FeeItem, Payment, PaymentPlan, PaymentPlanDraft, PaymentStatus,
};
use crate::view::{Alert, AlertSlot, LoadOutcome, Panel, PanelState};

const PANEL: &str = "payments";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentsData {
    pub fee_balance: FeeBalance,
    pub fee_structure: Vec<FeeItem>,
    pub payments: Vec<Payment>,
    pub plans: Vec<PaymentPlan>,
}

impl PaymentsData {
    pub fn fee_structure_total(&self) -> i64 {
        FeeItem::total(&self.fee_structure)
    }

    /// Sum of completed payments
    pub fn collected(&self) -> i64 {
        saturating_sum(
            self.payments
                .iter()
                .filter(|p| p.status == PaymentStatus::Completed)
                .map(|p| p.amount),
        )
    }
}

/// Headline figures formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentTotals {
    pub fee_structure: String,
    pub collected: String,
    pub balance: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentsView {
    pub state: PanelState<PaymentsData>,
    pub totals: PaymentTotals,
}

#[derive(Clone)]
pub struct PaymentsPanel {
    context: PanelContext,
    data: Panel<PaymentsData>,
    alerts: AlertSlot,
}

impl PaymentsPanel {
    pub fn new(context: PanelContext) -> Self {
        let data = Panel::new(PANEL, context.lifecycle.clone(), context.clock.clone());
        Self {
            context,
            data,
            alerts: AlertSlot::new(),
        }
    }

    pub async fn mount(&self) -> LoadOutcome {
        self.context.lifecycle.mount();
        self.refresh().await
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
    }

    pub async fn refresh(&self) -> LoadOutcome {
        let context = self.context.clone();
        self.data.load(async move { fetch_sections(&context).await }).await
    }

    pub async fn data(&self) -> PaymentsData {
        self.data.data().await
    }

    pub async fn create_plan(&self, draft: &PaymentPlanDraft) -> ClientResult<Option<PaymentPlan>> {
        let result: ClientResult<Option<PaymentPlan>> = async {
            self.context.require(Capability::ManagePaymentPlans)?;
            draft.validate()?;
            self.context.api.create_payment_plan(draft).await
        }
        .await;
        self.finish_write(result).await
    }

    pub async fn update_plan(&self, id: &str, draft: &PaymentPlanDraft) -> ClientResult<Option<PaymentPlan>> {
        let result: ClientResult<Option<PaymentPlan>> = async {
            self.context.require(Capability::ManagePaymentPlans)?;
            draft.validate()?;
            self.context.api.update_payment_plan(id, draft).await
        }
        .await;
        self.finish_write(result).await
    }

    pub async fn delete_plan(&self, id: &str) -> ClientResult<()> {
        let result: ClientResult<()> = async {
            self.context.require(Capability::ManagePaymentPlans)?;
            self.context.api.delete_payment_plan(id).await
        }
        .await;
        self.finish_write(result).await
    }

    /// Refetch after a successful write; alert on failure
    async fn finish_write<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        match result {
            Ok(value) => {
                self.refresh().await;
                Ok(value)
            }
            Err(error) => {
                self.alerts.raise(&error);
                Err(error)
            }
        }
    }

    pub fn take_alert(&self) -> Option<Alert> {
        self.alerts.take()
    }

    pub async fn view(&self) -> PaymentsView {
        let state = self.data.snapshot().await;
        let totals = PaymentTotals {
            fee_structure: format_ugx(state.data.fee_structure_total()),
            collected: format_ugx(state.data.collected()),
            balance: state.data.fee_balance.formatted_balance(),
        };
        PaymentsView { state, totals }
    }
}

/// Section result: `None` when the role does not see the section
type Section<T> = Option<ClientResult<T>>;

async fn fetch_sections(context: &PanelContext) -> ClientResult<PaymentsData> {
    let api = &context.api;
    let own_fees = context.role.can(Capability::ViewOwnFees);
    let all_payments = context.role.can(Capability::ViewAllPayments);

    let balance = async {
        if own_fees {
            Some(api.fee_balance(&context.user_id).await)
        } else {
            None
        }
    };
    let structure = async { Some(api.fee_structure().await) };
    let payments = async {
        if all_payments {
            Some(api.payments().await)
        } else {
            None
        }
    };
    let plans = async {
        if all_payments {
            Some(api.payment_plans().await)
        } else {
            None
        }
    };

    let (balance, structure, payments, plans) = tokio::join!(balance, structure, payments, plans);

    let mut attempted = 0;
    let mut last_error = None;
    let data = PaymentsData {
        fee_balance: settle(balance, &mut attempted, &mut last_error),
        fee_structure: settle(structure, &mut attempted, &mut last_error),
        payments: settle(payments, &mut attempted, &mut last_error),
        plans: settle(plans, &mut attempted, &mut last_error),
    };

    match last_error {
        Some((failures, error)) if failures == attempted => Err(error),
        _ => Ok(data),
    }
}

/// Unwrap one section into its value or empty state, counting failures
fn settle<T: Default>(section: Section<T>, attempted: &mut usize, last_error: &mut Option<(usize, ClientError)>) -> T {
    match section {
        None => T::default(),
        Some(Ok(value)) => {
            *attempted += 1;
            value
        }
        Some(Err(error)) => {
            *attempted += 1;
            log_fetch_failure(PANEL, &error);
            let failures = last_error.as_ref().map_or(0, |(n, _)| *n) + 1;
            *last_error = Some((failures, error));
            T::default()
        }
    }
}

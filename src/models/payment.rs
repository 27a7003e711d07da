//! Payment, fee balance, fee structure, and payment plan models.
//!
//! Amounts are whole Uganda shillings; UGX has no minor unit in use.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::decode::{first_datetime, first_i64, first_str, id_of, list_items, object_payload, str_or};
use crate::error::{ClientError, ClientResult};

/// Sum of amounts for display; clamps at the `i64` bounds
pub(crate) fn saturating_sum(amounts: impl IntoIterator<Item = i64>) -> i64 {
    amounts.into_iter().fold(0, i64::saturating_add)
}

/// Render an amount as `UGX 1,250,000`
pub fn format_ugx(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("UGX -{grouped}")
    } else {
        format!("UGX {grouped}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub amount: i64,
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub reference: Option<String>,
    pub student_name: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl Payment {
    /// Unknown statuses decode as pending.
    pub fn from_value(item: &Value) -> Option<Self> {
        Some(Self {
            id: id_of(item, &["id", "payment_id"])?,
            amount: first_i64(item, &["amount", "amount_paid"]).unwrap_or(0),
            status: first_str(item, &["status"])
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            method: first_str(item, &["method", "payment_method"]),
            reference: first_str(item, &["reference", "transaction_id"]),
            student_name: first_str(item, &["student_name", "student"]),
            date: first_datetime(item, &["date", "created_at", "paid_at"]),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        list_items(payload, "payments")
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FeeStatus {
    Paid,
    Partial,
    Overdue,
}

/// Outstanding fees for one student. The default is the empty state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeBalance {
    pub total_fees: i64,
    pub amount_paid: i64,
    pub balance: i64,
    pub status: Option<FeeStatus>,
    pub due_date: Option<NaiveDate>,
}

impl FeeBalance {
    /// A missing status is derived: nothing owed is paid, something paid is
    /// partial, otherwise overdue. A missing balance is total minus paid.
    pub fn from_value(payload: &Value) -> Self {
        let body = object_payload(payload, "balance");
        let total_fees = first_i64(body, &["total_fees", "total", "total_amount"]).unwrap_or(0);
        let amount_paid = first_i64(body, &["amount_paid", "paid", "total_paid"]).unwrap_or(0);
        let balance = first_i64(body, &["balance", "outstanding", "amount_due"])
            .unwrap_or_else(|| total_fees.saturating_sub(amount_paid));

        let status = first_str(body, &["status"])
            .and_then(|s| s.parse().ok())
            .or_else(|| {
                if total_fees == 0 && amount_paid == 0 && balance == 0 {
                    None
                } else if balance <= 0 {
                    Some(FeeStatus::Paid)
                } else if amount_paid > 0 {
                    Some(FeeStatus::Partial)
                } else {
                    Some(FeeStatus::Overdue)
                }
            });

        Self {
            total_fees,
            amount_paid,
            balance,
            status,
            due_date: first_str(body, &["due_date"])
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn formatted_balance(&self) -> String {
        format_ugx(self.balance)
    }
}

/// One line of the fee structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeItem {
    pub name: String,
    pub amount: i64,
    pub term: Option<String>,
    pub class_level: Option<String>,
}

impl FeeItem {
    pub fn from_value(item: &Value) -> Option<Self> {
        Some(Self {
            name: first_str(item, &["name", "item", "description"])?,
            amount: first_i64(item, &["amount", "fee"]).unwrap_or(0),
            term: first_str(item, &["term"]),
            class_level: first_str(item, &["class_level", "class", "grade"]),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        let key = if payload.get("fee_structure").is_some() { "fee_structure" } else { "items" };
        list_items(payload, key)
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }

    pub fn total(items: &[Self]) -> i64 {
        saturating_sum(items.iter().map(|i| i.amount))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub amount: i64,
    pub due_date: NaiveDate,
    pub paid: bool,
}

impl Installment {
    fn from_value(item: &Value) -> Option<Self> {
        Some(Self {
            amount: first_i64(item, &["amount"])?,
            due_date: first_str(item, &["due_date", "date"])
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())?,
            paid: super::decode::first_bool(item, &["paid", "is_paid"]).unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: String,
    pub name: String,
    pub student_id: Option<String>,
    pub total_amount: i64,
    pub installments: Vec<Installment>,
    pub status: String,
}

impl PaymentPlan {
    pub fn from_value(item: &Value) -> Option<Self> {
        let installments: Vec<Installment> = item
            .get("installments")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Installment::from_value).collect())
            .unwrap_or_default();
        let total_amount = first_i64(item, &["total_amount", "amount"])
            .unwrap_or_else(|| saturating_sum(installments.iter().map(|i| i.amount)));

        Some(Self {
            id: id_of(item, &["id", "plan_id"])?,
            name: str_or(item, &["name", "title"], "Payment plan"),
            student_id: id_of(item, &["student_id"]),
            total_amount,
            installments,
            status: str_or(item, &["status"], "active"),
        })
    }

    pub fn list_from_value(payload: &Value) -> Vec<Self> {
        let key = if payload.get("payment_plans").is_some() { "payment_plans" } else { "plans" };
        list_items(payload, key)
            .iter()
            .filter_map(Self::from_value)
            .collect()
    }

    /// Earliest unpaid installment
    pub fn next_due(&self) -> Option<&Installment> {
        self.installments
            .iter()
            .filter(|i| !i.paid)
            .min_by_key(|i| i.due_date)
    }
}

/// Body of `POST /payment-plans` and `PUT /payment-plans/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPlanDraft {
    pub name: String,
    pub student_id: String,
    pub total_amount: i64,
    pub installments: Vec<Installment>,
}

impl PaymentPlanDraft {
    pub fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::validation("Please enter a plan name"));
        }
        if self.student_id.trim().is_empty() {
            return Err(ClientError::validation("Please select a student"));
        }
        if self.total_amount <= 0 {
            return Err(ClientError::validation("Plan amount must be greater than zero"));
        }
        if self.installments.is_empty() {
            return Err(ClientError::validation("Please add at least one installment"));
        }
        if self.installments.iter().any(|i| i.amount <= 0) {
            return Err(ClientError::validation("Installment amounts must be greater than zero"));
        }
        let scheduled = self
            .installments
            .iter()
            .try_fold(0_i64, |total, i| total.checked_add(i.amount))
            .ok_or_else(|| ClientError::validation("Installment amounts are too large"))?;
        if scheduled != self.total_amount {
            return Err(ClientError::validation("Installments must add up to the plan amount"));
        }
        Ok(())
    }
}

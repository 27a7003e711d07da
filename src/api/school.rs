//! Typed calls for each backend resource.
//!
//! Every method fetches raw JSON and runs it through the model's decoder, so
//! field-name drift is absorbed in one place per shape.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::client::ApiClient;
use super::endpoints::Endpoint;
use crate::error::ClientResult;
use crate::models::{
    Achievement, AchievementDraft, AttendanceRecord, Contact, FeeBalance, FeeItem, Group, GroupDraft,
    LeaderboardCategory, LeaderboardEntry, LeaderboardPeriod, Notification, NotificationDraft,
    OutgoingMessage, Payment, PaymentPlan, PaymentPlanDraft, Profile, SendReceipt, Student,
};

impl ApiClient {
    pub async fn students(&self) -> ClientResult<Vec<Student>> {
        let payload: Value = self.get(&Endpoint::Students).await?;
        Ok(Student::list_from_value(&payload))
    }

    pub async fn attendance(&self) -> ClientResult<Vec<AttendanceRecord>> {
        let payload: Value = self.get(&Endpoint::Attendance).await?;
        Ok(AttendanceRecord::list_from_value(&payload))
    }

    pub async fn payments(&self) -> ClientResult<Vec<Payment>> {
        let payload: Value = self.get(&Endpoint::Payments).await?;
        Ok(Payment::list_from_value(&payload))
    }

    pub async fn profile(&self, user_id: &str) -> ClientResult<Profile> {
        let payload: Value = self.get(&Endpoint::Profile(user_id.to_string())).await?;
        Ok(Profile::from_value(&payload))
    }

    pub async fn fee_balance(&self, user_id: &str) -> ClientResult<FeeBalance> {
        let payload: Value = self.get(&Endpoint::FeeBalance(user_id.to_string())).await?;
        Ok(FeeBalance::from_value(&payload))
    }

    pub async fn fee_structure(&self) -> ClientResult<Vec<FeeItem>> {
        let payload: Value = self.get(&Endpoint::FeeStructure).await?;
        Ok(FeeItem::list_from_value(&payload))
    }

    pub async fn payment_plans(&self) -> ClientResult<Vec<PaymentPlan>> {
        let payload: Value = self.get(&Endpoint::PaymentPlans).await?;
        Ok(PaymentPlan::list_from_value(&payload))
    }

    /// Returns the created plan when the backend echoes it back
    pub async fn create_payment_plan(&self, draft: &PaymentPlanDraft) -> ClientResult<Option<PaymentPlan>> {
        draft.validate()?;
        let payload: Value = self.post(&Endpoint::PaymentPlans, draft).await?;
        Ok(decode_plan(&payload))
    }

    pub async fn update_payment_plan(&self, id: &str, draft: &PaymentPlanDraft) -> ClientResult<Option<PaymentPlan>> {
        draft.validate()?;
        let payload: Value = self.put(&Endpoint::PaymentPlan(id.to_string()), draft).await?;
        Ok(decode_plan(&payload))
    }

    pub async fn delete_payment_plan(&self, id: &str) -> ClientResult<()> {
        let _: Value = self.delete(&Endpoint::PaymentPlan(id.to_string())).await?;
        Ok(())
    }

    /// `received_at` dates items the backend flags read without any timestamp
    pub async fn notifications(&self, received_at: DateTime<Utc>) -> ClientResult<Vec<Notification>> {
        let payload: Value = self.get(&Endpoint::Notifications).await?;
        Ok(Notification::list_from_value(&payload, received_at))
    }

    pub async fn send_notification(&self, draft: &NotificationDraft) -> ClientResult<()> {
        draft.validate()?;
        let _: Value = self.post(&Endpoint::SendNotification, draft).await?;
        Ok(())
    }

    pub async fn mark_notification_read(&self, id: &str) -> ClientResult<()> {
        let _: Value = self
            .post(&Endpoint::MarkNotificationRead(id.to_string()), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    pub async fn contacts(&self) -> ClientResult<Vec<Contact>> {
        let payload: Value = self.get(&Endpoint::MessagingContacts).await?;
        Ok(Contact::list_from_value(&payload))
    }

    pub async fn send_message(&self, message: &OutgoingMessage) -> ClientResult<SendReceipt> {
        message.validate()?;
        let payload: Value = self.post(&Endpoint::MessagingSend, message).await?;
        Ok(SendReceipt::from_value(&payload))
    }

    pub async fn groups(&self) -> ClientResult<Vec<Group>> {
        let payload: Value = self.get(&Endpoint::MessagingGroups).await?;
        Ok(Group::list_from_value(&payload))
    }

    pub async fn create_group(&self, draft: &GroupDraft) -> ClientResult<Option<Group>> {
        draft.validate()?;
        let payload: Value = self.post(&Endpoint::MessagingGroups, draft).await?;
        let body = crate::models::decode::object_payload(&payload, "group");
        Ok(Group::from_value(body))
    }

    pub async fn leaderboard(
        &self,
        period: LeaderboardPeriod,
        category: LeaderboardCategory,
    ) -> ClientResult<Vec<LeaderboardEntry>> {
        let payload: Value = self.get(&Endpoint::Leaderboard { period, category }).await?;
        Ok(LeaderboardEntry::list_from_value(&payload))
    }

    pub async fn student_achievements(&self, student_id: &str) -> ClientResult<Vec<Achievement>> {
        let payload: Value = self
            .get(&Endpoint::StudentAchievements(student_id.to_string()))
            .await?;
        Ok(Achievement::list_from_value(&payload))
    }

    pub async fn create_achievement(&self, draft: &AchievementDraft) -> ClientResult<Option<Achievement>> {
        draft.validate()?;
        let payload: Value = self.post(&Endpoint::CreateAchievement, draft).await?;
        let body = crate::models::decode::object_payload(&payload, "achievement");
        Ok(Achievement::from_value(body))
    }
}

fn decode_plan(payload: &Value) -> Option<PaymentPlan> {
    let body = crate::models::decode::object_payload(payload, "plan");
    PaymentPlan::from_value(body)
}

//! AI tutor chat

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::PanelContext;
use crate::api::{TutorClient, TutorRequest};
use crate::error::{ClientError, ClientResult, GENERIC_APOLOGY};
use crate::logging::log_fetch_failure;
use crate::models::Capability;
use crate::view::{Alert, AlertSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Tutor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TutorTurn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Lesson settings sent with every question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonSettings {
    pub language: String,
    pub level: String,
    pub topic: String,
    pub lesson_type: String,
}

impl Default for LessonSettings {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            level: "beginner".to_string(),
            topic: "general".to_string(),
            lesson_type: "conversation".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct TutorChat {
    context: PanelContext,
    tutor: TutorClient,
    settings: Arc<RwLock<LessonSettings>>,
    transcript: Arc<RwLock<Vec<TutorTurn>>>,
    alerts: AlertSlot,
}

impl TutorChat {
    pub fn new(context: PanelContext, tutor: TutorClient) -> Self {
        Self {
            context,
            tutor,
            settings: Arc::new(RwLock::new(LessonSettings::default())),
            transcript: Arc::new(RwLock::new(Vec::new())),
            alerts: AlertSlot::new(),
        }
    }

    pub fn mount(&self) {
        self.context.lifecycle.mount();
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
    }

    pub async fn configure(&self, settings: LessonSettings) {
        *self.settings.write().await = settings;
    }

    /// Ask the tutor.
    ///
    /// The user's turn is appended before the call. On failure a tutor turn
    /// carrying the apology is appended and an alert is raised.
    pub async fn ask(&self, message: &str) -> ClientResult<String> {
        let message = message.trim();
        if let Err(error) = self.check(message) {
            self.alerts.raise(&error);
            return Err(error);
        }

        self.push(Speaker::User, message).await;

        let settings = self.settings.read().await.clone();
        let request = TutorRequest {
            user_role: self.context.role,
            language: settings.language,
            level: settings.level,
            topic: settings.topic,
            lesson_type: settings.lesson_type,
            student_id: self.context.user_id.clone(),
            message: message.to_string(),
        };

        let mut token = self.context.lifecycle.token();
        match token.run(self.tutor.ask(&request)).await {
            Ok(reply) => {
                self.push(Speaker::Tutor, &reply).await;
                Ok(reply)
            }
            Err(error) if error.is_cancelled() => Err(error),
            Err(error) => {
                log_fetch_failure("tutor", &error);
                self.push(Speaker::Tutor, GENERIC_APOLOGY).await;
                self.alerts.raise(&error);
                Err(error)
            }
        }
    }

    fn check(&self, message: &str) -> ClientResult<()> {
        self.context.require(Capability::UseTutor)?;
        if message.is_empty() {
            return Err(ClientError::validation("Please type a question for the tutor"));
        }
        Ok(())
    }

    async fn push(&self, speaker: Speaker, text: &str) {
        let turn = TutorTurn {
            speaker,
            text: text.to_string(),
            at: self.context.clock.now_utc(),
        };
        self.transcript.write().await.push(turn);
    }

    pub async fn transcript(&self) -> Vec<TutorTurn> {
        self.transcript.read().await.clone()
    }

    pub async fn clear(&self) {
        self.transcript.write().await.clear();
    }

    pub fn take_alert(&self) -> Option<Alert> {
        self.alerts.take()
    }
}

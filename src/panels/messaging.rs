//! Messaging panel
//!
//! Contacts and groups are fetched together. Transcripts live only in local
//! state; sends are optimistic and a failed send stays in the transcript
//! marked as failed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;

use super::PanelContext;
use crate::error::{ClientError, ClientResult};
use crate::logging::log_optimistic_rollover;
use crate::models::{Capability, ChatMessage, Contact, DeliveryStatus, Group, GroupDraft, OutgoingMessage};
use crate::view::{Alert, AlertSlot, LoadOutcome, Panel, PanelState, Poller};

const PANEL: &str = "messaging";

/// Chance that a contact's online flag flips on each presence tick
const PRESENCE_FLIP_CHANCE: f64 = 0.3;

/// Contacts and groups as one fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagingData {
    pub contacts: Vec<Contact>,
    pub groups: Vec<Group>,
}

/// Target of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Conversation {
    Contact(String),
    Group(String),
}

impl Conversation {
    pub fn key(&self) -> String {
        match self {
            Conversation::Contact(id) => format!("contact:{id}"),
            Conversation::Group(id) => format!("group:{id}"),
        }
    }

    fn outgoing(&self, content: &str) -> OutgoingMessage {
        let (recipient_id, group_id) = match self {
            Conversation::Contact(id) => (Some(id.clone()), None),
            Conversation::Group(id) => (None, Some(id.clone())),
        };
        OutgoingMessage {
            recipient_id,
            group_id,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagingView {
    pub directory: PanelState<MessagingData>,
    pub selected: Option<Conversation>,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Clone)]
pub struct MessagingPanel {
    context: PanelContext,
    directory: Panel<MessagingData>,
    transcripts: Arc<RwLock<HashMap<Conversation, Vec<ChatMessage>>>>,
    selected: Arc<RwLock<Option<Conversation>>>,
    presence: Arc<Mutex<Option<Poller>>>,
    alerts: AlertSlot,
}

impl MessagingPanel {
    pub fn new(context: PanelContext) -> Self {
        let directory = Panel::new(PANEL, context.lifecycle.clone(), context.clock.clone());
        Self {
            context,
            directory,
            transcripts: Arc::new(RwLock::new(HashMap::new())),
            selected: Arc::new(RwLock::new(None)),
            presence: Arc::new(Mutex::new(None)),
            alerts: AlertSlot::new(),
        }
    }

    /// Mount, fetch the directory, and start the presence refresh
    pub async fn mount(&self) -> LoadOutcome {
        self.context.lifecycle.mount();
        let outcome = self.refresh().await;
        self.start_presence();
        outcome
    }

    pub fn unmount(&self) {
        self.context.lifecycle.unmount();
        if let Some(mut poller) = self.lock_presence().take() {
            poller.stop();
        }
    }

    pub async fn refresh(&self) -> LoadOutcome {
        let api = self.context.api.clone();
        self.directory
            .load(async move {
                let (contacts, groups) = tokio::try_join!(api.contacts(), api.groups())?;
                Ok(MessagingData { contacts, groups })
            })
            .await
    }

    pub async fn contacts(&self) -> Vec<Contact> {
        self.directory.data().await.contacts
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.directory.data().await.groups
    }

    /// Open a conversation; selecting a contact clears its unread badge
    pub async fn select(&self, conversation: Conversation) {
        if let Conversation::Contact(id) = &conversation {
            self.directory
                .update(|data| {
                    if let Some(contact) = data.contacts.iter_mut().find(|c| &c.id == id) {
                        contact.unread = 0;
                    }
                })
                .await;
        }
        self.transcripts.write().await.entry(conversation.clone()).or_default();
        *self.selected.write().await = Some(conversation);
    }

    pub async fn selected(&self) -> Option<Conversation> {
        self.selected.read().await.clone()
    }

    pub async fn transcript(&self, conversation: &Conversation) -> Vec<ChatMessage> {
        self.transcripts
            .read()
            .await
            .get(conversation)
            .cloned()
            .unwrap_or_default()
    }

    /// Send to the selected conversation.
    ///
    /// Empty input raises an alert and sends nothing. Otherwise the message
    /// is appended as sent before the request; a failed request flips it to
    /// failed. Returns the local id of the appended message.
    pub async fn send_message(&self, content: &str) -> ClientResult<String> {
        let Some(conversation) = self.selected().await else {
            let error = ClientError::validation("Please choose a conversation");
            self.alerts.raise(&error);
            return Err(error);
        };

        let outgoing = conversation.outgoing(content.trim());
        if let Err(error) = outgoing.validate() {
            self.alerts.raise(&error);
            return Err(error);
        }

        let message = ChatMessage::outgoing(&conversation.key(), &outgoing.content, self.context.clock.now_utc());
        let local_id = message.local_id.clone();
        self.transcripts
            .write()
            .await
            .entry(conversation.clone())
            .or_default()
            .push(message);

        self.deliver(&conversation, &local_id, &outgoing).await?;
        Ok(local_id)
    }

    /// Resend every failed message of a conversation; returns how many went through
    pub async fn retry_failed(&self, conversation: &Conversation) -> usize {
        let failed: Vec<(String, String)> = self
            .transcript(conversation)
            .await
            .into_iter()
            .filter(ChatMessage::is_failed)
            .map(|m| (m.local_id, m.content))
            .collect();

        let mut delivered = 0;
        for (local_id, content) in failed {
            self.set_status(conversation, &local_id, DeliveryStatus::Sent, None).await;
            if self.deliver(conversation, &local_id, &conversation.outgoing(&content)).await.is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    async fn deliver(&self, conversation: &Conversation, local_id: &str, outgoing: &OutgoingMessage) -> ClientResult<()> {
        let api = self.context.api.clone();
        let mut token = self.context.lifecycle.token();
        match token.run(async { api.send_message(outgoing).await }).await {
            Ok(receipt) => {
                self.set_status(conversation, local_id, DeliveryStatus::Sent, receipt.message_id)
                    .await;
                Ok(())
            }
            Err(error) if error.is_cancelled() => Err(error),
            Err(error) => {
                log_optimistic_rollover(PANEL, local_id, &error);
                self.set_status(conversation, local_id, DeliveryStatus::Failed, None).await;
                Err(error)
            }
        }
    }

    async fn set_status(
        &self,
        conversation: &Conversation,
        local_id: &str,
        status: DeliveryStatus,
        server_id: Option<String>,
    ) {
        let mut transcripts = self.transcripts.write().await;
        let entry = transcripts
            .get_mut(conversation)
            .and_then(|messages| messages.iter_mut().find(|m| m.local_id == local_id));
        if let Some(message) = entry {
            message.status = status;
            if server_id.is_some() {
                message.server_id = server_id;
            }
        }
    }

    /// Create a group (staff only) and refetch the directory
    pub async fn create_group(&self, draft: &GroupDraft) -> ClientResult<Option<Group>> {
        let result: ClientResult<Option<Group>> = async {
            self.context.require(Capability::CreateMessageGroup)?;
            draft.validate()?;
            self.context.api.create_group(draft).await
        }
        .await;

        match result {
            Ok(group) => {
                self.refresh().await;
                Ok(group)
            }
            Err(error) => {
                self.alerts.raise(&error);
                Err(error)
            }
        }
    }

    /// Flip some contacts' online flags at random.
    ///
    /// The backend has no presence feed, so this stands in for one.
    pub async fn shuffle_presence(&self) {
        self.directory
            .update(|data| {
                let mut rng = rand::thread_rng();
                for contact in &mut data.contacts {
                    if rng.gen_bool(PRESENCE_FLIP_CHANCE) {
                        contact.online = !contact.online;
                    }
                }
            })
            .await;
    }

    fn start_presence(&self) {
        let panel = self.clone();
        let poller = Poller::start(&self.context.lifecycle, self.context.poll_interval, move || {
            let panel = panel.clone();
            async move { panel.shuffle_presence().await }
        });
        *self.lock_presence() = Some(poller);
    }

    fn lock_presence(&self) -> MutexGuard<'_, Option<Poller>> {
        match self.presence.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn take_alert(&self) -> Option<Alert> {
        self.alerts.take()
    }

    pub async fn view(&self) -> MessagingView {
        let selected = self.selected().await;
        let transcript = match &selected {
            Some(conversation) => self.transcript(conversation).await,
            None => Vec::new(),
        };
        MessagingView {
            directory: self.directory.snapshot().await,
            selected,
            transcript,
        }
    }
}

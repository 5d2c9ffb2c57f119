use tracing::{debug, info};

use super::{SessionError, SessionState};
use crate::core::constants::DEFAULT_GREETING;
use crate::core::memory::MemoryStore;
use crate::core::message::{Conversation, Message};
use crate::core::model_adapter::ReplyGenerator;

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Assistant message that opens a fresh conversation.
    pub greeting: String,
    /// Allow [`ConversationController::maybe_autoreply`] to contact the model.
    pub autoreply: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            autoreply: false,
        }
    }
}

fn autoreply_prompt(last_user_message: &str) -> String {
    format!(
        "The user has come back to this conversation. Their last message was:\n\
         \"{last_user_message}\"\n\
         Without waiting for a new question, pick up where you left off: summarize, \
         suggest a next step, or build on that message."
    )
}

/// Owns the conversation for one session and applies every command to it,
/// keeping the snapshot in step.
pub struct ConversationController<G> {
    store: MemoryStore,
    generator: G,
    options: ControllerOptions,
    conversation: Conversation,
    state: SessionState,
    autoreply_checked: bool,
}

impl<G: ReplyGenerator> ConversationController<G> {
    pub fn new(store: MemoryStore, generator: G, options: ControllerOptions) -> Self {
        Self {
            store,
            generator,
            options,
            conversation: Conversation::new(),
            state: SessionState::Uninitialized,
            autoreply_checked: false,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Loads the snapshot, greeting the user when there is nothing to resume.
    pub fn start_session(&mut self) -> &Conversation {
        self.conversation = self.store.load();
        self.state = SessionState::Loaded;
        self.autoreply_checked = false;

        if self.conversation.is_empty() {
            debug!("starting a fresh conversation");
            self.conversation
                .push(Message::greeting(self.options.greeting.clone()));
            self.persist();
        } else {
            info!(
                messages = self.conversation.len(),
                "resumed saved conversation"
            );
        }

        &self.conversation
    }

    /// Appends `text` and the model's answer to it. Blank input is ignored.
    ///
    /// Returns whether a turn took place.
    pub async fn submit_user_message(&mut self, text: &str) -> Result<bool, SessionError> {
        self.ensure_loaded()?;

        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        self.conversation.push(Message::user(text));
        let reply = self.generator.generate(text, &self.conversation).await;
        self.conversation.push(Message::assistant(reply));
        self.persist();

        Ok(true)
    }

    /// Asks the model for an unsolicited follow-up on the last user message.
    ///
    /// Runs at most once per loaded session, only when enabled, and never
    /// right after another autoreply. Returns whether a message was added.
    pub async fn maybe_autoreply(&mut self) -> Result<bool, SessionError> {
        self.ensure_loaded()?;

        if !self.options.autoreply || self.autoreply_checked {
            return Ok(false);
        }
        self.autoreply_checked = true;

        if self.conversation.last().is_none_or(Message::is_autoreply) {
            debug!("skipping autoreply: last message is already one");
            return Ok(false);
        }

        let Some(last_user_message) = self.conversation.last_user_message() else {
            debug!("skipping autoreply: nothing from the user yet");
            return Ok(false);
        };

        let prompt = autoreply_prompt(last_user_message.content());
        let reply = self.generator.generate(&prompt, &self.conversation).await;
        self.conversation.push(Message::autoreply(reply));
        self.persist();
        info!("added autoreply to resumed conversation");

        Ok(true)
    }

    /// Forgets the conversation in memory and on disk. The session stays
    /// closed until [`Self::start_session`] is called again.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.store.clear();
        self.state = SessionState::Cleared;
        info!("conversation cleared");
    }

    fn ensure_loaded(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Loaded => Ok(()),
            SessionState::Uninitialized => Err(SessionError::NotStarted),
            SessionState::Cleared => Err(SessionError::Cleared),
        }
    }

    fn persist(&self) {
        self.store.save(&self.conversation);
    }
}

//! Chat flow
//!
//! A [`ChatSession`] keeps the conversation transcript. While mounted it
//! listens on the analysis bus and posts every analysis result into the
//! conversation as a caring AI message, including the most recent result
//! published before it was mounted.

use std::sync::Arc;

use depresso_communication::{ChatMessage, ChatRole, Mood, TextGenerator};
use depresso_core::{thread_safe_vec, AnalysisBus, AnalysisEvent, Subscription, ThreadSafeVec};

/// Opening message from the assistant.
pub const GREETING: &str = "Hello! I'm your gentle AI companion. Like a caring friend who \
understands the language of hearts, I'm here to listen and support you. Your feelings matter, \
and you're not alone. How is your heart today? 🌸";

/// System notice shown under the greeting.
pub const WELCOME: &str = "🌸 Welcome! You are connected to the backend. Share how you feel today.";

/// System notice shown when no reply could be produced.
pub const CONNECTION_ISSUE: &str = "Connection issue. Please try again.";

/// Consumer side of the analysis bus
pub struct ChatSession {
    transcript: ThreadSafeVec<ChatMessage>,
    generator: Arc<dyn TextGenerator>,
    subscription: Subscription,
}

impl ChatSession {
    /// Seed the transcript and start listening on `bus`.
    ///
    /// A result already retained by the bus is appended before this returns.
    pub fn mount(bus: &AnalysisBus, generator: Arc<dyn TextGenerator>) -> Self {
        let transcript = thread_safe_vec();
        {
            let mut messages = transcript.lock();
            messages.push(ChatMessage::new(ChatRole::Ai, GREETING, Some(Mood::Happy)));
            messages.push(ChatMessage::new(ChatRole::System, WELCOME, Some(Mood::Neutral)));
        }

        let sink = Arc::clone(&transcript);
        let subscription = bus.subscribe(move |event: AnalysisEvent| {
            tracing::debug!("Chat received {}", event.description());
            sink.lock().push(ChatMessage::new(
                ChatRole::Ai,
                event.chat_text(),
                Some(Mood::Caring),
            ));
        });

        Self {
            transcript,
            generator,
            subscription,
        }
    }

    /// Snapshot of the conversation so far
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.transcript.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.lock().is_empty()
    }

    /// Post a user message and append the reply.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the
    /// appended reply: the generated text, the intent reply when generation
    /// came back empty, or [`CONNECTION_ISSUE`] on failure.
    pub async fn send_message(&self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        self.push(ChatMessage::new(ChatRole::User, text, None));

        let reply = match self.generator.generate(text).await {
            Ok(reply) if !reply.is_empty() => Ok(reply),
            Ok(_) => self.generator.send_intent(text).await,
            Err(e) => Err(e),
        };

        let message = match reply {
            Ok(reply) => ChatMessage::new(ChatRole::Ai, reply, Some(Mood::Caring)),
            Err(e) => {
                tracing::warn!("Chat reply failed: {}", e);
                ChatMessage::new(ChatRole::System, CONNECTION_ISSUE, Some(Mood::Neutral))
            }
        };
        self.push(message.clone());
        Some(message)
    }

    /// Stop listening on the bus
    pub fn unmount(self) {
        self.subscription.unsubscribe();
    }

    fn push(&self, message: ChatMessage) {
        self.transcript.lock().push(message);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if self.subscription.unsubscribe() {
            tracing::debug!("Chat session {} unmounted", self.subscription.id());
        }
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("messages", &self.len())
            .field("subscription", &self.subscription)
            .finish()
    }
}

mod message;
mod orchestrator;
mod prompts;
mod store;

pub use message::{Message, Role};
pub use orchestrator::{
    ChatError, ChatTurnReply, ChatTurnRequest, ConversationOrchestrator, ErrorCategory,
};
pub use prompts::{SOURCE_ACKNOWLEDGEMENT, seed_messages};
pub use store::{Session, SessionStore};

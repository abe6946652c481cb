//! # depressoAssist Communication
//!
//! Talks to the analysis and chat backends and the peer-support platform:
//! - [`analysis`]: multipart media uploads, chunked uploads, result lookup
//! - [`chat`]: text generation and intent replies over HTTP
//! - [`websocket`]: live chat socket with reconnect and typed dispatch
//! - [`digest`]: normalization of the analysis payload shapes
//! - [`media`]: media files and upload validation
//! - [`social`]: peer-support feed, conversations and matching
//!
//! The page flows depend on the [`AnalysisBackend`] and [`TextGenerator`]
//! traits rather than the concrete clients.

pub mod analysis;
pub mod chat;
pub mod digest;
mod http;
pub mod media;
pub mod message;
pub mod social;
pub mod websocket;

pub use analysis::{
    AnalysisBackend, AnalysisClient, AnalysisUpload, ChunkedUploads, DetailedAnalysis, RiskLevel,
};
pub use chat::{ChatClient, TextGenerator};
pub use digest::AnalysisDigest;
pub use media::MediaFile;
pub use message::{ChatMessage, ChatRole, Mood};
pub use social::{
    Comment, Conversation, ConversationKind, PeerMatch, PeerMessage, Post, SenderType,
    SocialClient, UserType,
};
pub use websocket::{ChatSocket, SocketEvent};

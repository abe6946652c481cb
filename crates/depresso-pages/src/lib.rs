//! # depressoAssist Pages
//!
//! Headless renditions of the application pages:
//! - [`upload`]: queue media, analyse it and publish the result
//! - [`chat`]: the conversation, fed by the analysis bus
//! - [`host`]: navigation and cross-window "open chat" requests
//!
//! The pages share one [`depresso_core::AnalysisBus`], handed to each of them
//! at construction.

pub mod chat;
pub mod host;
pub mod upload;

pub use chat::ChatSession;
pub use host::{HostBridge, View};
pub use upload::{UploadOutcome, UploadPage};

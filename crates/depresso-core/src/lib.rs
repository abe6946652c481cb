//! # depressoAssist Core
//!
//! Core types and utilities shared by every depressoAssist crate.
//! Provides the replaying event bus that carries analysis results from the
//! upload flow to the chat flow, the event definitions, and the unified
//! error type.

pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{ConnectionError, Error, Result, UploadError};

// Re-export event bus for convenience
pub use event_bus::{AnalysisBus, AnalysisEvent, AnalysisSource, EventBus, Subscription, SubscriptionId};

pub use types::{thread_safe, thread_safe_vec, ThreadSafe, ThreadSafeVec};

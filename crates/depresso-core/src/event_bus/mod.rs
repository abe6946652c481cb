//! # Event Bus Module
//!
//! Decouples producers of analysis results (the upload flow) from consumers
//! (the chat flow) without requiring either to exist while the other runs.
//!
//! ## Overview
//!
//! - Publishers emit events without knowing subscribers
//! - Every publish overwrites a single retained event
//! - A new subscriber is handed the retained event before anything else
//! - Subscriber panics are contained per callback
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depresso_core::event_bus::{AnalysisBus, AnalysisEvent, AnalysisSource};
//!
//! let bus = AnalysisBus::new();
//!
//! // Publish before anyone listens
//! bus.publish(AnalysisEvent::new(AnalysisSource::Image, Some("Diagnosis: calm".into()), None));
//!
//! // A late subscriber still sees the last result, synchronously
//! let subscription = bus.subscribe(|event| println!("{}", event.chat_text()));
//!
//! // Stop listening
//! subscription.unsubscribe();
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;

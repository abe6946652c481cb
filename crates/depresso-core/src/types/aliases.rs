//! Type aliases for commonly used shared-state types.
//!
//! Pages share their transcripts and queues with bus callbacks that may run
//! on any thread, so everything here is `Send + Sync` and built on
//! `parking_lot` locks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depresso_core::types::*;
//!
//! // Instead of: Arc<Mutex<Vec<String>>>
//! let transcript: ThreadSafeVec<String> = thread_safe_vec();
//! transcript.lock().push("hello".to_string());
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex`, which does not poison when a holder panics.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe vector for cross-thread collection management.
pub type ThreadSafeVec<T> = Arc<Mutex<Vec<T>>>;

/// Create a new `ThreadSafe<T>` from a value.
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new empty `ThreadSafeVec<T>`.
pub fn thread_safe_vec<T>() -> ThreadSafeVec<T> {
    Arc::new(Mutex::new(Vec::new()))
}

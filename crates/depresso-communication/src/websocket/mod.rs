//! Live chat socket
//!
//! [`ChatSocket`] keeps one WebSocket to the chat backend open, turns the
//! JSON frames it receives into [`SocketEvent`]s on a broadcast channel and
//! reconnects after unexpected closes.

mod client;
mod messages;

pub use client::ChatSocket;
pub use messages::SocketEvent;

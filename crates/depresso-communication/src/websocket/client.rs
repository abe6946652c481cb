use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use depresso_core::{AnalysisSource, ConnectionError, Result};
use depresso_settings::{endpoints, ChatSettings, Config};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, Mutex};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::messages::{ClientFrame, ServerFrame, SocketEvent};
use crate::message::Mood;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSender = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

const EVENT_CAPACITY: usize = 64;
const NORMAL_CLOSE: u16 = 1000;

struct Shared {
    url: String,
    settings: ChatSettings,
    sender: Mutex<Option<WsSender>>,
    connected: AtomicBool,
    /// Set by `disconnect`; stops the reconnect loop
    closing: AtomicBool,
    events: broadcast::Sender<SocketEvent>,
}

/// WebSocket client for the chat backend
///
/// Cloning yields another handle to the same socket.
#[derive(Clone)]
pub struct ChatSocket {
    shared: Arc<Shared>,
}

impl ChatSocket {
    /// Socket for the configured chat endpoint
    pub fn new(config: &Config) -> Self {
        Self::with_url(
            config.build_websocket_url(endpoints::chat::WEBSOCKET),
            config.chat.clone(),
        )
    }

    /// Socket for an explicit URL
    pub fn with_url(url: impl Into<String>, settings: ChatSettings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                settings,
                sender: Mutex::new(None),
                connected: AtomicBool::new(false),
                closing: AtomicBool::new(false),
                events,
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.shared.url
    }

    /// Receive socket events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SocketEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Open the socket and start reading frames.
    ///
    /// Fails with [`ConnectionError::ConnectionTimeout`] if the handshake
    /// does not finish within `connect_timeout_ms`.
    pub async fn connect(&self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.shared.closing.store(false, Ordering::SeqCst);
        let reader = self.shared.open().await?;
        tokio::spawn(Arc::clone(&self.shared).supervise(reader));
        Ok(())
    }

    /// Send a chat message
    pub async fn send_message(&self, content: &str, mood: Option<Mood>) -> Result<()> {
        self.shared
            .send(&ClientFrame::ChatMessage {
                content,
                mood,
                timestamp: chrono::Utc::now().to_rfc3339(),
            })
            .await
    }

    /// Ask the backend to analyse an uploaded file
    pub async fn request_analysis(&self, file_id: &str, file_type: AnalysisSource) -> Result<()> {
        self.shared
            .send(&ClientFrame::AnalysisRequest { file_id, file_type })
            .await
    }

    /// Close the socket normally. No reconnect follows.
    pub async fn disconnect(&self) {
        self.shared.closing.store(true, Ordering::SeqCst);
        self.shared.close().await;
    }
}

impl std::fmt::Debug for ChatSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSocket")
            .field("url", &self.shared.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Shared {
    async fn open(&self) -> Result<WsReader> {
        let timeout_ms = self.settings.connect_timeout_ms;
        let handshake = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            connect_async(self.url.as_str()),
        )
        .await;

        let (stream, _) = match handshake {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                return Err(ConnectionError::WebSocketError {
                    reason: e.to_string(),
                }
                .into())
            }
            Err(_) => return Err(ConnectionError::ConnectionTimeout { timeout_ms }.into()),
        };

        let (write, read) = stream.split();
        *self.sender.lock().await = Some(write);
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!("Connected to chat backend at {}", self.url);
        self.emit(SocketEvent::Connection(true));
        Ok(read)
    }

    /// Read until the socket closes, reconnecting after unexpected closes
    async fn supervise(self: Arc<Self>, mut reader: WsReader) {
        loop {
            let close_code = self.pump(&mut reader).await;

            self.sender.lock().await.take();
            self.connected.store(false, Ordering::SeqCst);
            tracing::info!("Disconnected from chat backend (code {:?})", close_code);
            self.emit(SocketEvent::Connection(false));

            if close_code == Some(NORMAL_CLOSE) || self.closing.load(Ordering::SeqCst) {
                return;
            }

            reader = loop {
                tokio::time::sleep(Duration::from_millis(self.settings.reconnect_delay_ms)).await;
                if self.closing.load(Ordering::SeqCst) {
                    return;
                }
                tracing::debug!("Attempting to reconnect to {}", self.url);
                match self.open().await {
                    Ok(reader) => break reader,
                    Err(e) => tracing::debug!("Reconnect failed: {}", e),
                }
            };

            // disconnect() may have raced the reconnect
            if self.closing.load(Ordering::SeqCst) {
                self.close().await;
            }
        }
    }

    /// Dispatch frames until the stream ends; returns the peer's close code
    async fn pump(&self, reader: &mut WsReader) -> Option<u16> {
        let mut close_code = None;
        while let Some(frame) = reader.next().await {
            match frame {
                Ok(Message::Text(text)) => self.dispatch(&text),
                Ok(Message::Close(frame)) => {
                    close_code = Some(frame.map(|f| u16::from(f.code)).unwrap_or(1005));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Chat socket read failed: {}", e);
                    break;
                }
            }
        }
        close_code
    }

    fn dispatch(&self, text: &str) {
        match ServerFrame::parse(text) {
            Ok(frame) => {
                if let Some(event) = frame.into_event() {
                    tracing::debug!("Chat socket event: {:?}", event);
                    self.emit(event);
                }
            }
            Err(e) => tracing::warn!("Dropping unparseable chat frame: {}", e),
        }
    }

    fn emit(&self, event: SocketEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    async fn send(&self, frame: &ClientFrame<'_>) -> Result<()> {
        let text = serde_json::to_string(frame)?;
        let mut guard = self.sender.lock().await;
        let sender = guard.as_mut().ok_or(ConnectionError::NotConnected)?;
        sender.send(Message::Text(text)).await.map_err(|e| {
            ConnectionError::WebSocketError {
                reason: e.to_string(),
            }
            .into()
        })
    }

    async fn close(&self) {
        let sender = self.sender.lock().await.take();
        self.connected.store(false, Ordering::SeqCst);
        if let Some(mut sender) = sender {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            };
            if let Err(e) = sender.send(Message::Close(Some(frame))).await {
                tracing::debug!("Close handshake failed: {}", e);
            }
        }
    }
}

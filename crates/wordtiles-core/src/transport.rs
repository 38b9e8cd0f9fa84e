//! WebSocket transport to the game server.
//!
//! The socket lives on a background thread; the caller sends text frames and
//! polls for [`TransportEvent`]s from its own loop, so no engine call blocks.

use crate::protocol::ServerMessage;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from the transport thread
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message(ServerMessage),
    Error { message: String },
}

/// Parse a text frame, logging and skipping anything malformed.
pub fn parse_server_message(text: &str) -> Option<ServerMessage> {
    match ServerMessage::from_json(text) {
        Ok(msg) => Some(msg),
        Err(e) => {
            log::warn!("Failed to parse server message: {} ({})", text, e);
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use crate::error::{EngineError, EngineResult};
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};
    use url::Url;

    enum WsCommand {
        Send(String),
        Close,
    }

    /// WebSocket client for native platforms.
    pub struct NativeWebSocket {
        state: ConnectionState,
        events: Vec<TransportEvent>,
        cmd_tx: Option<Sender<WsCommand>>,
        event_rx: Option<Receiver<TransportEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl NativeWebSocket {
        /// Client that is not yet connected.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Start connecting to `url` on a background thread.
        pub fn connect(&mut self, url: &str) -> EngineResult<()> {
            if self.cmd_tx.is_some() {
                return Err(EngineError::Transport("Already connected".to_string()));
            }
            let parsed = Url::parse(url).map_err(|e| EngineError::Transport(format!("Invalid URL: {}", e)))?;
            if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
                return Err(EngineError::Transport(format!(
                    "Invalid WebSocket URL scheme: {}",
                    parsed.scheme()
                )));
            }

            self.state = ConnectionState::Connecting;
            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<TransportEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || {
                log::info!("Transport thread: connecting to {}", url);
                let (mut socket, response) = match connect(&url) {
                    Ok(ok) => ok,
                    Err(e) => {
                        log::error!("WebSocket connection failed: {}", e);
                        let _ = event_tx.send(TransportEvent::Error {
                            message: format!("Connection failed: {}", e),
                        });
                        return;
                    }
                };
                log::info!("WebSocket connected, status: {}", response.status());
                let _ = event_tx.send(TransportEvent::Connected);

                match socket.get_mut() {
                    tungstenite::stream::MaybeTlsStream::Plain(tcp) => {
                        let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
                        let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
                    }
                    #[allow(unreachable_patterns)]
                    _ => log::debug!("Non-plain stream, relying on default timeouts"),
                }

                loop {
                    match cmd_rx.try_recv() {
                        Ok(WsCommand::Send(msg)) => {
                            if let Err(e) = socket.send(Message::Text(msg)) {
                                log::error!("WebSocket send error: {}", e);
                                break;
                            }
                        }
                        Ok(WsCommand::Close) => {
                            let _ = socket.close(None);
                            break;
                        }
                        Err(TryRecvError::Disconnected) => break,
                        Err(TryRecvError::Empty) => {}
                    }

                    match socket.read() {
                        Ok(Message::Text(txt)) => {
                            if let Some(msg) = parse_server_message(&txt) {
                                let _ = event_tx.send(TransportEvent::Message(msg));
                            }
                        }
                        Ok(Message::Ping(data)) => {
                            let _ = socket.send(Message::Pong(data));
                        }
                        Ok(Message::Close(_)) => {
                            log::info!("WebSocket received close frame");
                            break;
                        }
                        Ok(_) => {}
                        Err(tungstenite::Error::Io(ref e))
                            if e.kind() == std::io::ErrorKind::WouldBlock
                                || e.kind() == std::io::ErrorKind::TimedOut => {}
                        Err(e) => {
                            log::error!("WebSocket read error: {}", e);
                            break;
                        }
                    }
                }

                log::info!("Transport thread exiting");
                let _ = event_tx.send(TransportEvent::Disconnected);
            });

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        /// Close the connection and stop the worker thread.
        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Queue a text frame.
        pub fn send(&self, text: &str) -> EngineResult<()> {
            let tx = self
                .cmd_tx
                .as_ref()
                .ok_or_else(|| EngineError::Transport("Not connected".to_string()))?;
            tx.send(WsCommand::Send(text.to_string()))
                .map_err(|e| EngineError::Transport(format!("Send failed: {}", e)))
        }

        /// Drain pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<TransportEvent> {
            if let Some(rx) = &self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        TransportEvent::Connected => self.state = ConnectionState::Connected,
                        TransportEvent::Disconnected => self.state = ConnectionState::Disconnected,
                        TransportEvent::Error { .. } => self.state = ConnectionState::Error,
                        TransportEvent::Message(_) => {}
                    }
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        /// Current connection state.
        pub fn state(&self) -> ConnectionState {
            self.state
        }

        /// True while the socket is open.
        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::NativeWebSocket;

//! Native WebSocket client.
//!
//! The socket lives on a background thread; frames and connection changes
//! are handed to the owning thread through a channel and collected with
//! [`NativeWebSocket::poll_events`].

use super::{ConnectionState, Result, SyncError, SyncEvent, encode_join, preview};
use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket, connect};
use url::Url;

/// How long a read blocks before queued sends get a turn.
const READ_POLL: Duration = Duration::from_millis(50);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

enum Outbound {
    Text(String),
    Close,
}

/// Whether the socket thread keeps going.
enum Step {
    Continue,
    Stop,
}

/// Thread-backed WebSocket connection to a room channel.
pub struct NativeWebSocket {
    state: ConnectionState,
    outbound: Option<Sender<Outbound>>,
    inbound: Option<Receiver<SyncEvent>>,
    worker: Option<JoinHandle<()>>,
}

impl NativeWebSocket {
    /// Create a new disconnected client.
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            outbound: None,
            inbound: None,
            worker: None,
        }
    }

    /// Connect to `url` without joining a room. The connection is
    /// established in the background; watch for [`SyncEvent::Connected`].
    pub fn connect(&mut self, url: &str) -> Result<()> {
        self.start(url, None)
    }

    /// Connect to `url` and join `room_id` as soon as the socket opens, before
    /// any queued message goes out.
    pub fn connect_room(&mut self, url: &str, room_id: &str) -> Result<()> {
        let join = encode_join(room_id)?;
        self.start(url, Some(join))
    }

    fn start(&mut self, url: &str, join: Option<String>) -> Result<()> {
        if self.outbound.is_some() {
            return Err(SyncError::AlreadyConnected);
        }

        let parsed = Url::parse(url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(SyncError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        let (out_tx, out_rx) = channel();
        let (in_tx, in_rx) = channel();
        let url = url.to_string();
        let worker = thread::spawn(move || run_socket(&url, join, &out_rx, &in_tx));

        self.state = ConnectionState::Connecting;
        self.outbound = Some(out_tx);
        self.inbound = Some(in_rx);
        self.worker = Some(worker);
        Ok(())
    }

    /// Close the connection. Messages already queued are sent first.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.outbound.take() {
            let _ = tx.send(Outbound::Close);
        }
        self.inbound = None;
        self.worker = None;
        self.state = ConnectionState::Disconnected;
    }

    /// Queue a text frame.
    pub fn send(&self, text: &str) -> Result<()> {
        let tx = self.outbound.as_ref().ok_or(SyncError::NotConnected)?;
        tx.send(Outbound::Text(text.to_string()))
            .map_err(|e| SyncError::SendFailed(e.to_string()))
    }

    /// Events received since the last poll. Never blocks.
    pub fn poll_events(&mut self) -> Vec<SyncEvent> {
        let Some(rx) = &self.inbound else {
            return Vec::new();
        };

        let events: Vec<SyncEvent> = rx.try_iter().collect();
        for event in &events {
            match event {
                SyncEvent::Connected => self.state = ConnectionState::Connected,
                SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                SyncEvent::Error { .. } => self.state = ConnectionState::Error,
                SyncEvent::Message(_) => {}
            }
        }
        events
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

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

fn run_socket(
    url: &str,
    join: Option<String>,
    outbound: &Receiver<Outbound>,
    events: &Sender<SyncEvent>,
) {
    log::info!("Room socket connecting to {url}");

    let mut socket = match connect(url) {
        Ok((socket, response)) => {
            log::info!("Room socket open ({})", response.status());
            socket
        }
        Err(e) => {
            log::error!("Room socket connection failed: {e}");
            let _ = events.send(SyncEvent::Error {
                message: format!("connection failed: {e}"),
            });
            return;
        }
    };

    if let Some(tcp) = tcp_stream(&socket) {
        let _ = tcp.set_read_timeout(Some(READ_POLL));
        let _ = tcp.set_write_timeout(Some(WRITE_TIMEOUT));
    }

    if let Some(join) = join {
        if let Err(e) = socket.send(Message::Text(join)) {
            log::error!("Room join failed: {e}");
            let _ = events.send(SyncEvent::Error {
                message: format!("join failed: {e}"),
            });
            return;
        }
    }
    let _ = events.send(SyncEvent::Connected);

    loop {
        if let Step::Stop = flush_outbound(&mut socket, outbound) {
            break;
        }
        if let Step::Stop = read_frame(&mut socket, events) {
            break;
        }
    }

    log::info!("Room socket closed");
    let _ = events.send(SyncEvent::Disconnected);
}

/// The TCP stream under a plain or TLS socket.
fn tcp_stream(socket: &Socket) -> Option<&TcpStream> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(tcp) => Some(tcp),
        MaybeTlsStream::Rustls(tls) => Some(tls.get_ref()),
        _ => None,
    }
}

fn flush_outbound(socket: &mut Socket, outbound: &Receiver<Outbound>) -> Step {
    loop {
        match outbound.try_recv() {
            Ok(Outbound::Text(text)) => {
                log::debug!("Room socket sending: {}", preview(&text));
                if let Err(e) = socket.send(Message::Text(text)) {
                    log::error!("Room socket send failed: {e}");
                    return Step::Stop;
                }
            }
            Ok(Outbound::Close) | Err(TryRecvError::Disconnected) => {
                let _ = socket.close(None);
                return Step::Stop;
            }
            Err(TryRecvError::Empty) => return Step::Continue,
        }
    }
}

fn read_frame(socket: &mut Socket, events: &Sender<SyncEvent>) -> Step {
    match socket.read() {
        Ok(Message::Text(text)) => {
            log::debug!("Room socket received: {}", preview(&text));
            if events.send(SyncEvent::Message(text)).is_err() {
                return Step::Stop;
            }
            Step::Continue
        }
        Ok(Message::Ping(data)) => {
            let _ = socket.send(Message::Pong(data));
            Step::Continue
        }
        Ok(Message::Close(_)) => Step::Stop,
        Ok(_) => Step::Continue,
        Err(tungstenite::Error::Io(e))
            if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
        {
            Step::Continue
        }
        Err(e) => {
            log::error!("Room socket read failed: {e}");
            Step::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_websocket_scheme() {
        let mut ws = NativeWebSocket::new();
        assert!(matches!(
            ws.connect("http://localhost:8080"),
            Err(SyncError::UnsupportedScheme(scheme)) if scheme == "http"
        ));
        assert!(matches!(ws.connect_room("not a url", "r"), Err(SyncError::InvalidUrl(_))));
        assert_eq!(ws.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_requires_connection() {
        let ws = NativeWebSocket::new();
        assert!(matches!(ws.send("hello"), Err(SyncError::NotConnected)));
    }

    #[test]
    fn test_poll_without_connection_is_empty() {
        let mut ws = NativeWebSocket::default();
        assert!(ws.poll_events().is_empty());
        assert!(!ws.is_connected());
    }

    #[test]
    fn test_unreachable_server_reports_error() {
        let mut ws = NativeWebSocket::new();
        ws.connect("ws://127.0.0.1:9").unwrap();
        assert_eq!(ws.state(), ConnectionState::Connecting);
        assert!(matches!(ws.connect("ws://127.0.0.1:9"), Err(SyncError::AlreadyConnected)));

        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.extend(ws.poll_events());
            if !seen.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        assert!(matches!(seen.as_slice(), [SyncEvent::Error { .. }]));
        assert_eq!(ws.state(), ConnectionState::Error);
    }

    #[test]
    fn test_wss_reaches_tls_connect() {
        let mut ws = NativeWebSocket::new();
        ws.connect("wss://127.0.0.1:9").unwrap();

        let mut seen = Vec::new();
        for _ in 0..100 {
            seen.extend(ws.poll_events());
            if !seen.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }
        // Refused at the TCP level rather than for missing TLS support.
        match seen.as_slice() {
            [SyncEvent::Error { message }] => assert!(!message.contains("not compiled")),
            other => panic!("unexpected events: {other:?}"),
        }
    }
}

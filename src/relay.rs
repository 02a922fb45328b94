use crate::error::{Result, TerminalError};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, MessageEvent, WebSocket};

/// One frame on the wire: `{"event": "...", "data": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// outbound, the raw line as typed
    #[serde(rename = "command")]
    Command(String),
    #[serde(rename = "output")]
    Output(String),
    /// the server's shell moved, data is the new path
    #[serde(rename = "dirChangeFound")]
    DirChangeFound(String),
}

impl ServerEvent {
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// Whatever carries frames to the server.
pub trait RelayTransport {
    fn send(&mut self, frame: &str) -> Result<()>;
}

/// opens a transport for the given url
pub type Connector = Box<dyn Fn(&str) -> Result<Box<dyn RelayTransport>>>;

/// the one request we're waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub prompt_id: String,
    pub command: String,
    pub sent_at: DateTime<Utc>,
}

/// Forwards lines to a remote shell. At most one request is in flight; the
/// transport is opened on first use and reused afterwards.
pub struct RemoteRelay {
    url: String,
    timeout: Option<Duration>,
    connector: Option<Connector>,
    transport: Option<Box<dyn RelayTransport>>,
    pending: Option<PendingRequest>,
}

impl RemoteRelay {
    pub fn new(url: &str, timeout: Option<Duration>, connector: Connector) -> Self {
        Self {
            url: url.to_string(),
            timeout,
            connector: Some(connector),
            transport: None,
            pending: None,
        }
    }

    /// no way to reach a server, every dispatch fails
    pub fn offline(url: &str, timeout: Option<Duration>) -> Self {
        Self {
            url: url.to_string(),
            timeout,
            connector: None,
            transport: None,
            pending: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// Opens the transport unless it's already open.
    pub fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Ok(());
        }
        let connector = self
            .connector
            .as_ref()
            .ok_or_else(|| TerminalError::Relay("no relay transport configured".to_string()))?;
        let transport = connector(&self.url)?;
        info!("relay connected to {}", self.url);
        self.transport = Some(transport);
        Ok(())
    }

    /// Sends `command` and parks `prompt_id` in the pending slot. The slot
    /// stays empty when anything goes wrong.
    pub fn dispatch(&mut self, prompt_id: &str, command: &str, now: DateTime<Utc>) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(TerminalError::Relay(format!(
                "still waiting on '{}'",
                pending.command
            )));
        }
        self.connect()?;
        let frame = ServerEvent::Command(command.to_string()).encode()?;
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| TerminalError::Relay("relay not connected".to_string()))?;
        if let Err(e) = transport.send(&frame) {
            // drop it, next dispatch reconnects
            self.transport = None;
            return Err(e);
        }
        debug!("relay sent '{}' for prompt {}", command, prompt_id);
        self.pending = Some(PendingRequest {
            prompt_id: prompt_id.to_string(),
            command: command.to_string(),
            sent_at: now,
        });
        Ok(())
    }

    pub fn take_pending(&mut self) -> Option<PendingRequest> {
        self.pending.take()
    }

    /// true once the pending request has waited longer than the timeout
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        match (&self.pending, self.timeout) {
            (Some(pending), Some(timeout)) => now - pending.sent_at >= timeout,
            _ => false,
        }
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    /// forget the outstanding request, the connection stays up
    pub fn reset(&mut self) {
        if let Some(pending) = self.pending.take() {
            warn!("dropping pending relay request '{}'", pending.command);
        }
    }
}

/// Browser WebSocket. Frames sent before the socket opens are queued and
/// flushed from `onopen`.
pub struct WebSocketTransport {
    socket: WebSocket,
    queued: Rc<RefCell<Vec<String>>>,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

impl WebSocketTransport {
    /// `on_frame` gets every inbound text frame
    pub fn open(url: &str, mut on_frame: impl FnMut(String) + 'static) -> Result<Self> {
        let socket = WebSocket::new(url)
            .map_err(|e| TerminalError::Relay(format!("could not open {}: {:?}", url, e)))?;
        let queued: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));

        let on_open = {
            let socket = socket.clone();
            let queued = queued.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                for frame in queued.borrow_mut().drain(..) {
                    if let Err(e) = socket.send_with_str(&frame) {
                        warn!("queued frame not sent: {:?}", e);
                    }
                }
            })
        };
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |e: MessageEvent| {
            match e.data().as_string() {
                Some(text) => on_frame(text),
                None => debug!("ignoring non-text frame"),
            }
        });
        let on_error = {
            let url = url.to_string();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                warn!("websocket error on {}", url);
            })
        };

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            queued,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
        })
    }
}

impl RelayTransport for WebSocketTransport {
    fn send(&mut self, frame: &str) -> Result<()> {
        match self.socket.ready_state() {
            WebSocket::OPEN => self
                .socket
                .send_with_str(frame)
                .map_err(|e| TerminalError::Relay(format!("send failed: {:?}", e))),
            WebSocket::CONNECTING => {
                self.queued.borrow_mut().push(frame.to_string());
                Ok(())
            }
            _ => Err(TerminalError::Relay("socket is closed".to_string())),
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        let _ = self.socket.close();
    }
}

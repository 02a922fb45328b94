// browser terminal - prompt loop, tiny command set, fake filesystem in localStorage
// optionally hands lines to a remote shell over a websocket
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod customization;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod markup;
pub mod messages;
pub mod relay;
pub mod session;
pub mod storage;
pub mod vfs;

use chrono::Utc;
use config::{TerminalConfig, TerminalMode};
use context::TerminalContext;
use customization::{ColorSettings, Theme};
use diagnostics::BrowserMemoryProbe;
use gloo_timers::callback::Timeout;
use log::{debug, info, warn};
use relay::{Connector, RelayTransport, RemoteRelay, WebSocketTransport};
use serde::Serialize;
use session::PromptSession;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use storage::{LocalStore, MemoryStore, SharedStore};
use wasm_bindgen::prelude::*;

type SharedSession = Rc<RefCell<PromptSession>>;
type UpdateCallback = Rc<RefCell<Option<js_sys::Function>>>;

// main terminal handle - the page keeps one of these per terminal view
#[wasm_bindgen]
pub struct Terminal {
    session: SharedSession,
    on_update: UpdateCallback,
    timer: Rc<RefCell<Option<Timeout>>>,
}

// what customization() hands back
#[derive(Serialize)]
struct CustomizationView<'a> {
    theme: &'static str,
    colors: &'a ColorSettings,
}

fn notify(on_update: &UpdateCallback) {
    if let Some(callback) = on_update.borrow().as_ref() {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            warn!("update callback threw: {:?}", e);
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn read_config(raw: &JsValue) -> TerminalConfig {
    if raw.is_undefined() || raw.is_null() {
        return TerminalConfig::default();
    }
    let parsed = serde_wasm_bindgen::from_value::<TerminalConfig>(raw.clone())
        .map_err(|e| error::TerminalError::InvalidConfig(e.to_string()))
        .and_then(|config| config.validate().map(|_| config));
    match parsed {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            TerminalConfig::default()
        }
    }
}

fn open_store() -> SharedStore {
    match LocalStore::open() {
        Ok(store) => Rc::new(store),
        Err(e) => {
            warn!("{}, nothing will survive a reload", e);
            Rc::new(MemoryStore::new())
        }
    }
}

// Websocket frames go straight into the session. Weak so the socket
// closures don't keep a dropped terminal alive.
fn websocket_connector(session: Weak<RefCell<PromptSession>>, on_update: UpdateCallback) -> Connector {
    Box::new(move |url: &str| {
        let session = session.clone();
        let on_update = on_update.clone();
        let transport = WebSocketTransport::open(url, move |frame: String| {
            let Some(session) = session.upgrade() else {
                return;
            };
            let changed = match session.try_borrow_mut() {
                Ok(mut session) => session.receive_server_frame(&frame),
                Err(_) => {
                    warn!("session busy, frame dropped");
                    false
                }
            };
            if changed {
                notify(&on_update);
            }
        })?;
        Ok(Box::new(transport) as Box<dyn RelayTransport>)
    })
}

#[wasm_bindgen]
impl Terminal {
    /// `config` is an optional plain object, see `TerminalConfig`
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Terminal {
        logging::init(log::LevelFilter::Info);
        let config = read_config(&config);
        logging::init(config.level_filter());

        let url = config.server_url.clone();
        let timeout = config.relay_timeout();
        let ctx = TerminalContext::new(config, open_store(), Box::new(BrowserMemoryProbe));
        let session = Rc::new(RefCell::new(PromptSession::local(ctx)));
        let on_update: UpdateCallback = Rc::new(RefCell::new(None));

        let connector = websocket_connector(Rc::downgrade(&session), on_update.clone());
        session
            .borrow_mut()
            .set_relay(RemoteRelay::new(&url, timeout, connector));
        info!("terminal ready ({} mode)", session.borrow().mode());

        Terminal {
            session,
            on_update,
            timer: Rc::new(RefCell::new(None)),
        }
    }

    /// called with no arguments whenever the scrollback changes on its own
    pub fn set_update_callback(&self, callback: js_sys::Function) {
        *self.on_update.borrow_mut() = Some(callback);
    }

    pub fn submit(&self, prompt_id: &str, line: &str) -> bool {
        let submitted = self.session.borrow_mut().submit(prompt_id, line);
        if submitted && self.session.borrow().relay().pending().is_some() {
            self.schedule_relay_timeout();
        }
        submitted
    }

    // one timer per request, replacing the old one cancels it
    fn schedule_relay_timeout(&self) {
        let Some(ms) = self.session.borrow().context().config.relay_timeout_ms else {
            return;
        };
        let millis = u32::try_from(ms).unwrap_or(u32::MAX);
        let session = Rc::downgrade(&self.session);
        let on_update = self.on_update.clone();
        let timeout = Timeout::new(millis, move || {
            let Some(session) = session.upgrade() else {
                return;
            };
            let expired = session.borrow_mut().check_relay_timeout(Utc::now());
            if expired {
                notify(&on_update);
            }
        });
        *self.timer.borrow_mut() = Some(timeout);
        debug!("relay timeout armed for {}ms", millis);
    }

    /// scrollback as an array of plain objects
    pub fn prompts(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.session.borrow().prompts()).unwrap_or_else(|e| {
            warn!("prompts not serialised: {}", e);
            JsValue::NULL
        })
    }

    pub fn reset(&self) {
        self.timer.borrow_mut().take();
        self.session.borrow_mut().reset();
    }

    pub fn current_directory(&self) -> String {
        self.session.borrow().context().cwd.clone()
    }

    pub fn mode(&self) -> String {
        self.session.borrow().mode().to_string()
    }

    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: TerminalMode = mode.parse().map_err(js_error)?;
        self.timer.borrow_mut().take();
        self.session.borrow_mut().set_mode(mode);
        Ok(())
    }

    /// opens the websocket now instead of on the first server-mode line
    pub fn connect_relay(&self) -> Result<(), JsValue> {
        self.session.borrow_mut().relay_mut().connect().map_err(js_error)
    }

    /// for pages that run their own socket and pass frames in
    pub fn receive_server_event(&self, frame: &str) -> bool {
        self.session.borrow_mut().receive_server_frame(frame)
    }

    pub fn check_relay_timeout(&self) -> bool {
        self.session.borrow_mut().check_relay_timeout(Utc::now())
    }

    pub fn is_editor_visible(&self) -> bool {
        self.session.borrow().context().editor.visible
    }

    pub fn editor_filename(&self) -> String {
        self.session.borrow().context().editor.filename.clone()
    }

    pub fn editor_content(&self) -> String {
        self.session.borrow().context().editor.content.clone()
    }

    pub fn save_editor(&self, content: &str) -> bool {
        self.session.borrow_mut().context_mut().save_editor(content)
    }

    pub fn close_editor(&self) {
        self.session.borrow_mut().context_mut().close_editor();
    }

    /// `{ theme, colors: { TERMINAL_BACKGROUND_COLOR: ..., ... } }`
    pub fn customization(&self) -> JsValue {
        let session = self.session.borrow();
        let custom = &session.context().customization;
        let view = CustomizationView {
            theme: custom.theme().name(),
            colors: custom.colors(),
        };
        serde_wasm_bindgen::to_value(&view).unwrap_or_else(|e| {
            warn!("customization not serialised: {}", e);
            JsValue::NULL
        })
    }

    pub fn set_color(&self, key: &str, value: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .context_mut()
            .customization
            .set_color(key, value)
            .map_err(js_error)
    }

    pub fn apply_theme(&self, name: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .context_mut()
            .customization
            .apply_theme(name)
            .map_err(js_error)
    }

    pub fn themes(&self) -> JsValue {
        let names: Vec<&str> = Theme::ALL.iter().map(Theme::name).collect();
        serde_wasm_bindgen::to_value(&names).unwrap_or(JsValue::NULL)
    }

    /// the tree in its stored JSON form
    pub fn export_filesystem(&self) -> String {
        self.session.borrow().context().files.to_json()
    }

    pub fn import_filesystem(&self, json: &str) -> Result<(), JsValue> {
        self.session
            .borrow_mut()
            .context_mut()
            .files
            .replace_from_json(json)
            .map_err(js_error)
    }
}

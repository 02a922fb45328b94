use crate::command::{run_command, CommandRegistry, ReplyFormat, SpecialAction};
use crate::config::TerminalMode;
use crate::context::TerminalContext;
use crate::markup;
use crate::messages::WELCOME_MESSAGE;
use crate::relay::{RemoteRelay, ServerEvent};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

pub const RELAY_TIMEOUT_REPLY: &str = "Server did not respond in time.";

/// One line of scrollback: what was typed and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptInstance {
    pub id: String,
    pub command: String,
    pub reply: String,
    pub reply_format: ReplyFormat,
    /// cwd when the prompt was created
    pub current_dir: String,
    /// only the newest prompt takes input
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl PromptInstance {
    pub fn new(current_dir: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            command: String::new(),
            reply: String::new(),
            reply_format: ReplyFormat::Text,
            current_dir: current_dir.to_string(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// non-interactive banner line
    pub fn message(current_dir: &str, command: &str, reply: String, reply_format: ReplyFormat) -> Self {
        Self {
            command: command.to_string(),
            reply,
            reply_format,
            enabled: false,
            ..Self::new(current_dir)
        }
    }
}

/// The scrollback plus everything a submitted line can touch. Local lines
/// are answered before `submit` returns; server lines wait in the relay's
/// pending slot until an event (or the timeout) answers them.
pub struct PromptSession {
    prompts: Vec<PromptInstance>,
    ctx: TerminalContext,
    registry: CommandRegistry,
    relay: RemoteRelay,
}

impl PromptSession {
    pub fn new(mut ctx: TerminalContext, relay: RemoteRelay) -> Self {
        let registry = CommandRegistry::default_commands();
        ctx.set_command_names(registry.get_command_names());
        let mut session = Self {
            prompts: Vec::new(),
            ctx,
            registry,
            relay,
        };
        session.reset();
        session
    }

    /// no relay transport at all - server mode answers with the error
    pub fn local(ctx: TerminalContext) -> Self {
        let relay = RemoteRelay::offline(&ctx.config.server_url, ctx.config.relay_timeout());
        Self::new(ctx, relay)
    }

    pub fn prompts(&self) -> &[PromptInstance] {
        &self.prompts
    }

    /// the prompt currently taking input, if any
    pub fn active_prompt(&self) -> Option<&PromptInstance> {
        self.prompts.last().filter(|p| p.enabled)
    }

    pub fn context(&self) -> &TerminalContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut TerminalContext {
        &mut self.ctx
    }

    pub fn relay(&self) -> &RemoteRelay {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut RemoteRelay {
        &mut self.relay
    }

    pub fn set_relay(&mut self, relay: RemoteRelay) {
        self.relay = relay;
    }

    pub fn mode(&self) -> TerminalMode {
        self.ctx.config.mode
    }

    /// Switching drops any outstanding server request. If a prompt was left
    /// waiting on it, a fresh one takes over.
    pub fn set_mode(&mut self, mode: TerminalMode) {
        if self.ctx.config.mode == mode {
            return;
        }
        info!("terminal mode {} -> {}", self.ctx.config.mode, mode);
        self.ctx.config.mode = mode;
        self.relay.reset();
        if self.active_prompt().is_none() {
            self.advance();
        }
    }

    /// Banners, then one fresh prompt.
    pub fn reset(&mut self) {
        self.relay.reset();
        self.prompts.clear();
        let cwd = self.ctx.cwd.clone();
        self.prompts.push(PromptInstance::message(
            &cwd,
            "cat bio.md",
            markup::render_markdown(WELCOME_MESSAGE),
            ReplyFormat::Html,
        ));
        self.prompts.push(PromptInstance::message(
            &cwd,
            "",
            format!("Welcome to terminal: {}", self.mode()),
            ReplyFormat::Text,
        ));
        self.advance();
    }

    /// Runs `raw` on the prompt `prompt_id`. False, with nothing changed,
    /// for blank lines and for prompts that are gone or no longer enabled.
    pub fn submit(&mut self, prompt_id: &str, raw: &str) -> bool {
        let line = raw.trim();
        if line.is_empty() {
            return false;
        }
        let Some(idx) = self.prompts.iter().position(|p| p.id == prompt_id && p.enabled) else {
            debug!("submit to unknown or finished prompt {}", prompt_id);
            return false;
        };
        self.prompts[idx].command = line.to_string();

        match self.mode() {
            TerminalMode::Client => self.submit_local(idx, line),
            TerminalMode::Server => self.submit_remote(idx, line),
        }
        true
    }

    fn submit_local(&mut self, idx: usize, line: &str) {
        let Some(reply) = run_command(line, &mut self.ctx, &self.registry) else {
            return;
        };
        if reply.action == Some(SpecialAction::ClearScreen) {
            self.prompts.clear();
            self.advance();
            return;
        }
        let prompt = &mut self.prompts[idx];
        prompt.reply = reply.body;
        prompt.reply_format = reply.format;
        prompt.enabled = false;
        self.advance();
    }

    // the prompt stays disabled with no successor until the server answers
    fn submit_remote(&mut self, idx: usize, line: &str) {
        self.prompts[idx].enabled = false;
        let id = self.prompts[idx].id.clone();
        if let Err(e) = self.relay.dispatch(&id, line, Utc::now()) {
            warn!("relay dispatch failed: {}", e);
            let prompt = &mut self.prompts[idx];
            prompt.reply = e.to_string();
            prompt.reply_format = ReplyFormat::Text;
            self.advance();
        }
    }

    /// Applies one inbound server event. False when it was ignored.
    pub fn receive_server_event(&mut self, event: ServerEvent) -> bool {
        if self.mode() != TerminalMode::Server {
            debug!("ignoring server event in client mode: {:?}", event);
            return false;
        }
        match event {
            ServerEvent::Output(output) => {
                let Some(pending) = self.relay.take_pending() else {
                    debug!("output with nothing pending, dropped");
                    return false;
                };
                self.answer(&pending.prompt_id, output);
                true
            }
            ServerEvent::DirChangeFound(path) => {
                let Some(pending) = self.relay.take_pending() else {
                    debug!("dir change to {} with nothing pending, dropped", path);
                    return false;
                };
                self.ctx.cwd = path;
                if let Some(prompt) = self.prompts.iter_mut().find(|p| p.id == pending.prompt_id) {
                    prompt.enabled = false;
                }
                self.advance();
                true
            }
            ServerEvent::Command(_) => {
                warn!("server sent a command frame, ignored");
                false
            }
        }
    }

    /// raw text frame straight off the socket
    pub fn receive_server_frame(&mut self, frame: &str) -> bool {
        match ServerEvent::decode(frame) {
            Ok(event) => self.receive_server_event(event),
            Err(e) => {
                warn!("bad frame from server: {}", e);
                false
            }
        }
    }

    /// Gives up on a server request older than the configured timeout.
    pub fn check_relay_timeout(&mut self, now: DateTime<Utc>) -> bool {
        if self.mode() != TerminalMode::Server || !self.relay.expired(now) {
            return false;
        }
        let Some(pending) = self.relay.take_pending() else {
            return false;
        };
        warn!("no reply to '{}' in time", pending.command);
        self.answer(&pending.prompt_id, RELAY_TIMEOUT_REPLY.to_string());
        true
    }

    fn answer(&mut self, prompt_id: &str, reply: String) {
        match self.prompts.iter_mut().find(|p| p.id == prompt_id) {
            Some(prompt) => {
                prompt.reply = reply;
                prompt.reply_format = ReplyFormat::Text;
                prompt.enabled = false;
            }
            // cleared from under us, still need an input line
            None => debug!("answered prompt {} is gone", prompt_id),
        }
        self.advance();
    }

    fn advance(&mut self) {
        self.prompts.push(PromptInstance::new(&self.ctx.cwd));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerminalConfig;
    use crate::relay::tests::recording_relay;
    use chrono::Duration;

    fn active_id(session: &PromptSession) -> String {
        session.active_prompt().unwrap().id.clone()
    }

    fn server_session(fail: bool) -> (PromptSession, std::rc::Rc<std::cell::RefCell<Vec<String>>>) {
        let ctx = TerminalContext::with_config(TerminalConfig {
            mode: TerminalMode::Server,
            ..TerminalConfig::default()
        });
        let (relay, sent) = recording_relay(fail);
        (PromptSession::new(ctx, relay), sent)
    }

    #[test]
    fn test_reset_banners() {
        let session = PromptSession::local(TerminalContext::in_memory());
        let prompts = session.prompts();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0].command, "cat bio.md");
        assert_eq!(prompts[0].reply_format, ReplyFormat::Html);
        assert!(prompts[0].reply.starts_with("<h1>Welcome aboard!</h1>"));
        assert_eq!(prompts[1].reply, "Welcome to terminal: client");
        assert!(!prompts[0].enabled && !prompts[1].enabled);
        assert!(prompts[2].enabled);
    }

    #[test]
    fn test_local_submit_advances() {
        let mut session = PromptSession::local(TerminalContext::in_memory());
        let id = active_id(&session);
        assert!(session.submit(&id, "cd projects"));

        let prompts = session.prompts();
        assert_eq!(prompts.len(), 4);
        assert_eq!(prompts[2].command, "cd projects");
        assert_eq!(prompts[2].current_dir, "~");
        assert!(!prompts[2].enabled);
        // the new prompt sees the new directory
        assert_eq!(prompts[3].current_dir, "~/projects");
        assert!(prompts[3].enabled);
    }

    #[test]
    fn test_submit_to_stale_prompt() {
        let mut session = PromptSession::local(TerminalContext::in_memory());
        let first = active_id(&session);
        session.submit(&first, "pwd");
        assert!(!session.submit(&first, "pwd"));
        assert!(!session.submit("not-a-prompt", "pwd"));
        assert_eq!(session.prompts().len(), 4);
    }

    #[test]
    fn test_clear_leaves_one_prompt() {
        let mut session = PromptSession::local(TerminalContext::in_memory());
        let id = active_id(&session);
        session.submit(&id, "clear");
        assert_eq!(session.prompts().len(), 1);
        assert!(session.prompts()[0].enabled);
        assert_eq!(session.context().history, vec!["clear".to_string()]);
    }

    #[test]
    fn test_server_submit_waits_for_output() {
        let (mut session, sent) = server_session(false);
        let id = active_id(&session);
        assert!(session.submit(&id, "uname -a"));

        assert_eq!(sent.borrow().as_slice(), [r#"{"event":"command","data":"uname -a"}"#]);
        assert!(session.active_prompt().is_none());
        assert_eq!(session.prompts().last().unwrap().reply, "");
        // server lines aren't interpreted, so they don't reach history
        assert!(session.context().history.is_empty());

        assert!(session.receive_server_frame(r#"{"event":"output","data":"Linux box"}"#));
        let answered = session.prompts().iter().find(|p| p.id == id).unwrap();
        assert_eq!(answered.reply, "Linux box");
        assert!(session.active_prompt().is_some());
    }

    #[test]
    fn test_output_without_pending_is_ignored() {
        let (mut session, _sent) = server_session(false);
        let before = session.prompts().len();
        assert!(!session.receive_server_event(ServerEvent::Output("late".to_string())));
        assert_eq!(session.prompts().len(), before);
    }

    #[test]
    fn test_dir_change() {
        let (mut session, _sent) = server_session(false);
        let id = active_id(&session);
        session.submit(&id, "cd /var/log");
        assert!(session.receive_server_event(ServerEvent::DirChangeFound("/var/log".to_string())));
        assert_eq!(session.context().cwd, "/var/log");
        assert_eq!(session.active_prompt().unwrap().current_dir, "/var/log");
    }

    #[test]
    fn test_dir_change_without_pending_is_ignored() {
        let (mut session, _sent) = server_session(false);
        let before = session.prompts().to_vec();
        assert!(!session.receive_server_event(ServerEvent::DirChangeFound("/etc".to_string())));
        assert_eq!(session.context().cwd, "~");
        assert_eq!(session.prompts(), before.as_slice());
        assert_eq!(session.active_prompt().unwrap().current_dir, "~");
    }

    #[test]
    fn test_events_ignored_after_switch_to_client() {
        let (mut session, _sent) = server_session(false);
        let id = active_id(&session);
        session.submit(&id, "sleep 100");
        session.set_mode(TerminalMode::Client);
        // the stranded prompt got a successor
        assert!(session.active_prompt().is_some());
        assert!(session.relay().pending().is_none());

        let before = session.prompts().len();
        assert!(!session.receive_server_event(ServerEvent::Output("done".to_string())));
        assert_eq!(session.prompts().len(), before);
    }

    #[test]
    fn test_relay_timeout() {
        let (mut session, _sent) = server_session(false);
        let id = active_id(&session);
        session.submit(&id, "sleep 100");
        assert!(!session.check_relay_timeout(Utc::now()));
        assert!(session.check_relay_timeout(Utc::now() + Duration::seconds(31)));

        let answered = session.prompts().iter().find(|p| p.id == id).unwrap();
        assert_eq!(answered.reply, RELAY_TIMEOUT_REPLY);
        assert!(session.active_prompt().is_some());
    }

    #[test]
    fn test_send_failure_answers_immediately() {
        let (mut session, _sent) = server_session(true);
        let id = active_id(&session);
        session.submit(&id, "ls");
        let answered = session.prompts().iter().find(|p| p.id == id).unwrap();
        assert_eq!(answered.reply, "relay error: connection refused");
        assert!(session.active_prompt().is_some());
        assert!(session.relay().pending().is_none());
    }
}

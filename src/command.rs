use crate::context::TerminalContext;
use crate::markup;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    #[default]
    Text,
    Html,
}

/// things a handler needs the session to do beyond setting the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAction {
    ClearScreen,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub body: String,
    pub format: ReplyFormat,
    pub action: Option<SpecialAction>,
}

impl Reply {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: ReplyFormat::Text,
            action: None,
        }
    }

    /// `body` must already be safe to inject
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            format: ReplyFormat::Html,
            action: None,
        }
    }

    pub fn clear_screen() -> Self {
        Self {
            action: Some(SpecialAction::ClearScreen),
            ..Self::default()
        }
    }
}

/// Err holds the text shown to the user, nothing gets thrown past the prompt
pub type CommandResult = Result<Reply, String>;

/// A submitted line split into its verb and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub raw: String,
    pub verb: String,
    pub args: Vec<String>,
}

impl ParsedLine {
    /// None for blank input
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        let mut parts = raw.split_whitespace();
        let verb = parts.next()?.to_string();
        Some(Self {
            raw: raw.to_string(),
            verb,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// first argument - what `cd`, `cat`, `touch` and `vim` act on
    pub fn primary(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// every argument, space joined - `rm` looks for its flag in here
    pub fn compound(&self) -> String {
        self.args.join(" ")
    }
}

pub trait Command {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult;
}

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command + Send + Sync>>,
    order: Vec<String>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn register_command(&mut self, name: &str, cmd: Box<dyn Command + Send + Sync>) {
        if self.commands.insert(name.to_string(), cmd).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// exact, case-sensitive
    pub fn get(&self, name: &str) -> Option<&(dyn Command + Send + Sync)> {
        self.commands.get(name).map(|c| &**c)
    }

    /// registration order, which is the order `help` prints
    pub fn get_command_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn default_commands() -> Self {
        let mut reg = Self::new();
        reg.register_command("ls", Box::new(crate::commands::ls::LsCommand));
        reg.register_command("cd", Box::new(crate::commands::cd::CdCommand));
        reg.register_command("pwd", Box::new(crate::commands::pwd::PwdCommand));
        reg.register_command("clear", Box::new(crate::commands::clear::ClearCommand));
        reg.register_command("cat", Box::new(crate::commands::cat::CatCommand));
        reg.register_command("top", Box::new(crate::commands::top::TopCommand));
        reg.register_command("history", Box::new(crate::commands::history::HistoryCommand));
        reg.register_command("touch", Box::new(crate::commands::touch::TouchCommand));
        reg.register_command("vim", Box::new(crate::commands::vim::VimCommand));
        reg.register_command(
            "clearLocalStorage",
            Box::new(crate::commands::clear_local_storage::ClearLocalStorageCommand),
        );
        reg.register_command("rm", Box::new(crate::commands::rm::RmCommand));
        reg.register_command("help", Box::new(crate::commands::help::HelpCommand));
        reg
    }
}

/// Runs one line through the interpreter. Blank input is ignored entirely
/// (None, nothing recorded); anything else lands in history first, even when
/// the verb turns out to be unknown.
pub fn run_command(input: &str, ctx: &mut TerminalContext, registry: &CommandRegistry) -> Option<Reply> {
    let line = ParsedLine::parse(input)?;
    ctx.history.push(line.raw.clone());

    let Some(command) = registry.get(&line.verb) else {
        debug!("unknown verb '{}'", line.verb);
        return Some(Reply::html(markup::command_not_found(&line.raw)));
    };

    Some(command.execute(&line, ctx).unwrap_or_else(Reply::text))
}

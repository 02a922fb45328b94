use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;
use crate::markup;

/// help
pub struct HelpCommand;

impl Command for HelpCommand {
    fn execute(&self, _line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let names = ctx.command_names().join(" | ");
        Ok(Reply::html(markup::paragraph(&format!(
            "Need help? Try followings: {}",
            markup::code(&names)
        ))))
    }
}

use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;

/// pwd
/// Print the current directory, `~` based.
pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, _line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        Ok(Reply::text(ctx.cwd.clone()))
    }
}

use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;

/// history
/// Every non-blank line submitted this session, oldest first. Includes the
/// `history` call itself.
pub struct HistoryCommand;

impl Command for HistoryCommand {
    fn execute(&self, _line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        Ok(Reply::text(ctx.history.join("\n")))
    }
}

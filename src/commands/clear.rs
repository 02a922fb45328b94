use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;

/// clear
/// Wipes the screen; the session drops every prompt and starts a new one.
pub struct ClearCommand;

impl Command for ClearCommand {
    fn execute(&self, _line: &ParsedLine, _ctx: &mut TerminalContext) -> CommandResult {
        Ok(Reply::clear_screen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SpecialAction;
    use crate::commands::run;

    #[test]
    fn test_clear_asks_for_screen_wipe() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&ClearCommand, "clear", &mut ctx).unwrap();
        assert_eq!(reply.action, Some(SpecialAction::ClearScreen));
        assert!(reply.body.is_empty());
    }
}

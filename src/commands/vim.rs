use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;

/// vim FILE
/// Opens FILE from the current directory in the editor panel. The file
/// itself is only written once the page saves the buffer.
pub struct VimCommand;

impl Command for VimCommand {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let Some(name) = line.primary() else {
            return Err("Please provide a filename to start editing.".to_string());
        };
        ctx.open_editor(name);
        Ok(Reply::text(format!("Editing {}", name)))
    }
}

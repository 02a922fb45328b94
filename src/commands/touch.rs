use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;
use crate::vfs::is_file_name;

/// touch NAME
/// Creates an empty file, or a folder when NAME has no known extension.
/// An existing entry of the same name is replaced.
pub struct TouchCommand;

impl Command for TouchCommand {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let Some(name) = line.primary() else {
            return Err("Please provide a filename for touch command.".to_string());
        };
        let path = ctx.cwd_segments();
        if is_file_name(name) {
            ctx.files.add_file(name, "", &path);
            Ok(Reply::text(format!("Created file {}", name)))
        } else {
            ctx.files.add_folder(name, &path);
            Ok(Reply::text(format!("Created folder {}", name)))
        }
    }
}

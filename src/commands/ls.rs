use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;
use crate::markup;
use crate::vfs::VfsNode;

/// ls [DIR]
/// List the current directory, or DIR inside it.
pub struct LsCommand;

// one coloured span per entry, listing order, space separated
fn render_entries(entries: &[VfsNode], ctx: &TerminalContext) -> Reply {
    let spans: Vec<String> = entries
        .iter()
        .map(|entry| {
            let color = if entry.is_dir() {
                ctx.customization.ls_folder_color()
            } else {
                ctx.customization.ls_file_color()
            };
            markup::colored_span(entry.name(), color)
        })
        .collect();
    Reply::html(markup::paragraph(&spans.join(" ")))
}

impl Command for LsCommand {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let mut path = ctx.cwd_segments();
        let vfs = ctx.files.vfs();

        let Some(target) = line.primary() else {
            // cwd that no longer exists just lists the nearest directory above it
            return Ok(render_entries(vfs.resolve(&path).children(), ctx));
        };

        path.push(target.to_string());
        match vfs.resolve_exact(&path) {
            Some(node) if node.is_dir() => Ok(render_entries(node.children(), ctx)),
            // single file - just list the thing itself
            Some(node) => Ok(render_entries(std::slice::from_ref(node), ctx)),
            None => Err(format!("ls: cannot access '{}': No such file or directory", target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ReplyFormat;
    use crate::commands::run;

    #[test]
    fn test_ls_root() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&LsCommand, "ls", &mut ctx).unwrap();
        assert_eq!(reply.format, ReplyFormat::Html);
        assert_eq!(
            reply.body,
            "<p><span style=\"color: #dbff00;\">bio.md</span> \
             <span style=\"color: #007bff;\">projects</span> \
             <span style=\"color: #dbff00;\">secret_keys.pem</span></p>"
        );
    }

    #[test]
    fn test_ls_uses_current_directory() {
        let mut ctx = TerminalContext::in_memory();
        ctx.cwd = "~/projects".to_string();
        let reply = run(&LsCommand, "ls", &mut ctx).unwrap();
        assert!(reply.body.contains(">zip-diff-viewer.md</span>"));
        assert!(reply.body.contains(">Neat.md</span>"));
        assert!(!reply.body.contains("bio.md"));
    }

    #[test]
    fn test_ls_with_directory_argument() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&LsCommand, "ls projects", &mut ctx).unwrap();
        assert!(reply.body.contains(">Neat.md</span>"));
    }

    #[test]
    fn test_ls_missing_target() {
        let mut ctx = TerminalContext::in_memory();
        let err = run(&LsCommand, "ls nowhere", &mut ctx).unwrap_err();
        assert!(err.contains("No such file or directory"));
    }

    #[test]
    fn test_ls_colours_follow_customization() {
        let mut ctx = TerminalContext::in_memory();
        ctx.customization.set_color("TERMINAL_LS_FOLDER_COLOR", "#123456").unwrap();
        let reply = run(&LsCommand, "ls", &mut ctx).unwrap();
        assert!(reply.body.contains("<span style=\"color: #123456;\">projects</span>"));
    }

    #[test]
    fn test_ls_escapes_names() {
        let mut ctx = TerminalContext::in_memory();
        ctx.files.add_folder("<b>", &[] as &[&str]);
        let reply = run(&LsCommand, "ls", &mut ctx).unwrap();
        assert!(reply.body.contains(">&lt;b&gt;</span>"));
    }
}

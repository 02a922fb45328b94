use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;
use crate::vfs::{is_file_name, NodeKind};

/// rm FILE | rm -r FOLDER
pub struct RmCommand;

const USAGE: &str = "Proper usage of rm command is with rm filename | rm -r folder_name";

// is there a real entry of `kind` called `name`, here or anywhere else
fn exists(ctx: &TerminalContext, name: &str, kind: NodeKind) -> bool {
    let vfs = ctx.files.vfs();
    let here = vfs
        .resolve(&ctx.cwd_segments())
        .child(name)
        .map_or(false, |n| n.kind() == kind);
    here || vfs.find(name, kind).is_some()
}

impl Command for RmCommand {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let recursive = line.args.iter().any(|a| a == "-r");
        let names: Vec<&String> = line.args.iter().filter(|a| *a != "-r").collect();
        let name = match names.as_slice() {
            [name] => name.as_str(),
            _ => return Err(USAGE.to_string()),
        };

        let kind = if recursive { NodeKind::Directory } else { NodeKind::File };
        // the extension only guesses, a real entry of the right kind settles it
        match (kind, is_file_name(name)) {
            (NodeKind::Directory, true) if !exists(ctx, name, NodeKind::Directory) => {
                return Err(format!(
                    "File detected in command {} while using -r option, please remove option -r to delete a file",
                    line.raw
                ))
            }
            (NodeKind::File, false) if !exists(ctx, name, NodeKind::File) => {
                return Err(format!(
                    "Folder detected in command {}, please use option -r to delete a folder",
                    line.raw
                ))
            }
            _ => {}
        }

        // the current directory wins over a same-named entry elsewhere
        let path = ctx.cwd_segments();
        let removed = ctx.files.delete_in(&path, name, kind)
            || match kind {
                NodeKind::File => ctx.files.delete_file(name),
                NodeKind::Directory => ctx.files.delete_folder(name),
            };

        match (kind, removed) {
            (NodeKind::File, true) => Ok(Reply::text(format!("File {} successfully deleted!", name))),
            (NodeKind::Directory, true) => Ok(Reply::text(format!("Folder {} deleted successfully!", name))),
            (NodeKind::File, false) => Err(format!("No such file {} found!", name)),
            (NodeKind::Directory, false) => Err(format!("No such folder {} found!", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run;

    #[test]
    fn test_rm_file() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&RmCommand, "rm secret_keys.pem", &mut ctx).unwrap();
        assert_eq!(reply.body, "File secret_keys.pem successfully deleted!");
        assert!(ctx.files.vfs().root.child("secret_keys.pem").is_none());
    }

    #[test]
    fn test_rm_nested_file_from_root() {
        let mut ctx = TerminalContext::in_memory();
        run(&RmCommand, "rm Neat.md", &mut ctx).unwrap();
        assert!(ctx.files.vfs().resolve_exact(&["projects", "Neat.md"]).is_none());
    }

    #[test]
    fn test_rm_folder_flag_position() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&RmCommand, "rm projects -r", &mut ctx).unwrap();
        assert_eq!(reply.body, "Folder projects deleted successfully!");
        assert!(ctx.files.vfs().root.child("projects").is_none());
    }

    #[test]
    fn test_rm_prefers_current_directory() {
        let mut ctx = TerminalContext::in_memory();
        ctx.files.add_file("notes.txt", "root", &[] as &[&str]);
        ctx.files.add_file("notes.txt", "nested", &["projects"]);
        ctx.cwd = "~/projects".to_string();
        run(&RmCommand, "rm notes.txt", &mut ctx).unwrap();
        assert!(ctx.files.vfs().resolve_exact(&["projects", "notes.txt"]).is_none());
        assert_eq!(ctx.files.get_file("notes.txt", &[] as &[&str]), "root");
    }

    #[test]
    fn test_rm_mismatches() {
        let mut ctx = TerminalContext::in_memory();
        assert_eq!(
            run(&RmCommand, "rm projects", &mut ctx).unwrap_err(),
            "Folder detected in command rm projects, please use option -r to delete a folder"
        );
        assert_eq!(
            run(&RmCommand, "rm -r bio.md", &mut ctx).unwrap_err(),
            "File detected in command rm -r bio.md while using -r option, please remove option -r to delete a file"
        );
        assert!(ctx.files.vfs().root.child("projects").is_some());
        assert!(ctx.files.vfs().root.child("bio.md").is_some());
    }

    #[test]
    fn test_rm_missing() {
        let mut ctx = TerminalContext::in_memory();
        assert_eq!(run(&RmCommand, "rm ghost.txt", &mut ctx).unwrap_err(), "No such file ghost.txt found!");
        assert_eq!(run(&RmCommand, "rm -r attic", &mut ctx).unwrap_err(), "No such folder attic found!");
        assert_eq!(
            run(&RmCommand, "rm -r", &mut ctx).unwrap_err(),
            "Proper usage of rm command is with rm filename | rm -r folder_name"
        );
    }

    #[test]
    fn test_rm_follows_real_kind_over_extension() {
        let mut ctx = TerminalContext::in_memory();
        // a file without a known extension, as the editor can save one
        ctx.open_editor("notes");
        assert!(ctx.save_editor("scratch"));
        assert_eq!(run(&RmCommand, "rm notes", &mut ctx).unwrap().body, "File notes successfully deleted!");
        assert!(ctx.files.vfs().root.child("notes").is_none());

        // and a folder that happens to look like a file
        ctx.files.add_folder("backup.txt", &[] as &[&str]);
        assert_eq!(
            run(&RmCommand, "rm -r backup.txt", &mut ctx).unwrap().body,
            "Folder backup.txt deleted successfully!"
        );
        assert!(ctx.files.vfs().root.child("backup.txt").is_none());
    }

    #[test]
    fn test_rm_one_name_only() {
        let mut ctx = TerminalContext::in_memory();
        assert_eq!(
            run(&RmCommand, "rm bio.md secret_keys.pem", &mut ctx).unwrap_err(),
            "Proper usage of rm command is with rm filename | rm -r folder_name"
        );
        assert!(run(&RmCommand, "rm -r projects bio.md", &mut ctx).is_err());
        assert!(ctx.files.vfs().root.child("bio.md").is_some());
        assert!(ctx.files.vfs().root.child("secret_keys.pem").is_some());
        assert!(ctx.files.vfs().root.child("projects").is_some());
    }

    #[test]
    fn test_rm_flag_must_be_a_token() {
        let mut ctx = TerminalContext::in_memory();
        // "-rf" isn't the flag, so this is a file delete of a folder name
        assert!(run(&RmCommand, "rm -rf", &mut ctx).unwrap_err().starts_with("Folder detected"));
    }
}

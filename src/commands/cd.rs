use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::config::CdPolicy;
use crate::context::TerminalContext;
use crate::vfs::ROOT_DIR;

const NO_SUCH_DIRECTORY: &str = "No such directory!";

pub struct CdCommand;

impl Command for CdCommand {
    fn execute(&self, line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        // bare cd always goes back to the root, wherever we are
        let Some(target) = line.primary() else {
            ctx.cwd = ROOT_DIR.to_string();
            return Ok(Reply::text(ctx.cwd.clone()));
        };

        match ctx.config.cd_policy {
            CdPolicy::RootOnly => cd_root_only(target, ctx)?,
            CdPolicy::Relative => cd_relative(target, ctx)?,
        }
        Ok(Reply::text(ctx.cwd.clone()))
    }
}

// Only asks whether the root has an entry called `target`, then appends it
// to the current path. `cd projects` twice gives ~/projects/projects.
fn cd_root_only(target: &str, ctx: &mut TerminalContext) -> Result<(), String> {
    if ctx.files.vfs().root.child(target).is_none() {
        return Err(NO_SUCH_DIRECTORY.to_string());
    }
    ctx.cwd = format!("{}/{}", ctx.cwd, target);
    Ok(())
}

// resolves against the current directory, knows about `..`, `.` and `~`
fn cd_relative(target: &str, ctx: &mut TerminalContext) -> Result<(), String> {
    let mut path = ctx.cwd_segments();
    for part in target.split('/') {
        match part {
            "" | "." => {}
            ROOT_DIR => path.clear(),
            ".." => {
                path.pop();
            }
            name => path.push(name.to_string()),
        }
    }
    match ctx.files.vfs().resolve_exact(&path) {
        Some(node) if node.is_dir() => {
            ctx.set_cwd_segments(&path);
            Ok(())
        }
        _ => Err(NO_SUCH_DIRECTORY.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run;
    use crate::config::TerminalConfig;

    fn relative_ctx() -> TerminalContext {
        TerminalContext::with_config(TerminalConfig {
            cd_policy: CdPolicy::Relative,
            ..TerminalConfig::default()
        })
    }

    #[test]
    fn test_cd_into_root_directory() {
        let mut ctx = TerminalContext::in_memory();
        let reply = run(&CdCommand, "cd projects", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~/projects");
        assert_eq!(reply.body, "~/projects");
    }

    #[test]
    fn test_cd_no_args_goes_to_root() {
        let mut ctx = TerminalContext::in_memory();
        for start in ["~", "~/projects", "~/projects/projects", "/srv/remote"] {
            ctx.cwd = start.to_string();
            run(&CdCommand, "cd", &mut ctx).unwrap();
            assert_eq!(ctx.cwd, "~");
        }
    }

    #[test]
    fn test_cd_unknown_name() {
        let mut ctx = TerminalContext::in_memory();
        let err = run(&CdCommand, "cd nowhere", &mut ctx).unwrap_err();
        assert_eq!(err, "No such directory!");
        assert_eq!(ctx.cwd, "~");
    }

    #[test]
    fn test_cd_root_only_checks_root_even_when_nested() {
        let mut ctx = TerminalContext::in_memory();
        ctx.files.add_folder("inner", &["projects"]);
        run(&CdCommand, "cd projects", &mut ctx).unwrap();

        // inner lives right here, but the root doesn't know it
        assert!(run(&CdCommand, "cd inner", &mut ctx).is_err());

        // and a root name gets appended to wherever we are
        run(&CdCommand, "cd projects", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~/projects/projects");
    }

    #[test]
    fn test_cd_relative_nested() {
        let mut ctx = relative_ctx();
        ctx.files.add_folder("inner", &["projects"]);
        run(&CdCommand, "cd projects", &mut ctx).unwrap();
        run(&CdCommand, "cd inner", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~/projects/inner");

        run(&CdCommand, "cd ..", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~/projects");

        run(&CdCommand, "cd ~/projects/inner", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~/projects/inner");
    }

    #[test]
    fn test_cd_relative_rejects_files_and_missing() {
        let mut ctx = relative_ctx();
        assert!(run(&CdCommand, "cd bio.md", &mut ctx).is_err());
        assert!(run(&CdCommand, "cd projects/nope", &mut ctx).is_err());
        assert_eq!(ctx.cwd, "~");
        // can't climb above the root
        run(&CdCommand, "cd ../..", &mut ctx).unwrap();
        assert_eq!(ctx.cwd, "~");
    }
}

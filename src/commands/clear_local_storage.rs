use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;
use log::info;

/// clearLocalStorage
/// Drops every stored key. What's loaded stays in memory, so the defaults
/// only come back on the next start.
pub struct ClearLocalStorageCommand;

impl Command for ClearLocalStorageCommand {
    fn execute(&self, _line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        ctx.storage
            .clear()
            .map_err(|e| format!("Could not clear local storage: {}", e))?;
        info!("local storage cleared");
        Ok(Reply::text(
            "Local storage cleared. Defaults will be restored on the next start.",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run;
    use crate::config::{TerminalConfig, DEFAULT_FILES_KEY};
    use crate::diagnostics::StaticMemoryProbe;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::rc::Rc;

    #[test]
    fn test_clear_local_storage() {
        let mem = Rc::new(MemoryStore::new());
        let mut ctx = TerminalContext::new(
            TerminalConfig::default(),
            mem.clone(),
            Box::new(StaticMemoryProbe(None)),
        );
        assert!(mem.get(DEFAULT_FILES_KEY).unwrap().is_some());

        let reply = run(&ClearLocalStorageCommand, "clearLocalStorage", &mut ctx).unwrap();
        assert!(reply.body.starts_with("Local storage cleared."));
        assert!(mem.is_empty());
        // tree is untouched until restart
        assert!(ctx.files.vfs().root.child("bio.md").is_some());
    }
}

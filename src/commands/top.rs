use crate::command::{Command, CommandResult, ParsedLine, Reply};
use crate::context::TerminalContext;

const MB: f64 = 1024.0 * 1024.0;

/// top
/// JS heap summary, where the browser exposes one.
pub struct TopCommand;

impl Command for TopCommand {
    fn execute(&self, _line: &ParsedLine, ctx: &mut TerminalContext) -> CommandResult {
        let Some(sample) = ctx.memory.sample() else {
            return Err("Memory information is not available in this browser.".to_string());
        };
        Ok(Reply::html(format!(
            "<strong>Memory Usage Summary:</strong><br>\
             JS Heap Size Limit: {:.2} MB<br>\
             Total Allocated JS Heap Size: {:.2} MB<br>\
             Currently Used JS Heap Size: {:.2} MB",
            sample.heap_limit / MB,
            sample.total_heap / MB,
            sample.used_heap / MB,
        )))
    }
}

pub mod cat;
pub mod cd;
pub mod clear;
pub mod clear_local_storage;
pub mod help;
pub mod history;
pub mod ls;
pub mod pwd;
pub mod rm;
pub mod top;
pub mod touch;
pub mod vim;

#[cfg(test)]
pub(crate) fn run(
    cmd: &dyn crate::command::Command,
    input: &str,
    ctx: &mut crate::context::TerminalContext,
) -> crate::command::CommandResult {
    let line = crate::command::ParsedLine::parse(input).expect("non-blank test input");
    cmd.execute(&line, ctx)
}

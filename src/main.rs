use browser_terminal::command::ReplyFormat;
use browser_terminal::config::TerminalConfig;
use browser_terminal::context::TerminalContext;
use browser_terminal::{logging, markup};
use browser_terminal::session::{PromptInstance, PromptSession};
use std::io::{self, BufRead, Write};

// native repl over the same session the browser drives - no localStorage,
// no websocket, nothing survives exit
fn print_reply(prompt: &PromptInstance) {
    if prompt.reply.is_empty() {
        return;
    }
    match prompt.reply_format {
        ReplyFormat::Text => println!("{}", prompt.reply),
        ReplyFormat::Html => println!("{}", markup::to_plain_text(&prompt.reply).trim_end()),
    }
}

fn main() -> io::Result<()> {
    let config = match std::env::var("TERMINAL_CONFIG") {
        Ok(json) => TerminalConfig::from_json(&json).unwrap_or_else(|e| {
            eprintln!("{}, using defaults", e);
            TerminalConfig::default()
        }),
        Err(_) => TerminalConfig::default(),
    };
    logging::init(config.level_filter());

    let mut session = PromptSession::local(TerminalContext::with_config(config));
    for banner in session.prompts().iter().filter(|p| !p.enabled) {
        print_reply(banner);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(active) = session.active_prompt() else {
            break;
        };
        let id = active.id.clone();
        print!("{} $ ", active.current_dir);
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim() == "exit" {
            break;
        }
        if !session.submit(&id, &line) {
            continue;
        }
        match session.prompts().iter().find(|p| p.id == id) {
            Some(prompt) => print_reply(prompt),
            // clear wiped the scrollback
            None => print!("\x1B[2J\x1B[H"),
        }
    }
    Ok(())
}

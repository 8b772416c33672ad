//! Interactive operator shell running next to the server

use anyhow::Result;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::oneshot;

use super::list;
use crate::engine::Engine;

const COMMANDS: &[(&str, &str)] = &[
    ("reload", "rescan posts and pages, clear the cache and recompile templates"),
    ("list", "list [posts|pages|skipped]: show the loaded content"),
    ("help", "help [command]: show available commands"),
    ("stop", "stop the server"),
];

/// What the shell loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Run one command line against `engine`, writing feedback to `out`
pub fn execute(engine: &Engine, line: &str, out: &mut dyn Write) -> Result<Flow> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        Some(command) => command,
        None => return Ok(Flow::Continue),
    };
    let argument = words.next();

    match command {
        "reload" => match engine.reload() {
            Ok(summary) => writeln!(out, "Reloaded: {}", summary)?,
            Err(e) => writeln!(out, "Reload failed: {}", e)?,
        },
        "list" => {
            if let Err(e) = list::write_listing(&engine.index(), argument.unwrap_or("posts"), out) {
                writeln!(out, "{}", e)?;
            }
        }
        "help" => help(argument, out)?,
        "stop" | "exit" | "quit" => {
            writeln!(out, "Stopping server...")?;
            return Ok(Flow::Stop);
        }
        other => writeln!(out, "Unknown command '{}'. Type 'help' for a list.", other)?,
    }

    Ok(Flow::Continue)
}

fn help(topic: Option<&str>, out: &mut dyn Write) -> Result<()> {
    match topic {
        Some(topic) => match COMMANDS.iter().find(|(name, _)| *name == topic) {
            Some((name, text)) => writeln!(out, "{:8} {}", name, text)?,
            None => writeln!(out, "No help for '{}'", topic)?,
        },
        None => {
            for (name, text) in COMMANDS {
                writeln!(out, "{:8} {}", name, text)?;
            }
        }
    }
    Ok(())
}

/// Read commands from stdin on a background thread until `stop` or EOF.
/// Sends on `stop_tx` when the server should shut down.
pub fn spawn(engine: Arc<Engine>, stop_tx: oneshot::Sender<()>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let prompt = || {
            let mut out = stdout.lock();
            let _ = write!(out, "> ");
            let _ = out.flush();
        };

        prompt();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read command: {}", e);
                    break;
                }
            };

            let flow = {
                let mut out = stdout.lock();
                execute(&engine, &line, &mut out)
            };
            match flow {
                Ok(Flow::Stop) => {
                    let _ = stop_tx.send(());
                    return;
                }
                Ok(Flow::Continue) => {}
                Err(e) => tracing::error!("Shell error: {}", e),
            }
            prompt();
        }
        tracing::debug!("Shell input closed");
    });
}

//! Console channel — reads lines from stdin, sends them through the bot,
//! prints the reply to stdout.
//!
//! All lines share one session for the lifetime of the console. Lines that
//! start with `/` are console commands:
//!
//! - `/history` — print the session transcript
//! - `/clear`   — empty the session
//! - `/quit`    — leave the console
//!
//! Runs until `/quit`, stdin EOF, or the `shutdown` token is cancelled.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chatbot::ChatBot;
use crate::error::AppError;

/// A parsed console input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Empty,
    History,
    Clear,
    Quit,
    Unknown(&'a str),
    Chat(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/history" => Input::History,
        "/clear" => Input::Clear,
        "/quit" | "/exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Chat(text),
    }
}

/// Run the console on the process stdin.
pub async fn run(bot: Arc<ChatBot>, shutdown: CancellationToken) -> Result<(), AppError> {
    let session_id = uuid::Uuid::new_v4().to_string();
    info!(%session_id, "console started");
    println!("─────────────────────────────────");
    println!(" {} console  (/quit to leave)", bot.config().app_name);
    println!("─────────────────────────────────");

    let stdin = BufReader::new(tokio::io::stdin());
    run_with(bot, session_id, stdin, std::io::stdout(), shutdown).await
}

/// Console loop over any line source and sink.
async fn run_with<R, W>(
    bot: Arc<ChatBot>,
    session_id: String,
    reader: R,
    mut out: W,
    shutdown: CancellationToken,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: std::io::Write,
{
    let mut lines = reader.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                writeln!(out)?;
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => line,
        };

        let line = match line {
            Err(e) => {
                warn!("console read error: {e}");
                break;
            }
            Ok(None) => {
                info!("console stdin closed");
                break;
            }
            Ok(Some(line)) => line,
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::History => {
                for entry in bot.get_session_history(&session_id)? {
                    writeln!(out, "{}: {}", entry.role, entry.content)?;
                }
            }
            Input::Clear => {
                bot.clear_session(&session_id)?;
                writeln!(out, "(session cleared)")?;
            }
            Input::Unknown(cmd) => writeln!(out, "unknown command: {cmd}")?,
            Input::Chat(text) => {
                debug!(input = %text, "console received line");
                let reply = bot.chat_async(text, Some(session_id.clone()), None).await;
                writeln!(out, "{}", reply.message)?;
            }
        }
    }

    Ok(())
}

//! IntraMind — service entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load config
//!   4. Init logger once (CLI `-v` flags > RUST_LOG > config)
//!   5. Build the chatbot, start the session sweeper
//!   6. Print status banner
//!   7. With `-i`, run the console until `/quit`, EOF or Ctrl-C
//!   8. Cancel token + join the sweeper

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use intramind::conversation::spawn_sweeper;
use intramind::{config, console, logger, AppError, ChatBot, VERSION};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = match parse_args(std::env::args().skip(1))? {
        Command::Help => {
            print!("{USAGE}");
            return Ok(());
        }
        Command::Run(args) => args,
    };

    let config = config::load(args.config_path.as_deref())?;

    let cli_level = (args.verbosity > 0).then(|| logger::raise(config.log_level, args.verbosity));
    let log_filter = logger::init(config.log_level, cli_level)?;

    info!(version = VERSION, "starting IntraMind");
    info!(
        app_name = %config.app_name,
        environment = %config.app_env,
        debug_mode = config.debug,
        configured_log_level = %config.log_level,
        log_filter = %log_filter,
        "config loaded"
    );

    let bot = Arc::new(ChatBot::new(config));
    let config = bot.config();

    let shutdown = CancellationToken::new();

    // Ctrl-C cancels the shared token.
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            ctrlc_token.cancel();
        }
    });

    let sweeper = spawn_sweeper(
        bot.conversations(),
        config.session_sweep_interval(),
        config.session_max_age(),
        shutdown.clone(),
    );

    // No HTTP listener yet; report where it would bind.
    info!(bind = %config.bind_addr(), "server would start here");

    print_banner(&bot);

    if args.interactive {
        console::run(bot.clone(), shutdown.clone()).await?;
    } else {
        println!("  Run with -i to chat on the console.\n");
    }

    shutdown.cancel();
    let _ = sweeper.await;
    info!("shutdown complete");
    Ok(())
}

fn print_banner(bot: &ChatBot) {
    let config = bot.config();
    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("  {} - Conversational Chatbot  v{VERSION}", config.app_name);
    println!("{rule}");
    println!("  Environment: {}", config.app_env);
    println!("  Server: {}", config.bind_addr());
    println!("  AI Provider: {}", config.ai_provider);
    println!("  Model: {}", config.model_name);
    println!("{rule}\n");
}

const USAGE: &str = "\
Usage: intramind [OPTIONS]

Options:
  -h, --help              Print help
  -i, --interactive       Chat on the console
  -f, --config <PATH>     Configuration file (default: config/default.toml)
  -v, --verbose           Log one level above LOG_LEVEL; repeat (-vv) for more
";

#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    interactive: bool,
    config_path: Option<String>,
    /// Number of `-v` steps above the configured log level.
    verbosity: u8,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(CliArgs),
    Help,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, AppError> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => break,
            "-h" | "--help" => return Ok(Command::Help),
            "-i" | "--interactive" => parsed.interactive = true,
            "-f" | "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| AppError::Usage(format!("{arg} requires a path argument")))?;
                parsed.config_path = Some(path);
            }
            "--verbose" => parsed.verbosity = parsed.verbosity.saturating_add(1),
            flag if is_verbosity_cluster(flag) => {
                let steps = u8::try_from(flag.len() - 1).unwrap_or(u8::MAX);
                parsed.verbosity = parsed.verbosity.saturating_add(steps);
            }
            other => return Err(AppError::Usage(format!("unknown argument '{other}'"))),
        }
    }

    Ok(Command::Run(parsed))
}

/// `-v`, `-vv`, `-vvv`, ...
fn is_verbosity_cluster(flag: &str) -> bool {
    flag.strip_prefix('-')
        .is_some_and(|vs| !vs.is_empty() && vs.bytes().all(|b| b == b'v'))
}

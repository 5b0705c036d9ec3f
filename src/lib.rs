//! IntraMind — conversational chatbot service skeleton.
//!
//! - **config** — layered settings (defaults, TOML file, environment).
//! - **conversation** — in-memory session store and idle sweeper.
//! - **nlp** — keyword-based placeholder classifier.
//! - **chatbot** — the [`ChatBot`] façade tying the pieces together.
//! - **console** — interactive stdin/stdout channel.
//!
//! ```no_run
//! use intramind::{ChatBot, Config};
//!
//! let bot = ChatBot::new(Config::default());
//! let reply = bot.chat("Hello!", None, None);
//! println!("{}", reply.message);
//! ```

pub mod chatbot;
pub mod config;
pub mod console;
pub mod conversation;
pub mod error;
pub mod logger;
pub mod nlp;

pub use chatbot::{ChatBot, ChatResponse};
pub use config::Config;
pub use error::AppError;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

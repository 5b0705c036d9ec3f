//! Integration tests for the chatbot façade.
//!
//! Run with:
//!   cargo test --test test_chatbot

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use serde_json::{json, Map};
use tempfile::NamedTempFile;

use intramind::chatbot::{FAREWELL_REPLY, GREETING_REPLY};
use intramind::config::{self, AppEnv};
use intramind::conversation::Role;
use intramind::nlp::Intent;
use intramind::{ChatBot, Config};

// ── helpers ──────────────────────────────────────────────────────────────────

fn bot_named(name: &str) -> ChatBot {
    let mut cfg = Config::default();
    cfg.app_name = name.into();
    ChatBot::new(cfg)
}

// ── ChatBot ──────────────────────────────────────────────────────────────────

#[test]
fn chatbot_with_custom_config() {
    let bot = bot_named("TestBot");
    assert_eq!(bot.config().app_name, "TestBot");
}

#[test]
fn chatbot_from_config_file() {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(b"[app]\nname = \"FileBot\"\nenv = \"production\"\n[ai]\nmodel = \"gpt-4o\"\n")
        .unwrap();
    let cfg = config::load_from(Some(f.path()), &HashMap::new()).unwrap();
    assert_eq!(cfg.app_env, AppEnv::Production);

    let bot = ChatBot::new(cfg);
    let r = bot.chat("Hello", None, None);
    assert_eq!(r.metadata["model"], json!("gpt-4o"));
}

#[test]
fn chat_basic_message() {
    let bot = ChatBot::default();
    let r = bot.chat("Hello", None, None);
    assert!(!r.message.is_empty());
    assert_eq!(r.message, GREETING_REPLY);
    assert!(r.session_id.is_some());
}

#[test]
fn chat_keeps_session_id() {
    let bot = ChatBot::default();
    let sid = "test-session-001";

    let r1 = bot.chat("Hello", Some(sid), None);
    assert_eq!(r1.session_id.as_deref(), Some(sid));

    let r2 = bot.chat("How are you?", Some(sid), None);
    assert_eq!(r2.session_id.as_deref(), Some(sid));
    assert_eq!(r2.intent, Some(Intent::Question));
}

#[test]
fn chat_response_fields() {
    let bot = ChatBot::default();
    let r = bot.chat("Test message", None, None);
    assert_eq!(r.intent, Some(Intent::Statement));
    assert!(r.entities.is_some());
    assert!(r.confidence > 0.0 && r.confidence <= 1.0);
    assert!(r.metadata.contains_key("model"));
    assert!(!r.is_error());
}

#[test]
fn clear_session_empties_history() {
    let bot = ChatBot::default();
    let sid = "test-session-002";

    bot.chat("Hello", Some(sid), None);
    assert!(bot.clear_session(sid).unwrap());
    assert!(bot.get_session_history(sid).unwrap().is_empty());

    // cleared sessions keep accepting messages
    bot.chat("bye", Some(sid), None);
    let history = bot.get_session_history(sid).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content, FAREWELL_REPLY);
}

#[test]
fn session_history_alternates_roles() {
    let bot = ChatBot::default();
    let sid = "test-session-003";

    bot.chat("Message 1", Some(sid), None);
    bot.chat("Message 2", Some(sid), None);

    let history = bot.get_session_history(sid).unwrap();
    let roles: Vec<Role> = history.iter().map(|h| h.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    assert_eq!(history[2].content, "Message 2");
}

#[test]
fn sessions_are_isolated() {
    let bot = ChatBot::default();
    bot.chat("Hello", Some("a"), None);
    bot.chat("Hello", Some("b"), None);
    bot.chat("Hello again", Some("b"), None);

    assert_eq!(bot.get_session_history("a").unwrap().len(), 2);
    assert_eq!(bot.get_session_history("b").unwrap().len(), 4);
}

#[test]
fn context_only_seeds_new_sessions() {
    let bot = ChatBot::default();
    let mut ctx = Map::new();
    ctx.insert("tenant".into(), json!("acme"));
    bot.chat("hi", Some("ctx"), Some(ctx));

    let mut other = Map::new();
    other.insert("tenant".into(), json!("globex"));
    bot.chat("hi", Some("ctx"), Some(other));

    let session = bot.conversations().get_session("ctx").unwrap().unwrap();
    assert_eq!(session.context["tenant"], json!("acme"));
}

#[test]
fn old_sessions_are_swept() {
    let bot = ChatBot::default();
    bot.chat("Hello", Some("old"), None);
    bot.chat("Hello", Some("new"), None);

    let store = bot.conversations();
    store
        .with_session(Some("old"), None, |s| {
            s.updated_at = chrono::Utc::now() - chrono::Duration::hours(25);
        })
        .unwrap();

    assert_eq!(store.cleanup_old_sessions(24).unwrap(), 1);
    assert!(bot.get_session_history("old").unwrap().is_empty());
    assert_eq!(bot.get_session_history("new").unwrap().len(), 2);
}

// ── async ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_async_basic() {
    let bot = Arc::new(ChatBot::default());
    let r = bot.chat_async("Hello async!", None, None).await;
    assert_eq!(r.message, GREETING_REPLY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn chat_async_concurrent_sessions() {
    let bot = Arc::new(ChatBot::default());

    let tasks: Vec<_> = (1..=3)
        .map(|i| {
            let bot = bot.clone();
            tokio::spawn(async move {
                bot.chat_async(format!("Hello from session {i}"), Some(format!("session-{i}")), None)
                    .await
            })
        })
        .collect();

    for task in tasks {
        let r = task.await.unwrap();
        assert!(!r.is_error());
    }

    for i in 1..=3 {
        let history = bot.get_session_history(&format!("session-{i}")).unwrap();
        assert_eq!(history.len(), 2);
    }
    assert_eq!(bot.conversations().len().unwrap(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_messages_to_one_session_all_land() {
    let bot = Arc::new(ChatBot::default());

    let tasks: Vec<_> = (0..20)
        .map(|i| {
            let bot = bot.clone();
            tokio::spawn(async move { bot.chat_async(format!("msg {i}"), Some("shared".into()), None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let history = bot.get_session_history("shared").unwrap();
    assert_eq!(history.len(), 40);
    // each exchange is appended as an adjacent user/assistant pair
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}

//! Async chat walkthrough — sequential and concurrent sessions.
//!
//!   cargo run --example async_chat

use std::sync::Arc;

use intramind::ChatBot;

async fn process_message(bot: Arc<ChatBot>, message: String, session_id: String) {
    let response = bot.chat_async(message.clone(), Some(session_id), None).await;
    println!("User: {message}");
    println!("Bot: {}\n", response.message);
}

#[tokio::main]
async fn main() {
    let rule = "=".repeat(60);
    println!("{rule}\n  IntraMind - Async Chat Example\n{rule}\n");

    let bot = Arc::new(ChatBot::default());

    println!("Example 1: Sequential Async Messages\n{}", "-".repeat(40));
    for message in ["Hello!", "How are you?", "Tell me about your capabilities"] {
        process_message(bot.clone(), message.to_string(), "async-demo-001".into()).await;
    }

    println!("\nExample 2: Concurrent Message Processing\n{}", "-".repeat(40));
    let tasks: Vec<_> = (1..=3)
        .map(|i| {
            tokio::spawn(process_message(
                bot.clone(),
                format!("Hello from session {i}"),
                format!("session-{i}"),
            ))
        })
        .collect();
    for task in tasks {
        let _ = task.await;
    }

    println!("{rule}\n  Async example completed successfully!\n{rule}");
}

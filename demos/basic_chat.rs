//! Basic chat walkthrough.
//!
//!   cargo run --example basic_chat

use intramind::ChatBot;

fn main() -> Result<(), intramind::AppError> {
    let rule = "=".repeat(60);
    println!("{rule}\n  IntraMind - Basic Chat Example\n{rule}\n");

    let bot = ChatBot::default();

    println!("Example 1: Simple Greeting\n{}", "-".repeat(40));
    let response = bot.chat("Hello!", None, None);
    println!("User: Hello!");
    println!("Bot: {}", response.message);
    if let Some(intent) = response.intent {
        println!("Intent: {intent}");
    }
    println!("Confidence: {}\n", response.confidence);

    println!("Example 2: Asking a Question\n{}", "-".repeat(40));
    let response = bot.chat("What can you do for me?", None, None);
    println!("User: What can you do for me?");
    println!("Bot: {}\n", response.message);

    println!("Example 3: Contextual Conversation\n{}", "-".repeat(40));
    let session_id = "demo-session-001";
    for line in ["My name is Alice", "What's my name?"] {
        let response = bot.chat(line, Some(session_id), None);
        println!("User: {line}");
        println!("Bot: {}", response.message);
    }
    println!();

    println!("Example 4: Conversation History\n{}", "-".repeat(40));
    for entry in bot.get_session_history(session_id)? {
        println!("{}: {}", entry.role, entry.content);
    }

    println!("\n{rule}\n  Example completed successfully!\n{rule}");
    Ok(())
}

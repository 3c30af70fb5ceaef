//! Tweet Thread Posting Tool
//!
//! This script generates a tweet thread about a topic of your choice with the
//! Groq API and posts it to Twitter/X as a head tweet plus a chain of
//! replies.
//!
//! Requires `GROQ_API_KEY` plus the four `X_*` credentials in the
//! environment.

use std::io::{self, Write};

use threadpost::{post_thread, GroqClient, ResponseFormat};

/// System prompt for the thread generator.
const SYSTEM_PROMPT: &str = "You are a social media writer. Respond with a single JSON object \
of the form {\"head\": string, \"replies\": [string, ...]} containing a tweet thread: a head \
tweet and 2-5 replies. Each tweet must be under 280 characters. No markdown, no extra text.";

/// Reads one trimmed line from stdin after printing a prompt.
fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    println!("🧵 Tweet Thread Posting Tool");
    println!("============================");

    let topic = prompt("📝 Enter a topic for your thread: ")?;
    if topic.is_empty() {
        println!("❌ Topic cannot be empty!");
        return Err("Topic is required".into());
    }

    println!("\n🤖 Generating thread content...");
    let client = GroqClient::from_env()?;
    let content = client
        .generate(
            SYSTEM_PROMPT,
            &format!("Write a tweet thread about: {}", topic),
            None,
            Some(ResponseFormat::JsonObject),
        )
        .await?;

    let value = content
        .as_json()
        .ok_or("Generation did not return structured content")?;
    let head = value
        .get("head")
        .and_then(|v| v.as_str())
        .ok_or("Generated thread is missing the head tweet")?
        .to_string();
    let replies: Vec<String> = value
        .get("replies")
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    println!("\n📋 Generated thread:");
    println!("   Head: {}", head);
    for (i, reply) in replies.iter().enumerate() {
        println!("   Reply {}: {}", i + 1, reply);
    }

    let confirm = prompt("\n🚀 Post this thread? (y/N): ")?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("👋 Aborted, nothing posted.");
        return Ok(());
    }

    println!("\n🐦 Posting thread...");
    match post_thread(&head, &replies).await {
        Ok(thread) => {
            println!("\n🎉 Thread posted!");
            println!("📌 Head tweet id: {}", thread.head_id);
            println!(
                "📊 Replies: {} posted, {} failed",
                thread.posted_count(),
                thread.failed_count()
            );
            for (i, outcome) in thread.outcomes.iter().enumerate() {
                match outcome.tweet_id() {
                    Some(id) => println!("   ✅ Reply {} -> {}", i + 1, id),
                    None => println!("   ❌ Reply {} failed (see logs)", i + 1),
                }
            }
        }
        Err(e) => {
            println!("\n💥 Failed to post thread: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

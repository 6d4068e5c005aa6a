//! Stream a chat reply token by token with the async client.
//!
//! `cargo run --example streaming_chat -- "What is quantum computing?"`

use std::io::Write;

use ollama_client::{ChatMessage, ChatRequest, ChatResponse, ClientConfig, OllamaClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What is quantum computing?".to_string());

    let client = OllamaClient::new(ClientConfig::default())?;
    let request = ChatRequest::new(vec![
        ChatMessage::system("You are a helpful assistant."),
        ChatMessage::user(question),
    ])
    .with_stream(true)
    .with_option("options", serde_json::json!({ "temperature": 0.7 }));

    let Some(mut stream) = client.send_chat(request).await?.into_stream() else {
        return Err("server did not stream".into());
    };

    let mut stdout = std::io::stdout();
    while let Some(fragment) = stream.next_fragment().await {
        let chunk: ChatResponse = fragment?.parse()?;
        write!(stdout, "{}", chunk.text())?;
        stdout.flush()?;
        if chunk.done {
            break;
        }
    }
    writeln!(stdout)?;

    Ok(())
}

//! Pull a model, list what is installed, then ask for a completion.
//!
//! Uses the blocking client; run against a local server:
//! `RUST_LOG=ollama_client=debug cargo run --example model_management`

use ollama_client::blocking::OllamaClient;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = OllamaClient::localhost()?;

    println!("Pulling model 'llama3'...");
    println!("accepted: {}", client.pull_model("llama3")?);

    println!("Available models:");
    for name in client.list_models()? {
        println!("  {name}");
    }

    let answer = client.generate("Tell me a fun fact about space.")?;
    println!("The fun fact response: {answer}");

    Ok(())
}

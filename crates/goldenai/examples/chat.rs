use anyhow::Result;
use dotenv::dotenv;
use goldenai::{count_tokens, AnthropicRequest, Client, Content, Message, Request, RequestOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut message = Message::user()
        .with_text("Hello, Claude!")
        .with_text("What is the color of this image?");
    if let Some(path) = std::env::args().nth(1) {
        message = message.with_content(Content::from_document(path, None)?);
    }

    let mut request: Request = AnthropicRequest::new(
        "claude-3-5-haiku-latest",
        vec![message],
        RequestOptions::new()
            .with_max_tokens(1024)
            .with_prompt("Please answer in Chinese"),
    )?
    .into();

    println!("Estimated input tokens: {}", count_tokens(&request));

    let client = Client::new()?;
    let response = client.chat(&request).await?;
    println!("{}", response);
    println!("Cost: ${:.6}", response.cost()?);

    // Carry the answer forward and ask a follow up
    request.add_response(&response);
    request.add_message(Message::user().with_text("Please answer again in English"))?;
    let response = client.chat(&request).await?;
    println!("{}", response);

    Ok(())
}

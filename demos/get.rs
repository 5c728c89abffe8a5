//! Fetch a URL over a pooled connection and print the response.
//!
//! ```sh
//! cargo run --example get -- http://example.com/
//! ```

use micro_client::client::{Client, ClientConfig, PoolSize};
use micro_client::protocol::ClientRequest;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://example.com/".to_string());

    let config = ClientConfig::builder().pool_size(PoolSize::new(1, 4)).build();
    let client = Client::with_config(&url, config).await?;

    let parsed = url::Url::parse(&url)?;
    let mut target = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        target.push('?');
        target.push_str(query);
    }

    let mut request = ClientRequest::builder().get(&target).header("accept", "*/*").build()?;
    let response = client.send(&mut request).await?;

    println!("{:?} {}", response.version(), response.status());
    for (name, value) in response.headers() {
        println!("{name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    println!();
    println!("({} body bytes)", response.body().len());

    Ok(())
}

//! Demo backend: answers every request with "Response from <name>".
//!
//! ```text
//! cargo run --example mock_backend -- --port 3002 --name "Backend 2"
//! ```

use std::net::SocketAddr;

use axum::{routing::any, Router};
use clap::Parser;

#[derive(Parser)]
struct Args {
    #[arg(short, long, default_value_t = 3001)]
    port: u16,

    #[arg(short, long, default_value = "Backend 1")]
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let reply = format!("Response from {}", args.name);

    let handler = move || {
        let reply = reply.clone();
        async move { reply }
    };
    let app = Router::new()
        .route("/", any(handler.clone()))
        .route("/{*path}", any(handler));

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    println!("{} running on http://{}", args.name, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

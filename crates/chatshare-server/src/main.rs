//! chatshare: local relay that turns a chat page snapshot into a shareable
//! HTML transcript.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("CHATSHARE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn print_help() {
    println!("chatshare: share chat conversations as standalone HTML");
    println!();
    println!("Usage: chatshare [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve                      Start the relay server");
    println!("  export <snapshot> [page-url] [--copy]");
    println!("                                      Extract, render and deliver a snapshot");
    println!("  render <snapshot> [out.html]        Render a snapshot without delivering");
    println!("  help                                Show this help message");
    println!();
    println!("Environment: CHATSHARE_DATA_DIR, PORT, CHATSHARE_DELIVERY, CHATSHARE_ENDPOINT");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let data_dir = resolve_data_dir();
    let paths = chatshare_core::DataPaths::new(&data_dir)?;
    let config = chatshare_core::ShareConfig::from_env(&paths)?;

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "serve" => {}
            "export" => {
                let positional: Vec<&String> =
                    args[2..].iter().filter(|a| !a.starts_with("--")).collect();
                let Some(snapshot) = positional.first() else {
                    eprintln!("Usage: chatshare export <snapshot> [page-url] [--copy]");
                    std::process::exit(1);
                };
                let page_url = positional.get(1).map(|s| s.as_str()).unwrap_or("");
                let copy = args.iter().any(|a| a == "--copy");
                return cli::export(config, Path::new(snapshot.as_str()), page_url, copy).await;
            }
            "render" => {
                if args.len() < 3 {
                    eprintln!("Usage: chatshare render <snapshot> [out.html]");
                    std::process::exit(1);
                }
                let out = args.get(3).map(Path::new);
                return cli::render(&config, Path::new(&args[2]), out);
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'chatshare help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    info!("Data directory: {}", data_dir.display());
    let port = config.port;

    let state = Arc::new(AppState::new(
        config,
        Arc::new(chatshare_delivery::SystemClipboard),
    )?);
    let app = routes::build_router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("chatshare relay listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Message display server example
//!
//! Run with: cargo run --example display_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example display_server                    # binds to 0.0.0.0:4040
//!   cargo run --example display_server localhost          # binds to 127.0.0.1:4040
//!   cargo run --example display_server 127.0.0.1:4041     # binds to 127.0.0.1:4041
//!
//! ## Attach a display (subscriber)
//!
//!   nc localhost 4040
//!   SUBSCRIBE
//!
//! The display receives one JSON event per line; already-released history is
//! replayed on connect, and `{"type":"clear"}` resets the screen.
//!
//! ## Publish a message
//!
//!   printf 'PUBLISH {"text":"HELLO","sender":"A"}\n' | nc localhost 4040
//!
//! ## Clear all displays
//!
//!   printf 'CLEAR\n' | nc localhost 4040

use std::net::SocketAddr;

use marquee_rs::{MarqueeServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:4040
/// - "localhost:4041" -> 127.0.0.1:4041
/// - "127.0.0.1" -> 127.0.0.1:4040
/// - "0.0.0.0:4040" -> 0.0.0.0:4040
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 4040;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: display_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:4040)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  display_server                    # binds to 0.0.0.0:4040");
    eprintln!("  display_server localhost          # binds to 127.0.0.1:4040");
    eprintln!("  display_server 127.0.0.1:4041     # binds to 127.0.0.1:4041");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => "0.0.0.0:4040".parse()?,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("marquee_rs=debug".parse()?)
                .add_directive("display_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig::default().bind(bind_addr);

    println!("Starting display server on {}", config.bind_addr);
    println!();
    println!("=== Attach a display ===");
    println!("nc {} {}   then send: SUBSCRIBE", bind_addr.ip(), bind_addr.port());
    println!();
    println!("=== Publish a message ===");
    println!(
        "printf 'PUBLISH {{\"text\":\"HELLO\",\"sender\":\"A\"}}\\n' | nc {} {}",
        bind_addr.ip(),
        bind_addr.port()
    );
    println!();
    println!("=== Clear all displays ===");
    println!("printf 'CLEAR\\n' | nc {} {}", bind_addr.ip(), bind_addr.port());
    println!();

    let server = MarqueeServer::new(config);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    Ok(())
}

use std::env;

use advisor_projection::api::{InputError, render_from_args, run_http_server};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  advisor-projection serve [port]
  advisor-projection render [--instances <file.json>] [options]   (see `render --help`)";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("render") => {
            let mut args = raw_args.clone();
            args.remove(1);
            match render_from_args(&args) {
                Ok(table) => print!("{table}"),
                Err(InputError::Cli(e)) => e.exit(),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

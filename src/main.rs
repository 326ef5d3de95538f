use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rss_resolver::config::Config;
use rss_resolver::resolve::RedirectResolver;
use rss_resolver::service::{RequestKind, ResolveRequest, Service};
use std::path::PathBuf;

/// Default config path (~/.config/rss-resolver/config.toml), if HOME is set.
fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("rss-resolver")
            .join("config.toml"),
    )
}

#[derive(Parser, Debug)]
#[command(
    name = "rss-resolver",
    version,
    about = "Resolve Google News and redirect-wrapped RSS links to their original URLs"
)]
struct Args {
    /// Config file (default: ~/.config/rss-resolver/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a single URL and print the outcome as JSON
    Resolve {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Resolve every item (up to 50) of an RSS/Atom feed and print the result as JSON
    Feed {
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Serve POST /api/resolve over HTTP
    Serve {
        /// Listen address, overrides `bind` from the config file
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match args.config.clone().or_else(default_config_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let resolver =
        RedirectResolver::new(config.allow_private_hosts).context("Failed to build HTTP client")?;
    let service = Service::new(resolver);

    match args.command {
        Command::Resolve { url } => run_once(&service, url, RequestKind::Single).await,
        Command::Feed { url } => run_once(&service, url, RequestKind::Feed).await,
        Command::Serve { bind } => {
            let addr = bind.unwrap_or(config.bind);
            rss_resolver::server::serve(service, &addr, &config.allowed_origins)
                .await
                .with_context(|| format!("Server on {addr} failed"))
        }
    }
}

async fn run_once(service: &Service, url: String, kind: RequestKind) -> Result<()> {
    let response = service.handle(ResolveRequest::new(url, kind)).await?;

    let json = serde_json::to_string_pretty(&response).context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

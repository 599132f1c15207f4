use anyhow::Result;
use clap::Parser;
use log::warn;
use reqwest::Method;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use tmdb_rest::commands::{self, CallSpec, Overrides, ParamSpec};

/// tmdb-rest - call The Movie Database API from the command line
///
/// The API key is read from the TMDB_API_KEY environment variable and sent as the
/// `api_key` query parameter on every request. Rate-limited calls (HTTP 429) are
/// retried after the server's Retry-After delay.
///
/// Examples:
///   tmdb-rest get '/movie/{id}' -s id=550
///   tmdb-rest get /search/movie -q query='fight club' --pretty
#[derive(Parser, Debug)]
#[command(author, version = env!("TMDB_REST_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL (defaults to https://api.themoviedb.org/3; also via TMDB_API_URL)
    #[arg(long = "api-url", env = "TMDB_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Retries after a rate-limited attempt (also via TMDB_MAX_RETRIES)
    #[arg(long = "retries", env = "TMDB_MAX_RETRIES", value_name = "N", global = true)]
    pub retries: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a GET request
    Get(CallArgs),

    /// Send a POST request, optionally with a JSON body
    Post(PostArgs),

    /// Send a DELETE request
    Delete(CallArgs),
}

#[derive(clap::Args, Debug)]
pub struct CallArgs {
    /// Endpoint template, e.g. "/movie/{id}"
    #[arg(value_name = "ENDPOINT")]
    pub endpoint: String,

    /// Path segment substitution for a {key} placeholder
    #[arg(short = 's', long = "segment", value_name = "KEY=VALUE")]
    pub segments: Vec<ParamSpec>,

    /// Query string parameter (may be repeated)
    #[arg(short = 'q', long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<ParamSpec>,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,
}

#[derive(clap::Args, Debug)]
pub struct PostArgs {
    #[command(flatten)]
    pub call: CallArgs,

    /// JSON request body
    #[arg(short = 'b', long = "body", value_name = "JSON")]
    pub body: Option<String>,
}

impl CallArgs {
    fn into_spec(self, body: Option<String>) -> CallSpec {
        CallSpec {
            endpoint: self.endpoint,
            segments: self.segments,
            query: self.query,
            body,
            pretty: self.pretty,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = tmdb_rest::runtime::RealRuntime;

    let overrides = Overrides {
        api_url: cli.api_url,
        max_retries: cli.retries,
        timeout: cli.timeout.map(Duration::from_secs),
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling request...");
            on_ctrl_c.cancel();
        }
    });

    let (method, spec) = match cli.command {
        Commands::Get(args) => (Method::GET, args.into_spec(None)),
        Commands::Post(args) => (Method::POST, args.call.into_spec(args.body)),
        Commands::Delete(args) => (Method::DELETE, args.into_spec(None)),
    };

    commands::call(runtime, method, spec, overrides, cancel).await
}

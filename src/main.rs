use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use infrakitchen_console::{ApiError, ConfigError, Console, ConsoleConfig, GuardDecision, NavigateOptions, Navigator};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "infrakitchen-console", about = "Drive the InfraKitchen console session core against a live backend")]
struct Cli {
    /// Access token to start from instead of refreshing.
    #[arg(long, global = true, env = "INFRAKITCHEN_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the full-page login URL for an auth provider.
    LoginUrl { provider: String },
    /// Resolve the session and print the signed-in user.
    Whoami,
    /// Guard a navigation to PATH and print the decision.
    Visit { path: String },
    /// Log out against the backend.
    Logout,
}

/// Navigator for a terminal: logs where a browser would have gone.
struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, to: &str, options: NavigateOptions) {
        tracing::info!(%to, replace = options.replace, "navigate");
    }

    fn assign(&self, url: &str) {
        tracing::info!(%url, "page navigation");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let config = ConsoleConfig::from_env()?;
    let console = Console::from_config(&config, Arc::new(LogNavigator))?;
    if let Some(token) = cli.token.as_deref() {
        console.auth.tokens().set(token);
    }

    match cli.command {
        Command::LoginUrl { provider } => {
            println!("{}", infrakitchen_console::HttpAuthApi::login_url_for(&config.api_base_url, &provider));
        }
        Command::Whoami => {
            let state = console.auth.mount().await;
            let Some(user) = state.user else {
                println!("not authenticated");
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Visit { path } => match console.visit(&path).await {
            GuardDecision::Placeholder => println!("loading"),
            GuardDecision::Render => println!("render {path}"),
            GuardDecision::Resume { path } => println!("resume {path}"),
            GuardDecision::RedirectToLogin { location } => println!("redirect {location}"),
        },
        Command::Logout => {
            console.auth.logout().await;
            println!("logged out");
        }
    }
    Ok(ExitCode::SUCCESS)
}

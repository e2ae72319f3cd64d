#![deny(clippy::unwrap_used, clippy::expect_used)]

mod cli;
mod list_cmd;
mod send_cmd;

use std::io::IsTerminal;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

pub use cli::Cli;
pub use cli::Command;
pub use cli::ListArgs;
pub use cli::RouteStyleArg;
pub use cli::SendArgs;
pub use list_cmd::Choice;
pub use list_cmd::parse_choices;
pub use send_cmd::build_params;
pub use send_cmd::render_outcome;

const DEFAULT_LOG_FILTER: &str = "warn,formcall_api_client=info";

pub async fn run_main(cli: Cli) -> anyhow::Result<ExitCode> {
    init_logging();
    match cli.command {
        Command::Send(args) => send_cmd::run(args).await,
        Command::List(args) => list_cmd::run(args).await,
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();
}

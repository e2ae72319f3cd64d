use std::process::ExitCode;

use clap::Parser;
use formcall_cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    formcall_cli::run_main(cli).await
}

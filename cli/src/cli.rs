use std::path::PathBuf;

use clap::ValueEnum;
use formcall_api_client::RouteStyle;

/// Send operations to a formcall backend and inspect the answers.
#[derive(Debug, clap::Parser)]
#[command(name = "formcall", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Submit one operation and print the outcome.
    Send(SendArgs),

    /// Print the entries of a line-delimited list file.
    List(ListArgs),
}

#[derive(Debug, clap::Parser)]
pub struct SendArgs {
    /// Backend operation name.
    pub operation: String,

    /// Operation parameters as a JSON object.
    pub data: String,

    /// Attach a file under a form field. Repeat the field name to send
    /// several files under it.
    #[arg(long = "file", value_parser = parse_file_pair, value_name = "FIELD=PATH")]
    pub files: Vec<(String, PathBuf)>,

    /// TOML file with client defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Tag the call with the fake-mode header.
    #[arg(long)]
    pub fake: bool,

    /// Include payloads in diagnostic log lines.
    #[arg(long)]
    pub log_data: bool,

    #[arg(long)]
    pub log_success: bool,

    #[arg(long)]
    pub no_log_failure: bool,

    /// Reuse an existing session id instead of starting a new one.
    #[arg(long, value_name = "ID")]
    pub session: Option<String>,

    #[arg(long, value_enum)]
    pub route_style: Option<RouteStyleArg>,
}

#[derive(Debug, clap::Parser)]
pub struct ListArgs {
    /// Line-delimited text file, one entry per line.
    pub path: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RouteStyleArg {
    BaseUrl,
    OperationSuffix,
}

impl From<RouteStyleArg> for RouteStyle {
    fn from(value: RouteStyleArg) -> Self {
        match value {
            RouteStyleArg::BaseUrl => RouteStyle::BaseUrl,
            RouteStyleArg::OperationSuffix => RouteStyle::OperationSuffix,
        }
    }
}

fn parse_file_pair(raw: &str) -> Result<(String, PathBuf), String> {
    let (field, path) = raw
        .split_once('=')
        .ok_or_else(|| "file entries must be in FIELD=PATH form".to_string())?;
    let field = field.trim();
    if field.is_empty() || path.is_empty() {
        return Err("file entries must be in FIELD=PATH form".to_string());
    }
    Ok((field.to_string(), PathBuf::from(path)))
}

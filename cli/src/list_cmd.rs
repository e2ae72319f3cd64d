use std::io;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;

use crate::cli::ListArgs;

/// One selectable entry of a line-delimited list file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    /// Zero-based line number in the source text.
    pub index: usize,
    pub label: String,
}

/// Split `text` into entries, one per non-empty line. Blank lines are skipped
/// but still count towards the index of the lines after them.
pub fn parse_choices(text: &str) -> Vec<Choice> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            (!line.is_empty()).then(|| Choice {
                index,
                label: line.to_string(),
            })
        })
        .collect()
}

pub(crate) async fn run(args: ListArgs) -> anyhow::Result<ExitCode> {
    let text = tokio::fs::read_to_string(&args.path)
        .await
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    let mut stdout = io::stdout().lock();
    for choice in parse_choices(&text) {
        writeln!(stdout, "{}\t{}", choice.index, choice.label)?;
    }
    Ok(ExitCode::SUCCESS)
}

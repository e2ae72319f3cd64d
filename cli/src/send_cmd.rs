use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use anyhow::anyhow;
use anyhow::bail;
use formcall_api_client::ApiClient;
use formcall_api_client::Attachment;
use formcall_api_client::AttachmentGroup;
use formcall_api_client::CallOptions;
use formcall_api_client::ClientConfig;
use formcall_api_client::ResponseResult;
use formcall_api_client::SessionState;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use crate::cli::SendArgs;

pub(crate) async fn run(args: SendArgs) -> anyhow::Result<ExitCode> {
    let SendArgs {
        operation,
        data,
        files,
        config,
        base_url,
        fake,
        log_data,
        log_success,
        no_log_failure,
        session,
        route_style,
    } = args;

    let params = build_params(&operation, &data)?;

    let defaults = match &config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("failed to load client config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    let mut client = ApiClient::new(defaults)?;
    if let Some(id) = session {
        client = client.with_session(SessionState::with_id(id));
    }

    let options = CallOptions {
        base_url,
        fake: fake.then_some(true),
        log_data: log_data.then_some(true),
        log_success: log_success.then_some(true),
        log_failure: no_log_failure.then_some(false),
        route_style: route_style.map(Into::into),
        attachments: attachment_groups(files).await?,
        ..CallOptions::default()
    };

    let handle = client.send(&operation, Some(params), Some(options))?;
    let settled = handle.always(move || debug!("call settled"));
    let outcome = handle.outcome().await;
    settled.finished().await;

    let mut stdout = io::stdout().lock();
    let succeeded = render_outcome(&outcome, &mut stdout)?;
    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Check the operation name and parse the parameter text the way the form
/// did before submitting.
pub fn build_params(operation: &str, data: &str) -> anyhow::Result<Map<String, Value>> {
    if operation.trim().is_empty() {
        bail!("Invalid request name.");
    }
    if data.trim().is_empty() {
        bail!("Invalid request data.");
    }
    let value: Value =
        serde_json::from_str(data).map_err(|e| anyhow!("Invalid JSON in endpoint data. {e}"))?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("Invalid request data: expected a JSON object, got {other}"),
    }
}

/// Print the outcome. Returns whether the call succeeded.
pub fn render_outcome(outcome: &ResponseResult, out: &mut impl Write) -> io::Result<bool> {
    match outcome.clone().into_result() {
        Ok(payload) => {
            writeln!(out, "SUCCESS")?;
            writeln!(out, "{}", pretty(&payload))?;
            Ok(true)
        }
        Err(err) => {
            writeln!(out, "ERROR {}", err.message())?;
            if let Some(data) = err.data() {
                writeln!(out, "{}", pretty(data))?;
            }
            Ok(false)
        }
    }
}

async fn attachment_groups(
    files: Vec<(String, PathBuf)>,
) -> anyhow::Result<Vec<AttachmentGroup>> {
    let mut groups: Vec<AttachmentGroup> = Vec::new();
    for (field, path) in files {
        let file = Attachment::from_path(&path)
            .await
            .with_context(|| format!("failed to attach {}", path.display()))?;
        match groups.iter_mut().find(|group| group.field_name == field) {
            Some(group) => group.files.push(file),
            None => groups.push(AttachmentGroup::new(field, vec![file])),
        }
    }
    Ok(groups)
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

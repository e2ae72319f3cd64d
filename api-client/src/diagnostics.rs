use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tracing::info;
use tracing::warn;

use crate::config::ClientConfig;
use crate::types::ResponseResult;

/// Format the per-call diagnostic line, or `None` when the configuration
/// asks for silence on this kind of outcome.
pub fn diagnostic_line(
    settings: &ClientConfig,
    operation: &str,
    outcome: &ResponseResult,
) -> Option<String> {
    let prefix = &settings.log_prefix;
    match outcome {
        ResponseResult::Success(payload) => {
            if !settings.log_success {
                return None;
            }
            let detail = describe(settings, operation, payload.clone());
            Some(format!("{prefix}call succeeded: {detail}"))
        }
        ResponseResult::Application(err) => {
            if !settings.log_failure {
                return None;
            }
            let summary = json!({ "rc": err.rc, "message": err.message });
            let detail = describe(settings, operation, summary);
            Some(format!("{prefix}call failed: {detail}"))
        }
        ResponseResult::Transport(err) => {
            if !settings.log_failure {
                return None;
            }
            let status = err.status.unwrap_or_default();
            Some(format!(
                "{prefix}call failed: {operation}, ({status} {})",
                err.error
            ))
        }
    }
}

pub(crate) fn emit(settings: &ClientConfig, operation: &str, outcome: &ResponseResult) {
    let Some(line) = diagnostic_line(settings, operation, outcome) else {
        return;
    };
    if outcome.is_success() {
        info!("{line}");
    } else {
        warn!("{line}");
    }
}

fn describe(settings: &ClientConfig, operation: &str, value: Value) -> String {
    if !settings.log_data {
        return operation.to_string();
    }
    let mut report = Map::new();
    report.insert(operation.to_string(), value);
    serde_json::to_string(&report).unwrap_or_else(|_| operation.to_string())
}

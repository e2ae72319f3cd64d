use std::sync::Arc;

use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::COOKIE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use serde_json::Map;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::Instrument;
use tracing::debug;
use tracing::trace;

use crate::config::CallOptions;
use crate::config::ClientConfig;
use crate::diagnostics;
use crate::envelope::RequestBody;
use crate::envelope::RequestEnvelope;
use crate::error::ClientError;
use crate::error::Result;
use crate::handle::ResultHandle;
use crate::session::SessionState;
use crate::types::ResponseResult;
use crate::types::TransportError;
use crate::types::classify_response;

const FAKE_MARKER: &str = "1";

/// Dispatches named operations to the backend.
///
/// Cloning is cheap; clones share the defaults, the session and the
/// underlying connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    session: SessionState,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_http_client(config, http))
    }

    /// Use a preconfigured `reqwest` client, e.g. one with a request timeout.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            session: SessionState::new(),
            http,
        }
    }

    pub fn with_session(mut self, session: SessionState) -> Self {
        self.session = session;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Issue one call to `operation`.
    ///
    /// Returns an error only when the call cannot be issued at all: no Tokio
    /// runtime to run it on, an empty operation name, a base URL that does
    /// not parse, or header settings that are not valid HTTP. Everything that
    /// happens on the wire resolves through the returned handle.
    pub fn send(
        &self,
        operation: &str,
        params: Option<Map<String, Value>>,
        options: Option<CallOptions>,
    ) -> Result<ResultHandle> {
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        let effective = self.config.merge(options.unwrap_or_default());
        let target = effective.url_for(operation);
        let settings = effective.settings().clone();
        let envelope = RequestEnvelope::new(operation, params, effective.into_attachments())?;
        let url = target?;

        let headers = self.headers(&settings)?;
        debug!(operation = %operation, url = %url, "dispatching call");
        let request = self.http.post(url).headers(headers);
        let request = match envelope.into_body()? {
            RequestBody::Json(bytes) => request
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(bytes),
            RequestBody::Multipart(form) => request.multipart(form),
        };

        let operation = operation.to_string();
        let call = async move {
            let outcome = execute(request).await;
            diagnostics::emit(&settings, &operation, &outcome);
            outcome
        };
        Ok(ResultHandle::spawn_on(&runtime, call.in_current_span()))
    }

    fn headers(&self, settings: &ClientConfig) -> Result<HeaderMap> {
        let mut h = HeaderMap::new();
        let session_id = self.session.get_or_create();
        h.insert(
            header_name(&settings.sess_header)?,
            header_value(&settings.sess_header, session_id)?,
        );
        if settings.fake {
            h.insert(
                header_name(&settings.fake_header)?,
                HeaderValue::from_static(FAKE_MARKER),
            );
        }
        if settings.sess_id_cookie_exp_days > 0 {
            let cookie = format!("{}={session_id}", settings.sess_id_cookie);
            h.insert(COOKIE, header_value(COOKIE.as_str(), &cookie)?);
        }
        Ok(h)
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ClientError::InvalidHeaderName {
        name: name.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeaderValue {
        name: name.to_string(),
    })
}

async fn execute(request: RequestBuilder) -> ResponseResult {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => return ResponseResult::Transport(TransportError::from_reqwest(&err)),
    };
    let status = response.status();
    trace!("Response status: {status}");
    match response.text().await {
        Ok(body) => classify_response(status, &body),
        Err(err) => {
            let mut failure = TransportError::from_reqwest(&err);
            failure.status = Some(status.as_u16());
            ResponseResult::Transport(failure)
        }
    }
}

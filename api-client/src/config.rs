//! Client defaults and per-call overrides.
//!
//! [`ClientConfig`] holds the shared defaults. A call never mutates them:
//! [`ClientConfig::merge`] layers a [`CallOptions`] over a copy and freezes
//! the result into an [`EffectiveConfig`] that lives for exactly one call.

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::attachments::AttachmentGroup;
use crate::error::ClientError;
use crate::error::Result;

pub const DEFAULT_SESS_HEADER: &str = "X-SID";
pub const DEFAULT_FAKE_HEADER: &str = "X-Fake";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_SESS_ID_COOKIE: &str = "sid";
pub const DEFAULT_LOG_PREFIX: &str = "api: ";

/// How the outbound URL is derived from the base URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStyle {
    /// POST <baseURL>
    #[default]
    BaseUrl,
    /// POST <baseURL>/<operation>
    OperationSuffix,
}

/// Shared client defaults. Keys use the camelCase names the front end
/// configuration has always used, so a TOML file reads like:
///
/// ```toml
/// baseURL = "http://localhost:5000/api"
/// logData = true
/// ```
///
/// Attachments are not a field here: files can only be supplied per call
/// through [`CallOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ClientConfig {
    pub sess_header: String,
    pub fake_header: String,
    #[serde(rename = "baseURL", alias = "baseUrl")]
    pub base_url: String,
    pub fake: bool,
    pub log_data: bool,
    pub log_success: bool,
    pub log_failure: bool,
    pub sess_id_cookie: String,
    /// When greater than zero the session id is also sent as a cookie that
    /// expires after this many days.
    pub sess_id_cookie_exp_days: u32,
    pub log_prefix: String,
    pub route_style: RouteStyle,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sess_header: DEFAULT_SESS_HEADER.to_string(),
            fake_header: DEFAULT_FAKE_HEADER.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            fake: false,
            log_data: false,
            log_success: false,
            log_failure: true,
            sess_id_cookie: DEFAULT_SESS_ID_COOKIE.to_string(),
            sess_id_cookie_exp_days: 0,
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
            route_style: RouteStyle::BaseUrl,
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ClientError::io(path, source))?;
        Self::from_toml_str(&contents)
    }

    /// Layer `options` over a copy of these defaults. `self` is left untouched.
    pub fn merge(&self, options: CallOptions) -> EffectiveConfig {
        let CallOptions {
            sess_header,
            fake_header,
            base_url,
            fake,
            log_data,
            log_success,
            log_failure,
            sess_id_cookie,
            sess_id_cookie_exp_days,
            log_prefix,
            route_style,
            attachments,
        } = options;

        let defaults = self.clone();
        let settings = ClientConfig {
            sess_header: sess_header.unwrap_or(defaults.sess_header),
            fake_header: fake_header.unwrap_or(defaults.fake_header),
            base_url: base_url.unwrap_or(defaults.base_url),
            fake: fake.unwrap_or(defaults.fake),
            log_data: log_data.unwrap_or(defaults.log_data),
            log_success: log_success.unwrap_or(defaults.log_success),
            log_failure: log_failure.unwrap_or(defaults.log_failure),
            sess_id_cookie: sess_id_cookie.unwrap_or(defaults.sess_id_cookie),
            sess_id_cookie_exp_days: sess_id_cookie_exp_days
                .unwrap_or(defaults.sess_id_cookie_exp_days),
            log_prefix: log_prefix.unwrap_or(defaults.log_prefix),
            route_style: route_style.unwrap_or(defaults.route_style),
        };

        EffectiveConfig {
            settings,
            attachments: attachments
                .into_iter()
                .filter(|group| !group.files.is_empty())
                .collect(),
        }
    }
}

/// Per-call overrides. Unset fields fall back to the client defaults.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    pub sess_header: Option<String>,
    pub fake_header: Option<String>,
    pub base_url: Option<String>,
    pub fake: Option<bool>,
    pub log_data: Option<bool>,
    pub log_success: Option<bool>,
    pub log_failure: Option<bool>,
    pub sess_id_cookie: Option<String>,
    pub sess_id_cookie_exp_days: Option<u32>,
    pub log_prefix: Option<String>,
    pub route_style: Option<RouteStyle>,
    /// Files for this call only, one group per form field.
    pub attachments: Vec<AttachmentGroup>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_fake(mut self, fake: bool) -> Self {
        self.fake = Some(fake);
        self
    }

    pub fn with_log_data(mut self, log_data: bool) -> Self {
        self.log_data = Some(log_data);
        self
    }

    pub fn with_log_success(mut self, log_success: bool) -> Self {
        self.log_success = Some(log_success);
        self
    }

    pub fn with_log_failure(mut self, log_failure: bool) -> Self {
        self.log_failure = Some(log_failure);
        self
    }

    pub fn with_route_style(mut self, style: RouteStyle) -> Self {
        self.route_style = Some(style);
        self
    }

    pub fn with_attachments(mut self, group: AttachmentGroup) -> Self {
        self.attachments.push(group);
        self
    }
}

/// Frozen configuration for a single call.
#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    settings: ClientConfig,
    attachments: Vec<AttachmentGroup>,
}

impl EffectiveConfig {
    pub fn settings(&self) -> &ClientConfig {
        &self.settings
    }

    /// Non-empty attachment groups, in the order they were supplied.
    pub fn attachments(&self) -> &[AttachmentGroup] {
        &self.attachments
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    pub(crate) fn into_attachments(self) -> Vec<AttachmentGroup> {
        self.attachments
    }

    /// Routed URL for `operation`. With [`RouteStyle::OperationSuffix`] the
    /// operation is appended as a single percent-encoded path segment.
    pub fn url_for(&self, operation: &str) -> Result<Url> {
        let base = self.settings.base_url.trim_end_matches('/');
        let mut url = Url::parse(base).map_err(|source| ClientError::InvalidBaseUrl {
            url: base.to_string(),
            source,
        })?;
        if self.settings.route_style == RouteStyle::OperationSuffix {
            url.path_segments_mut()
                .map_err(|()| ClientError::BaseUrlWithoutPath {
                    url: base.to_string(),
                })?
                .pop_if_empty()
                .push(operation);
        }
        Ok(url)
    }
}

use std::sync::Arc;
use std::sync::OnceLock;

use uuid::Uuid;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Session identifier shared by every call made through one client.
///
/// The id is set at most once: either by whoever negotiates the session
/// (login, a cookie left by an earlier run) or lazily on the first call.
/// Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    id: Arc<OnceLock<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let state = Self::new();
        state.establish(id);
        state
    }

    /// Pick the session id out of a `Cookie` header (`a=1; sid=abc`).
    pub fn from_cookie_header(header: &str, cookie_name: &str) -> Self {
        let state = Self::new();
        let found = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| name.trim() == cookie_name && !value.trim().is_empty());
        if let Some((_, value)) = found {
            state.establish(value.trim());
        }
        state
    }

    /// Returns `false` if a session id was already in place.
    pub fn establish(&self, id: impl Into<String>) -> bool {
        self.id.set(id.into()).is_ok()
    }

    pub fn get(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }

    pub fn get_or_create(&self) -> &str {
        self.id.get_or_init(|| Uuid::new_v4().to_string())
    }

    /// `Set-Cookie` value for persisting the session, or `None` when cookie
    /// persistence is off (`exp_days == 0`) or no session exists yet.
    pub fn cookie(&self, cookie_name: &str, exp_days: u32) -> Option<String> {
        if exp_days == 0 {
            return None;
        }
        let id = self.get()?;
        let max_age = u64::from(exp_days) * SECONDS_PER_DAY;
        Some(format!("{cookie_name}={id}; Max-Age={max_age}; Path=/"))
    }
}

//! Single-resolution handle for an issued call.
//!
//! The request itself runs on its own Tokio task; the handle only observes
//! it. Every clone of a handle and every reaction registered on it sees the
//! same [`ResponseResult`].

use std::fmt;
use std::future::Future;
use std::future::IntoFuture;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::types::CallError;
use crate::types::ResponseResult;
use crate::types::TransportError;

type SharedOutcome = Shared<BoxFuture<'static, ResponseResult>>;

#[derive(Clone)]
pub struct ResultHandle {
    outcome: SharedOutcome,
}

impl ResultHandle {
    /// Start `call` on `runtime` immediately. It runs to completion even if
    /// every handle is dropped.
    pub(crate) fn spawn_on<F>(runtime: &Handle, call: F) -> Self
    where
        F: Future<Output = ResponseResult> + Send + 'static,
    {
        let task = runtime.spawn(call);
        let outcome = async move {
            match task.await {
                Ok(result) => result,
                Err(err) => ResponseResult::Transport(TransportError {
                    status: None,
                    status_text: "error".to_string(),
                    error: format!("request task failed: {err}"),
                }),
            }
        };
        Self {
            outcome: outcome.boxed().shared(),
        }
    }

    /// A handle that is already resolved.
    pub fn resolved(result: ResponseResult) -> Self {
        Self {
            outcome: futures::future::ready(result).boxed().shared(),
        }
    }

    /// Whether an observer has already received the outcome. A call that has
    /// finished but was never awaited still reports `false`.
    pub fn is_resolved(&self) -> bool {
        self.outcome.peek().is_some()
    }

    pub async fn outcome(&self) -> ResponseResult {
        self.outcome.clone().await
    }

    /// Run `reaction` with the payload if the call succeeds.
    pub fn on_success<F>(&self, reaction: F) -> Reaction
    where
        F: FnOnce(Value) + Send + 'static,
    {
        let outcome = self.outcome.clone();
        Reaction::spawn(async move {
            if let ResponseResult::Success(payload) = outcome.await {
                reaction(payload);
            }
        })
    }

    /// Run `reaction` with the classified error if the call fails.
    pub fn on_failure<F>(&self, reaction: F) -> Reaction
    where
        F: FnOnce(CallError) + Send + 'static,
    {
        let outcome = self.outcome.clone();
        Reaction::spawn(async move {
            if let Err(err) = outcome.await.into_result() {
                reaction(err);
            }
        })
    }

    /// Run `reaction` once the call resolves, whatever the outcome.
    pub fn always<F>(&self, reaction: F) -> Reaction
    where
        F: FnOnce() + Send + 'static,
    {
        let outcome = self.outcome.clone();
        Reaction::spawn(async move {
            let _ = outcome.await;
            reaction();
        })
    }
}

impl IntoFuture for ResultHandle {
    type Output = ResponseResult;
    type IntoFuture = SharedOutcome;

    fn into_future(self) -> Self::IntoFuture {
        self.outcome
    }
}

impl fmt::Debug for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultHandle")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// A registered reaction. Awaiting it is optional; it runs either way.
#[derive(Debug)]
pub struct Reaction {
    task: JoinHandle<()>,
}

impl Reaction {
    fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            task: tokio::spawn(fut),
        }
    }

    /// Wait for the reaction to finish. Returns `false` if it panicked.
    pub async fn finished(self) -> bool {
        self.task.await.is_ok()
    }
}

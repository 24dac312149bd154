//! Trace-id carriers.
//!
//! A trace id lives on one of two unrelated request-scoped carriers: a
//! [`RequestContext`] (immutable, deadline-bearing, cancellable) or a
//! [`RequestValues`] property bag attached to an incoming request. Both
//! implement [`TraceCarrier`], so extraction is a single trait call.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Key under which the trace id is stored on every carrier.
pub const TRACE_ID_KEY: &str = "trace_id";

/// Generate a fresh trace id (random UUID v4, hyphenated).
pub fn new_trace_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Anything that can answer a string-keyed lookup.
pub trait TraceCarrier: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Read the trace id from a carrier.
///
/// An absent carrier, a missing key and an empty value all yield `None`.
pub fn extract_trace_id(carrier: Option<&dyn TraceCarrier>) -> Option<String> {
    carrier?
        .lookup(TRACE_ID_KEY)
        .filter(|id| !id.is_empty())
}

/// Derive a context from `parent` that expires after `timeout` and carries
/// a freshly generated trace id.
///
/// The returned [`CancelHandle`] must be invoked on every exit path.
pub fn ctx_with_trace_id(parent: &RequestContext, timeout: Duration) -> (RequestContext, CancelHandle) {
    let (ctx, cancel) = parent.with_timeout(timeout);
    (ctx.with_value(TRACE_ID_KEY, new_trace_id()), cancel)
}

/// Why a [`RequestContext`] is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

struct ContextNode {
    parent: Option<RequestContext>,
    entry: Option<(String, String)>,
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

/// Immutable request-scoped context with a keyed value store, an optional
/// deadline and a cancellation signal. Cloning is cheap.
#[derive(Clone)]
pub struct RequestContext {
    node: Arc<ContextNode>,
}

impl RequestContext {
    /// Root context: no values, no deadline, never cancelled.
    pub fn background() -> Self {
        RequestContext {
            node: Arc::new(ContextNode {
                parent: None,
                entry: None,
                deadline: None,
                cancel: None,
            }),
        }
    }

    /// Derive a context that additionally maps `key` to `value`.
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        RequestContext {
            node: Arc::new(ContextNode {
                parent: Some(self.clone()),
                entry: Some((key.into(), value.into())),
                deadline: self.node.deadline,
                cancel: self.node.cancel.clone(),
            }),
        }
    }

    /// Derive a cancellable context that also expires at `deadline` (or at
    /// the parent's deadline, whichever comes first).
    pub fn with_deadline(&self, deadline: Instant) -> (Self, CancelHandle) {
        let deadline = match self.node.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        let token = self.child_token();
        let ctx = RequestContext {
            node: Arc::new(ContextNode {
                parent: Some(self.clone()),
                entry: None,
                deadline: Some(deadline),
                cancel: Some(token.clone()),
            }),
        };
        (ctx, CancelHandle { token })
    }

    pub fn with_timeout(&self, timeout: Duration) -> (Self, CancelHandle) {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that is cancelled only explicitly or through its parent.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let token = self.child_token();
        let ctx = RequestContext {
            node: Arc::new(ContextNode {
                parent: Some(self.clone()),
                entry: None,
                deadline: self.node.deadline,
                cancel: Some(token.clone()),
            }),
        };
        (ctx, CancelHandle { token })
    }

    // A child token is unlinked from its parent once every clone is dropped.
    fn child_token(&self) -> CancellationToken {
        match &self.node.cancel {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        }
    }

    /// Nearest value stored under `key`, walking towards the root.
    pub fn value(&self, key: &str) -> Option<&str> {
        let mut node = Some(self);
        while let Some(ctx) = node {
            if let Some((k, v)) = &ctx.node.entry {
                if k == key {
                    return Some(v.as_str());
                }
            }
            node = ctx.node.parent.as_ref();
        }
        None
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.node.deadline
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        if self.node.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Some(CancelReason::Cancelled);
        }
        match self.node.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason().is_some()
    }

    /// Resolve once the context is cancelled or its deadline passes.
    /// Never resolves for [`RequestContext::background`].
    pub async fn cancelled(&self) {
        match (&self.node.cancel, self.node.deadline) {
            (Some(token), Some(deadline)) => {
                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            (Some(token), None) => token.cancelled().await,
            (None, Some(deadline)) => tokio::time::sleep_until(deadline).await,
            (None, None) => std::future::pending::<()>().await,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext::background()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("deadline", &self.node.deadline)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl TraceCarrier for RequestContext {
    fn lookup(&self, key: &str) -> Option<String> {
        self.value(key).map(str::to_string)
    }
}

/// Releases a derived context. Calling [`CancelHandle::cancel`] more than
/// once is a no-op.
#[must_use = "call cancel() on every exit path"]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

/// Mutable per-request property bag, the side table a request handler
/// keeps next to the raw request.
#[derive(Debug, Clone, Default)]
pub struct RequestValues {
    values: HashMap<String, String>,
}

impl RequestValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Store a freshly generated trace id and return it.
    pub fn attach_trace_id(&mut self) -> String {
        let id = new_trace_id();
        self.set(TRACE_ID_KEY, id.clone());
        id
    }
}

impl TraceCarrier for RequestValues {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

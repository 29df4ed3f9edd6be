//! Correlation id shared by a request's log lines and its error envelope.
//!
//! Stored in a tokio task-local. A spawned task starts without one; wrap its
//! future in [`TraceId::scope`] to carry the caller's id across.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Header carrying the trace identifier on HTTP requests and responses.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Trace identifier for one request or connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier in scope for the running task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Identifier in scope, or a fresh one.
    #[must_use]
    pub fn current_or_generate() -> Self {
        Self::current().unwrap_or_else(Self::generate)
    }

    /// Run `fut` with `trace_id` in scope.
    ///
    /// # Examples
    /// ```
    /// use listings_backend::domain::TraceId;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().map(|rt| rt.block_on(async {
    /// let trace_id = TraceId::generate();
    /// let observed = TraceId::scope(trace_id, async move { TraceId::current() }).await;
    /// assert_eq!(observed, Some(trace_id));
    /// # })).ok();
    /// ```
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_is_visible_inside_and_absent_outside() {
        let expected = TraceId::generate();
        let inside = TraceId::scope(expected, async move { TraceId::current() }).await;
        assert_eq!(inside, Some(expected));
        assert_eq!(TraceId::current(), None);
    }

    #[tokio::test]
    async fn current_or_generate_prefers_the_scoped_id() {
        let expected = TraceId::generate();
        let observed = TraceId::scope(expected, async { TraceId::current_or_generate() }).await;
        assert_eq!(observed, expected);
        assert_ne!(TraceId::current_or_generate(), expected);
    }

    #[test]
    fn parses_hyphenated_uuids_and_rejects_noise() {
        let parsed: TraceId = " 3fa85f64-5717-4562-b3fc-2c963f66afa6 "
            .parse()
            .expect("uuid trace id");
        assert_eq!(parsed.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert!("not-a-trace".parse::<TraceId>().is_err());
    }
}

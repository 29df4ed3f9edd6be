//! Shared WebSocket adapter state.
//!
//! The entry point depends on ports only: `AccountQuery` to authenticate the
//! handshake and `ChannelMembership` to register the connection.

use std::sync::Arc;

use tracing::warn;
use url::Url;

use crate::domain::ports::{AccountQuery, ChannelMembership};

/// Origins allowed to open a connection, normalised to `scheme://host[:port]`.
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList(Arc<[String]>);

impl OriginAllowList {
    /// Build the list from configured origins. Unparsable entries are logged
    /// and skipped.
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = origins
            .into_iter()
            .filter_map(|entry| {
                let raw = entry.as_ref().trim();
                match Url::parse(raw) {
                    Ok(url) if url.origin().is_tuple() => Some(url.origin().ascii_serialization()),
                    Ok(_) | Err(_) => {
                        warn!(origin = raw, "ignoring unusable allowed origin");
                        None
                    }
                }
            })
            .collect();
        Self(entries)
    }

    /// Whether `origin` matches an allowed entry exactly.
    pub fn allows(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        if !candidate.is_tuple() {
            return false;
        }
        let serialised = candidate.ascii_serialization();
        self.0.iter().any(|allowed| *allowed == serialised)
    }
}

/// Dependency bundle for the WebSocket entry point and sessions.
#[derive(Clone)]
pub struct WsState {
    pub accounts: Arc<dyn AccountQuery>,
    pub channels: Arc<dyn ChannelMembership>,
    pub origins: OriginAllowList,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(
        accounts: Arc<dyn AccountQuery>,
        channels: Arc<dyn ChannelMembership>,
        origins: OriginAllowList,
    ) -> Self {
        Self {
            accounts,
            channels,
            origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://localhost:5173", true)]
    #[case("http://localhost:5173/", true)]
    #[case("http://localhost:3000", false)]
    #[case("https://localhost:5173", false)]
    #[case("https://listings.example", true)]
    #[case("https://listings.example:443", true)]
    #[case("https://evil.listings.example", false)]
    fn matches_exact_origins(#[case] origin: &str, #[case] expected: bool) {
        let list = OriginAllowList::new(["http://localhost:5173", "https://listings.example"]);
        let parsed = Url::parse(origin).expect("url should parse");
        assert_eq!(list.allows(&parsed), expected);
    }

    #[rstest]
    fn skips_unparsable_entries() {
        let list = OriginAllowList::new(["not a url", "http://localhost:5173"]);
        assert_eq!(list.0.len(), 1);
    }
}

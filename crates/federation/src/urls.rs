//! URL layout of local actors.

use url::Url;

use crate::error::FederationError;

/// Builds and recognizes the URLs of local actors.
///
/// Actors live at `{base}/users/{identifier}`, with their inbox at
/// `{base}/users/{identifier}/inbox` and the shared inbox at `{base}/inbox`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlConfig {
    base_url: Url,
}

impl UrlConfig {
    /// Create a URL config for the instance at `base_url`.
    pub fn new(base_url: Url) -> Result<Self, FederationError> {
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(FederationError::ActorUnresolvable(format!(
                "{base_url} cannot be used as an instance URL"
            )));
        }
        Ok(Self { base_url })
    }

    /// Parse and validate an instance URL.
    pub fn parse(base_url: &str) -> Result<Self, FederationError> {
        let url = Url::parse(base_url)
            .map_err(|e| FederationError::ActorUnresolvable(format!("{base_url}: {e}")))?;
        Self::new(url)
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Host, with the port when it is not the scheme default.
    #[must_use]
    pub fn domain(&self) -> String {
        let host = self.base_url.host_str().unwrap_or_default();
        match self.base_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url
    }

    #[must_use]
    pub fn actor_url(&self, identifier: &str) -> Url {
        self.with_segments(&["users", identifier])
    }

    #[must_use]
    pub fn inbox_url(&self, identifier: &str) -> Url {
        self.with_segments(&["users", identifier, "inbox"])
    }

    #[must_use]
    pub fn shared_inbox_url(&self) -> Url {
        self.with_segments(&["inbox"])
    }

    /// Key id of an actor's main key.
    #[must_use]
    pub fn key_id(actor: &Url) -> String {
        Self::key_id_at(actor, 0)
    }

    /// Key id of the key at `index` in the actor's key list.
    #[must_use]
    pub fn key_id_at(actor: &Url, index: usize) -> String {
        match index {
            0 => format!("{actor}#main-key"),
            n => format!("{actor}#key-{}", n + 1),
        }
    }

    /// Fresh URL for an outbound activity.
    #[must_use]
    pub fn activity_url(&self, id: &str) -> Url {
        self.with_segments(&["activities", id])
    }

    /// The identifier of a local actor URL, if `url` is one.
    #[must_use]
    pub fn local_identifier(&self, url: &Url) -> Option<String> {
        if url.origin() != self.base_url.origin() {
            return None;
        }

        let mut segments = url.path_segments()?;
        let (Some("users"), Some(identifier), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return None;
        };

        (!identifier.is_empty()).then(|| identifier.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> UrlConfig {
        UrlConfig::parse("https://gator.example").unwrap()
    }

    #[test]
    fn test_actor_urls() {
        let config = config();
        assert_eq!(
            config.actor_url("alice").as_str(),
            "https://gator.example/users/alice"
        );
        assert_eq!(
            config.inbox_url("alice").as_str(),
            "https://gator.example/users/alice/inbox"
        );
        assert_eq!(config.shared_inbox_url().as_str(), "https://gator.example/inbox");
        assert_eq!(
            UrlConfig::key_id(&config.actor_url("alice")),
            "https://gator.example/users/alice#main-key"
        );
        assert_eq!(
            UrlConfig::key_id_at(&config.actor_url("alice"), 1),
            "https://gator.example/users/alice#key-2"
        );
    }

    #[test]
    fn test_local_identifier() {
        let config = config();
        let local = Url::parse("https://gator.example/users/alice").unwrap();
        let remote = Url::parse("https://remote.example/users/alice").unwrap();
        let inbox = Url::parse("https://gator.example/users/alice/inbox").unwrap();
        let other = Url::parse("https://gator.example/posts/1").unwrap();

        assert_eq!(config.local_identifier(&local).as_deref(), Some("alice"));
        assert!(config.local_identifier(&remote).is_none());
        assert!(config.local_identifier(&inbox).is_none());
        assert!(config.local_identifier(&other).is_none());
    }

    #[test]
    fn test_domain_includes_non_default_port() {
        assert_eq!(config().domain(), "gator.example");
        assert_eq!(
            UrlConfig::parse("http://localhost:3000").unwrap().domain(),
            "localhost:3000"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(UrlConfig::parse("mailto:admin@gator.example").is_err());
    }
}

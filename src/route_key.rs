use http::Uri;
use std::borrow::Borrow;
use std::fmt;

/// The identity of an incoming request as far as a [`TestServer`] is concerned: the request path
/// followed by `?` and the raw query string, if the query string is not empty.
///
/// Two requests hit the same route if and only if their keys are byte-identical.
/// No normalisation takes place: `/users` and `/users/` are different routes, and so are
/// `/search?a=1&b=2` and `/search?b=2&a=1`. Percent-encoded sequences are compared as they were
/// sent on the wire.
///
/// [`TestServer`]: crate::TestServer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey(String);

impl RouteKey {
    /// Wrap a path, optionally followed by `?` and a query string, as-is.
    pub fn new<K: Into<String>>(key: K) -> Self {
        Self(key.into())
    }

    /// The key, exactly as it is compared against incoming requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the key of an incoming request out of its URI.
    ///
    /// The HTTP method plays no role, neither does the authority (HTTP/2 requests carry it in the
    /// URI, HTTP/1 requests usually don't).
    pub(crate) fn from_uri(uri: &Uri) -> Self {
        match uri.query() {
            Some(query) if !query.is_empty() => Self(format!("{}?{}", uri.path(), query)),
            _ => Self(uri.path().to_owned()),
        }
    }
}

impl From<&str> for RouteKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for RouteKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for RouteKey {
    fn from(key: &String) -> Self {
        Self::new(key.as_str())
    }
}

impl Borrow<str> for RouteKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RouteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

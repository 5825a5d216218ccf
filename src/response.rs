use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use hyper::body::Bytes;
use once_cell::sync::Lazy;
use regex::bytes::{NoExpand, Regex};
use serde::Serialize;

/// The token replaced with the base uri of the [`TestServer`] (e.g. `http://127.0.0.1:4372`)
/// in every response body it sends out.
///
/// It lets fixtures point back at the server that serves them, e.g. a paginated listing whose
/// `next` link is another route configured on the same [`TestServer`].
///
/// [`TestServer`]: crate::TestServer
pub const URI_PLACEHOLDER: &str = "$$URI$$";

static URI_PLACEHOLDER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&regex::escape(URI_PLACEHOLDER)).expect("The placeholder pattern is a valid regex")
});

/// One of the canned responses a [`TestServer`] returns, in order, for a given route.
///
/// A `Response` is either delivered in full or, when built with
/// [`drop_connection`](Response::drop_connection), cut short: the client receives the status
/// code and the headers, then the connection is severed before any byte of the body is sent.
///
/// [`TestServer`]: crate::TestServer
#[derive(Clone, Debug)]
pub struct Response {
    mime: String,
    status_code: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    drop_connection: bool,
}

// `scriptmock` is a crate meant for testing - a status code or header that cannot be converted
// is a mistake in the test itself. Hence we panic and keep the API free of `Result`s.
impl Response {
    /// Start building a `Response` specifying its status code.
    pub fn new<S>(s: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        let status_code = s.try_into().expect("Failed to convert into status code.");
        Self {
            status_code,
            headers: HeaderMap::new(),
            mime: String::new(),
            body: Vec::new(),
            drop_connection: false,
        }
    }

    /// Append a header `value` to list of headers with `key` as header name.
    ///
    /// Existing values for `key` are kept.
    pub fn append_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.append(key, value);
        self
    }

    /// Insert a header `value` with `key` as header name, replacing existing values for `key`.
    ///
    /// A `Content-Type` header set here takes precedence over the one implied by the body setters.
    pub fn insert_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.insert(key, value);
        self
    }

    /// Set the response body to a string.
    ///
    /// It sets "Content-Type" to "text/plain".
    pub fn set_body_string<T>(mut self, body: T) -> Self
    where
        T: TryInto<String>,
        <T as TryInto<String>>::Error: std::fmt::Debug,
    {
        let body = body.try_into().expect("Failed to convert into body.");

        self.body = body.into_bytes();
        self.mime = "text/plain".to_string();
        self
    }

    /// Set the response body with bytes.
    ///
    /// It sets "Content-Type" to "application/octet-stream".
    pub fn set_body_bytes<B>(mut self, body: B) -> Self
    where
        B: TryInto<Vec<u8>>,
        <B as TryInto<Vec<u8>>>::Error: std::fmt::Debug,
    {
        self.body = body.try_into().expect("Failed to convert into body.");
        self.mime = "application/octet-stream".to_string();
        self
    }

    /// Set the response body from a JSON-serializable value.
    ///
    /// It sets "Content-Type" to "application/json".
    /// String values may contain [`URI_PLACEHOLDER`]: the serialized form keeps the token intact.
    pub fn set_body_json<B: Serialize>(mut self, body: B) -> Self {
        self.body = serde_json::to_vec(&body).expect("Failed to convert into body.");
        self.mime = "application/json".to_string();
        self
    }

    /// Set a raw response body. The mime type needs to be set because the
    /// raw body could be of any type.
    pub fn set_body_raw<B>(mut self, body: B, mime: &str) -> Self
    where
        B: TryInto<Vec<u8>>,
        <B as TryInto<Vec<u8>>>::Error: std::fmt::Debug,
    {
        self.body = body.try_into().expect("Failed to convert into body.");
        self.mime = mime.to_string();
        self
    }

    /// Sever the connection once the status code and the headers have been sent.
    ///
    /// The configured body is never transmitted: the client observes an error (or a truncated
    /// message) when it tries to read the body, never a clean end of stream.
    /// Over HTTP/1 the whole connection is closed, even when the response carries no body
    /// (`HEAD` requests, `204`, `304`): it is never reused for another request.
    /// Over HTTP/2 the stream carrying the response is reset.
    ///
    /// ### Example:
    /// ```rust
    /// use scriptmock::{Response, TestServer};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let server = TestServer::start([(
    ///         "/unstable",
    ///         vec![Response::new(200).set_body_string("never sent").drop_connection()],
    ///     )])
    ///     .unwrap();
    ///
    ///     // Act
    ///     let response = reqwest::get(server.url("/unstable")).await.unwrap();
    ///
    ///     // Assert
    ///     assert_eq!(response.status(), 200);
    ///     assert!(response.text().await.is_err());
    /// }
    /// ```
    pub fn drop_connection(mut self) -> Self {
        self.drop_connection = true;
        self
    }

    /// The status code sent to the client, whether the connection is dropped or not.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// The configured body, before [`URI_PLACEHOLDER`] substitution.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `true` if the connection is severed right after the head of this response.
    pub fn drops_connection(&self) -> bool {
        self.drop_connection
    }

    /// Status line and headers, ready to receive a body.
    pub(crate) fn head(&self) -> http::response::Builder {
        let mut builder = http::Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        if !self.mime.is_empty() && !self.headers.contains_key(CONTENT_TYPE) {
            builder = builder.header(CONTENT_TYPE, self.mime.as_str());
        }
        builder
    }

    /// The body with every occurrence of [`URI_PLACEHOLDER`] replaced by `base_uri`.
    pub(crate) fn render_body(&self, base_uri: &str) -> Bytes {
        let rendered = URI_PLACEHOLDER_PATTERN.replace_all(&self.body, NoExpand(base_uri.as_bytes()));
        Bytes::from(rendered.into_owned())
    }
}

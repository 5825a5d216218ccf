use crate::error::StartError;
use crate::route_table::RouteTable;
use crate::test_server::bare_server::BareTestServer;
use crate::{Response, RouteKey, TestServer};
use std::net::TcpListener;

/// A builder providing a fluent API to assemble a [`TestServer`] step-by-step.
/// Use [`TestServer::builder`] to get started.
pub struct TestServerBuilder {
    listener: Option<TcpListener>,
    routes: Vec<(RouteKey, Vec<Response>)>,
}

impl TestServerBuilder {
    pub(super) fn new() -> Self {
        Self {
            listener: None,
            routes: Vec::new(),
        }
    }

    /// Configure the sequence of responses returned, one per request, to the requests whose
    /// path and query string match `route_key` exactly.
    ///
    /// Configuring the same `route_key` twice replaces the first sequence with the second.
    ///
    /// ### Example:
    /// ```rust
    /// use scriptmock::{Response, TestServer};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let server = TestServer::builder()
    ///         .route("/token", [Response::new(429), Response::new(200).set_body_string("t0k3n")])
    ///         .route("/token?refresh=true", [Response::new(200)])
    ///         .start()
    ///         .unwrap();
    ///
    ///     // Act
    ///     let first = reqwest::get(server.url("/token")).await.unwrap();
    ///     let second = reqwest::get(server.url("/token")).await.unwrap();
    ///
    ///     // Assert
    ///     assert_eq!(first.status(), 429);
    ///     assert_eq!(second.status(), 200);
    ///     assert_eq!(second.text().await.unwrap(), "t0k3n");
    /// }
    /// ```
    pub fn route<K, I>(mut self, route_key: K, responses: I) -> Self
    where
        K: Into<RouteKey>,
        I: IntoIterator<Item = Response>,
    {
        self.routes
            .push((route_key.into(), responses.into_iter().collect()));
        self
    }

    /// Configure several routes at once - see [`TestServerBuilder::route`].
    pub fn routes<R, K, I>(self, routes: R) -> Self
    where
        R: IntoIterator<Item = (K, I)>,
        K: Into<RouteKey>,
        I: IntoIterator<Item = Response>,
    {
        routes
            .into_iter()
            .fold(self, |builder, (route_key, responses)| {
                builder.route(route_key, responses)
            })
    }

    /// Each instance of [`TestServer`] is, by default, running on a random
    /// port available on your local machine.
    /// With `TestServerBuilder::listener` you can choose to start the `TestServer`
    /// instance on a specific port you have already bound.
    ///
    /// ### Example:
    /// ```rust
    /// use scriptmock::TestServer;
    ///
    /// // Arrange
    /// let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    /// let expected_server_address = listener
    ///     .local_addr()
    ///     .expect("Failed to get server address.");
    ///
    /// // Act
    /// let server = TestServer::builder().listener(listener).start().unwrap();
    ///
    /// // Assert
    /// assert_eq!(&expected_server_address, server.address());
    /// ```
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Finalise the builder and launch the [`TestServer`] instance!
    ///
    /// Binding the listener (or handing it over to the server) is the only step that can fail:
    /// errors are returned right away and no server is left running.
    pub fn start(self) -> Result<TestServer, StartError> {
        let listener = match self.listener {
            Some(listener) => listener,
            None => TcpListener::bind("127.0.0.1:0").map_err(StartError::Bind)?,
        };
        let server = BareTestServer::start(listener, RouteTable::new(self.routes))?;
        Ok(TestServer::new(server))
    }
}

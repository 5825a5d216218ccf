use crate::error::StartError;
use crate::test_server::bare_server::BareTestServer;
use crate::test_server::TestServerBuilder;
use crate::verification::VerificationOutcome;
use crate::{Response, RouteKey};
use log::debug;
use std::net::SocketAddr;

/// An HTTP web-server running in the background, replaying a scripted sequence of [`Response`]s
/// for each route it was configured with.
///
/// A route is identified by the exact path and query string of the request (see [`RouteKey`]),
/// whatever the HTTP method:
/// - the first request on a route gets the first configured response, the second request gets
///   the second one, and so on;
/// - once all configured responses have been served, every further request on that route gets a
///   `501 Not Implemented` with an empty body;
/// - requests on routes that were never configured get the same `501 Not Implemented`.
///
/// Routes are fixed when the server starts: they cannot be added or removed afterwards.
///
/// Each instance of `TestServer` is fully isolated: [`TestServer::start`] takes care of finding a
/// random port available on your local machine which is assigned to the new `TestServer`.
/// The server shuts down when [`TestServer::close`] is called or when it goes out of scope.
pub struct TestServer(BareTestServer);

impl TestServer {
    pub(super) fn new(server: BareTestServer) -> Self {
        Self(server)
    }

    /// You can use `TestServer::builder` if you need to specify custom configuration - e.g.
    /// run on a specific port.
    ///
    /// If this is not your case, use [`TestServer::start`].
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::new()
    }

    /// Start a new instance of a `TestServer` listening on a random port, serving `routes`.
    ///
    /// ### Example:
    /// ```rust
    /// use scriptmock::{Response, TestServer};
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     // Arrange
    ///     let server = TestServer::start([(
    ///         "/test?v=10",
    ///         vec![
    ///             Response::new(200).set_body_string("response 1"),
    ///             Response::new(201).set_body_string("response 2"),
    ///         ],
    ///     )])
    ///     .unwrap();
    ///     let url = server.url("/test?v=10");
    ///
    ///     // Act & Assert
    ///     let response = reqwest::get(&url).await.unwrap();
    ///     assert_eq!(response.status(), 200);
    ///     assert_eq!(response.text().await.unwrap(), "response 1");
    ///
    ///     let response = reqwest::get(&url).await.unwrap();
    ///     assert_eq!(response.status(), 201);
    ///     assert_eq!(response.text().await.unwrap(), "response 2");
    ///
    ///     // All configured responses have been served.
    ///     let status = reqwest::get(&url).await.unwrap().status();
    ///     assert_eq!(status, 501);
    /// }
    /// ```
    pub fn start<R, K, I>(routes: R) -> Result<Self, StartError>
    where
        R: IntoIterator<Item = (K, I)>,
        K: Into<RouteKey>,
        I: IntoIterator<Item = Response>,
    {
        Self::builder().routes(routes).start()
    }

    /// Return the base uri of this running instance of `TestServer`, e.g. `http://127.0.0.1:4372`.
    ///
    /// It is also the value [`URI_PLACEHOLDER`](crate::URI_PLACEHOLDER) gets replaced with in
    /// response bodies.
    pub fn uri(&self) -> String {
        self.0.uri()
    }

    /// Return the socket address of this running instance of `TestServer`, e.g. `127.0.0.1:4372`.
    ///
    /// Use this method to interact with the `TestServer` using `TcpStream`s.
    pub fn address(&self) -> &SocketAddr {
        self.0.address()
    }

    /// Join the base uri with a path (and query string), e.g. `server.url("/test?v=10")`.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.uri(), path_and_query)
    }

    /// How many requests a configured route has served so far, counting the ones that received a
    /// dropped connection but not the `501`s returned once the route was exhausted.
    ///
    /// Returns `None` if `route_key` was never configured.
    pub fn calls(&self, route_key: &str) -> Option<usize> {
        self.0.calls(route_key)
    }

    /// Verify that every configured response has been served. Panics otherwise, listing the
    /// routes that still have responses left.
    ///
    /// Nothing is verified on drop: call it at the end of the tests that expect their scripts to
    /// be fully consumed.
    pub fn verify(&self) {
        debug!("Verify that all configured responses were served.");
        if let VerificationOutcome::Failure(failed_verifications) = self.0.verify() {
            let verifications_errors: String = failed_verifications
                .iter()
                .map(|report| format!("- {}\n", report.error_message()))
                .collect();
            panic!("Verifications failed:\n{}", verifications_errors);
        }
    }

    /// Shut the server down: stop accepting connections, drop the open ones and release the
    /// port. Calling it more than once is a no-op; dropping the `TestServer` has the same effect.
    pub fn close(&mut self) {
        self.0.close();
    }
}

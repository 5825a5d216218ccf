#![allow(clippy::needless_doctest_main)]
//! `scriptmock` provides a scriptable HTTP test double to perform black-box testing of Rust
//! applications that interact with third-party APIs across several calls.
//!
//! You declare, for each route, the ordered sequence of responses the server returns to
//! successive requests on that route: "the first call succeeds, the second one is rate-limited,
//! the body of the third one cannot be read".
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Routes](#routes)
//! 3. [Dropped connections](#dropped-connections)
//! 4. [Self-referencing bodies](#self-referencing-bodies)
//! 5. [Concurrency](#concurrency)
//! 6. [Runtime compatibility](#runtime-compatibility)
//! 7. [Prior art](#prior-art)
//!
//! ## Getting started
//! ```rust
//! use scriptmock::{Response, TestServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Start a background HTTP server on a random local port, with a script for '/hello':
//!     // it answers with a 200 first, then it is rate-limited.
//!     let server = TestServer::start([(
//!         "/hello",
//!         vec![
//!             Response::new(200).set_body_string("world"),
//!             Response::new(429),
//!         ],
//!     )])
//!     .expect("Failed to start the test server");
//!
//!     let response = reqwest::get(server.url("/hello")).await.unwrap();
//!     assert_eq!(response.status(), 200);
//!     assert_eq!(response.text().await.unwrap(), "world");
//!
//!     let status = reqwest::get(server.url("/hello")).await.unwrap().status();
//!     assert_eq!(status, 429);
//!
//!     // The script for '/hello' is over: a 501 is returned from now on.
//!     let status = reqwest::get(server.url("/hello")).await.unwrap().status();
//!     assert_eq!(status, 501);
//!
//!     // Routes that were never configured get a 501 as well.
//!     let status = reqwest::get(server.url("/missing")).await.unwrap().status();
//!     assert_eq!(status, 501);
//! }
//! ```
//!
//! ## Routes
//!
//! A route is identified by a [`RouteKey`]: the path of the request followed by its raw query
//! string, if any. Matching is exact: no trailing-slash folding, no query parameter reordering,
//! no percent-decoding. The HTTP method is ignored.
//!
//! Routes are configured once, when the [`TestServer`] starts, through [`TestServer::start`] or
//! [`TestServer::builder`].
//!
//! ## Dropped connections
//!
//! A [`Response`] built with [`Response::drop_connection`] sends its status code and headers,
//! then the connection is severed before any byte of the body: reading the body fails on the
//! client side. Over HTTP/1 the connection is closed even for responses without a body, so it is
//! never reused for the next request.
//!
//! ## Self-referencing bodies
//!
//! Every occurrence of [`URI_PLACEHOLDER`] (`$$URI$$`) in a response body is replaced with the
//! base uri of the server, e.g. `http://127.0.0.1:4372`, so that fixtures can link to other
//! routes of the same server.
//!
//! ## Concurrency
//!
//! Requests are served concurrently, but the position in each script is advanced under a lock:
//! every configured response is handed out exactly once, even when many requests race on the
//! same route.
//!
//! ## Runtime compatibility
//!
//! Each [`TestServer`] is driven by its own `tokio` runtime on a background thread: it can be used
//! from [`tokio`], [`async_std`] or synchronous tests alike.
//!
//! ## Prior art
//!
//! [`wiremock`], [`mockito`] and [`httpmock`] provide HTTP mocking for Rust, with request matchers
//! and response templates. `scriptmock` trades their matching flexibility for scripted sequences
//! of responses and connection faults.
//!
//! [`wiremock`]: https://docs.rs/wiremock/
//! [`mockito`]: https://docs.rs/mockito/
//! [`httpmock`]: https://docs.rs/httpmock/
//! [`async_std`]: https://docs.rs/async-std/
//! [`tokio`]: https://docs.rs/tokio/
mod error;
pub mod http;
mod response;
mod route_key;
mod route_table;
mod sequencer;
mod test_server;
mod verification;

pub use error::StartError;
pub use response::{Response, URI_PLACEHOLDER};
pub use route_key::RouteKey;
pub use test_server::{TestServer, TestServerBuilder};

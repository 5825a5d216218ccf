//! All bits and pieces concerning the HTTP test server are in this module.
//!
//! `bare_server::BareTestServer` is the "front-end" to drive behaviour for the `hyper` HTTP
//! server running in the background, defined in the `hyper` sub-module.
//!
//! `bare_server::BareTestServer` is not exposed directly: crate users only get to interact with
//! `exposed_server::TestServer`, assembled through `builder::TestServerBuilder`.
mod bare_server;
mod builder;
mod exposed_server;
mod hyper;

pub use builder::TestServerBuilder;
pub use exposed_server::TestServer;

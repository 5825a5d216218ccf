use std::io;

/// Why a [`TestServer`] could not be started.
///
/// [`TestServer`]: crate::TestServer
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("Failed to bind an OS port for the test server")]
    Bind(#[source] io::Error),
    #[error("Failed to get the address of the test server")]
    LocalAddress(#[source] io::Error),
    #[error("Failed to hand the listener over to the server runtime")]
    Listener(#[source] io::Error),
    #[error("Failed to build the server runtime")]
    Runtime(#[source] io::Error),
    #[error("Failed to spawn the server thread")]
    Spawn(#[source] io::Error),
    #[error("The server thread exited before it started serving")]
    ThreadExited,
}

/// The error a response body fails with when its connection has to be dropped.
#[derive(Debug, thiserror::Error)]
#[error("connection dropped on purpose")]
pub(crate) struct ConnectionDropped;

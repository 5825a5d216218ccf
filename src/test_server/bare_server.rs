use crate::error::StartError;
use crate::route_table::RouteTable;
use crate::sequencer::ResponseSequencer;
use crate::test_server::hyper::run_server;
use crate::verification::VerificationOutcome;
use log::{debug, warn};
use std::net::{SocketAddr, TcpListener};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

/// What the request handler needs to know, shared between the server thread and the
/// `BareTestServer` handle.
pub(super) struct ServerState {
    pub(super) sequencer: ResponseSequencer,
    /// E.g. `http://127.0.0.1:4372`, substituted into response bodies.
    pub(super) base_uri: String,
}

/// An HTTP web-server running in the background, replaying the configured sequences of
/// responses for testing purposes.
///
/// `BareTestServer` is the actual server behind the publicly-exposed `TestServer`.
pub(crate) struct BareTestServer {
    server_state: Arc<ServerState>,
    server_address: SocketAddr,
    // Sending on (or dropping) `shutdown_trigger` makes the listening server terminate.
    shutdown_trigger: Option<tokio::sync::oneshot::Sender<()>>,
    server_thread: Option<JoinHandle<()>>,
}

impl BareTestServer {
    /// Start serving `route_table` on `listener`.
    ///
    /// The server runs on a dedicated thread, driven by its own single-threaded `tokio` runtime:
    /// it works no matter which runtime (if any) the caller is using.
    /// `start` returns once the server is accepting connections.
    pub(crate) fn start(listener: TcpListener, route_table: RouteTable) -> Result<Self, StartError> {
        let server_address = listener.local_addr().map_err(StartError::LocalAddress)?;
        listener.set_nonblocking(true).map_err(StartError::Listener)?;

        let server_state = Arc::new(ServerState {
            sequencer: ResponseSequencer::new(route_table),
            base_uri: format!("http://{}", server_address),
        });
        let (shutdown_trigger, shutdown_receiver) = tokio::sync::oneshot::channel();
        let (ready_sender, ready_receiver) = mpsc::channel();

        let thread_state = server_state.clone();
        let server_thread = std::thread::Builder::new()
            .name(format!("scriptmock-{}", server_address))
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_sender.send(Err(StartError::Runtime(e)));
                        return;
                    }
                };
                runtime.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(listener) {
                        Ok(listener) => listener,
                        Err(e) => {
                            let _ = ready_sender.send(Err(StartError::Listener(e)));
                            return;
                        }
                    };
                    let _ = ready_sender.send(Ok(()));
                    run_server(listener, thread_state, shutdown_receiver).await
                });
            })
            .map_err(StartError::Spawn)?;

        match ready_receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = server_thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = server_thread.join();
                return Err(StartError::ThreadExited);
            }
        }
        debug!("Test server listening on {}", server_address);

        Ok(Self {
            server_state,
            server_address,
            shutdown_trigger: Some(shutdown_trigger),
            server_thread: Some(server_thread),
        })
    }

    pub(crate) fn uri(&self) -> String {
        self.server_state.base_uri.clone()
    }

    pub(crate) fn address(&self) -> &SocketAddr {
        &self.server_address
    }

    pub(crate) fn calls(&self, route_key: &str) -> Option<usize> {
        self.server_state.sequencer.calls(route_key)
    }

    pub(crate) fn verify(&self) -> VerificationOutcome {
        self.server_state.sequencer.verify()
    }

    /// Stop accepting connections, drop the open ones and release the listener.
    /// Calling it more than once is a no-op.
    pub(crate) fn close(&mut self) {
        if let Some(shutdown_trigger) = self.shutdown_trigger.take() {
            debug!("Shutting down the test server on {}", self.server_address);
            let _ = shutdown_trigger.send(());
        }
        if let Some(server_thread) = self.server_thread.take() {
            if server_thread.join().is_err() {
                warn!(
                    "The thread of the test server on {} panicked",
                    self.server_address
                );
            }
        }
    }
}

impl Drop for BareTestServer {
    fn drop(&mut self) {
        self.close();
    }
}

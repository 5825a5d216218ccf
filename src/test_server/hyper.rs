use crate::error::ConnectionDropped;
use crate::response::Response;
use crate::route_table::SequenceResult;
use crate::test_server::bare_server::ServerState;
use crate::RouteKey;
use futures::stream;
use http::header::CONNECTION;
use http::{StatusCode, Version};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::{Bytes, Frame, Incoming};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use log::{debug, warn};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

type ResponseBody = UnsyncBoxBody<Bytes, ConnectionDropped>;

/// How many times a connection is still driven, once a drop has been requested, before it is cut.
const FLUSH_TURNS: usize = 3;

/// The actual HTTP server responding to incoming requests according to the configured routes.
///
/// It returns once `shutdown_signal` resolves; connections still open at that point are
/// dropped together with the runtime driving them.
pub(super) async fn run_server(
    listener: TcpListener,
    server_state: Arc<ServerState>,
    mut shutdown_signal: tokio::sync::oneshot::Receiver<()>,
) {
    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("Failed to accept a connection: {}", e);
                    continue;
                }
            },
            // This future resolves when either:
            // - the sender half of the channel gets dropped (i.e. TestServer is dropped)
            // - the sender is used, therefore sending a poison pill willingly as a shutdown signal
            _ = &mut shutdown_signal => break,
        };

        let server_state = server_state.clone();
        tokio::task::spawn(serve_connection(stream, server_state));
    }
}

/// Serve a single connection until the client hangs up or a response asks for it to be severed.
async fn serve_connection(stream: tokio::net::TcpStream, server_state: Arc<ServerState>) {
    let sever = Arc::new(Notify::new());
    let request_handler = {
        let sever = sever.clone();
        service_fn(move |request: hyper::Request<Incoming>| {
            let server_state = server_state.clone();
            let sever = sever.clone();
            async move { handle_request(request, &server_state, &sever) }
        })
    };
    let builder = auto::Builder::new(TokioExecutor::new());
    let connection = builder.serve_connection(TokioIo::new(stream), request_handler);
    tokio::pin!(connection);

    // `biased`: the connection is polled first, so the head of a dropped response has already
    // been handed to the socket when the sever signal is observed.
    let severed = tokio::select! {
        biased;
        outcome = connection.as_mut() => {
            // Bodies cut by `severed_body` surface here as well, as a user body error.
            if let Err(e) = outcome {
                debug!("Connection closed with an error: {}", e);
            }
            false
        }
        _ = sever.notified() => true,
    };
    if severed {
        for _ in 0..FLUSH_TURNS {
            if futures::poll!(connection.as_mut()).is_ready() {
                break;
            }
            tokio::task::yield_now().await;
        }
        debug!("Connection severed on purpose");
    }
}

fn handle_request(
    request: hyper::Request<Incoming>,
    server_state: &ServerState,
    sever: &Notify,
) -> Result<hyper::Response<ResponseBody>, http::Error> {
    let route_key = RouteKey::from_uri(request.uri());
    debug!("Handling request: {} {}", request.method(), route_key);

    // The lock on the route table is released as soon as `next` returns:
    // rendering happens outside of the critical section.
    match server_state.sequencer.next(route_key.as_str()) {
        SequenceResult::Unmatched(reason) => {
            debug!("Replying 501 to {}: {}", route_key, reason);
            Ok(not_implemented())
        }
        SequenceResult::Matched(response) if response.drops_connection() => {
            debug!(
                "Dropping the connection for {} after sending the status code {}",
                route_key,
                response.status_code()
            );
            let mut head = response.head();
            // HTTP/2 resets the stream through the body instead: the other streams of the
            // connection are left alone.
            if request.version() != Version::HTTP_2 {
                head = head.header(CONNECTION, "close");
                // HEAD requests and bodyless statuses (204, 304) never poll the body.
                sever.notify_one();
            }
            head.body(severed_body())
        }
        SequenceResult::Matched(response) => full_response(&response, &server_state.base_uri),
    }
}

fn not_implemented() -> hyper::Response<ResponseBody> {
    let mut response = hyper::Response::new(empty_body());
    *response.status_mut() = StatusCode::NOT_IMPLEMENTED;
    response
}

fn full_response(
    response: &Response,
    base_uri: &str,
) -> Result<hyper::Response<ResponseBody>, http::Error> {
    let body = Full::new(response.render_body(base_uri))
        .map_err(|never| match never {})
        .boxed_unsync();
    response.head().body(body)
}

fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// A body that fails before yielding a single byte.
///
/// `hyper` aborts the connection when a response body errors: over HTTP/1 the socket is closed
/// in the middle of the message, over HTTP/2 the stream is reset.
/// The body yields back to `hyper` once before failing, so that the status line and the headers
/// are flushed to the client first.
fn severed_body() -> ResponseBody {
    let frames = stream::once(async {
        tokio::task::yield_now().await;
        Err::<Frame<Bytes>, ConnectionDropped>(ConnectionDropped)
    });
    StreamBody::new(frames).boxed_unsync()
}

use reqwest::StatusCode;
use scriptmock::{Response, TestServer};
use std::net::TcpStream;

#[tokio::test]
async fn start_binds_a_listening_port() {
    // Act
    let server = TestServer::start(Vec::<(&str, Vec<Response>)>::new()).unwrap();

    // Assert
    assert!(TcpStream::connect(server.address()).is_ok());
    assert_eq!(server.uri(), format!("http://{}", server.address()));
}

#[tokio::test]
async fn configured_responses_are_replayed_in_order_then_exhausted() {
    // Arrange
    let server = TestServer::start([(
        "/test?v=10",
        vec![
            Response::new(200).set_body_string("response 1"),
            Response::new(201).set_body_string("response 2"),
            Response::new(200).drop_connection(),
        ],
    )])
    .unwrap();
    let url = server.url("/test?v=10");

    // Act & Assert - first configured response
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "response 1");

    // Act & Assert - second configured response
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.text().await.unwrap(), "response 2");

    // Act & Assert - the body of the third one cannot be read
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.is_err());

    // Act & Assert - the sequence is exhausted
    let response = reqwest::get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.text().await.unwrap(), "");
}

#[tokio::test]
async fn returns_501_if_the_route_was_never_configured() {
    // Arrange
    let server = TestServer::start([("/hello", vec![Response::new(200)])]).unwrap();

    // Act
    let response = reqwest::get(server.url("/")).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(response.text().await.unwrap(), "");
    // The configured route was not touched
    assert_eq!(server.calls("/hello"), Some(0));
}

#[tokio::test]
async fn every_request_after_exhaustion_gets_a_501() {
    // Arrange
    let server = TestServer::start([("/once", vec![Response::new(204)])]).unwrap();
    let client = reqwest::Client::new();

    // Act
    let first = client.get(server.url("/once")).send().await.unwrap();
    let mut later = Vec::new();
    for _ in 0..5 {
        let response = client.get(server.url("/once")).send().await.unwrap();
        later.push((response.status(), response.text().await.unwrap()));
    }

    // Assert
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    for (status, body) in later {
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert!(body.is_empty());
    }
    assert_eq!(server.calls("/once"), Some(1));
}

#[tokio::test]
async fn a_route_without_responses_is_exhausted_from_the_start() {
    // Arrange
    let server = TestServer::start([("/empty", Vec::new())]).unwrap();

    // Act
    let status = reqwest::get(server.url("/empty")).await.unwrap().status();

    // Assert
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(server.calls("/empty"), Some(0));
}

#[tokio::test]
async fn the_query_string_is_part_of_the_route() {
    // Arrange
    let server = TestServer::builder()
        .route("/test?v=10", [Response::new(200).set_body_string("v10")])
        .route("/test", [Response::new(200).set_body_string("bare")])
        .start()
        .unwrap();

    // Act
    let other_query = reqwest::get(server.url("/test?v=11")).await.unwrap().status();
    let reordered = reqwest::get(server.url("/test?w=1&v=10")).await.unwrap().status();
    let v10 = reqwest::get(server.url("/test?v=10")).await.unwrap();
    let v10_status = v10.status();
    let v10_body = v10.text().await.unwrap();
    let bare = reqwest::get(server.url("/test")).await.unwrap().text().await.unwrap();

    // Assert
    assert_eq!(other_query, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(reordered, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(v10_status, StatusCode::OK);
    assert_eq!(v10_body, "v10");
    assert_eq!(bare, "bare");
}

#[tokio::test]
async fn trailing_slashes_are_not_folded() {
    // Arrange
    let server = TestServer::start([("/users", vec![Response::new(200)])]).unwrap();

    // Act
    let with_slash = reqwest::get(server.url("/users/")).await.unwrap().status();
    let without_slash = reqwest::get(server.url("/users")).await.unwrap().status();

    // Assert
    assert_eq!(with_slash, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(without_slash, StatusCode::OK);
}

#[tokio::test]
async fn percent_encoded_queries_are_matched_verbatim() {
    // Arrange
    let server = TestServer::start([("/search?q=a%20b", vec![Response::new(200)])]).unwrap();

    // Act
    let plus_encoded = reqwest::get(server.url("/search?q=a+b")).await.unwrap().status();
    let percent_encoded = reqwest::get(server.url("/search?q=a%20b"))
        .await
        .unwrap()
        .status();

    // Assert
    assert_eq!(plus_encoded, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(percent_encoded, StatusCode::OK);
}

#[tokio::test]
async fn the_http_method_does_not_matter() {
    // Arrange
    let server = TestServer::start([(
        "/resource",
        vec![
            Response::new(201),
            Response::new(200),
            Response::new(202),
        ],
    )])
    .unwrap();
    let client = reqwest::Client::new();
    let url = server.url("/resource");

    // Act
    let post = client.post(&url).send().await.unwrap().status();
    let put = client.put(&url).send().await.unwrap().status();
    let delete = client.delete(&url).send().await.unwrap().status();
    let get = client.get(&url).send().await.unwrap().status();

    // Assert - all methods consume the same script
    assert_eq!(post, StatusCode::CREATED);
    assert_eq!(put, StatusCode::OK);
    assert_eq!(delete, StatusCode::ACCEPTED);
    assert_eq!(get, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn routes_advance_independently() {
    // Arrange
    let server = TestServer::builder()
        .route("/a", [Response::new(200), Response::new(500)])
        .route("/b", [Response::new(404)])
        .start()
        .unwrap();

    // Act
    let a1 = reqwest::get(server.url("/a")).await.unwrap().status();
    let b1 = reqwest::get(server.url("/b")).await.unwrap().status();
    let a2 = reqwest::get(server.url("/a")).await.unwrap().status();
    let b2 = reqwest::get(server.url("/b")).await.unwrap().status();

    // Assert
    assert_eq!(a1, StatusCode::OK);
    assert_eq!(b1, StatusCode::NOT_FOUND);
    assert_eq!(a2, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(b2, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn configuring_a_route_twice_keeps_the_last_sequence() {
    // Arrange
    let server = TestServer::builder()
        .route("/twice", [Response::new(200)])
        .route("/twice", [Response::new(418)])
        .start()
        .unwrap();

    // Act
    let first = reqwest::get(server.url("/twice")).await.unwrap().status();
    let second = reqwest::get(server.url("/twice")).await.unwrap().status();

    // Assert
    assert_eq!(first, StatusCode::IM_A_TEAPOT);
    assert_eq!(second, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn configured_headers_are_sent() {
    // Arrange
    let server = TestServer::start([(
        "/limited",
        vec![Response::new(429)
            .insert_header("Retry-After", "1")
            .append_header("X-Attempt", "1")
            .append_header("X-Attempt", "2")],
    )])
    .unwrap();

    // Act
    let response = reqwest::get(server.url("/limited")).await.unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()["retry-after"], "1");
    assert_eq!(response.headers().get_all("x-attempt").iter().count(), 2);
}

#[tokio::test]
async fn body_setters_set_the_content_type() {
    // Arrange
    let server = TestServer::builder()
        .route("/text", [Response::new(200).set_body_string("hi")])
        .route("/raw", [Response::new(200).set_body_raw("<p/>", "text/html")])
        .route(
            "/overridden",
            [Response::new(200)
                .set_body_string("hi")
                .insert_header("content-type", "text/csv")],
        )
        .start()
        .unwrap();

    // Act
    let text = reqwest::get(server.url("/text")).await.unwrap();
    let raw = reqwest::get(server.url("/raw")).await.unwrap();
    let overridden = reqwest::get(server.url("/overridden")).await.unwrap();

    // Assert
    assert_eq!(text.headers()["content-type"], "text/plain");
    assert_eq!(raw.headers()["content-type"], "text/html");
    assert_eq!(overridden.headers()["content-type"], "text/csv");
}

#[tokio::test]
async fn calls_counts_the_served_responses() {
    // Arrange
    let server = TestServer::start([(
        "/counted",
        vec![Response::new(200), Response::new(200).drop_connection()],
    )])
    .unwrap();

    // Act & Assert
    assert_eq!(server.calls("/counted"), Some(0));
    reqwest::get(server.url("/counted")).await.unwrap();
    assert_eq!(server.calls("/counted"), Some(1));
    // A dropped connection still consumes its response
    let _ = reqwest::get(server.url("/counted")).await;
    assert_eq!(server.calls("/counted"), Some(2));
    // An exhausted route does not count any further
    reqwest::get(server.url("/counted")).await.unwrap();
    assert_eq!(server.calls("/counted"), Some(2));
    assert_eq!(server.calls("/unknown"), None);
}

#[tokio::test]
async fn verify_passes_once_every_response_was_served() {
    // Arrange
    let server = TestServer::start([("/done", vec![Response::new(200)])]).unwrap();

    // Act
    reqwest::get(server.url("/done")).await.unwrap();

    // Assert
    server.verify();
}

#[tokio::test]
#[should_panic(expected = "Verifications failed:
- /a. Configured responses: 2, served: 1
- /b. Configured responses: 1, served: 0
")]
async fn verify_panics_listing_the_routes_with_responses_left() {
    // Arrange
    let server = TestServer::builder()
        .route("/b", [Response::new(200)])
        .route("/a", [Response::new(200), Response::new(200)])
        .route("/c", Vec::<Response>::new())
        .start()
        .unwrap();

    // Act
    reqwest::get(server.url("/a")).await.unwrap();

    // Assert
    server.verify();
}

#[tokio::test]
async fn close_releases_the_port_and_is_idempotent() {
    // Arrange
    let mut server = TestServer::start([("/", vec![Response::new(200)])]).unwrap();
    let address = *server.address();
    assert!(TcpStream::connect(address).is_ok());

    // Act
    server.close();
    server.close();

    // Assert
    assert!(TcpStream::connect(address).is_err());
}

#[tokio::test]
async fn servers_are_isolated() {
    // Arrange
    let server_one = TestServer::start([("/shared", vec![Response::new(200)])]).unwrap();
    let server_two = TestServer::start([("/shared", vec![Response::new(200)])]).unwrap();
    assert_ne!(server_one.address(), server_two.address());

    // Act
    let one = reqwest::get(server_one.url("/shared")).await.unwrap().status();
    let two = reqwest::get(server_two.url("/shared")).await.unwrap().status();

    // Assert - each server has its own cursors
    assert_eq!(one, StatusCode::OK);
    assert_eq!(two, StatusCode::OK);
}

//! Integration tests for httpchain -- drives the real blocking transport
//! against a local wiremock `MockServer`.
//!
//! The blocking client must not run on an async worker thread, so every
//! `send()` goes through [`blocking`].

use httpchain::{
    BodyEncoding, Exchange, RequestBuilder, StatusCode, TransportErrorKind, TransportOption,
};
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A tracing subscriber that accepts every event but discards all output, so
/// the crate's `trace!()` arguments are evaluated under `--features tracing`.
#[cfg(feature = "tracing")]
struct SinkSubscriber;

#[cfg(feature = "tracing")]
impl tracing::Subscriber for SinkSubscriber {
    fn enabled(&self, _: &tracing::Metadata<'_>) -> bool {
        true
    }
    fn new_span(&self, _: &tracing::span::Attributes<'_>) -> tracing::span::Id {
        tracing::span::Id::from_u64(1)
    }
    fn record(&self, _: &tracing::span::Id, _: &tracing::span::Record<'_>) {}
    fn record_follows_from(&self, _: &tracing::span::Id, _: &tracing::span::Id) {}
    fn event(&self, _: &tracing::Event<'_>) {}
    fn enter(&self, _: &tracing::span::Id) {}
    fn exit(&self, _: &tracing::span::Id) {}
}

/// Run `f` on the blocking pool and return its result.
async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

/// Build and send `method url` with no further configuration.
async fn send_simple(verb: &'static str, url: String) -> Exchange {
    blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method(verb))
            .and_then(RequestBuilder::send)
            .expect("validation should pass")
    })
    .await
}

// -----------------------------------------------------------------------
// Core request / response
// -----------------------------------------------------------------------

/// `get_200`: GET /data -> 200 + body; verify status and text.
#[tokio::test]
async fn get_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello world"))
        .expect(1)
        .mount(&server)
        .await;

    let ex = send_simple("get", format!("{}/data", server.uri())).await;

    assert!(!ex.has_error(), "unexpected transport error: {:?}", ex.error());
    assert_eq!(ex.status_code(), Some(StatusCode::OK));
    assert_eq!(ex.response().as_deref(), Some("hello world"));
}

/// An HTTP error status is a successful exchange.
#[tokio::test]
async fn status_404_is_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;

    let ex = send_simple("GET", format!("{}/missing", server.uri())).await;

    assert!(!ex.has_error());
    assert_eq!(ex.status_code(), Some(StatusCode::NOT_FOUND));
    assert_eq!(ex.response().as_deref(), Some("nope"));
}

#[tokio::test]
async fn empty_response_body_is_not_the_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/items/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let ex = send_simple("delete", format!("{}/items/7", server.uri())).await;

    assert_eq!(ex.status_code(), Some(StatusCode::NO_CONTENT));
    assert_eq!(ex.response().as_deref(), Some(""));
}

// -----------------------------------------------------------------------
// Bodies and method directives
// -----------------------------------------------------------------------

/// POST + JSON body: the server sees the JSON object and content type.
#[tokio::test]
async fn post_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"a": "1"})))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("POST"))
            .and_then(|rb| rb.body([("a", "1")], BodyEncoding::Json))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert_eq!(ex.status_code(), Some(StatusCode::CREATED));
    assert_eq!(ex.response().as_deref(), Some("created"));
}

/// Form bodies get the urlencoded content type from the transport.
#[tokio::test]
async fn post_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/form"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("a=1&b=two+words"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/form", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("post"))
            .and_then(|rb| rb.form_body([("a", "1"), ("b", "two words")]))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert_eq!(ex.status_code(), Some(StatusCode::OK));
}

/// PUT and PATCH go out through the custom-method directive with their body.
#[tokio::test]
async fn put_and_patch_with_bodies() {
    let server = MockServer::start().await;
    for verb in ["PUT", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/thing"))
            .and(body_json(serde_json::json!({"verb": verb})))
            .respond_with(ResponseTemplate::new(200).set_body_string(verb))
            .expect(1)
            .mount(&server)
            .await;
    }

    for verb in ["PUT", "PATCH"] {
        let url = format!("{}/thing", server.uri());
        let ex = blocking(move || {
            RequestBuilder::new()
                .and_then(|rb| rb.url(&url))
                .and_then(|rb| rb.method(verb))
                .and_then(|rb| rb.json_body([("verb", verb)]))
                .and_then(RequestBuilder::exec)
                .expect("send")
        })
        .await;
        assert_eq!(ex.response().as_deref(), Some(verb), "{verb}");
    }
}

// -----------------------------------------------------------------------
// Headers
// -----------------------------------------------------------------------

#[tokio::test]
async fn raw_headers_accept_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("accept", "application/json"))
        .and(header("authorization", "Bearer t0ken"))
        .and(header("x-custom", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/me", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.headers(["X-Custom: yes"]).json().bearer("t0ken"))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert!(!ex.has_error(), "{:?}", ex.error());
    assert_eq!(ex.response().as_deref(), Some("{}"));
}

/// A malformed header line is reported by the transport, not the builder.
#[tokio::test]
async fn malformed_header_line_is_polled() {
    let server = MockServer::start().await;

    let ex = blocking({
        let url = format!("{}/never", server.uri());
        move || {
            RequestBuilder::new()
                .and_then(|rb| rb.url(&url))
                .and_then(|rb| rb.method("GET"))
                .map(|rb| rb.headers(["this line has no colon"]))
                .and_then(RequestBuilder::send)
                .expect("builder accepts any header line")
        }
    })
    .await;

    assert!(ex.has_error());
    assert!(ex.error().is_some_and(|e| e.contains("malformed header line")));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// -----------------------------------------------------------------------
// Option overrides
// -----------------------------------------------------------------------

#[tokio::test]
async fn url_override_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/right"))
        .respond_with(ResponseTemplate::new(200).set_body_string("overridden"))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&format!("{base}/wrong")))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings([TransportOption::Url(format!("{base}/right"))]))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert_eq!(ex.response().as_deref(), Some("overridden"));
}

#[tokio::test]
async fn user_agent_override() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "httpchain-test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = server.uri();
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings([TransportOption::UserAgent("httpchain-test/1.0".into())]))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert_eq!(ex.status_code(), Some(StatusCode::OK));
}

/// Raw `PostFields` on a GET-configured builder turns the request into a
/// POST, as the option layer is applied verbatim.
#[tokio::test]
async fn raw_post_fields_override() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/raw"))
        .and(body_string("raw=1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/raw", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings([TransportOption::PostFields("raw=1".into())]))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert_eq!(ex.status_code(), Some(StatusCode::OK));
}

#[tokio::test]
async fn follow_location_disabled_returns_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/old", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings([TransportOption::FollowLocation(false)]))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await;

    assert!(!ex.has_error());
    assert_eq!(ex.status_code(), Some(StatusCode::FOUND));
}

/// Mount `/a -> 302 /b -> 302 /c -> 200`, expecting `hits` calls on each hop.
async fn redirect_chain(server: &MockServer, hits: [u64; 3]) {
    for (from, to, n) in [("/a", "/b", hits[0]), ("/b", "/c", hits[1])] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", to))
            .expect(n)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string("end"))
        .expect(hits[2])
        .mount(server)
        .await;
}

/// Send GET `url` with `settings` applied.
async fn send_with(url: String, settings: Vec<TransportOption>) -> Exchange {
    blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings(settings))
            .and_then(RequestBuilder::send)
            .expect("send")
    })
    .await
}

/// Two hops under `MaxRedirs(1)`: the second redirect is a polled error.
#[tokio::test]
async fn max_redirs_exceeded_is_polled() {
    let server = MockServer::start().await;
    redirect_chain(&server, [1, 1, 0]).await;

    let ex = send_with(
        format!("{}/a", server.uri()),
        vec![TransportOption::MaxRedirs(1)],
    )
    .await;

    assert!(ex.has_error());
    assert_eq!(
        ex.transport_error().map(|e| e.kind()),
        Some(TransportErrorKind::Redirect)
    );
    assert_eq!(ex.status_code(), None);
    assert!(ex.response().is_none());
}

#[tokio::test]
async fn max_redirs_within_limit_follows_chain() {
    let server = MockServer::start().await;
    redirect_chain(&server, [1, 1, 1]).await;

    let ex = send_with(
        format!("{}/a", server.uri()),
        vec![
            TransportOption::FollowLocation(true),
            TransportOption::MaxRedirs(2),
        ],
    )
    .await;

    assert!(!ex.has_error(), "{:?}", ex.error());
    assert_eq!(ex.status_code(), Some(StatusCode::OK));
    assert_eq!(ex.response().as_deref(), Some("end"));
}

/// Client-level options build a one-off client; a plain request still works.
#[tokio::test]
async fn connect_timeout_and_ssl_verify_overrides() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let ex = send_with(
        format!("{}/plain", server.uri()),
        vec![
            TransportOption::ConnectTimeout(Duration::from_secs(2)),
            TransportOption::SslVerifyPeer(false),
        ],
    )
    .await;

    assert!(!ex.has_error(), "{:?}", ex.error());
    assert_eq!(ex.status_code(), Some(StatusCode::OK));
    assert_eq!(ex.response().as_deref(), Some("ok"));
}

/// An unparseable proxy fails client construction; `send()` still returns
/// `Ok` and nothing reaches the server.
#[tokio::test]
async fn malformed_proxy_is_polled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ex = send_with(
        format!("{}/never", server.uri()),
        vec![TransportOption::Proxy("not a proxy url".to_owned())],
    )
    .await;

    assert!(ex.has_error());
    assert_eq!(
        ex.transport_error().map(|e| e.kind()),
        Some(TransportErrorKind::Request)
    );
    assert!(ex.error().is_some_and(|e| !e.is_empty()));
    assert!(ex.response().is_none());
    assert_eq!(ex.status_code(), None);
}

#[tokio::test]
async fn timeout_override_is_polled() {
    #[cfg(feature = "tracing")]
    let _guard = tracing::subscriber::set_default(SinkSubscriber);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let url = format!("{}/slow", server.uri());
    let ex = blocking(move || {
        RequestBuilder::new()
            .and_then(|rb| rb.url(&url))
            .and_then(|rb| rb.method("GET"))
            .map(|rb| rb.settings([TransportOption::Timeout(Duration::from_millis(200))]))
            .and_then(RequestBuilder::send)
            .expect("timeouts are not returned as Err")
    })
    .await;

    assert!(ex.has_error());
    assert!(ex.transport_error().is_some_and(|e| e.is_timeout()), "{:?}", ex.transport_error());
    assert!(ex.response().is_none());
    assert!(ex.status_code().is_none());
}

// -----------------------------------------------------------------------
// Transport failures
// -----------------------------------------------------------------------

/// Nothing listens on port 1: connect fails, and the failure is polled.
#[tokio::test]
async fn unreachable_host_is_polled() {
    let ex = send_simple("GET", "http://127.0.0.1:1/".to_owned()).await;

    assert!(ex.has_error());
    assert!(ex.has_errors());
    assert!(ex.error().is_some_and(|e| !e.is_empty()));
    assert_eq!(ex.error(), ex.errors());
    assert!(ex.transport_error().is_some_and(|e| e.is_connect()));
    assert!(ex.response().is_none());
}

#[tokio::test]
async fn validation_errors_are_raised_before_any_request() {
    let server = MockServer::start().await;

    let uri = server.uri();
    let errs = blocking(move || {
        let no_url = RequestBuilder::new()
            .and_then(|rb| rb.method("GET"))
            .and_then(RequestBuilder::send)
            .expect_err("no url");
        let no_method = RequestBuilder::new()
            .and_then(|rb| rb.url(&uri))
            .and_then(RequestBuilder::send)
            .expect_err("no method");
        let get_body = RequestBuilder::new()
            .and_then(|rb| rb.url(&uri))
            .and_then(|rb| rb.method("GET"))
            .and_then(|rb| rb.form_body([("a", "1")]))
            .expect_err("GET body");
        (no_url, no_method, get_body)
    })
    .await;

    assert!(errs.0.is_url_not_set());
    assert!(errs.1.is_method_not_set());
    assert!(errs.2.is_body_not_allowed());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

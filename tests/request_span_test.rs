use axum::{body::Body, http::Request};
use pdf_compressor::config::ServerConfig;
use pdf_compressor::{AppState, create_app};
use std::fmt;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Records the `request_id` field of every new span
#[derive(Clone, Default)]
struct RequestIds(Arc<Mutex<Vec<String>>>);

struct RequestIdVisitor<'a>(&'a mut Vec<String>);

impl Visit for RequestIdVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "request_id" {
            self.0.push(format!("{:?}", value));
        }
    }
}

impl<S: Subscriber> Layer<S> for RequestIds {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut ids = self.0.lock().unwrap();
        attrs.record(&mut RequestIdVisitor(&mut ids));
    }
}

#[tokio::test]
async fn test_request_span_carries_minted_id() {
    let recorded = RequestIds::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));

    let app = create_app(AppState::new(ServerConfig::development()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let minted = response.headers()["x-request-id"].to_str().unwrap().to_string();
    let ids = recorded.0.lock().unwrap().clone();
    assert_eq!(ids, vec![minted]);
}

#[tokio::test]
async fn test_request_span_keeps_caller_id() {
    let recorded = RequestIds::default();
    let _guard =
        tracing::subscriber::set_default(tracing_subscriber::registry().with(recorded.clone()));

    let app = create_app(AppState::new(ServerConfig::development()));
    app.oneshot(
        Request::builder()
            .uri("/health")
            .header("x-request-id", "trace-me-42")
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let ids = recorded.0.lock().unwrap().clone();
    assert_eq!(ids, vec!["trace-me-42".to_string()]);
}

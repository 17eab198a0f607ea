use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use deck_api::ApiClient;
use deck_machines::{Backend, Error, ImageLookup, ImageStore, LogNotifier, Notifier};
use tokio::net::TcpListener;

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// Counts how many times the image listing endpoint was hit.
#[derive(Clone, Default)]
struct ListingHits(Arc<AtomicUsize>);

async fn serve_images(State(hits): State<ListingHits>) -> axum::Json<serde_json::Value> {
    hits.0.fetch_add(1, Ordering::Relaxed);
    axum::Json(serde_json::json!([
        {"id": "img1", "name": "Ubuntu 24.04"},
        {"id": "img2", "name": "Debian 13"},
    ]))
}

async fn spawn_image_server(hits: ListingHits) -> SocketAddr {
    let app = Router::new()
        .route("/backends/{backend_id}/images", get(serve_images))
        .with_state(hits);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });
    addr
}

#[tokio::test]
async fn image_store_fetches_listing_once() {
    let hits = ListingHits::default();
    let addr = spawn_image_server(hits.clone()).await;

    let store = ImageStore::new(ApiClient::new(format!("http://{addr}")), "b1");

    let first = store.get_image("img1").await.expect("known image");
    assert_eq!(first.name, "Ubuntu 24.04");

    let second = store.get_image("img2").await.expect("known image");
    assert_eq!(second.name, "Debian 13");

    // Both lookups served from the one cached listing.
    assert_eq!(hits.0.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn image_store_reports_unknown_image() {
    let hits = ListingHits::default();
    let addr = spawn_image_server(hits.clone()).await;

    let store = ImageStore::new(ApiClient::new(format!("http://{addr}")), "b1");

    match store.get_image("img9").await {
        Err(Error::UnknownImage(id)) => assert_eq!(id, "img9"),
        other => panic!("expected UnknownImage, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_default_image_lookup_is_http_backed() {
    let hits = ListingHits::default();
    let addr = spawn_image_server(hits.clone()).await;

    let notifier = Arc::new(RecordingNotifier::default());
    let backend = Backend::new(ApiClient::new(format!("http://{addr}")), "b1", notifier);

    let image = backend.images().get_image("img2").await.expect("known image");
    assert_eq!(image.name, "Debian 13");
    assert_eq!(hits.0.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn from_env_requires_api_url() {
    unsafe { std::env::remove_var("DECK_API_URL") };
    match Backend::from_env("b1", Arc::new(LogNotifier)) {
        Err(Error::MissingEnv(var)) => assert_eq!(var, "DECK_API_URL"),
        other => panic!("expected MissingEnv, got {:?}", other.map(|b| b.id().to_string())),
    }

    unsafe { std::env::set_var("DECK_API_URL", "http://localhost:8080/") };
    let backend = Backend::from_env("b1", Arc::new(LogNotifier)).expect("configured");
    assert_eq!(backend.id(), "b1");
    assert_eq!(backend.client().base_url(), "http://localhost:8080");
}

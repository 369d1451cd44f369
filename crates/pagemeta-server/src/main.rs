// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;

use axum::response::Html;
use axum::routing::get;
use axum::{Extension, Json, Router};
use pagemeta_server::{
    attach, route_table, Classifier, Defaults, MetaSlot, MetaUpdate, Metadata, PagemetaState,
    RouteDefinition, RouteKind, RoutePublisher,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

const HOME_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"></head><body><h1>Home</h1></body></html>";
const ABOUT_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>About us</title></head><body><h1>About</h1></body></html>";
const OPT_OUT_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\"></head><body><h1>No metadata here</h1></body></html>";

async fn home(Extension(slot): Extension<MetaSlot>) -> Html<&'static str> {
    let mut meta = Metadata::new();
    meta.insert("title", json!("Home"));
    meta.insert("description", json!("pagemeta demo landing page"));
    slot.set(MetaUpdate::Values(meta));
    Html(HOME_PAGE)
}

async fn about() -> Html<&'static str> {
    // Defaults only; the template's own title stays because defaults carry
    // no title key.
    Html(ABOUT_PAGE)
}

async fn opt_out(Extension(slot): Extension<MetaSlot>) -> Html<&'static str> {
    slot.suppress();
    Html(OPT_OUT_PAGE)
}

async fn api_data() -> Json<serde_json::Value> {
    Json(json!({"message": "hello"}))
}

fn demo_router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/opt-out", get(opt_out))
        .route("/api/data.json", get(api_data))
}

fn publish_demo_routes(publisher: RoutePublisher) -> Result<(), String> {
    publisher
        .publish(&[
            RouteDefinition::new(RouteKind::Page, "^/$"),
            RouteDefinition::new(RouteKind::Page, "^/about$"),
            RouteDefinition::new(RouteKind::Page, "^/opt-out$"),
            RouteDefinition::new(RouteKind::Endpoint, "^/api/.*$"),
        ])
        .map_err(|e| format!("route table publish failed: {e}"))
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env_str("PAGEMETA_LISTEN", "127.0.0.1:8080");
    let site_name = env_str("PAGEMETA_SITE_NAME", "Pagemeta Demo");
    let classifier_mode = env_str("PAGEMETA_CLASSIFIER", "routes");

    let (classifier, publisher) = match classifier_mode.as_str() {
        "routes" => {
            let (publisher, table) = route_table();
            (Classifier::Routes(table), Some(publisher))
        }
        "content-type" => (Classifier::ContentType, None),
        other => return Err(format!("invalid PAGEMETA_CLASSIFIER value: {other}")),
    };

    let mut defaults = Metadata::new();
    defaults.insert("og:site_name", json!(site_name));
    defaults.insert("generator", json!("pagemeta"));
    let state = PagemetaState::new(Defaults::Static(defaults), classifier);

    let app = attach(demo_router(), state);
    if let Some(publisher) = publisher {
        publish_demo_routes(publisher)?;
    }

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("bind {bind_addr} failed: {e}"))?;
    info!("pagemeta demo listening on {bind_addr}");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server failed: {e}"))
}

// SPDX-License-Identifier: Apache-2.0

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pagemeta_core::{resolve, RequestContext, Resolution};
use serde_json::json;
use tracing::{debug, error};

use crate::classify::Eligibility;
use crate::slot::MetaSlot;
use crate::PagemetaState;

pub(crate) async fn pagemeta_middleware(
    State(state): State<PagemetaState>,
    mut request: Request,
    next: Next,
) -> Response {
    let slot = MetaSlot::new();
    request.extensions_mut().insert(slot.clone());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    // Downstream failures pass through untouched.
    let response = next.run(request).await;

    let eligibility = match state.classifier.classify(&path, response.headers()).await {
        Ok(eligibility) => eligibility,
        Err(err) => {
            error!(route = %path, error = %err, "route classification failed");
            return internal_error("RouteTableUnavailable", &err.to_string());
        }
    };
    let route_pattern = match eligibility {
        Eligibility::Skip => {
            debug!(route = %path, "response not eligible for metadata injection");
            return response;
        }
        Eligibility::Page { route_pattern } => route_pattern,
    };

    let ctx = RequestContext {
        method,
        path: path.clone(),
        query,
        route_pattern,
    };
    let merged = match resolve(&slot.snapshot(), &state.defaults, &ctx) {
        Ok(Resolution::Skip) => {
            debug!(route = %path, "no metadata to inject");
            return response;
        }
        Ok(Resolution::Apply(merged)) => merged,
        Err(err) => {
            error!(route = %path, error = %err, "metadata resolution failed");
            return internal_error(err.code(), &err.to_string());
        }
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(route = %path, error = %err, "reading response body failed");
            return internal_error("RewriteFailed", &err.to_string());
        }
    };
    let html = match std::str::from_utf8(&bytes) {
        Ok(html) => html,
        Err(_) => {
            error!(route = %path, "response body is not valid utf-8");
            return internal_error("RewriteFailed", "response body is not valid utf-8");
        }
    };
    let rewritten = match state.rewriter.rewrite(html, &merged).await {
        Ok(rewritten) => rewritten,
        Err(err) => {
            error!(route = %path, error = %err, "head rewrite failed");
            return internal_error("RewriteFailed", &err.to_string());
        }
    };

    // Status and headers survive; the stale content-length goes so the
    // transport reframes the new body.
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(rewritten))
}

fn internal_error(code: &str, message: &str) -> Response {
    let body = Json(json!({"error": {"code": code, "message": message}}));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}

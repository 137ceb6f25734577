use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use crate::{AppState, config::Config, db, store::MovieStore, tmdb::Catalog};

const FAKE_TOKEN: &str = "Bearer test-token";

/// Serves a tiny slice of the TMDB API on an ephemeral port and returns its
/// base URL.
pub async fn spawn_fake_tmdb() -> String {
    let app = Router::new()
        .route("/search/movie", get(search))
        .route("/movie/{id}", get(details));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fake tmdb");
    let addr = listener.local_addr().expect("fake tmdb addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake tmdb server");
    });
    format!("http://{addr}")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(FAKE_TOKEN)
}

/// Query that makes the fake search answer without a `results` array.
pub const MALFORMED_QUERY: &str = "no results field";

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("query").map(String::as_str) == Some(MALFORMED_QUERY) {
        return Json(json!({ "page": 1 })).into_response();
    }
    Json(json!({
        "page": 1,
        "results": [
            {
                "id": 42,
                "title": "Phone Booth",
                "release_date": "2002-11-14",
                "overview": "A publicist is pinned down in a phone booth.",
                "backdrop_path": "/booth.jpg",
                "poster_path": "/booth-poster.jpg"
            },
            {
                "id": 7,
                "title": "Phone Booth Blues",
                "overview": "",
                "backdrop_path": null,
                "poster_path": null
            }
        ]
    }))
    .into_response()
}

async fn details(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let body = match id.as_str() {
        "42" => json!({
            "id": 42,
            "title": "Phone Booth",
            "release_date": "2002-01-01",
            "overview": "A publicist is pinned down in a phone booth.",
            "backdrop_path": "/booth.jpg"
        }),
        "949" => json!({
            "id": 949,
            "title": "Heat",
            "release_date": "1995-12-15",
            "overview": "A group of high-end professional thieves.",
            "backdrop_path": "/heat.jpg"
        }),
        _ => return (StatusCode::NOT_FOUND, Json(json!({ "success": false }))).into_response(),
    };
    Json(body).into_response()
}

pub async fn memory_store() -> MovieStore {
    MovieStore::new(db::connect_in_memory().await)
}

pub fn state_with(store: MovieStore, catalog: Arc<dyn Catalog>) -> AppState {
    AppState::new(&Config::for_tests("http://unused"), store, catalog)
}

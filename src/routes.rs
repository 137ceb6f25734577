use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use tracing::info;

use crate::{
    AppState,
    error::AppResult,
    models::{EditForm, IdQuery, SearchForm},
    ranking, templates,
};

const FLASH_COOKIE: &str = "flash";

pub async fn home(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let mut movies = state.store.list_all_ordered_by_rating().await?;
    let changed = ranking::assign_ranks(&mut movies);
    state.store.save_rankings(&changed).await?;

    let (jar, flash) = take_flash(jar);
    Ok((jar, Html(templates::home_page(&movies, flash.as_deref()))))
}

pub async fn add_form() -> Html<String> {
    Html(templates::add_page("", None))
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let title = form.title.trim();
    if title.is_empty() {
        let body = templates::add_page("", Some("Enter a movie title to search for."));
        return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
    }

    let results = state.catalog.search_by_title(title).await?;
    Ok(Html(templates::select_page(title, &results)).into_response())
}

/// Confirms a catalog selection: fetches its details and stores a new movie.
pub async fn find(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Redirect> {
    let external_id = q.external_id()?;
    let details = state.catalog.fetch_details_by_id(external_id).await?;
    let title = details.title.clone();

    let id = state.store.create_movie(details.into()).await?;
    info!(movie_id = id, external_id = %external_id, title = %title, "movie added");

    Ok(Redirect::to(&format!("/edit?id={id}")))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Query(q): Query<IdQuery>,
) -> AppResult<Html<String>> {
    let movie = state.store.get_by_id(q.movie_id()?).await?;
    Ok(Html(templates::edit_page(&movie, &EditForm::from_movie(&movie), None)))
}

pub async fn update(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(q): Query<IdQuery>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let id = q.movie_id()?;
    let movie = state.store.get_by_id(id).await?;

    let update = match form.validate() {
        Ok(update) => update,
        Err(err) => {
            let body = templates::edit_page(&movie, &form, Some(&err.to_string()));
            return Ok((StatusCode::BAD_REQUEST, Html(body)).into_response());
        },
    };

    state.store.update_rating_and_review(id, update).await?;
    info!(movie_id = id, title = %movie.title, "movie rated");

    let jar = set_flash(jar, format!("Saved {}", movie.title));
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn delete(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(q): Query<IdQuery>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let id = q.movie_id()?;
    let movie = state.store.get_by_id(id).await?;
    state.store.delete_by_id(id).await?;
    info!(movie_id = id, title = %movie.title, "movie deleted");

    Ok((set_flash(jar, format!("Deleted {}", movie.title)), Redirect::to("/")))
}

fn set_flash(jar: SignedCookieJar, message: String) -> SignedCookieJar {
    let value = urlencoding::encode(&message).into_owned();
    jar.add(Cookie::build((FLASH_COOKIE, value)).path("/").http_only(true))
}

fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let message = urlencoding::decode(cookie.value()).ok().map(|m| m.into_owned());
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), message)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{
            Request,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app,
        error::AppError,
        models::{NewMovie, RatingUpdate},
        store::MovieStore,
        test_support::{memory_store, spawn_fake_tmdb, state_with},
        tmdb::{MockCatalog, TmdbClient},
    };

    async fn tmdb_app(store: &MovieStore) -> Router {
        let tmdb = TmdbClient::new(
            reqwest::Client::new(),
            "test-token".to_string(),
            spawn_fake_tmdb().await,
            "https://image.tmdb.org/t/p/w500".to_string(),
        );
        app(state_with(store.clone(), Arc::new(tmdb)))
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(resp: &Response) -> &str {
        resp.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn seed(store: &MovieStore, title: &str, rating: Option<f64>) -> i32 {
        let id = store
            .create_movie(NewMovie {
                title: title.to_string(),
                year: 2000,
                description: format!("About {title}"),
                img_url: format!("https://image.tmdb.org/t/p/w500/{title}.jpg"),
            })
            .await
            .unwrap();
        if let Some(rating) = rating {
            store.update_rating_and_review(id, RatingUpdate { rating, review: None }).await.unwrap();
        }
        id
    }

    async fn ranks(store: &MovieStore, ids: &[i32]) -> Vec<Option<i32>> {
        let mut out = Vec::new();
        for &id in ids {
            out.push(store.get_by_id(id).await.unwrap().ranking);
        }
        out
    }

    #[tokio::test]
    async fn home_orders_by_rating_and_persists_ranks() {
        let store = memory_store().await;
        let a = seed(&store, "Alpha", None).await;
        let b = seed(&store, "Bravo", Some(9.0)).await;
        let c = seed(&store, "Charlie", Some(4.0)).await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, get("/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        let pos = |t: &str| body.find(t).unwrap();
        assert!(pos("Alpha") < pos("Charlie") && pos("Charlie") < pos("Bravo"));

        assert_eq!(ranks(&store, &[a, c, b]).await, [Some(3), Some(2), Some(1)]);

        send(&app, get("/")).await;
        assert_eq!(ranks(&store, &[a, c, b]).await, [Some(3), Some(2), Some(1)]);
    }

    #[tokio::test]
    async fn confirm_flow_stores_release_year_and_redirects_to_edit() {
        let store = memory_store().await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, get("/find?id=42")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let target = location(&resp).to_string();
        let id: i32 = target.strip_prefix("/edit?id=").unwrap().parse().unwrap();

        let movie = store.get_by_id(id).await.unwrap();
        assert_eq!(movie.title, "Phone Booth");
        assert_eq!(movie.year, 2002);
        assert_eq!(movie.img_url, "https://image.tmdb.org/t/p/w500/booth.jpg");
        assert_eq!(movie.rating, None);

        let resp = send(&app, get(&target)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Phone Booth"));
    }

    #[tokio::test]
    async fn confirming_an_existing_title_is_a_conflict() {
        let store = memory_store().await;
        let app = tmdb_app(&store).await;

        assert_eq!(send(&app, get("/find?id=42")).await.status(), StatusCode::SEE_OTHER);
        let resp = send(&app, get("/find?id=42")).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert!(body_text(resp).await.contains("already on your list"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn confirm_requires_a_numeric_id() {
        let store = memory_store().await;
        let app = tmdb_app(&store).await;

        assert_eq!(send(&app, get("/find")).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(send(&app, get("/find?id=abc")).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_lists_candidates_without_touching_the_store() {
        let store = memory_store().await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, post_form("/add", "title=phone+booth")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("/find?id=42"));
        assert!(body.contains("/find?id=7"));
        assert!(body.contains("(2002)"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn blank_search_is_rejected() {
        let store = memory_store().await;
        let mut catalog = MockCatalog::new();
        catalog.expect_search_by_title().never();
        let app = app(state_with(store, Arc::new(catalog)));

        let resp = send(&app, post_form("/add", "title=+++")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(send(&app, get("/add")).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn catalog_failure_is_surfaced_once_without_retry() {
        let store = memory_store().await;
        let mut catalog = MockCatalog::new();
        catalog
            .expect_fetch_details_by_id()
            .withf(|id: &str| id == "42")
            .times(1)
            .returning(|_| Err(AppError::CatalogUnavailable("connection refused".to_string())));
        let app = app(state_with(store.clone(), Arc::new(catalog)));

        let resp = send(&app, get("/find?id=42")).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn edit_saves_rating_and_flashes_on_home() {
        let store = memory_store().await;
        let id = seed(&store, "Heat", None).await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, post_form(&format!("/edit?id={id}"), "rating=8.1&review=Diner+scene")).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        let cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let cookie = cookie.split(';').next().unwrap().to_string();

        let movie = store.get_by_id(id).await.unwrap();
        assert_eq!(movie.rating, Some(8.1));
        assert_eq!(movie.review.as_deref(), Some("Diner scene"));

        let home = Request::get("/").header(COOKIE, cookie).body(Body::empty()).unwrap();
        let body = body_text(send(&app, home).await).await;
        assert!(body.contains("Saved Heat"));
    }

    #[tokio::test]
    async fn invalid_edit_rerenders_form_without_saving() {
        let store = memory_store().await;
        let id = seed(&store, "Heat", Some(7.0)).await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, post_form(&format!("/edit?id={id}"), "rating=eleven&review=")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_text(resp).await;
        assert!(body.contains("is not a number"));
        assert!(body.contains(r#"value="eleven""#));
        assert_eq!(store.get_by_id(id).await.unwrap().rating, Some(7.0));
    }

    #[tokio::test]
    async fn edit_of_missing_movie_is_not_found() {
        let store = memory_store().await;
        let app = tmdb_app(&store).await;

        assert_eq!(send(&app, get("/edit?id=99")).await.status(), StatusCode::NOT_FOUND);
        let resp = send(&app, post_form("/edit?id=99", "rating=5&review=")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, get("/edit?id=x")).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_removes_movie_and_missing_id_is_not_found() {
        let store = memory_store().await;
        let id = seed(&store, "Heat", Some(7.0)).await;
        let app = tmdb_app(&store).await;

        let resp = send(&app, get(&format!("/delete?id={}", id + 1))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.count().await.unwrap(), 1);

        let resp = send(&app, get(&format!("/delete?id={id}"))).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");
        assert_eq!(store.count().await.unwrap(), 0);

        let cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let cookie = cookie.split(';').next().unwrap().to_string();
        let home = Request::get("/").header(COOKIE, cookie).body(Body::empty()).unwrap();
        let resp = send(&app, home).await;
        let cleared = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cleared.starts_with("flash=") && cleared.contains("Max-Age=0"));
        let body = body_text(resp).await;
        assert!(body.contains("Deleted Heat"));
        assert!(!body.contains("/edit?id="));
    }
}

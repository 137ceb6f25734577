use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::models::{CatalogResult, EditForm, MAX_RATING, MAX_REVIEW_CHARS, Movie};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const THUMB_BASE_URL: &str = "https://image.tmdb.org/t/p/w92";

pub fn home_page(movies: &[Movie], flash: Option<&str>) -> String {
    page(
        "My Top Movies",
        html! {
            div class="max-w-5xl mx-auto px-6 py-12" {
                div class="flex items-start justify-between gap-6" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "My Top Movies" }
                        p class="mt-2 text-gray-600" { "These are my all time favourite movies." }
                    }
                    a class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" href="/add" { "Add Movie" }
                }

                @if let Some(message) = flash {
                    div class="mt-6 rounded-md bg-green-50 border border-green-200 px-4 py-3 text-green-800" { (message) }
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "Your list is empty. Search for a movie to get started." }
                    }
                } @else {
                    div class="mt-10 grid gap-6 md:grid-cols-2" {
                        @for movie in movies {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn add_page(title: &str, error: Option<&str>) -> String {
    page(
        "Add Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { "Add a Movie" }
                    @if let Some(error) = error {
                        p class="mt-4 text-red-700" { (error) }
                    }
                    form class="mt-8 space-y-6" method="post" action="/add" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="title" { "Movie Title" }
                            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="title" id="title" value=(title) required;
                        }
                        button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Add Movie" }
                    }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

pub fn select_page(query: &str, results: &[CatalogResult]) -> String {
    page(
        "Select Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                h1 class="text-3xl font-bold text-gray-900" { "Select Movie" }
                p class="mt-2 text-gray-600" { "Results for \u{201c}" (query) "\u{201d}" }

                @if results.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "No movies matched that title." }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/add" { "Try again" }
                    }
                } @else {
                    ul class="mt-10 space-y-3" {
                        @for result in results {
                            li {
                                a class="flex items-center gap-4 bg-white shadow rounded-lg p-4 hover:bg-gray-50" href=(format!("/find?id={}", result.external_id)) {
                                    @if let Some(path) = result.poster_path.as_deref().or(result.backdrop_path.as_deref()) {
                                        img class="h-16 w-11 rounded object-cover" src=(format!("{THUMB_BASE_URL}{path}")) alt="";
                                    }
                                    span class="font-medium text-gray-900" { (result.title) }
                                    @if let Some(year) = result.release_year() {
                                        span class="text-gray-500" { "(" (year) ")" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn edit_page(movie: &Movie, form: &EditForm, error: Option<&str>) -> String {
    page(
        "Edit Movie",
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                    p class="mt-2 text-gray-600" { "Edit Movie Rating" }
                    @if let Some(error) = error {
                        p class="mt-4 text-red-700" { (error) }
                    }
                    form class="mt-8 space-y-6" method="post" action=(format!("/edit?id={}", movie.id)) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="rating" { (format!("Your Rating Out of {MAX_RATING} e.g. 8.1")) }
                            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="rating" id="rating" value=(form.rating) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="review" { "Your Review" }
                            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="review" id="review" maxlength=(MAX_REVIEW_CHARS) value=(form.review);
                        }
                        button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Done" }
                    }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { (status.canonical_reason().unwrap_or("Error")) }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg overflow-hidden" {
            img class="h-48 w-full object-cover" src=(movie.img_url) alt=(movie.title);
            div class="p-6" {
                div class="flex items-start justify-between gap-4" {
                    h2 class="text-xl font-semibold text-gray-900" {
                        (movie.title)
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    @if let Some(rank) = movie.ranking {
                        span class="rounded-full bg-gray-900 px-3 py-1 text-sm font-bold text-white" { (rank) }
                    }
                }
                p class="mt-2 text-sm text-gray-700" {
                    @if let Some(rating) = movie.rating {
                        span class="font-semibold" { (format!("{rating:.1}")) } " / " (MAX_RATING)
                    } @else {
                        span class="text-gray-500" { "Not rated yet" }
                    }
                }
                @if let Some(review) = &movie.review {
                    p class="mt-2 italic text-gray-600" { "\u{201c}" (review) "\u{201d}" }
                }
                p class="mt-4 text-sm text-gray-600" { (movie.description) }
                div class="mt-6 flex gap-4" {
                    a class="text-blue-600 hover:text-blue-800" href=(format!("/edit?id={}", movie.id)) { "Update" }
                    a class="text-red-600 hover:text-red-800" href=(format!("/delete?id={}", movie.id)) { "Delete" }
                }
            }
        }
    }
}

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    models::{DetailsView, RankedMovie},
    tmdb::SearchMovie,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w342";
const PROFILE_BASE: &str = "https://image.tmdb.org/t/p/w185";

/// What the navigation bar needs to know about the visitor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Chrome<'a> {
    pub username: Option<&'a str>,
    pub flash: Option<&'a str>,
}

pub fn search_page(chrome: Chrome<'_>, query: &str, results: &[SearchMovie]) -> String {
    page(
        "Movies",
        chrome,
        html! {
            form class="flex gap-3" method="get" action="/movies/" {
                input class="flex-1 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" type="search" name="query" value=(query) placeholder="Search movies";
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Search" }
            }

            @if results.is_empty() {
                div class="mt-10 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "No results." }
                }
            } @else {
                div class="mt-10 grid gap-6 sm:grid-cols-2 md:grid-cols-3" {
                    @for movie in results {
                        (search_card(movie))
                    }
                }
            }
        },
    )
}

fn search_card(movie: &SearchMovie) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-lg" href=(format!("/details/{}", movie.id)) {
            @if let Some(poster) = &movie.poster_path {
                img class="w-full" src=(format!("{POSTER_BASE}{poster}")) alt=(movie.title);
            }
            div class="p-4" {
                h2 class="text-lg font-semibold text-gray-900" {
                    (movie.title)
                    @if let Some(year) = movie.year() {
                        span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                    }
                }
                p class="mt-1 text-xs text-gray-500" { "Popularity " (format!("{:.1}", movie.popularity)) }
            }
        }
    }
}

pub fn details_page(chrome: Chrome<'_>, view: &DetailsView) -> String {
    let info = &view.info;
    page(
        &info.title,
        chrome,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                div class="flex gap-6" {
                    @if let Some(poster) = &info.poster_path {
                        img class="w-48 rounded" src=(format!("{POSTER_BASE}{poster}")) alt=(info.title);
                    }
                    div {
                        h1 class="text-3xl font-bold text-gray-900" {
                            (info.title)
                            @if !view.year.is_empty() {
                                span class="ml-2 font-normal text-gray-500" { "(" (view.year) ")" }
                            }
                        }
                        @if let Some(tagline) = info.tagline.as_deref().filter(|t| !t.is_empty()) {
                            p class="mt-1 italic text-gray-500" { (tagline) }
                        }
                        p class="mt-4 text-gray-700" { (info.overview) }
                        @if !view.production.is_empty() {
                            p class="mt-4 text-sm text-gray-500" {
                                "Produced by "
                                (view.production.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", "))
                            }
                        }
                    }
                }
            }

            @if !view.cast.is_empty() {
                section class="mt-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Cast" }
                    ul class="mt-4 grid gap-4 sm:grid-cols-2 md:grid-cols-5" {
                        @for member in &view.cast {
                            li class="text-sm" {
                                @if let Some(profile) = &member.profile_path {
                                    img class="rounded" src=(format!("{PROFILE_BASE}{profile}")) alt=(member.name);
                                }
                                span class="block font-medium text-gray-900" { (member.name) }
                                @if let Some(character) = &member.character {
                                    span class="block text-gray-500" { (character) }
                                }
                            }
                        }
                    }
                }
            }

            @if !view.crew.is_empty() {
                section class="mt-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Crew" }
                    ul class="mt-2 space-y-1" {
                        @for member in &view.crew {
                            li class="text-sm text-gray-700" {
                                span class="font-medium" { (member.name) }
                                span class="text-gray-500" { " · " (member.job) }
                            }
                        }
                    }
                }
            }

            @if !view.trailers.is_empty() {
                section class="mt-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Trailers" }
                    @for trailer in &view.trailers {
                        div class="mt-4" {
                            p class="text-sm font-medium text-gray-700" { (trailer.name) }
                            @if let Some(src) = trailer.youtube_embed_url() {
                                iframe class="mt-2 w-full aspect-video" src=(src) title=(trailer.name) allowfullscreen {}
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn rating_page(chrome: Chrome<'_>, movies: &[RankedMovie]) -> String {
    page(
        "Ranking",
        chrome,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Ranking" }
            @if movies.is_empty() {
                div class="mt-10 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "No movies yet." }
                }
            } @else {
                table class="mt-8 w-full bg-white shadow rounded-lg" {
                    thead {
                        tr class="text-left text-sm text-gray-500" {
                            th class="p-4" { "#" }
                            th class="p-4" { "Movie" }
                            th class="p-4" { "Average" }
                            th class="p-4" { "Reviews" }
                        }
                    }
                    tbody {
                        @for (pos, ranked) in movies.iter().enumerate() {
                            tr class="border-t text-gray-700" {
                                td class="p-4" { (pos + 1) }
                                td class="p-4 font-medium" { (ranked.movie.title) }
                                td class="p-4" {
                                    @match ranked.avg_rating {
                                        Some(avg) => { (format!("{avg:.2}")) },
                                        None => { span class="text-gray-400" { "No ratings yet" } },
                                    }
                                }
                                td class="p-4" { (ranked.review_count) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn signup_page(username: &str, email: &str, errors: &[String]) -> String {
    page(
        "Sign up",
        Chrome::default(),
        html! {
            div class="max-w-md mx-auto bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Sign up" }
                (error_list(errors))
                form class="mt-6 space-y-4" method="post" action="/signup/" {
                    (text_field("username", "Username", "text", username))
                    (text_field("email", "Email (optional)", "email", email))
                    (text_field("password1", "Password", "password", ""))
                    (text_field("password2", "Password confirmation", "password", ""))
                    button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Sign up" }
                }
            }
        },
    )
}

pub fn login_page(username: &str, next: &str, error: Option<&str>) -> String {
    let errors: Vec<String> = error.map(str::to_string).into_iter().collect();
    page(
        "Log in",
        Chrome::default(),
        html! {
            div class="max-w-md mx-auto bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Log in" }
                (error_list(&errors))
                form class="mt-6 space-y-4" method="post" action="/login/" {
                    (text_field("username", "Username", "text", username))
                    (text_field("password", "Password", "password", ""))
                    input type="hidden" name="next" value=(next);
                    button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Log in" }
                }
                p class="mt-4 text-sm text-gray-500" {
                    "No account? " a class="text-blue-600 hover:text-blue-800" href="/signup/" { "Sign up" }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: String) -> String {
    page(
        "Error",
        Chrome::default(),
        html! {
            div class="max-w-xl mx-auto bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Error " (status.as_u16()) }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/movies/" { "Back" }
            }
        },
    )
}

fn page(title: &str, chrome: Chrome<'_>, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav(chrome))
                main class="max-w-5xl mx-auto px-6 py-10" {
                    @if let Some(flash) = chrome.flash {
                        div class="mb-6 rounded-md bg-blue-50 p-4 text-sm text-blue-800" { (flash) }
                    }
                    (body)
                }
            }
        }
    }
    .into_string()
}

fn nav(chrome: Chrome<'_>) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-5xl mx-auto px-6 py-4 flex gap-6 text-sm" {
                a class="font-semibold text-gray-900" href="/movies/" { "Search" }
                a class="text-gray-600 hover:text-gray-900" href="/rating/" { "Ranking" }
                span class="flex-1" {}
                @match chrome.username {
                    Some(name) => {
                        span class="text-gray-500" { (name) }
                        a class="text-gray-600 hover:text-gray-900" href="/logout/" { "Log out" }
                    },
                    None => {
                        a class="text-gray-600 hover:text-gray-900" href="/login/" { "Log in" }
                        a class="text-gray-600 hover:text-gray-900" href="/signup/" { "Sign up" }
                    },
                }
            }
        }
    }
}

fn text_field(name: &str, label: &str, kind: &str, value: &str) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" type=(kind) name=(name) id=(name) value=(value);
        }
    }
}

fn error_list(errors: &[String]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul class="mt-4 rounded-md bg-red-50 p-4 text-sm text-red-700 space-y-1" {
                @for error in errors {
                    li { (error) }
                }
            }
        }
    }
}

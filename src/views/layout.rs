use maud::{html, Markup, DOCTYPE};

use crate::{names, utils};

fn css() -> Markup {
    html! {
        link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";
        link rel="stylesheet" href="/static/index.css";
    }
}

fn js() -> Markup {
    html! {
        script src="https://unpkg.com/htmx.org@1.9.12/dist/htmx.min.js" {}
        script src="https://unpkg.com/htmx.org@1.9.12/dist/ext/json-enc.js" {}
    }
}

fn icon() -> Markup {
    html! {
        link rel="icon" href="/static/img/icon.svg" type="image/svg+xml" {}
    }
}

fn header(dark_mode: bool) -> Markup {
    let (toggle_icon, toggle_title) = if dark_mode {
        ("\u{2600}\u{fe0f}", "Switch to light mode")
    } else {
        ("\u{1F319}", "Switch to dark mode")
    };

    html! {
        header {
            nav {
                ul {
                    li."secondary" {
                        a href="/" {
                            strong { "VerseQuiz" }
                        }
                    }
                }
                ul {
                    li {
                        button."outline secondary theme-toggle"
                               hx-post=(names::TOGGLE_DARK_MODE_URL)
                               hx-swap="none"
                               title=(toggle_title) {
                            (toggle_icon)
                        }
                    }
                    li."secondary" { (utils::VERSION) }
                }
            }
        }
    }
}

fn main(body: Markup) -> Markup {
    html! {
        main { (body) }
    }
}

pub fn page(title: &str, body: Markup, dark_mode: bool) -> Markup {
    let theme = if dark_mode { "dark" } else { "light" };

    html! {
        (DOCTYPE)
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            meta name="color-scheme" content="light dark";

            (css())
            (js())
            (icon())

            title { (format!("{title} - VerseQuiz")) }
        }

        body."container" data-theme=(theme) {
            (header(dark_mode))
            (main(body))
        }
    }
}

pub fn titled(title: &str, body: Markup) -> Markup {
    html! {
        title { (title) " - VerseQuiz" }
        (body)
    }
}

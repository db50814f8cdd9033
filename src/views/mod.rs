pub mod account;
pub mod admin;
pub mod layout;
pub mod quiz;

use maud::Markup;

// Re-export commonly used functions from layout
pub use layout::{page, titled};

/// Render a full page for direct navigation, or a titled fragment for an
/// HTMX swap.
pub fn render(is_htmx: bool, title: &str, body: Markup, dark_mode: bool) -> Markup {
    if is_htmx {
        titled(title, body)
    } else {
        page(title, body, dark_mode)
    }
}

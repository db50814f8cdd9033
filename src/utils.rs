use axum::http::HeaderValue;
use color_eyre::Result;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build a `Set-Cookie` value. The cookie value is percent-encoded so free
/// text (player names) survives the trip.
pub fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> Result<HeaderValue> {
    let value = urlencoding::encode(value);
    let secure_attr = if secure { "; Secure" } else { "" };
    Ok(HeaderValue::from_str(&format!(
        "{name}={value}; HttpOnly; Max-Age={max_age}; Path=/; SameSite=Strict{secure_attr}"
    ))?)
}

/// Like [`cookie`] but SameSite=Lax, for cookies that must survive a
/// top-level redirect back from an external site (the OAuth state cookie).
pub fn lax_cookie(name: &str, value: &str, max_age: i64, secure: bool) -> Result<HeaderValue> {
    let value = urlencoding::encode(value);
    let secure_attr = if secure { "; Secure" } else { "" };
    Ok(HeaderValue::from_str(&format!(
        "{name}={value}; HttpOnly; Max-Age={max_age}; Path=/; SameSite=Lax{secure_attr}"
    ))?)
}

pub fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue> {
    cookie(name, "", 0, secure)
}

/// Decode a percent-encoded cookie value, falling back to the raw value.
pub fn decode_cookie_value(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

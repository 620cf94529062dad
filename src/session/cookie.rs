//! Session cookie adapter.
//!
//! Wraps the signed token in a cookie with the attributes the session design
//! requires: HttpOnly, SameSite=Lax (cookie still sent when the user arrives
//! from an external link such as a reset email, while cross-site POSTs are
//! blocked), Path=/, Max-Age equal to the token lifetime, and Secure in
//! production-like deployments.

use axum::http::{header, HeaderMap, HeaderValue, Response};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

use crate::config::Config;

/// Build the session cookie carrying `token`.
pub fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_secure(config.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(config.session_max_age_secs as i64));
    cookie
}

/// Build the cookie that clears the session: empty value, Max-Age 0.
///
/// Safe to send whether or not a session cookie exists.
pub fn clear_session_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.cookie_name.clone(), "");
    cookie.set_http_only(true);
    cookie.set_secure(config.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::ZERO);
    cookie
}

/// Read the raw session token from the request's Cookie header(s), if any.
pub fn read_session_token(config: &Config, headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in Cookie::split_parse(raw).flatten() {
            if cookie.name() == config.cookie_name {
                return Some(cookie.value().to_string());
            }
        }
    }
    None
}

/// Append a Set-Cookie header to a response.
pub fn apply_cookie<B>(response: &mut Response<B>, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

/// Overwrite the session cookie when the resolver minted a replacement.
pub fn apply_renewal<B>(response: &mut Response<B>, config: &Config, renewed: Option<String>) {
    if let Some(token) = renewed {
        let cookie = session_cookie(config, token);
        apply_cookie(response, &cookie);
    }
}

//! Cookie builders for the admin access and refresh tokens.
//!
//! Both cookies are http-only, secure, and SameSite=Strict; Max-Age matches
//! the token TTL. The refresh cookie is scoped to the auth routes so it is
//! never sent with ordinary dashboard requests.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the access token.
pub const LG_ACCESS_TOKEN: &str = "lg_access_token";

/// Cookie name for the refresh token.
pub const LG_REFRESH_TOKEN: &str = "lg_refresh_token";

/// Access-token JWT lifetime in seconds (15 minutes).
pub const ACCESS_TOKEN_EXP: u64 = 900;

/// Refresh-token JWT lifetime in seconds (7 days).
pub const REFRESH_TOKEN_EXP: u64 = 604800;

/// Set the access-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use leadgate_auth_types::cookie::{set_access_token_cookie, LG_ACCESS_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "token_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(LG_ACCESS_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_access_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((LG_ACCESS_TOKEN, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::seconds(ACCESS_TOKEN_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build();
    jar.add(cookie)
}

/// Set the refresh-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use leadgate_auth_types::cookie::{set_refresh_token_cookie, LG_REFRESH_TOKEN};
///
/// let jar = CookieJar::new();
/// let jar = set_refresh_token_cookie(jar, "refresh_value".to_string(), "example.com".to_string());
/// let cookie = jar.get(LG_REFRESH_TOKEN).unwrap();
/// assert_eq!(cookie.path(), Some("/auth"));
/// assert_eq!(cookie.domain(), Some("example.com"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_refresh_token_cookie(jar: CookieJar, value: String, domain: String) -> CookieJar {
    let cookie = Cookie::build((LG_REFRESH_TOKEN, value))
        .path("/auth")
        .domain(domain)
        .max_age(Duration::seconds(REFRESH_TOKEN_EXP as i64))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build();
    jar.add(cookie)
}

/// Clear both token cookies by setting Max-Age to 0. Idempotent — clearing
/// an already-clear jar is fine, which is what makes logout always succeed.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use leadgate_auth_types::cookie::{
///     clear_cookies, set_access_token_cookie, set_refresh_token_cookie,
///     LG_ACCESS_TOKEN, LG_REFRESH_TOKEN,
/// };
///
/// let jar = CookieJar::new();
/// let jar = set_access_token_cookie(jar, "a".to_string(), "example.com".to_string());
/// let jar = set_refresh_token_cookie(jar, "r".to_string(), "example.com".to_string());
/// let jar = clear_cookies(jar, "example.com".to_string());
/// let access = jar.get(LG_ACCESS_TOKEN).unwrap();
/// let refresh = jar.get(LG_REFRESH_TOKEN).unwrap();
/// assert_eq!(access.max_age(), Some(time::Duration::ZERO));
/// assert_eq!(refresh.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_cookies(jar: CookieJar, domain: String) -> CookieJar {
    let access = Cookie::build((LG_ACCESS_TOKEN, ""))
        .path("/")
        .domain(domain.clone())
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build();
    let refresh = Cookie::build((LG_REFRESH_TOKEN, ""))
        .path("/auth")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build();
    jar.add(access).add(refresh)
}

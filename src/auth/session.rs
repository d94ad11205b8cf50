use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tower_cookies::{Cookie, Cookies, Key};

pub const SESSION_COOKIE: &str = "sid";
const OAUTH_STATE_COOKIE_PREFIX: &str = "oauth_state_";

/// Server-issued session carried in a private (encrypted) cookie. The
/// cookie is the sole source of "current user" for every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    /// unix seconds
    pub exp: i64,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() > self.exp
    }
}

pub fn get_session(cookies: &Cookies, key: &Key) -> Option<Session> {
    let c = cookies.private(key).get(SESSION_COOKIE)?;
    let session: Session = serde_json::from_str(c.value()).ok()?;
    if session.is_expired() {
        return None;
    }
    Some(session)
}

pub fn set_session(cookies: &Cookies, key: &Key, user_id: &str, ttl_minutes: i64) {
    let exp = OffsetDateTime::now_utc() + Duration::minutes(ttl_minutes);
    let session = Session {
        user_id: user_id.to_string(),
        exp: exp.unix_timestamp(),
    };
    if let Ok(payload) = serde_json::to_string(&session) {
        let mut cookie = Cookie::new(SESSION_COOKIE, payload);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
        cookie.set_secure(is_https());
        cookie.set_max_age(Duration::minutes(ttl_minutes));
        cookies.private(key).add(cookie);
    }
}

pub fn clear_session(cookies: &Cookies, key: &Key) {
    let mut base = Cookie::new(SESSION_COOKIE, "");
    base.set_path("/");
    cookies.remove(base.clone());
    cookies.private(key).remove(base);
}

fn state_cookie_name(provider: &str) -> String {
    format!("{OAUTH_STATE_COOKIE_PREFIX}{provider}")
}

/// Store the CSRF `state` sent to the provider; verified on callback.
pub fn set_oauth_state(cookies: &Cookies, key: &Key, provider: &str, state: &str) {
    let mut cookie = Cookie::new(state_cookie_name(provider), state.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_secure(is_https());
    cookie.set_max_age(Duration::minutes(10));
    cookies.private(key).add(cookie);
}

/// Read and consume the stored CSRF state.
pub fn take_oauth_state(cookies: &Cookies, key: &Key, provider: &str) -> Option<String> {
    let jar = cookies.private(key);
    let cookie = jar.get(&state_cookie_name(provider))?;
    let value = cookie.value().to_string();
    jar.remove(cookie);
    Some(value)
}

/// A `Cookie:` header value carrying a live session, sealed with the same
/// private-jar scheme the server uses.
#[cfg(test)]
pub(crate) fn sealed_session_cookie(key: &Key, user_id: &str) -> String {
    let session = Session {
        user_id: user_id.to_string(),
        exp: OffsetDateTime::now_utc().unix_timestamp() + 600,
    };
    let payload = serde_json::to_string(&session).expect("session serializes");
    let mut jar = tower_cookies::cookie::CookieJar::new();
    jar.private_mut(key).add(Cookie::new(SESSION_COOKIE, payload));
    let sealed = jar.get(SESSION_COOKIE).expect("sealed cookie");
    format!("{SESSION_COOKIE}={}", sealed.value())
}

pub(crate) fn is_https() -> bool {
    matches!(
        std::env::var("APP_FORCE_SECURE").as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

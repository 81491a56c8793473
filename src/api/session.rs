//! Cookie-based session handling.
//!
//! The session is three parallel cookies: the opaque backend token, the
//! serialized user object (URL-encoded JSON), and an authenticated flag
//! the front end reads for route guards. They are set together on login
//! and removed together on logout or token teardown; there is no
//! transactional guarantee between the three.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};

use super::error::ApiError;

pub const TOKEN_COOKIE: &str = "vams_token";
pub const USER_COOKIE: &str = "vams_user";
pub const AUTH_FLAG_COOKIE: &str = "vams_authenticated";

const SESSION_MAX_AGE_HOURS: i64 = 24;

pub const NO_TOKEN_MESSAGE: &str = "No autorizado. Token requerido.";
pub const INVALID_TOKEN_MESSAGE: &str = "Token inválido o expirado";

/// Not HttpOnly: the front end reads these cookies for its route guards
/// and for direct calls to the backend.
fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(false)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(SESSION_MAX_AGE_HOURS))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Read the backend token from the request cookies.
pub fn token_from(jar: &CookieJar) -> Option<String> {
    jar.get(TOKEN_COOKIE).map(|c| c.value().to_string())
}

/// Token for handlers where the session is mandatory but the jar is also
/// needed for teardown.
pub fn require_token(jar: &CookieJar) -> Result<String, ApiError> {
    token_from(jar).ok_or_else(|| ApiError::unauthorized(NO_TOKEN_MESSAGE))
}

/// Read and decode the serialized user object from the request cookies.
pub fn user_from(jar: &CookieJar) -> Option<Value> {
    let raw = jar.get(USER_COOKIE)?.value().to_string();
    let decoded = urlencoding::decode(&raw).ok()?;
    serde_json::from_str(&decoded).ok()
}

/// Set the three session cookies for a fresh login.
pub fn establish(jar: CookieJar, token: &str, user: &Value) -> CookieJar {
    let user_encoded = urlencoding::encode(&user.to_string()).into_owned();
    jar.add(session_cookie(TOKEN_COOKIE, token.to_string()))
        .add(session_cookie(USER_COOKIE, user_encoded))
        .add(session_cookie(AUTH_FLAG_COOKIE, "true".to_string()))
}

/// Remove the three session cookies.
pub fn clear(jar: CookieJar) -> CookieJar {
    jar.remove(removal_cookie(TOKEN_COOKIE))
        .remove(removal_cookie(USER_COOKIE))
        .remove(removal_cookie(AUTH_FLAG_COOKIE))
}

/// 401 with cookie teardown for the embedded invalid-token signal.
///
/// Always answers with this generic body, never with the backend's own
/// message, so call sites stay consistent.
pub fn invalid_token_response(jar: CookieJar) -> Response {
    let body = json!({
        "success": false,
        "error": INVALID_TOKEN_MESSAGE,
        "message": INVALID_TOKEN_MESSAGE,
    });
    (clear(jar), (StatusCode::UNAUTHORIZED, Json(body))).into_response()
}

/// Extractor for the session token. Rejects with 401 when the token
/// cookie is absent; handlers where the token is optional read the
/// `CookieJar` directly instead.
#[derive(Debug)]
pub struct SessionToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::unauthorized(NO_TOKEN_MESSAGE))?;

        token_from(&jar)
            .map(SessionToken)
            .ok_or_else(|| ApiError::unauthorized(NO_TOKEN_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_sets_three_cookies() {
        let user = json!({"US_IDUSUARIO_PK": 1, "US_NOMBRE": "Ana Pérez"});
        let jar = establish(CookieJar::new(), "abc123", &user);

        let token = jar.get(TOKEN_COOKIE).unwrap();
        assert_eq!(token.value(), "abc123");
        assert_eq!(token.path(), Some("/"));
        assert_eq!(token.same_site(), Some(SameSite::Lax));
        assert_eq!(token.http_only(), Some(false));
        assert_eq!(token.max_age(), Some(time::Duration::hours(24)));

        assert_eq!(jar.get(AUTH_FLAG_COOKIE).unwrap().value(), "true");
        assert!(jar.get(USER_COOKIE).is_some());
    }

    #[test]
    fn test_user_cookie_roundtrip() {
        let user = json!({"US_NOMBRE": "Ana Pérez", "RL_IDROL_FK": 1});
        let jar = establish(CookieJar::new(), "abc123", &user);

        // The stored value is URL-encoded, the accessor decodes it back.
        assert!(!jar.get(USER_COOKIE).unwrap().value().contains('{'));
        assert_eq!(user_from(&jar).unwrap(), user);
    }

    #[test]
    fn test_token_from_missing_cookie() {
        assert!(token_from(&CookieJar::new()).is_none());
    }

    #[test]
    fn test_user_from_garbage_cookie() {
        let jar = CookieJar::new().add(Cookie::new(USER_COOKIE, "no-es-json"));
        assert!(user_from(&jar).is_none());
    }

    #[tokio::test]
    async fn test_session_token_extractor() {
        use axum::extract::FromRequestParts;
        use axum::http::Request;

        let (mut parts, _) = Request::builder()
            .uri("/api/projects")
            .header("cookie", "vams_token=abc123; vams_authenticated=true")
            .body(())
            .unwrap()
            .into_parts();
        let SessionToken(token) = SessionToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(token, "abc123");

        let (mut bare, _) = Request::builder().body(()).unwrap().into_parts();
        let err = SessionToken::from_request_parts(&mut bare, &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_clear_removes_session() {
        let user = json!({"US_IDUSUARIO_PK": 1});
        let jar = clear(establish(CookieJar::new(), "abc123", &user));

        assert!(token_from(&jar).is_none());
        assert!(user_from(&jar).is_none());
        assert!(jar.get(AUTH_FLAG_COOKIE).is_none());
    }
}

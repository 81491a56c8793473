//! Authentication endpoints.
//!
//! Login proxies the credentials to the backend's `/auth/login`, which
//! answers the legacy RPC shape `{ success, message, user_json, token }`
//! with `success` as either a boolean or a `"true"`/`"false"` string and
//! `user_json` as either a JSON string or an already-parsed object. On
//! success the three session cookies are set; the server never validates
//! credentials itself.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ords::response;
use crate::AppState;

use super::session;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn login_failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = json!({"success": false, "message": message.into()});
    (status, Json(body)).into_response()
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Response {
    let username = request.username.trim();
    let password = request.password.trim();

    if username.is_empty() || password.is_empty() {
        return login_failure(
            StatusCode::BAD_REQUEST,
            "Usuario y contraseña son requeridos",
        );
    }

    let ords = match state.ords() {
        Ok(ords) => ords,
        Err(_) => {
            return login_failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error de configuración del servidor",
            )
        }
    };

    let credentials = json!({"username": username, "password": password});
    let response = match ords.post("/auth/login", None, &credentials).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Auth backend unreachable: {}", e);
            return login_failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "No se pudo conectar con el servidor de autenticación",
            );
        }
    };

    if !response.is_success() {
        let message = response.error_message("Error al autenticar. Verifica tus credenciales.");
        return login_failure(response.status, message);
    }

    let data = response.json().unwrap_or(Value::Null);
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Autenticación exitosa")
        .to_string();

    if !response::success_is_true(&data) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Credenciales inválidas");
        return login_failure(StatusCode::UNAUTHORIZED, message);
    }

    let Some(token) = data.get("token").and_then(Value::as_str) else {
        tracing::error!("Auth backend reported success without a token");
        return login_failure(StatusCode::INTERNAL_SERVER_ERROR, "Error interno del servidor");
    };

    let user = parse_user_json(data.get("user_json"));
    let jar = session::establish(jar, token, &user);

    let body = json!({
        "success": true,
        "user": user,
        "token": token,
        "message": message,
    });
    (jar, Json(body)).into_response()
}

/// `user_json` arrives as a JSON string from newer module versions and as
/// a structured object from older ones.
fn parse_user_json(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::String(s)) => serde_json::from_str(s).unwrap_or(Value::Null),
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

/// POST /api/auth/logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let body = json!({
        "success": true,
        "message": "Sesión cerrada exitosamente",
    });
    (session::clear(jar), Json(body))
}

/// GET /api/auth/user — the user object from the session cookie.
pub async fn current_user(jar: CookieJar) -> Response {
    match session::user_from(&jar) {
        Some(user) => Json(json!({"success": true, "user": user})).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "user": null})),
        )
            .into_response(),
    }
}

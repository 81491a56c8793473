//! Project proxy endpoints.
//!
//! Thin wrappers over the backend's `/proyectos` resource: forward the
//! verb, then run the envelope normalization, the invalid-token check,
//! and the field-case projection on the way back.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::Value;
use std::sync::Arc;

use crate::ords::{fields, response, OrdsError};
use crate::AppState;

use super::error::ApiError;
use super::session;

pub fn parse_project_id(id: &str) -> Result<i64, ApiError> {
    id.parse()
        .map_err(|_| ApiError::bad_request("ID de proyecto inválido"))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords.get("/proyectos", Some(&token)).await?;
    if !response.is_success() {
        tracing::error!(status = %response.status, body = %response.body, "ORDS error listing projects");
        return Err(ApiError::upstream(response.status, "Error al obtener proyectos"));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }

    let records = response::normalize_records(&data)?;
    let projects: Vec<Value> = records.iter().map(fields::project_record).collect();

    Ok(Json(projects).into_response())
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .get(&format!("/proyectos/{}", project_id), Some(&token))
        .await?;
    if !response.is_success() {
        tracing::error!(status = %response.status, body = %response.body, "ORDS error fetching project");
        return Err(ApiError::upstream(response.status, "Error al obtener el proyecto"));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }

    let records = response::normalize_records(&data)?;
    let project = records
        .first()
        .map(fields::project_record)
        .ok_or_else(|| ApiError::not_found("Proyecto no encontrado"))?;

    Ok(Json(project).into_response())
}

/// POST /api/projects
///
/// The only proxied write where the token is optional: it is attached
/// when present but its absence is not rejected.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let name = body.get("PR_NOMBRE").and_then(Value::as_str).unwrap_or("");
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("El nombre del proyecto es requerido"));
    }

    let token = session::token_from(&jar);
    let ords = state.ords()?;

    let response = ords.post("/proyectos", token.as_deref(), &body).await?;
    if !response.is_success() {
        let message = response.error_message("Error al crear el proyecto");
        return Err(ApiError::upstream(response.status, message));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }
    if response::success_is_false(&data) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Error al crear el proyecto");
        return Err(ApiError::bad_request(message));
    }

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// PUT /api/projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .put(&format!("/proyectos/{}", project_id), Some(&token), &body)
        .await?;
    if !response.is_success() {
        let message = response.error_message("Error al actualizar el proyecto");
        return Err(ApiError::upstream(response.status, message));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }
    if response::success_is_false(&data) {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Error al actualizar el proyecto");
        return Err(ApiError::bad_request(message));
    }

    Ok(Json(data).into_response())
}

/// DELETE /api/projects/:id
///
/// Deletion is logically a soft-deactivation on the backend; a
/// successful DELETE is terminal from the client's point of view. Some
/// deployments lack the DELETE handler entirely and answer with an HTML
/// error page, which is reported as a distinct 500, never as a parse
/// failure.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .delete(&format!("/proyectos/{}", project_id), Some(&token))
        .await?;

    delete_outcome(jar, response, "Error al eliminar el proyecto")
}

/// Shared DELETE response handling for projects, categories, and assets.
pub fn delete_outcome(
    jar: CookieJar,
    response: crate::ords::OrdsResponse,
    fallback: &str,
) -> Result<Response, ApiError> {
    if response::looks_like_html(&response.body) {
        tracing::error!(status = %response.status, "ORDS answered DELETE with an HTML document");
        return Err(OrdsError::UnsupportedEndpoint.into());
    }

    // Empty or plain-text bodies still need the token and success checks.
    let data = response.json().unwrap_or_else(|| {
        let text = response.body.trim();
        if text.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::json!({"message": text})
        }
    });

    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }

    // ORDS can answer 200 with success:'false'; a transport-level error
    // status keeps its own code.
    if response::success_is_false(&data) || !response.is_success() {
        let message = data
            .get("message")
            .or_else(|| data.get("error"))
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string();
        let status = if response.is_success() {
            StatusCode::BAD_REQUEST
        } else {
            response.status
        };
        return Err(ApiError::upstream(status, message));
    }

    Ok(Json(data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ords::OrdsResponse;

    #[test]
    fn test_parse_project_id() {
        assert_eq!(parse_project_id("5").unwrap(), 5);
        assert!(parse_project_id("abc").is_err());
        assert!(parse_project_id("5; DROP TABLE").is_err());
        assert!(parse_project_id("").is_err());
    }

    #[test]
    fn test_delete_outcome_html_is_unsupported() {
        let response = OrdsResponse {
            status: StatusCode::OK,
            body: "<!DOCTYPE html><html><body>Not Found</body></html>".to_string(),
        };
        let err = delete_outcome(CookieJar::new(), response, "Error al eliminar").unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("no está disponible"));
    }

    #[test]
    fn test_delete_outcome_success_false_is_400() {
        let response = OrdsResponse {
            status: StatusCode::OK,
            body: r#"{"success": "false", "message": "fila bloqueada"}"#.to_string(),
        };
        let err = delete_outcome(CookieJar::new(), response, "Error al eliminar").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "fila bloqueada");
    }

    #[test]
    fn test_delete_outcome_error_status_passes_through() {
        let response = OrdsResponse {
            status: StatusCode::NOT_FOUND,
            body: r#"{"message": "no existe"}"#.to_string(),
        };
        let err = delete_outcome(CookieJar::new(), response, "Error al eliminar").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "no existe");
    }

    #[test]
    fn test_delete_outcome_plain_text_body_becomes_message() {
        let response = OrdsResponse {
            status: StatusCode::BAD_REQUEST,
            body: "ORA-02292: child record found".to_string(),
        };
        let err = delete_outcome(CookieJar::new(), response, "Error al eliminar").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "ORA-02292: child record found");
    }

    #[test]
    fn test_delete_outcome_ok() {
        let response = OrdsResponse {
            status: StatusCode::OK,
            body: r#"{"success": "true", "message": "eliminado"}"#.to_string(),
        };
        assert!(delete_outcome(CookieJar::new(), response, "Error").is_ok());
    }
}

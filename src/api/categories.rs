//! Category proxy endpoints, nested under a project.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::Value;
use std::sync::Arc;

use crate::ords::{fields, response};
use crate::AppState;

use super::error::ApiError;
use super::projects::{delete_outcome, parse_project_id};
use super::session;

fn parse_ids(project_id: &str, categoria_id: &str) -> Result<(i64, i64), ApiError> {
    match (project_id.parse(), categoria_id.parse()) {
        (Ok(p), Ok(c)) => Ok((p, c)),
        _ => Err(ApiError::bad_request("ID de proyecto o categoría inválido")),
    }
}

/// GET /api/projects/:id/categorias
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .get(&format!("/proyectos/{}/categorias", project_id), Some(&token))
        .await?;
    if !response.is_success() {
        tracing::error!(status = %response.status, body = %response.body, "ORDS error listing categories");
        return Err(ApiError::upstream(response.status, "Error al obtener categorías"));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }

    let records = response::normalize_records(&data)?;
    let categories: Vec<Value> = records.iter().map(fields::category_record).collect();

    Ok(Json(categories).into_response())
}

/// POST /api/projects/:id/categorias
///
/// The project FK always comes from the path, overriding anything the
/// client put in the body.
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;

    let name = body.get("CT_NOMBRE").and_then(Value::as_str).unwrap_or("");
    if name.trim().is_empty() {
        return Err(ApiError::bad_request("CT_NOMBRE es requerido"));
    }

    if let Value::Object(map) = &mut body {
        map.insert("PR_IDPROYECTO_FK".to_string(), Value::from(project_id));
    }

    let ords = state.ords()?;
    let response = ords
        .post(
            &format!("/proyectos/{}/categorias", project_id),
            Some(&token),
            &body,
        )
        .await?;
    if !response.is_success() {
        let message = response.error_message("Error al crear la categoría");
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
            .unwrap_or("Error al crear la categoría");
        return Err(ApiError::bad_request(message));
    }

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

/// PUT /api/projects/:id/categorias/:categoriaId
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, categoria_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (project_id, categoria_id) = parse_ids(&id, &categoria_id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .put(
            &format!("/proyectos/{}/categorias/{}", project_id, categoria_id),
            Some(&token),
            &body,
        )
        .await?;
    if !response.is_success() {
        let message = response.error_message("Error al actualizar la categoría");
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
            .unwrap_or("Error al actualizar la categoría");
        return Err(ApiError::bad_request(message));
    }

    Ok(Json(data).into_response())
}

/// DELETE /api/projects/:id/categorias/:categoriaId
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, categoria_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (project_id, categoria_id) = parse_ids(&id, &categoria_id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .delete(
            &format!("/proyectos/{}/categorias/{}", project_id, categoria_id),
            Some(&token),
        )
        .await?;

    delete_outcome(jar, response, "Error al eliminar la categoría")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("5", "12").unwrap(), (5, 12));
        assert!(parse_ids("5", "x").is_err());
        assert!(parse_ids("x", "12").is_err());
    }

    #[test]
    fn test_parse_ids_error_message() {
        let err = parse_ids("5", "doce").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "ID de proyecto o categoría inválido");
    }
}

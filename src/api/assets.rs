//! Visual-asset proxy endpoints, nested under a project.
//!
//! Reads support the year/category filter used by the per-category
//! timeline view; writes include a concurrent batch create used by the
//! multi-photo upload flow.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ords::{fields, response, OrdsClient};
use crate::AppState;

use super::error::{ApiError, GENERIC_UPSTREAM_ERROR};
use super::projects::{delete_outcome, parse_project_id};
use super::session;
use super::timeline;

fn parse_ids(project_id: &str, activo_id: &str) -> Result<(i64, i64), ApiError> {
    match (project_id.parse(), activo_id.parse()) {
        (Ok(p), Ok(a)) => Ok((p, a)),
        _ => Err(ApiError::bad_request("ID de proyecto o activo inválido")),
    }
}

#[derive(Debug, Deserialize)]
pub struct AssetListQuery {
    pub year: Option<String>,
    #[serde(rename = "categoriaId")]
    pub categoria_id: Option<String>,
}

impl AssetListQuery {
    fn year(&self) -> Result<Option<i32>, ApiError> {
        match self.year.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request("Año inválido")),
        }
    }

    fn categoria_id(&self) -> Result<Option<i64>, ApiError> {
        match self.categoria_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::bad_request("ID de categoría inválido")),
        }
    }
}

/// Year/category filter for asset records. Pure response shaping: with a
/// year given, records without a parseable capture date are excluded and
/// the rest must match the calendar year; with a category given, the FK
/// must match.
pub fn filter_assets(records: Vec<Value>, year: Option<i32>, categoria_id: Option<i64>) -> Vec<Value> {
    records
        .into_iter()
        .filter(|record| {
            if let Some(year) = year {
                match timeline::capture_date(record) {
                    Some(date) => {
                        use chrono::Datelike;
                        if date.year() != year {
                            return false;
                        }
                    }
                    None => return false,
                }
            }

            if let Some(categoria_id) = categoria_id {
                if record.get("CT_IDCATEGORIA_FK").and_then(Value::as_i64) != Some(categoria_id) {
                    return false;
                }
            }

            true
        })
        .collect()
}

async fn fetch_assets(
    ords: &OrdsClient,
    project_id: i64,
    token: &str,
) -> Result<Result<Vec<Value>, Value>, ApiError> {
    let response = ords
        .get(&format!("/proyectos/{}/activos", project_id), Some(token))
        .await?;
    if !response.is_success() {
        tracing::error!(status = %response.status, body = %response.body, "ORDS error listing assets");
        return Err(ApiError::upstream(
            response.status,
            "Error al obtener activos visuales",
        ));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(Err(data));
    }

    let records = response::normalize_records(&data)?;
    Ok(Ok(records.iter().map(fields::asset_record).collect()))
}

/// GET /api/projects/:id/activos?year=&categoriaId=
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<AssetListQuery>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let year = query.year()?;
    let categoria_id = query.categoria_id()?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let assets = match fetch_assets(ords, project_id, &token).await? {
        Ok(assets) => assets,
        Err(_) => return Ok(session::invalid_token_response(jar)),
    };

    Ok(Json(filter_assets(assets, year, categoria_id)).into_response())
}

/// GET /api/projects/:id/activos/timeline?year=&categoriaId=
///
/// The per-category timeline: assets of one calendar year grouped by
/// capture day, plus the distinct months carrying photos.
pub async fn asset_timeline(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Query(query): Query<AssetListQuery>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let year = query
        .year()?
        .ok_or_else(|| ApiError::bad_request("El año es requerido"))?;
    let categoria_id = query.categoria_id()?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let assets = match fetch_assets(ords, project_id, &token).await? {
        Ok(assets) => assets,
        Err(_) => return Ok(session::invalid_token_response(jar)),
    };

    let filtered = filter_assets(assets, Some(year), categoria_id);
    let body = json!({
        "anio": year,
        "meses": timeline::months_with_photos(&filtered),
        "dias": timeline::group_by_day(&filtered),
    });

    Ok(Json(body).into_response())
}

fn validate_asset_payload(body: &Value) -> Result<(), ApiError> {
    let has_url = body
        .get("AV_URL")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());
    let has_capture = body
        .get("AV_FECHA_CAPTURA")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty());

    if !has_url || !has_capture {
        return Err(ApiError::bad_request(
            "AV_URL y AV_FECHA_CAPTURA son requeridos",
        ));
    }
    Ok(())
}

fn with_project_fk(mut body: Value, project_id: i64) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert("PR_IDPROYECTO_FK".to_string(), Value::from(project_id));
    }
    body
}

/// POST /api/projects/:id/activos
pub async fn create_asset(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;
    validate_asset_payload(&body)?;

    let ords = state.ords()?;
    let response = ords
        .post(
            &format!("/proyectos/{}/activos", project_id),
            Some(&token),
            &with_project_fk(body, project_id),
        )
        .await?;
    if !response.is_success() {
        let message = response.error_message("Error al crear el activo visual");
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
            .unwrap_or("Error al crear el activo visual");
        return Err(ApiError::bad_request(message));
    }

    Ok((StatusCode::CREATED, Json(data)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    #[serde(default)]
    pub activos: Vec<Value>,
}

/// POST /api/projects/:id/activos/batch
///
/// One backend create per element, fired concurrently and awaited
/// together. A failed element does not roll back the ones that already
/// succeeded; the reply carries one result per element plus the first
/// failure, so nothing is silently swallowed.
pub async fn create_assets_batch(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(request): Json<BatchCreateRequest>,
) -> Result<Response, ApiError> {
    let project_id = parse_project_id(&id)?;
    let token = session::require_token(&jar)?;

    if request.activos.is_empty() {
        return Err(ApiError::bad_request("Se requiere al menos un activo"));
    }

    let ords = state.ords()?;
    let path = format!("/proyectos/{}/activos", project_id);

    let calls = request.activos.into_iter().enumerate().map(|(index, item)| {
        let path = path.clone();
        let token = token.clone();
        async move {
            let nombre = item
                .get("AV_NOMBRE")
                .and_then(Value::as_str)
                .map(str::to_string);

            if let Err(e) = validate_asset_payload(&item) {
                return (index, nombre, Err(e.message().to_string()), None);
            }

            let body = with_project_fk(item, project_id);
            match ords.post(&path, Some(&token), &body).await {
                Ok(response) if response.is_success() => {
                    let data = response.json().unwrap_or(Value::Null);
                    if response::success_is_false(&data) {
                        let message = data
                            .get("message")
                            .and_then(Value::as_str)
                            .unwrap_or("Error al crear el activo visual")
                            .to_string();
                        (index, nombre, Err(message), Some(data))
                    } else {
                        (index, nombre, Ok(()), Some(data))
                    }
                }
                Ok(response) => {
                    let message = response.error_message("Error al crear el activo visual");
                    (index, nombre, Err(message), response.json())
                }
                Err(e) => {
                    tracing::error!(index, "Asset create failed: {}", e);
                    (index, nombre, Err(GENERIC_UPSTREAM_ERROR.to_string()), None)
                }
            }
        }
    });

    let outcomes = futures::future::join_all(calls).await;

    // A token teardown beats the per-item report: the whole batch ran
    // against a dead session.
    if outcomes
        .iter()
        .any(|(_, _, _, data)| data.as_ref().is_some_and(response::is_token_invalid))
    {
        return Ok(session::invalid_token_response(jar));
    }

    let (status, body) = batch_summary(
        outcomes
            .into_iter()
            .map(|(index, nombre, outcome, _)| (index, nombre, outcome))
            .collect(),
    );

    Ok((status, Json(body)).into_response())
}

/// Fold the per-element outcomes into the batch reply: 201 when every
/// create succeeded, otherwise 200 with `success:false` and the first
/// failure in `error`. Successes stay reported either way.
fn batch_summary(outcomes: Vec<(usize, Option<String>, Result<(), String>)>) -> (StatusCode, Value) {
    let mut first_error: Option<String> = None;
    let results: Vec<Value> = outcomes
        .into_iter()
        .map(|(index, nombre, outcome)| match outcome {
            Ok(()) => json!({"index": index, "nombre": nombre, "success": true}),
            Err(message) => {
                if first_error.is_none() {
                    first_error = Some(message.clone());
                }
                json!({"index": index, "nombre": nombre, "success": false, "error": message})
            }
        })
        .collect();

    match first_error {
        None => (StatusCode::CREATED, json!({"success": true, "results": results})),
        Some(error) => (
            StatusCode::OK,
            json!({"success": false, "error": error, "results": results}),
        ),
    }
}

/// PUT /api/projects/:id/activos/:activoId
pub async fn update_asset(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, activo_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, ApiError> {
    let (project_id, activo_id) = parse_ids(&id, &activo_id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .put(
            &format!("/proyectos/{}/activos/{}", project_id, activo_id),
            Some(&token),
            &body,
        )
        .await?;
    if !response.is_success() {
        let message = response.error_message("Error al actualizar el activo visual");
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
            .unwrap_or("Error al actualizar el activo visual");
        return Err(ApiError::bad_request(message));
    }

    Ok(Json(data).into_response())
}

/// DELETE /api/projects/:id/activos/:activoId
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path((id, activo_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (project_id, activo_id) = parse_ids(&id, &activo_id)?;
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords
        .delete(
            &format!("/proyectos/{}/activos/{}", project_id, activo_id),
            Some(&token),
        )
        .await?;

    delete_outcome(jar, response, "Error al eliminar el activo visual")
}

//! Storage statistics, aggregated from the normalized project list.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::ords::{fields, response};
use crate::AppState;

use super::error::ApiError;
use super::session;

/// Roll the per-project aggregate columns up into the dashboard totals.
pub fn summarize_projects(projects: &[Value]) -> Value {
    let total_files: i64 = projects
        .iter()
        .filter_map(|p| p.get("TOTAL_ACTIVOS").and_then(Value::as_i64))
        .sum();
    let total_categories: i64 = projects
        .iter()
        .filter_map(|p| p.get("TOTAL_CATEGORIAS").and_then(Value::as_i64))
        .sum();

    let files_by_project: Vec<Value> = projects
        .iter()
        .map(|p| {
            json!({
                "projectName": p.get("PR_NOMBRE").cloned().unwrap_or(Value::Null),
                "files": p.get("TOTAL_ACTIVOS").and_then(Value::as_i64).unwrap_or(0),
            })
        })
        .collect();

    json!({
        "totalProjects": projects.len(),
        "totalFiles": total_files,
        "totalCategories": total_categories,
        "filesByProject": files_by_project,
    })
}

/// GET /api/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let token = session::require_token(&jar)?;
    let ords = state.ords()?;

    let response = ords.get("/proyectos", Some(&token)).await?;
    if !response.is_success() {
        tracing::error!(status = %response.status, body = %response.body, "ORDS error fetching stats");
        return Err(ApiError::upstream(response.status, "Error al obtener estadísticas"));
    }

    let data = super::parse_json_body(&response)?;
    if response::is_token_invalid(&data) {
        return Ok(session::invalid_token_response(jar));
    }

    let records = response::normalize_records(&data)?;
    let projects: Vec<Value> = records.iter().map(fields::project_record).collect();

    Ok(Json(summarize_projects(&projects)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_projects() {
        let projects = vec![
            json!({"PR_NOMBRE": "Tami Alva", "TOTAL_ACTIVOS": 234, "TOTAL_CATEGORIAS": 4}),
            json!({"PR_NOMBRE": "Solana", "TOTAL_ACTIVOS": 187, "TOTAL_CATEGORIAS": 3}),
        ];

        let stats = summarize_projects(&projects);
        assert_eq!(stats["totalProjects"], 2);
        assert_eq!(stats["totalFiles"], 421);
        assert_eq!(stats["totalCategories"], 7);
        assert_eq!(stats["filesByProject"][0]["projectName"], "Tami Alva");
        assert_eq!(stats["filesByProject"][1]["files"], 187);
    }

    #[test]
    fn test_summarize_empty() {
        let stats = summarize_projects(&[]);
        assert_eq!(stats["totalProjects"], 0);
        assert_eq!(stats["totalFiles"], 0);
        assert!(stats["filesByProject"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_summarize_missing_counts_treated_as_zero() {
        let projects = vec![json!({"PR_NOMBRE": "Puente Nuevo"})];
        let stats = summarize_projects(&projects);
        assert_eq!(stats["totalFiles"], 0);
        assert_eq!(stats["filesByProject"][0]["files"], 0);
    }
}

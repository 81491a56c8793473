//! Photo upload endpoints.
//!
//! Files go to the object store server-side; the client only ever sees
//! the resulting public URL. A separate endpoint hands the client-visible
//! storage credential block to authenticated users for direct uploads.

use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

use crate::storage::ObjectStorage;
use crate::AppState;

use super::error::ApiError;
use super::session::SessionToken;

/// Upload size cap, 10 MB.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

const DEFAULT_DIRECTORY: &str = "activos-visuales";

/// POST /api/upload — multipart `file` plus optional `directorio`.
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    SessionToken(_token): SessionToken,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let storage = state.storage()?;

    let mut directorio = DEFAULT_DIRECTORY.to_string();
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Formulario inválido: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("directorio") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Formulario inválido: {}", e)))?;
                if !value.trim().is_empty() {
                    directorio = value.trim().to_string();
                }
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("archivo")
                    .to_string();
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Formulario inválido: {}", e)))?;
                file = Some((file_name, content_type, data));
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, data)) = file else {
        return Err(ApiError::bad_request("No se proporcionó ningún archivo"));
    };

    if data.len() > MAX_UPLOAD_SIZE {
        return Err(ApiError::bad_request(
            "El archivo es demasiado grande. Máximo 10MB",
        ));
    }

    let size = data.len();
    let key = ObjectStorage::object_key(&directorio, &file_name);
    let url = storage.put(&key, data, &content_type).await.map_err(|e| {
        tracing::error!("Upload to object storage failed: {:#}", e);
        ApiError::internal("Error al subir el archivo")
    })?;

    tracing::info!(%key, size, "Uploaded photo");

    Ok(Json(json!({
        "success": true,
        "url": url,
        "fileName": file_name,
        "size": size,
        "contentType": content_type,
    }))
    .into_response())
}

/// POST /api/upload/credentials — the client-side storage credential
/// block, only for authenticated sessions. The values live exclusively
/// in server config so they never ship in a client bundle.
pub async fn upload_credentials(
    State(state): State<Arc<AppState>>,
    SessionToken(_token): SessionToken,
) -> Result<Response, ApiError> {
    let storage = &state.config.storage;

    if storage.api_key.is_none() || storage.project_id.is_none() || storage.bucket.is_none() {
        return Err(ApiError::internal(
            "Las credenciales de almacenamiento no están configuradas correctamente",
        ));
    }

    Ok(Json(json!({
        "success": true,
        "credentials": {
            "apiKey": storage.api_key,
            "authDomain": storage.auth_domain,
            "projectId": storage.project_id,
            "storageBucket": storage.bucket,
            "appId": storage.app_id,
        },
    }))
    .into_response())
}

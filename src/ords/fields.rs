//! Field-case projection for backend records.
//!
//! ORDS returns column names in lower-case regardless of their canonical
//! upper-case form, and older module versions returned them upper-case.
//! Each record is projected through a strict allow-list: for every
//! recognized key the upper-case variant wins, the lower-case variant is
//! the fallback, and anything unrecognized is dropped. Numeric aggregate
//! columns default to zero so list views never see a missing count.

use serde_json::{Map, Value};

/// Allow-list for project rows.
pub const PROJECT_FIELDS: &[&str] = &[
    "PR_IDPROYECTO_PK",
    "PR_NOMBRE",
    "PR_UBICACION",
    "PR_DESCRIPCION",
    "PR_FOTO_PORTADA_URL",
    "PR_FECHA_INICIO",
    "PR_FECHA_FIN",
    "PR_ACTIVO",
    "ULTIMA_ACTUALIZACION",
];

/// Project aggregate columns that default to 0 when absent.
pub const PROJECT_COUNT_FIELDS: &[&str] = &["TOTAL_ACTIVOS", "TOTAL_CATEGORIAS"];

/// Allow-list for category rows.
pub const CATEGORY_FIELDS: &[&str] = &[
    "CT_IDCATEGORIA_PK",
    "PR_IDPROYECTO_FK",
    "CT_NOMBRE",
    "CT_DESCRIPCION",
    "CT_ICONO",
    "CT_COLOR",
    "CT_ORDEN",
    "CT_ACTIVO",
];

/// Allow-list for visual-asset rows.
pub const ASSET_FIELDS: &[&str] = &[
    "AV_IDACTIVO_PK",
    "PR_IDPROYECTO_FK",
    "CT_IDCATEGORIA_FK",
    "AV_NOMBRE",
    "AV_DESCRIPCION",
    "AV_URL",
    "AV_FECHA_CAPTURA",
    "AV_FECHA_CARGA",
    "AV_FILENAME",
    "AV_MIMETYPE",
    "AV_TAMANIO",
];

fn lookup<'a>(record: &'a Value, canonical: &str) -> Option<&'a Value> {
    let value = record
        .get(canonical)
        .or_else(|| record.get(canonical.to_lowercase()));
    value.filter(|v| !v.is_null())
}

/// Project a record through an allow-list of canonical upper-case keys.
///
/// `zero_defaults` names the keys that are emitted as 0 when missing in
/// both casings; every other missing key is omitted from the output.
pub fn remap_record(record: &Value, fields: &[&str], zero_defaults: &[&str]) -> Value {
    let mut out = Map::new();

    for key in fields {
        if let Some(value) = lookup(record, key) {
            out.insert((*key).to_string(), value.clone());
        }
    }

    for key in zero_defaults {
        let value = lookup(record, key).cloned().unwrap_or(Value::from(0));
        out.insert((*key).to_string(), value);
    }

    Value::Object(out)
}

pub fn project_record(record: &Value) -> Value {
    remap_record(record, PROJECT_FIELDS, PROJECT_COUNT_FIELDS)
}

pub fn category_record(record: &Value) -> Value {
    remap_record(record, CATEGORY_FIELDS, &[])
}

pub fn asset_record(record: &Value) -> Value {
    remap_record(record, ASSET_FIELDS, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lowercase_key_is_projected() {
        let out = project_record(&json!({"pr_idproyecto_pk": 5, "pr_nombre": "Puente Nuevo"}));
        assert_eq!(out["PR_IDPROYECTO_PK"], 5);
        assert_eq!(out["PR_NOMBRE"], "Puente Nuevo");
    }

    #[test]
    fn test_uppercase_wins_when_both_present() {
        let out = project_record(&json!({
            "pr_idproyecto_pk": 5,
            "PR_IDPROYECTO_PK": 7,
        }));
        assert_eq!(out["PR_IDPROYECTO_PK"], 7);
    }

    #[test]
    fn test_counts_default_to_zero() {
        let out = project_record(&json!({"pr_nombre": "Solana"}));
        assert_eq!(out["TOTAL_ACTIVOS"], 0);
        assert_eq!(out["TOTAL_CATEGORIAS"], 0);
    }

    #[test]
    fn test_counts_kept_when_present() {
        let out = project_record(&json!({"total_activos": 42, "TOTAL_CATEGORIAS": 3}));
        assert_eq!(out["TOTAL_ACTIVOS"], 42);
        assert_eq!(out["TOTAL_CATEGORIAS"], 3);
    }

    #[test]
    fn test_unrecognized_fields_dropped() {
        let out = category_record(&json!({
            "ct_nombre": "Drones",
            "rowid": "AAAx",
            "links": [{"rel": "self"}]
        }));
        assert_eq!(out["CT_NOMBRE"], "Drones");
        assert!(out.get("rowid").is_none());
        assert!(out.get("links").is_none());
        assert!(out.get("ROWID").is_none());
    }

    #[test]
    fn test_missing_non_count_fields_omitted() {
        let out = category_record(&json!({"ct_nombre": "Sedes"}));
        assert!(out.get("CT_DESCRIPCION").is_none());
        assert!(out.get("CT_ORDEN").is_none());
    }

    #[test]
    fn test_null_treated_as_absent() {
        let out = asset_record(&json!({
            "av_nombre": null,
            "AV_NOMBRE": "fachada.jpg",
            "ct_idcategoria_fk": null,
        }));
        assert_eq!(out["AV_NOMBRE"], "fachada.jpg");
        assert!(out.get("CT_IDCATEGORIA_FK").is_none());
    }

    #[test]
    fn test_falsy_values_survive_projection() {
        // Zero and empty string are real values, not absences.
        let out = category_record(&json!({"ct_orden": 0, "ct_descripcion": ""}));
        assert_eq!(out["CT_ORDEN"], 0);
        assert_eq!(out["CT_DESCRIPCION"], "");
    }

    #[test]
    fn test_asset_projection() {
        let out = asset_record(&json!({
            "av_idactivo_pk": 9,
            "pr_idproyecto_fk": 5,
            "av_url": "https://storage.example.com/f.jpg",
            "av_fecha_captura": "2025-06-10",
            "av_tamanio": 204800,
        }));
        assert_eq!(out["AV_IDACTIVO_PK"], 9);
        assert_eq!(out["PR_IDPROYECTO_FK"], 5);
        assert_eq!(out["AV_FECHA_CAPTURA"], "2025-06-10");
        assert_eq!(out["AV_TAMANIO"], 204800);
    }
}

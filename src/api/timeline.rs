//! Capture-date parsing and timeline grouping.
//!
//! Assets carry `AV_FECHA_CAPTURA` as a date or date+time string; the
//! timeline view groups one year's photos by capture day. Assets without
//! a parseable capture date never appear in a group.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Parse a capture timestamp in the formats the backend emits: bare
/// date, space-separated date+time, ISO `T`-separated, or RFC 3339.
pub fn parse_capture_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

/// The capture date of an asset record, if present and parseable.
pub fn capture_date(record: &Value) -> Option<NaiveDateTime> {
    record
        .get("AV_FECHA_CAPTURA")
        .and_then(Value::as_str)
        .and_then(parse_capture_date)
}

/// One capture day and its photos.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayGroup {
    pub fecha: String,
    pub dia: u32,
    pub mes: u32,
    #[serde(rename = "mesNombre")]
    pub mes_nombre: String,
    pub activos: Vec<Value>,
}

/// Group assets by capture day, ordered by month then day. Asset order
/// inside a group follows the input order.
pub fn group_by_day(records: &[Value]) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();

    for record in records {
        let Some(date) = capture_date(record) else {
            continue;
        };

        let dia = date.day();
        let mes = date.month();
        let fecha = format!("{}-{}-{}", date.year(), mes, dia);

        match groups.iter_mut().find(|g| g.fecha == fecha) {
            Some(group) => group.activos.push(record.clone()),
            None => groups.push(DayGroup {
                fecha,
                dia,
                mes,
                mes_nombre: MONTH_NAMES[mes as usize - 1].to_string(),
                activos: vec![record.clone()],
            }),
        }
    }

    groups.sort_by_key(|g| (g.mes, g.dia));
    groups
}

/// Distinct months (1-12) with at least one photo, ascending.
pub fn months_with_photos(records: &[Value]) -> Vec<u32> {
    let mut months: Vec<u32> = records
        .iter()
        .filter_map(capture_date)
        .map(|d| d.month())
        .collect();
    months.sort_unstable();
    months.dedup();
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn asset(capture: &str, id: i64) -> Value {
        json!({"AV_IDACTIVO_PK": id, "AV_FECHA_CAPTURA": capture})
    }

    #[test]
    fn test_parse_capture_date_formats() {
        assert!(parse_capture_date("2025-06-10").is_some());
        assert!(parse_capture_date("2025-06-10 14:30:00").is_some());
        assert!(parse_capture_date("2025-06-10T14:30:00").is_some());
        assert!(parse_capture_date("2025-06-10T14:30:00Z").is_some());
        assert!(parse_capture_date(" 2025-06-10 ").is_some());

        assert!(parse_capture_date("").is_none());
        assert!(parse_capture_date("10/06/2025").is_none());
        assert!(parse_capture_date("ayer").is_none());
        assert!(parse_capture_date("2025-13-40").is_none());
    }

    #[test]
    fn test_capture_date_reads_record() {
        let date = capture_date(&asset("2025-06-10", 1)).unwrap();
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 6);
        assert_eq!(date.day(), 10);

        assert!(capture_date(&json!({"AV_IDACTIVO_PK": 1})).is_none());
        assert!(capture_date(&json!({"AV_FECHA_CAPTURA": null})).is_none());
    }

    #[test]
    fn test_group_by_day_sorted_by_month_then_day() {
        let records = vec![
            asset("2025-06-15", 1),
            asset("2025-03-02", 2),
            asset("2025-06-15 09:30:00", 3),
            asset("2025-06-01", 4),
        ];

        let groups = group_by_day(&records);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].fecha, "2025-3-2");
        assert_eq!((groups[0].mes, groups[0].dia), (3, 2));
        assert_eq!(groups[0].mes_nombre, "Marzo");

        assert_eq!(groups[1].fecha, "2025-6-1");
        assert_eq!(groups[2].fecha, "2025-6-15");

        // Same calendar day regardless of time-of-day.
        assert_eq!(groups[2].activos.len(), 2);
        assert_eq!(groups[2].activos[0]["AV_IDACTIVO_PK"], 1);
        assert_eq!(groups[2].activos[1]["AV_IDACTIVO_PK"], 3);
    }

    #[test]
    fn test_group_by_day_skips_undated_assets() {
        let records = vec![asset("2025-06-15", 1), json!({"AV_IDACTIVO_PK": 2})];
        let groups = group_by_day(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].activos.len(), 1);
    }

    #[test]
    fn test_months_with_photos() {
        let records = vec![
            asset("2025-06-15", 1),
            asset("2025-03-02", 2),
            asset("2025-06-20", 3),
            json!({"AV_IDACTIVO_PK": 4}),
        ];
        assert_eq!(months_with_photos(&records), vec![3, 6]);
        assert!(months_with_photos(&[]).is_empty());
    }
}

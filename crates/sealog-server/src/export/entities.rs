//! Cruise and lowering CSV
//!
//! Additional metadata is lifted into top-level columns. Visibility fields
//! and the attachment list never appear in the export.

use chrono::SecondsFormat;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use sealog_common::types::{EntityKind, EntityRecord};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

fn fixed_columns(kind: EntityKind) -> [String; 6] {
    [
        "id".to_string(),
        kind.field("id"),
        "start_ts".to_string(),
        "stop_ts".to_string(),
        kind.field("location"),
        kind.field("tags"),
    ]
}

fn meta_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(meta_cell).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

fn record_cells(kind: EntityKind, record: &EntityRecord) -> BTreeMap<String, String> {
    let [id, name, start, stop, location, tags] = fixed_columns(kind);
    let mut cells = BTreeMap::new();
    cells.insert(id, record.id.to_string());
    cells.insert(name, record.name.clone());
    cells.insert(start, record.start_ts.to_rfc3339_opts(SecondsFormat::Millis, true));
    cells.insert(stop, record.stop_ts.to_rfc3339_opts(SecondsFormat::Millis, true));
    cells.insert(location, record.location.clone());
    cells.insert(tags, record.tags.join(","));

    let files = kind.field("files");
    for (key, value) in &record.additional_meta {
        if *key != files {
            cells.insert(key.clone(), meta_cell(value));
        }
    }
    cells
}

/// Six fixed leading columns, then every other column sorted by name.
///
/// Every cell is quoted. Rows are separated by `\n` with no trailing newline.
pub fn records_to_csv(kind: EntityKind, records: &[EntityRecord]) -> csv::Result<String> {
    let fixed = fixed_columns(kind);
    let rows: Vec<BTreeMap<String, String>> =
        records.iter().map(|r| record_cells(kind, r)).collect();

    let extra: BTreeSet<&String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .filter(|key| !fixed.contains(*key))
        .collect();
    let columns: Vec<&String> = fixed.iter().chain(extra).collect();

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in &rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(*c).map(String::as_str).unwrap_or("")),
        )?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    let mut out = String::from_utf8_lossy(&bytes).into_owned();
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_cruise_csv_layout() {
        let record = EntityRecord {
            id: Uuid::nil(),
            name: "AT42-01".to_string(),
            start_ts: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            stop_ts: Utc.with_ymd_and_hms(2023, 1, 31, 0, 0, 0).unwrap(),
            location: "East Pacific Rise".to_string(),
            additional_meta: json!({
                "cruise_vessel": "R/V Atlantis",
                "cruise_pi": "Dr. \"Sam\" Smith",
                "cruise_participants": ["Ann", "Bo"],
                "cruise_files": ["plan.pdf"]
            })
            .as_object()
            .cloned()
            .unwrap(),
            tags: vec!["vents".into(), "alvin".into()],
            hidden: true,
            access_list: vec!["u1".into()],
        };

        let csv = records_to_csv(EntityKind::Cruise, &[record]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "\"id\",\"cruise_id\",\"start_ts\",\"stop_ts\",\"cruise_location\",\"cruise_tags\",\
             \"cruise_participants\",\"cruise_pi\",\"cruise_vessel\""
        );
        assert_eq!(
            lines[1],
            "\"00000000-0000-0000-0000-000000000000\",\"AT42-01\",\"2023-01-01T00:00:00.000Z\",\
             \"2023-01-31T00:00:00.000Z\",\"East Pacific Rise\",\"vents,alvin\",\"Ann,Bo\",\
             \"Dr. \"\"Sam\"\" Smith\",\"R/V Atlantis\""
        );
        assert!(!csv.contains("hidden"));
        assert!(!csv.contains("plan.pdf"));
    }

    #[test]
    fn test_union_of_meta_columns() {
        let mut a = EntityRecord {
            id: Uuid::nil(),
            name: "S0412".into(),
            start_ts: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            stop_ts: Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap(),
            location: String::new(),
            additional_meta: Default::default(),
            tags: vec![],
            hidden: false,
            access_list: vec![],
        };
        let mut b = a.clone();
        a.additional_meta.insert("lowering_pilot".into(), json!("Pat"));
        b.additional_meta.insert("lowering_observers".into(), json!(["X"]));

        let csv = records_to_csv(EntityKind::Lowering, &[a, b]).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert!(lines[0].ends_with("\"lowering_tags\",\"lowering_observers\",\"lowering_pilot\""));
        assert!(lines[1].ends_with("\"\",\"\",\"Pat\""));
        assert!(lines[2].ends_with("\"\",\"X\",\"\""));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_cells_with_separators_stay_in_one_column() {
        let record = EntityRecord {
            id: Uuid::nil(),
            name: "S0412".into(),
            start_ts: Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            stop_ts: Utc.with_ymd_and_hms(2023, 1, 3, 0, 0, 0).unwrap(),
            location: "Axial, \"north\"\nrift".into(),
            additional_meta: Default::default(),
            tags: vec![],
            hidden: false,
            access_list: vec![],
        };

        let csv = records_to_csv(EntityKind::Lowering, &[record]).unwrap();
        let mut reader = csv::ReaderBuilder::new().from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.len(), headers.len());
        assert_eq!(&row[4], "Axial, \"north\"\nrift");
    }

    #[test]
    fn test_no_records_is_header_only() {
        let csv = records_to_csv(EntityKind::Cruise, &[]).unwrap();
        assert_eq!(
            csv,
            "\"id\",\"cruise_id\",\"start_ts\",\"stop_ts\",\"cruise_location\",\"cruise_tags\""
        );
    }
}

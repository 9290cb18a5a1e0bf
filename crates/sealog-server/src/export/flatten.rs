use chrono::SecondsFormat;
use sealog_common::types::Event;
use std::collections::{BTreeMap, HashMap};

/// One event as an ordered column → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedRow {
    cells: Vec<(String, String)>,
}

impl FlattenedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, keeping its original position when it already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<C: Into<String>, V: Into<String>> FromIterator<(C, V)> for FlattenedRow {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut row = FlattenedRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub rows: Vec<FlattenedRow>,
    /// Rows grouped by `event_value`, in original order within each group
    pub rows_by_category: BTreeMap<String, Vec<FlattenedRow>>,
}

pub fn flatten(events: &[Event]) -> Flattened {
    let mut flattened = Flattened::default();

    for event in events {
        let row = flatten_event(event);
        flattened
            .rows_by_category
            .entry(event.event_value.clone())
            .or_default()
            .push(row.clone());
        flattened.rows.push(row);
    }

    flattened
}

fn flatten_event(event: &Event) -> FlattenedRow {
    let mut row = FlattenedRow::new();
    row.insert("ts", event.ts.to_rfc3339_opts(SecondsFormat::Millis, true));
    row.insert("event_author", event.event_author.as_str());
    row.insert("event_free_text", event.event_free_text.as_str());
    row.insert("event_value", event.event_value.as_str());
    row.insert("id", event.id.to_string());

    for option in &event.event_options {
        row.insert(
            format!("event_option.{}", option.event_option_name),
            option.event_option_value.as_str(),
        );
    }

    for group in &event.aux_data {
        // Repeated names within a group become name, name_2, name_3, ...
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for field in &group.data_array {
            let occurrence = seen.entry(field.data_name.as_str()).or_insert(0);
            *occurrence += 1;

            let mut label = format!("{}.{}", group.data_source, field.data_name);
            if *occurrence > 1 {
                label.push_str(&format!("_{}", occurrence));
            }
            if let Some(uom) = field.data_uom.as_deref().filter(|uom| !uom.is_empty()) {
                label.push_str(&format!(" ({})", uom));
            }
            row.insert(label, field.data_value.to_string());
        }
    }

    row
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sealog_common::types::{AuxField, AuxGroup, EventOption};
    use serde_json::json;

    fn sample_event() -> Event {
        serde_json::from_value(json!({
            "id": "5d27973b-d184-8b7e-b56f-a85d00000000",
            "ts": "2023-10-14T10:10:10.000Z",
            "event_author": "user",
            "event_value": "TEST",
            "event_free_text": "Some \"event\" text",
            "event_options": [{ "event_option_name": "option1", "event_option_value": "value1" }],
            "aux_data": []
        }))
        .unwrap()
    }

    fn aux(source: &str, fields: &[(&str, &str, Option<&str>)]) -> AuxGroup {
        AuxGroup {
            id: None,
            data_source: source.to_string(),
            data_array: fields
                .iter()
                .map(|(name, value, uom)| AuxField {
                    data_name: name.to_string(),
                    data_value: (*value).into(),
                    data_uom: uom.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_flatten_scalars_and_options() {
        let out = flatten(&[sample_event()]);
        let row = &out.rows[0];
        assert_eq!(row.get("event_option.option1"), Some("value1"));
        assert_eq!(row.get("ts"), Some("2023-10-14T10:10:10.000Z"));
        assert_eq!(row.get("event_free_text"), Some("Some \"event\" text"));
        assert_eq!(row.get("id"), Some("5d27973b-d184-8b7e-b56f-a85d00000000"));
    }

    #[test]
    fn test_duplicate_aux_names_are_numbered_before_unit() {
        let mut event = sample_event();
        event.aux_data = vec![aux(
            "framegrabber",
            &[
                ("camera_name", "SciCam", None),
                ("filename", "a.png", Some("path")),
                ("camera_name", "BrowCam", None),
                ("filename", "b.png", Some("path")),
            ],
        )];

        let row = &flatten(&[event]).rows[0];
        let columns: Vec<_> = row
            .columns()
            .filter(|c| c.starts_with("framegrabber."))
            .collect();
        assert_eq!(
            columns,
            vec![
                "framegrabber.camera_name",
                "framegrabber.filename (path)",
                "framegrabber.camera_name_2",
                "framegrabber.filename_2 (path)",
            ]
        );
        assert_eq!(row.get("framegrabber.camera_name"), Some("SciCam"));
        assert_eq!(row.get("framegrabber.camera_name_2"), Some("BrowCam"));
    }

    #[test]
    fn test_numeric_aux_values_and_units() {
        let mut event = sample_event();
        event.aux_data = vec![AuxGroup {
            id: None,
            data_source: "vehicleRealtimeNavData".to_string(),
            data_array: vec![AuxField {
                data_name: "depth".to_string(),
                data_value: serde_json::from_value(json!(2556.48)).unwrap(),
                data_uom: Some("meters".to_string()),
            }],
        }];
        let row = &flatten(&[event]).rows[0];
        assert_eq!(row.get("vehicleRealtimeNavData.depth (meters)"), Some("2556.48"));
    }

    #[test]
    fn test_rows_grouped_by_category_in_order() {
        let mut first = sample_event();
        first.event_value = "SAMPLE".into();
        let mut second = sample_event();
        second.event_value = "FISH".into();
        let mut third = sample_event();
        third.event_value = "SAMPLE".into();
        third.event_options = vec![EventOption {
            event_option_name: "sample_id".into(),
            event_option_value: "S-2".into(),
        }];

        let out = flatten(&[first, second, third]);
        assert_eq!(out.rows.len(), 3);
        let samples = &out.rows_by_category["SAMPLE"];
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].get("event_option.sample_id"), Some("S-2"));
        assert_eq!(out.rows_by_category["FISH"].len(), 1);
    }

    #[test]
    fn test_insert_keeps_position() {
        let mut row: FlattenedRow = [("a", "1"), ("b", "2")].into_iter().collect();
        row.insert("a", "3");
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some("3"));
        assert_eq!(row.len(), 2);
    }
}

//! Event export tests: parent visibility, filters, CSV
#![allow(clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use common::*;
use sealog_common::types::{EntityKind, EntityRecord};
use serde_json::Value;

struct Fixture {
    app: TestApp,
    cruise: EntityRecord,
    lowering: EntityRecord,
}

/// One cruise (1st-10th) with a lowering on the 2nd and five events.
async fn fixture(access_control: bool) -> Fixture {
    let app = TestApp::new(access_control).await;
    let cruise = record("AT42-01", ts(1, 0), ts(10, 0));
    let lowering = record("S0001", ts(2, 0), ts(2, 8));
    app.insert(EntityKind::Cruise, &cruise).await;
    app.insert(EntityKind::Lowering, &lowering).await;

    let sample = with_aux(
        with_aux(
            with_option(event(ts(2, 2), "pilot", "SAMPLE"), "sample_id", "S1"),
            "vehicleRealtimeNavData",
            &[("latitude", "47.9", "ddeg"), ("longitude", "-129.1", "ddeg")],
        ),
        "vehicleReNavData",
        &[("latitude", "47.95", "ddeg")],
    );
    let mut note = event(ts(2, 3), "copilot", "NOTE");
    note.event_free_text = "Bright white smoker".to_string();
    let snap = event(ts(2, 4), "pilot", "ASNAP");
    let deck = event(ts(5, 0), "watchlead", "OFF DECK");
    let after = event(ts(11, 0), "pilot", "SAMPLE");

    for e in [sample, note, snap, deck, after] {
        app.store.insert_event(e).await;
    }

    Fixture {
        app,
        cruise,
        lowering,
    }
}

fn values(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_value"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_by_cruise_returns_events_in_window_oldest_first() {
    let f = fixture(false).await;
    let (status, body) = f
        .app
        .send(get(&format!("/api/v1/event_exports/bycruise/{}", f.cruise.id), None))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP", "OFF DECK"]);
    assert_eq!(body["meta"]["count"], 4);
}

#[tokio::test]
async fn test_by_lowering_filters() {
    let f = fixture(false).await;
    let base = format!("/api/v1/event_exports/bylowering/{}", f.lowering.id);

    let (_, body) = f.app.send(get(&base, None)).await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP"]);

    // Patterns are unanchored and case-insensitive
    let (_, body) = f.app.send(get(&format!("{base}?author=PILOT"), None)).await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP"]);

    let (_, body) = f.app.send(get(&format!("{base}?author=%5Epilot%24,watchlead"), None)).await;
    assert_eq!(values(&body), vec!["SAMPLE", "ASNAP"]);

    let (_, body) = f.app.send(get(&format!("{base}?value=!ASNAP"), None)).await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE"]);

    let (_, body) = f.app.send(get(&format!("{base}?value=sample,note"), None)).await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE"]);

    let (_, body) = f.app.send(get(&format!("{base}?freetext=smoker"), None)).await;
    assert_eq!(values(&body), vec!["NOTE"]);

    let (_, body) = f
        .app
        .send(get(&format!("{base}?datasource=vehicleReNavData"), None))
        .await;
    assert_eq!(values(&body), vec!["SAMPLE"]);

    let (_, body) = f.app.send(get(&format!("{base}?offset=1&limit=1"), None)).await;
    assert_eq!(values(&body), vec!["NOTE"]);

    let (status, body) = f.app.send(get(&format!("{base}?value=NOPE"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "No records found");

    let (status, _) = f.app.send(get(&format!("{base}?author=(unclosed"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requested_window_is_clamped_to_parent() {
    let f = fixture(false).await;
    let base = format!("/api/v1/event_exports/bylowering/{}", f.lowering.id);

    // A start outside the lowering falls back to the lowering start
    let (_, body) = f
        .app
        .send(get(&format!("{base}?startTS=2023-01-01T00:00:00Z"), None))
        .await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP"]);

    let (_, body) = f
        .app
        .send(get(&format!("{base}?startTS=2023-03-02T03:00:00Z"), None))
        .await;
    assert_eq!(values(&body), vec!["NOTE", "ASNAP"]);

    let (_, body) = f
        .app
        .send(get(&format!("{base}?stopTS=2023-03-20T00:00:00Z"), None))
        .await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP"]);
}

#[tokio::test]
async fn test_hidden_parent_blocks_export() {
    let f = fixture(true).await;
    let mut cruise = f.cruise.clone();
    cruise.hidden = true;
    cruise.access_list = vec!["u1".to_string()];
    use sealog_server::store::DocumentStore;
    f.app.store.replace_record(EntityKind::Cruise, &cruise).await.unwrap();
    let uri = format!("/api/v1/event_exports/bycruise/{}", cruise.id);

    let (status, body) = f.app.send(get(&uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = f.app.send(get(&uri, Some(OUTSIDER))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = f.app.send(get(&uri, Some(MEMBER))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_events_inside_hidden_lowerings_are_dropped() {
    let f = fixture(false).await;
    let mut lowering = f.lowering.clone();
    lowering.hidden = true;
    use sealog_server::store::DocumentStore;
    f.app
        .store
        .replace_record(EntityKind::Lowering, &lowering)
        .await
        .unwrap();
    let uri = format!("/api/v1/event_exports/bycruise/{}", f.cruise.id);

    let (status, body) = f.app.send(get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(values(&body), vec!["OFF DECK"]);

    let (_, body) = f.app.send(get(&uri, Some(ADMIN))).await;
    assert_eq!(values(&body), vec!["SAMPLE", "NOTE", "ASNAP", "OFF DECK"]);

    // Paging counts only exported events
    let (_, body) = f.app.send(get(&format!("{uri}?limit=1"), None)).await;
    assert_eq!(values(&body), vec!["OFF DECK"]);

    let (status, _) = f
        .app
        .send(get(
            &format!("/api/v1/event_exports/bylowering/{}", lowering.id),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hidden_lowering_straddling_cruise_end_drops_events() {
    let f = fixture(false).await;
    let straddling = hidden(record("S0002", ts(9, 20), ts(11, 4)), &[]);
    f.app.insert(EntityKind::Lowering, &straddling).await;
    f.app.store.insert_event(event(ts(9, 22), "pilot", "RECOVERY")).await;
    let uri = format!("/api/v1/event_exports/bycruise/{}", f.cruise.id);

    let (status, body) = f.app.send(get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!values(&body).contains(&"RECOVERY"));
    assert!(values(&body).contains(&"OFF DECK"));

    let (_, body) = f.app.send(get(&uri, Some(ADMIN))).await;
    assert_eq!(values(&body).last(), Some(&"RECOVERY"));
}

#[tokio::test]
async fn test_csv_prefers_one_nav_source() {
    let f = fixture(false).await;
    let base = format!(
        "/api/v1/event_exports/bylowering/{}?format=csv&value=SAMPLE",
        f.lowering.id
    );

    let (status, body) = f.app.send_raw(get(&base, None)).await;
    assert_eq!(status, StatusCode::OK);
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Date/Time (UTC),vehicleRealtimeNavData.latitude (ddeg),vehicleRealtimeNavData.longitude (ddeg),event_author,event_free_text,event_value,event_option.sample_id,id"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with(r#""2023-03-02T02:00:00.000Z","47.9","-129.1","pilot","","SAMPLE","S1","#));
    assert!(!body.contains("47.95"));

    let (_, body) = f.app.send_raw(get(&format!("{base}&use_renav=true"), None)).await;
    assert_eq!(
        body.lines().next().unwrap(),
        "Date/Time (UTC),vehicleReNavData.latitude (ddeg),event_author,event_free_text,event_value,event_option.sample_id,id"
    );
    assert!(body.contains("\"47.95\""));
    assert!(!body.contains("-129.1"));
}

#[tokio::test]
async fn test_csv_category() {
    let f = fixture(false).await;
    let base = format!(
        "/api/v1/event_exports/bycruise/{}?format=csv",
        f.cruise.id
    );

    let (status, body) = f.app.send_raw(get(&format!("{base}&category=NOTE"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.lines().count(), 2);
    assert!(body.contains("Bright white smoker"));

    let (status, _) = f.app.send_raw(get(&format!("{base}&category=DIVE"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

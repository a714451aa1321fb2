use std::path::Path;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, DashboardState, Request};
use crate::model::DashboardPayload;
use crate::nav::Navigator;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "mentorId": state.dashboard.as_ref().map(|d| d.mentor_id),
            "snapshotId": state.dashboard.as_ref().map(|d| d.snapshot_id.clone()),
        }),
    )
}

fn required_mentor_id(req: &Request) -> Result<i64, serde_json::Value> {
    req.params
        .get("mentorId")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", "missing mentorId", None))
}

fn install_payload(
    state: &mut AppState,
    req: &Request,
    mentor_id: i64,
    payload: DashboardPayload,
) -> serde_json::Value {
    let snapshot_id = Uuid::new_v4().to_string();
    let loaded_at = Utc::now().to_rfc3339();
    let goal_set_count = payload.goal_set_count();
    let goal_not_set_count = payload.goal_not_set_count();
    state.dashboard = Some(DashboardState {
        mentor_id,
        snapshot_id: snapshot_id.clone(),
        loaded_at: loaded_at.clone(),
        payload,
    });
    // A new snapshot invalidates whatever the old one was showing.
    state.nav = Navigator::new();
    ok(
        &req.id,
        json!({
            "snapshotId": snapshot_id,
            "loadedAt": loaded_at,
            "goalSetCount": goal_set_count,
            "goalNotSetCount": goal_not_set_count,
        }),
    )
}

fn handle_dashboard_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mentor_id = match required_mentor_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(raw) = req.params.get("payload") else {
        return err(&req.id, "bad_params", "missing payload", None);
    };
    let payload: DashboardPayload = match serde_json::from_value(raw.clone()) {
        Ok(v) => v,
        Err(e) => {
            return err(
                &req.id,
                "bad_params",
                format!("invalid payload: {}", e),
                None,
            )
        }
    };
    install_payload(state, req, mentor_id, payload)
}

fn read_payload_file(path: &Path) -> anyhow::Result<DashboardPayload> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn handle_dashboard_load_file(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mentor_id = match required_mentor_id(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(path) = req.params.get("path").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing path", None);
    };
    match read_payload_file(Path::new(path)) {
        Ok(payload) => install_payload(state, req, mentor_id, payload),
        Err(e) => err(&req.id, "load_failed", format!("{e:?}"), None),
    }
}

fn handle_dashboard_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(dash) = state.dashboard.as_ref() else {
        return err(&req.id, "no_dashboard", "load a dashboard first", None);
    };
    ok(
        &req.id,
        json!({
            "mentorId": dash.mentor_id,
            "snapshotId": dash.snapshot_id,
            "loadedAt": dash.loaded_at,
            "goalSetCount": dash.payload.goal_set_count(),
            "goalNotSetCount": dash.payload.goal_not_set_count(),
            "notDecidedCount": dash.payload.not_decided_count(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "dashboard.load" => Some(handle_dashboard_load(state, req)),
        "dashboard.loadFile" => Some(handle_dashboard_load_file(state, req)),
        "dashboard.summary" => Some(handle_dashboard_summary(state, req)),
        _ => None,
    }
}

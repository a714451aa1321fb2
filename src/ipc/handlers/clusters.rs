use serde_json::json;

use crate::cluster;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentSummary;

fn parse_students(req: &Request) -> Result<Vec<StudentSummary>, serde_json::Value> {
    let Some(raw) = req.params.get("students") else {
        return Err(err(&req.id, "bad_params", "missing students", None));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| err(&req.id, "bad_params", format!("invalid students: {}", e), None))
}

fn handle_aggregate(req: &Request) -> serde_json::Value {
    let students = match parse_students(req) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let domain = req.params.get("domain").and_then(|v| v.as_str());
    ok(&req.id, json!(cluster::aggregate(&students, domain)))
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "clusters.aggregate" => Some(handle_aggregate(req)),
        _ => None,
    }
}

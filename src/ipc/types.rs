use serde::Deserialize;

use crate::model::DashboardPayload;
use crate::nav::Navigator;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The payload snapshot currently backing the navigation session. Replaced
/// wholesale on every load; counts are folded from it per request.
pub struct DashboardState {
    pub mentor_id: i64,
    pub snapshot_id: String,
    pub loaded_at: String,
    pub payload: DashboardPayload,
}

pub struct AppState {
    pub dashboard: Option<DashboardState>,
    pub nav: Navigator,
}

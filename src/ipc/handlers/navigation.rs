use serde_json::json;

use crate::cluster::{self, Cluster};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, DashboardState, Request};
use crate::model::StudentSummary;
use crate::nav::{Level, NavError, NotDecidedCategory, RootBranch, Scope};

fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

fn dashboard<'a>(state: &'a AppState, req: &Request) -> Result<&'a DashboardState, serde_json::Value> {
    state
        .dashboard
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_dashboard", "load a dashboard first", None))
}

fn nav_err(req: &Request, e: NavError) -> serde_json::Value {
    err(&req.id, &e.code, e.message, None)
}

fn state_json(state: &AppState) -> serde_json::Value {
    json!({
        "level": state.nav.level().as_str(),
        "context": state.nav.context().to_json(),
        "canGoBack": state.nav.depth() > 0,
    })
}

fn handle_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = dashboard(state, req) {
        return resp;
    }
    ok(&req.id, state_json(state))
}

fn handle_select_root(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = dashboard(state, req) {
        return resp;
    }
    let raw = match required_str(req, "branch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(branch) = RootBranch::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "branch must be one of: GOAL_SET, GOAL_NOT_SET",
            Some(json!({ "branch": raw })),
        );
    };
    match state.nav.select_root(branch) {
        Ok(()) => ok(&req.id, state_json(state)),
        Err(e) => nav_err(req, e),
    }
}

fn domain_slice(dash: &DashboardState, scope: Scope, domain: &str) -> Vec<StudentSummary> {
    let map = match scope {
        Scope::GoalSet => &dash.payload.goal_set,
        Scope::GoalNotSet => &dash.payload.goal_not_set.likelihood_domains,
        Scope::NotDecided => return Vec::new(),
    };
    map.get(domain).cloned().unwrap_or_default()
}

fn handle_select_domain(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw_scope = match required_str(req, "scope") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let domain = match required_str(req, "domain") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let scope = match Scope::parse(&raw_scope) {
        Some(s @ (Scope::GoalSet | Scope::GoalNotSet)) => s,
        _ => {
            return err(
                &req.id,
                "bad_params",
                "scope must be one of: GOAL_SET, GOAL_NOT_SET",
                Some(json!({ "scope": raw_scope })),
            )
        }
    };
    let students = match dashboard(state, req) {
        Ok(dash) => domain_slice(dash, scope, &domain),
        Err(resp) => return resp,
    };
    match state.nav.select_domain(scope, domain, students) {
        Ok(()) => ok(&req.id, state_json(state)),
        Err(e) => nav_err(req, e),
    }
}

fn handle_select_not_decided_parent(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = dashboard(state, req) {
        return resp;
    }
    match state.nav.select_not_decided_parent() {
        Ok(()) => ok(&req.id, state_json(state)),
        Err(e) => nav_err(req, e),
    }
}

fn category_slice<'a>(
    dash: &'a DashboardState,
    category: NotDecidedCategory,
) -> &'a [StudentSummary] {
    let nd = &dash.payload.goal_not_set.not_decided;
    match category {
        NotDecidedCategory::Confused => &nd.confused,
        NotDecidedCategory::New => &nd.new,
        NotDecidedCategory::NotEngaged => &nd.not_engaged,
    }
}

fn handle_select_not_decided(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "category") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(category) = NotDecidedCategory::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "category must be one of: Confused, New, Not Engaged",
            Some(json!({ "category": raw })),
        );
    };
    let students = match dashboard(state, req) {
        Ok(dash) => category_slice(dash, category).to_vec(),
        Err(resp) => return resp,
    };
    match state.nav.select_not_decided(category, students) {
        Ok(()) => ok(&req.id, state_json(state)),
        Err(e) => nav_err(req, e),
    }
}

fn handle_select_engagement(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = dashboard(state, req) {
        return resp;
    }
    let raw = match required_str(req, "cluster") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(selected) = Cluster::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "cluster must be one of: CONSISTENT, IMPROVING, DROPPING, LOW",
            Some(json!({ "cluster": raw })),
        );
    };
    // Re-derive the bucket from the engagement slice; selection carries the
    // same entries the engagement view showed.
    let students = state.nav.context().students.clone().unwrap_or_default();
    let domain = state.nav.context().domain.clone();
    let entries = cluster::aggregate(&students, domain.as_deref())
        .bucket(selected)
        .to_vec();
    match state.nav.select_engagement(selected, entries) {
        Ok(()) => ok(&req.id, state_json(state)),
        Err(e) => nav_err(req, e),
    }
}

fn handle_back(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = dashboard(state, req) {
        return resp;
    }
    // At ROOT there is no parent; the call is tolerated as a no-op.
    let _ = state.nav.back();
    ok(&req.id, state_json(state))
}

fn handle_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let nav = &state.nav;
    let ctx = nav.context();
    let view = match nav.level() {
        Level::Root => json!({
            "tiles": [
                {
                    "key": "GOAL_SET",
                    "title": "Goal Set",
                    "description": "Domains chosen by students",
                    "count": dash.payload.goal_set_count(),
                },
                {
                    "key": "GOAL_NOT_SET",
                    "title": "Goal Not Set",
                    "description": "Recommendations and undecided clusters",
                    "count": dash.payload.goal_not_set_count(),
                },
            ],
        }),
        Level::GoalSetDomains => json!({
            "domains": dash
                .payload
                .goal_set
                .iter()
                .map(|(domain, students)| json!({ "domain": domain, "count": students.len() }))
                .collect::<Vec<_>>(),
        }),
        Level::GoalNotSetDomains => json!({
            "likelihoodDomains": dash
                .payload
                .goal_not_set
                .likelihood_domains
                .iter()
                .map(|(domain, students)| json!({ "domain": domain, "count": students.len() }))
                .collect::<Vec<_>>(),
            "notDecided": { "count": dash.payload.not_decided_count() },
        }),
        Level::NotDecidedChildren => json!({
            "categories": NotDecidedCategory::ALL
                .iter()
                .map(|c| json!({
                    "category": c.label(),
                    "count": category_slice(dash, *c).len(),
                }))
                .collect::<Vec<_>>(),
        }),
        Level::Engagement => {
            let students = ctx.students.as_deref().unwrap_or(&[]);
            let map = cluster::aggregate(students, ctx.domain.as_deref());
            json!({
                "domain": ctx.domain,
                "clusters": Cluster::ALL
                    .iter()
                    .map(|c| json!({
                        "cluster": c.as_str(),
                        "count": map.bucket(*c).len(),
                    }))
                    .collect::<Vec<_>>(),
            })
        }
        Level::Students => json!({
            "cluster": ctx.cluster.map(|c| c.as_str()),
            "domain": ctx.domain,
            "roster": ctx.cluster_students.as_deref().unwrap_or(&[]),
        }),
    };
    let mut result = view;
    result["level"] = json!(nav.level().as_str());
    ok(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "nav.state" => Some(handle_state(state, req)),
        "nav.view" => Some(handle_view(state, req)),
        "nav.selectRoot" => Some(handle_select_root(state, req)),
        "nav.selectDomain" => Some(handle_select_domain(state, req)),
        "nav.selectNotDecidedParent" => Some(handle_select_not_decided_parent(state, req)),
        "nav.selectNotDecided" => Some(handle_select_not_decided(state, req)),
        "nav.selectEngagement" => Some(handle_select_engagement(state, req)),
        "nav.back" => Some(handle_back(state, req)),
        _ => None,
    }
}

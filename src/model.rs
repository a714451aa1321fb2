use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PredictedDomain {
    pub domain: String,
    #[serde(default)]
    pub likelihood_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FocusSkill {
    pub skill: String,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub proficiency_pct: Option<f64>,
}

/// One aggregated-per-student row as delivered by the backend. Read-only to
/// this daemon; unknown cluster labels are kept as-is and filtered at
/// aggregation time.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StudentSummary {
    pub student_id: i64,
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub top_domain: Option<String>,
    #[serde(default)]
    pub overall_cluster: Option<String>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub predicted_domains: Vec<PredictedDomain>,
    #[serde(default)]
    pub focus_skills: Vec<FocusSkill>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NotDecided {
    #[serde(default)]
    pub confused: Vec<StudentSummary>,
    #[serde(default)]
    pub new: Vec<StudentSummary>,
    #[serde(default)]
    pub not_engaged: Vec<StudentSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct GoalNotSet {
    #[serde(default)]
    pub likelihood_domains: BTreeMap<String, Vec<StudentSummary>>,
    #[serde(default)]
    pub not_decided: NotDecided,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DashboardPayload {
    #[serde(default)]
    pub goal_set: BTreeMap<String, Vec<StudentSummary>>,
    #[serde(default)]
    pub goal_not_set: GoalNotSet,
}

impl DashboardPayload {
    pub fn goal_set_count(&self) -> usize {
        self.goal_set.values().map(Vec::len).sum()
    }

    pub fn not_decided_count(&self) -> usize {
        let nd = &self.goal_not_set.not_decided;
        nd.confused.len() + nd.new.len() + nd.not_engaged.len()
    }

    pub fn goal_not_set_count(&self) -> usize {
        self.not_decided_count()
            + self
                .goal_not_set
                .likelihood_domains
                .values()
                .map(Vec::len)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student(id: i64, name: &str) -> serde_json::Value {
        json!({ "student_id": id, "name": name })
    }

    #[test]
    fn missing_sub_objects_default_to_empty() {
        let payload: DashboardPayload = serde_json::from_value(json!({})).expect("parse");
        assert!(payload.goal_set.is_empty());
        assert!(payload.goal_not_set.likelihood_domains.is_empty());
        assert!(payload.goal_not_set.not_decided.new.is_empty());
        assert_eq!(payload.goal_set_count(), 0);
        assert_eq!(payload.goal_not_set_count(), 0);
    }

    #[test]
    fn optional_student_fields_default() {
        let s: StudentSummary =
            serde_json::from_value(student(7, "Priya")).expect("parse");
        assert_eq!(s.student_id, 7);
        assert!(s.overall_cluster.is_none());
        assert!(s.overall_score.is_none());
        assert!(s.predicted_domains.is_empty());
        assert!(s.focus_skills.is_empty());
    }

    #[test]
    fn counts_fold_over_all_groupings() {
        let payload: DashboardPayload = serde_json::from_value(json!({
            "goal_set": {
                "Data Science": [student(1, "A"), student(2, "B")],
                "Web Dev": [student(3, "C")]
            },
            "goal_not_set": {
                "likelihood_domains": { "AI": [student(4, "D"), student(5, "E")] },
                "not_decided": {
                    "confused": [student(6, "F")],
                    "new": [],
                    "not_engaged": [student(7, "G"), student(8, "H")]
                }
            }
        }))
        .expect("parse");

        assert_eq!(payload.goal_set_count(), 3);
        assert_eq!(payload.not_decided_count(), 3);
        assert_eq!(payload.goal_not_set_count(), 5);
    }
}

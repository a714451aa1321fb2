use serde_json::json;

use crate::cluster::{Cluster, ClusterEntry};
use crate::model::StudentSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Root,
    GoalSetDomains,
    GoalNotSetDomains,
    NotDecidedChildren,
    Engagement,
    Students,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Root => "ROOT",
            Level::GoalSetDomains => "GOAL_SET_DOMAINS",
            Level::GoalNotSetDomains => "GOAL_NOT_SET_DOMAINS",
            Level::NotDecidedChildren => "NOT_DECIDED_CHILDREN",
            Level::Engagement => "ENGAGEMENT",
            Level::Students => "STUDENTS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootBranch {
    GoalSet,
    GoalNotSet,
}

impl RootBranch {
    pub fn parse(raw: &str) -> Option<RootBranch> {
        match raw {
            "GOAL_SET" => Some(RootBranch::GoalSet),
            "GOAL_NOT_SET" => Some(RootBranch::GoalNotSet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    GoalSet,
    GoalNotSet,
    NotDecided,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::GoalSet => "GOAL_SET",
            Scope::GoalNotSet => "GOAL_NOT_SET",
            Scope::NotDecided => "NOT_DECIDED",
        }
    }

    pub fn parse(raw: &str) -> Option<Scope> {
        match raw {
            "GOAL_SET" => Some(Scope::GoalSet),
            "GOAL_NOT_SET" => Some(Scope::GoalNotSet),
            "NOT_DECIDED" => Some(Scope::NotDecided),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotDecidedCategory {
    Confused,
    New,
    NotEngaged,
}

impl NotDecidedCategory {
    pub const ALL: [NotDecidedCategory; 3] = [
        NotDecidedCategory::Confused,
        NotDecidedCategory::New,
        NotDecidedCategory::NotEngaged,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NotDecidedCategory::Confused => "Confused",
            NotDecidedCategory::New => "New",
            NotDecidedCategory::NotEngaged => "Not Engaged",
        }
    }

    pub fn parse(raw: &str) -> Option<NotDecidedCategory> {
        match raw {
            "Confused" => Some(NotDecidedCategory::Confused),
            "New" => Some(NotDecidedCategory::New),
            "Not Engaged" => Some(NotDecidedCategory::NotEngaged),
            _ => None,
        }
    }
}

/// Cluster label on a terminal roster. Brand-new students have no engagement
/// history to cluster by, so they form their own pseudo-cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterCluster {
    Known(Cluster),
    New,
}

impl RosterCluster {
    pub fn as_str(self) -> &'static str {
        match self {
            RosterCluster::Known(c) => c.as_str(),
            RosterCluster::New => "NEW",
        }
    }
}

/// Open context record for the current level. Fields absent from the current
/// view are `None`; the render layer only ever sees the serialized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavContext {
    pub scope: Option<Scope>,
    pub domain: Option<String>,
    pub students: Option<Vec<StudentSummary>>,
    pub cluster: Option<RosterCluster>,
    pub cluster_students: Option<Vec<ClusterEntry>>,
}

impl NavContext {
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.scope.is_none()
            && self.domain.is_none()
            && self.students.is_none()
            && self.cluster.is_none()
            && self.cluster_students.is_none()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut out = serde_json::Map::new();
        if let Some(scope) = self.scope {
            out.insert("scope".to_string(), json!(scope.as_str()));
        }
        if let Some(domain) = &self.domain {
            out.insert("domain".to_string(), json!(domain));
        }
        if let Some(students) = &self.students {
            out.insert("students".to_string(), json!(students));
        }
        if let Some(cluster) = self.cluster {
            out.insert("cluster".to_string(), json!(cluster.as_str()));
        }
        if let Some(roster) = &self.cluster_students {
            out.insert("clusterStudents".to_string(), json!(roster));
        }
        serde_json::Value::Object(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavError {
    pub code: String,
    pub message: String,
}

impl NavError {
    fn bad_state(op: &str, level: Level) -> NavError {
        NavError {
            code: "bad_state".to_string(),
            message: format!("{} is not valid at level {}", op, level.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
struct Frame {
    level: Level,
    context: NavContext,
}

/// The drill-down state machine. Forward transitions push the current
/// (level, context) frame; `back` pops, so back always lands on the exact
/// parent a forward transition came from.
#[derive(Debug)]
pub struct Navigator {
    level: Level,
    context: NavContext,
    stack: Vec<Frame>,
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator::new()
    }
}

impl Navigator {
    pub fn new() -> Navigator {
        Navigator {
            level: Level::Root,
            context: NavContext::default(),
            stack: Vec::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn context(&self) -> &NavContext {
        &self.context
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn push_and_enter(&mut self, level: Level, context: NavContext) {
        self.stack.push(Frame {
            level: self.level,
            context: std::mem::take(&mut self.context),
        });
        self.level = level;
        self.context = context;
    }

    pub fn select_root(&mut self, branch: RootBranch) -> Result<(), NavError> {
        if self.level != Level::Root {
            return Err(NavError::bad_state("nav.selectRoot", self.level));
        }
        let next = match branch {
            RootBranch::GoalSet => Level::GoalSetDomains,
            RootBranch::GoalNotSet => Level::GoalNotSetDomains,
        };
        self.push_and_enter(next, NavContext::default());
        Ok(())
    }

    pub fn select_domain(
        &mut self,
        scope: Scope,
        domain: String,
        students: Vec<StudentSummary>,
    ) -> Result<(), NavError> {
        let valid = matches!(
            (self.level, scope),
            (Level::GoalSetDomains, Scope::GoalSet)
                | (Level::GoalNotSetDomains, Scope::GoalNotSet)
        );
        if !valid {
            return Err(NavError::bad_state("nav.selectDomain", self.level));
        }
        self.push_and_enter(
            Level::Engagement,
            NavContext {
                scope: Some(scope),
                domain: Some(domain),
                students: Some(students),
                ..NavContext::default()
            },
        );
        Ok(())
    }

    pub fn select_not_decided_parent(&mut self) -> Result<(), NavError> {
        if self.level != Level::GoalNotSetDomains {
            return Err(NavError::bad_state("nav.selectNotDecidedParent", self.level));
        }
        self.push_and_enter(Level::NotDecidedChildren, NavContext::default());
        Ok(())
    }

    pub fn select_not_decided(
        &mut self,
        category: NotDecidedCategory,
        students: Vec<StudentSummary>,
    ) -> Result<(), NavError> {
        if self.level != Level::NotDecidedChildren {
            return Err(NavError::bad_state("nav.selectNotDecided", self.level));
        }
        if category == NotDecidedCategory::New {
            // No engagement history to cluster by; go straight to the roster.
            let roster = students.iter().map(ClusterEntry::from_unclustered).collect();
            self.push_and_enter(
                Level::Students,
                NavContext {
                    scope: Some(Scope::NotDecided),
                    domain: Some(category.label().to_string()),
                    cluster: Some(RosterCluster::New),
                    cluster_students: Some(roster),
                    ..NavContext::default()
                },
            );
            return Ok(());
        }
        self.push_and_enter(
            Level::Engagement,
            NavContext {
                scope: Some(Scope::NotDecided),
                domain: Some(category.label().to_string()),
                students: Some(students),
                ..NavContext::default()
            },
        );
        Ok(())
    }

    pub fn select_engagement(
        &mut self,
        cluster: Cluster,
        entries: Vec<ClusterEntry>,
    ) -> Result<(), NavError> {
        if self.level != Level::Engagement {
            return Err(NavError::bad_state("nav.selectEngagement", self.level));
        }
        // Merge: keep scope/domain/students from the engagement view.
        let mut next = self.context.clone();
        next.cluster = Some(RosterCluster::Known(cluster));
        next.cluster_students = Some(entries);
        self.push_and_enter(Level::Students, next);
        Ok(())
    }

    /// Pops the parent frame. At ROOT there is nothing to pop; the call is a
    /// no-op and returns false.
    pub fn back(&mut self) -> bool {
        match self.stack.pop() {
            Some(frame) => {
                self.level = frame.level;
                self.context = frame.context;
                true
            }
            None => false,
        }
    }
}

use serde::Serialize;

use crate::model::StudentSummary;

/// The four known engagement clusters. Anything else on a student row is
/// dropped at aggregation time, not errored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Consistent,
    Improving,
    Dropping,
    Low,
}

impl Cluster {
    pub const ALL: [Cluster; 4] = [
        Cluster::Consistent,
        Cluster::Improving,
        Cluster::Dropping,
        Cluster::Low,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Cluster::Consistent => "CONSISTENT",
            Cluster::Improving => "IMPROVING",
            Cluster::Dropping => "DROPPING",
            Cluster::Low => "LOW",
        }
    }

    pub fn parse(label: &str) -> Option<Cluster> {
        match label {
            "CONSISTENT" => Some(Cluster::Consistent),
            "IMPROVING" => Some(Cluster::Improving),
            "DROPPING" => Some(Cluster::Dropping),
            "LOW" => Some(Cluster::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterEntry {
    pub student_id: i64,
    pub name: String,
    pub domain: Option<String>,
    pub confidence: Option<f64>,
}

impl ClusterEntry {
    /// Roster row for students that never went through clustering (the "New"
    /// category). No domain, confidence verbatim from the row.
    pub fn from_unclustered(s: &StudentSummary) -> ClusterEntry {
        ClusterEntry {
            student_id: s.student_id,
            name: s.name.clone(),
            domain: None,
            confidence: s.overall_score,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterMap {
    #[serde(rename = "CONSISTENT")]
    pub consistent: Vec<ClusterEntry>,
    #[serde(rename = "IMPROVING")]
    pub improving: Vec<ClusterEntry>,
    #[serde(rename = "DROPPING")]
    pub dropping: Vec<ClusterEntry>,
    #[serde(rename = "LOW")]
    pub low: Vec<ClusterEntry>,
}

impl ClusterMap {
    pub fn bucket(&self, cluster: Cluster) -> &[ClusterEntry] {
        match cluster {
            Cluster::Consistent => &self.consistent,
            Cluster::Improving => &self.improving,
            Cluster::Dropping => &self.dropping,
            Cluster::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, cluster: Cluster) -> &mut Vec<ClusterEntry> {
        match cluster {
            Cluster::Consistent => &mut self.consistent,
            Cluster::Improving => &mut self.improving,
            Cluster::Dropping => &mut self.dropping,
            Cluster::Low => &mut self.low,
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.is_empty())
}

/// Groups a domain slice of students into the four engagement buckets.
/// Pure and order-preserving: entries land in input order, confidence is
/// copied verbatim (this function does not own validation of upstream
/// scores), and rows with an unknown or absent cluster label are omitted.
pub fn aggregate(students: &[StudentSummary], domain_label: Option<&str>) -> ClusterMap {
    let mut map = ClusterMap::default();
    for s in students {
        let Some(cluster) = s.overall_cluster.as_deref().and_then(Cluster::parse) else {
            continue;
        };
        let domain = non_empty(domain_label)
            .or_else(|| non_empty(s.top_domain.as_deref()))
            .or_else(|| non_empty(s.goal.as_deref()))
            .unwrap_or("Mixed");
        map.bucket_mut(cluster).push(ClusterEntry {
            student_id: s.student_id,
            name: s.name.clone(),
            domain: Some(domain.to_string()),
            confidence: s.overall_score,
        });
    }
    map
}

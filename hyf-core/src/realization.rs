use serde::{Deserialize, Serialize};

/// Marker distinguishing plain realizations from catchment areas.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealizationKind {
    #[default]
    General,
    /// The area connecting the inflow and outflow of the realized catchment
    CatchmentArea,
}

/// Record naming a simulation or forcing configuration and the catchment
/// it pertains to.
///
/// The catchment is held by id rather than by reference so a realization
/// does not tie itself to the lifetime of a network node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realization {
    id: String,
    catchment_id: Option<String>,
    #[serde(default)]
    kind: RealizationKind,
}

impl Realization {
    pub fn new(id: impl Into<String>, catchment_id: Option<String>) -> Self {
        Realization {
            id: id.into(),
            catchment_id,
            kind: RealizationKind::General,
        }
    }

    pub fn catchment_area(id: impl Into<String>, catchment_id: Option<String>) -> Self {
        Realization {
            kind: RealizationKind::CatchmentArea,
            ..Realization::new(id, catchment_id)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catchment_id(&self) -> Option<&str> {
        self.catchment_id.as_deref()
    }

    pub fn kind(&self) -> RealizationKind {
        self.kind
    }

    pub fn is_catchment_area(&self) -> bool {
        self.kind == RealizationKind::CatchmentArea
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realization() {
        let realization = Realization::new("cat-test", None);
        assert_eq!(realization.id(), "cat-test");
        assert_eq!(realization.catchment_id(), None);
        assert!(!realization.is_catchment_area());
    }

    #[test]
    fn test_catchment_area_behaves_like_base() {
        let area = Realization::catchment_area("ca-1", Some("cat-1".to_string()));
        let base = Realization::new("ca-1", Some("cat-1".to_string()));
        assert_eq!(area.id(), "ca-1");
        assert_eq!(area.catchment_id(), Some("cat-1"));
        assert_eq!(area.id(), base.id());
        assert_eq!(area.catchment_id(), base.catchment_id());
        assert_eq!(area.kind(), RealizationKind::CatchmentArea);
    }
}

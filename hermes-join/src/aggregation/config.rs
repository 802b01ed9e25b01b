//! Join aggregation configuration

use serde::Deserialize;

use crate::Result;
use crate::structures::OrdinalSetKind;

/// Where the join aggregator sits in the aggregation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregatorNesting {
    /// No parent bucket aggregator: one instance for the whole query.
    #[default]
    TopLevel,
    /// Under another bucket aggregator: one instance per parent bucket.
    Nested,
}

impl AggregatorNesting {
    /// Ordinal set representation suited to this position.
    ///
    /// A single top-level instance pays O(max_ord) once; nested instances
    /// would pay it per parent bucket, so they hash.
    pub fn ordinal_set_kind(self) -> OrdinalSetKind {
        match self {
            AggregatorNesting::TopLevel => OrdinalSetKind::Dense,
            AggregatorNesting::Nested => OrdinalSetKind::Sparse,
        }
    }
}

/// Which side of the relation is collected and which is replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinDirection {
    /// `children` aggregation: parents matching the query, children replayed.
    #[default]
    ParentToChildren,
    /// `parent` aggregation: children matching the query, parents replayed.
    ChildrenToParent,
}

/// Configuration for one join aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    /// Aggregation name echoed in the result
    pub name: String,
    /// Position in the aggregation tree (selects dense vs sparse ordinal set)
    pub nesting: AggregatorNesting,
    /// Direction used by the `children`/`parent` constructors
    pub direction: JoinDirection,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            name: "join".to_string(),
            nesting: AggregatorNesting::TopLevel,
            direction: JoinDirection::ParentToChildren,
        }
    }
}

impl JoinConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn nested(mut self) -> Self {
        self.nesting = AggregatorNesting::Nested;
        self
    }

    pub fn with_nesting(mut self, nesting: AggregatorNesting) -> Self {
        self.nesting = nesting;
        self
    }

    pub fn with_direction(mut self, direction: JoinDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Parse from JSON, e.g. `{"name": "answers", "nesting": "nested"}`.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults() {
        let config = JoinConfig::default();
        assert_eq!(config.name, "join");
        assert_eq!(config.nesting, AggregatorNesting::TopLevel);
        assert_eq!(config.direction, JoinDirection::ParentToChildren);
    }

    #[test]
    fn test_nesting_selects_set_kind() {
        assert_eq!(
            AggregatorNesting::TopLevel.ordinal_set_kind(),
            OrdinalSetKind::Dense
        );
        assert_eq!(
            AggregatorNesting::Nested.ordinal_set_kind(),
            OrdinalSetKind::Sparse
        );
    }

    #[test]
    fn test_from_json() {
        let config =
            JoinConfig::from_json(r#"{"name": "to-answers", "nesting": "nested"}"#).unwrap();
        assert_eq!(config.name, "to-answers");
        assert_eq!(config.nesting, AggregatorNesting::Nested);
        assert_eq!(config.direction, JoinDirection::ParentToChildren);

        let config = JoinConfig::from_json(r#"{"direction": "children_to_parent"}"#).unwrap();
        assert_eq!(config.name, "join");
        assert_eq!(config.direction, JoinDirection::ChildrenToParent);
    }

    #[test]
    fn test_from_json_rejects_unknown_nesting() {
        let err = JoinConfig::from_json(r#"{"nesting": "sideways"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

//! Aggregation output

use serde::{Deserialize, Serialize};

/// Output of a single-bucket aggregator: how many docs fell into its bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleBucketResult {
    pub name: String,
    pub doc_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_flat_object() {
        let result = SingleBucketResult {
            name: "to-answers".to_string(),
            doc_count: 7,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"name": "to-answers", "doc_count": 7}));
    }
}

//! Vector store configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MetricType;
use crate::domain::DomainError;

/// Index construction method for the vector field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorAlgorithm {
    /// Hierarchical navigable small world graph (approximate)
    #[default]
    #[serde(alias = "HNSW")]
    Hnsw,
    /// Brute-force index (exact)
    #[serde(alias = "FLAT")]
    Flat,
}

impl VectorAlgorithm {
    pub fn redis_name(&self) -> &'static str {
        match self {
            VectorAlgorithm::Hnsw => "HNSW",
            VectorAlgorithm::Flat => "FLAT",
        }
    }
}

impl fmt::Display for VectorAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redis_name())
    }
}

impl FromStr for VectorAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hnsw" => Ok(VectorAlgorithm::Hnsw),
            "flat" => Ok(VectorAlgorithm::Flat),
            _ => Err(DomainError::configuration(format!(
                "Unknown vector algorithm: {}. Valid algorithms: hnsw, flat",
                s
            ))),
        }
    }
}

/// Configuration shared by every vector store backend
///
/// Immutable once a store has been built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Logical namespace (index name) for the store's documents
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Length every stored and queried vector must have
    pub vector_dimensionality: usize,

    #[serde(default)]
    pub vector_algorithm: VectorAlgorithm,

    #[serde(default)]
    pub metric_type: MetricType,

    /// Minimum normalized similarity (0.0 to 1.0) for a hit.
    /// 1.0 only accepts a near-exact match.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_index_name() -> String {
    "semantic-cache-index".to_string()
}

fn default_similarity_threshold() -> f64 {
    0.95
}

impl VectorStoreConfig {
    /// Create a config with defaults for everything but the dimensionality
    pub fn new(vector_dimensionality: usize) -> Self {
        Self {
            index_name: default_index_name(),
            vector_dimensionality,
            vector_algorithm: VectorAlgorithm::default(),
            metric_type: MetricType::default(),
            similarity_threshold: default_similarity_threshold(),
        }
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_vector_algorithm(mut self, algorithm: VectorAlgorithm) -> Self {
        self.vector_algorithm = algorithm;
        self
    }

    pub fn with_metric_type(mut self, metric_type: MetricType) -> Self {
        self.metric_type = metric_type;
        self
    }

    /// Set the similarity threshold, clamped to [0, 1]
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Reject configurations no store can operate with
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.index_name.trim().is_empty() {
            return Err(DomainError::configuration("index_name must not be empty"));
        }

        if self.vector_dimensionality == 0 {
            return Err(DomainError::configuration(
                "vector_dimensionality must be greater than zero",
            ));
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DomainError::configuration(format!(
                "similarity_threshold must be between 0 and 1, got {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }

    /// Fail fast when a vector does not match the configured dimensionality
    pub fn check_dimensions(&self, vector: &[f32]) -> Result<(), DomainError> {
        if vector.len() != self.vector_dimensionality {
            return Err(DomainError::dimension_mismatch(
                self.vector_dimensionality,
                vector.len(),
            ));
        }

        Ok(())
    }

    /// Whether a normalized similarity clears the threshold
    pub fn is_hit(&self, similarity: f64) -> bool {
        similarity >= self.similarity_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VectorStoreConfig::new(1536);

        assert_eq!(config.index_name, "semantic-cache-index");
        assert_eq!(config.vector_dimensionality, 1536);
        assert_eq!(config.vector_algorithm, VectorAlgorithm::Hnsw);
        assert_eq!(config.metric_type, MetricType::Cosine);
        assert!((config.similarity_threshold - 0.95).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = VectorStoreConfig::new(3)
            .with_index_name("test")
            .with_vector_algorithm(VectorAlgorithm::Flat)
            .with_metric_type(MetricType::L2)
            .with_similarity_threshold(0.99);

        assert_eq!(config.index_name, "test");
        assert_eq!(config.vector_algorithm, VectorAlgorithm::Flat);
        assert_eq!(config.metric_type, MetricType::L2);
        assert!((config.similarity_threshold - 0.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_similarity_threshold_clamped() {
        let config = VectorStoreConfig::new(3).with_similarity_threshold(1.5);
        assert_eq!(config.similarity_threshold, 1.0);

        let config = VectorStoreConfig::new(3).with_similarity_threshold(-0.5);
        assert_eq!(config.similarity_threshold, 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(VectorStoreConfig::new(0).validate().is_err());
        assert!(VectorStoreConfig::new(3).with_index_name(" ").validate().is_err());

        let mut config = VectorStoreConfig::new(3);
        config.similarity_threshold = 1.2;
        assert!(matches!(
            config.validate(),
            Err(DomainError::Configuration { .. })
        ));
    }

    #[test]
    fn test_check_dimensions() {
        let config = VectorStoreConfig::new(3);

        assert!(config.check_dimensions(&[1.0, 2.0, 3.0]).is_ok());
        assert!(matches!(
            config.check_dimensions(&[1.0, 2.0]),
            Err(DomainError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let config = VectorStoreConfig::new(3).with_similarity_threshold(0.99);

        assert!(config.is_hit(0.999));
        assert!(config.is_hit(0.99));
        assert!(!config.is_hit(0.1));
    }

    #[test]
    fn test_deserialize_requires_dimensionality() {
        let missing: Result<VectorStoreConfig, _> = serde_json::from_str("{}");
        assert!(missing.is_err());

        let config: VectorStoreConfig = serde_json::from_str(
            r#"{"vector_dimensionality": 384, "metric_type": "ip", "vector_algorithm": "FLAT"}"#,
        )
        .unwrap();
        assert_eq!(config.vector_dimensionality, 384);
        assert_eq!(config.metric_type, MetricType::InnerProduct);
        assert_eq!(config.vector_algorithm, VectorAlgorithm::Flat);
        assert_eq!(config.index_name, "semantic-cache-index");
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("HNSW".parse::<VectorAlgorithm>().unwrap(), VectorAlgorithm::Hnsw);
        assert!("ivf".parse::<VectorAlgorithm>().is_err());
    }
}

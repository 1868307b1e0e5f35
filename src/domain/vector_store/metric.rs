//! Distance metrics and their mapping onto a [0, 1] similarity

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::embedding::cosine_similarity;
use crate::domain::DomainError;

/// Distance metric the vector index is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricType {
    /// Cosine distance, `1 - cos(a, b)`, in [0, 2]
    #[default]
    #[serde(rename = "cosine", alias = "COSINE")]
    Cosine,
    /// Inner-product distance, `1 - a·b`
    #[serde(rename = "ip", alias = "IP", alias = "inner_product")]
    InnerProduct,
    /// Squared euclidean distance
    #[serde(rename = "l2", alias = "L2", alias = "euclidean")]
    L2,
}

impl MetricType {
    /// Name used in the engine's `DISTANCE_METRIC` attribute
    pub fn redis_name(&self) -> &'static str {
        match self {
            MetricType::Cosine => "COSINE",
            MetricType::InnerProduct => "IP",
            MetricType::L2 => "L2",
        }
    }

    /// Convert a raw distance score into a similarity in [0, 1]
    ///
    /// Cosine and inner-product distances share `(2 - d) / 2`; inner product
    /// only stays inside [0, 2] for unit-length embeddings, so the result is
    /// clamped. Squared euclidean distance is unbounded and maps through
    /// `1 / (1 + d)`.
    pub fn normalize(&self, raw_distance: f64) -> f64 {
        if raw_distance.is_nan() {
            return 0.0;
        }

        let similarity = match self {
            MetricType::Cosine | MetricType::InnerProduct => (2.0 - raw_distance) / 2.0,
            MetricType::L2 => 1.0 / (1.0 + raw_distance.max(0.0)),
        };

        similarity.clamp(0.0, 1.0)
    }

    /// Raw distance between two vectors, computed the way the engine scores them
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        match self {
            MetricType::Cosine => 1.0 - f64::from(cosine_similarity(a, b)),
            MetricType::InnerProduct => {
                let dot: f64 = a
                    .iter()
                    .zip(b.iter())
                    .map(|(x, y)| f64::from(*x) * f64::from(*y))
                    .sum();
                1.0 - dot
            }
            MetricType::L2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| {
                    let diff = f64::from(*x) - f64::from(*y);
                    diff * diff
                })
                .sum(),
        }
    }

    /// Similarity between two vectors under this metric
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        self.normalize(self.distance(a, b))
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redis_name())
    }
}

impl FromStr for MetricType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(MetricType::Cosine),
            "ip" | "inner_product" => Ok(MetricType::InnerProduct),
            "l2" | "euclidean" => Ok(MetricType::L2),
            _ => Err(DomainError::configuration(format!(
                "Unknown metric type: {}. Valid types: cosine, ip, l2",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_normalization_bounds() {
        assert_eq!(MetricType::Cosine.normalize(0.0), 1.0);
        assert_eq!(MetricType::Cosine.normalize(1.0), 0.5);
        assert_eq!(MetricType::Cosine.normalize(2.0), 0.0);
    }

    #[test]
    fn test_cosine_normalization_near_duplicate() {
        let similarity = MetricType::Cosine.normalize(0.002);

        assert!(similarity >= 0.99);
    }

    #[test]
    fn test_inner_product_clamped() {
        assert_eq!(MetricType::InnerProduct.normalize(-3.0), 1.0);
        assert_eq!(MetricType::InnerProduct.normalize(5.0), 0.0);
    }

    #[test]
    fn test_l2_normalization() {
        assert_eq!(MetricType::L2.normalize(0.0), 1.0);
        assert_eq!(MetricType::L2.normalize(1.0), 0.5);
        assert!(MetricType::L2.normalize(1_000_000.0) < 0.001);
    }

    #[test]
    fn test_nan_score_is_never_a_hit() {
        assert_eq!(MetricType::Cosine.normalize(f64::NAN), 0.0);
        assert_eq!(MetricType::L2.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_distances() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];

        assert!((MetricType::Cosine.distance(&a, &b) - 1.0).abs() < 1e-6);
        assert!((MetricType::InnerProduct.distance(&a, &a) - 0.0).abs() < 1e-6);
        assert!((MetricType::L2.distance(&a, &b) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_identical_vectors_are_fully_similar() {
        let v = [0.6, 0.8];

        for metric in [MetricType::Cosine, MetricType::InnerProduct, MetricType::L2] {
            assert!((metric.similarity(&v, &v) - 1.0).abs() < 1e-6, "{metric}");
        }
    }

    #[test]
    fn test_from_str_and_display() {
        assert_eq!("COSINE".parse::<MetricType>().unwrap(), MetricType::Cosine);
        assert_eq!("ip".parse::<MetricType>().unwrap(), MetricType::InnerProduct);
        assert_eq!("euclidean".parse::<MetricType>().unwrap(), MetricType::L2);
        assert!("manhattan".parse::<MetricType>().is_err());
        assert_eq!(MetricType::InnerProduct.to_string(), "IP");
    }

    #[test]
    fn test_serde_names() {
        let metric: MetricType = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(metric, MetricType::L2);
        assert_eq!(serde_json::to_string(&MetricType::Cosine).unwrap(), "\"cosine\"");
    }
}

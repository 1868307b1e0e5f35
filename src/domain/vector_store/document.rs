//! The unit stored in and returned by a vector store

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// An embedding together with the text it was produced from and the cached value
///
/// Equality compares vectors element by element on the exact bit pattern of
/// each `f32`, so `NaN == NaN` and `0.0 != -0.0`. That keeps `Eq` and `Hash`
/// consistent with each other; it is not a tolerance-based float comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDocument {
    vector: Vec<f32>,
    key: String,
    value: String,
}

impl VectorDocument {
    pub fn new(vector: Vec<f32>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            vector,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    /// The text the vector was embedded from
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    /// Consume the document, keeping only the cached value
    pub fn into_value(self) -> String {
        self.value
    }
}

impl PartialEq for VectorDocument {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.value == other.value
            && self.vector.len() == other.vector.len()
            && self
                .vector
                .iter()
                .zip(other.vector.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for VectorDocument {}

impl Hash for VectorDocument {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.value.hash(state);
        self.vector.len().hash(state);
        for element in &self.vector {
            element.to_bits().hash(state);
        }
    }
}

//! Embedding results

/// Vector produced for the input at `index`
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    index: usize,
    vector: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, vector: Vec<f32>) -> Self {
        Self { index, vector }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }
}

/// Cosine of the angle between two vectors
///
/// Empty, zero-norm and length-mismatched inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Embeddings returned for one request, ordered by input index
#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    model: String,
    embeddings: Vec<Embedding>,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, embeddings: Vec<Embedding>) -> Self {
        Self {
            model: model.into(),
            embeddings,
        }
    }

    /// Model that actually served the request
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn embeddings(&self) -> &[Embedding] {
        &self.embeddings
    }

    /// Vector of the first input, the only one for single-text requests
    pub fn into_first_vector(self) -> Option<Vec<f32>> {
        self.embeddings.into_iter().next().map(|e| e.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = [1.0, 0.0, 0.0];

        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_and_opposite() {
        let a = [1.0, 0.0, 0.0];

        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.0001);
        assert!((cosine_similarity(&a, &[-1.0, 0.0, 0.0]) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_scale_invariant() {
        let a = [150.3, 240.7, 450.2];
        let b = [1503.0, 2407.0, 4502.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_into_first_vector() {
        let response = EmbeddingResponse::new(
            "all-minilm",
            vec![Embedding::new(0, vec![0.1, 0.2]), Embedding::new(1, vec![0.3, 0.4])],
        );

        assert_eq!(response.model(), "all-minilm");
        assert_eq!(response.embeddings()[1].index(), 1);
        assert_eq!(response.into_first_vector(), Some(vec![0.1, 0.2]));
        assert_eq!(EmbeddingResponse::new("m", vec![]).into_first_vector(), None);
    }
}

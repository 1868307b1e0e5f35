//! RediSearch index layout for vector documents

use crate::domain::vector_store::{MetricType, VectorAlgorithm, VectorStoreConfig};

/// Prefix shared by every document key; the index only covers these keys
pub const KEY_PREFIX: &str = "embedding:";
pub const VECTOR_FIELD: &str = "vector";
pub const KEY_FIELD: &str = "key";
pub const VALUE_FIELD: &str = "value";
pub const SCORE_FIELD: &str = "vector_score";
pub const QUERY_DIALECT: u32 = 2;

const JSON_PATH_PREFIX: &str = "$.";
const VECTOR_TYPE: &str = "FLOAT32";
const INITIAL_CAP: usize = 5;

/// Index definition over JSON documents stored under [`KEY_PREFIX`]
#[derive(Debug, Clone, PartialEq)]
pub struct RedisSchema {
    index_name: String,
    vector_dimensionality: usize,
    metric_type: MetricType,
    vector_algorithm: VectorAlgorithm,
}

impl RedisSchema {
    pub fn new(config: &VectorStoreConfig) -> Self {
        Self {
            index_name: config.index_name.clone(),
            vector_dimensionality: config.vector_dimensionality,
            metric_type: config.metric_type,
            vector_algorithm: config.vector_algorithm,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Arguments following `FT.CREATE`
    pub fn create_index_args(&self) -> Vec<String> {
        let vector_attributes = [
            ("TYPE", VECTOR_TYPE.to_string()),
            ("DIM", self.vector_dimensionality.to_string()),
            ("DISTANCE_METRIC", self.metric_type.redis_name().to_string()),
            ("INITIAL_CAP", INITIAL_CAP.to_string()),
        ];

        let mut args = vec![
            self.index_name.clone(),
            "ON".to_string(),
            "JSON".to_string(),
            "PREFIX".to_string(),
            "1".to_string(),
            KEY_PREFIX.to_string(),
            "SCHEMA".to_string(),
        ];

        for text_field in [VALUE_FIELD, KEY_FIELD] {
            args.extend([
                format!("{}{}", JSON_PATH_PREFIX, text_field),
                "AS".to_string(),
                text_field.to_string(),
                "TEXT".to_string(),
                "WEIGHT".to_string(),
                "1.0".to_string(),
            ]);
        }

        args.extend([
            format!("{}{}", JSON_PATH_PREFIX, VECTOR_FIELD),
            "AS".to_string(),
            VECTOR_FIELD.to_string(),
            "VECTOR".to_string(),
            self.vector_algorithm.redis_name().to_string(),
            (vector_attributes.len() * 2).to_string(),
        ]);

        for (name, value) in vector_attributes {
            args.push(name.to_string());
            args.push(value);
        }

        args
    }

    /// Top-1 KNN query over the vector field, with the query vector bound to `$BLOB`
    pub fn knn_query(&self) -> String {
        format!("*=>[ KNN 1 @{} $BLOB AS {} ]", VECTOR_FIELD, SCORE_FIELD)
    }

    /// Fields requested back from a search
    pub fn return_fields(&self) -> [&'static str; 4] {
        [VECTOR_FIELD, KEY_FIELD, VALUE_FIELD, SCORE_FIELD]
    }

    /// Storage key for a freshly generated document id
    pub fn document_key(&self, id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }
}

/// Serialize a query vector the way the engine expects `FLOAT32` blobs
pub fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

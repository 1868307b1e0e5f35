//! Redis Stack vector store implementation
//!
//! Documents are stored as RedisJSON records under [`KEY_PREFIX`] and found
//! through a RediSearch vector index created on first connect.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError, Value};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::schema::{
    vector_to_blob, RedisSchema, KEY_FIELD, KEY_PREFIX, QUERY_DIALECT, SCORE_FIELD, VALUE_FIELD,
    VECTOR_FIELD,
};
use crate::domain::DomainError;
use crate::domain::vector_store::{expiry_secs, VectorDocument, VectorStore, VectorStoreConfig};

/// Produces the id part of a document's storage key
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

/// Where and how to reach the Redis Stack server
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

impl Default for RedisConnectionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: None,
            password: None,
        }
    }
}

impl RedisConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Authenticate with ACL user and password
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                username: self.user.clone(),
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

/// Outcome of the index bootstrap on connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    /// The index was created by this store
    Created,
    /// The index was already listed, or another instance created it concurrently
    AlreadyExists,
}

/// Vector store backed by RedisJSON + RediSearch
///
/// Features:
/// - Index bootstrap on connect, tolerant of concurrent creation
/// - Fresh UUID storage key per document, so near-duplicate keys coexist
/// - Write and expiration applied in one MULTI/EXEC transaction
/// - Expired-stub and threshold filtering of KNN results
/// - Connection multiplexing via ConnectionManager
#[derive(Clone)]
pub struct RedisVectorStore {
    connection: ConnectionManager,
    schema: RedisSchema,
    config: VectorStoreConfig,
    id_generator: IdGenerator,
}

impl fmt::Debug for RedisVectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisVectorStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisVectorStore {
    /// Connect and make sure the index exists
    ///
    /// The store is only handed out once its index is in place; an index that
    /// cannot be created is a construction failure.
    pub async fn connect(
        connection: &RedisConnectionConfig,
        config: VectorStoreConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        let client = Client::open(connection.connection_info())
            .map_err(|e| connection_error("create Redis client", e))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| connection_error("connect to Redis", e))?;

        let store = Self {
            connection: manager,
            schema: RedisSchema::new(&config),
            config,
            id_generator: Arc::new(|| Uuid::new_v4().to_string()),
        };

        let status = store.ensure_index().await?;
        info!(
            index = store.schema.index_name(),
            ?status,
            dimensionality = store.config.vector_dimensionality,
            metric = %store.config.metric_type,
            "Redis vector store ready"
        );

        Ok(store)
    }

    /// Replace the UUID generator used for storage keys
    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn config(&self) -> &VectorStoreConfig {
        &self.config
    }

    /// Create the index unless the engine already lists it
    pub async fn ensure_index(&self) -> Result<IndexStatus, DomainError> {
        let mut conn = self.connection.clone();
        let index_name = self.schema.index_name();

        let indexes: Vec<String> = redis::cmd("FT._LIST")
            .query_async(&mut conn)
            .await
            .map_err(|e| connection_error("list indexes", e))?;

        if indexes.iter().any(|name| name == index_name) {
            debug!(index = index_name, "Index already exists");
            return Ok(IndexStatus::AlreadyExists);
        }

        let reply: Result<Value, RedisError> = redis::cmd("FT.CREATE")
            .arg(self.schema.create_index_args())
            .query_async(&mut conn)
            .await;

        let status = interpret_create_reply(index_name, reply)?;
        if status == IndexStatus::Created {
            info!(index = index_name, prefix = KEY_PREFIX, "Created vector index");
        }

        Ok(status)
    }

    fn next_key(&self) -> String {
        self.schema.document_key(&(self.id_generator)())
    }

    fn serialize(document: &VectorDocument) -> Result<String, DomainError> {
        serde_json::to_string(document)
            .map_err(|e| DomainError::internal(format!("Failed to serialize document: {}", e)))
    }
}

#[async_trait]
impl VectorStore for RedisVectorStore {
    async fn save(&self, document: VectorDocument) -> Result<(), DomainError> {
        self.config.check_dimensions(document.vector())?;

        let key = self.next_key();
        let json = Self::serialize(&document)?;
        let mut conn = self.connection.clone();

        let _: () = redis::cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(json)
            .query_async(&mut conn)
            .await
            .map_err(|e| connection_error("save document", e))?;

        debug!(key = %key, "Saved document");
        Ok(())
    }

    async fn save_with_ttl(
        &self,
        document: VectorDocument,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.config.check_dimensions(document.vector())?;

        let key = self.next_key();
        let json = Self::serialize(&document)?;
        let ttl_secs = expiry_secs(ttl);
        let mut conn = self.connection.clone();

        let _: () = redis::pipe()
            .atomic()
            .cmd("JSON.SET")
            .arg(&key)
            .arg("$")
            .arg(json)
            .ignore()
            .cmd("EXPIRE")
            .arg(&key)
            .arg(ttl_secs)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| connection_error("save document with TTL", e))?;

        debug!(key = %key, ttl_secs, "Saved document with TTL");
        Ok(())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
    ) -> Result<Option<VectorDocument>, DomainError> {
        self.config.check_dimensions(vector)?;

        let mut conn = self.connection.clone();

        let reply: Value = redis::cmd("FT.SEARCH")
            .arg(self.schema.index_name())
            .arg(self.schema.knn_query())
            .arg("PARAMS")
            .arg(2)
            .arg("BLOB")
            .arg(vector_to_blob(vector))
            .arg("RETURN")
            .arg(4)
            .arg(&self.schema.return_fields()[..])
            .arg("SORTBY")
            .arg(SCORE_FIELD)
            .arg("ASC")
            .arg("DIALECT")
            .arg(QUERY_DIALECT)
            .query_async(&mut conn)
            .await
            .map_err(|e| connection_error("search index", e))?;

        let hits = parse_search_reply(&reply)?;
        select_match(&self.config, hits)
    }
}

fn connection_error(action: &str, error: RedisError) -> DomainError {
    DomainError::store_connection(format!("Failed to {}: {}", action, error))
}

fn is_ok_reply(value: &Value) -> bool {
    match value {
        Value::Okay => true,
        Value::SimpleString(s) => s.eq_ignore_ascii_case("OK"),
        _ => false,
    }
}

/// Map the `FT.CREATE` reply onto the bootstrap outcome
///
/// Losing a creation race to another instance is not an error; anything
/// else short of an OK acknowledgment is.
fn interpret_create_reply(
    index_name: &str,
    reply: Result<Value, RedisError>,
) -> Result<IndexStatus, DomainError> {
    match reply {
        Ok(value) if is_ok_reply(&value) => Ok(IndexStatus::Created),
        Ok(value) => Err(DomainError::index_creation(
            index_name,
            format!("unexpected reply {:?}", value),
        )),
        Err(e) if e.to_string().to_lowercase().contains("already exists") => {
            debug!(index = index_name, "Index was created concurrently");
            Ok(IndexStatus::AlreadyExists)
        }
        Err(e) if e.is_io_error() || e.is_connection_dropped() => {
            Err(connection_error("create index", e))
        }
        Err(e) => Err(DomainError::index_creation(index_name, e.to_string())),
    }
}

/// One document as returned by `FT.SEARCH`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchHit {
    id: String,
    fields: HashMap<String, String>,
}

impl SearchHit {
    pub(crate) fn new(id: impl Into<String>, fields: HashMap<String, String>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Expired documents can linger in results as a bare id; only a hit that
    /// still carries its vector is live
    fn is_live(&self) -> bool {
        self.fields.contains_key(VECTOR_FIELD)
    }

    fn score(&self) -> Result<f64, DomainError> {
        let raw = self.field(SCORE_FIELD)?;

        raw.parse::<f64>().map_err(|e| {
            DomainError::internal(format!("Invalid {} '{}' for {}: {}", SCORE_FIELD, raw, self.id, e))
        })
    }

    fn field(&self, name: &str) -> Result<&str, DomainError> {
        self.fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| DomainError::internal(format!("Search hit {} has no '{}' field", self.id, name)))
    }

    fn into_document(self) -> Result<VectorDocument, DomainError> {
        let vector: Vec<f32> = serde_json::from_str(self.field(VECTOR_FIELD)?).map_err(|e| {
            DomainError::internal(format!("Invalid vector for {}: {}", self.id, e))
        })?;

        Ok(VectorDocument::new(
            vector,
            self.field(KEY_FIELD)?,
            self.field(VALUE_FIELD)?,
        ))
    }
}

/// Apply the expiry filter, then the threshold filter, and keep the first survivor
pub(crate) fn select_match(
    config: &VectorStoreConfig,
    hits: Vec<SearchHit>,
) -> Result<Option<VectorDocument>, DomainError> {
    for hit in hits {
        if !hit.is_live() {
            warn!(id = %hit.id, "Skipping expired document returned by search");
            continue;
        }

        let raw_score = hit.score()?;
        let similarity = config.metric_type.normalize(raw_score);

        if !config.is_hit(similarity) {
            debug!(
                id = %hit.id,
                similarity,
                threshold = config.similarity_threshold,
                "Nearest document below similarity threshold"
            );
            continue;
        }

        debug!(id = %hit.id, similarity, "Similarity search hit");
        return hit.into_document().map(Some);
    }

    Ok(None)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::SimpleString(s) => Some(s.clone()),
        Value::VerbatimString { text, .. } => Some(text.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Double(d) => Some(d.to_string()),
        Value::Okay => Some("OK".to_string()),
        _ => None,
    }
}

fn parse_field_pairs(items: &[Value]) -> HashMap<String, String> {
    items
        .chunks_exact(2)
        .filter_map(|pair| Some((value_to_string(&pair[0])?, value_to_string(&pair[1])?)))
        .collect()
}

fn parse_field_map(entries: &[(Value, Value)]) -> HashMap<String, String> {
    entries
        .iter()
        .filter_map(|(k, v)| Some((value_to_string(k)?, value_to_string(v)?)))
        .collect()
}

/// Decode an `FT.SEARCH` reply into hits, in the order the engine returned them
///
/// RESP2 replies are `[total, id, [field, value, ...], id, ...]`; a document
/// without attributes may be followed by nil or by the next id. RESP3
/// replies are a map whose `results` entry lists `{id, extra_attributes}` maps.
pub(crate) fn parse_search_reply(reply: &Value) -> Result<Vec<SearchHit>, DomainError> {
    match reply {
        Value::Array(items) => parse_resp2_reply(items),
        Value::Map(entries) => parse_resp3_reply(entries),
        other => Err(DomainError::internal(format!(
            "Unexpected search reply: {:?}",
            other
        ))),
    }
}

fn parse_resp2_reply(items: &[Value]) -> Result<Vec<SearchHit>, DomainError> {
    let mut hits = Vec::new();
    let mut rest = items.iter().skip(1).peekable();

    while let Some(id_value) = rest.next() {
        let id = value_to_string(id_value).ok_or_else(|| {
            DomainError::internal(format!("Unexpected document id in search reply: {:?}", id_value))
        })?;

        let fields = match rest.peek() {
            Some(Value::Array(pairs)) => {
                let fields = parse_field_pairs(pairs);
                rest.next();
                fields
            }
            Some(Value::Nil) => {
                rest.next();
                HashMap::new()
            }
            _ => HashMap::new(),
        };

        hits.push(SearchHit::new(id, fields));
    }

    Ok(hits)
}

fn parse_resp3_reply(entries: &[(Value, Value)]) -> Result<Vec<SearchHit>, DomainError> {
    let results = entries
        .iter()
        .find(|(k, _)| value_to_string(k).as_deref() == Some("results"))
        .map(|(_, v)| v);

    let Some(Value::Array(results)) = results else {
        return Ok(Vec::new());
    };

    results
        .iter()
        .map(|result| {
            let Value::Map(doc) = result else {
                return Err(DomainError::internal(format!(
                    "Unexpected search result entry: {:?}",
                    result
                )));
            };

            let mut id = None;
            let mut fields = HashMap::new();

            for (k, v) in doc {
                match value_to_string(k).as_deref() {
                    Some("id") => id = value_to_string(v),
                    Some("extra_attributes") => {
                        if let Value::Map(attributes) = v {
                            fields = parse_field_map(attributes);
                        }
                    }
                    _ => {}
                }
            }

            let id = id.ok_or_else(|| DomainError::internal("Search result entry without id"))?;
            Ok(SearchHit::new(id, fields))
        })
        .collect()
}

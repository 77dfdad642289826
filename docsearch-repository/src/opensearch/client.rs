//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesRefreshParts},
    GetParts, IndexParts, OpenSearch, SearchParts, UpdateByQueryParts, UpdateParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::ConnectionConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::opensearch::index_config::build_index_body;
use crate::opensearch::queries::{
    build_point_update_body, build_search_body, build_update_by_query_body,
};
use crate::types::{
    PointUpdate, ScriptedUpdate, SearchHit, SearchRequest, SearchResponse, UpdateByQueryResult,
    UpdateResult, WriteAck, WriteResult,
};
use docsearch_shared::IndexSchema;

/// OpenSearch client implementation.
///
/// Holds a single connection handle. It is never mutated after construction, so one
/// instance can be shared behind an `Arc` by every component.
///
/// # Example
///
/// ```ignore
/// use docsearch_repository::{ConnectionConfig, OpenSearchClient, Query, SearchRequest};
///
/// let config = ConnectionConfig::new("http://localhost:9200");
/// let client = OpenSearchClient::new(&config).await?;
///
/// let request = SearchRequest::new("files", Query::phrase("title", "site plan"));
/// let response = client.search(&request).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError::EngineUnavailable)` - If the URL is invalid or transport setup fails
    pub async fn new(config: &ConnectionConfig) -> Result<Self, SearchError> {
        let parsed_url = Url::parse(&config.url).map_err(|e| {
            SearchError::unavailable(format!("Invalid engine URL {}: {}", config.url, e))
        })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.timeout());

        if let Some((username, password)) = config.credentials() {
            builder = builder.auth(Credentials::Basic(
                username.to_string(),
                password.to_string(),
            ));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchError::unavailable(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            authenticated = config.credentials().is_some(),
            "Created OpenSearch client"
        );

        Ok(Self { client })
    }

    /// Turn a non-success response into an error.
    ///
    /// Server-side failures and throttling mean the engine is unavailable; any other
    /// status is a rejection of the request, reported through `rejected`.
    async fn failure(
        response: Response,
        action: &str,
        rejected: fn(String) -> SearchError,
    ) -> SearchError {
        let status = response.status_code();
        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, action, "Request failed");

        let message = format!("{} failed with status {}: {}", action, status, error_body);
        if status.is_server_error() || status.as_u16() == 429 {
            SearchError::EngineUnavailable(message)
        } else {
            rejected(message)
        }
    }

    async fn read_json(response: Response) -> Result<Value, SearchError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))
    }

    fn transport_error(e: opensearch::Error) -> SearchError {
        SearchError::unavailable(e.to_string())
    }

    /// Parse the acknowledgment of an index request.
    pub(crate) fn parse_write_ack(body: &Value) -> Result<WriteAck, SearchError> {
        let id = body
            .get("_id")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchError::parse("index response has no _id"))?;

        let result = match body.get("result").and_then(Value::as_str) {
            Some("created") => WriteResult::Created,
            Some("updated") => WriteResult::Updated,
            other => {
                return Err(SearchError::parse(format!(
                    "unexpected index result: {:?}",
                    other
                )))
            }
        };

        Ok(WriteAck {
            id: id.to_string(),
            result,
            version: body.get("_version").and_then(Value::as_i64).unwrap_or(0),
        })
    }

    /// Parse a single search hit. Hits without an `_id` or `_source` are skipped.
    pub(crate) fn parse_hit(hit: &Value) -> Option<SearchHit<Value>> {
        let id = hit.get("_id")?.as_str()?.to_string();
        let document = hit.get("_source")?.clone();
        // `_score` is null when sorting by something other than relevance
        let score = hit.get("_score").and_then(Value::as_f64).unwrap_or(0.0);

        Some(SearchHit {
            id,
            score,
            document,
        })
    }

    pub(crate) fn parse_search_response(body: &Value) -> Result<SearchResponse<Value>, SearchError> {
        let hits_array = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(Value::as_array)
            .ok_or_else(|| SearchError::parse("search response has no hits array"))?;

        let hits: Vec<SearchHit<Value>> = hits_array.iter().filter_map(Self::parse_hit).collect();

        // `hits.total` is an object on current engines and a bare number on old ones
        let total = body
            .get("hits")
            .and_then(|h| h.get("total"))
            .and_then(|t| t.get("value").and_then(Value::as_u64).or_else(|| t.as_u64()))
            .unwrap_or(hits.len() as u64);

        Ok(SearchResponse { total, hits })
    }

    pub(crate) fn parse_update_result(body: &Value) -> Result<UpdateResult, SearchError> {
        match body.get("result").and_then(Value::as_str) {
            Some("updated") => Ok(UpdateResult::Updated),
            Some("noop") => Ok(UpdateResult::Noop),
            other => Err(SearchError::parse(format!(
                "unexpected update result: {:?}",
                other
            ))),
        }
    }

    pub(crate) fn parse_update_by_query(body: &Value) -> Result<UpdateByQueryResult, SearchError> {
        if let Some(failures) = body.get("failures").and_then(Value::as_array) {
            if !failures.is_empty() {
                return Err(SearchError::write_rejected(format!(
                    "update by query reported {} failure(s): {}",
                    failures.len(),
                    Value::Array(failures.clone())
                )));
            }
        }

        let count = |key: &str| body.get(key).and_then(Value::as_u64).unwrap_or(0);

        Ok(UpdateByQueryResult {
            total: count("total"),
            updated: count("updated"),
            noops: count("noops"),
        })
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self, schema))]
    async fn create_index(&self, index: &str, schema: &IndexSchema) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(build_index_body(schema))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(response, "Create index", SearchError::SchemaRejected).await);
        }

        info!(index = %index, fields = schema.fields.len(), "Index created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if status.as_u16() == 404 {
            debug!(index = %index, "Index did not exist");
            return Ok(false);
        }
        if !status.is_success() {
            return Err(Self::failure(response, "Delete index", SearchError::SchemaRejected).await);
        }

        info!(index = %index, "Index deleted");
        Ok(true)
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        match status.as_u16() {
            404 => Ok(false),
            _ if status.is_success() => Ok(true),
            _ => Err(Self::failure(response, "Index exists", SearchError::QueryRejected).await),
        }
    }

    async fn refresh_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::NotFound(format!("index={}", index)));
        }
        if !status.is_success() {
            return Err(Self::failure(response, "Refresh", SearchError::QueryRejected).await);
        }

        debug!(index = %index, "Index refreshed");
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> Result<WriteAck, SearchError> {
        let parts = match id {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self
            .client
            .index(parts)
            .body(document)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(response, "Index document", SearchError::WriteRejected).await);
        }

        let ack = Self::parse_write_ack(&Self::read_json(response).await?)?;
        debug!(index = %index, id = %ack.id, result = ?ack.result, "Document indexed");
        Ok(ack)
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Value, SearchError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(index, id));
        }
        if !status.is_success() {
            return Err(Self::failure(response, "Get document", SearchError::QueryRejected).await);
        }

        let body = Self::read_json(response).await?;
        if body.get("found").and_then(Value::as_bool) == Some(false) {
            return Err(SearchError::not_found(index, id));
        }

        body.get("_source")
            .cloned()
            .ok_or_else(|| SearchError::parse("get response has no _source"))
    }

    #[instrument(skip(self, request), fields(index = %request.index))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse<Value>, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[request.index.as_str()]))
            .body(build_search_body(request))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(response, "Search", SearchError::QueryRejected).await);
        }

        let parsed = Self::parse_search_response(&Self::read_json(response).await?)?;
        debug!(total = parsed.total, returned = parsed.hits.len(), "Search completed");
        Ok(parsed)
    }

    #[instrument(skip(self, request), fields(index = %request.index))]
    async fn update_by_query(
        &self,
        request: &ScriptedUpdate,
    ) -> Result<UpdateByQueryResult, SearchError> {
        let response = self
            .client
            .update_by_query(UpdateByQueryParts::Index(&[request.index.as_str()]))
            .body(build_update_by_query_body(request))
            .send()
            .await
            .map_err(Self::transport_error)?;

        // The engine reports a bad filter and a bad script alike as 400; the filter
        // is validated before sending, so a rejection here is attributed to the write.
        if !response.status_code().is_success() {
            return Err(Self::failure(response, "Update by query", SearchError::WriteRejected).await);
        }

        let result = Self::parse_update_by_query(&Self::read_json(response).await?)?;
        debug!(
            total = result.total,
            updated = result.updated,
            noops = result.noops,
            "Update by query completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, request), fields(index = %request.index, id = %request.id))]
    async fn update_document(&self, request: &PointUpdate) -> Result<UpdateResult, SearchError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(&request.index, &request.id))
            .body(build_point_update_body(request))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(&request.index, &request.id));
        }
        if !status.is_success() {
            return Err(Self::failure(response, "Update document", SearchError::WriteRejected).await);
        }

        let result = Self::parse_update_result(&Self::read_json(response).await?)?;
        debug!(result = ?result, "Document update completed");
        Ok(result)
    }

    async fn health_check(&self) -> Result<bool, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(response, "Health check", SearchError::QueryRejected).await);
        }

        let health = Self::read_json(response).await?;
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(status = %status, "Cluster health");
        Ok(status == "green" || status == "yellow")
    }
}

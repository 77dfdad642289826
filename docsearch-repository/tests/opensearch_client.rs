//! Tests for the OpenSearch client against canned engine responses.

use std::sync::Arc;

use docsearch_repository::{
    CatalogItem, ConnectionConfig, DocumentStore, OpenSearchClient, PointUpdate, Query, Script,
    ScriptedUpdate, SearchDocument, SearchEngineClient, SearchError, SearchRequest, UpdateResult,
    WriteResult,
};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Map};

async fn client_for(server: &ServerGuard) -> OpenSearchClient {
    OpenSearchClient::new(&ConnectionConfig::new(server.url()))
        .await
        .unwrap()
}

fn path(pattern: &str) -> Matcher {
    Matcher::Regex(format!("^{}", pattern))
}

#[tokio::test]
async fn test_create_index_sends_strict_mapping() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", path("/catalog"))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "mappings": {
                "dynamic": "strict",
                "properties": { "id": { "type": "keyword" } }
            }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"acknowledged":true,"index":"catalog"}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    client
        .create_index("catalog", &CatalogItem::schema())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_index_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", path("/catalog"))
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"type":"resource_already_exists_exception"},"status":400}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let result = client.create_index("catalog", &CatalogItem::schema()).await;

    assert!(matches!(result, Err(SearchError::SchemaRejected(_))));
}

#[tokio::test]
async fn test_delete_missing_index_is_not_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("DELETE", path("/catalog"))
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"type":"index_not_found_exception"},"status":404}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    assert!(!client.delete_index("catalog").await.unwrap());
}

#[tokio::test]
async fn test_index_with_explicit_id_overwrites() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", path("/catalog/_doc/abc"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_index":"catalog","_id":"abc","_version":2,"result":"updated"}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let ack = client
        .index_document("catalog", Some("abc"), &json!({ "title": "Title - 0" }))
        .await
        .unwrap();

    assert_eq!(ack.id, "abc");
    assert_eq!(ack.result, WriteResult::Updated);
    assert_eq!(ack.version, 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_index_rejected_by_strict_mapping() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", path("/catalog/_doc/abc"))
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"type":"strict_dynamic_mapping_exception"},"status":400}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let result = client
        .index_document("catalog", Some("abc"), &json!({ "undeclared": true }))
        .await;

    assert!(matches!(result, Err(SearchError::WriteRejected(_))));
}

#[tokio::test]
async fn test_search_parses_hits() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("/files/_search"))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "query": { "match_phrase": { "title": { "query": "site plan" } } },
            "from": 0,
            "size": 10
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "took": 2,
                "hits": {
                    "total": { "value": 2, "relation": "eq" },
                    "max_score": 2.5,
                    "hits": [
                        { "_id": "f-1", "_score": 2.5, "_source": { "title": "site plan" } },
                        { "_id": "f-2", "_score": 0.7, "_source": { "title": "site plan v2" } }
                    ]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server).await;
    let response = client
        .search(&SearchRequest::new("files", Query::phrase("title", "site plan")))
        .await
        .unwrap();

    assert_eq!(response.total, 2);
    assert_eq!(response.hits[0].id, "f-1");
    assert_eq!(response.max_score(), Some(2.5));
    assert_eq!(response.min_score(), Some(0.7));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_search_rejected() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", path("/files/_search"))
        .match_query(Matcher::Any)
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"type":"query_shard_exception"},"status":400}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let result = client
        .search(&SearchRequest::new("files", Query::term("created_on", "not a date")))
        .await;

    assert!(matches!(result, Err(SearchError::QueryRejected(_))));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", path("/files/_search"))
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let client = client_for(&server).await;
    let result = client
        .search(&SearchRequest::new("files", Query::matches("file_text", "runs")))
        .await;

    assert!(matches!(result, Err(SearchError::EngineUnavailable(_))));
}

#[tokio::test]
async fn test_unreachable_engine_is_unavailable() {
    let client = OpenSearchClient::new(&ConnectionConfig::new("http://127.0.0.1:1"))
        .await
        .unwrap();

    assert!(matches!(
        client.health_check().await,
        Err(SearchError::EngineUnavailable(_))
    ));
}

#[tokio::test]
async fn test_point_update_outcomes() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", path("/catalog/_update/same"))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({ "detect_noop": true })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_id":"same","result":"noop"}"#)
        .create_async()
        .await;
    server
        .mock("POST", path("/catalog/_update/changed"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_id":"changed","result":"updated"}"#)
        .create_async()
        .await;
    server
        .mock("POST", path("/catalog/_update/missing"))
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"type":"document_missing_exception"},"status":404}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let update = |id: &str| PointUpdate::new("catalog", id).with_field("title", "Updated from update");

    assert_eq!(
        client.update_document(&update("same")).await.unwrap(),
        UpdateResult::Noop
    );
    assert_eq!(
        client.update_document(&update("changed")).await.unwrap(),
        UpdateResult::Updated
    );
    assert!(matches!(
        client.update_document(&update("missing")).await,
        Err(SearchError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_by_query_no_match() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", path("/catalog/_update_by_query"))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "query": { "term": { "id": { "value": "missing" } } },
            "script": { "lang": "painless" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"took":1,"total":0,"updated":0,"noops":0,"failures":[]}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    let mut params = Map::new();
    params.insert("title".to_string(), json!("new title"));
    let result = client
        .update_by_query(&ScriptedUpdate::new(
            "catalog",
            Query::term("id", "missing"),
            Script::assign(params).unwrap(),
        ))
        .await
        .unwrap();

    assert!(result.is_no_match());
}

#[tokio::test]
async fn test_get_missing_document() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/catalog/_doc/missing"))
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_index":"catalog","_id":"missing","found":false}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.get_document("catalog", "missing").await,
        Err(SearchError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_health_check() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/_cluster/health"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"cluster_name":"docker-cluster","status":"yellow"}"#)
        .create_async()
        .await;

    let client = client_for(&server).await;
    assert!(client.health_check().await.unwrap());
}

/// Create the catalog index, write one item, update it by filter and read it back.
#[tokio::test]
async fn test_catalog_round_trip_through_store() {
    let item = CatalogItem::new("Title - 0", "Description - 0");
    let id = item.id.to_string();
    let mut server = Server::new_async().await;

    server
        .mock("DELETE", path("/catalog"))
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("PUT", path("/catalog$"))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"acknowledged":true}"#)
        .create_async()
        .await;
    server
        .mock("PUT", path(&format!("/catalog/_doc/{}", id)))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({ "title": "Title - 0" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "_id": id, "result": "created", "_version": 1 }).to_string())
        .create_async()
        .await;
    let update_mock = server
        .mock("POST", path("/catalog/_update_by_query"))
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({
            "query": { "term": { "id": { "value": id } } },
            "script": { "params": { "title": "new title", "description": "new desc" } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"total":1,"updated":1,"noops":0,"failures":[]}"#)
        .create_async()
        .await;
    server
        .mock("GET", path(&format!("/catalog/_doc/{}", id)))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "_id": id,
                "found": true,
                "_source": { "id": id, "title": "new title", "description": "new desc" }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = DocumentStore::new(Arc::new(client_for(&server).await));

    let ack = store
        .create_or_replace_index("catalog", &CatalogItem::schema())
        .await
        .unwrap();
    assert!(!ack.replaced);

    let write = store.upsert("catalog", &item).await.unwrap();
    assert_eq!(write.id, id);
    assert_eq!(write.result, WriteResult::Created);

    let mut params = Map::new();
    params.insert("title".to_string(), json!("new title"));
    params.insert("description".to_string(), json!("new desc"));
    let result = store
        .update_by_query(&ScriptedUpdate::new(
            "catalog",
            Query::term("id", &id),
            Script::assign(params).unwrap(),
        ))
        .await
        .unwrap();
    assert_eq!(result.updated, 1);
    update_mock.assert_async().await;

    let stored: CatalogItem = store.get("catalog", &id).await.unwrap();
    assert_eq!(stored.title, "new title");
    assert_eq!(stored.description, "new desc");
}

//! Tests for the catalogue records

use super::service::catalog_url;
use super::*;
use crate::error::Error;
use crate::record::{Record, RecordContext};
use crate::testing::{stub_client, StubTransport};
use crate::types::{Headers, JsonValue, Method};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

// ============================================================================
// Fixtures
// ============================================================================

const ROOT: &str = "https://hub.test/api/catalogue/stac/";

fn service(transport: &Arc<StubTransport>) -> CatalogService {
    let landing = json!({
        "type": "Catalog",
        "id": "stac-fastapi",
        "title": "EODH resource catalogue",
        "conformsTo": [conformance::CORE_URI],
        "links": [{"rel": "self", "href": ROOT}]
    });
    CatalogService::from_json(
        RecordContext::new(stub_client(transport.clone()), Headers::new(), None),
        landing,
    )
    .unwrap()
}

fn catalog_json(id: &str) -> JsonValue {
    let url = format!("{ROOT}catalogs/{id}");
    json!({
        "type": "Catalog",
        "id": id,
        "description": "a catalog",
        "links": [
            {"rel": "self", "href": url},
            {"rel": "data", "href": format!("{url}/collections")}
        ]
    })
}

fn collection_json(id: &str) -> JsonValue {
    let url = format!("{ROOT}catalogs/root/collections/{id}");
    json!({
        "type": "Collection",
        "id": id,
        "description": "a collection",
        "keywords": ["a"],
        "links": [
            {"rel": "self", "href": url},
            {"rel": "items", "href": format!("{url}/items")}
        ]
    })
}

fn item_json(id: &str) -> JsonValue {
    json!({
        "type": "Feature",
        "id": id,
        "collection": "sentinel-2",
        "geometry": null,
        "properties": {"datetime": "2024-06-01T10:00:00Z"},
        "links": [{"rel": "self", "href": format!("{ROOT}collections/sentinel-2/items/{id}")}]
    })
}

fn conformance_json(uris: &[&str]) -> JsonValue {
    json!({ "conformsTo": uris })
}

async fn fetch_catalog(transport: &Arc<StubTransport>, id: &str) -> Catalog {
    transport.push_json(catalog_json(id));
    service(transport).get_catalog(id).await.unwrap()
}

// ============================================================================
// Service
// ============================================================================

#[test]
fn test_catalog_url_nests_paths() {
    assert_eq!(
        catalog_url(ROOT, "supported-datasets/ceda").unwrap(),
        format!("{ROOT}catalogs/supported-datasets/catalogs/ceda")
    );
    assert_eq!(
        catalog_url(ROOT, "/user-datasets/").unwrap(),
        format!("{ROOT}catalogs/user-datasets")
    );
    assert!(matches!(catalog_url(ROOT, "/"), Err(Error::Validation { .. })));
}

#[tokio::test]
async fn test_ping() {
    let transport = StubTransport::new();
    transport.push_json(json!({"message": "PONG"}));

    let message = service(&transport).ping().await.unwrap();

    assert_eq!(message.as_deref(), Some("PONG"));
    assert_eq!(transport.requests()[0].url, format!("{ROOT}_mgmt/ping"));
}

#[tokio::test]
async fn test_get_conformance() {
    let transport = StubTransport::new();
    transport.push_json(conformance_json(&[conformance::CORE_URI, conformance::ITEM_SEARCH_URI]));

    let classes = service(&transport).get_conformance().await.unwrap();

    assert_eq!(classes, vec![conformance::CORE_URI, conformance::ITEM_SEARCH_URI]);
    assert_eq!(transport.requests()[0].url, format!("{ROOT}conformance"));
}

#[tokio::test]
async fn test_check_conforms_to_names_missing_uri() {
    let transport = StubTransport::new();
    transport.push_json(conformance_json(&[conformance::CORE_URI]));

    let err = service(&transport)
        .check_conforms_to(conformance::CATALOG_TRANSACTION_URI)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("API does not conform to {}", conformance::CATALOG_TRANSACTION_URI)
    );
}

#[tokio::test]
async fn test_get_nested_catalog_sets_parent() {
    let transport = StubTransport::new();
    transport.push_json(catalog_json("ceda"));

    let catalog = service(&transport)
        .get_catalog("supported-datasets/ceda")
        .await
        .unwrap();

    assert_eq!(catalog.id(), "ceda");
    assert_eq!(
        transport.requests()[0].url,
        format!("{ROOT}catalogs/supported-datasets/catalogs/ceda")
    );
    let parent = catalog.parent().unwrap();
    assert_eq!(parent.kind, CatalogService::KIND);
    assert_eq!(parent.root_url.as_deref(), Some(ROOT));
}

#[tokio::test]
async fn test_get_catalogs_is_paged() {
    let transport = StubTransport::new();
    transport.push_json(json!({
        "catalogs": [catalog_json("a"), catalog_json("b")],
        "numMatched": 2,
        "links": []
    }));

    let catalogs = service(&transport).get_catalogs().unwrap();
    let ids: Vec<String> = catalogs
        .collect_all()
        .await
        .unwrap()
        .iter()
        .map(|c| c.id().to_string())
        .collect();

    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(catalogs.known_total_count().await, Some(2));
}

#[tokio::test]
async fn test_create_catalog_checks_conformance_then_posts() {
    let transport = StubTransport::new();
    transport
        .push_json(conformance_json(&[conformance::CATALOG_TRANSACTION_URI]))
        .push_json(catalog_json("new"));

    let catalog = service(&transport)
        .create_catalog(&NewCatalog::new("new", "fresh").title("New"))
        .await
        .unwrap();

    assert_eq!(catalog.id(), "new");
    let requests = transport.requests();
    assert_eq!(requests[1].method, Method::POST);
    assert_eq!(requests[1].url, format!("{ROOT}catalogs"));
    assert_eq!(
        requests[1].body.as_ref().and_then(|b| b.as_json()).cloned(),
        Some(json!({"type": "Catalog", "id": "new", "description": "fresh", "title": "New"}))
    );
}

#[tokio::test]
async fn test_create_catalog_validates_before_any_request() {
    let transport = StubTransport::new();

    let err = service(&transport)
        .create_catalog(&NewCatalog::new("", "no id"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(transport.calls(), 0);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_posts_body_and_follows_token() {
    let transport = StubTransport::new();
    transport
        .push_json(json!({
            "type": "FeatureCollection",
            "features": [item_json("a")],
            "context": {"matched": 2},
            "links": [{"rel": "next", "href": format!("{ROOT}search?next=abc")}]
        }))
        .push_json(json!({"features": [item_json("b")], "links": []}));

    let params = SearchParams::new().limit(1).collections(["sentinel-2"]);
    let items = service(&transport).search(&params).unwrap();
    let ids: Vec<String> = items
        .stream()
        .try_collect::<Vec<_>>()
        .await
        .unwrap()
        .iter()
        .map(|i| i.id().to_string())
        .collect();

    assert_eq!(ids, vec!["a", "b"]);
    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].url, format!("{ROOT}search"));
    assert_eq!(
        requests[0].body.as_ref().and_then(|b| b.as_json()).cloned(),
        Some(json!({"limit": 1, "collections": ["sentinel-2"]}))
    );
    assert_eq!(requests[1].url, format!("{ROOT}search"));
    assert_eq!(
        requests[1].body.as_ref().and_then(|b| b.as_json()).cloned(),
        Some(json!({"limit": 1, "collections": ["sentinel-2"], "next": "abc"}))
    );
    assert_eq!(items.known_total_count().await, Some(2));
}

#[test_case(SearchParams::new().bbox(vec![0.0, 1.0, 2.0]) ; "short bbox")]
#[test_case(SearchParams::new().bbox(vec![0.0, 1.0, 2.0, 3.0]).intersects(json!({"type": "Point", "coordinates": [0, 0]})) ; "bbox and intersects")]
#[test_case(SearchParams::new().intersects(json!({"coordinates": [0, 0]})) ; "geometry without type")]
#[test_case(SearchParams::new().limit(0) ; "zero limit")]
fn test_invalid_search_params(params: SearchParams) {
    let transport = StubTransport::new();
    let err = service(&transport).search(&params).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_search_params_serialization() {
    let params = SearchParams::new()
        .bbox(vec![-1.0, 50.0, 1.0, 52.0])
        .datetime("2024-01-01T00:00:00Z/..")
        .sort_by("datetime", SortDirection::Desc)
        .filter(json!({"op": "=", "args": [{"property": "id"}, "x"]}), FilterLang::Cql2Json)
        .filter_crs("EPSG:4326");

    assert_eq!(
        params.to_body().unwrap(),
        json!({
            "limit": 10,
            "bbox": [-1.0, 50.0, 1.0, 52.0],
            "datetime": "2024-01-01T00:00:00Z/..",
            "sortby": [{"field": "datetime", "direction": "desc"}],
            "filter": {"op": "=", "args": [{"property": "id"}, "x"]},
            "filter-crs": "EPSG:4326",
            "filter-lang": "cql2-json"
        })
    );
}

#[test_case("eo:cloud_cover<=10", "eo:cloud_cover", "lte", "10")]
#[test_case("eo:cloud_cover>=10", "eo:cloud_cover", "gte", "10")]
#[test_case("platform=sentinel-2a", "platform", "eq", "sentinel-2a")]
#[test_case("platform<>sentinel-2b", "platform", "neq", "sentinel-2b")]
#[test_case("view:sun_elevation>30", "view:sun_elevation", "gt", "30")]
#[test_case("view:off_nadir<5", "view:off_nadir", "lt", "5")]
fn test_parse_query_operator(expression: &str, property: &str, op: &str, value: &str) {
    let query = parse_query(&[expression]).unwrap();
    assert_eq!(JsonValue::Object(query), json!({ property: { op: value } }));
}

#[test]
fn test_parse_query_merges_json_fragments() {
    let query = parse_query(&[r#"{"eo:cloud_cover": {"lt": 10}}"#, "platform=sentinel-2a"]).unwrap();
    assert_eq!(
        JsonValue::Object(query),
        json!({"eo:cloud_cover": {"lt": 10}, "platform": {"eq": "sentinel-2a"}})
    );
}

#[test]
fn test_parse_query_rejects_garbage() {
    assert!(matches!(
        parse_query(&["cloudy"]),
        Err(Error::Validation { .. })
    ));
}

#[test]
fn test_filter_lang_parse() {
    assert_eq!(FilterLang::parse("cql2-text").unwrap(), FilterLang::Cql2Text);
    assert!(FilterLang::parse("sql").is_err());
}

#[tokio::test]
async fn test_collection_search_uses_query_and_num_matched() {
    let transport = StubTransport::new();
    transport.push_json(json!({
        "collections": [collection_json("sentinel-2")],
        "numMatched": 1,
        "links": []
    }));

    let params = CollectionSearchParams::new().q("sentinel").bbox(vec![0.0, 1.0, 2.0, 3.0]);
    let collections = service(&transport).collection_search(&params).unwrap();

    assert_eq!(collections.total_count().await.unwrap(), Some(1));
    let query = &transport.requests()[0].query;
    assert_eq!(query.get("q").map(String::as_str), Some("sentinel"));
    assert_eq!(query.get("bbox").map(String::as_str), Some("0,1,2,3"));
    assert_eq!(query.get("limit").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_discovery_search_yields_both_kinds() {
    let transport = StubTransport::new();
    transport.push_json(json!({
        "catalogs_and_collections": [catalog_json("cat"), collection_json("col")],
        "numMatched": 2,
        "links": []
    }));

    let hits = service(&transport)
        .discovery_search(&CollectionSearchParams::new().q("x"))
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(hits[0].kind(), DiscoveryKind::Catalog);
    assert_eq!(hits[1].kind(), DiscoveryKind::Collection);
    assert_eq!(hits[0].to_catalog().unwrap().id(), "cat");
    assert_eq!(hits[1].to_collection().unwrap().id(), "col");
    assert!(matches!(hits[0].to_collection(), Err(Error::Projection { .. })));
    assert_eq!(
        transport.requests()[0].url,
        format!("{ROOT}discovery-search")
    );
}

// ============================================================================
// Catalog, collection and item
// ============================================================================

#[tokio::test]
async fn test_catalog_collections() {
    let transport = StubTransport::new();
    let catalog = fetch_catalog(&transport, "root").await;
    transport
        .push_json(json!({"collections": [collection_json("c1")], "links": []}))
        .push_json(collection_json("c2"));

    let collections = catalog.get_collections().unwrap().collect_all().await.unwrap();
    let single = catalog.get_collection("c2").await.unwrap();

    assert_eq!(collections[0].id(), "c1");
    assert_eq!(single.id(), "c2");
    let requests = transport.requests();
    assert_eq!(requests[1].url, format!("{ROOT}catalogs/root/collections"));
    assert_eq!(requests[1].query.get("limit").map(String::as_str), Some("10"));
    assert_eq!(requests[2].url, format!("{ROOT}catalogs/root/collections/c2"));
}

#[tokio::test]
async fn test_catalog_without_data_link() {
    let transport = StubTransport::new();
    transport.push_json(json!({"id": "bare", "links": [{"rel": "self", "href": ROOT}]}));
    let catalog = service(&transport).get_catalog("bare").await.unwrap();

    let err = catalog.get_collections().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Catalog does not contain a link with relation 'data'"
    );
}

#[tokio::test]
async fn test_update_without_conformance_sends_nothing() {
    let transport = StubTransport::new();
    let mut catalog = fetch_catalog(&transport, "root").await;
    transport.push_json(conformance_json(&[conformance::CORE_URI]));

    let update = CatalogUpdate {
        description: Some("changed".to_string()),
        ..Default::default()
    };
    let err = catalog.update(&update).await.unwrap_err();

    assert!(matches!(err, Error::Conformance { ref uri } if uri == conformance::CATALOG_TRANSACTION_URI));
    assert_eq!(transport.mutating_calls(), 0);
    assert_eq!(catalog.description(), Some("a catalog"));
}

#[tokio::test]
async fn test_deletes_without_conformance_send_nothing() {
    let transport = StubTransport::new();
    let catalog = fetch_catalog(&transport, "root").await;
    transport
        .push_json(collection_json("c1"))
        .push_json(conformance_json(&[]))
        .push_json(conformance_json(&[]))
        .push_json(conformance_json(&[]));

    let collection = catalog.get_collection("c1").await.unwrap();

    assert!(matches!(catalog.delete().await, Err(Error::Conformance { .. })));
    assert!(matches!(collection.delete().await, Err(Error::Conformance { .. })));
    assert!(matches!(
        collection.create_item(&NewItem::new("i1")).await,
        Err(Error::Conformance { .. })
    ));
    assert_eq!(transport.mutating_calls(), 0);
}

#[tokio::test]
async fn test_catalog_update_reprojects_response() {
    let transport = StubTransport::new();
    let mut catalog = fetch_catalog(&transport, "root").await;
    let mut updated = catalog_json("root");
    updated["description"] = json!("changed");
    updated["title"] = json!("Root");
    transport
        .push_json(conformance_json(&[conformance::CATALOG_TRANSACTION_URI]))
        .push_json(updated);

    let update = CatalogUpdate {
        description: Some("changed".to_string()),
        ..Default::default()
    };
    catalog.update(&update).await.unwrap();

    assert_eq!(catalog.description(), Some("changed"));
    assert_eq!(catalog.title(), Some("Root"));

    let requests = transport.requests();
    assert_eq!(requests[1].url, format!("{ROOT}conformance"));
    assert_eq!(requests[2].method, Method::PUT);
    assert_eq!(requests[2].url, format!("{ROOT}catalogs/root"));
    let body = requests[2].body.as_ref().and_then(|b| b.as_json()).cloned().unwrap();
    assert_eq!(body["id"], json!("root"));
    assert_eq!(body["description"], json!("changed"));
}

#[tokio::test]
async fn test_collection_update_with_empty_response_keeps_fields() {
    let transport = StubTransport::new();
    let catalog = fetch_catalog(&transport, "root").await;
    transport
        .push_json(collection_json("c1"))
        .push_json(conformance_json(&[conformance::COLLECTION_TRANSACTION_URI]))
        .push_empty();
    let mut collection = catalog.get_collection("c1").await.unwrap();

    let update = CollectionUpdate {
        title: Some("C1".to_string()),
        ..Default::default()
    };
    collection.update(&update).await.unwrap();

    assert_eq!(collection.title(), None);
    assert_eq!(transport.mutating_calls(), 1);
}

#[tokio::test]
async fn test_collection_items_and_create_item() {
    let transport = StubTransport::new();
    let catalog = fetch_catalog(&transport, "root").await;
    transport
        .push_json(collection_json("sentinel-2"))
        .push_json(json!({"features": [item_json("a"), item_json("b")], "context": {"matched": 2}, "links": []}))
        .push_json(conformance_json(&[conformance::ITEM_TRANSACTION_URI]))
        .push_json(json!({"id": "new", "collection": "sentinel-2", "properties": {}}));
    let collection = catalog.get_collection("sentinel-2").await.unwrap();

    let items = collection.get_items().unwrap();
    assert_eq!(items.get_limited().await.unwrap().len(), 2);

    let new_item = NewItem::new("new")
        .geometry(json!({"type": "Point", "coordinates": [0.0, 51.0]}), vec![0.0, 51.0, 0.0, 51.0])
        .property("platform", json!("sentinel-2a"));
    let created = collection.create_item(&new_item).await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[2].url, format!("{ROOT}catalogs/root/collections/sentinel-2/items"));
    let body = requests[4].body.as_ref().and_then(|b| b.as_json()).cloned().unwrap();
    assert_eq!(body["type"], json!("Feature"));
    assert_eq!(body["id"], json!("new"));
    assert_eq!(body["collection"], json!("sentinel-2"));

    // No self link in the response: derived from the parent collection
    assert_eq!(
        created.self_url().unwrap(),
        format!("{ROOT}catalogs/root/collections/sentinel-2/items/new")
    );
}

#[tokio::test]
async fn test_item_self_url_falls_back_to_collection_id() {
    let transport = StubTransport::new();
    let item = Item::from_json(
        RecordContext::new(stub_client(transport.clone()), Headers::new(), None),
        json!({"id": "x", "collection": "c", "properties": {}}),
    )
    .unwrap();

    assert_eq!(
        item.self_url().unwrap(),
        "https://hub.test/stac-fastapi/collections/c/items/x"
    );
}

#[tokio::test]
async fn test_item_update_sets_datetime() {
    let transport = StubTransport::new();
    let mut item = Item::from_json(
        RecordContext::new(stub_client(transport.clone()), Headers::new(), None),
        item_json("a"),
    )
    .unwrap();
    transport
        .push_json(conformance_json(&[conformance::ITEM_TRANSACTION_URI]))
        .push_empty();

    let datetime = chrono::DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let update = ItemUpdate {
        datetime: Some(datetime),
        ..Default::default()
    };
    item.update(&update).await.unwrap();

    let requests = transport.requests();
    // Without a parent the conformance list comes from the configured service
    assert_eq!(requests[0].url, format!("{ROOT}conformance"));
    let body = requests[1].body.as_ref().and_then(|b| b.as_json()).cloned().unwrap();
    assert_eq!(body["properties"]["datetime"], json!("2025-01-02T03:04:05+00:00"));
    assert!(body.get("geometry").is_none());
}

#[test]
fn test_item_projection_errors() {
    let transport = StubTransport::new();
    let ctx = RecordContext::new(stub_client(transport), Headers::new(), None);

    let err = Item::from_json(ctx.clone(), json!({"id": "x", "bbox": "0,0,1,1"})).unwrap_err();
    assert!(matches!(err, Error::Projection { ref record, .. } if record == "Item"));

    let err = Collection::from_json(ctx, json!({"id": "x", "keywords": "a"})).unwrap_err();
    assert!(matches!(err, Error::Projection { ref record, .. } if record == "Collection"));
}

#[test]
fn test_item_datetime() {
    let transport = StubTransport::new();
    let ctx = RecordContext::new(stub_client(transport), Headers::new(), None);
    let item = Item::from_json(ctx, item_json("a")).unwrap();

    assert_eq!(
        item.datetime().map(|d| d.to_rfc3339()),
        Some("2024-06-01T10:00:00+00:00".to_string())
    );
}

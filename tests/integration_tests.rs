//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client → reqwest transport → hub endpoints
//! → records and paged lists

use eodh::catalog::{conformance, CatalogUpdate};
use eodh::{Client, ClientConfig, Error, JobStatus, SearchParams};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STAC: &str = "/api/catalogue/stac/";
const ADES: &str = "/api/ades/alice/ogc-api/";

fn client(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .base_url(server.uri())
        .username("alice")
        .token("secret")
        .build();
    Client::new(config).unwrap()
}

async fn mount_landing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(STAC))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Catalog",
            "id": "stac-fastapi",
            "links": [{"rel": "self", "href": format!("{}{STAC}", server.uri())}]
        })))
        .mount(server)
        .await;
}

async fn mount_conformance(server: &MockServer, uris: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("{STAC}conformance")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "conformsTo": uris })))
        .mount(server)
        .await;
}

fn feature(id: &str) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "collection": "sentinel2_ard",
        "geometry": null,
        "properties": {"datetime": "2024-06-01T10:00:00Z"},
        "links": []
    })
}

// ============================================================================
// Catalogue Service
// ============================================================================

#[tokio::test]
async fn test_landing_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STAC))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Catalog",
            "id": "stac-fastapi",
            "title": "EODH",
            "links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    assert_eq!(service.title(), Some("EODH"));
}

#[tokio::test]
async fn test_ping_and_conformance() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_conformance(&server, &[conformance::CORE_URI]).await;

    Mock::given(method("GET"))
        .and(path(format!("{STAC}_mgmt/ping")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "PONG"})))
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();

    assert_eq!(service.ping().await.unwrap().as_deref(), Some("PONG"));
    assert_eq!(
        service.get_conformance().await.unwrap(),
        vec![conformance::CORE_URI.to_string()]
    );

    let err = service
        .check_conforms_to(conformance::CATALOG_TRANSACTION_URI)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("API does not conform to {}", conformance::CATALOG_TRANSACTION_URI)
    );
}

#[tokio::test]
async fn test_not_found_is_http_status_error() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs/missing")))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let err = service.get_catalog("missing").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test]
async fn test_catalog_listing_follows_next_links() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    let catalogs_url = format!("{}{STAC}catalogs", server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalogs": [{"type": "Catalog", "id": "c", "links": []}],
            "numMatched": 3,
            "links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalogs": [
                {"type": "Catalog", "id": "a", "links": []},
                {"type": "Catalog", "id": "b", "links": []}
            ],
            "numMatched": 3,
            "links": [{"rel": "next", "href": format!("{catalogs_url}?page=2")}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let catalogs = service.get_catalogs().unwrap();

    let ids: Vec<String> = catalogs
        .stream()
        .map_ok(|c| c.id().to_string())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(ids, vec!["a", "b", "c"]);

    // realized records are served without touching the server again
    assert_eq!(catalogs.get(2).await.unwrap().id(), "c");
    assert!(!catalogs.has_next().await);
}

#[tokio::test]
async fn test_slice_does_not_fetch_past_stop() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    let catalogs_url = format!("{}{STAC}catalogs", server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"catalogs": []})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "catalogs": [
                {"type": "Catalog", "id": "a", "links": []},
                {"type": "Catalog", "id": "b", "links": []}
            ],
            "links": [{"rel": "next", "href": format!("{catalogs_url}?page=2")}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let catalogs = service.get_catalogs().unwrap();

    let first_two = catalogs.slice(0, Some(2), 1).unwrap().collect_all().await.unwrap();

    assert_eq!(first_two.len(), 2);
    assert!(catalogs.has_next().await);
}

#[tokio::test]
async fn test_search_moves_token_into_post_body() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    let search_url = format!("{}{STAC}search", server.uri());

    Mock::given(method("POST"))
        .and(path(format!("{STAC}search")))
        .and(body_partial_json(json!({"next": "page-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [feature("c")],
            "context": {"matched": 3},
            "links": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{STAC}search")))
        .and(body_partial_json(json!({"collections": ["sentinel2_ard"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "FeatureCollection",
            "features": [feature("a"), feature("b")],
            "context": {"matched": 3},
            "links": [{"rel": "next", "method": "POST", "href": format!("{search_url}?next=page-2")}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let params = SearchParams::new().collections(["sentinel2_ard"]).limit(2);
    let items = service.search(&params).unwrap().collect_all().await.unwrap();

    let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_search_total_count_asks_for_one_record() {
    let server = MockServer::start().await;
    mount_landing(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{STAC}search")))
        .and(body_partial_json(json!({"limit": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [feature("a")],
            "context": {"matched": 1234}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let items = service.search(&SearchParams::new()).unwrap();

    assert_eq!(items.total_count().await.unwrap(), Some(1234));
    // the count request does not realize anything
    assert_eq!(items.realized_len().await, 0);
}

// ============================================================================
// Transactions
// ============================================================================

#[tokio::test]
async fn test_mutations_without_conformance_send_nothing() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_conformance(&server, &[conformance::CORE_URI]).await;
    let catalog_url = format!("{}{STAC}catalogs/user-datasets", server.uri());

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs/user-datasets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "Catalog",
            "id": "user-datasets",
            "description": "before",
            "links": [{"rel": "self", "href": catalog_url}]
        })))
        .mount(&server)
        .await;

    for verb in ["PUT", "DELETE", "POST"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }

    let service = client(&server).catalog_service().await.unwrap();
    let mut catalog = service.get_catalog("user-datasets").await.unwrap();

    let update = CatalogUpdate {
        description: Some("after".to_string()),
        ..Default::default()
    };
    let err = catalog.update(&update).await.unwrap_err();
    assert!(matches!(err, Error::Conformance { .. }));
    assert_eq!(catalog.description(), Some("before"));

    let err = catalog.delete().await.unwrap_err();
    assert!(matches!(err, Error::Conformance { .. }));
}

#[tokio::test]
async fn test_catalog_update_with_conformance() {
    let server = MockServer::start().await;
    mount_landing(&server).await;
    mount_conformance(&server, &[conformance::CATALOG_TRANSACTION_URI]).await;
    let catalog_url = format!("{}{STAC}catalogs/user-datasets", server.uri());
    let document = |description: &str| {
        json!({
            "type": "Catalog",
            "id": "user-datasets",
            "description": description,
            "links": [{"rel": "self", "href": catalog_url}]
        })
    };

    Mock::given(method("GET"))
        .and(path(format!("{STAC}catalogs/user-datasets")))
        .respond_with(ResponseTemplate::new(200).set_body_json(document("before")))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("{STAC}catalogs/user-datasets")))
        .and(body_partial_json(json!({"id": "user-datasets", "description": "after"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(document("after")))
        .expect(1)
        .mount(&server)
        .await;

    let service = client(&server).catalog_service().await.unwrap();
    let mut catalog = service.get_catalog("user-datasets").await.unwrap();

    let update = CatalogUpdate {
        description: Some("after".to_string()),
        ..Default::default()
    };
    catalog.update(&update).await.unwrap();

    assert_eq!(catalog.description(), Some("after"));
}

// ============================================================================
// ADES
// ============================================================================

#[tokio::test]
async fn test_deploy_execute_and_poll_job() {
    let server = MockServer::start().await;
    let base = format!("{}{ADES}", server.uri());

    Mock::given(method("GET"))
        .and(path(ADES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "ADES",
            "links": [
                {"rel": "self", "href": base},
                {"rel": "http://www.opengis.net/def/rel/ogc/1.0/processes", "href": format!("{base}processes")},
                {"rel": "http://www.opengis.net/def/rel/ogc/1.0/job-list", "href": format!("{base}jobs")}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{ADES}processes")))
        .and(body_partial_json(json!({"executionUnit": {"type": "application/cwl"}})))
        .respond_with(
            ResponseTemplate::new(201).insert_header("Location", format!("{base}processes/ndvi")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{ADES}processes/ndvi")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ndvi",
            "version": "0.1.0",
            "links": [{"rel": "self", "href": format!("{base}processes/ndvi")}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{ADES}processes/ndvi/execution")))
        .and(header("Prefer", "respond-async"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "jobID": "j1",
            "status": "accepted",
            "links": [{"rel": "self", "href": format!("{base}jobs/j1")}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{ADES}jobs/j1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jobID": "j1",
            "status": "successful",
            "progress": 100,
            "links": [{"rel": "self", "href": format!("{base}jobs/j1")}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{ADES}jobs/j1/results")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ndvi": {"href": "s3://out"}})))
        .mount(&server)
        .await;

    let ades = client(&server).ades().await.unwrap();
    let process = ades
        .deploy_process(Some("https://example.com/ndvi.cwl"), None)
        .await
        .unwrap();
    assert_eq!(process.version(), Some("0.1.0"));

    let mut job = process.execute(Default::default()).await.unwrap();
    assert_eq!(job.status(), JobStatus::Accepted);

    job.refresh().await.unwrap();
    assert!(job.is_finished());
    assert_eq!(job.progress(), Some(100));

    let results = job.results().await.unwrap();
    assert_eq!(results["ndvi"]["href"], "s3://out");
}

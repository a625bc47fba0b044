use serde_json::{json, Value};
use std::sync::Arc;
use thundermonit::adapters::fixtures::default_services;
use thundermonit::{build_schema, server};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let schema = Arc::new(build_schema(default_services().unwrap()).unwrap());
        let router = server::create_router(schema, "/graphql");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            server::serve(listener, router, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        Self {
            base_url: format!("http://{}/graphql", addr),
            shutdown: Some(tx),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

#[tokio::test]
async fn test_post_query() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&server.base_url)
        .json(&json!({"query": "{ service(id: 1) { name ci { api url } } }"}))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"data": {"service": {
            "name": "gomonit",
            "ci": {"api": "https://drone.depado.eu", "url": "https://drone.depado.eu/Depado/gomonit"}
        }}})
    );
}

#[tokio::test]
async fn test_get_query_with_variables() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&server.base_url)
        .query(&[
            ("query", "query One($id: Int!) { service(id: $id) { name } }"),
            ("variables", r#"{"id": 0}"#),
            ("operationName", "One"),
        ])
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["service"]["name"], "goploader");
}

#[tokio::test]
async fn test_not_found_rendered_in_response() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(&server.base_url)
        .json(&json!({"query": "{ service(id: 2) { name } }"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["data"].is_null());
    assert_eq!(body["errors"][0]["message"], "service 2 not found");
    assert_eq!(body["errors"][0]["path"], json!(["service"]));
    assert_eq!(body["errors"][0]["extensions"], json!({"code": "NOT_FOUND", "id": 2}));
}

#[tokio::test]
async fn test_get_with_malformed_variables() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .get(&server.base_url)
        .query(&[("query", "{ services { id } }"), ("variables", "{not json")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_with_malformed_body() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&server.base_url)
        .header("content-type", "application/json")
        .body(r#"{"query": "{ services { id } }", "variables": [1]"#)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["data"].is_null());
    assert_eq!(body["errors"][0]["extensions"]["code"], "GRAPHQL_VALIDATION_FAILED");
}

#[tokio::test]
async fn test_post_with_wrong_field_types() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&server.base_url)
        .json(&json!({"query": 42}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"][0]["message"].as_str().unwrap().contains("body"));
}

#[tokio::test]
async fn test_malformed_get_and_post_share_error_shape() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let get: Value = client
        .get(&server.base_url)
        .query(&[("query", "{ services { id } }"), ("variables", "{not json")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let post: Value = client
        .post(&server.base_url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    for body in [get, post] {
        assert!(body["data"].is_null());
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"][0]["extensions"]["code"], "GRAPHQL_VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let server = TestServer::start().await;
    let url = server.base_url.replace("/graphql", "/graphiql");

    let response = reqwest::get(url).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

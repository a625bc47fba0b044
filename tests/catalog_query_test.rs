use serde_json::json;
use std::sync::Arc;
use thundermonit::adapters::fixtures::default_services;
use thundermonit::{
    build_schema, CatalogError, CiConfig, Interactor, MemoryStorer, Repository, Request, Service,
};

fn seed() -> Vec<Service> {
    vec![
        Service::new(
            10,
            "alpha",
            "https://alpha.example.com",
            Repository::new("github").with_url("https://github.com/acme/alpha"),
            CiConfig::new("https://ci.example.com", "https://ci.example.com/acme/alpha"),
        )
        .unwrap(),
        Service::new(
            3,
            "beta",
            "https://beta.example.com",
            Repository::new("github").with_url("https://github.com/acme/beta"),
            CiConfig::new("https://ci.example.com", "https://ci.example.com/acme/beta"),
        )
        .unwrap(),
        Service::new(
            7,
            "gamma",
            "https://gamma.example.com",
            Repository::new("gitlab"),
            CiConfig::new("https://ci.other.com", "https://ci.other.com/gamma"),
        )
        .unwrap(),
    ]
}

#[tokio::test]
async fn test_fixture_scenario_end_to_end() {
    let schema = build_schema(default_services().unwrap()).unwrap();

    let found = schema
        .execute(&Request::new("{ service(id: 0) { id name repo { type } } }"))
        .await;
    assert_eq!(
        found.data.unwrap(),
        json!({"service": {"id": 0, "name": "goploader", "repo": {"type": "github"}}})
    );

    let missing = schema
        .execute(&Request::new("{ service(id: 2) { name } }"))
        .await;
    assert!(missing.data.is_none());
    assert_eq!(missing.errors[0].code(), Some("NOT_FOUND"));
    assert_eq!(missing.errors[0].extensions["id"], json!(2));

    let all = schema
        .execute(&Request::new("{ services { name } }"))
        .await;
    assert_eq!(
        all.data.unwrap(),
        json!({"services": [{"name": "goploader"}, {"name": "gomonit"}]})
    );
}

#[tokio::test]
async fn test_every_seeded_id_resolves_to_its_service() {
    let seed = seed();
    let interactor = Interactor::new(Arc::new(MemoryStorer::new(seed.clone()).unwrap()));

    for expected in &seed {
        let service = interactor.get_service(expected.id()).await.unwrap();
        assert_eq!(&service, expected);
        assert_eq!(&interactor.get_repo(&service).await.unwrap(), expected.repo());
    }

    for absent in [0, 1, 2, 4, 11, -5, i64::MAX] {
        match interactor.get_service(absent).await {
            Err(CatalogError::NotFound { id }) => assert_eq!(id, absent),
            other => panic!("expected NotFound({absent}), got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_enumeration_matches_seed_order() {
    let seed = seed();
    let interactor = Interactor::new(Arc::new(MemoryStorer::new(seed.clone()).unwrap()));

    let all = interactor.get_all_services().await.unwrap();
    assert_eq!(all, seed);
    assert_eq!(interactor.get_all_services().await.unwrap(), all);
}

#[tokio::test]
async fn test_nested_associations_are_per_instance() {
    let schema = build_schema(seed()).unwrap();

    let response = schema
        .execute(&Request::new(
            "{ services { id repo { type url } ci { url } } }",
        ))
        .await;

    assert_eq!(
        response.data.unwrap(),
        json!({"services": [
            {"id": 10, "repo": {"type": "github", "url": "https://github.com/acme/alpha"}, "ci": {"url": "https://ci.example.com/acme/alpha"}},
            {"id": 3, "repo": {"type": "github", "url": "https://github.com/acme/beta"}, "ci": {"url": "https://ci.example.com/acme/beta"}},
            {"id": 7, "repo": {"type": "gitlab", "url": null}, "ci": {"url": "https://ci.other.com/gamma"}}
        ]})
    );
}

#[tokio::test]
async fn test_concurrent_queries_share_one_schema() {
    let schema = Arc::new(build_schema(seed()).unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let schema = Arc::clone(&schema);
            tokio::spawn(async move {
                let id = [10, 3, 7][i % 3];
                schema
                    .execute(&Request::new("query ($id: Int!) { service(id: $id) { id } }").variable("id", id))
                    .await
                    .data
                    .map(|data| data["service"]["id"].as_i64())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = [10, 3, 7][i % 3];
        assert_eq!(handle.await.unwrap(), Some(Some(expected)));
    }
}

#[tokio::test]
async fn test_empty_catalog() {
    let schema = build_schema(Vec::new()).unwrap();

    let response = schema
        .execute(&Request::new("{ services { id } }"))
        .await;
    assert_eq!(response.data.unwrap(), json!({"services": []}));
}

mod mocks;

use keycloak_admin_integration::{
    AdminError, CacheStore, Container, ContainerError, InMemoryCacheStore, KeycloakAdminConfig,
    KeycloakAdminFacade, KeycloakClient, KeycloakServiceProvider, PublishOutcome, TokenStorage,
    SERVICE_ALIAS,
};
use mocks::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(use_cache: bool) -> KeycloakAdminConfig {
    KeycloakAdminConfig {
        base_url: Some("http://test-server:8080".to_string()),
        username: Some("test-user".to_string()),
        password: Some("test-pass".to_string()),
        use_cache,
        ..KeycloakAdminConfig::default()
    }
}

fn registered(config: &KeycloakAdminConfig, cache: Arc<dyn CacheStore>) -> Container {
    let container = Container::new();
    KeycloakServiceProvider::new(config, cache).register(&container);
    container
}

#[test]
fn test_service_is_registered_under_type_and_alias() {
    let container = registered(&test_config(true), Arc::new(InMemoryCacheStore::new()));

    assert!(container.bound::<KeycloakClient>());
    assert!(container.has_alias(SERVICE_ALIAS));
    assert!(container.bound::<KeycloakAdminConfig>());
}

#[test]
fn test_client_is_a_singleton() {
    let container = registered(&test_config(true), Arc::new(InMemoryCacheStore::new()));

    let first = container.make::<KeycloakClient>().unwrap();
    let second = container.make::<KeycloakClient>().unwrap();
    let aliased = container.make_alias::<KeycloakClient>("keycloak-admin").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &aliased));
    assert_eq!(first.base_url(), "http://test-server:8080");
    assert_eq!(first.username(), "test-user");
    assert_eq!(first.realm(), "master");
}

#[tokio::test]
async fn test_cache_storage_writes_to_application_cache() {
    let cache = RecordingCacheStore::new();
    let container = registered(&test_config(true), Arc::new(cache.clone()));
    let client = container.make::<KeycloakClient>().unwrap();
    let token = signed_token("through-client", 3600);

    client.token_storage().store_access_token(&token).await.unwrap();

    assert_eq!(
        cache.inner.get("laravel-keycloak-admin-cache-token").await.unwrap().as_deref(),
        Some(token.as_str())
    );
}

#[tokio::test]
async fn test_custom_cache_keys_from_config() {
    let cache = InMemoryCacheStore::new();
    let config = KeycloakAdminConfig {
        access_token_cache_key: "custom-access-token-key".to_string(),
        refresh_token_cache_key: "custom-refresh-token-key".to_string(),
        ..test_config(true)
    };
    let container = registered(&config, Arc::new(cache.clone()));
    let client = container.make::<KeycloakClient>().unwrap();
    let token = signed_token("custom", 3600);

    client.token_storage().store_refresh_token(&token).await.unwrap();

    assert!(cache.has("custom-refresh-token-key").await.unwrap());
    assert!(!cache.has("laravel-keycloak-admin-cache-refresh-token").await.unwrap());
}

#[tokio::test]
async fn test_without_cache_storage_no_cache_calls_occur() {
    let server = MockServer::start().await;
    let access = signed_token("local-only", 3600);
    let refresh = signed_token("local-refresh", 7200);
    Mock::given(method("POST"))
        .and(path("/realms/master/protocol/openid-connect/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=test-user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response(&access, Some(&refresh))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/realms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "realm": "master" }])))
        .expect(1)
        .mount(&server)
        .await;

    let cache = RecordingCacheStore::new();
    let config = KeycloakAdminConfig {
        base_url: Some(server.uri()),
        ..test_config(false)
    };
    let container = registered(&config, Arc::new(cache.clone()));
    let client = container.make::<KeycloakClient>().unwrap();

    let token = client.access_token().await.unwrap();
    let again = client.access_token().await.unwrap();
    let realms = client.realms().await.unwrap();

    assert_eq!(token.as_str(), access.as_str());
    assert_eq!(again.as_str(), access.as_str());
    assert_eq!(realms.len(), 1);
    assert_eq!(
        client
            .token_storage()
            .retrieve_refresh_token()
            .await
            .unwrap()
            .map(|t| t.to_string()),
        Some(refresh.to_string())
    );
    assert!(cache.calls().is_empty());
    assert!(cache.inner.is_empty().await);
}

#[test]
fn test_client_builds_even_when_cache_backend_is_down() {
    let container = registered(&test_config(false), Arc::new(FailingCacheStore));
    assert!(container.make::<KeycloakClient>().is_ok());

    let container = registered(&test_config(true), Arc::new(FailingCacheStore));
    assert!(container.make::<KeycloakClient>().is_ok());
}

#[test]
fn test_missing_required_config_fails_resolution() {
    for missing in ["base_url", "username", "password"] {
        let mut config = test_config(true);
        match missing {
            "base_url" => config.base_url = None,
            "username" => config.username = None,
            _ => config.password = None,
        }
        let container = registered(&config, Arc::new(InMemoryCacheStore::new()));

        let source = match container.make::<KeycloakClient>() {
            Err(ContainerError::Resolution { source, .. }) => source,
            other => panic!("expected a resolution error, got {other:?}"),
        };
        let admin_error = source
            .downcast_ref::<AdminError>()
            .expect("factory error should be an AdminError");
        assert!(
            matches!(admin_error, AdminError::MissingConfiguration { key } if key == missing),
            "unexpected error for {missing}: {admin_error}"
        );
    }
}

#[test]
fn test_invalid_base_url_still_constructs() {
    let config = KeycloakAdminConfig {
        base_url: Some("invalid-url".to_string()),
        ..test_config(false)
    };
    let container = registered(&config, Arc::new(InMemoryCacheStore::new()));

    let client = container.make::<KeycloakClient>().unwrap();
    assert_eq!(client.base_url(), "invalid-url");
}

#[test]
fn test_rebinding_config_and_forgetting_instance_rebuilds_client() {
    let container = registered(&test_config(true), Arc::new(InMemoryCacheStore::new()));
    let original = container.make::<KeycloakClient>().unwrap();

    container.instance(KeycloakAdminConfig {
        base_url: Some("http://other-server:8080".to_string()),
        ..test_config(true)
    });
    let still_cached = container.make::<KeycloakClient>().unwrap();
    assert!(Arc::ptr_eq(&original, &still_cached));

    container.forget_instance::<KeycloakClient>();
    let rebuilt = container.make::<KeycloakClient>().unwrap();
    assert!(!Arc::ptr_eq(&original, &rebuilt));
    assert_eq!(rebuilt.base_url(), "http://other-server:8080");
}

#[test]
fn test_facade_resolves_shared_instance() {
    let container = registered(&test_config(true), Arc::new(InMemoryCacheStore::new()));
    let client = container.make::<KeycloakClient>().unwrap();

    let facade = KeycloakAdminFacade::resolve(&container).unwrap();

    assert!(Arc::ptr_eq(facade.root(), &client));
    assert_eq!(facade.base_url(), "http://test-server:8080");
}

#[test]
fn test_facade_resolves_after_instance_is_forgotten() {
    let container = registered(&test_config(true), Arc::new(InMemoryCacheStore::new()));
    container.forget_instance::<KeycloakClient>();

    let facade = KeycloakAdminFacade::resolve(&container).unwrap();
    assert_eq!(facade.username(), "test-user");
}

#[test]
fn test_facade_requires_registration() {
    let container = Container::new();
    assert!(matches!(
        KeycloakAdminFacade::resolve(&container),
        Err(ContainerError::Unbound { .. })
    ));
}

#[test]
fn test_publish_config_writes_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let provider = KeycloakServiceProvider::new(&test_config(true), Arc::new(InMemoryCacheStore::new()));

    let outcome = provider.publish_config(dir.path(), false).unwrap();
    let target = dir.path().join("keycloak-admin.toml");
    assert_eq!(outcome, PublishOutcome::Written(target.clone()));

    let published = KeycloakAdminConfig::load_file(&target).unwrap();
    assert_eq!(published, KeycloakAdminConfig::default());

    std::fs::write(&target, "base_url = \"http://edited:8080\"\n").unwrap();
    let outcome = provider.publish_config(dir.path(), false).unwrap();
    assert_eq!(outcome, PublishOutcome::Skipped(target.clone()));
    assert_eq!(
        KeycloakAdminConfig::load_file(&target).unwrap().base_url.as_deref(),
        Some("http://edited:8080")
    );

    let outcome = provider.publish_config(dir.path(), true).unwrap();
    assert_eq!(outcome, PublishOutcome::Written(target.clone()));
    assert_eq!(KeycloakAdminConfig::load_file(&target).unwrap(), KeycloakAdminConfig::default());
}

#[test]
fn test_from_config_picks_file_cache_when_path_is_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = KeycloakAdminConfig {
        cache_path: Some(dir.path().join("tokens.json")),
        ..test_config(true)
    };

    let provider = KeycloakServiceProvider::from_config(&config);
    let container = Container::new();
    provider.register(&container);

    assert!(container.make::<KeycloakClient>().is_ok());
    assert_eq!(provider.config(), &config);
}

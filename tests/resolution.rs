//! Resolution tests against a mock remote store.

use pretty_assertions::assert_eq;

use storefront_config::cache::{LocalCache, CURRENT_STORE_KEY, STORES_KEY, STORE_CONFIG_KEY};
use storefront_config::catalog::{builtin_config, validate_catalog, Size, StoreConfig};
use storefront_config::tenant::TenantCoordinates;
use storefront_config::{ConfigSource, StoreContext};

mod common;

fn remote_config() -> StoreConfig {
    let mut config = builtin_config();
    config.store_info.name = "Remote Shop".into();
    config.discounts.discount_per_item = 250;
    config
}

fn cached_config() -> StoreConfig {
    let mut config = builtin_config();
    config.store_info.name = "Cached Shop".into();
    config.available_sizes = vec![Size::Small, Size::Medium, Size::Large];
    config
}

/// Context with the mock's tenant selected.
fn tenant_context(mock: &common::MockStore, cache: LocalCache) -> StoreContext {
    let context = StoreContext::with_cache(mock.settings(), cache).unwrap();
    context
        .registry()
        .set_coordinates("shop-1", TenantCoordinates::new(common::OWNER, common::REPO))
        .unwrap();
    context.registry().set_active("shop-1").unwrap();
    context
}

#[tokio::test]
async fn test_remote_config_wins_over_cache() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());

    let cache = LocalCache::in_memory();
    cache.set(STORE_CONFIG_KEY, &cached_config()).unwrap();
    let context = tenant_context(&mock, cache.clone());

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Remote);
    assert_eq!(*resolution.config, remote_config());
    assert_eq!(*context.current().unwrap(), remote_config());

    mock.with_repo(|repo| {
        assert_eq!(repo.last_raw_path.as_deref(), Some("acme/shop/main"));
        assert!(repo.last_cache_buster.is_some(), "Read should be cache-busted");
    });

    // Successful remote reads replace the fallback copy.
    assert_eq!(
        cache.get::<StoreConfig>(STORE_CONFIG_KEY).unwrap(),
        Some(remote_config())
    );
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_cache() {
    let mock = common::start_mock_store().await;

    let cache = LocalCache::in_memory();
    cache.set(STORE_CONFIG_KEY, &cached_config()).unwrap();
    let context = tenant_context(&mock, cache);

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Cache);
    assert_eq!(*resolution.config, cached_config());
}

#[tokio::test]
async fn test_nothing_available_uses_consistent_defaults() {
    let mock = common::start_mock_store().await;
    let context = tenant_context(&mock, LocalCache::in_memory());

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Default);
    assert!(validate_catalog(&resolution.config).is_ok());
}

#[tokio::test]
async fn test_malformed_remote_is_rejected() {
    let mock = common::start_mock_store().await;
    mock.seed_raw(r#"{"PRODUCTS": 5}"#);

    let cache = LocalCache::in_memory();
    cache.set(STORE_CONFIG_KEY, &cached_config()).unwrap();
    let context = tenant_context(&mock, cache);

    let resolution = context.resolver().resolve().await;
    assert_eq!(resolution.source, ConfigSource::Cache);
    // Not retried: a bad document will not get better.
    mock.with_repo(|repo| assert_eq!(repo.raw_reads, 1));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());
    mock.with_repo(|repo| repo.fail_reads = 1);
    let context = tenant_context(&mock, LocalCache::in_memory());

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Remote);
    mock.with_repo(|repo| assert_eq!(repo.raw_reads, 2));
}

#[tokio::test]
async fn test_no_tenant_reads_default_endpoint() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());
    let context = StoreContext::with_cache(mock.settings(), LocalCache::in_memory()).unwrap();

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Remote);
    mock.with_repo(|repo| {
        assert_eq!(repo.last_raw_path.as_deref(), Some("default/repo/main"));
    });
}

#[tokio::test]
async fn test_inconsistent_remote_catalog_is_repaired() {
    let mut config = remote_config();
    config.available_sizes = vec![Size::Small, Size::Medium];
    let mock = common::start_mock_store().await;
    mock.seed(&config);
    let context = tenant_context(&mock, LocalCache::in_memory());

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Remote);
    assert!(validate_catalog(&resolution.config).is_ok());
    assert_eq!(
        resolution.config.products["1"].available_sizes,
        vec![Size::Small, Size::Medium]
    );
}

#[tokio::test]
async fn test_load_with_explicit_coordinates() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());
    let context = StoreContext::with_cache(mock.settings(), LocalCache::in_memory()).unwrap();

    let coords = TenantCoordinates::new("other", "store").with_branch("preview");
    let resolution = context.resolver().load_remote_with(&coords).await.unwrap();

    assert_eq!(*resolution.config, remote_config());
    mock.with_repo(|repo| {
        assert_eq!(repo.last_raw_path.as_deref(), Some("other/store/preview"));
    });
}

#[tokio::test]
async fn test_load_with_explicit_coordinates_reports_failure() {
    let mock = common::start_mock_store().await;
    let context = StoreContext::with_cache(mock.settings(), LocalCache::in_memory()).unwrap();

    let result = context
        .resolver()
        .load_remote_with(&mock.coordinates())
        .await;

    assert!(result.is_err());
    assert!(context.current().is_none());
}

#[tokio::test]
async fn test_bad_sibling_entry_keeps_active_tenant() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());

    let cache = LocalCache::in_memory();
    cache
        .set_raw(
            STORES_KEY,
            r#"{
                "shop-1": {"github": {"username": "acme", "repo": "shop", "token": "test-token"}},
                "shop-2": {"config": {"PRODUCTS": {}, "AVAILABLE_SIZES": ["4XL"]}}
            }"#
            .into(),
        )
        .unwrap();
    cache.set_raw(CURRENT_STORE_KEY, "shop-1".into()).unwrap();
    let context = StoreContext::with_cache(mock.settings(), cache).unwrap();

    let resolution = context.resolver().resolve().await;
    assert_eq!(resolution.source, ConfigSource::Remote);
    mock.with_repo(|repo| {
        assert_eq!(repo.raw_paths, vec!["acme/shop/main".to_string()]);
    });

    let mut edited = remote_config();
    edited.store_info.name = "Edited".into();
    context.resolver().publish(edited.clone()).await.unwrap();
    assert_eq!(mock.stored(), Some(edited));
}

#[tokio::test]
async fn test_unreadable_active_tenant_skips_remote() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());

    let cache = LocalCache::in_memory();
    cache
        .set_raw(STORES_KEY, r#"{"shop-1": {"github": "acme/shop"}}"#.into())
        .unwrap();
    cache.set_raw(CURRENT_STORE_KEY, "shop-1".into()).unwrap();
    cache.set(STORE_CONFIG_KEY, &cached_config()).unwrap();
    let context = StoreContext::with_cache(mock.settings(), cache).unwrap();

    let resolution = context.resolver().resolve().await;

    assert_eq!(resolution.source, ConfigSource::Cache);
    assert_eq!(*resolution.config, cached_config());
    mock.with_repo(|repo| assert_eq!(repo.raw_reads, 0));
}

#[tokio::test]
async fn test_explicit_load_does_not_stand_in_for_resolution() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());
    let context = tenant_context(&mock, LocalCache::in_memory());
    let resolver = context.resolver();

    let preview = TenantCoordinates::new("other", "store").with_branch("preview");
    let (loaded, resolution) = tokio::join!(resolver.load_remote_with(&preview), resolver.resolve());

    assert!(loaded.is_ok());
    assert_eq!(resolution.source, ConfigSource::Remote);
    mock.with_repo(|repo| {
        assert_eq!(repo.raw_reads, 2);
        assert!(repo.raw_paths.contains(&"acme/shop/main".to_string()));
        assert!(repo.raw_paths.contains(&"other/store/preview".to_string()));
    });
}

#[tokio::test]
async fn test_resolve_after_save_runs_its_own_pass() {
    let mock = common::start_mock_store().await;
    mock.seed(&remote_config());
    let context = tenant_context(&mock, LocalCache::in_memory());
    let resolver = context.resolver();

    let saved = resolver.save_local(cached_config()).unwrap();
    let resolution = resolver.resolve().await;

    assert!(resolution.generation > saved.generation);
    assert_eq!(resolution.source, ConfigSource::Remote);
    mock.with_repo(|repo| assert_eq!(repo.raw_reads, 1));
}

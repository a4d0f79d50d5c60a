//! Image link consistency repair.
//!
//! Product images are stored as absolute URLs into the tenant's repository.
//! When a tenant moves to another repository or branch those links keep
//! pointing at the old location; this module finds and rewrites them.
//!
//! Detection is a warning signal only and is never applied automatically.

use crate::cache::{CacheResult, LocalCache};
use crate::catalog::StoreConfig;
use crate::observability::metrics;
use crate::tenant::{CachedTenantRegistry, TenantCoordinates, TenantRegistry};

/// Directory under the branch root that holds product images.
pub const IMAGES_DIR: &str = "images";

/// Product images that do not live under the tenant's `/{owner}/{repo}/`.
///
/// Empty when the coordinates are not configured.
pub fn mismatched_images<'a>(
    config: &'a StoreConfig,
    coords: &TenantCoordinates,
) -> Vec<(&'a str, &'a str)> {
    if !coords.is_configured() {
        return Vec::new();
    }
    let marker = format!("/{}/", coords.namespace());
    config
        .image_refs()
        .filter(|(_, image)| !image.contains(&marker))
        .collect()
}

/// Whether any product image points outside the tenant's repository.
pub fn detect_mismatch(config: &StoreConfig, coords: &TenantCoordinates) -> bool {
    !mismatched_images(config, coords).is_empty()
}

/// Final path segment of an image reference, without query or fragment.
pub fn image_filename(reference: &str) -> &str {
    let path = reference.split(['?', '#']).next().unwrap_or(reference);
    path.rsplit('/').next().unwrap_or(path)
}

/// Rebuild every product image as
/// `{host}/{owner}/{repo}/{branch}/images/{filename}`.
///
/// Returns the rewritten config and how many links changed, or `None` when
/// the coordinates are not configured.
pub fn rewrite_image_links(
    config: &StoreConfig,
    coords: &TenantCoordinates,
    default_host: &str,
) -> Option<(StoreConfig, usize)> {
    if !coords.is_configured() {
        return None;
    }

    let base = format!(
        "{}/{}/{}/{}",
        coords.raw_host(default_host),
        coords.namespace(),
        coords.branch(),
        IMAGES_DIR
    );

    let mut rewritten = config.clone();
    let mut changed = 0;
    for product in rewritten.products.values_mut() {
        let filename = image_filename(&product.image);
        if filename.is_empty() {
            continue;
        }
        let link = format!("{}/{}", base, filename);
        if link != product.image {
            product.image = link;
            changed += 1;
        }
    }
    Some((rewritten, changed))
}

/// Repair operations against the tenant entries in the local cache.
#[derive(Clone)]
pub struct ConsistencyRepair {
    registry: CachedTenantRegistry,
    default_host: String,
}

impl ConsistencyRepair {
    pub fn new(cache: LocalCache, default_host: impl Into<String>) -> Self {
        Self {
            registry: CachedTenantRegistry::new(cache),
            default_host: default_host.into(),
        }
    }

    /// Rewrite `config`'s image links for `coords` and stage the result as
    /// `tenant`'s configuration.
    ///
    /// `Ok(None)` (nothing persisted) when the coordinates are not configured.
    pub fn rewrite_image_links(
        &self,
        tenant: &str,
        config: &StoreConfig,
        coords: &TenantCoordinates,
    ) -> CacheResult<Option<StoreConfig>> {
        let Some((rewritten, changed)) = rewrite_image_links(config, coords, &self.default_host)
        else {
            tracing::debug!(tenant = %tenant, "No remote coordinates, skipping image repair");
            return Ok(None);
        };

        self.registry.stage_config(tenant, &rewritten)?;
        metrics::record_images_rewritten(changed);
        tracing::info!(
            tenant = %tenant,
            namespace = %coords.namespace(),
            changed,
            "Image links corrected"
        );
        Ok(Some(rewritten))
    }

    /// Whether the active tenant's staged config has foreign image links.
    pub fn check_active_tenant(&self) -> CacheResult<bool> {
        let Some((tenant, config, coords)) = self.active_entry()? else {
            return Ok(false);
        };

        let mismatched = mismatched_images(&config, &coords);
        if mismatched.is_empty() {
            return Ok(false);
        }
        tracing::warn!(
            tenant = %tenant,
            count = mismatched.len(),
            namespace = %coords.namespace(),
            "Images reference a different repository"
        );
        Ok(true)
    }

    /// Rewrite the active tenant's staged config. Returns whether anything
    /// was persisted.
    pub fn repair_active_tenant(&self) -> CacheResult<bool> {
        let Some((tenant, config, coords)) = self.active_entry()? else {
            return Ok(false);
        };
        Ok(self.rewrite_image_links(&tenant, &config, &coords)?.is_some())
    }

    fn active_entry(&self) -> CacheResult<Option<(String, StoreConfig, TenantCoordinates)>> {
        let Some(tenant) = self.registry.active_tenant() else {
            return Ok(None);
        };
        let Some(entry) = self.registry.entry(&tenant)? else {
            return Ok(None);
        };
        match (entry.config, entry.github) {
            (Some(config), Some(coords)) => Ok(Some((tenant, config, coords))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_config;

    const HOST: &str = "https://host";

    fn config_with_image(image: &str) -> StoreConfig {
        let mut config = builtin_config();
        for product in config.products.values_mut() {
            product.image = image.to_string();
        }
        config
    }

    #[test]
    fn test_rewrite_to_new_coordinates() {
        let config = config_with_image("https://host/old-owner/old-ns/old-branch/images/shirt.png");
        let coords = TenantCoordinates::new("acme", "new-ns").with_branch("main");

        let (rewritten, changed) = rewrite_image_links(&config, &coords, HOST).unwrap();
        assert_eq!(changed, 1);
        assert_eq!(
            rewritten.products["1"].image,
            "https://host/acme/new-ns/main/images/shirt.png"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let config = config_with_image("https://elsewhere/x/y/z/shirt.png?raw=1");
        let coords = TenantCoordinates::new("acme", "shop");
        let (once, _) = rewrite_image_links(&config, &coords, HOST).unwrap();
        let (twice, changed) = rewrite_image_links(&once, &coords, HOST).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(once, twice);
        assert_eq!(twice.products["1"].image, "https://host/acme/shop/main/images/shirt.png");
    }

    #[test]
    fn test_rewrite_requires_coordinates() {
        let config = builtin_config();
        assert!(rewrite_image_links(&config, &TenantCoordinates::default(), HOST).is_none());
    }

    #[test]
    fn test_empty_image_untouched() {
        let config = config_with_image("");
        let coords = TenantCoordinates::new("acme", "shop");
        let (rewritten, changed) = rewrite_image_links(&config, &coords, HOST).unwrap();
        assert_eq!(changed, 0);
        assert!(rewritten.products["1"].image.is_empty());
    }

    #[test]
    fn test_detect_mismatch() {
        let coords = TenantCoordinates::new("acme", "shop");
        let foreign = config_with_image("https://host/other/repo/main/images/a.jpg");
        let own = config_with_image("https://host/acme/shop/dev/images/a.jpg");

        assert!(detect_mismatch(&foreign, &coords));
        assert!(!detect_mismatch(&own, &coords));
        assert!(!detect_mismatch(&foreign, &TenantCoordinates::default()));
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename("https://h/a/b/c.png"), "c.png");
        assert_eq!(image_filename("https://h/a/c.png?x=1#y"), "c.png");
        assert_eq!(image_filename("plain.jpg"), "plain.jpg");
        assert_eq!(image_filename("https://h/a/"), "");
    }

    #[test]
    fn test_repair_active_tenant_persists() {
        let cache = LocalCache::in_memory();
        let registry = CachedTenantRegistry::new(cache.clone());
        registry
            .set_coordinates("shop-1", TenantCoordinates::new("acme", "shop"))
            .unwrap();
        registry
            .stage_config("shop-1", &config_with_image("https://host/old/repo/main/images/a.jpg"))
            .unwrap();
        registry.set_active("shop-1").unwrap();

        let repair = ConsistencyRepair::new(cache, HOST);
        assert!(repair.check_active_tenant().unwrap());
        assert!(repair.repair_active_tenant().unwrap());
        assert!(!repair.check_active_tenant().unwrap());

        let entry = registry.entry("shop-1").unwrap().unwrap();
        assert_eq!(
            entry.config.unwrap().products["1"].image,
            "https://host/acme/shop/main/images/a.jpg"
        );
    }

    #[test]
    fn test_repair_without_active_tenant() {
        let repair = ConsistencyRepair::new(LocalCache::in_memory(), HOST);
        assert!(!repair.check_active_tenant().unwrap());
        assert!(!repair.repair_active_tenant().unwrap());
    }
}

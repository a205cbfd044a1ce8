//! Read-only catalog and CMS content, cached.
//!
//! Everything here is owned by the backend and never mutated by the client.
//! Responses are cached for the configured TTL.

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::models::{BlogPost, Page, Product, ProductCategory};

use cache::{CacheKey, CacheValue};

/// Cached catalog access.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    backend: Arc<dyn StorefrontBackend>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("cached_entries", &self.inner.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Create a catalog whose entries live for `ttl`.
    #[must_use]
    pub fn new(backend: Arc<dyn StorefrontBackend>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(CatalogInner { backend, cache }),
        }
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products = self.inner.backend.products().await?;
        self.store(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Featured products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.cached(&CacheKey::FeaturedProducts).await
        {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let products = self.inner.backend.featured_products().await?;
        self.store(
            CacheKey::FeaturedProducts,
            CacheValue::Products(products.clone()),
        )
        .await;
        Ok(products)
    }

    /// A product by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product(&self, slug: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product = self.inner.backend.product(slug).await?;
        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// All product categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<ProductCategory>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories = self.inner.backend.categories().await?;
        self.store(
            CacheKey::Categories,
            CacheValue::Categories(categories.clone()),
        )
        .await;
        Ok(categories)
    }

    /// Products of the category with `slug`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn category_products(&self, slug: &str) -> Result<Vec<Product>, ApiError> {
        let key = CacheKey::CategoryProducts(slug.to_string());
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            debug!("Cache hit for category products");
            return Ok(products);
        }

        let products = self.inner.backend.category_products(slug).await?;
        self.store(key, CacheValue::Products(products.clone())).await;
        Ok(products)
    }

    /// All blog posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn blog_posts(&self) -> Result<Vec<BlogPost>, ApiError> {
        if let Some(CacheValue::BlogPosts(posts)) = self.cached(&CacheKey::BlogPosts).await {
            debug!("Cache hit for blog posts");
            return Ok(posts);
        }

        let posts = self.inner.backend.blog_posts().await?;
        self.store(CacheKey::BlogPosts, CacheValue::BlogPosts(posts.clone()))
            .await;
        Ok(posts)
    }

    /// A blog post by numeric id or slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the post is not found or the API request fails.
    #[instrument(skip(self), fields(id_or_slug = %id_or_slug))]
    pub async fn blog_post(&self, id_or_slug: &str) -> Result<BlogPost, ApiError> {
        let key = CacheKey::BlogPost(id_or_slug.to_string());
        if let Some(CacheValue::BlogPost(post)) = self.cached(&key).await {
            debug!("Cache hit for blog post");
            return Ok(*post);
        }

        let post = self.inner.backend.blog_post(id_or_slug).await?;
        self.store(key, CacheValue::BlogPost(Box::new(post.clone())))
            .await;
        Ok(post)
    }

    /// CMS pages; only those flagged featured when `featured` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn pages(&self, featured: bool) -> Result<Vec<Page>, ApiError> {
        let key = CacheKey::Pages { featured };
        if let Some(CacheValue::Pages(pages)) = self.cached(&key).await {
            debug!("Cache hit for pages");
            return Ok(pages);
        }

        let pages = self.inner.backend.pages(featured).await?;
        self.store(key, CacheValue::Pages(pages.clone())).await;
        Ok(pages)
    }

    /// A CMS page by slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the page is not found or the API request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn page(&self, slug: &str) -> Result<Page, ApiError> {
        let key = CacheKey::Page(slug.to_string());
        if let Some(CacheValue::Page(page)) = self.cached(&key).await {
            debug!("Cache hit for page");
            return Ok(*page);
        }

        let page = self.inner.backend.page(slug).await?;
        self.store(key, CacheValue::Page(Box::new(page.clone())))
            .await;
        Ok(page)
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        self.inner.cache.get(key).await
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        self.inner.cache.insert(key, value).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::backend::MockStorefrontBackend;
    use crate::models::catalog::tests::{category, product};

    fn catalog(backend: MockStorefrontBackend) -> Catalog {
        Catalog::new(Arc::new(backend), Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_products_are_fetched_once() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_products()
            .times(1)
            .returning(|| Ok(vec![product(1, "9.99"), product(2, "4.50")]));

        let catalog = catalog(backend);
        assert_eq!(catalog.products().await.unwrap().len(), 2);
        assert_eq!(catalog.products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_keyed_lookups_are_cached_per_key() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_product()
            .withf(|slug| slug == "product-1")
            .times(1)
            .returning(|_| Ok(product(1, "9.99")));
        backend
            .expect_product()
            .withf(|slug| slug == "product-2")
            .times(1)
            .returning(|_| Ok(product(2, "4.50")));

        let catalog = catalog(backend);
        for _ in 0..2 {
            assert_eq!(catalog.product("product-1").await.unwrap().id.as_i64(), 1);
            assert_eq!(catalog.product("product-2").await.unwrap().id.as_i64(), 2);
        }
    }

    #[tokio::test]
    async fn test_featured_and_all_pages_are_separate_entries() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_pages()
            .times(2)
            .returning(|_| Ok(Vec::new()));

        let catalog = catalog(backend);
        catalog.pages(false).await.unwrap();
        catalog.pages(true).await.unwrap();
        catalog.pages(true).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_refetch() {
        let mut backend = MockStorefrontBackend::new();
        backend
            .expect_categories()
            .times(2)
            .returning(|| Ok(vec![category(3, "gaming-merch")]));

        let catalog = catalog(backend);
        catalog.categories().await.unwrap();
        catalog.invalidate_all();
        let categories = catalog.categories().await.unwrap();
        assert!(categories.first().unwrap().is_physical());
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let mut backend = MockStorefrontBackend::new();
        let mut calls = 0;
        backend.expect_blog_posts().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Rejected {
                    status: 429,
                    message: "Too Many Attempts.".to_string(),
                    field_errors: BTreeMap::new(),
                })
            } else {
                Ok(Vec::new())
            }
        });

        let catalog = catalog(backend);
        assert!(catalog.blog_posts().await.is_err());
        assert!(catalog.blog_posts().await.unwrap().is_empty());
    }
}

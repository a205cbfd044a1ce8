//! Cache types for catalog responses.

use crate::models::{BlogPost, Page, Product, ProductCategory};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    FeaturedProducts,
    Product(String),
    Categories,
    CategoryProducts(String),
    BlogPosts,
    BlogPost(String),
    Pages { featured: bool },
    Page(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
    Categories(Vec<ProductCategory>),
    BlogPosts(Vec<BlogPost>),
    BlogPost(Box<BlogPost>),
    Pages(Vec<Page>),
    Page(Box<Page>),
}

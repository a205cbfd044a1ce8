//! Catalog browsing commands.

use rahat_storefront::models::Product;
use rahat_storefront::{Storefront, StorefrontError};

/// List products: all, featured only, or one category.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
#[allow(clippy::print_stdout)]
pub async fn products(
    storefront: &Storefront,
    featured: bool,
    category: Option<&str>,
) -> Result<(), StorefrontError> {
    let catalog = storefront.catalog();
    let products = match category {
        Some(slug) => catalog.category_products(slug).await?,
        None if featured => catalog.featured_products().await?,
        None => catalog.products().await?,
    };

    for product in products.iter().filter(|p| p.is_active) {
        println!("{}", product_line(storefront, product));
    }
    tracing::info!(count = products.len(), "Listed products");
    Ok(())
}

/// Show one product in full.
///
/// # Errors
///
/// Returns an error if the product does not exist or the request fails.
#[allow(clippy::print_stdout)]
pub async fn product(storefront: &Storefront, slug: &str) -> Result<(), StorefrontError> {
    let product = storefront.catalog().product(slug).await?;
    let language = storefront.language();

    println!("{}", product_line(storefront, &product));
    if let Some(category) = &product.product_category {
        println!("  category: {}", category.name(language));
    }
    println!("  image:    {}", storefront.media_url(product.thumbnail.as_deref()));
    let description = product.description(language);
    if !description.is_empty() {
        println!();
        println!("{description}");
    }
    Ok(())
}

/// List product categories.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
#[allow(clippy::print_stdout)]
pub async fn categories(storefront: &Storefront) -> Result<(), StorefrontError> {
    let language = storefront.language();
    for category in storefront.catalog().categories().await? {
        let delivery = if category.is_physical() { "physical" } else { "digital" };
        println!("{:<24} {:<10} {}", category.slug, delivery, category.name(language));
    }
    Ok(())
}

/// List CMS pages.
///
/// # Errors
///
/// Returns an error if the request fails.
#[allow(clippy::print_stdout)]
pub async fn pages(storefront: &Storefront, featured: bool) -> Result<(), StorefrontError> {
    for page in storefront.catalog().pages(featured).await? {
        println!("{:<24} {}", page.slug, page.title);
    }
    Ok(())
}

/// Print one CMS page.
///
/// # Errors
///
/// Returns an error if the page does not exist or the request fails.
#[allow(clippy::print_stdout)]
pub async fn page(storefront: &Storefront, slug: &str) -> Result<(), StorefrontError> {
    let page = storefront.catalog().page(slug).await?;
    println!("{}", page.title);
    println!();
    println!("{}", page.content);
    Ok(())
}

/// List active blog posts.
///
/// # Errors
///
/// Returns an error if the request fails.
#[allow(clippy::print_stdout)]
pub async fn blog(storefront: &Storefront) -> Result<(), StorefrontError> {
    let language = storefront.language();
    for post in storefront.catalog().blog_posts().await?.iter().filter(|p| p.is_active) {
        let date = post
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!("{:<10} {:<32} {}", date, post.slug, post.title(language));
    }
    Ok(())
}

/// Print one blog post.
///
/// # Errors
///
/// Returns an error if the post does not exist or the request fails.
#[allow(clippy::print_stdout)]
pub async fn post(storefront: &Storefront, id_or_slug: &str) -> Result<(), StorefrontError> {
    let post = storefront.catalog().blog_post(id_or_slug).await?;
    let language = storefront.language();
    let description = if language == rahat_core::Language::Fa && !post.fa_description.is_empty() {
        &post.fa_description
    } else {
        &post.en_description
    };

    println!("{}", post.title(language));
    println!();
    println!("{description}");
    Ok(())
}

fn product_line(storefront: &Storefront, product: &Product) -> String {
    let price = match product.discount_percent() {
        Some(percent) => format!(
            "{} (-{percent}%, was {})",
            storefront.display_price(product.sale_price()),
            storefront.display_price(product.price)
        ),
        None => storefront.display_price(product.price),
    };
    format!(
        "{:<28} {:<16} {}",
        product.slug,
        price,
        product.name(storefront.language())
    )
}

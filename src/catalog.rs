//! Catalog store: products and categories, backed by the spreadsheet.
//!
//! The catalog keeps a local snapshot of both lists and re-fetches after
//! every mutation instead of patching locally, so the snapshot only ever
//! contains what the remote store acknowledged. The `Semua` category is a
//! synthetic wildcard: always present, never deletable, never a real
//! filter value in storage.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::{PosError, Result};
use crate::models::{NewProduct, Product};
use crate::remote::RemoteStore;

/// The synthetic match-everything category.
pub const WILDCARD_CATEGORY: &str = "Semua";

/// Seed category list used until the first successful fetch.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    WILDCARD_CATEGORY,
    "Makanan",
    "Minuman",
    "Retail",
    "Jasa",
    "Lainnya",
];

pub struct Catalog {
    store: Arc<dyn RemoteStore>,
    products: Vec<Product>,
    categories: Vec<String>,
}

impl Catalog {
    /// Create a catalog seeded with the default categories and no products.
    /// Call [`Catalog::refresh`] to load the remote state.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Catalog {
            store,
            products: Vec::new(),
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Snapshot access
    // -----------------------------------------------------------------------

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Ordered, deduplicated category list, wildcard first.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Products matching a category tab and a search box. The wildcard
    /// category matches everything; the search is a case-insensitive
    /// substring match on the product name.
    pub fn filtered(&self, category: &str, search: &str) -> Vec<&Product> {
        let needle = search.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| category == WILDCARD_CATEGORY || p.category == category)
            .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Re-fetch categories and products from the spreadsheet.
    ///
    /// A category fetch failure keeps the last-known list (the seeded
    /// defaults on a fresh catalog) so the sales screen stays usable; a
    /// product fetch failure propagates, since selling against an unknown
    /// product list would be worse than showing an error.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.fetch_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => warn!(error = %e, "category fetch failed, keeping last-known list"),
        }
        self.refresh_products().await
    }

    async fn fetch_categories(&self) -> Result<Vec<String>> {
        let resp = self
            .store
            .call("getCategories", Value::Null)
            .await?
            .into_success()?;
        let raw: Vec<String> = resp.data_as()?;
        Ok(normalize_categories(raw))
    }

    async fn refresh_products(&mut self) -> Result<()> {
        let resp = self
            .store
            .call("getProducts", Value::Null)
            .await?
            .into_success()?;
        self.products = resp.data_as()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Product mutations
    // -----------------------------------------------------------------------

    /// Insert or update a product, then re-fetch the product list.
    ///
    /// The product's category must be a real (non-wildcard) member of the
    /// current category set.
    pub async fn save_product(&mut self, product: Product) -> Result<()> {
        if product.category == WILDCARD_CATEGORY {
            return Err(PosError::ReservedCategory(product.category));
        }
        if !self.categories.contains(&product.category) {
            return Err(PosError::UnknownCategory(product.category));
        }
        self.store
            .call("saveProduct", json!({ "product": &product }))
            .await?
            .into_success()?;
        info!(product_id = %product.id, "product saved");
        self.refresh_products().await
    }

    /// Delete a product by id, then re-fetch the product list.
    pub async fn delete_product(&mut self, id: &str) -> Result<()> {
        self.store
            .call("deleteProduct", json!({ "id": id }))
            .await?
            .into_success()?;
        info!(product_id = %id, "product deleted");
        self.refresh_products().await
    }

    /// Add a batch of products in one action, assigning fresh ids
    /// client-side. Returns the number of products sent. Categories are
    /// taken as-is: bulk rows may introduce names outside the category set.
    pub async fn add_products_bulk(&mut self, rows: Vec<NewProduct>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        let products: Vec<Product> = rows
            .into_iter()
            .map(NewProduct::with_generated_id)
            .collect();
        let count = products.len();
        self.store
            .call("addProductsBulk", json!({ "products": products }))
            .await?
            .into_success()?;
        info!(count, "bulk product add committed");
        self.refresh_products().await?;
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Category mutations
    // -----------------------------------------------------------------------

    /// Add a category. Blank names and existing names (including the
    /// wildcard) are a local no-op; no remote call is made for them.
    pub async fn add_category(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() || self.categories.iter().any(|c| c == name) {
            return Ok(());
        }
        self.store
            .call("addCategory", json!({ "category": name }))
            .await?
            .into_success()?;
        info!(category = %name, "category added");
        self.refresh_categories_after_mutation().await
    }

    /// Delete a category. The wildcard is rejected locally.
    pub async fn delete_category(&mut self, name: &str) -> Result<()> {
        if name == WILDCARD_CATEGORY {
            return Err(PosError::ReservedCategory(name.to_string()));
        }
        self.store
            .call("deleteCategory", json!({ "category": name }))
            .await?
            .into_success()?;
        info!(category = %name, "category deleted");
        self.refresh_categories_after_mutation().await
    }

    /// After a committed category mutation the re-fetch is authoritative;
    /// a failure here propagates so the caller knows the snapshot is stale.
    async fn refresh_categories_after_mutation(&mut self) -> Result<()> {
        self.categories = self.fetch_categories().await?;
        Ok(())
    }
}

/// Deduplicate while preserving first-seen order, and force the wildcard
/// to exist and sit first.
fn normalize_categories(raw: Vec<String>) -> Vec<String> {
    let mut categories = vec![WILDCARD_CATEGORY.to_string()];
    for name in raw {
        let name = name.trim().to_string();
        if name.is_empty() || categories.contains(&name) {
            continue;
        }
        categories.push(name);
    }
    categories
}

// ===========================================================================
// Tests
// ===========================================================================

//! Product and review data loading.
//!
//! The data files are read once at startup into an immutable [`Snapshot`].
//! [`Catalog`] hands out shared references to the current snapshot and
//! replaces it wholesale on an explicit reload.

use crate::error::{AppError, AppResult};
use crate::models::{Product, Review, MAX_RATING, MIN_RATING};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Immutable view of the product and review data.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
}

impl Snapshot {
    /// Build a snapshot from in-memory records, validating them the same
    /// way file loading does.
    #[cfg(test)]
    pub fn new(products: Vec<Product>, reviews: Vec<Review>) -> AppResult<Self> {
        validate_products(&products, "products")?;
        validate_reviews(&reviews, "reviews")?;
        Ok(Self { products, reviews })
    }

    /// Read and validate both data files.
    pub fn load(products_path: &Path, reviews_path: &Path) -> AppResult<Self> {
        let products: Vec<Product> = load_json_file(products_path)?;
        let reviews: Vec<Review> = load_json_file(reviews_path)?;

        let source = products_path.display().to_string();
        validate_products(&products, &source)?;
        let source = reviews_path.display().to_string();
        validate_reviews(&reviews, &source)?;

        info!(
            "Loaded {} products and {} reviews",
            products.len(),
            reviews.len()
        );

        Ok(Self { products, reviews })
    }

    /// Find a product by id.
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    /// Reviews for a product, in file order.
    pub fn reviews_for<'a>(&'a self, product_id: &'a str) -> impl Iterator<Item = &'a Review> + 'a {
        self.reviews.iter().filter(move |r| r.product_id == product_id)
    }
}

/// Shared holder of the current snapshot.
pub struct Catalog {
    products_path: PathBuf,
    reviews_path: PathBuf,
    current: RwLock<Arc<Snapshot>>,
}

impl Catalog {
    /// Load the data files and wrap them in a catalog.
    pub fn open(products_path: PathBuf, reviews_path: PathBuf) -> AppResult<Self> {
        let snapshot = Snapshot::load(&products_path, &reviews_path)?;
        Ok(Self {
            products_path,
            reviews_path,
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Wrap an already-built snapshot.
    #[cfg(test)]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            products_path: PathBuf::new(),
            reviews_path: PathBuf::new(),
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot current at the time of the call.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Re-read both data files and swap them in.
    ///
    /// The previous snapshot stays in place if loading fails.
    pub async fn reload(&self) -> AppResult<Arc<Snapshot>> {
        if self.products_path.as_os_str().is_empty() {
            return Err(AppError::Configuration(
                "catalog was not opened from files and cannot be reloaded".to_string(),
            ));
        }

        let snapshot = match Snapshot::load(&self.products_path, &self.reviews_path) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!("Reload failed, keeping previous data: {}", e);
                return Err(e);
            }
        };

        *self.current.write().await = snapshot.clone();
        info!("Catalog reloaded");
        Ok(snapshot)
    }

    pub fn products_path(&self) -> &Path {
        &self.products_path
    }

    pub fn reviews_path(&self) -> &Path {
        &self.reviews_path
    }
}

/// Read a JSON array from disk.
///
/// A missing or unreadable file is a configuration error; a file that
/// does not parse is malformed data.
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    debug!("Reading {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("failed to read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::malformed(path.display().to_string(), e.to_string()))
}

fn validate_products(products: &[Product], source: &str) -> AppResult<()> {
    let mut seen = HashSet::new();
    for (index, product) in products.iter().enumerate() {
        if product.product_id.trim().is_empty() {
            return Err(AppError::malformed(
                source,
                format!("product at index {} has an empty ProductId", index),
            ));
        }
        if product.product_id.trim() != product.product_id {
            return Err(AppError::malformed(
                source,
                format!(
                    "ProductId {:?} has leading or trailing whitespace",
                    product.product_id
                ),
            ));
        }
        if !seen.insert(product.product_id.as_str()) {
            return Err(AppError::malformed(
                source,
                format!("duplicate ProductId {:?}", product.product_id),
            ));
        }
    }
    Ok(())
}

fn validate_reviews(reviews: &[Review], source: &str) -> AppResult<()> {
    for (index, review) in reviews.iter().enumerate() {
        if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
            return Err(AppError::malformed(
                source,
                format!(
                    "review at index {} has rating {} outside {}..={}",
                    index, review.rating, MIN_RATING, MAX_RATING
                ),
            ));
        }
    }
    Ok(())
}

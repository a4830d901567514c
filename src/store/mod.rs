/// Product catalog read access
///
/// Provides the ProductStore trait and the row shapes each read path produces.
/// The catalog is owned by the store; this service never writes product rows.
/// The trait abstraction enables the cascade to run against mock backends in
/// tests — currently PostgreSQL in production.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::SearchError;

pub mod postgres;

/// A catalog row joined with its category and brand lookups, image already
/// reduced to the first element. Produced by the ID-lookup, full-text, and
/// popular-products queries.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub image_url: String,
    pub eco_rating: Option<f64>,
}

/// A full-text hit: joined row plus its `ts_rank_cd` match strength.
#[derive(Debug, Clone)]
pub struct RankedRow {
    pub product: ProductRow,
    pub rank: f64,
}

/// A bare catalog row from the substring fallback: no category join, image
/// array left raw for the normalizer to reduce.
#[derive(Debug, Clone)]
pub struct CatalogRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: Option<Vec<String>>,
    pub eco_rating: Option<f64>,
}

/// Read-only queries against the product catalog.
///
/// All implementations must be Send + Sync to support concurrent requests.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Keyed fetch of explicit identifiers, ordered by id descending
    /// (most recently created first).
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, SearchError>;

    /// Ranked full-text search against the precomputed search vector.
    ///
    /// Ordered by rank desc, then eco_rating desc (nulls last), then id desc.
    async fn fulltext(&self, query: &str, limit: i64) -> Result<Vec<RankedRow>, SearchError>;

    /// Case-insensitive substring match on name and description.
    ///
    /// Ordered by eco_rating desc (nulls last), then id desc.
    async fn substring(&self, query: &str, limit: i64) -> Result<Vec<CatalogRow>, SearchError>;

    /// Top products by eco rating, for the storefront landing strip.
    async fn popular(&self, limit: i64) -> Result<Vec<ProductRow>, SearchError>;

    /// Cheap connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), SearchError>;
}

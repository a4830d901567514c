/// PostgreSQL-backed implementation of ProductStore
///
/// Uses sqlx with PgPool for connection pooling. The full-text query relies on
/// the `unaccent` extension and a store-maintained `search_vector` column (see
/// migrations); the substring query needs nothing beyond the base table, which
/// is what makes it the always-available last resort.

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPool, PgPoolOptions, PgRow},
    Row,
};
use std::time::Duration;

use crate::errors::SearchError;
use crate::store::{CatalogRow, ProductRow, ProductStore, RankedRow};

/// PostgreSQL-backed product store using a sqlx connection pool.
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Connect to the catalog database at `database_url`.
    ///
    /// Configures a production-ready connection pool with sensible defaults.
    /// If run_migrations is true, automatically runs pending migrations on startup.
    pub async fn new(database_url: &str, run_migrations: bool) -> Result<Self, SearchError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await
            .map_err(|e| SearchError::Storage(format!("Failed to connect to database: {}", e)))?;

        if run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| SearchError::Storage(format!("Migration failed: {}", e)))?;
        }

        Ok(PostgresProductStore { pool })
    }
}

/// Map a joined catalog row to a ProductRow.
fn row_to_product(row: &PgRow) -> Result<ProductRow, SearchError> {
    Ok(ProductRow {
        id: row.try_get("id").map_err(|e| SearchError::Storage(e.to_string()))?,
        name: row.try_get("name").map_err(|e| SearchError::Storage(e.to_string()))?,
        description: row.try_get("description").map_err(|e| SearchError::Storage(e.to_string()))?,
        category: row.try_get("category").map_err(|e| SearchError::Storage(e.to_string()))?,
        brand: row.try_get("brand").map_err(|e| SearchError::Storage(e.to_string()))?,
        price: row.try_get("price").map_err(|e| SearchError::Storage(e.to_string()))?,
        image_url: row.try_get("image_url").map_err(|e| SearchError::Storage(e.to_string()))?,
        eco_rating: row.try_get("eco_rating").map_err(|e| SearchError::Storage(e.to_string()))?,
    })
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<ProductRow>, SearchError> {
        let rows = sqlx::query(
            "SELECT \
               p.id, \
               p.name, \
               COALESCE(p.description, '')  AS description, \
               COALESCE(c.name, '')         AS category, \
               COALESCE(b.name, '')         AS brand, \
               p.price::float8              AS price, \
               COALESCE(p.image_url[1], '') AS image_url, \
               p.eco_rating::float8         AS eco_rating \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands     b ON b.id = p.brand_id \
             WHERE p.id = ANY($1) \
             ORDER BY p.id DESC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SearchError::Storage(e.to_string()))?;

        rows.iter().map(row_to_product).collect()
    }

    async fn ping(&self) -> Result<(), SearchError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| SearchError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn fulltext(&self, query: &str, limit: i64) -> Result<Vec<RankedRow>, SearchError> {
        let rows = sqlx::query(
            "SELECT \
               p.id, \
               p.name, \
               COALESCE(p.description, '')  AS description, \
               COALESCE(c.name, '')         AS category, \
               COALESCE(b.name, '')         AS brand, \
               p.price::float8              AS price, \
               COALESCE(p.image_url[1], '') AS image_url, \
               p.eco_rating::float8         AS eco_rating, \
               ts_rank_cd(p.search_vector, plainto_tsquery('simple', unaccent($1)))::float8 AS score \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands     b ON b.id = p.brand_id \
             WHERE p.search_vector @@ plainto_tsquery('simple', unaccent($1)) \
             ORDER BY score DESC, p.eco_rating DESC NULLS LAST, p.id DESC \
             LIMIT $2",
        )
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SearchError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let rank: f64 = row
                    .try_get("score")
                    .map_err(|e| SearchError::Storage(e.to_string()))?;
                Ok(RankedRow {
                    product: row_to_product(row)?,
                    rank,
                })
            })
            .collect()
    }

    async fn substring(&self, query: &str, limit: i64) -> Result<Vec<CatalogRow>, SearchError> {
        let pattern = format!("%{}%", query);

        let rows = sqlx::query(
            "SELECT \
               p.id, \
               p.name, \
               COALESCE(p.description, '') AS description, \
               p.price::float8             AS price, \
               p.image_url, \
               p.eco_rating::float8        AS eco_rating \
             FROM products p \
             WHERE p.name ILIKE $1 OR p.description ILIKE $1 \
             ORDER BY p.eco_rating DESC NULLS LAST, p.id DESC \
             LIMIT $2",
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SearchError::Storage(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(CatalogRow {
                    id: row.try_get("id").map_err(|e| SearchError::Storage(e.to_string()))?,
                    name: row.try_get("name").map_err(|e| SearchError::Storage(e.to_string()))?,
                    description: row
                        .try_get("description")
                        .map_err(|e| SearchError::Storage(e.to_string()))?,
                    price: row.try_get("price").map_err(|e| SearchError::Storage(e.to_string()))?,
                    image_url: row
                        .try_get("image_url")
                        .map_err(|e| SearchError::Storage(e.to_string()))?,
                    eco_rating: row
                        .try_get("eco_rating")
                        .map_err(|e| SearchError::Storage(e.to_string()))?,
                })
            })
            .collect()
    }

    async fn popular(&self, limit: i64) -> Result<Vec<ProductRow>, SearchError> {
        let rows = sqlx::query(
            "SELECT \
               p.id, \
               p.name, \
               COALESCE(p.description, '')  AS description, \
               COALESCE(c.name, '')         AS category, \
               COALESCE(b.name, '')         AS brand, \
               p.price::float8              AS price, \
               COALESCE(p.image_url[1], '') AS image_url, \
               p.eco_rating::float8         AS eco_rating \
             FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             LEFT JOIN brands     b ON b.id = p.brand_id \
             ORDER BY p.eco_rating DESC NULLS LAST, p.id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SearchError::Storage(e.to_string()))?;

        rows.iter().map(row_to_product).collect()
    }
}

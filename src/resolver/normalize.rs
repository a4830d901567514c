/// Result normalization
///
/// Three backends feed the cascade and each produces a different row shape:
/// loose JSON from the NLP service, ranked joined rows from the full-text
/// query, and bare catalog rows from the substring fallback. This module maps
/// all of them into the one canonical SearchResult shape the HTTP contract
/// promises, degrading malformed fields to defaults instead of erroring.

use serde::Serialize;
use serde_json::Value;

use crate::store::{CatalogRow, ProductRow, RankedRow};

/// Canonical search hit, identical regardless of originating stage.
///
/// `score` is a relevance indicator in [0, 1]: native for NLP hits, the
/// ts_rank_cd value for full-text hits, 1.0 for explicit ID lookups, and a
/// fixed low constant for substring matches.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub image_url: String,
    pub eco_rating: Option<f64>,
    pub score: f64,
}

/// An explicit ID lookup is maximum confidence by definition.
pub fn from_id_row(row: ProductRow) -> SearchResult {
    SearchResult {
        id: row.id,
        name: row.name,
        description: row.description,
        category: row.category,
        price: row.price,
        image_url: row.image_url,
        eco_rating: row.eco_rating,
        score: 1.0,
    }
}

pub fn from_fts_row(row: RankedRow) -> SearchResult {
    let score = clamp_score(row.rank);
    SearchResult {
        id: row.product.id,
        name: row.product.name,
        description: row.product.description,
        category: row.product.category,
        price: row.product.price,
        image_url: row.product.image_url,
        eco_rating: row.product.eco_rating,
        score,
    }
}

/// Substring hits have no native rank; they get the configured weak-match
/// constant. No category join happens at that stage, so category is empty.
pub fn from_substring_row(row: CatalogRow, fallback_score: f64) -> SearchResult {
    let image_url = row
        .image_url
        .and_then(|urls| urls.into_iter().next())
        .unwrap_or_default();
    SearchResult {
        id: row.id,
        name: row.name,
        description: row.description,
        category: String::new(),
        price: row.price,
        image_url,
        eco_rating: row.eco_rating,
        score: clamp_score(fallback_score),
    }
}

/// Normalize one loose JSON row from the NLP collaborator.
///
/// Field names vary across service revisions (`id` vs `product_id` vs `_id`,
/// `image_url` vs `image`), numerics may arrive as strings, and images may be
/// a single URL or an array. Rows without a usable identifier are dropped.
pub fn from_nlp_row(row: &Value) -> Option<SearchResult> {
    let obj = row.as_object()?;

    let id = ["id", "product_id", "_id"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(coerce_i64))?;

    let image_url = ["image_url", "image"]
        .iter()
        .find_map(|k| obj.get(*k))
        .map(first_image)
        .unwrap_or_default();

    Some(SearchResult {
        id,
        name: string_field(obj.get("name")),
        description: string_field(obj.get("description")),
        category: string_field(obj.get("category")),
        price: obj.get("price").and_then(coerce_f64).unwrap_or(0.0),
        eco_rating: obj.get("eco_rating").and_then(coerce_f64),
        image_url,
        score: clamp_score(obj.get("score").and_then(coerce_f64).unwrap_or(0.0)),
    })
}

/// Normalize a whole NLP response, dropping unusable rows.
pub fn from_nlp_rows(rows: &[Value]) -> Vec<SearchResult> {
    rows.iter().filter_map(from_nlp_row).collect()
}

fn clamp_score(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn string_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Accept an integer, an integral float, or a digit string.
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Accept a number or a numeric string; anything else (including NaN) is None.
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

/// Image fields vary: array of URLs (take the first), single string, or junk.
fn first_image(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Deterministic query classification
///
/// Decides whether an incoming search request names product identifiers
/// explicitly (`?id=123`, `?ids=1,2,9`, `"id:123"`, `"#123"`, `"1, 2, 9"`)
/// or describes products by keyword. Pure function of its inputs; ambiguity
/// always resolves to free text, never to an error.

use regex::Regex;

/// Classification outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    /// Nothing usable after trimming; no store call should be made.
    Empty,
    /// Explicit identifier lookup, bypassing the text cascade.
    Ids(Vec<i64>),
    /// Free-text query for the cascade.
    Text(String),
}

/// Classify `(q, id, ids)` into a [`QueryPlan`].
///
/// Priority order matches the storefront contract:
/// 1. `id` param, if it is a pure digit string.
/// 2. `ids` param, split on commas/whitespace, keeping digit tokens in order.
/// 3. `q` consisting solely of comma-separated digit runs.
/// 4. `q` matching a single ID pattern: `id:123`, `id=123`, `#123`, or bare `123`.
/// 5. Otherwise free text (or empty).
pub fn classify(q: &str, id: Option<&str>, ids: Option<&str>) -> QueryPlan {
    if let Some(raw) = id {
        if is_digits(raw.trim()) {
            if let Ok(n) = raw.trim().parse::<i64>() {
                return QueryPlan::Ids(vec![n]);
            }
        }
    }

    if let Some(raw) = ids {
        let list: Vec<i64> = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| is_digits(s))
            .filter_map(|s| s.parse::<i64>().ok())
            .collect();
        if !list.is_empty() {
            return QueryPlan::Ids(list);
        }
    }

    let cleaned = q.trim();
    if cleaned.is_empty() {
        return QueryPlan::Empty;
    }

    // multiple IDs in free text: "1, 2, 9"
    if let Ok(re) = Regex::new(r"^\s*\d+(?:\s*,\s*\d+)+\s*$") {
        if re.is_match(cleaned) {
            let list: Vec<i64> = cleaned
                .split(',')
                .map(str::trim)
                .filter_map(|s| s.parse::<i64>().ok())
                .collect();
            if !list.is_empty() {
                return QueryPlan::Ids(list);
            }
        }
    }

    // single ID in free text: "123", "id:123", "id=123", "#123"
    if let Ok(re) = Regex::new(r"(?i)^(?:id\s*[:=]\s*|#)?(\d+)$") {
        if let Some(cap) = re.captures(cleaned) {
            if let Ok(n) = cap[1].parse::<i64>() {
                return QueryPlan::Ids(vec![n]);
            }
        }
    }

    QueryPlan::Text(cleaned.to_string())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

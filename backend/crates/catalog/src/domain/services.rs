//! Domain Services
//!
//! Pure catalog logic: rating aggregation and slug resolution.

use crate::domain::entities::Term;
use crate::domain::value_objects::Slug;

/// Arithmetic mean of review scores, `0.0` when there are none
///
/// Always recomputed from the full set of scores, never adjusted
/// incrementally.
pub fn recompute_rating(scores: &[i16]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    total as f64 / scores.len() as f64
}

/// Requested slugs that have no matching term, in request order
pub fn missing_slugs<'a, K>(requested: &'a [Slug], found: &[Term<K>]) -> Vec<&'a Slug> {
    requested
        .iter()
        .filter(|slug| !found.iter().any(|term| term.slug == **slug))
        .collect()
}

/// Drop repeated slugs, keeping the first occurrence
pub fn dedup_slugs(slugs: Vec<Slug>) -> Vec<Slug> {
    let mut unique: Vec<Slug> = Vec::with_capacity(slugs.len());
    for slug in slugs {
        if !unique.contains(&slug) {
            unique.push(slug);
        }
    }
    unique
}

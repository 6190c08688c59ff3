use crate::catalog::{Catalog, ProductType};
use crate::models::Candidate;

pub const TOP_K: usize = 3;

/// Ranks catalogue leaves against the item name and brand.
///
/// Only product types from the catalogue are ever returned. A product type
/// scores one point for its name and one per keyword found in the text;
/// longer matches break ties so "cleansing oil" beats "oil".
pub fn suggest_candidates(
    catalog: &Catalog,
    name: &str,
    brand: &str,
    top_k: usize,
) -> Vec<Candidate> {
    let text = format!("{} {}", name.trim(), brand.trim()).to_lowercase();
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, usize, &ProductType)> = catalog
        .types()
        .iter()
        .filter_map(|product_type| {
            let (hits, longest) = score(product_type, &text);
            (hits > 0).then_some((hits, longest, product_type))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.cmp(&a.1))
            .then(a.2.id.cmp(&b.2.id))
    });

    scored
        .into_iter()
        .take(top_k)
        .map(|(hits, longest, product_type)| Candidate {
            taxon_id: product_type.id,
            path: product_type.path.clone(),
            confidence: confidence(hits, longest),
        })
        .collect()
}

fn score(product_type: &ProductType, text: &str) -> (usize, usize) {
    let name = product_type.name.to_lowercase();
    let mut hits = 0;
    let mut longest = 0;
    for term in std::iter::once(&name).chain(product_type.keywords.iter()) {
        let term = term.to_lowercase();
        if !term.is_empty() && text.contains(&term) {
            hits += 1;
            longest = longest.max(term.chars().count());
        }
    }
    (hits, longest)
}

fn confidence(hits: usize, longest: usize) -> f64 {
    let raw = 0.4 + 0.2 * hits as f64 + 0.02 * longest as f64;
    (raw.min(0.99) * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_synonyms() {
        let catalog = Catalog::builtin();
        let candidates = suggest_candidates(&catalog, "Hydrating Lotion", "", TOP_K);
        assert_eq!(candidates.first().map(|c| c.taxon_id), Some(211));

        let candidates = suggest_candidates(&catalog, "薬用化粧水", "", TOP_K);
        assert_eq!(candidates.first().map(|c| c.taxon_id), Some(211));
    }

    #[test]
    fn longer_keyword_wins_ties() {
        let catalog = Catalog::builtin();
        let candidates = suggest_candidates(&catalog, "Deep Cleansing Oil", "", TOP_K);
        assert_eq!(candidates.first().map(|c| c.taxon_id), Some(201));
    }

    #[test]
    fn caps_results_and_stays_in_catalog() {
        let catalog = Catalog::builtin();
        let candidates =
            suggest_candidates(&catalog, "mascara lipstick toner serum perfume", "", TOP_K);
        assert_eq!(candidates.len(), TOP_K);
        for candidate in &candidates {
            let product_type = catalog.get(&candidate.taxon_id.to_string()).unwrap();
            assert_eq!(product_type.path, candidate.path);
            assert!(candidate.confidence > 0.0 && candidate.confidence < 1.0);
        }
    }

    #[test]
    fn empty_or_unknown_text_has_no_candidates() {
        let catalog = Catalog::builtin();
        assert!(suggest_candidates(&catalog, "  ", "", TOP_K).is_empty());
        assert!(suggest_candidates(&catalog, "garden hose", "acme", TOP_K).is_empty());
    }
}

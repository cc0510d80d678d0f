use crate::core::format::format_share;
use crate::domain::model::{ComparisonEntry, ComparisonResult, DependencyRecord};
use crate::utils::error::Result;
use std::collections::HashMap;

/// Drop repeated buyer countries, keeping first-occurrence order. The
/// comparison output covers each distinct requested buyer exactly once.
pub fn dedup_buyers(buyer_countries: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    buyer_countries
        .iter()
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

/// Align per-buyer dependency records into one comparable result set, in
/// the requested order. A buyer absent from `by_buyer` has no rows for the
/// scope and yields a zero share with the no-data marker, so callers can
/// tell "zero dependency" from "missing data".
pub fn build_comparison(
    buyers: &[String],
    by_buyer: &HashMap<String, DependencyRecord>,
) -> Result<ComparisonResult> {
    let mut entries = Vec::with_capacity(buyers.len());

    for buyer in buyers {
        let entry = match by_buyer.get(buyer) {
            Some(record) => ComparisonEntry {
                buyer_country: buyer.clone(),
                share: record.share,
                formatted: format_share(record.share)?,
                no_data: false,
            },
            None => ComparisonEntry {
                buyer_country: buyer.clone(),
                share: 0.0,
                formatted: format_share(0.0)?,
                no_data: true,
            },
        };
        entries.push(entry);
    }

    Ok(ComparisonResult { entries })
}

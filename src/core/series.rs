use crate::core::format::format_share;
use crate::domain::model::{DependencyRecord, SeriesPoint, SeriesResult};
use crate::utils::error::Result;
use std::collections::HashMap;

/// Assemble the per-year dependency series for one buyer×sector×supplier
/// triple. Output covers every year of [year_start, year_end] inclusive,
/// ascending; years with no underlying data stay in the sequence with
/// `share: None` so the series remains contiguous and chart-able. The
/// range itself is validated upstream.
pub fn build_series(
    year_start: i32,
    year_end: i32,
    by_year: &HashMap<i32, DependencyRecord>,
) -> Result<SeriesResult> {
    let mut entries = Vec::with_capacity((year_end - year_start + 1) as usize);

    for year in year_start..=year_end {
        let point = match by_year.get(&year) {
            Some(record) => SeriesPoint {
                year,
                share: Some(record.share),
                formatted: Some(format_share(record.share)?),
            },
            None => SeriesPoint {
                year,
                share: None,
                formatted: None,
            },
        };
        entries.push(point);
    }

    Ok(SeriesResult { entries })
}

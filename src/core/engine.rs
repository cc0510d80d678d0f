use crate::core::format::format_share;
use crate::core::normalizer::Normalizer;
use crate::core::{compare, ranking, series};
use crate::domain::model::{
    ComparisonResult, FlowRecord, FlowScope, RankedEntry, RankedResult, SeriesResult, OUT_CODE,
};
use crate::domain::ports::{ConfigProvider, FlowSource};
use crate::utils::error::{IcioError, Result};
use crate::utils::validation;
use std::collections::HashMap;

/// Integrity tolerance for the supplier-sum-vs-total check.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Upper bound on `limit`; larger requests are rejected, never clamped.
pub const DEFAULT_MAX_LIMIT: usize = 100;
/// Dataset coverage of the bundled ICIO vintages.
pub const DEFAULT_YEAR_MIN: i32 = 1995;
pub const DEFAULT_YEAR_MAX: i32 = 2022;

#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub tolerance: f64,
    pub max_limit: usize,
    pub year_min: i32,
    pub year_max: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_limit: DEFAULT_MAX_LIMIT,
            year_min: DEFAULT_YEAR_MIN,
            year_max: DEFAULT_YEAR_MAX,
        }
    }
}

impl EngineSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            tolerance: config.tolerance(),
            max_limit: config.max_limit(),
            year_min: config.year_min(),
            year_max: config.year_max(),
        }
    }
}

/// Dependency indicator computation engine. Pure and stateless per query:
/// one awaited fetch against the flow source, then synchronous
/// normalization, ranking / alignment / series assembly, and formatting.
/// No retries, no caching, no shared mutable state.
pub struct DependencyEngine<S: FlowSource> {
    source: S,
    settings: EngineSettings,
    normalizer: Normalizer,
}

impl<S: FlowSource> DependencyEngine<S> {
    pub fn new(source: S) -> Self {
        Self::with_settings(source, EngineSettings::default())
    }

    pub fn with_settings(source: S, settings: EngineSettings) -> Self {
        Self {
            source,
            normalizer: Normalizer::new(settings.tolerance),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Top suppliers of one buyer+sector+year, by dependency share.
    pub async fn top_suppliers(
        &self,
        buyer_country: &str,
        buyer_sector: &str,
        year: i32,
        limit: usize,
    ) -> Result<RankedResult> {
        validation::validate_buyer_country("buyer_country", buyer_country)?;
        validation::validate_sector_code("buyer_sector", buyer_sector)?;
        validation::validate_year("year", year, self.settings.year_min, self.settings.year_max)?;
        validation::validate_limit("limit", limit, self.settings.max_limit)?;

        let scope = FlowScope::BuyerSuppliers {
            buyer_country: buyer_country.to_string(),
            buyer_sector: buyer_sector.to_string(),
            year,
        };
        let rows = self.fetch_scope(&scope).await?;
        if rows.is_empty() {
            tracing::info!("No flow data for scope ({})", scope.describe());
            return Ok(RankedResult { entries: Vec::new() });
        }

        let records = self.normalizer.normalize_buyer_scope(&scope.describe(), &rows)?;
        let ranked = ranking::rank_entries(
            records
                .into_iter()
                .map(|r| (r.supplier_country, r.share))
                .collect(),
            limit,
        );
        to_ranked_result(ranked, true)
    }

    /// Buyer sectors of one buyer country ranked by their dependency on
    /// one supplier, for one year. Entity keys are sector codes.
    pub async fn top_sectors(
        &self,
        supplier_country: &str,
        buyer_country: &str,
        year: i32,
        limit: usize,
    ) -> Result<RankedResult> {
        validation::validate_supplier_country("supplier_country", supplier_country)?;
        validation::validate_buyer_country("buyer_country", buyer_country)?;
        validation::validate_year("year", year, self.settings.year_min, self.settings.year_max)?;
        validation::validate_limit("limit", limit, self.settings.max_limit)?;

        let scope = FlowScope::SupplierSectors {
            supplier_country: supplier_country.to_string(),
            buyer_country: buyer_country.to_string(),
            year,
        };
        let rows = self.fetch_scope(&scope).await?;
        if rows.is_empty() {
            tracing::info!("No flow data for scope ({})", scope.describe());
            return Ok(RankedResult { entries: Vec::new() });
        }

        // 每個部門一列 (該供應國在該部門的採購值)
        let grouped = group_unique(&scope, rows, |row| row.buyer_sector.clone())?;
        let mut entries = Vec::with_capacity(grouped.len());
        for (sector, row) in grouped {
            let record = self.normalizer.normalize_single(&scope.describe(), &row)?;
            entries.push((sector, record.share));
        }
        to_ranked_result(ranking::rank_entries(entries, limit), false)
    }

    /// Dependency of several buyer countries on one supplier within one
    /// sector+year, aligned in request order.
    pub async fn compare_countries(
        &self,
        buyer_countries: &[String],
        buyer_sector: &str,
        supplier_country: &str,
        year: i32,
    ) -> Result<ComparisonResult> {
        if buyer_countries.is_empty() {
            return Err(IcioError::ValidationError {
                field: "buyer_countries".to_string(),
                message: "at least one buyer country is required".to_string(),
            });
        }
        for country in buyer_countries {
            validation::validate_buyer_country("buyer_countries", country)?;
        }
        validation::validate_sector_code("buyer_sector", buyer_sector)?;
        validation::validate_supplier_country("supplier_country", supplier_country)?;
        validation::validate_year("year", year, self.settings.year_min, self.settings.year_max)?;

        let buyers = compare::dedup_buyers(buyer_countries);
        let scope = FlowScope::CountryComparison {
            buyer_countries: buyers.clone(),
            buyer_sector: buyer_sector.to_string(),
            supplier_country: supplier_country.to_string(),
            year,
        };
        let rows = self.fetch_scope(&scope).await?;

        let grouped = group_unique(&scope, rows, |row| row.buyer_country.clone())?;
        let mut by_buyer = HashMap::with_capacity(grouped.len());
        for (buyer, row) in grouped {
            let record = self.normalizer.normalize_single(&scope.describe(), &row)?;
            by_buyer.insert(buyer, record);
        }
        compare::build_comparison(&buyers, &by_buyer)
    }

    /// Year-by-year dependency of one buyer×sector on one supplier over an
    /// inclusive year range, with explicit markers for years without data.
    pub async fn time_series(
        &self,
        buyer_country: &str,
        buyer_sector: &str,
        supplier_country: &str,
        year_start: i32,
        year_end: i32,
    ) -> Result<SeriesResult> {
        validation::validate_buyer_country("buyer_country", buyer_country)?;
        validation::validate_sector_code("buyer_sector", buyer_sector)?;
        validation::validate_supplier_country("supplier_country", supplier_country)?;
        validation::validate_year_range(
            "year_range",
            year_start,
            year_end,
            self.settings.year_min,
            self.settings.year_max,
        )?;

        let scope = FlowScope::SupplierSeries {
            buyer_country: buyer_country.to_string(),
            buyer_sector: buyer_sector.to_string(),
            supplier_country: supplier_country.to_string(),
            year_start,
            year_end,
        };
        let rows = self.fetch_scope(&scope).await?;

        let grouped = group_unique(&scope, rows, |row| row.year)?;
        let mut by_year = HashMap::with_capacity(grouped.len());
        for (year, row) in grouped {
            let record = self.normalizer.normalize_single(&scope.describe(), &row)?;
            by_year.insert(year, record);
        }
        series::build_series(year_start, year_end, &by_year)
    }

    /// Liveness check for the transport layer.
    pub fn health(&self) -> &'static str {
        "ok"
    }

    /// Reachability check for the underlying flow source.
    pub async fn health_source(&self) -> Result<&'static str> {
        self.source.ping().await?;
        Ok("source ok")
    }

    async fn fetch_scope(&self, scope: &FlowScope) -> Result<Vec<FlowRecord>> {
        tracing::debug!("Fetching flow records for scope ({})", scope.describe());
        let rows = self.source.fetch(scope).await?;
        tracing::debug!("Fetched {} flow records", rows.len());

        // A row outside the requested scope means the source filter is
        // broken; normalizing it would silently skew shares.
        for row in &rows {
            if !scope.matches(row) {
                return Err(IcioError::DataIntegrityError {
                    scope: scope.describe(),
                    message: format!(
                        "source returned a row outside the requested scope \
                         (buyer={} sector={} supplier={} year={})",
                        row.buyer_country, row.buyer_sector, row.supplier_country, row.year
                    ),
                });
            }
        }
        Ok(rows)
    }
}

/// Group rows by a key that must be unique within the scope (sector, buyer
/// country, or year depending on the query). A duplicate key means the
/// source handed back conflicting rows for the same cell.
fn group_unique<K, F>(
    scope: &FlowScope,
    rows: Vec<FlowRecord>,
    key_fn: F,
) -> Result<Vec<(K, FlowRecord)>>
where
    K: std::hash::Hash + Eq + Clone + std::fmt::Display,
    F: Fn(&FlowRecord) -> K,
{
    let mut seen = HashMap::new();
    let mut grouped = Vec::with_capacity(rows.len());
    for row in rows {
        let key = key_fn(&row);
        if seen.insert(key.clone(), ()).is_some() {
            return Err(IcioError::DataIntegrityError {
                scope: scope.describe(),
                message: format!("duplicate row for '{}'", key),
            });
        }
        grouped.push((key, row));
    }
    Ok(grouped)
}

fn to_ranked_result(ranked: Vec<(String, f64)>, flag_rest_of_world: bool) -> Result<RankedResult> {
    let entries = ranked
        .into_iter()
        .map(|(key, share)| {
            Ok(RankedEntry {
                rest_of_world: flag_rest_of_world && key == OUT_CODE,
                formatted: format_share(share)?,
                key,
                share,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(RankedResult { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_source::MemoryFlowSource;
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl FlowSource for FailingSource {
        async fn fetch(&self, _scope: &FlowScope) -> Result<Vec<FlowRecord>> {
            Err(IcioError::SourceUnavailableError {
                message: "connection refused".to_string(),
            })
        }

        async fn ping(&self) -> Result<()> {
            Err(IcioError::SourceUnavailableError {
                message: "connection refused".to_string(),
            })
        }
    }

    fn flow(
        buyer: &str,
        sector: &str,
        supplier: &str,
        year: i32,
        value: f64,
        total: f64,
    ) -> FlowRecord {
        FlowRecord {
            buyer_country: buyer.to_string(),
            buyer_sector: sector.to_string(),
            supplier_country: supplier.to_string(),
            year,
            value,
            buyer_total: total,
        }
    }

    fn fra_c26_2022() -> Vec<FlowRecord> {
        vec![
            flow("FRA", "C26", "DEU", 2022, 40.0, 100.0),
            flow("FRA", "C26", "CHN", 2022, 30.0, 100.0),
            flow("FRA", "C26", "OUT", 2022, 30.0, 100.0),
        ]
    }

    fn engine_with(rows: Vec<FlowRecord>) -> DependencyEngine<MemoryFlowSource> {
        DependencyEngine::new(MemoryFlowSource::new(rows))
    }

    #[tokio::test]
    async fn test_top_suppliers_documented_example() {
        let engine = engine_with(fra_c26_2022());

        let result = engine.top_suppliers("FRA", "C26", 2022, 2).await.unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].key, "DEU");
        assert_eq!(result.entries[0].formatted, "40.00%");
        assert_eq!(result.entries[1].key, "CHN");
        assert_eq!(result.entries[1].formatted, "30.00%");
    }

    #[tokio::test]
    async fn test_top_suppliers_tie_breaks_lexicographically() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "ITA", 2022, 25.0, 50.0),
            flow("FRA", "C26", "DEU", 2022, 25.0, 50.0),
        ]);

        let result = engine.top_suppliers("FRA", "C26", 2022, 1).await.unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].key, "DEU");
        assert_eq!(result.entries[0].formatted, "50.00%");
    }

    #[tokio::test]
    async fn test_top_suppliers_is_order_independent() {
        let mut rows = fra_c26_2022();
        let expected = engine_with(rows.clone())
            .top_suppliers("FRA", "C26", 2022, 3)
            .await
            .unwrap();

        rows.reverse();
        let reversed = engine_with(rows)
            .top_suppliers("FRA", "C26", 2022, 3)
            .await
            .unwrap();

        assert_eq!(expected, reversed);
    }

    #[tokio::test]
    async fn test_top_suppliers_flags_rest_of_world() {
        let engine = engine_with(fra_c26_2022());

        let result = engine.top_suppliers("FRA", "C26", 2022, 3).await.unwrap();

        let out = result.entries.iter().find(|e| e.key == "OUT").unwrap();
        assert!(out.rest_of_world);
        assert!(!result.entries[0].rest_of_world);
        assert_eq!(out.display_key(), "OUT (Rest of World)");
    }

    #[tokio::test]
    async fn test_top_suppliers_no_data_is_empty_not_error() {
        let engine = engine_with(Vec::new());

        let result = engine.top_suppliers("FRA", "C26", 2022, 10).await.unwrap();
        assert!(result.entries.is_empty());
    }

    #[tokio::test]
    async fn test_top_suppliers_zero_total_reports_zero_shares() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "DEU", 2022, 0.0, 0.0),
            flow("FRA", "C26", "OUT", 2022, 0.0, 0.0),
        ]);

        let result = engine.top_suppliers("FRA", "C26", 2022, 10).await.unwrap();

        assert_eq!(result.entries.len(), 2);
        assert!(result.entries.iter().all(|e| e.formatted == "0.00%"));
        // all-tie ordering is lexicographic
        assert_eq!(result.entries[0].key, "DEU");
        assert_eq!(result.entries[1].key, "OUT");
    }

    #[tokio::test]
    async fn test_top_suppliers_rejects_bad_limit() {
        let engine = engine_with(fra_c26_2022());

        let err = engine.top_suppliers("FRA", "C26", 2022, 0).await.unwrap_err();
        assert!(matches!(err, IcioError::ValidationError { ref field, .. } if field == "limit"));

        let err = engine
            .top_suppliers("FRA", "C26", 2022, DEFAULT_MAX_LIMIT + 1)
            .await
            .unwrap_err();
        assert!(matches!(err, IcioError::ValidationError { ref field, .. } if field == "limit"));
    }

    #[tokio::test]
    async fn test_top_suppliers_rejects_malformed_codes() {
        let engine = engine_with(fra_c26_2022());

        assert!(engine.top_suppliers("fr", "C26", 2022, 5).await.is_err());
        assert!(engine.top_suppliers("OUT", "C26", 2022, 5).await.is_err());
        assert!(engine.top_suppliers("FRA", "", 2022, 5).await.is_err());
        assert!(engine.top_suppliers("FRA", "C26", 1901, 5).await.is_err());
    }

    #[tokio::test]
    async fn test_top_suppliers_integrity_failure_is_fatal() {
        // sum 90 != total 100 → must fail, not renormalize
        let engine = engine_with(vec![
            flow("FRA", "C26", "DEU", 2022, 60.0, 100.0),
            flow("FRA", "C26", "CHN", 2022, 30.0, 100.0),
        ]);

        let err = engine.top_suppliers("FRA", "C26", 2022, 5).await.unwrap_err();
        assert!(matches!(err, IcioError::DataIntegrityError { .. }));
    }

    #[tokio::test]
    async fn test_top_sectors_ranks_sector_exposure() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2022, 30.0, 100.0),
            flow("FRA", "C29", "CHN", 2022, 10.0, 200.0),
            flow("FRA", "D35", "CHN", 2022, 45.0, 100.0),
        ]);

        let result = engine.top_sectors("CHN", "FRA", 2022, 2).await.unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].key, "D35");
        assert_eq!(result.entries[0].formatted, "45.00%");
        assert_eq!(result.entries[1].key, "C26");
        assert_eq!(result.entries[1].formatted, "30.00%");
        assert!(!result.entries[0].rest_of_world);
    }

    #[tokio::test]
    async fn test_top_sectors_accepts_out_supplier() {
        let engine = engine_with(vec![flow("FRA", "C26", "OUT", 2022, 30.0, 100.0)]);

        let result = engine.top_sectors("OUT", "FRA", 2022, 5).await.unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].key, "C26");
    }

    #[tokio::test]
    async fn test_compare_countries_covers_every_requested_buyer() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2022, 30.0, 100.0),
            flow("DEU", "C26", "CHN", 2022, 10.0, 50.0),
        ]);

        let buyers = vec!["FRA".to_string(), "DEU".to_string(), "XXX".to_string()];
        let result = engine
            .compare_countries(&buyers, "C26", "CHN", 2022)
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.entries[0].buyer_country, "FRA");
        assert_eq!(result.entries[0].formatted, "30.00%");
        assert!(!result.entries[0].no_data);
        assert_eq!(result.entries[1].formatted, "20.00%");
        // XXX has no rows: zero share with the no-data marker, never dropped
        assert_eq!(result.entries[2].buyer_country, "XXX");
        assert_eq!(result.entries[2].share, 0.0);
        assert!(result.entries[2].no_data);
    }

    #[tokio::test]
    async fn test_compare_countries_dedups_preserving_order() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2022, 30.0, 100.0),
            flow("DEU", "C26", "CHN", 2022, 10.0, 50.0),
        ]);

        let buyers = vec![
            "DEU".to_string(),
            "FRA".to_string(),
            "DEU".to_string(),
        ];
        let result = engine
            .compare_countries(&buyers, "C26", "CHN", 2022)
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].buyer_country, "DEU");
        assert_eq!(result.entries[1].buyer_country, "FRA");
    }

    #[tokio::test]
    async fn test_compare_countries_rejects_empty_request() {
        let engine = engine_with(Vec::new());
        let err = engine
            .compare_countries(&[], "C26", "CHN", 2022)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IcioError::ValidationError { ref field, .. } if field == "buyer_countries"
        ));
    }

    #[tokio::test]
    async fn test_time_series_marks_gaps() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2018, 10.0, 100.0),
            flow("FRA", "C26", "CHN", 2020, 30.0, 100.0),
        ]);

        let result = engine
            .time_series("FRA", "C26", "CHN", 2018, 2021)
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 4);
        assert_eq!(result.entries[0].formatted.as_deref(), Some("10.00%"));
        assert!(!result.entries[1].has_data());
        assert_eq!(result.entries[2].formatted.as_deref(), Some("30.00%"));
        assert!(!result.entries[3].has_data());
    }

    #[tokio::test]
    async fn test_time_series_normalizes_per_year_totals() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2018, 10.0, 100.0),
            flow("FRA", "C26", "CHN", 2019, 10.0, 40.0),
        ]);

        let result = engine
            .time_series("FRA", "C26", "CHN", 2018, 2019)
            .await
            .unwrap();

        assert_eq!(result.entries[0].formatted.as_deref(), Some("10.00%"));
        assert_eq!(result.entries[1].formatted.as_deref(), Some("25.00%"));
    }

    #[tokio::test]
    async fn test_time_series_rejects_inverted_range() {
        let engine = engine_with(Vec::new());
        let err = engine
            .time_series("FRA", "C26", "CHN", 2020, 2018)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IcioError::ValidationError { ref field, .. } if field == "year_range"
        ));
    }

    #[tokio::test]
    async fn test_time_series_duplicate_year_rows_are_rejected() {
        let engine = engine_with(vec![
            flow("FRA", "C26", "CHN", 2018, 10.0, 100.0),
            flow("FRA", "C26", "CHN", 2018, 12.0, 100.0),
        ]);

        let err = engine
            .time_series("FRA", "C26", "CHN", 2018, 2018)
            .await
            .unwrap_err();
        assert!(matches!(err, IcioError::DataIntegrityError { .. }));
    }

    #[tokio::test]
    async fn test_source_failure_propagates_as_retryable() {
        let engine = DependencyEngine::new(FailingSource);

        let err = engine.top_suppliers("FRA", "C26", 2022, 5).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_health_checks() {
        let engine = engine_with(Vec::new());
        assert_eq!(engine.health(), "ok");
        assert_eq!(engine.health_source().await.unwrap(), "source ok");

        let failing = DependencyEngine::new(FailingSource);
        assert!(failing.health_source().await.is_err());
    }
}

use crate::domain::model::{DependencyRecord, FlowRecord};
use crate::utils::error::{IcioError, Result};
use std::collections::HashSet;

/// Converts raw flow values into dependency shares and enforces the
/// integrity invariants of the flow table. Never renormalizes: an
/// inconsistent record set fails the query instead of silently adjusting
/// dependency magnitudes.
pub struct Normalizer {
    tolerance: f64,
}

impl Normalizer {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Absolute tolerance scaled to the magnitude being compared, so the
    /// check behaves the same for tables in dollars and in billions.
    fn tol_for(&self, magnitude: f64) -> f64 {
        self.tolerance * magnitude.abs().max(1.0)
    }

    fn check_row(&self, scope: &str, row: &FlowRecord) -> Result<()> {
        if !row.value.is_finite() || !row.buyer_total.is_finite() {
            return Err(IcioError::DataIntegrityError {
                scope: scope.to_string(),
                message: format!(
                    "non-finite flow value for supplier '{}'",
                    row.supplier_country
                ),
            });
        }
        if row.value < 0.0 {
            return Err(IcioError::DataIntegrityError {
                scope: scope.to_string(),
                message: format!(
                    "negative value {} for supplier '{}'",
                    row.value, row.supplier_country
                ),
            });
        }
        if row.buyer_total < 0.0 {
            return Err(IcioError::DataIntegrityError {
                scope: scope.to_string(),
                message: format!("negative buyer_total {}", row.buyer_total),
            });
        }
        Ok(())
    }

    fn share_of(row: &FlowRecord) -> f64 {
        // Absence of trade is a valid, reportable zero, not an error.
        if row.buyer_total == 0.0 {
            0.0
        } else {
            row.value / row.buyer_total
        }
    }

    /// Normalize a full-coverage buyer scope: every supplier row of one
    /// (buyer_country, buyer_sector, year), including "OUT". Verifies that
    /// all rows agree on `buyer_total` and that supplier values sum to it
    /// within tolerance. Empty input yields an empty output ("no data for
    /// scope" is the caller's call to make).
    pub fn normalize_buyer_scope(
        &self,
        scope: &str,
        rows: &[FlowRecord],
    ) -> Result<Vec<DependencyRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let total = rows[0].buyer_total;
        let mut sum = 0.0;
        let mut seen = HashSet::new();

        for row in rows {
            self.check_row(scope, row)?;

            if (row.buyer_total - total).abs() > self.tol_for(total) {
                return Err(IcioError::DataIntegrityError {
                    scope: scope.to_string(),
                    message: format!(
                        "rows disagree on buyer_total ({} vs {})",
                        row.buyer_total, total
                    ),
                });
            }
            if !seen.insert(row.supplier_country.as_str()) {
                return Err(IcioError::DataIntegrityError {
                    scope: scope.to_string(),
                    message: format!("duplicate supplier row '{}'", row.supplier_country),
                });
            }
            sum += row.value;
        }

        if (sum - total).abs() > self.tol_for(total) {
            return Err(IcioError::DataIntegrityError {
                scope: scope.to_string(),
                message: format!("supplier sum {} does not match buyer_total {}", sum, total),
            });
        }

        Ok(rows
            .iter()
            .map(|row| DependencyRecord {
                buyer_country: row.buyer_country.clone(),
                buyer_sector: row.buyer_sector.clone(),
                supplier_country: row.supplier_country.clone(),
                year: row.year,
                share: Self::share_of(row),
            })
            .collect())
    }

    /// Normalize one row from a filtered scope (comparison, series, sector
    /// ranking), where the full supplier sum is not available. The row must
    /// still be self-consistent: its value cannot exceed its own total.
    pub fn normalize_single(&self, scope: &str, row: &FlowRecord) -> Result<DependencyRecord> {
        self.check_row(scope, row)?;

        if row.value > row.buyer_total + self.tol_for(row.buyer_total) {
            return Err(IcioError::DataIntegrityError {
                scope: scope.to_string(),
                message: format!(
                    "value {} exceeds buyer_total {} for supplier '{}'",
                    row.value, row.buyer_total, row.supplier_country
                ),
            });
        }

        Ok(DependencyRecord {
            buyer_country: row.buyer_country.clone(),
            buyer_sector: row.buyer_sector.clone(),
            supplier_country: row.supplier_country.clone(),
            year: row.year,
            share: Self::share_of(row),
        })
    }
}

use serde::{Deserialize, Serialize};

pub use crate::utils::validation::OUT_CODE;

/// Human label for the synthetic "OUT" supplier bucket.
pub const OUT_LABEL: &str = "Rest of World";

/// Raw flow row as delivered by a flow source. `buyer_total` is the sum of
/// all supplier values for the same (buyer_country, buyer_sector, year) and
/// is the normalization denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub buyer_country: String,
    pub buyer_sector: String,
    pub supplier_country: String,
    pub year: i32,
    pub value: f64,
    pub buyer_total: f64,
}

/// Normalized dependency share for one supplier within one buyer scope.
/// Ephemeral: built per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyRecord {
    pub buyer_country: String,
    pub buyer_sector: String,
    pub supplier_country: String,
    pub year: i32,
    pub share: f64,
}

/// Bounded lookup handed to a flow source, one variant per query shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowScope {
    /// All suppliers of one buyer+sector+year (top_suppliers).
    BuyerSuppliers {
        buyer_country: String,
        buyer_sector: String,
        year: i32,
    },
    /// One supplier across all buyer sectors of one buyer+year (top_sectors).
    SupplierSectors {
        supplier_country: String,
        buyer_country: String,
        year: i32,
    },
    /// One sector+supplier across a set of buyer countries (compare_countries).
    CountryComparison {
        buyer_countries: Vec<String>,
        buyer_sector: String,
        supplier_country: String,
        year: i32,
    },
    /// One buyer×sector×supplier triple across a year range (time_series).
    SupplierSeries {
        buyer_country: String,
        buyer_sector: String,
        supplier_country: String,
        year_start: i32,
        year_end: i32,
    },
}

impl FlowScope {
    /// Short description used in log lines and integrity error messages.
    pub fn describe(&self) -> String {
        match self {
            FlowScope::BuyerSuppliers {
                buyer_country,
                buyer_sector,
                year,
            } => format!(
                "buyer={} sector={} year={}",
                buyer_country, buyer_sector, year
            ),
            FlowScope::SupplierSectors {
                supplier_country,
                buyer_country,
                year,
            } => format!(
                "supplier={} buyer={} year={}",
                supplier_country, buyer_country, year
            ),
            FlowScope::CountryComparison {
                buyer_countries,
                buyer_sector,
                supplier_country,
                year,
            } => format!(
                "buyers={} sector={} supplier={} year={}",
                buyer_countries.join(","),
                buyer_sector,
                supplier_country,
                year
            ),
            FlowScope::SupplierSeries {
                buyer_country,
                buyer_sector,
                supplier_country,
                year_start,
                year_end,
            } => format!(
                "buyer={} sector={} supplier={} years={}..={}",
                buyer_country, buyer_sector, supplier_country, year_start, year_end
            ),
        }
    }

    /// Whether a raw row falls inside this scope. Shared by the in-memory
    /// and CSV-backed sources; a remote source is expected to filter
    /// server-side with the same semantics.
    pub fn matches(&self, row: &FlowRecord) -> bool {
        match self {
            FlowScope::BuyerSuppliers {
                buyer_country,
                buyer_sector,
                year,
            } => {
                row.buyer_country == *buyer_country
                    && row.buyer_sector == *buyer_sector
                    && row.year == *year
            }
            FlowScope::SupplierSectors {
                supplier_country,
                buyer_country,
                year,
            } => {
                row.supplier_country == *supplier_country
                    && row.buyer_country == *buyer_country
                    && row.year == *year
            }
            FlowScope::CountryComparison {
                buyer_countries,
                buyer_sector,
                supplier_country,
                year,
            } => {
                buyer_countries.contains(&row.buyer_country)
                    && row.buyer_sector == *buyer_sector
                    && row.supplier_country == *supplier_country
                    && row.year == *year
            }
            FlowScope::SupplierSeries {
                buyer_country,
                buyer_sector,
                supplier_country,
                year_start,
                year_end,
            } => {
                row.buyer_country == *buyer_country
                    && row.buyer_sector == *buyer_sector
                    && row.supplier_country == *supplier_country
                    && (*year_start..=*year_end).contains(&row.year)
            }
        }
    }
}

/// One ranked entry: entity key (supplier country or buyer sector), raw
/// share, and the canonical formatted percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub share: f64,
    pub formatted: String,
    /// True only for the synthetic "OUT" bucket, so callers can label it
    /// distinctly from real ISO3 codes.
    pub rest_of_world: bool,
}

impl RankedEntry {
    pub fn display_key(&self) -> String {
        if self.rest_of_world {
            format!("{} ({})", self.key, OUT_LABEL)
        } else {
            self.key.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub entries: Vec<RankedEntry>,
}

/// One buyer country in a comparison. `no_data` distinguishes "this buyer
/// has no rows for the scope" from an observed zero dependency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonEntry {
    pub buyer_country: String,
    pub share: f64,
    pub formatted: String,
    pub no_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub entries: Vec<ComparisonEntry>,
}

/// One year of a dependency time series. `share == None` marks a year with
/// no underlying data, kept in place so the series stays contiguous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub share: Option<f64>,
    pub formatted: Option<String>,
}

impl SeriesPoint {
    pub fn has_data(&self) -> bool {
        self.share.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResult {
    pub entries: Vec<SeriesPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buyer: &str, sector: &str, supplier: &str, year: i32) -> FlowRecord {
        FlowRecord {
            buyer_country: buyer.to_string(),
            buyer_sector: sector.to_string(),
            supplier_country: supplier.to_string(),
            year,
            value: 10.0,
            buyer_total: 100.0,
        }
    }

    #[test]
    fn test_buyer_suppliers_scope_matching() {
        let scope = FlowScope::BuyerSuppliers {
            buyer_country: "FRA".to_string(),
            buyer_sector: "C26".to_string(),
            year: 2022,
        };
        assert!(scope.matches(&row("FRA", "C26", "DEU", 2022)));
        assert!(scope.matches(&row("FRA", "C26", "OUT", 2022)));
        assert!(!scope.matches(&row("FRA", "C26", "DEU", 2021)));
        assert!(!scope.matches(&row("DEU", "C26", "DEU", 2022)));
    }

    #[test]
    fn test_series_scope_year_bounds_inclusive() {
        let scope = FlowScope::SupplierSeries {
            buyer_country: "FRA".to_string(),
            buyer_sector: "C26".to_string(),
            supplier_country: "CHN".to_string(),
            year_start: 2018,
            year_end: 2020,
        };
        assert!(scope.matches(&row("FRA", "C26", "CHN", 2018)));
        assert!(scope.matches(&row("FRA", "C26", "CHN", 2020)));
        assert!(!scope.matches(&row("FRA", "C26", "CHN", 2021)));
    }

    #[test]
    fn test_out_entry_display_label() {
        let entry = RankedEntry {
            key: OUT_CODE.to_string(),
            share: 0.3,
            formatted: "30.00%".to_string(),
            rest_of_world: true,
        };
        assert_eq!(entry.display_key(), "OUT (Rest of World)");
    }
}

pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::{IcioError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "icio-deps")]
#[command(about = "Query production-dependency indicators over an ICIO flow table")]
pub struct CliConfig {
    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Flow API endpoint (HTTP source)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Local flow snapshot, CSV or zip (CSV source)
    #[arg(long)]
    pub snapshot: Option<String>,

    /// Zip entry name when --snapshot points at an archive
    #[arg(long)]
    pub archive_entry: Option<String>,

    /// Override the integrity-check tolerance
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Override the maximum accepted limit
    #[arg(long)]
    pub max_limit: Option<usize>,

    /// Override the dataset coverage lower bound
    #[arg(long)]
    pub year_min: Option<i32>,

    /// Override the dataset coverage upper bound
    #[arg(long)]
    pub year_max: Option<i32>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: QueryCommand,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum QueryCommand {
    /// Top suppliers of one buyer country + sector
    TopSuppliers {
        buyer_country: String,
        buyer_sector: String,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Buyer sectors most dependent on one supplier
    TopSectors {
        supplier_country: String,
        buyer_country: String,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Compare several buyer countries on the same sector + supplier
    Compare {
        #[arg(value_delimiter = ',')]
        buyer_countries: Vec<String>,
        buyer_sector: String,
        supplier_country: String,
        #[arg(long)]
        year: i32,
    },

    /// Dependency share of one buyer×sector×supplier triple over the years
    Series {
        buyer_country: String,
        buyer_sector: String,
        supplier_country: String,
        #[arg(long)]
        year_start: i32,
        #[arg(long)]
        year_end: i32,
    },

    /// Check engine and flow source liveness
    Health,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.endpoint.is_some() && self.snapshot.is_some() {
            return Err(IcioError::InvalidConfigValueError {
                field: "endpoint".to_string(),
                value: "--endpoint + --snapshot".to_string(),
                reason: "Pick exactly one flow source".to_string(),
            });
        }
        if self.endpoint.is_none() && self.snapshot.is_none() && self.config.is_none() {
            return Err(IcioError::MissingConfigError {
                field: "endpoint | snapshot | config".to_string(),
            });
        }

        if let Some(endpoint) = &self.endpoint {
            validation::validate_url("endpoint", endpoint)?;
        }
        if let Some(snapshot) = &self.snapshot {
            validation::validate_path("snapshot", snapshot)?;
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance > 0.0) {
                return Err(IcioError::InvalidConfigValueError {
                    field: "tolerance".to_string(),
                    value: tolerance.to_string(),
                    reason: "Tolerance must be a positive number".to_string(),
                });
            }
        }
        if let Some(max_limit) = self.max_limit {
            validation::validate_positive_number("max_limit", max_limit, 1)?;
        }
        if let (Some(year_min), Some(year_max)) = (self.year_min, self.year_max) {
            if year_min > year_max {
                return Err(IcioError::InvalidConfigValueError {
                    field: "year_min".to_string(),
                    value: year_min.to_string(),
                    reason: format!("year_min is after year_max ({})", year_max),
                });
            }
        }

        Ok(())
    }
}

use crate::domain::model::{FlowRecord, FlowScope};
use crate::domain::ports::FlowSource;
use crate::utils::error::{IcioError, Result};
use async_trait::async_trait;
use reqwest::Client;

/// Flow source backed by a JSON flow API. One bounded GET per scope; the
/// endpoint is expected to filter server-side and return a JSON array of
/// flow rows. No retry here: a failed fetch surfaces immediately as a
/// retryable-by-caller condition.
pub struct HttpFlowSource {
    endpoint: String,
    client: Client,
}

impl HttpFlowSource {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn scope_params(scope: &FlowScope) -> Vec<(&'static str, String)> {
        match scope {
            FlowScope::BuyerSuppliers {
                buyer_country,
                buyer_sector,
                year,
            } => vec![
                ("query", "buyer_suppliers".to_string()),
                ("buyer_country", buyer_country.clone()),
                ("buyer_sector", buyer_sector.clone()),
                ("year", year.to_string()),
            ],
            FlowScope::SupplierSectors {
                supplier_country,
                buyer_country,
                year,
            } => vec![
                ("query", "supplier_sectors".to_string()),
                ("supplier_country", supplier_country.clone()),
                ("buyer_country", buyer_country.clone()),
                ("year", year.to_string()),
            ],
            FlowScope::CountryComparison {
                buyer_countries,
                buyer_sector,
                supplier_country,
                year,
            } => vec![
                ("query", "country_comparison".to_string()),
                ("buyer_countries", buyer_countries.join(",")),
                ("buyer_sector", buyer_sector.clone()),
                ("supplier_country", supplier_country.clone()),
                ("year", year.to_string()),
            ],
            FlowScope::SupplierSeries {
                buyer_country,
                buyer_sector,
                supplier_country,
                year_start,
                year_end,
            } => vec![
                ("query", "supplier_series".to_string()),
                ("buyer_country", buyer_country.clone()),
                ("buyer_sector", buyer_sector.clone()),
                ("supplier_country", supplier_country.clone()),
                ("year_start", year_start.to_string()),
                ("year_end", year_end.to_string()),
            ],
        }
    }
}

#[async_trait]
impl FlowSource for HttpFlowSource {
    async fn fetch(&self, scope: &FlowScope) -> Result<Vec<FlowRecord>> {
        let params = Self::scope_params(scope);
        tracing::debug!(
            "Requesting flow rows from {} ({})",
            self.endpoint,
            scope.describe()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IcioError::SourceUnavailableError {
                message: format!("flow API returned status {}", status),
            });
        }

        let rows: Vec<FlowRecord> = response.json().await?;
        tracing::debug!("Flow API returned {} rows", rows.len());
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("ping", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IcioError::SourceUnavailableError {
                message: format!("flow API ping returned status {}", response.status()),
            });
        }
        Ok(())
    }
}

use crate::utils::error::{IcioError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Synthetic Rest-of-World supplier bucket. Never a real ISO3 code.
pub const OUT_CODE: &str = "OUT";

fn is_iso3(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Buyer countries must be real ISO3 codes; the "OUT" aggregate only ever
/// appears on the supplier side.
pub fn validate_buyer_country(field_name: &str, code: &str) -> Result<()> {
    if code == OUT_CODE {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: "the OUT aggregate cannot be used as a buyer country".to_string(),
        });
    }
    if !is_iso3(code) {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!("'{}' is not a 3-letter ISO3 country code", code),
        });
    }
    Ok(())
}

/// Supplier position accepts either a real ISO3 code or the literal "OUT".
pub fn validate_supplier_country(field_name: &str, code: &str) -> Result<()> {
    if code == OUT_CODE || is_iso3(code) {
        return Ok(());
    }
    Err(IcioError::ValidationError {
        field: field_name.to_string(),
        message: format!("'{}' is not a 3-letter ISO3 country code or 'OUT'", code),
    })
}

pub fn validate_sector_code(field_name: &str, code: &str) -> Result<()> {
    // ICIO activity codes: "C26", "D35", "A01_02", ...
    let re = regex::Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap();
    if code.is_empty() {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: "sector code cannot be empty".to_string(),
        });
    }
    if !re.is_match(code) {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!("'{}' is not a valid activity code", code),
        });
    }
    Ok(())
}

pub fn validate_year(field_name: &str, year: i32, year_min: i32, year_max: i32) -> Result<()> {
    if !(1000..=9999).contains(&year) {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!("'{}' is not a 4-digit year", year),
        });
    }
    if year < year_min || year > year_max {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!(
                "year {} is outside the dataset coverage {}..={}",
                year, year_min, year_max
            ),
        });
    }
    Ok(())
}

pub fn validate_year_range(
    field_name: &str,
    year_start: i32,
    year_end: i32,
    year_min: i32,
    year_max: i32,
) -> Result<()> {
    if year_start > year_end {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!("year_start {} is after year_end {}", year_start, year_end),
        });
    }
    validate_year("year_start", year_start, year_min, year_max)?;
    validate_year("year_end", year_end, year_min, year_max)?;
    Ok(())
}

/// Rejected, never silently clamped or truncated.
pub fn validate_limit(field_name: &str, limit: usize, max_limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: "limit must be at least 1".to_string(),
        });
    }
    if limit > max_limit {
        return Err(IcioError::ValidationError {
            field: field_name.to_string(),
            message: format!("limit {} exceeds the configured maximum {}", limit, max_limit),
        });
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(IcioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(IcioError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(IcioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(IcioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(IcioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(IcioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

use crate::utils::error::{IcioError, Result};

/// Decimal places of the canonical percentage rendering.
pub const PERCENT_DECIMALS: usize = 2;

/// Render a dependency share in [0,1] as a percentage string with exactly
/// two decimals and a literal '%'. Canonical output is locale-neutral
/// ('.' decimal point); display localization belongs to the caller layer.
///
/// A negative or non-finite share is a data-integrity condition and is
/// rejected rather than clamped.
pub fn format_share(share: f64) -> Result<String> {
    if !share.is_finite() {
        return Err(IcioError::DataIntegrityError {
            scope: "share formatting".to_string(),
            message: format!("share {} is not a finite number", share),
        });
    }
    if share < 0.0 {
        return Err(IcioError::DataIntegrityError {
            scope: "share formatting".to_string(),
            message: format!("negative share {} cannot be rendered", share),
        });
    }
    Ok(format!("{:.*}%", PERCENT_DECIMALS, share * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimal_convention() {
        assert_eq!(format_share(0.032).unwrap(), "3.20%");
        assert_eq!(format_share(0.4).unwrap(), "40.00%");
        assert_eq!(format_share(0.5).unwrap(), "50.00%");
        assert_eq!(format_share(1.0).unwrap(), "100.00%");
    }

    #[test]
    fn test_zero_share_renders_as_zero_percent() {
        assert_eq!(format_share(0.0).unwrap(), "0.00%");
    }

    #[test]
    fn test_negative_share_is_rejected() {
        assert!(format_share(-0.01).is_err());
    }

    #[test]
    fn test_non_finite_share_is_rejected() {
        assert!(format_share(f64::NAN).is_err());
        assert!(format_share(f64::INFINITY).is_err());
    }

    #[test]
    fn test_format_round_trip_within_rounding_tolerance() {
        // format → strip '%' → /100 must land within 0.005 of the input
        for i in 0..=1000 {
            let share = i as f64 / 1000.0;
            let formatted = format_share(share).unwrap();
            let parsed: f64 = formatted.trim_end_matches('%').parse().unwrap();
            assert!(
                (parsed / 100.0 - share).abs() <= 0.005,
                "share {} formatted as {} round-trips outside tolerance",
                share,
                formatted
            );
        }
    }
}

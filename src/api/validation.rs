use super::ApiError;

/// Longest city name the store accepts.
pub const MAX_CITY_LENGTH: usize = 45;

pub fn validate_city(city: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = city.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("city: Query parameter is required."));
    }

    if trimmed.chars().count() > MAX_CITY_LENGTH {
        return Err(ApiError::validation(format!(
            "city: Must be {} characters or less.",
            MAX_CITY_LENGTH
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_city() {
        assert_eq!(validate_city(Some("  Paris ")).unwrap(), "Paris");
        assert!(validate_city(None).is_err());
        assert!(validate_city(Some("")).is_err());
        assert!(validate_city(Some("   ")).is_err());
        assert!(validate_city(Some(&"x".repeat(46))).is_err());
        assert!(validate_city(Some(&"x".repeat(45))).is_ok());
    }
}

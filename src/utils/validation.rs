use crate::utils::error::{Result, SpectatorError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const KNOWN_LOCATIONS: [&str; 3] = ["memory", "udp", "unix"];

pub fn is_empty_or_whitespace(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_location(field_name: &str, location: &str) -> Result<()> {
    if is_empty_or_whitespace(location) {
        return Err(SpectatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: location.to_string(),
            reason: "Location cannot be empty".to_string(),
        });
    }

    if KNOWN_LOCATIONS.contains(&location)
        || location.starts_with("udp://")
        || location.starts_with("unix://")
    {
        return Ok(());
    }

    Err(SpectatorError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: location.to_string(),
        reason: format!(
            "Unsupported location. Valid values: {}, udp://host:port, unix:///path",
            KNOWN_LOCATIONS.join(", ")
        ),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if is_empty_or_whitespace(value) {
        return Err(SpectatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SpectatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

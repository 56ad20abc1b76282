use crate::error::ModelError;
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "GMT";

/// Parses an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, ModelError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ModelError::UnknownTimezone(name.to_string()))
}

pub fn is_valid_timezone(name: &str) -> bool {
    parse_timezone(name).is_ok()
}

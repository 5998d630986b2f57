//! Column conversions shared by the table repositories

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::domain::{DomainError, DomainResult};

/// Current time as stored in `created_at` columns
pub(crate) fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

/// Current time truncated to what a `created_at` column can hold
pub(crate) fn stored_now() -> DomainResult<DateTime<Utc>> {
    from_micros(now_micros())
}

pub(crate) fn to_micros(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> DomainResult<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| DomainError::internal(format!("timestamp out of range: {}", micros)))
}

/// Parse a TEXT id column
pub(crate) fn parse_id<T>(raw: &str) -> DomainResult<T>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|e: DomainError| DomainError::internal(format!("corrupt id {:?}: {}", raw, e)))
}

/// `?, ?, ?` for an IN clause of `n` values
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ListId;

    #[test]
    fn test_micros_roundtrip_keeps_precision() {
        let now = Utc::now();
        let back = from_micros(to_micros(&now)).unwrap();
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_parse_id_reports_corruption_as_internal() {
        let err = parse_id::<ListId>("xyz").unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}

//! Upload timestamps.
//!
//! The document service emits ISO-8601 timestamps, but not consistently with
//! an offset: naive datetimes are UTC by convention on the server side. Both
//! forms are accepted and normalized to UTC.

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

pub(crate) fn parse(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(with_offset) = OffsetDateTime::parse(value, &Iso8601::DEFAULT) {
        return Some(with_offset.to_offset(UtcOffset::UTC));
    }
    PrimitiveDateTime::parse(value, &Iso8601::DEFAULT).ok().map(PrimitiveDateTime::assume_utc)
}

pub(crate) mod option {
    use super::*;

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw).map(Some).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }

    pub(crate) fn serialize<S: Serializer>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => {
                let formatted = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            },
            None => serializer.serialize_none(),
        }
    }
}

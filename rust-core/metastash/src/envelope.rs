// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Envelope codec: metadata + payload packed into one backend string.
//
// Layout: `<meta-json>$META|META$<payload>`. The metadata object records when
// the entry was written and the TTL in force at that moment. Strings with no
// separator are legacy/foreign data and pass through as raw payloads.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::StorageError;

/// Literal token between the metadata JSON and the payload.
pub const SEPARATOR: &str = "$META|META$";

/// Metadata recorded with every enveloped entry.
///
/// Fields accept any JSON number. Missing or `null` fields read as 0, which
/// disables the age check for that entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meta {
    /// Write time, milliseconds since the Unix epoch.
    #[serde(serialize_with = "write_millis", deserialize_with = "read_millis")]
    pub update_time: f64,
    /// TTL in milliseconds; 0 never expires.
    #[serde(serialize_with = "write_millis", deserialize_with = "read_millis")]
    pub expire: f64,
}

impl Meta {
    pub fn new(update_time: u64, expire: u64) -> Self {
        Self {
            update_time: update_time as f64,
            expire: expire as f64,
        }
    }
}

// Whole millisecond counts are written as integers.
fn write_millis<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let v = *value;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        serializer.serialize_u64(v as u64)
    } else {
        serializer.serialize_f64(v)
    }
}

fn read_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Why an enveloped string could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// Nothing follows the separator.
    EmptyPayload,
    /// The metadata segment is not a metadata object.
    BadMeta(String),
}

/// A backend string, classified.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<'a> {
    /// Metadata parsed; freshness still has to be judged by the caller.
    WithMeta { meta: Meta, payload: &'a str },
    /// No separator at all. Returned verbatim, never expired.
    LegacyRaw { payload: &'a str },
    /// Separator present but the entry is unusable. Treated as absent.
    Malformed(Malformed),
}

/// Pack `payload` behind serialized `meta`.
pub fn encode_envelope(meta: &Meta, payload: &str) -> Result<String, StorageError> {
    let meta_json = serde_json::to_string(meta)
        .map_err(|e| StorageError::SerializationError(format!("envelope meta: {e}")))?;

    let mut envelope = String::with_capacity(meta_json.len() + SEPARATOR.len() + payload.len());
    envelope.push_str(&meta_json);
    envelope.push_str(SEPARATOR);
    envelope.push_str(payload);
    Ok(envelope)
}

/// Split a backend string on the first separator and classify it.
///
/// The payload is everything after the first separator, so a payload may
/// itself contain the token.
pub fn decode_envelope(raw: &str) -> Envelope<'_> {
    let Some((meta_json, payload)) = raw.split_once(SEPARATOR) else {
        return Envelope::LegacyRaw { payload: raw };
    };

    if payload.is_empty() {
        return Envelope::Malformed(Malformed::EmptyPayload);
    }

    match serde_json::from_str::<Meta>(meta_json) {
        Ok(meta) => Envelope::WithMeta { meta, payload },
        Err(e) => Envelope::Malformed(Malformed::BadMeta(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let envelope = encode_envelope(&Meta::new(1_700_000_000_000, 1000), "hello").unwrap();
        assert_eq!(
            envelope,
            r#"{"updateTime":1700000000000,"expire":1000}$META|META$hello"#
        );
    }

    #[test]
    fn test_decode_with_meta() {
        let raw = r#"{"updateTime":10,"expire":20}$META|META$payload"#;
        assert_eq!(
            decode_envelope(raw),
            Envelope::WithMeta {
                meta: Meta::new(10, 20),
                payload: "payload",
            }
        );
    }

    #[test]
    fn test_decode_without_separator_is_legacy() {
        assert_eq!(
            decode_envelope("plain old value"),
            Envelope::LegacyRaw {
                payload: "plain old value"
            }
        );
        assert_eq!(decode_envelope(""), Envelope::LegacyRaw { payload: "" });
    }

    #[test]
    fn test_decode_empty_payload() {
        let raw = r#"{"updateTime":10,"expire":20}$META|META$"#;
        assert_eq!(
            decode_envelope(raw),
            Envelope::Malformed(Malformed::EmptyPayload)
        );
    }

    #[test]
    fn test_empty_payload_checked_before_meta() {
        assert_eq!(
            decode_envelope("garbage$META|META$"),
            Envelope::Malformed(Malformed::EmptyPayload)
        );
    }

    #[test]
    fn test_decode_bad_meta() {
        match decode_envelope("not json$META|META$value") {
            Envelope::Malformed(Malformed::BadMeta(reason)) => assert!(!reason.is_empty()),
            other => panic!("expected BadMeta, got: {:?}", other),
        }
        // Valid JSON, wrong shape.
        assert!(matches!(
            decode_envelope("42$META|META$value"),
            Envelope::Malformed(Malformed::BadMeta(_))
        ));
    }

    #[test]
    fn test_missing_meta_fields_default_to_zero() {
        assert_eq!(
            decode_envelope("{}$META|META$v"),
            Envelope::WithMeta {
                meta: Meta::default(),
                payload: "v",
            }
        );
    }

    #[test]
    fn test_null_meta_fields_read_as_zero() {
        let raw = r#"{"updateTime":1700000000000,"expire":null}$META|META$v"#;
        assert_eq!(
            decode_envelope(raw),
            Envelope::WithMeta {
                meta: Meta::new(1_700_000_000_000, 0),
                payload: "v",
            }
        );
    }

    #[test]
    fn test_fractional_meta_fields_accepted() {
        let raw = r#"{"updateTime":1700000000000.5,"expire":333333.33}$META|META$v"#;
        match decode_envelope(raw) {
            Envelope::WithMeta { meta, payload } => {
                assert!((meta.update_time - 1_700_000_000_000.5).abs() < 1e-3);
                assert!((meta.expire - 333_333.33).abs() < 1e-6);
                assert_eq!(payload, "v");
            }
            other => panic!("expected WithMeta, got: {:?}", other),
        }

        // Non-numeric fields are still unreadable.
        assert!(matches!(
            decode_envelope(r#"{"expire":"soon"}$META|META$v"#),
            Envelope::Malformed(Malformed::BadMeta(_))
        ));
    }

    #[test]
    fn test_fractional_expire_encoded_as_float() {
        let meta = Meta {
            update_time: 10.0,
            expire: 1.5,
        };
        assert_eq!(
            encode_envelope(&meta, "x").unwrap(),
            r#"{"updateTime":10,"expire":1.5}$META|META$x"#
        );
    }

    #[test]
    fn test_payload_keeps_later_separators() {
        let envelope = encode_envelope(&Meta::new(1, 0), "a$META|META$b").unwrap();
        match decode_envelope(&envelope) {
            Envelope::WithMeta { payload, .. } => assert_eq!(payload, "a$META|META$b"),
            other => panic!("expected WithMeta, got: {:?}", other),
        }
    }
}

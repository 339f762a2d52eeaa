//! Web-safe base64 byte buffers.
//!
//! All binary fields of the U2F protocol travel as unpadded, URL-safe
//! base64 text. This module provides the owned buffer type used for those
//! fields: it always *encodes* to the web-safe unpadded form, while
//! *decoding* forgives the padded and standard-alphabet variants that
//! client libraries in the wild produce. Security comparisons (challenge
//! matching in particular) are made on the decoded bytes, never on the
//! textual form.

use serde::de::{Error, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt;

/// An immutable byte buffer with web-safe base64 text representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64UrlSafeData(pub Vec<u8>);

static ALLOWED_DECODING_FORMATS: &[base64::Config] = &[
    base64::URL_SAFE_NO_PAD,
    base64::URL_SAFE,
    base64::STANDARD,
    base64::STANDARD_NO_PAD,
];

impl fmt::Display for Base64UrlSafeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            base64::encode_config(&self.0, base64::URL_SAFE_NO_PAD)
        )
    }
}

impl From<Vec<u8>> for Base64UrlSafeData {
    fn from(data: Vec<u8>) -> Base64UrlSafeData {
        Base64UrlSafeData(data)
    }
}

impl From<&[u8]> for Base64UrlSafeData {
    fn from(data: &[u8]) -> Base64UrlSafeData {
        Base64UrlSafeData(data.to_vec())
    }
}

impl From<Base64UrlSafeData> for Vec<u8> {
    fn from(data: Base64UrlSafeData) -> Vec<u8> {
        data.0
    }
}

impl AsRef<[u8]> for Base64UrlSafeData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&str> for Base64UrlSafeData {
    type Error = base64::DecodeError;

    fn try_from(v: &str) -> Result<Self, Self::Error> {
        // Devices and client libraries disagree on padding and alphabet,
        // so accept the common variants. The decoded bytes are what count.
        let mut failure = base64::DecodeError::InvalidLength;
        for config in ALLOWED_DECODING_FORMATS {
            match base64::decode_config(v, *config) {
                Ok(data) => return Ok(Base64UrlSafeData(data)),
                Err(e) => failure = e,
            }
        }
        Err(failure)
    }
}

struct Base64UrlSafeDataVisitor;

impl<'de> Visitor<'de> for Base64UrlSafeDataVisitor {
    type Value = Base64UrlSafeData;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a base64 url encoded string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Base64UrlSafeData::try_from(v)
            .map_err(|_| Error::invalid_value(Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Base64UrlSafeData {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as Deserializer<'de>>::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(Base64UrlSafeDataVisitor)
    }
}

impl Serialize for Base64UrlSafeData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Base64UrlSafeData;
    use std::convert::TryFrom;

    #[test]
    fn round_trips_arbitrary_buffers() {
        // 0xfb.. and 0xff.. map onto '+' and '/' in the standard alphabet,
        // so these exercise the '-'/'_' substitution.
        for buf in [
            vec![],
            vec![0x00],
            vec![0xfb, 0xef, 0xff],
            (0..=255u8).collect::<Vec<u8>>(),
        ]
        .iter()
        {
            let encoded = Base64UrlSafeData(buf.clone()).to_string();
            assert!(!encoded.contains('+'));
            assert!(!encoded.contains('/'));
            assert!(!encoded.contains('='));
            let decoded = Base64UrlSafeData::try_from(encoded.as_str()).unwrap();
            assert_eq!(decoded.0, *buf);
        }
    }

    #[test]
    fn decodes_alternate_formats() {
        // "maybe?" in the web-safe and the standard alphabet.
        assert_eq!(
            Base64UrlSafeData::try_from("bWF5YmU_").unwrap().0,
            b"maybe?".to_vec()
        );
        assert_eq!(
            Base64UrlSafeData::try_from("bWF5YmU/").unwrap().0,
            b"maybe?".to_vec()
        );
        assert_eq!(
            Base64UrlSafeData::try_from("AAAA").unwrap().0,
            vec![0, 0, 0]
        );
    }

    #[test]
    fn rejects_invalid_text() {
        assert!(Base64UrlSafeData::try_from("!!!!").is_err());
        assert!(Base64UrlSafeData::try_from("dfgbhnjklm,fcghjnm").is_err());
    }
}

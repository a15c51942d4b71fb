//! Opaque content addressing.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha2::Sha256;
use uuid::Uuid;

use crate::{Error, MimeMap, Result, TRACING_TARGET_CODEC};

/// Characters a token may contain. None of them require percent-encoding.
pub const TOKEN_ALPHABET: &[u8; 38] = b"abcdefghijklmnopqrstuvwxyz1234567890_-";

/// Number of characters in a token, excluding the extension.
pub const TOKEN_LENGTH: usize = 32;

type HmacSha256 = Hmac<Sha256>;

/// Derives opaque, URL-safe identifiers for stored content.
///
/// A token is a keyed digest of the content id and its upload timestamp, so
/// the same pair always produces the same token for a given salt while the
/// token itself reveals neither. The identifier stored on a content record is
/// the token followed by the extension of its content type.
#[derive(Clone)]
pub struct AddressCodec {
    mac: HmacSha256,
    mime_map: MimeMap,
}

impl std::fmt::Debug for AddressCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressCodec")
            .field("mime_map", &self.mime_map)
            .finish_non_exhaustive()
    }
}

impl AddressCodec {
    /// Creates a codec keyed by the given salt.
    pub fn new(salt: &str, mime_map: MimeMap) -> Result<Self> {
        if salt.is_empty() {
            return Err(Error::config("address codec salt must not be empty"));
        }

        let mac = HmacSha256::new_from_slice(salt.as_bytes())
            .map_err(|e| Error::config(format!("invalid address codec salt: {e}")))?;

        Ok(Self { mac, mime_map })
    }

    /// Encodes an (id, timestamp) pair into a token.
    pub fn encode(&self, id: Uuid, timestamp: Timestamp) -> String {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac.update(&timestamp.as_microsecond().to_be_bytes());
        let digest = mac.finalize().into_bytes();

        digest
            .iter()
            .take(TOKEN_LENGTH)
            .map(|b| TOKEN_ALPHABET[usize::from(*b) % TOKEN_ALPHABET.len()] as char)
            .collect()
    }

    /// Resolves a content type into its file extension.
    pub fn extension(&self, mime_type: &str) -> Result<&str> {
        self.mime_map.extension(mime_type)
    }

    /// Builds the stored identifier: token, dot, extension.
    pub fn identifier(&self, id: Uuid, timestamp: Timestamp, mime_type: &str) -> Result<String> {
        let extension = self.extension(mime_type)?;
        let identifier = format!("{}.{extension}", self.encode(id, timestamp));

        tracing::trace!(
            target: TRACING_TARGET_CODEC,
            content_id = %id,
            identifier = %identifier,
            "derived content identifier"
        );

        Ok(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(salt: &str) -> AddressCodec {
        AddressCodec::new(salt, MimeMap::default()).unwrap()
    }

    fn ts(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    #[test]
    fn token_is_deterministic_and_url_safe() {
        let codec = codec("salt");
        let id = Uuid::now_v7();
        let a = codec.encode(id, ts(1_700_000_000));
        let b = codec.encode(id, ts(1_700_000_000));

        assert_eq!(a, b);
        assert_eq!(a.len(), TOKEN_LENGTH);
        assert!(a.bytes().all(|c| TOKEN_ALPHABET.contains(&c)));
    }

    #[test]
    fn different_inputs_produce_different_tokens() {
        let codec = codec("salt");
        let id = Uuid::now_v7();
        let other = Uuid::now_v7();

        assert_ne!(codec.encode(id, ts(1)), codec.encode(id, ts(2)));
        assert_ne!(codec.encode(id, ts(1)), codec.encode(other, ts(1)));
    }

    #[test]
    fn salt_changes_tokens() {
        let id = Uuid::nil();
        assert_ne!(codec("a").encode(id, ts(1)), codec("b").encode(id, ts(1)));
    }

    #[test]
    fn identifier_appends_extension() {
        let codec = codec("salt");
        let identifier = codec.identifier(Uuid::nil(), ts(1), "image/png").unwrap();
        assert!(identifier.ends_with(".png"));
        assert_eq!(identifier.len(), TOKEN_LENGTH + 4);
    }

    #[test]
    fn identifier_rejects_unmapped_types() {
        let err = codec("salt")
            .identifier(Uuid::nil(), ts(1), "application/pdf")
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedMimeType);
    }

    #[test]
    fn empty_salt_is_rejected() {
        assert!(AddressCodec::new("", MimeMap::default()).is_err());
    }
}

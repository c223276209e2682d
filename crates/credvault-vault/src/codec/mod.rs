// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version-tagged encode/decode strategies for stored secrets.
//!
//! These transforms are obfuscation, not encryption: they keep secrets out of
//! casual view in the host store and give every payload a format version so
//! older data can be recognized and migrated. Decoding is a `Result`; a
//! payload no codec accepts is a [`VaultError::Decode`], never a panic.

pub mod plain;
pub mod v1;
pub mod v2;

use std::sync::LazyLock;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use credvault_core::{BackendKind, CodecVersion, EncodedValue, VaultError};
use regex::Regex;
use zeroize::Zeroizing;

pub use plain::PlainCodec;
pub use v1::LegacyV1Codec;
pub use v2::{V2Codec, V2_PREFIX, V2_TAG};

/// Standard alphabet; padding optional and trailing bits tolerated on decode.
pub(crate) const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

static BASE64_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/]*={0,2}$").expect("static base64 pattern"));

/// True iff `s` only uses the base64 alphabet with at most two trailing `=`.
pub(crate) fn is_base64_shaped(s: &str) -> bool {
    BASE64_SHAPE.is_match(s)
}

pub(crate) fn decode_error(codec: CodecVersion, reason: impl Into<String>) -> VaultError {
    VaultError::Decode {
        codec,
        reason: reason.into(),
    }
}

pub(crate) fn require_plaintext(plaintext: &str) -> Result<(), VaultError> {
    if plaintext.is_empty() {
        return Err(VaultError::Validation(
            "cannot encode an empty secret".to_string(),
        ));
    }
    Ok(())
}

/// A version-tagged encode/decode strategy.
pub trait Codec: Send + Sync {
    /// The format version this codec reads and writes.
    fn version(&self) -> CodecVersion;

    /// Structural check: does this codec recognize `payload`?
    fn can_handle(&self, payload: &str) -> bool;

    /// Encode a non-empty plaintext. Decode-only codecs keep the default.
    fn encode(&self, _plaintext: &str) -> Result<EncodedValue, VaultError> {
        Err(VaultError::Validation(format!(
            "{} codec is decode-only",
            self.version()
        )))
    }

    /// Decode a value back to its plaintext.
    fn decode(&self, value: &EncodedValue) -> Result<Zeroizing<String>, VaultError>;
}

/// A successfully decoded payload and the codec that accepted it.
pub struct Decoded {
    pub plaintext: Zeroizing<String>,
    pub version: CodecVersion,
}

/// Ordered codec candidates, never empty. The first codec is the writer; decoding tries
/// every candidate whose `can_handle` accepts the payload, in order.
pub struct CodecChain {
    codecs: Vec<Box<dyn Codec>>,
}

impl std::fmt::Debug for CodecChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let versions: Vec<CodecVersion> = self.codecs.iter().map(|c| c.version()).collect();
        f.debug_struct("CodecChain").field("codecs", &versions).finish()
    }
}

impl CodecChain {
    /// `[V2, V1]`: writes V2, still reads legacy V1 payloads.
    pub fn obfuscated() -> Self {
        Self {
            codecs: vec![Box::new(V2Codec), Box::new(LegacyV1Codec)],
        }
    }

    /// `[Plain]`: stores secrets unchanged.
    pub fn plaintext() -> Self {
        Self {
            codecs: vec![Box::new(PlainCodec)],
        }
    }

    /// The chain a backend of the given kind uses.
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Encrypted => Self::obfuscated(),
            BackendKind::Plaintext => Self::plaintext(),
        }
    }

    /// The codec new values are written with.
    pub fn writer(&self) -> &dyn Codec {
        self.codecs[0].as_ref()
    }

    /// Encode with the writer codec.
    pub fn encode(&self, plaintext: &str) -> Result<EncodedValue, VaultError> {
        self.writer().encode(plaintext)
    }

    /// True iff the writer already recognizes `payload` (nothing to migrate).
    pub fn is_current(&self, payload: &str) -> bool {
        self.writer().can_handle(payload)
    }

    /// The version of the first candidate that recognizes `payload`.
    pub fn classify(&self, payload: &str) -> Option<CodecVersion> {
        self.codecs
            .iter()
            .find(|c| c.can_handle(payload))
            .map(|c| c.version())
    }

    /// Decode `payload` with the first candidate that recognizes and decodes it.
    pub fn decode(&self, payload: &str) -> Result<Decoded, VaultError> {
        let mut last_error = None;
        for codec in self.codecs.iter().filter(|c| c.can_handle(payload)) {
            let value = EncodedValue::new(codec.version(), payload);
            match codec.decode(&value) {
                Ok(plaintext) => {
                    return Ok(Decoded {
                        plaintext,
                        version: codec.version(),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(last_error.unwrap_or_else(|| {
            decode_error(self.writer().version(), "no codec recognizes the payload")
        }))
    }
}

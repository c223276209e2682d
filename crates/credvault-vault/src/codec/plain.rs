// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use credvault_core::{CodecVersion, EncodedValue, VaultError};
use zeroize::Zeroizing;

use super::{Codec, decode_error, require_plaintext};

/// Identity codec used by the plaintext backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn version(&self) -> CodecVersion {
        CodecVersion::Plain
    }

    fn can_handle(&self, _payload: &str) -> bool {
        true
    }

    fn encode(&self, plaintext: &str) -> Result<EncodedValue, VaultError> {
        require_plaintext(plaintext)?;
        Ok(EncodedValue::new(CodecVersion::Plain, plaintext))
    }

    fn decode(&self, value: &EncodedValue) -> Result<Zeroizing<String>, VaultError> {
        if value.payload.is_empty() {
            return Err(decode_error(CodecVersion::Plain, "empty payload"));
        }
        Ok(Zeroizing::new(value.payload.clone()))
    }
}

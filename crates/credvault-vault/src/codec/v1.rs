// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Legacy untagged codec. Decode-only: it exists so payloads written before
//! the V2 tag can still be read once and migrated.

use base64::Engine;
use credvault_core::{CodecVersion, EncodedValue, VaultError};
use zeroize::Zeroizing;

use super::{BASE64, Codec, V2_PREFIX, decode_error, is_base64_shaped};

const SHIFT: u32 = 3;

/// Best-effort reader for pre-V2 payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyV1Codec;

fn unshift(payload: &str) -> Option<String> {
    payload
        .chars()
        .map(|c| {
            let code = c as u32;
            if code >= SHIFT {
                char::from_u32(code - SHIFT)
            } else {
                Some(c)
            }
        })
        .collect()
}

impl Codec for LegacyV1Codec {
    fn version(&self) -> CodecVersion {
        CodecVersion::V1
    }

    fn can_handle(&self, payload: &str) -> bool {
        !payload.starts_with(V2_PREFIX)
    }

    fn decode(&self, value: &EncodedValue) -> Result<Zeroizing<String>, VaultError> {
        let b64 = unshift(&value.payload)
            .map(Zeroizing::new)
            .ok_or_else(|| decode_error(CodecVersion::V1, "shift left an invalid code point"))?;
        if !is_base64_shaped(&b64) {
            return Err(decode_error(CodecVersion::V1, "payload is not base64"));
        }
        let bytes = BASE64
            .decode(b64.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| decode_error(CodecVersion::V1, format!("base64: {e}")))?;
        if bytes.is_empty() {
            return Err(decode_error(CodecVersion::V1, "decoded value is empty"));
        }
        // Legacy writers were not always UTF-8 clean; fall back to Latin-1.
        let text = match std::str::from_utf8(&bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
        };
        Ok(Zeroizing::new(text))
    }
}

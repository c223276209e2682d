// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Current tagged codec: base64 of the UTF-8 bytes, then a case-preserving
//! letter rotation and a digit rotation, behind a literal version tag.

use base64::Engine;
use credvault_core::{CodecVersion, EncodedValue, VaultError};
use zeroize::Zeroizing;

use super::{BASE64, Codec, decode_error, is_base64_shaped, require_plaintext};

/// Format tag carried by every V2 payload.
pub const V2_TAG: &str = "CSMU_ENC_V2";

/// The literal payload prefix: tag plus separator.
pub const V2_PREFIX: &str = "CSMU_ENC_V2:";

const LETTER_SHIFT: u8 = 13;
const DIGIT_SHIFT: u8 = 5;

/// Reversible codec for everything the encrypted backend writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Codec;

fn rotate(c: u8, base: u8, modulus: u8, shift: u8) -> u8 {
    (c - base + shift) % modulus + base
}

/// Apply the substitution. `forward == false` undoes it.
fn substitute(input: &str, forward: bool) -> String {
    let (letters, digits) = if forward {
        (LETTER_SHIFT, DIGIT_SHIFT)
    } else {
        (26 - LETTER_SHIFT, 10 - DIGIT_SHIFT)
    };
    input
        .chars()
        .map(|c| match c {
            'A'..='Z' => rotate(c as u8, b'A', 26, letters) as char,
            'a'..='z' => rotate(c as u8, b'a', 26, letters) as char,
            '0'..='9' => rotate(c as u8, b'0', 10, digits) as char,
            other => other,
        })
        .collect()
}

impl Codec for V2Codec {
    fn version(&self) -> CodecVersion {
        CodecVersion::V2
    }

    fn can_handle(&self, payload: &str) -> bool {
        payload.starts_with(V2_PREFIX)
    }

    fn encode(&self, plaintext: &str) -> Result<EncodedValue, VaultError> {
        require_plaintext(plaintext)?;
        let b64 = Zeroizing::new(BASE64.encode(plaintext.as_bytes()));
        let payload = format!("{V2_PREFIX}{}", substitute(&b64, true));
        Ok(EncodedValue::new(CodecVersion::V2, payload))
    }

    fn decode(&self, value: &EncodedValue) -> Result<Zeroizing<String>, VaultError> {
        let body = value
            .payload
            .strip_prefix(V2_PREFIX)
            .ok_or_else(|| decode_error(CodecVersion::V2, "missing version tag"))?;

        let b64 = Zeroizing::new(substitute(body, false));
        if !is_base64_shaped(&b64) {
            return Err(decode_error(CodecVersion::V2, "payload is not base64"));
        }
        let bytes = BASE64
            .decode(b64.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| decode_error(CodecVersion::V2, format!("base64: {e}")))?;
        let text = String::from_utf8(bytes.to_vec())
            .map(Zeroizing::new)
            .map_err(|_| decode_error(CodecVersion::V2, "decoded bytes are not UTF-8"))?;
        if text.is_empty() {
            return Err(decode_error(CodecVersion::V2, "decoded value is empty"));
        }
        Ok(text)
    }
}

// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for raw persisted values, including formats the vault no longer writes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};

/// Encode `plaintext` the way pre-V2 clients did: base64 of the UTF-8 bytes,
/// then every character shifted up by three code points.
pub fn legacy_v1_payload(plaintext: &str) -> String {
    STANDARD
        .encode(plaintext.as_bytes())
        .chars()
        .map(|c| char::from(c as u8 + 3))
        .collect()
}

/// The JSON persisted under `credential.slot`, with an arbitrary secret payload.
pub fn stored_credential_json(
    identifier: &str,
    secret_payload: &str,
    role: &str,
    saved_at: DateTime<Utc>,
) -> String {
    serde_json::json!({
        "identifier": identifier,
        "secret": secret_payload,
        "role": role,
        "saved_at": saved_at,
    })
    .to_string()
}

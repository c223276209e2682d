// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via TTY prompt or the CREDVAULT_SECRET environment variable.

use credvault_core::VaultError;
use secrecy::SecretString;

/// The environment variable name for providing a secret non-interactively.
pub const SECRET_ENV_VAR: &str = "CREDVAULT_SECRET";

/// Get the secret for `identifier` from the environment or a TTY prompt.
///
/// Priority:
/// 1. `CREDVAULT_SECRET` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn read_secret(identifier: &str) -> Result<SecretString, VaultError> {
    if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
        if !secret.is_empty() {
            return Ok(SecretString::from(secret));
        }
    }

    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let secret = rpassword::prompt_password(format!("Password for {identifier}: "))
            .map_err(|e| VaultError::Validation(format!("failed to read password: {e}")))?;
        if secret.is_empty() {
            return Err(VaultError::Validation("empty password not allowed".to_string()));
        }
        return Ok(SecretString::from(secret));
    }

    Err(VaultError::Validation(format!(
        "No password provided. Set {SECRET_ENV_VAR} or run interactively."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    #[serial]
    fn secret_from_env_var() {
        // SAFETY: env mutation is confined to #[serial] tests.
        unsafe { std::env::set_var(SECRET_ENV_VAR, "from-env") };
        let result = read_secret("U1");
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };

        assert_eq!(result.unwrap().expose_secret(), "from-env");
    }

    #[test]
    #[serial]
    fn empty_env_var_is_ignored() {
        unsafe { std::env::set_var(SECRET_ENV_VAR, "") };
        // Test stdin is not a terminal, so there is no fallback.
        let result = read_secret("U1");
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };

        assert!(result.is_err());
    }
}

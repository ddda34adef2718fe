//! Basic authentication for protected redirects
//!
//! The `Authorization` header can carry multiple comma separated credentials, each of them is
//! checked on its own. Malformed credentials are skipped, they never fail the whole check.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use subtle::Choice;
use subtle::ConstantTimeEq;

/// Check the raw `Authorization` header against the expected username and password
///
/// A missing header never matches
pub fn verify(header: Option<&str>, username: &str, password: &str) -> bool {
    let Some(header) = header else {
        return false;
    };

    header
        .split(',')
        .any(|candidate| verify_candidate(candidate, username, password))
}

/// Check a single `<scheme> <payload>` credential
fn verify_candidate(candidate: &str, username: &str, password: &str) -> bool {
    let Some((scheme, payload)) = candidate.trim_start().split_once(' ') else {
        return false;
    };

    if !scheme.eq_ignore_ascii_case("basic") {
        return false;
    }

    let Ok(decoded) = STANDARD.decode(payload.trim()) else {
        return false;
    };

    let Some(separator) = decoded.iter().position(|byte| *byte == b':') else {
        return false;
    };

    let (provided_username, provided_password) = (&decoded[..separator], &decoded[separator + 1..]);

    // both sides are always compared
    let valid = constant_time_eq(provided_username, username.as_bytes())
        & constant_time_eq(provided_password, password.as_bytes());

    valid.into()
}

/// Compare two byte strings without bailing out on the first difference
///
/// The amount of work only depends on the length of the expected value.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> Choice {
    let mut result = provided.len().ct_eq(&expected.len());

    for (index, byte) in expected.iter().enumerate() {
        let other = provided.get(index).copied().unwrap_or_default();
        result &= byte.ct_eq(&other);
    }

    result
}

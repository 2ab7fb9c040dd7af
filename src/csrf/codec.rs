//! CSRF secret and token primitives.
//!
//! A secret is raw random bytes held by the client in an HTTP-only cookie.
//! A token is `base64url(salt) . base64url(HMAC-SHA256(secret, salt))`:
//! possession of a token proves nothing without the secret cookie, and a
//! token can only be checked by re-deriving the binding — there is nothing
//! server-side to compare against.

use anyhow::{Context, Result, anyhow};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Mint a fresh secret from the OS CSPRNG.
///
/// # Errors
///
/// Returns an error if the system random source fails.
pub fn mint_secret(len: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to mint CSRF secret")?;
    Ok(bytes)
}

/// Cookie encoding for a secret.
#[must_use]
pub fn encode_secret(secret: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(secret)
}

/// Decode a secret cookie value. `None` covers tampered or truncated
/// values; callers treat that the same as a missing cookie.
#[must_use]
pub fn decode_secret(value: &str) -> Option<Vec<u8>> {
    let bytes = URL_SAFE_NO_PAD.decode(value.as_bytes()).ok()?;
    if bytes.is_empty() { None } else { Some(bytes) }
}

/// Derive a token bound to `secret` with a fresh random salt.
///
/// # Errors
///
/// Returns an error if the random source fails or the keyed hash cannot be
/// initialized.
pub fn derive_token(secret: &[u8], salt_len: usize) -> Result<String> {
    let mut salt = vec![0u8; salt_len];
    OsRng
        .try_fill_bytes(&mut salt)
        .context("failed to generate token salt")?;

    let mac = bind(secret, &salt)?;
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(&salt),
        URL_SAFE_NO_PAD.encode(mac)
    ))
}

/// Verify a token against a secret by recomputing the binding from the
/// embedded salt. Malformed input of any shape fails closed.
#[must_use]
pub fn verify_token(token: &str, secret: &[u8]) -> bool {
    let Some((salt_part, mac_part)) = token.split_once('.') else {
        return false;
    };
    let Ok(salt) = URL_SAFE_NO_PAD.decode(salt_part.as_bytes()) else {
        return false;
    };
    let Ok(presented) = URL_SAFE_NO_PAD.decode(mac_part.as_bytes()) else {
        return false;
    };
    let Ok(expected) = bind(secret, &salt) else {
        return false;
    };

    expected.ct_eq(&presented).into()
}

fn bind(secret: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| anyhow!("invalid CSRF secret key length"))?;
    mac.update(salt);
    Ok(mac.finalize().into_bytes().to_vec())
}

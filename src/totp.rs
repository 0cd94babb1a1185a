//! Time-based one-time codes (RFC 6238).
//!
//! An entry's `totp_secret` is either a bare base32 secret or an
//! `otpauth://totp/...` URI.  Nothing here touches the vault file.

use data_encoding::BASE32_NOPAD;
use subtle::ConstantTimeEq;
use totp_lite::{totp_custom, Sha1, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Default time step in seconds.
pub const DEFAULT_PERIOD: u64 = 30;

/// Default code length.
pub const DEFAULT_DIGITS: u32 = 6;

/// HMAC hash used to derive codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TotpAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
}

impl TotpAlgorithm {
    fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            other => Err(VaultError::Totp(format!("unsupported algorithm '{other}'"))),
        }
    }
}

/// Decoded TOTP parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct TotpParams {
    secret: Zeroizing<Vec<u8>>,
    pub algorithm: TotpAlgorithm,
    pub digits: u32,
    pub period: u64,
}

impl std::fmt::Debug for TotpParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TotpParams")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("digits", &self.digits)
            .field("period", &self.period)
            .finish()
    }
}

impl TotpParams {
    /// Parse a bare base32 secret or an `otpauth://totp/` URI.
    ///
    /// URI query keys are matched case-insensitively; `secret` is
    /// required, `algorithm`, `digits` and `period` fall back to
    /// SHA1 / 6 / 30.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let Some(rest) = strip_prefix_ignore_case(input, "otpauth://") else {
            return Ok(Self {
                secret: decode_secret(input)?,
                algorithm: TotpAlgorithm::Sha1,
                digits: DEFAULT_DIGITS,
                period: DEFAULT_PERIOD,
            });
        };

        let Some(rest) = strip_prefix_ignore_case(rest, "totp/") else {
            return Err(VaultError::Totp("only otpauth://totp URIs are supported".into()));
        };
        let query = rest.split_once('?').map(|(_, q)| q).unwrap_or("");

        let mut secret = None;
        let mut algorithm = TotpAlgorithm::Sha1;
        let mut digits = DEFAULT_DIGITS;
        let mut period = DEFAULT_PERIOD;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key.to_ascii_lowercase().as_str() {
                "secret" => secret = Some(decode_secret(value)?),
                "algorithm" => algorithm = TotpAlgorithm::parse(value)?,
                "digits" => {
                    digits = value
                        .parse()
                        .map_err(|_| VaultError::Totp(format!("invalid digits '{value}'")))?;
                }
                "period" => {
                    period = value
                        .parse()
                        .map_err(|_| VaultError::Totp(format!("invalid period '{value}'")))?;
                }
                // issuer, image, ... are display-only.
                _ => {}
            }
        }

        if digits != 6 && digits != 8 {
            return Err(VaultError::Totp("digits must be 6 or 8".into()));
        }
        if period == 0 {
            return Err(VaultError::Totp("period must be greater than zero".into()));
        }

        Ok(Self {
            secret: secret.ok_or_else(|| VaultError::Totp("URI has no secret".into()))?,
            algorithm,
            digits,
            period,
        })
    }

    /// The code for the time step containing `timestamp` (Unix seconds).
    pub fn code_at(&self, timestamp: u64) -> String {
        let secret: &[u8] = &self.secret;
        match self.algorithm {
            TotpAlgorithm::Sha1 => totp_custom::<Sha1>(self.period, self.digits, secret, timestamp),
            TotpAlgorithm::Sha256 => {
                totp_custom::<Sha256>(self.period, self.digits, secret, timestamp)
            }
            TotpAlgorithm::Sha512 => {
                totp_custom::<Sha512>(self.period, self.digits, secret, timestamp)
            }
        }
    }

    /// Seconds until the code for `timestamp` rolls over.
    pub fn remaining_seconds(&self, timestamp: u64) -> u64 {
        self.period - timestamp % self.period
    }
}

/// RFC 6238 code for `secret` at `timestamp` (Unix seconds).
pub fn compute_code(secret: &str, timestamp: u64) -> Result<String> {
    Ok(TotpParams::parse(secret)?.code_at(timestamp))
}

/// Check `code` against the current step and one step either side.
///
/// All candidate codes are compared in constant time.
pub fn validate_code(secret: &str, code: &str, timestamp: u64) -> Result<bool> {
    let params = TotpParams::parse(secret)?;
    let previous = timestamp.checked_sub(params.period);
    let next = timestamp.checked_add(params.period);

    let mut matched = subtle::Choice::from(0u8);
    for at in [previous, Some(timestamp), next].into_iter().flatten() {
        let candidate = Zeroizing::new(params.code_at(at));
        matched |= candidate.as_bytes().ct_eq(code.trim().as_bytes());
    }
    Ok(bool::from(matched))
}

/// Seconds until a default 30-second code rolls over.
pub fn remaining_seconds(timestamp: u64) -> u64 {
    DEFAULT_PERIOD - timestamp % DEFAULT_PERIOD
}

fn decode_secret(secret: &str) -> Result<Zeroizing<Vec<u8>>> {
    let normalized: Zeroizing<String> = Zeroizing::new(
        secret
            .chars()
            .filter(|ch| !ch.is_ascii_whitespace() && *ch != '=' && *ch != '-')
            .map(|ch| ch.to_ascii_uppercase())
            .collect(),
    );
    if normalized.is_empty() {
        return Err(VaultError::Totp("secret is empty".into()));
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map(Zeroizing::new)
        .map_err(|_| VaultError::Totp("secret is not valid base32".into()))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

//! Email address helpers shared by the stores and the recipient resolver.

use crate::error::{CoreError, Result};

/// Normalizes an address for storage and comparison.
///
/// Addresses are compared after trimming and ASCII-lowercasing, so a user
/// registered as `A@x.com` and listed as `a@x.com` is a single recipient.
pub fn normalize_email(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Minimal shape check for an email address.
///
/// This is not RFC 5321 validation; the delivery transport performs its own
/// parsing. It only rejects input that cannot possibly be an address.
pub fn validate_email(address: &str) -> Result<()> {
    let trimmed = address.trim();
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || domain.contains(' ') {
        return Err(CoreError::invalid_email(address));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_validate_email_accepts_plain_addresses() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("  bob@campus.edu ").is_ok());
    }

    #[test]
    fn test_validate_email_rejects_garbage() {
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@bad domain").is_err());
    }
}

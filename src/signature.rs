//! GitHub webhook signature verification.
//!
//! GitHub signs every delivery with HMAC-SHA256 keyed by the shared webhook
//! secret and sends the result in the `X-Hub-Signature-256` header as
//! `sha256=<hex digest>`. The digest covers the request body exactly as it
//! was sent, so verification must run over the raw bytes and never over a
//! re-serialized JSON value.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix GitHub puts in front of the hex digest.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the `X-Hub-Signature-256` header value for `body`.
///
/// # Example
///
/// ```
/// use gh_relay::signature::{sign, verify};
///
/// let header = sign("s3cret", b"{}");
/// assert!(header.starts_with("sha256="));
/// assert!(verify("s3cret", b"{}", Some(&header)));
/// ```
#[must_use]
pub fn sign(secret: &str, body: &[u8]) -> String {
    let mac = keyed_mac(secret, body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a provided signature header against the raw request body.
///
/// Returns `false` when the header is absent, lacks the `sha256=` prefix,
/// is not valid hex, or does not match. The digest comparison runs in
/// constant time.
#[must_use]
pub fn verify(secret: &str, body: &[u8], provided: Option<&str>) -> bool {
    let Some(digest_hex) = provided.and_then(|p| p.strip_prefix(SIGNATURE_PREFIX)) else {
        return false;
    };

    let Ok(digest) = hex::decode(digest_hex) else {
        return false;
    };

    keyed_mac(secret, body).verify_slice(&digest).is_ok()
}

fn keyed_mac(secret: &str, body: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC can take a key of any size"));
    mac.update(body);
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "It's a Secret to Everybody";
    const BODY: &[u8] = b"Hello, World!";

    #[test]
    fn matches_github_documented_example() {
        // Test vector from GitHub's "Validating webhook deliveries" guide.
        assert_eq!(
            sign(SECRET, BODY),
            "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
        );
    }

    #[test]
    fn signed_body_verifies() {
        let header = sign(SECRET, BODY);
        assert!(verify(SECRET, BODY, Some(&header)));
    }

    #[test]
    fn any_single_byte_mutation_invalidates() {
        let header = sign(SECRET, BODY);

        for i in 0..BODY.len() {
            let mut mutated = BODY.to_vec();
            mutated[i] ^= 0x01;
            assert!(
                !verify(SECRET, &mutated, Some(&header)),
                "mutation at byte {i} still verified"
            );
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let header = sign(SECRET, BODY);
        assert!(!verify("another secret", BODY, Some(&header)));
    }

    #[test]
    fn missing_header_fails() {
        assert!(!verify(SECRET, BODY, None));
    }

    #[test]
    fn missing_prefix_fails() {
        let header = sign(SECRET, BODY);
        let bare = header.trim_start_matches(SIGNATURE_PREFIX);
        assert!(!verify(SECRET, BODY, Some(bare)));
    }

    #[test]
    fn sha1_style_header_fails() {
        assert!(!verify(
            SECRET,
            BODY,
            Some("sha1=0a4d55a8d778e5022fab701977c5d840bbc486d0")
        ));
    }

    #[test]
    fn non_hex_digest_fails() {
        assert!(!verify(SECRET, BODY, Some("sha256=not-hex-at-all")));
    }

    #[test]
    fn truncated_digest_fails() {
        let header = sign(SECRET, BODY);
        assert!(!verify(SECRET, BODY, Some(&header[..header.len() - 2])));
    }

    #[test]
    fn whitespace_difference_in_json_fails() {
        let compact = br#"{"action":"created"}"#;
        let spaced = br#"{"action": "created"}"#;
        let header = sign(SECRET, compact);

        assert!(verify(SECRET, compact, Some(&header)));
        assert!(!verify(SECRET, spaced, Some(&header)));
    }

    #[test]
    fn empty_body_round_trips() {
        let header = sign(SECRET, b"");
        assert!(verify(SECRET, b"", Some(&header)));
    }
}

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HANDSHAKE_KEY: &[u8] = b"training-bot handshake";

/// Checks bearer tokens without comparing raw bytes: both sides are reduced to
/// an HMAC tag and compared with `verify_slice`, which is constant-time.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    expected: Vec<u8>,
}

impl TokenVerifier {
    pub fn new(token: &str) -> anyhow::Result<Self> {
        let mac = keyed(token)?;
        Ok(Self {
            expected: mac.finalize().into_bytes().to_vec(),
        })
    }

    pub fn verify(&self, presented: &str) -> bool {
        keyed(presented).is_ok_and(|mac| mac.verify_slice(&self.expected).is_ok())
    }
}

fn keyed(token: &str) -> anyhow::Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(HANDSHAKE_KEY)
        .map_err(|e| anyhow::anyhow!("failed to initialize token verifier: {e}"))?;
    mac.update(token.as_bytes());
    Ok(mac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_matching_token() {
        let verifier = TokenVerifier::new("secret").unwrap();
        assert!(verifier.verify("secret"));
    }

    #[test]
    fn test_verify_rejects_other_tokens() {
        let verifier = TokenVerifier::new("secret").unwrap();
        assert!(!verifier.verify("secret "));
        assert!(!verifier.verify("Secret"));
        assert!(!verifier.verify(""));
    }
}

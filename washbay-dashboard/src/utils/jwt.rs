use anyhow::Result;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

/// Claims the car-wash API puts in its access tokens.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    /// User email.
    pub sub: String,
    #[serde(default)]
    pub is_demo: bool,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode token claims without validation.
///
/// The token was just handed to us by the API over the login call, and it is
/// only ever sent back to that same API, which does the verification. The
/// claims are read for display and expiry bookkeeping only.
pub fn decode_token_claims(token: &str) -> Result<TokenClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return Err(anyhow::anyhow!("Invalid JWT format"));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow::anyhow!("Failed to decode JWT payload: {}", e))?;

    let claims: TokenClaims = serde_json::from_slice(&payload)
        .map_err(|e| anyhow::anyhow!("Failed to parse JWT claims: {}", e))?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.sig",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn decodes_subject_and_expiry() {
        let token = token_with(r#"{"sub":"owner@carwash.test","exp":1893456000}"#);
        let claims = decode_token_claims(&token).unwrap();
        assert_eq!(claims.sub, "owner@carwash.test");
        assert_eq!(claims.exp, Some(1893456000));
        assert!(!claims.is_demo);
    }

    #[test]
    fn demo_flag_is_read_when_present() {
        let token = token_with(r#"{"sub":"demo@carwash.test","is_demo":true}"#);
        assert!(decode_token_claims(&token).unwrap().is_demo);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(decode_token_claims("not-a-token").is_err());
        assert!(decode_token_claims("a.%%%.c").is_err());
    }
}

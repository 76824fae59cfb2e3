use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;

use crate::errors::AppError;

type HmacSha1 = Hmac<Sha1>;

#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn mac(secret: &str, payload: &str) -> Result<HmacSha1, AppError> {
    let mut m = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(format!("invalid session secret: {e}")))?;
    m.update(payload.as_bytes());
    Ok(m)
}

pub fn check_password(secret: &str, expected: &str, submitted: &str) -> bool {
    let (Ok(expected), Ok(submitted)) = (mac(secret, expected), mac(secret, submitted)) else {
        return false;
    };
    submitted
        .verify_slice(&expected.finalize().into_bytes())
        .is_ok()
}

pub fn issue(secret: &str, ttl_minutes: i64, now: DateTime<Utc>) -> Result<SessionToken, AppError> {
    let expires_at = now + Duration::minutes(ttl_minutes);
    let payload = format!("{}.{}", expires_at.timestamp(), uuid::Uuid::new_v4().simple());
    let signature = URL_SAFE_NO_PAD.encode(mac(secret, &payload)?.finalize().into_bytes());

    Ok(SessionToken {
        token: format!("{payload}.{signature}"),
        expires_at,
    })
}

pub fn verify(secret: &str, token: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    let (payload, signature) = token.rsplit_once('.').ok_or(AppError::Unauthorized)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AppError::Unauthorized)?;

    mac(secret, payload)?
        .verify_slice(&signature)
        .map_err(|_| AppError::Unauthorized)?;

    let expires: i64 = payload
        .split_once('.')
        .and_then(|(exp, _)| exp.parse().ok())
        .ok_or(AppError::Unauthorized)?;

    if now.timestamp() >= expires {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_check_password() {
        assert!(check_password(SECRET, "hunter2", "hunter2"));
        assert!(!check_password(SECRET, "hunter2", "hunter3"));
        assert!(!check_password(SECRET, "hunter2", ""));
    }

    #[test]
    fn test_issued_token_verifies() {
        let now = Utc::now();
        let session = issue(SECRET, 60, now).unwrap();
        assert!(verify(SECRET, &session.token, now).is_ok());
        assert_eq!(session.expires_at, now + Duration::minutes(60));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let session = issue(SECRET, 60, now).unwrap();
        let later = now + Duration::minutes(61);
        assert!(matches!(verify(SECRET, &session.token, later), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let now = Utc::now();
        let session = issue(SECRET, 60, now).unwrap();

        // Push the expiry out by rewriting the payload
        let (_, rest) = session.token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", now.timestamp() + 100_000);
        assert!(verify(SECRET, &forged, now).is_err());

        assert!(verify("other-secret", &session.token, now).is_err());
        assert!(verify(SECRET, "garbage", now).is_err());
        assert!(verify(SECRET, "", now).is_err());
    }
}

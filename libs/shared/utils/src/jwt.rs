use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{JwtClaims, Session, User};

type HmacSha256 = Hmac<Sha256>;

/// Verifies an HS256 access token and returns the user it was issued to.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    let (claims, _) = verify(token, jwt_secret)?;
    Ok(user_from_claims(claims))
}

/// Verifies an access token and wraps it into a [`Session`].
pub fn session_from_token(token: &str, jwt_secret: &str) -> Result<Session, String> {
    let (claims, expires_at) = verify(token, jwt_secret)?;
    Ok(Session {
        access_token: token.to_string(),
        user: user_from_claims(claims),
        expires_at,
    })
}

fn verify(token: &str, jwt_secret: &str) -> Result<(JwtClaims, Option<DateTime<Utc>>), String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let parts: Vec<&str> = token.split('.').collect();
    let [header_b64, claims_b64, signature_b64] = parts[..] else {
        return Err("Invalid token format".to_string());
    };

    let signature = URL_SAFE_NO_PAD.decode(signature_b64).map_err(|e| {
        debug!("Failed to decode signature: {}", e);
        "Invalid signature encoding".to_string()
    })?;

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(format!("{}.{}", header_b64, claims_b64).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    let claims_json = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| "Invalid claims encoding".to_string())?;

    let claims: JwtClaims = serde_json::from_str(&claims_json).map_err(|e| {
        debug!("Failed to parse claims: {}", e);
        "Invalid claims format".to_string()
    })?;

    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let expires_at = claims.exp.and_then(|exp| Utc.timestamp_opt(exp as i64, 0).single());

    debug!("Token validated successfully for user: {}", claims.sub);
    Ok((claims, expires_at))
}

fn user_from_claims(claims: JwtClaims) -> User {
    let created_at = claims
        .iat
        .and_then(|iat| Utc.timestamp_opt(iat as i64, 0).single());

    User {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        metadata: claims.user_metadata,
        created_at,
    }
}

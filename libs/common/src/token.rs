//! Signed access tokens shared by the auth and api services
//!
//! Tokens are HS256 JWTs binding a user id and nickname. The auth service
//! issues them at login; both services verify them on protected routes.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use thiserror::Error;

/// Errors raised while issuing or verifying tokens
#[derive(Error, Debug)]
pub enum TokenError {
    /// No bearer token was supplied
    #[error("Missing bearer token")]
    Missing,

    /// The token failed decoding, signature or claim validation
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// Configuration error
    #[error("Token configuration error: {0}")]
    Configuration(String),
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Shared HMAC secret
    pub secret: String,
    /// Access token lifetime in seconds; `None` issues tokens without `exp`
    pub access_token_expiry: Option<u64>,
}

impl TokenConfig {
    /// Create a new TokenConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: HMAC secret used to sign and verify tokens (required)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: Token lifetime in seconds (unset or 0: no expiry)
    pub fn from_env() -> Result<Self, TokenError> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| TokenError::Configuration("JWT_SECRET environment variable not set".into()))?;

        if secret.trim().is_empty() {
            return Err(TokenError::Configuration("JWT_SECRET must not be empty".into()));
        }

        let access_token_expiry = env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0);

        Ok(TokenConfig {
            secret,
            access_token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Nickname at issue time
    pub nickname: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

/// Authenticated caller extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub nickname: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.sub,
            nickname: claims.nickname,
        }
    }
}

/// Token issuing and verification service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        if config.access_token_expiry.is_some() {
            validation.validate_exp = true;
        } else {
            validation.validate_exp = false;
            validation.required_spec_claims = HashSet::new();
        }

        TokenService {
            encoding_key,
            decoding_key,
            validation,
            config,
        }
    }

    /// Issue an access token for a user
    pub fn issue(&self, user_id: &str, nickname: &str) -> Result<String, TokenError> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            nickname: nickname.to_string(),
            iat: now,
            exp: self.config.access_token_expiry.map(|secs| now + secs),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Validate a token and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate an optional bearer token and resolve the caller
    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthUser, TokenError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::Missing)?;
        Ok(self.verify(token)?.into())
    }

    /// Configured token lifetime in seconds
    pub fn access_token_expiry(&self) -> Option<u64> {
        self.config.access_token_expiry
    }
}

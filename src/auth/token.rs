use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Token, now};

const ARGON2_MEMORY: u32 = 64 * 1024; // 64KB
const ARGON2_ITERATIONS: u32 = 1;
const ARGON2_PARALLELISM: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32;

const TOKEN_PREFIX: &str = "photoshelf";
const LOOKUP_LENGTH: usize = 8;
const SECRET_BYTES: usize = 12;
const SECRET_LENGTH: usize = SECRET_BYTES * 2;
const MAX_ISSUE_ATTEMPTS: u32 = 3;

/// A freshly generated credential. `raw` is shown to the caller once and
/// never stored.
pub struct GeneratedToken {
    pub raw: String,
    pub lookup: String,
    pub hash: String,
}

pub struct TokenGenerator {
    argon2: Argon2<'static>,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Generates a token of the form `photoshelf_<lookup>_<secret>`.
    pub fn generate(&self) -> Result<GeneratedToken> {
        let lookup = Uuid::new_v4().to_string()[..LOOKUP_LENGTH].to_string();

        let mut bytes = [0u8; SECRET_BYTES];
        rand::thread_rng().fill(&mut bytes);
        let secret = hex::encode(bytes);

        let raw = format!("{TOKEN_PREFIX}_{lookup}_{secret}");
        let hash = self.hash(&raw)?;
        Ok(GeneratedToken { raw, lookup, hash })
    }

    pub fn hash(&self, token: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(token.as_bytes(), &salt)
            .map_err(|e| Error::Config(format!("failed to hash token: {e}")))?;
        Ok(hash.to_string())
    }

    pub fn verify(&self, token: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Config(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(token.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Config(format!("failed to verify token: {e}"))),
        }
    }

    /// Generates and persists a token, retrying on lookup collisions.
    /// Returns the stored row and the raw token string.
    pub fn issue(
        &self,
        store: &dyn Store,
        user_id: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(Token, String)> {
        for _ in 0..MAX_ISSUE_ATTEMPTS {
            let generated = self.generate()?;
            let token = Token {
                id: Uuid::new_v4().to_string(),
                token_hash: generated.hash,
                token_lookup: generated.lookup,
                is_admin: user_id.is_none(),
                user_id: user_id.map(str::to_string),
                created_at: now(),
                expires_at,
                last_used_at: None,
            };

            match store.create_token(&token) {
                Ok(()) => return Ok((token, generated.raw)),
                Err(Error::TokenLookupCollision) => {
                    tracing::debug!("token lookup collision, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::TokenLookupCollision)
    }
}

/// Splits a raw token into `(lookup, secret)`.
pub fn parse_token(token: &str) -> Result<(String, String)> {
    let rest = token
        .strip_prefix(TOKEN_PREFIX)
        .and_then(|r| r.strip_prefix('_'))
        .ok_or(Error::InvalidTokenFormat)?;

    let (lookup, secret) = rest.split_once('_').ok_or(Error::InvalidTokenFormat)?;

    if lookup.len() != LOOKUP_LENGTH || secret.len() != SECRET_LENGTH || secret.contains('_') {
        return Err(Error::InvalidTokenFormat);
    }

    Ok((lookup.to_string(), secret.to_string()))
}

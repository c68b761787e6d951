//! JWT-bearer assertion signing for the OAuth token exchange.

// crates.io
use jsonwebtoken::{Algorithm, EncodingKey, Header};
// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

/// Claim set carried by the bearer assertion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
	/// Issuer: the connected app's consumer key.
	pub iss: String,
	/// Subject: the username the integration acts as.
	pub sub: String,
	/// Expiry as a unix timestamp. Stamped with the issue instant; Salesforce validates
	/// the assertion within a short window around it.
	pub exp: i64,
	/// Audience: the login endpoint the assertion is presented to.
	pub aud: String,
}
impl AssertionClaims {
	/// Builds the claim set for `config`, stamped with the current UTC time.
	pub fn for_config(config: &ClientConfig) -> Self {
		Self {
			iss: config.client_id.clone(),
			sub: config.user.clone(),
			exp: OffsetDateTime::now_utc().unix_timestamp(),
			aud: config.audience.clone(),
		}
	}
}

/// Signs the JWT-bearer assertion for `config` with RS256 and header `{alg, typ: JWT}`.
pub fn sign_assertion(config: &ClientConfig) -> Result<String, ConfigError> {
	let key = EncodingKey::from_rsa_pem(config.private_key.as_bytes())
		.map_err(|source| ConfigError::InvalidPrivateKey { source })?;
	let claims = AssertionClaims::for_config(config);

	jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
		.map_err(|source| ConfigError::InvalidPrivateKey { source })
}

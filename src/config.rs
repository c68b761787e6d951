//! Validated plugin configuration.
//!
//! The pipeline host hands plugins a loose string mapping; [`ExtractorConfig::from_map`]
//! checks the required keys eagerly and produces the immutable structs every other module
//! consumes. Nothing here performs I/O.

// self
use crate::{_prelude::*, error::ConfigError};

/// Default audience for the JWT-bearer assertion: the production login endpoint.
pub const DEFAULT_AUDIENCE: &str = "https://login.salesforce.com";
/// Default Salesforce REST API version used for query URLs.
pub const DEFAULT_API_VERSION: &str = "v41.0";
/// Ordered configuration keys every extractor instance must provide.
pub const REQUIRED_CONFIG: [&str; 5] = ["client_id", "user", "instance", "key", "query"];

/// Immutable connection settings for one Salesforce org.
///
/// Constructed once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Connected-app consumer key; becomes the assertion's `iss` claim.
	pub client_id: String,
	/// Username the integration acts as; becomes the `sub` claim.
	pub user: String,
	/// PEM-encoded RSA private key used to sign the assertion.
	pub private_key: String,
	/// Vendor-assigned instance subdomain, for example `na1`.
	pub instance: String,
	/// Assertion audience; defaults to [`DEFAULT_AUDIENCE`].
	pub audience: String,
	/// REST API version for query URLs; defaults to [`DEFAULT_API_VERSION`].
	pub api_version: String,
}
impl ClientConfig {
	/// Builds a configuration with the default audience and API version.
	pub fn new(
		client_id: impl Into<String>,
		user: impl Into<String>,
		private_key: impl Into<String>,
		instance: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			user: user.into(),
			private_key: private_key.into(),
			instance: instance.into(),
			audience: DEFAULT_AUDIENCE.into(),
			api_version: DEFAULT_API_VERSION.into(),
		}
	}
}

/// Validated configuration for one extractor instance.
#[derive(Clone, Debug)]
pub struct ExtractorConfig {
	/// Identifier the host uses for this plugin instance.
	pub id: String,
	/// Connection settings handed to the API client.
	pub client: ClientConfig,
	/// SOQL query executed on every extraction run.
	pub query: String,
}
impl ExtractorConfig {
	/// Validates a raw configuration mapping from the host.
	///
	/// Every key in [`REQUIRED_CONFIG`] must be present; the optional `audience` and
	/// `apiVersion` keys override the client defaults when supplied. The snake_case
	/// `api_version` spelling is accepted as well.
	pub fn from_map(
		id: impl Into<String>,
		config: &BTreeMap<String, String>,
	) -> Result<Self, ConfigError> {
		let require = |key: &'static str| {
			config.get(key).cloned().ok_or(ConfigError::MissingKey { key })
		};
		let mut client = ClientConfig::new(
			require("client_id")?,
			require("user")?,
			require("key")?,
			require("instance")?,
		);

		if let Some(audience) = config.get("audience") {
			client.audience = audience.clone();
		}
		if let Some(api_version) = config.get("apiVersion").or_else(|| config.get("api_version")) {
			client.api_version = api_version.clone();
		}

		Ok(Self { id: id.into(), client, query: require("query")? })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn full_map() -> BTreeMap<String, String> {
		[
			("client_id", "test"),
			("user", "tester"),
			("instance", "na999"),
			("key", "private-key"),
			("query", "SELECT Id, Name FROM Accounts"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_owned(), v.to_owned()))
		.collect()
	}

	#[test]
	fn from_map_accepts_required_keys_and_applies_defaults() {
		let config = ExtractorConfig::from_map("testextract", &full_map())
			.expect("Full configuration should validate successfully.");

		assert_eq!(config.id, "testextract");
		assert_eq!(config.client.client_id, "test");
		assert_eq!(config.client.user, "tester");
		assert_eq!(config.client.private_key, "private-key");
		assert_eq!(config.client.instance, "na999");
		assert_eq!(config.client.audience, DEFAULT_AUDIENCE);
		assert_eq!(config.client.api_version, DEFAULT_API_VERSION);
		assert_eq!(config.query, "SELECT Id, Name FROM Accounts");
	}

	#[test]
	fn from_map_rejects_each_missing_required_key() {
		for key in REQUIRED_CONFIG {
			let mut map = full_map();

			map.remove(key);

			let err = ExtractorConfig::from_map("testextract", &map)
				.expect_err("Configuration lacking a required key should be rejected.");

			assert!(matches!(err, ConfigError::MissingKey { key: missing } if missing == key));
		}
	}

	#[test]
	fn from_map_honors_optional_overrides() {
		let mut map = full_map();

		map.insert("audience".into(), "https://test.salesforce.com".into());
		map.insert("apiVersion".into(), "v40.12".into());

		let config = ExtractorConfig::from_map("testextract", &map)
			.expect("Configuration with overrides should validate successfully.");

		assert_eq!(config.client.audience, "https://test.salesforce.com");
		assert_eq!(config.client.api_version, "v40.12");
	}

	#[test]
	fn from_map_accepts_the_snake_case_api_version_spelling() {
		let mut map = full_map();

		map.insert("api_version".into(), "v39.0".into());

		let config = ExtractorConfig::from_map("testextract", &map)
			.expect("Configuration with overrides should validate successfully.");

		assert_eq!(config.client.api_version, "v39.0");
	}
}

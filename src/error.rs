//! Plugin-wide error types shared by the client and the extractor adapter.
//!
//! Everything the plugin can raise converges into [`Error`], the "service error" category
//! the pipeline host expects. There is no internal recovery and no retry; any failure is
//! fatal for the extraction run that produced it.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical plugin error surfaced to the pipeline host.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Salesforce API failure, either transport-level or response-shape.
	#[error(transparent)]
	Api(#[from] ApiError),
}

/// Configuration and validation failures raised at construction time.
///
/// Required keys are checked eagerly so a bad deployment fails before the first network
/// call rather than partway through an extraction run.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required configuration key is absent.
	#[error("Required configuration key `{key}` is missing.")]
	MissingKey {
		/// Name of the absent key.
		key: &'static str,
	},
	/// The configured private key is not a usable RSA signing key.
	#[error("Private key is not a usable RSA signing key.")]
	InvalidPrivateKey {
		/// Underlying PEM or signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// The instance subdomain does not form a valid URL.
	#[error("Instance `{instance}` does not form a valid URL.")]
	InvalidInstance {
		/// Configured instance subdomain.
		instance: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Salesforce API failure.
///
/// Two causes share this taxonomy: transport failures (connection, protocol, timeout) and
/// response-shape failures (missing expected field, non-object body). Both are fatal and
/// carry enough context for the host's logs; neither is retried here.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Underlying HTTP call failed before a usable response was available.
	#[error("Error during {context}: {source}.")]
	Transport {
		/// Operation that was in flight.
		context: &'static str,
		/// Transport-specific failure.
		#[source]
		source: BoxError,
	},
	/// Salesforce answered with an error status.
	#[error("Salesforce returned HTTP {status} during {context}: {body}.")]
	Status {
		/// Operation that was in flight.
		context: &'static str,
		/// HTTP status code of the response.
		status: u16,
		/// Response body text, echoed for debugging.
		body: String,
	},
	/// Response body did not have the expected shape.
	#[error("Unexpected response from {context}: {payload}.")]
	UnexpectedResponse {
		/// Operation that was in flight.
		context: &'static str,
		/// Raw payload, echoed for debugging.
		payload: String,
	},
}
impl ApiError {
	/// Wraps a transport-specific failure with the operation it interrupted.
	pub fn transport(context: &'static str, src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Transport { context, source: Box::new(src) }
	}
}

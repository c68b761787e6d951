//! Client for Salesforce API transactions.
//!
//! [`SfClient`] owns the connection settings, performs the JWT-bearer token exchange, and
//! executes SOQL queries against the org's data plane. It keeps no cross-request state
//! beyond the bearer token and performs exactly one HTTP attempt per call: no retries, no
//! pagination, no rate limiting.

// crates.io
use reqwest::{Method, RequestBuilder, header::AUTHORIZATION};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	error::{ApiError, ConfigError},
	jwt,
};

/// Opaque record returned by a query; the client never interprets its schema.
pub type QueryRecord = Value;

/// Fixed production token endpoint for the JWT-bearer grant.
pub const TOKEN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Handles authentication and reads against one Salesforce org.
///
/// A client holds at most one bearer token at a time; [`authenticate`](Self::authenticate)
/// overwrites it wholesale. Nothing here tracks token expiry, so freshness is the caller's
/// concern: authenticate before depending on a valid token. Concurrent `authenticate`
/// calls on a shared instance race last-writer-wins; a client is meant to be owned by one
/// extraction run at a time.
#[derive(Debug)]
pub struct SfClient {
	config: ClientConfig,
	token_url: Url,
	instance_url: Url,
	token: RwLock<Option<String>>,
	http: ReqwestClient,
}
impl SfClient {
	/// Builds a client with a fresh HTTP transport. No I/O is performed.
	pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
		let http = ReqwestClient::builder().build().map_err(ConfigError::from)?;

		Self::with_client(config, http)
	}

	/// Builds a client reusing a caller-provided HTTP transport.
	pub fn with_client(config: ClientConfig, http: ReqwestClient) -> Result<Self, ConfigError> {
		let token_url =
			Url::parse(TOKEN_URL).expect("Production token endpoint is a valid URL.");
		let instance_url = Url::parse(&format!("https://{}.salesforce.com", config.instance))
			.map_err(|source| ConfigError::InvalidInstance {
				instance: config.instance.clone(),
				source,
			})?;

		Ok(Self { config, token_url, instance_url, token: RwLock::new(None), http })
	}

	/// Points the token exchange at a different login endpoint.
	///
	/// Sandbox orgs sign in through `https://test.salesforce.com`; tests point this at a
	/// mock server.
	#[must_use]
	pub fn with_token_url(mut self, token_url: Url) -> Self {
		self.token_url = token_url;

		self
	}

	/// Points data-plane requests at a different base URL, overriding the
	/// `https://{instance}.salesforce.com` default.
	#[must_use]
	pub fn with_instance_url(mut self, instance_url: Url) -> Self {
		self.instance_url = instance_url;

		self
	}

	/// Builds the `Authorization` header value from the current token.
	///
	/// Before authentication this is the literal `Bearer None`; the API rejects it, which
	/// is the deferred failure callers opt into by skipping
	/// [`authenticate`](Self::authenticate). Never mutates state.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.token.read().as_deref().unwrap_or("None"))
	}

	/// Returns the versioned data-plane base URL, for example
	/// `https://na1.salesforce.com/services/data/v41.0`. Pure; no network I/O.
	pub fn build_url(&self, api_version: &str) -> Url {
		let mut url = self.instance_url.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().extend(["services", "data", api_version]);
		}

		url
	}

	/// Requests API authentication, refreshing the stored access token.
	pub async fn authenticate(&self) -> Result<()> {
		let token = self.get_access_token().await?;

		*self.token.write() = Some(token);

		tracing::debug!(instance = %self.config.instance, "Refreshed Salesforce access token.");

		Ok(())
	}

	/// Exchanges a signed JWT-bearer assertion for an access token.
	///
	/// The token is returned, not stored; [`authenticate`](Self::authenticate) handles
	/// storage.
	pub async fn get_access_token(&self) -> Result<String> {
		const CONTEXT: &str = "authentication";

		let assertion = jwt::sign_assertion(&self.config)?;
		let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
		let builder = self.http.post(self.token_url.clone()).form(&form);
		let mut payload = self.dispatch(builder, CONTEXT).await?;

		match payload.get_mut("access_token") {
			Some(Value::String(token)) => Ok(std::mem::take(token)),
			_ => Err(ApiError::UnexpectedResponse {
				context: CONTEXT,
				payload: payload.to_string(),
			}
			.into()),
		}
	}

	/// Issues one authenticated request and parses the JSON response body.
	///
	/// The current bearer header is always attached, stale or absent as it may be;
	/// `context` labels the operation in error messages. Exactly one attempt is made.
	pub async fn request(
		&self,
		method: Method,
		url: Url,
		params: &[(&str, &str)],
		context: &'static str,
	) -> Result<Value, ApiError> {
		let builder = self
			.http
			.request(method, url)
			.header(AUTHORIZATION, self.bearer_header())
			.query(params);

		self.dispatch(builder, context).await
	}

	/// Executes a SOQL query, returning the response's record batch in order.
	///
	/// `api_version` falls back to the configured default. The batch is returned as-is:
	/// a response's `nextRecordsUrl` is never followed.
	pub async fn run_query(
		&self,
		query: &str,
		api_version: Option<&str>,
	) -> Result<Vec<QueryRecord>, ApiError> {
		const CONTEXT: &str = "SOQL query";

		let api_version = api_version.unwrap_or(&self.config.api_version);
		let mut url = self.build_url(api_version);

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.push("query");
		}

		tracing::debug!(%url, "Executing SOQL query.");

		let mut payload = self.request(Method::GET, url, &[("q", query)], CONTEXT).await?;

		match payload.get_mut("records") {
			Some(Value::Array(records)) => Ok(std::mem::take(records)),
			_ => Err(ApiError::UnexpectedResponse {
				context: CONTEXT,
				payload: payload.to_string(),
			}),
		}
	}

	/// Sends the request and parses the body, funneling failures into [`ApiError`].
	///
	/// Error statuses are surfaced as [`ApiError::Status`] instead of parsing their JSON
	/// bodies as success payloads.
	async fn dispatch(
		&self,
		builder: RequestBuilder,
		context: &'static str,
	) -> Result<Value, ApiError> {
		let response =
			builder.send().await.map_err(|source| ApiError::transport(context, source))?;
		let status = response.status();
		let body =
			response.text().await.map_err(|source| ApiError::transport(context, source))?;

		if !status.is_success() {
			return Err(ApiError::Status { context, status: status.as_u16(), body });
		}

		serde_json::from_str(&body)
			.map_err(|_| ApiError::UnexpectedResponse { context, payload: body })
	}
}

//! Extractor adapter: configuration glue between the pipeline host and [`SfClient`].

// crates.io
use futures::{
	StreamExt, TryStreamExt,
	stream::{self, BoxStream},
};
// self
use crate::{
	_prelude::*,
	client::{QueryRecord, SfClient},
	config::{ExtractorConfig, REQUIRED_CONFIG},
	error::ConfigError,
};

/// Lazy record sequence produced by one extraction run.
///
/// Dropping the stream stops emission; no per-record side effects are pending beyond the
/// items already yielded.
pub type RecordStream<'a> = BoxStream<'a, Result<QueryRecord>>;

/// Host-framework seam: a plugin that declares its configuration and produces records.
pub trait Extractor {
	/// Identifier of this plugin instance, used by the host for logs and scheduling.
	fn id(&self) -> &str;

	/// Ordered configuration keys the host must supply.
	fn required_config(&self) -> &'static [&'static str];

	/// Performs one extraction run, yielding records one at a time.
	fn run(&self) -> RecordStream<'_>;
}

/// Extractor that authenticates against Salesforce and streams one SOQL result set.
#[derive(Debug)]
pub struct SalesforceExtractor {
	id: String,
	query: String,
	client: SfClient,
}
impl SalesforceExtractor {
	/// Builds the extractor and its client from validated configuration.
	pub fn new(config: ExtractorConfig) -> Result<Self, ConfigError> {
		let client = SfClient::new(config.client)?;

		Ok(Self { id: config.id, query: config.query, client })
	}

	/// Validates a raw configuration mapping from the host and builds the extractor.
	pub fn from_map(
		id: impl Into<String>,
		config: &BTreeMap<String, String>,
	) -> Result<Self, ConfigError> {
		Self::new(ExtractorConfig::from_map(id, config)?)
	}

	/// Replaces the underlying client, e.g. one pointed at sandbox or mock endpoints.
	#[must_use]
	pub fn with_client(mut self, client: SfClient) -> Self {
		self.client = client;

		self
	}
}
impl Extractor for SalesforceExtractor {
	fn id(&self) -> &str {
		&self.id
	}

	fn required_config(&self) -> &'static [&'static str] {
		&REQUIRED_CONFIG
	}

	/// Authenticates, runs the configured query once, then yields the batch in order.
	///
	/// Both suspending calls happen up front inside the first poll; any failure there is
	/// propagated verbatim as the stream's only item and no records are yielded.
	fn run(&self) -> RecordStream<'_> {
		stream::once(async move {
			self.client.authenticate().await?;

			let records = self.client.run_query(&self.query, None).await?;

			tracing::debug!(id = %self.id, count = records.len(), "Fetched query batch.");

			Ok::<_, Error>(stream::iter(records.into_iter().map(Ok::<_, Error>)))
		})
		.try_flatten()
		.boxed()
	}
}

pub mod error;
pub mod loader;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::Parser;

use refuge_config::EmbeddingProviderConfig;
use refuge_domain::Resource;
use refuge_providers::embedding;
use refuge_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = refuge_cli::VERSION,
	rename_all = "kebab",
	styles = refuge_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// JSON array of resource records.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub data: PathBuf,
	#[arg(long, default_value_t = 32)]
	pub batch_size: usize,
	/// Validate and embed without writing to the store.
	#[arg(long)]
	pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
	pub loaded: usize,
	pub skipped: usize,
	pub embedded: usize,
	pub upserted: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = refuge_config::load(&args.config)?;

	refuge_cli::init_tracing(&config.service.log_level);

	if args.batch_size == 0 {
		return Err(color_eyre::eyre::eyre!("batch-size must be greater than zero."));
	}

	let loaded = loader::load_file(&args.data)?;
	let mut report =
		IngestReport { loaded: loaded.resources.len(), skipped: loaded.skipped, ..Default::default() };
	let store = if args.dry_run {
		None
	} else {
		let store = QdrantStore::new(&config.storage.qdrant)?;

		store.ensure_collection().await?;

		Some(store)
	};

	for (batch_idx, batch) in loaded.resources.chunks(args.batch_size).enumerate() {
		let vectors =
			embed_batch(&config.providers.embedding, config.storage.qdrant.vector_dim, batch).await?;

		report.embedded += vectors.len();

		if let Some(store) = store.as_ref() {
			report.upserted += store.upsert(batch, &vectors).await?;
		}

		tracing::info!(batch = batch_idx, size = batch.len(), "Batch ingested.");
	}

	tracing::info!(
		loaded = report.loaded,
		skipped = report.skipped,
		embedded = report.embedded,
		upserted = report.upserted,
		dry_run = args.dry_run,
		"Ingest finished."
	);

	Ok(())
}

/// Embeds one batch of resources and checks the provider answered with one vector of the store's
/// dimension per resource.
pub async fn embed_batch(
	cfg: &EmbeddingProviderConfig,
	vector_dim: u32,
	batch: &[Resource],
) -> Result<Vec<Vec<f32>>> {
	let texts: Vec<String> = batch.iter().map(Resource::embedding_text).collect();
	let vectors = embedding::embed(cfg, &texts).await?;

	if vectors.len() != batch.len() {
		return Err(Error::Validation(format!(
			"Embedding provider returned {} vectors for {} resources.",
			vectors.len(),
			batch.len()
		)));
	}
	if let Some(vector) = vectors.iter().find(|vector| vector.len() != vector_dim as usize) {
		return Err(Error::Validation(format!(
			"Embedding vector dimension mismatch. Expected {vector_dim}, got {}.",
			vector.len()
		)));
	}

	Ok(vectors)
}

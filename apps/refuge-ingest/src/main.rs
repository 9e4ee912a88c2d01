use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = refuge_ingest::Args::parse();

	refuge_ingest::run(args).await
}

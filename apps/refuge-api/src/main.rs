use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = refuge_api::Args::parse();

	refuge_api::run(args).await
}

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
	Router,
	http::{HeaderValue, Method, header},
};
use clap::Parser;
use color_eyre::eyre;
use tokio::net::TcpListener;
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(
	version = refuge_cli::VERSION,
	rename_all = "kebab",
	styles = refuge_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = refuge_config::load(&args.config)?;

	refuge_cli::init_tracing(&config.service.log_level);

	let http_addr: SocketAddr = config.service.http_bind.parse()?;
	let admin_addr: SocketAddr = config.service.admin_bind.parse()?;

	if !admin_addr.ip().is_loopback() {
		return Err(eyre::eyre!("admin_bind must be a loopback address."));
	}

	let cors = cors_layer(&config.service.cors_origins)?;
	let state = AppState::new(config).await?;
	let app = public_app(state.clone(), cors);
	let admin_app = routes::admin_router(state).layer(TraceLayer::new_for_http());
	let http_listener = TcpListener::bind(http_addr).await?;

	tracing::info!(%http_addr, "HTTP server listening.");

	let http_server = axum::serve(http_listener, app);
	let admin_listener = TcpListener::bind(admin_addr).await?;

	tracing::info!(%admin_addr, "Admin server listening.");

	let admin_server = axum::serve(admin_listener, admin_app);

	tokio::try_join!(http_server, admin_server)?;

	Ok(())
}

/// Public routes with CORS for the chat front end and request tracing.
pub fn public_app(state: AppState, cors: CorsLayer) -> Router {
	routes::router(state).layer(cors).layer(TraceLayer::new_for_http())
}

/// An empty origin list allows any origin.
pub fn cors_layer(origins: &[String]) -> color_eyre::Result<CorsLayer> {
	let allow_origin = if origins.is_empty() {
		AllowOrigin::any()
	} else {
		let origins = origins
			.iter()
			.map(|origin| {
				HeaderValue::from_str(origin)
					.map_err(|err| eyre::eyre!("Invalid CORS origin {origin:?}: {err}."))
			})
			.collect::<color_eyre::Result<Vec<_>>>()?;

		AllowOrigin::list(origins)
	};

	Ok(CorsLayer::new()
		.allow_origin(allow_origin)
		.allow_methods([Method::GET, Method::POST])
		.allow_headers([header::CONTENT_TYPE]))
}

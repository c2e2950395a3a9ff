//! thumbgrid server binary.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use thumbgrid::fs::DEFAULT_CACHE_DIR_NAME;
use thumbgrid::{
    create_router, Config, JpegThumbnailEncoder, PathResolver, RouterConfig, ThumbnailCache,
};

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "thumbgrid=debug,tower_http=debug"
    } else {
        "thumbgrid=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(config.verbose);

    if let Err(msg) = config.validate() {
        error!("Invalid configuration: {}", msg);
        return ExitCode::FAILURE;
    }

    let resolver = match PathResolver::new(&config.root, DEFAULT_CACHE_DIR_NAME) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("Failed to open root directory {}: {}", config.root.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let encoder = JpegThumbnailEncoder::with_quality(config.quality);
    let thumbs = ThumbnailCache::with_encoder(resolver, std::sync::Arc::new(encoder))
        .with_size_bounds(thumbgrid::thumb::MIN_THUMB_EDGE, config.max_edge);

    if config.clear_cache {
        return match thumbs.clear_all().await {
            Ok(()) => {
                info!("Thumbnail cache cleared");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to clear thumbnail cache: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let router = create_router(
        thumbs,
        RouterConfig::new()
            .with_thumb_size(config.thumb_size)
            .with_cache_max_age(config.cache_max_age)
            .with_tracing(!config.no_tracing),
    );

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Serving {} on http://{}", config.root.display(), addr);
    info!(
        "Grid thumbnails at {}px, JPEG quality {}",
        config.thumb_size, config.quality
    );

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

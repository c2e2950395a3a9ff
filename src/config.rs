//! Command-line and environment configuration.
//!
//! Every flag can also be set through a `THUMBGRID_`-prefixed environment
//! variable; the flag wins when both are present.

use std::path::PathBuf;

use clap::Parser;

use crate::thumb::{MAX_THUMB_EDGE, MIN_THUMB_EDGE};

/// Serve a directory of images over HTTP with cached thumbnails.
#[derive(Debug, Parser)]
#[command(name = "thumbgrid", version, about)]
pub struct Config {
    /// Directory to serve
    #[arg(long, env = "THUMBGRID_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Address to bind to
    #[arg(long, env = "THUMBGRID_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "THUMBGRID_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Thumbnail edge size in pixels for the listing grid
    #[arg(long, env = "THUMBGRID_THUMB_SIZE", default_value_t = 256)]
    pub thumb_size: u32,

    /// Largest accepted thumbnail edge size for ?thumb requests
    #[arg(long, env = "THUMBGRID_MAX_EDGE", default_value_t = 4096)]
    pub max_edge: u32,

    /// JPEG quality for encoded thumbnails (1-100)
    #[arg(long, env = "THUMBGRID_QUALITY", default_value_t = 95)]
    pub quality: u8,

    /// Cache-Control max-age for thumbnail responses, in seconds
    #[arg(long, env = "THUMBGRID_CACHE_MAX_AGE", default_value_t = 3600)]
    pub cache_max_age: u32,

    /// Erase the thumbnail cache and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Disable HTTP request tracing middleware
    #[arg(long)]
    pub no_tracing: bool,

    /// Increase log verbosity (debug level)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Validate configuration values that clap cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for printing to stderr when the served
    /// root does not exist or a numeric value is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.root.is_dir() {
            return Err(format!(
                "root is not a directory: {}",
                self.root.display()
            ));
        }
        if self.max_edge < MIN_THUMB_EDGE || self.max_edge > MAX_THUMB_EDGE {
            return Err(format!(
                "max-edge must be between {} and {}, got {}",
                MIN_THUMB_EDGE, MAX_THUMB_EDGE, self.max_edge
            ));
        }
        if self.thumb_size < MIN_THUMB_EDGE || self.thumb_size > self.max_edge {
            return Err(format!(
                "thumb-size must be between {} and {}, got {}",
                MIN_THUMB_EDGE, self.max_edge, self.thumb_size
            ));
        }
        if self.quality == 0 || self.quality > 100 {
            return Err(format!("quality must be between 1 and 100, got {}", self.quality));
        }
        Ok(())
    }

    /// Socket address string to bind the listener to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compose;
pub mod config;
pub mod engine;
pub mod error;
pub mod letters;
#[cfg(feature = "cli")]
pub mod logging;
pub mod raster;
pub mod request;

pub use catalog::{Catalog, Color};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use engine::{AvatarEngine, ResolvedAvatar};
pub use error::{AvatarError, ErrorBody, Result};
pub use raster::{FontPolicy, Rasterizer};
pub use request::{AvatarRequest, Format, RawParams, normalize};

/// Renders one avatar with the built-in palette and system fonts.
pub fn render_avatar(params: &RawParams) -> Result<ResolvedAvatar> {
    let request = normalize(params)?;
    let engine = AvatarEngine::new(Catalog::builtin(), Rasterizer::new(&FontPolicy::System)?);
    engine.render_request(&request)
}

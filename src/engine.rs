use crate::catalog::{Catalog, Color};
use crate::compose::{render_svg, strip_svg};
use crate::error::{AvatarError, Result};
use crate::letters::{apply_case, extract_letters};
use crate::raster::{FontResource, Rasterizer};
use crate::request::{AvatarRequest, Format, RawParams, normalize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAvatar {
    /// Stripped markup for svg requests, the composed document otherwise.
    pub svg_markup: String,
    pub content_type: &'static str,
    pub raster_bytes: Option<Vec<u8>>,
    pub color: Color,
    pub letters: String,
}

impl ResolvedAvatar {
    /// Bytes to hand back to the caller alongside `content_type`.
    pub fn payload(&self) -> &[u8] {
        match &self.raster_bytes {
            Some(bytes) => bytes,
            None => self.svg_markup.as_bytes(),
        }
    }

    pub fn into_payload(self) -> Vec<u8> {
        match self.raster_bytes {
            Some(bytes) => bytes,
            None => self.svg_markup.into_bytes(),
        }
    }
}

/// Shared, read-only state for rendering avatars. Safe to use from many threads.
#[derive(Debug)]
pub struct AvatarEngine {
    catalog: Arc<Catalog>,
    rasterizer: Rasterizer,
    embed_font_faces: bool,
}

impl AvatarEngine {
    pub fn new(catalog: Arc<Catalog>, rasterizer: Rasterizer) -> Self {
        Self {
            catalog,
            rasterizer,
            embed_font_faces: true,
        }
    }

    pub fn with_embed_font_faces(mut self, embed: bool) -> Self {
        self.embed_font_faces = embed;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn render(&self, raw: &RawParams) -> Result<ResolvedAvatar> {
        let request = normalize(raw)?;
        self.render_request(&request)
    }

    pub fn render_request(&self, request: &AvatarRequest) -> Result<ResolvedAvatar> {
        let color = self
            .catalog
            .resolve(&request.name, request.color.as_deref())
            .ok_or_else(|| AvatarError::Catalog("catalog has no colors".to_string()))?
            .clone();
        let letters = apply_case(
            &extract_letters(&request.name, request.letter_count)?,
            request.lowercase,
        );
        tracing::debug!(
            name = request.name.as_str(),
            color = color.name.as_str(),
            letters = letters.as_str(),
            format = ?request.format,
            "resolved avatar"
        );

        let fonts: &[FontResource] = if request.format.is_raster() && self.embed_font_faces {
            self.rasterizer.fonts()
        } else {
            &[]
        };
        let svg = render_svg(request, &color, &letters, fonts);

        match request.format {
            Format::Svg => Ok(ResolvedAvatar {
                svg_markup: strip_svg(&svg),
                content_type: Format::Svg.content_type(),
                raster_bytes: None,
                color,
                letters,
            }),
            format => {
                let bytes = self.rasterizer.rasterize(&svg, format).inspect_err(|err| {
                    tracing::warn!(error = %err, name = request.name.as_str(), "rasterization failed");
                })?;
                Ok(ResolvedAvatar {
                    svg_markup: svg,
                    content_type: format.content_type(),
                    raster_bytes: Some(bytes),
                    color,
                    letters,
                })
            }
        }
    }
}

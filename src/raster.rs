use crate::error::{AvatarError, Result};
use crate::request::Format;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use resvg::tiny_skia::{Pixmap, Transform};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::{Face, name_id};
use usvg::fontdb;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Where the rasterizer gets glyphs from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FontPolicy {
    /// Whatever the host has installed.
    #[default]
    System,
    /// Exactly these files; every generic family resolves to `default_family`.
    Bundled {
        files: Vec<PathBuf>,
        default_family: String,
    },
}

/// One face from a bundled font file, as declared in `@font-face` rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    pub family: String,
    pub weight: u16,
    pub path: PathBuf,
}

pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    default_family: Option<String>,
    fonts: Vec<FontResource>,
    jpeg_quality: u8,
}

impl fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rasterizer")
            .field("faces", &self.fontdb.len())
            .field("default_family", &self.default_family)
            .field("fonts", &self.fonts)
            .field("jpeg_quality", &self.jpeg_quality)
            .finish()
    }
}

impl Rasterizer {
    pub fn new(policy: &FontPolicy) -> Result<Self> {
        let mut db = fontdb::Database::new();
        let mut fonts = Vec::new();
        let default_family = match policy {
            FontPolicy::System => {
                db.load_system_fonts();
                tracing::info!(faces = db.len(), "loaded system fonts");
                None
            }
            FontPolicy::Bundled {
                files,
                default_family,
            } => {
                if files.is_empty() {
                    return Err(AvatarError::Font(
                        "bundled font policy lists no font files".to_string(),
                    ));
                }
                for path in files {
                    let data = std::fs::read(path).map_err(|err| {
                        AvatarError::Font(format!("{}: {err}", path.display()))
                    })?;
                    fonts.extend(inspect_font(&data, path)?);
                    db.load_font_data(data);
                }
                // fontdb matches family names exactly, so keep the spelling the font uses.
                let family = db
                    .faces()
                    .flat_map(|face| face.families.iter())
                    .map(|(family, _)| family)
                    .find(|family| family.eq_ignore_ascii_case(default_family.trim()))
                    .cloned()
                    .ok_or_else(|| {
                        AvatarError::Font(format!(
                            "default family '{default_family}' is not provided by the bundled fonts"
                        ))
                    })?;
                // Every generic family resolves to the bundled default; nothing else is loaded.
                db.set_sans_serif_family(family.clone());
                db.set_serif_family(family.clone());
                db.set_monospace_family(family.clone());
                db.set_cursive_family(family.clone());
                db.set_fantasy_family(family.clone());
                tracing::info!(
                    faces = db.len(),
                    default_family = family.as_str(),
                    "loaded bundled fonts"
                );
                Some(family)
            }
        };

        Ok(Self {
            fontdb: Arc::new(db),
            default_family,
            fonts,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        })
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Faces read from bundled files. Empty under the system policy.
    pub fn fonts(&self) -> &[FontResource] {
        &self.fonts
    }

    pub fn rasterize(&self, svg: &str, format: Format) -> Result<Vec<u8>> {
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fontdb);
        if let Some(family) = &self.default_family {
            opt.font_family = family.clone();
        }

        let tree = usvg::Tree::from_str(svg, &opt)?;
        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            AvatarError::Render(format!(
                "failed to allocate {}x{} pixmap",
                size.width(),
                size.height()
            ))
        })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let bytes = match format {
            Format::Png => pixmap
                .encode_png()
                .map_err(|err| AvatarError::Encode(err.to_string()))?,
            Format::Jpeg => encode_jpeg(&pixmap, self.jpeg_quality)?,
            Format::Svg => {
                return Err(AvatarError::Render(
                    "svg is not a raster format".to_string(),
                ));
            }
        };

        if bytes.is_empty() {
            return Err(AvatarError::Render(
                "renderer produced an empty buffer".to_string(),
            ));
        }
        Ok(bytes)
    }
}

/// JPEG has no alpha, so transparent corners (circle shape) are flattened onto white.
fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>> {
    let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
    for pixel in pixmap.pixels() {
        // Premultiplied, so compositing over white is `c + (255 - a)`.
        let backdrop = 255 - pixel.alpha();
        rgb.push(pixel.red().saturating_add(backdrop));
        rgb.push(pixel.green().saturating_add(backdrop));
        rgb.push(pixel.blue().saturating_add(backdrop));
    }
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode(&rgb, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|err| AvatarError::Encode(err.to_string()))?;
    Ok(out)
}

fn inspect_font(data: &[u8], path: &Path) -> Result<Vec<FontResource>> {
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    let mut resources = Vec::new();
    for index in 0..count {
        let face = Face::parse(data, index)
            .map_err(|err| AvatarError::Font(format!("{}: {err}", path.display())))?;
        let family = family_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("bundled")
                .to_string()
        });
        resources.push(FontResource {
            family,
            weight: face.weight().to_number(),
            path: path.to_path_buf(),
        });
    }
    Ok(resources)
}

fn family_name(face: &Face<'_>) -> Option<String> {
    for id in [name_id::TYPOGRAPHIC_FAMILY, name_id::FAMILY] {
        let found = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == id && name.is_unicode())
            .find_map(|name| name.to_string());
        if found.is_some() {
            return found;
        }
    }
    None
}

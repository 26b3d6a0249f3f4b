use crate::catalog::Catalog;
use crate::engine::AvatarEngine;
use crate::raster::{DEFAULT_JPEG_QUALITY, FontPolicy, Rasterizer};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontMode {
    #[default]
    System,
    Bundled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontConfig {
    pub mode: FontMode,
    pub files: Vec<PathBuf>,
    pub default_family: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            mode: FontMode::System,
            files: Vec::new(),
            default_family: "Rubik".to_string(),
        }
    }
}

impl FontConfig {
    pub fn policy(&self) -> FontPolicy {
        match self.mode {
            FontMode::System => FontPolicy::System,
            FontMode::Bundled => FontPolicy::Bundled {
                files: self.files.clone(),
                default_family: self.default_family.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub jpeg_quality: u8,
    pub embed_font_faces: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            embed_font_faces: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// External catalog file. The built-in palette is used when absent.
    pub catalog: Option<PathBuf>,
    pub fonts: FontConfig,
    pub render: RenderConfig,
}

impl Config {
    pub fn load_catalog(&self) -> anyhow::Result<Arc<Catalog>> {
        match &self.catalog {
            Some(path) => Ok(Arc::new(load_catalog(path)?)),
            None => Ok(Catalog::builtin()),
        }
    }

    pub fn build_engine(&self) -> anyhow::Result<AvatarEngine> {
        let catalog = self.load_catalog()?;
        let rasterizer = Rasterizer::new(&self.fonts.policy())
            .context("failed to prepare fonts")?
            .with_jpeg_quality(self.render.jpeg_quality);
        Ok(AvatarEngine::new(catalog, rasterizer).with_embed_font_faces(self.render.embed_font_faces))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    catalog: Option<PathBuf>,
    fonts: Option<FontConfigFile>,
    render: Option<RenderConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontConfigFile {
    mode: Option<FontMode>,
    files: Option<Vec<PathBuf>>,
    default_family: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    jpeg_quality: Option<u8>,
    embed_font_faces: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let parsed = parse_config(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    if let Some(catalog) = parsed.catalog {
        config.catalog = Some(resolve_path(base, catalog));
    }

    if let Some(fonts) = parsed.fonts {
        if let Some(v) = fonts.mode {
            config.fonts.mode = v;
        }
        if let Some(v) = fonts.files {
            config.fonts.files = v.into_iter().map(|file| resolve_path(base, file)).collect();
        }
        if let Some(v) = fonts.default_family {
            config.fonts.default_family = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.jpeg_quality {
            config.render.jpeg_quality = v;
        }
        if let Some(v) = render.embed_font_faces {
            config.render.embed_font_faces = v;
        }
    }

    Ok(config)
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read color catalog {}", path.display()))?;
    Catalog::from_json(&contents)
        .with_context(|| format!("invalid color catalog {}", path.display()))
}

fn parse_config(contents: &str) -> anyhow::Result<ConfigFile> {
    match serde_json::from_str::<ConfigFile>(contents) {
        Ok(parsed) => Ok(parsed),
        Err(json_err) => json5::from_str::<ConfigFile>(contents).map_err(|_| json_err.into()),
    }
}

fn resolve_path(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

use crate::error::{AvatarError, Result};
use serde::{Deserialize, Serialize};

/// Canvas edge length in pixels. Callers cannot change it.
pub const CANONICAL_SIZE: u32 = 300;
pub const DEFAULT_LETTER_COUNT: usize = 2;
pub const MAX_LETTER_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    #[default]
    Square,
}

impl Shape {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "square" => Some(Self::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Svg,
    #[default]
    Png,
    Jpeg,
}

impl Format {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Format::Svg => "image/svg+xml",
            Format::Png => "image/png",
            Format::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Svg => "svg",
            Format::Png => "png",
            Format::Jpeg => "jpg",
        }
    }

    pub fn is_raster(self) -> bool {
        !matches!(self, Format::Svg)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Rubik,
    Inter,
    SansSerif,
    Serif,
    Monospace,
}

impl FontFamily {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "rubik" => Some(Self::Rubik),
            "inter" => Some(Self::Inter),
            "sans-serif" | "sans" => Some(Self::SansSerif),
            "serif" => Some(Self::Serif),
            "monospace" | "mono" => Some(Self::Monospace),
            _ => None,
        }
    }

    /// Value for the SVG `font-family` attribute, generic fallback included.
    pub fn css_value(self) -> &'static str {
        match self {
            FontFamily::Rubik => "Rubik, sans-serif",
            FontFamily::Inter => "Inter, sans-serif",
            FontFamily::SansSerif => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Monospace => "monospace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Medium,
    #[default]
    Bold,
}

impl FontWeight {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "normal" | "regular" | "400" => Some(Self::Normal),
            "medium" | "500" => Some(Self::Medium),
            "bold" | "700" => Some(Self::Bold),
            _ => None,
        }
    }

    pub fn css_value(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Medium => "500",
            FontWeight::Bold => "bold",
        }
    }
}

/// Parameters as they arrive from a query string or command line, nothing checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParams {
    pub name: Option<String>,
    pub color: Option<String>,
    pub letter_count: Option<String>,
    pub size: Option<String>,
    pub shape: Option<String>,
    pub lowercase: Option<String>,
    pub format: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
}

impl RawParams {
    pub fn with_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Reads an `application/x-www-form-urlencoded` query, with or without the
    /// leading `?`. Unknown keys are ignored; a repeated key keeps its last value.
    pub fn from_query(query: &str) -> Self {
        let mut params = RawParams::default();
        let query = query.trim().trim_start_matches('?');
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "name" => params.name = value,
                "color" => params.color = value,
                "letterCount" => params.letter_count = value,
                "size" => params.size = value,
                "shape" => params.shape = value,
                "lowercase" => params.lowercase = value,
                "format" => params.format = value,
                "fontFamily" => params.font_family = value,
                "fontWeight" => params.font_weight = value,
                _ => {}
            }
        }
        params
    }
}

/// A fully defaulted request. Everything downstream of [`normalize`] consumes this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    pub name: String,
    pub color: Option<String>,
    pub letter_count: usize,
    pub size: u32,
    pub shape: Shape,
    pub lowercase: bool,
    pub format: Format,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
}

impl AvatarRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: None,
            letter_count: DEFAULT_LETTER_COUNT,
            size: CANONICAL_SIZE,
            shape: Shape::default(),
            lowercase: false,
            format: Format::default(),
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
        }
    }
}

pub fn normalize(raw: &RawParams) -> Result<AvatarRequest> {
    let name = match raw.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(AvatarError::MissingName),
    };

    let color = sanitized(&raw.color).filter(|color| !color.is_empty());
    let letter_count = sanitized(&raw.letter_count)
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|count| count.is_finite())
        .map(|count| count.trunc().clamp(1.0, MAX_LETTER_COUNT as f64) as usize)
        .unwrap_or(DEFAULT_LETTER_COUNT);
    let shape = sanitized(&raw.shape)
        .and_then(|value| Shape::from_token(&value))
        .unwrap_or_default();
    let lowercase = sanitized(&raw.lowercase)
        .map(|value| parse_flag(&value))
        .unwrap_or(false);
    let format = sanitized(&raw.format)
        .and_then(|value| Format::from_token(&value))
        .unwrap_or_default();
    let font_family = sanitized(&raw.font_family)
        .and_then(|value| FontFamily::from_token(&value))
        .unwrap_or_default();
    let font_weight = sanitized(&raw.font_weight)
        .and_then(|value| FontWeight::from_token(&value))
        .unwrap_or_default();

    Ok(AvatarRequest {
        name,
        color,
        letter_count,
        // `raw.size` is accepted for schema compatibility and always overridden.
        size: CANONICAL_SIZE,
        shape,
        lowercase,
        format,
        font_family,
        font_weight,
    })
}

/// Removes the single and double quotes naive clients wrap around values.
pub(crate) fn strip_quotes(value: &str) -> String {
    value.chars().filter(|ch| !matches!(ch, '"' | '\'')).collect()
}

fn sanitized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|value| strip_quotes(value).trim().to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

use crate::catalog::Color;
use crate::raster::FontResource;
use crate::request::{AvatarRequest, Shape};
use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static BETWEEN_TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r">\s+<").unwrap());
static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n[ \t]*").unwrap());

/// Builds the avatar markup. Output depends only on the arguments, so equal inputs
/// give byte-identical documents.
pub fn render_svg(
    request: &AvatarRequest,
    color: &Color,
    text: &str,
    fonts: &[FontResource],
) -> String {
    let size = request.size;
    let half = size / 2;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{size}\" height=\"{size}\" viewBox=\"0 0 {size} {size}\">\n",
    ));
    svg.push_str("  <!-- letter-avatar -->\n");

    if !fonts.is_empty() {
        svg.push_str("  <defs>\n    <style>\n");
        for font in fonts {
            svg.push_str(&format!("      {}\n", font_face_rule(font)));
        }
        svg.push_str("    </style>\n  </defs>\n");
    }

    match request.shape {
        Shape::Circle => {
            svg.push_str(&format!(
                "  <circle cx=\"{half}\" cy=\"{half}\" r=\"{}\" fill=\"{}\" stroke=\"{}\"/>\n",
                half.saturating_sub(1),
                escape_xml(&color.background),
                escape_xml(&color.background)
            ));
        }
        Shape::Square => {
            svg.push_str(&format!(
                "  <rect x=\"0\" y=\"0\" width=\"{size}\" height=\"{size}\" fill=\"{}\"/>\n",
                escape_xml(&color.background)
            ));
        }
    }

    // Anchoring on the canvas center keeps one and two letters equally balanced.
    svg.push_str(&format!(
        "  <text x=\"{half}\" y=\"{half}\" fill=\"{}\" font-size=\"{}\" font-weight=\"{}\" font-family=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>\n",
        escape_xml(&color.foreground),
        half.saturating_sub(10),
        request.font_weight.css_value(),
        request.font_family.css_value(),
        escape_xml(text)
    ));

    svg.push_str("</svg>\n");
    svg
}

/// Drops comments and layout whitespace. Text content is left alone.
pub fn strip_svg(svg: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(svg, "");
    let joined = BETWEEN_TAGS_RE.replace_all(&without_comments, "><");
    let compact = LINE_BREAK_RE.replace_all(&joined, "");
    compact.trim().to_string()
}

fn font_face_rule(font: &FontResource) -> String {
    let path = font.path.to_string_lossy().replace('\\', "/");
    format!(
        "@font-face {{ font-family: \"{}\"; font-weight: {}; src: url(\"{}\"); }}",
        escape_css_text(&font.family),
        font.weight,
        escape_css_text(&path)
    )
}

fn escape_css_text(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

use crate::error::{AvatarError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const BUILTIN_COLORS: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/colors.json"));

static BUILTIN_CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| {
    Arc::new(Catalog::from_json(BUILTIN_COLORS).expect("built-in color catalog is valid"))
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    pub background: String,
    pub foreground: String,
}

impl Color {
    pub fn new(name: &str, background: &str, foreground: &str) -> Self {
        Self {
            name: name.to_string(),
            background: background.to_string(),
            foreground: foreground.to_string(),
        }
    }
}

/// Ordered palette. Position matters: it is what the name digest indexes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    colors: Vec<Color>,
}

impl Catalog {
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            return Err(AvatarError::Catalog("catalog has no colors".to_string()));
        }
        let mut seen = HashSet::new();
        for color in &colors {
            if !seen.insert(color.name.as_str()) {
                return Err(AvatarError::Catalog(format!(
                    "duplicate color name '{}'",
                    color.name
                )));
            }
        }
        Ok(Self { colors })
    }

    /// Parses a JSON array of `{name, background, foreground}` records. JSON5 is
    /// accepted as a fallback so hand-edited catalogs may carry comments.
    pub fn from_json(input: &str) -> Result<Self> {
        let colors = match serde_json::from_str::<Vec<Color>>(input) {
            Ok(colors) => colors,
            Err(json_err) => json5::from_str::<Vec<Color>>(input)
                .map_err(|_| AvatarError::Catalog(json_err.to_string()))?,
        };
        Self::new(colors)
    }

    pub fn builtin() -> Arc<Catalog> {
        Arc::clone(&BUILTIN_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn get(&self, name: &str) -> Option<&Color> {
        self.colors.iter().find(|color| color.name == name)
    }

    pub fn digest_index(&self, name: &str) -> Option<usize> {
        if self.colors.is_empty() {
            return None;
        }
        let len = self.colors.len() as u64;
        Some((name_digest(name) % len) as usize)
    }

    /// Picks the color for `name`. An explicit `requested` name wins when it exists in
    /// the catalog; unknown names fall back to the digest-derived entry. Returns `None`
    /// only for an empty catalog.
    pub fn resolve(&self, name: &str, requested: Option<&str>) -> Option<&Color> {
        if let Some(color) = requested.and_then(|requested| self.get(requested)) {
            return Some(color);
        }
        if let Some(requested) = requested {
            tracing::debug!(requested, "unknown color override, using name digest");
        }
        let index = self.digest_index(name)?;
        self.colors.get(index).or_else(|| self.colors.first())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::builtin().as_ref().clone()
    }
}

/// Sum of the UTF-16 code units of `name`. Characters outside the BMP count as
/// their two surrogates, which keeps colors stable with UTF-16 based clients.
pub fn name_digest(name: &str) -> u64 {
    name.encode_utf16().map(u64::from).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_order() {
        let catalog = Catalog::builtin();
        let names: Vec<&str> = catalog.colors().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["orange", "yellow", "green", "blue", "purple", "pink", "red"]
        );
    }

    #[test]
    fn digest_sums_char_codes() {
        assert_eq!(name_digest(""), 0);
        assert_eq!(name_digest("A"), 65);
        assert_eq!(name_digest("Ada Lovelace"), 1105);
    }

    #[test]
    fn astral_characters_count_as_surrogate_pairs() {
        // U+1F600 is 0xD83D + 0xDE00 in UTF-16.
        assert_eq!(name_digest("\u{1F600}"), 0xD83D + 0xDE00);
        assert_eq!(name_digest("Zoë 😀"), 112657);
        // 112657 % 7 == 6
        assert_eq!(Catalog::builtin().resolve("Zoë 😀", None).unwrap().name, "red");
    }

    #[test]
    fn resolves_by_digest() {
        let catalog = Catalog::builtin();
        // 1105 % 7 == 6
        assert_eq!(catalog.resolve("Ada Lovelace", None).unwrap().name, "red");
        // 1136 % 7 == 2
        assert_eq!(catalog.resolve("Grace Hopper", None).unwrap().name, "green");
    }

    #[test]
    fn explicit_color_wins() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve("bob", None).unwrap().name, "red");
        assert_eq!(
            catalog.resolve("bob", Some("purple")).unwrap().name,
            "purple"
        );
    }

    #[test]
    fn unknown_override_falls_back_to_digest() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.resolve("bob", Some("teal")).unwrap().name, "red");
    }

    #[test]
    fn whitespace_only_name_still_resolves() {
        let catalog = Catalog::builtin();
        // 3 * 32 == 96, 96 % 7 == 5
        assert_eq!(catalog.resolve("   ", None).unwrap().name, "pink");
        assert_eq!(catalog.resolve("", None).unwrap().name, "orange");
    }

    #[test]
    fn untouched_index_survives_reordering() {
        let base = Catalog::builtin();
        let mut colors = base.colors().to_vec();
        // "Grace Hopper" lands on index 2; shuffle everything else around it.
        colors.swap(0, 6);
        colors.swap(3, 5);
        let shuffled = Catalog::new(colors).unwrap();
        assert_eq!(
            base.resolve("Grace Hopper", None),
            shuffled.resolve("Grace Hopper", None)
        );
    }

    #[test]
    fn rejects_empty_and_duplicate_catalogs() {
        assert!(matches!(Catalog::new(Vec::new()), Err(AvatarError::Catalog(_))));
        let dup = vec![
            Color::new("red", "#f00", "#fff"),
            Color::new("red", "#e00", "#fff"),
        ];
        assert!(matches!(Catalog::new(dup), Err(AvatarError::Catalog(_))));
    }

    #[test]
    fn parses_json5_catalog() {
        let input = r#"[
            // single entry
            { name: 'mono', background: '#000000', foreground: '#FFFFFF' },
        ]"#;
        let catalog = Catalog::from_json(input).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("anything", None).unwrap().name, "mono");
    }
}

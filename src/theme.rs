//! Theme Registry - Brand Token Sets
//!
//! Themes are immutable once handed to the generator. Customization clones a
//! registry entry and overrides fields; derived themes are never registered
//! back into the catalog.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::validation::{TokenKind, ValidationResult, Validator};

pub const DEFAULT_FONT_STACK: &str = "Arial, Helvetica, sans-serif";

/// Appended once to the name of a theme derived from a registry entry.
pub const CUSTOM_SUFFIX: &str = " (custom)";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub card_background_color: String,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl Theme {
    /// Font stack used in generated CSS.
    pub fn font_stack(&self) -> &str {
        self.font_family
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_FONT_STACK)
    }

    /// Color tokens keyed by their serialized field name.
    pub fn color_tokens(&self) -> [(&'static str, &str); 6] {
        [
            ("primaryColor", self.primary_color.as_str()),
            ("secondaryColor", self.secondary_color.as_str()),
            ("accentColor", self.accent_color.as_str()),
            ("backgroundColor", self.background_color.as_str()),
            ("cardBackgroundColor", self.card_background_color.as_str()),
            ("textColor", self.text_color.as_str()),
        ]
    }

    /// Name for a theme derived from this one; never suffixed twice.
    pub fn custom_name(&self) -> String {
        if self.name.ends_with(CUSTOM_SUFFIX) {
            self.name.clone()
        } else {
            format!("{}{CUSTOM_SUFFIX}", self.name)
        }
    }

    pub fn validate(&self) -> ValidationResult {
        Validator::new().validate(self)
    }

    /// Derive a new theme from this one.
    ///
    /// Malformed override values fall back to this theme's value, so the
    /// result is well-formed whenever `self` is.
    pub fn customize(&self, name: impl Into<String>, overrides: &ThemeOverrides) -> Theme {
        let pick = |field: &'static str, base: &str, candidate: &Option<String>| -> String {
            match candidate {
                Some(value) => match TokenKind::Color.validate(value) {
                    Ok(()) => value.trim().to_string(),
                    Err(e) => {
                        tracing::warn!(
                            field,
                            value = %value,
                            error = %e,
                            "Theme override rejected, keeping base value"
                        );
                        base.to_string()
                    }
                },
                None => base.to_string(),
            }
        };

        let font_family = match &overrides.font_family {
            Some(font) => match TokenKind::FontFamily.validate(font) {
                Ok(()) => Some(font.trim().to_string()),
                Err(e) => {
                    tracing::warn!(
                        field = "fontFamily",
                        value = %font,
                        error = %e,
                        "Theme override rejected, keeping base value"
                    );
                    self.font_family.clone()
                }
            },
            None => self.font_family.clone(),
        };

        let name = name.into();
        Theme {
            name: if name.trim().is_empty() { self.name.clone() } else { name },
            primary_color: pick("primaryColor", &self.primary_color, &overrides.primary_color),
            secondary_color: pick("secondaryColor", &self.secondary_color, &overrides.secondary_color),
            accent_color: pick("accentColor", &self.accent_color, &overrides.accent_color),
            background_color: pick("backgroundColor", &self.background_color, &overrides.background_color),
            card_background_color: pick(
                "cardBackgroundColor",
                &self.card_background_color,
                &overrides.card_background_color,
            ),
            text_color: pick("textColor", &self.text_color, &overrides.text_color),
            font_family,
        }
    }
}

/// Field-level overrides for [`Theme::customize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeOverrides {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub background_color: Option<String>,
    pub card_background_color: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
}

/// A caller-supplied theme, expressed as overrides on a registry entry.
///
/// Absent and malformed fields take the base theme's value, so a complete
/// theme JSON and a single `primaryColor` are both accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTheme {
    pub name: Option<String>,
    /// Registry entry to start from; the first registered theme when absent.
    pub base: Option<String>,
    #[serde(flatten)]
    pub overrides: ThemeOverrides,
}

/// Ordered, read-only theme catalog.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    themes: Vec<Theme>,
}

static BUILTIN_THEMES: LazyLock<ThemeRegistry> = LazyLock::new(|| ThemeRegistry::new(builtin_themes()));

impl ThemeRegistry {
    /// Build a registry, keeping registration order.
    ///
    /// Only well-formed themes are exposed: malformed ones and duplicate names
    /// are dropped with a warning.
    pub fn new(themes: impl IntoIterator<Item = Theme>) -> Self {
        let validator = Validator::new();
        let mut accepted: Vec<Theme> = vec![];

        for theme in themes {
            let result = validator.validate(&theme);
            if !result.valid {
                tracing::warn!(
                    theme = %theme.name,
                    errors = %result.error_summary(),
                    "Dropping malformed theme"
                );
                continue;
            }
            if accepted.iter().any(|t| t.name.eq_ignore_ascii_case(&theme.name)) {
                tracing::warn!(theme = %theme.name, "Dropping duplicate theme name");
                continue;
            }
            accepted.push(theme);
        }

        Self { themes: accepted }
    }

    /// The process-wide built-in registry.
    pub fn builtin() -> &'static ThemeRegistry {
        &BUILTIN_THEMES
    }

    pub fn list_themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Build a caller-supplied theme on top of its base entry.
    ///
    /// `None` when the named base is not registered (or the registry is
    /// empty). An unnamed result is called after its base.
    pub fn build_custom(&self, custom: &CustomTheme) -> Option<Theme> {
        let base = match custom.base.as_deref() {
            Some(name) => self.get(name)?,
            None => self.themes.first()?,
        };
        let name = custom
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| base.custom_name());
        Some(base.customize(name, &custom.overrides))
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Built-in themes in registration order.
pub fn list_themes() -> &'static [Theme] {
    ThemeRegistry::builtin().list_themes()
}

fn theme(
    name: &str,
    colors: [&str; 6],
    font_family: Option<&str>,
) -> Theme {
    let [primary, secondary, accent, background, card_background, text] = colors;
    Theme {
        name: name.to_string(),
        primary_color: primary.to_string(),
        secondary_color: secondary.to_string(),
        accent_color: accent.to_string(),
        background_color: background.to_string(),
        card_background_color: card_background.to_string(),
        text_color: text.to_string(),
        font_family: font_family.map(str::to_string),
    }
}

fn builtin_themes() -> Vec<Theme> {
    vec![
        theme(
            "Classic Navy",
            ["#1c2d4a", "#2e4a7a", "#c9a227", "#f4f6f9", "#ffffff", "#333333"],
            Some("Georgia, 'Times New Roman', serif"),
        ),
        theme(
            "Forest Green",
            ["#2d5a3d", "#4a8c5f", "#e8b04a", "#f3f7f4", "#ffffff", "#2b2b2b"],
            None,
        ),
        theme(
            "Sunset Orange",
            ["#d9541e", "#f28c38", "#2a9d8f", "#fff8f3", "#ffffff", "#3a2e28"],
            None,
        ),
        theme(
            "Royal Purple",
            ["#4b2a7b", "#7a4fb5", "#f2c14e", "#f6f3fa", "#ffffff", "#2e2838"],
            Some("'Trebuchet MS', Helvetica, sans-serif"),
        ),
        theme(
            "Slate Modern",
            ["#334155", "#64748b", "#0ea5e9", "#f1f5f9", "#ffffff", "#1e293b"],
            Some("'Segoe UI', Roboto, Helvetica, Arial, sans-serif"),
        ),
        theme(
            "Ocean Breeze",
            ["#0e6e8c", "#2bb3c0", "#ff7f50", "#eef8fa", "#ffffff", "#23343b"],
            None,
        ),
    ]
}

//! Theme Token Validation - Rule/Policy Separation
//!
//! Rules inspect a theme and produce structured violations.
//! The validator decides whether the theme may be exposed for generation.
//!
//! Accepted color tokens:
//! - Hex colors: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`
//! - `rgb()`/`rgba()`/`hsl()`/`hsla()` with finite, in-range arguments
//! - CSS named color keywords (e.g. `white`, `navy`, `transparent`)
//!
//! Anything carrying structural CSS characters (`;`, `{`, `}`, `<`, `>`) or a
//! known injection pattern is rejected outright.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::theme::Theme;

/// Why a single theme token was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThemeTokenError {
    #[error("Empty {0} value")]
    Empty(&'static str),

    #[error("CSS injection blocked: contains '{0}'")]
    Injection(String),

    #[error("Invalid hex color '{0}': expected 3, 4, 6 or 8 hex digits")]
    InvalidHex(String),

    #[error("Malformed color function '{value}': {reason}")]
    InvalidFunction { value: String, reason: String },

    #[error("Invalid CSS color '{0}'")]
    InvalidColor(String),

    #[error("Invalid character '{ch}' in font-family '{value}'")]
    InvalidFontCharacter { ch: char, value: String },
}

/// The kind of theme token a value is checked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Color,
    FontFamily,
}

impl TokenKind {
    pub fn validate(self, value: &str) -> Result<(), ThemeTokenError> {
        match self {
            TokenKind::Color => validate_css_color(value),
            TokenKind::FontFamily => validate_css_font_family(value),
        }
    }
}

/// Validate a CSS color token.
pub fn validate_css_color(value: &str) -> Result<(), ThemeTokenError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ThemeTokenError::Empty("color"));
    }

    check_injection_patterns(trimmed)?;

    if let Some(hex) = trimmed.strip_prefix('#') {
        return validate_hex_color(trimmed, hex);
    }

    let lower = trimmed.to_ascii_lowercase();
    for function in ColorFunction::ALL {
        if lower.starts_with(function.prefix()) {
            return validate_color_function(trimmed, function);
        }
    }

    if NAMED_COLORS.binary_search(&lower.as_str()).is_ok() {
        return Ok(());
    }

    Err(ThemeTokenError::InvalidColor(trimmed.to_string()))
}

/// Validate a CSS font-family token.
///
/// Only letters, digits, spaces, hyphens, underscores, quotes and commas.
pub fn validate_css_font_family(value: &str) -> Result<(), ThemeTokenError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ThemeTokenError::Empty("font-family"));
    }

    check_injection_patterns(trimmed)?;

    for ch in trimmed.chars() {
        if !ch.is_alphanumeric() && !matches!(ch, ' ' | '-' | '_' | '\'' | '"' | ',') {
            return Err(ThemeTokenError::InvalidFontCharacter {
                ch,
                value: trimmed.to_string(),
            });
        }
    }

    Ok(())
}

fn check_injection_patterns(value: &str) -> Result<(), ThemeTokenError> {
    let lower = value.to_lowercase();

    let dangerous = [
        "expression(",
        "url(",
        "javascript:",
        "@import",
        "behavior:",
        "-moz-binding",
    ];

    for pattern in dangerous {
        if lower.contains(pattern) {
            return Err(ThemeTokenError::Injection(pattern.to_string()));
        }
    }

    for ch in [';', '{', '}', '<', '>'] {
        if value.contains(ch) {
            return Err(ThemeTokenError::Injection(ch.to_string()));
        }
    }

    Ok(())
}

fn validate_hex_color(value: &str, hex: &str) -> Result<(), ThemeTokenError> {
    if !matches!(hex.len(), 3 | 4 | 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ThemeTokenError::InvalidHex(value.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorFunction {
    Rgba,
    Rgb,
    Hsla,
    Hsl,
}

impl ColorFunction {
    // `rgba(` must be tried before `rgb(`
    const ALL: [ColorFunction; 4] = [
        ColorFunction::Rgba,
        ColorFunction::Rgb,
        ColorFunction::Hsla,
        ColorFunction::Hsl,
    ];

    fn prefix(self) -> &'static str {
        match self {
            ColorFunction::Rgba => "rgba(",
            ColorFunction::Rgb => "rgb(",
            ColorFunction::Hsla => "hsla(",
            ColorFunction::Hsl => "hsl(",
        }
    }

    fn arity(self) -> usize {
        match self {
            ColorFunction::Rgba | ColorFunction::Hsla => 4,
            ColorFunction::Rgb | ColorFunction::Hsl => 3,
        }
    }

    /// Check argument `index`, already split into number and `%` flag.
    fn check_argument(self, index: usize, number: f64, percent: bool) -> Result<(), String> {
        let in_range = |max: f64| (0.0..=max).contains(&number);
        let ok = match (self, index) {
            // alpha
            (_, 3) if percent => in_range(100.0),
            (_, 3) => in_range(1.0),
            (ColorFunction::Rgb | ColorFunction::Rgba, _) if percent => in_range(100.0),
            (ColorFunction::Rgb | ColorFunction::Rgba, _) => in_range(255.0),
            // hue, any finite angle in degrees
            (ColorFunction::Hsl | ColorFunction::Hsla, 0) => !percent,
            (ColorFunction::Hsl | ColorFunction::Hsla, _) => percent && in_range(100.0),
        };
        if ok {
            Ok(())
        } else {
            Err(format!("argument {index} out of range"))
        }
    }
}

fn validate_color_function(value: &str, function: ColorFunction) -> Result<(), ThemeTokenError> {
    let malformed = |reason: String| ThemeTokenError::InvalidFunction {
        value: value.to_string(),
        reason,
    };

    let inner = value[function.prefix().len()..]
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing parenthesis".to_string()))?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != function.arity() {
        return Err(malformed(format!(
            "expected {} arguments, got {}",
            function.arity(),
            parts.len()
        )));
    }

    for (i, part) in parts.iter().enumerate() {
        let (numeric, percent) = match part.strip_suffix('%') {
            Some(n) => (n, true),
            None => (*part, false),
        };
        // f64 parsing also accepts `inf` and `NaN`
        let number = numeric
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| malformed(format!("non-numeric argument at position {i}: '{part}'")))?;
        function.check_argument(i, number, percent).map_err(malformed)?;
    }

    Ok(())
}

/// CSS named color keywords, sorted for binary search.
const NAMED_COLORS: &[&str] = &[
    "aliceblue", "antiquewhite", "aqua", "aquamarine", "azure", "beige", "bisque", "black",
    "blanchedalmond", "blue", "blueviolet", "brown", "burlywood", "cadetblue", "chartreuse",
    "chocolate", "coral", "cornflowerblue", "cornsilk", "crimson", "currentcolor", "cyan",
    "darkblue", "darkcyan", "darkgoldenrod", "darkgray", "darkgreen", "darkgrey", "darkkhaki",
    "darkmagenta", "darkolivegreen", "darkorange", "darkorchid", "darkred", "darksalmon",
    "darkseagreen", "darkslateblue", "darkslategray", "darkslategrey", "darkturquoise",
    "darkviolet", "deeppink", "deepskyblue", "dimgray", "dimgrey", "dodgerblue", "firebrick",
    "floralwhite", "forestgreen", "fuchsia", "gainsboro", "ghostwhite", "gold", "goldenrod",
    "gray", "green", "greenyellow", "grey", "honeydew", "hotpink", "indianred", "indigo",
    "ivory", "khaki", "lavender", "lavenderblush", "lawngreen", "lemonchiffon", "lightblue",
    "lightcoral", "lightcyan", "lightgoldenrodyellow", "lightgray", "lightgreen", "lightgrey",
    "lightpink", "lightsalmon", "lightseagreen", "lightskyblue", "lightslategray",
    "lightslategrey", "lightsteelblue", "lightyellow", "lime", "limegreen", "linen", "magenta",
    "maroon", "mediumaquamarine", "mediumblue", "mediumorchid", "mediumpurple",
    "mediumseagreen", "mediumslateblue", "mediumspringgreen", "mediumturquoise",
    "mediumvioletred", "midnightblue", "mintcream", "mistyrose", "moccasin", "navajowhite",
    "navy", "oldlace", "olive", "olivedrab", "orange", "orangered", "orchid", "palegoldenrod",
    "palegreen", "paleturquoise", "palevioletred", "papayawhip", "peachpuff", "peru", "pink",
    "plum", "powderblue", "purple", "rebeccapurple", "red", "rosybrown", "royalblue",
    "saddlebrown", "salmon", "sandybrown", "seagreen", "seashell", "sienna", "silver",
    "skyblue", "slateblue", "slategray", "slategrey", "snow", "springgreen", "steelblue", "tan",
    "teal", "thistle", "tomato", "transparent", "turquoise", "violet", "wheat", "white",
    "whitesmoke", "yellow", "yellowgreen",
];

// --- Theme-level rules and policy ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
    pub theme_name: String,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    /// Error messages joined for display, warnings excluded.
    pub fn error_summary(&self) -> String {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A check applied to a whole theme.
pub trait ThemeRule {
    fn name(&self) -> &'static str;
    fn validate(&self, theme: &Theme) -> Vec<ValidationViolation>;
}

pub struct NameRule;

impl ThemeRule for NameRule {
    fn name(&self) -> &'static str { "name" }

    fn validate(&self, theme: &Theme) -> Vec<ValidationViolation> {
        if !theme.name.trim().is_empty() {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            field: "name".to_string(),
            severity: ViolationSeverity::Error,
            message: "Theme name must not be empty".to_string(),
            actual: None,
            remediation: vec!["Give the theme a unique display name".to_string()],
        }]
    }
}

pub struct ColorTokenRule;

impl ThemeRule for ColorTokenRule {
    fn name(&self) -> &'static str { "color_token" }

    fn validate(&self, theme: &Theme) -> Vec<ValidationViolation> {
        theme
            .color_tokens()
            .into_iter()
            .filter_map(|(field, value)| {
                validate_css_color(value).err().map(|e| ValidationViolation {
                    rule: self.name().to_string(),
                    field: field.to_string(),
                    severity: ViolationSeverity::Error,
                    message: e.to_string(),
                    actual: Some(value.to_string()),
                    remediation: vec!["Use a hex, rgb()/rgba() or hsl() color".to_string()],
                })
            })
            .collect()
    }
}

pub struct FontFamilyRule;

impl ThemeRule for FontFamilyRule {
    fn name(&self) -> &'static str { "font_family" }

    fn validate(&self, theme: &Theme) -> Vec<ValidationViolation> {
        let Some(font) = theme.font_family.as_deref() else {
            return vec![];
        };

        match validate_css_font_family(font) {
            Ok(()) => vec![],
            Err(e) => vec![ValidationViolation {
                rule: self.name().to_string(),
                field: "fontFamily".to_string(),
                severity: ViolationSeverity::Error,
                message: e.to_string(),
                actual: Some(font.to_string()),
                remediation: vec!["List plain font names separated by commas".to_string()],
            }],
        }
    }
}

/// Flags text that would be invisible against its background.
pub struct ContrastRule;

impl ThemeRule for ContrastRule {
    fn name(&self) -> &'static str { "contrast" }

    fn validate(&self, theme: &Theme) -> Vec<ValidationViolation> {
        let same = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());

        let mut violations = vec![];
        for (field, background) in [
            ("backgroundColor", &theme.background_color),
            ("cardBackgroundColor", &theme.card_background_color),
        ] {
            if same(&theme.text_color, background) {
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    field: field.to_string(),
                    severity: ViolationSeverity::Warning,
                    message: "Text color matches background color".to_string(),
                    actual: Some(background.clone()),
                    remediation: vec!["Pick a text color that contrasts with the background".to_string()],
                });
            }
        }
        violations
    }
}

/// Runs every theme rule; warnings never block a theme.
pub struct Validator {
    rules: Vec<Box<dyn ThemeRule + Send + Sync>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(NameRule),
                Box::new(ColorTokenRule),
                Box::new(FontFamilyRule),
                Box::new(ContrastRule),
            ],
        }
    }

    pub fn validate(&self, theme: &Theme) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(theme))
            .collect();

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);

        ValidationResult {
            valid,
            violations,
            theme_name: theme.name.clone(),
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;

    #[test]
    fn accepts_hex_colors() {
        for c in ["#fff", "#fffa", "#1c2d4a", "#1c2d4a80"] {
            assert!(validate_css_color(c).is_ok(), "{c} should be accepted");
        }
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(validate_css_color("#ff"), Err(ThemeTokenError::InvalidHex(_))));
        assert!(validate_css_color("#gggggg").is_err());
        assert!(validate_css_color("#fffffff").is_err());
    }

    #[test]
    fn accepts_color_functions() {
        assert!(validate_css_color("rgb(255, 0, 0)").is_ok());
        assert!(validate_css_color("rgba(0,0,0,0.5)").is_ok());
        assert!(validate_css_color("hsl(210, 40%, 20%)").is_ok());
        assert!(validate_css_color("hsla(210, 40%, 20%, 0.8)").is_ok());
    }

    #[test]
    fn rejects_malformed_color_functions() {
        assert!(validate_css_color("rgb(0, 0)").is_err());
        assert!(validate_css_color("rgba(red, 0, 0, 1)").is_err());
        assert!(validate_css_color("rgb(0, 0, 0").is_err());
    }

    #[test]
    fn accepts_named_keywords() {
        assert!(validate_css_color("white").is_ok());
        assert!(validate_css_color("transparent").is_ok());
        assert!(validate_css_color("Navy").is_ok());
    }

    #[test]
    fn named_color_table_is_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn rejects_unknown_keywords() {
        assert_eq!(
            validate_css_color("bluee"),
            Err(ThemeTokenError::InvalidColor("bluee".to_string()))
        );
        assert!(validate_css_color("notacolor").is_err());
    }

    #[test]
    fn rejects_non_finite_and_out_of_range_arguments() {
        for value in [
            "rgb(NaN, inf, infinity)",
            "rgb(0, 0, -inf)",
            "rgb(1e9, 0, 0)",
            "rgb(256, 0, 0)",
            "rgb(-1, 0, 0)",
            "rgb(0%, 101%, 0%)",
            "rgba(0, 0, 0, 1.5)",
            "hsl(210, 40, 20%)",
            "hsl(210%, 40%, 20%)",
            "hsla(210, 40%, 20%, 2)",
        ] {
            assert!(
                matches!(validate_css_color(value), Err(ThemeTokenError::InvalidFunction { .. })),
                "{value} should be rejected"
            );
        }
        assert!(validate_css_color("rgba(255, 255, 255, 0%)").is_ok());
        assert!(validate_css_color("hsl(-30, 0%, 100%)").is_ok());
    }

    #[test]
    fn rejects_injection() {
        assert!(matches!(
            validate_css_color("red; background: url(evil)"),
            Err(ThemeTokenError::Injection(_))
        ));
        assert!(validate_css_color("#fff } body { color: red").is_err());
        assert!(validate_css_color("expression(alert(1))").is_err());
        assert!(validate_css_color("</style><script>").is_err());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert_eq!(validate_css_color("  "), Err(ThemeTokenError::Empty("color")));
        assert!(validate_css_color("not a color").is_err());
    }

    #[test]
    fn font_family_rules() {
        assert!(validate_css_font_family("Georgia, 'Times New Roman', serif").is_ok());
        assert!(validate_css_font_family("\"Segoe UI\", sans-serif").is_ok());
        assert!(validate_css_font_family("Arial; } body { color: red").is_err());
        assert!(matches!(
            validate_css_font_family("Arial/Bold"),
            Err(ThemeTokenError::InvalidFontCharacter { ch: '/', .. })
        ));
    }

    #[test]
    fn builtin_themes_are_valid() {
        let validator = Validator::new();
        for theme in ThemeRegistry::builtin().list_themes() {
            let result = validator.validate(theme);
            assert!(result.valid, "{} invalid: {}", theme.name, result.error_summary());
            assert!(result.violations.is_empty());
        }
    }

    #[test]
    fn malformed_theme_reports_field() {
        let mut theme = ThemeRegistry::builtin().list_themes()[0].clone();
        theme.accent_color = "gold;".to_string();
        theme.font_family = Some("<b>".to_string());

        let result = Validator::new().validate(&theme);
        assert!(!result.valid);
        let fields: Vec<_> = result.violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"accentColor"));
        assert!(fields.contains(&"fontFamily"));
    }

    #[test]
    fn contrast_is_a_warning_only() {
        let mut theme = ThemeRegistry::builtin().list_themes()[0].clone();
        theme.text_color = theme.background_color.clone();

        let result = Validator::new().validate(&theme);
        assert!(result.valid);
        assert!(!result.has_errors());
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].severity, ViolationSeverity::Warning);
    }
}

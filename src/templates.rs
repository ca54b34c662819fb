//! Template Catalog - Content Presets
//!
//! Presets are read-only reference data. Selecting one copies its default
//! content into the working [`Content`]; the preset itself is never edited.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use crate::ENGINE_VERSION;

pub type TemplateId = String;

/// Marketing content poured into a layout.
///
/// Every text field defaults to the empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub headline: String,
    /// Pre-sanitized markup from the authoring surface, emitted verbatim.
    pub body: String,
    pub cta_text: String,
    pub cta_link: String,
    pub image_url: String,
    pub show_social_links: bool,
}

impl Content {
    pub fn has_image(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Card,
    Full,
    Minimal,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Card, Layout::Full, Layout::Minimal];

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Card => "card",
            Layout::Full => "full",
            Layout::Minimal => "minimal",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown layout '{0}', expected one of: card, full, minimal")]
pub struct UnknownLayout(pub String);

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(Layout::Card),
            "full" => Ok(Layout::Full),
            "minimal" => Ok(Layout::Minimal),
            other => Err(UnknownLayout(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateCategory {
    Welcome,
    Seasonal,
    Promotion,
    #[serde(rename = "Re-engagement")]
    ReEngagement,
    Newsletter,
    Service,
}

impl TemplateCategory {
    pub const ALL: [TemplateCategory; 6] = [
        TemplateCategory::Welcome,
        TemplateCategory::Seasonal,
        TemplateCategory::Promotion,
        TemplateCategory::ReEngagement,
        TemplateCategory::Newsletter,
        TemplateCategory::Service,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TemplateCategory::Welcome => "Welcome",
            TemplateCategory::Seasonal => "Seasonal",
            TemplateCategory::Promotion => "Promotion",
            TemplateCategory::ReEngagement => "Re-engagement",
            TemplateCategory::Newsletter => "Newsletter",
            TemplateCategory::Service => "Service",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePreset {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub layout: Layout,
    pub default_content: Content,
    /// Minimum engine version for presets shipped as JSON files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_min_version: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read preset directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered preset catalog, immutable after construction.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    presets: Vec<TemplatePreset>,
}

static BUILTIN_CATALOG: LazyLock<TemplateCatalog> = LazyLock::new(|| TemplateCatalog {
    presets: builtin_presets(),
});

impl TemplateCatalog {
    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static TemplateCatalog {
        &BUILTIN_CATALOG
    }

    /// Built-in presets followed by every compatible `*.json` preset in `dir`.
    ///
    /// A missing directory yields the built-in catalog. Unreadable, malformed,
    /// duplicate or engine-incompatible files are skipped with a warning.
    pub fn load_from_dir(dir: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin().clone();
        if !dir.exists() {
            return Ok(catalog);
        }

        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|e| e == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let preset = match fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<TemplatePreset>(&raw).map_err(|e| e.to_string()))
            {
                Ok(preset) => preset,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "Skipping unreadable preset file");
                    continue;
                }
            };

            if !is_engine_compatible(&preset) {
                tracing::warn!(
                    preset = %preset.id,
                    required = preset.engine_min_version.as_deref().unwrap_or_default(),
                    engine = ENGINE_VERSION,
                    "Skipping preset that requires a newer engine"
                );
                continue;
            }

            if catalog.get(&preset.id).is_some() {
                tracing::warn!(preset = %preset.id, "Skipping duplicate preset id");
                continue;
            }

            tracing::debug!(preset = %preset.id, path = %path.display(), "Loaded preset");
            catalog.presets.push(preset);
        }

        Ok(catalog)
    }

    pub fn list_templates(&self) -> &[TemplatePreset] {
        &self.presets
    }

    pub fn get(&self, id: &str) -> Option<&TemplatePreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Presets whose category equals `category`, in catalog order.
    pub fn by_category(&self, category: TemplateCategory) -> impl Iterator<Item = &TemplatePreset> {
        self.presets.iter().filter(move |p| p.category == category)
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

/// Built-in presets in registration order.
pub fn list_templates() -> &'static [TemplatePreset] {
    TemplateCatalog::builtin().list_templates()
}

fn is_engine_compatible(preset: &TemplatePreset) -> bool {
    let Some(required) = preset.engine_min_version.as_deref() else {
        return true;
    };

    match (semver::Version::parse(ENGINE_VERSION), semver::Version::parse(required)) {
        (Ok(engine), Ok(min)) => engine >= min,
        _ => false,
    }
}

fn preset(
    id: &str,
    name: &str,
    description: &str,
    category: TemplateCategory,
    layout: Layout,
    content: Content,
) -> TemplatePreset {
    TemplatePreset {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        layout,
        default_content: content,
        engine_min_version: None,
    }
}

fn content(headline: &str, body: &str, cta_text: &str, cta_link: &str) -> Content {
    Content {
        headline: headline.to_string(),
        body: body.to_string(),
        cta_text: cta_text.to_string(),
        cta_link: cta_link.to_string(),
        ..Content::default()
    }
}

fn builtin_presets() -> Vec<TemplatePreset> {
    use TemplateCategory::*;

    vec![
        preset(
            "welcome-new-customer",
            "Welcome New Customer",
            "Greets a customer after their first booking",
            Welcome,
            Layout::Minimal,
            content(
                "Welcome to the Family",
                "<p>Thanks for choosing {{company_name}}. We're glad to have you with us.</p>\
                 <p>Here's what you can expect from us:</p>\
                 <ul><li>Upfront, honest pricing</li><li>Licensed technicians</li>\
                 <li>A satisfaction guarantee</li></ul>",
                "Book Your Next Visit",
                "{{booking_link}}",
            ),
        ),
        preset(
            "spring-tune-up",
            "Spring Tune-Up",
            "Seasonal maintenance reminder with a hero image",
            Seasonal,
            Layout::Full,
            Content {
                image_url: "https://images.example.com/spring-hero.jpg".to_string(),
                ..content(
                    "Get Ready for Spring",
                    "<p>Warmer days are coming. A <strong>spring tune-up</strong> keeps your system \
                     running efficiently all season.</p>",
                    "Schedule a Tune-Up",
                    "{{booking_link}}",
                )
            },
        ),
        preset(
            "holiday-greetings",
            "Holiday Greetings",
            "End-of-year thank you note",
            Seasonal,
            Layout::Card,
            content(
                "Happy Holidays from Our Team",
                "<p>Thank you for trusting us with your home this year. \
                 We wish you a warm and safe holiday season.</p>",
                "Visit Our Website",
                "{{website_link}}",
            ),
        ),
        preset(
            "limited-time-offer",
            "Limited-Time Offer",
            "Discount promotion with a strong call to action",
            Promotion,
            Layout::Card,
            Content {
                image_url: "https://images.example.com/offer-banner.jpg".to_string(),
                show_social_links: true,
                ..content(
                    "Save 20% This Month Only",
                    "<h3>Our biggest discount of the year</h3>\
                     <p>Book any service before the end of the month and <strong>save 20%</strong>.</p>",
                    "Claim Your Discount",
                    "{{booking_link}}",
                )
            },
        ),
        preset(
            "we-miss-you",
            "We Miss You",
            "Win back customers who have not booked in a while",
            ReEngagement,
            Layout::Minimal,
            content(
                "It's Been a While",
                "<p>We haven't seen you in some time. Is there anything we can help with?</p>",
                "Book a Check-Up",
                "{{booking_link}}",
            ),
        ),
        preset(
            "monthly-newsletter",
            "Monthly Newsletter",
            "News, tips and updates",
            Newsletter,
            Layout::Full,
            Content {
                show_social_links: true,
                ..content(
                    "This Month at {{company_name}}",
                    "<h3>Tip of the month</h3>\
                     <p>Replace your air filter every <strong>90 days</strong> to keep energy bills down.</p>\
                     <h3>Team news</h3><p>We've added two new technicians to serve you faster.</p>",
                    "Read More",
                    "{{website_link}}",
                )
            },
        ),
        preset(
            "service-follow-up",
            "Service Follow-Up",
            "Asks for a review after a completed job",
            Service,
            Layout::Card,
            content(
                "How Did We Do?",
                "<p>Thanks for letting us take care of your recent service. \
                 Your feedback helps us improve.</p>",
                "Leave a Review",
                "{{review_link}}",
            ),
        ),
        preset(
            "appointment-reminder",
            "Appointment Reminder",
            "Reminds a customer of an upcoming visit",
            Service,
            Layout::Minimal,
            content(
                "Your Appointment Is Coming Up",
                "<p>This is a friendly reminder about your upcoming appointment. \
                 Need to reschedule? Just let us know.</p>",
                "Manage Appointment",
                "{{booking_link}}",
            ),
        ),
    ]
}

//! Builder session: one editor's content, theme and layout.
//!
//! Every edit invalidates the preview; the next `preview()` regenerates the
//! whole document. The only memoization is skipping regeneration when the
//! inputs equal the ones the cached document was built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::generator::generate;
use crate::hashing::compute_document_hash;
use crate::templates::{Content, Layout, TemplateCategory, TemplatePreset};
use crate::theme::{Theme, ThemeOverrides};

/// The snapshot stored on a campaign record when the user saves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignContent {
    pub id: Uuid,
    pub html: String,
    pub theme_name: String,
    pub layout: Layout,
    pub content_hash: String,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CachedPreview {
    content: Content,
    theme: Theme,
    layout: Layout,
    html: String,
}

impl CachedPreview {
    fn built_from(&self, content: &Content, theme: &Theme, layout: Layout) -> bool {
        self.layout == layout && self.content == *content && self.theme == *theme
    }
}

#[derive(Debug, Clone)]
pub struct BuilderSession {
    content: Content,
    theme: Theme,
    layout: Layout,
    preset_id: Option<String>,
    cache: Option<CachedPreview>,
    generations: u64,
}

impl BuilderSession {
    pub fn new(theme: Theme) -> Self {
        Self {
            content: Content::default(),
            theme,
            layout: Layout::Card,
            preset_id: None,
            cache: None,
            generations: 0,
        }
    }

    /// Copy a preset's default content and layout into the session.
    pub fn apply_preset(&mut self, preset: &TemplatePreset) {
        self.content = preset.default_content.clone();
        self.layout = preset.layout;
        self.preset_id = Some(preset.id.clone());
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn preset_id(&self) -> Option<&str> {
        self.preset_id.as_deref()
    }

    pub fn set_headline(&mut self, headline: impl Into<String>) {
        self.content.headline = headline.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.content.body = body.into();
    }

    pub fn set_cta(&mut self, text: impl Into<String>, link: impl Into<String>) {
        self.content.cta_text = text.into();
        self.content.cta_link = link.into();
    }

    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.content.image_url = url.into();
    }

    pub fn set_show_social_links(&mut self, show: bool) {
        self.content.show_social_links = show;
    }

    pub fn select_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Replace the session theme with a customized copy of the current one.
    pub fn customize_theme(&mut self, overrides: &ThemeOverrides) {
        self.theme = self.theme.customize(self.theme.custom_name(), overrides);
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Number of times the document has actually been generated.
    pub fn generations(&self) -> u64 {
        self.generations
    }

    /// Current document, regenerated if any input changed.
    pub fn preview(&mut self) -> &str {
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|cached| cached.built_from(&self.content, &self.theme, self.layout));

        if !fresh {
            let html = generate(&self.content, &self.theme, self.layout);
            self.generations += 1;
            self.cache = Some(CachedPreview {
                content: self.content.clone(),
                theme: self.theme.clone(),
                layout: self.layout,
                html,
            });
        }

        self.cache.as_ref().map(|c| c.html.as_str()).unwrap_or_default()
    }

    /// Final document and metadata for the campaign record.
    pub fn save(&mut self) -> CampaignContent {
        let html = self.preview().to_string();
        let content_hash = compute_document_hash(&html);

        tracing::info!(
            preset = self.preset_id.as_deref().unwrap_or("none"),
            theme = %self.theme.name,
            layout = %self.layout,
            content_hash = %content_hash,
            "Saved campaign content"
        );

        CampaignContent {
            id: Uuid::new_v4(),
            html,
            theme_name: self.theme.name.clone(),
            layout: self.layout,
            content_hash,
            saved_at: Utc::now(),
        }
    }
}

/// Presets grouped by category for display, catalog order kept within groups.
pub fn group_by_category(presets: &[TemplatePreset]) -> BTreeMap<TemplateCategory, Vec<&TemplatePreset>> {
    let mut groups: BTreeMap<TemplateCategory, Vec<&TemplatePreset>> = BTreeMap::new();
    for preset in presets {
        groups.entry(preset.category).or_default().push(preset);
    }
    groups
}

//! Render Pipeline - Catalog-Aware Entry Point
//!
//! Resolves a preset and a theme by name, applies optional overrides and
//! hands the triple to the generator. Lookups and custom themes can fail;
//! generation itself cannot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::generator::generate;
use crate::hashing::{compute_document_hash, compute_input_hash};
use crate::templates::{Content, Layout, TemplateCatalog, TemplatePreset};
use crate::theme::{CustomTheme, Theme, ThemeOverrides, ThemeRegistry};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Where the theme for a render comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source")]
pub enum ThemeSelection {
    /// A registry entry, optionally customized.
    Named {
        name: String,
        #[serde(default)]
        overrides: Option<ThemeOverrides>,
    },
    /// A caller-supplied theme, filled in from its base entry.
    Custom { theme: CustomTheme },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    pub template_id: String,
    pub theme: ThemeSelection,
    #[serde(default)]
    pub layout: Option<Layout>,
    #[serde(default)]
    pub content: Option<Content>,
}

impl RenderRequest {
    pub fn new(template_id: impl Into<String>, theme_name: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            theme: ThemeSelection::Named {
                name: theme_name.into(),
                overrides: None,
            },
            layout: None,
            content: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedEmail {
    pub id: String,
    pub template_id: String,
    pub theme: String,
    pub layout: Layout,
    pub engine_version: String,
    pub rendered_at: DateTime<Utc>,
    pub document_hash: String,
    pub input_hash: String,
    pub html: String,
}

pub struct RenderPipeline {
    catalog: TemplateCatalog,
    themes: ThemeRegistry,
}

impl RenderPipeline {
    pub fn new(catalog: TemplateCatalog, themes: ThemeRegistry) -> Self {
        Self { catalog, themes }
    }

    pub fn list_templates(&self) -> &[TemplatePreset] {
        self.catalog.list_templates()
    }

    pub fn list_themes(&self) -> &[Theme] {
        self.themes.list_themes()
    }

    pub fn get_template(&self, id: &str) -> Option<&TemplatePreset> {
        self.catalog.get(id)
    }

    /// Resolve the theme a request asks for.
    pub fn resolve_theme(&self, selection: &ThemeSelection) -> Result<Theme, PipelineError> {
        match selection {
            ThemeSelection::Named { name, overrides } => {
                let base = self
                    .themes
                    .get(name)
                    .ok_or_else(|| PipelineError::ThemeNotFound(name.clone()))?;
                Ok(match overrides {
                    Some(overrides) => base.customize(base.name.clone(), overrides),
                    None => base.clone(),
                })
            }
            ThemeSelection::Custom { theme } => self.themes.build_custom(theme).ok_or_else(|| {
                let base = theme.base.as_deref().unwrap_or("<default>");
                PipelineError::ThemeNotFound(base.to_string())
            }),
        }
    }

    pub fn render(&self, request: &RenderRequest) -> Result<RenderedEmail, PipelineError> {
        let preset = self
            .catalog
            .get(&request.template_id)
            .ok_or_else(|| PipelineError::TemplateNotFound(request.template_id.clone()))?;

        let theme = self.resolve_theme(&request.theme)?;
        let layout = request.layout.unwrap_or(preset.layout);
        let content = request.content.as_ref().unwrap_or(&preset.default_content);

        let html = generate(content, &theme, layout);
        let input_hash = compute_input_hash(content, &theme, layout, ENGINE_VERSION)?;
        let document_hash = compute_document_hash(&html);

        tracing::info!(
            template = %preset.id,
            theme = %theme.name,
            layout = %layout,
            document_hash = %document_hash,
            "Rendered email"
        );

        Ok(RenderedEmail {
            id: Uuid::new_v4().to_string(),
            template_id: preset.id.clone(),
            theme: theme.name,
            layout,
            engine_version: ENGINE_VERSION.to_string(),
            rendered_at: Utc::now(),
            document_hash,
            input_hash,
            html,
        })
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(TemplateCatalog::default(), ThemeRegistry::default())
    }
}

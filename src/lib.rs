//! MailForge Core - Email Template Engine
//!
//! # Guarantees
//! 1. Generation Is Total: every (content, theme, layout) yields a document
//! 2. Deterministic Output: equal inputs, byte-identical HTML
//! 3. Merge Fields Pass Through: `{{token}}` is never resolved here
//! 4. Themes Are Validated at the Boundary, never inside the generator
//! 5. Previews Never Run Scripts

pub mod templates;
pub mod theme;
pub mod validation;
pub mod style;
pub mod layouts;
pub mod generator;
pub mod merge_fields;
pub mod hashing;
pub mod sandbox;
pub mod result_view;
pub mod pipeline;
pub mod builder;

pub use templates::{list_templates, Content, Layout, TemplateCatalog, TemplateCategory, TemplatePreset};
pub use theme::{list_themes, CustomTheme, Theme, ThemeOverrides, ThemeRegistry};
pub use validation::{ValidationResult, ValidationViolation, ViolationSeverity};
pub use generator::generate;
pub use merge_fields::MergeField;
pub use hashing::{canonical_json, compute_document_hash, compute_input_hash};
pub use sandbox::{PreviewError, PreviewOptions, PreviewSandbox, PreviewState, SandboxPermissions};
pub use result_view::{RenderOutcome, ResultView};
pub use pipeline::{PipelineError, RenderPipeline, RenderRequest, RenderedEmail, ThemeSelection};
pub use builder::{BuilderSession, CampaignContent};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

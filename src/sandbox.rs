//! Preview Sandbox - Script-Free Document Embedding
//!
//! A generated document is shown inside a capability-scoped rendering
//! context: a `sandbox=""` iframe fed through `srcdoc`, with scripting and
//! navigation never granted. By default an invisible overlay swallows clicks
//! and link follows; scrollable mode removes the overlay so a long document
//! can be scrolled by hand, still without scripts.
//!
//! State machine: `Idle -> Rendering` on assign, back to `Idle` on clear.
//! Assigning while rendering replaces the document.

use askama::Template;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PREVIEW_WIDTH: u32 = 600;
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 800;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;

/// Injected into the sandboxed copy of the document.
pub const PREVIEW_CSP: &str =
    "default-src 'none'; img-src * data:; style-src 'unsafe-inline'; script-src 'none'; form-action 'none'";

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Failed to render preview frame: {0}")]
    Render(#[from] askama::Error),
}

/// Capabilities a rendering context grants to its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SandboxPermissions {
    pub scripts: bool,
    pub navigation: bool,
}

impl SandboxPermissions {
    /// Nothing granted. The preview always uses this set.
    pub const LOCKED: Self = Self {
        scripts: false,
        navigation: false,
    };

    /// Value of the iframe `sandbox` attribute for this set.
    pub fn sandbox_attribute(self) -> String {
        let mut tokens = vec![];
        if self.scripts {
            tokens.push("allow-scripts");
        }
        if self.navigation {
            tokens.push("allow-top-navigation");
        }
        tokens.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    /// Drop the click-blocking overlay so the document can be scrolled.
    pub scrollable: bool,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            scrollable: false,
            scale: 1.0,
            width: DEFAULT_PREVIEW_WIDTH,
            height: DEFAULT_PREVIEW_HEIGHT,
        }
    }
}

impl PreviewOptions {
    /// Scale clamped to `MIN_SCALE..=MAX_SCALE`; non-finite or non-positive
    /// values mean 1.0.
    pub fn effective_scale(&self) -> f64 {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return 1.0;
        }
        self.scale.clamp(MIN_SCALE, MAX_SCALE)
    }

    /// Outer box size after scaling, in CSS pixels.
    pub fn scaled_size(&self) -> (u32, u32) {
        let s = self.effective_scale();
        (
            (self.width as f64 * s).round() as u32,
            (self.height as f64 * s).round() as u32,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Rendering { document: String },
}

#[derive(Debug, Clone, Default)]
pub struct PreviewSandbox {
    state: PreviewState,
    options: PreviewOptions,
}

impl PreviewSandbox {
    pub fn new(options: PreviewOptions) -> Self {
        Self {
            state: PreviewState::Idle,
            options,
        }
    }

    pub fn permissions(&self) -> SandboxPermissions {
        SandboxPermissions::LOCKED
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PreviewState::Idle
    }

    /// Show `html`, replacing any current document.
    pub fn assign(&mut self, html: impl Into<String>) {
        self.state = PreviewState::Rendering {
            document: html.into(),
        };
    }

    pub fn clear(&mut self) {
        self.state = PreviewState::Idle;
    }

    pub fn set_scrollable(&mut self, scrollable: bool) {
        self.options.scrollable = scrollable;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.options.scale = scale;
    }

    /// Embedding markup for the current document, `None` while idle.
    pub fn markup(&self) -> Result<Option<String>, PreviewError> {
        match &self.state {
            PreviewState::Idle => Ok(None),
            PreviewState::Rendering { document } => Ok(Some(self.frame(document)?)),
        }
    }

    fn frame(&self, document: &str) -> askama::Result<String> {
        let opts = &self.options;
        let (outer_width, outer_height) = opts.scaled_size();
        let srcdoc = with_csp(document);

        PreviewFrame {
            outer_width,
            outer_height,
            width: opts.width,
            height: opts.height,
            scale: opts.effective_scale(),
            scrollable: opts.scrollable,
            sandbox: self.permissions().sandbox_attribute(),
            srcdoc: &srcdoc,
        }
        .render()
    }
}

#[derive(Template)]
#[template(
    source = r#"<div class="preview-frame"
 style="position: relative; width: {{ outer_width }}px; height: {{ outer_height }}px; overflow: hidden;">
<iframe title="Email preview" sandbox="{{ sandbox }}" referrerpolicy="no-referrer"
 scrolling="{% if scrollable %}yes{% else %}no{% endif %}"
 style="width: {{ width }}px; height: {{ height }}px; border: 0; transform: scale({{ scale }});
 transform-origin: 0 0;"
 srcdoc="{{ srcdoc }}"></iframe>
{% if !scrollable -%}
<div class="preview-blocker" aria-hidden="true"
 style="position: absolute; top: 0; right: 0; bottom: 0; left: 0;
 background: transparent; cursor: default;"></div>
{% endif -%}
</div>"#,
    ext = "html"
)]
struct PreviewFrame<'a> {
    outer_width: u32,
    outer_height: u32,
    width: u32,
    height: u32,
    scale: f64,
    scrollable: bool,
    sandbox: String,
    srcdoc: &'a str,
}

/// Copy of `document` with the preview CSP as the first element of `<head>`.
fn with_csp(document: &str) -> String {
    let meta = format!("<meta http-equiv=\"Content-Security-Policy\" content=\"{PREVIEW_CSP}\">");
    match document.find("<head>") {
        Some(pos) => {
            let at = pos + "<head>".len();
            format!("{}{}{}", &document[..at], meta, &document[at..])
        }
        None => format!("{meta}{document}"),
    }
}

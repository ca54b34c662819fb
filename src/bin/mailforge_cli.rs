//! MailForge CLI - JSON bridge over the render pipeline
//!
//! Commands: themes, templates, render, preview, tokens
//! Outputs JSON to stdout, logs to stderr
//! Returns 1 on bad input, 2 on render failure

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use mailforge_core::{
    merge_fields,
    Content, CustomTheme, Layout, PreviewOptions, PreviewSandbox, RenderPipeline, RenderRequest,
    TemplateCatalog, ThemeRegistry, ThemeSelection,
};

#[derive(Parser)]
#[command(name = "mailforge-cli")]
#[command(about = "MailForge CLI - Email Template Engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of extra JSON presets
    #[arg(long, default_value = "templates", global = true)]
    templates_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List available themes
    Themes,

    /// List available template presets
    Templates,

    /// Render a preset to HTML
    Render {
        /// Template preset ID
        #[arg(short, long)]
        template: String,

        /// Theme name from the registry
        #[arg(long, default_value = "Classic Navy")]
        theme: String,

        /// Theme JSON file, used instead of --theme; absent fields come from its `base`
        #[arg(long)]
        theme_file: Option<PathBuf>,

        /// Layout override (card, full, minimal)
        #[arg(short, long)]
        layout: Option<Layout>,

        /// Content JSON, replaces the preset's default content
        #[arg(short, long)]
        content: Option<String>,

        /// Print only the HTML document
        #[arg(long)]
        html: bool,
    },

    /// Render a preset and wrap it in the preview sandbox
    Preview {
        /// Template preset ID
        #[arg(short, long)]
        template: String,

        /// Theme name from the registry
        #[arg(long, default_value = "Classic Navy")]
        theme: String,

        /// Allow manual scrolling (scripts stay disabled)
        #[arg(long)]
        scrollable: bool,

        /// Uniform scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
    },

    /// List merge-field tokens left in an HTML file
    Tokens {
        /// HTML file to scan
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "mailforge_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = match TemplateCatalog::load_from_dir(&cli.templates_dir) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load templates");
            return print_error(&format!("Failed to load templates: {e}"), ExitCode::FAILURE);
        }
    };

    let pipeline = RenderPipeline::new(catalog, ThemeRegistry::default());

    match cli.command {
        Commands::Themes => print_json(&pipeline.list_themes()),

        Commands::Templates => {
            let templates: Vec<_> = pipeline
                .list_templates()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "name": t.name,
                        "description": t.description,
                        "category": t.category,
                        "layout": t.layout,
                    })
                })
                .collect();
            print_json(&templates)
        }

        Commands::Render { template, theme, theme_file, layout, content, html } => {
            let theme = match theme_file {
                Some(path) => match read_theme(&path) {
                    Ok(theme) => ThemeSelection::Custom { theme },
                    Err(e) => return print_error(&format!("Invalid theme file: {e}"), ExitCode::FAILURE),
                },
                None => ThemeSelection::Named { name: theme, overrides: None },
            };

            let content = content
                .as_deref()
                .map(serde_json::from_str::<Content>)
                .transpose();
            let content = match content {
                Ok(c) => c,
                Err(e) => return print_error(&format!("Invalid content: {e}"), ExitCode::FAILURE),
            };

            let request = RenderRequest { template_id: template, theme, layout, content };

            match pipeline.render(&request) {
                Ok(email) if html => {
                    println!("{}", email.html);
                    ExitCode::SUCCESS
                }
                Ok(email) => print_json(&serde_json::json!({ "success": true, "email": email })),
                Err(e) => print_error(&e.to_string(), ExitCode::from(2)),
            }
        }

        Commands::Preview { template, theme, scrollable, scale } => {
            let email = match pipeline.render(&RenderRequest::new(template, theme)) {
                Ok(email) => email,
                Err(e) => return print_error(&e.to_string(), ExitCode::from(2)),
            };

            let mut sandbox = PreviewSandbox::new(PreviewOptions {
                scrollable,
                scale,
                ..PreviewOptions::default()
            });
            sandbox.assign(email.html);

            match sandbox.markup() {
                Ok(markup) => print_json(&serde_json::json!({
                    "success": true,
                    "documentHash": email.document_hash,
                    "markup": markup,
                })),
                Err(e) => print_error(&e.to_string(), ExitCode::from(2)),
            }
        }

        Commands::Tokens { file } => {
            let html = match fs::read_to_string(&file) {
                Ok(h) => h,
                Err(e) => {
                    let message = format!("Failed to read {}: {e}", file.display());
                    return print_error(&message, ExitCode::FAILURE);
                }
            };

            print_json(&serde_json::json!({
                "tokens": merge_fields::find_tokens(&html),
                "unresolved": merge_fields::unresolved_fields(&html),
                "unknown": merge_fields::unknown_tokens(&html),
            }))
        }
    }
}

fn read_theme(path: &Path) -> Result<CustomTheme, String> {
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            ExitCode::FAILURE
        }
    }
}

fn print_error(message: &str, code: ExitCode) -> ExitCode {
    let output = serde_json::json!({ "success": false, "error": message });
    println!("{output}");
    code
}

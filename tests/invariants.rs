//! Contract Invariant Tests
//!
//! These tests verify the guarantees the send pipeline and preview rely on.

use mailforge_core::{
    generate, list_templates, list_themes,
    merge_fields::{find_tokens, MergeField},
    Content, Layout, PreviewOptions, PreviewSandbox, RenderPipeline, RenderRequest, Theme,
    ThemeRegistry,
};
use pretty_assertions::assert_eq;

fn classic_navy() -> Theme {
    ThemeRegistry::builtin().get("Classic Navy").unwrap().clone()
}

fn welcome_content() -> Content {
    Content {
        headline: "Welcome to the Family".to_string(),
        body: "<p>Hi</p>".to_string(),
        cta_text: "Book".to_string(),
        cta_link: "{{booking_link}}".to_string(),
        ..Content::default()
    }
}

fn position(html: &str, needle: &str) -> usize {
    html.find(needle)
        .unwrap_or_else(|| panic!("missing {needle:?} in output"))
}

#[test]
fn invariant_generate_is_total() {
    let mut inputs: Vec<Content> = list_templates()
        .iter()
        .map(|p| p.default_content.clone())
        .collect();
    inputs.push(Content::default());

    for theme in list_themes() {
        for content in &inputs {
            for layout in Layout::ALL {
                let html = generate(content, theme, layout);
                assert!(html.starts_with("<!DOCTYPE html>"), "{layout} / {}", theme.name);
                assert!(html.contains("</html>"), "{layout} / {}", theme.name);
            }
        }
    }
}

#[test]
fn invariant_generate_is_idempotent() {
    let content = welcome_content();
    let theme = classic_navy();

    for layout in Layout::ALL {
        // deep-equal values with distinct identities
        let first = generate(&content, &theme, layout);
        let second = generate(&content.clone(), &theme.clone(), layout);
        assert_eq!(first, second);
    }
}

#[test]
fn invariant_primary_color_in_css() {
    for theme in list_themes() {
        for layout in Layout::ALL {
            let html = generate(&Content::default(), theme, layout);
            let style = &html[position(&html, "<style>")..position(&html, "</style>")];
            assert!(
                style.contains(&format!(": {};", theme.primary_color)),
                "{layout} / {} lacks primary color rule",
                theme.name
            );
        }
    }
}

#[test]
fn invariant_merge_fields_preserved() {
    let content = Content {
        headline: "Plain".to_string(),
        body: "<p>No tokens here</p>".to_string(),
        ..Content::default()
    };

    for layout in Layout::ALL {
        let html = generate(&content, &classic_navy(), layout);
        assert!(html.contains("{{company_name}}"), "{layout}");
        assert!(html.contains("{{unsubscribe_link}}"), "{layout}");
        assert!(html.contains("{{company_address}}"), "{layout}");
    }
}

#[test]
fn invariant_user_tokens_are_not_substituted() {
    let content = Content {
        body: "<p>Hello from {{company_name}} and {{first_name}}</p>".to_string(),
        ..Content::default()
    };
    let html = generate(&content, &classic_navy(), Layout::Card);
    assert!(html.contains("<p>Hello from {{company_name}} and {{first_name}}</p>"));

    let tokens = find_tokens(&html);
    assert!(tokens.contains(&"first_name".to_string()));
    for field in [MergeField::CompanyName, MergeField::CompanyAddress, MergeField::UnsubscribeLink] {
        assert!(tokens.contains(&field.name().to_string()));
    }
}

#[test]
fn invariant_layout_structural_markers() {
    let content = welcome_content();
    let theme = classic_navy();

    let card = generate(&content, &theme, Layout::Card);
    assert!(card.contains("<table role=\"presentation\" class=\"card\""));
    assert!(!card.contains("display: flex"));
    assert!(!card.contains("display: grid"));

    let full = generate(&content, &theme, Layout::Full);
    assert!(position(&full, "<div class=\"hero") < position(&full, "<h2>"));

    let minimal = generate(&content, &theme, Layout::Minimal);
    let h2 = position(&minimal, "<h2>");
    let divider = position(&minimal, "<div class=\"divider\"");
    let body = position(&minimal, "<div class=\"body-content\">");
    assert!(h2 < divider && divider < body);
}

#[test]
fn scenario_minimal_welcome() {
    let html = generate(&welcome_content(), &classic_navy(), Layout::Minimal);
    assert!(html.contains("<h2>Welcome to the Family</h2>"));
    assert!(html.contains("<div class=\"divider\" style=\"background-color: #1c2d4a;\"></div>"));
    assert!(html.contains("<a class=\"button\" href=\"{{booking_link}}\">Book</a>"));
}

#[test]
fn scenario_full_hero_and_card() {
    let theme = classic_navy();
    let html = generate(&welcome_content(), &theme, Layout::Full);

    let hero = html
        .find("<img")
        .or_else(|| html.find("<div class=\"hero hero-color\""))
        .unwrap();
    assert!(hero < position(&html, "<h2>"));
    assert!(html.contains(&format!(
        "<div class=\"content-card\" style=\"background-color: {};\">",
        theme.card_background_color
    )));

    let with_image = Content {
        image_url: "https://img.example.com/hero.jpg".to_string(),
        ..welcome_content()
    };
    let html = generate(&with_image, &theme, Layout::Full);
    assert!(position(&html, "<img class=\"hero-image\"") < position(&html, "<h2>"));
    assert!(!html.contains("hero-color\" style"));
}

#[test]
fn scenario_card_without_image() {
    let html = generate(&welcome_content(), &classic_navy(), Layout::Card);
    assert!(!html.contains("<img"));
    assert!(html.contains("<h2>Welcome to the Family</h2>"));
}

#[test]
fn scenario_empty_cta_link() {
    let content = Content {
        cta_link: String::new(),
        ..welcome_content()
    };
    for layout in Layout::ALL {
        let html = generate(&content, &classic_navy(), layout);
        assert!(html.contains("<a class=\"button\" href=\"\">Book</a>"), "{layout}");
    }
}

#[test]
fn scenario_dark_mode_block() {
    for layout in Layout::ALL {
        let html = generate(&welcome_content(), &classic_navy(), layout);
        assert!(html.contains("@media (prefers-color-scheme: dark)"), "{layout}");
        assert!(html.contains("@media only screen and (max-width: 600px)"), "{layout}");
    }
}

#[test]
fn invariant_pipeline_hashes_stable() {
    let pipeline = RenderPipeline::default();
    let request = RenderRequest::new("limited-time-offer", "Sunset Orange");

    let first = pipeline.render(&request).unwrap();
    let second = pipeline.render(&request).unwrap();

    assert_eq!(first.html, second.html);
    assert_eq!(first.document_hash, second.document_hash);
    assert_eq!(first.input_hash, second.input_hash);
    assert_ne!(first.id, second.id);
}

#[test]
fn invariant_preview_never_runs_scripts() {
    let html = generate(&welcome_content(), &classic_navy(), Layout::Card);

    for scrollable in [false, true] {
        let mut sandbox = PreviewSandbox::new(PreviewOptions {
            scrollable,
            scale: 0.75,
            ..PreviewOptions::default()
        });
        sandbox.assign(html.clone());
        let markup = sandbox.markup().unwrap().unwrap();

        assert!(markup.contains("sandbox=\"\""));
        assert!(!markup.contains("allow-scripts"));
        assert_eq!(markup.contains("preview-blocker"), !scrollable);
        assert!(markup.contains("width: 450px; height: 600px;"));
    }
}

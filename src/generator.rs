//! HTML Generator - Content + Theme + Layout -> Document
//!
//! `generate` is pure and total: every (content, theme, layout) triple,
//! including an all-empty content, yields a complete HTML5 document. Same
//! inputs always give byte-identical output.
//!
//! `content.body` is treated as pre-sanitized markup and emitted as-is.

use askama::Template;

use crate::layouts;
use crate::style::{MediaQuery, StyleRule, Stylesheet};
use crate::templates::{Content, Layout};
use crate::theme::Theme;

/// Viewport width below which the responsive block applies.
pub const RESPONSIVE_BREAKPOINT_PX: u32 = 600;

const DARK_BACKGROUND: &str = "#121212";
const DARK_SURFACE: &str = "#1e1e1e";
const DARK_TEXT: &str = "#e5e5e5";

/// Minimal well-formed document returned if template rendering fails.
const FALLBACK_DOCUMENT: &str = "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<title></title>\n</head>\n<body>\n</body>\n</html>";

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<meta name="color-scheme" content="light dark">
<meta name="supported-color-schemes" content="light dark">
<title>{{ title }}</title>
<style>
{{ stylesheet|safe }}</style>
</head>
<body>
{{ body|safe }}
</body>
</html>"#,
    ext = "html"
)]
struct EmailDocument<'a> {
    title: &'a str,
    stylesheet: &'a str,
    body: &'a str,
}

/// Render a complete email document.
pub fn generate(content: &Content, theme: &Theme, layout: Layout) -> String {
    match render_document(content, theme, layout) {
        Ok(html) => {
            tracing::debug!(
                layout = %layout,
                theme = %theme.name,
                bytes = html.len(),
                "Generated email document"
            );
            html
        }
        Err(error) => {
            tracing::error!(
                %error,
                layout = %layout,
                theme = %theme.name,
                "Email template failed to render"
            );
            FALLBACK_DOCUMENT.to_string()
        }
    }
}

fn render_document(content: &Content, theme: &Theme, layout: Layout) -> askama::Result<String> {
    let stylesheet = stylesheet(theme, layout).render();
    let body = layouts::render_body(content, theme, layout)?;

    EmailDocument {
        title: &content.headline,
        stylesheet: &stylesheet,
        body: &body,
    }
    .render()
}

/// The document stylesheet: base rules, the button, layout overrides, then
/// the responsive and dark-mode blocks.
pub fn stylesheet(theme: &Theme, layout: Layout) -> Stylesheet {
    let mut sheet = Stylesheet::new();
    sheet
        .rules(base_rules(theme))
        .rule(button_rule(theme))
        .rules(layouts::layout_rules(theme, layout))
        .media(MediaQuery::MaxWidth(RESPONSIVE_BREAKPOINT_PX), responsive_rules())
        .media(
            MediaQuery::MaxWidth(RESPONSIVE_BREAKPOINT_PX),
            layouts::responsive_rules(layout),
        )
        .media(MediaQuery::PrefersDark, dark_rules());
    sheet
}

fn base_rules(theme: &Theme) -> Vec<StyleRule> {
    vec![
        StyleRule::new("body")
            .decl("margin", "0")
            .decl("padding", "0")
            .decl("background-color", theme.background_color.as_str())
            .decl("color", theme.text_color.as_str())
            .decl("font-family", theme.font_stack())
            .decl("line-height", "1.6")
            .decl("-webkit-text-size-adjust", "100%"),
        StyleRule::new(".wrapper")
            .decl("width", "100%")
            .decl("background-color", theme.background_color.as_str()),
        StyleRule::new(".container")
            .decl("max-width", "600px")
            .decl("margin", "0 auto"),
        StyleRule::new("h2")
            .decl("margin", "0 0 16px")
            .decl("color", theme.primary_color.as_str())
            .decl("font-size", "26px")
            .decl("line-height", "1.3"),
        StyleRule::new("h3")
            .decl("margin", "24px 0 8px")
            .decl("color", theme.secondary_color.as_str())
            .decl("font-size", "18px"),
        StyleRule::new(".body-content")
            .decl("font-size", "16px")
            .decl("color", theme.text_color.as_str()),
        StyleRule::new("a").decl("color", theme.primary_color.as_str()),
        StyleRule::new("img")
            .decl("display", "block")
            .decl("border", "0")
            .decl("max-width", "100%")
            .decl("height", "auto"),
        StyleRule::new(".cta").decl("margin", "24px 0"),
        StyleRule::new(".social")
            .decl("text-align", "center")
            .decl("font-size", "14px"),
        StyleRule::new(".footer")
            .decl("padding", "24px 0")
            .decl("text-align", "center")
            .decl("font-size", "12px")
            .decl("color", theme.text_color.as_str()),
        StyleRule::new(".footer a").decl("color", theme.accent_color.as_str()),
    ]
}

fn button_rule(theme: &Theme) -> StyleRule {
    StyleRule::new(".button")
        .decl("display", "inline-block")
        .decl("padding", "14px 28px")
        .decl("border-radius", "6px")
        .decl("background-color", theme.primary_color.as_str())
        .decl(
            "background-image",
            format!(
                "linear-gradient(135deg, {}, {})",
                theme.secondary_color, theme.primary_color
            ),
        )
        .decl("color", "#ffffff")
        .decl("font-weight", "bold")
        .decl("text-decoration", "none")
}

fn responsive_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::new(".button")
            .decl("display", "block !important")
            .decl("width", "100% !important")
            .decl("box-sizing", "border-box")
            .decl("text-align", "center"),
        StyleRule::new("h2").decl("font-size", "22px !important"),
    ]
}

fn dark_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::new("body, .wrapper, .outer")
            .decl("background-color", format!("{DARK_BACKGROUND} !important"))
            .decl("color", format!("{DARK_TEXT} !important")),
        StyleRule::new(".content-card, .card")
            .decl("background-color", format!("{DARK_SURFACE} !important")),
        StyleRule::new(".body-content, .footer, .signature")
            .decl("color", format!("{DARK_TEXT} !important")),
        StyleRule::new("h2").decl("color", "#ffffff !important"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;
    use pretty_assertions::assert_eq;

    fn navy() -> &'static Theme {
        ThemeRegistry::builtin().get("Classic Navy").unwrap()
    }

    #[test]
    fn empty_content_is_a_full_document() {
        for layout in Layout::ALL {
            let html = generate(&Content::default(), navy(), layout);
            assert!(html.starts_with("<!DOCTYPE html>"), "{layout}");
            assert!(html.ends_with("</html>"), "{layout}");
            assert!(html.contains("<title></title>"));
            assert_eq!(html.matches("<style>").count(), 1);
            assert!(html.contains("<head>") && html.contains("<body>"));
        }
    }

    #[test]
    fn button_uses_gradient() {
        let css = stylesheet(navy(), Layout::Card).render();
        assert!(css.contains("background-image: linear-gradient(135deg, #2e4a7a, #1c2d4a);"));
    }

    #[test]
    fn every_layout_has_all_three_blocks() {
        for layout in Layout::ALL {
            let sheet = stylesheet(navy(), layout);
            assert!(sheet.find_rules("body").next().is_some());
            assert!(sheet.find_rules(".button").next().is_some());

            let responsive = sheet.media_block(MediaQuery::MaxWidth(600)).unwrap();
            assert!(responsive.rules.iter().any(|r| r.selector() == ".button"));
            assert!(responsive.rules.iter().any(|r| r.selector() == "h2"));

            assert!(sheet.media_block(MediaQuery::PrefersDark).is_some());

            let css = sheet.render();
            assert_eq!(css.matches("@media only screen and (max-width: 600px)").count(), 1);
        }
    }

    #[test]
    fn full_layout_makes_hero_full_bleed() {
        let sheet = stylesheet(navy(), Layout::Full);
        let hero = sheet.find_rules(".hero").next().unwrap();
        assert!(hero.declarations().iter().any(|d| d.property == "max-width" && d.value == "none"));
        assert!(stylesheet(navy(), Layout::Card).find_rules(".hero").next().is_none());
    }

    #[test]
    fn headline_is_escaped_but_body_is_not() {
        let content = Content {
            headline: "Tom & Jerry <3".to_string(),
            body: "<p><strong>raw</strong></p>".to_string(),
            ..Content::default()
        };
        let html = generate(&content, navy(), Layout::Minimal);
        assert!(html.contains("<h2>Tom &amp; Jerry &lt;3</h2>"));
        assert!(html.contains("<p><strong>raw</strong></p>"));
    }

    #[test]
    fn custom_font_reaches_stylesheet() {
        let css = stylesheet(navy(), Layout::Minimal).render();
        assert!(css.contains("font-family: Georgia, 'Times New Roman', serif;"));
    }

    #[test]
    fn title_is_escaped_and_keeps_tokens() {
        let content = Content {
            headline: "{{company_name}} & <b>".to_string(),
            ..Content::default()
        };
        let html = generate(&content, navy(), Layout::Card);
        assert!(html.contains("<title>{{company_name}} &amp; &lt;b&gt;</title>"));
    }

    #[test]
    fn fallback_document_is_well_formed() {
        assert!(FALLBACK_DOCUMENT.starts_with("<!DOCTYPE html>"));
        assert!(FALLBACK_DOCUMENT.ends_with("</html>"));
    }
}

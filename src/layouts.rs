//! Layout skeletons.
//!
//! Each layout contributes the `<body>` markup and its own selector
//! overrides. `card` is built from presentation tables only, because the
//! clients it targets rewrite or drop block layout CSS. `full` and `minimal`
//! use plain block-level divs.

use askama::Template;

use crate::merge_fields::MergeField;
use crate::style::StyleRule;
use crate::templates::{Content, Layout};
use crate::theme::Theme;

/// Body markup for `layout`.
pub fn render_body(content: &Content, theme: &Theme, layout: Layout) -> askama::Result<String> {
    let email = EmailSlots::new(content, theme);
    match layout {
        Layout::Minimal => MinimalLayout { email }.render(),
        Layout::Full => FullLayout { email }.render(),
        Layout::Card => CardLayout { email }.render(),
    }
}

/// Top-level selector overrides layered over the base rules.
pub fn layout_rules(theme: &Theme, layout: Layout) -> Vec<StyleRule> {
    match layout {
        Layout::Minimal => vec![
            StyleRule::new(".container").decl("padding", "32px 24px"),
            StyleRule::new(".logo")
                .decl("max-width", "120px")
                .decl("margin", "0 0 24px"),
            StyleRule::new(".divider")
                .decl("width", "60px")
                .decl("height", "3px")
                .decl("margin", "16px 0 24px")
                .decl("background-color", theme.primary_color.as_str()),
        ],
        Layout::Full => vec![
            StyleRule::new(".hero")
                .decl("width", "100%")
                .decl("max-width", "none")
                .decl("margin", "0")
                .decl("padding", "0"),
            StyleRule::new(".hero-image")
                .decl("width", "100%")
                .decl("height", "auto"),
            StyleRule::new(".hero-color")
                .decl("height", "220px")
                .decl("background-color", theme.primary_color.as_str()),
            StyleRule::new(".content-card")
                .decl("margin", "-48px auto 0")
                .decl("padding", "32px")
                .decl("border-radius", "8px")
                .decl("background-color", theme.card_background_color.as_str()),
            StyleRule::new(".cta").decl("text-align", "center"),
        ],
        Layout::Card => vec![
            StyleRule::new(".outer").decl("background-color", theme.background_color.as_str()),
            StyleRule::new(".card")
                .decl("width", "100%")
                .decl("max-width", "600px")
                .decl("border-radius", "8px")
                .decl("box-shadow", "0 4px 12px rgba(0, 0, 0, 0.08)")
                .decl("background-color", theme.card_background_color.as_str()),
            StyleRule::new(".hero-image")
                .decl("width", "100%")
                .decl("border-radius", "8px 8px 0 0"),
            StyleRule::new(".card-body").decl("padding", "32px"),
            StyleRule::new(".cta").decl("margin", "24px auto"),
            StyleRule::new(".signature")
                .decl("margin", "24px 0 0")
                .decl("font-style", "italic"),
        ],
    }
}

/// Extra rules for the narrow-viewport block.
pub fn responsive_rules(layout: Layout) -> Vec<StyleRule> {
    match layout {
        Layout::Minimal => vec![StyleRule::new(".container").decl("padding", "20px 16px !important")],
        Layout::Full => vec![
            StyleRule::new(".hero-color").decl("height", "140px !important"),
            StyleRule::new(".content-card")
                .decl("margin", "-24px 12px 0 !important")
                .decl("padding", "20px !important"),
        ],
        Layout::Card => vec![
            StyleRule::new(".card").decl("width", "100% !important"),
            StyleRule::new(".card-body").decl("padding", "20px !important"),
        ],
    }
}

/// Values every layout interpolates. Merge fields are plain strings so
/// they reach the document as literal `{{token}}` text.
struct EmailSlots<'a> {
    headline: &'a str,
    body: &'a str,
    cta_text: &'a str,
    cta_link: &'a str,
    image_url: Option<&'a str>,
    show_social_links: bool,
    primary_color: &'a str,
    card_background_color: &'a str,
    company_name: &'static str,
    company_address: &'static str,
    unsubscribe_link: &'static str,
    website_link: &'static str,
    review_link: &'static str,
}

impl<'a> EmailSlots<'a> {
    fn new(content: &'a Content, theme: &'a Theme) -> Self {
        Self {
            headline: &content.headline,
            body: &content.body,
            cta_text: &content.cta_text,
            cta_link: &content.cta_link,
            image_url: content.has_image().then_some(content.image_url.as_str()),
            show_social_links: content.show_social_links,
            primary_color: &theme.primary_color,
            card_background_color: &theme.card_background_color,
            company_name: MergeField::CompanyName.token(),
            company_address: MergeField::CompanyAddress.token(),
            unsubscribe_link: MergeField::UnsubscribeLink.token(),
            website_link: MergeField::WebsiteLink.token(),
            review_link: MergeField::ReviewLink.token(),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<div class="wrapper">
<div class="container">
{% if let Some(src) = email.image_url -%}
<img class="logo" src="{{ src }}" alt="{{ email.headline }}" width="120">
{% endif -%}
<h2>{{ email.headline }}</h2>
<div class="divider" style="background-color: {{ email.primary_color }};"></div>
<div class="body-content">{{ email.body|safe }}</div>
<p class="cta"><a class="button" href="{{ email.cta_link }}">{{ email.cta_text }}</a></p>
{% if email.show_social_links -%}
<p class="social"><a href="{{ email.website_link }}">Visit our website</a> &middot;
<a href="{{ email.review_link }}">Leave a review</a></p>
{% endif -%}
<div class="footer">
<p class="signature">Warm regards,<br>The {{ email.company_name }} Team</p>
<p>{{ email.company_name }} &middot; {{ email.company_address }}</p>
<p><a href="{{ email.unsubscribe_link }}">Unsubscribe</a></p>
</div>
</div>
</div>"#,
    ext = "html"
)]
struct MinimalLayout<'a> {
    email: EmailSlots<'a>,
}

#[derive(Template)]
#[template(
    source = r#"{% if let Some(src) = email.image_url -%}
<div class="hero"><img class="hero-image" src="{{ src }}" alt="{{ email.headline }}" width="600"></div>
{% else -%}
<div class="hero hero-color" style="background-color: {{ email.primary_color }};"></div>
{% endif -%}
<div class="wrapper">
<div class="container">
<div class="content-card" style="background-color: {{ email.card_background_color }};">
<h2>{{ email.headline }}</h2>
<div class="body-content">{{ email.body|safe }}</div>
<div class="cta" style="text-align: center;">
<a class="button" href="{{ email.cta_link }}">{{ email.cta_text }}</a>
</div>
{% if email.show_social_links -%}
<p class="social"><a href="{{ email.website_link }}">Visit our website</a> &middot;
<a href="{{ email.review_link }}">Leave a review</a></p>
{% endif -%}
</div>
<div class="footer">
<p class="signature">Warm regards,<br>The {{ email.company_name }} Team</p>
<p>{{ email.company_name }} &middot; {{ email.company_address }}</p>
<p><a href="{{ email.unsubscribe_link }}">Unsubscribe</a></p>
</div>
</div>
</div>"#,
    ext = "html"
)]
struct FullLayout<'a> {
    email: EmailSlots<'a>,
}

#[derive(Template)]
#[template(
    source = r#"<table role="presentation" class="outer" width="100%"
 cellpadding="0" cellspacing="0" border="0">
<tr>
<td align="center" style="padding: 24px 12px;">
<table role="presentation" class="card" width="600" cellpadding="0" cellspacing="0" border="0"
 style="background-color: {{ email.card_background_color }};">
{% if let Some(src) = email.image_url -%}
<tr>
<td class="hero-cell"><img class="hero-image" src="{{ src }}" alt="{{ email.headline }}" width="600"></td>
</tr>
{% endif -%}
<tr>
<td class="card-body">
<h2>{{ email.headline }}</h2>
<div class="body-content">{{ email.body|safe }}</div>
<table role="presentation" class="cta" align="center" cellpadding="0" cellspacing="0" border="0">
<tr>
<td align="center"><a class="button" href="{{ email.cta_link }}">{{ email.cta_text }}</a></td>
</tr>
</table>
{% if email.show_social_links -%}
<p class="social"><a href="{{ email.website_link }}">Visit our website</a> &middot;
<a href="{{ email.review_link }}">Leave a review</a></p>
{% endif -%}
<p class="signature">The {{ email.company_name }} Team</p>
</td>
</tr>
</table>
</td>
</tr>
<tr>
<td class="footer" align="center">
<p>{{ email.company_address }}</p>
<p><a href="{{ email.unsubscribe_link }}">Unsubscribe</a></p>
</td>
</tr>
</table>"#,
    ext = "html"
)]
struct CardLayout<'a> {
    email: EmailSlots<'a>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeRegistry;

    fn navy() -> &'static Theme {
        ThemeRegistry::builtin().get("Classic Navy").unwrap()
    }

    fn body(content: &Content, layout: Layout) -> String {
        render_body(content, navy(), layout).unwrap()
    }

    fn sample() -> Content {
        Content {
            headline: "Hello".to_string(),
            body: "<p>Body</p>".to_string(),
            cta_text: "Go".to_string(),
            cta_link: "https://example.com/?a=1&b=2".to_string(),
            ..Content::default()
        }
    }

    #[test]
    fn cta_link_is_attribute_escaped() {
        let html = body(&sample(), Layout::Minimal);
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=2""#));
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut content = sample();
        content.headline = "Tom & \"Jerry\" <3".to_string();
        content.cta_text = "<b>Go</b>".to_string();
        content.image_url = "https://img.example.com/a.png\" onerror=\"x".to_string();
        for layout in Layout::ALL {
            let html = body(&content, layout);
            assert!(html.contains("<h2>Tom &amp; &quot;Jerry&quot; &lt;3</h2>"), "{layout}");
            assert!(html.contains("&lt;b&gt;Go&lt;/b&gt;</a>"), "{layout}");
            assert!(html.contains("a.png&quot; onerror=&quot;x\""), "{layout}");
            assert!(!html.contains("onerror=\"x\""), "{layout}");
        }
    }

    #[test]
    fn body_passes_through_with_merge_fields() {
        let mut content = sample();
        content.body = "<p>Hi {{first_name}}, from {{company_name}} &amp; co</p>".to_string();
        for layout in Layout::ALL {
            let html = body(&content, layout);
            assert!(html.contains(&content.body), "{layout}");
            assert!(html.contains("<a href=\"{{unsubscribe_link}}\">Unsubscribe</a>"), "{layout}");
        }
    }

    #[test]
    fn social_row_only_when_enabled() {
        let mut content = sample();
        for layout in Layout::ALL {
            assert!(!body(&content, layout).contains("class=\"social\""));
        }
        content.show_social_links = true;
        for layout in Layout::ALL {
            let html = body(&content, layout);
            assert!(html.contains("{{website_link}}"), "{layout}");
            assert!(html.contains("{{review_link}}"), "{layout}");
        }
    }

    #[test]
    fn minimal_logo_precedes_headline() {
        let mut content = sample();
        content.image_url = "https://img.example.com/logo.png".to_string();
        let html = body(&content, Layout::Minimal);
        let logo = html.find("class=\"logo\"").unwrap();
        assert!(logo < html.find("<h2>").unwrap());
    }

    #[test]
    fn card_body_is_table_only() {
        let html = body(&sample(), Layout::Card);
        assert!(!html.contains("<div class=\"wrapper\""));
        assert_eq!(html.matches("<table").count(), html.matches("</table>").count());
        assert_eq!(html.matches("<tr>").count(), html.matches("</tr>").count());
    }

    #[test]
    fn layout_rules_use_theme_tokens() {
        let rules = layout_rules(navy(), Layout::Minimal);
        let divider = rules.iter().find(|r| r.selector() == ".divider").unwrap();
        assert!(divider
            .declarations()
            .iter()
            .any(|d| d.property == "background-color" && d.value == "#1c2d4a"));
    }
}

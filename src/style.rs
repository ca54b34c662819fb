//! Typed style builder.
//!
//! Stylesheets are assembled from rules and media blocks and rendered once.
//! Declaration values are checked as they are added; a value that could
//! break out of its declaration is dropped with a warning, so rendering is
//! infallible.

use std::fmt::{self, Write};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

/// A selector with its declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    selector: String,
    declarations: Vec<Declaration>,
}

impl StyleRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: vec![],
        }
    }

    /// Add a declaration. Unsafe values are skipped.
    pub fn decl(mut self, property: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match check_value(&value) {
            Ok(()) => self.declarations.push(Declaration { property, value }),
            Err(reason) => {
                tracing::warn!(
                    selector = %self.selector,
                    property,
                    value = %value,
                    reason,
                    "Dropping CSS declaration"
                );
            }
        }
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    fn write_to(&self, out: &mut String, indent: &str) -> fmt::Result {
        writeln!(out, "{indent}{} {{", self.selector)?;
        for d in &self.declarations {
            writeln!(out, "{indent}  {}: {};", d.property, d.value)?;
        }
        writeln!(out, "{indent}}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaQuery {
    /// Narrow viewports, e.g. phones.
    MaxWidth(u32),
    PrefersDark,
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaQuery::MaxWidth(px) => write!(f, "only screen and (max-width: {px}px)"),
            MediaQuery::PrefersDark => f.write_str("(prefers-color-scheme: dark)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlock {
    pub query: MediaQuery,
    pub rules: Vec<StyleRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StyleItem {
    Rule(StyleRule),
    Media(MediaBlock),
}

/// Ordered list of rules and media blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stylesheet {
    items: Vec<StyleItem>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(&mut self, rule: StyleRule) -> &mut Self {
        self.items.push(StyleItem::Rule(rule));
        self
    }

    pub fn rules(&mut self, rules: impl IntoIterator<Item = StyleRule>) -> &mut Self {
        self.items.extend(rules.into_iter().map(StyleItem::Rule));
        self
    }

    /// Append rules to the block for `query`, creating it on first use.
    pub fn media(&mut self, query: MediaQuery, rules: impl IntoIterator<Item = StyleRule>) -> &mut Self {
        let existing = self
            .items
            .iter()
            .position(|item| matches!(item, StyleItem::Media(block) if block.query == query));

        match existing {
            Some(pos) => {
                if let StyleItem::Media(block) = &mut self.items[pos] {
                    block.rules.extend(rules);
                }
            }
            None => self.items.push(StyleItem::Media(MediaBlock {
                query,
                rules: rules.into_iter().collect(),
            })),
        }
        self
    }

    pub fn media_block(&self, query: MediaQuery) -> Option<&MediaBlock> {
        self.items.iter().find_map(|item| match item {
            StyleItem::Media(block) if block.query == query => Some(block),
            _ => None,
        })
    }

    /// Top-level rules matching `selector`, in order.
    pub fn find_rules<'a>(&'a self, selector: &'a str) -> impl Iterator<Item = &'a StyleRule> + 'a {
        self.items.iter().filter_map(move |item| match item {
            StyleItem::Rule(rule) if rule.selector == selector => Some(rule),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        for item in &self.items {
            match item {
                StyleItem::Rule(rule) => rule.write_to(out, "")?,
                StyleItem::Media(block) => {
                    writeln!(out, "@media {} {{", block.query)?;
                    for rule in &block.rules {
                        rule.write_to(out, "  ")?;
                    }
                    writeln!(out, "}}")?;
                }
            }
        }
        Ok(())
    }
}

fn check_value(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("empty value");
    }
    if value.contains([';', '{', '}', '<', '>']) {
        return Err("structural character in value");
    }
    if value.to_ascii_lowercase().contains("expression(") {
        return Err("expression() is not allowed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_rules_and_media() {
        let mut sheet = Stylesheet::new();
        sheet
            .rule(StyleRule::new("body").decl("margin", "0").decl("color", "#333333"))
            .media(
                MediaQuery::MaxWidth(600),
                [StyleRule::new(".button").decl("width", "100% !important")],
            );

        assert_eq!(
            sheet.render(),
            "body {\n  margin: 0;\n  color: #333333;\n}\n\
             @media only screen and (max-width: 600px) {\n  .button {\n    width: 100% !important;\n  }\n}\n"
        );
    }

    #[test]
    fn media_blocks_merge_by_query() {
        let mut sheet = Stylesheet::new();
        sheet
            .media(MediaQuery::PrefersDark, [StyleRule::new("body").decl("color", "#eeeeee")])
            .rule(StyleRule::new("h2").decl("margin", "0"))
            .media(MediaQuery::PrefersDark, [StyleRule::new(".card").decl("color", "#eeeeee")]);

        let css = sheet.render();
        assert_eq!(css.matches("@media (prefers-color-scheme: dark)").count(), 1);
        assert_eq!(sheet.media_block(MediaQuery::PrefersDark).unwrap().rules.len(), 2);
    }

    #[test]
    fn unsafe_values_are_dropped() {
        let rule = StyleRule::new("body")
            .decl("color", "red; } script { x: y")
            .decl("background", "expression(alert(1))")
            .decl("padding", "")
            .decl("margin", "0 auto");

        assert_eq!(rule.declarations().len(), 1);
        assert_eq!(rule.declarations()[0].property, "margin");
    }

    #[test]
    fn find_rules_by_selector() {
        let mut sheet = Stylesheet::new();
        sheet.rules([
            StyleRule::new(".hero").decl("width", "100%"),
            StyleRule::new("h2").decl("margin", "0"),
            StyleRule::new(".hero").decl("display", "block"),
        ]);
        assert_eq!(sheet.find_rules(".hero").count(), 2);
        assert_eq!(sheet.find_rules(".missing").count(), 0);
    }
}

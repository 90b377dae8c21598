//! Doc-comment parsing
//!
//! Turns a block comment's text into a description plus `@tag` annotations.
//! The analyzer accepts a canonical annotation set with legacy aliases:
//! `@customElement` ≡ `@polymerElement` and `@mixinFunction` ≡
//! `@polymerMixin`.

pub const ELEMENT_TAGS: &[&str] = &["customElement", "polymerElement"];
pub const MIXIN_TAGS: &[&str] = &["mixinFunction", "polymerMixin"];
pub const BEHAVIOR_TAG: &str = "polymerBehavior";

/// Tags whose first bare token is a name rather than description text.
const NAMED_TAGS: &[&str] = &[
    "param",
    "memberof",
    "extends",
    "namespace",
    "demo",
    "appliesMixin",
    "mixes",
    "polymerBehavior",
    "pseudoElement",
    "event",
    "slot",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDocTag {
    pub title: String,
    pub type_: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsDoc {
    pub description: String,
    pub tags: Vec<JsDocTag>,
}

impl JsDoc {
    pub fn has(&self, title: &str) -> bool {
        self.tags.iter().any(|t| t.title == title)
    }

    pub fn has_any(&self, titles: &[&str]) -> bool {
        titles.iter().any(|t| self.has(t))
    }

    pub fn tag(&self, title: &str) -> Option<&JsDocTag> {
        self.tags.iter().find(|t| t.title == title)
    }

    pub fn tags_named<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a JsDocTag> {
        self.tags.iter().filter(move |t| t.title == title)
    }

    /// First paragraph of the description.
    pub fn summary(&self) -> String {
        self.description
            .split("\n\n")
            .next()
            .unwrap_or("")
            .trim()
            .to_string()
    }
}

/// Parse the text of a block comment (without the `/* */` markers). Leading
/// `*` decoration is stripped per line.
pub fn parse(text: &str) -> JsDoc {
    let mut description_lines: Vec<String> = Vec::new();
    let mut tags: Vec<JsDocTag> = Vec::new();
    // Accumulated lines of the tag currently being read.
    let mut current: Option<Vec<String>> = None;

    for raw_line in text.lines() {
        let line = strip_decoration(raw_line);
        if line.starts_with('@') {
            if let Some(tag_lines) = current.take() {
                tags.push(parse_tag(&tag_lines));
            }
            current = Some(vec![line.to_string()]);
        } else if let Some(tag_lines) = current.as_mut() {
            tag_lines.push(line.to_string());
        } else {
            description_lines.push(line.to_string());
        }
    }
    if let Some(tag_lines) = current.take() {
        tags.push(parse_tag(&tag_lines));
    }

    JsDoc {
        description: description_lines.join("\n").trim().to_string(),
        tags,
    }
}

fn strip_decoration(line: &str) -> &str {
    let trimmed = line.trim_start();
    let without_star = trimmed.strip_prefix('*').unwrap_or(trimmed);
    without_star.strip_prefix(' ').unwrap_or(without_star)
}

fn parse_tag(lines: &[String]) -> JsDocTag {
    let joined = lines.join("\n");
    let body = joined.trim_start_matches('@');

    let (title, mut rest) = match body.find(char::is_whitespace) {
        Some(idx) => (&body[..idx], body[idx..].trim_start()),
        None => (body, ""),
    };

    let type_ = if rest.starts_with('{') {
        match rest.find('}') {
            Some(close) => {
                let t = rest[1..close].trim().to_string();
                rest = rest[close + 1..].trim_start();
                Some(t)
            }
            None => None,
        }
    } else {
        None
    };

    let name = if NAMED_TAGS.contains(&title) && !rest.is_empty() {
        let (n, tail) = match rest.find(char::is_whitespace) {
            Some(idx) => (&rest[..idx], rest[idx..].trim_start()),
            None => (rest, ""),
        };
        let n = n.to_string();
        rest = tail;
        Some(n)
    } else {
        None
    };

    let description = {
        let d = rest.trim();
        (!d.is_empty()).then(|| d.to_string())
    };

    JsDocTag {
        title: title.to_string(),
        type_,
        name,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_description_and_tags() {
        let doc = parse("* A fancy element.\n*\n* @customElement\n* @extends HTMLElement");
        assert_eq!(doc.description, "A fancy element.");
        assert!(doc.has("customElement"));
        assert_eq!(doc.tag("extends").unwrap().name.as_deref(), Some("HTMLElement"));
    }

    #[test]
    fn legacy_aliases_are_recognized_via_has_any() {
        let doc = parse("* @polymerElement");
        assert!(doc.has_any(ELEMENT_TAGS));
        let doc = parse("* @polymerMixin");
        assert!(doc.has_any(MIXIN_TAGS));
    }

    #[test]
    fn param_tag_carries_type_name_and_description() {
        let doc = parse("* @param {string} name the name to greet");
        let tag = doc.tag("param").unwrap();
        assert_eq!(tag.type_.as_deref(), Some("string"));
        assert_eq!(tag.name.as_deref(), Some("name"));
        assert_eq!(tag.description.as_deref(), Some("the name to greet"));
    }

    #[test]
    fn returns_tag_keeps_description_unnamed() {
        let doc = parse("* @returns {number} the computed total");
        let tag = doc.tag("returns").unwrap();
        assert_eq!(tag.type_.as_deref(), Some("number"));
        assert!(tag.name.is_none());
        assert_eq!(tag.description.as_deref(), Some("the computed total"));
    }

    #[test]
    fn namespace_tag_without_name() {
        let doc = parse("* @namespace");
        let tag = doc.tag("namespace").unwrap();
        assert!(tag.name.is_none());
    }

    #[test]
    fn namespace_tag_with_name() {
        let doc = parse("* @namespace Foo.Bar");
        assert_eq!(doc.tag("namespace").unwrap().name.as_deref(), Some("Foo.Bar"));
    }

    #[test]
    fn memberof_names_the_namespace() {
        let doc = parse("* Frobnicates.\n* @memberof Foo.Utils");
        assert_eq!(doc.tag("memberof").unwrap().name.as_deref(), Some("Foo.Utils"));
    }

    #[test]
    fn multiple_demo_tags() {
        let doc = parse("* @demo demo/index.html Basic demo\n* @demo demo/fancy.html");
        let demos: Vec<_> = doc.tags_named("demo").collect();
        assert_eq!(demos.len(), 2);
        assert_eq!(demos[0].name.as_deref(), Some("demo/index.html"));
        assert_eq!(demos[0].description.as_deref(), Some("Basic demo"));
        assert!(demos[1].description.is_none());
    }

    #[test]
    fn summary_is_first_paragraph() {
        let doc = parse("* First paragraph\n* still first.\n*\n* Second paragraph.");
        assert_eq!(doc.summary(), "First paragraph\nstill first.");
    }

    #[test]
    fn multiline_tag_description_continues() {
        let doc = parse("* @event changed fired when the value\n*   settles");
        let tag = doc.tag("event").unwrap();
        assert_eq!(tag.name.as_deref(), Some("changed"));
        assert!(tag.description.as_deref().unwrap().contains("settles"));
    }
}

// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use pagemeta_core::Metadata;
use serde_json::Value;

const NAMED_KEYS: [&str; 6] = [
    "author",
    "description",
    "generator",
    "keywords",
    "robots",
    "theme-color",
];

const PROPERTY_PREFIXES: [&str; 5] = ["og:", "article:", "profile:", "book:", "fb:"];

const TWITTER_PREFIX: &str = "twitter:";

/// The subset of the merged metadata the rewriter knows how to emit,
/// partitioned by tag shape. Unknown keys and non-scalar values are dropped
/// here; scalars are coerced to their text form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TagPlan {
    pub title: Option<String>,
    pub named: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
    pub twitter: BTreeMap<String, String>,
}

impl TagPlan {
    pub(crate) fn from_metadata(metadata: &Metadata) -> Self {
        let mut plan = Self::default();
        for (key, value) in metadata.iter() {
            let Some(content) = coerce(value) else {
                continue;
            };
            if key == "title" {
                plan.title = Some(content);
            } else if key.starts_with(TWITTER_PREFIX) {
                plan.twitter.insert(key.to_string(), content);
            } else if PROPERTY_PREFIXES.iter().any(|p| key.starts_with(p)) {
                plan.properties.insert(key.to_string(), content);
            } else if NAMED_KEYS.contains(&key) {
                plan.named.insert(key.to_string(), content);
            }
        }
        plan
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.named.is_empty()
            && self.properties.is_empty()
            && self.twitter.is_empty()
    }

    pub(crate) fn named_content(&self, name: &str) -> Option<&str> {
        self.named
            .get(name)
            .or_else(|| self.twitter.get(name))
            .map(String::as_str)
    }

    pub(crate) fn property_content(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }
}

fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn title_tag(text: &str) -> String {
    format!("<title>{}</title>", escape_text(text))
}

pub(crate) fn name_tag(name: &str, content: &str) -> String {
    format!(
        "<meta name=\"{}\" content=\"{}\">",
        escape_attr(name),
        escape_attr(content)
    )
}

pub(crate) fn property_tag(property: &str, content: &str) -> String {
    format!(
        "<meta property=\"{}\" content=\"{}\">",
        escape_attr(property),
        escape_attr(content)
    )
}

fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata(value: serde_json::Value) -> Metadata {
        Metadata::from_value(value).expect("test metadata must be a mapping")
    }

    #[test]
    fn partitions_keys_by_tag_shape() {
        let plan = TagPlan::from_metadata(&metadata(json!({
            "title": "Page",
            "description": "Desc",
            "og:type": "article",
            "twitter:site": "@site",
        })));

        assert_eq!(plan.title.as_deref(), Some("Page"));
        assert_eq!(plan.named_content("description"), Some("Desc"));
        assert_eq!(plan.property_content("og:type"), Some("article"));
        assert_eq!(plan.named_content("twitter:site"), Some("@site"));
    }

    #[test]
    fn unknown_bare_keys_are_ignored() {
        let plan = TagPlan::from_metadata(&metadata(json!({
            "unknownMeta": "value",
            "title": "Valid Title",
        })));
        assert_eq!(plan.title.as_deref(), Some("Valid Title"));
        assert!(plan.named.is_empty());
        assert!(plan.properties.is_empty());
    }

    #[test]
    fn scalars_coerce_and_non_scalars_drop() {
        let plan = TagPlan::from_metadata(&metadata(json!({
            "title": 123,
            "robots": true,
            "description": null,
            "keywords": ["a", "b"],
        })));
        assert_eq!(plan.title.as_deref(), Some("123"));
        assert_eq!(plan.named_content("robots"), Some("true"));
        assert_eq!(plan.named_content("description"), None);
        assert_eq!(plan.named_content("keywords"), None);
    }

    #[test]
    fn rendered_tags_escape_markup() {
        assert_eq!(
            title_tag("Tom & Jerry <3"),
            "<title>Tom &amp; Jerry &lt;3</title>"
        );
        assert_eq!(
            name_tag("description", "say \"hi\" & bye"),
            "<meta name=\"description\" content=\"say &quot;hi&quot; &amp; bye\">"
        );
        assert_eq!(
            property_tag("og:title", "a<b"),
            "<meta property=\"og:title\" content=\"a&lt;b\">"
        );
    }

    #[test]
    fn empty_plan_for_unrecognized_only_metadata() {
        let plan = TagPlan::from_metadata(&metadata(json!({"unknown": "x", "other": 1})));
        assert!(plan.is_empty());
    }
}

// SPDX-License-Identifier: Apache-2.0

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use async_trait::async_trait;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use pagemeta_core::Metadata;

use crate::tags::{name_tag, property_tag, title_tag, TagPlan};
use crate::{HeadRewrite, RewriteError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TagRewriter;

#[async_trait]
impl HeadRewrite for TagRewriter {
    async fn rewrite(&self, html: &str, metadata: &Metadata) -> Result<String, RewriteError> {
        rewrite_document(html, metadata)
    }
}

#[derive(Debug, Clone, Default)]
struct DocumentShape {
    has_html: bool,
    has_head: bool,
    has_title: bool,
    names: HashSet<String>,
    properties: HashSet<String>,
}

/// Two passes: scan what the template already emits, then update matching
/// tags in place and append the rest at the end of the head. Keys the plan
/// does not carry never touch the template's tags.
pub(crate) fn rewrite_document(html: &str, metadata: &Metadata) -> Result<String, RewriteError> {
    let plan = TagPlan::from_metadata(metadata);
    if plan.is_empty() {
        return Ok(html.to_string());
    }
    let shape = scan(html)?;
    apply(html, &plan, &shape)
}

fn scan(html: &str) -> Result<DocumentShape, RewriteError> {
    let shape = Rc::new(RefCell::new(DocumentShape::default()));
    let html_flag = Rc::clone(&shape);
    let head_flag = Rc::clone(&shape);
    let title_flag = Rc::clone(&shape);
    let meta_seen = Rc::clone(&shape);
    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("html", move |_| {
                    html_flag.borrow_mut().has_html = true;
                    Ok(())
                }),
                element!("head", move |_| {
                    head_flag.borrow_mut().has_head = true;
                    Ok(())
                }),
                element!("head > title", move |_| {
                    title_flag.borrow_mut().has_title = true;
                    Ok(())
                }),
                element!("head > meta", move |el| {
                    if let Some(name) = el.get_attribute("name") {
                        meta_seen.borrow_mut().names.insert(name);
                    } else if let Some(property) = el.get_attribute("property") {
                        meta_seen.borrow_mut().properties.insert(property);
                    }
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RewriteError(e.to_string()))?;
    let collected = shape.borrow().clone();
    Ok(collected)
}

fn apply(html: &str, plan: &TagPlan, shape: &DocumentShape) -> Result<String, RewriteError> {
    if !shape.has_head {
        let head = format!("<head>{}</head>", render_tags(plan, &DocumentShape::default()));
        if shape.has_html {
            return rewrite_str(
                html,
                RewriteStrSettings {
                    element_content_handlers: vec![element!("html", move |el| {
                        el.prepend(&head, ContentType::Html);
                        Ok(())
                    })],
                    ..RewriteStrSettings::default()
                },
            )
            .map_err(|e| RewriteError(e.to_string()));
        }
        let mut out = String::with_capacity(head.len() + html.len());
        out.push_str(&head);
        out.push_str(html);
        return Ok(out);
    }

    let missing = render_tags(plan, shape);
    let mut handlers = vec![
        element!("head > title", |el| {
            if let Some(title) = &plan.title {
                el.set_inner_content(title, ContentType::Text);
            }
            Ok(())
        }),
        element!("head > meta", |el| {
            if let Some(name) = el.get_attribute("name") {
                if let Some(content) = plan.named_content(&name) {
                    el.set_attribute("content", content)?;
                }
            } else if let Some(property) = el.get_attribute("property") {
                if let Some(content) = plan.property_content(&property) {
                    el.set_attribute("content", content)?;
                }
            }
            Ok(())
        }),
    ];
    if !missing.is_empty() {
        handlers.push(element!("head", move |el| {
            el.append(&missing, ContentType::Html);
            Ok(())
        }));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|e| RewriteError(e.to_string()))
}

fn render_tags(plan: &TagPlan, existing: &DocumentShape) -> String {
    let mut out = String::new();
    if let Some(title) = &plan.title {
        if !existing.has_title {
            out.push_str(&title_tag(title));
        }
    }
    for (name, content) in &plan.named {
        if !existing.names.contains(name) {
            out.push_str(&name_tag(name, content));
        }
    }
    for (property, content) in &plan.properties {
        if !existing.properties.contains(property) {
            out.push_str(&property_tag(property, content));
        }
    }
    for (name, content) in &plan.twitter {
        if !existing.names.contains(name) {
            out.push_str(&name_tag(name, content));
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
    fn empty_plan_returns_input_byte_for_byte() {
        let html = "<!doctype html><html><head><meta charset=\"utf-8\"></head><body></body></html>";
        let out = rewrite_document(html, &metadata(json!({"unknownMeta": "value"})))
            .expect("rewrite with nothing to do");
        assert_eq!(out, html);
    }

    #[test]
    fn existing_title_is_replaced_in_place() {
        let html = "<html><head><title>Old</title><meta charset=\"utf-8\"></head><body></body></html>";
        let out = rewrite_document(html, &metadata(json!({"title": "New"}))).expect("rewrite");
        assert!(out.contains("<title>New</title>"));
        assert!(!out.contains("Old"));
        assert!(out.contains("charset=\"utf-8\""));
    }

    #[test]
    fn missing_tags_are_appended_inside_head() {
        let html = "<html><head><meta charset=\"utf-8\"></head><body></body></html>";
        let out = rewrite_document(
            html,
            &metadata(json!({"title": "Page", "description": "Desc"})),
        )
        .expect("rewrite");
        assert!(out.contains("<title>Page</title>"));
        assert!(out.contains("<meta name=\"description\" content=\"Desc\">"));
        let head_end = out.find("</head>").expect("head end survives");
        let title_at = out.find("<title>").expect("title inserted");
        assert!(title_at < head_end);
    }

    #[test]
    fn headless_document_gets_a_head() {
        let html = "<html><body><p>hi</p></body></html>";
        let out = rewrite_document(
            html,
            &metadata(json!({"title": "Created", "description": "From nothing"})),
        )
        .expect("rewrite");
        assert!(out.contains("<head><title>Created</title>"));
        assert!(out.contains("</head>"));
        assert!(out.contains("<p>hi</p>"));
    }

    #[test]
    fn fragment_without_html_element_is_prefixed_with_a_head() {
        let html = "<p>fragment</p>";
        let out = rewrite_document(html, &metadata(json!({"title": "T"}))).expect("rewrite");
        assert!(out.starts_with("<head><title>T</title></head>"));
        assert!(out.ends_with("<p>fragment</p>"));
    }

    #[test]
    fn untold_keys_leave_template_tags_alone() {
        let html = "<html><head><meta name=\"generator\" content=\"handmade\"></head><body></body></html>";
        let out = rewrite_document(html, &metadata(json!({"title": "T"}))).expect("rewrite");
        assert!(out.contains("<meta name=\"generator\" content=\"handmade\">"));
    }

    #[test]
    fn existing_meta_content_is_overwritten_for_known_keys() {
        let html = "<html><head><meta name=\"description\" content=\"old\"><meta property=\"og:type\" content=\"website\"></head><body></body></html>";
        let out = rewrite_document(
            html,
            &metadata(json!({"description": "new", "og:type": "article"})),
        )
        .expect("rewrite");
        assert!(out.contains("content=\"new\""));
        assert!(!out.contains("content=\"old\""));
        assert!(out.contains("content=\"article\""));
        assert_eq!(out.matches("og:type").count(), 1);
    }
}

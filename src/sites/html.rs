//! Small HTML query helpers shared by the site adapters
//!
//! All helpers are synchronous and work on borrowed `scraper` elements; the
//! parsed document never crosses an `.await`, adapters turn it into owned
//! [`crate::model::JobCard`] values first.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Parses a CSS selector, logging malformed ones
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

/// All elements of `document` matching `css`
pub fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(selector) => document.select(&selector).collect(),
        None => Vec::new(),
    }
}

/// First descendant of `element` matching `css`
pub fn select_first<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    element.select(&selector).next()
}

/// Cleaned text of the first descendant matching `css`, if non-empty
pub fn select_text(element: ElementRef<'_>, css: &str) -> Option<String> {
    select_first(element, css)
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Cleaned, non-empty texts of every descendant matching `css`
pub fn select_texts(element: ElementRef<'_>, css: &str) -> Vec<String> {
    match selector(css) {
        Some(selector) => element
            .select(&selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Attribute of the first descendant matching `css`
pub fn select_attr(element: ElementRef<'_>, css: &str, attr: &str) -> Option<String> {
    select_first(element, css)
        .and_then(|found| found.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Visible text of an element with whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of `element`, ignoring everything inside descendants matching `css`
pub fn text_without(element: ElementRef<'_>, css: &str) -> String {
    let Some(selector) = selector(css) else {
        return element_text(element);
    };
    let excluded: HashSet<_> = element.select(&selector).map(|e| e.id()).collect();

    let mut pieces = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .any(|ancestor| excluded.contains(&ancestor.id()));
        if !hidden {
            let text: &str = text;
            pieces.push(text.to_string());
        }
    }

    clean_text(&pieces.join(" "))
}

/// Content of the first HTML comment inside `element`
pub fn first_comment(element: ElementRef<'_>) -> Option<String> {
    element.descendants().find_map(|node| {
        node.value().as_comment().map(|comment| {
            let text: &str = comment;
            text.to_string()
        })
    })
}

/// Element children of `element` with the given tag name
pub fn direct_children<'a>(element: ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == tag)
        .collect()
}

/// Collapses whitespace, trims, and puts the text in NFC
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfc()
        .collect()
}

/// Resolves `href` against `base`
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

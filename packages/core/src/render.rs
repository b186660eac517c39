//! Schema-aware structural rendering of JSON values.
//!
//! [`build_element`] maps any JSON value, together with the schema fragment
//! describing it, to a [`DisplayNode`] tree:
//!
//! | Value | Node |
//! |-------|------|
//! | array | [`DisplayNode::OrderedList`], one child per element, input order |
//! | object | [`DisplayNode::UnorderedList`] of links and labeled entries |
//! | anything else | [`DisplayNode::Text`] |
//!
//! Rendering is pure: the tree is rebuilt from scratch on every call and the
//! inputs are only borrowed. Turning the tree into something visible is left
//! to the adapters in [`crate::present`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::link::{build_link, is_link, Link};
use crate::schema;

/// Suffix of synthetic fields holding human-readable duplicates of coded
/// values (`"type_str": "Caldari"` next to `"type": 1`). Never displayed.
const SYNTHETIC_SUFFIX: &str = "_str";

/// A presentation-agnostic rendered tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayNode {
    Text { text: String },
    Link(Link),
    OrderedList { items: Vec<DisplayNode> },
    UnorderedList { items: Vec<Item> },
}

/// One line of an [`DisplayNode::UnorderedList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Item {
    /// A bare link: the object's own address, or a property holding a link.
    Link(Link),
    /// A property rendered as data under its name.
    Entry {
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        value: DisplayNode,
    },
}

impl DisplayNode {
    pub fn text(text: impl Into<String>) -> Self {
        DisplayNode::Text { text: text.into() }
    }

    /// Number of direct children; zero for text and links.
    pub fn len(&self) -> usize {
        match self {
            DisplayNode::OrderedList { items } => items.len(),
            DisplayNode::UnorderedList { items } => items.len(),
            DisplayNode::Text { .. } | DisplayNode::Link(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every link in the tree, depth-first in display order.
    pub fn links(&self) -> Vec<&Link> {
        let mut out = Vec::new();
        collect_links(self, &mut out);
        out
    }
}

/// Render `value` against its schema fragment.
pub fn build_element(value: &Value, schema: Option<&Value>) -> DisplayNode {
    match value {
        Value::Array(elements) => build_list_from_array(elements, schema),
        Value::Object(map) => build_list_from_object(map, schema),
        primitive => DisplayNode::Text {
            text: primitive_text(primitive),
        },
    }
}

/// Ordered list, one child per element.
///
/// Link elements are labeled by their own `name` or href path, never by
/// index. Everything else recurses with the array's `items` fragment.
pub fn build_list_from_array(elements: &[Value], schema: Option<&Value>) -> DisplayNode {
    let item_schema = schema::items(schema);
    let items = elements
        .iter()
        .map(|element| match element {
            Value::Object(map) if is_link(element) => match build_link(map, None, None) {
                Some(link) => DisplayNode::Link(link),
                None => build_element(element, item_schema),
            },
            _ => build_element(element, item_schema),
        })
        .collect();
    DisplayNode::OrderedList { items }
}

/// Unordered list of the object's properties, in key order.
///
/// An object carrying `href` is itself a link: `href` and `name` are never
/// rendered as entries, and when `href` is a non-empty string the object's
/// self link comes first.
pub fn build_list_from_object(map: &Map<String, Value>, schema: Option<&Value>) -> DisplayNode {
    let mut items = Vec::with_capacity(map.len());

    let has_href = map.contains_key("href");
    let self_link = map
        .get("href")
        .and_then(Value::as_str)
        .filter(|href| !href.is_empty())
        .and_then(|_| build_link(map, None, None));
    if let Some(link) = self_link {
        items.push(Item::Link(link));
    }

    for (key, value) in map {
        if key.ends_with(SYNTHETIC_SUFFIX) {
            continue;
        }
        if has_href && (key == "href" || key == "name") {
            continue;
        }

        let prop_schema = schema::property(schema, key);
        let title = schema::description(prop_schema);

        match value {
            Value::Object(nested) if is_link(value) => {
                if let Some(link) = build_link(nested, Some(key), title) {
                    items.push(Item::Link(link));
                }
            }
            _ => items.push(Item::Entry {
                label: key.clone(),
                title: title.map(str::to_string),
                value: build_element(value, prop_schema),
            }),
        }
    }

    DisplayNode::UnorderedList { items }
}

/// Text for a scalar: strings unquoted, numbers in shortest decimal form.
pub fn primitive_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        // Only reached when a composite is passed directly.
        composite => composite.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn collect_links<'a>(node: &'a DisplayNode, out: &mut Vec<&'a Link>) {
    match node {
        DisplayNode::Text { .. } => {}
        DisplayNode::Link(link) => out.push(link),
        DisplayNode::OrderedList { items } => {
            for child in items {
                collect_links(child, out);
            }
        }
        DisplayNode::UnorderedList { items } => {
            for item in items {
                match item {
                    Item::Link(link) => out.push(link),
                    Item::Entry { value, .. } => collect_links(value, out),
                }
            }
        }
    }
}

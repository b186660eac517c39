//! Presentation adapters: materialize a [`DisplayNode`] tree.
//!
//! Two targets are provided. [`to_text`] produces an indented outline for
//! terminals and logs; [`to_html`] produces the markup a browser page drops
//! into its data pane. Links in HTML point at address fragments (`#<uri>`),
//! so following one re-enters the explorer through a hash change.
//!
//! Neither format is normative. Only the tree itself is.

use crate::address::Address;
use crate::link::Link;
use crate::render::{DisplayNode, Item};

const INDENT: &str = "  ";

/// Render a tree as an indented plain-text outline.
///
/// ```text
/// → X  <http://api.example/x>
/// status: ok
/// regions:
///   [0] → The Forge  <http://api.example/regions/10000002/>
///   [1] → Domain  <http://api.example/regions/10000043/>
/// ```
pub fn to_text(node: &DisplayNode) -> String {
    let mut out = String::new();
    match inline_text(node) {
        Some(line) => {
            out.push_str(&line);
            out.push('\n');
        }
        None => write_block(node, 0, &mut out),
    }
    out
}

fn inline_text(node: &DisplayNode) -> Option<String> {
    match node {
        DisplayNode::Text { text } => Some(text.clone()),
        DisplayNode::Link(link) => Some(link_text(link)),
        DisplayNode::OrderedList { items } if items.is_empty() => Some("[]".to_string()),
        DisplayNode::UnorderedList { items } if items.is_empty() => Some("{}".to_string()),
        _ => None,
    }
}

fn link_text(link: &Link) -> String {
    format!("→ {}  <{}>", link.label, link.href)
}

fn write_block(node: &DisplayNode, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match node {
        DisplayNode::OrderedList { items } => {
            for (i, child) in items.iter().enumerate() {
                write_line(&pad, &format!("[{i}] "), child, depth, out);
            }
        }
        DisplayNode::UnorderedList { items } => {
            for item in items {
                match item {
                    Item::Link(link) => {
                        out.push_str(&pad);
                        out.push_str(&link_text(link));
                        out.push('\n');
                    }
                    Item::Entry { label, value, .. } => {
                        write_line(&pad, &format!("{label}: "), value, depth, out);
                    }
                }
            }
        }
        DisplayNode::Text { .. } | DisplayNode::Link(_) => {
            if let Some(line) = inline_text(node) {
                out.push_str(&pad);
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
}

fn write_line(pad: &str, marker: &str, child: &DisplayNode, depth: usize, out: &mut String) {
    out.push_str(pad);
    match inline_text(child) {
        Some(line) => {
            out.push_str(marker);
            out.push_str(&line);
            out.push('\n');
        }
        None => {
            out.push_str(marker.trim_end());
            out.push('\n');
            write_block(child, depth + 1, out);
        }
    }
}

/// Render a tree as HTML.
///
/// Arrays become `<ol start="0">` of `li.arrayItem`, objects `<ul>` of
/// `li.dictionaryItem` with `span.name` labels (schema descriptions as
/// `title`) and `span.value` children; links are `a.name.link` anchors.
pub fn to_html(node: &DisplayNode) -> String {
    let mut out = String::new();
    write_html(node, &mut out);
    out
}

fn write_html(node: &DisplayNode, out: &mut String) {
    match node {
        DisplayNode::Text { text } => out.push_str(&escape(text)),
        DisplayNode::Link(link) => write_anchor(link, out),
        DisplayNode::OrderedList { items } => {
            out.push_str("<ol start=\"0\">");
            for child in items {
                out.push_str("<li class=\"arrayItem\">");
                write_html(child, out);
                out.push_str("</li>");
            }
            out.push_str("</ol>");
        }
        DisplayNode::UnorderedList { items } => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li class=\"dictionaryItem\">");
                match item {
                    Item::Link(link) => write_anchor(link, out),
                    Item::Entry { label, title, value } => {
                        out.push_str("<span class=\"name\"");
                        write_title(title.as_deref(), out);
                        out.push('>');
                        out.push_str(&escape(label));
                        out.push_str("</span><span class=\"value\">");
                        write_html(value, out);
                        out.push_str("</span>");
                    }
                }
                out.push_str("</li>");
            }
            out.push_str("</ul>");
        }
    }
}

fn write_anchor(link: &Link, out: &mut String) {
    out.push_str("<a class=\"name link\" href=\"");
    out.push_str(&escape(&Address::new(link.href.as_str()).to_fragment()));
    out.push('"');
    write_title(link.title.as_deref(), out);
    out.push('>');
    out.push_str(&escape(&link.label));
    out.push_str("</a>");
}

fn write_title(title: Option<&str>, out: &mut String) {
    if let Some(title) = title {
        out.push_str(" title=\"");
        out.push_str(&escape(title));
        out.push('"');
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

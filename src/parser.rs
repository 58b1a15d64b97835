use std::sync::LazyLock;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{Html, Selector};

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());

/// Extract the document title and visible body text from raw markup.
///
/// The parse is lenient: malformed markup degrades to an empty title and/or
/// empty body instead of failing. Text inside `<script>` and `<style>` is not
/// visible content and is skipped; the remaining text nodes are joined with
/// single spaces.
pub fn parse(markup: &str) -> (String, String) {
    let document = Html::parse_document(markup);

    let title = document
        .select(&TITLE_SEL)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut parts: Vec<String> = Vec::new();
    collect_text(&document.tree.root(), &mut parts);
    (title, parts.join(" "))
}

fn collect_text(node: &NodeRef<'_, Node>, out: &mut Vec<String>) {
    match node.value() {
        Node::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        Node::Element(element) if matches!(element.name(), "script" | "style") => {}
        _ => {
            for child in node.children() {
                collect_text(&child, out);
            }
        }
    }
}

// ── Tests ──

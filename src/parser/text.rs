use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]").unwrap());
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\n]").unwrap());

/// Trimmed text of an element, without citation superscripts.
pub fn cell_text(el: ElementRef<'_>) -> String {
    text_with_breaks(el).trim().to_string()
}

/// Text of an element with `<br>` and list items rendered as newlines.
/// Skips `<style>`, `<script>` and `<sup class="reference">` subtrees.
pub fn text_with_breaks(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect(el, &mut out);
    out
}

fn collect(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match e.name() {
                    "br" => out.push('\n'),
                    "style" | "script" => {}
                    "sup" if e.classes().any(|c| c == "reference") => {}
                    "li" => {
                        out.push('\n');
                        collect(child_el, out);
                        out.push('\n');
                    }
                    _ => collect(child_el, out),
                }
            }
            _ => {}
        }
    }
}

pub fn strip_citations(text: &str) -> String {
    CITATION_RE.replace_all(text, "").to_string()
}

/// First non-empty segment after splitting on commas and newlines.
pub fn first_segment(text: &str) -> Option<String> {
    SEPARATOR_RE
        .split(text)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

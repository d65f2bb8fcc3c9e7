use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::text::{cell_text, first_segment, strip_citations, text_with_breaks};

static INFOBOX_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.infobox").unwrap());
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static UL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ul").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

static DIRECTOR_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Direct(ed by|ors?)").unwrap());
static COUNTRY_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Countr(y|ies)").unwrap());

pub fn find(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&INFOBOX_SEL).next()
}

/// Data cell of the first row whose label matches `label`.
fn value_cell<'a>(infobox: ElementRef<'a>, label: &Regex) -> Option<ElementRef<'a>> {
    infobox.select(&TR_SEL).find_map(|row| {
        let th = row.select(&TH_SEL).next()?;
        if !label.is_match(&cell_text(th)) {
            return None;
        }
        row.select(&TD_SEL).next()
    })
}

/// Every line of the "Directed by" cell, joined with `", "`.
pub fn director(infobox: ElementRef<'_>) -> Option<String> {
    let cell = value_cell(infobox, &DIRECTOR_LABEL_RE)?;
    let text = text_with_breaks(cell);
    let names: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// First listed country. A bulleted list yields its first item; otherwise the
/// first comma- or line-separated segment.
pub fn country(infobox: ElementRef<'_>) -> Option<String> {
    let cell = value_cell(infobox, &COUNTRY_LABEL_RE)?;

    if let Some(list) = cell.select(&UL_SEL).next() {
        let item = list.select(&LI_SEL).next()?;
        let name = strip_citations(&item.text().collect::<String>());
        let name = name.trim();
        return (!name.is_empty()).then(|| name.to_string());
    }

    first_segment(&strip_citations(&text_with_breaks(cell)))
}

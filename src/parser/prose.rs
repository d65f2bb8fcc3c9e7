use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::text::{first_segment, strip_citations};

static BODY_P_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.mw-parser-output p").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

static DIRECTED_BY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"directed by ([^.]+)").unwrap());
static COUNTRY_FILM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:is a|a \d{4})(?: [^.]+?)? ([^.]+?) (?:film|movie)").unwrap()
});

/// Text of the lead paragraph: the first non-blank `<p>` of the article body,
/// or of the whole document when there is no article body.
pub fn lead_paragraph(doc: &Html) -> Option<String> {
    let non_blank = |p: ElementRef<'_>| {
        let text = p.text().collect::<String>();
        (!text.trim().is_empty()).then_some(text)
    };
    doc.select(&BODY_P_SEL)
        .find_map(non_blank)
        .or_else(|| doc.select(&P_SEL).find_map(non_blank))
}

/// `"... directed by James Cameron. ..."` -> `James Cameron`
pub fn director(paragraph: &str) -> Option<String> {
    let caps = DIRECTED_BY_RE.captures(paragraph)?;
    let name = caps[1].trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// `"Avatar is a 2009 American epic film ..."` -> the phrase before "film".
pub fn country(paragraph: &str) -> Option<String> {
    let caps = COUNTRY_FILM_RE.captures(paragraph)?;
    first_segment(&strip_citations(caps[1].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn director_phrase() {
        let p = "Titanic is a 1997 American epic romantic disaster film directed by James Cameron. It stars Leonardo DiCaprio.";
        assert_eq!(director(p).as_deref(), Some("James Cameron"));
        assert_eq!(director("A film with no credit line."), None);
    }

    #[test]
    fn director_up_to_period() {
        let p = "Frozen is a film directed by Chris Buck and Jennifer Lee from a screenplay by Lee";
        assert_eq!(director(p).as_deref(), Some("Chris Buck and Jennifer Lee from a screenplay by Lee"));
    }

    #[test]
    fn country_phrase() {
        assert_eq!(country("Jaws is a 1975 American film.").as_deref(), Some("American"));
        assert_eq!(
            country("Ne Zha 2 is a 2025 Chinese animated fantasy film directed by Jiaozi.").as_deref(),
            Some("Chinese animated fantasy")
        );
        assert_eq!(country("Nothing matches here."), None);
    }

    #[test]
    fn lead_paragraph_skips_empty_and_prefers_body() {
        let doc = Html::parse_document(
            r#"<html><body><p>Site banner</p><div class="mw-parser-output">
               <p class="mw-empty-elt"> </p>
               <p>Avatar is a 2009 American film directed by James Cameron.</p>
               </div></body></html>"#,
        );
        let p = lead_paragraph(&doc).unwrap();
        assert!(p.starts_with("Avatar"));
    }

    #[test]
    fn lead_paragraph_falls_back_to_document() {
        let doc = Html::parse_document("<html><body><p>Plain page</p></body></html>");
        assert_eq!(lead_paragraph(&doc).as_deref(), Some("Plain page"));
        let doc = Html::parse_document("<html><body><div>no paragraphs</div></body></html>");
        assert_eq!(lead_paragraph(&doc), None);
    }
}

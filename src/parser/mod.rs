pub mod fields;
pub mod infobox;
pub mod prose;
pub mod text;

use scraper::Html;

use crate::film::FilmDetails;

/// One way of reading director/country off a detail page.
type Strategy = fn(&Html, &mut FilmDetails);

/// Tried in order; each only fills fields that are still empty.
const STRATEGIES: &[Strategy] = &[from_infobox, from_lead_paragraph];

/// Two-pass lookup: structured infobox, then lead-paragraph prose.
pub fn extract_details(doc: &Html) -> FilmDetails {
    let mut details = FilmDetails::default();
    for strategy in STRATEGIES {
        if details.is_complete() {
            break;
        }
        strategy(doc, &mut details);
    }
    details
}

fn from_infobox(doc: &Html, details: &mut FilmDetails) {
    let Some(ib) = infobox::find(doc) else {
        return;
    };
    if details.director.is_none() {
        details.director = infobox::director(ib);
    }
    if details.country.is_none() {
        details.country = infobox::country(ib);
    }
}

fn from_lead_paragraph(doc: &Html, details: &mut FilmDetails) {
    let Some(para) = prose::lead_paragraph(doc) else {
        return;
    };
    if details.director.is_none() {
        details.director = prose::director(&para);
    }
    if details.country.is_none() {
        details.country = prose::country(&para);
    }
}

// ── Tests ──

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::parser::fields::{clean_box_office, extract_year, is_all_digits, is_valid_rank};
use crate::parser::text::cell_text;

pub const LISTING_URL: &str = "https://en.wikipedia.org/wiki/List_of_highest-grossing_films";

/// Header cells the film table must carry.
pub const REQUIRED_HEADERS: &[&str] = &["Rank", "Title", "Worldwide gross"];

const TITLE_COL: usize = 2;
const GROSS_COL: usize = 3;
const YEAR_COL: usize = 4;
const MIN_CELLS: usize = 4;

static WIKITABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.wikitable").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td, th").unwrap());
static A_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// First `wikitable` in document order whose header cells include every
/// [`REQUIRED_HEADERS`] entry.
pub fn locate_table(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&WIKITABLE_SEL).find(|table| {
        let headers: HashSet<String> = table.select(&TH_SEL).map(cell_text).collect();
        REQUIRED_HEADERS.iter().all(|h| headers.contains(*h))
    })
}

/// Every row after the header row.
pub fn data_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table.select(&TR_SEL).skip(1).collect()
}

/// What one listing row yields before its detail page is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub title: String,
    pub link: Option<String>,
    pub box_office: Option<f64>,
    pub release_year: Option<i32>,
}

/// `Ok(None)` for rows that are not film rows: too few cells, a non-numeric
/// rank, or no title anchor.
pub fn parse_row(row: ElementRef<'_>, index: usize) -> Result<Option<ListingRow>, ScrapeError> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SEL).collect();
    if cells.len() < MIN_CELLS {
        return Ok(None);
    }
    if !is_valid_rank(&cell_text(cells[0])) {
        return Ok(None);
    }
    let Some(anchor) = cells[TITLE_COL].select(&A_SEL).next() else {
        return Ok(None);
    };

    let title = cell_text(anchor);
    // `films.title` is required; an untitled row is reported, not stored as "".
    if title.is_empty() {
        return Err(ScrapeError::MissingTitle { row: index });
    }
    let link = anchor.value().attr("href").map(str::to_string);
    let box_office = clean_box_office(&cell_text(cells[GROSS_COL]));
    let release_year = cells
        .get(YEAR_COL)
        .map(|c| cell_text(*c))
        .filter(|t| is_all_digits(t))
        .and_then(|t| t.parse::<i32>().ok())
        .or_else(|| extract_year(&title));

    Ok(Some(ListingRow {
        title,
        link,
        box_office,
        release_year,
    }))
}

use std::thread;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::ScrapeError;
use crate::fetch::{self, Fetch};
use crate::film::{Film, FilmDetails};
use crate::listing::{self, ListingRow};
use crate::parser;

/// Pause after every film, so detail requests go out one per second.
pub const REQUEST_DELAY_MS: u64 = 1000;

/// Counters reported after a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub rows: usize,
    pub skipped: usize,
    pub failed: usize,
    pub details_unknown: usize,
}

pub struct RunOutput {
    pub films: Vec<Film>,
    pub stats: RunStats,
}

/// One scrape of the listing page and each linked film page.
pub struct Pipeline<F: Fetch> {
    fetcher: F,
    listing_url: String,
    delay: Duration,
    limit: Option<usize>,
}

impl<F: Fetch> Pipeline<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            listing_url: listing::LISTING_URL.to_string(),
            delay: Duration::from_millis(REQUEST_DELAY_MS),
            limit: None,
        }
    }

    pub fn listing_url(mut self, url: &str) -> Self {
        self.listing_url = url.to_string();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Stop after this many films.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Fetch the listing, then walk its rows in order. Only a missing listing
    /// page or table is fatal; row and detail failures are logged and skipped.
    pub fn run(&self) -> Result<RunOutput> {
        info!("Fetching listing: {}", self.listing_url);
        let doc = self.fetcher.fetch(&self.listing_url)?;
        let table = listing::locate_table(&doc).ok_or_else(|| ScrapeError::TableNotFound {
            url: self.listing_url.clone(),
        })?;
        let rows = listing::data_rows(table);

        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );

        let mut films = Vec::new();
        let mut stats = RunStats::default();

        for (i, row) in rows.into_iter().enumerate() {
            if self.limit.is_some_and(|n| films.len() >= n) {
                break;
            }
            stats.rows += 1;
            pb.inc(1);

            let parsed = match listing::parse_row(row, i + 1) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => {
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Error processing row {}: {}", i + 1, e);
                    stats.failed += 1;
                    continue;
                }
            };

            pb.set_message(parsed.title.clone());
            pb.suspend(|| println!("Fetching details for {}...", parsed.title));
            let details = self.details_for(&parsed);
            if details.director.is_none() && details.country.is_none() {
                stats.details_unknown += 1;
            }
            films.push(assemble(parsed, details));

            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }

        pb.finish_and_clear();
        info!(
            "Scraped {} rows: {} films, {} skipped, {} failed, {} without details",
            stats.rows,
            films.len(),
            stats.skipped,
            stats.failed,
            stats.details_unknown
        );
        Ok(RunOutput { films, stats })
    }

    fn details_for(&self, row: &ListingRow) -> FilmDetails {
        match &row.link {
            Some(link) => fetch_details(&self.fetcher, &self.listing_url, link),
            None => {
                warn!("No link for {}, details unknown", row.title);
                FilmDetails::default()
            }
        }
    }
}

/// Fetch a film page linked from `page_url` and read its director/country.
/// Never fails: any error is logged with the link and yields empty details.
pub fn fetch_details<F: Fetch>(fetcher: &F, page_url: &str, link: &str) -> FilmDetails {
    let attempt = || -> Result<FilmDetails> {
        let url = fetch::resolve(page_url, link)?;
        let doc = fetcher.fetch(&url)?;
        Ok(parser::extract_details(&doc))
    };
    match attempt() {
        Ok(details) => details,
        Err(e) => {
            warn!("Error extracting details from {}: {:#}", link, e);
            FilmDetails::default()
        }
    }
}

fn assemble(row: ListingRow, details: FilmDetails) -> Film {
    Film {
        title: row.title,
        release_year: row.release_year,
        director: details.director,
        box_office: row.box_office,
        country: details.country,
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FixtureFetcher;
    use crate::{db, export};

    const LISTING: &str = "https://en.wikipedia.org/wiki/List_of_highest-grossing_films";

    fn wiki(path: &str) -> String {
        format!("https://en.wikipedia.org{}", path)
    }

    fn first_run_fetcher() -> FixtureFetcher {
        FixtureFetcher::default()
            .with_fixture(LISTING, "listing")
            .with_fixture(&wiki("/wiki/Avatar_(2009_film)"), "avatar")
            .with_fixture(&wiki("/wiki/Avengers:_Endgame"), "endgame")
            .with_fixture(&wiki("/wiki/Titanic_(1997_film)"), "titanic")
    }

    fn second_run_fetcher() -> FixtureFetcher {
        FixtureFetcher::default()
            .with_fixture(LISTING, "listing_v2")
            .with_fixture(&wiki("/wiki/Jaws_(film)"), "jaws")
    }

    fn pipeline(fetcher: FixtureFetcher) -> Pipeline<FixtureFetcher> {
        Pipeline::new(fetcher).delay(Duration::ZERO)
    }

    #[test]
    fn three_valid_rows_one_malformed() {
        let out = pipeline(first_run_fetcher()).run().unwrap();
        let titles: Vec<&str> = out.films.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Avatar", "Avengers: Endgame", "Titanic"]);
        assert_eq!(out.stats.rows, 4);
        assert_eq!(out.stats.skipped, 1);
        assert_eq!(out.stats.failed, 0);

        let avatar = &out.films[0];
        assert_eq!(avatar.release_year, Some(2009));
        assert_eq!(avatar.director.as_deref(), Some("James Cameron"));
        assert_eq!(avatar.country.as_deref(), Some("United States"));
        assert_eq!(avatar.box_office, Some(2_923_706_026.0));
    }

    #[test]
    fn dead_detail_link_defaults_to_unknown() {
        let out = pipeline(second_run_fetcher()).run().unwrap();
        assert_eq!(out.films.len(), 2);
        let mystery = &out.films[1];
        assert_eq!(mystery.title, "Mystery Movie (2001)");
        assert_eq!(mystery.release_year, Some(2001));
        assert_eq!(mystery.box_office, None);
        assert_eq!(mystery.director, None);
        assert_eq!(mystery.country, None);
        assert_eq!(out.stats.details_unknown, 1);
    }

    #[test]
    fn missing_table_aborts() {
        let fetcher = FixtureFetcher::default()
            .with_page(LISTING, "<html><body><p>No tables</p></body></html>".into());
        let err = pipeline(fetcher).run().err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::TableNotFound { .. })
        ));
    }

    #[test]
    fn unreachable_listing_propagates() {
        assert!(pipeline(FixtureFetcher::default()).run().is_err());
    }

    #[test]
    fn limit_stops_early() {
        let out = pipeline(first_run_fetcher()).limit(Some(2)).run().unwrap();
        assert_eq!(out.films.len(), 2);
    }

    #[test]
    fn fetch_details_never_fails() {
        let d = fetch_details(&FixtureFetcher::default(), LISTING, "/wiki/Nowhere");
        assert_eq!(d, FilmDetails::default());
    }

    #[test]
    fn end_to_end_full_replace() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("films.db");
        let json_path = dir.path().join("films.json");

        for fetcher in [first_run_fetcher(), second_run_fetcher()] {
            let out = pipeline(fetcher).run().unwrap();
            let conn = db::connect(&db_path).unwrap();
            db::init_schema(&conn).unwrap();
            db::replace_films(&conn, &out.films).unwrap();
            export::write_json(&json_path, &out.films).unwrap();

            assert_eq!(db::count_films(&conn).unwrap(), out.films.len());
            let written: Vec<serde_json::Value> =
                serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
            assert_eq!(written.len(), out.films.len());
        }

        let conn = db::connect(&db_path).unwrap();
        let stored = db::fetch_films(&conn).unwrap();
        let titles: Vec<&str> = stored.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Jaws", "Mystery Movie (2001)"]);
        assert_eq!(stored[0].director.as_deref(), Some("Steven Spielberg"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["title"], "Jaws");
        assert_eq!(arr[1]["director"], "Unknown");
    }

    #[test]
    fn failing_row_does_not_lose_the_batch() {
        let listing = r#"<html><body><table class="wikitable">
            <tr><th>Rank</th><th>Peak</th><th>Title</th><th>Worldwide gross</th><th>Year</th></tr>
            <tr><td>1</td><td>1</td><th><a href="/wiki/Jaws_(film)">Jaws</a></th><td>$476,512,065</td><td>1975</td></tr>
            <tr><td>2</td><td>1</td><th><a href="/wiki/Blank"> </a></th><td>$10</td><td>2000</td></tr>
            <tr><td>3</td><td>2</td><th><a href="/wiki/B_film">B film</a></th><td>$1.5</td><td>1999</td></tr>
            </table></body></html>"#;
        let fetcher = FixtureFetcher::default()
            .with_page(LISTING, listing.into())
            .with_fixture(&wiki("/wiki/Jaws_(film)"), "jaws");

        let out = pipeline(fetcher).run().unwrap();
        let titles: Vec<&str> = out.films.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Jaws", "B film"]);
        assert_eq!(out.films[1].release_year, Some(1999));
        assert_eq!(out.films[1].box_office, Some(1.5));
        assert_eq!(
            out.stats,
            RunStats {
                rows: 3,
                skipped: 0,
                failed: 1,
                details_unknown: 1,
            }
        );
    }

    #[test]
    fn run_replaces_preseeded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("films.db");
        let conn = db::connect(&db_path).unwrap();
        db::init_schema(&conn).unwrap();
        for i in 0..5 {
            conn.execute(
                "INSERT INTO films (title, release_year) VALUES (?1, ?2)",
                rusqlite::params![format!("Seed {}", i), 1990 + i],
            )
            .unwrap();
        }
        assert_eq!(db::count_films(&conn).unwrap(), 5);

        let out = pipeline(second_run_fetcher()).run().unwrap();
        db::replace_films(&conn, &out.films).unwrap();
        assert_eq!(db::count_films(&conn).unwrap(), 2);
        let stored = db::fetch_films(&conn).unwrap();
        assert!(stored.iter().all(|f| !f.title.starts_with("Seed")));
    }
}

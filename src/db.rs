use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::film::{self, Film};

pub const DB_PATH: &str = "highest_grossing_films.db";

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS films (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            title        TEXT NOT NULL,
            release_year INTEGER,
            director     TEXT,
            box_office   REAL,
            country      TEXT
        );
        ",
    )?;
    Ok(())
}

// ── Full replace ──

/// Drop every stored film and insert `films` in order.
pub fn replace_films(conn: &Connection, films: &[Film]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        tx.execute("DELETE FROM films", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO films (title, release_year, director, box_office, country)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for f in films {
            count += stmt.execute(rusqlite::params![
                f.title,
                f.release_year,
                f.director_or_unknown(),
                f.box_office,
                f.country_or_unknown(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

pub fn count_films(conn: &Connection) -> Result<usize> {
    let n = conn.query_row("SELECT COUNT(*) FROM films", [], |r| r.get(0))?;
    Ok(n)
}

/// All stored films in insertion order.
pub fn fetch_films(conn: &Connection) -> Result<Vec<Film>> {
    let mut stmt = conn.prepare(
        "SELECT title, release_year, director, box_office, country FROM films ORDER BY id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Film {
                title: row.get(0)?,
                release_year: row.get(1)?,
                director: film::from_stored(row.get(2)?),
                box_office: row.get(3)?,
                country: film::from_stored(row.get(4)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Overview ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    BoxOfficeDesc,
    BoxOfficeAsc,
    YearDesc,
    YearAsc,
    TitleAsc,
}

impl SortKey {
    fn order_by(self) -> &'static str {
        match self {
            SortKey::BoxOfficeDesc => "box_office DESC, id",
            SortKey::BoxOfficeAsc => "box_office ASC, id",
            SortKey::YearDesc => "release_year DESC, id",
            SortKey::YearAsc => "release_year ASC, id",
            SortKey::TitleAsc => "title COLLATE NOCASE ASC, id",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OverviewFilter {
    pub country: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub sort: SortKey,
    pub limit: usize,
}

pub fn fetch_overview(conn: &Connection, filter: &OverviewFilter) -> Result<Vec<Film>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(c) = &filter.country {
        conditions.push(format!("country = ?{}", params.len() + 1));
        params.push(Box::new(c.clone()));
    }
    if let Some(y) = filter.year_min {
        conditions.push(format!("release_year >= ?{}", params.len() + 1));
        params.push(Box::new(y));
    }
    if let Some(y) = filter.year_max {
        conditions.push(format!("release_year <= ?{}", params.len() + 1));
        params.push(Box::new(y));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT title, release_year, director, box_office, country
         FROM films{}
         ORDER BY {}
         LIMIT {}",
        where_clause,
        filter.sort.order_by(),
        filter.limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(Film {
                title: row.get(0)?,
                release_year: row.get(1)?,
                director: film::from_stored(row.get(2)?),
                box_office: row.get(3)?,
                country: film::from_stored(row.get(4)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub films: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub countries: usize,
    pub total_box_office: f64,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let films = count_films(conn)?;
    let (first_year, last_year) = conn.query_row(
        "SELECT MIN(release_year), MAX(release_year) FROM films",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    let countries: usize = conn.query_row(
        "SELECT COUNT(DISTINCT country) FROM films WHERE country IS NOT NULL AND country != ?1",
        [film::UNKNOWN],
        |r| r.get(0),
    )?;
    let total_box_office: f64 = conn.query_row(
        "SELECT COALESCE(SUM(box_office), 0.0) FROM films",
        [],
        |r| r.get(0),
    )?;
    Ok(Stats {
        films,
        first_year,
        last_year,
        countries,
        total_box_office,
    })
}

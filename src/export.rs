use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::film::Film;

pub const JSON_PATH: &str = "films_data.json";

/// Overwrite `path` with the films as an indented JSON array. Non-ASCII text
/// is written as UTF-8, not escaped.
pub fn write_json(path: &Path, films: &[Film]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, films)
        .with_context(|| format!("Failed to write {:?}", path))?;
    writer.flush()?;
    Ok(())
}

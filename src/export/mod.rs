// src/export/mod.rs
use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

use crate::extract::{ChapterTitle, TariffRecord};

/// Flat export row: one harmonised code with its chapter.
#[derive(Serialize)]
struct FlatRow<'a> {
    chapter: u8,
    code: &'a str,
    description: &'a str,
}

/// Open a CSV writer at `path`, creating missing parent directories.
/// Headers are written explicitly by each export so that an empty run still
/// produces a file with a header row.
fn open_writer(path: &Path) -> Result<Writer<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }
    }
    WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))
}

/// Write the flat `chapter,code,description` table, rows in the order given.
pub fn write_flat_csv(path: &Path, records: &[TariffRecord]) -> Result<()> {
    let mut wtr = open_writer(path)?;
    wtr.write_record(["chapter", "code", "description"])?;
    for rec in records {
        wtr.serialize(FlatRow {
            chapter: rec.chapter,
            code: &rec.code,
            description: &rec.description,
        })?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Write the full hierarchy table, one row per record with its heading and
/// subheading context.
pub fn write_hierarchy_csv(path: &Path, records: &[TariffRecord]) -> Result<()> {
    let mut wtr = open_writer(path)?;
    wtr.write_record([
        "chapter",
        "heading",
        "heading_description",
        "subheading",
        "subheading_description",
        "code",
        "description",
    ])?;
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Write the chapter-title table, one row per fetched chapter.
pub fn write_chapters_csv(path: &Path, chapters: &[ChapterTitle]) -> Result<()> {
    let mut wtr = open_writer(path)?;
    wtr.write_record(["chapter", "chapter_title"])?;
    for chapter in chapters {
        wtr.serialize(chapter)?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

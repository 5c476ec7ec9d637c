// src/extract/mod.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Full Gibraltar-style commodity code: ten digits, then two two-digit
/// suffixes, any position may be a `*` wildcard. E.g. `0101210000-00-00`.
static CODE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9*]{10}-[0-9*]{2}-[0-9*]{2}\b").expect("code pattern should be valid")
});

/// One tariff line, with the heading/subheading context it was found under.
/// Codes are verbatim; description fields are whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TariffRecord {
    pub chapter: u8,
    pub heading: String,
    pub heading_description: String,
    pub subheading: String,
    pub subheading_description: String,
    pub code: String,
    pub description: String,
}

/// Chapter banner, e.g. `CHAPTER 01 LIVE ANIMALS`. Title is empty when the
/// banner line is missing from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterTitle {
    pub chapter: u8,
    pub chapter_title: String,
}

/// Collapse every run of whitespace into a single space.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_digits(line: &str) -> bool {
    !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
}

/// A line that *starts* with a commodity code, as opposed to merely
/// containing one somewhere.
fn is_code_line(line: &str) -> bool {
    CODE_PATTERN.find(line).map_or(false, |m| m.start() == 0)
}

/// Description line following a heading or subheading number, if any.
/// Numeric lines and code lines are the next structural element, not a
/// description.
fn peek_description(lines: &[&str], i: usize) -> Option<String> {
    let next = *lines.get(i + 1)?;
    if next.is_empty() || is_digits(next) || is_code_line(next) {
        return None;
    }
    Some(normalize_ws(next))
}

/// Pull the `CHAPTER NN ...` banner line out of one chapter's flattened text.
pub fn chapter_title(text: &str, chapter: u8) -> ChapterTitle {
    let tag = format!("{:02}", chapter);
    let title = text
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("CHAPTER ") && line.contains(&tag))
        .unwrap_or("")
        .to_string();
    ChapterTitle {
        chapter,
        chapter_title: title,
    }
}

/// Walk one chapter's flattened text and yield every tariff line found.
///
/// The print view lays a chapter out as a sequence of lines: a 4-digit
/// heading, its description, optional 5-digit subheadings with theirs, then
/// code lines. The description for a code sits either on the code's own line
/// or on the line after it. Lines carrying no recognizable code yield
/// nothing; the print view repeats codes, so records identical in every
/// field are emitted once.
pub fn extract_records(text: &str, chapter: u8) -> Vec<TariffRecord> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut records = Vec::new();
    let mut seen: HashSet<TariffRecord> = HashSet::new();

    let mut heading = String::new();
    let mut heading_desc = String::new();
    let mut subheading = String::new();
    let mut subheading_desc = String::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.is_empty() {
            i += 1;
            continue;
        }

        // Chapter banner and the print view's column headers.
        if line.starts_with("CHAPTER ")
            || matches!(line, "Chapter" | "Heading" | "Article Description")
        {
            i += 1;
            continue;
        }

        // 4-digit heading, e.g. "0101".
        if line.len() == 4 && is_digits(line) {
            heading = line.to_string();
            heading_desc.clear();
            subheading.clear();
            subheading_desc.clear();
            if let Some(desc) = peek_description(&lines, i) {
                heading_desc = desc;
                i += 1;
            }
            i += 1;
            continue;
        }

        // 5-digit subheading extending the current heading, e.g. "01012".
        if line.len() == 5 && is_digits(line) && line.starts_with(heading.as_str()) {
            subheading = line.to_string();
            subheading_desc.clear();
            if let Some(desc) = peek_description(&lines, i) {
                subheading_desc = desc;
                i += 1;
            }
            i += 1;
            continue;
        }

        for m in CODE_PATTERN.find_iter(line) {
            let mut desc = line[m.end()..]
                .trim()
                .trim_start_matches(|c: char| matches!(c, ' ' | '-' | '–' | '—' | ':'))
                .to_string();

            // Description on the following line instead.
            if desc.is_empty() {
                if let Some(next) = lines.get(i + 1) {
                    if !next.is_empty() && !is_code_line(next) {
                        desc = next.to_string();
                    }
                }
            }

            let record = TariffRecord {
                chapter,
                heading: heading.clone(),
                heading_description: heading_desc.clone(),
                subheading: subheading.clone(),
                subheading_description: subheading_desc.clone(),
                code: m.as_str().to_string(),
                description: normalize_ws(&desc),
            };
            if seen.insert(record.clone()) {
                records.push(record);
            }
        }

        i += 1;
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER_01: &str = "\
CHAPTER 01 LIVE ANIMALS
Chapter
Heading
Article Description
0101
Live horses, asses, mules and hinnies
01012
Horses
0101210000-00-00
Pure-bred breeding animals
0101290000-00-00 - Other
0102
Live bovine animals
0102210000-00-00
Pure-bred breeding animals";

    #[test]
    fn extracts_codes_with_hierarchy_context() {
        let records = extract_records(CHAPTER_01, 1);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].code, "0101210000-00-00");
        assert_eq!(records[0].description, "Pure-bred breeding animals");
        assert_eq!(records[0].heading, "0101");
        assert_eq!(
            records[0].heading_description,
            "Live horses, asses, mules and hinnies"
        );
        assert_eq!(records[0].subheading, "01012");
        assert_eq!(records[0].subheading_description, "Horses");

        // Same-line description, separator stripped.
        assert_eq!(records[1].code, "0101290000-00-00");
        assert_eq!(records[1].description, "Other");

        // New heading resets subheading state.
        assert_eq!(records[2].code, "0102210000-00-00");
        assert_eq!(records[2].heading, "0102");
        assert_eq!(records[2].heading_description, "Live bovine animals");
        assert_eq!(records[2].subheading, "");
        assert_eq!(records[2].subheading_description, "");
    }

    #[test]
    fn malformed_lines_yield_nothing() {
        let text = "\
0101
Live horses
0101210000-00-00 - Pure-bred breeding animals
0101-00-00 not a full code
123456789
just prose
0101290000-00-00 - Other";
        let records = extract_records(text, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].code, "0101210000-00-00");
        assert_eq!(records[1].code, "0101290000-00-00");
    }

    #[test]
    fn wildcard_codes_are_taken_verbatim() {
        let text = "010129000*-00-00 - Other";
        let records = extract_records(text, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "010129000*-00-00");
    }

    #[test]
    fn description_whitespace_is_collapsed() {
        let text = "0101210000-00-00 -   Pure-bred\t breeding    animals";
        let records = extract_records(text, 1);
        assert_eq!(records[0].description, "Pure-bred breeding animals");
    }

    #[test]
    fn repeated_lines_are_emitted_once() {
        let text = "\
0101
Live horses
0101210000-00-00 - Pure-bred breeding animals
0101210000-00-00 - Pure-bred breeding animals";
        let records = extract_records(text, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn same_code_under_different_subheadings_is_kept() {
        let text = "\
0101
Live horses
01012
Horses
0101210000-00-00 - Pure-bred breeding animals
01013
Asses
0101210000-00-00 - Pure-bred breeding animals";
        let records = extract_records(text, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].subheading, "01012");
        assert_eq!(records[1].subheading, "01013");
    }

    #[test]
    fn consecutive_headings_carry_no_description() {
        let text = "\
0101
0102
Live bovine animals
0102210000-00-00 - Pure-bred breeding animals";
        let records = extract_records(text, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].heading, "0102");
        assert_eq!(records[0].heading_description, "Live bovine animals");
    }

    #[test]
    fn unrecognized_markup_yields_zero_records() {
        assert!(extract_records("", 7).is_empty());
        assert!(extract_records("Service temporarily unavailable", 7).is_empty());
    }

    #[test]
    fn chapter_title_is_taken_from_the_banner() {
        let title = chapter_title(CHAPTER_01, 1);
        assert_eq!(title.chapter, 1);
        assert_eq!(title.chapter_title, "CHAPTER 01 LIVE ANIMALS");
    }

    #[test]
    fn missing_banner_gives_empty_title() {
        let title = chapter_title("0101\nLive horses", 1);
        assert_eq!(title.chapter_title, "");
    }

    #[test]
    fn normalize_ws_collapses_runs() {
        assert_eq!(normalize_ws("  a \t b\n c  "), "a b c");
        assert_eq!(normalize_ws(""), "");
    }
}

/*!
 * CSV exchange for glossaries.
 *
 * Columns are `term, translation, notes?`. Fields may be quoted; a doubled
 * quote inside a quoted field is a literal quote. An optional header row
 * is recognized by its labels in several languages and skipped.
 */

use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

use crate::errors::GlossaryError;

use super::{create_glossary, Glossary, GlossaryItem};

/// Header labels that mark the first row as a header
static HEADER_LABELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "term", "terms", "translation", "translations", "notes", "note", "source", "target",
        "original", "comment", "comments",
        // Chinese
        "原文", "译文", "術語", "术语", "翻译", "翻譯", "备注", "備註", "注释",
        // Japanese
        "用語", "訳語", "翻訳", "メモ", "備考",
        // Korean
        "용어", "번역", "비고", "메모",
        // French, German, Spanish
        "terme", "traduction", "remarques", "begriff", "übersetzung", "notizen", "término",
        "traducción", "notas",
    ]
    .into_iter()
    .collect()
});

/// Split CSV text into records of fields.
///
/// A record ends at an unquoted line break, so quoted fields may span
/// lines. Blank records are dropped.
fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            // CRLF: the '\n' closes the record
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' | '\r' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                records.push(std::mem::take(&mut fields));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        records.push(fields);
    }

    records.retain(|record| !is_blank_record(record));
    records
}

fn is_blank_record(record: &[String]) -> bool {
    record.len() == 1 && record[0].trim().is_empty()
}

fn is_header_row(fields: &[String]) -> bool {
    fields
        .iter()
        .any(|field| HEADER_LABELS.contains(field.trim().to_lowercase().as_str()))
}

/// Import a glossary from CSV text; the name comes from the file stem
pub fn import_glossary_from_csv(text: &str, filename: &str) -> Result<Glossary, GlossaryError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = parse_csv_records(text);

    if rows.first().is_some_and(|first| is_header_row(first)) {
        debug!("Skipping CSV header row");
        rows.remove(0);
    }

    if rows.is_empty() {
        return Err(GlossaryError::EmptyFile);
    }

    let terms: Vec<GlossaryItem> = rows
        .iter()
        .filter(|row| row.len() >= 2)
        .filter_map(|row| GlossaryItem::validated(&row[0], &row[1], row.get(2).map(String::as_str)))
        .collect();

    if terms.is_empty() {
        return Err(GlossaryError::NoValidTerms);
    }

    let name = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();

    let mut glossary = create_glossary(name, None);
    glossary.terms = terms;
    Ok(glossary)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Export terms as CSV with a header row
pub fn export_glossary_csv(glossary: &Glossary) -> String {
    let mut out = String::from("term,translation,notes\n");
    for item in &glossary.terms {
        out.push_str(&quote_field(&item.term));
        out.push(',');
        out.push_str(&quote_field(&item.translation));
        out.push(',');
        out.push_str(&quote_field(item.notes.as_deref().unwrap_or_default()));
        out.push('\n');
    }
    out
}

//! Spreadsheet-friendly rendering of the book list.

use serde_json::Value;

const CSV_HEADER: &str = "Title,Author,Genre,Progress,Rating,Date finished,Comments";

/// Render the books as CSV, prefixed with a UTF-8 BOM so spreadsheet apps
/// pick up the encoding. Every field is quoted, embedded quotes doubled.
///
/// Book records are free-form JSON; missing fields render empty (progress
/// defaults to `0`).
pub fn books_to_csv(books: &[Value]) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(CSV_HEADER);
    out.push('\n');

    for book in books {
        let mut progress = field(book, "progress");
        if progress.is_empty() {
            progress.push('0');
        }

        let row = [
            quoted(&field(book, "title")),
            quoted(&field(book, "author")),
            quoted(&field(book, "genre")),
            quoted(&format!("{progress}%")),
            quoted(&field(book, "rating")),
            quoted(&field(book, "dateFinished")),
            quoted(&field(book, "comments")),
        ]
        .join(",");
        out.push_str(&row);
        out.push('\n');
    }

    out
}

fn field(book: &Value, key: &str) -> String {
    match book.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

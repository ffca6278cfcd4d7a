//! CSV ingestion of the reference review dataset.
//!
//! Expected layout is the Amazon reviews export: a `Review Text` column and
//! a `Rating` column formatted as `Rated N out of 5 stars`. Plain integer
//! ratings and an optional pre-labelled `Sentiment` column are accepted too.
//! A row's label comes from its rating when one parses, otherwise from the
//! sentiment column. Rows without text or without any label are skipped.
//! Fields that are not valid UTF-8 are decoded lossily rather than failing
//! the whole load.

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use review_core::Sentiment;
use std::borrow::Cow;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::corpus::{DatasetError, DatasetRow};

const TEXT_COLUMNS: &[&str] = &["Review Text", "review_text", "text", "review"];
const RATING_COLUMNS: &[&str] = &["Rating", "rating", "stars"];
const SENTIMENT_COLUMNS: &[&str] = &["Sentiment", "sentiment", "label"];

/// Loads and labels every usable row of the CSV file at `path`.
///
/// # Errors
///
/// [`DatasetError::Unavailable`] if the file cannot be opened or read,
/// [`DatasetError::MissingColumn`] if no text or label column exists.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<DatasetRow>, DatasetError> {
    let path = path.as_ref();
    let location = path.display().to_string();
    let file = File::open(path).map_err(|e| DatasetError::Unavailable {
        path: location.clone(),
        reason: e.to_string(),
    })?;

    let rows = read_rows(file).map_err(|err| match err {
        DatasetError::Unavailable { reason, .. } => DatasetError::Unavailable {
            path: location.clone(),
            reason,
        },
        other => other,
    })?;

    info!(path = %location, rows = rows.len(), "dataset loaded");
    Ok(rows)
}

/// Reads rows from any CSV source. See [`load_csv`].
pub fn read_rows<R: io::Read>(source: R) -> Result<Vec<DatasetRow>, DatasetError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(source);

    let headers = reader.headers().map_err(unreadable)?.clone();
    let text_col = find_column(&headers, TEXT_COLUMNS)
        .ok_or_else(|| DatasetError::MissingColumn(TEXT_COLUMNS[0].to_string()))?;
    let rating_col = find_column(&headers, RATING_COLUMNS);
    let sentiment_col = find_column(&headers, SENTIMENT_COLUMNS);
    if rating_col.is_none() && sentiment_col.is_none() {
        return Err(DatasetError::MissingColumn(RATING_COLUMNS[0].to_string()));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    let mut lossy = 0usize;

    for record in reader.byte_records() {
        let record = record.map_err(unreadable)?;
        if std::str::from_utf8(record.as_slice()).is_err() {
            lossy += 1;
        }

        let raw_text = field(&record, Some(text_col));
        let text = raw_text.trim();
        let rating = parse_rating(&field(&record, rating_col));
        let labelled = Sentiment::from_label(&field(&record, sentiment_col));
        let sentiment = rating.map(Sentiment::from_rating).or(labelled);

        match sentiment {
            Some(sentiment) if !text.is_empty() => {
                rows.push(DatasetRow::labeled(text, sentiment, rating));
            }
            _ => skipped += 1,
        }
    }

    if lossy > 0 {
        warn!(lossy, "decoded dataset rows with invalid UTF-8 lossily");
    }
    if skipped > 0 {
        warn!(skipped, "skipped dataset rows without text or label");
    }
    Ok(rows)
}

/// Field `col` of `record`, empty when the column or field is absent.
fn field(record: &ByteRecord, col: Option<usize>) -> Cow<'_, str> {
    col.and_then(|col| record.get(col))
        .map(String::from_utf8_lossy)
        .unwrap_or_default()
}

/// Parses `Rated 4 out of 5 stars` or a bare `4`. Only 1 to 5 is accepted.
pub fn parse_rating(field: &str) -> Option<u8> {
    let field = field.trim();
    let digits = match field.find("Rated") {
        Some(pos) => field[pos + "Rated".len()..].trim_start(),
        None => field,
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=5).contains(rating))
}

fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| headers.iter().position(|header| header == *name))
}

fn unreadable(err: csv::Error) -> DatasetError {
    DatasetError::Unavailable {
        path: String::from("<reader>"),
        reason: err.to_string(),
    }
}

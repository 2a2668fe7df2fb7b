//! Tabular summarization
//!
//! Produces a bounded text block for each tabular entry so the prompt stays
//! small no matter how large the upload is. Parsing is an ordered ladder of
//! strategies: a strict reader first, a lenient byte-level reader when that
//! fails, and an inline error marker when both fail. A broken file degrades
//! its own block only; it never takes the request down with it.

use tracing::debug;

use crate::extract::ExtractedEntry;

/// Row count above which the summary switches from a full table render to a
/// sampled render. Preserved from the source system as a tunable constant.
pub const ROW_SAMPLE_THRESHOLD: usize = 100;

/// Data rows included in the sampled render.
pub const SAMPLE_ROWS: usize = 5;

/// Header name whose column values are always listed in full.
const ANSWER_COLUMN: &str = "answer";

pub fn is_tabular(name: &str) -> bool {
    delimiter_for(name).is_some()
}

fn delimiter_for(name: &str) -> Option<u8> {
    let lower = name.to_lowercase();
    if lower.ends_with(".csv") {
        Some(b',')
    } else if lower.ends_with(".tsv") {
        Some(b'\t')
    } else {
        None
    }
}

/// Summarizes one tabular entry. Infallible: every outcome, including a file
/// neither parser can read, yields a non-empty description.
pub fn summarize(entry: &ExtractedEntry) -> String {
    let delimiter = delimiter_for(&entry.name).unwrap_or(b',');

    match structured_summary(&entry.bytes, delimiter) {
        Ok(summary) => summary,
        Err(structured_err) => {
            debug!(file = %entry.name, error = %structured_err, "strict parse failed, retrying leniently");
            match degraded_summary(&entry.bytes, delimiter) {
                Ok(summary) => summary,
                Err(e) => format!("Error reading file: {e}"),
            }
        }
    }
}

/// Strict parse: valid UTF-8, header row, equal-length records. Large tables
/// are reduced to counts, headers, a fixed-size row sample, and the full
/// `answer` column when one exists.
fn structured_summary(bytes: &[u8], delimiter: u8) -> Result<String, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    if headers.is_empty() && rows.is_empty() {
        return Ok("CSV with 0 rows.".to_string());
    }

    if rows.len() > ROW_SAMPLE_THRESHOLD {
        let mut out = format!(
            "CSV with {} rows and {} columns.\n",
            rows.len(),
            headers.len()
        );
        out.push_str(&format!("Column names: {}\n", headers.join(", ")));
        out.push_str(&format!(
            "First {} rows:\n{}\n",
            SAMPLE_ROWS,
            render_table(&headers, rows.iter().take(SAMPLE_ROWS))
        ));
        if let Some(idx) = headers.iter().position(|h| h == ANSWER_COLUMN) {
            let values: Vec<&str> = rows.iter().filter_map(|r| r.get(idx)).collect();
            out.push_str(&format!(
                "\nValues in '{ANSWER_COLUMN}' column: [{}]",
                values.join(", ")
            ));
        }
        Ok(out)
    } else {
        Ok(render_table(&headers, rows.iter()))
    }
}

/// Lenient re-read: no UTF-8 requirement, ragged rows tolerated, first row
/// taken as headers. Emits counts, headers, and the `answer` column values
/// for rows long enough to contain that index.
fn degraded_summary(bytes: &[u8], delimiter: u8) -> Result<String, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        );
    }

    // Row count includes the header row here, as in the source system.
    let mut out = format!("CSV with {} rows.\n", rows.len());
    let Some(headers) = rows.first() else {
        return Ok(out);
    };
    out.push_str(&format!("Headers: {}\n", headers.join(", ")));

    if let Some(idx) = headers.iter().position(|h| h == ANSWER_COLUMN) {
        let values: Vec<&str> = rows[1..]
            .iter()
            .filter(|row| row.len() > idx)
            .map(|row| row[idx].as_str())
            .collect();
        out.push_str(&format!(
            "Values in '{ANSWER_COLUMN}' column: [{}]",
            values.join(", ")
        ));
    }
    Ok(out)
}

fn render_table<'a>(
    headers: &[String],
    rows: impl Iterator<Item = &'a csv::StringRecord>,
) -> String {
    let mut out = headers.join(", ");
    for row in rows {
        out.push('\n');
        out.push_str(&row.iter().collect::<Vec<_>>().join(", "));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, bytes: &[u8]) -> ExtractedEntry {
        ExtractedEntry {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn csv_with_rows(rows: usize) -> Vec<u8> {
        let mut data = String::from("id,answer\n");
        for i in 0..rows {
            data.push_str(&format!("{i},{}\n", i * 10));
        }
        data.into_bytes()
    }

    #[test]
    fn small_table_is_rendered_in_full() {
        let summary = summarize(&entry("data.csv", b"id,answer\n1,10\n2,20\n3,30\n"));
        assert_eq!(summary, "id, answer\n1, 10\n2, 20\n3, 30");
    }

    #[test]
    fn large_table_sample_is_capped_at_five_rows() {
        for total in [101, 10_000] {
            let summary = summarize(&entry("big.csv", &csv_with_rows(total)));
            assert!(summary.starts_with(&format!("CSV with {total} rows and 2 columns.\n")));
            assert!(summary.contains("Column names: id, answer\n"));

            let sample = summary
                .split("First 5 rows:\n")
                .nth(1)
                .unwrap()
                .split("\n\nValues")
                .next()
                .unwrap();
            // Header line plus exactly five data rows.
            assert_eq!(sample.trim_end().lines().count(), 6);
        }
    }

    #[test]
    fn answer_column_lists_all_values_beyond_the_sample() {
        let summary = summarize(&entry("big.csv", &csv_with_rows(120)));
        // Value from row 100, well past the 5-row sample.
        assert!(summary.contains("1190"));
        assert!(summary.contains("Values in 'answer' column: [0, 10, 20,"));
    }

    #[test]
    fn answer_values_appear_verbatim_in_small_table_render() {
        let summary = summarize(&entry("data.csv", b"id,answer\n1,1\n2,2\n3,3\n"));
        for value in ["1", "2", "3"] {
            assert!(summary.contains(value));
        }
    }

    #[test]
    fn ragged_rows_fall_back_to_the_lenient_parser() {
        let data = b"id,answer\n1,10,extra,fields\n2\n3,30\n";
        let summary = summarize(&entry("ragged.csv", data));
        assert!(summary.starts_with("CSV with 4 rows.\n"));
        assert!(summary.contains("Headers: id, answer\n"));
        // Row "2" is too short to hold the answer index and is skipped.
        assert!(summary.contains("Values in 'answer' column: [10, 30]"));
    }

    #[test]
    fn invalid_utf8_falls_back_to_the_lenient_parser() {
        let mut data = b"id,answer\n1,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\n2,20\n");
        let summary = summarize(&entry("binary.csv", &data));
        assert!(summary.starts_with("CSV with 3 rows.\n"));
        assert!(summary.contains("20"));
    }

    #[test]
    fn summary_is_never_empty_even_for_an_empty_file() {
        let summary = summarize(&entry("empty.csv", b""));
        assert!(!summary.is_empty());
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let summary = summarize(&entry("data.tsv", b"id\tanswer\n1\t10\n"));
        assert_eq!(summary, "id, answer\n1, 10");
    }

    #[test]
    fn tabular_recognition_is_by_extension() {
        assert!(is_tabular("a.csv"));
        assert!(is_tabular("A.CSV"));
        assert!(is_tabular("a.tsv"));
        assert!(!is_tabular("a.txt"));
        assert!(!is_tabular("a.json"));
    }
}

//! Table section splitting: split between data rows, repeating the header
//! row and its alignment separator on every chunk so each piece is a valid
//! standalone Markdown table.

use crate::recursive;

/// Split a Markdown table's source text into row-bounded, header-repeating
/// chunks within `hard_size`. A single data row that still overflows
/// `hard_size` once combined with the header+separator prefix falls back to
/// the recursive character splitter, like `text.rs`/`code.rs` do for their
/// own oversized pieces.
pub fn split(table_md: &str, preferred_size: usize, hard_size: usize) -> Vec<String> {
    let mut lines = table_md.lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let Some(separator) = lines.next() else {
        return vec![table_md.to_string()];
    };

    let prefix = format!("{header}\n{separator}\n");
    let data_rows: Vec<&str> = lines.filter(|l| !l.trim().is_empty()).collect();

    if data_rows.is_empty() {
        return vec![prefix.trim_end().to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = prefix.clone();

    for row in data_rows {
        let candidate_len = current.len() + row.len() + 1;
        if candidate_len > hard_size && current != prefix {
            chunks.push(current.trim_end().to_string());
            current = prefix.clone();
        }

        let candidate_len = current.len() + row.len() + 1;
        if candidate_len > hard_size && current == prefix {
            tracing::warn!(len = row.len(), hard_size, "table row exceeds hard bound even alone, falling back to recursive split");
            let row_hard_size = hard_size.saturating_sub(prefix.len()).max(1);
            for piece in recursive::split(row, preferred_size, row_hard_size) {
                chunks.push(format!("{}\n{piece}", prefix.trim_end()));
            }
            continue;
        }

        current.push_str(row);
        current.push('\n');
    }

    if current != prefix {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_table_stays_one_chunk() {
        let md = "| a | b |\n| --- | --- |\n| 1 | 2 |\n| 3 | 4 |";
        let out = split(md, 800, 1000);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("| a | b |"));
    }

    #[test]
    fn splits_large_table_repeating_header() {
        let mut md = String::from("| name | value |\n| --- | --- |\n");
        for i in 0..100 {
            md.push_str(&format!("| row{i} | value-{i}-padding-to-make-rows-longer |\n"));
        }
        let out = split(&md, 150, 200);
        assert!(out.len() > 1);
        for chunk in &out {
            assert!(chunk.starts_with("| name | value |"));
            assert!(chunk.contains("| --- | --- |"));
        }
    }

    #[test]
    fn every_chunk_is_a_valid_standalone_table() {
        let mut md = String::from("| a |\n| --- |\n");
        for i in 0..20 {
            md.push_str(&format!("| {i} |\n"));
        }
        let out = split(&md, 20, 30);
        for chunk in out {
            let mut lines = chunk.lines();
            assert_eq!(lines.next(), Some("| a |"));
            assert_eq!(lines.next(), Some("| --- |"));
        }
    }

    #[test]
    fn oversized_single_row_falls_back_to_recursive_split_instead_of_overflowing() {
        let long_value = "x".repeat(80);
        let md = format!("| a |\n| --- |\n| {long_value} |\n");
        let out = split(&md, 20, 30);
        assert!(out.len() > 1, "oversized row must be split into multiple pieces");
        for chunk in &out {
            assert!(chunk.len() <= 30, "chunk of len {} exceeds hard_size 30", chunk.len());
            assert!(chunk.starts_with("| a |"));
        }
    }
}

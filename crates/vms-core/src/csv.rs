//! Tolerant CSV reader for published spreadsheet exports.
//!
//! Purely syntactic: no header handling, no type inference. Quoted fields may
//! contain commas and line breaks, and `""` inside a quoted field is a literal
//! quote. Both `\r\n` and `\n` terminate rows, a final row without a
//! terminator is kept, and lines with no content at all are skipped.

/// Parse CSV text into rows of cells, preserving cell content exactly.
#[must_use]
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => row.push(std::mem::take(&mut cell)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                finish_row(&mut rows, &mut row, &mut cell);
            }
            _ => cell.push(ch),
        }
    }
    finish_row(&mut rows, &mut row, &mut cell);

    rows
}

fn finish_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>, cell: &mut String) {
    if row.is_empty() && cell.is_empty() {
        return;
    }
    row.push(std::mem::take(cell));
    rows.push(std::mem::take(row));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect()
    }

    #[test]
    fn parses_simple_rows() {
        let rows = parse_csv("a,b,c\n1,2,3\n");
        assert_eq!(rows, owned(&[&["a", "b", "c"], &["1", "2", "3"]]));
    }

    #[test]
    fn quoted_cell_keeps_comma_newline_and_escaped_quote() {
        let original = "Room 4, \"east\" wing\nsecond line";
        let encoded = format!("name,note\nAsha,\"{}\"\n", original.replace('"', "\"\""));

        let rows = parse_csv(&encoded);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], original);
    }

    #[test]
    fn accepts_crlf_and_lf_terminators() {
        let rows = parse_csv("a,b\r\nc,d\ne,f\r\n");
        assert_eq!(rows, owned(&[&["a", "b"], &["c", "d"], &["e", "f"]]));
    }

    #[test]
    fn keeps_trailing_row_without_terminator() {
        let rows = parse_csv("a,b\nc,d");
        assert_eq!(rows, owned(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn skips_blank_lines_but_keeps_blank_cells() {
        let rows = parse_csv("a,,c\n\n\r\n,,\nz");
        assert_eq!(rows, owned(&[&["a", "", "c"], &["", "", ""], &["z"]]));
    }

    #[test]
    fn quoted_crlf_stays_inside_cell() {
        let rows = parse_csv("\"line1\r\nline2\",x\r\n");
        assert_eq!(rows, owned(&[&["line1\r\nline2", "x"]]));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("\n\n").is_empty());
    }
}

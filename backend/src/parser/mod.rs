//! Tabular reader: CSV and spreadsheet bytes to header-labeled rows.
//!
//! Both formats produce the same [`ParsedTable`]: one [`RawRow`] per
//! non-blank data row, keyed by the normalized header of its column.
//!
//! CSV dialect: `;` delimiter, `"` quote and escape, header row mandatory,
//! greedy blank-row skipping. Encoding is detected before parsing.

pub mod spreadsheet;
pub mod template;

use serde::Serialize;

use crate::api::logs::log_warning;
use crate::error::{ImportError, ImportResult};
use crate::models::{normalize_header, RawRow};

pub use spreadsheet::read_spreadsheet;
pub use template::{template_csv, TEMPLATE_HEADERS};

/// Field delimiter for CSV input (regional spreadsheet export convention).
pub const CSV_DELIMITER: u8 = b';';

/// Input format, selected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Pick the format from a filename extension (`.csv`, `.xlsx`, `.xls`).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.trim().to_lowercase();
        let ext = lower.rsplit_once('.').map(|(_, ext)| ext)?;
        match ext {
            "csv" => Some(SourceFormat::Csv),
            "xlsx" | "xls" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Result of reading a file, with metadata
#[derive(Debug, Clone, Serialize)]
pub struct ParsedTable {
    /// Non-blank data rows
    pub rows: Vec<RawRow>,
    /// Normalized column headers in file order
    pub headers: Vec<String>,
    /// Format the bytes were read as
    pub format: SourceFormat,
    /// Detected encoding (CSV only)
    pub encoding: Option<String>,
    /// Non-fatal parse problems
    pub warnings: Vec<String>,
}

/// Read `bytes` as the format implied by `filename`.
///
/// Callers are expected to check the extension first; an unknown extension
/// is reported as `Malformed`.
pub fn read(bytes: &[u8], filename: &str) -> ImportResult<Vec<RawRow>> {
    read_table(bytes, filename).map(|table| table.rows)
}

/// Same as [`read`] but keeps headers, encoding and warnings.
pub fn read_table(bytes: &[u8], filename: &str) -> ImportResult<ParsedTable> {
    let table = match SourceFormat::from_filename(filename) {
        Some(SourceFormat::Csv) => read_csv(bytes)?,
        Some(SourceFormat::Spreadsheet) => read_spreadsheet(bytes)?,
        None => {
            return Err(ImportError::Malformed(format!(
                "extensão não suportada: {}",
                filename
            )))
        }
    };

    for warning in &table.warnings {
        log_warning(warning.clone());
    }

    Ok(table)
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    // Valid UTF-8 is taken as such; chardet guesses wrong on short inputs
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings and invalid UTF-8 fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        // WHATWG maps the latin-1 labels to windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.to_string()
        }
        _ => String::from_utf8_lossy(bytes).to_string(),
    };
    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the most frequent separator in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Decode and parse CSV bytes.
pub fn read_csv(bytes: &[u8]) -> ImportResult<ParsedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_csv_str(&content, Some(encoding))
}

/// Parse decoded CSV text with the fixed dialect.
pub fn parse_csv_str(content: &str, encoding: Option<String>) -> ImportResult<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(CSV_DELIMITER)
        .quote(b'"')
        .double_quote(true)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Malformed(e.to_string()))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        match result {
            Ok(record) => {
                let row: RawRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.as_str(), v.trim()))
                    .collect();
                if row.is_blank() {
                    continue;
                }
                let physical = record
                    .position()
                    .map_or(line, |pos| record_line(content.as_bytes(), pos));
                rows.push(row.with_line(physical));
            }
            Err(e) => errors.push(format!("Line {}: {}", line, e)),
        }
    }

    let unbalanced_quotes = content.matches('"').count() % 2 != 0;
    let foreign_delimiter = headers.iter().filter(|h| !h.is_empty()).count() <= 1
        && detect_delimiter(content) != CSV_DELIMITER as char;

    if rows.is_empty() {
        if !errors.is_empty() || unbalanced_quotes {
            return Err(ImportError::Malformed("quoting".to_string()));
        }
        if foreign_delimiter {
            return Err(ImportError::Malformed("delimiter".to_string()));
        }
        return Err(ImportError::EmptyFile);
    }

    let mut warnings = errors;
    if unbalanced_quotes {
        warnings.push(
            "Unbalanced quote found; a field may have swallowed following lines".to_string(),
        );
    }
    if foreign_delimiter {
        warnings.push(format!(
            "Header has a single column; file seems to use '{}' instead of ';'",
            detect_delimiter(content)
        ));
    }

    Ok(ParsedTable {
        rows,
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        format: SourceFormat::Csv,
        encoding,
        warnings,
    })
}

/// Line a record starts on, past any empty lines the reader skipped over.
fn record_line(content: &[u8], position: &csv::Position) -> usize {
    let skipped = content
        .get(position.byte() as usize..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| matches!(b, b'\n' | b'\r'))
        .filter(|b| **b == b'\n')
        .count();
    position.line() as usize + skipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(csv: &str) -> ImportResult<ParsedTable> {
        parse_csv_str(csv, None)
    }

    #[test]
    fn test_simple_csv() {
        let table = parse("Módulo;Nome do Módulo\n1;Cinemática\n2;Dinâmica").unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.headers, vec!["módulo", "nome do módulo"]);
        assert_eq!(table.rows[0].get("nome do módulo"), Some("Cinemática"));
        assert_eq!(table.rows[1].get("módulo"), Some("2"));
    }

    #[test]
    fn test_quoted_values_with_delimiter_and_escaped_quote() {
        let csv = "aula;nome da aula\n1;\"MRU; parte \"\"A\"\"\"";
        let table = parse(csv).unwrap();

        assert_eq!(table.rows[0].get("nome da aula"), Some("MRU; parte \"A\""));
    }

    #[test]
    fn test_blank_rows_skipped_greedily() {
        let csv = "a;b\n1;2\n\n ; \n;\n3;4\n";
        let table = parse(csv).unwrap();

        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_rows_keep_physical_line() {
        let csv = "a;b\n;\n;\n;\nx;1\n\n;2\n";
        let table = parse(csv).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].line(), Some(5));
        assert_eq!(table.rows[1].line(), Some(7));
    }

    #[test]
    fn test_values_trimmed() {
        let table = parse("a;b\n  x ; y  ").unwrap();
        assert_eq!(table.rows[0].get("a"), Some("x"));
        assert_eq!(table.rows[0].get("b"), Some("y"));
    }

    #[test]
    fn test_short_rows_allowed() {
        let table = parse("a;b;c\n1;2").unwrap();
        assert_eq!(table.rows[0].get("b"), Some("2"));
        assert_eq!(table.rows[0].get("c"), None);
    }

    #[test]
    fn test_header_only_is_empty_file() {
        assert_eq!(parse("Módulo;Aula\n").unwrap_err(), ImportError::EmptyFile);
        assert_eq!(parse("").unwrap_err(), ImportError::EmptyFile);
    }

    #[test]
    fn test_unclosed_quote_without_rows_is_quoting_error() {
        let err = parse("a;b\n\"").unwrap_err();
        assert_eq!(err, ImportError::Malformed("quoting".into()));
    }

    #[test]
    fn test_foreign_delimiter_without_rows() {
        let err = parse("modulo,aula,tempo\n").unwrap_err();
        assert_eq!(err, ImportError::Malformed("delimiter".into()));
    }

    #[test]
    fn test_partial_quote_problem_is_warning() {
        let table = parse("a;b\n1;2\n3;\"4").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(!table.warnings.is_empty());
    }

    #[test]
    fn test_source_format_from_filename() {
        assert_eq!(SourceFormat::from_filename("Frente A.CSV"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_filename("x.xlsx"), Some(SourceFormat::Spreadsheet));
        assert_eq!(SourceFormat::from_filename("x.xls"), Some(SourceFormat::Spreadsheet));
        assert_eq!(SourceFormat::from_filename("x.ods"), None);
        assert_eq!(SourceFormat::from_filename("noext"), None);
    }

    #[test]
    fn test_read_dispatches_on_extension() {
        let rows = read(b"aula;nome da aula\n1;MRU", "aulas.csv").unwrap();
        assert_eq!(rows.len(), 1);

        let err = read(b"aula\n1", "aulas.txt").unwrap_err();
        assert!(err.malformed_reason().is_some());
    }

    #[test]
    fn test_latin1_decoding() {
        // "Módulo;Aula\n1;Óptica" in ISO-8859-1
        let mut bytes = b"M\xf3dulo;Aula\n1;\xd3ptica".to_vec();
        bytes.extend_from_slice(b"\n");
        let decoded = decode_content(&bytes, "iso-8859-1");
        assert!(decoded.starts_with("Módulo"));
        assert!(decoded.contains("Óptica"));
    }

    #[test]
    fn test_latin1_label_uses_windows_1252_mapping() {
        // 0x80 is the euro sign in windows-1252, a C1 control in ISO-8859-15
        assert_eq!(decode_content(b"\x80 50", "iso-8859-1"), "€ 50");
        assert_eq!(decode_content(b"\x93MRU\x94", "latin1"), "\u{201c}MRU\u{201d}");
    }

    #[test]
    fn test_valid_utf8_detected_as_utf8() {
        assert_eq!(detect_encoding("Módulo;Aula\n1;Óptica".as_bytes()), "utf-8");
        assert_eq!(detect_encoding(b"aula;tempo"), "utf-8");
    }

    #[test]
    fn test_bom_stripped() {
        let decoded = decode_content("\u{feff}aula;tempo".as_bytes(), "utf-8");
        assert_eq!(decoded, "aula;tempo");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("abc"), ';');
    }
}

use crate::core::error::ProcessingError;
use crate::core::io::{Delimiter, Sheet};
use calamine::{Data, Reader, Xlsx};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Cursor;
use tracing::debug;

/// A parsed sheet before validation: header names plus untyped records.
#[derive(Clone, Debug)]
pub struct RawTable {
    headers: Vec<String>,
    records: Vec<(usize, StringRecord)>,
}

impl RawTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Records paired with their 1-based data row number.
    pub fn records(&self) -> impl Iterator<Item = (usize, &StringRecord)> {
        self.records.iter().map(|(n, r)| (*n, r))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Numbers data rows from 1 and drops rows whose cells are all empty.
    fn assemble<I>(headers: Vec<String>, rows: I) -> Result<Self, ProcessingError>
    where
        I: IntoIterator<Item = Result<StringRecord, ProcessingError>>,
    {
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ProcessingError::EmptyInput);
        }
        let mut records = Vec::new();
        let mut blank = 0usize;
        for (i, rec) in rows.into_iter().enumerate() {
            let rec = rec?;
            if rec.iter().all(|f| f.is_empty()) {
                blank += 1;
                continue;
            }
            records.push((i + 1, rec));
        }
        debug!(
            columns = headers.len(),
            rows = records.len(),
            blank_rows = blank,
            "sheet parsed"
        );
        Ok(Self { headers, records })
    }
}

/// Parses a loaded sheet, workbook or delimited text.
pub fn read_table(sheet: &Sheet, delimiter: Delimiter) -> Result<RawTable, ProcessingError> {
    if sheet.is_workbook() {
        return parse_workbook(&sheet.data);
    }
    let delim = delimiter.resolve(&sheet.data);
    debug!(delimiter = %char::from(delim).escape_default(), "delimiter selected");
    parse_table(&sheet.data, delim)
}

/// Delimited text with a header row. Fields are trimmed and a leading BOM is dropped.
pub fn parse_table(data: &[u8], delimiter: u8) -> Result<RawTable, ProcessingError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').trim().to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    RawTable::assemble(
        headers,
        rdr.into_records().map(|r| r.map_err(ProcessingError::from)),
    )
}

/// First worksheet of an xlsx workbook; its first used row is the header.
pub fn parse_workbook(data: &[u8]) -> Result<RawTable, ProcessingError> {
    let mut book: Xlsx<_> = Xlsx::new(Cursor::new(data))?;
    let range = book
        .worksheet_range_at(0)
        .ok_or(ProcessingError::EmptyInput)??;
    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(cells) => cells.iter().map(cell_text).collect(),
        None => return Err(ProcessingError::EmptyInput),
    };
    RawTable::assemble(
        headers,
        rows.map(|cells| {
            let fields: Vec<String> = cells.iter().map(cell_text).collect();
            Ok::<_, ProcessingError>(StringRecord::from(fields))
        }),
    )
}

// Numbers print without a trailing `.0`, so `88` and `72.5` read back as typed.
fn cell_text(cell: &Data) -> String {
    cell.to_string().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::InputKind;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Marks" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    /// Minimal xlsx with one sheet; numeric-looking cells are stored as numbers.
    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, cells) in rows.iter().enumerate() {
            sheet.push_str(&format!("<row r=\"{}\">", r + 1));
            for (c, value) in cells.iter().enumerate() {
                let cell_ref = format!("{}{}", char::from(b'A' + c as u8), r + 1);
                if value.parse::<f64>().is_ok() {
                    sheet.push_str(&format!("<c r=\"{cell_ref}\"><v>{value}</v></c>"));
                } else if !value.is_empty() {
                    sheet.push_str(&format!(
                        "<c r=\"{cell_ref}\" t=\"inlineStr\"><is><t>{value}</t></is></c>"
                    ));
                }
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in [
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", sheet.as_str()),
        ] {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_workbook_first_sheet() {
        let data = workbook(&[
            &["Student", "Total", "Grade"],
            &["Ada", "88", "A*"],
            &["Bob", "72.5", "A"],
        ]);
        let t = parse_workbook(&data).unwrap();
        assert_eq!(t.headers(), &["Student", "Total", "Grade"]);
        let totals: Vec<&str> = t.records().map(|(_, r)| r.get(1).unwrap()).collect();
        assert_eq!(totals, vec!["88", "72.5"]);
    }

    #[test]
    fn test_workbook_blank_row_keeps_numbering() {
        let data = workbook(&[&["Total", "Grade"], &["50", "A"], &["", ""], &["70", "B"]]);
        let t = parse_workbook(&data).unwrap();
        let rows: Vec<usize> = t.records().map(|(n, _)| n).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_read_table_dispatches_on_kind() {
        let sheet = Sheet::from_bytes(workbook(&[&["Total", "Grade"], &["61", "C"]])).unwrap();
        assert_eq!(sheet.kind, InputKind::Xlsx);
        assert_eq!(read_table(&sheet, Delimiter::Auto).unwrap().len(), 1);

        let text = Sheet::from_bytes(b"Total;Grade\n61;C\n".to_vec()).unwrap();
        let t = read_table(&text, Delimiter::Auto).unwrap();
        assert_eq!(t.column_index("Grade"), Some(1));
    }

    #[test]
    fn test_not_a_workbook_is_error() {
        let err = parse_workbook(b"PK\x03\x04 not really").unwrap_err();
        assert!(matches!(err, ProcessingError::Workbook(_)));
    }

    #[test]
    fn test_parse_headers_and_rows() {
        let t = parse_table(b"Name, Total ,Grade\nAda,50,A\nBob, 70 ,B\n", b',').unwrap();
        assert_eq!(t.headers(), &["Name", "Total", "Grade"]);
        assert_eq!(t.column_index("Total"), Some(1));
        assert_eq!(t.column_index("total"), None);
        assert_eq!(t.len(), 2);
        let (row, rec) = t.records().nth(1).unwrap();
        assert_eq!(row, 2);
        assert_eq!(rec.get(1), Some("70"));
    }

    #[test]
    fn test_parse_strips_bom() {
        let t = parse_table("\u{feff}Total,Grade\n1,A\n".as_bytes(), b',').unwrap();
        assert_eq!(t.headers()[0], "Total");
    }

    #[test]
    fn test_parse_empty_input() {
        let err = parse_table(b"", b',').unwrap_err();
        assert!(matches!(err, ProcessingError::EmptyInput));
    }

    #[test]
    fn test_parse_header_only() {
        let t = parse_table(b"Total,Grade\n", b',').unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn test_parse_skips_blank_rows_keeps_numbering() {
        let t = parse_table(b"Total,Grade\n50,A\n,\n70,B\n", b',').unwrap();
        let rows: Vec<usize> = t.records().map(|(n, _)| n).collect();
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_parse_ragged_row_is_error() {
        let err = parse_table(b"Total,Grade\n50,A,extra\n", b',').unwrap_err();
        assert!(matches!(err, ProcessingError::Csv(_)));
    }

    #[test]
    fn test_parse_semicolon() {
        let t = parse_table(b"Total;Grade\n50,5;A\n", b';').unwrap();
        let (_, rec) = t.records().next().unwrap();
        assert_eq!(rec.get(0), Some("50,5"));
    }
}

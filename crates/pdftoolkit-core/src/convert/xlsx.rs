//! Excel (.xlsx) conversions
//!
//! Reading uses the calamine crate; writing emits a single-sheet workbook
//! with inline strings.

use super::extract::page_texts;
use super::layout::TextLayout;
use super::ooxml::{content_types, escape_text, relationships, OFFICE_DOCUMENT_REL, XML_HEADER};
use crate::archive::ZipPackage;
use crate::error::ToolkitError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

/// Name of the sheet written by `pdf_to_xlsx`
pub const EXTRACTED_SHEET: &str = "Extracted Text";

/// Every sheet as rows of cell text
pub fn read_sheets(bytes: &[u8]) -> Result<Vec<(String, Vec<Vec<String>>)>, ToolkitError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ToolkitError::ConversionError(format!("Failed to open XLSX: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(ToolkitError::ConversionError(
            "No sheets found in workbook".into(),
        ));
    }

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            ToolkitError::ConversionError(format!("Failed to read sheet '{}': {}", name, e))
        })?;
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        sheets.push((name, rows));
    }

    Ok(sheets)
}

/// One section per sheet: a `[name]` heading, then tab-joined rows
pub fn xlsx_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let sections: Vec<Vec<String>> = read_sheets(bytes)?
        .into_iter()
        .map(|(name, rows)| {
            let mut lines = vec![format!("[{}]", name)];
            lines.extend(rows.into_iter().map(|row: Vec<String>| row.join("\t")));
            lines
        })
        .collect();

    TextLayout::letter().render(&sections)
}

/// One row per extracted text line: page number, line number, text
pub fn pdf_to_xlsx(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let mut rows = Vec::new();
    for (page_index, text) in page_texts(bytes)?.iter().enumerate() {
        for (line_index, line) in text.lines().enumerate() {
            rows.push(vec![
                Cell::Number((page_index + 1) as f64),
                Cell::Number((line_index + 1) as f64),
                Cell::Text(line.to_string()),
            ]);
        }
    }
    write_xlsx(EXTRACTED_SHEET, &["Page", "Line", "Text"], &rows)
}

/// Cell value written to a worksheet
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

/// Build a single-sheet workbook with a header row
pub fn write_xlsx(
    sheet: &str,
    header: &[&str],
    rows: &[Vec<Cell>],
) -> Result<Vec<u8>, ToolkitError> {
    let mut sheet_data = String::new();

    let header_row: Vec<Cell> = header.iter().map(|h| Cell::Text(h.to_string())).collect();
    for (row_index, row) in std::iter::once(&header_row).chain(rows).enumerate() {
        let row_number = row_index + 1;
        sheet_data.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (col_index, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(col_index), row_number);
            match cell {
                Cell::Number(n) => {
                    sheet_data.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n))
                }
                Cell::Text(text) => sheet_data.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    escape_text(text)
                )),
            }
        }
        sheet_data.push_str("</row>");
    }

    let worksheet = format!(
        r#"{}<worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#,
        XML_HEADER, SPREADSHEETML_NS, sheet_data
    );
    let workbook = format!(
        r#"{}<workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        XML_HEADER,
        SPREADSHEETML_NS,
        REL_NS,
        escape_text(sheet)
    );

    let mut package = ZipPackage::new();
    package.add(
        "[Content_Types].xml",
        content_types(&[
            (
                "/xl/workbook.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ),
            (
                "/xl/worksheets/sheet1.xml".to_string(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            ),
        ])
        .as_bytes(),
    )?;
    package.add(
        "_rels/.rels",
        relationships(&[(
            "rId1".to_string(),
            OFFICE_DOCUMENT_REL,
            "xl/workbook.xml".to_string(),
        )])
        .as_bytes(),
    )?;
    package.add("xl/workbook.xml", workbook.as_bytes())?;
    package.add(
        "xl/_rels/workbook.xml.rels",
        relationships(&[(
            "rId1".to_string(),
            WORKSHEET_REL,
            "worksheets/sheet1.xml".to_string(),
        )])
        .as_bytes(),
    )?;
    package.add("xl/worksheets/sheet1.xml", worksheet.as_bytes())?;
    package.finish()
}

/// Spreadsheet column letters for a zero-based index: A..Z, AA..
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#ERR:{:?}", e),
    }
}

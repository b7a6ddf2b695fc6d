// src/common/spreadsheet.rs

use std::{collections::HashMap, io::Cursor};

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::{Format, Workbook};

use crate::common::{
    error::AppError,
    uploads::{allowed_extension, SPREADSHEET_EXTENSIONS},
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---
// Leitura
// ---

/// Uma linha da planilha, indexada pelo cabeçalho normalizado (ex: "RAZAO_SOCIAL").
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow(HashMap<String, String>);

impl SheetRow {
    /// Valor da coluna, `None` se a coluna não existe ou a célula está vazia.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SheetRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SheetRow(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Falha se alguma coluna obrigatória não aparece na planilha.
pub fn require_columns(rows: &[SheetRow], columns: &[&str]) -> Result<(), AppError> {
    if rows.is_empty() {
        return Ok(());
    }
    for column in columns {
        if !rows.iter().any(|row| row.has_column(column)) {
            return Err(AppError::Spreadsheet(format!("coluna '{}' não encontrada", column)));
        }
    }
    Ok(())
}

pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Lê a primeira aba (xlsx/xls) ou o CSV inteiro. Linhas totalmente vazias são descartadas.
pub fn read_rows(bytes: &[u8], file_name: &str) -> Result<Vec<SheetRow>, AppError> {
    let ext = allowed_extension(file_name, SPREADSHEET_EXTENSIONS)?;

    let (headers, records) = match ext.as_str() {
        "csv" => read_csv(bytes)?,
        _ => read_workbook(bytes)?,
    };

    let headers: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();

    Ok(records
        .into_iter()
        .map(|record| {
            headers
                .iter()
                .cloned()
                .zip(record)
                .filter(|(h, _)| !h.is_empty())
                .collect::<SheetRow>()
        })
        .filter(|row| !row.is_blank())
        .collect())
}

type RawTable = (Vec<String>, Vec<Vec<String>>);

fn read_workbook(bytes: &[u8]) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("a planilha não possui abas".into()))?
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok((Vec::new(), Vec::new()));
    };

    let headers = header.iter().map(cell_to_string).collect();
    let records = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok((headers, records))
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, AppError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::Spreadsheet(e.to_string()))?;
        records.push(record.iter().map(|v| v.trim().to_owned()).collect());
    }

    Ok((headers, records))
}

/// Converte a célula em texto. Números inteiros (telefone, CNPJ) saem sem ".0".
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---
// Escrita
// ---

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Gera um .xlsx com uma aba: cabeçalho em negrito e as linhas abaixo.
pub fn write_workbook(
    sheet_name: &str,
    headers: &[String],
    rows: &[Vec<Cell>],
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, title) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let line = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(line, col as u16, text)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(line, col as u16, *n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Planilha pronta para download.
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        xlsx_download(&self.file_name, self.bytes)
    }
}

/// Resposta de download do .xlsx.
pub fn xlsx_download(file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file_name);
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_trimmed_and_uppercased() {
        assert_eq!(normalize_header("  razao_social "), "RAZAO_SOCIAL");
        assert_eq!(normalize_header("Cnpj"), "CNPJ");
    }

    #[test]
    fn whole_numbers_lose_decimal_suffix() {
        assert_eq!(cell_to_string(&Data::Float(11999998888.0)), "11999998888");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::String("  SP ".into())), "SP");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn csv_rows_are_keyed_by_normalized_header() {
        let csv = "\u{feff}nome , telefone,GRUPO\nAna,11999990000,Norte\n,,\nBia,11888880000,\n";
        let rows = read_rows(csv.as_bytes(), "promotoras.csv").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("NOME"), Some("Ana"));
        assert_eq!(rows[0].get("TELEFONE"), Some("11999990000"));
        assert_eq!(rows[0].get("GRUPO"), Some("Norte"));
        assert_eq!(rows[1].get("GRUPO"), None);
        assert_eq!(rows[1].get("INEXISTENTE"), None);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = read_rows(b"qualquer", "lojas.pdf").unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));
    }

    #[test]
    fn written_workbook_reads_back() {
        let headers = vec![" cnpj ".to_string(), "Razao_Social".to_string(), "Total".to_string()];
        let rows = vec![
            vec![
                Cell::Number(12345678000190.0),
                Cell::Text("Loja Centro".into()),
                Cell::Number(15.5),
            ],
            vec![Cell::Text("98765432000110".into()), Cell::Text("Loja Sul".into()), Cell::Empty],
        ];

        let bytes = write_workbook("Lojas", &headers, &rows).unwrap();
        let parsed = read_rows(&bytes, "lojas.xlsx").unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].get("CNPJ"), Some("12345678000190"));
        assert_eq!(parsed[0].get("RAZAO_SOCIAL"), Some("Loja Centro"));
        assert_eq!(parsed[0].get("TOTAL"), Some("15.5"));
        assert_eq!(parsed[1].get("CNPJ"), Some("98765432000110"));
        assert_eq!(parsed[1].get("TOTAL"), None);
    }

    #[test]
    fn download_sets_attachment_headers() {
        let response = xlsx_download("lojas_export.xlsx", vec![1, 2, 3]);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"lojas_export.xlsx\""
        );
    }
}

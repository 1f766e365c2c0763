use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::clean::{clean_table, is_comment};
use super::model::{Cell, RawTable, SpectralSeries};
use crate::config::{EncodingFallback, LoaderOptions};
use crate::error::{AssayError, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Container formats an export can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralFormat {
    /// Delimited text with an instrument preamble.
    Csv,
    /// Columnar table; first two columns are wavelength and absorbance.
    Parquet,
    /// `[[wavelength, absorbance, ...], ...]`
    Json,
    /// Spreadsheet workbook; the first worksheet is read, first row is the header.
    Xlsx,
}

impl SpectralFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(SpectralFormat::Csv),
            "parquet" | "pq" => Ok(SpectralFormat::Parquet),
            "json" => Ok(SpectralFormat::Json),
            "xlsx" | "xls" => Ok(SpectralFormat::Xlsx),
            other => Err(AssayError::Format(format!(
                "unsupported file extension: .{other}"
            ))),
        }
    }
}

/// Read and clean an export from disk.
pub fn load_file(path: &Path, options: &LoaderOptions) -> Result<SpectralSeries> {
    let format = SpectralFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    log::debug!("read {} bytes from {}", bytes.len(), path.display());
    load_bytes(&bytes, format, options)
}

/// Strict stage followed by the permissive cleaning stage.
pub fn load_bytes(
    bytes: &[u8],
    format: SpectralFormat,
    options: &LoaderOptions,
) -> Result<SpectralSeries> {
    let table = read_table(bytes, format, options)?;
    clean_table(&table)
}

/// Strict stage only: fail fast on anything structurally wrong, but keep
/// every row (comments and junk included) for the cleaner.
pub fn read_table(bytes: &[u8], format: SpectralFormat, options: &LoaderOptions) -> Result<RawTable> {
    match format {
        SpectralFormat::Csv => {
            let (text, encoding) = decode_text(bytes, options.encoding_fallback)?;
            log::debug!("decoded export as {encoding:?}");
            parse_delimited(&text, options)
        }
        SpectralFormat::Parquet => read_parquet(bytes),
        SpectralFormat::Json => read_json(bytes),
        SpectralFormat::Xlsx => read_workbook(bytes),
    }
}

// ---------------------------------------------------------------------------
// Text decoding
// ---------------------------------------------------------------------------

/// Encoding a text export was actually decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

/// UTF-8 first; on failure, either retry as ISO-8859-1 or give up,
/// depending on `fallback`. A leading UTF-8 BOM is dropped.
pub fn decode_text(bytes: &[u8], fallback: EncodingFallback) -> Result<(Cow<'_, str>, TextEncoding)> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok((Cow::Borrowed(text), TextEncoding::Utf8)),
        Err(err) => match fallback {
            EncodingFallback::Latin1 => {
                log::warn!("export is not valid UTF-8 ({err}); retrying as ISO-8859-1");
                // Every byte is a valid Latin-1 code point.
                let text: String = bytes.iter().map(|&b| char::from(b)).collect();
                Ok((Cow::Owned(text), TextEncoding::Latin1))
            }
            EncodingFallback::Disabled => Err(AssayError::Decode {
                tried: "UTF-8".to_string(),
            }),
        },
    }
}

// ---------------------------------------------------------------------------
// Delimited text
// ---------------------------------------------------------------------------

/// Drop the first `lines` physical lines. Fewer lines than that leaves nothing.
fn skip_preamble(text: &str, lines: usize) -> &str {
    let mut rest = text;
    for _ in 0..lines {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => return "",
        }
    }
    rest
}

/// Parse decoded text into a [`RawTable`].
///
/// Layout: `preamble_lines` arbitrary lines, a header row, then data rows.
/// Short rows are kept as-is (absent cells read as missing when cleaned); a
/// non-comment row wider than the header rejects the whole table.
pub fn parse_delimited(text: &str, options: &LoaderOptions) -> Result<RawTable> {
    let body = skip_preamble(text, options.preamble_lines);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AssayError::Format(format!("reading header row: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let width = columns.len();
    if width < 2 {
        return Err(missing_columns(width));
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| AssayError::Format(format!("data row {}: {e}", row_no + 1)))?;

        let commented = record.get(0).is_some_and(is_comment);
        if record.len() > width && !commented {
            return Err(AssayError::Format(format!(
                "data row {}: expected {width} fields, saw {}",
                row_no + 1,
                record.len()
            )));
        }

        let cells = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }

    log::debug!("delimited table: {width} columns, {} raw rows", rows.len());
    RawTable::new(columns, rows).ok_or_else(|| missing_columns(width))
}

fn missing_columns(found: usize) -> AssayError {
    AssayError::Format(format!(
        "missing wavelength/absorbance columns (found {found} column(s))"
    ))
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Columnar table: the first two columns are taken positionally, like the
/// delimited path. Numeric and string columns are accepted.
fn read_parquet(bytes: &[u8]) -> Result<RawTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::copy_from_slice(bytes))
        .map_err(|e| AssayError::Format(format!("reading parquet metadata: {e}")))?;

    let schema = builder.schema().clone();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    if columns.len() < 2 {
        return Err(missing_columns(columns.len()));
    }
    for field in schema.fields().iter().take(2) {
        if !is_cell_type(field.data_type()) {
            return Err(AssayError::Format(format!(
                "column '{}' has unsupported type {:?}",
                field.name(),
                field.data_type()
            )));
        }
    }

    let reader = builder
        .build()
        .map_err(|e| AssayError::Format(format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| AssayError::Format(format!("reading parquet record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            rows.push(batch.columns().iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    log::debug!("parquet table: {} columns, {} raw rows", columns.len(), rows.len());
    RawTable::new(columns.clone(), rows).ok_or_else(|| missing_columns(columns.len()))
}

fn is_cell_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Utf8
            | DataType::LargeUtf8
    )
}

/// One cell of an Arrow column. Types outside [`is_cell_type`] read as missing.
fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Missing;
    }
    match col.data_type() {
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        DataType::Float32 => Cell::Number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Int64 => Cell::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Int32 => Cell::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Utf8 => Cell::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::Text(col.as_string::<i64>().value(row).to_string()),
        _ => Cell::Missing,
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Expected layout: an array of rows, each row an array of cells.
///
/// ```json
/// [
///   [644.0, 0.812],
///   ["536", "0.401", "extra"],
///   ["// lamp change", null]
/// ]
/// ```
fn read_json(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes)
        .map_err(|e| AssayError::Format(format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| AssayError::Format("expected top-level JSON array of rows".into()))?;

    let mut width = 0;
    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let cells = rec
            .as_array()
            .ok_or_else(|| AssayError::Format(format!("row {i} is not a JSON array")))?;
        width = width.max(cells.len());
        rows.push(cells.iter().map(json_to_cell).collect());
    }

    let columns = (0..width).map(|i| format!("column_{i}")).collect();
    RawTable::new(columns, rows).ok_or_else(|| missing_columns(width))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::Number(n) => n.as_f64().map_or(Cell::Missing, Cell::Number),
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet
// ---------------------------------------------------------------------------

/// First worksheet of a workbook. Unlike the delimited path there is no
/// instrument preamble: row one is the header.
fn read_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AssayError::Format(format!("opening workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AssayError::Format("workbook has no worksheets".into()))?
        .map_err(|e| AssayError::Format(format!("reading first worksheet: {e}")))?;

    let mut sheet_rows = range.rows();
    let columns: Vec<String> = sheet_rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    if columns.len() < 2 {
        return Err(missing_columns(columns.len()));
    }

    let rows: Vec<Vec<Cell>> = sheet_rows
        .map(|row| row.iter().map(sheet_to_cell).collect())
        .collect();

    log::debug!("worksheet table: {} columns, {} raw rows", columns.len(), rows.len());
    let width = columns.len();
    RawTable::new(columns, rows).ok_or_else(|| missing_columns(width))
}

fn sheet_to_cell(data: &Data) -> Cell {
    match data {
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Empty => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::data::model::SpectralSample;

    fn options() -> LoaderOptions {
        LoaderOptions::default()
    }

    fn text(cells: &[Cell]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn utf8_decodes_without_fallback() {
        let (text, enc) = decode_text("nm,Abs\n".as_bytes(), EncodingFallback::Disabled).unwrap();
        assert_eq!(text, "nm,Abs\n");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn bom_is_stripped() {
        let bytes = [UTF8_BOM, b"nm,Abs"].concat();
        let (text, _) = decode_text(&bytes, EncodingFallback::Latin1).unwrap();
        assert_eq!(text, "nm,Abs");
    }

    #[test]
    fn invalid_utf8_falls_back_to_latin1() {
        // "Absorbance (µ)" with µ as the single Latin-1 byte 0xB5.
        let bytes = b"Absorbance (\xB5)";
        let (text, enc) = decode_text(bytes, EncodingFallback::Latin1).unwrap();
        assert_eq!(enc, TextEncoding::Latin1);
        assert_eq!(text, "Absorbance (\u{b5})");
    }

    #[test]
    fn invalid_utf8_without_fallback_is_decode_error() {
        let err = decode_text(b"\xFF\xFE", EncodingFallback::Disabled).unwrap_err();
        assert!(matches!(err, AssayError::Decode { .. }));
    }

    #[test]
    fn preamble_is_skipped_and_columns_renamed() {
        let text = "Instrument X\r\nRun 42\r\nnm,Abs,Std\r\n500,0.1,0.01\r\n";
        let table = parse_delimited(text, &options()).unwrap();
        assert_eq!(table.columns, vec!["Wavelength", "Absorbance", "Std"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(text_of_row(&table, 0), vec!["500", "0.1", "0.01"]);
    }

    fn text_of_row(table: &RawTable, i: usize) -> Vec<String> {
        text(&table.rows[i])
    }

    #[test]
    fn single_column_header_is_format_error() {
        let text = "a\nb\nWavelength\n500\n";
        let err = parse_delimited(text, &options()).unwrap_err();
        assert!(matches!(err, AssayError::Format(msg) if msg.contains("wavelength/absorbance")));
    }

    #[test]
    fn file_shorter_than_preamble_is_format_error() {
        assert!(matches!(
            parse_delimited("only one line", &options()),
            Err(AssayError::Format(_))
        ));
    }

    #[test]
    fn wide_data_row_rejects_table() {
        let text = "p1\np2\nnm,Abs\n500,0.1\n510,0.2,0.3\n";
        let err = parse_delimited(text, &options()).unwrap_err();
        assert!(matches!(err, AssayError::Format(msg) if msg.contains("row 2")));
    }

    #[test]
    fn wide_comment_row_is_tolerated() {
        let text = "p1\np2\nnm,Abs\n// operator, lamp, notes\n500,0.1\n";
        let table = parse_delimited(text, &options()).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn short_rows_and_blanks_become_missing() {
        let text = "p1\np2\nnm,Abs\n500\n\n510,\n";
        let table = parse_delimited(text, &options()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec![Cell::Text("500".into())]);
        assert_eq!(table.rows[1], vec![Cell::Text("510".into()), Cell::Missing]);
    }

    #[test]
    fn custom_delimiter_and_preamble() {
        let opts = LoaderOptions {
            preamble_lines: 0,
            delimiter: b'\t',
            ..LoaderOptions::default()
        };
        let table = parse_delimited("nm\tAbs\n500\t0.1\n", &opts).unwrap();
        assert_eq!(text_of_row(&table, 0), vec!["500", "0.1"]);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SpectralFormat::from_path(Path::new("a.CSV")).unwrap(), SpectralFormat::Csv);
        assert_eq!(SpectralFormat::from_path(Path::new("a.pq")).unwrap(), SpectralFormat::Parquet);
        assert_eq!(SpectralFormat::from_path(Path::new("a.json")).unwrap(), SpectralFormat::Json);
        assert_eq!(SpectralFormat::from_path(Path::new("run.xlsx")).unwrap(), SpectralFormat::Xlsx);
        assert_eq!(SpectralFormat::from_path(Path::new("run.XLS")).unwrap(), SpectralFormat::Xlsx);
        assert!(matches!(
            SpectralFormat::from_path(Path::new("a.ods")),
            Err(AssayError::Format(_))
        ));
    }

    #[test]
    fn json_rows_load_and_clean() {
        let json = br#"[[644.0, 0.812], ["536", "0.401", "x"], ["// note", null], [true, 1]]"#;
        let series = load_bytes(json, SpectralFormat::Json, &options()).unwrap();
        assert_eq!(
            series.samples(),
            &[
                SpectralSample { wavelength: 644.0, absorbance: 0.812 },
                SpectralSample { wavelength: 536.0, absorbance: 0.401 },
            ]
        );
    }

    #[test]
    fn json_object_root_is_format_error() {
        assert!(matches!(
            read_table(br#"{"x": 1}"#, SpectralFormat::Json, &options()),
            Err(AssayError::Format(_))
        ));
    }

    fn parquet_bytes(batch: &RecordBatch) -> Vec<u8> {
        let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.into_inner().unwrap()
    }

    #[test]
    fn parquet_first_two_columns_are_used() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("nm", DataType::Float64, true),
            Field::new("abs", DataType::Utf8, true),
            Field::new("note", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![Some(500.0), Some(510.0), None])),
                Arc::new(StringArray::from(vec![Some("0.5"), Some("n/a"), Some("0.7")])),
                Arc::new(StringArray::from(vec![Some("a"), None, Some("c")])),
            ],
        )
        .unwrap();

        let bytes = parquet_bytes(&batch);
        let table = read_table(&bytes, SpectralFormat::Parquet, &options()).unwrap();
        assert_eq!(table.columns, vec!["Wavelength", "Absorbance", "note"]);
        assert_eq!(table.rows.len(), 3);

        let series = load_bytes(&bytes, SpectralFormat::Parquet, &options()).unwrap();
        assert_eq!(
            series.samples(),
            &[SpectralSample { wavelength: 500.0, absorbance: 0.5 }]
        );
    }

    #[test]
    fn parquet_single_column_is_format_error() {
        let schema = Arc::new(Schema::new(vec![Field::new("nm", DataType::Float64, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![500.0]))],
        )
        .unwrap();
        let err = read_table(&parquet_bytes(&batch), SpectralFormat::Parquet, &options()).unwrap_err();
        assert!(matches!(err, AssayError::Format(_)));
    }

    #[test]
    fn garbage_parquet_is_format_error() {
        assert!(matches!(
            read_table(b"not parquet", SpectralFormat::Parquet, &options()),
            Err(AssayError::Format(_))
        ));
    }

    #[test]
    fn parquet_integer_columns_read_as_numbers() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("nm", DataType::Int64, false),
            Field::new("counts", DataType::Int32, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![536, 644])),
                Arc::new(Int32Array::from(vec![2, 5])),
            ],
        )
        .unwrap();

        let table = read_table(&parquet_bytes(&batch), SpectralFormat::Parquet, &options()).unwrap();
        assert_eq!(table.rows[0], vec![Cell::Number(536.0), Cell::Number(2.0)]);
        assert_eq!(table.rows[1], vec![Cell::Number(644.0), Cell::Number(5.0)]);
    }

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if value.is_empty() {
                    continue;
                }
                match value.parse::<f64>() {
                    Ok(n) => sheet.write_number(r, c, n).unwrap(),
                    Err(_) => sheet.write_string(r, c, *value).unwrap(),
                };
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn workbook_first_row_is_header() {
        let bytes = workbook_bytes(&[
            &["nm", "Abs", "Note"],
            &["644", "0.81", "peak"],
            &["// lamp change", "", ""],
            &["536", "", "gap"],
            &["550", "0.4", ""],
        ]);

        let table = read_table(&bytes, SpectralFormat::Xlsx, &options()).unwrap();
        assert_eq!(table.columns, vec!["Wavelength", "Absorbance", "Note"]);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.rows[0][0], Cell::Number(644.0));
        assert_eq!(table.rows[2][1], Cell::Missing);

        let series = load_bytes(&bytes, SpectralFormat::Xlsx, &options()).unwrap();
        assert_eq!(
            series.samples(),
            &[
                SpectralSample { wavelength: 644.0, absorbance: 0.81 },
                SpectralSample { wavelength: 550.0, absorbance: 0.4 },
            ]
        );
    }

    #[test]
    fn workbook_single_column_is_format_error() {
        let bytes = workbook_bytes(&[&["nm"], &["500"], &["510"]]);
        let err = read_table(&bytes, SpectralFormat::Xlsx, &options()).unwrap_err();
        assert!(matches!(err, AssayError::Format(msg) if msg.contains("wavelength/absorbance")));
    }

    #[test]
    fn garbage_workbook_is_format_error() {
        assert!(matches!(
            read_table(b"not a workbook", SpectralFormat::Xlsx, &options()),
            Err(AssayError::Format(_))
        ));
    }
}

//! Workbook, sheet and cell model.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::biff;

/// Errors raised while opening or decoding a workbook
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("cannot open workbook: {0}")]
    Open(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no Workbook stream in compound file")]
    MissingStream,

    #[error("unsupported workbook: {0}")]
    Unsupported(String),

    #[error("record truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("malformed workbook: {0}")]
    Malformed(String),

    #[error("workbook has no worksheet")]
    NoWorksheet,

    #[error("workbook is empty")]
    Empty,
}

/// Value stored in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// BIFF error code (e.g. 0x07 for #DIV/0!)
    Error(u8),
}

impl CellValue {
    /// Display text of the value; whole numbers print without a fraction
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Error(code) => match code {
                0x00 => "#NULL!",
                0x07 => "#DIV/0!",
                0x0F => "#VALUE!",
                0x17 => "#REF!",
                0x1D => "#NAME?",
                0x24 => "#NUM!",
                0x2A => "#N/A",
                _ => "#ERROR",
            }
            .to_string(),
        }
    }
}

/// Fill settings of one XF record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellFormat {
    /// Fill pattern; 0 means no fill
    pub fill_pattern: u8,
    /// Palette index of the pattern (foreground) color
    pub pattern_color: u16,
    /// Palette index of the background color
    pub background_color: u16,
}

impl CellFormat {
    /// Decode the fill fields of a BIFF8 XF record body
    pub fn from_xf(data: &[u8]) -> Self {
        if data.len() < 20 {
            return Self::default();
        }
        let border = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
        let colors = u16::from_le_bytes([data[18], data[19]]);
        Self {
            fill_pattern: ((border >> 26) & 0x3F) as u8,
            pattern_color: colors & 0x7F,
            background_color: (colors >> 7) & 0x7F,
        }
    }

    /// A solid or patterned fill is set
    pub fn is_filled(&self) -> bool {
        self.fill_pattern != 0
    }
}

/// A cell: its value and the index of its XF record
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub xf: u16,
}

impl Cell {
    pub fn new(value: CellValue, xf: u16) -> Self {
        Self { value, xf }
    }

    pub fn text(value: impl Into<String>, xf: u16) -> Self {
        Self::new(CellValue::Text(value.into()), xf)
    }
}

/// A worksheet as a sparse grid of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<BTreeMap<u16, Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Place a cell, growing the sheet as needed
    pub fn set(&mut self, row: usize, col: u16, cell: Cell) {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, BTreeMap::new);
        }
        self.rows[row].insert(col, cell);
    }

    /// Number of rows up to the last one holding any cell
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: u16) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(&col))
    }

    /// Text of a cell; missing cells read as empty
    pub fn text(&self, row: usize, col: u16) -> String {
        self.cell(row, col)
            .map(|c| c.value.to_text())
            .unwrap_or_default()
    }

    /// XF index of a cell, if the cell exists
    pub fn xf(&self, row: usize, col: u16) -> Option<u16> {
        self.cell(row, col).map(|c| c.xf)
    }
}

/// A decoded workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    /// XF table, indexed by a cell's `xf`
    pub formats: Vec<CellFormat>,
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(formats: Vec<CellFormat>, sheets: Vec<Sheet>) -> Self {
        Self { formats, sheets }
    }

    /// Open an `.xls` file (OLE2 compound document holding a BIFF8 stream)
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let mut compound = cfb::open(path).map_err(WorkbookError::Open)?;

        if !compound.exists("/Workbook") {
            if compound.exists("/Book") {
                return Err(WorkbookError::Unsupported(
                    "BIFF5 workbook (Excel 5.0/95)".to_string(),
                ));
            }
            return Err(WorkbookError::MissingStream);
        }

        let mut stream = Vec::new();
        compound.open_stream("/Workbook")?.read_to_end(&mut stream)?;

        Self::from_stream(&stream)
    }

    /// Decode a raw BIFF8 workbook stream
    pub fn from_stream(stream: &[u8]) -> Result<Self, WorkbookError> {
        if stream.is_empty() {
            return Err(WorkbookError::Empty);
        }

        let globals = biff::parse_globals(stream)?;
        let mut sheets = Vec::with_capacity(globals.sheets.len());

        for entry in &globals.sheets {
            let mut sheet = Sheet::new(entry.name.clone());
            for raw in biff::parse_sheet(stream, entry.offset, &globals.strings)? {
                sheet.set(raw.row as usize, raw.col, Cell::new(raw.value, raw.xf));
            }
            sheets.push(sheet);
        }

        Ok(Self::new(globals.formats, sheets))
    }

    /// First worksheet in workbook order
    pub fn first_sheet(&self) -> Result<&Sheet, WorkbookError> {
        self.sheets.first().ok_or(WorkbookError::NoWorksheet)
    }

    /// Format of an XF index, if the table has it
    pub fn format(&self, xf: u16) -> Option<&CellFormat> {
        self.formats.get(xf as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_text() {
        assert_eq!(CellValue::Number(3.0).to_text(), "3");
        assert_eq!(CellValue::Number(-12.0).to_text(), "-12");
        assert_eq!(CellValue::Number(2.5).to_text(), "2.5");
        assert_eq!(CellValue::Bool(true).to_text(), "TRUE");
        assert_eq!(CellValue::Error(0x07).to_text(), "#DIV/0!");
        assert_eq!(CellValue::Empty.to_text(), "");
    }

    #[test]
    fn test_format_from_xf() {
        let mut xf = [0u8; 20];
        // Solid fill (pattern 1) in the top bits of the border word
        xf[17] = 1 << 2;
        // Pattern color 13 (yellow), background 64 (system window)
        let colors: u16 = 13 | (64 << 7);
        xf[18..20].copy_from_slice(&colors.to_le_bytes());

        let format = CellFormat::from_xf(&xf);
        assert_eq!(format.fill_pattern, 1);
        assert_eq!(format.pattern_color, 13);
        assert_eq!(format.background_color, 64);
        assert!(format.is_filled());

        assert!(!CellFormat::from_xf(&[0u8; 20]).is_filled());
        assert!(!CellFormat::from_xf(&[0u8; 4]).is_filled());
    }

    #[test]
    fn test_sheet_grid() {
        let mut sheet = Sheet::new("Hoja1");
        sheet.set(2, 0, Cell::text("Q", 15));
        sheet.set(2, 3, Cell::new(CellValue::Number(1.0), 16));

        assert_eq!(sheet.nrows(), 3);
        assert_eq!(sheet.text(0, 0), "");
        assert_eq!(sheet.text(2, 0), "Q");
        assert_eq!(sheet.xf(2, 0), Some(15));
        assert_eq!(sheet.xf(1, 0), None);
        assert_eq!(sheet.text(9, 0), "");
    }

    #[test]
    fn test_empty_stream() {
        assert!(matches!(Workbook::from_stream(&[]), Err(WorkbookError::Empty)));
    }

    #[test]
    fn test_no_worksheet() {
        let workbook = Workbook::default();
        assert!(matches!(
            workbook.first_sheet(),
            Err(WorkbookError::NoWorksheet)
        ));
    }
}

//! Minimal reader for legacy Excel (`.xls`) workbooks.
//!
//! Only what the quiz layout needs is decoded: the shared string table, the
//! cell format (XF) table and the cells of each worksheet. Charts, formulas'
//! expressions, merged regions and everything else in the stream are skipped.
//!
//! # Layout
//!
//! ```text
//! compound file (OLE2)
//! └── Workbook stream (BIFF8)
//!     ├── globals: BOF, XF*, SST + CONTINUE*, BOUNDSHEET*, EOF
//!     └── per sheet: BOF, cell records*, EOF
//! ```

mod biff;
pub mod workbook;

pub use workbook::{Cell, CellFormat, CellValue, Sheet, Workbook, WorkbookError};

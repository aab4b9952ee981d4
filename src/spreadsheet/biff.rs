//! BIFF8 record decoding.

use super::workbook::{CellFormat, CellValue, WorkbookError};

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const FILEPASS: u16 = 0x002F;
const CONTINUE: u16 = 0x003C;
const BOUNDSHEET: u16 = 0x0085;
const SST: u16 = 0x00FC;
const XF: u16 = 0x00E0;

const FORMULA: u16 = 0x0006;
const MULRK: u16 = 0x00BD;
const MULBLANK: u16 = 0x00BE;
const RSTRING: u16 = 0x00D6;
const LABELSST: u16 = 0x00FD;
const BLANK: u16 = 0x0201;
const NUMBER: u16 = 0x0203;
const LABEL: u16 = 0x0204;
const BOOLERR: u16 = 0x0205;
const STRING: u16 = 0x0207;
const RK: u16 = 0x027E;

const BIFF8_VERSION: u16 = 0x0600;
const SHEET_WORKSHEET: u8 = 0x00;

/// One record of the workbook stream
#[derive(Debug, Clone, Copy)]
pub(crate) struct Record<'a> {
    pub kind: u16,
    pub data: &'a [u8],
    /// Stream offset of the record header
    pub offset: usize,
}

/// Read records starting at `offset`, stopping at the end of the stream
pub(crate) fn records(stream: &[u8], offset: usize) -> Result<Vec<Record<'_>>, WorkbookError> {
    let mut out = Vec::new();
    let mut pos = offset;

    while pos + 4 <= stream.len() {
        let kind = u16::from_le_bytes([stream[pos], stream[pos + 1]]);
        let len = u16::from_le_bytes([stream[pos + 2], stream[pos + 3]]) as usize;
        let start = pos + 4;
        let end = start + len;
        if end > stream.len() {
            return Err(WorkbookError::Truncated { offset: pos });
        }
        out.push(Record {
            kind,
            data: &stream[start..end],
            offset: pos,
        });
        pos = end;
    }

    Ok(out)
}

/// A worksheet entry from the globals substream
#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub name: String,
    /// Stream offset of the sheet's BOF
    pub offset: usize,
}

/// Decoded workbook globals
#[derive(Debug, Default)]
pub(crate) struct Globals {
    pub formats: Vec<CellFormat>,
    pub strings: Vec<String>,
    pub sheets: Vec<SheetEntry>,
}

/// Decode the globals substream at the start of the workbook stream
pub(crate) fn parse_globals(stream: &[u8]) -> Result<Globals, WorkbookError> {
    let records = records(stream, 0)?;
    let first = records.first().ok_or(WorkbookError::Empty)?;
    check_bof(first)?;

    let mut globals = Globals::default();
    let mut i = 1;
    while i < records.len() {
        let record = records[i];
        match record.kind {
            EOF => break,
            FILEPASS => {
                return Err(WorkbookError::Unsupported("encrypted workbook".to_string()));
            }
            XF => globals.formats.push(CellFormat::from_xf(record.data)),
            SST => {
                let mut segments = vec![record.data];
                while i + 1 < records.len() && records[i + 1].kind == CONTINUE {
                    i += 1;
                    segments.push(records[i].data);
                }
                globals.strings = parse_sst(segments, record.offset)?;
            }
            BOUNDSHEET => {
                if let Some(entry) = parse_boundsheet(record)? {
                    globals.sheets.push(entry);
                }
            }
            _ => {}
        }
        i += 1;
    }

    Ok(globals)
}

fn check_bof(record: &Record<'_>) -> Result<(), WorkbookError> {
    if record.kind != BOF || record.data.len() < 4 {
        return Err(WorkbookError::Malformed(format!(
            "expected BOF record at offset {}",
            record.offset
        )));
    }
    let version = u16_at(record.data, 0);
    if version != BIFF8_VERSION {
        return Err(WorkbookError::Unsupported(format!(
            "BIFF version {:#06x}",
            version
        )));
    }
    Ok(())
}

fn parse_boundsheet(record: Record<'_>) -> Result<Option<SheetEntry>, WorkbookError> {
    let data = record.data;
    if data.len() < 8 {
        return Err(WorkbookError::Truncated {
            offset: record.offset,
        });
    }
    // Skip macro sheets, charts and VB modules
    if data[5] != SHEET_WORKSHEET {
        return Ok(None);
    }

    let offset = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let cch = data[6] as usize;
    let high_byte = data[7] & 0x01 != 0;
    let name = decode_chars(&data[8..], cch, high_byte).ok_or(WorkbookError::Truncated {
        offset: record.offset,
    })?;

    Ok(Some(SheetEntry { name, offset }))
}

/// Decode `cch` characters from a single buffer (no continuation)
fn decode_chars(bytes: &[u8], cch: usize, high_byte: bool) -> Option<String> {
    if high_byte {
        let raw = bytes.get(..cch * 2)?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        Some(String::from_utf16_lossy(&units))
    } else {
        let raw = bytes.get(..cch)?;
        Some(raw.iter().map(|&b| b as char).collect())
    }
}

/// Reader over a record body split across CONTINUE records
struct Segments<'a> {
    segments: Vec<&'a [u8]>,
    index: usize,
    pos: usize,
    origin: usize,
}

impl<'a> Segments<'a> {
    fn new(segments: Vec<&'a [u8]>, origin: usize) -> Self {
        Self {
            segments,
            index: 0,
            pos: 0,
            origin,
        }
    }

    fn left(&self) -> usize {
        self.segments
            .get(self.index)
            .map(|s| s.len() - self.pos)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> Result<(), WorkbookError> {
        self.index += 1;
        self.pos = 0;
        if self.index >= self.segments.len() {
            return Err(WorkbookError::Truncated {
                offset: self.origin,
            });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, WorkbookError> {
        while self.left() == 0 {
            self.advance()?;
        }
        let b = self.segments[self.index][self.pos];
        self.pos += 1;
        Ok(b)
    }

    fn u16(&mut self) -> Result<u16, WorkbookError> {
        Ok(u16::from_le_bytes([self.u8()?, self.u8()?]))
    }

    fn u32(&mut self) -> Result<u32, WorkbookError> {
        Ok(u32::from_le_bytes([self.u8()?, self.u8()?, self.u8()?, self.u8()?]))
    }

    fn skip(&mut self, mut n: usize) -> Result<(), WorkbookError> {
        while n > 0 {
            if self.left() == 0 {
                self.advance()?;
                continue;
            }
            let take = n.min(self.left());
            self.pos += take;
            n -= take;
        }
        Ok(())
    }

    /// Character data; a CONTINUE boundary inside it repeats the option flags
    fn chars(&mut self, cch: usize, mut high_byte: bool) -> Result<String, WorkbookError> {
        let mut units: Vec<u16> = Vec::with_capacity(cch);
        let mut remaining = cch;

        while remaining > 0 {
            if self.left() == 0 {
                self.advance()?;
                high_byte = self.u8()? & 0x01 != 0;
            }
            let width = if high_byte { 2 } else { 1 };
            let take = (self.left() / width).min(remaining);
            if take == 0 {
                return Err(WorkbookError::Malformed(format!(
                    "string split inside a character near offset {}",
                    self.origin
                )));
            }

            let bytes = &self.segments[self.index][self.pos..self.pos + take * width];
            if high_byte {
                units.extend(
                    bytes
                        .chunks_exact(2)
                        .map(|c| u16::from_le_bytes([c[0], c[1]])),
                );
            } else {
                units.extend(bytes.iter().map(|&b| b as u16));
            }
            self.pos += take * width;
            remaining -= take;
        }

        Ok(String::from_utf16_lossy(&units))
    }
}

/// Decode the shared string table
fn parse_sst(segments: Vec<&[u8]>, origin: usize) -> Result<Vec<String>, WorkbookError> {
    let mut reader = Segments::new(segments, origin);
    let _total = reader.u32()?;
    let unique = reader.u32()? as usize;

    let mut strings = Vec::with_capacity(unique.min(65_536));
    for _ in 0..unique {
        let cch = reader.u16()? as usize;
        let flags = reader.u8()?;
        let runs = if flags & 0x08 != 0 { reader.u16()? as usize } else { 0 };
        let ext = if flags & 0x04 != 0 { reader.u32()? as usize } else { 0 };

        strings.push(reader.chars(cch, flags & 0x01 != 0)?);
        reader.skip(runs * 4)?;
        reader.skip(ext)?;
    }

    Ok(strings)
}

/// A decoded cell before it is placed in the grid
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawCell {
    pub row: u16,
    pub col: u16,
    pub xf: u16,
    pub value: CellValue,
}

/// Decode the cells of the sheet substream starting at `offset`
pub(crate) fn parse_sheet(
    stream: &[u8],
    offset: usize,
    strings: &[String],
) -> Result<Vec<RawCell>, WorkbookError> {
    if offset >= stream.len() {
        return Err(WorkbookError::Malformed(format!(
            "sheet offset {} outside the stream",
            offset
        )));
    }

    let records = records(stream, offset)?;
    let first = records.first().ok_or(WorkbookError::Truncated { offset })?;
    check_bof(first)?;

    let mut cells = Vec::new();
    // Cell of a string FORMULA waiting for its STRING record
    let mut pending: Option<usize> = None;
    let mut depth = 0usize;

    for record in &records {
        match record.kind {
            BOF => depth += 1,
            EOF => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            // Embedded chart substreams carry no cells of this sheet
            _ if depth > 1 => {}
            LABELSST => {
                let (row, col, xf) = cell_header(record)?;
                let isst = u32_at(need(record, 10)?, 6) as usize;
                let text = strings.get(isst).ok_or_else(|| {
                    WorkbookError::Malformed(format!("string index {} out of range", isst))
                })?;
                cells.push(RawCell {
                    row,
                    col,
                    xf,
                    value: CellValue::Text(text.clone()),
                });
            }
            LABEL | RSTRING => {
                let (row, col, xf) = cell_header(record)?;
                let data = need(record, 9)?;
                let cch = u16_at(data, 6) as usize;
                let text = decode_chars(&data[9..], cch, data[8] & 0x01 != 0).ok_or(
                    WorkbookError::Truncated {
                        offset: record.offset,
                    },
                )?;
                cells.push(RawCell {
                    row,
                    col,
                    xf,
                    value: CellValue::Text(text),
                });
            }
            NUMBER => {
                let (row, col, xf) = cell_header(record)?;
                let data = need(record, 14)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&data[6..14]);
                cells.push(RawCell {
                    row,
                    col,
                    xf,
                    value: CellValue::Number(f64::from_le_bytes(raw)),
                });
            }
            RK => {
                let (row, col, xf) = cell_header(record)?;
                let rk = u32_at(need(record, 10)?, 6);
                cells.push(RawCell {
                    row,
                    col,
                    xf,
                    value: CellValue::Number(decode_rk(rk)),
                });
            }
            MULRK => {
                let data = need(record, 6)?;
                let row = u16_at(data, 0);
                let first_col = u16_at(data, 2);
                let count = (data.len() - 6) / 6;
                for n in 0..count {
                    let at = 4 + n * 6;
                    cells.push(RawCell {
                        row,
                        col: column(record, first_col, n)?,
                        xf: u16_at(data, at),
                        value: CellValue::Number(decode_rk(u32_at(data, at + 2))),
                    });
                }
            }
            BLANK => {
                let (row, col, xf) = cell_header(record)?;
                cells.push(RawCell {
                    row,
                    col,
                    xf,
                    value: CellValue::Empty,
                });
            }
            MULBLANK => {
                let data = need(record, 6)?;
                let row = u16_at(data, 0);
                let first_col = u16_at(data, 2);
                let count = (data.len() - 6) / 2;
                for n in 0..count {
                    cells.push(RawCell {
                        row,
                        col: column(record, first_col, n)?,
                        xf: u16_at(data, 4 + n * 2),
                        value: CellValue::Empty,
                    });
                }
            }
            BOOLERR => {
                let (row, col, xf) = cell_header(record)?;
                let data = need(record, 8)?;
                let value = if data[7] != 0 {
                    CellValue::Error(data[6])
                } else {
                    CellValue::Bool(data[6] != 0)
                };
                cells.push(RawCell { row, col, xf, value });
            }
            FORMULA => {
                let (row, col, xf) = cell_header(record)?;
                let data = need(record, 14)?;
                let result = &data[6..14];
                let value = if result[6] == 0xFF && result[7] == 0xFF {
                    match result[0] {
                        0x00 => {
                            pending = Some(cells.len());
                            CellValue::Empty
                        }
                        0x01 => CellValue::Bool(result[2] != 0),
                        0x02 => CellValue::Error(result[2]),
                        _ => CellValue::Empty,
                    }
                } else {
                    let mut raw = [0u8; 8];
                    raw.copy_from_slice(result);
                    CellValue::Number(f64::from_le_bytes(raw))
                };
                cells.push(RawCell { row, col, xf, value });
            }
            STRING => {
                if let Some(index) = pending.take() {
                    let data = need(record, 3)?;
                    let cch = u16_at(data, 0) as usize;
                    let text = decode_chars(&data[3..], cch, data[2] & 0x01 != 0).ok_or(
                        WorkbookError::Truncated {
                            offset: record.offset,
                        },
                    )?;
                    cells[index].value = CellValue::Text(text);
                }
            }
            _ => {}
        }
    }

    Ok(cells)
}

/// Row, column and XF index shared by single-cell records
fn cell_header(record: &Record<'_>) -> Result<(u16, u16, u16), WorkbookError> {
    let data = need(record, 6)?;
    Ok((u16_at(data, 0), u16_at(data, 2), u16_at(data, 4)))
}

/// Column `n` places after `first` in a multi-cell record
fn column(record: &Record<'_>, first: u16, n: usize) -> Result<u16, WorkbookError> {
    u16::try_from(n)
        .ok()
        .and_then(|n| first.checked_add(n))
        .ok_or_else(|| {
            WorkbookError::Malformed(format!(
                "column overflow in record at offset {}",
                record.offset
            ))
        })
}

fn need<'a>(record: &Record<'a>, len: usize) -> Result<&'a [u8], WorkbookError> {
    if record.data.len() < len {
        return Err(WorkbookError::Truncated {
            offset: record.offset,
        });
    }
    Ok(record.data)
}

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Decode an RK packed number
pub(crate) fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };
    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}

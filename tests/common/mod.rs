//! Fixture writers shared by the integration tests.
//!
//! Quiz workbooks are real OLE2 files holding a minimal BIFF8 stream, so the
//! tests exercise the same reader the converter uses on disk.

#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// XF index of plain answer cells (the quiz template's default)
pub const PLAIN_XF: u16 = 21;

/// XF index of highlighted answer cells
pub const MARKED_XF: u16 = 22;

/// XF index of an unfilled format that is not the template's plain one
pub const OTHER_XF: u16 = 15;

const XF_COUNT: u16 = 23;

/// One row of column A: text and whether it is highlighted
pub type Row<'a> = Option<(&'a str, bool)>;

fn record(out: &mut Vec<u8>, kind: u16, data: &[u8]) {
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(substream: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x0600u16.to_le_bytes());
    data.extend_from_slice(&substream.to_le_bytes());
    data.extend_from_slice(&[0u8; 12]);
    data
}

fn xf(filled: bool) -> Vec<u8> {
    let mut data = vec![0u8; 20];
    if filled {
        // Solid fill, pattern color 13 (yellow) on the system background
        data[14..18].copy_from_slice(&(1u32 << 26).to_le_bytes());
        data[18..20].copy_from_slice(&(13u16 | (64 << 7)).to_le_bytes());
    }
    data
}

fn sst(strings: &[String]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    for s in strings {
        let units: Vec<u16> = s.encode_utf16().collect();
        data.extend_from_slice(&(units.len() as u16).to_le_bytes());
        data.push(0x01);
        for unit in units {
            data.extend_from_slice(&unit.to_le_bytes());
        }
    }
    data
}

fn boundsheet(offset: u32, name: &str) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&offset.to_le_bytes());
    data.push(0x00); // visible
    data.push(0x00); // worksheet
    data.push(name.len() as u8);
    data.push(0x00); // compressed chars
    data.extend_from_slice(name.as_bytes());
    data
}

fn cell(row: u16, xf: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&row.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&xf.to_le_bytes());
    data
}

/// BIFF8 workbook stream with one sheet whose column A holds `rows`
pub fn workbook_stream(rows: &[Row<'_>]) -> Vec<u8> {
    let cells: Vec<Option<(&str, u16)>> = rows
        .iter()
        .map(|row| row.map(|(text, marked)| (text, if marked { MARKED_XF } else { PLAIN_XF })))
        .collect();
    workbook_stream_with_xf(&cells)
}

/// Like [`workbook_stream`], with an explicit XF index per text cell
pub fn workbook_stream_with_xf(rows: &[Option<(&str, u16)>]) -> Vec<u8> {
    let strings: Vec<String> = rows
        .iter()
        .flatten()
        .map(|(text, _)| text.to_string())
        .collect();

    let mut globals = Vec::new();
    record(&mut globals, 0x0809, &bof(0x0005));
    for index in 0..XF_COUNT {
        record(&mut globals, 0x00E0, &xf(index == MARKED_XF));
    }
    record(&mut globals, 0x00FC, &sst(&strings));

    // BOUNDSHEET (4 + 8 + name) and EOF (4) follow before the sheet starts
    let name = "Hoja1";
    let sheet_offset = globals.len() + 4 + 8 + name.len() + 4;
    record(&mut globals, 0x0085, &boundsheet(sheet_offset as u32, name));
    record(&mut globals, 0x000A, &[]);
    assert_eq!(globals.len(), sheet_offset);

    let mut sheet = Vec::new();
    record(&mut sheet, 0x0809, &bof(0x0010));
    let mut isst = 0u32;
    for (row, entry) in rows.iter().enumerate() {
        match entry {
            Some((_, xf)) => {
                let mut data = cell(row as u16, *xf);
                data.extend_from_slice(&isst.to_le_bytes());
                record(&mut sheet, 0x00FD, &data);
                isst += 1;
            }
            None => record(&mut sheet, 0x0201, &cell(row as u16, PLAIN_XF)),
        }
    }
    record(&mut sheet, 0x000A, &[]);

    globals.extend_from_slice(&sheet);
    globals
}

/// Write an `.xls` compound file holding `stream` as its Workbook stream
pub fn write_workbook_stream(path: &Path, stream: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut compound = cfb::create(path).unwrap();
    {
        let mut out = compound.create_stream("/Workbook").unwrap();
        out.write_all(stream).unwrap();
        out.flush().unwrap();
    }
    compound.flush().unwrap();
}

/// Write a quiz workbook whose column A holds `rows`
pub fn write_quiz(path: &Path, rows: &[Row<'_>]) {
    write_workbook_stream(path, &workbook_stream(rows));
}

/// Write a quiz workbook with an explicit XF index per text cell
pub fn write_quiz_with_xf(path: &Path, rows: &[Option<(&str, u16)>]) {
    write_workbook_stream(path, &workbook_stream_with_xf(rows));
}

/// Write a zip package with the given entries
pub fn write_package(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (entry, data) in entries {
        zip.start_file(*entry, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Write a placeholder document
pub fn write_pdf(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"%PDF-1.4\n%%EOF\n").unwrap();
    path.to_path_buf()
}

//! Row sources feeding the accumulator.
//!
//! Every source yields a header row and a single-pass iterator over the
//! remaining rows. Workbooks (xlsx, xlsm, xlsb, xls, ods) go through
//! `calamine`, CSV files through the `csv` crate, and tests build one
//! straight from memory.

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;
use std::path::Path;

use crate::cell::Cell;
use crate::error::{ChunkError, Result};

type RowIter = Box<dyn Iterator<Item = Result<Vec<Cell>>>>;

pub struct SheetRows {
    pub header: Vec<Cell>,
    rows: RowIter,
}

impl SheetRows {
    pub fn from_rows(header: Vec<Cell>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            header,
            rows: Box::new(rows.into_iter().map(Ok::<_, ChunkError>)),
        }
    }

    /// Splits into header and row iterator for [`crate::ShardAccumulator::ingest`].
    pub fn into_parts(self) -> (Vec<Cell>, RowIter) {
        (self.header, self.rows)
    }
}

impl Iterator for SheetRows {
    type Item = Result<Vec<Cell>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

/// Opens `path` as CSV when it has a `.csv` extension, as a workbook otherwise.
pub fn open_path<P: AsRef<Path>>(path: P, sheet: &str) -> Result<SheetRows> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        debug!("Reading {:?} as CSV, sheet {:?} ignored", path, sheet);
        open_csv(path)
    } else {
        open_workbook(path, sheet)
    }
}

/// Reads `sheet` from a workbook.
///
/// The workbook itself is closed before this returns; only the sheet's
/// cell range is kept.
pub fn open_workbook<P: AsRef<Path>>(path: P, sheet: &str) -> Result<SheetRows> {
    let range = {
        let mut workbook = open_workbook_auto(path.as_ref())?;
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Err(ChunkError::SheetNotFound(sheet.to_string()));
        }
        workbook.worksheet_range(sheet)?
    };

    let (height, width) = range.get_size();
    if height == 0 {
        return Err(ChunkError::MissingHeader);
    }
    debug!("Sheet {:?}: {} rows x {} columns", sheet, height, width);

    let header = (0..width)
        .map(|c| range.get((0, c)).map_or(Cell::Empty, data_to_cell))
        .collect();

    let rows = (1..height).map(move |r| {
        Ok::<_, ChunkError>(
            (0..width)
                .map(|c| range.get((r, c)).map_or(Cell::Empty, data_to_cell))
                .collect::<Vec<Cell>>(),
        )
    });

    Ok(SheetRows {
        header,
        rows: Box::new(rows),
    })
}

/// Reads a CSV file whose first line is the header.
pub fn open_csv<P: AsRef<Path>>(path: P) -> Result<SheetRows> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.into_records();

    let header = match records.next() {
        Some(rec) => rec?.iter().map(Cell::from).collect(),
        None => return Err(ChunkError::MissingHeader),
    };

    let rows = records.map(|rec| {
        rec.map(|r| r.iter().map(Cell::parse).collect::<Vec<Cell>>())
            .map_err(ChunkError::from)
    });

    Ok(SheetRows {
        header,
        rows: Box::new(rows),
    })
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Workbooks store every number as a float; whole values come back as
/// integers so `1234567.0` is written as `1234567`.
fn float_cell(f: f64) -> Cell {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if f.fract() == 0.0 && f.abs() < MAX_EXACT {
        Cell::Int(f as i64)
    } else {
        Cell::Float(f)
    }
}

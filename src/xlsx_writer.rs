use std::path::Path;

use log::debug;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::record::{columns, Record};

pub const ID_COLUMN: &str = "id";

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to write the workbook: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("Too many columns for a worksheet: {0}")]
    TooManyColumns(usize),
    #[error("Too many rows for a worksheet: {0}")]
    TooManyRows(usize),
}

/// Persists a dataset as one table whose first column is the 1-based row id.
pub trait DatasetWriter {
    fn write(&mut self, path: &Path, records: &[Record]) -> Result<(), WriteError>;
}

impl<W: DatasetWriter + ?Sized> DatasetWriter for &mut W {
    fn write(&mut self, path: &Path, records: &[Record]) -> Result<(), WriteError> {
        (**self).write(path, records)
    }
}

#[derive(Clone, Copy, Default, Debug)]
pub struct XlsxWriter;

impl DatasetWriter for XlsxWriter {
    fn write(&mut self, path: &Path, records: &[Record]) -> Result<(), WriteError> {
        let columns = columns(records);
        let max_col = u16::try_from(columns.len())
            .map_err(|_| WriteError::TooManyColumns(columns.len()))?;
        u32::try_from(records.len()).map_err(|_| WriteError::TooManyRows(records.len()))?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let header = Format::new().set_bold();
        worksheet.write_string_with_format(0, 0, ID_COLUMN, &header)?;
        for (col, label) in (1..=max_col).zip(&columns) {
            worksheet.write_string_with_format(0, col, *label, &header)?;
        }
        for (row, record) in (1u32..).zip(records) {
            worksheet.write_number(row, 0, row)?;
            for (label, value) in record.iter() {
                if let Some(index) = columns.get_index_of(label) {
                    // Column 0 is the id.
                    worksheet.write_string(row, index as u16 + 1, value)?;
                }
            }
        }
        workbook.save(path)?;
        debug!("Wrote {} rows to {:?}", records.len(), path);
        Ok(())
    }
}

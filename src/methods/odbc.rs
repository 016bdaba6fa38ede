//! Driver-manager fetch paths built on odbc-api

use arrow_odbc::odbc_api::{
    self, buffers::TextRowSet, environment, ConnectionOptions, Cursor, ResultSetMetadata,
};

use crate::connection::ConnectionDescriptor;
use crate::error::FetchError;

use super::AccessMethod;

const KIND: &str = "odbc";

/// Rows fetched per bulk round trip in the columnar variant.
const ROWS_PER_BATCH: usize = 1024;
/// Upper bound for a single text field; longer values are truncated by the
/// driver, which is fine for throughput measurement.
const MAX_TEXT_BYTES: usize = 4096;

/// Classic driver loop: advance the cursor one row at a time and read
/// every column into a text buffer.
pub struct OdbcRowwiseFetch;

impl AccessMethod for OdbcRowwiseFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        row_wise(query, descriptor).map_err(|e| FetchError::new(KIND, e.to_string()))
    }
}

fn row_wise(query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, odbc_api::Error> {
    let connection = environment()?
        .connect_with_connection_string(&descriptor.odbc_string(), ConnectionOptions::default())?;

    let mut rows = 0u64;
    if let Some(mut cursor) = connection.execute(query, ())? {
        let columns = cursor.num_result_cols()? as u16;
        let mut field = Vec::new();
        while let Some(mut row) = cursor.next_row()? {
            for column in 1..=columns {
                row.get_text(column, &mut field)?;
            }
            rows += 1;
        }
    }
    Ok(rows)
}

/// Bulk fetch into pre-bound columnar text buffers, the driver's native
/// columnar form with no further conversion step.
pub struct OdbcColumnarFetch;

impl AccessMethod for OdbcColumnarFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        columnar(query, descriptor).map_err(|e| FetchError::new(KIND, e.to_string()))
    }
}

fn columnar(query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, odbc_api::Error> {
    let connection = environment()?
        .connect_with_connection_string(&descriptor.odbc_string(), ConnectionOptions::default())?;

    let mut rows = 0u64;
    if let Some(mut cursor) = connection.execute(query, ())? {
        let mut buffers = TextRowSet::for_cursor(ROWS_PER_BATCH, &mut cursor, Some(MAX_TEXT_BYTES))?;
        let mut row_set_cursor = cursor.bind_buffer(&mut buffers)?;
        while let Some(batch) = row_set_cursor.fetch()? {
            rows += batch.num_rows() as u64;
        }
    }
    Ok(rows)
}

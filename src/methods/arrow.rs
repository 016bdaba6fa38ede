//! Columnar transfer through arrow-odbc

use arrow_odbc::arrow::compute::concat_batches;
use arrow_odbc::arrow::record_batch::RecordBatchReader;
use arrow_odbc::odbc_api::{self, environment, ConnectionOptions};
use arrow_odbc::OdbcReaderBuilder;

use crate::connection::ConnectionDescriptor;
use crate::error::FetchError;

use super::AccessMethod;

const KIND: &str = "arrow-odbc";

fn fetch_error(e: impl std::fmt::Display) -> FetchError {
    FetchError::new(KIND, e.to_string())
}

/// Concurrent columnar transfer: the reader keeps a dedicated thread
/// filling ODBC buffers while the calling thread converts finished
/// buffers into Arrow record batches.
pub struct ArrowConcurrentFetch;

impl AccessMethod for ArrowConcurrentFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        let connection = environment()
            .map_err(fetch_error)?
            .connect_with_connection_string(&descriptor.odbc_string(), ConnectionOptions::default())
            .map_err(fetch_error)?;

        // The fetch thread takes ownership of the statement, so the cursor
        // must own its connection rather than borrow it.
        let cursor = connection
            .into_cursor(query, ())
            .map_err(odbc_api::Error::from)
            .map_err(fetch_error)?
            .ok_or_else(|| FetchError::new(KIND, "statement produced no result set"))?;

        let reader = OdbcReaderBuilder::new()
            .build(cursor)
            .map_err(fetch_error)?
            .into_concurrent()
            .map_err(fetch_error)?;

        let mut rows = 0u64;
        for batch in reader {
            rows += batch.map_err(fetch_error)?.num_rows() as u64;
        }
        Ok(rows)
    }
}

/// Sequential columnar transfer with an explicit conversion step: every
/// record batch is read, then all batches are concatenated into a single
/// consolidated table.
pub struct ArrowConsolidatedFetch;

impl AccessMethod for ArrowConsolidatedFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        let connection = environment()
            .map_err(fetch_error)?
            .connect_with_connection_string(&descriptor.odbc_string(), ConnectionOptions::default())
            .map_err(fetch_error)?;

        let cursor = connection
            .execute(query, ())
            .map_err(fetch_error)?
            .ok_or_else(|| FetchError::new(KIND, "statement produced no result set"))?;

        let reader = OdbcReaderBuilder::new().build(cursor).map_err(fetch_error)?;
        let schema = reader.schema();

        let mut batches = Vec::new();
        for batch in reader {
            batches.push(batch.map_err(fetch_error)?);
        }
        let table = concat_batches(&schema, batches.iter()).map_err(fetch_error)?;
        Ok(table.num_rows() as u64)
    }
}

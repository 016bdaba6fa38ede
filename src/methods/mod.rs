//! Access-method strategies: the fetch paths under comparison

mod arrow;
mod odbc;
mod tds;

use serde::Deserialize;
use strum::{Display, EnumString};

use crate::connection::ConnectionDescriptor;
use crate::error::FetchError;

pub use arrow::{ArrowConcurrentFetch, ArrowConsolidatedFetch};
pub use odbc::{OdbcColumnarFetch, OdbcRowwiseFetch};
pub use tds::{TiberiusPooledFetch, TiberiusQueryFetch};

/// One way of retrieving a query's result set.
///
/// `fetch` returns the number of rows materialized, or a structured
/// failure. Implementations catch every error from their underlying
/// library and must release any connection or engine handle they opened
/// before returning, on both paths. They never panic on fetch failure, so
/// one bad cell cannot abort the benchmark matrix.
pub trait AccessMethod {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError>;
}

/// Strategy keys accepted in the `methods` section of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// ODBC cursor, one row at a time, each column into a text buffer.
    OdbcRowwise,
    /// ODBC bulk fetch into pre-bound columnar text buffers.
    OdbcColumnar,
    /// arrow-odbc concurrent reader: fetching and Arrow conversion on
    /// separate threads.
    ArrowConcurrent,
    /// arrow-odbc sequential reader, batches concatenated into one table.
    ArrowConsolidated,
    /// Native TDS client over its own TCP connection.
    TiberiusQuery,
    /// bb8 connection pool in front of the TDS client.
    TiberiusPooled,
}

/// Dispatch table from strategy key to implementation.
pub fn build(strategy: Strategy) -> Box<dyn AccessMethod> {
    match strategy {
        Strategy::OdbcRowwise => Box::new(OdbcRowwiseFetch),
        Strategy::OdbcColumnar => Box::new(OdbcColumnarFetch),
        Strategy::ArrowConcurrent => Box::new(ArrowConcurrentFetch),
        Strategy::ArrowConsolidated => Box::new(ArrowConsolidatedFetch),
        Strategy::TiberiusQuery => Box::new(TiberiusQueryFetch),
        Strategy::TiberiusPooled => Box::new(TiberiusPooledFetch),
    }
}

/// Keep only the final `limit` characters of a long diagnostic string.
pub(crate) fn tail(text: &str, limit: usize) -> &str {
    match text.char_indices().nth_back(limit.saturating_sub(1)) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_keys_round_trip() {
        for (key, strategy) in [
            ("odbc_rowwise", Strategy::OdbcRowwise),
            ("odbc_columnar", Strategy::OdbcColumnar),
            ("arrow_concurrent", Strategy::ArrowConcurrent),
            ("arrow_consolidated", Strategy::ArrowConsolidated),
            ("tiberius_query", Strategy::TiberiusQuery),
            ("tiberius_pooled", Strategy::TiberiusPooled),
        ] {
            assert_eq!(key.parse::<Strategy>().unwrap(), strategy);
            assert_eq!(strategy.to_string(), key);
        }
    }

    #[test]
    fn every_strategy_has_an_implementation() {
        for strategy in [
            Strategy::OdbcRowwise,
            Strategy::OdbcColumnar,
            Strategy::ArrowConcurrent,
            Strategy::ArrowConsolidated,
            Strategy::TiberiusQuery,
            Strategy::TiberiusPooled,
        ] {
            let _ = build(strategy);
        }
    }

    #[test]
    fn tail_truncates_from_the_front() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
        assert_eq!(tail("", 3), "");
    }
}

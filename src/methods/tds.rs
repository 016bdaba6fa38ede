//! Native TDS fetch paths built on tiberius

use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio::runtime;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::connection::ConnectionDescriptor;
use crate::error::FetchError;

use super::{tail, AccessMethod};

const KIND: &str = "tiberius";
const POOL_KIND: &str = "pool";

/// Diagnostics budget for the nested error chain these clients produce.
const TRACE_TAIL: usize = 200;

const POOL_SIZE: u32 = 2;

fn client_config(descriptor: &ConnectionDescriptor) -> Config {
    let mut config = Config::new();
    config.host(&descriptor.server);
    config.port(descriptor.port);
    config.database(&descriptor.database);
    config.authentication(AuthMethod::sql_server(&descriptor.user, &descriptor.password));
    config.trust_cert();
    config
}

/// tiberius surfaces protocol, TLS and IO failures nested inside one
/// another; keep the display message plus the tail of the debug chain.
fn tds_error(e: tiberius::error::Error) -> FetchError {
    let chain = format!("{e:?}");
    FetchError::new(KIND, format!("{e} | {}", tail(&chain, TRACE_TAIL)))
}

fn blocking_runtime() -> Result<runtime::Runtime, FetchError> {
    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| FetchError::new(KIND, e.to_string()))
}

/// High-level native client: tiberius manages its own TCP connection and
/// protocol state, the harness only hands it a query.
pub struct TiberiusQueryFetch;

impl AccessMethod for TiberiusQueryFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        // A current-thread runtime per invocation keeps cells strictly
        // sequential and guarantees the connection dies with the call.
        let rt = blocking_runtime()?;
        rt.block_on(query_native(query, descriptor)).map_err(tds_error)
    }
}

async fn query_native(
    query: &str,
    descriptor: &ConnectionDescriptor,
) -> Result<u64, tiberius::error::Error> {
    let config = client_config(descriptor);
    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;

    let mut client = Client::connect(config, tcp.compat_write()).await?;
    let results = client.simple_query(query).await?.into_results().await?;
    Ok(results.iter().map(|result_set| result_set.len() as u64).sum())
}

/// Pooling engine layer: a bb8 pool is built, one connection is checked
/// out for the query, and the whole pool is torn down before returning.
pub struct TiberiusPooledFetch;

impl AccessMethod for TiberiusPooledFetch {
    fn fetch(&self, query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
        let rt = blocking_runtime()?;
        rt.block_on(query_pooled(query, descriptor))
    }
}

async fn query_pooled(query: &str, descriptor: &ConnectionDescriptor) -> Result<u64, FetchError> {
    let manager = bb8_tiberius::ConnectionManager::build(client_config(descriptor))
        .map_err(|e| FetchError::new(POOL_KIND, e.to_string()))?;
    let pool = bb8::Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .await
        .map_err(|e| FetchError::new(POOL_KIND, e.to_string()))?;

    let mut client = pool
        .get()
        .await
        .map_err(|e| FetchError::new(POOL_KIND, e.to_string()))?;
    let results = client
        .simple_query(query)
        .await
        .map_err(tds_error)?
        .into_results()
        .await
        .map_err(tds_error)?;
    Ok(results.iter().map(|result_set| result_set.len() as u64).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::DEFAULT_DRIVER;

    fn unreachable_descriptor() -> ConnectionDescriptor {
        // Port 1 refuses immediately on any sane host; no server needed.
        ConnectionDescriptor {
            server: "127.0.0.1".into(),
            database: "nope".into(),
            user: "u".into(),
            password: "p".into(),
            port: 1,
            driver: DEFAULT_DRIVER.into(),
        }
    }

    #[test]
    fn unreachable_host_yields_error_value_not_panic() {
        let err = TiberiusQueryFetch
            .fetch("SELECT 1", &unreachable_descriptor())
            .unwrap_err();
        assert_eq!(err.kind, KIND);
        assert!(!err.message.is_empty());
    }

    // The pooled variant is not exercised against an unreachable host
    // here: bb8 retries failed connects until its checkout timeout, which
    // would stall the unit suite for ~30s. tests/harness.rs covers it
    // behind #[ignore].
}

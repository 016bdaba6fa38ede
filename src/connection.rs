//! Connection parameters resolved once per run from the environment

use std::env;
use std::fmt;

use crate::error::BenchError;

pub const DEFAULT_PORT: u16 = 1433;
pub const DEFAULT_DRIVER: &str = "ODBC Driver 17 for SQL Server";

/// Connection parameters shared read-only by every access method.
///
/// Resolved from the environment exactly once at startup; individual
/// methods render it into whatever string or client config their library
/// expects. `Debug` redacts the password so the descriptor can appear in
/// logs and error messages.
#[derive(Clone)]
pub struct ConnectionDescriptor {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub driver: String,
}

impl ConnectionDescriptor {
    pub fn from_env() -> Result<Self, BenchError> {
        let server = required("MSSQL_SERVER")?;
        let database = required("MSSQL_DB")?;
        let user = required("MSSQL_USER")?;
        let password = required("MSSQL_PWD")?;
        let port = match env::var("MSSQL_PORT") {
            Ok(raw) => raw.parse().map_err(|_| {
                BenchError::Config(format!("MSSQL_PORT is not a valid port number: {raw:?}"))
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let driver = env::var("MSSQL_DRIVER").unwrap_or_else(|_| DEFAULT_DRIVER.to_string());

        Ok(Self {
            server,
            database,
            user,
            password,
            port,
            driver,
        })
    }

    /// ODBC attribute-list form, consumed by the driver-manager based
    /// fetch paths.
    pub fn odbc_string(&self) -> String {
        format!(
            "DRIVER={{{}}};SERVER={},{};DATABASE={};UID={};PWD={};\
             Trusted_Connection=no;MARS_Connection=yes",
            self.driver, self.server, self.port, self.database, self.user, self.password
        )
    }

    /// True when the target server is this machine.
    pub fn is_local(&self) -> bool {
        matches!(
            self.server.to_lowercase().as_str(),
            "localhost" | "127.0.0.1" | "." | "(local)"
        )
    }
}

fn required(name: &str) -> Result<String, BenchError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| BenchError::Config(format!("{name} is not set")))
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("driver", &self.driver)
            .finish()
    }
}

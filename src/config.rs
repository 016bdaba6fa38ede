//! Benchmark matrix configuration

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BenchError;
use crate::methods::Strategy;

/// Environment variable naming the table every scenario reads from.
pub const TABLE_VAR: &str = "SQL_BENCHMARK_TABLE";

/// One point in the test matrix: fetch `row_count` rows, `runs` times.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub row_count: u64,
    pub runs: u32,
}

/// One access method to exercise, under a display name of the user's choice.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    /// Always overridden from `SQL_BENCHMARK_TABLE` at load time.
    #[serde(default)]
    pub table_name: String,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub csv_file: PathBuf,
}

/// The declarative scenario/method matrix, loaded from YAML.
#[derive(Debug, Deserialize)]
pub struct BenchConfig {
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub test_scenarios: Vec<ScenarioSpec>,
    pub methods: Vec<MethodSpec>,
}

impl BenchConfig {
    /// Read and validate the configuration file, resolving the benchmark
    /// table from the environment. Any failure here is fatal; nothing has
    /// executed yet.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let text = fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let mut config = Self::parse(&text)?;

        config.database.table_name = env::var(TABLE_VAR)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BenchError::Config(format!("{TABLE_VAR} is not set")))?;

        tracing::debug!(
            scenarios = config.test_scenarios.len(),
            methods = config.methods.len(),
            table = %config.database.table_name,
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, BenchError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| BenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BenchError> {
        for scenario in &self.test_scenarios {
            if scenario.row_count == 0 || scenario.runs == 0 {
                return Err(BenchError::Config(format!(
                    "scenario {:?} must have positive row_count and runs",
                    scenario.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
database:
  table_name: ""
output:
  csv_file: results.csv
test_scenarios:
  - { name: small, row_count: 1000, runs: 3 }
  - { name: large, row_count: 500000, runs: 2 }
methods:
  - { name: "ODBC row-wise", strategy: odbc_rowwise }
  - { name: "Arrow concurrent", strategy: arrow_concurrent }
"#;

    #[test]
    fn parses_matrix_in_declared_order() {
        let config = BenchConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.output.csv_file, PathBuf::from("results.csv"));
        assert_eq!(config.test_scenarios.len(), 2);
        assert_eq!(config.test_scenarios[0].name, "small");
        assert_eq!(config.test_scenarios[1].row_count, 500_000);
        assert_eq!(config.methods[0].strategy, Strategy::OdbcRowwise);
        assert_eq!(config.methods[1].strategy, Strategy::ArrowConcurrent);
    }

    #[test]
    fn rejects_zero_sized_scenario() {
        let bad = SAMPLE.replace("row_count: 1000", "row_count: 0");
        let err = BenchConfig::parse(&bad).unwrap_err();
        assert!(err.to_string().contains("small"));
    }

    #[test]
    fn rejects_unknown_strategy() {
        let bad = SAMPLE.replace("odbc_rowwise", "carrier_pigeon");
        assert!(BenchConfig::parse(&bad).is_err());
    }

    #[test]
    fn load_requires_table_env() {
        // Exercise both branches in one test; env vars are process-wide.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        env::remove_var(TABLE_VAR);
        let err = BenchConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains(TABLE_VAR));

        env::set_var(TABLE_VAR, "dbo.bench_rows");
        let config = BenchConfig::load(&path).unwrap();
        assert_eq!(config.database.table_name, "dbo.bench_rows");
        env::remove_var(TABLE_VAR);
    }
}

//! Matrix executor: scenarios × methods × runs

use std::io::Write;

use serde::Serialize;

use crate::config::{BenchConfig, MethodSpec, ScenarioSpec};
use crate::connection::ConnectionDescriptor;
use crate::environment::SessionInfo;
use crate::methods::{self, AccessMethod};
use crate::monitor::{Measurement, PerformanceMonitor};
use crate::query;

/// One persisted measurement. Field order defines the CSV column order.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub timestamp: String,
    pub scenario: String,
    pub method: String,
    pub row_count: u64,
    pub run_number: u32,
    pub duration_seconds: f64,
    pub memory_peak_mb: f64,
    pub memory_delta_mb: f64,
    pub rows_returned: u64,
    pub success: bool,
    pub error: Option<String>,
    pub platform: String,
    pub rustc_version: String,
    pub cpu_count: usize,
    pub memory_gb: f64,
    pub sql_server_host: String,
    pub network_context: String,
}

/// A method spec resolved to its implementation.
pub struct BoundMethod {
    pub name: String,
    pub method: Box<dyn AccessMethod>,
}

/// Resolve every configured method through the strategy dispatch table.
pub fn bind(specs: &[MethodSpec]) -> Vec<BoundMethod> {
    specs
        .iter()
        .map(|spec| {
            tracing::debug!(name = %spec.name, strategy = %spec.strategy, "method bound");
            BoundMethod {
                name: spec.name.clone(),
                method: methods::build(spec.strategy),
            }
        })
        .collect()
}

/// Drives the full benchmark matrix: strictly sequential, single pass, no
/// retries. A failing cell is recorded and the matrix continues.
pub struct BenchmarkRunner<'a> {
    table_name: &'a str,
    scenarios: &'a [ScenarioSpec],
    descriptor: &'a ConnectionDescriptor,
    session: &'a SessionInfo,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(
        config: &'a BenchConfig,
        descriptor: &'a ConnectionDescriptor,
        session: &'a SessionInfo,
    ) -> Self {
        Self {
            table_name: &config.database.table_name,
            scenarios: &config.test_scenarios,
            descriptor,
            session,
        }
    }

    pub fn run(&self, methods: &[BoundMethod]) -> Vec<ResultRecord> {
        let mut records = Vec::new();

        for scenario in self.scenarios {
            println!(
                "\nTesting scenario: {} ({} rows)",
                scenario.name, scenario.row_count
            );

            for bound in methods {
                println!("  Method: {}", bound.name);

                for run in 1..=scenario.runs {
                    // Successive runs page through disjoint row windows so
                    // the server cannot serve the identical query from cache.
                    let offset = u64::from(run - 1) * scenario.row_count;
                    let sql = query::paginated_select(self.table_name, scenario.row_count, offset);

                    print!("    Run {run}/{} ... ", scenario.runs);
                    let _ = std::io::stdout().flush();

                    let monitor = PerformanceMonitor::start();
                    let outcome = bound.method.fetch(&sql, self.descriptor);
                    let measurement = monitor.stop();

                    match &outcome {
                        Ok(_) => println!("{:.2}s", measurement.duration_seconds),
                        Err(e) => println!("FAILED: {e}"),
                    }

                    records.push(self.record(scenario, &bound.name, run, measurement, outcome));
                }
            }
        }

        records
    }

    fn record(
        &self,
        scenario: &ScenarioSpec,
        method_name: &str,
        run_number: u32,
        measurement: Measurement,
        outcome: Result<u64, crate::error::FetchError>,
    ) -> ResultRecord {
        ResultRecord {
            timestamp: self.session.timestamp.clone(),
            scenario: scenario.name.clone(),
            method: method_name.to_string(),
            row_count: scenario.row_count,
            run_number,
            duration_seconds: measurement.duration_seconds,
            memory_peak_mb: measurement.memory_peak_mb,
            memory_delta_mb: measurement.memory_delta_mb,
            rows_returned: *outcome.as_ref().unwrap_or(&0),
            success: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
            platform: self.session.platform.clone(),
            rustc_version: self.session.rustc_version.clone(),
            cpu_count: self.session.cpu_count,
            memory_gb: self.session.memory_gb,
            sql_server_host: self.session.sql_server_host.clone(),
            network_context: self.session.network_context.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::*;
    use crate::connection::DEFAULT_DRIVER;
    use crate::error::FetchError;

    /// Scripted stand-in for a real fetch path: records every query it
    /// receives and fails on demand.
    struct ScriptedMethod {
        rows: u64,
        fail: bool,
        queries: Rc<RefCell<Vec<String>>>,
    }

    impl ScriptedMethod {
        fn ok(rows: u64) -> Self {
            Self {
                rows,
                fail: false,
                queries: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                rows: 0,
                fail: true,
                queries: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl AccessMethod for ScriptedMethod {
        fn fetch(&self, sql: &str, _: &ConnectionDescriptor) -> Result<u64, FetchError> {
            self.queries.borrow_mut().push(sql.to_string());
            if self.fail {
                Err(FetchError::new("scripted", "deliberate failure"))
            } else {
                Ok(self.rows)
            }
        }
    }

    fn fixture() -> (BenchConfig, ConnectionDescriptor) {
        let config = BenchConfig::parse(
            r#"
database:
  table_name: dbo.bench
output:
  csv_file: out.csv
test_scenarios:
  - { name: tiny, row_count: 10, runs: 3 }
  - { name: mid, row_count: 100, runs: 2 }
methods:
  - { name: a, strategy: odbc_rowwise }
  - { name: b, strategy: tiberius_query }
"#,
        )
        .unwrap();
        let descriptor = ConnectionDescriptor {
            server: "localhost".into(),
            database: "bench".into(),
            user: "sa".into(),
            password: "pw".into(),
            port: 1433,
            driver: DEFAULT_DRIVER.into(),
        };
        (config, descriptor)
    }

    fn runner_records(
        config: &BenchConfig,
        descriptor: &ConnectionDescriptor,
        methods: Vec<BoundMethod>,
    ) -> Vec<ResultRecord> {
        let session = SessionInfo::collect(descriptor);
        BenchmarkRunner::new(config, descriptor, &session).run(&methods)
    }

    #[test]
    fn produces_runs_times_methods_records_per_scenario() {
        let (config, descriptor) = fixture();
        let methods = vec![
            BoundMethod {
                name: "a".into(),
                method: Box::new(ScriptedMethod::ok(10)),
            },
            BoundMethod {
                name: "b".into(),
                method: Box::new(ScriptedMethod::failing()),
            },
        ];
        let records = runner_records(&config, &descriptor, methods);

        // (3 + 2 runs) × 2 methods
        assert_eq!(records.len(), 10);

        // run_number unique within each (scenario, method) pair and in range.
        let mut seen = HashSet::new();
        for r in &records {
            assert!(r.run_number >= 1);
            assert!(seen.insert((r.scenario.clone(), r.method.clone(), r.run_number)));
        }
        for r in records.iter().filter(|r| r.scenario == "tiny") {
            assert!(r.run_number <= 3);
        }
    }

    #[test]
    fn failures_are_recorded_and_do_not_abort_the_matrix() {
        let (config, descriptor) = fixture();
        let methods = vec![
            BoundMethod {
                name: "a".into(),
                method: Box::new(ScriptedMethod::failing()),
            },
            BoundMethod {
                name: "b".into(),
                method: Box::new(ScriptedMethod::ok(42)),
            },
        ];
        let records = runner_records(&config, &descriptor, methods);

        let failed: Vec<_> = records.iter().filter(|r| !r.success).collect();
        let succeeded: Vec<_> = records.iter().filter(|r| r.success).collect();
        assert_eq!(failed.len(), 5);
        assert_eq!(succeeded.len(), 5);
        for r in &failed {
            assert_eq!(r.rows_returned, 0);
            let error = r.error.as_deref().unwrap();
            assert!(error.contains("deliberate failure"));
        }
        for r in &succeeded {
            assert_eq!(r.rows_returned, 42);
            assert!(r.error.is_none());
        }
    }

    #[test]
    fn runs_page_through_successive_windows() {
        let (config, descriptor) = fixture();
        let scripted = ScriptedMethod::ok(10);
        let queries = scripted.queries.clone();
        let methods = vec![BoundMethod {
            name: "a".into(),
            method: Box::new(scripted),
        }];
        let _ = runner_records(&config, &descriptor, methods);

        let queries = queries.borrow();
        // tiny: offsets 0, 10, 20; mid: offsets 0, 100.
        assert!(queries[0].contains("OFFSET 0 ROWS"));
        assert!(queries[1].contains("OFFSET 10 ROWS"));
        assert!(queries[2].contains("OFFSET 20 ROWS"));
        assert!(queries[3].contains("OFFSET 0 ROWS"));
        assert!(queries[4].contains("OFFSET 100 ROWS"));
    }

    #[test]
    fn repeated_runs_emit_the_same_matrix_columns() {
        let (config, descriptor) = fixture();
        let project = |records: &[ResultRecord]| -> Vec<(String, String, u64, u32)> {
            records
                .iter()
                .map(|r| (r.scenario.clone(), r.method.clone(), r.row_count, r.run_number))
                .collect()
        };

        let first = runner_records(
            &config,
            &descriptor,
            vec![BoundMethod {
                name: "a".into(),
                method: Box::new(ScriptedMethod::ok(10)),
            }],
        );
        let second = runner_records(
            &config,
            &descriptor,
            vec![BoundMethod {
                name: "a".into(),
                method: Box::new(ScriptedMethod::ok(10)),
            }],
        );

        assert_eq!(project(&first), project(&second));
    }

    #[test]
    fn session_metadata_is_copied_into_every_record() {
        let (config, descriptor) = fixture();
        let methods = vec![BoundMethod {
            name: "a".into(),
            method: Box::new(ScriptedMethod::ok(1)),
        }];
        let records = runner_records(&config, &descriptor, methods);
        for r in &records {
            assert_eq!(r.sql_server_host, "localhost");
            assert_eq!(r.network_context, "local");
            assert!(!r.timestamp.is_empty());
        }
    }
}

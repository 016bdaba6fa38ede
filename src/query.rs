//! Pagination query construction

/// Build the paginated SELECT executed by every benchmark cell.
///
/// `ORDER BY (SELECT NULL)` satisfies the OFFSET/FETCH syntax without
/// imposing a sort; row order is undefined, which is acceptable for
/// throughput measurement but not for correctness-sensitive pagination.
/// The table name comes from trusted configuration, so no quoting or
/// injection hardening is applied here.
pub fn paginated_select(table_name: &str, row_count: u64, offset: u64) -> String {
    format!(
        "SELECT * FROM {table_name} ORDER BY (SELECT NULL) \
         OFFSET {offset} ROWS FETCH NEXT {row_count} ROWS ONLY"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_contains_window() {
        let q = paginated_select("dbo.trades", 500, 1000);
        assert!(q.starts_with("SELECT * FROM dbo.trades"));
        assert!(q.contains("OFFSET 1000 ROWS"));
        assert!(q.contains("FETCH NEXT 500 ROWS ONLY"));
    }

    #[test]
    fn successive_runs_page_through_disjoint_windows() {
        // Offsets for consecutive runs must differ by exactly row_count.
        let n = 250;
        for run in 1u64..=4 {
            let q = paginated_select("t", n, (run - 1) * n);
            assert!(q.contains(&format!("OFFSET {} ROWS", (run - 1) * n)));
        }
    }

    #[test]
    fn zero_offset_is_valid_sql_server_syntax() {
        let q = paginated_select("t", 10, 0);
        assert!(q.contains("OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"));
    }
}

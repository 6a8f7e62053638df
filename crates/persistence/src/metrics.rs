//! Query metrics.
//!
//! Every repository call is timed and its outcome counted. No exporter is
//! installed here; the host process decides where metrics go.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of a database query.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("client_directory_query_duration_seconds", "query" => query_name)
        .record(duration_secs);
}

/// Count a failed database query.
pub fn record_query_error(query_name: &'static str) {
    counter!("client_directory_query_errors_total", "query" => query_name).increment(1);
}

/// Times a repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("delete_client");
/// let result = sqlx::query(...).execute(&pool).await;
/// timer.finish(&result);
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.query_name
    }

    /// Records the elapsed duration, and an error count if the operation failed.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        if result.is_err() {
            record_query_error(self.query_name);
        }
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}

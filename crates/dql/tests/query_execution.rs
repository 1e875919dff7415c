//! End-to-end checks: build a query and hand it to an executor.

use dql::{DqlError, DqlResult, Executor, Parameters, QueryBuilder};
use serde_json::json;
use std::sync::Mutex;

/// Records every statement it is asked to run and reports one affected row.
#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<(String, Parameters)>>,
}

impl RecordingExecutor {
    fn calls(&self) -> Vec<(String, Parameters)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Executor for RecordingExecutor {
    type Output = u64;

    fn execute(
        &self,
        dql: &str,
        params: &Parameters,
    ) -> impl std::future::Future<Output = DqlResult<u64>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((dql.to_string(), params.clone()));
        async { Ok(1) }
    }
}

/// Always fails.
struct FailingExecutor;

impl Executor for FailingExecutor {
    type Output = ();

    fn execute(
        &self,
        dql: &str,
        _params: &Parameters,
    ) -> impl std::future::Future<Output = DqlResult<()>> + Send {
        let message = format!("cannot run `{dql}`");
        async move { Err(DqlError::execution(message)) }
    }
}

#[tokio::test]
async fn test_execute_forwards_dql_and_parameters() {
    let executor = RecordingExecutor::default();
    let mut qb = QueryBuilder::new(&executor);
    qb.update("User", "u")
        .set("u.active", ":active")
        .where_("u.id = :id")
        .set_parameter("active", false)
        .set_parameter("id", 42);

    let affected = qb.get_query().execute().await.unwrap();
    assert_eq!(affected, 1);

    let calls = executor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "UPDATE User u SET u.active = :active WHERE u.id = :id");
    assert_eq!(calls[0].1.get("id"), Some(&json!(42)));
    assert_eq!(calls[0].1.get("active"), Some(&json!(false)));
}

#[tokio::test]
async fn test_execute_with_overrides_leaves_query_untouched() {
    let executor = RecordingExecutor::default();
    let mut qb = QueryBuilder::new(&executor);
    qb.delete("Session", "s")
        .where_("s.user = :user")
        .set_parameter("user", 1);
    let query = qb.get_query();

    let overrides: Parameters = [("user", 2)].into_iter().collect();
    query.execute_with(&overrides).await.unwrap();
    query.execute().await.unwrap();

    let calls = executor.calls();
    assert_eq!(calls[0].0, "DELETE FROM Session s WHERE s.user = :user");
    assert_eq!(calls[0].1.get("user"), Some(&json!(2)));
    assert_eq!(calls[1].1.get("user"), Some(&json!(1)));
    assert_eq!(query.parameters().get("user"), Some(&json!(1)));
}

#[tokio::test]
async fn test_context_is_forwarded_unchanged() {
    let executor = RecordingExecutor::default();
    let mut qb = QueryBuilder::new(&executor);
    qb.select("u").from("User", "u");

    let query = qb.get_query();
    assert!(std::ptr::eq(query.context(), &executor));
    assert!(std::ptr::eq(qb.context(), &executor));
    assert!(executor.calls().is_empty());
}

#[tokio::test]
async fn test_executor_errors_are_surfaced() {
    let executor = FailingExecutor;
    let mut qb = QueryBuilder::new(&executor);
    qb.select("u").from("User", "u");

    let err = qb.get_query().execute().await.unwrap_err();
    assert!(err.is_execution());
    assert_eq!(err.to_string(), "Execution error: cannot run `SELECT u FROM User u`");
}

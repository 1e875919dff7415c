//! Execution context trait.

use crate::error::DqlResult;
use crate::param::Parameters;

/// Something that can run a finished DQL statement.
///
/// This is the execution context a [`QueryBuilder`](crate::QueryBuilder) is
/// bound to. The builder only borrows it and forwards it to the produced
/// [`Query`](crate::Query); it never calls it while building.
pub trait Executor: Send + Sync {
    /// What a successful execution yields (rows, affected count, ...).
    type Output: Send;

    /// Execute `dql` with the given parameters.
    fn execute(
        &self,
        dql: &str,
        params: &Parameters,
    ) -> impl std::future::Future<Output = DqlResult<Self::Output>> + Send;
}

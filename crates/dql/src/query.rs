//! Finalized DQL query handed to an executor.

#[cfg(feature = "tracing")]
use crate::config::truncate_dql;
use crate::error::DqlResult;
use crate::executor::Executor;
use crate::param::Parameters;

/// A rendered DQL statement with its parameters and execution context.
///
/// Produced by [`QueryBuilder::get_query`](crate::QueryBuilder::get_query).
/// Later changes to the builder do not affect an existing `Query`.
///
/// # Example
///
/// ```ignore
/// let rows = qb
///     .select("u")
///     .from("User", "u")
///     .where_("u.id = :id")
///     .set_parameter("id", 7)
///     .get_query()
///     .execute()
///     .await?;
/// ```
pub struct Query<'c, C: ?Sized> {
    ctx: &'c C,
    dql: String,
    params: Parameters,
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    max_logged_dql: Option<usize>,
}

impl<'c, C: ?Sized> Query<'c, C> {
    pub(crate) fn new(
        ctx: &'c C,
        dql: String,
        params: Parameters,
        max_logged_dql: Option<usize>,
    ) -> Self {
        Self {
            ctx,
            dql,
            params,
            max_logged_dql,
        }
    }

    /// The DQL text.
    pub fn dql(&self) -> &str {
        &self.dql
    }

    /// The bound parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// The execution context this query was built against.
    pub fn context(&self) -> &'c C {
        self.ctx
    }
}

impl<C: Executor + ?Sized> Query<'_, C> {
    /// Execute with the bound parameters.
    pub async fn execute(&self) -> DqlResult<C::Output> {
        self.run(&self.params).await
    }

    /// Execute with the bound parameters merged with one-off `overrides`.
    pub async fn execute_with(&self, overrides: &Parameters) -> DqlResult<C::Output> {
        let params = self.params.merged(overrides);
        self.run(&params).await
    }

    async fn run(&self, params: &Parameters) -> DqlResult<C::Output> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            dql = truncate_dql(&self.dql, self.max_logged_dql),
            params = params.len(),
            "executing dql"
        );
        let result = self.ctx.execute(&self.dql, params).await;
        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::warn!(error = %err, "dql execution failed");
        }
        result
    }
}

impl<C: ?Sized> Clone for Query<'_, C> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            dql: self.dql.clone(),
            params: self.params.clone(),
            max_logged_dql: self.max_logged_dql,
        }
    }
}

impl<C: ?Sized> std::fmt::Debug for Query<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("dql", &self.dql)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

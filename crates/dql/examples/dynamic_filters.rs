//! Dynamic filter example for dql
//!
//! Run with: cargo run --example dynamic_filters -p dql
//!
//! Builds a user search from optional filters, then runs a bulk UPDATE and a
//! DELETE through a printing executor.

use dql::{DqlResult, Executor, Expr, Parameters, QueryBuilder};

/// Prints each statement instead of running it.
struct PrintExecutor;

impl Executor for PrintExecutor {
    type Output = ();

    fn execute(
        &self,
        dql: &str,
        params: &Parameters,
    ) -> impl std::future::Future<Output = DqlResult<()>> + Send {
        println!("DQL:    {dql}");
        for (key, value) in params.iter() {
            println!("  {key} = {value}");
        }
        async { Ok(()) }
    }
}

struct UserSearch<'a> {
    name: Option<&'a str>,
    min_age: Option<u32>,
    group_ids: Vec<i64>,
    include_admins: bool,
}

#[tokio::main]
async fn main() -> DqlResult<()> {
    let em = PrintExecutor;

    let search = UserSearch {
        name: Some("%ali%"),
        min_age: Some(18),
        group_ids: vec![3, 7],
        include_admins: true,
    };

    // ============================================
    // SELECT with optional filters
    // ============================================
    println!("=== Search ===");
    let mut qb = QueryBuilder::new(&em);
    qb.select(["u", "g"])
        .from("User", "u")
        .left_join("u", "groups", "g", None);

    if let Some(name) = search.name {
        qb.and_where(Expr::like("u.name", ":name"))
            .set_parameter("name", name);
    }
    if let Some(min_age) = search.min_age {
        qb.and_where(Expr::gte("u.age", ":min_age"))
            .set_parameter("min_age", min_age);
    }
    if !search.group_ids.is_empty() {
        qb.and_where_in("g.id", &search.group_ids);
    }
    if search.include_admins {
        qb.or_where(Expr::eq("u.role", "'admin'"));
    }
    qb.order_by("u.name", "ASC").limit(20).offset(0);

    qb.get_query().execute().await?;

    // ============================================
    // UPDATE
    // ============================================
    println!("\n=== Deactivate ===");
    let mut qb = QueryBuilder::new(&em);
    qb.update("User", "u")
        .set("u.active", 0)
        .set("u.updated_at", "CURRENT_TIMESTAMP()")
        .where_(Expr::lt("u.last_login", "?1"))
        .set_parameter(1u32, "2024-01-01");
    qb.get_query().execute().await?;

    // ============================================
    // DELETE
    // ============================================
    println!("\n=== Purge ===");
    let mut qb = QueryBuilder::new(&em);
    qb.delete("Session", "s")
        .and_where_not_in("s.user", [1, 2])
        .and_where("s.expires_at < CURRENT_TIMESTAMP()");
    let query = qb.get_query();
    query.execute().await?;

    let overrides: Parameters = [("dry_run", true)].into_iter().collect();
    query.execute_with(&overrides).await?;

    Ok(())
}

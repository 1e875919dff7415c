//! # dql
//!
//! A fluent, stateful builder for DQL, the entity-oriented query language.
//!
//! ## Features
//!
//! - **Clause-based**: SELECT/FROM/JOIN/WHERE/GROUP BY/HAVING/ORDER BY/LIMIT/OFFSET/SET
//!   are kept as separate fragment lists and can be replaced or appended to at any time
//! - **Three statement shapes**: SELECT, UPDATE and DELETE render from the same clauses
//! - **Cached rendering**: the DQL string is rebuilt only after a clause changes
//! - **Predicate trees**: AND/OR/NOT and IN/NOT IN with correct grouping across calls
//! - **Separate parameters**: positional (`?1`) and named (`:name`) values live beside the text
//!
//! ## Example
//!
//! ```ignore
//! use dql::{Expr, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new(&em);
//! qb.select("u")
//!     .from("User", "u")
//!     .left_join("u", "groups", "g", None)
//!     .where_(Expr::gt("u.age", ":age"))
//!     .and_where_in("g.id", [1, 2, 3])
//!     .order_by("u.name", "ASC")
//!     .set_parameter("age", 18);
//!
//! let users = qb.get_query().execute().await?;
//! ```

pub mod builder;
pub mod clause;
pub mod config;
pub mod error;
pub mod executor;
pub mod expr;
pub mod param;
pub mod query;

pub use builder::{QueryBuilder, State, StatementKind};
pub use clause::{ClauseKind, ClauseStore, Fragment};
pub use config::BuilderConfig;
pub use error::{DqlError, DqlResult};
pub use executor::Executor;
pub use expr::{Expr, IntoExprList};
pub use param::{ParamKey, Parameters};
pub use query::Query;

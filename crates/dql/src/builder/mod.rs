//! Fluent DQL query builder.
//!
//! `QueryBuilder` accumulates clause fragments across many calls and renders
//! them into a SELECT, UPDATE or DELETE statement on demand.
//!
//! ## Design
//!
//! - Mutators take `&mut self` and return `&mut Self`, so one builder can be
//!   chained or filled in conditionally over several statements.
//! - Each clause either replaces its fragments (`where_`, `order_by`, ...) or
//!   appends to them (`and_where`, `add_order_by`, `from`, joins, ...).
//! - Rendering is cached and only redone after a clause mutation.
//! - Parameters live beside the clauses and never affect the rendered text.
//!
//! ```ignore
//! use dql::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new(&em);
//! qb.select("u")
//!     .from("User", "u")
//!     .where_("u.age > :age")
//!     .order_by("u.name", "ASC")
//!     .limit(10)
//!     .set_parameter("age", 18);
//!
//! assert_eq!(
//!     qb.get_dql(),
//!     "SELECT u FROM User u WHERE u.age > :age ORDER BY u.name ASC LIMIT 10"
//! );
//! ```

mod render;

use crate::clause::{ClauseKind, ClauseStore, Fragment};
use crate::config::BuilderConfig;
use crate::error::DqlResult;
use crate::expr::{Expr, IntoExprList};
use crate::param::{ParamKey, Parameters};
use crate::query::Query;
use serde_json::Value;
use std::fmt::{self, Display};

/// Overall shape of the statement being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementKind {
    #[default]
    Select,
    Update,
    Delete,
}

/// Render cache state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Clauses changed since the last rendering.
    Dirty,
    /// The cached DQL matches the current clauses.
    Clean,
}

/// Boolean connective inserted between appended predicate groups.
#[derive(Debug, Clone, Copy)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    fn combine(self, exprs: Vec<Expr>) -> Expr {
        match self {
            Connective::And => Expr::and(exprs),
            Connective::Or => Expr::or(exprs),
        }
    }
}

/// Stateful DQL query builder bound to an execution context.
///
/// The context (`C`) is borrowed, never owned, and is handed unchanged to the
/// [`Query`] produced by [`get_query`](Self::get_query). The builder is meant
/// for a single owner; share the finished `Query` instead of the builder.
pub struct QueryBuilder<'c, C: ?Sized> {
    ctx: &'c C,
    config: BuilderConfig,
    kind: StatementKind,
    parts: ClauseStore,
    params: Parameters,
    dql: Option<String>,
    state: State,
}

impl<'c, C: ?Sized> QueryBuilder<'c, C> {
    /// Create a new SELECT builder bound to `ctx`.
    pub fn new(ctx: &'c C) -> Self {
        Self::with_config(ctx, BuilderConfig::default())
    }

    /// Create a new builder with a custom configuration.
    pub fn with_config(ctx: &'c C, config: BuilderConfig) -> Self {
        Self {
            ctx,
            config,
            kind: StatementKind::Select,
            parts: ClauseStore::new(),
            params: Parameters::new(),
            dql: None,
            state: State::Clean,
        }
    }

    // ==================== Accessors ====================

    /// The bound execution context.
    pub fn context(&self) -> &'c C {
        self.ctx
    }

    /// The builder configuration.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The active statement kind.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The render cache state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Fragments of one clause.
    pub fn get_part(&self, kind: ClauseKind) -> &[Fragment] {
        self.parts.get(kind)
    }

    /// Fragments of one clause, looked up by key (`"where"`, `"orderBy"`, ...).
    pub fn get_part_by_name(&self, name: &str) -> DqlResult<&[Fragment]> {
        Ok(self.parts.get(name.parse()?))
    }

    /// The whole clause store.
    pub fn get_parts(&self) -> &ClauseStore {
        &self.parts
    }

    // ==================== Generic clause mutators ====================

    fn touch(&mut self) -> &mut Self {
        self.state = State::Dirty;
        self
    }

    /// Replace (`append = false`) or extend (`append = true`) one clause.
    pub fn add_part(
        &mut self,
        kind: ClauseKind,
        fragment: impl Into<Fragment>,
        append: bool,
    ) -> &mut Self {
        if append {
            self.parts.append(kind, fragment.into());
        } else {
            self.parts.replace(kind, fragment.into());
        }
        self.touch()
    }

    /// Like [`add_part`](Self::add_part) with the clause given by key.
    ///
    /// Returns [`DqlError::InvalidClauseKind`](crate::DqlError::InvalidClauseKind)
    /// for unknown keys.
    pub fn add(
        &mut self,
        name: &str,
        fragment: impl Into<Fragment>,
        append: bool,
    ) -> DqlResult<&mut Self> {
        let kind = name.parse()?;
        Ok(self.add_part(kind, fragment, append))
    }

    /// Clear one clause.
    pub fn reset_part(&mut self, kind: ClauseKind) -> &mut Self {
        self.parts.reset(kind);
        self.touch()
    }

    /// Clear every clause. The statement kind and parameters are kept.
    pub fn reset_parts(&mut self) -> &mut Self {
        self.parts.reset_all();
        self.touch()
    }

    fn set_kind(&mut self, kind: StatementKind) -> &mut Self {
        self.kind = kind;
        self.touch()
    }

    // ==================== SELECT / UPDATE / DELETE ====================

    /// Set the SELECT items and switch to a SELECT statement.
    ///
    /// An empty item list leaves the Select clause as it is, but the
    /// statement kind still switches to SELECT.
    pub fn select(&mut self, items: impl IntoExprList) -> &mut Self {
        self.set_kind(StatementKind::Select);
        let items = items.into_expr_list();
        if items.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::Select, Expr::list(items), false)
    }

    /// Append SELECT items and switch to a SELECT statement.
    pub fn add_select(&mut self, items: impl IntoExprList) -> &mut Self {
        self.set_kind(StatementKind::Select);
        let items = items.into_expr_list();
        if items.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::Select, Expr::list(items), true)
    }

    /// Switch to a DELETE statement over `entity alias`.
    pub fn delete(&mut self, entity: &str, alias: &str) -> &mut Self {
        self.set_kind(StatementKind::Delete);
        self.add_part(ClauseKind::From, entity_ref(entity, alias), false)
    }

    /// Switch to a DELETE statement without touching the From clause.
    pub fn as_delete(&mut self) -> &mut Self {
        self.set_kind(StatementKind::Delete)
    }

    /// Switch to an UPDATE statement over `entity alias`.
    pub fn update(&mut self, entity: &str, alias: &str) -> &mut Self {
        self.set_kind(StatementKind::Update);
        self.add_part(ClauseKind::From, entity_ref(entity, alias), false)
    }

    /// Switch to an UPDATE statement without touching the From clause.
    pub fn as_update(&mut self) -> &mut Self {
        self.set_kind(StatementKind::Update)
    }

    /// Add an UPDATE assignment: `key = value`.
    pub fn set(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.add_part(ClauseKind::Set, Expr::eq(key, value), true)
    }

    // ==================== FROM / JOIN ====================

    /// Add a root entity: `entity alias`.
    pub fn from(&mut self, entity: &str, alias: &str) -> &mut Self {
        self.add_part(ClauseKind::From, entity_ref(entity, alias), true)
    }

    fn join(
        &mut self,
        join_type: &str,
        parent_alias: &str,
        target: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        let mut join = format!("{} JOIN {}.{}", join_type, parent_alias, target);
        if !alias.is_empty() {
            join.push(' ');
            join.push_str(alias);
        }
        if let Some(condition) = condition.filter(|c| !c.is_empty()) {
            join.push(' ');
            join.push_str(condition);
        }
        self.add_part(ClauseKind::From, join, true)
    }

    /// Add `INNER JOIN parent_alias.target alias [condition]`.
    pub fn inner_join(
        &mut self,
        parent_alias: &str,
        target: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.join("INNER", parent_alias, target, alias, condition)
    }

    /// Add `LEFT JOIN parent_alias.target alias [condition]`.
    pub fn left_join(
        &mut self,
        parent_alias: &str,
        target: &str,
        alias: &str,
        condition: Option<&str>,
    ) -> &mut Self {
        self.join("LEFT", parent_alias, target, alias, condition)
    }

    // ==================== WHERE ====================

    /// Append a predicate group to a conditional clause, preceded by the
    /// connective unless the clause is still empty.
    fn add_condition(&mut self, kind: ClauseKind, connective: Connective, expr: Expr) -> &mut Self {
        if !self.parts.is_empty(kind) {
            self.parts.append(kind, Fragment::from(connective.as_str()));
        }
        self.add_part(kind, expr, true)
    }

    fn add_predicates(
        &mut self,
        kind: ClauseKind,
        connective: Connective,
        preds: impl IntoExprList,
    ) -> &mut Self {
        let expr = connective.combine(preds.into_expr_list());
        if expr.is_empty() {
            return self;
        }
        self.add_condition(kind, connective, expr)
    }

    /// Replace the WHERE clause with the AND of `preds`.
    pub fn where_(&mut self, preds: impl IntoExprList) -> &mut Self {
        let expr = Expr::and(preds.into_expr_list());
        if expr.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::Where, expr, false)
    }

    /// Append `AND (preds joined by AND)` to the WHERE clause.
    pub fn and_where(&mut self, preds: impl IntoExprList) -> &mut Self {
        self.add_predicates(ClauseKind::Where, Connective::And, preds)
    }

    /// Append `OR (preds joined by OR)` to the WHERE clause.
    pub fn or_where(&mut self, preds: impl IntoExprList) -> &mut Self {
        self.add_predicates(ClauseKind::Where, Connective::Or, preds)
    }

    /// Append `AND expr IN (values)` to the WHERE clause.
    pub fn and_where_in<I>(&mut self, expr: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.add_condition(ClauseKind::Where, Connective::And, Expr::in_list(expr, values))
    }

    /// Append `OR expr IN (values)` to the WHERE clause.
    pub fn or_where_in<I>(&mut self, expr: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.add_condition(ClauseKind::Where, Connective::Or, Expr::in_list(expr, values))
    }

    /// Append `AND expr NOT IN (values)` to the WHERE clause.
    pub fn and_where_not_in<I>(&mut self, expr: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.add_condition(ClauseKind::Where, Connective::And, Expr::not_in(expr, values))
    }

    /// Append `OR expr NOT IN (values)` to the WHERE clause.
    pub fn or_where_not_in<I>(&mut self, expr: &str, values: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        self.add_condition(ClauseKind::Where, Connective::Or, Expr::not_in(expr, values))
    }

    // ==================== GROUP BY / HAVING ====================

    /// Replace the GROUP BY items.
    pub fn group_by(&mut self, items: impl IntoExprList) -> &mut Self {
        let items = items.into_expr_list();
        if items.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::GroupBy, Expr::list(items), false)
    }

    /// Append GROUP BY items.
    pub fn add_group_by(&mut self, items: impl IntoExprList) -> &mut Self {
        let items = items.into_expr_list();
        if items.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::GroupBy, Expr::list(items), true)
    }

    /// Replace the HAVING clause with the AND of `preds`.
    pub fn having(&mut self, preds: impl IntoExprList) -> &mut Self {
        let expr = Expr::and(preds.into_expr_list());
        if expr.is_empty() {
            return self;
        }
        self.add_part(ClauseKind::Having, expr, false)
    }

    /// Append `AND (preds)` to the HAVING clause.
    pub fn and_having(&mut self, preds: impl IntoExprList) -> &mut Self {
        self.add_predicates(ClauseKind::Having, Connective::And, preds)
    }

    /// Append `OR (preds)` to the HAVING clause.
    pub fn or_having(&mut self, preds: impl IntoExprList) -> &mut Self {
        self.add_predicates(ClauseKind::Having, Connective::Or, preds)
    }

    // ==================== ORDER BY / LIMIT / OFFSET ====================

    /// Replace the ordering with `sort dir`.
    pub fn order_by(&mut self, sort: &str, dir: &str) -> &mut Self {
        self.add_part(ClauseKind::OrderBy, sort_ref(sort, dir), false)
    }

    /// Append `sort dir` to the ordering.
    pub fn add_order_by(&mut self, sort: &str, dir: &str) -> &mut Self {
        self.add_part(ClauseKind::OrderBy, sort_ref(sort, dir), true)
    }

    /// Set LIMIT.
    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.add_part(ClauseKind::Limit, n.to_string(), false)
    }

    /// Set OFFSET.
    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.add_part(ClauseKind::Offset, n.to_string(), false)
    }

    // ==================== Parameters ====================

    /// Store or overwrite a parameter. Does not invalidate the rendered DQL.
    pub fn set_parameter(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.params.set(key, value);
        self
    }

    /// Store several parameters.
    pub fn set_parameters<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<ParamKey>,
        V: Into<Value>,
    {
        self.params.extend(params);
        self
    }

    /// Look up a parameter; `None` if it was never set.
    pub fn get_parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.params.get(key)
    }

    /// All stored parameters.
    pub fn get_parameters(&self) -> &Parameters {
        &self.params
    }

    /// Stored parameters merged with one-off `overrides` (overrides win).
    pub fn get_parameters_with(&self, overrides: &Parameters) -> Parameters {
        self.params.merged(overrides)
    }

    /// Remove every stored parameter. Does not invalidate the rendered DQL.
    pub fn clear_parameters(&mut self) -> &mut Self {
        self.params.clear();
        self
    }

    // ==================== Rendering ====================

    /// Render the DQL, reusing the cached text while the clauses are unchanged.
    pub fn get_dql(&mut self) -> &str {
        if self.state == State::Dirty || self.dql.is_none() || !self.config.cache_enabled {
            let dql = render::build(self.kind, &self.parts);
            #[cfg(feature = "tracing")]
            tracing::trace!(kind = ?self.kind, len = dql.len(), "rendered dql");
            self.dql = Some(dql);
            self.state = State::Clean;
        }
        self.dql.as_deref().unwrap_or_default()
    }

    /// Render the DQL without updating the cache.
    pub fn to_dql(&self) -> String {
        match (&self.dql, self.state) {
            (Some(dql), State::Clean) => dql.clone(),
            _ => render::build(self.kind, &self.parts),
        }
    }

    /// Finalize into a [`Query`] holding the DQL, a snapshot of the
    /// parameters and the bound context.
    pub fn get_query(&mut self) -> Query<'c, C> {
        let dql = self.get_dql().to_string();
        Query::new(self.ctx, dql, self.params.clone(), self.config.max_logged_dql)
    }
}

impl<C: ?Sized> Clone for QueryBuilder<'_, C> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx,
            config: self.config.clone(),
            kind: self.kind,
            parts: self.parts.clone(),
            params: self.params.clone(),
            dql: self.dql.clone(),
            state: self.state,
        }
    }
}

impl<C: ?Sized> fmt::Debug for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("kind", &self.kind)
            .field("parts", &self.parts)
            .field("params", &self.params)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: ?Sized> Display for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dql())
    }
}

fn entity_ref(entity: &str, alias: &str) -> String {
    if alias.is_empty() {
        entity.to_string()
    } else {
        format!("{} {}", entity, alias)
    }
}

fn sort_ref(sort: &str, dir: &str) -> String {
    if dir.is_empty() {
        sort.to_string()
    } else {
        format!("{} {}", sort, dir)
    }
}

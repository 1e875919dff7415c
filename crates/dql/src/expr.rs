//! Predicate-tree expressions for WHERE/HAVING/SET clauses.
//!
//! This module provides the `Expr` enum which supports:
//! - AND/OR/NOT grouping
//! - Comparison operators (eq, ne, gt, lt, like, ...)
//! - IN / NOT IN membership tests
//! - Comma-separated lists (SELECT items, GROUP BY items)
//! - Raw DQL fragments
//!
//! Values are written into the DQL text through `Display`, so they are usually
//! parameter placeholders (`?1`, `:name`) or pre-quoted literals.

use std::fmt::{self, Display};

/// Expression node for building DQL clauses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// Binary comparison: `left op right`
    Compare {
        left: String,
        op: &'static str,
        right: String,
    },

    /// Membership test: `expr IN (a, b, ...)` or `expr NOT IN (...)`
    InList {
        expr: String,
        values: Vec<String>,
        negated: bool,
    },

    /// Comma-separated list: `a, b, c`
    List(Vec<Expr>),

    /// Raw DQL fragment.
    Raw(String),
}

impl Expr {
    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    /// Create a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    /// Create a comma-separated list (SELECT / GROUP BY items).
    pub fn list(items: Vec<Expr>) -> Self {
        Expr::List(items)
    }

    fn compare(left: impl Into<String>, op: &'static str, right: impl Display) -> Self {
        Expr::Compare {
            left: left.into(),
            op,
            right: right.to_string(),
        }
    }

    /// Create an equality condition: left = right
    pub fn eq(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, "=", right)
    }

    /// Create an inequality condition: left <> right
    pub fn neq(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, "<>", right)
    }

    /// Create a greater-than condition: left > right
    pub fn gt(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, ">", right)
    }

    /// Create a greater-than-or-equal condition: left >= right
    pub fn gte(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, ">=", right)
    }

    /// Create a less-than condition: left < right
    pub fn lt(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, "<", right)
    }

    /// Create a less-than-or-equal condition: left <= right
    pub fn lte(left: impl Into<String>, right: impl Display) -> Self {
        Self::compare(left, "<=", right)
    }

    /// Create a LIKE condition: left LIKE pattern
    pub fn like(left: impl Into<String>, pattern: impl Display) -> Self {
        Self::compare(left, "LIKE", pattern)
    }

    /// Create an IN condition: expr IN (values...)
    pub fn in_list<T: Display>(expr: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Expr::InList {
            expr: expr.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
            negated: false,
        }
    }

    /// Create a NOT IN condition: expr NOT IN (values...)
    pub fn not_in<T: Display>(expr: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Expr::InList {
            expr: expr.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
            negated: true,
        }
    }

    /// Create a raw DQL fragment.
    pub fn raw(dql: impl Into<String>) -> Self {
        Expr::Raw(dql.into())
    }

    /// Check if this expression is empty (renders nothing).
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) | Expr::List(exprs) => {
                exprs.iter().all(|e| e.is_empty())
            }
            Expr::Not(inner) => inner.is_empty(),
            Expr::Raw(dql) => dql.is_empty(),
            _ => false,
        }
    }

    /// Unwrap AND/OR groups holding a single non-empty child.
    fn effective(&self) -> &Expr {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => {
                let mut live = exprs.iter().filter(|e| !e.is_empty());
                match (live.next(), live.next()) {
                    (Some(only), None) => only.effective(),
                    _ => self,
                }
            }
            _ => self,
        }
    }

    /// True if this renders as two or more parts joined by AND/OR.
    ///
    /// Raw fragments count when their text has a top-level connective.
    pub fn is_compound(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        match self.effective() {
            Expr::And(_) | Expr::Or(_) => true,
            Expr::Raw(dql) => has_top_level_connective(dql),
            _ => false,
        }
    }

    /// True if the top level of this expression is joined by `connective`.
    fn joins_with(&self, connective: &str) -> bool {
        match self {
            Expr::And(_) => connective == "AND",
            Expr::Or(_) => connective == "OR",
            Expr::Raw(dql) => has_top_level(dql, connective),
            _ => false,
        }
    }

    fn fmt_group(
        f: &mut fmt::Formatter<'_>,
        exprs: &[Expr],
        connective: &str,
        opposite: &str,
    ) -> fmt::Result {
        let mut first = true;
        for expr in exprs.iter().filter(|e| !e.is_empty()) {
            if !first {
                write!(f, " {} ", connective)?;
            }
            first = false;
            if expr.is_compound() && expr.effective().joins_with(opposite) {
                write!(f, "({})", expr)?;
            } else {
                write!(f, "{}", expr)?;
            }
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Wrap OR groups nested in AND, and AND groups nested in OR.
            Expr::And(exprs) => Self::fmt_group(f, exprs, "AND", "OR"),
            Expr::Or(exprs) => Self::fmt_group(f, exprs, "OR", "AND"),
            Expr::Not(inner) => {
                if inner.is_empty() {
                    Ok(())
                } else {
                    write!(f, "NOT ({})", inner)
                }
            }
            Expr::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::InList {
                expr,
                values,
                negated,
            } => {
                if values.is_empty() {
                    return f.write_str(if *negated { "1=1" } else { "1=0" });
                }
                let op = if *negated { "NOT IN" } else { "IN" };
                write!(f, "{} {} ({})", expr, op, values.join(", "))
            }
            Expr::List(items) => {
                let mut first = true;
                for item in items.iter().filter(|e| !e.is_empty()) {
                    if !first {
                        f.write_str(", ")?;
                    }
                    first = false;
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            Expr::Raw(dql) => f.write_str(dql),
        }
    }
}

/// Check whether raw DQL joins terms with `connective` outside parentheses
/// and quoted strings. A leading or trailing keyword does not count.
fn has_top_level(dql: &str, connective: &str) -> bool {
    let bytes = dql.as_bytes();
    let keyword = connective.as_bytes();
    let mut depth = 0usize;
    let mut quoted = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => quoted = !quoted,
            b'(' if !quoted => depth += 1,
            b')' if !quoted => depth = depth.saturating_sub(1),
            _ if quoted || depth > 0 || i == 0 => {}
            _ if bytes[i - 1].is_ascii_whitespace() => {
                let end = i + keyword.len();
                if end < bytes.len()
                    && bytes[i..end].eq_ignore_ascii_case(keyword)
                    && bytes[end].is_ascii_whitespace()
                {
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

/// Check whether raw DQL has a top-level AND or OR.
pub(crate) fn has_top_level_connective(dql: &str) -> bool {
    has_top_level(dql, "AND") || has_top_level(dql, "OR")
}

impl From<&str> for Expr {
    fn from(dql: &str) -> Self {
        Expr::Raw(dql.to_string())
    }
}

impl From<String> for Expr {
    fn from(dql: String) -> Self {
        Expr::Raw(dql)
    }
}

/// Conversion into a list of expressions.
///
/// Lets builder methods accept a single predicate or several at once:
///
/// ```ignore
/// qb.where_("u.age > 18");
/// qb.where_(["u.age > 18", "u.active = 1"]);
/// qb.where_(vec![Expr::eq("u.id", "?1")]);
/// ```
pub trait IntoExprList {
    /// Convert into the list of expressions.
    fn into_expr_list(self) -> Vec<Expr>;
}

impl IntoExprList for Expr {
    fn into_expr_list(self) -> Vec<Expr> {
        vec![self]
    }
}

impl IntoExprList for &str {
    fn into_expr_list(self) -> Vec<Expr> {
        vec![Expr::from(self)]
    }
}

impl IntoExprList for String {
    fn into_expr_list(self) -> Vec<Expr> {
        vec![Expr::from(self)]
    }
}

impl<T: Into<Expr>> IntoExprList for Vec<T> {
    fn into_expr_list(self) -> Vec<Expr> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<Expr>, const N: usize> IntoExprList for [T; N] {
    fn into_expr_list(self) -> Vec<Expr> {
        self.into_iter().map(Into::into).collect()
    }
}

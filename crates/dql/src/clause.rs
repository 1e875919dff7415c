//! Clause kinds, fragments and the per-clause fragment store.

use crate::error::{DqlError, DqlResult};
use crate::expr::{Expr, has_top_level_connective};
use std::fmt::{self, Display, Write as _};
use std::str::FromStr;

/// Named clause slots of a DQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Set,
}

impl ClauseKind {
    /// Every clause kind, in store order.
    pub const ALL: [ClauseKind; 9] = [
        ClauseKind::Select,
        ClauseKind::From,
        ClauseKind::Where,
        ClauseKind::GroupBy,
        ClauseKind::Having,
        ClauseKind::OrderBy,
        ClauseKind::Limit,
        ClauseKind::Offset,
        ClauseKind::Set,
    ];

    /// Canonical key of this clause kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ClauseKind::Select => "select",
            ClauseKind::From => "from",
            ClauseKind::Where => "where",
            ClauseKind::GroupBy => "groupBy",
            ClauseKind::Having => "having",
            ClauseKind::OrderBy => "orderBy",
            ClauseKind::Limit => "limit",
            ClauseKind::Offset => "offset",
            ClauseKind::Set => "set",
        }
    }

    /// Clauses whose fragments are joined by textual AND/OR connectives.
    pub fn is_conditional(self) -> bool {
        matches!(self, ClauseKind::Where | ClauseKind::Having)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseKind {
    type Err = DqlError;

    fn from_str(s: &str) -> DqlResult<Self> {
        match s {
            "select" => Ok(ClauseKind::Select),
            "from" => Ok(ClauseKind::From),
            "where" => Ok(ClauseKind::Where),
            "groupBy" | "group_by" => Ok(ClauseKind::GroupBy),
            "having" => Ok(ClauseKind::Having),
            "orderBy" | "order_by" => Ok(ClauseKind::OrderBy),
            "limit" => Ok(ClauseKind::Limit),
            "offset" => Ok(ClauseKind::Offset),
            "set" => Ok(ClauseKind::Set),
            other => Err(DqlError::invalid_clause_kind(other)),
        }
    }
}

/// One renderable piece of a clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fragment {
    /// Literal DQL text (including `AND`/`OR` connectives).
    Literal(String),
    /// Predicate tree.
    Predicate(Expr),
}

impl Fragment {
    /// True if this fragment renders as several terms joined by AND/OR.
    /// Bare connective literals never are.
    fn is_compound(&self) -> bool {
        match self {
            Fragment::Literal(dql) => has_top_level_connective(dql),
            Fragment::Predicate(expr) => expr.is_compound(),
        }
    }

    /// Write this fragment, parenthesizing compound ones.
    fn write_grouped(&self, buf: &mut String) {
        if self.is_compound() {
            let _ = write!(buf, "({})", self);
        } else {
            let _ = write!(buf, "{}", self);
        }
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Literal(dql) => f.write_str(dql),
            Fragment::Predicate(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<&str> for Fragment {
    fn from(dql: &str) -> Self {
        Fragment::Literal(dql.to_string())
    }
}

impl From<String> for Fragment {
    fn from(dql: String) -> Self {
        Fragment::Literal(dql)
    }
}

impl From<Expr> for Fragment {
    fn from(expr: Expr) -> Self {
        Fragment::Predicate(expr)
    }
}

/// Ordered fragment sequences, one per [`ClauseKind`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClauseStore {
    parts: [Vec<Fragment>; 9],
}

impl ClauseStore {
    /// Create a store with every clause empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments of one clause, in insertion order.
    pub fn get(&self, kind: ClauseKind) -> &[Fragment] {
        &self.parts[kind.index()]
    }

    /// Check if a clause has no fragments.
    pub fn is_empty(&self, kind: ClauseKind) -> bool {
        self.parts[kind.index()].is_empty()
    }

    /// Replace a clause with a single fragment.
    pub fn replace(&mut self, kind: ClauseKind, fragment: Fragment) {
        let part = &mut self.parts[kind.index()];
        part.clear();
        part.push(fragment);
    }

    /// Append a fragment to the end of a clause.
    pub fn append(&mut self, kind: ClauseKind, fragment: Fragment) {
        self.parts[kind.index()].push(fragment);
    }

    /// Clear one clause.
    pub fn reset(&mut self, kind: ClauseKind) {
        self.parts[kind.index()].clear();
    }

    /// Clear every clause.
    pub fn reset_all(&mut self) {
        self.parts.iter_mut().for_each(Vec::clear);
    }

    /// Write `prefix + join(fragments, separator)`, or nothing if the clause is empty.
    pub fn render_into(&self, buf: &mut String, kind: ClauseKind, prefix: &str, separator: &str) {
        let fragments = self.get(kind);
        if fragments.is_empty() {
            return;
        }
        // Several predicate groups joined by textual connectives keep their grouping.
        let grouped = kind.is_conditional() && fragments.len() > 1;

        buf.push_str(prefix);
        for (i, fragment) in fragments.iter().enumerate() {
            if i > 0 {
                buf.push_str(separator);
            }
            if grouped {
                fragment.write_grouped(buf);
            } else {
                let _ = write!(buf, "{}", fragment);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(store: &ClauseStore, kind: ClauseKind, prefix: &str, sep: &str) -> String {
        let mut buf = String::new();
        store.render_into(&mut buf, kind, prefix, sep);
        buf
    }

    #[test]
    fn test_every_kind_starts_empty() {
        let store = ClauseStore::new();
        for kind in ClauseKind::ALL {
            assert!(store.is_empty(kind), "{kind} should start empty");
        }
    }

    #[test]
    fn test_replace_and_append() {
        let mut store = ClauseStore::new();
        store.append(ClauseKind::From, "User u".into());
        store.append(ClauseKind::From, "INNER JOIN u.groups g".into());
        assert_eq!(store.get(ClauseKind::From).len(), 2);

        store.replace(ClauseKind::From, "Group g".into());
        assert_eq!(store.get(ClauseKind::From), &[Fragment::from("Group g")]);
    }

    #[test]
    fn test_render_empty_clause_contributes_nothing() {
        let store = ClauseStore::new();
        assert_eq!(render(&store, ClauseKind::Where, " WHERE ", " "), "");
    }

    #[test]
    fn test_render_prefix_and_separator() {
        let mut store = ClauseStore::new();
        store.append(ClauseKind::OrderBy, "u.name ASC".into());
        store.append(ClauseKind::OrderBy, "u.id DESC".into());
        assert_eq!(
            render(&store, ClauseKind::OrderBy, " ORDER BY ", ", "),
            " ORDER BY u.name ASC, u.id DESC"
        );
    }

    #[test]
    fn test_conditional_clause_groups_compound_predicates() {
        let mut store = ClauseStore::new();
        store.append(
            ClauseKind::Where,
            Expr::or(vec![Expr::raw("a = 1"), Expr::raw("b = 2")]).into(),
        );
        store.append(ClauseKind::Where, "AND".into());
        store.append(ClauseKind::Where, Expr::and(vec![Expr::raw("c = 3")]).into());
        assert_eq!(
            render(&store, ClauseKind::Where, " WHERE ", " "),
            " WHERE (a = 1 OR b = 2) AND c = 3"
        );
    }

    #[test]
    fn test_conditional_clause_groups_raw_text() {
        let mut store = ClauseStore::new();
        store.append(ClauseKind::Where, "a = 1 OR b = 2".into());
        store.append(ClauseKind::Where, "AND".into());
        store.append(ClauseKind::Where, Expr::raw("c = 3 OR d = 4").into());
        store.append(ClauseKind::Where, "OR".into());
        store.append(ClauseKind::Where, "e = 5".into());
        assert_eq!(
            render(&store, ClauseKind::Where, " WHERE ", " "),
            " WHERE (a = 1 OR b = 2) AND (c = 3 OR d = 4) OR e = 5"
        );
    }

    #[test]
    fn test_single_compound_predicate_is_not_wrapped() {
        let mut store = ClauseStore::new();
        store.append(
            ClauseKind::Where,
            Expr::and(vec![Expr::raw("a = 1"), Expr::raw("b = 2")]).into(),
        );
        assert_eq!(
            render(&store, ClauseKind::Where, " WHERE ", " "),
            " WHERE a = 1 AND b = 2"
        );
    }

    #[test]
    fn test_parse_clause_kind() {
        for kind in ClauseKind::ALL {
            assert_eq!(kind.as_str().parse::<ClauseKind>().unwrap(), kind);
        }
        assert_eq!("group_by".parse::<ClauseKind>().unwrap(), ClauseKind::GroupBy);

        let err = "join".parse::<ClauseKind>().unwrap_err();
        assert!(err.is_invalid_clause_kind());
        assert_eq!(err.to_string(), "Invalid clause kind: join");
    }
}

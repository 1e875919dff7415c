//! Statement layouts and clause assembly.

use super::StatementKind;
use crate::clause::{ClauseKind, ClauseStore};

/// One clause slot of a statement layout: `(kind, prefix, separator)`.
type Slot = (ClauseKind, &'static str, &'static str);

const SELECT: Slot = (ClauseKind::Select, " ", ", ");
const FROM: Slot = (ClauseKind::From, " FROM ", " ");
const SET: Slot = (ClauseKind::Set, " SET ", ", ");
const WHERE: Slot = (ClauseKind::Where, " WHERE ", " ");
const GROUP_BY: Slot = (ClauseKind::GroupBy, " GROUP BY ", ", ");
const HAVING: Slot = (ClauseKind::Having, " HAVING ", " ");
const ORDER_BY: Slot = (ClauseKind::OrderBy, " ORDER BY ", ", ");
const LIMIT: Slot = (ClauseKind::Limit, " LIMIT ", " ");
const OFFSET: Slot = (ClauseKind::Offset, " OFFSET ", " ");

// UPDATE and DELETE name their entity directly after the keyword.
const TARGET: Slot = (ClauseKind::From, " ", " ");

const SELECT_LAYOUT: &[Slot] = &[SELECT, FROM, WHERE, GROUP_BY, HAVING, ORDER_BY, LIMIT, OFFSET];
const UPDATE_LAYOUT: &[Slot] = &[TARGET, SET, WHERE, ORDER_BY, LIMIT, OFFSET];
const DELETE_LAYOUT: &[Slot] = &[FROM, WHERE, ORDER_BY, LIMIT, OFFSET];

impl StatementKind {
    /// Leading keyword of the statement.
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }

    fn layout(self) -> &'static [Slot] {
        match self {
            StatementKind::Select => SELECT_LAYOUT,
            StatementKind::Update => UPDATE_LAYOUT,
            StatementKind::Delete => DELETE_LAYOUT,
        }
    }
}

/// Assemble the DQL for `kind` from the clause store.
pub(super) fn build(kind: StatementKind, parts: &ClauseStore) -> String {
    let mut dql = String::from(kind.keyword());
    for &(clause, prefix, separator) in kind.layout() {
        parts.render_into(&mut dql, clause, prefix, separator);
    }
    dql
}

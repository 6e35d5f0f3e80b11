//! Listing predicates.
//!
//! A [`Predicate`] is an ordered list of [`Clause`]s joined with `AND`. Each
//! optional filter field contributes at most one clause; an absent field
//! contributes nothing, so an empty filter set renders no `WHERE` at all.
//!
//! Values are always bound as query parameters. Search terms are matched as
//! case-insensitive substrings with `%`, `_` and `\` escaped, so user input
//! never acts as a wildcard.
//!
//! ```ignore
//! let predicate = Predicate::new()
//!     .search(&["b.title", "b.content"], filters.search.as_deref())
//!     .eq("b.status", filters.status.map(|s| s.as_str()));
//!
//! let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM blogs b");
//! predicate.push_where(&mut qb);
//! ```

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// A bound scalar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uuid(Uuid),
    Text(String),
    Bool(bool),
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `column = value`
    Equals { column: &'static str, value: Value },
    /// `column IS NULL`
    IsNull { column: &'static str },
    /// `(c1 ILIKE %term% OR c2 ILIKE %term% ...)`
    Search {
        columns: Vec<&'static str>,
        term: String,
    },
    /// `column = ANY(values)`
    AnyOf {
        column: &'static str,
        values: Vec<Uuid>,
    },
    /// `column IN (subquery = ANY(values))`, where `subquery` ends with the
    /// compared column, e.g. `SELECT blog_id FROM blog_tags WHERE tag_id`.
    InSubquery {
        column: &'static str,
        subquery: &'static str,
        values: Vec<Uuid>,
    },
}

impl Clause {
    fn push_to<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        match self {
            Clause::Equals { column, value } => {
                qb.push(*column).push(" = ");
                match value {
                    Value::Uuid(v) => qb.push_bind(*v),
                    Value::Text(v) => qb.push_bind(v.clone()),
                    Value::Bool(v) => qb.push_bind(*v),
                };
            }
            Clause::IsNull { column } => {
                qb.push(*column).push(" IS NULL");
            }
            Clause::Search { columns, term } => {
                let pattern = format!("%{}%", escape_like(term));
                qb.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column).push(" ILIKE ");
                    qb.push_bind(pattern.clone());
                }
                qb.push(")");
            }
            Clause::AnyOf { column, values } => {
                qb.push(*column).push(" = ANY(");
                qb.push_bind(values.clone());
                qb.push(")");
            }
            Clause::InSubquery {
                column,
                subquery,
                values,
            } => {
                qb.push(*column)
                    .push(" IN (")
                    .push(*subquery)
                    .push(" = ANY(");
                qb.push_bind(values.clone());
                qb.push("))");
            }
        }
    }
}

/// Escapes LIKE metacharacters using Postgres' default escape character.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    /// Adds `column = value` when a value is present.
    pub fn eq<V: Into<Value>>(mut self, column: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.push(Clause::Equals {
                column,
                value: value.into(),
            });
        }
        self
    }

    /// Adds `column IS NULL` when `enabled`.
    pub fn is_null(mut self, column: &'static str, enabled: bool) -> Self {
        if enabled {
            self.push(Clause::IsNull { column });
        }
        self
    }

    /// Adds a case-insensitive substring match across `columns` when a
    /// non-empty term is present. The term is matched as given, whitespace
    /// included.
    pub fn search(mut self, columns: &[&'static str], term: Option<&str>) -> Self {
        if let Some(term) = term.filter(|t| !t.is_empty())
            && !columns.is_empty()
        {
            self.push(Clause::Search {
                columns: columns.to_vec(),
                term: term.to_string(),
            });
        }
        self
    }

    pub fn any_of(mut self, column: &'static str, values: Option<Vec<Uuid>>) -> Self {
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            self.push(Clause::AnyOf { column, values });
        }
        self
    }

    pub fn in_subquery(
        mut self,
        column: &'static str,
        subquery: &'static str,
        values: Option<Vec<Uuid>>,
    ) -> Self {
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            self.push(Clause::InSubquery {
                column,
                subquery,
                values,
            });
        }
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Appends ` WHERE c1 AND c2 ...`, or nothing for an empty predicate.
    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        self.push_with(qb, " WHERE ");
    }

    /// Appends ` AND c1 AND c2 ...` to a query that already has a `WHERE`.
    pub fn push_and<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        self.push_with(qb, " AND ");
    }

    fn push_with<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>, lead: &str) {
        for (i, clause) in self.clauses.iter().enumerate() {
            qb.push(if i == 0 { lead } else { " AND " });
            clause.push_to(qb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM blogs b");
        predicate.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_predicate_has_no_where() {
        let predicate = Predicate::new()
            .eq::<bool>("b.published", None)
            .search(&["b.title"], None)
            .any_of("b.id", None)
            .is_null("b.category_id", false);
        assert!(predicate.is_empty());
        assert_eq!(render(&predicate), "SELECT * FROM blogs b");
    }

    #[test]
    fn test_single_equality() {
        let predicate = Predicate::new().eq("b.status", Some("PUBLISHED"));
        assert_eq!(predicate.len(), 1);
        assert_eq!(
            predicate.clauses()[0],
            Clause::Equals {
                column: "b.status",
                value: Value::Text("PUBLISHED".to_string())
            }
        );
        assert_eq!(
            render(&predicate),
            "SELECT * FROM blogs b WHERE b.status = $1"
        );
    }

    #[test]
    fn test_false_bool_still_filters() {
        let predicate = Predicate::new().eq("b.published", Some(false));
        assert_eq!(predicate.len(), 1);
    }

    #[test]
    fn test_search_is_or_within_and_across() {
        let author = Uuid::new_v4();
        let predicate = Predicate::new()
            .search(&["b.title", "b.content", "b.excerpt"], Some("rust"))
            .eq("b.author_id", Some(author));
        assert_eq!(
            render(&predicate),
            "SELECT * FROM blogs b WHERE (b.title ILIKE $1 OR b.content ILIKE $2 OR b.excerpt ILIKE $3) AND b.author_id = $4"
        );
    }

    #[test]
    fn test_empty_search_is_ignored() {
        let predicate = Predicate::new().search(&["name"], Some(""));
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_search_term_is_not_trimmed() {
        let predicate = Predicate::new().search(&["name"], Some(" rust"));
        assert_eq!(
            predicate.clauses(),
            &[Clause::Search {
                columns: vec!["name"],
                term: " rust".to_string(),
            }]
        );
    }

    #[test]
    fn test_search_term_is_escaped() {
        let predicate = Predicate::new().search(&["name"], Some("50%_off\\"));
        match &predicate.clauses()[0] {
            Clause::Search { term, .. } => assert_eq!(escape_like(term), "50\\%\\_off\\\\"),
            other => panic!("unexpected clause {:?}", other),
        }
    }

    #[test]
    fn test_is_null_and_subquery() {
        let tag = Uuid::new_v4();
        let predicate = Predicate::new()
            .is_null("c.parent_id", true)
            .in_subquery(
                "b.id",
                "SELECT blog_id FROM blog_tags WHERE tag_id",
                Some(vec![tag]),
            );
        assert_eq!(
            render(&predicate),
            "SELECT * FROM blogs b WHERE c.parent_id IS NULL AND b.id IN (SELECT blog_id FROM blog_tags WHERE tag_id = ANY($1))"
        );
    }

    #[test]
    fn test_empty_list_is_ignored() {
        let predicate = Predicate::new().any_of("b.id", Some(vec![]));
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_push_and_extends_existing_where() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM comments c WHERE c.blog_id = ");
        qb.push_bind(Uuid::new_v4());
        Predicate::new()
            .eq("c.status", Some("APPROVED"))
            .push_and(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM comments c WHERE c.blog_id = $1 AND c.status = $2"
        );
    }
}

//! Intermediate representation of one emitted SELECT statement.
//!
//! The plan walker fills these parts in; `render` assembles the final
//! statement for a dialect. Keeping the two steps separate keeps dialect
//! concerns (paging, quoting) out of the plan traversal.

use super::dialect::Dialect;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expression: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinItem {
    /// Logical table name (object or link type name)
    pub table: String,
    pub alias: String,
    /// Fully qualified left key, e.g. `t1.id`
    pub on_left: String,
    /// Fully qualified right key, e.g. `t2.source_id`
    pub on_right: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: String,
    /// `ASC` / `DESC`
    pub direction: &'static str,
}

/// Parts of a single SELECT statement over logical names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlQuery {
    /// Empty means `SELECT *`
    pub select: Vec<SelectItem>,
    pub from_table: String,
    pub from_alias: String,
    pub joins: Vec<JoinItem>,
    /// AND-ed, already-rendered predicates
    pub filters: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderByItem>,
    /// `(offset, limit)`
    pub paging: Option<(u64, u64)>,
}

impl SqlQuery {
    pub fn render(&self, dialect: Dialect) -> String {
        let mut sql = String::from("SELECT ");
        if self.select.is_empty() {
            sql.push('*');
        } else {
            let items: Vec<String> = self
                .select
                .iter()
                .map(|item| match &item.alias {
                    Some(alias) if *alias != item.expression => {
                        format!("{} AS {}", item.expression, dialect.identifier(alias))
                    }
                    _ => item.expression.clone(),
                })
                .collect();
            sql.push_str(&items.join(", "));
        }

        sql.push_str("\nFROM ");
        sql.push_str(&self.from_table);
        sql.push_str(" AS ");
        sql.push_str(&self.from_alias);

        for join in &self.joins {
            sql.push_str(&format!(
                "\nLEFT OUTER JOIN {} AS {} ON {} = {}",
                join.table, join.alias, join.on_left, join.on_right
            ));
        }

        if !self.filters.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }

        if !self.group_by.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str("\nORDER BY ");
            let items: Vec<String> = self
                .order_by
                .iter()
                .map(|item| format!("{} {}", item.expression, item.direction))
                .collect();
            sql.push_str(&items.join(", "));
        }

        if let Some((offset, limit)) = self.paging {
            sql.push('\n');
            sql.push_str(&dialect.paging_clause(offset, limit, !self.order_by.is_empty()));
        }

        sql
    }
}

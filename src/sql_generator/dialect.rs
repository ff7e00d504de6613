//! SQL dialect model.
//!
//! The emitter is dialect-parameterized only where physical databases
//! actually disagree on the SQL we generate: paging syntax and string
//! literal encoding. Everything else is emitted in the shared subset.

use serde::{Deserialize, Serialize};

use super::errors::SqlGeneratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    PostgreSql,
    Oracle,
    SqlServer,
}

impl Dialect {
    pub fn from_name(name: &str) -> Option<Dialect> {
        match name.to_ascii_lowercase().as_str() {
            "mysql" => Some(Dialect::MySql),
            "postgresql" | "postgres" => Some(Dialect::PostgreSql),
            "oracle" => Some(Dialect::Oracle),
            "sqlserver" | "mssql" => Some(Dialect::SqlServer),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
            Dialect::Oracle => "oracle",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Paging clause for this dialect.
    ///
    /// SQL Server only accepts `OFFSET … FETCH` after an `ORDER BY`, so a
    /// constant scaffold is emitted when the query has no explicit sort.
    pub fn paging_clause(&self, offset: u64, limit: u64, has_order_by: bool) -> String {
        match self {
            Dialect::MySql | Dialect::PostgreSql => {
                if offset == 0 {
                    format!("LIMIT {}", limit)
                } else {
                    format!("LIMIT {} OFFSET {}", limit, offset)
                }
            }
            Dialect::Oracle => {
                if offset == 0 {
                    format!("FETCH NEXT {} ROWS ONLY", limit)
                } else {
                    format!("OFFSET {} ROWS FETCH NEXT {} ROWS ONLY", offset, limit)
                }
            }
            Dialect::SqlServer => {
                let scaffold = if has_order_by {
                    ""
                } else {
                    "ORDER BY (SELECT NULL) "
                };
                format!(
                    "{}OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                    scaffold, offset, limit
                )
            }
        }
    }

    /// Encode a string as a quoted SQL literal.
    ///
    /// Single quotes are doubled; MySQL additionally doubles backslashes
    /// since it treats them as escape characters by default. Non-ASCII text
    /// passes through byte-exact; substituting or escaping multi-byte
    /// characters corrupts round-trips and is treated as a bug, not a
    /// fallback. Interior NUL cannot be represented and is a hard error.
    pub fn encode_string_literal(&self, value: &str) -> Result<String, SqlGeneratorError> {
        if value.contains('\0') {
            return Err(SqlGeneratorError::UnencodableLiteral {
                detail: "string literal contains a NUL byte".to_string(),
            });
        }
        let mut escaped = value.replace('\'', "''");
        if *self == Dialect::MySql {
            escaped = escaped.replace('\\', "\\\\");
        }
        Ok(format!("'{}'", escaped))
    }

    /// Quote an identifier when it is not a plain SQL name (projection
    /// aliases keep dotted logical labels, e.g. `hasMedia.code`).
    pub fn identifier(&self, name: &str) -> String {
        if is_plain_identifier(name) {
            return name.to_string();
        }
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            _ => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

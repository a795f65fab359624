// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SQL rendering for the two supported engines.
//!
//! Statements are written once as templates and rendered per dialect at
//! execution time. Template syntax:
//!
//! - `?` is a positional parameter. `SQLite` keeps `?`; `PostgreSQL` numbers
//!   them `$1`, `$2`, ...
//! - `{name}` is an identifier. Each dialect quotes it only where it must:
//!   reserved words, and for `PostgreSQL` any name that is not all
//!   lowercase (unquoted names are folded to lowercase there).
//! - Text inside single quotes is copied verbatim.
//!
//! ```ignore
//! const COUNT: Statement = Statement::new("SELECT {user} FROM activity WHERE id = ?");
//! COUNT.render(Dialect::Sqlite);   // SELECT user FROM activity WHERE id = ?
//! COUNT.render(Dialect::Postgres); // SELECT "user" FROM activity WHERE id = $1
//! ```

use crate::config::BackendKind;

/// Words that cannot be used as bare identifiers in `SQLite`.
const SQLITE_RESERVED: &[&str] = &[
    "add", "all", "alter", "and", "as", "autoincrement", "between", "by", "case", "check",
    "collate", "commit", "constraint", "create", "default", "deferrable", "delete", "distinct",
    "drop", "else", "escape", "except", "exists", "foreign", "from", "group", "having", "in",
    "index", "insert", "intersect", "into", "is", "isnull", "join", "limit", "not", "notnull",
    "null", "on", "or", "order", "primary", "references", "select", "set", "table", "then", "to",
    "transaction", "union", "unique", "update", "using", "values", "when", "where",
];

/// Words that cannot be used as bare identifiers in `PostgreSQL`.
const POSTGRES_RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both", "case",
    "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false", "fetch",
    "for", "foreign", "from", "grant", "group", "having", "in", "initially", "intersect", "into",
    "lateral", "leading", "limit", "localtime", "localtimestamp", "not", "null", "offset", "on",
    "only", "or", "order", "placing", "primary", "references", "returning", "select",
    "session_user", "some", "symmetric", "table", "then", "to", "trailing", "true", "union",
    "unique", "user", "using", "variadic", "when", "where", "window", "with",
];

/// The SQL dialect of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `SQLite`: `?` placeholders.
    Sqlite,
    /// `PostgreSQL`: `$n` placeholders, case-folding identifiers.
    Postgres,
}

impl Dialect {
    /// Returns the dialect spoken by a backend family.
    #[must_use]
    pub const fn for_kind(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Embedded => Self::Sqlite,
            BackendKind::ClientServer => Self::Postgres,
        }
    }

    /// Returns the dialect's name, for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }

    /// Renders an identifier, quoting it if the dialect requires.
    #[must_use]
    pub fn identifier(self, name: &str) -> String {
        let lower: String = name.to_ascii_lowercase();
        let needs_quotes: bool = match self {
            Self::Sqlite => SQLITE_RESERVED.contains(&lower.as_str()),
            Self::Postgres => lower != name || POSTGRES_RESERVED.contains(&lower.as_str()),
        };
        if needs_quotes {
            format!("\"{}\"", name.replace('"', "\"\""))
        } else {
            name.to_string()
        }
    }

    /// Renders the placeholder for the parameter at 1-based `position`.
    #[must_use]
    pub fn placeholder(self, position: usize) -> String {
        match self {
            Self::Sqlite => String::from("?"),
            Self::Postgres => format!("${position}"),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dialect-neutral SQL statement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    template: &'static str,
}

impl Statement {
    /// Wraps a template.
    #[must_use]
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Returns the unrendered template.
    #[must_use]
    pub const fn template(&self) -> &'static str {
        self.template
    }

    /// Returns the number of positional parameters.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.scan(Dialect::Sqlite).1
    }

    /// Renders the statement for a dialect.
    #[must_use]
    pub fn render(&self, dialect: Dialect) -> String {
        self.scan(dialect).0
    }

    fn scan(&self, dialect: Dialect) -> (String, usize) {
        let mut out: String = String::with_capacity(self.template.len() + 16);
        let mut params: usize = 0;
        let mut rest: &str = self.template;

        while let Some(c) = rest.chars().next() {
            match c {
                '\'' => {
                    // Copy through the closing quote; '' re-enters on the next pass.
                    let end: usize = rest[1..].find('\'').map_or(rest.len(), |i| i + 2);
                    out.push_str(&rest[..end]);
                    rest = &rest[end..];
                }
                '?' => {
                    params += 1;
                    out.push_str(&dialect.placeholder(params));
                    rest = &rest[1..];
                }
                '{' => match rest[1..].find('}') {
                    Some(len) if is_identifier(&rest[1..=len]) => {
                        out.push_str(&dialect.identifier(&rest[1..=len]));
                        rest = &rest[len + 2..];
                    }
                    _ => {
                        out.push('{');
                        rest = &rest[1..];
                    }
                },
                _ => {
                    out.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        (out, params)
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

//! Content hashing and generated object names.
//!
//! Indexes, constraints and triggers are identified by a digest of their
//! canonical definition rather than by name. The digest is embedded in the
//! generated name (`<owner>_<hash>_<suffix>`) so an introspected database
//! carries enough information to be diffed against a declaration.

use std::collections::BTreeMap;

use crate::constants::{GENERATED_NAME_SUFFIXES, HASH_LENGTH, MAX_IDENTIFIER_LENGTH};

/// Digest of a canonical definition, truncated to `HASH_LENGTH` hex characters.
pub fn compute_hash(definition: &str) -> String {
    let digest = format!("{:x}", md5::compute(definition.as_bytes()));
    digest[..HASH_LENGTH].to_string()
}

/// Build `<owner>_<hash>_<suffix>`, truncating the owner so the result fits
/// in a Postgres identifier.
pub fn generated_name(owner: &str, hash: &str, suffix: &str) -> String {
    let fixed = hash.len() + suffix.len() + 2;
    let budget = MAX_IDENTIFIER_LENGTH.saturating_sub(fixed);
    let mut owner_part = owner.to_string();
    if owner_part.len() > budget {
        let mut cut = budget;
        while !owner_part.is_char_boundary(cut) {
            cut -= 1;
        }
        owner_part.truncate(cut);
    }
    format!("{owner_part}_{hash}_{suffix}")
}

/// Split a generated name into `(owner, hash, suffix)`.
///
/// Returns `None` for names that do not follow the generated format, e.g.
/// constraints created by hand or by Postgres defaults (`users_email_key`).
pub fn parse_generated_name(name: &str) -> Option<(&str, &str, &str)> {
    let (rest, suffix) = name.rsplit_once('_')?;
    if !GENERATED_NAME_SUFFIXES.contains(&suffix) {
        return None;
    }
    let (owner, hash) = rest.rsplit_once('_')?;
    if owner.is_empty() || !is_hash(hash) {
        return None;
    }
    Some((owner, hash, suffix))
}

/// True when `value` looks like a digest produced by [`compute_hash`].
pub fn is_hash(value: &str) -> bool {
    value.len() == HASH_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Normalize a SQL expression so formatting differences hash identically.
///
/// Collapses whitespace, lowercases text outside quotes, strips redundant
/// outer parentheses and drops casts applied directly to literals
/// (`'active'::text` and `('active')` both become `'active'`).
pub fn canonicalize_expression(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.trim().chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                if pending_space && !out.is_empty() && needs_space(out.chars().last(), c) {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == c {
                        if chars.peek() == Some(&c) {
                            out.push(c);
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
            }
            c if c.is_whitespace() => pending_space = true,
            _ => {
                if pending_space && !out.is_empty() && needs_space(out.chars().last(), c) {
                    out.push(' ');
                }
                pending_space = false;
                out.extend(c.to_lowercase());
            }
        }
    }

    let mut current = out;
    loop {
        let next = strip_literal_cast(&strip_outer_parens(&current));
        if next == current {
            return current;
        }
        current = next;
    }
}

fn needs_space(prev: Option<char>, next: char) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    match prev {
        Some(p) => {
            (is_word(p) && is_word(next))
                || (!matches!(p, '(' | ',') && !matches!(next, ')' | ',' | '(' | ':'))
        }
        None => false,
    }
}

fn strip_outer_parens(expr: &str) -> String {
    let trimmed = expr.trim();
    if !(trimmed.starts_with('(') && trimmed.ends_with(')')) {
        return trimmed.to_string();
    }
    let mut depth = 0i32;
    let mut in_quote: Option<char> = None;
    for (i, c) in trimmed.char_indices() {
        match (in_quote, c) {
            (Some(q), c) if c == q => in_quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => in_quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 && i != trimmed.len() - 1 {
                    return trimmed.to_string();
                }
            }
            _ => {}
        }
    }
    trimmed[1..trimmed.len() - 1].trim().to_string()
}

fn strip_literal_cast(expr: &str) -> String {
    let Some(pos) = expr.rfind("::") else {
        return expr.to_string();
    };
    let (literal, cast) = (strip_outer_parens(&expr[..pos]), &expr[pos + 2..]);
    let is_type_name = !cast.is_empty()
        && cast.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ',' | '[' | ']' | '"' | '.')
        });
    let is_quoted_literal = literal.len() >= 2
        && literal.starts_with('\'')
        && literal.ends_with('\'')
        && !literal[1..literal.len() - 1]
            .replace("''", "")
            .contains('\'');
    let is_numeric_literal = !literal.is_empty()
        && literal
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-');
    if is_type_name && (is_quoted_literal || is_numeric_literal) {
        literal
    } else {
        expr.to_string()
    }
}

/// Identifier translation used while rendering canonical definitions.
///
/// The identity map hashes a definition as declared. The previous-name map
/// rewrites current table and column names to the names they had before
/// the pending renames, which lets a declaration be matched against a
/// database that has not been renamed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    tables: BTreeMap<(String, String), String>,
    columns: BTreeMap<(String, String, String), String>,
}

impl NameMap {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty()
    }

    pub fn insert_table(&mut self, schema: &str, from: &str, to: &str) {
        self.tables
            .insert((schema.to_string(), from.to_string()), to.to_string());
    }

    /// Map a column. `table` is the table name as written in the definitions
    /// being translated.
    pub fn insert_column(&mut self, schema: &str, table: &str, from: &str, to: &str) {
        self.columns.insert(
            (schema.to_string(), table.to_string(), from.to_string()),
            to.to_string(),
        );
    }

    pub fn table(&self, schema: &str, table: &str) -> String {
        self.tables
            .get(&(schema.to_string(), table.to_string()))
            .cloned()
            .unwrap_or_else(|| table.to_string())
    }

    pub fn column(&self, schema: &str, table: &str, column: &str) -> String {
        self.columns
            .get(&(schema.to_string(), table.to_string(), column.to_string()))
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }

    pub fn columns(&self, schema: &str, table: &str, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|c| self.column(schema, table, c))
            .collect()
    }

    /// Rewrite bare identifiers in an expression that name mapped columns of
    /// `table`. Quoted strings are left untouched.
    pub fn rewrite_expression(&self, schema: &str, table: &str, expr: &str) -> String {
        if self.columns.is_empty() {
            return expr.to_string();
        }
        let mut out = String::with_capacity(expr.len());
        let mut word = String::new();
        let mut in_quote = false;

        let flush = |word: &mut String, out: &mut String| {
            if !word.is_empty() {
                out.push_str(&self.column(schema, table, word));
                word.clear();
            }
        };

        for c in expr.chars() {
            if in_quote {
                out.push(c);
                if c == '\'' {
                    in_quote = false;
                }
            } else if c == '\'' {
                flush(&mut word, &mut out);
                in_quote = true;
                out.push(c);
            } else if c.is_alphanumeric() || c == '_' {
                word.push(c);
            } else {
                flush(&mut word, &mut out);
                out.push(c);
            }
        }
        flush(&mut word, &mut out);
        out
    }
}

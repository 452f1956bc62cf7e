//! SPDX license expressions as a tree.
//!
//! Parsing is done by the `spdx` crate in lax mode, which accepts lower-case
//! operators. A light pre-pass adapts what SBOM generators actually write:
//!
//! - `WITH` clauses are lifted out before parsing and attached to the license
//!   they follow, so `GPL-2.0-only WITH NOASSERTION` still parses.
//! - Identifiers that are neither on the SPDX license list nor `LicenseRef-*`
//!   are handed to the crate as `LicenseRef-*` and come back as
//!   [`LicenseExpression::Extracted`] under their original name.
//! - Parentheses nested deeper than [`MAX_DEPTH`] are rejected up front.

use spdx::expression::{ExprNode, Operator};
use spdx::{Expression, LicenseItem, ParseMode};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Deepest parenthesis nesting accepted by [`LicenseExpression::parse`].
pub const MAX_DEPTH: usize = 64;

/// Parsed license expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseExpression {
    /// `NONE`
    None,
    /// `NOASSERTION`, or an empty field
    NoAssertion,
    /// An identifier from the SPDX license list
    Listed(String),
    /// A document-local `LicenseRef-*`, or any identifier not on the list
    Extracted(String),
    /// `<license> WITH <exception>`
    WithException {
        license: Box<LicenseExpression>,
        exception: String,
    },
    /// `A AND B AND ...`
    Conjunctive(Vec<LicenseExpression>),
    /// `A OR B OR ...`
    Disjunctive(Vec<LicenseExpression>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("invalid expression: {0}")]
    Syntax(String),

    #[error("'WITH' must follow a license and name an exception")]
    DanglingWith,

    #[error("parentheses nested deeper than {MAX_DEPTH}")]
    TooDeep,
}

/// A license identifier as written, keyed by its offset in the text given
/// to the crate.
#[derive(Debug)]
struct Term<'s> {
    name: &'s str,
    exception: Option<&'s str>,
}

/// The expression handed to `spdx`, plus what the rewrite took out of it.
#[derive(Debug)]
struct Prepared<'s> {
    text: String,
    terms: HashMap<usize, Term<'s>>,
}

impl LicenseExpression {
    /// Parse an expression string.
    ///
    /// Blank input parses as [`LicenseExpression::NoAssertion`].
    pub fn parse(raw: &str) -> Result<Self, ExpressionError> {
        match raw.trim() {
            "" | "NOASSERTION" => return Ok(Self::NoAssertion),
            "NONE" => return Ok(Self::None),
            _ => {}
        }

        let prepared = prepare(raw)?;
        let parsed = Expression::parse_mode(&prepared.text, ParseMode::LAX)
            .map_err(|e| ExpressionError::Syntax(e.to_string()))?;

        let mut stack: Vec<Self> = Vec::new();
        for node in parsed.iter() {
            match node {
                ExprNode::Req(req) => {
                    let span = req.span.start as usize..req.span.end as usize;
                    let item = &req.req.license;
                    let leaf = match prepared.terms.get(&span.start) {
                        Some(term) => Self::leaf(item, term.name, term.exception),
                        None => {
                            let name = prepared.text.get(span).unwrap_or_default();
                            Self::leaf(item, name, None)
                        }
                    };
                    stack.push(leaf);
                }
                ExprNode::Op(op) => {
                    let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                        return Err(ExpressionError::Syntax(format!(
                            "operator without operands in '{raw}'"
                        )));
                    };
                    stack.push(join(vec![lhs, rhs], matches!(op, Operator::And)));
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(expr), true) => Ok(expr),
            _ => Err(ExpressionError::Syntax(format!("'{raw}' is not one expression"))),
        }
    }

    fn leaf(item: &LicenseItem, name: &str, exception: Option<&str>) -> Self {
        let license = match (name, item) {
            ("NONE", _) => Self::None,
            ("NOASSERTION", _) => Self::NoAssertion,
            (_, LicenseItem::Spdx { .. }) => Self::Listed(name.to_string()),
            (_, LicenseItem::Other { .. }) => Self::Extracted(name.to_string()),
        };
        match exception {
            Some(exception) => Self::WithException {
                license: Box::new(license),
                exception: exception.to_string(),
            },
            None => license,
        }
    }

    /// Whether the expression asserts nothing (`NONE` or `NOASSERTION`).
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        matches!(self, Self::None | Self::NoAssertion)
    }

    /// Leaf license identifiers in order of appearance.
    ///
    /// Exceptions are dropped: `X WITH Y` contributes `X`. Sentinels
    /// contribute nothing.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(expr) = pending.pop() {
            match expr {
                Self::None | Self::NoAssertion => {}
                Self::Listed(_) | Self::Extracted(_) => out.push(expr),
                Self::WithException { license, .. } => pending.push(license),
                Self::Conjunctive(members) | Self::Disjunctive(members) => {
                    pending.extend(members.iter().rev());
                }
            }
        }
        out
    }
}

impl fmt::Display for LicenseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("NONE"),
            Self::NoAssertion => f.write_str("NOASSERTION"),
            Self::Listed(id) | Self::Extracted(id) => f.write_str(id),
            Self::WithException { license, exception } => {
                write!(f, "{license} WITH {exception}")
            }
            Self::Conjunctive(members) => write_joined(f, members, " AND "),
            Self::Disjunctive(members) => write_joined(f, members, " OR "),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    members: &[LicenseExpression],
    sep: &str,
) -> fmt::Result {
    for (i, member) in members.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        match member {
            LicenseExpression::Conjunctive(_) | LicenseExpression::Disjunctive(_) => {
                write!(f, "({member})")?;
            }
            _ => write!(f, "{member}")?,
        }
    }
    Ok(())
}

/// `LicenseRef-x` or `DocumentRef-y:LicenseRef-x`.
#[must_use]
pub fn is_license_ref(id: &str) -> bool {
    id.starts_with("LicenseRef-")
        || id.split_once(':').is_some_and(|(doc, lic)| {
            doc.starts_with("DocumentRef-") && lic.starts_with("LicenseRef-")
        })
}

/// Whether `id` is on the SPDX license list. A trailing `+` is ignored.
#[must_use]
pub fn is_listed(id: &str) -> bool {
    let id = id.strip_suffix('+').unwrap_or(id);
    spdx::license_id(id).is_some()
}

/// Split on whitespace and parentheses, keeping parentheses as words.
fn words(raw: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, ch) in raw.char_indices() {
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            if let Some(s) = start.take() {
                out.push(&raw[s..i]);
            }
            if ch == '(' || ch == ')' {
                out.push(&raw[i..=i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&raw[s..]);
    }
    out
}

/// What came before the word being read.
#[derive(Debug, Clone, Copy)]
enum Prev {
    Term(usize),
    Close,
    Other,
}

/// Rewrite `raw` into text the `spdx` crate accepts, remembering the
/// original name and exception of every license term.
fn prepare(raw: &str) -> Result<Prepared<'_>, ExpressionError> {
    let words = words(raw);
    let mut text = String::with_capacity(raw.len() + 16);
    let mut terms: HashMap<usize, Term<'_>> = HashMap::new();
    let mut prev = Prev::Other;
    let mut depth = 0usize;

    let mut i = 0;
    while i < words.len() {
        let word = words[i];
        i += 1;

        if matches!(word, "WITH" | "with") {
            let exception = words
                .get(i)
                .copied()
                .filter(|w| !matches!(*w, "(" | ")"))
                .ok_or(ExpressionError::DanglingWith)?;
            match prev {
                Prev::Term(at) => {
                    if let Some(term) = terms.get_mut(&at) {
                        term.exception = Some(exception);
                    }
                }
                // An exception on a parenthesized group names no single license.
                Prev::Close => {}
                Prev::Other => return Err(ExpressionError::DanglingWith),
            }
            prev = Prev::Other;
            i += 1;
            continue;
        }

        if !text.is_empty() {
            text.push(' ');
        }
        match word {
            "(" => {
                depth += 1;
                if depth > MAX_DEPTH {
                    return Err(ExpressionError::TooDeep);
                }
                text.push_str(word);
                prev = Prev::Other;
            }
            ")" => {
                depth = depth.saturating_sub(1);
                text.push_str(word);
                prev = Prev::Close;
            }
            "AND" | "and" | "OR" | "or" => {
                text.push_str(word);
                prev = Prev::Other;
            }
            _ => {
                let at = text.len();
                push_term(&mut text, word);
                terms.insert(
                    at,
                    Term {
                        name: word,
                        exception: None,
                    },
                );
                prev = Prev::Term(at);
            }
        }
    }

    Ok(Prepared { text, terms })
}

/// Listed identifiers go in as written. Everything else becomes a
/// `LicenseRef-` the crate can lex.
fn push_term(text: &mut String, word: &str) {
    let lexable = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-';
    if is_listed(word) {
        text.push_str(word);
    } else if is_license_ref(word) {
        text.extend(word.chars().map(|c| if lexable(c) || c == ':' { c } else { '-' }));
    } else {
        text.push_str("LicenseRef-");
        text.extend(word.chars().map(|c| if lexable(c) { c } else { '-' }));
    }
}

/// Collapse a single member, and flatten nested sets of the same operator.
fn join(mut members: Vec<LicenseExpression>, conjunctive: bool) -> LicenseExpression {
    if members.len() == 1 {
        if let Some(only) = members.pop() {
            return only;
        }
    }
    let mut flat = Vec::with_capacity(members.len());
    for member in members {
        match member {
            LicenseExpression::Conjunctive(inner) if conjunctive => flat.extend(inner),
            LicenseExpression::Disjunctive(inner) if !conjunctive => flat.extend(inner),
            other => flat.push(other),
        }
    }
    if conjunctive {
        LicenseExpression::Conjunctive(flat)
    } else {
        LicenseExpression::Disjunctive(flat)
    }
}

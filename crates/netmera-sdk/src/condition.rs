//! Condition builder for the content search endpoint
//!
//! Filters are kept as a small clause tree and rendered by [`ConditionBuilder::build`]
//! into the backend's condition string, for example:
//!
//! ```text
//! {'title':'Hello','age':{$gt :5,$lt :10}, 'netmera-mobimera:api-content-type' : 'BlogEntries'}
//! ```
//!
//! Conflicting filters on one field (say, an equality and a comparison) are
//! both emitted; how the backend resolves them is undefined.

use serde_json::Value;

/// Comparison operators; several on one field share a single brace group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
    NotEqual,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreaterThan => "$gt",
            Self::LessThan => "$lt",
            Self::NotEqual => "$ne",
            Self::GreaterThanOrEqual => "$gte",
            Self::LessThanOrEqual => "$lte",
        }
    }
}

/// Pattern for a `$regex` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Regex(String),
    StartsWith(String),
    EndsWith(String),
}

impl Pattern {
    fn render(&self) -> String {
        match self {
            Self::Regex(regex) => format!("/{}/", regex),
            Self::StartsWith(prefix) => format!("/^{}/", prefix),
            Self::EndsWith(suffix) => format!("/{}$/", suffix),
        }
    }
}

/// A self-contained filter clause
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Equals { field: String, value: Value },
    Exists { field: String, exists: bool },
    Matches { field: String, pattern: Pattern },
    /// `$in` when `all` is false, `$all` otherwise
    ContainedIn { field: String, values: Vec<Value>, all: bool },
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Self::Equals { field, value } => format!("'{}':{}", field, render_scalar(value)),
            Self::Exists { field, exists } => format!("'{}': {{$exists :{}}}", field, exists),
            Self::Matches { field, pattern } => {
                format!("'{}': {{$regex :{}}}", field, pattern.render())
            }
            Self::ContainedIn { field, values, all } => {
                let op = if *all { "$all" } else { "$in" };
                let list = Value::Array(values.clone()).to_string();
                format!("'{}': {{{} : {}}}", field, op, list)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ComparisonGroup {
    field: String,
    terms: Vec<(CompareOp, Value)>,
}

impl ComparisonGroup {
    fn render(&self) -> String {
        let terms: Vec<String> = self
            .terms
            .iter()
            .map(|(op, value)| format!("{} :{}", op.as_str(), render_scalar(value)))
            .collect();
        format!("'{}':{{{}}}, ", self.field, terms.join(","))
    }
}

/// Strings are quote-wrapped, everything else is written as JSON
///
/// Integral floats drop the fractional part, so `5.0` renders as `5`.
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Accumulates filter clauses in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionBuilder {
    clauses: Vec<Clause>,
    groups: Vec<ComparisonGroup>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a self-contained clause
    pub fn push(&mut self, clause: Clause) -> &mut Self {
        self.clauses.push(clause);
        self
    }

    /// Add a comparison, merging with earlier comparisons on the same field
    pub fn compare(&mut self, field: impl Into<String>, op: CompareOp, value: Value) -> &mut Self {
        let field = field.into();
        match self.groups.iter_mut().find(|g| g.field == field) {
            Some(group) => group.terms.push((op, value)),
            None => self.groups.push(ComparisonGroup {
                field,
                terms: vec![(op, value)],
            }),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.groups.is_empty()
    }

    /// Render the condition, closing it with the type discriminator
    pub fn build(&self, type_field: &str, object_name: &str) -> String {
        let mut condition = self.render_body();
        condition.push_str(&format!("'{}' : '{}'}}", type_field, object_name));
        condition
    }

    /// Render the condition without a type discriminator (user search)
    pub fn build_untyped(&self) -> String {
        let mut condition = self.render_body();
        condition.push('}');
        condition
    }

    fn render_body(&self) -> String {
        let mut body = String::from("{");
        for clause in &self.clauses {
            body.push_str(&clause.render());
            body.push(',');
        }
        for group in &self.groups {
            body.push_str(&group.render());
        }
        body
    }
}

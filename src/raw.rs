//! Untyped nested literal tree
//!
//! `Raw` is the construction input of a `Domain` and the output of
//! `Domain::as_dict`: a plain nested structure of mappings, sets,
//! sequences, and scalars. It deliberately represents shapes the domain
//! grammar forbids (non-string keys, wrong-arity sequences, containers
//! inside sets) so the validator has something concrete to reject.
//!
//! Equality is value-based: mappings and sets compare order-insensitively,
//! sequences element-wise.

use std::fmt;

use crate::value::Value;

/// Plain nested literal value, prior to (or projected from) validation.
#[derive(Debug, Clone)]
pub enum Raw {
    /// Mapping in insertion order. Keys are scalars here; the validator
    /// requires them to be strings.
    Map(Vec<(Value, Raw)>),
    /// Finite set; element order carries no meaning.
    Set(Vec<Raw>),
    /// Sequence; a valid leaf uses exactly two numeric elements.
    Seq(Vec<Raw>),
    /// Bare scalar.
    Scalar(Value),
}

impl Raw {
    /// Mapping from string keys, in the given order.
    pub fn map<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Raw)>,
        S: Into<String>,
    {
        Raw::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Str(k.into()), v))
                .collect(),
        )
    }

    /// Finite set of scalar values.
    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Raw::Set(values.into_iter().map(|v| Raw::Scalar(v.into())).collect())
    }

    /// Sequence of scalar values.
    pub fn seq<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Raw::Seq(values.into_iter().map(|v| Raw::Scalar(v.into())).collect())
    }

    /// Name of the shape, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Raw::Map(_) => "mapping",
            Raw::Set(_) => "set",
            Raw::Seq(_) => "sequence",
            Raw::Scalar(v) => v.type_name(),
        }
    }
}

impl From<Value> for Raw {
    fn from(v: Value) -> Self {
        Raw::Scalar(v)
    }
}

/// Multiset equality under an equivalence closure.
fn multiset_eq<T>(a: &[T], b: &[T], eq: impl Fn(&T, &T) -> bool) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut matched = vec![false; b.len()];
    for x in a {
        let found = b
            .iter()
            .enumerate()
            .find(|&(i, y)| !matched[i] && eq(x, y));
        match found {
            Some((i, _)) => matched[i] = true,
            None => return false,
        }
    }
    true
}

impl PartialEq for Raw {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Raw::Scalar(a), Raw::Scalar(b)) => a == b,
            (Raw::Seq(a), Raw::Seq(b)) => a == b,
            (Raw::Set(a), Raw::Set(b)) => multiset_eq(a, b, |x, y| x == y),
            (Raw::Map(a), Raw::Map(b)) => {
                multiset_eq(a, b, |(ka, va), (kb, vb)| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

impl Eq for Raw {}

impl fmt::Display for Raw {
    /// Literal-text form, matching the restricted grammar the parser
    /// accepts. Mapping and set elements print in stored order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Raw::Scalar(v) => write!(f, "{v}"),
            Raw::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Raw::Set(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Raw::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

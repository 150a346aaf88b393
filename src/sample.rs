//! Concrete assignments drawn from a domain
//!
//! A `Sample` mirrors the nesting of the domain it came from, with every
//! leaf replaced by one concrete scalar. Samples are deeply immutable and
//! carry canonical, key-order-independent equality and hashing, so
//! collections of samples de-duplicate correctly regardless of how they
//! were produced.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DomainError, DomainResult};
use crate::parser;
use crate::path::AxisPath;
use crate::raw::Raw;
use crate::value::{escape, Value};

/// One value inside a sample: a concrete scalar or a nested level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SampleValue {
    Scalar(Value),
    Nested(Sample),
}

impl SampleValue {
    /// The scalar payload, if this is a leaf.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            SampleValue::Scalar(v) => Some(v),
            SampleValue::Nested(_) => None,
        }
    }

    /// The nested sample, if this is a branch.
    pub fn as_nested(&self) -> Option<&Sample> {
        match self {
            SampleValue::Scalar(_) => None,
            SampleValue::Nested(s) => Some(s),
        }
    }
}

/// A fully concrete assignment of values across a domain's axes.
///
/// Key insertion order is preserved for display and iteration, but plays
/// no part in equality or hashing.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    entries: Vec<(String, SampleValue)>,
}

impl Sample {
    /// Build a sample from validated raw input (a nested mapping whose
    /// leaves are scalars).
    pub fn new(raw: Raw) -> DomainResult<Self> {
        Self::from_raw(raw)
    }

    /// Parse a sample from its literal-text form.
    pub fn deserialise(text: &str) -> DomainResult<Self> {
        Self::from_raw(parser::parse(text)?)
    }

    /// The literal-text form; inverse of [`Sample::deserialise`].
    pub fn serialise(&self) -> String {
        self.to_string()
    }

    fn from_raw(raw: Raw) -> DomainResult<Self> {
        match raw {
            Raw::Map(raw_entries) => {
                let mut entries: Vec<(String, SampleValue)> =
                    Vec::with_capacity(raw_entries.len());
                for (key, value) in raw_entries {
                    let name = match key {
                        Value::Str(s) => s,
                        other => {
                            return Err(DomainError::NonStringKey {
                                key: other.to_string(),
                            })
                        }
                    };
                    // a second value for the same key would make equality
                    // lookups ambiguous
                    if entries.iter().any(|(n, _)| *n == name) {
                        return Err(DomainError::PathConflict {
                            path: AxisPath::from([name.as_str()]),
                        });
                    }
                    let value = match value {
                        Raw::Map(_) => SampleValue::Nested(Self::from_raw(value)?),
                        Raw::Scalar(v) => SampleValue::Scalar(v),
                        other => {
                            return Err(DomainError::InvalidLeaf {
                                path: AxisPath::from([name.as_str()]),
                                reason: format!(
                                    "sample values must be scalars or nested mappings, found {}",
                                    other.type_name()
                                ),
                            })
                        }
                    };
                    entries.push((name, value));
                }
                Ok(Self { entries })
            }
            other => Err(DomainError::NotAMapping {
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Assemble a sample from (path, value) pairs in first-occurrence
    /// order. Callers guarantee the paths are non-empty and conflict-free;
    /// this holds for any list derived from a valid domain's flatten.
    pub(crate) fn from_entries(pairs: &[(AxisPath, Value)]) -> Self {
        let mut sample = Sample::default();
        for (path, value) in pairs {
            sample.insert(path.segments(), value.clone());
        }
        sample
    }

    fn insert(&mut self, segments: &[String], value: Value) {
        let (head, rest) = match segments.split_first() {
            Some(split) => split,
            None => return,
        };
        if rest.is_empty() {
            self.entries.push((head.clone(), SampleValue::Scalar(value)));
            return;
        }
        for (name, existing) in &mut self.entries {
            if name == head {
                if let SampleValue::Nested(sub) = existing {
                    sub.insert(rest, value);
                }
                return;
            }
        }
        let mut sub = Sample::default();
        sub.insert(rest, value);
        self.entries.push((head.clone(), SampleValue::Nested(sub)));
    }

    /// Value for a top-level name.
    pub fn get(&self, name: &str) -> Option<&SampleValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Scalar at a full axis path.
    pub fn value_at(&self, path: &AxisPath) -> Option<&Value> {
        let mut current = self;
        let segments = path.segments();
        let (leaf, branches) = segments.split_last()?;
        for segment in branches {
            current = current.get(segment)?.as_nested()?;
        }
        current.get(leaf)?.as_value()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &SampleValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for the empty sample.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key, the canonical order used by `Eq` and `Hash`.
    fn canonical(&self) -> Vec<&(String, SampleValue)> {
        let mut refs: Vec<_> = self.entries.iter().collect();
        refs.sort_by(|a, b| a.0.cmp(&b.0));
        refs
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for Sample {}

impl Hash for Sample {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let canonical = self.canonical();
        canonical.len().hash(state);
        for (name, value) in canonical {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "\"{}\": ", escape(name))?;
            match value {
                SampleValue::Scalar(v) => write!(f, "{v}")?,
                SampleValue::Nested(s) => write!(f, "{s}")?,
            }
        }
        write!(f, "}}")
    }
}

impl FromStr for Sample {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialise(s)
    }
}

impl Serialize for Sample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for SampleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SampleValue::Scalar(v) => v.serialize(serializer),
            SampleValue::Nested(s) => s.serialize(serializer),
        }
    }
}

struct SampleValueVisitor;

impl<'de> Visitor<'de> for SampleValueVisitor {
    type Value = SampleValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a scalar or a nested mapping")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SampleValue, E> {
        Ok(SampleValue::Scalar(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SampleValue, E> {
        i64::try_from(v)
            .map(|i| SampleValue::Scalar(Value::from(i)))
            .map_err(|_| E::custom("integer out of range"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<SampleValue, E> {
        Ok(SampleValue::Scalar(Value::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SampleValue, E> {
        Ok(SampleValue::Scalar(Value::from(v)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<SampleValue, E> {
        Ok(SampleValue::Scalar(Value::from(v)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SampleValue, A::Error> {
        let mut entries: Vec<(String, SampleValue)> = Vec::new();
        while let Some((name, value)) = access.next_entry::<String, SampleValue>()? {
            if entries.iter().any(|(n, _)| *n == name) {
                return Err(de::Error::custom(format!("duplicate key \"{name}\"")));
            }
            entries.push((name, value));
        }
        Ok(SampleValue::Nested(Sample { entries }))
    }
}

impl<'de> Deserialize<'de> for SampleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SampleValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Sample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SampleValue::deserialize(deserializer)? {
            SampleValue::Nested(sample) => Ok(sample),
            SampleValue::Scalar(_) => Err(de::Error::custom("expected a mapping")),
        }
    }
}

//! The domain tree: validation, flattening, classification, algebra, codec
//!
//! A [`Domain`] is a validated, immutable nested specification of named
//! axes. Each axis is either a nested sub-domain or a [`Leaf`]: a bounded
//! continuous range or a finite set of scalar literals. Construction
//! validates recursively, leaves first; after that every operation is a
//! pure function over the tree.
//!
//! Key insertion order is preserved and drives `flatten`, enumeration, and
//! record projection. Equality, hashing, and the disjoint-union algebra
//! work over the canonical (path-sorted) flattened form, so two domains
//! that spell the same axes in a different key order are equal.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;
use std::str::FromStr;

use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::enumerate::SampleIter;
use crate::error::{DomainError, DomainResult};
use crate::parser;
use crate::path::AxisPath;
use crate::raw::Raw;
use crate::sample::Sample;
use crate::value::{Number, Value};

/// Terminal axis specification: a continuous range or a finite set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
    /// Closed interval `[low, high]` with `low <= high`.
    Range { low: Number, high: Number },
    /// Non-empty set of scalar literals.
    Set(BTreeSet<Value>),
}

/// Classification of a leaf, used by [`Domain::split_by_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Continuous,
    Discrete,
    Categorical,
}

impl Leaf {
    /// Build a finite-set leaf from scalar values.
    pub fn set<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Leaf::Set(values.into_iter().map(Into::into).collect())
    }

    /// Build a continuous range leaf. Bounds are not validated here;
    /// `Domain::from_list` re-validates on insertion.
    pub fn range(low: impl Into<Number>, high: impl Into<Number>) -> Self {
        Leaf::Range {
            low: low.into(),
            high: high.into(),
        }
    }

    /// Classify this leaf: ranges are continuous, all-integer sets are
    /// discrete, every other set is categorical.
    pub fn kind(&self) -> LeafKind {
        match self {
            Leaf::Range { .. } => LeafKind::Continuous,
            Leaf::Set(values) => {
                if values.iter().all(Value::is_int) {
                    LeafKind::Discrete
                } else {
                    LeafKind::Categorical
                }
            }
        }
    }

    /// Project back to the raw literal form.
    pub fn to_raw(&self) -> Raw {
        match self {
            Leaf::Range { low, high } => Raw::Seq(vec![
                Raw::Scalar(Value::Number(*low)),
                Raw::Scalar(Value::Number(*high)),
            ]),
            Leaf::Set(values) => {
                Raw::Set(values.iter().map(|v| Raw::Scalar(v.clone())).collect())
            }
        }
    }

    /// One uniform draw from this leaf.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        match self {
            Leaf::Range { low, high } => {
                Value::from(rng.gen_range(low.as_f64()..=high.as_f64()))
            }
            Leaf::Set(values) => {
                let index = rng.gen_range(0..values.len());
                values
                    .iter()
                    .nth(index)
                    .cloned()
                    .expect("validated sets are non-empty")
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Branch(Vec<(String, Node)>),
    Leaf(Leaf),
}

/// A validated, immutable nested specification of named axes.
#[derive(Debug, Clone, Default)]
pub struct Domain {
    children: Vec<(String, Node)>,
}

impl Domain {
    /// Validate a raw nested mapping into a domain.
    ///
    /// Validation is recursive and eager: the input must be a mapping with
    /// string keys whose values are nested mappings, finite non-empty sets
    /// of scalars, or two-element numeric sequences with ascending bounds.
    pub fn new(raw: Raw) -> DomainResult<Self> {
        match raw {
            Raw::Map(entries) => Ok(Self {
                children: validate_branch(entries, &AxisPath::root())?,
            }),
            other => Err(DomainError::NotAMapping {
                found: other.type_name().to_string(),
            }),
        }
    }

    /// The empty domain, the identity of the disjoint union.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate the literal-text form.
    pub fn deserialise(text: &str) -> DomainResult<Self> {
        Self::new(parser::parse(text)?)
    }

    /// Canonical literal-text form; inverse of [`Domain::deserialise`].
    pub fn serialise(&self) -> String {
        self.to_string()
    }

    /// True when the domain has no axes.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Ordered (path, leaf) projection: depth-first, key insertion order.
    pub fn flatten(&self) -> Vec<(AxisPath, Leaf)> {
        let mut out = Vec::new();
        collect_leaves(&self.children, &AxisPath::root(), &mut out);
        out
    }

    /// Rebuild a domain from flattened entries; inverse of [`flatten`].
    ///
    /// Branch positions follow the first occurrence of each path prefix.
    /// A path that is both an intermediate node and a leaf, or appears
    /// twice, is a `PathConflict`.
    ///
    /// [`flatten`]: Domain::flatten
    pub fn from_list<I>(entries: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (AxisPath, Leaf)>,
    {
        let mut domain = Domain::empty();
        for (path, leaf) in entries {
            if path.is_empty() {
                return Err(DomainError::InvalidLeaf {
                    path,
                    reason: "axis path must have at least one segment".to_string(),
                });
            }
            if let Leaf::Range { low, high } = &leaf {
                validate_bounds(*low, *high, &path)?;
            }
            if let Leaf::Set(values) = &leaf {
                if values.is_empty() {
                    return Err(DomainError::InvalidLeaf {
                        path,
                        reason: "finite set must not be empty".to_string(),
                    });
                }
            }
            insert_leaf(&mut domain.children, path.segments(), &path, leaf)?;
        }
        Ok(domain)
    }

    /// Disjoint union with `other`.
    ///
    /// Defined only when the flattened path sets are disjoint (including
    /// branch/leaf prefix collisions); any overlap is an error, never a
    /// silent overwrite.
    pub fn union(&self, other: &Domain) -> DomainResult<Domain> {
        let mut entries = self.flatten();
        entries.extend(other.flatten());
        Domain::from_list(entries).map_err(|err| match err {
            DomainError::PathConflict { path } => DomainError::Overlap { path },
            other => other,
        })
    }

    /// Partition the leaves into (discrete, categorical, continuous)
    /// sub-domains. Paths are preserved; branches left with no leaves of a
    /// class are pruned. Summing the three reconstructs a domain equal to
    /// `self`.
    pub fn split_by_type(&self) -> (Domain, Domain, Domain) {
        (
            self.filter_kind(LeafKind::Discrete),
            self.filter_kind(LeafKind::Categorical),
            self.filter_kind(LeafKind::Continuous),
        )
    }

    fn filter_kind(&self, kind: LeafKind) -> Domain {
        Domain {
            children: filter_children(&self.children, kind),
        }
    }

    /// Lazy exhaustive enumeration, one [`Sample`] per combination of leaf
    /// values. Fails with `NotIterable` if any leaf is a continuous range;
    /// no partial enumeration is attempted.
    pub fn iter(&self) -> DomainResult<SampleIter> {
        SampleIter::new(self)
    }

    /// Number of samples [`Domain::iter`] would yield, or `None` when the
    /// domain has a continuous axis. Saturates at `u128::MAX`.
    pub fn cardinality(&self) -> Option<u128> {
        let mut product: u128 = 1;
        for (_, leaf) in self.flatten() {
            match leaf {
                Leaf::Set(values) => {
                    product = product.saturating_mul(values.len() as u128);
                }
                Leaf::Range { .. } => return None,
            }
        }
        Some(product)
    }

    /// One random draw: each range uniformly from its closed interval,
    /// each set uniformly over its elements, all leaves independent.
    /// Defined for every valid domain, continuous axes included.
    pub fn sample(&self) -> Sample {
        self.sample_with(&mut rand::thread_rng())
    }

    /// [`Domain::sample`] with a caller-owned random source, for seeded
    /// reproducibility or concurrent callers managing their own RNGs.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        let pairs: Vec<(AxisPath, Value)> = self
            .flatten()
            .into_iter()
            .map(|(path, leaf)| {
                let value = leaf.draw(rng);
                (path, value)
            })
            .collect();
        Sample::from_entries(&pairs)
    }

    /// Structural projection back to the raw nested-mapping form.
    pub fn as_dict(&self) -> Raw {
        Raw::Map(children_to_raw(&self.children))
    }

    /// Nested record projection: fields named after keys in insertion
    /// order, leaf fields holding the leaf specification unchanged.
    pub fn as_record(&self) -> Record {
        Record {
            fields: children_to_record(&self.children),
        }
    }

    /// Flattened entries sorted by path, the canonical form behind `Eq`
    /// and `Hash`.
    fn canonical_flatten(&self) -> Vec<(AxisPath, Leaf)> {
        let mut entries = self.flatten();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn validate_branch(
    entries: Vec<(Value, Raw)>,
    path: &AxisPath,
) -> DomainResult<Vec<(String, Node)>> {
    let mut children: Vec<(String, Node)> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let name = match key {
            Value::Str(s) => s,
            other => {
                return Err(DomainError::NonStringKey {
                    key: other.to_string(),
                })
            }
        };
        let child_path = path.child(&name);
        if children.iter().any(|(n, _)| *n == name) {
            return Err(DomainError::PathConflict { path: child_path });
        }
        let node = validate_node(value, &child_path)?;
        children.push((name, node));
    }
    Ok(children)
}

fn validate_node(raw: Raw, path: &AxisPath) -> DomainResult<Node> {
    match raw {
        Raw::Map(entries) => {
            if entries.is_empty() {
                // A leafless branch would silently vanish on flatten.
                return Err(DomainError::InvalidLeaf {
                    path: path.clone(),
                    reason: "nested mapping must not be empty".to_string(),
                });
            }
            Ok(Node::Branch(validate_branch(entries, path)?))
        }
        Raw::Set(items) => {
            if items.is_empty() {
                return Err(DomainError::InvalidLeaf {
                    path: path.clone(),
                    reason: "finite set must not be empty".to_string(),
                });
            }
            let mut values = BTreeSet::new();
            for item in items {
                match item {
                    Raw::Scalar(v) => {
                        if let Some(n) = v.as_number() {
                            // Mirrors the range-bound check: non-finite
                            // floats have no literal form and would break
                            // the serialise round-trip.
                            if !n.as_f64().is_finite() {
                                return Err(DomainError::InvalidLeaf {
                                    path: path.clone(),
                                    reason: "set elements must be finite".to_string(),
                                });
                            }
                        }
                        values.insert(v);
                    }
                    _ => return Err(DomainError::ContainerInSet { path: path.clone() }),
                }
            }
            Ok(Node::Leaf(Leaf::Set(values)))
        }
        Raw::Seq(items) => {
            if items.len() != 2 {
                return Err(DomainError::InvalidLeaf {
                    path: path.clone(),
                    reason: format!(
                        "a continuous range needs exactly two numeric bounds, found {}",
                        items.len()
                    ),
                });
            }
            let mut bounds = Vec::with_capacity(2);
            for item in items {
                match item {
                    Raw::Scalar(Value::Number(n)) => bounds.push(n),
                    other => {
                        return Err(DomainError::InvalidLeaf {
                            path: path.clone(),
                            reason: format!(
                                "range bounds must be numeric, found {}",
                                other.type_name()
                            ),
                        })
                    }
                }
            }
            let (low, high) = (bounds[0], bounds[1]);
            validate_bounds(low, high, path)?;
            Ok(Node::Leaf(Leaf::Range { low, high }))
        }
        Raw::Scalar(v) => Err(DomainError::InvalidLeaf {
            path: path.clone(),
            reason: format!("bare {} is not a range or finite set", v.type_name()),
        }),
    }
}

fn validate_bounds(low: Number, high: Number, path: &AxisPath) -> DomainResult<()> {
    if !low.as_f64().is_finite() || !high.as_f64().is_finite() {
        return Err(DomainError::InvalidLeaf {
            path: path.clone(),
            reason: "range bounds must be finite".to_string(),
        });
    }
    if low.as_f64() > high.as_f64() {
        return Err(DomainError::InvalidLeaf {
            path: path.clone(),
            reason: format!("range bounds are descending: [{low}, {high}]"),
        });
    }
    Ok(())
}

fn collect_leaves(
    children: &[(String, Node)],
    prefix: &AxisPath,
    out: &mut Vec<(AxisPath, Leaf)>,
) {
    for (name, node) in children {
        let path = prefix.child(name);
        match node {
            Node::Leaf(leaf) => out.push((path, leaf.clone())),
            Node::Branch(sub) => collect_leaves(sub, &path, out),
        }
    }
}

fn insert_leaf(
    children: &mut Vec<(String, Node)>,
    segments: &[String],
    full: &AxisPath,
    leaf: Leaf,
) -> DomainResult<()> {
    let (head, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(DomainError::PathConflict { path: full.clone() }),
    };
    if let Some(pos) = children.iter().position(|(n, _)| n == head) {
        match &mut children[pos].1 {
            Node::Branch(sub) if !rest.is_empty() => insert_leaf(sub, rest, full, leaf),
            _ => Err(DomainError::PathConflict { path: full.clone() }),
        }
    } else if rest.is_empty() {
        children.push((head.clone(), Node::Leaf(leaf)));
        Ok(())
    } else {
        let mut sub = Vec::new();
        insert_leaf(&mut sub, rest, full, leaf)?;
        children.push((head.clone(), Node::Branch(sub)));
        Ok(())
    }
}

fn filter_children(children: &[(String, Node)], kind: LeafKind) -> Vec<(String, Node)> {
    children
        .iter()
        .filter_map(|(name, node)| match node {
            Node::Leaf(leaf) if leaf.kind() == kind => {
                Some((name.clone(), Node::Leaf(leaf.clone())))
            }
            Node::Leaf(_) => None,
            Node::Branch(sub) => {
                let filtered = filter_children(sub, kind);
                if filtered.is_empty() {
                    None
                } else {
                    Some((name.clone(), Node::Branch(filtered)))
                }
            }
        })
        .collect()
}

fn children_to_raw(children: &[(String, Node)]) -> Vec<(Value, Raw)> {
    children
        .iter()
        .map(|(name, node)| {
            let value = match node {
                Node::Leaf(leaf) => leaf.to_raw(),
                Node::Branch(sub) => Raw::Map(children_to_raw(sub)),
            };
            (Value::Str(name.clone()), value)
        })
        .collect()
}

fn children_to_record(children: &[(String, Node)]) -> Vec<(String, Field)> {
    children
        .iter()
        .map(|(name, node)| {
            let field = match node {
                Node::Leaf(leaf) => Field::Leaf(leaf.clone()),
                Node::Branch(sub) => Field::Nested(Record {
                    fields: children_to_record(sub),
                }),
            };
            (name.clone(), field)
        })
        .collect()
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_flatten() == other.canonical_flatten()
    }
}

impl Eq for Domain {}

impl Hash for Domain {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let canonical = self.canonical_flatten();
        canonical.len().hash(state);
        for (path, leaf) in canonical {
            path.hash(state);
            leaf.hash(state);
        }
    }
}

impl Add for Domain {
    type Output = DomainResult<Domain>;

    fn add(self, rhs: Domain) -> Self::Output {
        self.union(&rhs)
    }
}

/// Lets disjoint unions chain: `a + b + c`.
impl Add<Domain> for DomainResult<Domain> {
    type Output = DomainResult<Domain>;

    fn add(self, rhs: Domain) -> Self::Output {
        self?.union(&rhs)
    }
}

impl fmt::Display for Domain {
    /// Canonical literal text: mappings in key insertion order, set
    /// elements in sorted value order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_dict())
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::deserialise(s)
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Domain {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Domain::deserialise(&text).map_err(de::Error::custom)
    }
}

/// Nested record projection of a domain: named fields in key insertion
/// order, with leaf fields holding the unchanged leaf specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

/// One field of a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Leaf(Leaf),
    Nested(Record),
}

impl Record {
    /// Field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Field names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }
}

impl Field {
    /// The leaf specification, if this field is terminal.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Field::Leaf(leaf) => Some(leaf),
            Field::Nested(_) => None,
        }
    }

    /// The nested record, if this field is a branch.
    pub fn as_nested(&self) -> Option<&Record> {
        match self {
            Field::Leaf(_) => None,
            Field::Nested(record) => Some(record),
        }
    }
}

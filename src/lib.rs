//! Tunespace - typed parameter domains for search and tuning
//!
//! Tunespace models a multi-dimensional search space as a recursive,
//! immutable [`Domain`]: a nested tree of named axes whose leaves are
//! continuous ranges or finite sets of literals. Optimizers and samplers
//! consume domains through a small set of pure operations: validation,
//! flattening, exhaustive enumeration, random sampling, type
//! classification, disjoint union, and a safe round-trip literal codec.
//!
//! ```
//! use tunespace::Domain;
//!
//! let domain = Domain::deserialise(r#"{"lr": [0.001, 0.1], "layers": {2, 3, 4}}"#)?;
//! let point = domain.sample();
//! assert!(point.get("lr").is_some());
//!
//! let (discrete, _categorical, continuous) = domain.split_by_type();
//! assert_eq!(discrete.cardinality(), Some(3));
//! assert!(continuous.cardinality().is_none());
//! # Ok::<(), tunespace::DomainError>(())
//! ```

pub mod domain;
pub mod enumerate;
pub mod error;
pub mod parser;
pub mod path;
pub mod raw;
pub mod sample;
pub mod value;

// Re-exports for convenience
pub use domain::{Domain, Field, Leaf, LeafKind, Record};
pub use enumerate::SampleIter;
pub use error::{DomainError, DomainResult};
pub use parser::parse;
pub use path::AxisPath;
pub use raw::Raw;
pub use sample::{Sample, SampleValue};
pub use value::{Number, Value};

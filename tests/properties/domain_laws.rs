//! Property tests for domain round-trip and algebra laws.

use std::collections::HashSet;

use proptest::collection::{btree_map, btree_set};
use proptest::prelude::*;

use tunespace::{Domain, Leaf, LeafKind, Number, Raw, Sample, Value};

fn number() -> impl Strategy<Value = Number> {
    prop_oneof![
        (-1000i64..1000).prop_map(Number::Int),
        (-1000.0..1000.0f64).prop_map(Number::Float),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-1000i64..1000).prop_map(Value::from),
        (-1000.0..1000.0f64).prop_map(Value::from),
        "[a-z][a-z0-9]{0,7}"
            .prop_filter("not a keyword", |s| s != "true" && s != "false")
            .prop_map(Value::Str),
        any::<bool>().prop_map(Value::from),
    ]
}

fn range_leaf() -> impl Strategy<Value = Raw> {
    (number(), number()).prop_map(|(a, b)| {
        let (low, high) = if a.as_f64() <= b.as_f64() { (a, b) } else { (b, a) };
        Raw::Seq(vec![
            Raw::Scalar(Value::Number(low)),
            Raw::Scalar(Value::Number(high)),
        ])
    })
}

fn set_leaf() -> impl Strategy<Value = Raw> {
    btree_set(scalar(), 1..4)
        .prop_map(|values| Raw::Set(values.into_iter().map(Raw::Scalar).collect()))
}

fn into_map(entries: std::collections::BTreeMap<String, Raw>) -> Raw {
    Raw::Map(
        entries
            .into_iter()
            .map(|(k, v)| (Value::Str(k), v))
            .collect(),
    )
}

/// Arbitrary valid domain: nested mappings of bounded depth and width,
/// with both range and set leaves.
fn arb_domain() -> impl Strategy<Value = Domain> {
    let leaf = prop_oneof![range_leaf(), set_leaf()];
    let node = leaf.prop_recursive(3, 24, 3, |inner| {
        btree_map("[a-z]{1,6}", inner, 1..4).prop_map(into_map)
    });
    btree_map("[a-z]{1,6}", node, 0..4)
        .prop_map(into_map)
        .prop_map(|raw| Domain::new(raw).expect("generated domains are valid"))
}

/// Arbitrary fully discrete domain, small enough to enumerate eagerly.
fn arb_discrete_domain() -> impl Strategy<Value = Domain> {
    let leaf = btree_set(scalar(), 1..3)
        .prop_map(|values| Raw::Set(values.into_iter().map(Raw::Scalar).collect()));
    let node = leaf.prop_recursive(2, 6, 2, |inner| {
        btree_map("[a-z]{1,4}", inner, 1..3).prop_map(into_map)
    });
    btree_map("[a-z]{1,4}", node, 0..3)
        .prop_map(into_map)
        .prop_map(|raw| Domain::new(raw).expect("generated domains are valid"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: flatten and from_list are inverse.
    #[test]
    fn property_flatten_from_list_round_trip(d in arb_domain()) {
        let rebuilt = Domain::from_list(d.flatten()).expect("flatten entries are conflict-free");
        prop_assert_eq!(rebuilt, d);
    }

    /// PROPERTY: the literal codec round-trips every valid domain.
    #[test]
    fn property_serialise_deserialise_round_trip(d in arb_domain()) {
        let text = d.serialise();
        let back = Domain::deserialise(&text).expect("serialised text must parse");
        prop_assert_eq!(back, d);
    }

    /// PROPERTY: as_dict projects a mapping that re-validates to an equal
    /// domain.
    #[test]
    fn property_as_dict_round_trip(d in arb_domain()) {
        let back = Domain::new(d.as_dict()).expect("as_dict output is valid");
        prop_assert_eq!(back, d);
    }

    /// PROPERTY: split_by_type is a lossless partition whose parts sum
    /// back to the original, and each part is homogeneous.
    #[test]
    fn property_split_partitions_and_sums(d in arb_domain()) {
        let (discrete, categorical, continuous) = d.split_by_type();
        for (part, kind) in [
            (&discrete, LeafKind::Discrete),
            (&categorical, LeafKind::Categorical),
            (&continuous, LeafKind::Continuous),
        ] {
            for (_, leaf) in part.flatten() {
                prop_assert_eq!(leaf.kind(), kind);
            }
        }
        let sum = (Domain::empty() + discrete + categorical + continuous)
            .expect("partition parts are disjoint");
        prop_assert_eq!(sum, d);
    }

    /// PROPERTY: self-addition always violates disjointness for non-empty
    /// domains.
    #[test]
    fn property_self_addition_fails(d in arb_domain()) {
        if d.is_empty() {
            prop_assert_eq!((d.clone() + d).unwrap(), Domain::empty());
        } else {
            prop_assert!((d.clone() + d).is_err());
        }
    }

    /// PROPERTY: enumeration yields exactly `cardinality` distinct
    /// samples, each inside the domain.
    #[test]
    fn property_enumeration_is_exhaustive(d in arb_discrete_domain()) {
        let expected = d.cardinality().expect("discrete domains have a cardinality");
        let samples: Vec<Sample> = d.iter().expect("discrete domains enumerate").collect();
        prop_assert_eq!(samples.len() as u128, expected);
        let distinct: HashSet<Sample> = samples.iter().cloned().collect();
        prop_assert_eq!(distinct.len(), samples.len());
        for s in &samples {
            for (path, leaf) in d.flatten() {
                let value = s.value_at(&path).expect("sample covers every axis");
                match leaf {
                    Leaf::Set(values) => prop_assert!(values.contains(value)),
                    Leaf::Range { .. } => unreachable!("discrete domains have no ranges"),
                }
            }
        }
    }

    /// PROPERTY: sampling always lands inside every leaf's range or set.
    #[test]
    fn property_samples_stay_inside_leaves(d in arb_domain()) {
        let s = d.sample();
        for (path, leaf) in d.flatten() {
            let value = s.value_at(&path).expect("sample covers every axis");
            match leaf {
                Leaf::Set(values) => prop_assert!(values.contains(value)),
                Leaf::Range { low, high } => {
                    let drawn = value.as_number().expect("range draws are numeric").as_f64();
                    prop_assert!((low.as_f64()..=high.as_f64()).contains(&drawn));
                }
            }
        }
    }
}

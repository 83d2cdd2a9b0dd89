// ============================================================
// Domain — Nested Containers
// ============================================================
// A value that is either a leaf, a string-keyed mapping of
// values, or an ordered sequence of values, recursively.
//
// The mapper walks the structure and rebuilds it with every
// leaf transformed. Shape is preserved exactly:
//
//   {"a": 1, "b": [2, {"c": 3}]}   --(x * x)-->
//   {"a": 1, "b": [4, {"c": 9}]}
//
// Mappings and sequences never swap kinds, and the input is
// consumed rather than mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A nested mapping/sequence structure with leaves of type `T`.
///
/// Serialises as plain JSON-shaped data: objects become `Map`,
/// arrays become `Seq` and anything else is a `Leaf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Map(BTreeMap<String, Nested<T>>),
    Seq(Vec<Nested<T>>),
    Leaf(T),
}

impl<T> Nested<T> {
    /// True for `Map` and `Seq`
    pub fn is_container(&self) -> bool {
        !matches!(self, Nested::Leaf(_))
    }

    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Nested::Leaf(v) => Some(v),
            _ => None,
        }
    }

    /// Number of leaves anywhere in the structure
    pub fn leaf_count(&self) -> usize {
        match self {
            Nested::Leaf(_) => 1,
            Nested::Map(m) => m.values().map(Nested::leaf_count).sum(),
            Nested::Seq(s) => s.iter().map(Nested::leaf_count).sum(),
        }
    }
}

impl<T> From<T> for Nested<T> {
    fn from(value: T) -> Self {
        Nested::Leaf(value)
    }
}

/// Rebuild `value` with `f` applied to every leaf.
///
/// Mapping entries recurse only when the entry is itself a container and
/// get `f` directly otherwise; sequence elements always recurse. Both
/// paths end in `f(leaf)`, so the result is the same either way.
pub fn map_leaves<T, U, F>(value: Nested<T>, mut f: F) -> Nested<U>
where
    F: FnMut(T) -> U,
{
    map_inner(value, &mut f)
}

fn map_inner<T, U, F>(value: Nested<T>, f: &mut F) -> Nested<U>
where
    F: FnMut(T) -> U,
{
    match value {
        Nested::Map(entries) => Nested::Map(
            entries
                .into_iter()
                .map(|(k, v)| {
                    let mapped = match v {
                        Nested::Leaf(leaf) => Nested::Leaf(f(leaf)),
                        container => map_inner(container, f),
                    };
                    (k, mapped)
                })
                .collect(),
        ),
        Nested::Seq(items) => {
            Nested::Seq(items.into_iter().map(|v| map_inner(v, f)).collect())
        }
        Nested::Leaf(leaf) => Nested::Leaf(f(leaf)),
    }
}

/// Fallible variant of [`map_leaves`]. The first error returned by `f`
/// aborts the walk and is passed through untouched.
pub fn try_map_leaves<T, U, E, F>(value: Nested<T>, mut f: F) -> Result<Nested<U>, E>
where
    F: FnMut(T) -> Result<U, E>,
{
    try_map_inner(value, &mut f)
}

fn try_map_inner<T, U, E, F>(value: Nested<T>, f: &mut F) -> Result<Nested<U>, E>
where
    F: FnMut(T) -> Result<U, E>,
{
    match value {
        Nested::Map(entries) => {
            let mut out = BTreeMap::new();
            for (k, v) in entries {
                let mapped = match v {
                    Nested::Leaf(leaf) => Nested::Leaf(f(leaf)?),
                    container => try_map_inner(container, f)?,
                };
                out.insert(k, mapped);
            }
            Ok(Nested::Map(out))
        }
        Nested::Seq(items) => items
            .into_iter()
            .map(|v| try_map_inner(v, f))
            .collect::<Result<Vec<_>, E>>()
            .map(Nested::Seq),
        Nested::Leaf(leaf) => f(leaf).map(Nested::Leaf),
    }
}

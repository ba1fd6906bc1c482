//! Scalar-or-sequence query arguments and shaped results.
//!
//! Batch queries take each argument as [`OneOrMany`] and return a [`Shaped`]
//! value whose nesting follows the arguments:
//!
//! | classes | thresholds | result                                      |
//! |---------|------------|---------------------------------------------|
//! | one     | one        | `Scalar`                                    |
//! | one     | many       | `Sequence` indexed by threshold             |
//! | many    | one        | `Sequence` indexed by class                 |
//! | many    | many       | `Sequence` by threshold of `Sequence` by class |

use serde::{Deserialize, Serialize};

/// A query argument given either as a single value or as an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }

    /// View the argument as a slice; a single value is a slice of length one.
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }
}

impl From<f64> for OneOrMany<f64> {
    fn from(value: f64) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<f64>> for OneOrMany<f64> {
    fn from(values: Vec<f64>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<&[f64]> for OneOrMany<f64> {
    fn from(values: &[f64]) -> Self {
        OneOrMany::Many(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for OneOrMany<f64> {
    fn from(values: [f64; N]) -> Self {
        OneOrMany::Many(values.to_vec())
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany<String> {
    fn from(values: &[&str]) -> Self {
        OneOrMany::Many(values.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(values: [&str; N]) -> Self {
        OneOrMany::Many(values.iter().map(|s| s.to_string()).collect())
    }
}

/// A query result nested to match the shape of the query arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shaped<T> {
    Scalar(T),
    Sequence(Vec<Shaped<T>>),
}

impl<T> Shaped<T> {
    /// Shape a threshold-major grid of per-class results.
    ///
    /// `grid[t][c]` holds the result for threshold `t` and class `c`.
    pub fn from_grid(grid: Vec<Vec<T>>, classes_many: bool, thresholds_many: bool) -> Self {
        let rows: Vec<Shaped<T>> = grid
            .into_iter()
            .map(|per_class| Shaped::from_values(per_class, classes_many))
            .collect();
        if thresholds_many {
            Shaped::Sequence(rows)
        } else {
            rows.into_iter().next().unwrap_or(Shaped::Sequence(Vec::new()))
        }
    }

    /// Shape a flat list of results, one per argument value.
    pub fn from_values(values: Vec<T>, many: bool) -> Self {
        if many {
            Shaped::Sequence(values.into_iter().map(Shaped::Scalar).collect())
        } else {
            values
                .into_iter()
                .next()
                .map_or(Shaped::Sequence(Vec::new()), Shaped::Scalar)
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Shaped::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&T> {
        match self {
            Shaped::Scalar(value) => Some(value),
            Shaped::Sequence(_) => None,
        }
    }

    pub fn into_scalar(self) -> Option<T> {
        match self {
            Shaped::Scalar(value) => Some(value),
            Shaped::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Shaped<T>]> {
        match self {
            Shaped::Scalar(_) => None,
            Shaped::Sequence(items) => Some(items),
        }
    }

    /// Unwrap a one-level sequence of scalars.
    pub fn into_vec(self) -> Option<Vec<T>> {
        match self {
            Shaped::Scalar(_) => None,
            Shaped::Sequence(items) => items.into_iter().map(Shaped::into_scalar).collect(),
        }
    }

    /// Unwrap a sequence of sequences of scalars.
    pub fn into_grid(self) -> Option<Vec<Vec<T>>> {
        match self {
            Shaped::Scalar(_) => None,
            Shaped::Sequence(items) => items.into_iter().map(Shaped::into_vec).collect(),
        }
    }

    /// All leaf values in order.
    pub fn flatten(self) -> Vec<T> {
        match self {
            Shaped::Scalar(value) => vec![value],
            Shaped::Sequence(items) => items.into_iter().flat_map(Shaped::flatten).collect(),
        }
    }

    pub fn map<U, F>(self, f: F) -> Shaped<U>
    where
        F: Fn(T) -> U + Copy,
    {
        match self {
            Shaped::Scalar(value) => Shaped::Scalar(f(value)),
            Shaped::Sequence(items) => {
                Shaped::Sequence(items.into_iter().map(|item| item.map(f)).collect())
            }
        }
    }
}

impl<T> Shaped<Option<T>> {
    /// Same shape with every leaf defined, or `None` if any leaf is `None`.
    pub fn transpose(self) -> Option<Shaped<T>> {
        match self {
            Shaped::Scalar(value) => value.map(Shaped::Scalar),
            Shaped::Sequence(items) => items
                .into_iter()
                .map(Shaped::transpose)
                .collect::<Option<Vec<_>>>()
                .map(Shaped::Sequence),
        }
    }
}

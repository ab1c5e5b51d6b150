//! Date alignment of return series.
//!
//! Relative statistics are only meaningful on a shared date axis. The
//! default policy is the intersection ([`AlignedPair`]); the union policy
//! ([`UnionAligned`]) keeps every date of either series and marks the
//! missing side as `None`.

use crate::series::ReturnSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How two series are put on a common date axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPolicy {
    /// Keep only dates present in both series
    #[default]
    Intersection,
    /// Keep dates present in either series; missing values are undefined
    Union,
}

/// Two return series restricted to their common dates.
///
/// After construction both sides have identical, equal-length date axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    dates: Vec<NaiveDate>,
    left: Vec<f64>,
    right: Vec<f64>,
    left_n_stocks: Option<Vec<f64>>,
}

impl AlignedPair {
    /// Inner-join `left` and `right` on date.
    pub fn intersect(left: &ReturnSeries, right: &ReturnSeries) -> Self {
        let (ld, rd) = (left.dates(), right.dates());
        let left_counts = left.n_stocks();

        let mut pair = Self {
            dates: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
            left_n_stocks: left_counts.map(|_| Vec::new()),
        };

        let (mut i, mut j) = (0, 0);
        while i < ld.len() && j < rd.len() {
            match ld[i].cmp(&rd[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    pair.dates.push(ld[i]);
                    pair.left.push(left.returns()[i]);
                    pair.right.push(right.returns()[j]);
                    if let (Some(out), Some(counts)) = (pair.left_n_stocks.as_mut(), left_counts) {
                        out.push(counts[i]);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }

        pair
    }

    /// Shared dates.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Left-hand returns on the shared dates.
    pub fn left(&self) -> &[f64] {
        &self.left
    }

    /// Right-hand returns on the shared dates.
    pub fn right(&self) -> &[f64] {
        &self.right
    }

    /// Left-hand constituent counts on the shared dates.
    pub fn left_n_stocks(&self) -> Option<&[f64]> {
        self.left_n_stocks.as_deref()
    }

    /// Number of shared dates.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series share no dates.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Left minus right, date by date.
    pub fn differences(&self) -> Vec<f64> {
        self.left.iter().zip(&self.right).map(|(l, r)| l - r).collect()
    }
}

/// Two return series on the union of their dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionAligned {
    /// Every date present in either series.
    pub dates: Vec<NaiveDate>,
    /// Left-hand returns, `None` where the left series has no observation.
    pub left: Vec<Option<f64>>,
    /// Right-hand returns, `None` where the right series has no observation.
    pub right: Vec<Option<f64>>,
}

impl UnionAligned {
    /// Outer-join `left` and `right` on date.
    pub fn outer(left: &ReturnSeries, right: &ReturnSeries) -> Self {
        let (ld, rd) = (left.dates(), right.dates());
        let mut out = Self {
            dates: Vec::with_capacity(ld.len().max(rd.len())),
            left: Vec::new(),
            right: Vec::new(),
        };

        let (mut i, mut j) = (0, 0);
        while i < ld.len() || j < rd.len() {
            let order = match (ld.get(i), rd.get(j)) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                _ => Ordering::Greater,
            };
            match order {
                Ordering::Less => {
                    out.push(ld[i], Some(left.returns()[i]), None);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(rd[j], None, Some(right.returns()[j]));
                    j += 1;
                }
                Ordering::Equal => {
                    out.push(ld[i], Some(left.returns()[i]), Some(right.returns()[j]));
                    i += 1;
                    j += 1;
                }
            }
        }

        out
    }

    /// Intersection presented in the same shape as the union.
    pub fn inner(left: &ReturnSeries, right: &ReturnSeries) -> Self {
        let pair = AlignedPair::intersect(left, right);
        Self {
            left: pair.left.iter().copied().map(Some).collect(),
            right: pair.right.iter().copied().map(Some).collect(),
            dates: pair.dates,
        }
    }

    fn push(&mut self, date: NaiveDate, left: Option<f64>, right: Option<f64>) {
        self.dates.push(date);
        self.left.push(left);
        self.right.push(right);
    }
}

/// Dates present in every one of the given date axes.
///
/// Returns an empty vector when no axis is given.
pub fn common_dates<'a, I>(axes: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a [NaiveDate]>,
{
    let mut axes = axes.into_iter();
    let Some(first) = axes.next() else {
        return Vec::new();
    };
    let mut common = first.to_vec();
    for axis in axes {
        common.retain(|d| axis.binary_search(d).is_ok());
    }
    common
}

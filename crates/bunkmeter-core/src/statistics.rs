//! Attendance statistics and the bunk-budget search.
//!
//! Every function here is pure: counts in, statistics out. Ratios inside
//! the searches are compared unrounded; rounding to two decimals happens
//! only when a percentage is reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::model::{AttendanceStatus, BunkBudget, OverallStatus, SubjectRecord, SubjectStatus};

/// The default minimum attendance ratio (75 %).
pub const DEFAULT_TARGET: f64 = 0.75;

/// Minimum attendance ratio a student has to maintain.
///
/// Always strictly between 0 and 1, which is what guarantees the
/// must-attend search terminates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target(f64);

impl Target {
    /// Build a target from a ratio such as `0.75`.
    pub fn new(ratio: f64) -> Result<Self, StatsError> {
        if ratio > 0.0 && ratio < 1.0 {
            Ok(Self(ratio))
        } else {
            Err(StatsError::InvalidTarget(ratio))
        }
    }

    /// Build a target from a percentage such as `75.0`.
    pub fn from_percent(percent: f64) -> Result<Self, StatsError> {
        if percent > 0.0 && percent < 100.0 {
            Ok(Self(percent / 100.0))
        } else {
            Err(StatsError::InvalidTargetPercent(percent))
        }
    }

    pub fn ratio(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for Target {
    fn default() -> Self {
        Self(DEFAULT_TARGET)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", round2(self.percent()))
    }
}

/// Round half-up to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator as f64
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Attendance percentage rounded to two decimals, or `0` when no classes were held.
pub fn percentage(attended: u32, total: u32) -> f64 {
    percentage_of(attended as u64, total as u64)
}

fn percentage_of(attended: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(ratio(attended, total) * 100.0)
}

/// Compute how many classes can be skipped, or must be attended, to stay
/// at or above `target`.
///
/// * Below target: the smallest `k` with `(attended + k) / (total + k) >= target`,
///   reported as `must_attend` with status [`AttendanceStatus::Danger`].
/// * At or above target: the largest `s` such that missing each of the next
///   `s` classes keeps `attended / (total + s) >= target`, reported as
///   `skippable` with status [`AttendanceStatus::Safe`].
///
/// With `total == 0` there is nothing to budget yet: the result is
/// `Danger` with both counts zero. Counts beyond `u32::MAX` are reported
/// as `u32::MAX`.
pub fn bunk_budget(attended: u32, total: u32, target: Target) -> BunkBudget {
    budget_of(attended as u64, total as u64, target)
}

fn budget_of(a: u64, t: u64, target: Target) -> BunkBudget {
    if t == 0 {
        return BunkBudget {
            skippable: 0,
            must_attend: 0,
            status: AttendanceStatus::Danger,
        };
    }

    let goal = target.ratio();
    if ratio(a, t) < goal {
        BunkBudget {
            skippable: 0,
            must_attend: saturate(classes_to_recover(a, t, goal)),
            status: AttendanceStatus::Danger,
        }
    } else {
        BunkBudget {
            skippable: saturate(classes_to_skip(a, t, goal)),
            must_attend: 0,
            status: AttendanceStatus::Safe,
        }
    }
}

/// Upper bound for both searches: one past the largest reportable count.
const SEARCH_LIMIT: u64 = u32::MAX as u64 + 1;

/// Minimum number of consecutive attended classes that lifts `a / t` to `goal`,
/// or [`SEARCH_LIMIT`] when that is not reachable below it.
///
/// `(a + k) / (t + k)` only grows with `k`, so a bisection over
/// `0..=SEARCH_LIMIT` finds the same answer as attending one class at a time.
fn classes_to_recover(a: u64, t: u64, goal: f64) -> u64 {
    let reached = |k: u64| ratio(a.saturating_add(k), t.saturating_add(k)) >= goal;

    if !reached(SEARCH_LIMIT) {
        return SEARCH_LIMIT;
    }
    let (mut lo, mut hi) = (0, SEARCH_LIMIT);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if reached(mid) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// Number of further classes that can be missed one after another while
/// `a / (t + s)` stays at or above `goal`, capped at [`SEARCH_LIMIT`].
///
/// Expects `a / t >= goal`, i.e. `fits(0)`.
fn classes_to_skip(a: u64, t: u64, goal: f64) -> u64 {
    let fits = |s: u64| ratio(a, t.saturating_add(s)) >= goal;

    if fits(SEARCH_LIMIT) {
        return SEARCH_LIMIT;
    }
    // Invariant: fits(lo) && !fits(hi).
    let (mut lo, mut hi) = (0, SEARCH_LIMIT);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Per-subject percentage and bunk budget. The input is left untouched.
pub fn compute_subject_status(subject: &SubjectRecord, target: Target) -> SubjectStatus {
    let budget = bunk_budget(subject.attended, subject.total, target);
    SubjectStatus {
        subject: subject.clone(),
        percentage: percentage(subject.attended, subject.total),
        skippable: budget.skippable,
        must_attend: budget.must_attend,
        status: budget.status,
    }
}

/// Statistics for every subject, in input order.
pub fn compute_subject_statuses(subjects: &[SubjectRecord], target: Target) -> Vec<SubjectStatus> {
    subjects
        .iter()
        .map(|s| compute_subject_status(s, target))
        .collect()
}

/// Aggregate counts over all subjects and budget them as one.
///
/// An empty slice yields the zero-total result rather than an error.
pub fn compute_overall(subjects: &[SubjectRecord], target: Target) -> OverallStatus {
    let attended: u64 = subjects.iter().map(|s| s.attended as u64).sum();
    let total: u64 = subjects.iter().map(|s| s.total as u64).sum();

    let budget = budget_of(attended, total, target);
    OverallStatus {
        attended,
        total,
        percentage: percentage_of(attended, total),
        skippable: budget.skippable,
        must_attend: budget.must_attend,
        status: budget.status,
    }
}

/// Outcome of a what-if scenario over the next few classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub attended: u32,
    pub total: u32,
    pub percentage: f64,
    pub status: AttendanceStatus,
    /// Change in percentage points against the current figure.
    pub delta: f64,
}

/// Project attending the next `attend_next` classes and missing the next `skip_next`.
pub fn project(
    attended: u32,
    total: u32,
    attend_next: u32,
    skip_next: u32,
    target: Target,
) -> Projection {
    let new_attended = attended.saturating_add(attend_next);
    let new_total = total.saturating_add(attend_next).saturating_add(skip_next);
    let new_percentage = percentage(new_attended, new_total);

    Projection {
        attended: new_attended,
        total: new_total,
        percentage: new_percentage,
        status: bunk_budget(new_attended, new_total, target).status,
        delta: round2(new_percentage - percentage(attended, total)),
    }
}

/// Coarse colour band for a percentage, finer-grained than Safe/Danger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBand {
    Critical,
    Warning,
    Good,
    Excellent,
}

impl StatusBand {
    /// Upper edge of the `Good` band, in percent.
    const EXCELLENT_FROM: f64 = 85.0;

    pub fn classify(percentage: f64, target: Target) -> Self {
        let target = target.percent();
        if percentage < target - 10.0 {
            StatusBand::Critical
        } else if percentage < target {
            StatusBand::Warning
        } else if percentage < Self::EXCELLENT_FROM {
            StatusBand::Good
        } else {
            StatusBand::Excellent
        }
    }
}

impl fmt::Display for StatusBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusBand::Critical => write!(f, "Critical"),
            StatusBand::Warning => write!(f, "Warning"),
            StatusBand::Good => write!(f, "Good"),
            StatusBand::Excellent => write!(f, "Excellent"),
        }
    }
}

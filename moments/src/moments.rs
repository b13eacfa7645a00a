//! A single-pass accumulator for the first four moments of a stream.

use std::fmt::{Display, Formatter};
use std::iter::Sum;

use biometrics::Counter;

use crate::Error;

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static MERGE: Counter = Counter::new("moments.merge");
static MERGE_EMPTY: Counter = Counter::new("moments.merge.empty");
static INSUFFICIENT_DATA: Counter = Counter::new("moments.insufficient_data");
static ZERO_VARIANCE: Counter = Counter::new("moments.zero_variance");
static INVALID_STATE: Counter = Counter::new("moments.invalid_state");

pub(crate) fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&MERGE);
    collector.register_counter(&MERGE_EMPTY);
    collector.register_counter(&INSUFFICIENT_DATA);
    collector.register_counter(&ZERO_VARIANCE);
    collector.register_counter(&INVALID_STATE);
}

///////////////////////////////////////// MomentAccumulator ////////////////////////////////////////

/// MomentAccumulator tracks the count, mean, and the second through fourth centered moment sums
/// of every observation pushed into it.  No observation is retained.
///
/// Accumulators fed from disjoint shards of a stream may be merged to get the accumulator of the
/// whole stream.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MomentAccumulator {
    count: u64,
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
}

impl MomentAccumulator {
    /// Create a new, empty accumulator.
    pub const fn new() -> Self {
        Self {
            count: 0,
            m1: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    /// Rebuild an accumulator from the values returned by [MomentAccumulator::parts].
    ///
    /// Returns [Error::InvalidState] when the parts could not have come from any sequence of
    /// observations.
    pub fn from_parts(count: u64, m1: f64, m2: f64, m3: f64, m4: f64) -> Result<Self, Error> {
        let invalid = |what: &'static str| -> Result<Self, Error> {
            INVALID_STATE.click();
            Err(Error::InvalidState { what })
        };
        if count == 0 && (m1 != 0.0 || m2 != 0.0 || m3 != 0.0 || m4 != 0.0) {
            return invalid("empty accumulator with non-zero moments");
        }
        if count == 1 && (m2 != 0.0 || m3 != 0.0 || m4 != 0.0) {
            return invalid("single observation with non-zero dispersion");
        }
        if m2 < 0.0 {
            return invalid("negative second moment");
        }
        if m4 < 0.0 {
            return invalid("negative fourth moment");
        }
        if m2 == 0.0 && (m3 != 0.0 || m4 != 0.0) {
            return invalid("zero variance with non-zero higher moments");
        }
        Ok(Self {
            count,
            m1,
            m2,
            m3,
            m4,
        })
    }

    /// The sufficient statistics as (count, mean, m2, m3, m4).
    pub fn parts(&self) -> (u64, f64, f64, f64, f64) {
        (self.count, self.m1, self.m2, self.m3, self.m4)
    }

    /// Fold one observation into the accumulator.
    ///
    /// Non-finite observations are accepted and propagate through the moments.
    pub fn push(&mut self, x: f64) {
        // The order of these updates matters:  m4 reads the old m2 and m3, m3 reads the old m2.
        let n1: f64 = self.count as f64;
        self.count += 1;
        let n: f64 = self.count as f64;
        let delta: f64 = x - self.m1;
        let delta_n: f64 = delta / n;
        let delta_n2: f64 = delta_n * delta_n;
        let term1: f64 = delta * delta_n * n1;
        self.m1 += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3. * n + 3.) + 6. * delta_n2 * self.m2
            - 4. * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.) - 3. * delta_n * self.m2;
        self.m2 += term1;
    }

    /// The number of observations.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// True iff no observation has been pushed or merged in.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The arithmetic mean.  Requires one observation.
    pub fn mean(&self) -> Result<f64, Error> {
        self.require(1)?;
        Ok(self.m1)
    }

    /// The population variance, `m2 / n`.  Requires one observation.
    pub fn variance(&self) -> Result<f64, Error> {
        let n = self.require(1)?;
        Ok(self.m2 / n)
    }

    /// The sample variance, `m2 / (n - 1)`.  Requires two observations.
    pub fn sample_variance(&self) -> Result<f64, Error> {
        let n = self.require(2)?;
        Ok(self.m2 / (n - 1.))
    }

    /// The square root of [MomentAccumulator::variance].
    pub fn standard_deviation(&self) -> Result<f64, Error> {
        Ok(self.variance()?.sqrt())
    }

    /// The square root of [MomentAccumulator::sample_variance].
    pub fn sample_standard_deviation(&self) -> Result<f64, Error> {
        Ok(self.sample_variance()?.sqrt())
    }

    /// The skewness, `sqrt(n) * m3 / m2^1.5`.
    ///
    /// Requires two observations that are not all equal.
    pub fn skewness(&self) -> Result<f64, Error> {
        let n = self.dispersed()?;
        Ok(n.sqrt() * self.m3 / self.m2.powf(1.5))
    }

    /// The excess kurtosis, `n * m4 / m2^2 - 3`, so that a normal distribution reads zero.
    ///
    /// Requires two observations that are not all equal.
    pub fn kurtosis(&self) -> Result<f64, Error> {
        let n = self.dispersed()?;
        Ok(n * self.m4 / (self.m2 * self.m2) - 3.0)
    }

    /// Fold the observations summarized by `other` into self.
    pub fn merge(&mut self, other: &Self) {
        *self = Self::combine(self, other);
    }

    /// Return the accumulator of the union of the observations of `lhs` and `rhs`.
    ///
    /// The result does not depend on which side is which, up to floating point rounding.
    pub fn combine(lhs: &Self, rhs: &Self) -> Self {
        if lhs.count == 0 {
            MERGE_EMPTY.click();
            return *rhs;
        }
        if rhs.count == 0 {
            MERGE_EMPTY.click();
            return *lhs;
        }
        MERGE.click();
        let n_a: f64 = lhs.count as f64;
        let n_b: f64 = rhs.count as f64;
        let count = lhs.count + rhs.count;
        let n: f64 = count as f64;
        let delta: f64 = rhs.m1 - lhs.m1;
        let delta2: f64 = delta * delta;
        let delta3: f64 = delta2 * delta;
        let delta4: f64 = delta3 * delta;
        let m1: f64 = lhs.m1 + delta * n_b / n;
        let m2: f64 = lhs.m2 + rhs.m2 + delta2 * n_a * n_b / n;
        let m3: f64 = lhs.m3
            + rhs.m3
            + delta3 * n_a * n_b * (n_a - n_b) / (n * n)
            + 3. * delta * (n_a * rhs.m2 - n_b * lhs.m2) / n;
        let m4: f64 = lhs.m4
            + rhs.m4
            + delta4 * n_a * n_b * (n_a * n_a - n_a * n_b + n_b * n_b) / (n * n * n)
            + 6. * delta2 * (n_a * n_a * rhs.m2 + n_b * n_b * lhs.m2) / (n * n)
            + 4. * delta * (n_a * rhs.m3 - n_b * lhs.m3) / n;
        Self {
            count,
            m1,
            m2,
            m3,
            m4,
        }
    }

    fn require(&self, required: u64) -> Result<f64, Error> {
        if self.count < required {
            INSUFFICIENT_DATA.click();
            Err(Error::InsufficientData {
                required,
                observed: self.count,
            })
        } else {
            Ok(self.count as f64)
        }
    }

    fn dispersed(&self) -> Result<f64, Error> {
        let n = self.require(2)?;
        if self.m2 == 0.0 {
            ZERO_VARIANCE.click();
            return Err(Error::ZeroVariance);
        }
        Ok(n)
    }
}

impl Display for MomentAccumulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.count, self.m1, self.m2, self.m3, self.m4
        )
    }
}

impl FromIterator<f64> for MomentAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

impl Extend<f64> for MomentAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.push(x);
        }
    }
}

impl<'a> Extend<&'a f64> for MomentAccumulator {
    fn extend<I: IntoIterator<Item = &'a f64>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl Sum for MomentAccumulator {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, shard| Self::combine(&acc, &shard))
    }
}

impl<'a> Sum<&'a MomentAccumulator> for MomentAccumulator {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, shard| Self::combine(&acc, shard))
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#![doc = include_str!("../README.md")]

use std::fmt::{Display, Formatter};

use biometrics::Counter;

mod moments;
mod observations;

pub use moments::MomentAccumulator;
pub use observations::{accumulate, read_observations};

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static IO_ERROR: Counter = Counter::new("moments.error.io");

/// Registers this crate's biometrics with the provided Collector.
pub fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&IO_ERROR);
    moments::register_biometrics(collector);
    observations::register_biometrics(collector);
}

////////////////////////////////////////////// indicio /////////////////////////////////////////////

pub static COLLECTOR: indicio::Collector = indicio::Collector::new();

/////////////////////////////////////////////// Error //////////////////////////////////////////////

/// Error captures every way a statistic or an input may fail.
#[derive(Debug)]
pub enum Error {
    /// The statistic needs `required` observations and only `observed` were seen.
    InsufficientData { required: u64, observed: u64 },
    /// Skewness and kurtosis divide by the variance; every observation was equal.
    ZeroVariance,
    /// The parts given to [MomentAccumulator::from_parts] describe no possible stream.
    InvalidState { what: &'static str },
    /// A token on the given 1-based line did not parse as a number.
    Parse { line: u64, token: String },
    /// Reading the observations failed.
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::InsufficientData { required, observed } => write!(
                f,
                "insufficient data: need {required} observations, have {observed}"
            ),
            Error::ZeroVariance => write!(f, "zero variance"),
            Error::InvalidState { what } => write!(f, "invalid state: {what}"),
            Error::Parse { line, token } => {
                write!(f, "line {line}: cannot parse {token:?} as a number")
            }
            Error::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        IO_ERROR.click();
        Self::Io(err)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            "insufficient data: need 2 observations, have 1",
            Error::InsufficientData {
                required: 2,
                observed: 1
            }
            .to_string()
        );
        assert_eq!("zero variance", Error::ZeroVariance.to_string());
        assert_eq!(
            "line 3: cannot parse \"x\" as a number",
            Error::Parse {
                line: 3,
                token: "x".to_string()
            }
            .to_string()
        );
    }

    #[test]
    fn io_error_has_source() {
        let err = Error::from(std::io::Error::other("boom"));
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&Error::ZeroVariance).is_none());
    }
}

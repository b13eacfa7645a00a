//! Fold textual streams of numbers into a [MomentAccumulator].

use std::io::BufRead;

use biometrics::Counter;
use indicio::{clue, ERROR, INFO};

use crate::{Error, MomentAccumulator, COLLECTOR};

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static OBSERVATIONS: Counter = Counter::new("moments.observations");
static SKIPPED_LINES: Counter = Counter::new("moments.observations.skipped_lines");
static PARSE_ERROR: Counter = Counter::new("moments.error.parse");

pub(crate) fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&OBSERVATIONS);
    collector.register_counter(&SKIPPED_LINES);
    collector.register_counter(&PARSE_ERROR);
}

/////////////////////////////////////////// observations ///////////////////////////////////////////

/// Push every whitespace-separated number in `reader` into `acc` and return how many were pushed.
///
/// Blank lines and lines whose first non-blank character is `#` are skipped.  Anything `f64`
/// parses is an observation, including `nan` and `inf`.  On error, the observations preceding the
/// bad token remain in `acc`.
pub fn read_observations<R: BufRead>(reader: R, acc: &mut MomentAccumulator) -> Result<u64, Error> {
    let mut pushed = 0u64;
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            SKIPPED_LINES.click();
            continue;
        }
        for token in trimmed.split_whitespace() {
            let x = match token.parse::<f64>() {
                Ok(x) => x,
                Err(_) => {
                    PARSE_ERROR.click();
                    OBSERVATIONS.count(pushed);
                    let line = idx as u64 + 1;
                    clue!(COLLECTOR, ERROR, {
                        parse_error: {
                            line: line,
                            token: token,
                        },
                    });
                    return Err(Error::Parse {
                        line,
                        token: token.to_string(),
                    });
                }
            };
            acc.push(x);
            pushed += 1;
        }
    }
    OBSERVATIONS.count(pushed);
    clue!(COLLECTOR, INFO, {
        observations: {
            pushed: pushed,
            count: acc.count(),
        },
    });
    Ok(pushed)
}

/// Collect every number in `reader` into a fresh accumulator.
pub fn accumulate<R: BufRead>(reader: R) -> Result<MomentAccumulator, Error> {
    let mut acc = MomentAccumulator::new();
    read_observations(reader, &mut acc)?;
    Ok(acc)
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

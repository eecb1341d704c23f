//! k6 command-line options
//!
//! `OptionSpec` is one rendered option, `CommandBuilder` keeps them in
//! insertion order, and `LoadProfile` picks exactly one of the mutually
//! exclusive load shapes (plain vus/duration, iteration count, staged ramp)
//! before anything is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::K6Error;

pub const STAGE_FLAG: &str = "--stage";
pub const VUS_FLAG: &str = "--vus";
pub const DURATION_FLAG: &str = "--duration";
pub const ITERATIONS_FLAG: &str = "--iterations";

/// A ramp segment: reach `target` VUs over `duration`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: String,
    pub target: u32,
}

impl Stage {
    pub fn new(duration: impl Into<String>, target: u32) -> Self {
        Self {
            duration: duration.into(),
            target,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.duration, self.target)
    }
}

impl FromStr for Stage {
    type Err = K6Error;

    /// Parse the `<duration>:<target>` form used on the k6 command line
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || K6Error::InvalidStage { value: s.to_string() };
        let (duration, target) = s.rsplit_once(':').ok_or_else(invalid)?;
        if duration.is_empty() {
            return Err(invalid());
        }
        let target = target.trim().parse().map_err(|_| invalid())?;
        Ok(Stage::new(duration.trim(), target))
    }
}

/// A single k6 command-line option
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionSpec {
    /// `name value`
    Value { name: String, value: String },
    /// `name`
    Flag { name: String },
    /// `--stage duration:target`
    Stage(Stage),
}

impl OptionSpec {
    pub fn value(name: impl Into<String>, value: impl ToString) -> Self {
        OptionSpec::Value {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        OptionSpec::Flag { name: name.into() }
    }

    pub fn stage(duration: impl Into<String>, target: u32) -> Self {
        OptionSpec::Stage(Stage::new(duration, target))
    }

    pub fn render(&self) -> Vec<String> {
        match self {
            OptionSpec::Value { name, value } => vec![name.clone(), value.clone()],
            OptionSpec::Flag { name } => vec![name.clone()],
            OptionSpec::Stage(stage) => vec![STAGE_FLAG.to_string(), stage.to_string()],
        }
    }

    pub fn token_count(&self) -> usize {
        match self {
            OptionSpec::Flag { .. } => 1,
            OptionSpec::Value { .. } | OptionSpec::Stage(_) => 2,
        }
    }
}

/// Ordered list of options; rendering never reorders or validates
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandBuilder {
    options: Vec<OptionSpec>,
}

impl CommandBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, option: OptionSpec) -> &mut Self {
        self.options.push(option);
        self
    }

    pub fn extend<I>(&mut self, options: I) -> &mut Self
    where
        I: IntoIterator<Item = OptionSpec>,
    {
        self.options.extend(options);
        self
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn render(&self) -> Vec<String> {
        self.options.iter().flat_map(OptionSpec::render).collect()
    }
}

/// The load shape of one k6 run. Only one shape can be active at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadProfile {
    /// Constant VUs, optionally for a fixed duration
    Simple { vus: Option<u32>, duration: Option<String> },
    /// Fixed iteration count; duration does not apply
    Iterations { iterations: u32, vus: Option<u32> },
    /// Staged ramp; neither vus nor duration apply
    Staged { stages: Vec<Stage>, iterations: Option<u32> },
}

impl LoadProfile {
    /// Select the profile from loosely specified inputs.
    ///
    /// Zero counts, empty durations and empty stage lists count as absent.
    /// Stages drop vus and duration; iterations drop duration but keep vus.
    pub fn select(
        vus: Option<u32>,
        duration: Option<String>,
        stages: Option<Vec<Stage>>,
        iterations: Option<u32>,
    ) -> Self {
        let vus = vus.filter(|v| *v > 0);
        let duration = duration.filter(|d| !d.is_empty());
        let stages = stages.filter(|s| !s.is_empty());
        let iterations = iterations.filter(|i| *i > 0);

        match (stages, iterations) {
            (Some(stages), iterations) => LoadProfile::Staged { stages, iterations },
            (None, Some(iterations)) => LoadProfile::Iterations { iterations, vus },
            (None, None) => LoadProfile::Simple { vus, duration },
        }
    }

    /// Options in k6 order: iterations, stages, vus, duration
    pub fn options(&self) -> Vec<OptionSpec> {
        let mut options = Vec::new();
        match self {
            LoadProfile::Simple { vus, duration } => {
                if let Some(vus) = vus {
                    options.push(OptionSpec::value(VUS_FLAG, vus));
                }
                if let Some(duration) = duration {
                    options.push(OptionSpec::value(DURATION_FLAG, duration));
                }
            }
            LoadProfile::Iterations { iterations, vus } => {
                options.push(OptionSpec::value(ITERATIONS_FLAG, iterations));
                if let Some(vus) = vus {
                    options.push(OptionSpec::value(VUS_FLAG, vus));
                }
            }
            LoadProfile::Staged { stages, iterations } => {
                if let Some(iterations) = iterations {
                    options.push(OptionSpec::value(ITERATIONS_FLAG, iterations));
                }
                options.extend(stages.iter().cloned().map(OptionSpec::Stage));
            }
        }
        options
    }
}

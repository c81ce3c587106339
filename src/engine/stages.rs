//! Built-in integer stages for the CLI, parsed from `name` or `name:arg` specs.

use anyhow::{Context, Result, anyhow, bail};
use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use crate::pipeline::{BoxedStage, filter_stage, map_stage};
use crate::utils::config::MAX_STAGE_DELAY_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageSpec {
    Mul(i64),
    Add(i64),
    Sub(i64),
    Div(i64),
    Neg,
    Square,
    Even,
    Odd,
    /// Sleep this many milliseconds per value, then pass it on.
    Delay(u64),
}

fn parse_arg<T: FromStr>(spec: &str, arg: Option<&str>) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let arg =
        arg.ok_or_else(|| anyhow!("stage `{}` needs an argument (e.g. `{}:2`)", spec, spec))?;
    arg.trim()
        .parse::<T>()
        .with_context(|| format!("invalid argument {:?} for stage `{}`", arg, spec))
}

fn no_arg(spec: &str, arg: Option<&str>) -> Result<()> {
    match arg {
        Some(a) => bail!("stage `{}` takes no argument (got {:?})", spec, a),
        None => Ok(()),
    }
}

impl FromStr for StageSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        let name = name.to_ascii_lowercase();
        let spec = match name.as_str() {
            "mul" => StageSpec::Mul(parse_arg(&name, arg)?),
            "add" => StageSpec::Add(parse_arg(&name, arg)?),
            "sub" => StageSpec::Sub(parse_arg(&name, arg)?),
            "div" => match parse_arg::<i64>(&name, arg)? {
                0 => bail!("stage `div` cannot divide by zero"),
                n => StageSpec::Div(n),
            },
            "neg" => no_arg(&name, arg).map(|_| StageSpec::Neg)?,
            "square" => no_arg(&name, arg).map(|_| StageSpec::Square)?,
            "even" => no_arg(&name, arg).map(|_| StageSpec::Even)?,
            "odd" => no_arg(&name, arg).map(|_| StageSpec::Odd)?,
            "delay" => match parse_arg::<u64>(&name, arg)? {
                ms if ms > MAX_STAGE_DELAY_MS => {
                    bail!("stage `delay` is capped at {} ms (got {})", MAX_STAGE_DELAY_MS, ms)
                }
                ms => StageSpec::Delay(ms),
            },
            "" => bail!("empty stage spec"),
            other => bail!("unknown stage `{}`", other),
        };
        Ok(spec)
    }
}

impl fmt::Display for StageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageSpec::Mul(n) => write!(f, "mul:{n}"),
            StageSpec::Add(n) => write!(f, "add:{n}"),
            StageSpec::Sub(n) => write!(f, "sub:{n}"),
            StageSpec::Div(n) => write!(f, "div:{n}"),
            StageSpec::Neg => write!(f, "neg"),
            StageSpec::Square => write!(f, "square"),
            StageSpec::Even => write!(f, "even"),
            StageSpec::Odd => write!(f, "odd"),
            StageSpec::Delay(ms) => write!(f, "delay:{ms}"),
        }
    }
}

impl StageSpec {
    /// Apply a map spec to one value. Arithmetic wraps instead of panicking on overflow.
    /// Filters pass the value through unchanged.
    pub fn apply_value(&self, v: i64) -> i64 {
        match *self {
            StageSpec::Mul(n) => v.wrapping_mul(n),
            StageSpec::Add(n) => v.wrapping_add(n),
            StageSpec::Sub(n) => v.wrapping_sub(n),
            StageSpec::Div(n) => v.wrapping_div(n),
            StageSpec::Neg => v.wrapping_neg(),
            StageSpec::Square => v.wrapping_mul(v),
            StageSpec::Even | StageSpec::Odd | StageSpec::Delay(_) => v,
        }
    }

    /// Whether a filter spec keeps `v`. Map specs keep everything.
    pub fn keeps(&self, v: i64) -> bool {
        match self {
            StageSpec::Even => v % 2 == 0,
            StageSpec::Odd => v % 2 != 0,
            _ => true,
        }
    }

    pub fn into_stage(self) -> BoxedStage<i64> {
        match self {
            StageSpec::Even | StageSpec::Odd => filter_stage(move |v: &i64| self.keeps(*v)),
            StageSpec::Delay(ms) => {
                let pause = Duration::from_millis(ms);
                map_stage(move |v: i64| {
                    thread::sleep(pause);
                    v
                })
            }
            _ => map_stage(move |v: i64| self.apply_value(v)),
        }
    }
}

/// Parse every spec up front so a typo fails before any thread is spawned.
pub fn parse_stage_specs(specs: &[String]) -> Result<Vec<StageSpec>> {
    specs
        .iter()
        .enumerate()
        .map(|(i, s)| {
            s.parse::<StageSpec>()
                .with_context(|| format!("stage #{} ({:?})", i + 1, s))
        })
        .collect()
}

pub fn build_stages(specs: &[StageSpec]) -> Vec<BoxedStage<i64>> {
    specs.iter().map(|s| s.into_stage()).collect()
}

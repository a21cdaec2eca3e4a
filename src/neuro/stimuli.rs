use anyhow::ensure;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::signals::Stimulus;
use crate::neuro::neuron::CHANNEL_MAX;

#[derive(Clone, Serialize, Deserialize, PartialEq, Debug)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum StimulusSchedule {
    Hold {
        level: Stimulus,
    },

    Step {
        before: Stimulus,
        after: Stimulus,
        at: u64,
    },

    /// Both channels climb together by one level every `every` cycles.
    Ramp {
        from: u8,
        to: u8,
        every: u64,
    },

    /// Each cycle carries `level` with probability `rate`, otherwise silence.
    Poisson {
        rate: f64,
        level: Stimulus,
        seed: u64,
    },

    Pattern {
        values: Vec<Stimulus>,
        looped: bool,
    },
}

impl StimulusSchedule {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            StimulusSchedule::Hold { level } => ensure_level(level),
            StimulusSchedule::Step { before, after, .. } => {
                ensure_level(before)?;
                ensure_level(after)
            }
            StimulusSchedule::Ramp { from, to, every } => {
                ensure!(
                    *from <= CHANNEL_MAX && *to <= CHANNEL_MAX,
                    "ramp levels must be <= {CHANNEL_MAX}"
                );
                ensure!(*every > 0, "ramp interval must be > 0");
                Ok(())
            }
            StimulusSchedule::Poisson { rate, level, .. } => {
                ensure!(rate.is_finite(), "rate must be finite");
                ensure!(
                    (0.0..=1.0).contains(rate),
                    "rate must be a per-cycle probability"
                );
                ensure_level(level)
            }
            StimulusSchedule::Pattern { values, .. } => values.iter().try_for_each(ensure_level),
        }
    }
}

fn ensure_level(level: &Stimulus) -> anyhow::Result<()> {
    ensure!(
        level.channel_a <= CHANNEL_MAX && level.channel_b <= CHANNEL_MAX,
        "stimulus level {:?} exceeds {}",
        level,
        CHANNEL_MAX
    );
    Ok(())
}

/// Produces the channel pair to present on each successive cycle.
pub struct StimulusRunner {
    schedule: StimulusSchedule,
    tick: u64,
    rng: Option<StdRng>,
}

impl StimulusRunner {
    pub fn new(schedule: StimulusSchedule) -> anyhow::Result<Self> {
        schedule.validate()?;

        let rng = match &schedule {
            StimulusSchedule::Poisson { seed, .. } => Some(StdRng::seed_from_u64(*seed)),
            _ => None,
        };

        Ok(Self {
            schedule,
            tick: 0,
            rng,
        })
    }

    pub fn schedule(&self) -> &StimulusSchedule {
        &self.schedule
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn next_level(&mut self) -> Stimulus {
        let tick = self.tick;
        self.tick += 1;

        match &self.schedule {
            StimulusSchedule::Hold { level } => *level,
            StimulusSchedule::Step { before, after, at } => {
                if tick < *at {
                    *before
                } else {
                    *after
                }
            }
            StimulusSchedule::Ramp { from, to, every } => {
                let steps = tick / every;
                let level = if to >= from {
                    u64::from(*from).saturating_add(steps).min(u64::from(*to))
                } else {
                    u64::from(*from).saturating_sub(steps).max(u64::from(*to))
                };
                Stimulus::new(level as u8, level as u8)
            }
            StimulusSchedule::Poisson { rate, level, .. } => {
                let hit = match self.rng.as_mut() {
                    Some(rng) => rng.random::<f64>() < *rate,
                    None => false,
                };
                if hit { *level } else { Stimulus::default() }
            }
            StimulusSchedule::Pattern { values, looped } => {
                if values.is_empty() {
                    return Stimulus::default();
                }
                let len = values.len() as u64;
                if *looped {
                    values[(tick % len) as usize]
                } else {
                    values.get(tick as usize).copied().unwrap_or_default()
                }
            }
        }
    }
}

impl Iterator for StimulusRunner {
    type Item = Stimulus;

    fn next(&mut self) -> Option<Stimulus> {
        Some(self.next_level())
    }
}

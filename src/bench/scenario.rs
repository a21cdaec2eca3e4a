use std::ops::Range;
use std::path::Path;

use anyhow::{Context, bail, ensure};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bench::harness::Harness;
use crate::bench::trace::Trace;
use crate::core::config::CoreConfig;
use crate::core::signals::{Control, Stimulus};
use crate::neuro::neuron::NeuronParams;
use crate::neuro::stimuli::{StimulusRunner, StimulusSchedule};

pub const BUILTIN_NAMES: [&str; 2] = ["basic", "param-load"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Reset {
        cycles: u64,
    },
    Wait {
        cycles: u64,
        #[serde(default)]
        label: Option<String>,
    },
    Hold {
        channel_a: u8,
        channel_b: u8,
        cycles: u64,
        #[serde(default)]
        label: Option<String>,
    },
    Stimulus {
        schedule: StimulusSchedule,
        cycles: u64,
        #[serde(default)]
        label: Option<String>,
    },
    /// Raw control pins held for `cycles` edges.
    Control {
        load_mode: bool,
        serial_data: bool,
        cycles: u64,
    },
    /// Clocks bits with `load_mode` high, without arming first.
    Shift {
        bits: String,
    },
    /// Arms, clocks bits, and optionally releases `load_mode` afterwards.
    SendBits {
        bits: String,
        #[serde(default = "default_release")]
        release: bool,
    },
    Load {
        params: NeuronParams,
    },
    Enable {
        on: bool,
    },
    Expect(Expectation),
}

fn default_release() -> bool {
    true
}

/// Checks against the most recent clocked window and the current outputs.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Expectation {
    pub spikes_at_least: Option<usize>,
    pub spikes_at_most: Option<usize>,
    /// At least as many spikes as the window with this label.
    pub spikes_at_least_as: Option<String>,
    pub params_ready: Option<bool>,
    pub potential: Option<u8>,
    pub active_params: Option<NeuronParams>,
    /// Whether the active set equals the reset defaults.
    pub defaults_active: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Window {
    pub step: usize,
    pub label: Option<String>,
    pub samples: Range<usize>,
    pub spikes: usize,
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub windows: Vec<Window>,
    pub trace: Trace,
}

impl ScenarioReport {
    pub fn window(&self, label: &str) -> Option<&Window> {
        self.windows
            .iter()
            .find(|w| w.label.as_deref() == Some(label))
    }
}

impl Scenario {
    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("invalid scenario json")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;

        Self::from_json_str(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn builtin(name: &str) -> anyhow::Result<Self> {
        match name {
            "basic" => Ok(basic()),
            "param-load" => Ok(param_load()),
            other => bail!(
                "unknown builtin scenario '{other}', expected one of {}",
                BUILTIN_NAMES.join(", ")
            ),
        }
    }

    pub fn run(&self, config: &CoreConfig) -> anyhow::Result<ScenarioReport> {
        info!(scenario = %self.name, steps = self.steps.len(), "running scenario");

        let mut bench = Harness::new(config);
        let mut windows: Vec<Window> = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            let start = bench.trace().len();
            let label = self
                .run_step(index, step, &mut bench, &windows)
                .with_context(|| format!("scenario '{}' step {index}", self.name))?;

            let end = bench.trace().len();
            if end > start {
                let spikes = bench.trace().spikes_in(start..end);
                info!(
                    step = index,
                    label = ?label,
                    cycles = end - start,
                    spikes,
                    "window done"
                );
                windows.push(Window {
                    step: index,
                    label,
                    samples: start..end,
                    spikes,
                });
            }
        }

        Ok(ScenarioReport {
            name: self.name.clone(),
            windows,
            trace: bench.into_trace(),
        })
    }

    fn run_step(
        &self,
        index: usize,
        step: &Step,
        bench: &mut Harness,
        windows: &[Window],
    ) -> anyhow::Result<Option<String>> {
        match step {
            Step::Reset { cycles } => {
                ensure!(*cycles > 0, "reset needs at least one cycle");
                info!(step = index, cycles, "reset");
                bench.reset(*cycles);
            }
            Step::Wait { cycles, label } => {
                bench.clock(*cycles);
                return Ok(label.clone());
            }
            Step::Hold {
                channel_a,
                channel_b,
                cycles,
                label,
            } => {
                info!(step = index, channel_a, channel_b, cycles, "hold stimulus");
                bench.set_channels(Stimulus::new(*channel_a, *channel_b))?;
                bench.clock(*cycles);
                return Ok(label.clone());
            }
            Step::Stimulus {
                schedule,
                cycles,
                label,
            } => {
                info!(step = index, ?schedule, cycles, "scheduled stimulus");
                let mut runner = StimulusRunner::new(schedule.clone())?;
                bench.drive(&mut runner, *cycles)?;
                return Ok(label.clone());
            }
            Step::Control {
                load_mode,
                serial_data,
                cycles,
            } => {
                bench.set_control(Control {
                    load_mode: *load_mode,
                    serial_data: *serial_data,
                });
                bench.clock(*cycles);
            }
            Step::Shift { bits } => {
                for bit in parse_bits(bits)? {
                    bench.set_control(Control {
                        load_mode: true,
                        serial_data: bit,
                    });
                    bench.clock(1);
                }
            }
            Step::SendBits { bits, release } => {
                let bits = parse_bits(bits)?;
                info!(step = index, bits = bits.len(), release, "send bits");
                bench.send_bits(&bits);
                if !release {
                    bench.set_control(Control {
                        load_mode: true,
                        serial_data: false,
                    });
                }
            }
            Step::Load { params } => {
                info!(step = index, ?params, "load parameters");
                bench.load_params(params);
            }
            Step::Enable { on } => bench.set_enable(*on),
            Step::Expect(expectation) => check(expectation, bench, windows)?,
        }

        Ok(None)
    }
}

fn check(expectation: &Expectation, bench: &Harness, windows: &[Window]) -> anyhow::Result<()> {
    let spikes = windows.last().map(|w| w.spikes).unwrap_or(0);
    let obs = bench.observe();

    if let Some(min) = expectation.spikes_at_least {
        ensure!(spikes >= min, "expected at least {min} spikes, got {spikes}");
    }
    if let Some(max) = expectation.spikes_at_most {
        ensure!(spikes <= max, "expected at most {max} spikes, got {spikes}");
    }
    if let Some(label) = &expectation.spikes_at_least_as {
        let Some(reference) = windows.iter().find(|w| w.label.as_deref() == Some(label)) else {
            bail!("no window labelled '{label}'");
        };
        ensure!(
            spikes >= reference.spikes,
            "expected at least as many spikes as '{label}' ({}), got {spikes}",
            reference.spikes
        );
    }
    if let Some(ready) = expectation.params_ready {
        ensure!(
            obs.params_ready == ready,
            "expected params_ready={ready}, got {}",
            obs.params_ready
        );
    }
    if let Some(potential) = expectation.potential {
        ensure!(
            obs.potential == potential,
            "expected potential {potential}, got {}",
            obs.potential
        );
    }
    if let Some(params) = &expectation.active_params {
        let active = bench.circuit().params();
        ensure!(
            active == params,
            "expected active parameters {params:?}, got {active:?}"
        );
    }
    if let Some(expected) = expectation.defaults_active {
        let store = bench.circuit().store();
        let actual = store.active() == store.defaults();
        ensure!(
            actual == expected,
            "expected defaults_active={expected}, active set is {:?}",
            store.active()
        );
    }

    Ok(())
}

/// Parses a bit string such as `"0000_0101"`.
pub fn parse_bits(text: &str) -> anyhow::Result<Vec<bool>> {
    text.chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => bail!("invalid bit '{other}'"),
        })
        .collect()
}

fn hold(channel_a: u8, channel_b: u8, cycles: u64, label: &str) -> Step {
    Step::Hold {
        channel_a,
        channel_b,
        cycles,
        label: Some(label.to_string()),
    }
}

fn expect(expectation: Expectation) -> Step {
    Step::Expect(expectation)
}

fn basic() -> Scenario {
    Scenario {
        name: "basic".to_string(),
        steps: vec![
            Step::Reset { cycles: 10 },
            Step::Wait {
                cycles: 5,
                label: None,
            },
            expect(Expectation {
                params_ready: Some(true),
                ..Default::default()
            }),
            hold(0, 0, 10, "rest"),
            expect(Expectation {
                spikes_at_most: Some(0),
                ..Default::default()
            }),
            hold(1, 1, 20, "low"),
            hold(3, 3, 30, "medium"),
            expect(Expectation {
                spikes_at_least: Some(1),
                ..Default::default()
            }),
            hold(7, 7, 30, "max"),
            expect(Expectation {
                spikes_at_least_as: Some("medium".to_string()),
                ..Default::default()
            }),
        ],
    }
}

fn param_load() -> Scenario {
    Scenario {
        name: "param-load".to_string(),
        steps: vec![
            Step::Reset { cycles: 5 },
            Step::Wait {
                cycles: 5,
                label: None,
            },
            expect(Expectation {
                params_ready: Some(true),
                ..Default::default()
            }),
            Step::Control {
                load_mode: true,
                serial_data: false,
                cycles: 2,
            },
            expect(Expectation {
                params_ready: Some(false),
                ..Default::default()
            }),
            // 0x05, first field only
            Step::Shift {
                bits: "0000_0101".to_string(),
            },
            expect(Expectation {
                params_ready: Some(false),
                ..Default::default()
            }),
            Step::Control {
                load_mode: false,
                serial_data: false,
                cycles: 5,
            },
            expect(Expectation {
                params_ready: Some(true),
                defaults_active: Some(true),
                ..Default::default()
            }),
        ],
    }
}

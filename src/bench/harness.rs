use tracing::info;

use crate::bench::trace::{Sample, Trace};
use crate::core::config::CoreConfig;
use crate::core::decoder::{decode_outputs, decode_stimulus, encode_control, encode_stimulus};
use crate::core::signals::{Control, Observation, PinInputs, Stimulus};
use crate::neuro::circuit::LifCircuit;
use crate::neuro::loader::encode_frame;
use crate::neuro::neuron::NeuronParams;
use crate::neuro::stimuli::StimulusRunner;

/// Drives a [`LifCircuit`] through its pins and records every edge.
pub struct Harness {
    circuit: LifCircuit,
    inputs: PinInputs,
    trace: Trace,
    clock: u64,
}

impl Harness {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            circuit: LifCircuit::new(config),
            inputs: PinInputs::default(),
            trace: Trace::new(),
            clock: 0,
        }
    }

    pub fn circuit(&self) -> &LifCircuit {
        &self.circuit
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }

    pub fn inputs(&self) -> &PinInputs {
        &self.inputs
    }

    pub fn observe(&self) -> Observation {
        decode_outputs(self.circuit.outputs())
    }

    /// Holds `rst_n` low for `cycles` edges, then releases it.
    ///
    /// A reset always spans at least one edge, so `reset(0)` behaves like `reset(1)`.
    pub fn reset(&mut self, cycles: u64) {
        self.inputs.rst_n = false;
        self.clock(cycles.max(1));
        self.inputs.rst_n = true;
    }

    pub fn set_enable(&mut self, on: bool) {
        self.inputs.ena = on;
    }

    pub fn set_channels(&mut self, stimulus: Stimulus) -> anyhow::Result<()> {
        self.inputs.ui_in = encode_stimulus(stimulus)?;
        Ok(())
    }

    pub fn set_control(&mut self, control: Control) {
        self.inputs.uio_in = encode_control(control);
    }

    /// Advances `cycles` edges and returns the number of spikes seen.
    pub fn clock(&mut self, cycles: u64) -> usize {
        (0..cycles).filter(|_| self.step()).count()
    }

    /// Clocks one edge per value the runner produces.
    pub fn drive(&mut self, runner: &mut StimulusRunner, cycles: u64) -> anyhow::Result<usize> {
        let mut spikes = 0;
        for _ in 0..cycles {
            self.set_channels(runner.next_level())?;
            if self.step() {
                spikes += 1;
            }
        }
        Ok(spikes)
    }

    /// Arms the loader, clocks `bits` in, then drops `load_mode`.
    ///
    /// Returns whether `params_ready` was low on every edge of the transfer.
    pub fn send_bits(&mut self, bits: &[bool]) -> bool {
        info!(bits = bits.len(), "sending serial payload");

        self.set_control(Control {
            load_mode: true,
            serial_data: false,
        });
        self.step();
        let mut gated = !self.observe().params_ready;

        for (i, &bit) in bits.iter().enumerate() {
            self.set_control(Control {
                load_mode: true,
                serial_data: bit,
            });
            self.step();
            // The final bit of a full frame commits on its own edge.
            if i + 1 < bits.len() {
                gated &= !self.observe().params_ready;
            }
        }

        self.set_control(Control::default());
        gated
    }

    /// Sends a full frame and releases `load_mode` on the following edge.
    pub fn load_params(&mut self, params: &NeuronParams) {
        self.send_bits(&encode_frame(params));
        self.step();
    }

    fn step(&mut self) -> bool {
        let obs = decode_outputs(self.circuit.tick(&self.inputs));
        self.trace.push(Sample {
            cycle: self.clock,
            stimulus: decode_stimulus(self.inputs.ui_in),
            potential: obs.potential,
            spike: obs.spike,
            params_ready: obs.params_ready,
            threshold: self.circuit.params().threshold,
        });
        self.clock += 1;
        obs.spike
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neuro::stimuli::StimulusSchedule;

    #[test]
    fn reset_then_rest_is_quiet() {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(10);
        assert!(bench.observe().params_ready);

        bench.set_channels(Stimulus::new(0, 0)).unwrap();
        assert_eq!(bench.clock(10), 0);
        assert_eq!(bench.observe().potential, 0);
        assert_eq!(bench.trace().len(), 20);
    }

    #[test]
    fn partial_load_gates_readiness() {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(5);

        let gated = bench.send_bits(&[false, false, false, false, false, true, false, true]);
        assert!(gated);
        assert!(!bench.observe().params_ready);

        bench.clock(1);
        assert!(bench.observe().params_ready);
        assert_eq!(bench.circuit().params(), &NeuronParams::default());
    }

    #[test]
    fn full_load_changes_behaviour() {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(1);

        let hot = NeuronParams {
            weight_a: 10,
            weight_b: 0,
            leak: 0,
            threshold: 10,
        };
        bench.load_params(&hot);
        assert_eq!(bench.circuit().params(), &hot);

        bench.set_channels(Stimulus::new(1, 0)).unwrap();
        assert_eq!(bench.clock(5), 5);
    }

    #[test]
    fn drive_follows_schedule() {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(1);

        let mut runner = StimulusRunner::new(StimulusSchedule::Step {
            before: Stimulus::new(0, 0),
            after: Stimulus::new(7, 7),
            at: 5,
        })
        .unwrap();

        let spikes = bench.drive(&mut runner, 20).unwrap();
        assert!(spikes > 0);
        assert_eq!(bench.trace().spikes_in(1..6), 0);
    }

    #[test]
    fn out_of_range_channels_error() {
        let mut bench = Harness::new(&CoreConfig::default());
        assert!(bench.set_channels(Stimulus::new(9, 0)).is_err());
    }

    #[test]
    fn zero_length_reset_still_takes_an_edge() {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.set_channels(Stimulus::new(7, 7)).unwrap();
        bench.clock(2);
        assert!(bench.observe().potential > 0);

        bench.reset(0);
        assert_eq!(bench.trace().len(), 3);
        assert_eq!(bench.observe().potential, 0);
    }
}

use anyhow::ensure;

use crate::core::signals::{Control, Observation, PinOutputs, Stimulus};
use crate::neuro::neuron::{CHANNEL_MAX, POTENTIAL_MAX};

const CHANNEL_MASK: u8 = 0x07;
const CHANNEL_B_SHIFT: u8 = 3;

const LOAD_MODE_BIT: u8 = 0;
const SERIAL_DATA_BIT: u8 = 1;

const SPIKE_BIT: u8 = 7;
const PARAMS_READY_BIT: u8 = 2;

/// Only uio[2] is driven.
pub const UIO_OUTPUT_ENABLE: u8 = 1 << PARAMS_READY_BIT;

pub fn decode_stimulus(ui_in: u8) -> Stimulus {
    Stimulus {
        channel_a: ui_in & CHANNEL_MASK,
        channel_b: (ui_in >> CHANNEL_B_SHIFT) & CHANNEL_MASK,
    }
}

pub fn encode_stimulus(stimulus: Stimulus) -> anyhow::Result<u8> {
    ensure!(
        stimulus.channel_a <= CHANNEL_MAX,
        "channel_a {} exceeds {}",
        stimulus.channel_a,
        CHANNEL_MAX
    );
    ensure!(
        stimulus.channel_b <= CHANNEL_MAX,
        "channel_b {} exceeds {}",
        stimulus.channel_b,
        CHANNEL_MAX
    );

    Ok(stimulus.channel_a | (stimulus.channel_b << CHANNEL_B_SHIFT))
}

pub fn decode_control(uio_in: u8) -> Control {
    Control {
        load_mode: (uio_in >> LOAD_MODE_BIT) & 1 == 1,
        serial_data: (uio_in >> SERIAL_DATA_BIT) & 1 == 1,
    }
}

pub fn encode_control(control: Control) -> u8 {
    (u8::from(control.load_mode) << LOAD_MODE_BIT)
        | (u8::from(control.serial_data) << SERIAL_DATA_BIT)
}

pub fn encode_outputs(observation: Observation) -> PinOutputs {
    PinOutputs {
        uo_out: (observation.potential & POTENTIAL_MAX)
            | (u8::from(observation.spike) << SPIKE_BIT),
        uio_out: u8::from(observation.params_ready) << PARAMS_READY_BIT,
        uio_oe: UIO_OUTPUT_ENABLE,
    }
}

pub fn decode_outputs(outputs: PinOutputs) -> Observation {
    Observation {
        potential: outputs.uo_out & POTENTIAL_MAX,
        spike: (outputs.uo_out >> SPIKE_BIT) & 1 == 1,
        params_ready: (outputs.uio_out >> PARAMS_READY_BIT) & 1 == 1,
    }
}

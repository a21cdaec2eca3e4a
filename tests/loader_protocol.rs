use lifcore::bench::harness::Harness;
use lifcore::core::config::CoreConfig;
use lifcore::core::signals::{Control, Stimulus};
use lifcore::neuro::loader::{
    FRAME_BITS, LoaderEvent, LoaderState, ParamField, encode_frame, transition,
};
use lifcore::neuro::neuron::NeuronParams;
use proptest::prelude::*;

fn arbitrary_params() -> impl Strategy<Value = NeuronParams> {
    any::<[u8; 4]>().prop_map(|[weight_a, weight_b, leak, threshold]| NeuronParams {
        weight_a,
        weight_b,
        leak,
        threshold,
    })
}

#[test]
fn ready_right_after_reset() {
    let mut bench = Harness::new(&CoreConfig::default());
    bench.reset(3);
    assert!(bench.observe().params_ready);

    bench.clock(1);
    assert!(bench.observe().params_ready);
}

#[test]
fn reset_mid_load_restores_defaults() {
    let mut bench = Harness::new(&CoreConfig::default());
    bench.reset(1);

    bench.set_control(Control {
        load_mode: true,
        serial_data: true,
    });
    bench.clock(10);
    assert!(!bench.observe().params_ready);

    bench.reset(1);
    assert!(bench.observe().params_ready);
    assert_eq!(bench.circuit().store().state(), LoaderState::Idle);

    // load_mode is still high, so the first released edge re-arms
    bench.clock(1);
    assert!(!bench.observe().params_ready);
    assert_eq!(
        bench.circuit().store().state(),
        LoaderState::Loading {
            field: ParamField::WeightA,
            bit: 0
        }
    );
}

#[test]
fn reference_partial_load_is_discarded() {
    let mut bench = Harness::new(&CoreConfig::default());
    bench.reset(5);
    bench.clock(5);

    bench.set_control(Control {
        load_mode: true,
        serial_data: false,
    });
    bench.clock(2);
    assert!(!bench.observe().params_ready);

    for i in 0..8 {
        let bit = (0x05u8 >> (7 - i)) & 1 == 1;
        bench.set_control(Control {
            load_mode: true,
            serial_data: bit,
        });
        bench.clock(1);
        assert!(!bench.observe().params_ready);
    }

    bench.set_control(Control::default());
    bench.clock(5);
    assert!(bench.observe().params_ready);
    assert_eq!(bench.circuit().params(), &NeuronParams::default());
}

#[test]
fn committed_parameters_take_effect_next_edge() {
    let mut bench = Harness::new(&CoreConfig::default());
    bench.reset(1);
    bench.set_channels(Stimulus::new(1, 0)).unwrap();

    let hot = NeuronParams {
        weight_a: 100,
        weight_b: 0,
        leak: 0,
        threshold: 100,
    };
    let start = bench.trace().len();
    bench.send_bits(&encode_frame(&hot));

    // Arming edge plus every frame bit ran on the default set: +2 - 1 per edge.
    let transfer = &bench.trace().samples[start..];
    assert_eq!(transfer.len(), FRAME_BITS + 1);
    assert!(transfer.iter().all(|s| !s.spike));
    assert!(transfer.last().unwrap().params_ready);

    bench.clock(1);
    assert!(bench.trace().last().unwrap().spike);
}

proptest! {
    #[test]
    fn prop_any_frame_commits_exactly(params in arbitrary_params()) {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(1);

        let gated = bench.send_bits(&encode_frame(&params));

        prop_assert!(gated);
        prop_assert!(bench.observe().params_ready);
        prop_assert_eq!(bench.circuit().params(), &params);
    }

    #[test]
    fn prop_partial_frames_never_commit(
        params in arbitrary_params(),
        sent in 0usize..FRAME_BITS,
    ) {
        let mut bench = Harness::new(&CoreConfig::default());
        bench.reset(1);

        let bits = encode_frame(&params);
        let gated = bench.send_bits(&bits[..sent]);
        prop_assert!(gated);

        bench.clock(1);
        prop_assert!(bench.observe().params_ready);
        prop_assert_eq!(bench.circuit().params(), &NeuronParams::default());
    }

    #[test]
    fn prop_transition_without_load_mode_is_idle(
        bits in prop::collection::vec(any::<bool>(), 0..40),
        data in any::<bool>(),
    ) {
        let mut state = LoaderState::Idle;
        let mut shadow = NeuronParams::zeroed();
        let (s, sh, _) = transition(state, shadow, true, false);
        state = s;
        shadow = sh;
        for bit in bits {
            let (s, sh, _) = transition(state, shadow, true, bit);
            state = s;
            shadow = sh;
        }

        let (next, _, event) = transition(state, shadow, false, data);
        prop_assert_eq!(next, LoaderState::Idle);
        prop_assert!(event == LoaderEvent::Aborted || event == LoaderEvent::None);
    }
}

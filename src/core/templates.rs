use anyhow::bail;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::neuro::neuron::{NeuronParams, POTENTIAL_MAX};

pub const PRESET_NAMES: [&str; 4] = ["default", "sensitive", "sluggish", "asymmetric"];

pub fn preset(name: &str) -> anyhow::Result<NeuronParams> {
    let params = match name {
        "default" => NeuronParams::default(),
        "sensitive" => NeuronParams {
            weight_a: 4,
            weight_b: 4,
            leak: 1,
            threshold: 32,
        },
        "sluggish" => NeuronParams {
            weight_a: 1,
            weight_b: 1,
            leak: 2,
            threshold: 120,
        },
        // Channel B only nudges the potential; A drives it.
        "asymmetric" => NeuronParams {
            weight_a: 6,
            weight_b: 1,
            leak: 2,
            threshold: 80,
        },
        other => bail!(
            "unknown preset '{other}', expected one of {}",
            PRESET_NAMES.join(", ")
        ),
    };

    Ok(params)
}

/// Randomly perturbs every field of `base` by up to `amount`, reproducibly.
pub fn jittered(base: &NeuronParams, amount: u8, seed: u64) -> NeuronParams {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut jitter = |value: u8, ceiling: u8| -> u8 {
        let delta = rng.random_range(-i16::from(amount)..=i16::from(amount));
        (i16::from(value) + delta).clamp(0, i16::from(ceiling)) as u8
    };

    NeuronParams {
        weight_a: jitter(base.weight_a, u8::MAX),
        weight_b: jitter(base.weight_b, u8::MAX),
        leak: jitter(base.leak, u8::MAX),
        threshold: jitter(base.threshold, POTENTIAL_MAX),
    }
}

/// Parses `weight_a,weight_b,leak,threshold`.
pub fn parse_params(text: &str) -> anyhow::Result<NeuronParams> {
    let fields = text
        .split(',')
        .map(|field| {
            let field = field.trim();
            let parsed = match field.strip_prefix("0x") {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => field.parse::<u8>(),
            };
            parsed.map_err(|err| anyhow::anyhow!("invalid field '{field}': {err}"))
        })
        .collect::<anyhow::Result<Vec<u8>>>()?;

    let [weight_a, weight_b, leak, threshold] = fields[..] else {
        bail!("expected 4 comma separated fields, got {}", fields.len());
    };

    Ok(NeuronParams {
        weight_a,
        weight_b,
        leak,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_preset_resolves() {
        for name in PRESET_NAMES {
            let params = preset(name).unwrap();
            assert!(params.can_fire(), "{name} should be able to fire");
        }
        assert!(preset("turbo").is_err());
    }

    #[test]
    fn jitter_is_reproducible_and_bounded() {
        let base = NeuronParams::default();
        let a = jittered(&base, 3, 42);
        let b = jittered(&base, 3, 42);
        assert_eq!(a, b);

        assert!(a.weight_a.abs_diff(base.weight_a) <= 3);
        assert!(a.threshold.abs_diff(base.threshold) <= 3);
        assert!(a.threshold <= POTENTIAL_MAX);
    }

    #[test]
    fn zero_jitter_is_identity() {
        let base = preset("sluggish").unwrap();
        assert_eq!(jittered(&base, 0, 7), base);
    }

    #[test]
    fn parses_decimal_and_hex_fields() {
        let params = parse_params("5, 0x0a,1,64").unwrap();
        assert_eq!(
            params,
            NeuronParams {
                weight_a: 5,
                weight_b: 10,
                leak: 1,
                threshold: 64
            }
        );

        assert!(parse_params("1,2,3").is_err());
        assert!(parse_params("1,2,3,256").is_err());
    }
}

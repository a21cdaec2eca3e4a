use lifcore::bench::harness::Harness;
use lifcore::core::config::CoreConfig;
use lifcore::core::templates::parse_params;
use lifcore::neuro::loader::{FRAME_BITS, ParamField, encode_frame, frame_word};

use crate::cli::LoadArgs;

pub fn run(config: &CoreConfig, args: &LoadArgs) -> anyhow::Result<()> {
    let params = parse_params(&args.params)?;

    let bits: String = encode_frame(&params)
        .chunks(8)
        .map(|field| field.iter().map(|&b| if b { '1' } else { '0' }).collect::<String>())
        .collect::<Vec<_>>()
        .join("_");

    println!("frame word  0x{:08X}", frame_word(&params));
    println!("bit stream  {bits} ({FRAME_BITS} bits, MSB first)");

    let mut bench = Harness::new(config);
    bench.reset(1);
    let before = *bench.circuit().params();

    let gated = bench.send_bits(&encode_frame(&params));
    let ready_on_commit = bench.observe().params_ready;
    bench.clock(1);

    let after = bench.circuit().params();
    anyhow::ensure!(after == &params, "load did not commit: {after:?}");

    println!(
        "params_ready low during transfer: {gated}, high on final bit: {ready_on_commit}"
    );
    for field in ParamField::ORDER {
        println!(
            "  {:<10} {:>3} -> {:>3}",
            field.name(),
            field.get(&before),
            field.get(after)
        );
    }

    Ok(())
}

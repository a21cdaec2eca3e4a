use lifcore::bench::harness::Harness;
use lifcore::core::config::CoreConfig;
use lifcore::core::signals::Stimulus;
use lifcore::core::templates::{jittered, preset};
use lifcore::neuro::stimuli::{StimulusRunner, StimulusSchedule};
use tracing::info;

use crate::cli::TraceArgs;

pub fn run(config: &CoreConfig, args: &TraceArgs) -> anyhow::Result<()> {
    let schedule = match &args.schedule {
        Some(json) => serde_json::from_str::<StimulusSchedule>(json)?,
        None => StimulusSchedule::Hold {
            level: Stimulus::new(args.channel_a, args.channel_b),
        },
    };
    let mut runner = StimulusRunner::new(schedule)?;

    let mut bench = Harness::new(config);
    bench.reset(1);

    if let Some(name) = &args.preset {
        let params = jittered(&preset(name)?, args.jitter, args.seed);
        info!(preset = %name, ?params, "loading preset");
        bench.load_params(&params);
    }

    let start = bench.trace().len();
    let spikes = bench.drive(&mut runner, args.cycles)?;
    let trace = bench.trace();

    println!(
        "{} cycles, {} spikes, peak potential {}, params {:?}",
        args.cycles,
        spikes,
        trace.samples[start..]
            .iter()
            .map(|s| s.potential)
            .max()
            .unwrap_or(0),
        bench.circuit().params()
    );

    if let Some(path) = &args.out {
        trace.write_html(path, "LIF core trace")?;
        println!("plot written to {}", path.display());
    }

    Ok(())
}

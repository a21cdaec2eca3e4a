use lifcore::bench::scenario::Scenario;
use lifcore::core::config::CoreConfig;

use crate::cli::RunArgs;

pub fn run(config: &CoreConfig, args: &RunArgs) -> anyhow::Result<()> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin(&args.builtin)?,
    };

    let report = scenario.run(config)?;

    if args.table {
        print!("{}", report.trace.to_table());
    }

    println!("scenario '{}' passed", report.name);
    for window in &report.windows {
        println!(
            "  step {:>2} {:<10} cycles {:>4} spikes {:>3}",
            window.step,
            window.label.as_deref().unwrap_or("-"),
            window.samples.len(),
            window.spikes
        );
    }
    println!(
        "  total spikes {} over {} cycles",
        report.trace.spike_count(),
        report.trace.len()
    );

    Ok(())
}

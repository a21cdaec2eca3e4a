use std::ops::Range;
use std::path::Path;

use anyhow::Context;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use serde::Serialize;

use crate::core::signals::Stimulus;

/// What the harness saw after one clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub cycle: u64,
    pub stimulus: Stimulus,
    pub potential: u8,
    pub spike: bool,
    pub params_ready: bool,
    pub threshold: u8,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Trace {
    pub samples: Vec<Sample>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn spike_count(&self) -> usize {
        self.samples.iter().filter(|s| s.spike).count()
    }

    /// Spikes among samples `range` (sample indices, not cycles).
    pub fn spikes_in(&self, range: Range<usize>) -> usize {
        let end = range.end.min(self.samples.len());
        let start = range.start.min(end);
        self.samples[start..end].iter().filter(|s| s.spike).count()
    }

    pub fn spike_cycles(&self) -> Vec<u64> {
        self.samples
            .iter()
            .filter(|s| s.spike)
            .map(|s| s.cycle)
            .collect()
    }

    /// Tab separated dump, one line per cycle.
    pub fn to_table(&self) -> String {
        let mut out = String::from("cycle\ta\tb\tv\tspike\tready\n");
        for s in &self.samples {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                s.cycle,
                s.stimulus.channel_a,
                s.stimulus.channel_b,
                s.potential,
                u8::from(s.spike),
                u8::from(s.params_ready),
            ));
        }
        out
    }

    pub fn to_plot(&self, title: &str) -> Plot {
        let cycles: Vec<u64> = self.samples.iter().map(|s| s.cycle).collect();
        let potential: Vec<u8> = self.samples.iter().map(|s| s.potential).collect();
        let threshold: Vec<u8> = self.samples.iter().map(|s| s.threshold).collect();

        let spikes = self.spike_cycles();
        let spike_marks = vec![127u8; spikes.len()];

        let mut plot = Plot::new();
        plot.add_trace(
            Scatter::new(cycles.clone(), potential)
                .mode(Mode::Lines)
                .name("membrane potential"),
        );
        plot.add_trace(
            Scatter::new(cycles, threshold)
                .mode(Mode::Lines)
                .name("threshold"),
        );
        plot.add_trace(
            Scatter::new(spikes, spike_marks)
                .mode(Mode::Markers)
                .name("spike"),
        );
        plot.set_layout(
            Layout::new()
                .title(title)
                .x_axis(Axis::new().title("cycle"))
                .y_axis(Axis::new().title("V").range(vec![0, 130])),
        );

        plot
    }

    pub fn write_html(&self, path: &Path, title: &str) -> anyhow::Result<()> {
        let html = self.to_plot(title).to_html();
        std::fs::write(path, html)
            .with_context(|| format!("failed to write plot to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(cycle: u64, potential: u8, spike: bool) -> Sample {
        Sample {
            cycle,
            stimulus: Stimulus::default(),
            potential,
            spike,
            params_ready: true,
            threshold: 64,
        }
    }

    #[test]
    fn counts_spikes_in_windows() {
        let mut trace = Trace::new();
        for (i, spike) in [false, true, false, true, true].into_iter().enumerate() {
            trace.push(sample(i as u64, 10, spike));
        }

        assert_eq!(trace.spike_count(), 3);
        assert_eq!(trace.spikes_in(0..2), 1);
        assert_eq!(trace.spikes_in(2..100), 2);
        assert_eq!(trace.spikes_in(10..20), 0);
        assert_eq!(trace.spike_cycles(), vec![1, 3, 4]);
    }

    #[test]
    fn table_has_one_line_per_sample() {
        let mut trace = Trace::new();
        trace.push(sample(0, 5, false));
        trace.push(sample(1, 0, true));

        let table = trace.to_table();
        assert_eq!(table.lines().count(), 3);
        assert!(table.ends_with("1\t0\t0\t0\t1\t1\n"));
    }

    #[test]
    fn html_plot_is_written() {
        let mut trace = Trace::new();
        trace.push(sample(0, 40, false));
        trace.push(sample(1, 0, true));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.html");
        trace.write_html(&path, "test").unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("membrane potential"));
    }
}

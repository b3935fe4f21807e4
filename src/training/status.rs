use std::time::Instant;

use log::info;

/// Emits a status line every fixed amount of processed examples.
///
/// Counters live for a single `process_examples` call.
#[derive(Debug)]
pub(crate) struct StatusLog {
    every: usize,
    examples: usize,
    objective: f64,
    started: Instant,
}

impl StatusLog {
    /// Creates a new `StatusLog`, an interval of 0 never logs.
    pub fn new(every: usize) -> Self {
        Self {
            every,
            examples: 0,
            objective: 0.,
            started: Instant::now(),
        }
    }

    /// Counts one processed example and its objective value.
    pub fn record(&mut self, value: f64) {
        self.examples += 1;
        self.objective += value;

        if self.every > 0 && self.examples % self.every == 0 {
            self.emit();
            self.objective = 0.;
        }
    }

    pub fn examples(&self) -> usize {
        self.examples
    }

    fn emit(&self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let throughput = self.examples as f64 / elapsed.max(f64::EPSILON);

        info!(
            examples = self.examples,
            objective = self.objective,
            examples_per_sec = throughput,
            elapsed_secs = elapsed;
            "training status"
        );
    }
}

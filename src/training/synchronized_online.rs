use std::{
    panic,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread,
};

use log::debug;
use parking_lot::Mutex;

use super::{Example, Trainer, status::StatusLog};
use crate::{
    accumulation::{LocalGradient, LocalValue},
    config::TrainerConfig,
    error::Result,
    execution::WorkerPool,
    optimization::StepFunction,
    storage::ParameterStore,
    tensor::{Layout, TensorSet},
};

/// A gradient waiting for its turn in the step function.
struct StepRequest {
    gradient: TensorSet,
    value: f64,
    done: Sender<Result<()>>,
}

/// Spreads the examples over a pool of workers that compute gradients concurrently but
/// take turns inside the step function.
///
/// The steps run one at a time on a dedicated stepping thread, a worker waits for its own
/// step to finish before moving on. Reads of the store are not synchronized with the
/// steps, a worker may evaluate its example against a partially applied update.
/// Converges after a fixed amount of `process_examples` calls.
#[derive(Debug)]
pub struct SynchronizedOnlineTrainer<S: StepFunction> {
    store: Arc<ParameterStore>,
    step: S,
    pool: WorkerPool,
    max_iterations: usize,
    log_every: usize,
    iterations: usize,
}

impl<S: StepFunction> SynchronizedOnlineTrainer<S> {
    /// Creates a new `SynchronizedOnlineTrainer`.
    ///
    /// # Arguments
    /// * `store` - The parameters to learn.
    /// * `step` - The step function, it only ever runs one step at a time.
    /// * `config` - Provides the amount of workers, iteration limit and status interval.
    ///
    /// # Returns
    /// An `InvalidWorkerCount` error if the config asks for no workers.
    pub fn new(store: Arc<ParameterStore>, step: S, config: &TrainerConfig) -> Result<Self> {
        let pool = WorkerPool::new(config.workers)?;

        Ok(Self {
            store,
            step,
            pool,
            max_iterations: config.max_iterations,
            log_every: config.log_every,
            iterations: 0,
        })
    }

    /// The amount of completed `process_examples` calls.
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Applies every request in arrival order until all senders are gone.
fn run_steps<S: StepFunction>(
    step: &mut S,
    store: &ParameterStore,
    inbox: Receiver<StepRequest>,
) {
    for StepRequest { gradient, value, done } in inbox {
        let _ = done.send(step.step(store, &gradient, value));
    }
}

impl<E: Example, S: StepFunction> Trainer<E> for SynchronizedOnlineTrainer<S> {
    fn process_examples(&mut self, examples: &[E]) -> Result<()> {
        if self.iterations >= self.max_iterations {
            return Ok(());
        }

        let store = &*self.store;
        let step = &mut self.step;
        let pool = &self.pool;
        let status = Mutex::new(StatusLog::new(self.log_every));

        thread::scope(|s| -> Result<()> {
            let (requests, inbox) = mpsc::channel();
            let stepper = thread::Builder::new()
                .name("paratrain-step".into())
                .spawn_scoped(s, move || run_steps(step, store, inbox))?;

            let result = pool.for_each(examples, |example| {
                let mut gradient = LocalGradient::new(store.blank_set(Layout::Sparse));
                let mut value = LocalValue::new();

                example.accumulate(store, &mut gradient, &mut value)?;
                gradient.materialize();

                let value = value.value();
                let (done, outcome) = mpsc::channel();
                let request = StepRequest {
                    gradient: gradient.into_target(),
                    value,
                    done,
                };

                // Both ends only fail once the stepping thread panicked, its join resumes it.
                if requests.send(request).is_err() {
                    return Ok(());
                }
                match outcome.recv() {
                    Ok(stepped) => stepped?,
                    Err(_) => return Ok(()),
                }

                status.lock().record(value);
                Ok(())
            });

            drop(requests);
            if let Err(payload) = stepper.join() {
                panic::resume_unwind(payload);
            }
            result
        })?;

        self.iterations += 1;
        debug!(
            iteration = self.iterations,
            examples = status.into_inner().examples();
            "synchronized online pass done"
        );
        Ok(())
    }

    fn is_converged(&self) -> bool {
        self.iterations >= self.max_iterations
    }
}

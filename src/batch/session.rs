use crate::{
    assets::source::ImageSource,
    batch::run::{BatchOpts, CombinationResult, ensure_non_empty, run_batch_with},
    foundation::error::OverlayResult,
    layout::variant::LayoutVariant,
    render::compositor::{Compositor, CpuCompositor},
};

/// Lifecycle of the current batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has been started yet, or the session was reset.
    #[default]
    Idle,
    /// A run is in flight.
    Running,
    /// The last run rendered every pair.
    Done,
    /// The last run failed; no results are exposed.
    Failed,
}

/// Results and state of the most recent batch run.
#[derive(Debug, Default)]
pub struct BatchRun {
    state: RunState,
    generation: u64,
    results: Vec<CombinationResult>,
}

impl BatchRun {
    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of non-trivial runs started so far. Increments when a run begins.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a run is in flight.
    pub fn is_processing(&self) -> bool {
        self.state == RunState::Running
    }

    /// Results of the last successful run, in base-major order. Empty unless [`RunState::Done`].
    pub fn results(&self) -> &[CombinationResult] {
        &self.results
    }
}

/// Owns the current [`BatchRun`] and replaces it on every new run.
#[derive(Debug)]
pub struct BatchSession<C = CpuCompositor> {
    compositor: C,
    opts: BatchOpts,
    run: BatchRun,
}

impl BatchSession<CpuCompositor> {
    /// Session backed by the default CPU compositor.
    pub fn new(opts: BatchOpts) -> Self {
        Self::with_compositor(CpuCompositor, opts)
    }
}

impl Default for BatchSession<CpuCompositor> {
    fn default() -> Self {
        Self::new(BatchOpts::default())
    }
}

impl<C: Compositor> BatchSession<C> {
    /// Session backed by a custom compositor.
    pub fn with_compositor(compositor: C, opts: BatchOpts) -> Self {
        Self {
            compositor,
            opts,
            run: BatchRun::default(),
        }
    }

    /// The current run.
    pub fn run(&self) -> &BatchRun {
        &self.run
    }

    /// Threading options used for new runs.
    pub fn opts(&self) -> &BatchOpts {
        &self.opts
    }

    /// Whether a run is in flight.
    pub fn is_processing(&self) -> bool {
        self.run.is_processing()
    }

    /// Start a new run over every base x fabric pair.
    ///
    /// Empty inputs are rejected before anything changes, so the previous run stays as it was.
    /// Otherwise the previous results are discarded as soon as the new run starts. On failure the
    /// run ends in [`RunState::Failed`] with no results.
    pub fn run_batch(
        &mut self,
        bases: &[ImageSource],
        fabrics: &[ImageSource],
        variant: LayoutVariant,
    ) -> OverlayResult<&[CombinationResult]> {
        ensure_non_empty(bases, fabrics)?;

        self.run.results = Vec::new();
        self.run.generation += 1;
        let guard = RunGuard::start(&mut self.run.state);

        let results = run_batch_with(&self.compositor, bases, fabrics, variant, &self.opts)?;
        guard.settle(RunState::Done);
        self.run.results = results;
        Ok(&self.run.results)
    }

    /// Drop any results and return to [`RunState::Idle`].
    pub fn reset(&mut self) {
        self.run.results = Vec::new();
        self.run.state = RunState::Idle;
    }
}

/// Marks the run as running and guarantees it leaves that state, even on early return or panic.
struct RunGuard<'a> {
    state: &'a mut RunState,
    settled: bool,
}

impl<'a> RunGuard<'a> {
    fn start(state: &'a mut RunState) -> Self {
        *state = RunState::Running;
        Self {
            state,
            settled: false,
        }
    }

    fn settle(mut self, state: RunState) {
        *self.state = state;
        self.settled = true;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state = RunState::Failed;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/session.rs"]
mod tests;

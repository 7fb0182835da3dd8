use rayon::prelude::*;

use crate::{
    assets::source::ImageSource,
    foundation::error::{OverlayError, OverlayResult},
    layout::variant::LayoutVariant,
    render::compositor::{Compositor, CpuCompositor, RenderedImage},
};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Threading controls for a batch run.
pub struct BatchOpts {
    /// Render pairs on a worker pool when `true`, one after another otherwise.
    pub parallel: bool,
    /// Optional explicit worker thread count (parallel mode only).
    pub threads: Option<usize>,
}

impl Default for BatchOpts {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
        }
    }
}

impl BatchOpts {
    /// Reject option combinations that can never run.
    pub fn validate(&self) -> OverlayResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(OverlayError::validation(
                "batch 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// One composite of a single (base, fabric) pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombinationResult {
    /// Zero-based position of the base in the input list.
    pub base_index: usize,
    /// Zero-based position of the fabric in the input list.
    pub fabric_index: usize,
    /// Display name of the base.
    pub base_name: String,
    /// Display name of the fabric.
    pub fabric_name: String,
    /// The rendered composite.
    pub image: RenderedImage,
}

/// Render every base x fabric pair with the default [`CpuCompositor`].
pub fn run_batch(
    bases: &[ImageSource],
    fabrics: &[ImageSource],
    variant: LayoutVariant,
    opts: &BatchOpts,
) -> OverlayResult<Vec<CombinationResult>> {
    run_batch_with(&CpuCompositor, bases, fabrics, variant, opts)
}

/// Render every base x fabric pair with `compositor`.
///
/// Each base and each fabric is prepared (read and decoded) exactly once; the pairs then share
/// the prepared values. Results are ordered base-major, fabric-minor (the order of a nested loop
/// over `bases` then `fabrics`) no matter in which order the pairs finish. If any source or pair
/// fails the whole batch fails and no results are returned.
#[tracing::instrument(
    skip(compositor, bases, fabrics, opts),
    fields(bases = bases.len(), fabrics = fabrics.len(), parallel = opts.parallel)
)]
pub fn run_batch_with<C: Compositor + ?Sized>(
    compositor: &C,
    bases: &[ImageSource],
    fabrics: &[ImageSource],
    variant: LayoutVariant,
    opts: &BatchOpts,
) -> OverlayResult<Vec<CombinationResult>> {
    ensure_non_empty(bases, fabrics)?;
    opts.validate()?;

    let pairs = cartesian_pairs(bases.len(), fabrics.len());
    let execute = || -> OverlayResult<Vec<CombinationResult>> {
        let prepared_bases = try_map(bases, opts.parallel, |s| compositor.prepare(s))?;
        let prepared_fabrics = try_map(fabrics, opts.parallel, |s| compositor.prepare(s))?;
        tracing::debug!(
            sources = prepared_bases.len() + prepared_fabrics.len(),
            "sources prepared"
        );

        try_map(&pairs, opts.parallel, |&(b, f)| {
            let image = compositor.compose(&prepared_bases[b], &prepared_fabrics[f], variant)?;
            Ok(CombinationResult {
                base_index: b,
                fabric_index: f,
                base_name: bases[b].name().to_string(),
                fabric_name: fabrics[f].name().to_string(),
                image,
            })
        })
    };

    let mut out = if opts.parallel {
        build_thread_pool(opts.threads)?.install(execute)?
    } else {
        execute()?
    };
    out.sort_by_key(|r| (r.base_index, r.fabric_index));

    tracing::info!(results = out.len(), "batch complete");
    Ok(out)
}

/// Apply `f` to every item, on the current rayon pool when `parallel` is set, and keep the
/// results in item order. The first error in item order wins.
fn try_map<T, R, F>(items: &[T], parallel: bool, f: F) -> OverlayResult<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> OverlayResult<R> + Sync + Send,
{
    let mapped = if parallel {
        items.par_iter().map(&f).collect::<Vec<_>>()
    } else {
        items.iter().map(&f).collect::<Vec<_>>()
    };

    let mut out = Vec::<R>::with_capacity(mapped.len());
    for item in mapped {
        out.push(item?);
    }
    Ok(out)
}

pub(crate) fn ensure_non_empty(bases: &[ImageSource], fabrics: &[ImageSource]) -> OverlayResult<()> {
    if bases.is_empty() {
        return Err(OverlayError::empty_input("no base images provided"));
    }
    if fabrics.is_empty() {
        return Err(OverlayError::empty_input("no fabric images provided"));
    }
    Ok(())
}

/// All `(base_index, fabric_index)` pairs in nested-loop order.
pub fn cartesian_pairs(bases: usize, fabrics: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(bases.saturating_mul(fabrics));
    for b in 0..bases {
        for f in 0..fabrics {
            pairs.push((b, f));
        }
    }
    pairs
}

fn build_thread_pool(threads: Option<usize>) -> OverlayResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| OverlayError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/run.rs"]
mod tests;

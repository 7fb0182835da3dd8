//! fabric-overlay composites base product photos (couches, curtains) with fabric swatches.
//!
//! Every base is paired with every fabric (a cartesian product), each pair is rendered onto a
//! fixed-size canvas, and the results can be bundled into a single zip archive.
//!
//! # Pipeline overview
//!
//! 1. **Collect**: named [`ImageSource`]s for bases and fabrics
//! 2. **Composite**: `(base, fabric, LayoutVariant) -> RenderedImage` ([`render()`])
//! 3. **Batch**: fan the compositor out over all pairs ([`run_batch`], [`BatchSession`])
//! 4. **Package** (optional): write composites into a zip archive ([`build_archive`])
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: geometry is a pure function of input sizes and the layout variant, and
//!   batch results come back in base-major order regardless of which pair finished first.
//! - **All or nothing**: a batch either renders every pair or reports the first error it kept.
//! - **No IO in the compositor** beyond reading file-backed sources; output is PNG in memory.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod batch;
mod foundation;
mod layout;
mod package;
mod render;

pub use assets::decode::{MAX_IMAGE_SIDE, PreparedImage, decode_image, decode_source};
pub use assets::source::{ImageSource, display_name_from_filename};
pub use batch::job::{JobReport, JobSpec, run_job};
pub use batch::run::{
    BatchOpts, CombinationResult, cartesian_pairs, run_batch, run_batch_with,
};
pub use batch::session::{BatchRun, BatchSession, RunState};
pub use foundation::core::{Canvas, Rect, Rgba8, Size};
pub use foundation::error::{OverlayError, OverlayResult};
pub use layout::variant::{LayoutPlan, LayoutVariant, fit_into_zone};
pub use package::archive::{
    ArchiveEntry, DEFAULT_ARCHIVE_NAME, archive_entries, build_archive, entry_filename,
    sanitize_name, write_archive, write_pngs_to_dir,
};
pub use render::compositor::{
    Compositor, CpuCompositor, RenderedImage, render, render_prepared,
};
pub use render::cpu::FrameRgba;

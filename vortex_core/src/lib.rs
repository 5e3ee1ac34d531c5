//! # Vortex Core
//!
//! Sorts an ingest tree into a category-partitioned, content-addressed
//! destination tree.
//!
//! Every regular file under the ingest root is classified by extension,
//! hashed, and either deleted (its content is already in the destination) or
//! moved to `{destination}/{category}/{digest}.{ext}`. Directories left empty
//! are removed afterwards.
//!
//! ## Features
//!
//! - Dedup against everything already in the destination, rebuilt each run
//! - SHA-256 or BLAKE3 content digests
//! - Extension-based categories, unknown types left untouched
//! - OS metadata files (`desktop.ini`) deleted wherever they appear
//! - Post-order pruning of emptied directories
//!
//! ## Example
//!
//! ```no_run
//! use vortex_core::{Engine, Options};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::open("./sorted", Options::default())?;
//! let report = engine.run("./incoming")?;
//! println!("Placed {} files, deleted {} duplicates", report.placed, report.duplicates_deleted);
//! # Ok(())
//! # }
//! ```

mod category;
mod engine;
mod error;
mod hash;
mod index;
mod layout;
mod place;
mod prune;
mod walk;

pub use category::{Category, Classification, Classifier, DEFAULT_SENTINEL, extension};
pub use engine::{Engine, Options, RunReport, check_roots, run};
pub use error::{Error, Result};
pub use hash::{Algorithm, DIGEST_SIZE, Digest};
pub use index::{IndexSummary, SeenDigestIndex};
pub use layout::DestinationLayout;
pub use place::{DeleteReason, FileRecord, Outcome, SkipReason, place};
pub use prune::{PruneOutcome, Pruner};

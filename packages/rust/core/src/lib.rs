//! Core pipeline orchestration and domain logic for doclib.
//!
//! Ties discovery, normalization, classification and library emission
//! together into the `build` workflow, and provides keyword search over a
//! written corpus.

pub mod classify;
pub mod corpus;
pub mod library;
pub mod pipeline;
pub mod search;

pub use classify::{classify, classify_corpus, classify_entry};
pub use corpus::build_corpus;
pub use library::{LibraryConfig, LibraryResult, read_manifest, write_library};
pub use pipeline::{BuildLibraryResult, ProgressReporter, SilentProgress, build_library};
pub use search::{SearchHit, load_corpus, search};

//! Huediff Core - Colour-coded text comparison
//!
//! This library splits two inputs into tokens for a chosen granularity,
//! computes a minimal edit script between them, and renders the result as
//! highlighted markup. A [`Session`] ties these together with durable state.

pub mod diff;
pub mod mode;
pub mod render;
pub mod segment;
pub mod session;
pub mod store;
pub mod tokenize;

pub use diff::{compute_diff, diff, Comparison, DiffEngine};
pub use mode::{Mode, UnsupportedMode};
pub use render::{escape, render, MarkupRenderer, Palette, DEFAULT_PLACEHOLDER};
pub use segment::{DiffResult, DiffSegment, SegmentKind};
pub use session::{derive_output, derive_output_with, ClipboardSource, Session};
pub use similar::Algorithm;
pub use store::{FileStorage, MemoryStorage, PersistedState, StateStore, Storage, StoreError};
pub use tokenize::{tokenize, ParseFailure, Side, Token, Tokenized};

//! Directory scan → chunk → capability → aggregate pipeline
//!
//! - **filter**: gitignore-style rules and the per-entry path filter
//! - **walker**: deterministic, scope-aware directory walk
//! - **chunker**: character-based overlapping chunks
//! - **cancel**: cancellation token checked between chunks
//! - **directory**: sequential orchestration and aggregation
//! - **concurrent**: bounded parallel execution across files

pub mod cancel;
pub mod chunker;
mod concurrent;
pub mod directory;
pub mod filter;
pub mod walker;

pub use cancel::CancellationToken;
pub use chunker::{split, Chunk, Chunker, Chunks};
pub use directory::{DirectoryPipeline, ProgressCallback, ProgressEvent};
pub use filter::{IgnoreChain, IgnoreSpec, PathFilter};
pub use walker::{FileWalker, WalkOutcome, WalkedFile};

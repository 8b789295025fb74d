use thiserror::Error;

/// Errors surfaced by the rendering pipelines.
///
/// Degenerate geometry and recursion-limit conditions are recovered inside
/// the pipelines (treated as a miss / terminal payload) and never reach this
/// enum; only caller contract violations do.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    #[error("pipeline precondition violated: {0}")]
    Precondition(&'static str),

    #[error("resource index {index} out of range (count {count})")]
    OutOfRange { index: usize, count: usize },
}

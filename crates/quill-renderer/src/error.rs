//! Error types for the rendering pipeline.

/// Unrecoverable rendering failure.
///
/// Fragment-level problems (bad math, unknown languages) never surface here;
/// they degrade in place. These errors mean the source has to be fixed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// The document nests blocks or inlines deeper than allowed.
    #[error("rendering error: nesting deeper than {limit} levels")]
    NestingTooDeep {
        /// Configured nesting limit.
        limit: usize,
    },

    /// The parser produced a closing event without a matching opening one.
    #[error("rendering error: unbalanced markdown structure at {context}")]
    Unbalanced {
        /// Event that could not be matched.
        context: &'static str,
    },
}

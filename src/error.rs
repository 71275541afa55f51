use thiserror::Error;

/// Failures surfaced by the event bridge and the renderer.
///
/// Rendering is a pure function of the input tree: any error returned for a
/// given document will recur identically on retry, so callers batch-processing
/// many documents should skip the offending one and move on.
#[derive(Debug, Error)]
pub enum Error {
    /// The document has a shape the renderer does not support, such as an
    /// unbalanced event stream handed over by the parser.
    #[error("malformed document: {context}")]
    MalformedDocument { context: String },

    /// Container nesting exceeded the permitted depth: the parser's fixed
    /// cap while the tree is built, or [`RenderOptions::max_depth`] while it
    /// is rendered.
    ///
    /// [`RenderOptions::max_depth`]: crate::RenderOptions::max_depth
    #[error("document nesting exceeds the configured limit of {limit}")]
    NestingTooDeep { limit: usize },
}

use alloc::string::String;

/// Configuration and host errors surfaced by the tracker.
///
/// Misconfigured callbacks are not errors; see [`crate::Handler::Unresolved`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The host could not report scroll metrics for the configured container.
    #[error("container metrics are unavailable")]
    ContainerUnavailable,
    /// The host rejected the target selector.
    #[error("invalid target selector `{0}`")]
    InvalidSelector(String),
    /// A selected target has no measurable geometry (e.g. it is detached from the document).
    #[error("target element has no measurable geometry")]
    TargetGeometryUnavailable,
}

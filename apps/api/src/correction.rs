//! Text correction collaborator: spelling and grammar fixes applied to prose
//! fields before layout.
//!
//! The layout engine receives one by reference at render time instead of
//! reaching for a process-wide client. Implementations must be pure with
//! respect to the render: no I/O is performed while a document is laid out.

/// Pluggable prose corrector. Default: `PassthroughCorrector`.
pub trait TextCorrector: Send + Sync {
    fn correct(&self, text: &str) -> String;
}

/// Returns text unchanged. Used when no correction service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCorrector;

impl TextCorrector for PassthroughCorrector {
    fn correct(&self, text: &str) -> String {
        text.to_string()
    }
}

//! External abort request

/// Source of abort requests, polled on every stage-controller iteration
///
/// Implementations must answer without blocking; the firmware checks the
/// serial receive buffer for a reset byte.
pub trait AbortSignal {
    /// Returns true once an abort has been requested
    fn abort_requested(&mut self) -> bool;
}

/// Abort signal that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn abort_requested(&mut self) -> bool {
        false
    }
}

impl<A: AbortSignal + ?Sized> AbortSignal for &mut A {
    fn abort_requested(&mut self) -> bool {
        (**self).abort_requested()
    }
}

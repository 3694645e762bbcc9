//! The operation contract consumed by pooled handles.

/// Shared state that performs work against caller-supplied extrinsic state.
///
/// Implementors hold only intrinsic (shareable) data. Everything that varies
/// per use is passed in as [`Extrinsic`](Self::Extrinsic) at call time.
pub trait Flyweight: Send + Sync + 'static {
    /// Per-use state owned by the calling context.
    type Extrinsic;

    /// Performs the operation and returns its rendered result.
    fn operation(&self, extrinsic: &Self::Extrinsic) -> String;
}

use std::io::{self, Write};

/// Capability surface the coordination layer needs from a model snapshot.
///
/// The merge must be associative and commutative up to floating-point
/// rounding, so that the order in which worker contributions are folded does
/// not matter. Snapshots are shared read-only across tasks once handed out,
/// hence `Sync`.
pub trait Reducible: Clone + Send + Sync + 'static {
    /// Folds another snapshot into this one, elementwise.
    fn merge(&mut self, other: &Self);

    /// Scales every numeric component by `factor`.
    fn scale(&mut self, factor: f32);

    /// Writes the snapshot to a binary sink.
    ///
    /// # Errors
    /// Returns the underlying I/O error if the sink rejects a write.
    fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()>;
}

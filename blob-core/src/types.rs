/// Identifier for a blob inside a [`crate::simulation::Simulation`].
///
/// This is an index into the simulation's blob vector, and is only
/// meaningful while that vector keeps its length (between `init` and
/// `dispose`).
pub type BlobId = usize;

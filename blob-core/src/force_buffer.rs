use crate::types::BlobId;
use glam::Vec2;

/// A per-tick buffer that accumulates repulsion corrections per blob.
///
/// For each `BlobId`, this buffer stores:
///
/// - The sum of all velocity corrections produced by overlapping neighbours.
/// - The deepest overlap fraction seen, used for contact pressure.
/// - The number of contacts that were added.
///
/// Collision detection only reads blob positions and writes here, so the
/// blob vector can be mutated in a single pass afterwards.
#[derive(Debug, Default)]
pub struct ForceBuffer {
    /// Accumulated velocity change for each blob.
    dv: Vec<Vec2>,
    /// Deepest overlap fraction for each blob.
    overlap: Vec<f32>,
    /// Number of contacts for each blob.
    pub count: Vec<u32>,
}

impl ForceBuffer {
    /// Creates a new [`ForceBuffer`] with the given length, all entries
    /// zeroed.
    pub fn with_len(len: usize) -> Self {
        Self {
            dv: vec![Vec2::ZERO; len],
            overlap: vec![0.0; len],
            count: vec![0; len],
        }
    }

    /// Resizes the buffer to `len` and clears every entry, even if the
    /// length was already correct.
    pub fn ensure_len(&mut self, len: usize) {
        if self.dv.len() != len {
            self.dv.resize(len, Vec2::ZERO);
            self.overlap.resize(len, 0.0);
            self.count.resize(len, 0);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.dv.fill(Vec2::ZERO);
        self.overlap.fill(0.0);
        self.count.fill(0);
    }

    /// Records one contact for `id`.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: BlobId, dv: Vec2, overlap: f32) {
        self.dv[id] += dv;
        self.overlap[id] = self.overlap[id].max(overlap);
        self.count[id] += 1;
    }

    #[inline]
    pub fn total(&self, id: BlobId) -> Vec2 {
        self.dv[id]
    }

    #[inline]
    pub fn overlap(&self, id: BlobId) -> f32 {
        self.overlap[id]
    }

    /// Ids of all blobs with at least one contact.
    pub fn touched_indices(&self) -> impl Iterator<Item = BlobId> + '_ {
        self.count
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c > 0 { Some(i) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf = ForceBuffer::with_len(4);
        assert_eq!(buf.count.len(), 4);
        for id in 0..4 {
            assert_eq!(buf.total(id), Vec2::ZERO);
            assert_eq!(buf.overlap(id), 0.0);
            assert_eq!(buf.count[id], 0);
        }
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf = ForceBuffer::with_len(2);
        buf.add(1, Vec2::new(1.0, 0.0), 0.5);

        buf.ensure_len(2);
        assert_eq!(buf.count[1], 0);
        assert_eq!(buf.total(1), Vec2::ZERO);

        buf.ensure_len(5);
        assert_eq!(buf.count.len(), 5);
        assert_eq!(buf.touched_indices().count(), 0);
    }

    #[test]
    fn add_sums_corrections_and_keeps_deepest_overlap() {
        let mut buf = ForceBuffer::with_len(2);
        buf.add(0, Vec2::new(1.0, 0.0), 0.2);
        buf.add(0, Vec2::new(0.0, 2.0), 0.6);
        buf.add(0, Vec2::new(1.0, 0.0), 0.1);

        assert_eq!(buf.total(0), Vec2::new(2.0, 2.0));
        assert_eq!(buf.overlap(0), 0.6);
        assert_eq!(buf.count[0], 3);
        assert_eq!(buf.count[1], 0);
    }

    #[test]
    fn touched_indices_returns_only_contacted_blobs() {
        let mut buf = ForceBuffer::with_len(4);
        buf.add(0, Vec2::X, 0.1);
        buf.add(2, Vec2::Y, 0.1);

        let ids: Vec<BlobId> = buf.touched_indices().collect();
        assert_eq!(ids, vec![0, 2]);

        buf.clear();
        assert_eq!(buf.touched_indices().count(), 0);
    }
}

//! Owned, serializable view of one frame.

use serde::{Deserialize, Serialize};

use crate::blob::Blob;
use crate::types::BlobId;

/// Everything a renderer needs to draw one blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlobSnapshot {
    pub id: BlobId,
    pub position: [f32; 2],
    pub size: f32,
    /// Boundary radii in point order.
    pub radii: Vec<f32>,
    /// Boundary angles in point order, radians.
    pub angles: Vec<f32>,
    pub color: String,
    pub gradient_id: String,
    pub intensity: f32,
}

impl From<&Blob> for BlobSnapshot {
    fn from(blob: &Blob) -> Self {
        Self {
            id: blob.id,
            position: blob.position().to_array(),
            size: blob.size(),
            radii: blob.boundary.points.iter().map(|p| p.radius).collect(),
            angles: blob.boundary.points.iter().map(|p| p.angle).collect(),
            color: blob.render.color.clone(),
            gradient_id: blob.render.gradient_id.clone(),
            intensity: blob.render.intensity,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Simulated time of the last tick.
    pub time: f32,
    pub blobs: Vec<BlobSnapshot>,
}

impl FrameSnapshot {
    pub fn capture(time: f32, blobs: &[Blob]) -> Self {
        Self {
            time,
            blobs: blobs.iter().map(BlobSnapshot::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn capture_copies_render_state() {
        let blobs = vec![
            Blob::new(0, Vec2::new(1.0, 2.0), 10.0, 4),
            Blob::new(1, Vec2::new(3.0, 4.0), 12.0, 4),
        ];
        let frame = FrameSnapshot::capture(1.5, &blobs);
        assert_eq!(frame.time, 1.5);
        assert_eq!(frame.blobs.len(), 2);
        let b = &frame.blobs[1];
        assert_eq!(b.id, 1);
        assert_eq!(b.position, [3.0, 4.0]);
        assert_eq!(b.radii, vec![12.0; 4]);
        assert_eq!(b.angles.len(), 4);
        assert_eq!(b.gradient_id, "blob-gradient-1");
    }

    #[test]
    fn json_shape() {
        let blobs = vec![Blob::new(0, Vec2::new(1.0, 2.0), 10.0, 3)];
        let frame = FrameSnapshot::capture(0.25, &blobs);
        let json = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["time"], 0.25);
        assert_eq!(json["blobs"][0]["position"], serde_json::json!([1.0, 2.0]));
        assert_eq!(json["blobs"][0]["radii"].as_array().map(Vec::len), Some(3));
        assert!(json["blobs"][0]["color"].is_string());

        let back: FrameSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, frame);
    }
}

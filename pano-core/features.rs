use crate::error::{CoreError, CoreResult};

/// Key-point ≙ FAST corner + orientation (radians) with subpixel precision,
/// expressed in base image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the described patch in base image pixels
    pub size: f32,
    pub angle: f32,
    /// Harris corner response
    pub response: f32,
    /// Pyramid level the corner was found on
    pub octave: u8,
}

pub const DESCRIPTOR_BYTES: usize = 32;

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; DESCRIPTOR_BYTES];

/// Number of differing bits between two descriptors.
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Candidate correspondence between a query (first image) and a train
/// (second image) feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: u32,
}

/// Index-aligned keypoints and descriptors of one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl Features {
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<Descriptor>) -> CoreResult<Self> {
        if keypoints.len() != descriptors.len() {
            return Err(CoreError::FeatureCountMismatch {
                keypoints: keypoints.len(),
                descriptors: descriptors.len(),
            });
        }
        Ok(Self {
            keypoints,
            descriptors,
        })
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Keypoint, &Descriptor)> {
        self.keypoints.iter().zip(self.descriptors.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint {
            x,
            y,
            size: 31.0,
            angle: 0.0,
            response: 1.0,
            octave: 0,
        }
    }

    #[test]
    fn test_hamming_distance() {
        let a = [0u8; 32];
        let mut b = [0u8; 32];
        assert_eq!(hamming_distance(&a, &b), 0);
        b[0] = 0b1011;
        b[31] = 0xFF;
        assert_eq!(hamming_distance(&a, &b), 11);
        assert_eq!(hamming_distance(&[0xFF; 32], &[0; 32]), 256);
    }

    #[test]
    fn test_features_require_equal_lengths() {
        let result = Features::new(vec![kp(1.0, 2.0)], vec![]);
        assert_eq!(
            result,
            Err(CoreError::FeatureCountMismatch {
                keypoints: 1,
                descriptors: 0
            })
        );
    }

    #[test]
    fn test_features_iteration_is_index_aligned() {
        let features = Features::new(vec![kp(1.0, 2.0), kp(3.0, 4.0)], vec![[1; 32], [2; 32]]).unwrap();
        let pairs: Vec<_> = features.iter().map(|(k, d)| (k.x, d[0])).collect();
        assert_eq!(pairs, vec![(1.0, 1), (3.0, 2)]);
        assert_eq!(features.len(), 2);
        assert!(Features::default().is_empty());
    }
}

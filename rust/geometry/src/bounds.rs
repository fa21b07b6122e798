// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounding volumes over flat position buffers

use crate::error::{Error, Result};
use nalgebra::Point3;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// A box containing nothing (`min > max`)
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Compute the box of a flat buffer with `item_size` components per
    /// vertex (2 or 3; missing Z is taken as 0).
    pub fn from_positions(positions: &[f32], item_size: usize) -> Self {
        if item_size == 0 || positions.len() < item_size {
            return Self::empty();
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        positions.chunks_exact(item_size).for_each(|chunk| {
            let x = chunk[0];
            let y = chunk.get(1).copied().unwrap_or(0.0);
            let z = if item_size > 2 { chunk[2] } else { 0.0 };
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        Self { min, max }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Planar (XY) area of the box, zero when empty
    pub fn area_2d(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    /// Zero-radius sphere at the origin, used when there is nothing to bound
    pub fn zero() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.0,
        }
    }

    /// Sphere centred on the bounding box, with the radius reaching the
    /// farthest vertex.
    ///
    /// Any NaN coordinate yields a NaN radius so the caller can report it.
    pub fn from_positions(positions: &[f32], item_size: usize) -> Self {
        let bbox = BoundingBox::from_positions(positions, item_size);
        // min/max skip NaN, so an all-NaN axis leaves the box looking empty
        if positions.iter().any(|v| v.is_nan()) {
            return Self {
                center: bbox.center(),
                radius: f32::NAN,
            };
        }
        if bbox.is_empty() {
            return Self::zero();
        }

        let center = bbox.center();
        let max_sq = positions
            .chunks_exact(item_size)
            .map(|chunk| {
                let z = if item_size > 2 { chunk[2] } else { 0.0 };
                (Point3::new(chunk[0], chunk[1], z) - center).norm_squared()
            })
            .fold(0.0f32, f32::max);

        Self {
            center,
            radius: max_sq.sqrt(),
        }
    }

    /// Sphere enclosing a planar buffer: centred on its box, radius half the
    /// box diagonal.
    pub fn from_planar_positions(positions: &[f32]) -> Self {
        if positions.len() < 2 {
            return Self::zero();
        }
        let bbox = BoundingBox::from_positions(positions, 2);
        if positions.iter().any(|v| v.is_nan()) {
            return Self {
                center: bbox.center(),
                radius: f32::NAN,
            };
        }
        let width = bbox.max.x - bbox.min.x;
        let height = bbox.max.y - bbox.min.y;
        Self {
            center: Point3::new(bbox.min.x + width / 2.0, bbox.min.y + height / 2.0, 0.0),
            radius: (width * width + height * height).sqrt() / 2.0,
        }
    }

    /// Fails with [`Error::DegenerateGeometry`] when the radius is not a
    /// finite number.
    pub fn validate(&self) -> Result<()> {
        if self.radius.is_finite() {
            Ok(())
        } else {
            Err(Error::DegenerateGeometry { radius: self.radius })
        }
    }
}

impl Default for BoundingSphere {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_3d() {
        let bbox = BoundingBox::from_positions(&[0.0, 0.0, 0.0, 2.0, -1.0, 4.0], 3);
        assert_eq!(bbox.min, Point3::new(0.0, -1.0, 0.0));
        assert_eq!(bbox.max, Point3::new(2.0, 0.0, 4.0));
    }

    #[test]
    fn test_box_2d_has_flat_z() {
        let bbox = BoundingBox::from_positions(&[1.0, 2.0, 3.0, 5.0], 2);
        assert_eq!(bbox.min, Point3::new(1.0, 2.0, 0.0));
        assert_eq!(bbox.max, Point3::new(3.0, 5.0, 0.0));
        assert_relative_eq!(bbox.area_2d(), 6.0);
    }

    #[test]
    fn test_empty_box() {
        let bbox = BoundingBox::from_positions(&[], 2);
        assert!(bbox.is_empty());
        assert_relative_eq!(bbox.area_2d(), 0.0);
    }

    #[test]
    fn test_sphere_reaches_farthest_vertex() {
        let sphere = BoundingSphere::from_positions(&[-1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.5, 0.0], 3);
        assert_relative_eq!(sphere.center.y, 0.25);
        assert_relative_eq!(sphere.radius, (1.0f32 + 0.0625).sqrt());
        assert!(sphere.validate().is_ok());
    }

    #[test]
    fn test_planar_sphere() {
        let sphere = BoundingSphere::from_planar_positions(&[0.0, 0.0, 6.0, 8.0]);
        assert_relative_eq!(sphere.radius, 5.0);
        assert_relative_eq!(sphere.center.x, 3.0);
        assert_relative_eq!(sphere.center.y, 4.0);
    }

    #[test]
    fn test_nan_radius_is_reported() {
        let sphere = BoundingSphere::from_positions(&[0.0, f32::NAN, 0.0], 3);
        assert!(sphere.radius.is_nan());
        assert!(matches!(sphere.validate(), Err(Error::DegenerateGeometry { .. })));
    }

    #[test]
    fn test_nan_on_every_vertex_is_reported() {
        let sphere = BoundingSphere::from_positions(&[0.0, f32::NAN, 0.0, 1.0, f32::NAN, 0.0], 3);
        assert!(sphere.radius.is_nan());
        assert!(sphere.validate().is_err());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray hit testing against ribbons
//!
//! Ribbons are widened in the vertex shader, so the CPU only knows the
//! centre line. A hit is a segment of that line passing within
//! `threshold + line_width * width / 2` of the ray.

use crate::bounds::BoundingSphere;
use crate::ribbon::RibbonBuilder;
use nalgebra::{Matrix4, Point3, Vector3};

/// Half-line with a unit direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a ray; `direction` is normalised
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros),
        }
    }

    /// Point at parameter `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Transform by an affine matrix, renormalising the direction
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        Self::new(
            matrix.transform_point(&self.origin),
            matrix.transform_vector(&self.direction),
        )
    }

    /// Squared distance to `point`
    pub fn distance_sq_to_point(&self, point: &Point3<f32>) -> f32 {
        let t = (point - self.origin).dot(&self.direction);
        if t < 0.0 {
            return (point - self.origin).norm_squared();
        }
        (self.at(t) - point).norm_squared()
    }

    /// Whether the ray passes through `sphere`
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.distance_sq_to_point(&sphere.center) <= sphere.radius * sphere.radius
    }

    /// Squared distance between the ray and segment `v0..v1`.
    ///
    /// Returns the distance along with the closest point on the ray and the
    /// closest point on the segment. Zero-length segments degrade to a point
    /// query.
    pub fn distance_sq_to_segment(
        &self,
        v0: &Point3<f32>,
        v1: &Point3<f32>,
    ) -> (f32, Point3<f32>, Point3<f32>) {
        let seg_center = nalgebra::center(v0, v1);
        let seg_dir = (v1 - v0).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);
        let diff = self.origin - seg_center;

        let seg_extent = (v1 - v0).norm() * 0.5;
        let a01 = -self.direction.dot(&seg_dir);
        let b0 = diff.dot(&self.direction);
        let b1 = -diff.dot(&seg_dir);
        let c = diff.norm_squared();
        let det = (1.0 - a01 * a01).abs();

        let (s0, s1, sqr_dist);
        if det > 0.0 {
            // Ray and segment are not parallel
            let mut t0 = a01 * b1 - b0;
            let mut t1 = a01 * b0 - b1;
            let ext_det = seg_extent * det;

            if t0 >= 0.0 {
                if t1 >= -ext_det {
                    if t1 <= ext_det {
                        // Closest points are interior to both
                        let inv_det = 1.0 / det;
                        t0 *= inv_det;
                        t1 *= inv_det;
                        sqr_dist = t0 * (t0 + a01 * t1 + 2.0 * b0) + t1 * (a01 * t0 + t1 + 2.0 * b1) + c;
                    } else {
                        t1 = seg_extent;
                        t0 = (-(a01 * t1 + b0)).max(0.0);
                        sqr_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
                    }
                } else {
                    t1 = -seg_extent;
                    t0 = (-(a01 * t1 + b0)).max(0.0);
                    sqr_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
                }
            } else if t1 <= -ext_det {
                t0 = (-(-a01 * seg_extent + b0)).max(0.0);
                t1 = if t0 > 0.0 { -seg_extent } else { (-b1).max(-seg_extent).min(seg_extent) };
                sqr_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
            } else if t1 <= ext_det {
                t0 = 0.0;
                t1 = (-b1).max(-seg_extent).min(seg_extent);
                sqr_dist = t1 * (t1 + 2.0 * b1) + c;
            } else {
                t0 = (-(a01 * seg_extent + b0)).max(0.0);
                t1 = if t0 > 0.0 { seg_extent } else { (-b1).max(-seg_extent).min(seg_extent) };
                sqr_dist = -t0 * t0 + t1 * (t1 + 2.0 * b1) + c;
            }
            s0 = t0;
            s1 = t1;
        } else {
            // Parallel
            s1 = if a01 > 0.0 { -seg_extent } else { seg_extent };
            s0 = (-(a01 * s1 + b0)).max(0.0);
            sqr_dist = -s0 * s0 + s1 * (s1 + 2.0 * b1) + c;
        }

        (sqr_dist, self.at(s0), seg_center + seg_dir * s1)
    }
}

/// Ray plus acceptance parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raycaster {
    pub ray: Ray,
    /// Extra pick tolerance added to the half line width
    pub threshold: f32,
    /// Hits closer than this are ignored
    pub near: f32,
    /// Hits farther than this are ignored
    pub far: f32,
}

impl Raycaster {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            threshold: 1.0,
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

/// Accepted ribbon hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonHit {
    /// Distance from the ray origin to the hit, in world units
    pub distance: f32,
    /// Closest point on the ribbon's centre line, in world space
    pub point: Point3<f32>,
    /// Position in the index buffer of the segment's first vertex
    pub index: usize,
}

impl RibbonBuilder {
    /// Test `raycaster` against this ribbon drawn with `line_width`.
    ///
    /// Segments are scanned in index-buffer order and the first one within
    /// tolerance and inside `near..=far` is returned. That hit is not
    /// necessarily the closest one along the ray.
    pub fn raycast(&self, raycaster: &Raycaster, line_width: f32) -> Option<RibbonHit> {
        let mesh = self.mesh();
        if mesh.is_empty() {
            return None;
        }

        let world_sphere = transform_sphere(mesh.bounding_sphere(), &self.matrix_world);
        if !raycaster.ray.intersects_sphere(&world_sphere) {
            return None;
        }

        let inverse = self.matrix_world.try_inverse()?;
        let local_ray = raycaster.ray.transform(&inverse);

        let indices = mesh.index().as_slice();
        let positions = mesh.position().as_slice();
        let widths = mesh.width().as_slice();

        for i in 0..indices.len() - 1 {
            let a = indices[i] as usize;
            let b = indices[i + 1] as usize;
            let v_start = vertex_at(positions, a);
            let v_end = vertex_at(positions, b);

            let width = widths.get(a).copied().unwrap_or(1.0);
            let precision = raycaster.threshold + line_width * width / 2.0;

            let (dist_sq, on_ray, on_segment) = local_ray.distance_sq_to_segment(&v_start, &v_end);
            if dist_sq > precision * precision {
                continue;
            }

            let on_ray_world = self.matrix_world.transform_point(&on_ray);
            let distance = (on_ray_world - raycaster.ray.origin).norm();
            if distance < raycaster.near || distance > raycaster.far {
                continue;
            }

            return Some(RibbonHit {
                distance,
                point: self.matrix_world.transform_point(&on_segment),
                index: i,
            });
        }

        None
    }
}

#[inline]
fn vertex_at(positions: &[f32], i: usize) -> Point3<f32> {
    Point3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2])
}

fn transform_sphere(sphere: &BoundingSphere, matrix: &Matrix4<f32>) -> BoundingSphere {
    let max_scale_sq = (0..3)
        .map(|c| matrix.fixed_view::<3, 1>(0, c).norm_squared())
        .fold(0.0f32, f32::max);
    BoundingSphere {
        center: matrix.transform_point(&sphere.center),
        radius: sphere.radius * max_scale_sq.sqrt(),
    }
}

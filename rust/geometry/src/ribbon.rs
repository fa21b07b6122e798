// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Camera-facing ribbon meshes
//!
//! A polyline of `n` points becomes a strip of `2n` vertices: every point is
//! emitted twice, once per rail. The vertex shader pushes each copy sideways
//! along the miter computed from the `previous` and `next` attributes, scaled
//! by `width` and signed by `side`, so the strip always faces the camera.
//!
//! ```text
//!  rail +1:  0 ---- 2 ---- 4 ---- 6
//!            |  \   |  \   |  \   |
//!  rail -1:  1 ---- 3 ---- 5 ---- 7
//! ```
//!
//! Segment `j` is drawn as triangles `(2j, 2j+1, 2j+2)` and
//! `(2j+2, 2j+1, 2j+3)`.

use crate::attribute::{names, Attribute, IndexBuffer};
use crate::bounds::{BoundingBox, BoundingSphere};
use crate::error::{Error, Result};
use meshline_core::PointSource;
use nalgebra::{Matrix4, Point3};

/// Maps a normalised arc position `t ∈ [0, 1]` to a width multiplier
pub type WidthFn = Box<dyn Fn(f32) -> f32 + Send>;

/// Buffers of one ribbon, ready for upload
#[derive(Debug, Clone)]
pub struct RibbonMesh {
    pub(crate) position: Attribute,
    pub(crate) previous: Attribute,
    pub(crate) next: Attribute,
    pub(crate) side: Attribute,
    pub(crate) width: Attribute,
    pub(crate) uv: Attribute,
    pub(crate) counters: Attribute,
    pub(crate) index: IndexBuffer,
    pub(crate) bounding_box: BoundingBox,
    pub(crate) bounding_sphere: BoundingSphere,
}

impl RibbonMesh {
    fn new() -> Self {
        Self {
            position: Attribute::new(names::POSITION, 3),
            previous: Attribute::new(names::PREVIOUS, 3),
            next: Attribute::new(names::NEXT, 3),
            side: Attribute::new(names::SIDE, 1),
            width: Attribute::new(names::WIDTH, 1),
            uv: Attribute::new(names::UV, 2),
            counters: Attribute::new(names::COUNTERS, 1),
            index: IndexBuffer::new(names::INDEX, 1),
            bounding_box: BoundingBox::empty(),
            bounding_sphere: BoundingSphere::zero(),
        }
    }

    #[inline]
    pub fn position(&self) -> &Attribute {
        &self.position
    }

    #[inline]
    pub fn previous(&self) -> &Attribute {
        &self.previous
    }

    #[inline]
    pub fn next(&self) -> &Attribute {
        &self.next
    }

    #[inline]
    pub fn side(&self) -> &Attribute {
        &self.side
    }

    #[inline]
    pub fn width(&self) -> &Attribute {
        &self.width
    }

    #[inline]
    pub fn uv(&self) -> &Attribute {
        &self.uv
    }

    #[inline]
    pub fn counters(&self) -> &Attribute {
        &self.counters
    }

    #[inline]
    pub fn index(&self) -> &IndexBuffer {
        &self.index
    }

    /// All vertex attributes, in shader binding order
    pub fn attributes(&self) -> [&Attribute; 7] {
        [
            &self.position,
            &self.previous,
            &self.next,
            &self.side,
            &self.width,
            &self.uv,
            &self.counters,
        ]
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.position.count()
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.index.len() / 3
    }

    /// Whether there is anything to draw
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    #[inline]
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    /// Report a bounding sphere whose radius is not finite
    pub fn validate_bounds(&self) -> Result<()> {
        self.bounding_sphere.validate()
    }

    /// Clear every attribute's dirty flag after the renderer uploaded them
    pub fn mark_uploaded(&mut self) {
        self.position.mark_uploaded();
        self.previous.mark_uploaded();
        self.next.mark_uploaded();
        self.side.mark_uploaded();
        self.width.mark_uploaded();
        self.uv.mark_uploaded();
        self.counters.mark_uploaded();
        self.index.mark_uploaded();
    }

    fn compute_bounds(&mut self) {
        self.bounding_box = BoundingBox::from_positions(self.position.as_slice(), 3);
        self.bounding_sphere = BoundingSphere::from_positions(self.position.as_slice(), 3);
        if let Err(err) = self.bounding_sphere.validate() {
            tracing::warn!(error = %err, "Ribbon position buffer is likely to contain NaN values");
        }
    }
}

/// Reusable staging vectors, so steady-state rebuilds do not allocate
#[derive(Debug, Default)]
struct Staging {
    positions: Vec<f32>,
    previous: Vec<f32>,
    next: Vec<f32>,
    side: Vec<f32>,
    width: Vec<f32>,
    uv: Vec<f32>,
    counters: Vec<f32>,
    indices: Vec<u32>,
}

impl Staging {
    fn clear(&mut self) {
        self.positions.clear();
        self.previous.clear();
        self.next.clear();
        self.side.clear();
        self.width.clear();
        self.uv.clear();
        self.counters.clear();
        self.indices.clear();
    }
}

/// Builds and incrementally updates a [`RibbonMesh`] from a polyline.
///
/// The builder is the only writer of its mesh. It is not meant to be
/// mutated from several threads at once; wrap it in a lock if it has to be
/// shared.
pub struct RibbonBuilder {
    points: Vec<Point3<f32>>,
    width_fn: Option<WidthFn>,
    mesh: RibbonMesh,
    staging: Staging,
    initialized: bool,
    pub(crate) matrix_world: Matrix4<f32>,
}

impl std::fmt::Debug for RibbonBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RibbonBuilder")
            .field("points", &self.points.len())
            .field("width_fn", &self.width_fn.is_some())
            .field("initialized", &self.initialized)
            .field("vertex_count", &self.mesh.vertex_count())
            .finish()
    }
}

impl RibbonBuilder {
    /// Create a builder with no points. [`advance`](Self::advance) fails
    /// until [`set_points`](Self::set_points) succeeds once.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            width_fn: None,
            mesh: RibbonMesh::new(),
            staging: Staging::default(),
            initialized: false,
            matrix_world: Matrix4::identity(),
        }
    }

    /// Replace the polyline and rebuild every buffer.
    ///
    /// Accepts structured points or a flat coordinate array. Invalid input
    /// fails with [`Error::InvalidInput`] and leaves the current buffers
    /// untouched.
    pub fn set_points(
        &mut self,
        points: impl Into<PointSource>,
        width_fn: Option<WidthFn>,
    ) -> Result<()> {
        let points = points.into().to_points()?;
        self.points = points;
        self.width_fn = width_fn;
        self.rebuild();
        Ok(())
    }

    /// Replace the width function. Invalidates and rebuilds all buffers from
    /// the current points.
    pub fn set_width_fn(&mut self, width_fn: Option<WidthFn>) {
        self.width_fn = width_fn;
        if self.initialized {
            self.rebuild();
        }
    }

    /// World transform used by hit testing
    pub fn set_matrix_world(&mut self, matrix_world: Matrix4<f32>) {
        self.matrix_world = matrix_world;
    }

    #[inline]
    pub fn matrix_world(&self) -> &Matrix4<f32> {
        &self.matrix_world
    }

    /// Current polyline, including points appended by `advance`
    #[inline]
    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    #[inline]
    pub fn mesh(&self) -> &RibbonMesh {
        &self.mesh
    }

    /// Mutable access for the renderer's upload bookkeeping
    #[inline]
    pub fn mesh_mut(&mut self) -> &mut RibbonMesh {
        &mut self.mesh
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Drop the oldest point and append `point`, keeping the ribbon length.
    ///
    /// Shifts the position, previous and next buffers by one point pair in
    /// place; side, width, uv, counters and indices do not depend on the
    /// coordinates and stay as they are. The result matches what
    /// `set_points` would produce for the shifted polyline.
    pub fn advance(&mut self, point: Point3<f32>) -> Result<()> {
        if !self.initialized {
            return Err(Error::Uninitialized);
        }

        let RibbonMesh {
            position,
            previous,
            next,
            ..
        } = &mut self.mesh;

        let positions = position.data_mut();
        let l = positions.len();
        let pair = [point.x, point.y, point.z, point.x, point.y, point.z];

        // Every vertex's new predecessor is its old position
        previous.data_mut().copy_from_slice(positions);

        positions.copy_within(6.., 0);
        positions[l - 6..].copy_from_slice(&pair);

        let next_data = next.data_mut();
        next_data[..l - 6].copy_from_slice(&positions[6..]);
        next_data[l - 6..].copy_from_slice(&pair);

        self.points.rotate_left(1);
        if let Some(last) = self.points.last_mut() {
            *last = point;
        }

        // Re-seed the two boundary entries the shift cannot know about
        let n = self.points.len();
        let closed = is_closed(&self.points);
        let first_previous = if closed { self.points[n - 2] } else { self.points[0] };
        let last_next = if closed { self.points[1] } else { self.points[n - 1] };
        write_pair(&mut previous.data_mut()[..6], &first_previous);
        write_pair(&mut next.data_mut()[l - 6..], &last_next);

        position.mark_dirty();
        previous.mark_dirty();
        next.mark_dirty();

        self.mesh.compute_bounds();

        tracing::trace!(points = n, "Advanced ribbon by one point");
        Ok(())
    }

    /// Regenerate every attribute from `self.points`
    fn rebuild(&mut self) {
        let n = self.points.len();
        let staging = &mut self.staging;
        staging.clear();

        for (i, p) in self.points.iter().enumerate() {
            let c = i as f32 / n as f32;
            staging.positions.extend_from_slice(&[p.x, p.y, p.z, p.x, p.y, p.z]);
            staging.counters.extend_from_slice(&[c, c]);
        }

        let closed = is_closed(&self.points);
        let first_previous = if closed { self.points[n - 2] } else { self.points[0] };
        push_pair(&mut staging.previous, &first_previous);

        let segments = n.saturating_sub(1);
        for (j, p) in self.points.iter().enumerate() {
            staging.side.extend_from_slice(&[1.0, -1.0]);

            let t = if segments == 0 { 0.0 } else { j as f32 / segments as f32 };
            let w = match &self.width_fn {
                Some(width_fn) if segments > 0 => width_fn(t),
                _ => 1.0,
            };
            staging.width.extend_from_slice(&[w, w]);

            staging.uv.extend_from_slice(&[t, 0.0, t, 1.0]);

            if j < segments {
                push_pair(&mut staging.previous, p);

                let base = (j * 2) as u32;
                staging
                    .indices
                    .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
            }
            if j > 0 {
                push_pair(&mut staging.next, p);
            }
        }

        let last_next = if closed { self.points[1] } else { self.points[n - 1] };
        push_pair(&mut staging.next, &last_next);

        let vertex_count = 2 * n;
        let mesh = &mut self.mesh;
        if mesh.vertex_count() != vertex_count {
            tracing::debug!(
                old_vertices = mesh.vertex_count(),
                new_vertices = vertex_count,
                "Reallocating ribbon buffers"
            );
            mesh.position.replace(&staging.positions);
            mesh.previous.replace(&staging.previous);
            mesh.next.replace(&staging.next);
            mesh.side.replace(&staging.side);
            mesh.width.replace(&staging.width);
            mesh.uv.replace(&staging.uv);
            mesh.counters.replace(&staging.counters);
            mesh.index.replace(&staging.indices);
        } else {
            mesh.position.copy_in_place(&staging.positions);
            mesh.previous.copy_in_place(&staging.previous);
            mesh.next.copy_in_place(&staging.next);
            mesh.side.copy_in_place(&staging.side);
            mesh.width.copy_in_place(&staging.width);
            mesh.uv.copy_in_place(&staging.uv);
            mesh.counters.copy_in_place(&staging.counters);
            mesh.index.copy_in_place(&staging.indices);
        }

        mesh.compute_bounds();
        self.initialized = true;

        tracing::debug!(
            points = n,
            vertices = vertex_count,
            triangles = mesh.triangle_count(),
            closed,
            "Rebuilt ribbon"
        );
    }
}

impl Default for RibbonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// First and last point are bit-for-bit equal. Near misses count as open.
#[inline]
fn is_closed(points: &[Point3<f32>]) -> bool {
    match points {
        [first, .., last] if points.len() > 2 => {
            first.x == last.x && first.y == last.y && first.z == last.z
        }
        _ => false,
    }
}

#[inline]
fn push_pair(buffer: &mut Vec<f32>, p: &Point3<f32>) {
    buffer.extend_from_slice(&[p.x, p.y, p.z, p.x, p.y, p.z]);
}

#[inline]
fn write_pair(buffer: &mut [f32], p: &Point3<f32>) {
    buffer.copy_from_slice(&[p.x, p.y, p.z, p.x, p.y, p.z]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(n: usize) -> Vec<Point3<f32>> {
        (0..n).map(|i| Point3::new(i as f32, (i * i) as f32, 0.0)).collect()
    }

    fn pair_at(buffer: &Attribute, pair: usize) -> Point3<f32> {
        let s = &buffer.as_slice()[pair * 6..pair * 6 + 3];
        Point3::new(s[0], s[1], s[2])
    }

    #[test]
    fn test_counts() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(5), None).unwrap();
        let mesh = builder.mesh();
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.index().len(), 24);
        assert_eq!(mesh.previous().len(), mesh.position().len());
        assert_eq!(mesh.next().len(), mesh.position().len());
        assert_eq!(mesh.side().len(), 10);
        assert_eq!(mesh.width().len(), 10);
        assert_eq!(mesh.uv().len(), 20);
        assert_eq!(mesh.counters().len(), 10);
    }

    #[test]
    fn test_index_winding() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(3), None).unwrap();
        assert_eq!(
            builder.mesh().index().as_slice(),
            &[0, 1, 2, 2, 1, 3, 2, 3, 4, 4, 3, 5]
        );
    }

    #[test]
    fn test_side_uv_counters() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(3), None).unwrap();
        let mesh = builder.mesh();
        assert_eq!(mesh.side().as_slice(), &[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        assert_eq!(
            mesh.uv().as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 0.5, 0.0, 0.5, 1.0, 1.0, 0.0, 1.0, 1.0]
        );
        let counters = mesh.counters().as_slice();
        assert_relative_eq!(counters[0], 0.0);
        assert_relative_eq!(counters[2], 1.0 / 3.0);
        assert_relative_eq!(counters[5], 2.0 / 3.0);
    }

    #[test]
    fn test_open_boundaries_clamp() {
        let points = line(4);
        let mut builder = RibbonBuilder::new();
        builder.set_points(points.clone(), None).unwrap();
        let mesh = builder.mesh();
        assert_eq!(pair_at(mesh.previous(), 0), points[0]);
        assert_eq!(pair_at(mesh.previous(), 2), points[1]);
        assert_eq!(pair_at(mesh.next(), 1), points[2]);
        assert_eq!(pair_at(mesh.next(), 3), points[3]);
    }

    #[test]
    fn test_closed_boundaries_wrap() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        let mut builder = RibbonBuilder::new();
        builder.set_points(points.clone(), None).unwrap();
        let mesh = builder.mesh();
        assert_eq!(pair_at(mesh.previous(), 0), points[2]);
        assert_eq!(pair_at(mesh.next(), 3), points[1]);
    }

    #[test]
    fn test_near_closed_is_open() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1e-7, 0.0),
        ];
        let mut builder = RibbonBuilder::new();
        builder.set_points(points.clone(), None).unwrap();
        assert_eq!(pair_at(builder.mesh().previous(), 0), points[0]);
    }

    #[test]
    fn test_width_fn() {
        let mut builder = RibbonBuilder::new();
        builder
            .set_points(line(3), Some(Box::new(|t: f32| 1.0 + t)))
            .unwrap();
        assert_eq!(builder.mesh().width().as_slice(), &[1.0, 1.0, 1.5, 1.5, 2.0, 2.0]);

        builder.set_width_fn(None);
        assert!(builder.mesh().width().as_slice().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_single_point() {
        let mut builder = RibbonBuilder::new();
        builder
            .set_points(vec![Point3::new(2.0, 3.0, 4.0)], Some(Box::new(|_: f32| 7.0)))
            .unwrap();
        let mesh = builder.mesh();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 2);
        assert_eq!(pair_at(mesh.previous(), 0), Point3::new(2.0, 3.0, 4.0));
        assert_eq!(pair_at(mesh.next(), 0), Point3::new(2.0, 3.0, 4.0));
        assert_eq!(mesh.width().as_slice(), &[1.0, 1.0]);
        assert!(mesh.validate_bounds().is_ok());
    }

    #[test]
    fn test_flat_input() {
        let mut builder = RibbonBuilder::new();
        builder
            .set_points(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0], None)
            .unwrap();
        assert_eq!(builder.points().len(), 3);
        assert_eq!(builder.mesh().vertex_count(), 6);
    }

    #[test]
    fn test_invalid_input_keeps_buffers() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(3), None).unwrap();
        let before = builder.mesh().position().as_slice().to_vec();
        let err = builder.set_points(vec![1.0f32, 2.0], None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(builder.mesh().position().as_slice(), before.as_slice());
        assert_eq!(builder.points().len(), 3);
    }

    #[test]
    fn test_same_size_rebuild_reuses_buffers() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(4), None).unwrap();
        let ptr = builder.mesh().position().as_slice().as_ptr();
        builder.mesh_mut().mark_uploaded();

        let moved: Vec<_> = line(4).iter().map(|p| p + nalgebra::Vector3::z()).collect();
        builder.set_points(moved, None).unwrap();
        assert_eq!(builder.mesh().position().as_slice().as_ptr(), ptr);
        assert!(builder.mesh().position().needs_update());
        assert_relative_eq!(builder.mesh().position().as_slice()[2], 1.0);
    }

    #[test]
    fn test_advance_requires_points() {
        let mut builder = RibbonBuilder::new();
        assert!(matches!(
            builder.advance(Point3::origin()),
            Err(Error::Uninitialized)
        ));
    }

    #[test]
    fn test_advance_matches_rebuild() {
        let points = line(5);
        let newest = Point3::new(9.0, -2.0, 3.0);

        let mut advanced = RibbonBuilder::new();
        advanced.set_points(points.clone(), None).unwrap();
        advanced.advance(newest).unwrap();

        let mut shifted: Vec<_> = points[1..].to_vec();
        shifted.push(newest);
        let mut rebuilt = RibbonBuilder::new();
        rebuilt.set_points(shifted.clone(), None).unwrap();

        assert_eq!(advanced.points(), shifted.as_slice());
        for (a, b) in advanced.mesh().attributes().iter().zip(rebuilt.mesh().attributes()) {
            assert_eq!(a.as_slice(), b.as_slice(), "attribute {}", a.name());
        }
        assert_eq!(advanced.mesh().index().as_slice(), rebuilt.mesh().index().as_slice());
        assert_eq!(advanced.mesh().bounding_box(), rebuilt.mesh().bounding_box());
    }

    #[test]
    fn test_nan_points_report_degenerate_bounds() {
        let mut builder = RibbonBuilder::new();
        builder
            .set_points(
                vec![Point3::new(0.0, f32::NAN, 0.0), Point3::new(1.0, f32::NAN, 0.0)],
                None,
            )
            .unwrap();
        assert!(builder.mesh().bounding_sphere().radius.is_nan());
        assert!(matches!(
            builder.mesh().validate_bounds(),
            Err(Error::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_advance_into_and_out_of_closed_loop() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(1.0, 1.0, 0.0);
        let d = Point3::new(0.0, 1.0, 0.0);
        let e = Point3::new(2.0, 2.0, 0.0);

        let mut advanced = RibbonBuilder::new();
        advanced.set_points(vec![a, b, c, d], None).unwrap();

        // [b, c, d, b] closes the loop
        advanced.advance(b).unwrap();
        let mut closed = RibbonBuilder::new();
        closed.set_points(vec![b, c, d, b], None).unwrap();
        assert_eq!(pair_at(advanced.mesh().previous(), 0), d);
        assert_eq!(pair_at(advanced.mesh().next(), 3), c);
        for (x, y) in advanced.mesh().attributes().iter().zip(closed.mesh().attributes()) {
            assert_eq!(x.as_slice(), y.as_slice(), "closed attribute {}", x.name());
        }

        // [c, d, b, e] is open again
        advanced.advance(e).unwrap();
        let mut open = RibbonBuilder::new();
        open.set_points(vec![c, d, b, e], None).unwrap();
        assert_eq!(pair_at(advanced.mesh().previous(), 0), c);
        assert_eq!(pair_at(advanced.mesh().next(), 3), e);
        for (x, y) in advanced.mesh().attributes().iter().zip(open.mesh().attributes()) {
            assert_eq!(x.as_slice(), y.as_slice(), "open attribute {}", x.name());
        }
    }

    #[test]
    fn test_advance_marks_dirty() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(line(3), None).unwrap();
        builder.mesh_mut().mark_uploaded();
        builder.advance(Point3::new(5.0, 5.0, 5.0)).unwrap();
        let mesh = builder.mesh();
        assert!(mesh.position().needs_update());
        assert!(mesh.previous().needs_update());
        assert!(mesh.next().needs_update());
        assert!(!mesh.side().needs_update());
        assert!(!mesh.index().needs_update());
    }

    #[test]
    fn test_advance_single_point() {
        let mut builder = RibbonBuilder::new();
        builder.set_points(vec![Point3::origin()], None).unwrap();
        let p = Point3::new(1.0, 2.0, 3.0);
        builder.advance(p).unwrap();
        let mesh = builder.mesh();
        assert_eq!(pair_at(mesh.position(), 0), p);
        assert_eq!(pair_at(mesh.previous(), 0), p);
        assert_eq!(pair_at(mesh.next(), 0), p);
    }
}

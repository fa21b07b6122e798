// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON report types

use meshline_geometry::{
    Attribute, BoundingBox, BoundingSphere, RibbonBuilder, RibbonHit, TextGeometry,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AttributeStats {
    pub name: &'static str,
    pub item_size: usize,
    pub count: usize,
}

impl From<&Attribute> for AttributeStats {
    fn from(attr: &Attribute) -> Self {
        Self {
            name: attr.name(),
            item_size: attr.item_size(),
            count: attr.count(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Bounds {
    /// `None` when the box is empty
    pub min: Option<[f32; 3]>,
    pub max: Option<[f32; 3]>,
    pub center: [f32; 3],
    pub radius: f32,
}

impl Bounds {
    pub fn new(bbox: &BoundingBox, sphere: &BoundingSphere) -> Self {
        let (min, max) = if bbox.is_empty() {
            (None, None)
        } else {
            (
                Some([bbox.min.x, bbox.min.y, bbox.min.z]),
                Some([bbox.max.x, bbox.max.y, bbox.max.z]),
            )
        };
        Self {
            min,
            max,
            center: [sphere.center.x, sphere.center.y, sphere.center.z],
            radius: sphere.radius,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HitReport {
    pub distance: f32,
    pub point: [f32; 3],
    pub index: usize,
}

impl From<RibbonHit> for HitReport {
    fn from(hit: RibbonHit) -> Self {
        Self {
            distance: hit.distance,
            point: [hit.point.x, hit.point.y, hit.point.z],
            index: hit.index,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RibbonReport {
    pub points: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub attributes: Vec<AttributeStats>,
    pub indices: usize,
    pub bounds: Bounds,
    pub degenerate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<HitReport>,
}

impl RibbonReport {
    pub fn new(builder: &RibbonBuilder, hit: Option<RibbonHit>) -> Self {
        let mesh = builder.mesh();
        Self {
            points: builder.points().len(),
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
            attributes: mesh.attributes().into_iter().map(AttributeStats::from).collect(),
            indices: mesh.index().len(),
            bounds: Bounds::new(mesh.bounding_box(), mesh.bounding_sphere()),
            degenerate: mesh.validate_bounds().is_err(),
            hit: hit.map(HitReport::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TextReport {
    pub chars: usize,
    pub glyphs: usize,
    pub quads: usize,
    pub lines: usize,
    pub width: f32,
    pub height: f32,
    pub ascender: f32,
    pub descender: f32,
    pub baseline: f32,
    pub line_height: f32,
    pub x_height: f32,
    pub cap_height: f32,
    pub attributes: Vec<AttributeStats>,
    pub indices: usize,
    pub bounds: Bounds,
    pub degenerate: bool,
}

impl TextReport {
    pub fn new(geometry: &TextGeometry) -> Self {
        let layout = geometry.layout();
        let mut attributes = vec![
            AttributeStats::from(geometry.position()),
            AttributeStats::from(geometry.uv()),
        ];
        attributes.extend(geometry.page().map(AttributeStats::from));

        Self {
            chars: geometry.text().chars().count(),
            glyphs: layout.glyphs.len(),
            quads: geometry.quad_count(),
            lines: layout.lines_total,
            width: layout.width,
            height: layout.height,
            ascender: layout.ascender,
            descender: layout.descender,
            baseline: layout.baseline,
            line_height: layout.line_height,
            x_height: layout.x_height,
            cap_height: layout.cap_height,
            attributes,
            indices: geometry.index().len(),
            bounds: Bounds::new(geometry.bounding_box(), geometry.bounding_sphere()),
            degenerate: geometry.validate_bounds().is_err(),
        }
    }
}

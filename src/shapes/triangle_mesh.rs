// Copyright @yucwang 2023

use super::triangle::Triangle;

use crate::core::bvh::{SplitMethod, BVH};
use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{SurfaceIntersection, SurfaceSampleRecord};
use crate::core::shape::Shape;
use crate::math::aabb::AABB;
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;
use crate::math::warp::square_to_triangle;

use std::fmt;
use std::vec::Vec;

#[derive(Debug, PartialEq)]
pub enum MeshError {
    Empty,
    IndexOutOfRange { triangle: usize, index: usize, vertex_count: usize },
    Degenerate,
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::Empty => write!(f, "mesh has no triangles"),
            MeshError::IndexOutOfRange { triangle, index, vertex_count } => write!(
                f,
                "triangle {} references vertex {} but the mesh has {} vertices",
                triangle, index, vertex_count
            ),
            MeshError::Degenerate => write!(f, "mesh has zero surface area"),
        }
    }
}

impl std::error::Error for MeshError {}

pub struct TriangleMesh {
    vertices: Vec<Vector3f>,
    triangles: Vec<Triangle>,
    tri_areas: Vec<Float>,
    total_area: Float,
    bounds: AABB,
    bvh: BVH,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Vector3f>, indices: &[[usize; 3]]) -> Result<Self, MeshError> {
        if indices.is_empty() {
            return Err(MeshError::Empty);
        }

        let mut triangles = Vec::with_capacity(indices.len());
        let mut tri_areas = Vec::with_capacity(indices.len());
        let mut total_area = 0.0;
        for (tri_idx, face) in indices.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i >= vertices.len()) {
                return Err(MeshError::IndexOutOfRange {
                    triangle: tri_idx,
                    index: bad,
                    vertex_count: vertices.len(),
                });
            }
            let tri = Triangle::new(vertices[face[0]], vertices[face[1]], vertices[face[2]]);
            let area = tri.surface_area();
            total_area += area;
            tri_areas.push(area);
            triangles.push(tri);
        }

        if total_area <= 0.0 {
            return Err(MeshError::Degenerate);
        }

        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        let mut bounds = AABB::default();
        for b in &prim_bounds {
            bounds.expand_by_aabb(b);
        }
        let bvh = BVH::from_bounds(prim_bounds, SplitMethod::Sah);

        Ok(Self { vertices, triangles, tri_areas, total_area, bounds, bvh })
    }

    /// Two triangles `(a, b, c)` and `(a, c, d)` for a planar quad.
    pub fn from_quad(corners: [Vector3f; 4]) -> Result<Self, MeshError> {
        Self::new(corners.to_vec(), &[[0, 1, 2], [0, 2, 3]])
    }

    pub fn vertices(&self) -> &[Vector3f] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn pick_triangle(&self, u: Float) -> (usize, Float) {
        let target = u * self.total_area;
        let mut accum = 0.0;
        for (i, area) in self.tri_areas.iter().enumerate() {
            if *area <= 0.0 {
                continue;
            }
            if target < accum + *area {
                let local = ((target - accum) / *area).min(0.999_999);
                return (i, local.max(0.0));
            }
            accum += *area;
        }

        // Rounding can push `target` past the final sum.
        let last = self.tri_areas.iter().rposition(|a| *a > 0.0).unwrap_or(0);
        (last, 0.999_999)
    }
}

impl ComputationNode for TriangleMesh {
    fn to_string(&self) -> String {
        format!("TriangleMesh: {{ vertices: {}, triangles: {}, area: {} }}",
                self.vertices.len(), self.triangles.len(), self.total_area)
    }
}

impl Shape for TriangleMesh {
    fn bounding_box(&self) -> AABB {
        self.bounds
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<SurfaceIntersection> {
        let (_, hit) = self.bvh.ray_intersection(ray, |prim_idx, ray| {
            self.triangles[prim_idx].ray_intersection(ray).map(|h| {
                let t = h.t();
                (h, t)
            })
        })?;
        Some(hit)
    }

    fn sample(&self, u: &Vector2f) -> SurfaceSampleRecord {
        let (idx, local_u) = self.pick_triangle(u.x);
        let tri = &self.triangles[idx];

        let bary = square_to_triangle(&Vector2f::new(local_u, u.y));
        let (p0, p1, p2) = tri.vertices();
        let p = p0 * bary.x + p1 * bary.y + p2 * bary.z;

        let intersection = SurfaceIntersection::new(p, tri.geometric_normal(), bary.yz(), 0.0);
        SurfaceSampleRecord::new(intersection, 1.0 / self.total_area)
    }

    fn surface_area(&self) -> Float {
        self.total_area
    }
}

use glam::{Mat4, Vec3, Vec4};
use strata_core::math::Aabb;
use strata_mesh::Lod;

/// A plane `normal . p + distance = 0`; the positive side is inside.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    fn from_row(row: Vec4) -> Self {
        let normal = row.truncate();
        let len = normal.length();
        Self {
            normal: normal / len,
            distance: row.w / len,
        }
    }
}

/// View frustum with 6 planes (near, far, left, right, top, bottom).
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix with 0..1 clip depth.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row = |i: usize| vp.row(i);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        Self {
            planes: [
                Plane::from_row(r2),
                Plane::from_row(r3 - r2),
                Plane::from_row(r3 + r0),
                Plane::from_row(r3 - r0),
                Plane::from_row(r3 - r1),
                Plane::from_row(r3 + r1),
            ],
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.distance_to_point(point) >= 0.0)
    }

    /// Conservative box test: false only if the box is fully outside a plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            // Corner furthest along the plane normal.
            let p = Vec3::select(plane.normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            plane.distance_to_point(p) >= 0.0
        })
    }
}

/// Perspective camera as seen by the LOD coordinator.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub view: Mat4,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn look_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            view: Mat4::look_at_rh(eye, target, Vec3::Y),
            fov_y,
            aspect,
            near,
            far,
        }
    }

    /// Frustum of this camera clipped to view depths `near..far`.
    pub fn band(&self, near: f32, far: f32) -> Option<Frustum> {
        let near = near.max(self.near);
        let far = far.min(self.far);
        if near <= 0.0 || far <= near {
            return None;
        }
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, near, far);
        Some(Frustum::from_view_projection(&(proj * self.view)))
    }
}

/// Distance thresholds that split the view into three LOD bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodBands {
    pub lod1_distance: f32,
    pub lod2_distance: f32,
}

/// The three band frustums for one scheduling tick.
#[derive(Debug, Clone, Copy)]
pub struct BandFrustums {
    bands: [Option<Frustum>; 3],
}

impl LodBands {
    pub fn new(lod1_distance: f32, lod2_distance: f32) -> Self {
        Self {
            lod1_distance,
            lod2_distance,
        }
    }

    pub fn frustums(&self, camera: &Camera) -> BandFrustums {
        BandFrustums {
            bands: [
                camera.band(camera.near, self.lod1_distance),
                camera.band(self.lod1_distance, self.lod2_distance),
                camera.band(self.lod2_distance, camera.far),
            ],
        }
    }
}

impl BandFrustums {
    /// LOD for a box, or `None` when it lies outside every band.
    pub fn classify(&self, bounds: &Aabb) -> Option<Lod> {
        self.bands
            .iter()
            .zip(Lod::ALL)
            .find(|(band, _)| band.is_some_and(|f| f.intersects_aabb(bounds)))
            .map(|(_, lod)| lod)
    }
}

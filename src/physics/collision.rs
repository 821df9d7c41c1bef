//! Track collision geometry and quad push-out response.
//!
//! Collision surfaces arrive pre-parsed from the host's mesh loader as flat
//! lists of planar quads with outward normals. The response model is sliding:
//! a penetrating body is snapped back onto the (radius-offset) contact plane
//! and loses its velocity component along the normal, it never bounces.

use glam::{Mat4, Vec3};

/// Contacts farther than this past the offset plane are treated as
/// tunneling artifacts or far misses and ignored.
pub const MAX_PENETRATION: f32 = 1.0;

/// Outward nudge applied after a snap so the body does not re-penetrate
/// the same plane on the next tick.
pub const PUSH_OUT_EPSILON: f32 = 1e-3;

/// One planar collision quad in world space.
///
/// Corners are ordered so that `vertices[1] - vertices[0]` and
/// `vertices[3] - vertices[0]` span the surface; `normal` points out of the
/// track. Corners are not coplanarity-checked. Degenerate (zero-length)
/// edges are a caller contract violation and will propagate NaNs.
#[derive(Debug, Clone, Copy)]
pub struct CollisionQuad {
    pub vertices: [Vec3; 4],
    pub normal: Vec3,
}

impl CollisionQuad {
    /// Length of the edge from corner 0 to corner 1.
    pub fn width(&self) -> f32 {
        (self.vertices[1] - self.vertices[0]).length()
    }

    /// Length of the edge from corner 0 to corner 3.
    pub fn height(&self) -> f32 {
        (self.vertices[3] - self.vertices[0]).length()
    }

    /// Local frame of this quad for a body of the given radius: origin at
    /// corner 0 pushed out along the normal, axes edge01 / normal / edge03.
    fn basis(&self, radius: f32) -> Mat4 {
        let origin = self.vertices[0] + self.normal * radius;
        let right = (self.vertices[1] - self.vertices[0]).normalize();
        let front = (self.vertices[3] - self.vertices[0]).normalize();
        Mat4::from_cols(
            right.extend(0.0),
            self.normal.extend(0.0),
            front.extend(0.0),
            origin.extend(1.0),
        )
    }
}

/// One collision surface: all quads of a single track wall or floor.
#[derive(Debug, Clone, Default)]
pub struct CollisionData {
    pub quads: Vec<CollisionQuad>,
}

impl CollisionData {
    pub fn new(quads: Vec<CollisionQuad>) -> Self {
        Self { quads }
    }
}

/// Result of a resolved contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Tests a body against a single quad, returning the corrected position and
/// velocity on contact.
///
/// In the quad's local frame the Y coordinate of the body is its signed
/// distance to the radius-offset plane. A candidate contact needs local
/// Y <= 0 with |Y| inside the tunneling guard; it is accepted when local X
/// falls within the quad's width. Local Z is deliberately not checked, so
/// each quad is unbounded along its edge03 axis.
pub fn resolve_quad(quad: &CollisionQuad, position: Vec3, velocity: Vec3, radius: f32) -> Option<Contact> {
    let basis = quad.basis(radius);
    let local = basis.inverse().transform_point3(position);

    if local.y > 0.0 {
        return None;
    }
    let penetration = local.y.abs();
    if penetration > MAX_PENETRATION {
        return None;
    }

    // Project the body onto the offset plane.
    let contact_local = local + Vec3::Y * penetration;
    if contact_local.x < 0.0 || contact_local.x > quad.width() {
        return None;
    }

    let contact_world = basis.transform_point3(contact_local);
    Some(Contact {
        position: contact_world + quad.normal * PUSH_OUT_EPSILON,
        velocity: velocity - quad.normal * velocity.dot(quad.normal),
    })
}

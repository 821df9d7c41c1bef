//! Ship flight model and track collision.
//!
//! Single-threaded by design: the flight body is advanced exactly once per
//! frame from the main loop (input → physics → render), there is no internal
//! locking and no reentrancy.

pub mod collision;
pub mod flight;

#[cfg(test)]
mod tests;

use bevy_ecs::prelude::*;

pub use collision::{resolve_quad, CollisionData, CollisionQuad, Contact};
pub use flight::FlightBody;

use crate::core::SimTime;
use crate::input::ControlSnapshot;

// --- Resources ---

/// All collision surfaces of the loaded track (outer wall, inner wall, ...).
#[derive(Resource, Debug, Clone, Default)]
pub struct TrackCollision {
    pub surfaces: Vec<CollisionData>,
}

// --- Systems ---

/// Advances every flight body by the frame delta against the track surfaces.
pub fn ship_flight_system(
    time: Res<SimTime>,
    controls: Res<ControlSnapshot>,
    track: Res<TrackCollision>,
    mut bodies: Query<&mut FlightBody>,
) {
    let surfaces: Vec<&CollisionData> = track.surfaces.iter().collect();
    for mut body in bodies.iter_mut() {
        body.update(&controls, time.delta_seconds, &surfaces);
    }
}

//! # Starflight
//!
//! Real-time simulation core for a space-track flying game, built with Rust.
//!
//! ## Features
//!
//! - **Flight Model**: Rigid-body ship integration with coupled yaw/roll banking
//! - **Collision Response**: Sliding push-out against arbitrary planar track quads
//! - **GPU Particles**: Thruster exhaust simulated entirely on the GPU through a
//!   ping-pong buffer protocol with indirect draws (wgpu backend)
//! - **ECS Integration**: Components and systems built on `bevy_ecs`
//! - **Configuration**: TOML-backed tunables for flight and particle behavior
//!
//! ## Architecture Design
//!
//! The crate is the simulation core only. Window creation, swapchain setup,
//! shader management, scene traversal and asset loading belong to the host
//! renderer; this crate consumes `wgpu` device/queue/encoder handles and an
//! input snapshot, and exposes the ship pose plus a side-effecting particle
//! draw.
//!
//! ### Example
//!
//! ```ignore
//! use starflight::physics::{FlightBody, CollisionData};
//! use starflight::input::ControlSnapshot;
//!
//! let mut ship = FlightBody::new(glam::Vec3::ZERO, 1.0, 0.1);
//! let controls = ControlSnapshot { forward: true, ..Default::default() };
//! ship.update(&controls, 1.0 / 60.0, &[&track_walls]);
//! renderer.place_ship(ship.position(), ship.orientation());
//! ```

/// Core functionality: error types, shared resources and helper macros
pub mod core;
/// Configuration system
pub mod config;
/// Logical control snapshot consumed by the flight model
pub mod input;
/// Ship flight model and track collision response
pub mod physics;
/// GPU-resident particle simulation
pub mod render;

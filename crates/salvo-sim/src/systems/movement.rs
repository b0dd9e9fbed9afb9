//! Reference motion integrator.
//!
//! Munitions: rotate by the commanded rate (clamped to the airframe limit),
//! then accelerate along the nose by the commanded thrust fraction.
//! Targets: straight-line motion. Hosts with their own physics skip this.

use hecs::World;

use salvo_core::components::{ControllerState, Munition, Target};
use salvo_core::types::{wrap_angle, KinematicState, Vec2};

/// Integrate every munition and target by `dt` seconds.
pub fn run(world: &mut World, dt: f64) {
    for (_entity, (munition, controller)) in world.query_mut::<(&mut Munition, &ControllerState)>() {
        let command = controller.last_command;
        integrate(&mut munition.state, command.rotation_rate, command.thrust_fraction, dt);
    }

    for (_entity, target) in world.query_mut::<&mut Target>() {
        target.state.position += target.state.velocity * dt;
    }
}

/// Semi-implicit Euler step for a forward-only thruster.
pub fn integrate(state: &mut KinematicState, rotation_rate: f64, thrust_fraction: f64, dt: f64) {
    let max_rate = state.max_rotation_rate.max(0.0);
    let rate = rotation_rate.clamp(-max_rate, max_rate);
    state.heading = wrap_angle(state.heading + rate * dt);

    let thrust = thrust_fraction.clamp(0.0, 1.0) * state.max_acceleration.max(0.0);
    let accel: Vec2 = state.heading_vector() * thrust;
    state.velocity += accel * dt;
    state.position += state.velocity * dt;
}

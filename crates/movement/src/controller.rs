use glam::Vec3;

use crate::config::MovementConfig;
use crate::input::MoveInput;
use crate::state::MovementState;

/// World-space movement intent derived from one tick's [`MoveInput`].
struct Intent {
    world_direction: Vec3,
    is_active: bool,
    wants_jump: bool,
    jump_just_pressed: bool,
    is_crouching: bool,
}

struct MovementParams {
    acceleration: f32,
    deceleration: f32,
    max_speed: f32,
}

/// Pure velocity math, ported from `player/controller.rs`'s
/// `PlayerController`. Stripped of the physics/entity plumbing that lives
/// in [`crate::MovementSimulator`] instead, so this only ever touches
/// `(velocity, input, grounded, state) -> velocity`.
pub fn compute_velocity(
    config: &MovementConfig,
    current: Vec3,
    input: &MoveInput,
    grounded: bool,
    state: &mut MovementState,
    dt: f32,
) -> Vec3 {
    let intent = parse_intent(input, state);
    state.crouch_amount = if intent.is_crouching { 1.0 } else { 0.0 };
    tick_strafe_ground_time(config, state, grounded, dt);

    let mut velocity = current;

    if !grounded {
        velocity = apply_gravity(config, velocity, intent.wants_jump, dt);
    }

    if intent.jump_just_pressed && grounded {
        velocity.y = config.jump_power;
    }

    let horizontal = compute_horizontal_velocity(
        config,
        Vec3::new(velocity.x, 0.0, velocity.z),
        &intent,
        grounded,
        state,
        dt,
    );

    tick_stun(config, state, grounded, dt);
    state.jump_held = intent.wants_jump;
    state.grounded = grounded;

    Vec3::new(horizontal.x, velocity.y, horizontal.z)
}

fn parse_intent(input: &MoveInput, state: &MovementState) -> Intent {
    let local = Vec3::new(input.forward, 0.0, input.strafe);
    let world_direction = local_to_world_direction(local, input.yaw);
    let wants_jump = input.wants_jump();

    Intent {
        world_direction,
        is_active: world_direction.length_squared() > 0.001,
        wants_jump,
        jump_just_pressed: wants_jump && !state.jump_held,
        is_crouching: input.wants_crouch(),
    }
}

fn local_to_world_direction(local: Vec3, yaw: f32) -> Vec3 {
    if local.length_squared() < 0.001 {
        return Vec3::ZERO;
    }

    let normalized = local.normalize();
    let (sin_yaw, cos_yaw) = yaw.sin_cos();

    Vec3::new(
        normalized.x * cos_yaw + normalized.z * sin_yaw,
        0.0,
        -normalized.x * sin_yaw + normalized.z * cos_yaw,
    )
}

fn apply_gravity(config: &MovementConfig, mut velocity: Vec3, jump_held: bool, dt: f32) -> Vec3 {
    let gravity_acc = gravity_acceleration(config, velocity.y, jump_held);
    velocity.y = (velocity.y - gravity_acc * dt).max(-config.max_fall_speed);
    velocity
}

fn gravity_acceleration(config: &MovementConfig, vertical_velocity: f32, jump_held: bool) -> f32 {
    if jump_held && vertical_velocity > 0.0 && vertical_velocity < config.jump_power {
        return config.gravity_jump_hold;
    }

    let fall_blend = ((vertical_velocity.abs() - config.gravity_fall_vel_start)
        / config.gravity_fall_vel_span)
        .clamp(0.0, 1.0);

    lerp(config.gravity_fall, config.gravity, fall_blend)
}

fn compute_horizontal_velocity(
    config: &MovementConfig,
    initial: Vec3,
    intent: &Intent,
    grounded: bool,
    state: &MovementState,
    dt: f32,
) -> Vec3 {
    let params = movement_params(config, grounded, initial.length(), state.crouch_amount);
    let target = target_velocity(initial, intent, &params, state, dt);
    let strafed = apply_strafe(config, initial, intent.world_direction, target, grounded, state, dt);
    apply_deceleration(config, intent, grounded, &params, state, strafed, target, dt)
}

fn movement_params(
    config: &MovementConfig,
    grounded: bool,
    current_speed: f32,
    crouch: f32,
) -> MovementParams {
    let crouch = crouch.clamp(0.0, 1.0);

    let (acceleration, mut deceleration, max_speed) = if grounded {
        (
            lerp(config.accelerate_ground, config.accelerate_crouch_ground, crouch),
            lerp(config.decelerate_ground, config.decelerate_crouch_ground, crouch),
            lerp(config.move_speed_ground, config.move_speed_crouch_ground, crouch),
        )
    } else {
        (
            lerp(config.accelerate_air, config.accelerate_crouch_air, crouch),
            lerp(config.decelerate_air, config.decelerate_crouch_air, crouch),
            lerp(config.move_speed_air, config.move_speed_crouch_air, crouch),
        )
    };

    if grounded {
        let slow_decel = lerp(
            config.decelerate_ground_slow,
            config.decelerate_crouch_ground_slow,
            crouch,
        );
        let speed_blend = ((current_speed - config.decelerate_slow_start)
            / config.decelerate_slow_span)
            .clamp(0.0, 1.0);
        deceleration = lerp(slow_decel, deceleration, speed_blend);
    }

    MovementParams {
        acceleration,
        deceleration,
        max_speed,
    }
}

fn target_velocity(
    initial: Vec3,
    intent: &Intent,
    params: &MovementParams,
    state: &MovementState,
    dt: f32,
) -> Vec3 {
    if intent.is_active && !state.is_stunned() {
        let blend = (params.acceleration * dt).min(1.0);
        initial.lerp(intent.world_direction * params.max_speed, blend)
    } else {
        initial
    }
}

fn apply_strafe(
    config: &MovementConfig,
    initial: Vec3,
    move_dir: Vec3,
    target: Vec3,
    grounded: bool,
    state: &MovementState,
    dt: f32,
) -> Vec3 {
    let air_strafed = apply_air_strafe(config, initial, move_dir, target, dt);

    if grounded {
        blend_ground_strafe(config, air_strafed, target, state)
    } else {
        air_strafed
    }
}

fn apply_air_strafe(config: &MovementConfig, initial: Vec3, move_dir: Vec3, target: Vec3, dt: f32) -> Vec3 {
    if move_dir.length_squared() < 0.001 {
        return target;
    }

    let initial_speed = initial.length();
    if initial_speed < 0.001 {
        let result = initial + move_dir * config.strafe_air_acceleration * dt;
        return if result.length() < target.length() { target } else { result };
    }

    let strafe_accel = config.strafe_air_acceleration * dt;
    let strafe_limit = config.strafe_air_limit * dt;
    let strafe_velocity = move_dir * strafe_accel;

    let angle = initial.angle_between(strafe_velocity);
    let projected_speed = initial_speed * angle.cos();

    let result = if projected_speed < strafe_limit - strafe_accel {
        initial + strafe_velocity
    } else if projected_speed < strafe_limit {
        let allowed = strafe_limit - projected_speed;
        initial + strafe_velocity.normalize_or_zero() * allowed
    } else {
        initial
    };

    if result.length() < target.length() { target } else { result }
}

fn blend_ground_strafe(
    config: &MovementConfig,
    velocity: Vec3,
    target: Vec3,
    state: &MovementState,
) -> Vec3 {
    if velocity.length() <= target.length() {
        return velocity;
    }

    let blend = ((state.strafe_ground_time - config.strafe_ground_time_start)
        / config.strafe_ground_time_span)
        .clamp(0.0, 1.0);

    velocity.lerp(target, blend)
}

fn apply_deceleration(
    config: &MovementConfig,
    intent: &Intent,
    grounded: bool,
    params: &MovementParams,
    state: &MovementState,
    velocity: Vec3,
    target: Vec3,
    dt: f32,
) -> Vec3 {
    let grace = (
        config.strafe_ground_time_space_hold,
        config.strafe_ground_time_no_input,
    );
    let should_decelerate =
        !should_preserve_momentum(grace, intent, grounded, velocity.length(), target.length(), state)
            || state.is_stunned();

    if !should_decelerate {
        return velocity;
    }

    let speed = velocity.length();
    if speed < 0.0001 {
        return velocity;
    }

    let decel_amount = (params.deceleration * dt).min(speed);
    velocity - velocity.normalize() * decel_amount
}

fn should_preserve_momentum(
    config_grace: (f32, f32),
    intent: &Intent,
    grounded: bool,
    current_speed: f32,
    target_speed: f32,
    state: &MovementState,
) -> bool {
    if intent.is_active {
        return true;
    }

    if !grounded {
        return false;
    }

    if current_speed <= target_speed {
        let (space_hold, no_input) = config_grace;
        let grace_period = if intent.wants_jump { space_hold } else { no_input };
        return state.strafe_ground_time < grace_period;
    }

    false
}

fn tick_strafe_ground_time(config: &MovementConfig, state: &mut MovementState, grounded: bool, dt: f32) {
    if grounded {
        state.strafe_ground_time = (state.strafe_ground_time + dt).min(config.strafe_ground_time_max);
    } else {
        state.strafe_ground_time = 0.0;
    }
}

fn tick_stun(config: &MovementConfig, state: &mut MovementState, grounded: bool, dt: f32) {
    let decay_rate = if grounded {
        config.stunned_delta_ground_factor
    } else {
        1.0
    };
    state.stunned_duration = (state.stunned_duration - dt * decay_rate).max(0.0);
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_grounded_no_input_stays_at_rest() {
        let config = MovementConfig::default();
        let mut state = MovementState::default();
        let input = MoveInput::default();

        let v = compute_velocity(&config, Vec3::ZERO, &input, true, &mut state, 1.0 / 30.0);
        assert_eq!(v, Vec3::ZERO);
    }

    #[test]
    fn jump_sets_vertical_velocity_when_grounded() {
        let config = MovementConfig::default();
        let mut state = MovementState::default();
        let input = MoveInput {
            flags: crate::input::MoveFlags::JUMP,
            ..Default::default()
        };

        let v = compute_velocity(&config, Vec3::ZERO, &input, true, &mut state, 1.0 / 30.0);
        assert_eq!(v.y, config.jump_power);
    }

    #[test]
    fn forward_input_accelerates_toward_move_speed() {
        let config = MovementConfig::default();
        let mut state = MovementState::default();
        let input = MoveInput {
            forward: 1.0,
            ..Default::default()
        };

        let mut velocity = Vec3::ZERO;
        for _ in 0..120 {
            velocity = compute_velocity(&config, velocity, &input, true, &mut state, 1.0 / 30.0);
        }

        assert!((velocity.length() - config.move_speed_ground).abs() < 0.5);
    }
}

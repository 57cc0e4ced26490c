//! Arena geometry: distances, bearings and random placement.
//!
//! Angles are in degrees. Bearings from [`angle_between`] lie in
//! `[-180, 180)`; headings stored on entities are wrapped to `[0, 360)`.

use crate::components::Position;
use crate::rng::SimRng;

pub const ARENA_WIDTH: f32 = 256.0;
pub const ARENA_HEIGHT: f32 = 256.0;
pub const ARENA_RADIUS: f32 = 128.0;
pub const ARENA_CENTER: Position = Position { x: 128.0, y: 128.0 };

/// Two entities interact when their centers are within one sprite width.
pub const SPRITE_WIDTH: f32 = 8.0;
pub const CONTACT_RADIUS: f32 = SPRITE_WIDTH;
/// Movement is refused at or within this distance of a blocking entity.
pub const BLOCKING_RADIUS: f32 = SPRITE_WIDTH / 2.0;

pub fn distance(a: Position, b: Position) -> f32 {
    a.distance_to(&b)
}

pub fn distance_from_center(p: Position) -> f32 {
    distance(p, ARENA_CENTER)
}

/// Bearing from `from` to `to` in `[-180, 180)`. Coincident points yield 0.
pub fn angle_between(from: Position, to: Position) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let deg = dy.atan2(dx).to_degrees();
    if deg >= 180.0 {
        deg - 360.0
    } else {
        deg
    }
}

/// Wraps any angle into `[0, 360)`.
pub fn wrap_degrees(deg: f32) -> f32 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn position_in_direction(from: Position, degrees: f32, dist: f32) -> Position {
    let rad = degrees.to_radians();
    Position::new(from.x + dist * rad.cos(), from.y + dist * rad.sin())
}

/// Point at `radius` from the arena center along `degrees`.
pub fn point_on_circle(degrees: f32, radius: f32) -> Position {
    position_in_direction(ARENA_CENTER, degrees, radius)
}

/// Moves `p` around the arena center by `delta` degrees, landing on the rim.
pub fn orbit_on_rim(p: Position, delta: f32) -> Position {
    let angle = angle_between(ARENA_CENTER, p);
    point_on_circle(angle + delta, ARENA_RADIUS)
}

/// Rejection-samples a point in the arena square no farther than
/// `max_radius` from center.
pub fn random_point_near_center(rng: &mut SimRng, max_radius: f32, max_attempts: u32) -> Option<Position> {
    random_point_in_ring(rng, 0.0, max_radius, max_attempts)
}

/// Rejection-samples a point whose distance from center lies in
/// `[min_radius, max_radius]`.
pub fn random_point_in_ring(
    rng: &mut SimRng,
    min_radius: f32,
    max_radius: f32,
    max_attempts: u32,
) -> Option<Position> {
    if max_radius < min_radius || max_radius < 0.0 {
        return None;
    }
    let lo_x = (ARENA_CENTER.x - max_radius).max(0.0);
    let hi_x = (ARENA_CENTER.x + max_radius).min(ARENA_WIDTH);
    let lo_y = (ARENA_CENTER.y - max_radius).max(0.0);
    let hi_y = (ARENA_CENTER.y + max_radius).min(ARENA_HEIGHT);

    for _ in 0..max_attempts {
        let candidate = Position::new(rng.uniform(lo_x, hi_x), rng.uniform(lo_y, hi_y));
        let d = distance_from_center(candidate);
        if d >= min_radius && d <= max_radius {
            return Some(candidate);
        }
    }
    None
}

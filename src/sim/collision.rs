//! Collision detection and response for drawn platforms
//!
//! The actor is a circle, platforms are hand-drawn line segments. Contact is
//! the distance from the circle's centre to the closest point of the segment.
//! Only contacts the landing rule accepts (by default: moving down into the
//! platform) are resolved as landings. Contact from below or from the side is
//! not resolved, so the actor can pass up through platforms.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Actor;

const GEOM_EPSILON: f32 = 1e-4;

/// A static support segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub a: Vec2,
    pub b: Vec2,
}

impl Platform {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    /// Zero-length platform (acts as a point obstacle)
    #[inline]
    pub fn is_point(&self) -> bool {
        self.a.distance_squared(self.b) <= GEOM_EPSILON * GEOM_EPSILON
    }

    /// Vertical platforms act as walls
    #[inline]
    pub fn is_vertical(&self) -> bool {
        !self.is_point() && (self.b.x - self.a.x).abs() <= GEOM_EPSILON
    }

    /// Whether `x` lies within the platform's horizontal extent
    pub fn spans_x(&self, x: f32) -> bool {
        x >= self.a.x.min(self.b.x) && x <= self.a.x.max(self.b.x)
    }

    /// Height of the platform at `x` (None for walls and points)
    pub fn y_at(&self, x: f32) -> Option<f32> {
        let dx = self.b.x - self.a.x;
        if dx.abs() <= GEOM_EPSILON {
            return None;
        }
        let slope = (self.b.y - self.a.y) / dx;
        Some(self.a.y + slope * (x - self.a.x))
    }

    /// Closest point on the platform to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        let ab = self.b - self.a;
        let len_sq = ab.length_squared();
        if len_sq <= GEOM_EPSILON * GEOM_EPSILON {
            return self.a;
        }
        let t = ((p - self.a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.a + ab * t
    }
}

/// A circle touching a platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Closest point on the platform
    pub point: Vec2,
    /// Distance from the circle centre to `point`
    pub distance: f32,
}

/// Circle vs segment contact test
pub fn circle_platform_contact(center: Vec2, radius: f32, platform: &Platform) -> Option<Contact> {
    let point = platform.closest_point(center);
    let distance = center.distance(point);
    (distance <= radius).then_some(Contact { point, distance })
}

/// Decides whether a contact may be resolved as a landing
pub trait LandingRule {
    fn allows_landing(&self, velocity: Vec2) -> bool;
}

/// Land only while moving down (screen +y) into the platform
#[derive(Debug, Clone, Copy, Default)]
pub struct DownwardLanding;

impl LandingRule for DownwardLanding {
    fn allows_landing(&self, velocity: Vec2) -> bool {
        velocity.y > 0.0
    }
}

/// How the platform pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformResolution {
    /// Landed on the platform at this index
    Landed(usize),
    /// No landing (walls may still have pushed the actor sideways)
    Airborne,
}

/// Resolve the actor against platforms in insertion order
///
/// The first platform that qualifies for a landing wins. Walls push the actor
/// out horizontally and never land it. `on_ground` is only ever set here,
/// never cleared, so a ground-plane hit earlier in the tick survives.
pub fn resolve_platforms(
    actor: &mut Actor,
    platforms: &[Platform],
    rule: &dyn LandingRule,
) -> PlatformResolution {
    for (index, platform) in platforms.iter().enumerate() {
        let Some(contact) = circle_platform_contact(actor.pos, actor.radius, platform) else {
            continue;
        };

        if platform.is_vertical() {
            let side = if actor.pos.x >= platform.a.x { 1.0 } else { -1.0 };
            actor.pos.x = platform.a.x + side * actor.radius;
            actor.vel.x = 0.0;
            continue;
        }

        if !rule.allows_landing(actor.vel) {
            continue;
        }

        let rest_y = if platform.is_point() {
            // Rest on the point at the current x
            let dx = actor.pos.x - contact.point.x;
            contact.point.y - (actor.radius * actor.radius - dx * dx).max(0.0).sqrt()
        } else {
            if !platform.spans_x(actor.pos.x) {
                continue;
            }
            let Some(surface_y) = platform.y_at(actor.pos.x) else {
                continue;
            };
            surface_y - actor.radius
        };

        actor.land(rest_y);
        return PlatformResolution::Landed(index);
    }

    PlatformResolution::Airborne
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_at(x: f32, y: f32, vy: f32) -> Actor {
        let mut actor = Actor::new(Vec2::new(x, y), 20.0, 3);
        actor.vel.y = vy;
        actor.remaining_jumps = 0;
        actor
    }

    #[test]
    fn test_contact_clamped_to_segment() {
        let p = Platform::new(Vec2::new(0.0, 100.0), Vec2::new(100.0, 100.0));
        // Past the end of the segment: distance to endpoint, not to the line
        assert!(circle_platform_contact(Vec2::new(115.0, 90.0), 10.0, &p).is_none());
        let c = circle_platform_contact(Vec2::new(50.0, 92.0), 10.0, &p).unwrap();
        assert!((c.distance - 8.0).abs() < 1e-5);
        assert_eq!(c.point, Vec2::new(50.0, 100.0));
    }

    #[test]
    fn test_point_platform() {
        let p = Platform::new(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0));
        assert!(p.is_point());
        assert!(!p.is_vertical());
        assert!(circle_platform_contact(Vec2::new(13.0, 14.0), 5.0, &p).is_some());
        assert!(circle_platform_contact(Vec2::new(14.0, 14.0), 5.0, &p).is_none());
    }

    #[test]
    fn test_falling_actor_lands() {
        let platforms = [Platform::new(Vec2::new(0.0, 300.0), Vec2::new(200.0, 300.0))];
        let mut actor = actor_at(100.0, 285.0, 4.0);
        let res = resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        assert_eq!(res, PlatformResolution::Landed(0));
        assert_eq!(actor.pos.y, 280.0);
        assert_eq!(actor.vel.y, 0.0);
        assert!(actor.on_ground);
        assert_eq!(actor.remaining_jumps, 3);
    }

    #[test]
    fn test_rising_actor_passes_through() {
        let platforms = [Platform::new(Vec2::new(0.0, 300.0), Vec2::new(200.0, 300.0))];
        let mut actor = actor_at(100.0, 310.0, -6.0);
        let res = resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        assert_eq!(res, PlatformResolution::Airborne);
        assert_eq!(actor.pos.y, 310.0);
        assert!(!actor.on_ground);
    }

    #[test]
    fn test_sloped_landing_uses_current_x() {
        let platforms = [Platform::new(Vec2::new(0.0, 400.0), Vec2::new(200.0, 300.0))];
        let mut actor = actor_at(100.0, 335.0, 2.0);
        resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        // Surface at x = 100 is y = 350
        assert!((actor.pos.y - 330.0).abs() < 1e-4);
        assert_eq!(actor.pos.x, 100.0);
    }

    #[test]
    fn test_first_platform_wins() {
        let platforms = [
            Platform::new(Vec2::new(0.0, 300.0), Vec2::new(200.0, 300.0)),
            Platform::new(Vec2::new(0.0, 295.0), Vec2::new(200.0, 295.0)),
        ];
        let mut actor = actor_at(100.0, 290.0, 3.0);
        assert_eq!(
            resolve_platforms(&mut actor, &platforms, &DownwardLanding),
            PlatformResolution::Landed(0)
        );
        assert_eq!(actor.pos.y, 280.0);
    }

    #[test]
    fn test_wall_pushes_sideways_without_landing() {
        let platforms = [Platform::new(Vec2::new(100.0, 0.0), Vec2::new(100.0, 500.0))];
        let mut actor = actor_at(90.0, 200.0, 3.0);
        actor.vel.x = 5.0;
        let res = resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        assert_eq!(res, PlatformResolution::Airborne);
        assert_eq!(actor.pos.x, 80.0);
        assert_eq!(actor.vel.x, 0.0);
        assert_eq!(actor.vel.y, 3.0);
        assert!(!actor.on_ground);

        let mut actor = actor_at(110.0, 200.0, 3.0);
        resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        assert_eq!(actor.pos.x, 120.0);
    }

    #[test]
    fn test_landing_on_point() {
        let platforms = [Platform::new(Vec2::new(100.0, 300.0), Vec2::new(100.0, 300.0))];
        let mut actor = actor_at(100.0, 290.0, 1.0);
        assert_eq!(
            resolve_platforms(&mut actor, &platforms, &DownwardLanding),
            PlatformResolution::Landed(0)
        );
        assert!((actor.pos.y - 280.0).abs() < 1e-4);
    }

    #[test]
    fn test_outside_horizontal_extent_no_landing() {
        // Centre just past the right end, circle still touches the endpoint
        let platforms = [Platform::new(Vec2::new(0.0, 300.0), Vec2::new(100.0, 300.0))];
        let mut actor = actor_at(105.0, 290.0, 2.0);
        assert_eq!(
            resolve_platforms(&mut actor, &platforms, &DownwardLanding),
            PlatformResolution::Airborne
        );
    }

    #[test]
    fn test_existing_ground_flag_kept() {
        let platforms = [Platform::new(Vec2::new(0.0, 100.0), Vec2::new(50.0, 100.0))];
        let mut actor = actor_at(400.0, 560.0, 0.0);
        actor.on_ground = true;
        resolve_platforms(&mut actor, &platforms, &DownwardLanding);
        assert!(actor.on_ground);
    }
}

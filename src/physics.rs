//! Pointer-repulsion physics.
//!
//! Each frame the repulsion target eases toward the pointer (or back to the
//! surface center), then every particle is pushed away from the target while a
//! spring pulls it back toward its origin.
//!
//! All smoothing uses [`lerp`] in the `(1 - t)·a + t·b` form, and the force is
//! evaluated exactly as written in [`repel_force`]. Keep both forms; the f32
//! rounding of the results depends on them.

use crate::config::Settings;
use crate::session::Session;
use crate::store::{Particle, ParticleStore};
use glam::Vec2;

/// `(1 - t)·a + t·b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (1.0 - t) * a + t * b
}

/// Component-wise [`lerp`].
#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Repulsion magnitude at `distance` from the target.
///
/// Algebraically equal to `threshold`; NaN at zero distance.
#[inline]
pub fn repel_force(threshold: f32, distance: f32) -> f32 {
    (threshold * threshold / distance) * (distance / threshold)
}

/// Ease the session's repulsion target toward the pointer while hovering,
/// otherwise toward the surface center.
///
/// The target never becomes non-finite: a step that would overflow is dropped.
pub fn update_target(session: &mut Session, settings: &Settings) {
    let pointer = session.pointer();
    let goal = if pointer.is_hovering() {
        pointer.position()
    } else {
        settings.center()
    };
    let next = lerp_vec2(session.repel_target(), goal, settings.pointer_lerp);
    if next.is_finite() {
        session.set_repel_target(next);
    }
}

/// Advance one particle by one frame against `target`.
///
/// A record carrying a non-finite position or velocity is first reset to rest
/// at its origin.
pub fn step_particle(particle: &Particle, target: Vec2, settings: &Settings) -> Particle {
    let p = if particle.is_finite() {
        *particle
    } else {
        Particle::at_rest(particle.origin)
    };

    let distance = p.position.distance(target);
    let angle = (p.position.y - target.y).atan2(p.position.x - target.x);
    let force = repel_force(settings.repel_threshold, distance);

    let dx = p.origin.x - p.position.x;
    let dy = p.origin.y - p.position.y;

    let vx = lerp(p.velocity.x, dx + angle.cos() * force, settings.velocity_lerp);
    let vy = lerp(p.velocity.y, dy + angle.sin() * force, settings.velocity_lerp);

    let x = lerp(p.position.x, p.position.x + vx, settings.position_lerp);
    let y = lerp(p.position.y, p.position.y + vy, settings.position_lerp);

    Particle {
        position: Vec2::new(x, y),
        velocity: Vec2::new(vx, vy),
        origin: p.origin,
    }
}

/// One integration pass: update the target, then step every record.
pub fn integrate(store: &mut ParticleStore, session: &mut Session, settings: &Settings) {
    update_target(session, settings);
    let target = session.repel_target();
    store.for_each_record(|_, p| Some(step_particle(p, target, settings)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerEvent;

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_lerp_form() {
        assert_eq!(lerp(2.0, 10.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 10.0, 1.0), 10.0);
        assert_eq!(lerp(2.0, 10.0, 0.25), 4.0);
        assert_eq!(lerp_vec2(Vec2::ZERO, Vec2::new(4.0, -8.0), 0.5), Vec2::new(2.0, -4.0));
    }

    #[test]
    fn test_force_is_constant() {
        for d in [0.5, 1.0, 10.0, 49.9, 50.0, 1000.0] {
            assert!((repel_force(50.0, d) - 50.0).abs() < 1e-3, "d = {d}");
        }
        assert!(repel_force(50.0, 0.0).is_nan());
    }

    #[test]
    fn test_zero_distance_nan_then_recovers() {
        let s = settings();
        let origin = Vec2::new(10.0, 10.0);
        let p = Particle::at_rest(origin);

        // Target exactly on the particle.
        let poisoned = step_particle(&p, origin, &s);
        assert!(!poisoned.is_finite());
        assert_eq!(poisoned.origin, origin);

        // Next step starts over from rest.
        let recovered = step_particle(&poisoned, Vec2::new(-100.0, 10.0), &s);
        assert!(recovered.is_finite());
        assert_eq!(recovered.origin, origin);
    }

    #[test]
    fn test_single_step_is_bounded() {
        let s = settings();
        let origin = Vec2::new(40.0, 40.0);
        for d in [0.5f32, 3.0, 25.0, 80.0] {
            let p = Particle {
                position: origin + Vec2::new(d, 0.0),
                velocity: Vec2::ZERO,
                origin,
            };
            let next = step_particle(&p, origin, &s);
            let moved = next.position.distance(p.position);
            assert!(moved <= s.repel_threshold + d + 1e-3, "moved {moved} for d = {d}");
        }
    }

    #[test]
    fn test_converges_to_offset_fixed_point() {
        let s = settings();
        let origin = Vec2::new(150.0, 75.0);
        let target = Vec2::new(-1.0e6, origin.y);
        let mut p = Particle::at_rest(origin);

        for _ in 0..500 {
            p = step_particle(&p, target, &s);
        }

        // Constant push away from the target balances the spring at one
        // threshold from the origin.
        let expected = Vec2::new(origin.x + s.repel_threshold, origin.y);
        assert!(p.position.distance(expected) < 1e-2, "settled at {:?}", p.position);
        assert!(p.velocity.length() < 1e-2);
    }

    #[test]
    fn test_target_follows_pointer_and_returns() {
        let s = settings();
        let center = s.center();
        let mut session = Session::new(center);

        session.apply_pointer(PointerEvent::Enter);
        session.apply_pointer(PointerEvent::Move { x: 10.0, y: 10.0 });
        update_target(&mut session, &s);
        // Half way with the default pointer lerp.
        assert_eq!(session.repel_target(), lerp_vec2(center, Vec2::new(10.0, 10.0), 0.5));

        for _ in 0..40 {
            update_target(&mut session, &s);
        }
        assert!(session.repel_target().distance(Vec2::new(10.0, 10.0)) < 1e-3);

        session.apply_pointer(PointerEvent::Leave);
        let before = session.repel_target().distance(center);
        update_target(&mut session, &s);
        assert!(session.repel_target().distance(center) < before);
        for _ in 0..40 {
            update_target(&mut session, &s);
        }
        assert!(session.repel_target().distance(center) < 1e-3);
    }

    #[test]
    fn test_target_stays_finite_far_from_surface() {
        let s = settings();
        let center = s.center();
        let mut session = Session::new(center);

        session.apply_pointer(PointerEvent::Enter);
        session.apply_pointer(PointerEvent::Move { x: f32::MAX, y: f32::MAX });
        for _ in 0..10 {
            update_target(&mut session, &s);
            assert!(session.repel_target().is_finite());
        }

        session.apply_pointer(PointerEvent::Leave);
        for _ in 0..200 {
            update_target(&mut session, &s);
        }
        assert!(session.repel_target().distance(center) < 1e-2);
    }

    #[test]
    fn test_integrate_steps_every_record() {
        let s = settings();
        let mut session = Session::new(s.center());
        let mut store = ParticleStore::from_origins(&[Vec2::new(10.0, 10.0), Vec2::new(290.0, 140.0)]);

        integrate(&mut store, &mut session, &s);
        for p in store.iter() {
            assert!(p.is_finite());
            assert_ne!(p.position, p.origin);
        }
    }

    #[test]
    fn test_non_finite_positions_still_integrated() {
        let s = settings();
        let mut session = Session::new(s.center());
        let mut store = ParticleStore::allocate(1);
        store.write_record(
            0,
            Particle {
                position: Vec2::new(f32::NAN, 1.0),
                velocity: Vec2::new(f32::INFINITY, 0.0),
                origin: Vec2::new(5.0, 5.0),
            },
        );

        integrate(&mut store, &mut session, &s);
        assert!(store.read_record(0).is_finite());
    }
}

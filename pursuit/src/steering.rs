//! Local movement: seek, obstacle avoidance and target prediction

use std::f32::consts::FRAC_PI_6;

use glam::Vec2;

use crate::Environment;

/// Weight of the avoidance vector in the blend
pub const AVOIDANCE_WEIGHT: f32 = 1.5;
/// Angle between the forward probe and the side ones
pub const PROBE_ANGLE: f32 = FRAC_PI_6;
/// Shortest prediction horizon, in seconds
pub const PREDICTION_FLOOR: f32 = 0.2;
/// Distance covered by one second of prediction horizon
pub const PREDICTION_SCALE: f32 = 1000.;

/// Unit vector from `from` toward `to`
#[inline(always)]
#[must_use]
pub fn seek(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Probe directions: forward, then rotated left and right
#[must_use]
pub fn probes(forward: Vec2) -> [Vec2; 3] {
    [
        forward,
        Vec2::from_angle(PROBE_ANGLE).rotate(forward),
        Vec2::from_angle(-PROBE_ANGLE).rotate(forward),
    ]
}

/// Unit vector pointing away from the obstacles in front, or zero.
///
/// Each probe that hits contributes the direction from the hit point to
/// `position`; the contributions are averaged.
pub fn avoidance<E>(env: &E, position: Vec2, forward: Vec2, radius: f32) -> Vec2
where
    E: Environment + ?Sized,
{
    let (sum, hits) = probes(forward.normalize_or_zero())
        .into_iter()
        .filter_map(|dir| env.raycast(position, position + dir * radius))
        .fold((Vec2::ZERO, 0), |(sum, hits), hit| {
            (sum + (position - hit.point).normalize_or_zero(), hits + 1)
        });
    if hits == 0 {
        return Vec2::ZERO;
    }
    (sum / hits as f32).normalize_or_zero()
}

/// Below this cross-track component, avoidance counts as head-on
const HEAD_ON_TOLERANCE: f32 = 1e-3;

/// Final movement direction
///
/// When the avoidance pushes straight back against the seek, the blend
/// also sidesteps to the left of the seek direction.
#[must_use]
pub fn blend(seek: Vec2, avoidance: Vec2) -> Vec2 {
    let mut steer = seek + avoidance * AVOIDANCE_WEIGHT;
    if seek.dot(avoidance) < 0. && seek.perp_dot(avoidance).abs() < HEAD_ON_TOLERANCE {
        steer += seek.perp() * AVOIDANCE_WEIGHT;
    }
    steer.normalize_or_zero()
}

/// How far ahead to predict at a given distance from the target
/// ```
/// use pursuit::steering::prediction_time;
///
/// assert_eq!(prediction_time(300., 0.5), 0.3);
/// assert_eq!(prediction_time(50., 0.5), 0.2);
/// assert_eq!(prediction_time(5000., 0.5), 0.5);
/// ```
#[must_use]
pub fn prediction_time(distance: f32, ceiling: f32) -> f32 {
    (distance / PREDICTION_SCALE).clamp(PREDICTION_FLOOR, ceiling.max(PREDICTION_FLOOR))
}

/// Where the target will be, kept inside `[0, extent]`
#[must_use]
pub fn predict(target: Vec2, velocity: Vec2, distance: f32, ceiling: f32, extent: Vec2) -> Vec2 {
    (target + velocity * prediction_time(distance, ceiling)).clamp(Vec2::ZERO, extent.max(Vec2::ZERO))
}

/// Turn `current` toward `desired`, by a fraction `dt * rate` of the angle
/// between them
#[must_use]
pub fn turn_toward(current: Vec2, desired: Vec2, dt: f32, rate: f32) -> Vec2 {
    let desired = desired.normalize_or_zero();
    let current = current.normalize_or_zero();
    if desired == Vec2::ZERO {
        return current;
    }
    if current == Vec2::ZERO {
        return desired;
    }
    let step = (dt * rate).clamp(0., 1.);
    Vec2::from_angle(current.angle_between(desired) * step).rotate(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RayHit, TargetId};

    /// A single wall crossing the x axis at `wall_x`, only as tall as `half_width`
    struct Pillar {
        wall_x: f32,
        half_width: f32,
    }

    impl Environment for Pillar {
        fn raycast(&self, from: Vec2, to: Vec2) -> Option<RayHit> {
            let delta = to - from;
            if delta.x <= 0. {
                return None;
            }
            let t = (self.wall_x - from.x) / delta.x;
            if !(0. ..=1.).contains(&t) {
                return None;
            }
            let point = from + delta * t;
            (point.y.abs() <= self.half_width).then_some(RayHit {
                point,
                normal: Vec2::NEG_X,
            })
        }
        fn locate(&self, _: TargetId) -> Option<Vec2> {
            None
        }
        fn default_target(&self) -> Option<TargetId> {
            None
        }
    }

    mod avoid {
        use super::*;

        #[test]
        fn nothing_in_sight() {
            let env = Pillar {
                wall_x: 1000.,
                half_width: 10.,
            };
            assert_eq!(avoidance(&env, Vec2::ZERO, Vec2::X, 200.), Vec2::ZERO);
        }

        #[test]
        fn points_away_from_the_hit() {
            let env = Pillar {
                wall_x: 100.,
                half_width: 10.,
            };
            let avoid = avoidance(&env, Vec2::ZERO, Vec2::X, 200.);
            assert!((avoid - Vec2::NEG_X).length() < 1e-5);
        }

        #[test]
        fn averages_the_hits() {
            // every probe hits a wide wall, the side ones cancel out
            let env = Pillar {
                wall_x: 100.,
                half_width: 1000.,
            };
            let avoid = avoidance(&env, Vec2::ZERO, Vec2::X, 200.);
            assert!((avoid - Vec2::NEG_X).length() < 1e-5);
        }

        #[test]
        fn seek_behind_the_wall_deviates() {
            let env = Pillar {
                wall_x: 100.,
                half_width: 10.,
            };
            let seek = seek(Vec2::ZERO, Vec2::new(300., 40.));
            let avoid = avoidance(&env, Vec2::ZERO, Vec2::X, 200.);
            let steer = blend(seek, avoid);
            assert!((steer.length() - 1.).abs() < 1e-5);
            // the blend is not aligned with the way to the target
            assert!(seek.perp_dot(steer).abs() > 0.1);
            assert!(steer.x < seek.x);
        }
    }

    mod head_on {
        use super::*;

        #[test]
        fn seek_straight_behind_the_wall_sidesteps() {
            let env = Pillar {
                wall_x: 100.,
                half_width: 10.,
            };
            let seek = seek(Vec2::ZERO, Vec2::new(300., 0.));
            let avoid = avoidance(&env, Vec2::ZERO, Vec2::X, 200.);
            assert!(seek.perp_dot(avoid).abs() < 1e-5);
            let steer = blend(seek, avoid);
            assert!((steer.length() - 1.).abs() < 1e-5);
            assert!(seek.perp_dot(steer) > 0.5);
            assert!(steer.x < 0.);
        }

        #[test]
        fn opposed_blend_is_never_zero() {
            for angle in [0., 1., 2., 3., 4., 5., 6.] {
                let seek = Vec2::from_angle(angle);
                let steer = blend(seek, -seek);
                assert!((steer.length() - 1.).abs() < 1e-5);
                assert!(seek.perp_dot(steer).abs() > 0.5);
            }
        }

        #[test]
        fn aligned_avoidance_is_untouched() {
            assert_eq!(blend(Vec2::X, Vec2::X), Vec2::X);
            assert_eq!(blend(Vec2::X, Vec2::ZERO), Vec2::X);
            assert_eq!(blend(Vec2::ZERO, Vec2::ZERO), Vec2::ZERO);
        }
    }

    mod prediction {
        use super::*;

        #[test]
        fn shrinks_when_closing_in() {
            let mut last = prediction_time(500., 0.5);
            for d in (260..500).rev().step_by(10) {
                let t = prediction_time(d as f32, 0.5);
                assert!(t < last, "{t} not below {last} at {d}");
                last = t;
            }
        }

        #[test]
        fn constant_velocity() {
            let target = Vec2::new(1000., 1000.);
            let velocity = Vec2::new(200., -100.);
            let extent = Vec2::splat(5000.);
            for (distance, expected) in [(100., 0.2), (400., 0.4), (3000., 0.5)] {
                let predicted = predict(target, velocity, distance, 0.5, extent);
                assert!((predicted - (target + velocity * expected)).length() < 1e-3);
            }
        }

        #[test]
        fn stays_in_bounds() {
            let predicted = predict(
                Vec2::new(10., 4990.),
                Vec2::new(-1000., 1000.),
                2000.,
                0.5,
                Vec2::splat(5000.),
            );
            assert_eq!(predicted, Vec2::new(0., 5000.));
        }
    }

    #[test]
    fn turning() {
        let half = turn_toward(Vec2::X, Vec2::Y, 0.05, 10.);
        assert!((half.angle_between(Vec2::X) + std::f32::consts::FRAC_PI_4).abs() < 1e-4);
        assert!((turn_toward(Vec2::X, Vec2::Y, 1., 10.) - Vec2::Y).length() < 1e-5);
        assert_eq!(turn_toward(Vec2::ZERO, Vec2::Y, 0.1, 10.), Vec2::Y);
        assert_eq!(turn_toward(Vec2::X, Vec2::ZERO, 0.1, 10.), Vec2::X);
    }
}

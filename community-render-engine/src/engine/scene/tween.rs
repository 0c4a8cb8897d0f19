use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;

/// Eases a node's local translation towards a planned target.
///
/// Inserting a new tween replaces the previous one, so the latest plan wins.
#[derive(Component, Debug, Clone)]
pub struct PositionTween {
    pub target: Vec3,
    pub duration: f32,
    elapsed: f32,
    start: Option<Vec3>,
}

impl PositionTween {
    pub fn new(target: Vec3, duration: f32) -> Self {
        Self {
            target,
            duration,
            elapsed: 0.0,
            start: None,
        }
    }

    /// Advance by `dt` and return the eased translation plus whether the tween finished.
    pub fn step(&mut self, current: Vec3, dt: f32) -> (Vec3, bool) {
        let start = *self.start.get_or_insert(current);
        self.elapsed += dt;
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            return (self.target, true);
        }
        let t = EaseFunction::CubicInOut.sample_clamped(self.elapsed / self.duration);
        (start.lerp(self.target, t), false)
    }
}

pub fn animate_position_tweens(
    mut commands: Commands,
    time: Res<Time>,
    mut tweens: Query<(Entity, &mut Transform, &mut PositionTween)>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut tween) in &mut tweens {
        let (translation, finished) = tween.step(transform.translation, dt);
        transform.translation = translation;
        if finished {
            commands.entity(entity).remove::<PositionTween>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_starts_from_first_observed_translation() {
        let mut tween = PositionTween::new(Vec3::new(0.0, 25.0, 0.0), 0.8);
        let (halfway, done) = tween.step(Vec3::ZERO, 0.4);
        assert!(!done);
        assert!((halfway.y - 12.5).abs() < 1e-3);

        // Later observations do not move the start point.
        let (end, done) = tween.step(Vec3::new(0.0, 100.0, 0.0), 0.4);
        assert!(done);
        assert_eq!(end, Vec3::new(0.0, 25.0, 0.0));
    }

    #[test]
    fn zero_duration_snaps_to_target() {
        let mut tween = PositionTween::new(Vec3::ONE, 0.0);
        assert_eq!(tween.step(Vec3::ZERO, 0.0), (Vec3::ONE, true));
    }
}

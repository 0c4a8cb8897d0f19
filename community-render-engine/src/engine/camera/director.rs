//! Fly-to sequencing with strict supersession.
//!
//! Each `fly_to` bumps a generation counter and replaces the active flight, dropping the
//! older one's remaining steps and its completion callback. Steps carry the generation of
//! the flight that produced them.

use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;

/// Camera position plus the orbit target it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Destination of a fly-to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraShot {
    pub position: Vec3,
    pub target: Vec3,
    pub duration: f32,
}

impl CameraShot {
    pub fn new(position: Vec3, target: Vec3, duration: f32) -> Self {
        Self {
            position,
            target,
            duration,
        }
    }

    /// Frame `focus` from a fixed offset.
    pub fn offset_from(focus: Vec3, offset: Vec3, duration: f32) -> Self {
        Self::new(focus + offset, focus, duration)
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
        }
    }
}

pub type FlightCallback = Box<dyn FnOnce() + Send + Sync>;

struct Flight {
    generation: u64,
    from: CameraPose,
    shot: CameraShot,
    elapsed: f32,
    on_complete: Option<FlightCallback>,
}

/// One interpolation step emitted by [`CameraDirector::advance`].
///
/// The final step carries the flight's callback; the caller runs it with
/// [`FlightStep::complete`] once the camera and orbit state reflect the final pose.
pub struct FlightStep {
    pub pose: CameraPose,
    pub generation: u64,
    pub finished: bool,
    on_complete: Option<FlightCallback>,
}

impl FlightStep {
    pub fn complete(self) {
        if let Some(callback) = self.on_complete {
            callback();
        }
    }
}

#[derive(Resource, Default)]
pub struct CameraDirector {
    generation: u64,
    flight: Option<Flight>,
}

impl CameraDirector {
    /// Start flying from `from` to `shot`, cancelling any flight in progress.
    pub fn fly_to(
        &mut self,
        from: CameraPose,
        shot: CameraShot,
        on_complete: Option<FlightCallback>,
    ) -> u64 {
        self.generation += 1;
        if let Some(cancelled) = self.flight.take() {
            debug!("Camera flight {} superseded", cancelled.generation);
        }
        self.flight = Some(Flight {
            generation: self.generation,
            from,
            shot,
            elapsed: 0.0,
            on_complete,
        });
        self.generation
    }

    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// User camera input is only accepted while idle.
    pub fn input_enabled(&self) -> bool {
        !self.is_animating()
    }

    /// Advance the active flight by `dt` seconds.
    ///
    /// Position and target share one easing curve so they arrive together. The final step
    /// hands back the callback and the director returns to idle.
    pub fn advance(&mut self, dt: f32) -> Option<FlightStep> {
        let flight = self.flight.as_mut()?;

        flight.elapsed += dt;
        let progress = if flight.shot.duration <= 0.0 {
            1.0
        } else {
            (flight.elapsed / flight.shot.duration).min(1.0)
        };
        let t = EaseFunction::CubicInOut.sample_clamped(progress);
        let pose = CameraPose {
            position: flight.from.position.lerp(flight.shot.position, t),
            target: flight.from.target.lerp(flight.shot.target, t),
        };
        let generation = flight.generation;
        let final_pose = flight.shot.pose();

        if progress < 1.0 {
            return Some(FlightStep {
                pose,
                generation,
                finished: false,
                on_complete: None,
            });
        }

        let on_complete = self.flight.take().and_then(|f| f.on_complete);
        Some(FlightStep {
            pose: final_pose,
            generation,
            finished: true,
            on_complete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn origin() -> CameraPose {
        CameraPose {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
        }
    }

    fn counter_callback(counter: &Arc<AtomicUsize>) -> Option<FlightCallback> {
        let counter = counter.clone();
        Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn second_fly_to_supersedes_first() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut director = CameraDirector::default();

        director.fly_to(
            origin(),
            CameraShot::new(Vec3::X * 10.0, Vec3::ZERO, 1.0),
            counter_callback(&first),
        );
        director.advance(0.2);
        let generation = director.fly_to(
            origin(),
            CameraShot::new(Vec3::Y * 10.0, Vec3::ONE, 1.0),
            counter_callback(&second),
        );

        let mut last = None;
        while let Some(step) = director.advance(0.25) {
            let finished = step.finished;
            last = Some(step);
            if finished {
                break;
            }
        }

        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.generation, generation);
        assert_eq!(last.pose.position, Vec3::Y * 10.0);
        assert_eq!(last.pose.target, Vec3::ONE);
        assert!(director.input_enabled());
        assert_eq!(second.load(Ordering::SeqCst), 0);

        last.complete();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_waits_for_the_caller() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut director = CameraDirector::default();
        director.fly_to(
            origin(),
            CameraShot::new(Vec3::X, Vec3::ZERO, 0.5),
            counter_callback(&calls),
        );

        let step = director.advance(1.0).unwrap();
        assert!(step.finished);
        assert!(director.input_enabled());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        step.complete();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn position_and_target_move_in_lock_step() {
        let mut director = CameraDirector::default();
        director.fly_to(
            origin(),
            CameraShot::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 20.0), 2.0),
            None,
        );
        assert!(!director.input_enabled());

        let step = director.advance(0.5).unwrap();
        let position_share = step.pose.position.x / 10.0;
        let target_share = step.pose.target.z / 20.0;
        assert!((position_share - target_share).abs() < 1e-5);
        assert!(!step.finished);
    }

    #[test]
    fn idle_director_emits_nothing() {
        let mut director = CameraDirector::default();
        assert!(director.advance(0.1).is_none());
    }
}

use glam::Vec3;

use crate::history::RingHistory;
use crate::record::StateSnapshot;
use crate::transform::Transform;

pub const DEFAULT_INTERPOLATION_DELAY: f32 = 0.1;
pub const DEFAULT_TELEPORT_THRESHOLD: f32 = 5.0;

#[derive(Debug, Clone, Copy)]
pub struct InterpolatorConfig {
    pub interpolation_delay: f32,
    pub teleport_threshold: f32,
    pub history_size: usize,
}

impl Default for InterpolatorConfig {
    fn default() -> Self {
        Self {
            interpolation_delay: DEFAULT_INTERPOLATION_DELAY,
            teleport_threshold: DEFAULT_TELEPORT_THRESHOLD,
            history_size: 128,
        }
    }
}

/// Outcome of one `sample` call, distinguishing an interpolated frame from
/// a snap so the caller can suppress any outer smoothing layer on top.
#[derive(Debug, Clone, Copy)]
pub struct SampledTransform {
    pub transform: Transform,
    pub teleported: bool,
}

/// Time-delayed snapshot interpolation for `RemoteObserver` controllers
/// (§4.3). Grounded on `InterpolationEngine`
/// (`client/src/net/interpolation.rs`), stripped of its server-time-offset
/// drift correction — that concern belongs to `Clock`/`TickCoordinator`
/// here, not to the per-entity interpolator.
pub struct RemoteInterpolator<P> {
    config: InterpolatorConfig,
    buffer: RingHistory<StateSnapshot<P>>,
    last_rendered: Option<Transform>,
}

impl<P: Clone> RemoteInterpolator<P> {
    pub fn new(config: InterpolatorConfig) -> Self {
        Self {
            buffer: RingHistory::new(config.history_size),
            config,
            last_rendered: None,
        }
    }

    /// Buffers an authoritative snapshot from the host. Returns `false`
    /// (and drops it) if its tick is not newer than the newest buffered
    /// entry, per §4.3's "inserts with tick ≤ newest are discarded".
    pub fn push_snapshot(&mut self, snapshot: StateSnapshot<P>) -> bool {
        self.buffer.push(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Computes the rendered transform for `wall_now`, lagging
    /// `InterpolationDelay` behind to bound jitter.
    pub fn sample(&mut self, wall_now: f64) -> Option<SampledTransform> {
        if self.buffer.is_empty() {
            return None;
        }

        let render_time = wall_now - self.config.interpolation_delay as f64;
        let target = self.interpolate_at(render_time);

        let teleported = match self.last_rendered {
            Some(prev) => prev.position.distance(target.position) > self.config.teleport_threshold,
            None => true,
        };

        self.last_rendered = Some(target);
        Some(SampledTransform {
            transform: target,
            teleported,
        })
    }

    fn interpolate_at(&self, render_time: f64) -> Transform {
        let entries: Vec<&StateSnapshot<P>> = self.buffer.iter().collect();

        let earliest = entries.first().expect("checked non-empty above");
        let latest = entries.last().expect("checked non-empty above");

        if render_time <= earliest.wall_time {
            return earliest.transform;
        }
        if render_time >= latest.wall_time {
            return latest.transform;
        }

        let pair = entries
            .windows(2)
            .find(|w| w[0].wall_time <= render_time && render_time <= w[1].wall_time);

        let Some([a, b]) = pair.map(|w| [w[0], w[1]]) else {
            return latest.transform;
        };

        let span = b.wall_time - a.wall_time;
        let t = if span > 0.0 {
            ((render_time - a.wall_time) / span).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };

        Transform {
            position: a.transform.position.lerp(b.transform.position, t),
            rotation: a.transform.rotation.slerp(b.transform.rotation, t),
        }
    }
}

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn snap(tick: u32, wall_time: f64, x: f32) -> StateSnapshot<()> {
        StateSnapshot {
            tick,
            wall_time,
            transform: Transform::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY),
            payload: (),
        }
    }

    #[test]
    fn interpolates_between_two_snapshots() {
        let mut interp: RemoteInterpolator<()> = RemoteInterpolator::new(InterpolatorConfig::default());
        interp.push_snapshot(snap(1, 0.0, 0.0));
        interp.push_snapshot(snap(2, 0.2, 10.0));
        let sampled = interp.sample(0.1 + InterpolatorConfig::default().interpolation_delay as f64).unwrap();
        assert!((sampled.transform.position.x - 5.0).abs() < 0.5);
    }

    #[test]
    fn clamps_before_earliest_and_after_latest() {
        let mut interp: RemoteInterpolator<()> = RemoteInterpolator::new(InterpolatorConfig::default());
        interp.push_snapshot(snap(1, 1.0, 1.0));
        interp.push_snapshot(snap(2, 2.0, 2.0));
        let early = interp.sample(0.0).unwrap();
        assert_eq!(early.transform.position.x, 1.0);
        let late = interp.sample(100.0).unwrap();
        assert_eq!(late.transform.position.x, 2.0);
    }

    #[test]
    fn discards_non_increasing_ticks() {
        let mut interp: RemoteInterpolator<()> = RemoteInterpolator::new(InterpolatorConfig::default());
        assert!(interp.push_snapshot(snap(5, 1.0, 1.0)));
        assert!(!interp.push_snapshot(snap(5, 2.0, 2.0)));
        assert!(!interp.push_snapshot(snap(4, 3.0, 3.0)));
    }
}

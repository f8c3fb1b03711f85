use crate::ids::{tick_drift, Tick};

/// Scene-wide tunables from §4.1 / §6. `tick_interval` is scene-wide by
/// contract; the rest are per-controller defaults a `Controller` may
/// override.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    pub tick_interval: f32,
    pub max_ticks_per_frame: u32,
    pub target_tick_ahead: u32,
    pub max_tick_drift: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval: 1.0 / 30.0,
            max_ticks_per_frame: 5,
            target_tick_ahead: 2,
            max_tick_drift: 30,
        }
    }
}

/// `{ currentTick, lastAckTick, serverTick, synchronized, accumulator }`
/// from §3, plus the fixed-step accumulator from §4.1's per-frame driver.
/// Grounded on `FixedTimestep` (`simulation/tick.rs`), generalized to also
/// carry the server-tick-sync fields that file didn't need (single process,
/// no client/host split).
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    config: ClockConfig,
    current_tick: Tick,
    last_ack_tick: Tick,
    server_tick: Tick,
    synchronized: bool,
    accumulator: f32,
}

impl Clock {
    /// A host's own clock is authoritative from the start: its tick IS the
    /// server tick, so it is considered synchronized immediately.
    pub fn new_host(config: ClockConfig) -> Self {
        Self {
            config,
            current_tick: 0,
            last_ack_tick: 0,
            server_tick: 0,
            synchronized: true,
            accumulator: 0.0,
        }
    }

    /// A client clock starts unsynchronized; it waits for the first
    /// `update_server_tick` call to pick a starting `current_tick`.
    pub fn new_client(config: ClockConfig) -> Self {
        Self {
            config,
            current_tick: 0,
            last_ack_tick: 0,
            server_tick: 0,
            synchronized: false,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn last_ack_tick(&self) -> Tick {
        self.last_ack_tick
    }

    pub fn server_tick(&self) -> Tick {
        self.server_tick
    }

    pub fn synchronized(&self) -> bool {
        self.synchronized
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// `lastAckTick ← max(lastAckTick, t)`.
    pub fn acknowledge_tick(&mut self, t: Tick) {
        self.last_ack_tick = self.last_ack_tick.max(t);
    }

    /// Host-side: the host's own tick IS the server tick, advanced by
    /// `advance_tick` below; calling this on a host clock is a no-op.
    ///
    /// Client-side (§4.1): ignore stale ticks; on first sync jump
    /// `current_tick` to `server_tick + TargetTickAhead`; thereafter, if
    /// drift leaves `[0, MaxTickDrift]`, hard-resync and zero the
    /// accumulator.
    pub fn update_server_tick(&mut self, t: Tick, is_host: bool) {
        if is_host {
            return;
        }
        if t <= self.server_tick {
            return;
        }
        self.server_tick = t;

        if !self.synchronized {
            self.current_tick = self.server_tick + self.config.target_tick_ahead;
            self.synchronized = true;
            log::debug!("clock synchronized at tick {}", self.current_tick);
            return;
        }

        let drift = tick_drift(self.current_tick, self.server_tick);
        if drift < 0 || drift as u64 > self.config.max_tick_drift as u64 {
            log::warn!(
                "clock drift {} exceeds MaxTickDrift {}, resyncing",
                drift,
                self.config.max_tick_drift
            );
            self.current_tick = self.server_tick + self.config.target_tick_ahead;
            self.accumulator = 0.0;
        }
    }

    /// Runs the accumulator step of the per-frame driver (§4.1 steps 2-3)
    /// and returns how many ticks the caller should run this frame. Does
    /// not itself advance `current_tick` — the coordinator does that once
    /// per consumed tick, interleaved with controller dispatch.
    pub fn begin_frame(&mut self, frame_delta: f32, is_host: bool) -> u32 {
        if !is_host && !self.synchronized {
            return 0;
        }

        self.accumulator += frame_delta;
        let mut ticks = 0u32;
        while self.accumulator >= self.config.tick_interval && ticks < self.config.max_ticks_per_frame {
            self.accumulator -= self.config.tick_interval;
            ticks += 1;
        }

        let overflow_cap = self.config.tick_interval * self.config.max_ticks_per_frame as f32;
        if self.accumulator > overflow_cap {
            self.accumulator = 0.0;
        }

        ticks
    }

    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Host-only: the host's tick is by definition the server tick.
    pub fn advance_host_tick(&mut self) {
        self.current_tick += 1;
        self.server_tick = self.current_tick;
        self.last_ack_tick = self.current_tick;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_runs_max_ticks_per_frame() {
        let cfg = ClockConfig {
            tick_interval: 1.0 / 30.0,
            max_ticks_per_frame: 5,
            ..Default::default()
        };
        let mut clock = Clock::new_host(cfg);
        let ticks = clock.begin_frame(cfg.tick_interval * 5.0, true);
        assert_eq!(ticks, 5);
        assert!(clock.accumulator().abs() < 1e-4);
    }

    #[test]
    fn client_waits_for_sync_before_ticking() {
        let mut clock = Clock::new_client(ClockConfig::default());
        assert_eq!(clock.begin_frame(1.0, false), 0);
        clock.update_server_tick(10, false);
        assert!(clock.synchronized());
        assert_eq!(clock.current_tick(), 12);
    }

    #[test]
    fn stale_server_tick_is_ignored() {
        let mut clock = Clock::new_client(ClockConfig::default());
        clock.update_server_tick(1000, false);
        assert_eq!(clock.current_tick(), 1002);
        for _ in 0..5 {
            clock.advance_tick();
        }
        assert_eq!(clock.current_tick(), 1007);
        clock.update_server_tick(950, false);
        // 950 <= server_tick(1000) already observed -> ignored, drift unchanged
        assert_eq!(clock.server_tick(), 1000);
    }

    #[test]
    fn drift_resync_on_forward_jump() {
        let mut clock = Clock::new_client(ClockConfig::default());
        clock.update_server_tick(900, false);
        for _ in 0..60 {
            clock.advance_tick();
        }
        // current_tick = 902 + 60 = 962, drift vs server_tick(900) = 62 > 30
        clock.update_server_tick(901, false);
        assert_eq!(clock.current_tick(), 903);
        assert_eq!(clock.accumulator(), 0.0);
    }
}

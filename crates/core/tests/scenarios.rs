//! End-to-end scenarios from SPEC_FULL.md §8, exercised against the public
//! `Controller` API with a minimal one-axis `Simulator` rather than the
//! literal application used to write the spec's narrative (move speed is
//! an application concern, not a core invariant) — the assertions are the
//! qualitative behaviors the spec commits to: no reconcile on match,
//! tolerance-bounded skip, hard-correction replay + offset + callback,
//! gap-fill under packet loss, out-of-order discard, drift resync.

use std::cell::Cell;
use std::rc::Rc;

use glam::{Quat, Vec3};
use rewind_core::{
    ClientInputMessage, Clock, ClockConfig, Controller, ControllerConfig, ControllerRole,
    HostStateMessage, InputRecord, RoutingFilter, RuntimeContext, StateSnapshot, Transform, Transport,
};

const TICK: f32 = 1.0 / 30.0;

#[derive(Clone)]
struct OneAxisSimulator {
    speed: f32,
    reconcile_calls: Rc<Cell<u32>>,
}

impl OneAxisSimulator {
    fn new(speed: f32) -> Self {
        Self {
            speed,
            reconcile_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl rewind_core::Simulator for OneAxisSimulator {
    type InputPayload = f32;
    type StatePayload = f32;

    fn build_input(&mut self) -> f32 {
        1.0
    }

    fn simulate(&mut self, transform: &mut Transform, input: &f32, dt: f32) {
        transform.position.x += input * self.speed * dt;
    }

    fn write_state(&self) -> f32 {
        0.0
    }

    fn read_state(&mut self, _payload: &f32) {}

    fn on_reconcile(&mut self, _server: &StateSnapshot<f32>, _predicted: &StateSnapshot<f32>) {
        self.reconcile_calls.set(self.reconcile_calls.get() + 1);
    }
}

#[derive(Default)]
struct RecordingTransport {
    inputs: Vec<ClientInputMessage<f32>>,
    states: Vec<(HostStateMessage<f32>, RoutingFilter)>,
}

impl Transport for RecordingTransport {
    type InputPayload = f32;
    type StatePayload = f32;

    fn send_input(&mut self, message: ClientInputMessage<f32>) {
        self.inputs.push(message);
    }

    fn send_state(&mut self, message: HostStateMessage<f32>, filter: RoutingFilter) {
        self.states.push((message, filter));
    }
}

fn snapshot_at(tick: u32, x: f32) -> StateSnapshot<f32> {
    StateSnapshot {
        tick,
        wall_time: tick as f64 * TICK as f64,
        transform: Transform::new(Vec3::new(x, 0.0, 0.0), Quat::IDENTITY),
        payload: 0.0,
    }
}

fn client_controller(owner: rewind_core::ConnectionId) -> Controller<OneAxisSimulator> {
    let mut controller: Controller<OneAxisSimulator> =
        Controller::new(rewind_core::EntityId(1), ControllerConfig::default());
    controller.attach_simulator(OneAxisSimulator::new(10.0));
    controller.assign_connection(owner);
    let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
    controller.update_role(&ctx);
    assert_eq!(controller.role(), ControllerRole::LocalClient);
    controller
}

#[test]
fn scenario_1_perfect_prediction_no_reconcile() {
    let owner = rewind_core::ConnectionId(1);
    let mut controller = client_controller(owner);
    let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
    let mut transport = RecordingTransport::default();

    controller.simulate_local(&ctx, 100, TICK, &mut transport);
    let predicted = controller.transform().position.x;

    controller.receive_host_state(snapshot_at(100, predicted), TICK);

    assert_eq!(controller.visual_offset_magnitude(), 0.0);
    // Step 2 of reconcile clears history with tick <= T_S even on the happy path.
    assert_eq!(controller.input_history_len(), 0);
}

#[test]
fn scenario_2_small_misprediction_within_tolerance_no_replay() {
    let owner = rewind_core::ConnectionId(1);
    let mut controller = client_controller(owner);
    let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
    let mut transport = RecordingTransport::default();

    controller.simulate_local(&ctx, 100, TICK, &mut transport);
    let predicted = controller.transform().position.x;

    controller.receive_host_state(snapshot_at(100, predicted + 0.05), TICK);

    assert_eq!(controller.visual_offset_magnitude(), 0.0);
}

#[test]
fn scenario_3_hard_correction_replays_and_sets_offset() {
    let owner = rewind_core::ConnectionId(1);
    let mut controller = client_controller(owner);
    let mut transport = RecordingTransport::default();

    for tick in 101..=105 {
        let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
        controller.simulate_local(&ctx, tick, TICK, &mut transport);
    }
    let predicted_final = controller.transform().position.x;

    // A correction large enough to exceed ReconciliationTolerance (0.1) but
    // small enough to stay under MaxVisualOffset (2.0, see the clamp test
    // below), so this exercises the "set offset" branch, not the "snap".
    controller.receive_host_state(snapshot_at(103, predicted_final - 1.0), TICK);

    assert!(controller.visual_offset_magnitude() > 0.0);
    assert_ne!(controller.transform().position.x, predicted_final);
    assert_eq!(controller.input_history_len(), 2); // ticks 104, 105 replayed
}

#[test]
fn scenario_3_offset_clamped_when_too_large() {
    let owner = rewind_core::ConnectionId(1);
    let mut config = ControllerConfig::default();
    config.max_visual_offset = 2.0;
    let mut controller: Controller<OneAxisSimulator> = Controller::new(rewind_core::EntityId(1), config);
    controller.attach_simulator(OneAxisSimulator::new(10.0));
    controller.assign_connection(owner);
    let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
    controller.update_role(&ctx);
    let mut transport = RecordingTransport::default();

    controller.simulate_local(&ctx, 100, TICK, &mut transport);
    let predicted = controller.transform().position.x;

    controller.receive_host_state(snapshot_at(100, predicted - 100.0), TICK);

    assert_eq!(controller.visual_offset_magnitude(), 0.0); // snapped, not offset
}

#[test]
fn scenario_4_packet_loss_gap_fill() {
    let host_owner = rewind_core::ConnectionId(7);
    let mut host: Controller<OneAxisSimulator> = Controller::new(rewind_core::EntityId(1), ControllerConfig::default());
    host.attach_simulator(OneAxisSimulator::new(10.0));
    host.assign_connection(host_owner);
    let ctx = RuntimeContext::new(None, true, 0.0, TICK);
    host.update_role(&ctx);
    assert_eq!(host.role(), ControllerRole::ProxiedHost);

    // Establish server_tick = 101 by delivering and draining input 101 first.
    host.receive_client_input(ClientInputMessage {
        controller_id: host_owner,
        input: InputRecord { tick: 101, payload: 1.0 },
        previous_input: Some(InputRecord { tick: 100, payload: 1.0 }),
    });
    let mut transport = RecordingTransport::default();
    host.process_input_queue(&ctx, TICK, &mut transport);
    assert_eq!(host.server_tick(), 101);

    // Tick 102 is lost entirely; only 103 (with prev=102 unseen by us in
    // this direct-call test) arrives as a bare input.
    host.receive_client_input(ClientInputMessage {
        controller_id: host_owner,
        input: InputRecord { tick: 103, payload: 1.0 },
        previous_input: None,
    });
    let mut transport2 = RecordingTransport::default();
    host.process_input_queue(&ctx, TICK, &mut transport2);

    assert_eq!(host.server_tick(), 103);
    // One broadcast pair (owner + observers) for the consumed input 103;
    // the gap-fill tick 102 is silent bookkeeping, not its own send.
    assert_eq!(transport2.states.len(), 2);
}

#[test]
fn scenario_5_out_of_order_state_discarded() {
    let owner = rewind_core::ConnectionId(1);
    let mut controller = client_controller(owner);
    let mut transport = RecordingTransport::default();

    for tick in 101..=111 {
        let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
        controller.simulate_local(&ctx, tick, TICK, &mut transport);
    }
    let near_110 = controller.transform().position.x - 1.0;

    controller.receive_host_state(snapshot_at(110, near_110), TICK);
    assert_ne!(controller.visual_offset_magnitude(), 0.0); // the 110 correction did apply

    let post_110_offset = controller.visual_offset_magnitude();

    // Late snapshot for 108 must be ignored entirely (lastReconciledTick=110).
    controller.receive_host_state(snapshot_at(108, -999.0), TICK);
    assert_eq!(controller.visual_offset_magnitude(), post_110_offset);
}

#[test]
fn scenario_6_drift_triggers_resync() {
    let mut clock = Clock::new_client(ClockConfig::default());
    clock.update_server_tick(900, false);
    assert_eq!(clock.current_tick(), 902);

    for _ in 0..98 {
        clock.advance_tick();
    }
    assert_eq!(clock.current_tick(), 1000);

    clock.update_server_tick(950, false);
    // drift = 1000 - 950 = 50 > MaxTickDrift(30) => resync
    assert_eq!(clock.current_tick(), 952);
    assert_eq!(clock.accumulator(), 0.0);
}

#[test]
fn duplicate_snapshot_delivery_is_a_noop_after_first() {
    let owner = rewind_core::ConnectionId(1);
    let mut controller = client_controller(owner);
    let ctx = RuntimeContext::new(Some(owner), false, 0.0, TICK);
    let mut transport = RecordingTransport::default();
    controller.simulate_local(&ctx, 100, TICK, &mut transport);
    let predicted = controller.transform().position.x;

    controller.receive_host_state(snapshot_at(100, predicted - 50.0), TICK);
    let offset_after_first = controller.visual_offset_magnitude();
    let transform_after_first = controller.transform();

    controller.receive_host_state(snapshot_at(100, predicted - 50.0), TICK);
    assert_eq!(controller.visual_offset_magnitude(), offset_after_first);
    assert_eq!(controller.transform(), transform_after_first);
}

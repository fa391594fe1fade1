//! BDD step definitions for the engine lifecycle feature

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use traffic_shield::config::{default_devices, SimulatorConfig};
use traffic_shield::devices::DeviceRegistry;
use traffic_shield::engine::Engine;
use traffic_shield::state::new_state_handle;

use crate::world::TrafficShieldWorld;

#[given(expr = "an engine ticking every {int} ms")]
fn engine_ticking(world: &mut TrafficShieldWorld, interval_ms: u64) {
    let config = SimulatorConfig {
        tick_interval_ms: interval_ms,
        ..SimulatorConfig::default()
    };
    let state = new_state_handle(&config, DeviceRegistry::new(default_devices()), true);
    world.engine = Some(Arc::new(Engine::new(
        &config,
        state,
        CancellationToken::new(),
    )));
}

#[when(expr = "device {string} is selected")]
async fn device_selected(world: &mut TrafficShieldWorld, device_id: String) {
    let engine = Arc::clone(world.engine());
    {
        let state = engine.state().read().await;
        let ids: HashSet<u64> = state
            .simulator
            .readings
            .iter()
            .map(|r| r.id)
            .chain(state.simulator.ledger.iter().map(|r| r.id))
            .collect();
        world.ids_before_switch = Some(ids);
        world.ticks_before_idle = Some(state.ticks as usize);
    }
    if let Err(e) = engine.select_device(&device_id).await {
        world.last_error = Some(e.to_string());
    }
}

#[when("no device is selected")]
async fn no_device_selected(world: &mut TrafficShieldWorld) {
    let engine = Arc::clone(world.engine());
    engine.select_device("").await.expect("deselect failed");
    world.ticks_before_idle = Some(engine.state().read().await.ticks as usize);
}

#[when(expr = "{int} ms pass")]
async fn time_passes(_world: &mut TrafficShieldWorld, millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[when("the engine is stopped")]
async fn engine_stopped(world: &mut TrafficShieldWorld) {
    world.engine().stop().await;
}

#[then("the simulator should be connected")]
async fn is_connected(world: &mut TrafficShieldWorld) {
    assert!(world.engine().state().read().await.connected);
}

#[then("the simulator should not be connected")]
async fn is_not_connected(world: &mut TrafficShieldWorld) {
    assert!(!world.engine().state().read().await.connected);
}

#[then(expr = "the active device should be {string}")]
async fn active_device_is(world: &mut TrafficShieldWorld, device_id: String) {
    assert_eq!(world.engine().active_device().await, Some(device_id));
}

#[then("no device should be active")]
async fn no_active_device(world: &mut TrafficShieldWorld) {
    assert_eq!(world.engine().active_device().await, None);
}

#[then(expr = "readings should have been produced for {string}")]
async fn readings_for(world: &mut TrafficShieldWorld, device_id: String) {
    let state = world.engine().state().read().await;
    assert!(
        state
            .simulator
            .readings
            .iter()
            .any(|r| r.device_id == device_id),
        "no readings for '{}'",
        device_id
    );
}

#[then(expr = "every record added after the switch should belong to {string}")]
async fn records_after_switch(world: &mut TrafficShieldWorld, device_id: String) {
    let before = world
        .ids_before_switch
        .as_ref()
        .expect("no switch recorded")
        .clone();
    let state = world.engine().state().read().await;

    let new_readings: Vec<_> = state
        .simulator
        .readings
        .iter()
        .filter(|r| !before.contains(&r.id))
        .collect();
    assert!(!new_readings.is_empty(), "no readings after the switch");
    assert!(new_readings.iter().all(|r| r.device_id == device_id));
    assert!(state
        .simulator
        .ledger
        .iter()
        .filter(|r| !before.contains(&r.id))
        .all(|r| r.device_id == device_id));
}

#[then("no further readings should be produced")]
async fn no_further_readings(world: &mut TrafficShieldWorld) {
    let before = world.ticks_before_idle.expect("no idle point recorded");
    let ticks = world.engine().state().read().await.ticks as usize;
    assert_eq!(ticks, before);
}

#[then(expr = "the selection should fail with {string}")]
fn selection_failed(world: &mut TrafficShieldWorld, message: String) {
    let err = world.last_error.as_ref().expect("selection did not fail");
    assert_eq!(err, &message);
}

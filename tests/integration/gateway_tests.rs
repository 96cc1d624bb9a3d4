//! Runtime-level tests: commands arriving through the gateway queue,
//! scheduled activities and telemetry publishing, all on a simulated
//! clock.

use std::time::Duration;

use rgb_portal::app::commands::{CommandResponse, PortalCommand};
use rgb_portal::app::runtime::Runtime;
use rgb_portal::config::PortalConfig;
use rgb_portal::fsm::PortalMode;
use rgb_portal::adapters::http::respond;
use rgb_portal::gateway::channels::{CommandQueue, RESPONSE_TIMEOUT};
use rgb_portal::gateway::codec::route_for;
use rgb_portal::time::Millis;

use crate::mock_hw::{hardware_at, FixedRoll, MockBroker, MockHardware, MockNetwork, GREEN_ROLL};

type TestRuntime<'q> = Runtime<'q, MockHardware, FixedRoll, MockNetwork, MockBroker>;

fn runtime(queue: &CommandQueue, network: MockNetwork, broker: MockBroker) -> TestRuntime<'_> {
    Runtime::new(
        PortalConfig::default(),
        Millis(0),
        queue,
        hardware_at(200.0),
        FixedRoll(GREEN_ROLL),
        network,
        broker,
    )
    .unwrap()
}

fn online() -> (MockNetwork, MockBroker) {
    (
        MockNetwork {
            up: true,
            reachable: true,
            attempts: 0,
        },
        MockBroker {
            up: true,
            reachable: true,
            published: Vec::new(),
        },
    )
}

/// Submit, let the loop run at `now`, and collect the answer.
fn roundtrip(rt: &mut TestRuntime<'_>, q: &CommandQueue, cmd: PortalCommand, now: u32) -> CommandResponse {
    let id = q.submit(cmd, RESPONSE_TIMEOUT).unwrap();
    rt.run_once(Millis(now));
    q.await_response(id, Duration::ZERO).unwrap()
}

#[test]
fn queued_commands_are_answered_by_the_loop() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    assert_eq!(
        roundtrip(&mut rt, &q, PortalCommand::Toggle, 10),
        CommandResponse::Applied(PortalMode::RedSequence)
    );
    assert_eq!(
        roundtrip(&mut rt, &q, PortalCommand::GetState, 20),
        CommandResponse::State(PortalMode::RedSequence)
    );
    assert_eq!(rt.service().mode(), PortalMode::RedSequence);
}

#[test]
fn answers_render_as_gateway_json() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    let r = roundtrip(&mut rt, &q, PortalCommand::TriggerGreen, 10);
    assert_eq!(r.to_json(), r#"{"status":"ok","state":3}"#);
    assert_eq!(route_for(PortalCommand::TriggerGreen), "/green");

    rt.hw_mut().ranger_mut().distance = Some(30.0);
    let r = roundtrip(&mut rt, &q, PortalCommand::GetDistance, 20);
    assert_eq!(
        r.to_json(),
        r#"{"distance":30.0,"unit":"cm","inRange":true,"personDetected":true}"#
    );
}

#[test]
fn scheduled_activities_drive_strip_and_sensor() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    assert_eq!(rt.run_once(Millis(0)), 0);
    // Sensor at 50, animation at 75, both at 150.
    assert_eq!(rt.run_once(Millis(50)), 1);
    assert_eq!(rt.run_once(Millis(75)), 1);
    assert_eq!(rt.run_once(Millis(150)), 2);
    assert_eq!(rt.hw().strip().frames, 2);
    assert_eq!(rt.hw().strip().last.len(), 140);
    assert_eq!(rt.idle_budget(Millis(150)), 50);
}

#[test]
fn mode_changes_are_published_while_connected() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    roundtrip(&mut rt, &q, PortalCommand::TriggerRed, 10);
    roundtrip(&mut rt, &q, PortalCommand::TriggerGreen, 20);
    roundtrip(&mut rt, &q, PortalCommand::Reset, 30);
    // Rejected override: no change, no publish.
    roundtrip(&mut rt, &q, PortalCommand::Reset, 40);

    assert_eq!(rt.telemetry().payloads(), vec!["1", "2", "3", "1"]);
    assert!(rt
        .telemetry()
        .published
        .iter()
        .all(|(topic, _)| topic == "portal/state"));
}

#[test]
fn reconnect_publishes_current_mode() {
    let q = CommandQueue::new();
    let mut rt = runtime(&q, MockNetwork::default(), MockBroker::default());

    roundtrip(&mut rt, &q, PortalCommand::TriggerRed, 10);
    assert!(rt.telemetry().published.is_empty());

    // First maintenance pass: network still unreachable.
    rt.run_once(Millis(5000));
    assert!(!rt.links().network_up);

    rt.network_mut().reachable = true;
    rt.telemetry_mut().reachable = true;
    rt.run_once(Millis(10_000));
    let links = rt.links();
    assert!(links.network_up && links.telemetry_up);
    assert_eq!(rt.telemetry().payloads(), vec!["2"]);

    roundtrip(&mut rt, &q, PortalCommand::TriggerGreen, 10_010);
    assert_eq!(rt.telemetry().payloads(), vec!["2", "3"]);
}

#[test]
fn trigger_red_while_green_reports_green() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    roundtrip(&mut rt, &q, PortalCommand::TriggerGreen, 10);
    let r = roundtrip(&mut rt, &q, PortalCommand::TriggerRed, 20);
    assert_eq!(r, CommandResponse::Applied(PortalMode::GreenSequence));
    assert_eq!(r.to_json(), r#"{"status":"ok","state":3}"#);
    // Start-up publish, then green only.
    assert_eq!(rt.telemetry().payloads(), vec!["1", "3"]);
}

#[test]
fn timed_out_request_never_changes_mode() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    // Nothing drains while the handler waits.
    let (status, _) = respond("/toggle", &q, Duration::from_millis(5));
    assert_eq!(status, 503);

    assert_eq!(rt.run_once(Millis(10)), 0);
    assert_eq!(rt.service().mode(), PortalMode::Idle);
    assert_eq!(rt.telemetry().payloads(), vec!["1"]);
}

#[test]
fn loop_keeps_running_with_links_down() {
    let q = CommandQueue::new();
    let mut rt = runtime(&q, MockNetwork::default(), MockBroker::default());
    for t in (0..=12_000).step_by(25) {
        rt.run_once(Millis(t));
    }
    assert!(rt.hw().strip().frames >= 150);
    assert_eq!(rt.links(), Default::default());
    assert_eq!(
        roundtrip(&mut rt, &q, PortalCommand::Toggle, 12_010),
        CommandResponse::Applied(PortalMode::RedSequence)
    );
}

#[test]
fn handler_thread_round_trip() {
    let q = CommandQueue::new();
    let (net, broker) = online();
    let mut rt = runtime(&q, net, broker);

    std::thread::scope(|s| {
        let handler = s.spawn(|| q.request(PortalCommand::TriggerGreen, Duration::from_secs(5)));
        let mut now = 0;
        while !handler.is_finished() {
            now += 5;
            rt.run_once(Millis(now));
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(
            handler.join().unwrap(),
            Ok(CommandResponse::Applied(PortalMode::GreenSequence))
        );
    });
    assert_eq!(rt.service().mode(), PortalMode::GreenSequence);
}

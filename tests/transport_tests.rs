//! Integration tests for the bit-level transport: transmit waveform,
//! receiver state machine, timeout and recovery behavior.

use opentherm_rs::{
    response_edges, BusRole, BusStatus, Clock, DataId, ExchangeStatus, Frame, LineLevel,
    MessageType, OpenThermBus, OpenThermError, SimulatedClock, SimulatedLine,
};

fn master_bus() -> (
    OpenThermBus<SimulatedLine, SimulatedClock>,
    SimulatedLine,
    SimulatedClock,
) {
    let clock = SimulatedClock::new();
    let line = SimulatedLine::new(clock.clone());
    let mut bus = OpenThermBus::new(line.clone(), clock.clone(), BusRole::Master);
    bus.begin();
    line.clear();
    (bus, line, clock)
}

/// Feed a complete well-timed reply into the receiver, starting shortly
/// after now, then advance past its last edge.
fn inject_reply(bus: &OpenThermBus<SimulatedLine, SimulatedClock>, clock: &SimulatedClock, reply: Frame) {
    let handle = bus.edge_handle();
    let start = clock.now_micros() + 20_000;
    let mut last = start;
    for (at, level) in response_edges(reply, start) {
        handle.on_edge(level, at);
        last = at;
    }
    let now = clock.now_micros();
    if last > now {
        clock.advance(last - now + 1_000);
    }
}

/// Let the Delay state expire so the bus settles back to Ready
fn settle(bus: &mut OpenThermBus<SimulatedLine, SimulatedClock>, clock: &SimulatedClock) {
    clock.advance(100_001);
    bus.process();
    assert!(bus.is_ready());
}

#[test]
fn begin_transitions_to_ready() {
    let clock = SimulatedClock::new();
    let line = SimulatedLine::new(clock.clone());
    let mut bus = OpenThermBus::new(line, clock.clone(), BusRole::Master);
    assert_eq!(bus.status(), BusStatus::NotInitialized);
    bus.begin();
    assert_eq!(bus.status(), BusStatus::Ready);
    // The activation delay ran on the clock
    assert!(clock.now_micros() >= 1_000_000);
}

#[test]
fn request_rejected_before_begin() {
    let clock = SimulatedClock::new();
    let line = SimulatedLine::new(clock.clone());
    let mut bus = OpenThermBus::new(line, clock, BusRole::Master);
    let err = bus
        .send_request_async(Frame::read_request(DataId::Tboiler))
        .unwrap_err();
    assert!(matches!(err, OpenThermError::NotInitialized));
}

#[test]
fn transmit_waveform_shape() {
    let (mut bus, line, _clock) = master_bus();
    bus.send_request_async(Frame::build(MessageType::ReadData, DataId::Status, 0))
        .unwrap();

    let transitions = line.transitions();
    // 34 bits (start + 32 + stop) at two transitions each, plus the final
    // return to idle.
    assert_eq!(transitions.len(), 69);
    // Start bit: active first, idle at the half-bit boundary
    assert_eq!(transitions[0].level, LineLevel::Low);
    assert_eq!(transitions[1].level, LineLevel::High);
    assert_eq!(transitions[1].at_micros - transitions[0].at_micros, 500);
    // The line ends idle
    assert_eq!(transitions.last().unwrap().level, LineLevel::High);
    // Whole frame spans 34 ms of bit cells
    assert_eq!(
        transitions[68].at_micros - transitions[0].at_micros,
        34 * 1000
    );
    assert_eq!(bus.status(), BusStatus::ResponseWaiting);
}

#[test]
fn successful_exchange_roundtrip() {
    let (mut bus, _line, clock) = master_bus();
    let request = Frame::read_request(DataId::Tboiler);
    let reply = Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800);

    bus.send_request_async(request).unwrap();
    inject_reply(&bus, &clock, reply);

    let (frame, outcome) = bus.process().expect("exchange should complete");
    assert_eq!(outcome, ExchangeStatus::Success);
    assert_eq!(frame, reply);
    assert_eq!(frame.f88(), 40.0);

    // The bus holds the inter-frame delay before accepting the next request
    assert_eq!(bus.status(), BusStatus::Delay);
    assert!(matches!(
        bus.send_request_async(request).unwrap_err(),
        OpenThermError::BusNotReady
    ));
    settle(&mut bus, &clock);
}

#[test]
fn timeout_restores_ready_immediately() {
    let (mut bus, _line, clock) = master_bus();
    bus.send_request_async(Frame::read_request(DataId::Tret))
        .unwrap();

    // Just under the timeout: still waiting
    clock.advance(999_000);
    assert!(bus.process().is_none());
    assert_eq!(bus.status(), BusStatus::ResponseWaiting);

    clock.advance(2_000);
    let (_, outcome) = bus.process().expect("timeout should complete the exchange");
    assert_eq!(outcome, ExchangeStatus::Timeout);
    // No inter-frame delay after a timeout; the caller may retry at once
    assert!(bus.is_ready());
    assert!(bus.send_request_async(Frame::read_request(DataId::Tret)).is_ok());
}

#[test]
fn parity_flip_yields_invalid_then_recovers() {
    let (mut bus, _line, clock) = master_bus();
    let request = Frame::read_request(DataId::Tboiler);
    let reply = Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800);
    let corrupted = Frame::from_raw(reply.raw() ^ 0x0000_0001);

    bus.send_request_async(request).unwrap();
    inject_reply(&bus, &clock, corrupted);

    let (frame, outcome) = bus.process().expect("exchange should complete");
    assert_eq!(outcome, ExchangeStatus::Invalid);
    assert_eq!(frame, corrupted);

    // No stuck state: after the inter-frame delay the next exchange works
    settle(&mut bus, &clock);
    bus.send_request_async(request).unwrap();
    inject_reply(&bus, &clock, reply);
    let (_, outcome) = bus.process().unwrap();
    assert_eq!(outcome, ExchangeStatus::Success);
}

#[test]
fn ack_with_wrong_type_is_invalid_for_master() {
    let (mut bus, _line, clock) = master_bus();
    bus.send_request_async(Frame::read_request(DataId::Tboiler))
        .unwrap();
    // Parity-correct, but READ_DATA is not an acknowledgement
    inject_reply(
        &bus,
        &clock,
        Frame::build(MessageType::ReadData, DataId::Tboiler, 0x2800),
    );
    let (_, outcome) = bus.process().unwrap();
    assert_eq!(outcome, ExchangeStatus::Invalid);
}

#[test]
fn malformed_start_bit_marks_invalid() {
    let (mut bus, _line, clock) = master_bus();
    bus.send_request_async(Frame::read_request(DataId::Tboiler))
        .unwrap();

    // A falling edge while waiting for the rising start edge is a framing
    // error.
    let handle = bus.edge_handle();
    handle.on_edge(LineLevel::Low, clock.now_micros() + 10_000);
    clock.advance(20_000);

    let (_, outcome) = bus.process().unwrap();
    assert_eq!(outcome, ExchangeStatus::Invalid);
}

#[test]
fn boundary_edges_are_ignored() {
    let (mut bus, _line, clock) = master_bus();
    let reply = Frame::build(MessageType::ReadAck, DataId::RelModLevel, 0x4B00);
    bus.send_request_async(Frame::read_request(DataId::RelModLevel))
        .unwrap();

    // Interleave cell-boundary transitions (500 µs after each accepted edge)
    // between the meaningful mid-bit edges; the receiver must skip them.
    let handle = bus.edge_handle();
    let start = clock.now_micros() + 20_000;
    let edges = response_edges(reply, start);
    let mut last = start;
    for window in edges.windows(2) {
        let (at, level) = window[0];
        handle.on_edge(level, at);
        let (next_at, next_level) = window[1];
        if next_at - at == 1000 {
            let boundary_level = match next_level {
                LineLevel::Low => LineLevel::High,
                LineLevel::High => LineLevel::Low,
            };
            handle.on_edge(boundary_level, at + 500);
        }
        last = next_at;
    }
    let (at, level) = *edges.last().unwrap();
    handle.on_edge(level, at);
    clock.advance(last - clock.now_micros() + 1_000);

    let (frame, outcome) = bus.process().unwrap();
    assert_eq!(outcome, ExchangeStatus::Success);
    assert_eq!(frame, reply);
}

#[test]
fn blocking_send_request_times_out() {
    let (mut bus, _line, clock) = master_bus();
    let before = clock.now_micros();
    let err = bus
        .send_request(Frame::read_request(DataId::Tboiler))
        .unwrap_err();
    assert!(matches!(err, OpenThermError::ResponseTimeout));
    // The blocking call spun for the full response timeout
    assert!(clock.now_micros() - before >= 1_000_000);
    assert!(bus.is_ready());
}

#[test]
fn slave_receives_request_and_responds() {
    let clock = SimulatedClock::new();
    let line = SimulatedLine::new(clock.clone());
    let mut bus = OpenThermBus::new(line.clone(), clock.clone(), BusRole::Slave);
    bus.begin();
    line.clear();

    // A rising edge while Ready arms the slave receiver
    let request = Frame::build(MessageType::WriteData, DataId::TSet, 0x3200);
    inject_reply(&bus, &clock, request);

    let (frame, outcome) = bus.process().expect("request should complete");
    assert_eq!(outcome, ExchangeStatus::Success);
    assert_eq!(frame, request);

    settle(&mut bus, &clock);

    // Send-only reply path returns to Ready without arming the receiver
    let ack = Frame::build(MessageType::WriteAck, DataId::TSet, 0x3200);
    bus.send_response(ack).unwrap();
    assert!(bus.is_ready());
    assert_eq!(line.transitions().len(), 69);
}

#[test]
fn slave_rejects_ack_frames_as_requests() {
    let clock = SimulatedClock::new();
    let line = SimulatedLine::new(clock.clone());
    let mut bus = OpenThermBus::new(line, clock.clone(), BusRole::Slave);
    bus.begin();

    inject_reply(
        &bus,
        &clock,
        Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800),
    );
    let (_, outcome) = bus.process().unwrap();
    assert_eq!(outcome, ExchangeStatus::Invalid);
}

#[test]
fn exchange_callback_sees_every_outcome() {
    use std::sync::{Arc, Mutex};

    let (mut bus, _line, clock) = master_bus();
    let outcomes: Arc<Mutex<Vec<ExchangeStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);
    bus.set_exchange_callback(Box::new(move |_, outcome| {
        sink.lock().unwrap().push(outcome);
    }));

    // Success
    bus.send_request_async(Frame::read_request(DataId::Tboiler))
        .unwrap();
    inject_reply(
        &bus,
        &clock,
        Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800),
    );
    bus.process();
    settle(&mut bus, &clock);

    // Timeout
    bus.send_request_async(Frame::read_request(DataId::Tret))
        .unwrap();
    clock.advance(1_000_001);
    bus.process();

    assert_eq!(
        *outcomes.lock().unwrap(),
        vec![ExchangeStatus::Success, ExchangeStatus::Timeout]
    );
}

#[test]
fn stats_track_exchange_outcomes() {
    let (mut bus, _line, clock) = master_bus();

    bus.send_request_async(Frame::read_request(DataId::Tboiler))
        .unwrap();
    inject_reply(
        &bus,
        &clock,
        Frame::build(MessageType::ReadAck, DataId::Tboiler, 0x2800),
    );
    bus.process();
    settle(&mut bus, &clock);

    bus.send_request_async(Frame::read_request(DataId::Tret))
        .unwrap();
    clock.advance(1_000_001);
    bus.process();

    let stats = bus.stats();
    assert_eq!(stats.requests_sent, 2);
    assert_eq!(stats.responses_ok, 1);
    assert_eq!(stats.timeouts, 1);
    assert_eq!(stats.invalid_frames, 0);
    assert_eq!(stats.success_rate(), 0.5);
}

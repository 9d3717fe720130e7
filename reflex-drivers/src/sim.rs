//! Simulated TWI peripheral
//!
//! [`SimTwi`] implements [`TwiRegisters`] against a scripted bus so the
//! bus master and the display driver can be exercised on the host. Every
//! bus event is appended to an event log; peers acknowledge everything
//! unless a fault has been injected.
//!
//! ```ignore
//! let mut sim = SimTwi::new();
//! sim.nack_address_cycle(1);
//! let mut bus = TwiMaster::new(&mut sim, TwiConfig::UNO_STANDARD);
//! ```

use embedded_hal::delay::DelayNs;
use heapless::{Deque, Vec};
use reflex_hal::twi::status;
use reflex_hal::{ClockDivisor, Direction, TwiAction, TwiRegisters};

/// Maximum number of logged bus events
pub const EVENT_CAPACITY: usize = 512;

/// Maximum payload bytes captured per frame
pub const FRAME_CAPACITY: usize = 32;

/// Maximum number of frames returned by [`SimTwi::frames`]
pub const MAX_FRAMES: usize = 64;

/// Maximum number of queued read bytes
pub const READ_CAPACITY: usize = 32;

/// Byte returned by a read when nothing is queued (idle bus lines are high)
pub const IDLE_READ: u8 = 0xFF;

/// One observed bus event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Peripheral disabled (control register cleared)
    Disable,
    /// Start or repeated start condition
    Start,
    /// Address byte, including the direction bit
    Address(u8),
    /// Data byte sent by the master
    Write(u8),
    /// Data byte received by the master
    Read { byte: u8, ack: bool },
    /// Stop condition
    Stop,
}

/// Data bytes sent in one addressed write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Address byte of the frame
    pub address: u8,
    /// Data bytes in the order they were sent
    pub bytes: Vec<u8, FRAME_CAPACITY>,
}

/// Scripted TWI register block
#[derive(Debug, Default)]
pub struct SimTwi {
    events: Vec<BusEvent, EVENT_CAPACITY>,
    divisor: Option<ClockDivisor>,
    status: u8,
    data: u8,
    complete: bool,
    in_transaction: bool,
    expecting_address: bool,
    address_cycles: usize,
    data_writes: usize,
    pending_events: usize,
    polls: u32,
    rx: Deque<u8, READ_CAPACITY>,

    fail_start: bool,
    swap_address_acks: bool,
    nack_address: Option<usize>,
    nack_data: Option<usize>,
    stall_from: Option<usize>,
}

impl SimTwi {
    /// Idle bus with cooperative peers
    pub fn new() -> Self {
        Self {
            status: status::NO_INFO,
            ..Self::default()
        }
    }

    /// Report a bus error instead of a start condition
    pub fn fail_start(&mut self) {
        self.fail_start = true;
    }

    /// NACK the `index`-th address cycle (0-based, counted over the whole run)
    pub fn nack_address_cycle(&mut self, index: usize) {
        self.nack_address = Some(index);
    }

    /// NACK the `index`-th transmitted data byte (0-based, whole run)
    pub fn nack_data_byte(&mut self, index: usize) {
        self.nack_data = Some(index);
    }

    /// Acknowledge address cycles with the status code of the opposite
    /// direction
    pub fn swap_address_acks(&mut self) {
        self.swap_address_acks = true;
    }

    /// Never raise the event-complete flag from the `index`-th bus event on
    ///
    /// Bus events are start, address, data and receive cycles (0-based).
    pub fn stall_from_event(&mut self, index: usize) {
        self.stall_from = Some(index);
    }

    /// Queue bytes returned by subsequent reads
    ///
    /// Bytes that do not fit are dropped.
    pub fn queue_read(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.rx.push_back(byte).is_err() {
                break;
            }
        }
    }

    /// Every logged event in order
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget logged events and counters, keeping injected faults
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.address_cycles = 0;
        self.data_writes = 0;
        self.pending_events = 0;
        self.polls = 0;
    }

    /// Last clock divisor programmed, if any
    pub fn divisor(&self) -> Option<ClockDivisor> {
        self.divisor
    }

    /// No start is outstanding without a matching stop
    pub fn is_idle(&self) -> bool {
        !self.in_transaction
    }

    /// Number of address cycles seen
    pub fn address_cycles(&self) -> usize {
        self.address_cycles
    }

    /// Number of data bytes transmitted by the master
    pub fn data_writes(&self) -> usize {
        self.data_writes
    }

    /// Number of times the event-complete flag was polled
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Written payloads grouped by address cycle
    ///
    /// A frame is opened by each address byte and collects the data bytes
    /// that follow it. Frames past [`MAX_FRAMES`] are dropped.
    pub fn frames(&self) -> Vec<Frame, MAX_FRAMES> {
        let mut frames: Vec<Frame, MAX_FRAMES> = Vec::new();
        let mut open = false;

        for event in &self.events {
            match *event {
                BusEvent::Address(address) => {
                    open = frames
                        .push(Frame {
                            address,
                            bytes: Vec::new(),
                        })
                        .is_ok();
                }
                BusEvent::Write(byte) if open => {
                    if let Some(frame) = frames.last_mut() {
                        let _ = frame.bytes.push(byte);
                    }
                }
                _ => {}
            }
        }
        frames
    }

    /// Data payloads of every frame sent to the given address byte
    pub fn payloads_to(&self, address: u8) -> Vec<Vec<u8, FRAME_CAPACITY>, MAX_FRAMES> {
        let mut payloads = Vec::new();
        for frame in self.frames() {
            if frame.address == address && payloads.push(frame.bytes).is_err() {
                break;
            }
        }
        payloads
    }

    fn log(&mut self, event: BusEvent) {
        // A full log keeps its oldest events
        let _ = self.events.push(event);
    }

    /// Finish a bus event, unless stalled
    fn settle(&mut self, status: u8) {
        let index = self.pending_events;
        self.pending_events += 1;
        self.status = status;
        self.complete = match self.stall_from {
            Some(from) => index < from,
            None => true,
        };
    }

    fn address_status(&self, direction: Direction, nack: bool) -> u8 {
        let direction = match (direction, self.swap_address_acks) {
            (Direction::Write, true) => Direction::Read,
            (Direction::Read, true) => Direction::Write,
            (direction, false) => direction,
        };
        match (direction, nack) {
            (Direction::Write, false) => status::MT_SLA_ACK,
            (Direction::Write, true) => status::MT_SLA_NACK,
            (Direction::Read, false) => status::MR_SLA_ACK,
            (Direction::Read, true) => status::MR_SLA_NACK,
        }
    }

    fn receive(&mut self, ack: bool) {
        let byte = self.rx.pop_front().unwrap_or(IDLE_READ);
        self.data = byte;
        self.log(BusEvent::Read { byte, ack });
        self.settle(if ack {
            status::MR_DATA_ACK
        } else {
            status::MR_DATA_NACK
        });
    }
}

impl TwiRegisters for SimTwi {
    fn set_clock(&mut self, divisor: ClockDivisor) {
        self.divisor = Some(divisor);
    }

    fn trigger(&mut self, action: TwiAction) {
        match action {
            TwiAction::Disable => {
                self.log(BusEvent::Disable);
                self.complete = false;
                self.status = status::NO_INFO;
            }
            TwiAction::Start => {
                self.log(BusEvent::Start);
                let status = if self.fail_start {
                    status::BUS_ERROR
                } else if self.in_transaction {
                    status::REP_START
                } else {
                    status::START
                };
                self.in_transaction = true;
                self.expecting_address = true;
                self.settle(status);
            }
            TwiAction::Transmit if self.expecting_address => {
                let byte = self.data;
                self.log(BusEvent::Address(byte));
                let direction = if byte & 1 == 0 {
                    Direction::Write
                } else {
                    Direction::Read
                };
                let nack = self.nack_address == Some(self.address_cycles);
                self.address_cycles += 1;
                self.expecting_address = false;
                let status = self.address_status(direction, nack);
                self.settle(status);
            }
            TwiAction::Transmit => {
                let byte = self.data;
                self.log(BusEvent::Write(byte));
                let nack = self.nack_data == Some(self.data_writes);
                self.data_writes += 1;
                self.settle(if nack {
                    status::MT_DATA_NACK
                } else {
                    status::MT_DATA_ACK
                });
            }
            TwiAction::ReceiveAck => self.receive(true),
            TwiAction::ReceiveNack => self.receive(false),
            TwiAction::Stop => {
                self.log(BusEvent::Stop);
                self.in_transaction = false;
                self.expecting_address = false;
                // The flag is not raised after a stop
                self.complete = false;
                self.status = status::NO_INFO;
            }
        }
    }

    fn event_complete(&mut self) -> bool {
        self.polls = self.polls.saturating_add(1);
        self.complete
    }

    fn status(&mut self) -> u8 {
        self.status
    }

    fn write_data(&mut self, byte: u8) {
        self.data = byte;
    }

    fn read_data(&mut self) -> u8 {
        self.data
    }
}

/// Maximum number of recorded delays
pub const DELAY_CAPACITY: usize = 64;

/// Delay provider that records requested waits instead of sleeping
///
/// Durations are recorded in microseconds, rounded up.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    waits: Vec<u32, DELAY_CAPACITY>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded waits in microseconds, in call order
    pub fn waits(&self) -> &[u32] {
        &self.waits
    }

    /// Sum of every recorded wait in microseconds
    pub fn total_us(&self) -> u64 {
        self.waits.iter().map(|&us| u64::from(us)).sum()
    }

    /// Forget recorded waits
    pub fn clear(&mut self) {
        self.waits.clear();
    }

    fn record(&mut self, us: u32) {
        let _ = self.waits.push(us);
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.record(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(ms.saturating_mul(1_000));
    }
}

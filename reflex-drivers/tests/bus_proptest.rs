//! Property-based tests for the bus master.
//! Runs the master against the simulated peripheral with injected faults.

use embedded_hal::i2c::I2c;
use proptest::prelude::*;
use reflex_core::config::TwiConfig;
use reflex_drivers::bus::TwiMaster;
use reflex_drivers::sim::{BusEvent, SimTwi};
use reflex_hal::twi::status;
use reflex_hal::{Address, BusError, BusStage, Direction, I2cBus};

const POLL_LIMIT: u32 = 16;

fn master(sim: &mut SimTwi) -> TwiMaster<&mut SimTwi> {
    TwiMaster::new(sim, TwiConfig::UNO_STANDARD.with_poll_limit(POLL_LIMIT))
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Write), Just(Direction::Read)]
}

proptest! {
    /// A cooperative bus delivers every byte in one frame and ends idle.
    #[test]
    fn transmit_delivers_all_bytes(
        address in 0u8..=0x7F,
        bytes in proptest::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut sim = SimTwi::new();
        let address = Address::new(address).unwrap();
        master(&mut sim).transmit_many(address, &bytes).unwrap();

        let frames = sim.frames();
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].address, address.with_direction(Direction::Write));
        prop_assert_eq!(&frames[0].bytes[..], &bytes[..]);
        prop_assert!(sim.is_idle());
        prop_assert_eq!(sim.events().last(), Some(&BusEvent::Stop));
    }

    /// A NACK on byte N fails the write and byte N+1 is never attempted.
    #[test]
    fn write_stops_at_first_nack(
        bytes in proptest::collection::vec(any::<u8>(), 1..32),
        fail in any::<prop::sample::Index>(),
    ) {
        let fail = fail.index(bytes.len());
        let mut sim = SimTwi::new();
        sim.nack_data_byte(fail);

        let result = master(&mut sim).transmit_many(Address::fixed(0x3E), &bytes);
        prop_assert_eq!(
            result,
            Err(BusError::Status { stage: BusStage::Data, status: status::MT_DATA_NACK })
        );
        prop_assert_eq!(sim.data_writes(), fail + 1);
        prop_assert_eq!(&sim.frames()[0].bytes[..], &bytes[..=fail]);
        prop_assert!(sim.is_idle());
    }

    /// A failed start never puts an address byte on the bus.
    #[test]
    fn start_failure_sends_nothing(
        bytes in proptest::collection::vec(any::<u8>(), 0..8),
    ) {
        let mut sim = SimTwi::new();
        sim.fail_start();

        let result = master(&mut sim).transmit_many(Address::fixed(0x62), &bytes);
        prop_assert!(
            matches!(result, Err(BusError::Status { stage: BusStage::Start, .. })),
            "unexpected result {:?}",
            result
        );
        prop_assert_eq!(sim.address_cycles(), 0);
        prop_assert_eq!(sim.data_writes(), 0);
        prop_assert!(sim.is_idle());
    }

    /// The address acknowledgement must match the requested direction.
    #[test]
    fn address_ack_checked_per_direction(
        address in 0u8..=0x7F,
        direction in direction(),
        swapped in any::<bool>(),
    ) {
        let mut sim = SimTwi::new();
        if swapped {
            sim.swap_address_acks();
        }

        let address = Address::new(address).unwrap();
        let result = master(&mut sim).begin_transaction(address, direction);
        if swapped {
            prop_assert!(
                matches!(result, Err(BusError::Status { stage: BusStage::Address(d), .. }) if d == direction),
                "unexpected result {:?}",
                result
            );
        } else {
            prop_assert_eq!(result, Ok(()));
        }
    }

    /// A stalled event flag times out within the poll budget, and the
    /// transmit still ends with a stop.
    #[test]
    fn stalled_bus_times_out(
        bytes in proptest::collection::vec(any::<u8>(), 0..8),
        stall in any::<prop::sample::Index>(),
    ) {
        // Start, address, then one event per byte
        let events = bytes.len() + 2;
        let stall = stall.index(events);
        let mut sim = SimTwi::new();
        sim.stall_from_event(stall);

        let result = master(&mut sim).transmit_many(Address::fixed(0x3E), &bytes);
        prop_assert!(
            matches!(result, Err(BusError::Timeout { .. })),
            "unexpected result {:?}",
            result
        );
        prop_assert_eq!(sim.polls(), stall as u32 + POLL_LIMIT);
        prop_assert_eq!(sim.events().last(), Some(&BusEvent::Stop));
        prop_assert!(sim.is_idle());
    }

    /// Every received byte is acknowledged except the last.
    #[test]
    fn read_nacks_only_last_byte(
        data in proptest::collection::vec(any::<u8>(), 1..16),
    ) {
        let mut sim = SimTwi::new();
        sim.queue_read(&data);

        let mut buf = vec![0u8; data.len()];
        master(&mut sim).read(0x3E, &mut buf).unwrap();
        prop_assert_eq!(&buf, &data);

        let acks: Vec<bool> = sim
            .events()
            .iter()
            .filter_map(|e| match e {
                BusEvent::Read { ack, .. } => Some(*ack),
                _ => None,
            })
            .collect();
        prop_assert_eq!(acks.len(), data.len());
        prop_assert!(acks[..data.len() - 1].iter().all(|&ack| ack));
        prop_assert!(!acks[data.len() - 1]);
        prop_assert!(sim.is_idle());
    }
}

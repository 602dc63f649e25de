//! Unit tests for fleet-messages.

#[cfg(test)]
mod bus {
    use fleet_core::{Coord, StationId, VehicleId};
    use crate::{Endpoint, Message, MessageBus, VehicleStatus};

    fn status(vehicle_id: VehicleId, tick: u64) -> Message {
        Message::StatusUpdate {
            vehicle_id,
            coord: Coord::new(0, 0),
            battery: 50.0,
            state: VehicleStatus::Idle,
            tick,
        }
    }

    #[test]
    fn drain_orders_by_sender_then_emission() {
        let mut bus = MessageBus::new();
        // Emit out of sender order: vehicle 2, then 0, then 1.
        bus.send(
            Endpoint::Vehicle(VehicleId(2)),
            Endpoint::Orchestrator,
            status(VehicleId(2), 0),
        );
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), 0),
        );
        bus.send(
            Endpoint::Vehicle(VehicleId(1)),
            Endpoint::Orchestrator,
            status(VehicleId(1), 0),
        );

        let drained = bus.drain(Endpoint::Orchestrator);
        let ids: Vec<_> = drained.iter().map(|m| m.vehicle_id()).collect();
        assert_eq!(ids, vec![VehicleId(0), VehicleId(1), VehicleId(2)]);
    }

    #[test]
    fn same_sender_preserves_emission_order() {
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), 1),
        );
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), 2),
        );
        let drained = bus.drain(Endpoint::Orchestrator);
        let ticks: Vec<_> = drained
            .iter()
            .map(|m| match m {
                Message::StatusUpdate { tick, .. } => *tick,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(ticks, vec![1, 2]);
    }

    #[test]
    fn drain_empty_inbox_returns_empty() {
        let mut bus = MessageBus::new();
        assert!(bus.drain(Endpoint::Vehicle(VehicleId(0))).is_empty());
    }

    #[test]
    fn drain_removes_messages() {
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Orchestrator,
            Endpoint::Vehicle(VehicleId(0)),
            Message::Assignment {
                vehicle_id: VehicleId(0),
                station_id: StationId(0),
                station_coord: Coord::new(1, 1),
                queue_pos: 0,
                priority: 0,
            },
        );
        assert_eq!(bus.drain(Endpoint::Vehicle(VehicleId(0))).len(), 1);
        assert!(bus.drain(Endpoint::Vehicle(VehicleId(0))).is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut bus = MessageBus::new();
        bus.send(
            Endpoint::Vehicle(VehicleId(0)),
            Endpoint::Orchestrator,
            status(VehicleId(0), 0),
        );
        bus.reset();
        assert!(bus.drain(Endpoint::Orchestrator).is_empty());
    }
}

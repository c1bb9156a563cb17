//! Semantic records built from decoded packets.
//!
//! Records are the only values that leave the decoder: raw fixed-point
//! magnitudes are scaled to volts, amps and degrees Celsius, unpopulated slots
//! are dropped, and every record carries the wall-clock time its frame was
//! decoded.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::protocols::mdp::layout::{DECI_SCALE, MILLI_SCALE};
use crate::protocols::mdp::{
    ChannelSlot, LoadMode, MachineType, SampleGroup, StructuralPacket, SupplyMode,
    SynthesizePayload, WavePayload,
};

/// A decoded telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Synthesize(SynthesizeSnapshot),
    Wave(WaveformBurst),
}

/// Populated channels of one synthesize frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizeSnapshot {
    /// Channel selected on the controller when the frame was sent.
    pub active_channel: u8,
    pub channels: Vec<ChannelSnapshot>,
}

/// Scaled readings of one populated slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Slot position within the frame (0..=5).
    pub channel_index: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    /// Degrees Celsius.
    pub temperature: f64,
    pub out_voltage: f64,
    pub out_current: f64,
    pub in_voltage: f64,
    pub in_current: f64,
    pub set_voltage: f64,
    pub set_current: f64,
    pub online: bool,
    pub locked: bool,
    pub output_enabled: bool,
    pub machine_type: MachineType,
    pub error_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_mode: Option<LoadMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_mode: Option<SupplyMode>,
}

impl ChannelSnapshot {
    /// Output power in watts.
    pub fn output_power(&self) -> f64 {
        self.out_voltage * self.out_current
    }

    pub fn has_error(&self) -> bool {
        self.error_code != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformBurst {
    pub active_channel: u8,
    pub groups: Vec<WaveformGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveformGroup {
    /// Device tick count.
    pub timestamp: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    pub items: Vec<WaveformSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveformSample {
    pub voltage: f64,
    pub current: f64,
}

/// Map a structural packet to a record stamped with `now`.
///
/// Opaque packets yield `None`. A synthesize frame whose slots are all
/// unpopulated still yields a snapshot, with no channels.
pub fn build_record(packet: StructuralPacket, now: OffsetDateTime) -> Option<Record> {
    match packet {
        StructuralPacket::Synthesize(payload) => {
            Some(Record::Synthesize(build_synthesize(&payload, now)))
        }
        StructuralPacket::Wave(payload) => Some(Record::Wave(build_wave(&payload, now))),
        StructuralPacket::Opaque { .. } => None,
    }
}

fn build_synthesize(payload: &SynthesizePayload, now: OffsetDateTime) -> SynthesizeSnapshot {
    let channels = payload
        .channels
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.machine_type.is_populated())
        .map(|(index, slot)| build_channel(index, slot, now))
        .collect();
    SynthesizeSnapshot {
        active_channel: payload.active_channel,
        channels,
    }
}

fn build_channel(channel_index: usize, slot: &ChannelSlot, now: OffsetDateTime) -> ChannelSnapshot {
    ChannelSnapshot {
        channel_index,
        received_at: now,
        temperature: deci(slot.temperature),
        out_voltage: milli(slot.out_voltage),
        out_current: milli(slot.out_current),
        in_voltage: milli(slot.in_voltage),
        in_current: milli(slot.in_current),
        set_voltage: milli(slot.set_voltage),
        set_current: milli(slot.set_current),
        online: slot.online,
        locked: slot.locked,
        output_enabled: slot.output_enabled,
        machine_type: slot.machine_type,
        error_code: slot.error_code,
        load_mode: slot.status.load_mode(),
        supply_mode: slot.status.supply_mode(),
    }
}

fn build_wave(payload: &WavePayload, now: OffsetDateTime) -> WaveformBurst {
    WaveformBurst {
        active_channel: payload.active_channel,
        groups: payload
            .groups
            .iter()
            .map(|group| build_group(group, now))
            .collect(),
    }
}

fn build_group(group: &SampleGroup, now: OffsetDateTime) -> WaveformGroup {
    WaveformGroup {
        timestamp: group.timestamp,
        received_at: now,
        items: group
            .items
            .iter()
            .map(|item| WaveformSample {
                voltage: milli(item.voltage),
                current: milli(item.current),
            })
            .collect(),
    }
}

fn milli(raw: u16) -> f64 {
    f64::from(raw) / MILLI_SCALE
}

fn deci(raw: u16) -> f64 {
    f64::from(raw) / DECI_SCALE
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::{Record, build_record};
    use crate::config::DecoderConfig;
    use crate::protocols::mdp::layout;
    use crate::protocols::mdp::{
        LoadMode, MachineType, PackKind, StructuralPacket, SupplyMode, decode_packet,
    };
    use crate::test_support::{SlotSpec, synthesize_payload, wave_payload};

    fn decode(kind: PackKind, payload: &[u8]) -> StructuralPacket {
        let declared = (payload.len() + layout::HEADER_LEN) as u8;
        decode_packet(kind, declared, payload, &DecoderConfig::default()).unwrap()
    }

    fn at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn scales_synthesize_readings() {
        let payload = synthesize_payload(
            0,
            &[SlotSpec::supply(5000, 5000, 250, SupplyMode::Cc)],
        );
        let record = build_record(decode(PackKind::Synthesize, &payload), at()).unwrap();
        let Record::Synthesize(snapshot) = record else {
            panic!("expected synthesize record");
        };
        assert_eq!(snapshot.channels.len(), 1);
        let channel = &snapshot.channels[0];
        assert_eq!(channel.channel_index, 0);
        assert_eq!(channel.out_voltage, 5.0);
        assert_eq!(channel.out_current, 5.0);
        assert_eq!(channel.in_voltage, 12.0);
        assert_eq!(channel.in_current, 0.5);
        assert_eq!(channel.temperature, 25.0);
        assert_eq!(channel.output_power(), 25.0);
        assert_eq!(channel.supply_mode, Some(SupplyMode::Cc));
        assert_eq!(channel.load_mode, None);
        assert_eq!(channel.received_at, at());
    }

    #[test]
    fn skips_unpopulated_slots_and_keeps_positions() {
        let mut load = SlotSpec::load(1200, 300, 400, LoadMode::Cp);
        load.error_code = 1;
        let empty = SlotSpec {
            machine_type: MachineType::Node,
            ..SlotSpec::supply(0, 0, 0, SupplyMode::Off)
        };
        let payload = synthesize_payload(
            3,
            &[empty, SlotSpec::supply(1000, 100, 200, SupplyMode::On), empty, load],
        );
        let Some(Record::Synthesize(snapshot)) =
            build_record(decode(PackKind::Synthesize, &payload), at())
        else {
            panic!("expected synthesize record");
        };
        assert_eq!(snapshot.active_channel, 3);
        let indices: Vec<_> = snapshot.channels.iter().map(|c| c.channel_index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(snapshot.channels[1].machine_type, MachineType::L1060);
        assert_eq!(snapshot.channels[1].load_mode, Some(LoadMode::Cp));
        assert_eq!(snapshot.channels[1].supply_mode, None);
        assert!(snapshot.channels[1].has_error());
        assert!(!snapshot.channels[0].has_error());
        assert!(snapshot.channels.iter().all(|c| c.received_at == at()));
    }

    #[test]
    fn all_unpopulated_yields_empty_snapshot() {
        let payload = synthesize_payload(0, &[]);
        let record = build_record(decode(PackKind::Synthesize, &payload), at());
        let Some(Record::Synthesize(snapshot)) = record else {
            panic!("expected synthesize record");
        };
        assert!(snapshot.channels.is_empty());
    }

    #[test]
    fn scales_wave_samples_in_order() {
        let payload = wave_payload(2, layout::WAVE_SHORT_GROUP_SIZE);
        let Some(Record::Wave(burst)) = build_record(decode(PackKind::Wave, &payload), at())
        else {
            panic!("expected wave record");
        };
        assert_eq!(burst.active_channel, 2);
        assert_eq!(burst.groups.len(), layout::WAVE_GROUPS);
        let group = &burst.groups[2];
        assert_eq!(group.timestamp, 1080);
        assert_eq!(group.received_at, at());
        assert_eq!(group.items.len(), 2);
        assert_eq!(group.items[0].voltage, 5.02);
        assert_eq!(group.items[0].current, 1.01);
        assert_eq!(group.items[1].voltage, 5.021);
    }

    #[test]
    fn opaque_packets_build_nothing() {
        let packet = StructuralPacket::Opaque {
            kind: PackKind::Err240,
            payload: vec![],
        };
        assert!(build_record(packet, at()).is_none());
    }

    #[test]
    fn serializes_with_type_tag_and_rfc3339_time() {
        let payload = synthesize_payload(0, &[SlotSpec::supply(5000, 1000, 250, SupplyMode::Cv)]);
        let record = build_record(decode(PackKind::Synthesize, &payload), at()).unwrap();
        let value = serde_json::to_value(&record).expect("record json");
        assert_eq!(value["type"], "synthesize");
        let channel = &value["channels"][0];
        assert_eq!(channel["received_at"], "2023-11-14T22:13:20Z");
        assert_eq!(channel["machine_type"], "p906");
        assert_eq!(channel["supply_mode"], "cv");
        assert!(channel.get("load_mode").is_none());

        let back: Record = serde_json::from_value(value).expect("record from json");
        assert_eq!(back, record);
    }
}

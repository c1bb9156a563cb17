//! Wire builders shared by unit tests.

use crate::protocols::common::reader::xor_checksum;
use crate::protocols::mdp::layout;
use crate::protocols::mdp::types::{LoadMode, MachineType, PackKind, SupplyMode};

#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotSpec {
    pub out_voltage: u16,
    pub out_current: u16,
    pub temperature: u16,
    pub machine_type: MachineType,
    pub status: u8,
    pub error_code: u8,
}

impl SlotSpec {
    pub(crate) fn supply(out_voltage: u16, out_current: u16, temperature: u16, mode: SupplyMode) -> Self {
        Self {
            out_voltage,
            out_current,
            temperature,
            machine_type: MachineType::P906,
            status: mode as u8,
            error_code: 0,
        }
    }

    pub(crate) fn load(out_voltage: u16, out_current: u16, temperature: u16, mode: LoadMode) -> Self {
        Self {
            out_voltage,
            out_current,
            temperature,
            machine_type: MachineType::L1060,
            status: mode as u8,
            error_code: 0,
        }
    }

    fn write(&self, slot_number: u8, out: &mut Vec<u8>) {
        out.push(slot_number);
        for raw in [
            self.out_voltage,
            self.out_current,
            12_000,
            500,
            self.out_voltage,
            self.out_current,
            self.temperature,
        ] {
            out.extend_from_slice(&raw.to_le_bytes());
        }
        out.push(1);
        out.push(machine_type_code(self.machine_type));
        out.push(0);
        out.push(self.status);
        out.push(1);
        out.extend_from_slice(&[0x1F, 0xF8, 0x00]);
        out.push(self.error_code);
        out.push(0);
    }
}

fn machine_type_code(machine_type: MachineType) -> u8 {
    match machine_type {
        MachineType::Node => 0,
        MachineType::P905 => 1,
        MachineType::P906 => 2,
        MachineType::L1060 => 3,
    }
}

/// Synthesize payload with `slots` in the first positions and unpopulated slots after.
pub(crate) fn synthesize_payload(active_channel: u8, slots: &[SlotSpec]) -> Vec<u8> {
    let mut body = Vec::with_capacity(layout::SYNTHESIZE_SLOTS * layout::SLOT_LEN);
    for index in 0..layout::SYNTHESIZE_SLOTS {
        match slots.get(index) {
            Some(spec) => spec.write(index as u8, &mut body),
            None => {
                body.push(index as u8);
                body.extend_from_slice(&[0u8; layout::SLOT_LEN - 1]);
            }
        }
    }
    with_header_bytes(active_channel, body)
}

/// Wave payload whose group `g` is stamped `1000 + 40g` and whose item `k`
/// carries `5000 + 10g + k` mV and `1000 + 5g + k` mA.
pub(crate) fn wave_payload(active_channel: u8, group_size: usize) -> Vec<u8> {
    let mut body = Vec::new();
    for g in 0..layout::WAVE_GROUPS as u32 {
        body.extend_from_slice(&(1000 + g * 40).to_le_bytes());
        for k in 0..group_size as u16 {
            let g = g as u16;
            body.extend_from_slice(&(5000 + g * 10 + k).to_le_bytes());
            body.extend_from_slice(&(1000 + g * 5 + k).to_le_bytes());
        }
    }
    with_header_bytes(active_channel, body)
}

fn with_header_bytes(active_channel: u8, body: Vec<u8>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(layout::BODY_OFFSET + body.len());
    payload.push(active_channel);
    payload.push(xor_checksum(&body));
    payload.extend_from_slice(&body);
    payload
}

/// Full wire frame: marker, kind, total length, payload.
pub(crate) fn frame(kind: PackKind, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(layout::HEADER_LEN + payload.len());
    out.extend_from_slice(&layout::MAGIC);
    out.push(kind.code());
    out.push((layout::HEADER_LEN + payload.len()) as u8);
    out.extend_from_slice(payload);
    out
}

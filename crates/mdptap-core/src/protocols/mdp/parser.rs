use super::error::DecodeError;
use super::layout;
use super::reader::MdpReader;
use super::types::{ChannelStatus, MachineType, PackKind};
use crate::config::DecoderConfig;
use crate::protocols::common::reader::xor_checksum;

/// Decoded frame payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralPacket {
    Synthesize(SynthesizePayload),
    Wave(WavePayload),
    /// Well-framed packet of a kind without a structural decoder.
    Opaque { kind: PackKind, payload: Vec<u8> },
}

impl StructuralPacket {
    pub fn kind(&self) -> PackKind {
        match self {
            StructuralPacket::Synthesize(_) => PackKind::Synthesize,
            StructuralPacket::Wave(_) => PackKind::Wave,
            StructuralPacket::Opaque { kind, .. } => *kind,
        }
    }
}

/// Six-slot telemetry snapshot as laid out on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizePayload {
    pub active_channel: u8,
    pub padding: u8,
    /// Always `layout::SYNTHESIZE_SLOTS` entries, in slot order.
    pub channels: Vec<ChannelSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSlot {
    pub slot_number: u8,
    pub out_voltage: u16,
    pub out_current: u16,
    pub in_voltage: u16,
    pub in_current: u16,
    pub set_voltage: u16,
    pub set_current: u16,
    pub temperature: u16,
    pub online: bool,
    pub machine_type: MachineType,
    pub locked: bool,
    pub status: ChannelStatus,
    pub output_enabled: bool,
    pub color: [u8; 3],
    pub error_code: u8,
    pub terminator: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WavePayload {
    pub active_channel: u8,
    pub padding: u8,
    /// Always `layout::WAVE_GROUPS` entries, in wire order.
    pub groups: Vec<SampleGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleGroup {
    /// Device tick count.
    pub timestamp: u32,
    pub items: Vec<SampleItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleItem {
    pub voltage: u16,
    pub current: u16,
}

/// Decode the payload of one frame.
///
/// `declared_length` is the frame's total length byte; wave frames derive
/// their group size from it. Kinds other than synthesize and wave come back
/// as [`StructuralPacket::Opaque`].
///
/// # Errors
/// Returns `DecodeError` when the length byte is shorter than the header, the
/// payload does not match the kind's fixed layout, an enum byte is out of
/// range, a wave length is ambiguous, or (when enabled) the checksum differs.
pub fn decode_packet(
    kind: PackKind,
    declared_length: u8,
    payload: &[u8],
    config: &DecoderConfig,
) -> Result<StructuralPacket, DecodeError> {
    let declared = declared_length as usize;
    if declared < layout::HEADER_LEN {
        return Err(DecodeError::LengthTooSmall {
            declared: declared_length,
        });
    }
    let reader = MdpReader::new(payload);
    reader.require_exact(kind, declared - layout::HEADER_LEN)?;

    match kind {
        PackKind::Synthesize => {
            decode_synthesize(&reader, config).map(StructuralPacket::Synthesize)
        }
        PackKind::Wave => decode_wave(&reader, declared_length, config).map(StructuralPacket::Wave),
        other => Ok(StructuralPacket::Opaque {
            kind: other,
            payload: payload.to_vec(),
        }),
    }
}

fn decode_synthesize(
    reader: &MdpReader<'_>,
    config: &DecoderConfig,
) -> Result<SynthesizePayload, DecodeError> {
    reader.require_exact(PackKind::Synthesize, layout::SYNTHESIZE_PAYLOAD_LEN)?;
    let active_channel = reader.read_u8(layout::ACTIVE_CHANNEL_OFFSET)?;
    let padding = reader.read_u8(layout::CHECKSUM_OFFSET)?;
    if config.verify_checksum {
        verify_checksum(reader, padding)?;
    }

    let channels = (0..layout::SYNTHESIZE_SLOTS)
        .map(|index| {
            let start = layout::BODY_OFFSET + index * layout::SLOT_LEN;
            let slot = reader.read_slice(start..start + layout::SLOT_LEN)?;
            decode_slot(&MdpReader::new(slot))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SynthesizePayload {
        active_channel,
        padding,
        channels,
    })
}

fn decode_slot(reader: &MdpReader<'_>) -> Result<ChannelSlot, DecodeError> {
    reader.require_len(layout::SLOT_LEN)?;
    let machine_type = MachineType::try_from(reader.read_u8(layout::MACHINE_TYPE_OFFSET)?)?;
    let status = ChannelStatus::decode(machine_type, reader.read_u8(layout::STATUS_OFFSET)?)?;

    Ok(ChannelSlot {
        slot_number: reader.read_u8(layout::SLOT_NUMBER_OFFSET)?,
        out_voltage: reader.read_u16_le(layout::OUT_VOLTAGE_RANGE)?,
        out_current: reader.read_u16_le(layout::OUT_CURRENT_RANGE)?,
        in_voltage: reader.read_u16_le(layout::IN_VOLTAGE_RANGE)?,
        in_current: reader.read_u16_le(layout::IN_CURRENT_RANGE)?,
        set_voltage: reader.read_u16_le(layout::SET_VOLTAGE_RANGE)?,
        set_current: reader.read_u16_le(layout::SET_CURRENT_RANGE)?,
        temperature: reader.read_u16_le(layout::TEMPERATURE_RANGE)?,
        online: reader.read_flag(layout::ONLINE_OFFSET)?,
        machine_type,
        locked: reader.read_flag(layout::LOCK_OFFSET)?,
        status,
        output_enabled: reader.read_flag(layout::OUTPUT_OFFSET)?,
        color: reader.read_array::<3>(layout::COLOR_RANGE.start)?,
        error_code: reader.read_u8(layout::ERROR_OFFSET)?,
        terminator: reader.read_u8(layout::TERMINATOR_OFFSET)?,
    })
}

fn decode_wave(
    reader: &MdpReader<'_>,
    declared_length: u8,
    config: &DecoderConfig,
) -> Result<WavePayload, DecodeError> {
    let group_size = layout::wave_group_size(declared_length)
        .ok_or(DecodeError::AmbiguousGroupSize { declared_length })?;
    reader.require_exact(PackKind::Wave, layout::wave_payload_len(group_size))?;
    let active_channel = reader.read_u8(layout::ACTIVE_CHANNEL_OFFSET)?;
    let padding = reader.read_u8(layout::CHECKSUM_OFFSET)?;
    if config.verify_checksum {
        verify_checksum(reader, padding)?;
    }

    let mut offset = layout::BODY_OFFSET;
    let mut groups = Vec::with_capacity(layout::WAVE_GROUPS);
    for _ in 0..layout::WAVE_GROUPS {
        let timestamp = reader.read_u32_le(offset..offset + layout::WAVE_TIMESTAMP_LEN)?;
        offset += layout::WAVE_TIMESTAMP_LEN;

        let mut items = Vec::with_capacity(group_size);
        for _ in 0..group_size {
            items.push(SampleItem {
                voltage: reader.read_u16_le(offset..offset + 2)?,
                current: reader.read_u16_le(offset + 2..offset + layout::WAVE_ITEM_LEN)?,
            });
            offset += layout::WAVE_ITEM_LEN;
        }
        groups.push(SampleGroup { timestamp, items });
    }

    Ok(WavePayload {
        active_channel,
        padding,
        groups,
    })
}

fn verify_checksum(reader: &MdpReader<'_>, expected: u8) -> Result<(), DecodeError> {
    let actual = xor_checksum(reader.tail(layout::BODY_OFFSET)?);
    if actual != expected {
        return Err(DecodeError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

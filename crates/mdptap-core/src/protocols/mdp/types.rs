use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DecodeError;

/// Frame kind byte.
///
/// Every byte value maps to a variant; codes without a named variant are kept
/// as `Unknown` so they can still be framed and counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackKind {
    Synthesize,
    Wave,
    Addr,
    UpdatCh,
    Machine,
    SetIsOutput,
    GetAddr,
    SetAddr,
    SetCh,
    SetV,
    SetI,
    SetAllAddr,
    StartAutoMatch,
    StopAutoMatch,
    ResetToDfu,
    Rgb,
    GetMachine,
    Heartbeat,
    Err240,
    Unknown(u8),
}

impl PackKind {
    pub fn code(self) -> u8 {
        match self {
            PackKind::Synthesize => 17,
            PackKind::Wave => 18,
            PackKind::Addr => 19,
            PackKind::UpdatCh => 20,
            PackKind::Machine => 21,
            PackKind::SetIsOutput => 22,
            PackKind::GetAddr => 23,
            PackKind::SetAddr => 24,
            PackKind::SetCh => 25,
            PackKind::SetV => 26,
            PackKind::SetI => 27,
            PackKind::SetAllAddr => 28,
            PackKind::StartAutoMatch => 29,
            PackKind::StopAutoMatch => 30,
            PackKind::ResetToDfu => 31,
            PackKind::Rgb => 32,
            PackKind::GetMachine => 33,
            PackKind::Heartbeat => 34,
            PackKind::Err240 => 240,
            PackKind::Unknown(code) => code,
        }
    }
}

impl From<u8> for PackKind {
    fn from(code: u8) -> Self {
        match code {
            17 => PackKind::Synthesize,
            18 => PackKind::Wave,
            19 => PackKind::Addr,
            20 => PackKind::UpdatCh,
            21 => PackKind::Machine,
            22 => PackKind::SetIsOutput,
            23 => PackKind::GetAddr,
            24 => PackKind::SetAddr,
            25 => PackKind::SetCh,
            26 => PackKind::SetV,
            27 => PackKind::SetI,
            28 => PackKind::SetAllAddr,
            29 => PackKind::StartAutoMatch,
            30 => PackKind::StopAutoMatch,
            31 => PackKind::ResetToDfu,
            32 => PackKind::Rgb,
            33 => PackKind::GetMachine,
            34 => PackKind::Heartbeat,
            240 => PackKind::Err240,
            other => PackKind::Unknown(other),
        }
    }
}

impl From<PackKind> for u8 {
    fn from(kind: PackKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for PackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackKind::Synthesize => "synthesize",
            PackKind::Wave => "wave",
            PackKind::Addr => "addr",
            PackKind::UpdatCh => "updat_ch",
            PackKind::Machine => "machine",
            PackKind::SetIsOutput => "set_isoutput",
            PackKind::GetAddr => "get_addr",
            PackKind::SetAddr => "set_addr",
            PackKind::SetCh => "set_ch",
            PackKind::SetV => "set_v",
            PackKind::SetI => "set_i",
            PackKind::SetAllAddr => "set_all_addr",
            PackKind::StartAutoMatch => "start_auto_match",
            PackKind::StopAutoMatch => "stop_auto_match",
            PackKind::ResetToDfu => "reset_to_dfu",
            PackKind::Rgb => "rgb",
            PackKind::GetMachine => "get_machine",
            PackKind::Heartbeat => "heartbeat",
            PackKind::Err240 => "err_240",
            PackKind::Unknown(code) => return write!(f, "unknown_{code:#04x}"),
        };
        f.write_str(name)
    }
}

/// Unit attached to a channel slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineType {
    /// No unit attached to the slot.
    Node,
    P905,
    P906,
    L1060,
}

impl MachineType {
    pub fn is_populated(self) -> bool {
        self != MachineType::Node
    }
}

impl TryFrom<u8> for MachineType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MachineType::Node),
            1 => Ok(MachineType::P905),
            2 => Ok(MachineType::P906),
            3 => Ok(MachineType::L1060),
            _ => Err(DecodeError::InvalidMachineType { value }),
        }
    }
}

/// Regulation mode reported by an L1060 electronic load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    Cc,
    Cv,
    Cr,
    Cp,
}

impl TryFrom<u8> for LoadMode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LoadMode::Cc),
            1 => Ok(LoadMode::Cv),
            2 => Ok(LoadMode::Cr),
            3 => Ok(LoadMode::Cp),
            _ => Err(DecodeError::InvalidLoadMode { value }),
        }
    }
}

/// Output state reported by a P905/P906 supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyMode {
    Off,
    Cc,
    Cv,
    On,
}

impl TryFrom<u8> for SupplyMode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SupplyMode::Off),
            1 => Ok(SupplyMode::Cc),
            2 => Ok(SupplyMode::Cv),
            3 => Ok(SupplyMode::On),
            _ => Err(DecodeError::InvalidSupplyMode { value }),
        }
    }
}

/// The single status byte of a slot, interpreted by machine type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    Load(LoadMode),
    Supply(SupplyMode),
}

impl ChannelStatus {
    /// Interpret a raw status byte: loads carry a `LoadMode`, everything else a `SupplyMode`.
    pub fn decode(machine_type: MachineType, value: u8) -> Result<Self, DecodeError> {
        match machine_type {
            MachineType::L1060 => LoadMode::try_from(value).map(ChannelStatus::Load),
            _ => SupplyMode::try_from(value).map(ChannelStatus::Supply),
        }
    }

    pub fn load_mode(self) -> Option<LoadMode> {
        match self {
            ChannelStatus::Load(mode) => Some(mode),
            ChannelStatus::Supply(_) => None,
        }
    }

    pub fn supply_mode(self) -> Option<SupplyMode> {
        match self {
            ChannelStatus::Supply(mode) => Some(mode),
            ChannelStatus::Load(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_kind_round_trips_every_byte() {
        for code in 0..=u8::MAX {
            assert_eq!(PackKind::from(code).code(), code);
        }
    }

    #[test]
    fn pack_kind_names_unknown_codes() {
        assert_eq!(PackKind::Heartbeat.to_string(), "heartbeat");
        assert_eq!(PackKind::from(3).to_string(), "unknown_0x03");
    }

    #[test]
    fn status_depends_on_machine_type() {
        assert_eq!(
            ChannelStatus::decode(MachineType::L1060, 3).unwrap(),
            ChannelStatus::Load(LoadMode::Cp)
        );
        assert_eq!(
            ChannelStatus::decode(MachineType::P906, 3).unwrap(),
            ChannelStatus::Supply(SupplyMode::On)
        );
        assert_eq!(
            ChannelStatus::decode(MachineType::Node, 0).unwrap(),
            ChannelStatus::Supply(SupplyMode::Off)
        );
    }

    #[test]
    fn rejects_out_of_range_enums() {
        assert!(matches!(
            MachineType::try_from(4),
            Err(DecodeError::InvalidMachineType { value: 4 })
        ));
        assert!(matches!(
            ChannelStatus::decode(MachineType::L1060, 4),
            Err(DecodeError::InvalidLoadMode { value: 4 })
        ));
        assert!(matches!(
            ChannelStatus::decode(MachineType::P905, 9),
            Err(DecodeError::InvalidSupplyMode { value: 9 })
        ));
    }
}

//! OpenTherm message vocabulary: the 3-bit message type codes and the
//! standard data-item identifiers.
//!
//! The message type occupies bits 30..28 of a frame. Types 0-3 flow from
//! master to slave, types 4-7 from slave to master.

/// 3-bit message type field of an OpenTherm frame
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// Master requests a data item
    ReadData = 0,
    /// Master writes a data item
    WriteData = 1,
    /// Master flags its own data as invalid
    InvalidData = 2,
    /// Reserved master-to-slave code
    Reserved = 3,
    /// Slave acknowledges a read with the item value
    ReadAck = 4,
    /// Slave acknowledges a write
    WriteAck = 5,
    /// Slave flags the item value as invalid
    DataInvalid = 6,
    /// Slave does not support the requested data id
    UnknownDataId = 7,
}

impl MessageType {
    /// Decode the 3-bit field. Total: every value 0..=7 maps to a variant.
    pub fn from_bits(bits: u8) -> MessageType {
        match bits & 0x07 {
            0 => MessageType::ReadData,
            1 => MessageType::WriteData,
            2 => MessageType::InvalidData,
            3 => MessageType::Reserved,
            4 => MessageType::ReadAck,
            5 => MessageType::WriteAck,
            6 => MessageType::DataInvalid,
            _ => MessageType::UnknownDataId,
        }
    }

    /// Protocol-spec spelling of the message type, for log output
    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::ReadData => "READ_DATA",
            MessageType::WriteData => "WRITE_DATA",
            MessageType::InvalidData => "INVALID_DATA",
            MessageType::Reserved => "RESERVED",
            MessageType::ReadAck => "READ_ACK",
            MessageType::WriteAck => "WRITE_ACK",
            MessageType::DataInvalid => "DATA_INVALID",
            MessageType::UnknownDataId => "UNKNOWN_DATA_ID",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard OpenTherm data-item identifiers (bits 23..16 of a frame).
///
/// Only the ids exchanged by this crate's hub plus the common read-only items
/// are enumerated; ids outside this set stay accessible through
/// `Frame::data_id_raw`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataId {
    /// Master and slave status flags
    Status = 0,
    /// Control setpoint, CH water temperature (f8.8)
    TSet = 1,
    /// Master configuration flags / member id
    MasterConfig = 2,
    /// Slave configuration flags / member id
    SlaveConfig = 3,
    /// Remote command
    Command = 4,
    /// Application-specific fault flags / OEM fault code
    AsfFlags = 5,
    /// Remote-boiler-parameter transfer-enable / read-write flags
    RbpFlags = 6,
    /// Cooling control signal (f8.8)
    CoolingControl = 7,
    /// Control setpoint for the second CH circuit (f8.8)
    TSetCh2 = 8,
    /// Remote override of room setpoint (f8.8)
    TrOverride = 9,
    /// Number of transparent slave parameters
    TspCount = 10,
    /// Transparent slave parameter index/value
    TspEntry = 11,
    /// Size of the fault-history buffer
    FhbCount = 12,
    /// Fault-history buffer index/value
    FhbEntry = 13,
    /// Maximum relative modulation level setting (f8.8)
    MaxRelModLevel = 14,
    /// Maximum boiler capacity / minimum modulation level
    MaxCapacityMinMod = 15,
    /// Room setpoint (f8.8)
    TrSet = 16,
    /// Relative modulation level (f8.8)
    RelModLevel = 17,
    /// CH water pressure in bar (f8.8)
    ChPressure = 18,
    /// DHW flow rate in litres/minute (f8.8)
    DhwFlowRate = 19,
    /// Day of week and time of day
    DayTime = 20,
    /// Calendar date
    Date = 21,
    /// Calendar year
    Year = 22,
    /// Room setpoint for the second CH circuit (f8.8)
    TrSetCh2 = 23,
    /// Room temperature (f8.8)
    Tr = 24,
    /// Boiler flow water temperature (f8.8)
    Tboiler = 25,
    /// DHW temperature (f8.8)
    Tdhw = 26,
    /// Outside temperature (f8.8)
    Toutside = 27,
    /// Return water temperature (f8.8)
    Tret = 28,
    /// Solar storage temperature (f8.8)
    Tstorage = 29,
    /// Solar collector temperature (f8.8)
    Tcollector = 30,
    /// Flow water temperature of the second CH circuit (f8.8)
    TflowCh2 = 31,
    /// Second DHW temperature (f8.8)
    Tdhw2 = 32,
    /// Exhaust temperature (s16)
    Texhaust = 33,
    /// Upper/lower bound for DHW setpoint adjustment (s8/s8)
    TdhwSetBounds = 48,
    /// Upper/lower bound for max CH setpoint adjustment (s8/s8)
    MaxTSetBounds = 49,
    /// Upper/lower bound for heat-curve ratio adjustment (s8/s8)
    HcratioBounds = 50,
    /// DHW setpoint (f8.8), remote parameter 1
    TdhwSet = 56,
    /// Maximum CH water setpoint (f8.8), remote parameter 2
    MaxTSet = 57,
    /// Heat-curve ratio (f8.8), remote parameter 3
    Hcratio = 58,
    /// Remote override function flags
    RemoteOverrideFunction = 100,
    /// OEM diagnostic code
    OemDiagnosticCode = 115,
    /// Number of burner starts
    BurnerStarts = 116,
    /// Number of CH pump starts
    ChPumpStarts = 117,
    /// Number of DHW pump/valve starts
    DhwPumpStarts = 118,
    /// Number of burner starts in DHW mode
    DhwBurnerStarts = 119,
    /// Burner operation hours
    BurnerHours = 120,
    /// CH pump operation hours
    ChPumpHours = 121,
    /// DHW pump/valve operation hours
    DhwPumpHours = 122,
    /// Burner operation hours in DHW mode
    DhwBurnerHours = 123,
    /// OpenTherm protocol version of the master (f8.8)
    OpenThermVersionMaster = 124,
    /// OpenTherm protocol version of the slave (f8.8)
    OpenThermVersionSlave = 125,
    /// Master product version
    MasterVersion = 126,
    /// Slave product version
    SlaveVersion = 127,
}

impl DataId {
    /// Look up a known data id. Returns `None` for ids outside the standard
    /// set, which remain accessible as raw bytes.
    pub fn from_u8(id: u8) -> Option<DataId> {
        Some(match id {
            0 => DataId::Status,
            1 => DataId::TSet,
            2 => DataId::MasterConfig,
            3 => DataId::SlaveConfig,
            4 => DataId::Command,
            5 => DataId::AsfFlags,
            6 => DataId::RbpFlags,
            7 => DataId::CoolingControl,
            8 => DataId::TSetCh2,
            9 => DataId::TrOverride,
            10 => DataId::TspCount,
            11 => DataId::TspEntry,
            12 => DataId::FhbCount,
            13 => DataId::FhbEntry,
            14 => DataId::MaxRelModLevel,
            15 => DataId::MaxCapacityMinMod,
            16 => DataId::TrSet,
            17 => DataId::RelModLevel,
            18 => DataId::ChPressure,
            19 => DataId::DhwFlowRate,
            20 => DataId::DayTime,
            21 => DataId::Date,
            22 => DataId::Year,
            23 => DataId::TrSetCh2,
            24 => DataId::Tr,
            25 => DataId::Tboiler,
            26 => DataId::Tdhw,
            27 => DataId::Toutside,
            28 => DataId::Tret,
            29 => DataId::Tstorage,
            30 => DataId::Tcollector,
            31 => DataId::TflowCh2,
            32 => DataId::Tdhw2,
            33 => DataId::Texhaust,
            48 => DataId::TdhwSetBounds,
            49 => DataId::MaxTSetBounds,
            50 => DataId::HcratioBounds,
            56 => DataId::TdhwSet,
            57 => DataId::MaxTSet,
            58 => DataId::Hcratio,
            100 => DataId::RemoteOverrideFunction,
            115 => DataId::OemDiagnosticCode,
            116 => DataId::BurnerStarts,
            117 => DataId::ChPumpStarts,
            118 => DataId::DhwPumpStarts,
            119 => DataId::DhwBurnerStarts,
            120 => DataId::BurnerHours,
            121 => DataId::ChPumpHours,
            122 => DataId::DhwPumpHours,
            123 => DataId::DhwBurnerHours,
            124 => DataId::OpenThermVersionMaster,
            125 => DataId::OpenThermVersionSlave,
            126 => DataId::MasterVersion,
            127 => DataId::SlaveVersion,
            _ => return None,
        })
    }
}

impl std::fmt::Display for DataId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_roundtrip() {
        for bits in 0..=7u8 {
            assert_eq!(MessageType::from_bits(bits) as u8, bits);
        }
    }

    #[test]
    fn message_type_masks_high_bits() {
        assert_eq!(MessageType::from_bits(0x0C), MessageType::ReadAck);
    }

    #[test]
    fn data_id_lookup() {
        assert_eq!(DataId::from_u8(25), Some(DataId::Tboiler));
        assert_eq!(DataId::from_u8(56), Some(DataId::TdhwSet));
        assert_eq!(DataId::from_u8(200), None);
    }
}

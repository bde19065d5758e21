//! OpenTherm protocol core: frame codec, message vocabulary, payload
//! conversions, and the bit-level transport state machine.

pub mod data;
pub mod frame;
pub mod line_mock;
pub mod link;
pub mod message;
pub mod timeout;

pub use data::{f88_to_float, float_to_f88, temperature_to_f88, MasterStatus, SlaveStatus};
pub use frame::Frame;
pub use link::{
    BusRole, BusStatus, EdgeHandle, ExchangeCallback, ExchangeStatus, LinkTiming, OpenThermBus,
};
pub use message::{DataId, MessageType};
pub use timeout::{decode_mclk_timeout, encode_mclk_timeout};

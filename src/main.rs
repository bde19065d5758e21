use clap::{Parser, Subcommand};
use serde::Serialize;

use opentherm_rs::{
    init_logger, log_info, response_edges, BusRole, Clock, DataId, Frame, MessageType,
    OpenThermBus, OpenThermError, SimulatedClock, SimulatedLine,
};

#[derive(Parser)]
#[command(name = "opentherm-cli")]
#[command(about = "CLI tool for the OpenTherm boiler protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a request frame and print its raw hex word
    BuildRequest {
        /// Message type: read-data or write-data
        msg_type: String,
        /// Data-item identifier (0-255)
        id: u8,
        /// 16-bit data value
        #[arg(default_value = "0")]
        data: u16,
    },
    /// Decode a raw 32-bit frame from hex
    Decode {
        /// Frame as 8 hex digits, e.g. 90013200
        frame: String,
        /// Emit JSON instead of log lines
        #[arg(long)]
        json: bool,
    },
    /// Run a simulated master/boiler exchange round
    Simulate,
}

#[derive(Serialize)]
struct DecodedFrame {
    raw: String,
    msg_type: String,
    data_id: u8,
    data_id_name: Option<String>,
    data_value: String,
    f88: f32,
    parity_ok: bool,
    valid_request: bool,
    valid_response: bool,
}

impl From<Frame> for DecodedFrame {
    fn from(frame: Frame) -> Self {
        DecodedFrame {
            raw: format!("{:08X}", frame.raw()),
            msg_type: frame.msg_type().to_string(),
            data_id: frame.data_id_raw(),
            data_id_name: frame.data_id().map(|id| id.to_string()),
            data_value: format!("{:04X}", frame.data_value()),
            f88: frame.f88(),
            parity_ok: frame.has_valid_parity(),
            valid_request: frame.is_valid_request(),
            valid_response: frame.is_valid_response(),
        }
    }
}

fn parse_msg_type(s: &str) -> Result<MessageType, OpenThermError> {
    match s.to_ascii_lowercase().as_str() {
        "read" | "read-data" => Ok(MessageType::ReadData),
        "write" | "write-data" => Ok(MessageType::WriteData),
        "invalid-data" => Ok(MessageType::InvalidData),
        "read-ack" => Ok(MessageType::ReadAck),
        "write-ack" => Ok(MessageType::WriteAck),
        "data-invalid" => Ok(MessageType::DataInvalid),
        "unknown-data-id" => Ok(MessageType::UnknownDataId),
        other => Err(OpenThermError::UnknownMessageType(other.to_string())),
    }
}

fn parse_frame_hex(s: &str) -> Result<Frame, OpenThermError> {
    let bytes = hex::decode(s).map_err(|_| OpenThermError::InvalidHexString)?;
    let word: [u8; 4] = bytes
        .try_into()
        .map_err(|_| OpenThermError::InvalidHexString)?;
    Ok(Frame::from_raw(u32::from_be_bytes(word)))
}

/// Drive one request through a simulated bus and answer it like a boiler
fn simulate_exchange(
    bus: &mut OpenThermBus<SimulatedLine, SimulatedClock>,
    clock: &SimulatedClock,
    request: Frame,
    data: u16,
) -> Result<(), OpenThermError> {
    bus.send_request_async(request)?;
    let ack = Frame::build_raw_id(MessageType::ReadAck, request.data_id_raw(), data);
    let handle = bus.edge_handle();
    for (at, level) in response_edges(ack, clock.now_micros() + 20_000) {
        handle.on_edge(level, at);
    }
    clock.advance(60_000);
    if let Some((frame, outcome)) = bus.process() {
        log_info(&format!("{request} -> {frame} [{}]", outcome.as_str()));
    }
    // Wait out the inter-frame delay before the next request
    clock.advance(150_000);
    bus.process();
    Ok(())
}

fn main() -> Result<(), OpenThermError> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildRequest { msg_type, id, data } => {
            let frame = Frame::build_raw_id(parse_msg_type(&msg_type)?, id, data);
            println!("{:08X}", frame.raw());
            log_info(&format!("Built {frame}"));
        }
        Commands::Decode { frame, json } => {
            let decoded = DecodedFrame::from(parse_frame_hex(&frame)?);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&decoded)
                        .map_err(|e| OpenThermError::Other(e.to_string()))?
                );
            } else {
                println!(
                    "{} id={} value=0x{} f8.8={} parity_ok={} request={} response={}",
                    decoded.msg_type,
                    decoded.data_id,
                    decoded.data_value,
                    decoded.f88,
                    decoded.parity_ok,
                    decoded.valid_request,
                    decoded.valid_response
                );
            }
        }
        Commands::Simulate => {
            let clock = SimulatedClock::new();
            let line = SimulatedLine::new(clock.clone());
            let mut bus = OpenThermBus::new(line, clock.clone(), BusRole::Master);
            bus.begin();

            simulate_exchange(&mut bus, &clock, Frame::read_request(DataId::Tboiler), 0x2800)?;
            simulate_exchange(&mut bus, &clock, Frame::read_request(DataId::Tret), 0x2300)?;
            simulate_exchange(
                &mut bus,
                &clock,
                Frame::read_request(DataId::ChPressure),
                0x0180,
            )?;

            let stats = bus.stats();
            log_info(&format!(
                "Exchanges: {} ok, {} invalid, {} timeout",
                stats.responses_ok, stats.invalid_frames, stats.timeouts
            ));
        }
    }

    Ok(())
}

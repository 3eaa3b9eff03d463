//! # Stock Command Set
//!
//! Pre-built operations for the common Axpert-family commands, each
//! bound to a typed reply parser. Device replies carry their payload
//! after a leading `(`, e.g. `(B` for QMOD or `(ACK` for accepted
//! setter commands.

use crate::command::Command;
use crate::error::{ProtocolError, Result};
use crate::operation::Operation;
use crate::protocol::Frame;

/// Inverter operating mode as reported by `QMOD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceMode {
    PowerOn,
    Standby,
    Line,
    Battery,
    Fault,
    PowerSaving,
}

impl DeviceMode {
    fn from_code(code: &str) -> Result<Self> {
        match code {
            "P" => Ok(Self::PowerOn),
            "S" => Ok(Self::Standby),
            "L" => Ok(Self::Line),
            "B" => Ok(Self::Battery),
            "F" => Ok(Self::Fault),
            "H" => Ok(Self::PowerSaving),
            other => Err(ProtocolError::InvalidInput(format!(
                "unknown device mode '{}'",
                other
            ))),
        }
    }
}

/// General status readings reported by `QPIGS`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralStatus {
    pub grid_voltage: f32,
    pub grid_frequency: f32,
    pub ac_output_voltage: f32,
    pub ac_output_frequency: f32,
    pub ac_output_apparent_power: u32,
    pub ac_output_active_power: u32,
    pub output_load_percent: u8,
    pub bus_voltage: u32,
    pub battery_voltage: f32,
    pub battery_charging_current: u32,
    pub battery_capacity: u8,
    pub inverter_heat_sink_temperature: i32,
    pub pv_input_current: f32,
    pub pv_input_voltage: f32,
}

/// Query the inverter operating mode (`QMOD`)
pub fn device_mode() -> Operation<DeviceMode> {
    Operation::new("QMOD", parse_device_mode)
}

/// Query the device serial number (`QID`)
pub fn serial_number() -> Operation<String> {
    Operation::new("QID", |frame| Ok(payload(frame)?.to_string()))
}

/// Query general status readings (`QPIGS`)
pub fn general_status() -> Operation<GeneralStatus> {
    Operation::new("QPIGS", parse_general_status)
}

/// Set the output source priority (`POP00` utility, `POP01` solar,
/// `POP02` SBU); the reply must be an ACK
pub fn set_output_priority() -> Result<Operation<()>> {
    let command = Command::with_values("POP{}", ["00", "01", "02"], parse_ack)?;
    Ok(Operation::from(command))
}

/// Reply payload with the leading `(` stripped
fn payload(frame: &Frame) -> Result<&str> {
    frame.command().strip_prefix('(').ok_or_else(|| {
        ProtocolError::InvalidInput(format!(
            "reply '{}' is missing the '(' payload prefix",
            frame.command()
        ))
    })
}

fn parse_device_mode(frame: &Frame) -> Result<DeviceMode> {
    DeviceMode::from_code(payload(frame)?)
}

fn parse_ack(frame: &Frame) -> Result<()> {
    match payload(frame)? {
        "ACK" => Ok(()),
        other => Err(ProtocolError::InvalidInput(format!(
            "expected ACK, got '{}'",
            other
        ))),
    }
}

fn parse_general_status(frame: &Frame) -> Result<GeneralStatus> {
    let payload = payload(frame)?;
    let mut fields = payload.split_whitespace();

    Ok(GeneralStatus {
        grid_voltage: next_field(&mut fields, "grid voltage")?,
        grid_frequency: next_field(&mut fields, "grid frequency")?,
        ac_output_voltage: next_field(&mut fields, "AC output voltage")?,
        ac_output_frequency: next_field(&mut fields, "AC output frequency")?,
        ac_output_apparent_power: next_field(&mut fields, "AC output apparent power")?,
        ac_output_active_power: next_field(&mut fields, "AC output active power")?,
        output_load_percent: next_field(&mut fields, "output load percent")?,
        bus_voltage: next_field(&mut fields, "bus voltage")?,
        battery_voltage: next_field(&mut fields, "battery voltage")?,
        battery_charging_current: next_field(&mut fields, "battery charging current")?,
        battery_capacity: next_field(&mut fields, "battery capacity")?,
        inverter_heat_sink_temperature: next_field(&mut fields, "heat sink temperature")?,
        pv_input_current: next_field(&mut fields, "PV input current")?,
        pv_input_voltage: next_field(&mut fields, "PV input voltage")?,
    })
}

/// Pull the next whitespace-separated field and parse it
fn next_field<'a, T, I>(fields: &mut I, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    let raw = fields.next().ok_or_else(|| {
        ProtocolError::InvalidInput(format!("reply is missing the {} field", name))
    })?;

    raw.parse().map_err(|_| {
        ProtocolError::InvalidInput(format!("could not parse {} from '{}'", name, raw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::mocks::MockSerialPort;

    fn reply(command: &str) -> Frame {
        Frame::from_ascii(command).unwrap()
    }

    #[test]
    fn test_parse_device_mode() {
        assert_eq!(
            parse_device_mode(&reply("(B")).unwrap(),
            DeviceMode::Battery
        );
        assert_eq!(parse_device_mode(&reply("(L")).unwrap(), DeviceMode::Line);
        assert_eq!(
            parse_device_mode(&reply("(H")).unwrap(),
            DeviceMode::PowerSaving
        );
    }

    #[test]
    fn test_parse_device_mode_rejects_unknown_code() {
        let result = parse_device_mode(&reply("(X"));
        assert!(matches!(result, Err(ProtocolError::InvalidInput(_))));
    }

    #[test]
    fn test_payload_requires_prefix() {
        let result = parse_device_mode(&reply("B"));
        assert!(matches!(result, Err(ProtocolError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_ack() {
        assert!(parse_ack(&reply("(ACK")).is_ok());

        let result = parse_ack(&reply("(NAK"));
        assert!(matches!(result, Err(ProtocolError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_general_status() {
        let frame = reply(
            "(224.6 49.9 224.6 49.9 0300 0260 005 425 54.00 012 100 0069 0014 103.8",
        );
        let status = parse_general_status(&frame).unwrap();

        assert_eq!(status.grid_voltage, 224.6);
        assert_eq!(status.grid_frequency, 49.9);
        assert_eq!(status.ac_output_apparent_power, 300);
        assert_eq!(status.ac_output_active_power, 260);
        assert_eq!(status.output_load_percent, 5);
        assert_eq!(status.bus_voltage, 425);
        assert_eq!(status.battery_voltage, 54.0);
        assert_eq!(status.battery_charging_current, 12);
        assert_eq!(status.battery_capacity, 100);
        assert_eq!(status.inverter_heat_sink_temperature, 69);
        assert_eq!(status.pv_input_current, 14.0);
        assert_eq!(status.pv_input_voltage, 103.8);
    }

    #[test]
    fn test_parse_general_status_missing_fields() {
        let result = parse_general_status(&reply("(224.6 49.9"));
        assert!(matches!(result, Err(ProtocolError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_general_status_malformed_field() {
        let frame = reply(
            "(224.6 49.9 224.6 49.9 0300 0260 005 425 54.00 012 100 0069 0014 BAD",
        );
        let result = parse_general_status(&frame);
        assert!(matches!(result, Err(ProtocolError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_device_mode_exchange() {
        let frame = Frame::from_ascii("(B").unwrap();
        let mut port = MockSerialPort::with_reply(frame.wire_bytes());

        let mode = device_mode().issue(&mut port, &[]).await.unwrap();
        assert_eq!(mode, DeviceMode::Battery);
    }

    #[tokio::test]
    async fn test_set_output_priority_exchange() {
        let frame = Frame::from_ascii("(ACK").unwrap();
        let mut port = MockSerialPort::with_reply(frame.wire_bytes());

        let operation = set_output_priority().unwrap();
        operation.issue(&mut port, &["02"]).await.unwrap();

        let written = port.get_written_data();
        assert_eq!(written[0], Frame::from_ascii("POP02").unwrap().wire_bytes());
    }
}

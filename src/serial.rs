//! Serial port access.
//!
//! The bridge talks to anything implementing [`Transport`]; real hardware
//! goes through the `serialport` crate.

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};

use crate::config::SerialConfig;
use crate::error::SerialError;

/// A byte stream with an adjustable I/O timeout.
pub trait Transport: Read + Write {
    /// Set the timeout applied to subsequent reads and writes.
    fn set_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;
}

impl Transport for Box<dyn SerialPort> {
    fn set_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        SerialPort::set_timeout(self.as_mut(), timeout).map_err(std::io::Error::from)
    }
}

/// Open the configured serial port.
pub fn open(config: &SerialConfig) -> Result<Box<dyn SerialPort>, SerialError> {
    serialport::new(config.port.as_str(), config.baud_rate)
        .timeout(config.read_timeout())
        .open()
        .map_err(|source| SerialError::Open {
            port: config.port.clone(),
            source,
        })
}

/// A port found on the system.
#[derive(Debug, Clone, PartialEq)]
pub struct PortEntry {
    pub name: String,
    pub description: String,
}

impl std::fmt::Display for PortEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.description)
        }
    }
}

/// List serial ports available on this machine.
pub fn list_ports() -> Result<Vec<PortEntry>, SerialError> {
    let ports = serialport::available_ports().map_err(SerialError::Enumerate)?;
    Ok(ports
        .into_iter()
        .map(|p| PortEntry {
            name: p.port_name,
            description: describe(&p.port_type),
        })
        .collect())
}

fn describe(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut desc = format!("USB {:04x}:{:04x}", usb.vid, usb.pid);
            if let Some(product) = &usb.product {
                desc.push(' ');
                desc.push_str(product);
            }
            desc
        }
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::Unknown => String::new(),
    }
}

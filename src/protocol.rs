//! Command bytes sent by the remote device.

/// Remote asks for a fresh frame.
pub const DATA_REQUEST: u8 = 1;
/// Remote is pushing a NUL-terminated log line.
pub const LOG: u8 = 2;
/// Terminator for a log line.
pub const LOG_TERMINATOR: u8 = 0;

/// A decoded command byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DataRequest,
    Log,
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        match byte {
            DATA_REQUEST => Command::DataRequest,
            LOG => Command::Log,
            other => Command::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_from_byte() {
        assert_eq!(Command::from(1), Command::DataRequest);
        assert_eq!(Command::from(2), Command::Log);
        assert_eq!(Command::from(0), Command::Unknown(0));
        assert_eq!(Command::from(99), Command::Unknown(99));
    }
}

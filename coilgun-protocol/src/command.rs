//! Command bytes received from the host
//!
//! Each command is a single byte. Decoding is total: every byte maps to a
//! [`Command`], unrecognised bytes become [`Command::Unknown`] so the caller
//! can report them instead of silently dropping input.

/// Fire the three-stage sequence (ASCII space)
pub const BYTE_FIRE: u8 = b' ';
/// Abort any active run and force all coils off
pub const BYTE_RESET: u8 = b'c';
/// Run coil and gate diagnostics
pub const BYTE_DIAGNOSE: u8 = b'd';

/// Commands accepted over the host link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Start a firing sequence
    Fire,
    /// Abort / reset to idle
    Reset,
    /// Run diagnostics
    Diagnose,
    /// Byte that does not map to any command
    Unknown(u8),
}

impl Command {
    /// Decode a command from its wire byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            BYTE_FIRE => Command::Fire,
            BYTE_RESET => Command::Reset,
            BYTE_DIAGNOSE => Command::Diagnose,
            other => Command::Unknown(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Fire => BYTE_FIRE,
            Command::Reset => BYTE_RESET,
            Command::Diagnose => BYTE_DIAGNOSE,
            Command::Unknown(byte) => byte,
        }
    }

    /// Returns true if this command must be honoured even mid-run
    pub fn is_abort(&self) -> bool {
        matches!(self, Command::Reset)
    }
}

/// Byte-at-a-time command decoder
///
/// Skips line terminators and counts how many bytes it has discarded so the
/// firmware can report link noise.
#[derive(Debug, Default)]
pub struct CommandDecoder {
    skipped: u32,
}

impl CommandDecoder {
    /// Create a new decoder
    pub const fn new() -> Self {
        Self { skipped: 0 }
    }

    /// Feed a single byte
    ///
    /// Returns `None` for line terminators, otherwise the decoded command.
    pub fn feed(&mut self, byte: u8) -> Option<Command> {
        match byte {
            b'\r' | b'\n' => {
                self.skipped = self.skipped.wrapping_add(1);
                None
            }
            other => Some(Command::from_byte(other)),
        }
    }

    /// Feed multiple bytes, returning the first command found
    ///
    /// Bytes after the first command are not consumed; the returned index
    /// is the number of bytes that were.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (Option<Command>, usize) {
        for (i, &byte) in bytes.iter().enumerate() {
            if let Some(cmd) = self.feed(byte) {
                return (Some(cmd), i + 1);
            }
        }
        (None, bytes.len())
    }

    /// Number of terminator bytes skipped so far
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_bytes() {
        assert_eq!(Command::from_byte(b' '), Command::Fire);
        assert_eq!(Command::from_byte(b'c'), Command::Reset);
        assert_eq!(Command::from_byte(b'd'), Command::Diagnose);
        assert_eq!(Command::from_byte(b'x'), Command::Unknown(b'x'));
    }

    #[test]
    fn test_only_reset_aborts() {
        assert!(Command::Reset.is_abort());
        assert!(!Command::Fire.is_abort());
        assert!(!Command::Diagnose.is_abort());
        assert!(!Command::Unknown(0).is_abort());
    }

    #[test]
    fn test_decoder_skips_line_endings() {
        let mut decoder = CommandDecoder::new();

        let (cmd, used) = decoder.feed_bytes(b"\r\nd\n");
        assert_eq!(cmd, Some(Command::Diagnose));
        assert_eq!(used, 3);
        assert_eq!(decoder.skipped(), 2);

        let (cmd, used) = decoder.feed_bytes(b"\n");
        assert_eq!(cmd, None);
        assert_eq!(used, 1);
    }

    proptest! {
        #[test]
        fn prop_decoding_preserves_byte(byte in any::<u8>()) {
            prop_assume!(byte != b'\r' && byte != b'\n');
            let mut decoder = CommandDecoder::new();
            let cmd = decoder.feed(byte);
            prop_assert_eq!(cmd.map(Command::to_byte), Some(byte));
        }
    }
}

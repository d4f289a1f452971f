use thiserror::Error;

/// A header or frame failed to decode. Carrying these as values (rather than
/// dropping and logging inline) lets callers above the codec layer decide
/// whether a drop is loud or silent.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("unsupported ARP hardware/protocol combination (htype={htype}, ptype={ptype:#06x}, hlen={hlen}, plen={plen})")]
    UnsupportedArpFormat {
        htype: u16,
        ptype: u16,
        hlen: u8,
        plen: u8,
    },

    #[error("unknown ARP operation {0}")]
    UnknownArpOperation(u16),

    #[error("IPv4 header length {ihl} below minimum of 5 32-bit words")]
    IhlTooSmall { ihl: u8 },

    #[error("IPv4 total length {total_length} exceeds frame size {frame_size}")]
    TotalLengthExceedsFrame {
        total_length: usize,
        frame_size: usize,
    },
}

/// A malformed `argv` interface token or control command. Always a
/// configuration-time error (spec §7 kind 5/7): the caller aborts startup or
/// rejects the command line, it never panics.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("empty interface token")]
    EmptyToken,

    #[error("interface token {0:?} has no trailing '[' closed by ']'")]
    UnterminatedBracket(String),

    #[error("unrecognized bracket contents {0:?}, expected \"U:<vid>\", \"T:<vid>,...\", or \"IPV4:<ip>/<prefix>\"")]
    UnrecognizedBracket(String),

    #[error("VLAN id {0} out of range 0..=4094")]
    VlanOutOfRange(u16),

    #[error("invalid IPv4/prefix {0:?}")]
    InvalidCidr(String),

    #[error("prefix length {0} out of range 0..=32")]
    PrefixOutOfRange(u8),

    #[error("MTU {0} out of range 400..=65535")]
    MtuOutOfRange(u32),

    #[error("invalid trailing extra field {0:?}")]
    InvalidExtra(String),

    #[error("invalid MAC address literal {0:?}")]
    InvalidMac(String),

    #[error("at least one interface must be configured")]
    NoInterfaces,
}

/// A rejected `route`/`arp` control-plane command line (spec §4.5.3): never
/// fatal, always just a diagnostic with no state change.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CommandError {
    #[error("unknown command {0:?}")]
    Unknown(String),

    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("unknown interface {0:?}")]
    UnknownInterface(String),
}

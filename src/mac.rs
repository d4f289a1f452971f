//! 6-byte Ethernet MAC addresses.
//!
//! Grounded on the `MacAddress` type in the packet analyser's `shared.rs`,
//! extended with the broadcast/null/group predicates the switch and ARP
//! engines need (spec §3).

use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Default)]
pub struct MacAddress {
    octets: [u8; 6],
}

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress { octets: [0xff; 6] };
    pub const NULL: MacAddress = MacAddress { octets: [0x00; 6] };

    pub const fn new(octets: [u8; 6]) -> Self {
        Self { octets }
    }

    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = data.get(..6)?.try_into().ok()?;
        Some(Self { octets })
    }

    pub const fn octets(&self) -> [u8; 6] {
        self.octets
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// A MAC with the low bit of octet 0 set is a group/multicast address
    /// (spec §3); broadcast is a special case of this but is checked
    /// separately by callers that care about the distinction.
    pub fn is_group(&self) -> bool {
        self.octets[0] & 0x01 != 0
    }

    /// Deterministic locally-administered MAC derived from a 1-based
    /// interface index, used by the harness glue (SPEC_FULL §10.2) when no
    /// explicit MAC is supplied on the `argv` token.
    pub fn locally_administered(ifc_num: u16) -> Self {
        let [hi, lo] = ifc_num.to_be_bytes();
        Self::new([0x02, 0x00, 0x00, 0x00, hi, lo])
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.octets;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacError;

impl fmt::Display for ParseMacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid MAC address literal")
    }
}

impl std::error::Error for ParseMacError {}

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(ParseMacError)?;
            *octet = u8::from_str_radix(part, 16).map_err(|_| ParseMacError)?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError);
        }
        Ok(Self { octets })
    }
}

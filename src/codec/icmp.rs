//! ICMP header (spec §4.1): 1 type, 1 code, 2 checksum, 4 rest-of-header.
//!
//! The only messages this crate ever originates are the two "destination
//! unreachable" variants and (optionally) time-exceeded, all constructed by
//! the router engine (spec §4.5.1); full ICMP echo handling is an explicit
//! non-goal.

use crate::codec::checksum::internet_checksum;
use crate::error::DecodeError;

pub const HEADER_LEN: usize = 8;

pub const TYPE_DEST_UNREACHABLE: u8 = 3;
pub const CODE_NET_UNREACHABLE: u8 = 0;
pub const CODE_FRAGMENTATION_NEEDED: u8 = 4;

pub const TYPE_TIME_EXCEEDED: u8 = 11;
pub const CODE_TTL_EXCEEDED: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpMessage {
    pub icmp_type: u8,
    pub code: u8,
    pub rest_of_header: [u8; 4],
    pub payload: Vec<u8>,
}

impl IcmpMessage {
    pub fn net_unreachable(original_header_and_octets: Vec<u8>) -> Self {
        Self {
            icmp_type: TYPE_DEST_UNREACHABLE,
            code: CODE_NET_UNREACHABLE,
            rest_of_header: [0; 4],
            payload: original_header_and_octets,
        }
    }

    pub fn fragmentation_needed(next_hop_mtu: u16, original_header_and_octets: Vec<u8>) -> Self {
        let mut rest_of_header = [0u8; 4];
        rest_of_header[2..4].copy_from_slice(&next_hop_mtu.to_be_bytes());
        Self {
            icmp_type: TYPE_DEST_UNREACHABLE,
            code: CODE_FRAGMENTATION_NEEDED,
            rest_of_header,
            payload: original_header_and_octets,
        }
    }

    pub fn time_exceeded(original_header_and_octets: Vec<u8>) -> Self {
        Self {
            icmp_type: TYPE_TIME_EXCEEDED,
            code: CODE_TTL_EXCEEDED,
            rest_of_header: [0; 4],
            payload: original_header_and_octets,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < HEADER_LEN {
            return Err(DecodeError::TooShort {
                expected: HEADER_LEN,
                actual: data.len(),
            });
        }
        let rest_of_header = data[4..8].try_into().expect("4 bytes");
        Ok(Self {
            icmp_type: data[0],
            code: data[1],
            rest_of_header,
            payload: data[HEADER_LEN..].to_vec(),
        })
    }

    /// Encode type+code+rest-of-header+payload, computing the checksum over
    /// the whole message with the checksum field zeroed first (spec §4.1).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.push(self.icmp_type);
        out.push(self.code);
        out.extend_from_slice(&[0, 0]); // checksum placeholder
        out.extend_from_slice(&self.rest_of_header);
        out.extend_from_slice(&self.payload);

        let checksum = internet_checksum(&out);
        out[2..4].copy_from_slice(&checksum.to_be_bytes());
        out
    }
}

//! ARP-over-Ethernet/IPv4 (spec §4.1): htype=1, ptype=0x0800, hlen=6, plen=4.

use std::net::Ipv4Addr;

use crate::error::DecodeError;
use crate::mac::MacAddress;

pub const PACKET_LEN: usize = 28;

const HTYPE_ETHERNET: u16 = 1;
const PTYPE_IPV4: u16 = 0x0800;
const HLEN_MAC: u8 = 6;
const PLEN_IPV4: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    Request,
    Reply,
}

impl ArpOperation {
    fn from_code(code: u16) -> Result<Self, DecodeError> {
        match code {
            1 => Ok(Self::Request),
            2 => Ok(Self::Reply),
            other => Err(DecodeError::UnknownArpOperation(other)),
        }
    }

    fn code(self) -> u16 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub operation: ArpOperation,
    pub sender_mac: MacAddress,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddress,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < PACKET_LEN {
            return Err(DecodeError::TooShort {
                expected: PACKET_LEN,
                actual: data.len(),
            });
        }

        let htype = be16(data, 0);
        let ptype = be16(data, 2);
        let hlen = data[4];
        let plen = data[5];

        if htype != HTYPE_ETHERNET || ptype != PTYPE_IPV4 || hlen != HLEN_MAC || plen != PLEN_IPV4
        {
            return Err(DecodeError::UnsupportedArpFormat {
                htype,
                ptype,
                hlen,
                plen,
            });
        }

        let operation = ArpOperation::from_code(be16(data, 6))?;
        let sender_mac = MacAddress::from_slice(&data[8..14]).expect("6 bytes");
        let sender_ip = ipv4(data, 14);
        let target_mac = MacAddress::from_slice(&data[18..24]).expect("6 bytes");
        let target_ip = ipv4(data, 24);

        Ok(Self {
            operation,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        })
    }

    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        out[0..2].copy_from_slice(&HTYPE_ETHERNET.to_be_bytes());
        out[2..4].copy_from_slice(&PTYPE_IPV4.to_be_bytes());
        out[4] = HLEN_MAC;
        out[5] = PLEN_IPV4;
        out[6..8].copy_from_slice(&self.operation.code().to_be_bytes());
        out[8..14].copy_from_slice(&self.sender_mac.octets());
        out[14..18].copy_from_slice(&self.sender_ip.octets());
        out[18..24].copy_from_slice(&self.target_mac.octets());
        out[24..28].copy_from_slice(&self.target_ip.octets());
        out
    }
}

fn be16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn ipv4(data: &[u8], offset: usize) -> Ipv4Addr {
    Ipv4Addr::new(
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    )
}

//! 802.1Q VLAN-aware switch (spec §4.3): extends the learning bridge with
//! ingress classification and per-VLAN learning/flooding/egress encapsulation.

use tracing::{debug, trace};

use crate::bounded_table::BoundedTable;
use crate::codec::ethernet::EthernetFrame;
use crate::device::{Device, Interface};
use crate::mac::MacAddress;

pub const MAC_TABLE_CAPACITY: usize = 50;

pub struct VSwitchEngine {
    table: BoundedTable<(u16, MacAddress), u16>,
}

impl Default for VSwitchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl VSwitchEngine {
    pub fn new() -> Self {
        Self {
            table: BoundedTable::new(MAC_TABLE_CAPACITY),
        }
    }

    pub fn learned_port(&self, vlan: u16, mac: MacAddress) -> Option<u16> {
        self.table.get(&(vlan, mac)).copied()
    }

    pub fn process(&mut self, device: &Device, ingress: u16, frame: &[u8]) -> Vec<(u16, Vec<u8>)> {
        let eth = match EthernetFrame::decode(frame) {
            Ok(eth) => eth,
            Err(error) => {
                debug!(ingress, %error, "dropping undecodable frame");
                return Vec::new();
            }
        };

        let ingress_if = match device.interface(ingress) {
            Some(interface) => interface,
            None => return Vec::new(),
        };

        let vlan = match classify_ingress(ingress_if, eth.vlan) {
            Some(vlan) => vlan,
            None => {
                debug!(ingress, tag = ?eth.vlan, "dropping frame for unmembered VLAN");
                return Vec::new();
            }
        };

        if eth.src == eth.dst {
            debug!(ingress, src = %eth.src, "dropping frame with equal source and destination MAC");
            return Vec::new();
        }
        if eth.src.is_group() {
            debug!(ingress, src = %eth.src, "dropping frame with a group source MAC");
            return Vec::new();
        }

        self.table.insert((vlan, eth.src), ingress);
        trace!(vlan, src = %eth.src, ingress, "learned MAC");

        let egress_ports: Vec<u16> = match self.table.get(&(vlan, eth.dst)).copied() {
            Some(port) if port == ingress => {
                trace!(ingress, dst = %eth.dst, vlan, "dropping self-loopback unicast");
                Vec::new()
            }
            Some(port) => vec![port],
            None => device
                .other_ports(ingress)
                .filter(|interface| interface.is_member_of(vlan))
                .map(|interface| interface.ifc_num)
                .collect(),
        };

        egress_ports
            .into_iter()
            .filter_map(|port| {
                let out_if = device.interface(port)?;
                let bytes = encode_egress(out_if, vlan, eth.dst, eth.src, eth.ethertype, eth.payload)?;
                Some((port, bytes))
            })
            .collect()
    }
}

/// Accept an ingress frame and return its internal VLAN, or `None` to drop
/// (spec §4.3 ingress classification).
fn classify_ingress(ingress_if: &Interface, tag: Option<u16>) -> Option<u16> {
    match tag {
        Some(vid) => ingress_if.tagged_vlans.contains(&vid).then_some(vid),
        None => ingress_if.untagged_vlan,
    }
}

/// Build the egress frame for `vlan` on `out_if`, or `None` if `out_if` is
/// not a member of `vlan` in either form (spec §4.3 egress encapsulation).
fn encode_egress(
    out_if: &Interface,
    vlan: u16,
    dst: MacAddress,
    src: MacAddress,
    ethertype: u16,
    payload: &[u8],
) -> Option<Vec<u8>> {
    if out_if.untagged_vlan == Some(vlan) {
        Some(EthernetFrame::encode(dst, src, None, ethertype, payload))
    } else if out_if.tagged_vlans.contains(&vlan) {
        Some(EthernetFrame::encode(dst, src, Some(vlan), ethertype, payload))
    } else {
        None
    }
}

//! Ethernet learning bridge (spec §4.2).

use tracing::{debug, trace};

use crate::bounded_table::BoundedTable;
use crate::device::Device;
use crate::mac::MacAddress;

pub const MAC_TABLE_CAPACITY: usize = 50;

pub struct SwitchEngine {
    table: BoundedTable<MacAddress, u16>,
}

impl Default for SwitchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchEngine {
    pub fn new() -> Self {
        Self {
            table: BoundedTable::new(MAC_TABLE_CAPACITY),
        }
    }

    pub fn learned_port(&self, mac: MacAddress) -> Option<u16> {
        self.table.get(&mac).copied()
    }

    /// Process a frame received on `ingress`, returning `(egress_port,
    /// bytes)` pairs to emit, in order, per spec §4.2. The frame is never
    /// modified at L2.
    pub fn process(&mut self, device: &Device, ingress: u16, frame: &[u8]) -> Vec<(u16, Vec<u8>)> {
        if frame.len() < 14 {
            debug!(ingress, len = frame.len(), "dropping frame shorter than an Ethernet header");
            return Vec::new();
        }

        let dst = MacAddress::from_slice(&frame[0..6]).expect("checked above");
        let src = MacAddress::from_slice(&frame[6..12]).expect("checked above");

        if src == dst {
            debug!(ingress, %src, "dropping frame with equal source and destination MAC");
            return Vec::new();
        }
        if src.is_group() {
            debug!(ingress, %src, "dropping frame with a group source MAC");
            return Vec::new();
        }

        let evicted = self.table.insert(src, ingress);
        if evicted {
            trace!(%src, ingress, "learned MAC, evicting oldest table entry");
        } else {
            trace!(%src, ingress, "learned MAC");
        }

        match self.table.get(&dst).copied() {
            Some(port) if port == ingress => {
                trace!(ingress, %dst, "dropping self-loopback unicast");
                Vec::new()
            }
            Some(port) => {
                trace!(ingress, egress = port, %dst, "forwarding known unicast");
                vec![(port, frame.to_vec())]
            }
            None => {
                let targets: Vec<u16> = device
                    .other_ports(ingress)
                    .map(|interface| interface.ifc_num)
                    .collect();
                trace!(ingress, count = targets.len(), %dst, "flooding unknown/broadcast destination");
                targets.into_iter().map(|port| (port, frame.to_vec())).collect()
            }
        }
    }
}

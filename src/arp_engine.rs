//! ARP cache + request/response state machine (spec §4.4). Shared by the
//! `arp` binary and embedded inside the router engine, per the design note
//! in spec §9 that the four binaries share the ARP cache type.

use std::net::Ipv4Addr;

use tracing::{debug, trace};

use crate::bounded_table::BoundedTable;
use crate::codec::arp::{ArpOperation, ArpPacket};
use crate::codec::ethernet::{EthernetFrame, ETHERTYPE_ARP};
use crate::device::{Device, Interface};
use crate::error::CommandError;
use crate::mac::MacAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpCacheEntry {
    pub mac: MacAddress,
    pub ifc_num: u16,
    pub netmask: Ipv4Addr,
    pub mtu: u16,
    pub name: String,
}

/// Outcome of resolving or querying an IP against the cache (spec §4.4 `arp
/// <ip> <iface>` command, and the router's internally-driven equivalent in
/// spec §4.5 step 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpQueryOutcome {
    CachedMac(MacAddress),
    Request(Vec<u8>),
    NoOp,
}

pub struct ArpEngine {
    cache: BoundedTable<Ipv4Addr, ArpCacheEntry>,
}

impl ArpEngine {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedTable::new(capacity),
        }
    }

    pub fn get(&self, ip: Ipv4Addr) -> Option<&ArpCacheEntry> {
        self.cache.get(&ip)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ipv4Addr, &ArpCacheEntry)> {
        self.cache.iter().map(|(ip, entry)| (ip, entry))
    }

    fn learn(&mut self, interface: &Interface, ip: Ipv4Addr, mac: MacAddress) {
        let entry = ArpCacheEntry {
            mac,
            ifc_num: interface.ifc_num,
            netmask: interface.netmask().unwrap_or(Ipv4Addr::UNSPECIFIED),
            mtu: interface.mtu_bytes,
            name: interface.name.clone(),
        };
        self.cache.insert(ip, entry);
    }

    /// Handle a decoded Ethernet frame already known to carry an ARP payload
    /// (spec §4.4 steps 1-3). Returns any frames to emit.
    pub fn handle_frame(
        &mut self,
        device: &Device,
        ingress: u16,
        eth: &EthernetFrame<'_>,
    ) -> Vec<(u16, Vec<u8>)> {
        let arp = match ArpPacket::decode(eth.payload) {
            Ok(arp) => arp,
            Err(error) => {
                debug!(ingress, %error, "dropping undecodable ARP frame");
                return Vec::new();
            }
        };

        if arp.sender_mac != eth.src {
            debug!(ingress, eth_src = %eth.src, arp_sha = %arp.sender_mac, "dropping ARP frame with mismatched SHA");
            return Vec::new();
        }

        let Some(ingress_if) = device.interface(ingress) else {
            return Vec::new();
        };

        let mut emitted = Vec::new();
        if arp.operation == ArpOperation::Request && ingress_if.ip() == Some(arp.target_ip) {
            let reply = ArpPacket {
                operation: ArpOperation::Reply,
                sender_mac: ingress_if.mac(),
                sender_ip: arp.target_ip,
                target_mac: arp.sender_mac,
                target_ip: arp.sender_ip,
            };
            let frame = EthernetFrame::encode(
                arp.sender_mac,
                ingress_if.mac(),
                eth.vlan,
                ETHERTYPE_ARP,
                &reply.encode(),
            );
            trace!(ingress, target_ip = %arp.target_ip, "answering ARP request for our own IP");
            emitted.push((ingress, frame));
        }

        self.learn(ingress_if, arp.sender_ip, arp.sender_mac);
        emitted
    }

    /// Resolve `ip` against the cache, or build a request to issue on
    /// `querying_if` (spec §4.4 `arp <ip> <iface>` command and its internal
    /// router-driven counterpart in spec §4.5 step 6).
    pub fn query(&self, querying_if: &Interface, ip: Ipv4Addr) -> ArpQueryOutcome {
        if let Some(entry) = self.cache.get(&ip) {
            if entry.ifc_num == querying_if.ifc_num {
                return ArpQueryOutcome::CachedMac(entry.mac);
            }
        }

        if !querying_if.same_subnet(ip) {
            return ArpQueryOutcome::NoOp;
        }

        let request = ArpPacket {
            operation: ArpOperation::Request,
            sender_mac: querying_if.mac(),
            sender_ip: querying_if.ip().unwrap_or(Ipv4Addr::UNSPECIFIED),
            target_mac: MacAddress::NULL,
            target_ip: ip,
        };
        let frame = EthernetFrame::encode(
            MacAddress::BROADCAST,
            querying_if.mac(),
            None,
            ETHERTYPE_ARP,
            &request.encode(),
        );
        ArpQueryOutcome::Request(frame)
    }

    /// `arp <ip> <iface>` control command (spec §4.4), resolved by interface
    /// name as the operator typed it.
    pub fn handle_query_command(
        &self,
        device: &Device,
        ip: Ipv4Addr,
        iface_name: &str,
    ) -> Result<ArpQueryOutcome, CommandError> {
        let iface = device
            .interface_by_name(iface_name)
            .ok_or_else(|| CommandError::UnknownInterface(iface_name.to_string()))?;
        Ok(self.query(iface, ip))
    }

    /// `arp` bare control command: one line per entry, `<ip> -> <mac>
    /// (<iface-name>)` (spec §4.4).
    pub fn format_cache(&self) -> String {
        let mut out = String::new();
        for (ip, entry) in self.cache.iter() {
            out.push_str(&format!("{} -> {} ({})\n", ip, entry.mac, entry.name));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Interface;

    fn device_with(ip: Ipv4Addr, mask: Ipv4Addr) -> Device {
        let mut interface = Interface::new(1, "eth0");
        interface.ipv4 = Some((ip, mask));
        interface.mac = Some(MacAddress::new([0, 0, 0, 0, 0, 1]));
        Device::new(vec![interface])
    }

    #[test]
    fn s4_query_unknown_ip_in_subnet_emits_request() {
        let mut a = Interface::new(1, "eth0");
        a.ipv4 = Some((Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0)));
        a.mac = Some(MacAddress::new([0, 0, 0, 0, 0, 1]));
        let mut b = Interface::new(2, "eth1");
        b.ipv4 = Some((Ipv4Addr::new(10, 0, 0, 3), Ipv4Addr::new(255, 255, 255, 0)));
        let mut c = Interface::new(3, "eth2");
        c.ipv4 = Some((Ipv4Addr::new(10, 0, 0, 4), Ipv4Addr::new(255, 255, 255, 0)));
        c.mac = Some(MacAddress::new([0, 0, 0, 0, 0, 3]));
        let device = Device::new(vec![a, b, c]);

        let engine = ArpEngine::new(16);
        let outcome = engine
            .handle_query_command(&device, Ipv4Addr::new(10, 0, 0, 4), "eth2")
            .unwrap();
        let frame = match outcome {
            ArpQueryOutcome::Request(frame) => frame,
            other => panic!("expected Request, got {other:?}"),
        };
        let eth = EthernetFrame::decode(&frame).unwrap();
        assert_eq!(eth.dst, MacAddress::BROADCAST);
        assert_eq!(eth.src, MacAddress::new([0, 0, 0, 0, 0, 3]));
        assert_eq!(eth.ethertype, ETHERTYPE_ARP);
        let arp = ArpPacket::decode(eth.payload).unwrap();
        assert_eq!(arp.operation, ArpOperation::Request);
        assert_eq!(arp.sender_mac, MacAddress::new([0, 0, 0, 0, 0, 3]));
        assert_eq!(arp.sender_ip, Ipv4Addr::new(10, 0, 0, 4));
        assert_eq!(arp.target_mac, MacAddress::NULL);
        assert_eq!(arp.target_ip, Ipv4Addr::new(10, 0, 0, 4));
    }

    #[test]
    fn s5_reply_is_learned_and_printed() {
        let device = device_with(Ipv4Addr::new(10, 0, 0, 4), Ipv4Addr::new(255, 255, 255, 0));
        let mut engine = ArpEngine::new(16);
        let sha = MacAddress::new([0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]);
        let reply = ArpPacket {
            operation: ArpOperation::Reply,
            sender_mac: sha,
            sender_ip: Ipv4Addr::new(10, 0, 0, 4),
            target_mac: device.interface(1).unwrap().mac(),
            target_ip: Ipv4Addr::new(10, 0, 0, 4),
        };
        let frame = EthernetFrame::encode(
            device.interface(1).unwrap().mac(),
            sha,
            None,
            ETHERTYPE_ARP,
            &reply.encode(),
        );
        let eth = EthernetFrame::decode(&frame).unwrap();
        let emitted = engine.handle_frame(&device, 1, &eth);
        assert!(emitted.is_empty());
        assert_eq!(
            engine.format_cache(),
            "10.0.0.4 -> 12:34:56:78:9a:bc (eth0)\n"
        );
    }

    #[test]
    fn request_for_our_own_ip_is_answered() {
        let device = device_with(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0));
        let mut engine = ArpEngine::new(16);
        let requester_mac = MacAddress::new([9, 9, 9, 9, 9, 9]);
        let request = ArpPacket {
            operation: ArpOperation::Request,
            sender_mac: requester_mac,
            sender_ip: Ipv4Addr::new(10, 0, 0, 9),
            target_mac: MacAddress::NULL,
            target_ip: Ipv4Addr::new(10, 0, 0, 2),
        };
        let frame = EthernetFrame::encode(
            MacAddress::BROADCAST,
            requester_mac,
            None,
            ETHERTYPE_ARP,
            &request.encode(),
        );
        let eth = EthernetFrame::decode(&frame).unwrap();
        let emitted = engine.handle_frame(&device, 1, &eth);
        assert_eq!(emitted.len(), 1);
        let (port, bytes) = &emitted[0];
        assert_eq!(*port, 1);
        let reply_eth = EthernetFrame::decode(bytes).unwrap();
        assert_eq!(reply_eth.dst, requester_mac);
        assert_eq!(reply_eth.src, device.interface(1).unwrap().mac());
        let reply_arp = ArpPacket::decode(reply_eth.payload).unwrap();
        assert_eq!(reply_arp.operation, ArpOperation::Reply);
        assert_eq!(reply_arp.sender_mac, device.interface(1).unwrap().mac());
        assert_eq!(reply_arp.sender_ip, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(reply_arp.target_mac, requester_mac);
        assert_eq!(reply_arp.target_ip, Ipv4Addr::new(10, 0, 0, 9));

        // The requester's SPA must also have been learned (spec §4.4 step 3 /
        // universal invariant in spec §8).
        assert_eq!(engine.get(Ipv4Addr::new(10, 0, 0, 9)).unwrap().mac, requester_mac);
    }

    #[test]
    fn query_outside_subnet_is_a_noop() {
        let device = device_with(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0));
        let engine = ArpEngine::new(16);
        let outcome = engine
            .handle_query_command(&device, Ipv4Addr::new(192, 168, 1, 1), "eth0")
            .unwrap();
        assert_eq!(outcome, ArpQueryOutcome::NoOp);
    }

    #[test]
    fn mismatched_sha_is_dropped() {
        let device = device_with(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0));
        let mut engine = ArpEngine::new(16);
        let request = ArpPacket {
            operation: ArpOperation::Request,
            sender_mac: MacAddress::new([1, 1, 1, 1, 1, 1]),
            sender_ip: Ipv4Addr::new(10, 0, 0, 9),
            target_mac: MacAddress::NULL,
            target_ip: Ipv4Addr::new(10, 0, 0, 2),
        };
        let frame = EthernetFrame::encode(
            MacAddress::BROADCAST,
            MacAddress::new([2, 2, 2, 2, 2, 2]), // different from arp.sender_mac
            None,
            ETHERTYPE_ARP,
            &request.encode(),
        );
        let eth = EthernetFrame::decode(&frame).unwrap();
        assert!(engine.handle_frame(&device, 1, &eth).is_empty());
        assert!(engine.get(Ipv4Addr::new(10, 0, 0, 9)).is_none());
    }
}

//! IPv4 forwarding engine (spec §4.5): LPM route lookup, ARP-driven next-hop
//! resolution, TTL/checksum handling, MTU-aware fragmentation, and ICMP error
//! generation.

use std::net::Ipv4Addr;

use tracing::{debug, info, trace, warn};

use crate::arp_engine::{ArpEngine, ArpQueryOutcome};
use crate::codec::ethernet::{EthernetFrame, ETHERTYPE_ARP, ETHERTYPE_IPV4};
use crate::codec::icmp::IcmpMessage;
use crate::codec::ipv4::{Ipv4Header, PROTOCOL_ICMP};
use crate::control::RouteSpec;
use crate::device::{network, Device, Interface};
use crate::error::CommandError;
use crate::mac::MacAddress;

pub const ARP_CACHE_CAPACITY: usize = 16;
pub const ROUTING_TABLE_CAPACITY: usize = 16;

/// Outer header used for every ICMP error this engine originates (spec
/// §4.5.1).
const ICMP_TTL: u8 = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub next_hop: Ipv4Addr,
    pub ifc_num: u16,
}

pub struct RoutingTable {
    entries: Vec<RouteEntry>,
    capacity: usize,
}

impl RoutingTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Longest-prefix-match: largest netmask among matching entries, ties
    /// broken by first match (spec §3). `Iterator::max_by_key` breaks ties by
    /// returning the *last* max, so the best match is tracked by hand with a
    /// strict `>` comparison instead.
    pub fn lookup(&self, dst: Ipv4Addr) -> Option<&RouteEntry> {
        let mut best: Option<&RouteEntry> = None;
        for entry in &self.entries {
            if network(dst, entry.netmask) != entry.network {
                continue;
            }
            let is_better = match best {
                Some(current) => u32::from(entry.netmask) > u32::from(current.netmask),
                None => true,
            };
            if is_better {
                best = Some(entry);
            }
        }
        best
    }

    pub fn insert(&mut self, entry: RouteEntry) -> Result<(), CommandError> {
        if self.entries.len() >= self.capacity {
            return Err(CommandError::Malformed("routing table is full".to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the first matching entry (spec §4.5.3 `route del`); a
    /// nonexistent entry is silently ignored (spec §9 open question).
    pub fn remove(&mut self, network: Ipv4Addr, netmask: Ipv4Addr, next_hop: Ipv4Addr, ifc_num: u16) -> bool {
        if let Some(index) = self.entries.iter().position(|entry| {
            entry.network == network
                && entry.netmask == netmask
                && entry.next_hop == next_hop
                && entry.ifc_num == ifc_num
        }) {
            self.entries.remove(index);
            true
        } else {
            false
        }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn format_list(&self, device: &Device) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let iface_name = device
                .interface(entry.ifc_num)
                .map(|i| i.name.as_str())
                .unwrap_or("?");
            out.push_str(&format!(
                "{}/{} -> {} ({})\n",
                entry.network, entry.netmask, entry.next_hop, iface_name
            ));
        }
        out
    }
}

pub struct RouterEngine {
    pub routes: RoutingTable,
    pub arp: ArpEngine,
}

impl RouterEngine {
    /// Build a fresh engine, inserting every locally-connected network as an
    /// on-link route (next-hop = 0.0.0.0), per spec §3.
    pub fn new(device: &Device) -> Self {
        let mut routes = RoutingTable::new(ROUTING_TABLE_CAPACITY);
        for interface in device.interfaces() {
            if let Some((ip, mask)) = interface.ipv4 {
                let entry = RouteEntry {
                    network: network(ip, mask),
                    netmask: mask,
                    next_hop: Ipv4Addr::UNSPECIFIED,
                    ifc_num: interface.ifc_num,
                };
                info!(iface = %interface.name, network = %entry.network, netmask = %mask, "installed on-link route");
                routes
                    .insert(entry)
                    .expect("on-link routes fit within capacity at startup");
            }
        }
        Self {
            routes,
            arp: ArpEngine::new(ARP_CACHE_CAPACITY),
        }
    }

    pub fn handle_route_add(&mut self, device: &Device, spec: RouteSpec) -> Result<(), CommandError> {
        let iface = device
            .interface_by_name(&spec.iface)
            .ok_or_else(|| CommandError::UnknownInterface(spec.iface.clone()))?;
        self.routes.insert(RouteEntry {
            network: spec.network,
            netmask: spec.netmask,
            next_hop: spec.next_hop,
            ifc_num: iface.ifc_num,
        })
    }

    pub fn handle_route_del(&mut self, device: &Device, spec: RouteSpec) -> Result<bool, CommandError> {
        let iface = device
            .interface_by_name(&spec.iface)
            .ok_or_else(|| CommandError::UnknownInterface(spec.iface.clone()))?;
        Ok(self
            .routes
            .remove(spec.network, spec.netmask, spec.next_hop, iface.ifc_num))
    }

    /// Process a frame received on `ingress`, per spec §4.5 steps 1-8.
    /// Returns `(egress_port, bytes)` pairs to emit, in order.
    pub fn process(&mut self, device: &Device, ingress: u16, frame: &[u8]) -> Vec<(u16, Vec<u8>)> {
        let eth = match EthernetFrame::decode(frame) {
            Ok(eth) => eth,
            Err(error) => {
                debug!(ingress, %error, "dropping undecodable frame");
                return Vec::new();
            }
        };

        match eth.ethertype {
            ETHERTYPE_ARP => self.arp.handle_frame(device, ingress, &eth),
            ETHERTYPE_IPV4 => self.process_ipv4(device, ingress, &eth),
            other => {
                debug!(ingress, ethertype = format!("{other:#06x}"), "dropping frame with unknown EtherType");
                Vec::new()
            }
        }
    }

    fn process_ipv4(&mut self, device: &Device, ingress: u16, eth: &EthernetFrame<'_>) -> Vec<(u16, Vec<u8>)> {
        let Some(ingress_if) = device.interface(ingress) else {
            return Vec::new();
        };

        let (mut header, payload) = match Ipv4Header::decode(eth.payload) {
            Ok(result) => result,
            Err(error) => {
                debug!(ingress, %error, "dropping undecodable IPv4 packet");
                return Vec::new();
            }
        };
        let payload = payload.to_vec();

        let route = match self.routes.lookup(header.dst) {
            Some(route) => route.clone(),
            None => {
                warn!(ingress, dst = %header.dst, "no route, emitting ICMP net unreachable");
                return icmp_back(
                    ingress_if,
                    eth.src,
                    header.src,
                    IcmpMessage::net_unreachable(icmp_original_octets(&header, &payload)),
                );
            }
        };

        if header.ttl <= 1 {
            trace!(ingress, dst = %header.dst, "dropping packet with expired TTL");
            return Vec::new();
        }
        let received_header = header.clone();
        header.ttl -= 1;

        let next_hop_ip = if route.next_hop == Ipv4Addr::UNSPECIFIED {
            header.dst
        } else {
            route.next_hop
        };
        let Some(egress_if) = device.interface(route.ifc_num) else {
            return Vec::new();
        };

        let next_hop_mac = match self.arp.query(egress_if, next_hop_ip) {
            ArpQueryOutcome::CachedMac(mac) => mac,
            ArpQueryOutcome::Request(request_frame) => {
                trace!(egress = egress_if.ifc_num, next_hop = %next_hop_ip, "ARP miss, issuing request and dropping packet");
                return vec![(egress_if.ifc_num, request_frame)];
            }
            ArpQueryOutcome::NoOp => {
                debug!(egress = egress_if.ifc_num, next_hop = %next_hop_ip, "next-hop outside egress subnet, dropping packet");
                return Vec::new();
            }
        };

        let carried_len = header.header_len() + payload.len();
        let mtu = egress_if.payload_mtu() as usize;

        if carried_len <= mtu {
            let bytes = header.encode(&payload);
            let frame = EthernetFrame::encode(next_hop_mac, egress_if.mac(), None, ETHERTYPE_IPV4, &bytes);
            return vec![(route.ifc_num, frame)];
        }

        if header.df {
            warn!(egress = egress_if.ifc_num, mtu, "fragmentation needed but DF set, emitting ICMP");
            return icmp_back(
                ingress_if,
                eth.src,
                header.src,
                IcmpMessage::fragmentation_needed(mtu as u16, icmp_original_octets(&received_header, &payload)),
            );
        }

        fragment_and_emit(&header, &payload, egress_if, next_hop_mac, route.ifc_num)
    }
}

/// The ICMP payload: the original IPv4 header (as it stood at the point of
/// the error) plus the first 8 bytes of its payload (spec §4.5.1).
fn icmp_original_octets(header: &Ipv4Header, payload: &[u8]) -> Vec<u8> {
    let full = header.encode(payload);
    let take = header.header_len() + payload.len().min(8);
    full[..take].to_vec()
}

fn icmp_back(
    ingress_if: &Interface,
    sender_mac: MacAddress,
    original_src: Ipv4Addr,
    icmp: IcmpMessage,
) -> Vec<(u16, Vec<u8>)> {
    let outer = Ipv4Header {
        ihl: 5,
        dscp_ecn: 0,
        identification: 0,
        df: false,
        mf: false,
        fragment_offset: 0,
        ttl: ICMP_TTL,
        protocol: PROTOCOL_ICMP,
        src: ingress_if.ip().unwrap_or(Ipv4Addr::UNSPECIFIED),
        dst: original_src,
        options: Vec::new(),
    };
    let ip_bytes = outer.encode(&icmp.encode());
    let frame = EthernetFrame::encode(sender_mac, ingress_if.mac(), None, ETHERTYPE_IPV4, &ip_bytes);
    vec![(ingress_if.ifc_num, frame)]
}

/// Split `payload` into MTU-sized fragments (spec §4.5.2). `header` already
/// carries the post-TTL-decrement state.
fn fragment_and_emit(
    header: &Ipv4Header,
    payload: &[u8],
    egress_if: &Interface,
    next_hop_mac: MacAddress,
    egress_port: u16,
) -> Vec<(u16, Vec<u8>)> {
    let mtu = egress_if.payload_mtu() as usize;
    let header_len = header.header_len();
    let chunk_len = ((mtu.saturating_sub(header_len)) / 8) * 8;
    if chunk_len == 0 {
        warn!(egress = egress_port, mtu, "MTU too small to carry even one 8-byte fragment chunk, dropping");
        return Vec::new();
    }

    let mut emitted = Vec::new();
    let mut offset = 0usize;
    while offset < payload.len() {
        let remaining = payload.len() - offset;
        let this_chunk = remaining.min(chunk_len);
        let is_last = offset + this_chunk >= payload.len();

        let mut fragment_header = header.clone();
        fragment_header.fragment_offset = (offset / 8) as u16;
        fragment_header.df = false;
        fragment_header.mf = if is_last { header.mf } else { true };

        let chunk = &payload[offset..offset + this_chunk];
        let bytes = fragment_header.encode(chunk);
        let frame = EthernetFrame::encode(next_hop_mac, egress_if.mac(), None, ETHERTYPE_IPV4, &bytes);
        trace!(egress = egress_port, offset = fragment_header.fragment_offset, len = chunk.len(), mf = fragment_header.mf, "emitting fragment");
        emitted.push((egress_port, frame));
        offset += this_chunk;
    }
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::arp::{ArpOperation, ArpPacket};
    use crate::codec::ipv4::PROTOCOL_TCP;
    use crate::mac::MacAddress;

    fn iface(ifc_num: u16, name: &str, ip: Ipv4Addr, mask: Ipv4Addr, mac: MacAddress) -> Interface {
        let mut interface = Interface::new(ifc_num, name);
        interface.ipv4 = Some((ip, mask));
        interface.mac = Some(mac);
        interface
    }

    fn mac(n: u8) -> MacAddress {
        MacAddress::new([0xaa, 0xaa, 0xaa, 0xaa, 0xaa, n])
    }

    fn sample_device() -> Device {
        Device::new(vec![
            iface(1, "eth0", Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0), mac(1)),
            iface(2, "eth1", Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(255, 255, 255, 0), mac(2)),
        ])
    }

    fn learn_arp(engine: &mut RouterEngine, device: &Device, ifc_num: u16, ip: Ipv4Addr, mac: MacAddress) {
        let iface = device.interface(ifc_num).unwrap();
        let reply = ArpPacket {
            operation: ArpOperation::Reply,
            sender_mac: mac,
            sender_ip: ip,
            target_mac: iface.mac(),
            target_ip: iface.ip().unwrap(),
        };
        let frame = EthernetFrame::encode(iface.mac(), mac, None, ETHERTYPE_ARP, &reply.encode());
        engine.process(device, ifc_num, &frame);
    }

    fn ipv4_frame(src: MacAddress, dst: MacAddress, header: &Ipv4Header, payload: &[u8]) -> Vec<u8> {
        EthernetFrame::encode(dst, src, None, ETHERTYPE_IPV4, &header.encode(payload))
    }

    #[test]
    fn s6_forwards_with_ttl_decrement() {
        let device = sample_device();
        let mut engine = RouterEngine::new(&device);
        engine
            .handle_route_add(
                &device,
                RouteSpec {
                    network: Ipv4Addr::new(10, 0, 1, 0),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                    next_hop: Ipv4Addr::new(10, 0, 0, 5),
                    iface: "eth1".to_string(),
                },
            )
            .unwrap();
        learn_arp(&mut engine, &device, 2, Ipv4Addr::new(10, 0, 0, 5), MacAddress::new([0xaa; 6]));

        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 7,
            df: false,
            mf: false,
            fragment_offset: 0,
            ttl: 64,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(10, 0, 1, 7),
            options: Vec::new(),
        };
        let payload = vec![7u8; 100];
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &payload);

        let emitted = engine.process(&device, 1, &frame);
        assert_eq!(emitted.len(), 1);
        let (port, bytes) = &emitted[0];
        assert_eq!(*port, 2);
        let eth = EthernetFrame::decode(bytes).unwrap();
        assert_eq!(eth.dst, MacAddress::new([0xaa; 6]));
        assert_eq!(eth.src, mac(2));
        let (decoded, decoded_payload) = Ipv4Header::decode(eth.payload).unwrap();
        assert_eq!(decoded.ttl, 63);
        assert_eq!(decoded_payload, payload.as_slice());
    }

    #[test]
    fn s7_fragments_when_oversized_and_df_clear() {
        let device = Device::new(vec![
            iface(1, "eth0", Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0), mac(1)),
            {
                let mut eth1 = iface(2, "eth1", Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(255, 255, 255, 0), mac(2));
                eth1.mtu_bytes = 600 + 14;
                eth1
            },
        ]);
        let mut engine = RouterEngine::new(&device);
        engine
            .handle_route_add(
                &device,
                RouteSpec {
                    network: Ipv4Addr::new(10, 0, 1, 0),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                    next_hop: Ipv4Addr::new(10, 0, 0, 6),
                    iface: "eth1".to_string(),
                },
            )
            .unwrap();
        learn_arp(&mut engine, &device, 2, Ipv4Addr::new(10, 0, 0, 6), MacAddress::new([0xbb; 6]));

        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 42,
            df: false,
            mf: false,
            fragment_offset: 0,
            ttl: 10,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(10, 0, 1, 7),
            options: Vec::new(),
        };
        let payload: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &payload);

        let emitted = engine.process(&device, 1, &frame);
        // M = 600, M' = (600 - 20) rounded down to a multiple of 8 = 576.
        assert_eq!(emitted.len(), 2);

        let (port0, bytes0) = &emitted[0];
        assert_eq!(*port0, 2);
        let eth0 = EthernetFrame::decode(bytes0).unwrap();
        let (h0, p0) = Ipv4Header::decode(eth0.payload).unwrap();
        assert!(h0.mf);
        assert_eq!(h0.fragment_offset, 0);
        assert_eq!(p0.len(), 576);

        let (port1, bytes1) = &emitted[1];
        assert_eq!(*port1, 2);
        let eth1 = EthernetFrame::decode(bytes1).unwrap();
        let (h1, p1) = Ipv4Header::decode(eth1.payload).unwrap();
        assert!(!h1.mf);
        assert_eq!(h1.fragment_offset, 72); // 576 / 8
        assert_eq!(p1.len(), 424);

        let mut reassembled = p0.to_vec();
        reassembled.extend_from_slice(p1);
        assert_eq!(reassembled, payload);
    }

    #[test]
    fn no_route_emits_icmp_net_unreachable() {
        let device = sample_device();
        let mut engine = RouterEngine::new(&device);
        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 1,
            df: false,
            mf: false,
            fragment_offset: 0,
            ttl: 64,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(192, 168, 50, 1),
            options: Vec::new(),
        };
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &[1, 2, 3]);

        let emitted = engine.process(&device, 1, &frame);
        assert_eq!(emitted.len(), 1);
        let (port, bytes) = &emitted[0];
        assert_eq!(*port, 1);
        let eth = EthernetFrame::decode(bytes).unwrap();
        assert_eq!(eth.dst, MacAddress::new([9; 6]));
        let (ip_header, ip_payload) = Ipv4Header::decode(eth.payload).unwrap();
        assert_eq!(ip_header.protocol, PROTOCOL_ICMP);
        assert_eq!(ip_header.dst, Ipv4Addr::new(10, 0, 0, 9));
        let icmp = IcmpMessage::decode(ip_payload).unwrap();
        assert_eq!(icmp.icmp_type, crate::codec::icmp::TYPE_DEST_UNREACHABLE);
        assert_eq!(icmp.code, crate::codec::icmp::CODE_NET_UNREACHABLE);
    }

    #[test]
    fn df_set_and_oversized_emits_fragmentation_needed() {
        let device = Device::new(vec![
            iface(1, "eth0", Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(255, 255, 255, 0), mac(1)),
            {
                let mut eth1 = iface(2, "eth1", Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(255, 255, 255, 0), mac(2));
                eth1.mtu_bytes = 600 + 14;
                eth1
            },
        ]);
        let mut engine = RouterEngine::new(&device);
        engine
            .handle_route_add(
                &device,
                RouteSpec {
                    network: Ipv4Addr::new(10, 0, 1, 0),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                    next_hop: Ipv4Addr::new(10, 0, 0, 6),
                    iface: "eth1".to_string(),
                },
            )
            .unwrap();
        learn_arp(&mut engine, &device, 2, Ipv4Addr::new(10, 0, 0, 6), MacAddress::new([0xbb; 6]));

        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 1,
            df: true,
            mf: false,
            fragment_offset: 0,
            ttl: 10,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(10, 0, 1, 7),
            options: Vec::new(),
        };
        let payload = vec![0u8; 1000];
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &payload);

        let emitted = engine.process(&device, 1, &frame);
        assert_eq!(emitted.len(), 1);
        let (port, bytes) = &emitted[0];
        assert_eq!(*port, 1);
        let eth = EthernetFrame::decode(bytes).unwrap();
        let (ip_header, ip_payload) = Ipv4Header::decode(eth.payload).unwrap();
        let icmp = IcmpMessage::decode(ip_payload).unwrap();
        assert_eq!(icmp.code, crate::codec::icmp::CODE_FRAGMENTATION_NEEDED);
        assert_eq!(
            u16::from_be_bytes([icmp.rest_of_header[2], icmp.rest_of_header[3]]),
            600
        );
        assert_eq!(ip_header.protocol, PROTOCOL_ICMP);

        // The embedded original header must reflect the packet as received,
        // not the post-decrement copy used for forwarding.
        let (original_header, _) = Ipv4Header::decode(&icmp.payload).unwrap();
        assert_eq!(original_header.ttl, 10);
    }

    #[test]
    fn missing_arp_entry_issues_request_and_drops_packet() {
        let device = sample_device();
        let mut engine = RouterEngine::new(&device);
        engine
            .handle_route_add(
                &device,
                RouteSpec {
                    network: Ipv4Addr::new(10, 0, 1, 0),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                    next_hop: Ipv4Addr::new(10, 0, 0, 6),
                    iface: "eth1".to_string(),
                },
            )
            .unwrap();

        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 1,
            df: false,
            mf: false,
            fragment_offset: 0,
            ttl: 10,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(10, 0, 1, 7),
            options: Vec::new(),
        };
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &[1, 2, 3]);

        let emitted = engine.process(&device, 1, &frame);
        assert_eq!(emitted.len(), 1);
        let (port, bytes) = &emitted[0];
        assert_eq!(*port, 2);
        let eth = EthernetFrame::decode(bytes).unwrap();
        assert_eq!(eth.ethertype, ETHERTYPE_ARP);
        let arp = ArpPacket::decode(eth.payload).unwrap();
        assert_eq!(arp.operation, ArpOperation::Request);
        assert_eq!(arp.target_ip, Ipv4Addr::new(10, 0, 0, 6));
    }

    #[test]
    fn ttl_of_one_is_silently_dropped() {
        let device = sample_device();
        let mut engine = RouterEngine::new(&device);
        engine
            .handle_route_add(
                &device,
                RouteSpec {
                    network: Ipv4Addr::new(10, 0, 1, 0),
                    netmask: Ipv4Addr::new(255, 255, 255, 0),
                    next_hop: Ipv4Addr::new(10, 0, 0, 6),
                    iface: "eth1".to_string(),
                },
            )
            .unwrap();
        learn_arp(&mut engine, &device, 2, Ipv4Addr::new(10, 0, 0, 6), MacAddress::new([0xbb; 6]));

        let header = Ipv4Header {
            ihl: 5,
            dscp_ecn: 0,
            identification: 1,
            df: false,
            mf: false,
            fragment_offset: 0,
            ttl: 1,
            protocol: PROTOCOL_TCP,
            src: Ipv4Addr::new(10, 0, 0, 9),
            dst: Ipv4Addr::new(10, 0, 1, 7),
            options: Vec::new(),
        };
        let frame = ipv4_frame(MacAddress::new([9; 6]), device.interface(1).unwrap().mac(), &header, &[1]);
        assert!(engine.process(&device, 1, &frame).is_empty());
    }

    #[test]
    fn lookup_breaks_netmask_ties_by_first_inserted_route() {
        let mut table = RoutingTable::new(ROUTING_TABLE_CAPACITY);
        let first = RouteEntry {
            network: Ipv4Addr::new(10, 0, 1, 0),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            next_hop: Ipv4Addr::new(10, 0, 0, 5),
            ifc_num: 1,
        };
        let second = RouteEntry {
            network: Ipv4Addr::new(10, 0, 1, 0),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            next_hop: Ipv4Addr::new(10, 0, 0, 9),
            ifc_num: 2,
        };
        table.insert(first.clone()).unwrap();
        table.insert(second).unwrap();

        let matched = table.lookup(Ipv4Addr::new(10, 0, 1, 7)).unwrap();
        assert_eq!(matched, &first);
    }
}

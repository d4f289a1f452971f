//! The `Device` value that owns every interface and is threaded through the
//! three event callbacks (spec §9 "Global tables" design note). All four
//! binaries (switch/vswitch/arp/router) build one of these from `argv` and
//! differ only in which engine they dispatch frames into.

use std::net::Ipv4Addr;

use crate::mac::MacAddress;

/// Default Ethernet-payload MTU (spec §3), before the 14-byte header is
/// added to get the internally-stored value.
pub const DEFAULT_PAYLOAD_MTU: u16 = 1500;
pub const ETHERNET_HEADER_LEN: u16 = 14;
pub const MIN_PAYLOAD_MTU: u16 = 400;

#[derive(Debug, Clone)]
pub struct Interface {
    /// 1-based, dense (spec §3 invariant).
    pub ifc_num: u16,
    pub name: String,
    /// Assigned by the harness at runtime via `on_mac`, not at construction
    /// (spec §3); `None` until then.
    pub mac: Option<MacAddress>,
    /// (address, netmask) for L3-capable variants (arp/router).
    pub ipv4: Option<(Ipv4Addr, Ipv4Addr)>,
    /// Internal storage: payload MTU + 14-byte Ethernet header.
    pub mtu_bytes: u16,
    /// Access (untagged) VLAN membership, for vswitch ports.
    pub untagged_vlan: Option<u16>,
    /// Trunk (tagged) VLAN memberships, for vswitch ports.
    pub tagged_vlans: Vec<u16>,
}

impl Interface {
    pub fn new(ifc_num: u16, name: impl Into<String>) -> Self {
        Self {
            ifc_num,
            name: name.into(),
            mac: None,
            ipv4: None,
            mtu_bytes: DEFAULT_PAYLOAD_MTU + ETHERNET_HEADER_LEN,
            untagged_vlan: None,
            tagged_vlans: Vec::new(),
        }
    }

    pub fn payload_mtu(&self) -> u16 {
        self.mtu_bytes - ETHERNET_HEADER_LEN
    }

    pub fn mac(&self) -> MacAddress {
        self.mac.unwrap_or(MacAddress::NULL)
    }

    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ipv4.map(|(ip, _)| ip)
    }

    pub fn netmask(&self) -> Option<Ipv4Addr> {
        self.ipv4.map(|(_, mask)| mask)
    }

    /// Is `ip` in this interface's locally-attached subnet (spec §4.4 `arp`
    /// command step 2)?
    pub fn same_subnet(&self, ip: Ipv4Addr) -> bool {
        match self.ipv4 {
            Some((our_ip, mask)) => network(our_ip, mask) == network(ip, mask),
            None => false,
        }
    }

    /// Does this port carry VLAN `vlan` in some form (tagged or untagged)?
    pub fn is_member_of(&self, vlan: u16) -> bool {
        self.untagged_vlan == Some(vlan) || self.tagged_vlans.contains(&vlan)
    }
}

pub fn network(ip: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(ip) & u32::from(mask))
}

#[derive(Debug, Clone, Default)]
pub struct Device {
    interfaces: Vec<Interface>,
}

impl Device {
    pub fn new(interfaces: Vec<Interface>) -> Self {
        Self { interfaces }
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    pub fn interface(&self, ifc_num: u16) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|interface| interface.ifc_num == ifc_num)
    }

    pub fn interface_mut(&mut self, ifc_num: u16) -> Option<&mut Interface> {
        self.interfaces
            .iter_mut()
            .find(|interface| interface.ifc_num == ifc_num)
    }

    pub fn interface_by_name(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|interface| interface.name == name)
    }

    /// Harness callback: assign a MAC to an interface (spec §6 `on_mac`).
    /// Panics if `ifc_num` is unknown -- an invariant violation per spec §7
    /// kind 6, the harness is never supposed to reference a nonexistent port.
    pub fn assign_mac(&mut self, ifc_num: u16, mac: MacAddress) {
        match self.interface_mut(ifc_num) {
            Some(interface) => interface.mac = Some(mac),
            None => panic!("on_mac for unknown ifc_num {ifc_num}"),
        }
    }

    pub fn other_ports(&self, ingress: u16) -> impl Iterator<Item = &Interface> {
        self.interfaces
            .iter()
            .filter(move |interface| interface.ifc_num != ingress)
    }
}

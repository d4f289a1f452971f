//! `argv` interface-token parsing (SPEC_FULL §10.3): one token per
//! interface, producing a [`Device`] ready for a binary's event loop.
//!
//! Grammar: `name ["[" vlan-or-ip-spec "]"]* ["=" extra]`, where a
//! `vlan-or-ip-spec` is `U:<vid>`, `T:<vid>(,<vid>)*`, or `IPV4:<ip>/<prefix>`,
//! and `extra` is either an MTU (bare digits) or a MAC literal (hex
//! colon-separated).

use std::net::Ipv4Addr;

use crate::device::{Device, Interface, ETHERNET_HEADER_LEN};
use crate::error::ConfigError;
use crate::mac::MacAddress;

#[derive(Debug, Default, Clone)]
struct InterfaceSpec {
    name: String,
    untagged_vlan: Option<u16>,
    tagged_vlans: Vec<u16>,
    ipv4: Option<(Ipv4Addr, Ipv4Addr)>,
    mtu_bytes: Option<u16>,
    mac: Option<MacAddress>,
}

/// The result of parsing `argv`: a `Device` with every interface's static
/// attributes set, plus the MAC each interface should be assigned with at
/// startup (explicit `=<mac>` override, or `None` meaning "generate a
/// deterministic locally-administered one", per SPEC_FULL §10.2).
pub struct ParsedConfig {
    pub device: Device,
    pub mac_overrides: Vec<Option<MacAddress>>,
}

pub fn parse_argv<S: AsRef<str>>(args: &[S]) -> Result<ParsedConfig, ConfigError> {
    if args.is_empty() {
        return Err(ConfigError::NoInterfaces);
    }

    let mut interfaces = Vec::with_capacity(args.len());
    let mut mac_overrides = Vec::with_capacity(args.len());

    for (index, token) in args.iter().enumerate() {
        let ifc_num = (index + 1) as u16;
        let spec = parse_token(token.as_ref())?;

        let mut interface = Interface::new(ifc_num, spec.name);
        interface.untagged_vlan = spec.untagged_vlan;
        interface.tagged_vlans = spec.tagged_vlans;
        interface.ipv4 = spec.ipv4;
        if let Some(mtu_bytes) = spec.mtu_bytes {
            interface.mtu_bytes = mtu_bytes;
        }

        interfaces.push(interface);
        mac_overrides.push(spec.mac);
    }

    Ok(ParsedConfig {
        device: Device::new(interfaces),
        mac_overrides,
    })
}

fn parse_token(token: &str) -> Result<InterfaceSpec, ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::EmptyToken);
    }

    let bytes = token.as_bytes();
    let mut cursor = 0;
    while cursor < bytes.len() && bytes[cursor] != b'[' && bytes[cursor] != b'=' {
        cursor += 1;
    }
    if cursor == 0 {
        return Err(ConfigError::EmptyToken);
    }

    let mut spec = InterfaceSpec {
        name: token[..cursor].to_string(),
        ..InterfaceSpec::default()
    };

    while cursor < token.len() && token.as_bytes()[cursor] == b'[' {
        let close = token[cursor..]
            .find(']')
            .map(|offset| cursor + offset)
            .ok_or_else(|| ConfigError::UnterminatedBracket(token.to_string()))?;
        apply_bracket(&mut spec, &token[cursor + 1..close])?;
        cursor = close + 1;
    }

    if cursor < token.len() {
        if token.as_bytes()[cursor] != b'=' {
            return Err(ConfigError::InvalidExtra(token[cursor..].to_string()));
        }
        apply_extra(&mut spec, &token[cursor + 1..])?;
    }

    Ok(spec)
}

fn apply_bracket(spec: &mut InterfaceSpec, inner: &str) -> Result<(), ConfigError> {
    if let Some(rest) = inner.strip_prefix("U:") {
        spec.untagged_vlan = Some(parse_vlan_id(rest, inner)?);
    } else if let Some(rest) = inner.strip_prefix("T:") {
        for part in rest.split(',') {
            spec.tagged_vlans.push(parse_vlan_id(part, inner)?);
        }
    } else if let Some(rest) = inner.strip_prefix("IPV4:") {
        spec.ipv4 = Some(parse_cidr(rest)?);
    } else {
        return Err(ConfigError::UnrecognizedBracket(inner.to_string()));
    }
    Ok(())
}

fn parse_vlan_id(token: &str, bracket: &str) -> Result<u16, ConfigError> {
    let vid: u16 = token
        .parse()
        .map_err(|_| ConfigError::UnrecognizedBracket(bracket.to_string()))?;
    if vid > 4094 {
        return Err(ConfigError::VlanOutOfRange(vid));
    }
    Ok(vid)
}

fn parse_cidr(rest: &str) -> Result<(Ipv4Addr, Ipv4Addr), ConfigError> {
    let (ip_str, prefix_str) = rest
        .split_once('/')
        .ok_or_else(|| ConfigError::InvalidCidr(rest.to_string()))?;
    let ip: Ipv4Addr = ip_str
        .parse()
        .map_err(|_| ConfigError::InvalidCidr(rest.to_string()))?;
    let prefix: u8 = prefix_str
        .parse()
        .map_err(|_| ConfigError::InvalidCidr(rest.to_string()))?;
    if prefix > 32 {
        return Err(ConfigError::PrefixOutOfRange(prefix));
    }
    let bits = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Ok((ip, Ipv4Addr::from(bits)))
}

fn apply_extra(spec: &mut InterfaceSpec, extra: &str) -> Result<(), ConfigError> {
    if extra.is_empty() {
        return Err(ConfigError::InvalidExtra(extra.to_string()));
    }
    if extra.bytes().all(|b| b.is_ascii_digit()) {
        let mtu: u32 = extra
            .parse()
            .map_err(|_| ConfigError::InvalidExtra(extra.to_string()))?;
        if !(400..=65535).contains(&mtu) {
            return Err(ConfigError::MtuOutOfRange(mtu));
        }
        spec.mtu_bytes = Some(mtu as u16 + ETHERNET_HEADER_LEN);
    } else {
        let mac: MacAddress = extra
            .parse()
            .map_err(|_| ConfigError::InvalidMac(extra.to_string()))?;
        spec.mac = Some(mac);
    }
    Ok(())
}

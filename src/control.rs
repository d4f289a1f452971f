//! Control-line grammar for the `arp`/`route` commands (spec §4.4, §4.5.3).
//! Parsing only; dispatching a parsed command into an engine is left to the
//! binaries and to [`crate::router::RouterEngine`].

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::CommandError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArpCommand {
    Show,
    Query { ip: Ipv4Addr, iface: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub network: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub next_hop: Ipv4Addr,
    pub iface: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteCommand {
    List,
    Add(RouteSpec),
    Del(RouteSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Arp(ArpCommand),
    Route(RouteCommand),
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let mut tokens = line.split_whitespace();
    let head = tokens.next().ok_or(CommandError::Malformed("empty command".into()))?;
    match head {
        "arp" => parse_arp(tokens).map(Command::Arp),
        "route" => parse_route(tokens).map(Command::Route),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_arp<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<ArpCommand, CommandError> {
    let Some(ip_token) = tokens.next() else {
        return Ok(ArpCommand::Show);
    };
    let ip = Ipv4Addr::from_str(ip_token)
        .map_err(|_| CommandError::Malformed(format!("invalid IPv4 address {ip_token:?}")))?;
    let iface = tokens
        .next()
        .ok_or_else(|| CommandError::Malformed("arp <ip> <iface> requires an interface".into()))?
        .to_string();
    if tokens.next().is_some() {
        return Err(CommandError::Malformed("too many arguments to arp".into()));
    }
    Ok(ArpCommand::Query { ip, iface })
}

fn parse_route<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<RouteCommand, CommandError> {
    match tokens.next() {
        None | Some("list") => {
            if tokens.next().is_some() {
                return Err(CommandError::Malformed("too many arguments to route list".into()));
            }
            Ok(RouteCommand::List)
        }
        Some("add") => parse_route_spec(tokens).map(RouteCommand::Add),
        Some("del") => parse_route_spec(tokens).map(RouteCommand::Del),
        Some(other) => Err(CommandError::Malformed(format!("unknown route subcommand {other:?}"))),
    }
}

/// `<net>/<mask> via <next-hop> dev <iface>`.
fn parse_route_spec<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<RouteSpec, CommandError> {
    let cidr = tokens
        .next()
        .ok_or_else(|| CommandError::Malformed("route spec missing network/mask".into()))?;
    let (network, netmask) = parse_net_mask(cidr)?;

    expect_literal(&mut tokens, "via")?;
    let next_hop_token = tokens
        .next()
        .ok_or_else(|| CommandError::Malformed("route spec missing next-hop after 'via'".into()))?;
    let next_hop = Ipv4Addr::from_str(next_hop_token)
        .map_err(|_| CommandError::Malformed(format!("invalid next-hop address {next_hop_token:?}")))?;

    expect_literal(&mut tokens, "dev")?;
    let iface = tokens
        .next()
        .ok_or_else(|| CommandError::Malformed("route spec missing interface after 'dev'".into()))?
        .to_string();

    if tokens.next().is_some() {
        return Err(CommandError::Malformed("too many arguments to route spec".into()));
    }

    Ok(RouteSpec {
        network,
        netmask,
        next_hop,
        iface,
    })
}

fn expect_literal<'a>(tokens: &mut impl Iterator<Item = &'a str>, literal: &str) -> Result<(), CommandError> {
    match tokens.next() {
        Some(token) if token == literal => Ok(()),
        Some(other) => Err(CommandError::Malformed(format!("expected {literal:?}, got {other:?}"))),
        None => Err(CommandError::Malformed(format!("expected {literal:?}, got nothing"))),
    }
}

/// `<ipv4>/<netmask-as-dotted-quad-or-prefixlen>`, e.g. `10.0.1.0/24`.
fn parse_net_mask(token: &str) -> Result<(Ipv4Addr, Ipv4Addr), CommandError> {
    let (net, mask) = token
        .split_once('/')
        .ok_or_else(|| CommandError::Malformed(format!("{token:?} is not <net>/<mask>")))?;
    let network = Ipv4Addr::from_str(net)
        .map_err(|_| CommandError::Malformed(format!("invalid network address {net:?}")))?;
    let netmask = if let Ok(prefix) = mask.parse::<u32>() {
        if prefix > 32 {
            return Err(CommandError::Malformed(format!("prefix length {prefix} out of range 0..=32")));
        }
        let bits = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        Ipv4Addr::from(bits)
    } else {
        Ipv4Addr::from_str(mask).map_err(|_| CommandError::Malformed(format!("invalid netmask {mask:?}")))?
    };
    Ok((network, netmask))
}

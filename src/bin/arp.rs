//! ARP responder/resolver binary (spec §4.4): argv tokens carry
//! `[IPV4:<ip>/<prefix>]` with an optional `=<mtu>`; supports the `arp` and
//! `arp <ip> <iface>` control commands.

use std::cell::RefCell;
use std::io;
use std::process::ExitCode;

use netdevice::arp_engine::{ArpEngine, ArpQueryOutcome};
use netdevice::codec::ethernet::{EthernetFrame, ETHERTYPE_ARP};
use netdevice::config;
use netdevice::control::{self, ArpCommand, Command};
use netdevice::harness::{self, ControlOutput};
use netdevice::mac::MacAddress;

/// Capacity 50 for the standalone tool, distinct from the router's embedded
/// cache (spec §3).
const ARP_TOOL_CACHE_CAPACITY: usize = 50;

fn main() -> ExitCode {
    netdevice::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut parsed = match config::parse_argv(&args) {
        Ok(parsed) => parsed,
        Err(error) => {
            tracing::error!(%error, "invalid interface configuration");
            return ExitCode::FAILURE;
        }
    };

    for (index, mac_override) in parsed.mac_overrides.iter().enumerate() {
        let ifc_num = (index + 1) as u16;
        let mac = mac_override.unwrap_or_else(|| MacAddress::locally_administered(ifc_num));
        parsed.device.assign_mac(ifc_num, mac);
        tracing::info!(ifc_num, %mac, "interface ready");
    }

    let device = parsed.device;
    let engine = RefCell::new(ArpEngine::new(ARP_TOOL_CACHE_CAPACITY));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let result = harness::run(
        &mut reader,
        &mut writer,
        |ifc_num, bytes| {
            let eth = match EthernetFrame::decode(bytes) {
                Ok(eth) => eth,
                Err(error) => {
                    tracing::debug!(ifc_num, %error, "dropping undecodable frame");
                    return Vec::new();
                }
            };
            if eth.ethertype != ETHERTYPE_ARP {
                tracing::debug!(ifc_num, ethertype = format!("{:#06x}", eth.ethertype), "dropping non-ARP frame");
                return Vec::new();
            }
            engine.borrow_mut().handle_frame(&device, ifc_num, &eth)
        },
        |line| handle_control(line, &device, &engine),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "harness loop terminated with an I/O error");
            ExitCode::FAILURE
        }
    }
}

fn handle_control(
    line: &str,
    device: &netdevice::device::Device,
    engine: &RefCell<ArpEngine>,
) -> Vec<ControlOutput> {
    match control::parse(line) {
        Ok(Command::Arp(ArpCommand::Show)) => engine
            .borrow()
            .format_cache()
            .lines()
            .map(|entry| ControlOutput::Line(entry.to_string()))
            .collect(),
        Ok(Command::Arp(ArpCommand::Query { ip, iface })) => {
            match engine.borrow().handle_query_command(device, ip, &iface) {
                Ok(ArpQueryOutcome::CachedMac(mac)) => vec![ControlOutput::Line(mac.to_string())],
                Ok(ArpQueryOutcome::Request(frame)) => {
                    let ifc_num = device.interface_by_name(&iface).map(|i| i.ifc_num).unwrap_or(0);
                    vec![ControlOutput::Frame(ifc_num, frame)]
                }
                Ok(ArpQueryOutcome::NoOp) => Vec::new(),
                Err(error) => {
                    tracing::warn!(%error, "arp command rejected");
                    vec![ControlOutput::Line(format!("error: {error}"))]
                }
            }
        }
        Ok(Command::Route(_)) => vec![ControlOutput::Line("error: arp tool accepts no route commands".to_string())],
        Err(error) => {
            tracing::warn!(%error, "command parse error");
            vec![ControlOutput::Line(format!("error: {error}"))]
        }
    }
}

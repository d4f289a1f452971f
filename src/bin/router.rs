//! IPv4 router binary (spec §4.5): wires the frame codec, ARP engine, and
//! routing table together and exposes the `arp`/`route` control commands.

use std::cell::RefCell;
use std::io;
use std::process::ExitCode;

use netdevice::arp_engine::ArpQueryOutcome;
use netdevice::config;
use netdevice::control::{self, Command, RouteCommand};
use netdevice::device::Device;
use netdevice::harness::{self, ControlOutput};
use netdevice::mac::MacAddress;
use netdevice::router::RouterEngine;

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
    let engine = RefCell::new(RouterEngine::new(&device));

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let result = harness::run(
        &mut reader,
        &mut writer,
        |ifc_num, bytes| engine.borrow_mut().process(&device, ifc_num, bytes),
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

fn handle_control(line: &str, device: &Device, engine: &RefCell<RouterEngine>) -> Vec<ControlOutput> {
    match control::parse(line) {
        Ok(Command::Arp(arp_command)) => handle_arp_command(arp_command, device, engine),
        Ok(Command::Route(RouteCommand::List)) => engine
            .borrow()
            .routes
            .format_list(device)
            .lines()
            .map(|entry| ControlOutput::Line(entry.to_string()))
            .collect(),
        Ok(Command::Route(RouteCommand::Add(spec))) => {
            match engine.borrow_mut().handle_route_add(device, spec) {
                Ok(()) => Vec::new(),
                Err(error) => {
                    tracing::warn!(%error, "route add rejected");
                    vec![ControlOutput::Line(format!("error: {error}"))]
                }
            }
        }
        Ok(Command::Route(RouteCommand::Del(spec))) => {
            match engine.borrow_mut().handle_route_del(device, spec) {
                Ok(_removed) => Vec::new(),
                Err(error) => {
                    tracing::warn!(%error, "route del rejected");
                    vec![ControlOutput::Line(format!("error: {error}"))]
                }
            }
        }
        Err(error) => {
            tracing::warn!(%error, "command parse error");
            vec![ControlOutput::Line(format!("error: {error}"))]
        }
    }
}

fn handle_arp_command(
    command: netdevice::control::ArpCommand,
    device: &Device,
    engine: &RefCell<RouterEngine>,
) -> Vec<ControlOutput> {
    use netdevice::control::ArpCommand;

    match command {
        ArpCommand::Show => engine
            .borrow()
            .arp
            .format_cache()
            .lines()
            .map(|entry| ControlOutput::Line(entry.to_string()))
            .collect(),
        ArpCommand::Query { ip, iface } => match engine.borrow().arp.handle_query_command(device, ip, &iface) {
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
        },
    }
}


//! Learning-bridge binary (spec §4.2): one `ethNAME` argv token per port, no
//! control commands.

use std::io;
use std::process::ExitCode;

use netdevice::config;
use netdevice::harness::{self, ControlOutput};
use netdevice::mac::MacAddress;
use netdevice::switch::SwitchEngine;

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
    let mut engine = SwitchEngine::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();

    let result = harness::run(
        &mut reader,
        &mut writer,
        |ifc_num, bytes| engine.process(&device, ifc_num, bytes),
        |_line| vec![ControlOutput::Line("error: switch accepts no control commands".to_string())],
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "harness loop terminated with an I/O error");
            ExitCode::FAILURE
        }
    }
}

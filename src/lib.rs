//! Learning switch, VLAN-aware vswitch, ARP resolver, and IPv4 router
//! data-plane, sharing one frame codec, `Device` model, and bounded-table
//! cache implementation across all four binaries.

pub mod arp_engine;
pub mod bounded_table;
pub mod codec;
pub mod config;
pub mod control;
pub mod device;
pub mod error;
pub mod harness;
pub mod mac;
pub mod router;
pub mod switch;
pub mod vswitch;

/// Install the `tracing` subscriber every binary uses: `RUST_LOG`-driven
/// verbosity on stderr, default `info` (spec §6, SPEC_FULL §10.1).
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

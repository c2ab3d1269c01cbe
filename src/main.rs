//! Tagwatch Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-period control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  Pn7120Link        LogEventSink                          │
//! │  (ControllerLink)  (EventSink)                           │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ────────────────    │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │          TagDetector (pure logic)              │      │
//! │  └───────────────────┬────────────────────────────┘      │
//! │                TagsPort │ TagsConsumer                   │
//! │  ┌───────────────────┴────────────────────────────┐      │
//! │  │          TagsEngine · NciEngine                │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use tagwatch::adapters::LogEventSink;
use tagwatch::app::TagDetector;
use tagwatch::config::SystemConfig;
use tagwatch::drivers::pn7120::Pn7120Link;
use tagwatch::nci::NciEngine;
use tagwatch::tags::TagsEngine;

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Tagwatch v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();

    // ── 2. Construct the stack, bottom up ─────────────────────
    let link = Pn7120Link::init()?;
    let nci = NciEngine::new(link, config.nci_poll_timeout_ms);
    let mut tags = TagsEngine::new(nci);
    let mut detector = TagDetector::new();
    let mut sink = LogEventSink::new();

    // Hardware reset pulse before the first NCI exchange.
    tags.init()?;
    detector.init(&mut sink);

    info!("System ready. Entering control loop.");

    // ── 3. Control loop ───────────────────────────────────────
    loop {
        detector.tick(&mut tags, &mut sink);
        tags.tick(&mut detector, &mut sink);
        std::thread::sleep(std::time::Duration::from_millis(
            config.control_loop_interval_ms as u64,
        ));
    }
}

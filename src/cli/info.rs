use anyhow::Result;

use dustspec::catalog::{LAST_MISSION_SOL, QUIET_SOLS_WITH_DATA};
use dustspec::clock::SEASON_BIN_DEGREES;
use dustspec::dispersion::Atmosphere;

use super::Session;

/// Display a summary of the event catalog
pub fn run(session: &Session) -> Result<()> {
    let catalog = session.require_catalog()?;

    println!("dustspec Catalog Information");
    println!("============================");
    println!();

    let event_sols = catalog.event_sols();
    println!("Catalog Statistics:");
    println!("  Events: {}", catalog.len());
    println!("  Sols with events: {}", event_sols.len());
    if let (Some(first), Some(last)) = (event_sols.first(), event_sols.last()) {
        println!("  Sol range: {} - {}", first, last);
    }
    println!("  Eventless sols: {}", catalog.quiet_sols(LAST_MISSION_SOL).len());
    println!("  Curated quiet sols: {}", QUIET_SOLS_WITH_DATA.len());

    let strongest = catalog
        .entries()
        .iter()
        .min_by(|a, b| a.pressure_drop.total_cmp(&b.pressure_drop));
    if let Some(entry) = strongest {
        println!("  Deepest drop: {:.2} Pa (ID {}, sol {})", entry.pressure_drop, entry.id, entry.sol);
    }
    println!();

    println!("Events per Season:");
    for (ls, count) in catalog.season_histogram() {
        match ls {
            Some(ls) => println!("  Ls {:3} - {:3}: {}", ls, ls + SEASON_BIN_DEGREES, count),
            None => println!("  outside table: {}", count),
        }
    }
    println!();

    let atmosphere = Atmosphere::default();
    println!("Atmosphere:");
    println!("  Sound speed: {} m/s", atmosphere.sound_speed);
    println!("  Acoustic cutoff: {:.5} rad/s", atmosphere.cutoff());
    println!("  Border frequency: {:.5} Hz", atmosphere.border_frequency());

    Ok(())
}

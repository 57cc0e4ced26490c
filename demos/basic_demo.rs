//! Basic demonstration of the Petri Dish simulation.
//!
//! Run with: cargo run --example basic_demo [seed] [recording.ndjson]

use std::fs::File;
use std::io::BufWriter;

use petri_sim::batch::Autopilot;
use petri_sim::systems::write_snapshot_line;
use petri_sim::{logging, RoundStatus, SimConfig, SimWorld};

const MAX_TICKS: u64 = 2_000;

fn main() {
    logging::init(false);
    println!("=== Petri Dish - Simulation Demo ===\n");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(42);
    let mut sim = SimWorld::with_config(SimConfig::seeded(seed));
    sim.enable_profiling();

    let mut level = 1;
    if let Err(err) = sim.init(level) {
        eprintln!("could not start level {level}: {err}");
        return;
    }

    println!("Initial state (seed {seed}):");
    print_snapshot(&sim);

    let mut recording = match std::env::args().nth(2).map(File::create).transpose() {
        Ok(file) => file.map(BufWriter::new),
        Err(err) => {
            eprintln!("could not open recording: {err}");
            return;
        }
    };

    let mut pilot = Autopilot::default();
    for _ in 0..MAX_TICKS {
        sim.set_input(pilot.decide(&sim));
        let status = sim.advance_one_tick();

        if let Some(out) = recording.as_mut() {
            if let Err(err) = write_snapshot_line(out, &sim.snapshot()) {
                eprintln!("recording stopped: {err}");
                recording = None;
            }
        }

        if sim.current_tick() % 100 == 0 {
            println!("--- Tick {} ---", sim.current_tick());
            print_snapshot(&sim);
        }

        match status {
            RoundStatus::Continue => {}
            RoundStatus::RoundWon => {
                println!("\nLevel {level} cleared on tick {}!", sim.current_tick());
                level += 1;
                if let Err(err) = sim.init(level) {
                    eprintln!("could not start level {level}: {err}");
                    break;
                }
            }
            RoundStatus::AvatarDied => {
                println!("\nAvatar died on tick {}, {} lives left", sim.current_tick(), sim.lives());
                if sim.lives() == 0 {
                    println!("Game over.");
                    break;
                }
                if let Err(err) = sim.init(level) {
                    eprintln!("could not restart level {level}: {err}");
                    break;
                }
            }
        }
    }

    if let Some(profiler) = sim.profiler() {
        profiler.log_summary();
    }

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("snapshot failed to serialize: {err}"),
    }
}

fn print_snapshot(sim: &SimWorld) {
    let snapshot = sim.snapshot();
    if let Some(avatar) = &snapshot.avatar {
        println!(
            "  Avatar: pos=({:.1}, {:.1}) heading={:.0} hp={} spray={} flame={}",
            avatar.x, avatar.y, avatar.heading, avatar.hp, avatar.spray_charges, avatar.flame_charges
        );
    }
    println!(
        "  Level {} | score {} | lives {} | microbes {} | pits {} | food {} | dirt {}",
        snapshot.level,
        snapshot.score,
        snapshot.lives,
        snapshot.count_tag("patroller") + snapshot.count_tag("hunter") + snapshot.count_tag("tracker"),
        snapshot.count_tag("pit"),
        snapshot.count_tag("food"),
        snapshot.count_tag("dirt"),
    );
}

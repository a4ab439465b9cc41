use anyhow::Result;
use clap::Parser;
use glam::Vec2;

use brawl::{
    Buttons, CombatEvent, FixedTimestep, NetworkId, Packet, ResyncEngine, ResyncOutcome, Session,
    Settings, Simulation, Tick, WeaponSet,
};

const NET_RED: NetworkId = 1;
const NET_BLUE: NetworkId = 2;

#[derive(Parser)]
#[command(name = "brawl-demo")]
#[command(about = "Scripted bout with an induced desync and resync pass")]
struct Args {
    #[arg(short, long, default_value_t = 120)]
    ticks: u64,

    #[arg(long, default_value_t = 40, help = "Tick the client starts dropping inputs at")]
    drop_at: u64,

    #[arg(long, default_value_t = 90, help = "Tick the server snapshot is taken from")]
    resync_from: u64,

    #[arg(short, long, default_value = "settings.json")]
    config: String,
}

fn spawn_fighters(session: &mut Session, sim: &mut Simulation, weapons: &WeaponSet) -> Result<()> {
    session.admit_player(sim.world_mut(), NET_RED, 1, Vec2::new(0.0, 0.0), weapons)?;
    session.admit_player(sim.world_mut(), NET_BLUE, 2, Vec2::new(60.0, 0.0), weapons)?;
    Ok(())
}

/// Red walks in and swings twice; blue holds still. Pure function of the
/// tick, so the server and an un-degraded client stay in lockstep.
fn red_buttons(tick: Tick) -> Buttons {
    match tick {
        0..=20 => Buttons::RIGHT,
        25..=27 | 70..=72 => Buttons::ATTACK,
        _ => Buttons::empty(),
    }
}

fn drive(sim: &mut Simulation, buttons: Buttons) {
    if let Some(ctrl) = sim.world_mut().controller.get_mut(1) {
        ctrl.buttons = buttons;
    }
    sim.advance();
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let settings = Settings::load_or_default(&args.config);
    let weapons = WeaponSet::with_defaults();

    let mut server = Simulation::new(settings.tick_rate);
    let mut client = Simulation::new(settings.tick_rate);
    let mut server_session = Session::new();
    let mut client_session = Session::new();
    server_session.connect();
    client_session.connect();
    spawn_fighters(&mut server_session, &mut server, &weapons)?;
    spawn_fighters(&mut client_session, &mut client, &weapons)?;

    // run the bout on a synthetic 120hz frame clock metered down to the
    // simulation rate; the client goes input-deaf at drop_at and drifts
    let mut timestep = FixedTimestep::new(settings.tick_rate);
    let frame_delta = 1.0 / 120.0;
    while server.tick() < args.ticks {
        timestep.accumulate(frame_delta);
        while timestep.consume_tick() && server.tick() < args.ticks {
            let tick = server.tick();
            drive(&mut server, red_buttons(tick));
            let client_buttons = if tick < args.drop_at {
                red_buttons(tick)
            } else {
                Buttons::empty()
            };
            drive(&mut client, client_buttons);
            server.prune_history(settings.snapshot_history);
            client.prune_history(settings.snapshot_history);
        }
    }

    for event in server.drain_events() {
        if let CombatEvent::HitLanded { attacker, defender, damage } = event {
            log::info!("server: entity {attacker} hit entity {defender} for {damage}");
        }
    }

    let diverged = server.snapshots().get(args.resync_from)?
        != client.snapshots().get(args.resync_from)?;
    log::info!(
        "tick {}: client {} the server",
        args.resync_from,
        if diverged { "diverged from" } else { "matches" }
    );

    // the authoritative snapshot takes the wire path: encode, decode, apply
    let state = server
        .snapshots()
        .get(args.resync_from)?
        .to_packet(server_session.registry());
    let bytes = Packet::State(state).encode();
    let Packet::State(state) = Packet::decode(&bytes)? else {
        anyhow::bail!("decoded packet is not a state packet");
    };

    let mut engine = ResyncEngine::new();
    match engine.apply_authoritative(&state, &mut client, client_session.registry()) {
        Ok(ResyncOutcome::InSync) => log::info!("client was already in sync"),
        Ok(ResyncOutcome::Corrected { from, to }) => {
            log::info!("client corrected from tick {from} and replayed to tick {to}")
        }
        Err(desync) => {
            client_session.fail(&desync);
            anyhow::bail!("fatal desync: {desync}");
        }
    }

    // keep simulating in lockstep; the corrected client should now track
    for _ in 0..30 {
        let tick = server.tick();
        drive(&mut server, red_buttons(tick));
        drive(&mut client, red_buttons(tick));
    }
    let final_tick = server.tick() - 1;
    let in_sync = server.snapshots().get(final_tick)? == client.snapshots().get(final_tick)?;
    log::info!(
        "tick {final_tick}: client {} the server",
        if in_sync { "matches" } else { "still diverges from" }
    );

    let red = client.world().combat.get(1).map(|c| c.health);
    let blue = client.world().combat.get(2).map(|c| c.health);
    log::info!("final health: red {red:?}, blue {blue:?}");
    Ok(())
}

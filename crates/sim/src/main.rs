//! Headless skirmish driver.
//!
//! Loads [`BattleConfig`] from the environment (and `.env`), runs a scripted
//! two-versus-two skirmish until one side is gone or the turn limit is hit,
//! then prints the battle history as JSON on stdout.
//!
//! ```bash
//! BATTLE_RNG_SEED=42 RUST_LOG=battle=debug cargo run -p battle-sim
//! ```
mod scenario;

use std::sync::Arc;

use anyhow::Result;
use battle_core::{Faction, UnitId};
use battle_runtime::{AiAction, BattleConfig, BattleOptions, BattleOrchestrator, EventKind};

const MAX_TURNS: u32 = 10;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut orchestrator = BattleOrchestrator::builder()
        .config(BattleConfig::from_env())
        .job_system(Arc::new(scenario::SimpleJobs))
        .build()?;
    orchestrator.set_experience_system(Arc::new(scenario::LinearExperience));
    orchestrator.set_recruitment_system(Arc::new(scenario::LateTurnRecruitment));
    orchestrator.set_victory_condition_system(Arc::new(scenario::Annihilation));
    orchestrator.initialize(scenario::units(), Some(scenario::map()));

    orchestrator.events().subscribe(EventKind::BattleComplete, |event| {
        tracing::debug!(event = event.name(), "exchange complete");
    });

    for turn in 1..=MAX_TURNS {
        orchestrator.set_turn(turn);
        tracing::info!(turn, "turn start");

        orchestrator.reset_turn_flags(Faction::Player);
        for id in living(&orchestrator, Faction::Player) {
            player_attack(&mut orchestrator, id).await;
        }
        if orchestrator.battle_outcome().is_some() {
            break;
        }

        orchestrator.reset_turn_flags(Faction::Enemy);
        for id in living(&orchestrator, Faction::Enemy) {
            let action = match first_reachable(&orchestrator, id) {
                Some(target) => AiAction::attack(id, target),
                None => AiAction::wait(id),
            };
            if let Err(err) = orchestrator.execute_ai_action(action).await {
                tracing::warn!(unit = %id, error = %err, "ai action failed");
            }
        }
        if orchestrator.battle_outcome().is_some() {
            break;
        }
    }

    tracing::info!(
        outcome = ?orchestrator.battle_outcome(),
        exchanges = orchestrator.battle_history(None).len(),
        errors = orchestrator.error_statistics().total,
        "skirmish finished"
    );
    println!("{}", orchestrator.export_history_json()?);

    Ok(())
}

fn living(orchestrator: &BattleOrchestrator, faction: Faction) -> Vec<UnitId> {
    orchestrator
        .units()
        .iter()
        .filter(|u| u.faction == faction && u.is_alive())
        .map(|u| u.id)
        .collect()
}

fn first_reachable(orchestrator: &BattleOrchestrator, attacker: UnitId) -> Option<UnitId> {
    orchestrator
        .units()
        .iter()
        .map(|u| u.id)
        .find(|&target| orchestrator.can_attack(attacker, target, None))
}

async fn player_attack(orchestrator: &mut BattleOrchestrator, id: UnitId) {
    let targets = match orchestrator.initiate_attack(id, None) {
        Ok(targets) => targets,
        Err(err) => {
            tracing::debug!(unit = %id, error = %err, "cannot attack");
            return;
        }
    };
    let Some(&target) = targets.first() else {
        orchestrator.cancel_attack();
        return;
    };
    if let Err(err) = orchestrator
        .select_target(target, BattleOptions::default())
        .await
    {
        tracing::warn!(unit = %id, error = %err, "attack failed");
        orchestrator.cancel_attack();
    }
}

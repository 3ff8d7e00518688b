//! Optional subsystems wired into full exchanges, skills and AI actions.
mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use battle_core::{AppliedEffect, BattleErrorKind, BattleResult, Faction, UnitId};
use battle_runtime::{
    AiAction, AiActionOutcome, AiActionType, BattleOptions, BattleOrchestrator, EventKind,
    FALLBACK_KILL_EXPERIENCE, Integrations, LossCause, SkillAction, SkillEffect, SkillExecution,
};
use common::{
    BANDIT, CHIEF, EnemyWipe, FailingExperience, FixedDamage, FixedExperience, KNIGHT,
    RecordingAi, RecordingLoss, SQUIRE, ScriptedRecruitment, ScriptedSkills, event_log, headless,
    orchestrator,
};

async fn attack(
    orchestrator: &mut BattleOrchestrator,
    attacker: UnitId,
    target: UnitId,
) -> BattleResult {
    orchestrator.initiate_attack(attacker, None).unwrap();
    orchestrator
        .select_target(target, BattleOptions::default())
        .await
        .unwrap()
}

fn fireball(effects: Vec<SkillEffect>) -> ScriptedSkills {
    ScriptedSkills {
        execution: SkillExecution {
            skill_name: "Fireball".to_string(),
            power: 12,
            mp_cost: 4,
            effects,
        },
        usable: true,
    }
}

// ----- recruitment ----------------------------------------------------------

#[tokio::test]
async fn recruitment_replaces_defeat() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    let recruitment = Arc::new(ScriptedRecruitment::new(true, true));
    orchestrator.set_recruitment_system(recruitment.clone());
    let names = event_log(&orchestrator);

    let result = attack(&mut orchestrator, KNIGHT, BANDIT).await;

    assert!(!result.target_defeated);
    assert!(
        result.has_effect(|e| matches!(e, AppliedEffect::Recruited { unit } if *unit == BANDIT))
    );
    let bandit = orchestrator.unit(BANDIT).unwrap();
    assert_eq!(bandit.current_hp, 1);
    assert_eq!(bandit.faction, Faction::Npc);
    assert_eq!(*recruitment.planned.lock().unwrap(), vec![40]);
    assert!(names.lock().unwrap().contains(&"recruitment-conversion"));
}

#[tokio::test]
async fn declined_recruitment_defeats_normally() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    orchestrator.set_recruitment_system(Arc::new(ScriptedRecruitment::new(true, false)));

    let result = attack(&mut orchestrator, KNIGHT, BANDIT).await;

    assert!(result.target_defeated);
    assert_eq!(orchestrator.unit(BANDIT).unwrap().faction, Faction::Enemy);
    assert_eq!(orchestrator.unit(BANDIT).unwrap().current_hp, 0);
}

#[tokio::test]
async fn ineligible_targets_are_never_recruited() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    orchestrator.set_recruitment_system(Arc::new(ScriptedRecruitment::new(false, true)));

    let result = attack(&mut orchestrator, KNIGHT, BANDIT).await;

    assert!(result.target_defeated);
    assert!(!result.has_effect(|e| matches!(e, AppliedEffect::Recruited { .. })));
}

#[tokio::test]
async fn player_units_are_lost_rather_than_recruited() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    let recruitment = Arc::new(ScriptedRecruitment::new(true, true));
    let loss = Arc::new(RecordingLoss::default());
    orchestrator.set_recruitment_system(recruitment.clone());
    orchestrator.set_character_loss_manager(loss.clone());
    let names = event_log(&orchestrator);

    let result = attack(&mut orchestrator, BANDIT, SQUIRE).await;

    assert!(result.target_defeated);
    assert!(!result.has_effect(|e| matches!(e, AppliedEffect::Recruited { .. })));
    let squire = orchestrator.unit(SQUIRE).unwrap();
    assert_eq!(squire.faction, Faction::Player);
    assert_eq!(squire.current_hp, 0);
    assert!(recruitment.planned.lock().unwrap().is_empty());
    assert_eq!(loss.lost.lock().unwrap().len(), 1);
    let names = names.lock().unwrap();
    assert!(names.contains(&"character-lost"));
    assert!(!names.contains(&"recruitment-conversion"));
}

// ----- character loss -------------------------------------------------------

#[tokio::test]
async fn defeated_player_units_are_reported_lost() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    let loss = Arc::new(RecordingLoss::default());
    orchestrator.set_character_loss_manager(loss.clone());
    let names = event_log(&orchestrator);

    let result = attack(&mut orchestrator, BANDIT, SQUIRE).await;

    assert!(result.target_defeated);
    assert!(result.has_effect(
        |e| matches!(e, AppliedEffect::CharacterLost { unit } if *unit == SQUIRE)
    ));
    assert_eq!(
        *loss.lost.lock().unwrap(),
        vec![(
            SQUIRE,
            LossCause::Battle {
                attacker: BANDIT,
                weapon: "axe".to_string(),
            }
        )]
    );
    assert_eq!(*loss.snapshots.lock().unwrap(), 1);
    assert!(names.lock().unwrap().contains(&"character-lost"));
}

#[tokio::test]
async fn character_lost_is_published_without_a_manager() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    let lost = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&lost);
    orchestrator.events().subscribe(EventKind::CharacterLost, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    attack(&mut orchestrator, BANDIT, SQUIRE).await;

    assert_eq!(lost.load(Ordering::SeqCst), 1);
}

// ----- experience -----------------------------------------------------------

#[tokio::test]
async fn experience_system_overrides_fallback_and_levels_up() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    orchestrator.set_experience_system(Arc::new(FixedExperience {
        amount: 25,
        level_up: true,
    }));
    let names = event_log(&orchestrator);

    let result = attack(&mut orchestrator, KNIGHT, BANDIT).await;

    assert_eq!(result.experience_gained, 25);
    assert_eq!(orchestrator.unit(KNIGHT).unwrap().level, 2);
    assert!(result.has_effect(|e| matches!(e, AppliedEffect::LevelUp { new_level: 2, .. })));
    assert!(names.lock().unwrap().contains(&"battle-level-up"));
}

#[tokio::test]
async fn failing_experience_system_falls_back() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(40));
    orchestrator.set_experience_system(Arc::new(FailingExperience));

    let result = attack(&mut orchestrator, KNIGHT, BANDIT).await;

    assert_eq!(result.experience_gained, FALLBACK_KILL_EXPERIENCE);
    assert!(orchestrator.system_state().is_idle());
}

// ----- victory conditions ---------------------------------------------------

#[tokio::test]
async fn boss_defeat_and_victory_are_reported() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(60));
    let victory = Arc::new(EnemyWipe::default());
    orchestrator.set_victory_condition_system(victory.clone());
    let names = event_log(&orchestrator);

    attack(&mut orchestrator, KNIGHT, BANDIT).await;
    assert_eq!(orchestrator.battle_outcome(), None);

    let result = attack(&mut orchestrator, SQUIRE, CHIEF).await;

    assert!(result.has_effect(|e| matches!(
        e,
        AppliedEffect::BossDefeated { boss, rose_essence: 5 } if *boss == CHIEF
    )));
    assert_eq!(
        orchestrator.battle_outcome(),
        Some(battle_runtime::BattleOutcome::Victory)
    );
    assert_eq!(*victory.bosses.lock().unwrap(), vec![CHIEF]);
    assert_eq!(*victory.enemies.lock().unwrap(), vec![BANDIT, CHIEF]);
    assert_eq!(
        *victory.damage.lock().unwrap(),
        vec![(KNIGHT, BANDIT, 60), (SQUIRE, CHIEF, 60)]
    );

    let names = names.lock().unwrap();
    assert!(names.contains(&"boss_defeated"));
    assert_eq!(names.iter().filter(|n| **n == "battle-outcome").count(), 1);
}

// ----- skills ---------------------------------------------------------------

#[tokio::test]
async fn skills_without_a_skill_system_fail_cleanly() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));

    let result = orchestrator
        .execute_skill_action(SkillAction::new(KNIGHT, "fireball", vec![BANDIT]))
        .await;

    assert!(!result.success);
    assert!(result.battle_results.is_empty());
    assert!(result.error.is_some());
    assert!(orchestrator.system_state().is_idle());
    assert!(!orchestrator.unit(KNIGHT).unwrap().has_acted);
}

#[tokio::test]
async fn skill_effects_are_applied_and_summarized() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));
    orchestrator.set_skill_system(Arc::new(fireball(vec![
        SkillEffect::Damage {
            target: BANDIT,
            amount: 12,
            critical: false,
        },
        SkillEffect::Heal {
            target: BANDIT,
            amount: 5,
        },
        SkillEffect::Status {
            target: BANDIT,
            name: "burn".to_string(),
        },
    ])));
    let names = event_log(&orchestrator);

    let result = orchestrator
        .execute_skill_action(SkillAction::new(KNIGHT, "fireball", vec![BANDIT]))
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.battle_results.len(), 3);
    let summary = result.summary.unwrap();
    assert_eq!(summary.skill_name, "Fireball");
    assert_eq!(summary.affected_units, vec![BANDIT]);
    assert_eq!(summary.total_damage, 12);
    assert_eq!(summary.total_healing, 5);
    assert_eq!(summary.status_effects, 1);

    assert_eq!(orchestrator.unit(BANDIT).unwrap().current_hp, 23);
    let knight = orchestrator.unit(KNIGHT).unwrap();
    assert_eq!(knight.current_mp, 6);
    assert!(knight.has_acted);
    assert_eq!(orchestrator.battle_history(None).len(), 3);
    assert!(orchestrator.system_state().is_idle());
    assert_eq!(names.lock().unwrap().last(), Some(&"skill-executed"));
}

#[tokio::test]
async fn skill_experience_is_credited_to_the_last_result() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));
    orchestrator.set_experience_system(Arc::new(FixedExperience {
        amount: 7,
        level_up: false,
    }));
    orchestrator.set_skill_system(Arc::new(fireball(vec![
        SkillEffect::Damage {
            target: BANDIT,
            amount: 3,
            critical: false,
        },
        SkillEffect::Status {
            target: SQUIRE,
            name: "haste".to_string(),
        },
    ])));

    let result = orchestrator
        .execute_skill_action(SkillAction::new(KNIGHT, "fireball", vec![BANDIT, SQUIRE]))
        .await;

    let gained: Vec<_> = result
        .battle_results
        .iter()
        .map(|r| r.experience_gained)
        .collect();
    assert_eq!(gained, vec![0, 14]);
}

#[tokio::test]
async fn unusable_skill_is_rejected() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));
    let mut skills = fireball(Vec::new());
    skills.usable = false;
    orchestrator.set_skill_system(Arc::new(skills));

    let result = orchestrator
        .execute_skill_action(SkillAction::new(KNIGHT, "fireball", vec![BANDIT]))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.map(|e| e.kind),
        Some(BattleErrorKind::InvalidWeapon)
    );
    assert!(orchestrator.system_state().is_idle());
}

#[tokio::test]
async fn insufficient_mp_aborts_the_cast() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));
    orchestrator.set_skill_system(Arc::new(fireball(vec![SkillEffect::Damage {
        target: KNIGHT,
        amount: 10,
        critical: false,
    }])));

    // the bandit has no MP at all
    let result = orchestrator
        .execute_skill_action(SkillAction::new(BANDIT, "fireball", vec![KNIGHT]))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.map(|e| e.kind),
        Some(BattleErrorKind::InsufficientMp)
    );
    assert_eq!(orchestrator.unit(KNIGHT).unwrap().current_hp, 100);
    assert!(orchestrator.system_state().is_idle());
}

#[tokio::test]
async fn lethal_skill_reports_the_loss_with_its_cause() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(5));
    let loss = Arc::new(RecordingLoss::default());
    orchestrator.set_character_loss_manager(loss.clone());
    let mut skills = fireball(vec![SkillEffect::Damage {
        target: SQUIRE,
        amount: 50,
        critical: true,
    }]);
    skills.execution.mp_cost = 0;
    orchestrator.set_skill_system(Arc::new(skills));

    let result = orchestrator
        .execute_skill_action(SkillAction::new(BANDIT, "fireball", vec![SQUIRE]))
        .await;

    assert!(result.success);
    assert!(result.battle_results[0].target_defeated);
    assert_eq!(result.summary.unwrap().total_damage, 20);
    assert_eq!(
        *loss.lost.lock().unwrap(),
        vec![(
            SQUIRE,
            LossCause::Skill {
                caster: BANDIT,
                skill_id: "fireball".to_string(),
            }
        )]
    );
}

// ----- AI -------------------------------------------------------------------

#[tokio::test]
async fn ai_attack_runs_the_full_exchange() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(8));
    let ai = Arc::new(RecordingAi::default());
    orchestrator.set_ai_system_manager(ai.clone());
    let names = event_log(&orchestrator);

    let outcome = orchestrator
        .execute_ai_action(AiAction::attack(BANDIT, KNIGHT))
        .await
        .unwrap();

    let AiActionOutcome::Attack(result) = outcome else {
        panic!("expected an attack outcome");
    };
    assert_eq!(result.final_damage, 8);
    assert_eq!(orchestrator.unit(KNIGHT).unwrap().current_hp, 92);
    assert_eq!(
        *ai.completed.lock().unwrap(),
        vec![(BANDIT, AiActionType::Attack, true)]
    );
    assert_eq!(names.lock().unwrap().last(), Some(&"ai-action-complete"));
}

#[tokio::test]
async fn failed_ai_attack_is_reported_and_leaves_idle() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(8));
    let ai = Arc::new(RecordingAi::default());
    orchestrator.set_ai_system_manager(ai.clone());

    // the chief carries no weapon
    let err = orchestrator
        .execute_ai_action(AiAction::attack(CHIEF, SQUIRE))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BattleErrorKind::InvalidWeapon);
    assert!(orchestrator.system_state().is_idle());
    assert_eq!(
        *ai.completed.lock().unwrap(),
        vec![(CHIEF, AiActionType::Attack, false)]
    );
}

#[tokio::test]
async fn ai_attack_on_an_ally_cancels_the_attack() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(8));

    let err = orchestrator
        .execute_ai_action(AiAction::attack(BANDIT, common::CHIEF))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BattleErrorKind::InvalidTarget);
    assert!(orchestrator.system_state().is_idle());
    assert!(!orchestrator.system_state().is_active);
}

#[tokio::test]
async fn ai_wait_is_a_successful_no_op() {
    let mut orchestrator = orchestrator(headless(), FixedDamage::hit(8));
    let ai = Arc::new(RecordingAi::default());
    orchestrator.set_ai_system_manager(ai.clone());

    let outcome = orchestrator
        .execute_ai_action(AiAction::wait(BANDIT))
        .await
        .unwrap();

    assert_eq!(outcome, AiActionOutcome::NoOp);
    assert_eq!(
        *ai.completed.lock().unwrap(),
        vec![(BANDIT, AiActionType::Wait, true)]
    );
}

// ----- wiring ---------------------------------------------------------------

#[test]
fn builder_accepts_a_full_integration_set() {
    let integrations = Integrations {
        recruitment: Some(Arc::new(ScriptedRecruitment::new(false, false))),
        character_loss: Some(Arc::new(RecordingLoss::default())),
        experience: Some(Arc::new(FailingExperience)),
        ai: Some(Arc::new(RecordingAi::default())),
        victory: Some(Arc::new(EnemyWipe::default())),
        ..Integrations::default()
    };

    let orchestrator = BattleOrchestrator::builder()
        .config(headless())
        .integrations(integrations)
        .build()
        .unwrap();

    assert!(orchestrator.has_recruitment_system());
    assert!(orchestrator.has_character_loss_manager());
    assert!(orchestrator.has_experience_system());
    assert!(orchestrator.has_ai_system_manager());
    assert!(orchestrator.has_victory_condition_system());
    assert!(!orchestrator.has_skill_system());
    assert!(!orchestrator.has_job_system());
}

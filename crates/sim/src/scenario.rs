//! Scripted skirmish: roster, map and a minimal set of integrations.
use battle_core::{
    BattleResult, BossInfo, Faction, MapData, Modifier, ModifierSource, Position, RangePattern,
    RangeShape, Unit, UnitId, UnitStats, Weapon, WeaponType,
};
use battle_runtime::{
    BattleOutcome, ExperienceGrant, ExperienceSystem, IntegrationError, JobSystem,
    RecruitmentOutcome, RecruitmentSystem, VictoryConditionSystem,
};

pub fn map() -> MapData {
    MapData::new(6, 4).with_blocked([Position::new(3, 3)])
}

pub fn units() -> Vec<Unit> {
    let sword = Weapon::new("iron-sword", "Iron Sword", WeaponType::Sword, 8);
    let bow = Weapon::new("short-bow", "Short Bow", WeaponType::Bow, 6)
        .with_range(RangePattern::new(2, 2, RangeShape::Diamond));
    let axe = Weapon::new("hand-axe", "Hand Axe", WeaponType::Axe, 10).with_accuracy(75);

    vec![
        Unit::new(
            UnitId(1),
            "Alain",
            Faction::Player,
            Position::new(1, 1),
            UnitStats::new(40, 5, 10, 5).with_speed(9),
        )
        .with_weapon(sword)
        .with_job("knight"),
        Unit::new(
            UnitId(2),
            "Mira",
            Faction::Player,
            Position::new(0, 2),
            UnitStats::new(28, 8, 8, 2).with_evasion(10),
        )
        .with_weapon(bow),
        Unit::new(
            UnitId(10),
            "Bandit",
            Faction::Enemy,
            Position::new(2, 1),
            UnitStats::new(26, 0, 7, 2),
        )
        .with_weapon(axe.clone()),
        Unit::new(
            UnitId(11),
            "Bandit Chief",
            Faction::Enemy,
            Position::new(1, 2),
            UnitStats::new(45, 0, 9, 4),
        )
        .with_weapon(axe)
        .with_boss(BossInfo {
            name: "Bandit Chief".to_string(),
            rose_essence: 3,
        }),
    ]
}

/// Knights hit harder with swords and take less damage.
pub struct SimpleJobs;

impl JobSystem for SimpleJobs {
    fn attack_modifiers(
        &self,
        attacker: &Unit,
        weapon: &Weapon,
    ) -> Result<Vec<Modifier>, IntegrationError> {
        let bonus = attacker.job.as_deref() == Some("knight")
            && weapon.weapon_type == WeaponType::Sword;
        Ok(bonus
            .then(|| Modifier::percent(ModifierSource::AttackerJob, "sword mastery", 10))
            .into_iter()
            .collect())
    }

    fn defense_modifiers(&self, defender: &Unit) -> Result<Vec<Modifier>, IntegrationError> {
        Ok((defender.job.as_deref() == Some("knight"))
            .then(|| Modifier::additive(ModifierSource::DefenderJob, "plate", -2))
            .into_iter()
            .collect())
    }
}

/// Ten experience per hit, forty and a level per kill.
pub struct LinearExperience;

impl ExperienceSystem for LinearExperience {
    fn grant_battle_experience(
        &self,
        attacker: &Unit,
        _target: &Unit,
        result: &BattleResult,
    ) -> Result<ExperienceGrant, IntegrationError> {
        let amount = match (result.is_evaded, result.target_defeated) {
            (true, _) => 1,
            (false, true) => 40,
            (false, false) => 10,
        };
        Ok(ExperienceGrant {
            amount,
            new_level: (amount >= 40).then_some(attacker.level + 1),
        })
    }

    fn grant_skill_experience(
        &self,
        _caster: &Unit,
        _skill_id: &str,
        affected: usize,
    ) -> Result<ExperienceGrant, IntegrationError> {
        Ok(ExperienceGrant {
            amount: 5 * affected as u32,
            new_level: None,
        })
    }
}

/// Non-boss enemies finished off by a player from turn two onward join up.
pub struct LateTurnRecruitment;

impl RecruitmentSystem for LateTurnRecruitment {
    fn check_eligibility(
        &self,
        attacker: &Unit,
        target: &Unit,
        planned_damage: u32,
        turn: u32,
    ) -> Result<bool, IntegrationError> {
        Ok(attacker.faction == Faction::Player
            && target.faction == Faction::Enemy
            && !target.is_boss()
            && planned_damage >= target.current_hp
            && turn >= 2)
    }

    fn process_attempt(
        &self,
        _attacker: &Unit,
        _target: &Unit,
        _turn: u32,
    ) -> Result<RecruitmentOutcome, IntegrationError> {
        Ok(RecruitmentOutcome { recruited: true })
    }
}

/// Victory when no enemy stands, defeat when no player stands.
pub struct Annihilation;

impl VictoryConditionSystem for Annihilation {
    fn on_boss_defeated(&self, boss: &Unit) -> Result<(), IntegrationError> {
        tracing::info!(boss = %boss.name, "boss down");
        Ok(())
    }

    fn on_enemy_defeated(&self, _enemy: &Unit) -> Result<(), IntegrationError> {
        Ok(())
    }

    fn record_damage(
        &self,
        _attacker: UnitId,
        _target: UnitId,
        _amount: u32,
    ) -> Result<(), IntegrationError> {
        Ok(())
    }

    fn check_conditions(
        &self,
        units: &[Unit],
        _turn: u32,
    ) -> Result<Option<BattleOutcome>, IntegrationError> {
        let standing =
            |faction: Faction| units.iter().any(|u| u.faction == faction && u.is_alive());
        Ok(if !standing(Faction::Enemy) {
            Some(BattleOutcome::Victory)
        } else if !standing(Faction::Player) {
            Some(BattleOutcome::Defeat)
        } else {
            None
        })
    }
}

//! Line-oriented save file codec.
//!
//! The file carries no version tag. Fields are whitespace separated, booleans
//! are written as `0`/`1` and floats use the shortest representation that
//! parses back to the same value.

use std::{
    io::{self, Write},
    path::PathBuf,
    str::{FromStr, Lines, SplitWhitespace},
};

use survivor_core::{
    EnemyRecord, HeroRecord, ProjectileOrigin, ProjectileRecord, Species, Vec2, WorldMode,
    SPECIES_CAPACITY,
};
use thiserror::Error;

/// Failure while saving or loading a game.
#[derive(Debug, Error)]
pub enum SaveError {
    /// No save file exists at the requested path.
    #[error("no saved game at {}", path.display())]
    Missing {
        /// Path that was probed.
        path: PathBuf,
    },
    /// The save file is truncated or contains an unparsable value.
    #[error("corrupt save file at line {line}: {reason}")]
    Corrupt {
        /// One-based line number where parsing stopped.
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },
    /// Any other filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Everything a save file holds, parsed but not yet applied.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SavedGame {
    pub(crate) hero: HeroRecord,
    pub(crate) mode: WorldMode,
    pub(crate) enemies: [Vec<EnemyRecord>; 4],
    pub(crate) projectiles: Vec<Option<ProjectileRecord>>,
}

impl SavedGame {
    /// Writes the game in save-file order.
    pub(crate) fn encode<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let hero = &self.hero;
        writeln!(
            out,
            "{} {} {} {}",
            hero.position.x, hero.position.y, hero.health, hero.score
        )?;
        writeln!(
            out,
            "{} {} {} {}",
            flag(hero.power_up),
            flag(hero.power_up_on_cooldown),
            hero.power_up_timer,
            hero.power_up_cooldown_timer
        )?;
        writeln!(out, "{} {}", hero.linear_attack_timer, hero.area_attack_timer)?;
        writeln!(out, "{}", flag(self.mode.is_infinite()))?;

        let [goblins, heavies, slimes, musketeers] = &self.enemies;
        writeln!(
            out,
            "{} {} {} {}",
            goblins.len(),
            heavies.len(),
            slimes.len(),
            musketeers.len()
        )?;
        for enemy in self.enemies.iter().flatten() {
            writeln!(
                out,
                "{} {} {} {}",
                enemy.position.x, enemy.position.y, enemy.health, enemy.attack_timer
            )?;
        }

        for slot in &self.projectiles {
            match slot {
                Some(projectile) => writeln!(
                    out,
                    "1 {} {} {} {} {} {}",
                    projectile.position.x,
                    projectile.position.y,
                    projectile.direction.x,
                    projectile.direction.y,
                    projectile.damage,
                    flag(projectile.origin.is_hero())
                )?,
                None => writeln!(out, "0")?,
            }
        }
        out.flush()
    }

    /// Parses a complete save file holding exactly `projectile_slots` slot lines.
    pub(crate) fn decode(text: &str, projectile_slots: usize) -> Result<Self, SaveError> {
        let mut reader = LineReader::new(text);

        let mut fields = reader.line("hero position")?;
        let position = Vec2::new(fields.value("hero x")?, fields.value("hero y")?);
        let health = fields.value("hero health")?;
        let score = fields.value("hero score")?;
        fields.finish()?;

        let mut fields = reader.line("hero power-up")?;
        let power_up = fields.flag("power-up active")?;
        let power_up_on_cooldown = fields.flag("power-up cooling down")?;
        let power_up_timer = fields.value("power-up timer")?;
        let power_up_cooldown_timer = fields.value("power-up cooldown timer")?;
        fields.finish()?;

        let mut fields = reader.line("hero attack timers")?;
        let linear_attack_timer = fields.value("linear attack timer")?;
        let area_attack_timer = fields.value("area attack timer")?;
        fields.finish()?;

        let hero = HeroRecord {
            position,
            health,
            score,
            power_up,
            power_up_on_cooldown,
            power_up_timer,
            power_up_cooldown_timer,
            linear_attack_timer,
            area_attack_timer,
        };

        let mut fields = reader.line("world mode")?;
        let mode = WorldMode::from_infinite_flag(fields.flag("infinite flag")?);
        fields.finish()?;

        let mut fields = reader.line("population counts")?;
        let mut counts = [0_usize; 4];
        for (count, species) in counts.iter_mut().zip(Species::ALL) {
            *count = fields.value(species.label())?;
            if *count > SPECIES_CAPACITY {
                return Err(fields.corrupt(format!(
                    "{} {} exceed the capacity of {SPECIES_CAPACITY}",
                    count,
                    species.label()
                )));
            }
        }
        fields.finish()?;

        let mut enemies: [Vec<EnemyRecord>; 4] = Default::default();
        for (records, count) in enemies.iter_mut().zip(counts) {
            records.reserve_exact(count);
            for _ in 0..count {
                let mut fields = reader.line("enemy")?;
                let record = EnemyRecord {
                    position: Vec2::new(fields.value("enemy x")?, fields.value("enemy y")?),
                    health: fields.value("enemy health")?,
                    attack_timer: fields.value("enemy attack timer")?,
                };
                fields.finish()?;
                records.push(record);
            }
        }

        let mut projectiles = Vec::with_capacity(projectile_slots);
        for _ in 0..projectile_slots {
            let mut fields = reader.line("projectile slot")?;
            let slot = if fields.flag("projectile active")? {
                Some(ProjectileRecord {
                    position: Vec2::new(
                        fields.value("projectile x")?,
                        fields.value("projectile y")?,
                    ),
                    direction: Vec2::new(
                        fields.value("projectile dx")?,
                        fields.value("projectile dy")?,
                    ),
                    damage: fields.value("projectile damage")?,
                    origin: if fields.flag("projectile owner")? {
                        ProjectileOrigin::Hero
                    } else {
                        ProjectileOrigin::Enemy
                    },
                })
            } else {
                None
            };
            fields.finish()?;
            projectiles.push(slot);
        }

        reader.finish()?;

        Ok(Self {
            hero,
            mode,
            enemies,
            projectiles,
        })
    }
}

const fn flag(value: bool) -> u8 {
    if value {
        1
    } else {
        0
    }
}

struct LineReader<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    fn line(&mut self, what: &str) -> Result<Fields<'a>, SaveError> {
        self.line += 1;
        match self.lines.next() {
            Some(text) => Ok(Fields {
                line: self.line,
                tokens: text.split_whitespace(),
            }),
            None => Err(SaveError::Corrupt {
                line: self.line,
                reason: format!("file ends before the {what} line"),
            }),
        }
    }

    fn finish(mut self) -> Result<(), SaveError> {
        for text in self.lines.by_ref() {
            self.line += 1;
            if !text.trim().is_empty() {
                return Err(SaveError::Corrupt {
                    line: self.line,
                    reason: "unexpected data after the last projectile slot".to_owned(),
                });
            }
        }
        Ok(())
    }
}

struct Fields<'a> {
    line: usize,
    tokens: SplitWhitespace<'a>,
}

impl Fields<'_> {
    fn value<T: FromStr>(&mut self, name: &str) -> Result<T, SaveError> {
        let token = self
            .tokens
            .next()
            .ok_or_else(|| self.corrupt(format!("missing {name}")))?;
        token
            .parse()
            .map_err(|_| self.corrupt(format!("invalid {name} `{token}`")))
    }

    fn flag(&mut self, name: &str) -> Result<bool, SaveError> {
        match self.value::<u8>(name)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.corrupt(format!("{name} must be 0 or 1, found {other}"))),
        }
    }

    fn finish(mut self) -> Result<(), SaveError> {
        match self.tokens.next() {
            None => Ok(()),
            Some(extra) => Err(self.corrupt(format!("unexpected trailing value `{extra}`"))),
        }
    }

    fn corrupt(&self, reason: String) -> SaveError {
        SaveError::Corrupt {
            line: self.line,
            reason,
        }
    }
}

//! Random conversion problems with exact expected answers.

use crate::catalog::UnitCatalog;
use crate::decimal::{self, Decimal};
use crate::error::{DrillError, InvalidStateError};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Chance that a decimal draw is replaced by a value below one.
const SUB_ONE_PROBABILITY: f64 = 0.2;

/// Chance that a mixed draw delegates to whole numbers.
const MIXED_WHOLE_PROBABILITY: f64 = 0.5;

/// Which kind of source values a session draws.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[strum(to_string = "Whole numbers")]
    Whole,
    #[strum(to_string = "Decimals")]
    Decimals,
    #[default]
    #[strum(to_string = "Mixed")]
    Mixed,
}

impl Difficulty {
    pub fn next(self) -> Self {
        match self {
            Difficulty::Whole => Difficulty::Decimals,
            Difficulty::Decimals => Difficulty::Mixed,
            Difficulty::Mixed => Difficulty::Whole,
        }
    }
}

/// One conversion question. Never mutated; the next problem replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub category: String,
    pub source_unit: String,
    pub target_unit: String,
    pub source_value: Decimal,
    pub expected_answer: Decimal,
}

impl Problem {
    pub fn new(
        catalog: &UnitCatalog,
        category: &str,
        source_value: Decimal,
        source_unit: &str,
        target_unit: &str,
    ) -> Result<Self, DrillError> {
        let expected_answer = catalog.convert(&source_value, category, source_unit, target_unit)?;
        Ok(Self {
            category: category.to_string(),
            source_unit: source_unit.to_string(),
            target_unit: target_unit.to_string(),
            source_value,
            expected_answer,
        })
    }

    pub fn prompt(&self) -> String {
        format!(
            "Convert: {} {} → {} = ?",
            decimal::format(&self.source_value),
            self.source_unit,
            self.target_unit
        )
    }

    pub fn expected_answer_text(&self) -> String {
        decimal::format(&self.expected_answer)
    }
}

/// Units a problem may use: the allowed subset when it leaves at least two
/// units, otherwise the whole category.
pub fn usable_units<'a>(
    catalog: &'a UnitCatalog,
    category: &str,
    allowed_units: &[String],
) -> Result<Vec<&'a str>, DrillError> {
    let all = catalog.units_of(category)?;
    let filtered: Vec<&str> = all
        .iter()
        .copied()
        .filter(|u| allowed_units.iter().any(|a| a.as_str() == *u))
        .collect();

    let usable = if filtered.len() >= 2 { filtered } else { all };
    if usable.len() < 2 {
        return Err(InvalidStateError::NotEnoughUnits {
            category: category.to_string(),
        }
        .into());
    }
    Ok(usable)
}

pub fn generate<R: Rng + ?Sized>(
    catalog: &UnitCatalog,
    category: &str,
    allowed_units: &[String],
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Problem, DrillError> {
    let units = usable_units(catalog, category, allowed_units)?;

    // ordered pair of distinct indices, both directions equally likely
    let first = rng.gen_range(0..units.len());
    let mut second = rng.gen_range(0..units.len() - 1);
    if second >= first {
        second += 1;
    }

    let value = random_value(difficulty, rng);
    Problem::new(catalog, category, value, units[first], units[second])
}

pub fn random_value<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Decimal {
    match difficulty {
        Difficulty::Whole => Decimal::from(rng.gen_range(1..=9999u32)),
        Difficulty::Decimals => random_decimal(rng),
        Difficulty::Mixed => {
            if rng.gen_bool(MIXED_WHOLE_PROBABILITY) {
                random_value(Difficulty::Whole, rng)
            } else {
                random_value(Difficulty::Decimals, rng)
            }
        }
    }
}

fn random_decimal<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
    let whole: u32 = rng.gen_range(0..=999);
    let places: u32 = rng.gen_range(1..=3);
    let frac: u32 = rng.gen_range(1..=9 * 10u32.pow(places - 1));
    let value = Decimal::new(whole * 10u32.pow(places) + frac, places);

    if !rng.gen_bool(SUB_ONE_PROBABILITY) {
        return value;
    }

    // "0." followed by the digits of n, left-padded to the drawn width
    let n: u32 = rng.gen_range(1..=999);
    let width: usize = rng.gen_range(1..=3);
    let digits = format!("{n:0width$}");
    let scale = u32::try_from(digits.len()).unwrap_or(3);
    Decimal::new(n, scale)
}

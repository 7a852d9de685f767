use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::engine;
use crate::filter::{self, StepFilter};
use crate::matching::{Matcher, SubstringMatcher};
use crate::models::{FoodRecord, PreferenceSpec, RankedRecord};
use crate::table::{self, LoadedTable, SkippedRow};

/// Outcome of one recommendation request against a loaded table.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendReport {
    pub items: Vec<RankedRecord>,
    pub zero_calorie_excluded: usize,
    /// Rows dropped when the table was loaded.
    pub skipped_rows: usize,
}

/// Holds one immutable food table and answers requests against it.
pub struct PlatterService {
    table: LoadedTable,
}

impl PlatterService {
    pub fn open(path: &Path) -> Result<Self> {
        let table = table::load_table_file(path)
            .with_context(|| format!("Failed to load food table: {}", path.display()))?;
        info!(
            path = %path.display(),
            records = table.records.len(),
            skipped = table.skipped_count(),
            "opened food table"
        );
        Ok(Self { table })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let table = table::parse_food_table(reader).context("Failed to parse food table")?;
        Ok(Self { table })
    }

    #[must_use]
    pub fn from_records(records: Vec<FoodRecord>) -> Self {
        Self {
            table: LoadedTable {
                records,
                skipped: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn records(&self) -> &[FoodRecord] {
        &self.table.records
    }

    #[must_use]
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.table.skipped
    }

    /// Rank the table against `spec`. A `seed` makes the tie-break reproducible.
    pub fn recommend(&self, spec: &PreferenceSpec, seed: Option<u64>) -> Result<RecommendReport> {
        self.recommend_with(spec, &SubstringMatcher, seed)
    }

    pub fn recommend_with<M: Matcher + ?Sized>(
        &self,
        spec: &PreferenceSpec,
        matcher: &M,
        seed: Option<u64>,
    ) -> Result<RecommendReport> {
        spec.validate()?;
        let records = self.records();
        let outcome = match seed {
            Some(seed) => {
                engine::recommend_with(records, spec, matcher, &mut StdRng::seed_from_u64(seed))
            }
            None => engine::recommend_with(records, spec, matcher, &mut rand::rng()),
        };
        Ok(RecommendReport {
            items: outcome.items,
            zero_calorie_excluded: outcome.zero_calorie_excluded,
            skipped_rows: self.table.skipped_count(),
        })
    }

    pub fn step_filter(&self, step: &StepFilter) -> Result<Vec<RankedRecord>> {
        step.validate()?;
        Ok(filter::step_filter(self.records(), step, &SubstringMatcher))
    }
}

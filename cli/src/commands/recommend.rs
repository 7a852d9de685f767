use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing::debug;

use platter_core::matching::{DelimitedTokenMatcher, SubstringMatcher};
use platter_core::models::{Category, PreferenceSpec, WeightedTokens, parse_tokens};
use platter_core::service::PlatterService;

use super::helpers::{RenderOptions, print_ranked_table, read_preferences};

/// How preference tokens are compared with table text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum MatchMode {
    /// "rich" matches "enriched"
    #[default]
    Substring,
    /// "rich" only matches a whole comma-separated entry
    Exact,
}

/// Preference flags. Each one overrides the same field from `--preferences`.
#[derive(Debug, Default, Args)]
pub(crate) struct PreferenceArgs {
    /// JSON file with a full preference set
    #[arg(long, value_name = "FILE")]
    pub preferences: Option<PathBuf>,
    /// Preferred ingredients, comma separated (e.g. "beef, cheese")
    #[arg(long)]
    pub ingredients: Option<String>,
    /// Points per matching ingredient (1-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub ingredient_priority: Option<u8>,
    /// Preferred user types: normal, gain, loss, athlete, ...
    #[arg(long)]
    pub user_types: Option<String>,
    /// Points per matching user type (1-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub user_type_priority: Option<u8>,
    /// Preferred tastes: sweet, savory, rich, ...
    #[arg(long)]
    pub tastes: Option<String>,
    /// Points per matching taste (1-3)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub taste_priority: Option<u8>,
    /// Ingredients to avoid, comma separated
    #[arg(long)]
    pub avoid_ingredients: Option<String>,
    /// User types to avoid, comma separated
    #[arg(long)]
    pub avoid_user_types: Option<String>,
    /// Tastes to avoid, comma separated
    #[arg(long)]
    pub avoid_tastes: Option<String>,
    /// Maximum number of foods to show
    #[arg(short = 'n', long)]
    pub top: Option<usize>,
    /// Desired calories; adds a serving size to each result
    #[arg(long)]
    pub calories: Option<f64>,
    /// Keep only foods whose calories start with the same digit as this value
    #[arg(long = "calories-per100", value_name = "CALORIES")]
    pub calories_per_100: Option<f64>,
}

impl PreferenceArgs {
    /// Build the spec: file values first, then any flags given on the command line.
    pub(crate) fn into_spec(self) -> Result<PreferenceSpec> {
        let mut spec = match &self.preferences {
            Some(path) => read_preferences(path)?,
            None => PreferenceSpec::default(),
        };

        let includes = [
            (Category::Ingredients, self.ingredients, self.ingredient_priority),
            (Category::UserType, self.user_types, self.user_type_priority),
            (Category::Taste, self.tastes, self.taste_priority),
        ];
        for (category, prompt, priority) in includes {
            let include = spec.include_mut(category);
            if let Some(prompt) = prompt {
                *include = WeightedTokens::parse(&prompt, include.priority);
            }
            if let Some(priority) = priority {
                include.priority = priority;
            }
        }

        let excludes = [
            (Category::Ingredients, self.avoid_ingredients),
            (Category::UserType, self.avoid_user_types),
            (Category::Taste, self.avoid_tastes),
        ];
        for (category, prompt) in excludes {
            if let Some(prompt) = prompt {
                *spec.exclude_mut(category) = parse_tokens(&prompt);
            }
        }

        if let Some(top) = self.top {
            spec.top_n = top;
        }
        if self.calories.is_some() {
            spec.desired_calories = self.calories;
        }
        if self.calories_per_100.is_some() {
            spec.calories_per_100 = self.calories_per_100;
        }

        Ok(spec)
    }
}

pub(crate) fn cmd_recommend(
    svc: &PlatterService,
    spec: &PreferenceSpec,
    matching: MatchMode,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    debug!(?matching, ?seed, top_n = spec.top_n, "running recommendation");
    let report = match matching {
        MatchMode::Substring => svc.recommend_with(spec, &SubstringMatcher, seed)?,
        MatchMode::Exact => svc.recommend_with(spec, &DelimitedTokenMatcher, seed)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if report.items.is_empty() {
            process::exit(2);
        }
        return Ok(());
    }

    if report.skipped_rows > 0 {
        let n = report.skipped_rows;
        eprintln!("Note: {n} table row(s) skipped (see `platter list`)");
    }
    if report.zero_calorie_excluded > 0 {
        let n = report.zero_calorie_excluded;
        eprintln!("Note: {n} zero-calorie food(s) left out (no serving size possible)");
    }

    if report.items.is_empty() {
        eprintln!("No matching foods");
        process::exit(2);
    }

    print_ranked_table(&report.items, RenderOptions::default());
    Ok(())
}

use anyhow::{Context, Result};
use std::path::Path;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use platter_core::models::{FoodRecord, PreferenceSpec, RankedRecord};
use platter_core::serving::format_serving;

/// Per-call table layout. Nothing here is process-wide.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderOptions {
    pub name_width: usize,
    pub text_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            name_width: 30,
            text_width: 28,
        }
    }
}

/// Read a JSON preference file. Missing fields take their defaults.
pub(crate) fn read_preferences(path: &Path) -> Result<PreferenceSpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;
    let spec: PreferenceSpec = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid preferences file: {}", path.display()))?;
    Ok(spec.normalized())
}

pub(crate) fn print_ranked_table(items: &[RankedRecord], opts: RenderOptions) {
    #[derive(Tabled)]
    struct RankedRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
        #[tabled(rename = "User type")]
        user_type: String,
        #[tabled(rename = "Taste")]
        taste: String,
        #[tabled(rename = "Cal/Serving")]
        calories: String,
        #[tabled(rename = "Score")]
        score: u32,
        #[tabled(rename = "Serving")]
        serving: String,
    }

    let rows: Vec<RankedRow> = items
        .iter()
        .enumerate()
        .map(|(i, r)| RankedRow {
            idx: i + 1,
            name: truncate(&r.record.name, opts.name_width),
            ingredients: text_cell(r.record.ingredients.as_deref(), opts.text_width),
            user_type: text_cell(r.record.user_type.as_deref(), opts.text_width),
            taste: text_cell(r.record.taste.as_deref(), opts.text_width),
            calories: format_calories(r.record.calories_per_serving),
            score: r.ranking_score,
            serving: r
                .serving_size_grams
                .map_or_else(|| "-".to_string(), format_serving),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_food_table(records: &[FoodRecord], opts: RenderOptions) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Ingredients")]
        ingredients: String,
        #[tabled(rename = "User type")]
        user_type: String,
        #[tabled(rename = "Taste")]
        taste: String,
        #[tabled(rename = "Cal/Serving")]
        calories: String,
    }

    let rows: Vec<FoodRow> = records
        .iter()
        .enumerate()
        .map(|(i, r)| FoodRow {
            idx: i + 1,
            name: truncate(&r.name, opts.name_width),
            ingredients: text_cell(r.ingredients.as_deref(), opts.text_width),
            user_type: text_cell(r.user_type.as_deref(), opts.text_width),
            taste: text_cell(r.taste.as_deref(), opts.text_width),
            calories: format_calories(r.calories_per_serving),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(5..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

fn text_cell(value: Option<&str>, max: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| truncate(v, max))
}

pub(crate) fn format_calories(cal: f64) -> String {
    if cal.fract() == 0.0 {
        format!("{cal:.0}")
    } else {
        format!("{cal:.1}")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

//! Ranking pipeline: magnitude pre-filter, score, exclude, sort, shuffle the
//! top-scoring group, truncate, annotate serving sizes.

use std::cmp::Reverse;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::matching::{Matcher, SubstringMatcher};
use crate::models::{Category, FoodRecord, PreferenceSpec, RankedRecord, Recommendation};
use crate::serving::serving_size_grams;

/// Rank `records` against `spec` using case-insensitive substring matching.
///
/// The input is never modified. `rng` only decides the order inside the
/// group of records that share the highest score.
pub fn recommend<R: Rng + ?Sized>(
    records: &[FoodRecord],
    spec: &PreferenceSpec,
    rng: &mut R,
) -> Recommendation {
    recommend_with(records, spec, &SubstringMatcher, rng)
}

/// Same as [`recommend`] with a caller-supplied matching rule.
pub fn recommend_with<M, R>(
    records: &[FoodRecord],
    spec: &PreferenceSpec,
    matcher: &M,
    rng: &mut R,
) -> Recommendation
where
    M: Matcher + ?Sized,
    R: Rng + ?Sized,
{
    let mut candidates: Vec<&FoodRecord> = records.iter().collect();

    if let Some(prompt) = spec.calories_per_100 {
        let wanted = leading_char_of_prompt(prompt);
        candidates.retain(|r| leading_char_of_calories(r.calories_per_serving) == wanted);
        debug!(remaining = candidates.len(), "applied calorie magnitude filter");
    }

    let mut scored: Vec<(u32, &FoodRecord)> = candidates
        .into_iter()
        .map(|r| (score_record(r, spec, matcher), r))
        .collect();

    scored.retain(|(_, r)| !is_excluded(r, spec, matcher));
    debug!(remaining = scored.len(), "applied exclusions");

    // A zero-calorie food cannot be scaled to a calorie target. Only foods
    // that survived exclusion are counted.
    let mut zero_calorie_excluded = 0;
    if spec.desired_calories.is_some() {
        let before = scored.len();
        scored.retain(|(_, r)| r.calories_per_serving > 0.0);
        zero_calorie_excluded = before - scored.len();
    }

    rank(&mut scored, rng);
    scored.truncate(spec.top_n);

    let mut items = Vec::with_capacity(scored.len());
    for (ranking_score, record) in scored {
        let serving = match spec.desired_calories {
            Some(desired) => match serving_size_grams(desired, record.calories_per_serving) {
                Some(grams) => Some(grams),
                None => {
                    zero_calorie_excluded += 1;
                    continue;
                }
            },
            None => None,
        };
        items.push(RankedRecord {
            record: record.clone(),
            ranking_score,
            serving_size_grams: serving,
        });
    }

    debug!(
        returned = items.len(),
        zero_calorie_excluded, "recommendation complete"
    );
    Recommendation {
        items,
        zero_calorie_excluded,
    }
}

/// Sum of category priorities over every include token the record matches.
pub fn score_record<M: Matcher + ?Sized>(
    record: &FoodRecord,
    spec: &PreferenceSpec,
    matcher: &M,
) -> u32 {
    let mut score = 0;
    for category in Category::ALL {
        let include = spec.include(category);
        let field = record.field(category);
        for token in &include.tokens {
            if matcher.matches(field, token) {
                score += u32::from(include.priority);
            }
        }
    }
    score
}

/// True when any exclude token matches the record's corresponding field.
pub fn is_excluded<M: Matcher + ?Sized>(
    record: &FoodRecord,
    spec: &PreferenceSpec,
    matcher: &M,
) -> bool {
    Category::ALL.iter().any(|&category| {
        let field = record.field(category);
        spec.exclude(category)
            .iter()
            .any(|token| matcher.matches(field, token))
    })
}

/// Stable sort by score descending, then shuffle the leading max-score group.
fn rank<T, R: Rng + ?Sized>(scored: &mut [(u32, T)], rng: &mut R) {
    scored.sort_by_key(|(score, _)| Reverse(*score));
    let Some(max) = scored.first().map(|(score, _)| *score) else {
        return;
    };
    let tied = scored.iter().take_while(|(score, _)| *score == max).count();
    scored[..tied].shuffle(rng);
}

/// First character of the calorie value as the table renders it
/// (`105` -> `'1'`, `0.5` -> `'0'`).
fn leading_char_of_calories(calories: f64) -> Option<char> {
    format!("{calories}").chars().next()
}

/// First character of the integer part of the prompt (`190.7` -> `'1'`).
/// Rendered from the float itself, so huge prompts are not clamped to `i64`.
fn leading_char_of_prompt(prompt: f64) -> Option<char> {
    let whole = prompt.trunc();
    // "-0" would otherwise lead with '-'
    let whole = if whole == 0.0 { 0.0 } else { whole };
    format!("{whole}").chars().next()
}

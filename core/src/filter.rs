use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpecError;
use crate::matching::Matcher;
use crate::models::{Category, FoodRecord, RankedRecord, validate_calories};
use crate::serving::serving_size_grams;

pub const DEFAULT_CALORIES_THRESHOLD: f64 = 200.0;

/// Fixed-order filtering without scoring: calorie floor, ingredient
/// selection, user-type avoidance, then optionally a single taste group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepFilter {
    /// Keep foods strictly above this many calories per serving.
    pub calories_threshold: f64,
    /// Exact (case-insensitive) ingredient strings to keep. Empty keeps all.
    pub ingredients: Vec<String>,
    pub avoid_user_types: Vec<String>,
    /// Keep only the first taste group in table order.
    pub same_taste: bool,
    pub desired_calories: Option<f64>,
}

impl Default for StepFilter {
    fn default() -> Self {
        Self {
            calories_threshold: DEFAULT_CALORIES_THRESHOLD,
            ingredients: Vec::new(),
            avoid_user_types: Vec::new(),
            same_taste: false,
            desired_calories: None,
        }
    }
}

impl StepFilter {
    pub fn validate(&self) -> Result<(), SpecError> {
        validate_calories("calories_threshold", Some(self.calories_threshold))?;
        validate_calories("desired_calories", self.desired_calories)
    }
}

/// Apply `filter` to `records`, keeping table order. Scores are always 0.
pub fn step_filter<M: Matcher + ?Sized>(
    records: &[FoodRecord],
    filter: &StepFilter,
    matcher: &M,
) -> Vec<RankedRecord> {
    let mut kept: Vec<&FoodRecord> = records
        .iter()
        .filter(|r| r.calories_per_serving > filter.calories_threshold)
        .collect();
    debug!(remaining = kept.len(), "applied calorie threshold");

    if !filter.ingredients.is_empty() {
        kept.retain(|r| {
            r.ingredients.as_deref().is_some_and(|ing| {
                filter
                    .ingredients
                    .iter()
                    .any(|sel| sel.trim().eq_ignore_ascii_case(ing.trim()))
            })
        });
    }

    kept.retain(|r| {
        let field = r.field(Category::UserType);
        !filter
            .avoid_user_types
            .iter()
            .any(|token| matcher.matches(field, token))
    });

    if filter.same_taste {
        // Rows without a taste never form a group
        if let Some(taste) = kept.iter().find_map(|r| r.taste.clone()) {
            kept.retain(|r| r.taste.as_deref() == Some(taste.as_str()));
        }
    }

    kept.into_iter()
        .filter_map(|r| {
            let serving = match filter.desired_calories {
                Some(desired) => Some(serving_size_grams(desired, r.calories_per_serving)?),
                None => None,
            };
            Some(RankedRecord {
                record: r.clone(),
                ranking_score: 0,
                serving_size_grams: serving,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::SubstringMatcher;

    fn food(
        name: &str,
        ingredients: Option<&str>,
        user_type: &str,
        taste: Option<&str>,
        cal: f64,
    ) -> FoodRecord {
        let mut record = FoodRecord::new(name, cal);
        record.ingredients = ingredients.map(str::to_string);
        record.user_type = Some(user_type.to_string());
        record.taste = taste.map(str::to_string);
        record
    }

    fn table() -> Vec<FoodRecord> {
        vec![
            food("Salad", Some("lettuce"), "loss", Some("fresh"), 80.0),
            food("Steak", Some("beef"), "athlete", Some("savory"), 450.0),
            food("Cheesecake", Some("cheese"), "gain, rich", Some("sweet"), 520.0),
            food("Burger", Some("beef"), "normal", Some("savory"), 600.0),
            food("Exactly", Some("beef"), "normal", Some("savory"), 200.0),
        ]
    }

    fn names(out: &[RankedRecord]) -> Vec<&str> {
        out.iter().map(|r| r.record.name.as_str()).collect()
    }

    #[test]
    fn test_threshold_is_strict() {
        let out = step_filter(&table(), &StepFilter::default(), &SubstringMatcher);
        assert_eq!(names(&out), vec!["Steak", "Cheesecake", "Burger"]);
        assert!(out.iter().all(|r| r.ranking_score == 0));
    }

    #[test]
    fn test_ingredient_selection_is_exact() {
        let filter = StepFilter {
            ingredients: vec!["Beef".to_string()],
            ..StepFilter::default()
        };
        let out = step_filter(&table(), &filter, &SubstringMatcher);
        assert_eq!(names(&out), vec!["Steak", "Burger"]);

        let filter = StepFilter {
            ingredients: vec!["bee".to_string()],
            ..StepFilter::default()
        };
        assert!(step_filter(&table(), &filter, &SubstringMatcher).is_empty());
    }

    #[test]
    fn test_avoid_user_types() {
        let filter = StepFilter {
            avoid_user_types: vec!["rich".to_string()],
            ..StepFilter::default()
        };
        let out = step_filter(&table(), &filter, &SubstringMatcher);
        assert_eq!(names(&out), vec!["Steak", "Burger"]);
    }

    #[test]
    fn test_same_taste_keeps_first_group() {
        let filter = StepFilter {
            same_taste: true,
            ..StepFilter::default()
        };
        let out = step_filter(&table(), &filter, &SubstringMatcher);
        assert_eq!(names(&out), vec!["Steak", "Burger"]);
    }

    #[test]
    fn test_same_taste_skips_missing_taste() {
        let records = vec![
            food("Plain", Some("rice"), "normal", None, 300.0),
            food("Curry", Some("rice"), "normal", Some("spicy"), 400.0),
            food("Pilaf", Some("rice"), "normal", Some("mild"), 350.0),
        ];
        let filter = StepFilter {
            same_taste: true,
            ..StepFilter::default()
        };
        let out = step_filter(&records, &filter, &SubstringMatcher);
        assert_eq!(names(&out), vec!["Curry"]);
    }

    #[test]
    fn test_serving_annotation() {
        let filter = StepFilter {
            desired_calories: Some(1000.0),
            ..StepFilter::default()
        };
        let out = step_filter(&table(), &filter, &SubstringMatcher);
        let sizes: Vec<Option<u64>> = out.iter().map(|r| r.serving_size_grams).collect();
        assert_eq!(sizes, vec![Some(3), Some(2), Some(2)]);
    }

    #[test]
    fn test_validate() {
        assert!(StepFilter::default().validate().is_ok());
        let filter = StepFilter {
            calories_threshold: -1.0,
            ..StepFilter::default()
        };
        assert!(filter.validate().is_err());
    }
}

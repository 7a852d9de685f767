use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

pub const DEFAULT_TOP_N: usize = 5;
pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 3;

/// One row of the food table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    pub ingredients: Option<String>,
    pub user_type: Option<String>,
    pub taste: Option<String>,
    pub calories_per_serving: f64,
    // Non-legacy columns the loader does not interpret
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl FoodRecord {
    #[must_use]
    pub fn new(name: &str, calories_per_serving: f64) -> Self {
        Self {
            name: name.to_string(),
            ingredients: None,
            user_type: None,
            taste: None,
            calories_per_serving,
            extra: BTreeMap::new(),
        }
    }

    /// The free-text field a preference category is matched against.
    #[must_use]
    pub fn field(&self, category: Category) -> Option<&str> {
        match category {
            Category::Ingredients => self.ingredients.as_deref(),
            Category::UserType => self.user_type.as_deref(),
            Category::Taste => self.taste.as_deref(),
        }
    }
}

/// The three free-text columns preferences can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ingredients,
    UserType,
    Taste,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Ingredients, Category::UserType, Category::Taste];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Ingredients => "ingredients",
            Category::UserType => "user_type",
            Category::Taste => "taste",
        }
    }
}

/// Split a comma-delimited prompt like `"Beef, cheese"` into normalized tokens.
///
/// Tokens are trimmed and lowercased; empty tokens are dropped so a trailing
/// comma never turns into a match-everything token.
#[must_use]
pub fn parse_tokens(prompt: &str) -> Vec<String> {
    prompt
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn normalize_tokens(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Include tokens for one category, each worth `priority` points on a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedTokens {
    pub tokens: Vec<String>,
    pub priority: u8,
}

impl Default for WeightedTokens {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            priority: MIN_PRIORITY,
        }
    }
}

impl WeightedTokens {
    #[must_use]
    pub fn parse(prompt: &str, priority: u8) -> Self {
        Self {
            tokens: parse_tokens(prompt),
            priority,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A single recommendation request.
///
/// Every front-end builds one of these; a fixed priority of 1 versus a
/// user-selected 1-3 is only a difference in the values filled in here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSpec {
    pub calories_per_100: Option<f64>,
    pub include_ingredients: WeightedTokens,
    pub include_user_types: WeightedTokens,
    pub include_tastes: WeightedTokens,
    pub exclude_ingredients: Vec<String>,
    pub exclude_user_types: Vec<String>,
    pub exclude_tastes: Vec<String>,
    pub top_n: usize,
    pub desired_calories: Option<f64>,
}

impl Default for PreferenceSpec {
    fn default() -> Self {
        Self {
            calories_per_100: None,
            include_ingredients: WeightedTokens::default(),
            include_user_types: WeightedTokens::default(),
            include_tastes: WeightedTokens::default(),
            exclude_ingredients: Vec::new(),
            exclude_user_types: Vec::new(),
            exclude_tastes: Vec::new(),
            top_n: DEFAULT_TOP_N,
            desired_calories: None,
        }
    }
}

impl PreferenceSpec {
    #[must_use]
    pub fn include(&self, category: Category) -> &WeightedTokens {
        match category {
            Category::Ingredients => &self.include_ingredients,
            Category::UserType => &self.include_user_types,
            Category::Taste => &self.include_tastes,
        }
    }

    pub fn include_mut(&mut self, category: Category) -> &mut WeightedTokens {
        match category {
            Category::Ingredients => &mut self.include_ingredients,
            Category::UserType => &mut self.include_user_types,
            Category::Taste => &mut self.include_tastes,
        }
    }

    #[must_use]
    pub fn exclude(&self, category: Category) -> &[String] {
        match category {
            Category::Ingredients => &self.exclude_ingredients,
            Category::UserType => &self.exclude_user_types,
            Category::Taste => &self.exclude_tastes,
        }
    }

    pub fn exclude_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Ingredients => &mut self.exclude_ingredients,
            Category::UserType => &mut self.exclude_user_types,
            Category::Taste => &mut self.exclude_tastes,
        }
    }

    /// Trim and lowercase every token, dropping empty ones.
    ///
    /// Specs deserialized from JSON may carry raw user input; prompt strings
    /// parsed with [`parse_tokens`] are already normalized.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for category in Category::ALL {
            let include = self.include_mut(category);
            include.tokens = normalize_tokens(&include.tokens);
            let exclude = self.exclude_mut(category);
            *exclude = normalize_tokens(exclude);
        }
        self
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        for category in Category::ALL {
            let priority = self.include(category).priority;
            if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
                return Err(SpecError::PriorityOutOfRange {
                    category: category.label(),
                    priority,
                });
            }
        }
        if self.top_n == 0 {
            return Err(SpecError::ZeroTopN);
        }
        validate_calories("desired_calories", self.desired_calories)?;
        validate_calories("calories_per_100", self.calories_per_100)?;
        Ok(())
    }
}

pub(crate) fn validate_calories(field: &'static str, value: Option<f64>) -> Result<(), SpecError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(SpecError::InvalidCalories { field, value: v }),
        _ => Ok(()),
    }
}

/// A food record as returned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecord {
    #[serde(flatten)]
    pub record: FoodRecord,
    pub ranking_score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_grams: Option<u64>,
}

/// Engine output for one request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recommendation {
    pub items: Vec<RankedRecord>,
    /// Records left out because a serving size could not be computed for them.
    pub zero_calorie_excluded: usize,
}

/// Grams of a food needed to reach `desired_calories`, rounded up.
///
/// Returns `None` when the food has no usable calorie value (zero, negative
/// or non-finite) or the result does not fit, so callers never see inf or NaN.
#[must_use]
#[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn serving_size_grams(desired_calories: f64, calories_per_serving: f64) -> Option<u64> {
    if !desired_calories.is_finite() || desired_calories < 0.0 {
        return None;
    }
    if !calories_per_serving.is_finite() || calories_per_serving <= 0.0 {
        return None;
    }
    let grams = (desired_calories / calories_per_serving).ceil();
    if !grams.is_finite() || grams > u64::MAX as f64 {
        return None;
    }
    Some(grams as u64)
}

/// Display form used by the table renderers, e.g. `"3 gram"`.
#[must_use]
pub fn format_serving(grams: u64) -> String {
    format!("{grams} gram")
}

use anyhow::Result;
use std::process;
use tracing::debug;

use platter_core::filter::StepFilter;
use platter_core::service::PlatterService;

use super::helpers::{RenderOptions, print_ranked_table};

pub(crate) fn cmd_filter(svc: &PlatterService, step: &StepFilter, json: bool) -> Result<()> {
    let foods = svc.step_filter(step)?;
    debug!(kept = foods.len(), "step filter complete");

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods pass the filter");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        print_ranked_table(&foods, RenderOptions::default());
    }

    Ok(())
}

use anyhow::Result;
use std::process;

use platter_core::service::PlatterService;

use super::helpers::{RenderOptions, print_food_table};

pub(crate) fn cmd_list(svc: &PlatterService, json: bool) -> Result<()> {
    let records = svc.records();
    let skipped = svc.skipped();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "records": records,
                "skipped": skipped,
            }))?
        );
        return Ok(());
    }

    if records.is_empty() {
        eprintln!("Food table has no usable rows");
    } else {
        print_food_table(records, RenderOptions::default());
    }

    if !skipped.is_empty() {
        println!("\nSkipped {} row(s):", skipped.len());
        for row in skipped {
            let line = row.line;
            let fault = &row.fault;
            match &row.sheet {
                Some(sheet) => println!("  {sheet} line {line}: {fault}"),
                None => println!("  line {line}: {fault}"),
            }
        }
    }

    if records.is_empty() {
        process::exit(2);
    }

    Ok(())
}

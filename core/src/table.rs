use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{RecordFault, TableError};
use crate::models::FoodRecord;

const NAME_ALIASES: &[&str] = &["name", "food", "food name", "dish", "item"];
const INGREDIENTS_ALIASES: &[&str] = &["ingredients", "ingredient"];
const USER_TYPE_ALIASES: &[&str] = &["user type", "user_type", "usertype", "user types"];
const TASTE_ALIASES: &[&str] = &["taste", "tastes"];
const CALORIES_ALIASES: &[&str] = &[
    "calories/serving",
    "calories per serving",
    "calories_per_serving",
];

/// Spreadsheet bookkeeping columns that never reach the output.
const LEGACY_COLUMNS: &[&str] = &["no", "serving", "calories"];

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A row the loader could not turn into a [`FoodRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based line in the source file (or worksheet), header included.
    pub line: usize,
    /// Worksheet name when the table came from a workbook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub fault: RecordFault,
}

/// Result of loading a food table.
#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub records: Vec<FoodRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl LoadedTable {
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    fn push_row(
        &mut self,
        record: &csv::StringRecord,
        cols: &Columns,
        line: usize,
        sheet: Option<&str>,
    ) {
        if record.iter().all(|v| v.trim().is_empty()) {
            return; // blank row
        }

        match parse_row(record, cols) {
            Ok(food) => self.records.push(food),
            Err(fault) => {
                warn!(line, sheet, %fault, "skipping food table row");
                self.skipped.push(SkippedRow {
                    line,
                    sheet: sheet.map(str::to_string),
                    fault,
                });
            }
        }
    }
}

struct Columns {
    name: usize,
    ingredients: usize,
    user_type: usize,
    taste: usize,
    calories: usize,
    extra: Vec<(usize, String)>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, TableError> {
        let keys: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |aliases: &[&str], label: &'static str| -> Result<usize, TableError> {
            keys.iter()
                .position(|k| aliases.contains(&k.as_str()))
                .ok_or(TableError::MissingColumn(label))
        };

        let name = find(NAME_ALIASES, "Name")?;
        let ingredients = find(INGREDIENTS_ALIASES, "Ingredients")?;
        let user_type = find(USER_TYPE_ALIASES, "User type")?;
        let taste = find(TASTE_ALIASES, "Taste")?;
        let calories = find(CALORIES_ALIASES, "Calories/Serving")?;

        let known = [name, ingredients, user_type, taste, calories];
        let extra = keys
            .iter()
            .enumerate()
            .filter(|(i, k)| {
                !known.contains(i) && !k.is_empty() && !LEGACY_COLUMNS.contains(&k.as_str())
            })
            .map(|(i, _)| (i, headers.get(i).unwrap_or_default().trim().to_string()))
            .collect();

        Ok(Self {
            name,
            ingredients,
            user_type,
            taste,
            calories,
            extra,
        })
    }
}

/// Parse a food table from CSV.
///
/// Expected header (case-insensitive, extra columns allowed):
/// `No,Name,Ingredients,User type,Taste,Calories/Serving,Serving,Calories`
///
/// `No`, `Serving` and `Calories` are legacy columns and are dropped. A
/// missing required column fails the whole load; a bad row is skipped and
/// reported in [`LoadedTable::skipped`].
pub fn parse_food_table<R: Read>(reader: R) -> Result<LoadedTable, TableError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers)?;

    let mut table = LoadedTable::default();

    for (row_num, result) in rdr.records().enumerate() {
        let record = result?;
        table.push_row(&record, &cols, row_num + 2, None);
    }

    debug!(
        records = table.records.len(),
        skipped = table.skipped.len(),
        "loaded food table"
    );
    Ok(table)
}

/// Open and parse a food table from disk.
///
/// Spreadsheet extensions (`.xlsx`, `.xls`, `.ods`, ...) go through
/// [`load_workbook_file`]; anything else is read as CSV.
pub fn load_table_file(path: &Path) -> Result<LoadedTable, TableError> {
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
    if is_workbook {
        return load_workbook_file(path);
    }

    let file = File::open(path)?;
    parse_food_table(file)
}

/// Parse every worksheet of a workbook and concatenate their rows in sheet
/// order. Each sheet carries its own header row; empty sheets are ignored.
pub fn load_workbook_file(path: &Path) -> Result<LoadedTable, TableError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut table = LoadedTable::default();

    for sheet in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet)?;
        let first_line = range.start().map_or(1, |(row, _)| row as usize + 1);

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect::<csv::StringRecord>());
        let Some(headers) = rows.next() else {
            debug!(sheet = %sheet, "skipping empty worksheet");
            continue;
        };
        let cols = Columns::resolve(&headers)?;

        for (row_num, record) in rows.enumerate() {
            table.push_row(&record, &cols, first_line + row_num + 1, Some(&sheet));
        }
    }

    debug!(
        records = table.records.len(),
        skipped = table.skipped.len(),
        "loaded food workbook"
    );
    Ok(table)
}

fn parse_row(record: &csv::StringRecord, cols: &Columns) -> Result<FoodRecord, RecordFault> {
    let text = |idx: usize| -> Option<String> {
        record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let name = text(cols.name).ok_or(RecordFault::MissingName)?;
    let raw_calories = text(cols.calories).ok_or(RecordFault::MissingCalories)?;
    let calories: f64 = raw_calories
        .parse()
        .map_err(|_| RecordFault::InvalidCalories(raw_calories.clone()))?;
    if !calories.is_finite() || calories < 0.0 {
        return Err(RecordFault::NegativeCalories(raw_calories));
    }
    // "-0" would otherwise render with a leading '-'
    let calories_per_serving = if calories == 0.0 { 0.0 } else { calories };

    let extra: BTreeMap<String, String> = cols
        .extra
        .iter()
        .filter_map(|(idx, header)| text(*idx).map(|v| (header.clone(), v)))
        .collect();

    Ok(FoodRecord {
        name,
        ingredients: text(cols.ingredients),
        user_type: text(cols.user_type),
        taste: text(cols.taste),
        calories_per_serving,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
No,Name,Ingredients,User type,Taste,Calories/Serving,Serving,Calories
1,Beef Stew,\"beef, carrot\",athlete,rich,200,100,200
2,Tofu Bowl,tofu,normal,light,150,100,150
3,Cheese Toast,\"cheese, bread\",gain,\"savory, rich\",320,100,320
";

    #[test]
    fn test_parse_food_table_basic() {
        let table = parse_food_table(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 3);
        assert!(table.skipped.is_empty());

        let stew = &table.records[0];
        assert_eq!(stew.name, "Beef Stew");
        assert_eq!(stew.ingredients.as_deref(), Some("beef, carrot"));
        assert_eq!(stew.user_type.as_deref(), Some("athlete"));
        assert_eq!(stew.taste.as_deref(), Some("rich"));
        assert!((stew.calories_per_serving - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_legacy_columns_are_dropped() {
        let table = parse_food_table(SAMPLE_CSV.as_bytes()).unwrap();
        assert!(table.records.iter().all(|r| r.extra.is_empty()));
    }

    #[test]
    fn test_extra_columns_are_kept() {
        let csv = "\
Name,Ingredients,User type,Taste,Calories/Serving,Cuisine
Pho,\"beef, noodle\",normal,savory,350,Vietnamese
";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        assert_eq!(
            table.records[0].extra.get("Cuisine").map(String::as_str),
            Some("Vietnamese")
        );
    }

    #[test]
    fn test_header_aliases_and_case() {
        let csv = "\
food,INGREDIENT,User Type,tastes,calories per serving
Omelette,egg,normal,savory,180
";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].name, "Omelette");
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Name,Ingredients,Taste,Calories/Serving\nPho,beef,savory,350\n";
        let err = parse_food_table(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("User type")));
        assert!(err.to_string().contains("User type"));
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let csv = "\
Name,Ingredients,User type,Taste,Calories/Serving
Good,beef,athlete,rich,200
,tofu,normal,light,150
NoCal,rice,normal,plain,
Text,rice,normal,plain,lots
Neg,rice,normal,plain,-5
Also Good,egg,normal,savory,90
";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.skipped_count(), 4);
        assert_eq!(
            table.skipped[0],
            SkippedRow {
                line: 3,
                sheet: None,
                fault: RecordFault::MissingName
            }
        );
        assert_eq!(table.skipped[1].fault, RecordFault::MissingCalories);
        assert_eq!(
            table.skipped[2].fault,
            RecordFault::InvalidCalories("lots".to_string())
        );
        assert_eq!(
            table.skipped[3].fault,
            RecordFault::NegativeCalories("-5".to_string())
        );
    }

    #[test]
    fn test_empty_text_fields_become_none() {
        let csv = "\
Name,Ingredients,User type,Taste,Calories/Serving
Water,,,,0
";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        let water = &table.records[0];
        assert!(water.ingredients.is_none());
        assert!(water.user_type.is_none());
        assert!(water.taste.is_none());
        assert_eq!(water.calories_per_serving.to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let csv = "Name,Ingredients,User type,Taste,Calories/Serving\nIce,,,,-0\n";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        assert_eq!(
            table.records[0].calories_per_serving.to_bits(),
            0.0_f64.to_bits()
        );
    }

    #[test]
    fn test_skips_blank_rows() {
        let csv = "\
Name,Ingredients,User type,Taste,Calories/Serving
Pho,beef,normal,savory,350
,,,,

Soup,leek,normal,light,90
";
        let table = parse_food_table(csv.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert!(table.skipped.is_empty());
    }

    #[test]
    fn test_load_table_file_missing() {
        let err = load_table_file(Path::new("/nonexistent/foods.csv")).unwrap_err();
        assert!(matches!(err, TableError::Io(_)));
    }

    fn write_sheet(workbook: &mut rust_xlsxwriter::Workbook, name: &str, rows: &[&[&str]]) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                if value.is_empty() {
                    continue;
                }
                match value.parse::<f64>() {
                    Ok(n) => sheet.write_number(r, c, n).unwrap(),
                    Err(_) => sheet.write_string(r, c, *value).unwrap(),
                };
            }
        }
    }

    const HEADER: &[&str] = &["No", "Name", "Ingredients", "User type", "Taste", "Calories/Serving"];

    #[test]
    fn test_workbook_concatenates_all_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food-ver2.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        write_sheet(
            &mut workbook,
            "Mains",
            &[
                HEADER,
                &["1", "Beef Stew", "beef, carrot", "athlete", "rich", "200"],
                &["2", "Tofu Bowl", "tofu", "normal", "light", "150"],
            ],
        );
        write_sheet(
            &mut workbook,
            "Desserts",
            &[
                HEADER,
                &["1", "Flan", "egg, sugar", "gain", "sweet", "280"],
                &["2", "Mystery", "", "", "", "lots"],
            ],
        );
        workbook.save(&path).unwrap();

        let table = load_table_file(&path).unwrap();
        let names: Vec<&str> = table.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Beef Stew", "Tofu Bowl", "Flan"]);
        assert!((table.records[0].calories_per_serving - 200.0).abs() < f64::EPSILON);
        assert_eq!(table.records[2].ingredients.as_deref(), Some("egg, sugar"));
        assert!(table.records.iter().all(|r| r.extra.is_empty()));

        assert_eq!(
            table.skipped,
            vec![SkippedRow {
                line: 3,
                sheet: Some("Desserts".to_string()),
                fault: RecordFault::InvalidCalories("lots".to_string()),
            }]
        );
    }

    #[test]
    fn test_workbook_sheet_missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foods.XLSX");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        write_sheet(
            &mut workbook,
            "Sheet1",
            &[&["Name", "Taste"], &["Pho", "savory"]],
        );
        workbook.save(&path).unwrap();

        let err = load_table_file(&path).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn("Ingredients")));
    }

    #[test]
    fn test_non_workbook_extension_reads_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foods.txt");
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        assert_eq!(load_table_file(&path).unwrap().records.len(), 3);
    }
}

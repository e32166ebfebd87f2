use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::RunOutcome;

pub fn print_summary(outcome: &RunOutcome) {
    let summary = &outcome.summary;
    match &outcome.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Dry run, no output written"),
    }
    println!("Mode: {}", summary.mode.as_str());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Outcome"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (code, rows) in &summary.rows_by_code {
        table.add_row(vec![
            code_cell(*code),
            Cell::new(outcome_name(outcome, *code)),
            Cell::new(rows),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} event rows", summary.events)),
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn outcome_name(outcome: &RunOutcome, code: i64) -> String {
    if let Some(label) = outcome.labels.get(&code) {
        return label.clone();
    }
    match code {
        0 => "Censored".to_string(),
        1 => "Event".to_string(),
        _ => format!("Competing risk {}", code - 1),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn code_cell(code: i64) -> Cell {
    if code == 0 {
        Cell::new(code).fg(Color::DarkGrey)
    } else {
        Cell::new(code)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use zones_ingest::LoadOutcome;
use zones_integrate::{DuplicationOverview, IntegrationOutcome};
use zones_model::SourceSpec;
use zones_resolve::{MatchKind, ResolutionMapping};

use crate::commands::ResolveReport;
use zones_cli::pipeline::PipelineReport;

pub fn print_load_summary(outcomes: &[LoadOutcome]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Relation"),
        header_cell("Format"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_rows = 0usize;
    let mut total_dropped = 0usize;
    for outcome in outcomes {
        let file = outcome.path().display().to_string();
        match outcome {
            LoadOutcome::Loaded {
                relation,
                format,
                rows,
                columns,
                dropped_rows,
                ..
            } => {
                total_rows += rows;
                total_dropped += dropped_rows;
                table.add_row(vec![
                    Cell::new(file),
                    Cell::new(relation).fg(Color::Green),
                    Cell::new(format.extension()),
                    Cell::new(rows),
                    Cell::new(columns),
                    count_cell(*dropped_rows, Color::Yellow),
                ]);
            }
            LoadOutcome::Skipped { reason, .. } => {
                table.add_row(vec![
                    dim_cell(file),
                    Cell::new(format!("skipped: {reason}")).fg(Color::Yellow),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    let loaded = outcomes.iter().filter(|o| o.is_loaded()).count();
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(format!("{loaded} of {} loaded", outcomes.len())),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_dropped, Color::Yellow),
    ]);
    println!("{table}");
}

pub fn print_integration_summary(results: &[(SourceSpec, Option<IntegrationOutcome>)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Canonical"),
        header_cell("Versions"),
        header_cell("Rows read"),
        header_cell("Rows written"),
        header_cell("Duplicates"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (source, outcome) in results {
        match outcome {
            Some(outcome) => table.add_row(vec![
                Cell::new(&outcome.source),
                Cell::new(&outcome.canonical).fg(Color::Green),
                Cell::new(outcome.versions.join(", ")),
                Cell::new(outcome.rows_read),
                Cell::new(outcome.rows_written),
                count_cell(outcome.duplicates_removed, Color::Yellow),
            ]),
            None => table.add_row(vec![
                Cell::new(&source.name),
                dim_cell(source.canonical_name()),
                Cell::new("no versions").fg(Color::Yellow),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]),
        };
    }
    println!("{table}");
}

pub fn print_resolution(report: &ResolveReport) {
    println!("Left: {} ({} labels)", report.left, report.left_labels);
    println!("Right: {} ({} labels)", report.right, report.right_labels);
    print_pairs(&report.mapping);
    if let Some(changed) = report.rewritten {
        println!("Rewrote {changed} value(s) of {}", report.left);
    }
}

fn print_pairs(mapping: &ResolutionMapping) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Left"),
        header_cell("Right"),
        header_cell("Distance"),
        header_cell("Match"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    for pair in mapping {
        let kind = match pair.kind {
            MatchKind::Exact => Cell::new("exact").fg(Color::Green),
            MatchKind::Nearest => Cell::new("nearest").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&pair.left),
            Cell::new(&pair.right),
            Cell::new(pair.distance),
            kind,
        ]);
    }
    table.add_row(vec![
        total_cell("TOTAL"),
        total_cell(format!("{} pairs", mapping.len())),
        dim_cell("-"),
        Cell::new(format!(
            "{} exact / {} nearest",
            mapping.count(MatchKind::Exact),
            mapping.count(MatchKind::Nearest)
        ))
        .add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_relations(relations: &[(String, DuplicationOverview)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Relation"),
        header_cell("Rows"),
        header_cell("Duplicate rows"),
        header_cell("Columns"),
        header_cell("Duplicate columns"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (name, overview) in relations {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(overview.rows),
            share_cell(overview.duplicate_rows, overview.duplicate_row_pct()),
            Cell::new(overview.columns),
            share_cell(overview.duplicate_columns, overview.duplicate_column_pct()),
        ]);
    }
    if relations.is_empty() {
        println!("No relations in store.");
    } else {
        println!("{table}");
    }
}

pub fn print_pipeline_report(report: &PipelineReport) {
    println!("Promoted {} file(s) into landing/persistent", report.promoted.len());
    for path in &report.promoted {
        println!("  {}", path.display());
    }
    print_load_summary(&report.loads);
    print_integration_summary(&report.integrations);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn total_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn share_cell(count: usize, pct: f64) -> Cell {
    let text = format!("{count} ({pct:.1}%)");
    if count > 0 {
        Cell::new(text).fg(Color::Yellow)
    } else {
        dim_cell(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

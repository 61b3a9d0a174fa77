// sentinel/src/table.rs
//
// Terminal rendering of runs. Reports on disk are produced by sentinel-core.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sentinel_core::domain::rules::RuleStatus;
use sentinel_core::domain::run::{Run, RunStatus};

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn rule_status_cell(status: RuleStatus) -> Cell {
    let color = match status {
        RuleStatus::Pass => Color::Green,
        RuleStatus::Fail => Color::Red,
        RuleStatus::Skip => Color::Yellow,
    };
    Cell::new(status.as_str())
        .fg(color)
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Center)
}

fn run_status_cell(status: RunStatus) -> Cell {
    let color = match status {
        RunStatus::Completed => Color::Green,
        RunStatus::Failed => Color::Red,
        RunStatus::Running => Color::Yellow,
    };
    Cell::new(status.as_str()).fg(color)
}

fn score_cell(score: Option<u8>) -> Cell {
    match score {
        Some(score) => {
            let color = match score {
                80..=100 => Color::Green,
                50..=79 => Color::Yellow,
                _ => Color::Red,
            };
            Cell::new(score)
                .fg(color)
                .set_alignment(CellAlignment::Right)
        }
        None => Cell::new("-").add_attribute(Attribute::Dim),
    }
}

pub fn results_table(run: &Run) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Status"),
        header_cell("Column"),
        header_cell("Metric"),
        header_cell("Threshold"),
    ]);
    for result in &run.results {
        table.add_row(vec![
            Cell::new(result.rule_name.title()),
            rule_status_cell(result.status),
            Cell::new(result.column.as_deref().unwrap_or("-")),
            Cell::new(&result.metric),
            Cell::new(&result.threshold),
        ]);
    }
    table
}

pub fn print_run(run: &Run) {
    println!(
        "\n📊 {} (lineage '{}', {} rows × {} columns)",
        run.dataset.source,
        run.dataset.lineage,
        run.dataset.row_count,
        run.dataset.columns.len()
    );
    println!("   Run: {}", run.run_id);

    if let Some(error) = &run.error {
        println!("   ❌ Run failed: {}", error);
        return;
    }

    println!("{}", results_table(run));
    if let Some(summary) = run.summary {
        println!(
            "   Score: {}/100 ({} passed, {} failed, {} skipped)",
            summary.score, summary.passed, summary.failed, summary.skipped
        );
    }
}

pub fn history_table(runs: &[Run]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header_cell("Run"),
        header_cell("Created"),
        header_cell("Lineage"),
        header_cell("Rows"),
        header_cell("Status"),
        header_cell("Score"),
    ]);
    for run in runs {
        table.add_row(vec![
            Cell::new(run.run_id),
            Cell::new(run.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&run.dataset.lineage),
            Cell::new(run.dataset.row_count).set_alignment(CellAlignment::Right),
            run_status_cell(run.status),
            score_cell(run.score()),
        ]);
    }
    table
}

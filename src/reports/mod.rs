use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use reshuffler::core_types::CategoryId;
use reshuffler::optimizer::SearchState;
use reshuffler::scorer::{AllocationSet, CategoryVector, TokenCollection};
use reshuffler::verifier::{OptimalityVerdict, StateStats};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_category_report(per_category: &CategoryVector) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Tokens"),
        Cell::new("Share"),
    ]);
    align_right(&mut table, 0..=2);

    for (category, (count, share)) in per_category
        .as_slice()
        .iter()
        .zip(per_category.normalised())
        .enumerate()
    {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(count),
            Cell::new(format!("{:.2}", share)),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_owner_report(state: &SearchState, grail_categories: &[CategoryId]) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Owner").add_attribute(Attribute::Bold),
        Cell::new("Tokens"),
        Cell::new("Initial"),
        Cell::new("Final"),
        Cell::new("Var"),
        Cell::new("Ret Tok").fg(Color::Red),
        Cell::new("Ret Cat").fg(Color::Red),
        Cell::new("Dupe").fg(Color::Red),
        Cell::new("Grails").fg(Color::Yellow),
    ]);
    align_right(&mut table, 4..=8);

    for (current, initial) in state.current().iter().zip(state.initial()) {
        let stats = StateStats::for_allocation(current, initial);
        let owner = if current.is_pool() {
            Cell::new(format!("{} (pool)", current.owner())).fg(Color::Yellow)
        } else {
            Cell::new(current.owner()).add_attribute(Attribute::Bold)
        };

        table.add_row(vec![
            owner,
            Cell::new(current.num_tokens()),
            Cell::new(initial.histogram()),
            Cell::new(current.histogram()),
            Cell::new(format!("{:.3}", current.variability(current.width()))),
            Cell::new(stats.num_returned_tokens),
            Cell::new(stats.num_returned_categories),
            Cell::new(stats.num_duplicate_category_tokens),
            Cell::new(current.num_in_categories(grail_categories)),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_stats_comparison(
    start: &StateStats,
    start_score: f64,
    verdict: &OptimalityVerdict,
    state: &SearchState,
) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Statistic").add_attribute(Attribute::Bold),
        Cell::new("Start"),
        Cell::new("Final"),
    ]);
    align_right(&mut table, 1..=2);

    let rows = [
        ("Returned tokens", start.num_returned_tokens, verdict.stats.num_returned_tokens),
        (
            "Returned categories",
            start.num_returned_categories,
            verdict.stats.num_returned_categories,
        ),
        (
            "Duplicate category tokens",
            start.num_duplicate_category_tokens,
            verdict.stats.num_duplicate_category_tokens,
        ),
    ];
    for (name, before, after) in rows {
        let after_cell = if after == 0 {
            Cell::new(after).fg(Color::Green)
        } else {
            Cell::new(after).fg(Color::Red)
        };
        table.add_row(vec![Cell::new(name), Cell::new(before), after_cell]);
    }

    table.add_row(vec![
        Cell::new("Average variability"),
        Cell::new(format!("{:.3}", state.initial().avg_variability())),
        Cell::new(format!("{:.3}", state.current().avg_variability())),
    ]);
    table.add_row(vec![
        Cell::new("Score (bound)").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.0}", start_score)),
        Cell::new(format!("{:.0} ({:.0})", verdict.score, verdict.bound)),
    ]);
    println!("\n{}", table);

    if verdict.is_trivial_optimum {
        println!("Result: trivial optimum");
    } else {
        println!("Result: not provably optimal");
    }
}

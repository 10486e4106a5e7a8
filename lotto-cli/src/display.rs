use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use textplots::Plot;

use lotto_db::models::GameFormat;

use crate::analysis::evaluate::{MatchResult, WinStats};
use crate::analysis::sampler::{Pick, Strategy};
use crate::analysis::simulate::{BestStrategy, StrategyReport};
use crate::analysis::FrequencyTable;
use crate::error::AnalysisError;
use crate::import::ImportSummary;

const SHOWN_DATES: usize = 3;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn format_pick(pick: &[u8]) -> String {
    pick.iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// First few dates, with an ellipsis when more exist.
fn format_dates(dates: &[String]) -> String {
    let mut shown = dates.iter().take(SHOWN_DATES).cloned().collect::<Vec<_>>().join(", ");
    if dates.len() > SHOWN_DATES {
        shown.push_str(&format!(" … (+{})", dates.len() - SHOWN_DATES));
    }
    shown
}

pub fn display_import_summary(summary: &ImportSummary) {
    println!("Import complete:");
    println!("  Rows read        : {}", summary.total_records);
    println!("  Inserted         : {}", summary.inserted);
    println!("  Updated          : {}", summary.updated);
    println!("  Unchanged        : {}", summary.unchanged);
    if summary.skipped > 0 {
        println!("  Malformed rows   : {}", summary.skipped);
    }
    if summary.raw_dates > 0 {
        println!("  Unparsed dates   : {}", summary.raw_dates);
    }
}

pub fn display_games(games: &[String]) {
    if games.is_empty() {
        println!("No games in the database.");
        return;
    }
    let mut table = new_table(vec!["Game", "Format"]);
    for game in games {
        let shape = GameFormat::from_game_name(game)
            .map(|f| format!("{}/{}", f.pick_size, f.pool_size))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![game.as_str(), shape.as_str()]);
    }
    println!("{table}");
}

pub fn display_frequency(freq: &FrequencyTable, format: GameFormat, game: &str, draws: usize) {
    println!("\n📊 Number frequency for {game} (1-{}) over {draws} draws\n", format.pool_size);

    let expected = if format.pool_size > 0 {
        freq.total() as f64 / format.pool_size as f64
    } else {
        0.0
    };

    let mut table = new_table(vec!["Number", "Frequency", "vs. uniform"]);
    for n in format.domain() {
        let count = freq.count(n);
        let deviation = count as f64 - expected;
        let color = if deviation > expected * 0.2 {
            Color::Green
        } else if deviation < -expected * 0.2 {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", n)),
            Cell::new(count.to_string()),
            Cell::new(format!("{:+.1}", deviation)).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_frequency_chart(freq: &FrequencyTable, format: GameFormat, game: &str) {
    println!("\n== Frequency chart for {game} ==\n");

    let points: Vec<(f32, f32)> = format
        .domain()
        .into_iter()
        .map(|n| (n as f32, freq.count(n) as f32))
        .collect();
    let y_max = points.iter().map(|&(_, y)| y).fold(1.0f32, f32::max);

    let shape = textplots::Shape::Bars(&points);
    let mut chart = textplots::Chart::new_with_y_range(
        160,
        50,
        0.5,
        format.pool_size as f32 + 0.5,
        0.0,
        y_max * 1.1,
    );
    println!("{}", chart.lineplot(&shape));
}

pub fn display_lines(lines: &[Pick], title: &str) {
    println!("\n🎲 {title}\n");
    let mut table = new_table(vec!["Line", "Numbers"]);
    for (i, line) in lines.iter().enumerate() {
        table.add_row(vec![format!("{:2}", i + 1), format_pick(line)]);
    }
    println!("{table}");
}

pub fn display_results(results: &[MatchResult], title: &str) {
    println!("\n🎯 {title}\n");

    let mut table = new_table(vec!["#", "Pick", "Best match", "Dates", "Exact match"]);
    for (i, res) in results.iter().enumerate() {
        let exact = if res.exact_match {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_pick(&res.pick)),
            Cell::new(res.best_match),
            Cell::new(format_dates(&res.match_dates)),
            exact,
        ]);
    }
    println!("{table}");
}

pub fn display_win_stats(stats: &WinStats, total_draws: Option<usize>) {
    let mut header = vec!["Matches", "Hits"];
    if total_draws.is_some() {
        header.push("Per draw");
    }
    let mut table = new_table(header);

    for tier in WinStats::TIERS {
        let mut row = vec![tier.to_string(), stats.get(tier).to_string()];
        if let Some(total) = total_draws {
            row.push(format!("{:.4}%", stats.per_draw_rate(tier, total) * 100.0));
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_simulation(stats: &WinStats, n_picks: usize, total_draws: usize) {
    println!("\n── Win rate simulation ──");
    println!("Simulated {n_picks} picks over {total_draws} draws:");
    display_win_stats(stats, Some(total_draws));
}

pub fn display_comparison(reports: &[(Strategy, Result<StrategyReport, AnalysisError>)]) {
    println!("\n=== STRATEGY COMPARISON ===");
    for (strategy, outcome) in reports {
        match outcome {
            Ok(report) => {
                display_results(&report.results, &format!("Strategy: {strategy}"));
                display_win_stats(&report.win_stats, None);
            }
            Err(e) => println!("\nStrategy: {strategy}: skipped ({e})"),
        }
    }

    let mut table = new_table(vec!["Strategy", "6", "5", "4", "3", "Score"]);
    for (strategy, outcome) in reports {
        if let Ok(report) = outcome {
            let stats = &report.win_stats;
            table.add_row(vec![
                Cell::new(strategy),
                Cell::new(stats.get(6)),
                Cell::new(stats.get(5)),
                Cell::new(stats.get(4)),
                Cell::new(stats.get(3)),
                Cell::new(stats.score()),
            ]);
        }
    }
    println!("\n── Summary ──");
    println!("{table}");
}

pub fn display_best(best: &BestStrategy) {
    println!("\n=== AUTO-BEST STRATEGY ===");
    println!("Best strategy : {}", best.strategy);
    match &best.pick {
        Some(pick) => println!("Best pick     : {}", format_pick(pick)),
        None => println!("Best pick     : -"),
    }
    println!("Score         : {}", best.score);
    display_win_stats(&best.win_stats, None);
}

pub fn display_pairs(pairs: &[(u8, u8, u32)], game: &str) {
    println!("\n🔥 Most frequent pairs for {game}\n");
    if pairs.is_empty() {
        println!("No pairs to show.");
        return;
    }

    let max = pairs[0].2.max(1);
    let mut table = new_table(vec!["Pair", "Together", ""]);
    for &(a, b, count) in pairs {
        let bar = "█".repeat(((count as f64 / max as f64) * 30.0).round() as usize);
        table.add_row(vec![format!("{:2} & {:2}", a, b), count.to_string(), bar]);
    }
    println!("{table}");
}

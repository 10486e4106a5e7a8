use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use lotto_analyzer::analysis::evaluate::{check_picks_against_history, win_statistics, WinStats};
use lotto_analyzer::analysis::play::{balanced_random_lines, PLAY_LINES};
use lotto_analyzer::analysis::sampler::{generate_picks, make_rng, Strategy};
use lotto_analyzer::analysis::simulate::{auto_best, compare_strategies};
use lotto_analyzer::analysis::{co_occurrence, count_number_frequency, ensure_history, top_pairs};
use lotto_analyzer::config::AnalyzerConfig;
use lotto_analyzer::display;
use lotto_analyzer::export::{export_results, write_games, ExportFormat};
use lotto_analyzer::import::import_csv;
use lotto_db::db::{count_draws, db_path, fetch_draws, list_games, migrate, open_db, recreate};
use lotto_db::models::{validate_pick, Draw};
use lotto_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "lotto", version, about = "Lotto history analyzer and pick generator")]
struct Cli {
    /// SQLite database (default: data/lotto.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone, Default)]
struct PickOptions {
    /// Game to analyze (e.g. GRAND_LOTTO_6-55)
    #[arg(short, long)]
    game: Option<String>,

    /// Number of picks to generate
    #[arg(short, long, alias = "n_picks")]
    n_picks: Option<usize>,

    /// How many ranked numbers the top/cold/hot strategies sample from
    #[arg(short, long, alias = "top_n")]
    top_n: Option<usize>,

    /// Number of recent draws for the hot strategy
    #[arg(long, alias = "hot_x")]
    hot_x: Option<usize>,

    /// Seed for reproducible picks
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Import draws from a CSV export (game, drawDate, combinations)
    Import {
        /// CSV file (default: data/lotto_history.csv)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Drop every stored draw before importing
        #[arg(long)]
        recreate: bool,
    },

    /// List the games present in the database
    Games {
        /// Also write the list as a JSON array
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the database path
    DbPath,

    /// Show how often each number was drawn
    Freq {
        #[arg(short, long)]
        game: Option<String>,

        /// Draw an ASCII bar chart
        #[arg(long)]
        plot: bool,
    },

    /// Generate picks with a strategy and replay them against history
    Pick {
        #[command(flatten)]
        opts: PickOptions,

        /// Number picking strategy
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Tally 3 to 6-number matches over the whole history
        #[arg(long)]
        simulate: bool,

        /// Export the results
        #[arg(long)]
        export: Option<ExportFormat>,

        /// Export file (default: picks_results.json / picks_results.csv)
        #[arg(short, long, requires = "export")]
        output: Option<PathBuf>,
    },

    /// Replay your own line against history
    Check {
        #[arg(short, long)]
        game: Option<String>,

        /// The numbers of the line
        #[arg(required = true)]
        numbers: Vec<u8>,
    },

    /// Compare every strategy side by side
    Compare {
        #[command(flatten)]
        opts: PickOptions,
    },

    /// Find the strategy whose picks score best over history
    AutoBest {
        #[command(flatten)]
        opts: PickOptions,
    },

    /// Generate 10 balanced lines covering the number pool evenly
    Play {
        #[arg(short, long)]
        game: Option<String>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the numbers most often drawn together
    Heatmap {
        #[arg(short, long)]
        game: Option<String>,

        /// Number of pairs to list
        #[arg(long, default_value = "20")]
        top: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = AnalyzerConfig::load_or_default(cli.config.as_deref())?;
    let path = cli.db.unwrap_or_else(db_path);
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file, recreate } => cmd_import(&conn, &config, file, recreate),
        Command::Games { output } => cmd_games(&conn, output),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Freq { game, plot } => cmd_freq(&conn, &with_game(&config, game), plot),
        Command::Pick {
            opts,
            strategy,
            simulate,
            export,
            output,
        } => {
            let mut config = resolve(&config, &opts)?;
            if let Some(s) = strategy {
                config.strategy = s;
            }
            let export = export.map(|format| {
                let path = output.unwrap_or_else(|| format.default_path());
                (format, path)
            });
            cmd_pick(&conn, &config, opts.seed, simulate, export)
        }
        Command::Check { game, numbers } => cmd_check(&conn, &with_game(&config, game), &numbers),
        Command::Compare { opts } => cmd_compare(&conn, &resolve(&config, &opts)?, opts.seed),
        Command::AutoBest { opts } => cmd_auto_best(&conn, &resolve(&config, &opts)?, opts.seed),
        Command::Play { game, seed } => cmd_play(&conn, &with_game(&config, game), seed),
        Command::Heatmap { game, top } => cmd_heatmap(&conn, &with_game(&config, game), top),
    }
}

fn with_game(config: &AnalyzerConfig, game: Option<String>) -> AnalyzerConfig {
    let mut config = config.clone();
    if let Some(g) = game {
        config.game = g;
    }
    config
}

/// Applies command-line overrides on top of the loaded configuration.
fn resolve(config: &AnalyzerConfig, opts: &PickOptions) -> Result<AnalyzerConfig> {
    let mut config = with_game(config, opts.game.clone());
    if let Some(n) = opts.n_picks {
        config.n_picks = n;
    }
    if let Some(n) = opts.top_n {
        config.top_n = n;
    }
    if let Some(x) = opts.hot_x {
        config.hot_x = x;
    }
    config.validate()?;
    Ok(config)
}

/// Draws of the configured game, or `None` after telling the user there are
/// none.
fn load_history(conn: &Connection, game: &str) -> Result<Option<Vec<Draw>>> {
    let draws = fetch_draws(conn, game)?;
    if let Err(e) = ensure_history(&draws, game) {
        println!("{e}");
        if count_draws(conn)? == 0 {
            println!("Database is empty. Run first: lotto import");
        }
        return Ok(None);
    }
    log::info!("{} draws loaded for {}", draws.len(), game);
    Ok(Some(draws))
}

fn cmd_import(conn: &Connection, config: &AnalyzerConfig, file: Option<PathBuf>, recreate_db: bool) -> Result<()> {
    if recreate_db {
        println!("Recreating database...");
        recreate(conn)?;
    }
    let file = file.unwrap_or_else(|| config.csv_path.clone());
    let summary = import_csv(conn, &file)?;
    display::display_import_summary(&summary);
    Ok(())
}

fn cmd_games(conn: &Connection, output: Option<PathBuf>) -> Result<()> {
    let games = list_games(conn)?;
    display::display_games(&games);
    if let Some(path) = output {
        write_games(&games, &path)?;
        println!("Extracted {} games to {}", games.len(), path.display());
    }
    Ok(())
}

fn cmd_freq(conn: &Connection, config: &AnalyzerConfig, plot: bool) -> Result<()> {
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };
    let freq = count_number_frequency(&draws);
    let format = config.game_format();
    display::display_frequency(&freq, format, &config.game, draws.len());
    if plot {
        display::display_frequency_chart(&freq, format, &config.game);
    }
    Ok(())
}

fn cmd_pick(
    conn: &Connection,
    config: &AnalyzerConfig,
    seed: Option<u64>,
    simulate: bool,
    export: Option<(ExportFormat, PathBuf)>,
) -> Result<()> {
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };

    let mut rng = make_rng(seed);
    let picks = generate_picks(config.strategy, &draws, &config.pick_params(), &mut rng)?;
    let results = check_picks_against_history(&picks, &draws);
    display::display_results(&results, &format!("Strategy: {}", config.strategy));

    if simulate {
        let stats = win_statistics(&picks, &draws);
        display::display_simulation(&stats, picks.len(), draws.len());
    }

    if let Some((format, path)) = export {
        export_results(&results, format, &path)?;
        println!("Results exported to {}", path.display());
    }
    Ok(())
}

fn cmd_check(conn: &Connection, config: &AnalyzerConfig, numbers: &[u8]) -> Result<()> {
    validate_pick(numbers, config.game_format()).context("Invalid line")?;
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };

    let mut pick = numbers.to_vec();
    pick.sort();
    let results = check_picks_against_history(&[pick.clone()], &draws);
    display::display_results(&results, "Your line");
    display::display_simulation(&win_statistics(&[pick], &draws), 1, draws.len());
    Ok(())
}

fn cmd_compare(conn: &Connection, config: &AnalyzerConfig, seed: Option<u64>) -> Result<()> {
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };
    let reports = compare_strategies(&draws, &config.pick_params(), &mut make_rng(seed));
    display::display_comparison(&reports);
    Ok(())
}

fn cmd_auto_best(conn: &Connection, config: &AnalyzerConfig, seed: Option<u64>) -> Result<()> {
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };
    match auto_best(&draws, &config.pick_params(), &mut make_rng(seed)) {
        Some(best) => display::display_best(&best),
        None => println!("No strategy could generate picks for {}", config.game),
    }
    Ok(())
}

fn cmd_play(conn: &Connection, config: &AnalyzerConfig, seed: Option<u64>) -> Result<()> {
    let format = config.game_format();
    let lines = balanced_random_lines(PLAY_LINES, format, &mut make_rng(seed));
    display::display_lines(&lines, &format!("PLAY MODE: {PLAY_LINES} balanced random lines"));

    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };
    let results = check_picks_against_history(&lines, &draws);
    display::display_results(&results, "Play mode analysis");
    println!("Win stats (best match per line):");
    display::display_win_stats(&WinStats::from_best_matches(&results), None);
    Ok(())
}

fn cmd_heatmap(conn: &Connection, config: &AnalyzerConfig, top: usize) -> Result<()> {
    let Some(draws) = load_history(conn, &config.game)? else {
        return Ok(());
    };
    let matrix = co_occurrence(&draws, config.game_format().pool_size);
    display::display_pairs(&top_pairs(&matrix, top), &config.game);
    Ok(())
}

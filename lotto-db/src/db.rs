use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::models::{Draw, DrawDate};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    game       TEXT NOT NULL,
    draw_date  TEXT NOT NULL,
    numbers    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_draws_game_date ON draws(game, draw_date);
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

pub fn db_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotto.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create directory {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Cannot open database {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("Migration failed")?;
    Ok(())
}

/// Drops every stored draw and recreates the schema.
pub fn recreate(conn: &Connection) -> Result<()> {
    conn.execute_batch("DROP TABLE IF EXISTS draws;")
        .context("Cannot drop draws table")?;
    migrate(conn)
}

fn encode_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_numbers(raw: &str) -> Vec<u8> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Inserts the draw, or rewrites the numbers of the stored row it stands for.
///
/// `occurrence` is the draw's index among the imported rows sharing its game
/// and date. The n-th such row maps to the n-th stored one, so draws with the
/// same date (or the same unparsed date text) each keep their own row.
pub fn upsert_draw(conn: &Connection, draw: &Draw, occurrence: usize) -> Result<UpsertOutcome> {
    let date = draw.date.to_string();
    let numbers = encode_numbers(&draw.numbers);

    let existing: Option<(i64, String)> = {
        let mut stmt = conn.prepare_cached(
            "SELECT id, numbers FROM draws WHERE game = ?1 AND draw_date = ?2
             ORDER BY id LIMIT 1 OFFSET ?3",
        )?;
        let mut rows = stmt.query(params![draw.game, date, occurrence as i64])?;
        let found = match rows.next()? {
            Some(row) => Some((row.get(0)?, row.get(1)?)),
            None => None,
        };
        found
    };

    match existing {
        Some((_, existing_numbers)) if existing_numbers == numbers => Ok(UpsertOutcome::Unchanged),
        Some((id, _)) => {
            conn.execute(
                "UPDATE draws SET numbers = ?1 WHERE id = ?2",
                params![numbers, id],
            )
            .context("Update failed")?;
            Ok(UpsertOutcome::Updated)
        }
        None => {
            conn.execute(
                "INSERT INTO draws (game, draw_date, numbers) VALUES (?1, ?2, ?3)",
                params![draw.game, date, numbers],
            )
            .context("Insert failed")?;
            Ok(UpsertOutcome::Inserted)
        }
    }
}

/// All draws of a game, in import order.
pub fn fetch_draws(conn: &Connection, game: &str) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT id, game, draw_date, numbers FROM draws WHERE game = ?1 ORDER BY id",
    )?;
    let draws = stmt
        .query_map([game], |row| {
            let date: String = row.get(2)?;
            let numbers: String = row.get(3)?;
            Ok(Draw {
                id: row.get(0)?,
                game: row.get(1)?,
                date: DrawDate::parse(&date),
                numbers: decode_numbers(&numbers),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

/// Distinct game names, sorted.
pub fn list_games(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT DISTINCT game FROM draws ORDER BY game")?;
    let games = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_draw(game: &str, date: &str, numbers: &[u8]) -> Draw {
        Draw {
            id: 0,
            game: game.to_string(),
            date: DrawDate::parse(date),
            numbers: numbers.to_vec(),
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        let outcome = upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_upsert_same_numbers_unchanged() {
        let conn = memory_db();
        let draw = test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1, 2, 3, 4, 5, 6]);

        assert_eq!(upsert_draw(&conn, &draw, 0).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(upsert_draw(&conn, &draw, 0).unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_upsert_rewrites_numbers() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        let outcome = upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "01/01/2024", &[1, 2, 3, 4, 5, 7]), 0).unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let draws = fetch_draws(&conn, "GRAND_LOTTO_6-55").unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].numbers, vec![1, 2, 3, 4, 5, 7]);
    }

    #[test]
    fn test_fetch_filters_game_and_keeps_import_order() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-05", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        upsert_draw(&conn, &test_draw("MEGA_LOTTO_6-45", "2024-01-02", &[7, 8, 9, 10, 11, 12]), 0).unwrap();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[13, 14, 15, 16, 17, 18]), 0).unwrap();

        let draws = fetch_draws(&conn, "GRAND_LOTTO_6-55").unwrap();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].date.to_string(), "2024-01-05");
        assert_eq!(draws[1].date.to_string(), "2024-01-01");
        assert_eq!(draws[1].numbers, vec![13, 14, 15, 16, 17, 18]);

        assert!(fetch_draws(&conn, "SWERTRES").unwrap().is_empty());
    }

    #[test]
    fn test_raw_dates_survive_storage() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "not a date", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        let draws = fetch_draws(&conn, "GRAND_LOTTO_6-55").unwrap();
        assert_eq!(draws[0].date, DrawDate::Raw("not a date".to_string()));
    }

    #[test]
    fn test_list_games_sorted_distinct() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("MEGA_LOTTO_6-45", "2024-01-01", &[1]), 0).unwrap();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1]), 0).unwrap();
        upsert_draw(&conn, &test_draw("MEGA_LOTTO_6-45", "2024-01-02", &[2]), 0).unwrap();

        assert_eq!(list_games(&conn).unwrap(), vec!["GRAND_LOTTO_6-55", "MEGA_LOTTO_6-45"]);
    }

    #[test]
    fn test_recreate_empties_table() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        recreate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }

    #[test]
    fn test_same_date_draws_keep_their_own_rows() {
        let conn = memory_db();
        let rows: [[u8; 6]; 3] = [[1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12], [13, 14, 15, 16, 17, 18]];
        for (i, numbers) in rows.iter().enumerate() {
            let outcome = upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "TBD", numbers), i).unwrap();
            assert_eq!(outcome, UpsertOutcome::Inserted);
        }

        let draws = fetch_draws(&conn, "GRAND_LOTTO_6-55").unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(draws[2].numbers, vec![13, 14, 15, 16, 17, 18]);

        // Same rows again: matched by position, nothing changes
        for (i, numbers) in rows.iter().enumerate() {
            let outcome = upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "TBD", numbers), i).unwrap();
            assert_eq!(outcome, UpsertOutcome::Unchanged);
        }
        assert_eq!(count_draws(&conn).unwrap(), 3);
    }

    #[test]
    fn test_second_draw_on_parsed_date_is_inserted() {
        let conn = memory_db();
        upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[1, 2, 3, 4, 5, 6]), 0).unwrap();
        let outcome = upsert_draw(&conn, &test_draw("GRAND_LOTTO_6-55", "2024-01-01", &[7, 8, 9, 10, 11, 12]), 1).unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(fetch_draws(&conn, "GRAND_LOTTO_6-55").unwrap().len(), 2);
    }
}

//! Heatmap command: yearly contribution grid.

use std::io::Write;

use anyhow::Result;

use st_core::{HeatTier, Heatmap};
use st_db::Database;

/// Glyph per color tier, dimmest to brightest.
const TIER_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

pub fn run<W: Write>(writer: &mut W, db: &Database, year: i32, json: bool) -> Result<()> {
    let heatmap = Heatmap::from_summary(year, db.daily_summary(year)?);
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&heatmap)?)?;
    } else {
        render(writer, &heatmap)?;
    }
    Ok(())
}

const fn glyph(tier: HeatTier) -> char {
    TIER_GLYPHS[tier as usize]
}

fn render<W: Write>(writer: &mut W, heatmap: &Heatmap) -> Result<()> {
    let cells: Vec<_> = heatmap.cells().collect();
    let columns = cells.last().map_or(0, |cell| cell.col + 1);

    let mut grid = vec![[' '; st_core::heatmap::GRID_ROWS]; columns];
    for cell in &cells {
        grid[cell.col][cell.row] = glyph(cell.tier);
    }

    writeln!(writer, "{}", heatmap.year)?;
    for row in 0..st_core::heatmap::GRID_ROWS {
        let line: String = grid.iter().map(|col| col[row]).collect();
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    #[test]
    fn render_marks_studied_days() {
        let mut summary = BTreeMap::new();
        // 2024-01-01 is a Monday: row 0, col 0. 2024-01-09 (Tuesday): row 1, col 1.
        summary.insert(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3600);
        summary.insert(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(), 900);
        let heatmap = Heatmap::from_summary(2024, summary);

        let mut output = Vec::new();
        render(&mut output, &heatmap).unwrap();
        let output = String::from_utf8(output).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "2024");
        // Max day renders the top tier, the 25% day the mid tier.
        assert_eq!(lines[1].chars().next().unwrap(), '█');
        assert_eq!(lines[2].chars().nth(1).unwrap(), '▒');
        // Seven weekday rows, 53 week columns in 2024.
        assert_eq!(lines.len(), 8);
        assert!(lines[1..].iter().all(|line| line.chars().count() == 53));
    }

    #[test]
    fn render_empty_year_is_all_zero_tier() {
        let heatmap = Heatmap::from_summary(2023, BTreeMap::new());
        let mut output = Vec::new();
        render(&mut output, &heatmap).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(
            output
                .lines()
                .skip(1)
                .all(|line| line.chars().all(|c| c == '·' || c == ' '))
        );
    }
}

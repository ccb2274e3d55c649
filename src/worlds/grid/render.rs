//! Text rendering of planning results on a grid.

use crate::planner::{PolicyTable, ValueTable};

use super::world::{GridAction, GridWorld, Position};

impl GridWorld {
    /// One line per row, one action label per cell.
    ///
    /// Obstacles render as `##`, the goal as `G`, cells without an entry
    /// as `..`.
    #[must_use]
    pub fn render_policy(&self, policy: &PolicyTable<Position, GridAction>) -> String {
        self.render_cells(2, |cell| policy.get(cell).map(|a| a.label().to_string()))
    }

    /// One line per row, the best root value per cell.
    #[must_use]
    pub fn render_values(&self, table: &ValueTable<Position, GridAction>) -> String {
        self.render_cells(7, |cell| {
            table
                .get(cell)
                .and_then(|row| row.max_value())
                .map(|v| format!("{:.2}", v))
        })
    }

    fn render_cells(&self, width: usize, entry: impl Fn(&Position) -> Option<String>) -> String {
        let (rows, cols) = self.dimensions();
        let mut out = String::new();

        for row in 0..rows {
            let line: Vec<String> = (0..cols)
                .map(|col| {
                    let cell = Position::new(row, col);
                    let text = if self.is_obstacle(&cell) {
                        "#".repeat(width.min(2))
                    } else if cell == self.goal() {
                        "G".to_string()
                    } else {
                        entry(&cell).unwrap_or_else(|| ".".repeat(width.min(2)))
                    };
                    format!("{:>width$}", text, width = width)
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }

        out
    }
}

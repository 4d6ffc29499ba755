//! 胜利条件生成：枚举棋盘内所有连续 3 格的横、竖、斜线。

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::state::{Board, Cell, GridSize, Player, WIN_LENGTH};

/// 一组构成胜利的棋盘下标，按生成顺序排列。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct WinCondition([usize; WIN_LENGTH]);

impl WinCondition {
    pub const fn new(indices: [usize; WIN_LENGTH]) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> [usize; WIN_LENGTH] {
        self.0
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    /// 三格均被同一玩家占据时返回该玩家。
    pub fn owner(&self, board: &Board) -> Option<Player> {
        let first = board.get(self.0[0]).and_then(Cell::player)?;
        self.0[1..]
            .iter()
            .all(|&index| board.get(index).and_then(Cell::player) == Some(first))
            .then_some(first)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineDirection {
    Horizontal,
    Vertical,
    Diagonal,
    AntiDiagonal,
}

impl LineDirection {
    fn cell(self, row: usize, col: usize, step: usize) -> (usize, usize) {
        match self {
            LineDirection::Horizontal => (row, col + step),
            LineDirection::Vertical => (row + step, col),
            LineDirection::Diagonal => (row + step, col + step),
            LineDirection::AntiDiagonal => (row + step, col - step),
        }
    }
}

fn line(side: usize, row: usize, col: usize, direction: LineDirection) -> WinCondition {
    let mut indices = [0; WIN_LENGTH];
    for (step, slot) in indices.iter_mut().enumerate() {
        let (r, c) = direction.cell(row, col, step);
        *slot = r * side + c;
    }
    WinCondition(indices)
}

/// 给定边长下胜利条件的数量。
pub fn condition_count(grid_size: GridSize) -> usize {
    let side = grid_size.side();
    let starts = side + 1 - WIN_LENGTH;
    2 * side * starts + 2 * starts * starts
}

/// 依次生成横、竖、主对角线、副对角线上的全部条件。
///
/// 顺序决定同一步同时连成多条线时取哪一条，调用方依赖这一顺序。
pub fn generate(grid_size: GridSize) -> Vec<WinCondition> {
    let side = grid_size.side();
    let last_start = side - WIN_LENGTH;
    let mut conditions = Vec::with_capacity(condition_count(grid_size));

    for row in 0..side {
        for col in 0..=last_start {
            conditions.push(line(side, row, col, LineDirection::Horizontal));
        }
    }

    for col in 0..side {
        for row in 0..=last_start {
            conditions.push(line(side, row, col, LineDirection::Vertical));
        }
    }

    for row in 0..=last_start {
        for col in 0..=last_start {
            conditions.push(line(side, row, col, LineDirection::Diagonal));
        }
    }

    for row in 0..=last_start {
        for col in (WIN_LENGTH - 1)..side {
            conditions.push(line(side, row, col, LineDirection::AntiDiagonal));
        }
    }

    conditions
}

static CONDITION_TABLE: Lazy<Vec<Vec<WinCondition>>> =
    Lazy::new(|| GridSize::all().map(generate).collect());

/// 缓存版本，每种边长只生成一次。
pub fn win_conditions(grid_size: GridSize) -> &'static [WinCondition] {
    CONDITION_TABLE
        .get(grid_size.table_index())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn size(n: u8) -> GridSize {
        GridSize::new(n).expect("valid grid size")
    }

    #[test]
    fn classic_board_has_eight_lines() {
        let expected = vec![
            WinCondition::new([0, 1, 2]),
            WinCondition::new([3, 4, 5]),
            WinCondition::new([6, 7, 8]),
            WinCondition::new([0, 3, 6]),
            WinCondition::new([1, 4, 7]),
            WinCondition::new([2, 5, 8]),
            WinCondition::new([0, 4, 8]),
            WinCondition::new([2, 4, 6]),
        ];
        assert_eq!(generate(size(3)), expected);
    }

    #[test]
    fn counts_grow_with_grid_size() {
        let counts: Vec<usize> = GridSize::all().map(|n| generate(n).len()).collect();
        assert_eq!(counts, vec![8, 24, 48, 80]);
        for n in GridSize::all() {
            assert_eq!(condition_count(n), generate(n).len());
        }
    }

    #[test]
    fn indices_are_distinct_and_on_board() {
        for n in GridSize::all() {
            let cells = n.cell_count();
            let conditions = generate(n);
            for condition in &conditions {
                let [a, b, c] = condition.indices();
                assert!(a != b && b != c && a != c, "{condition:?} repeats a cell");
                assert!(a < cells && b < cells && c < cells, "{condition:?} leaves the board");
            }
            let unique: HashSet<_> = conditions.iter().collect();
            assert_eq!(unique.len(), conditions.len(), "duplicate line on {n}");
        }
    }

    #[test]
    fn lines_never_wrap_across_rows() {
        for n in GridSize::all() {
            let side = n.side();
            for condition in generate(n) {
                let rows: Vec<usize> = condition.indices().iter().map(|i| i / side).collect();
                let cols: Vec<isize> = condition
                    .indices()
                    .iter()
                    .map(|i| (i % side) as isize)
                    .collect();
                let dr = rows[1] as isize - rows[0] as isize;
                let dc = cols[1] - cols[0];
                assert_eq!(rows[2] as isize - rows[1] as isize, dr);
                assert_eq!(cols[2] - cols[1], dc);
                assert!(dr.abs() <= 1 && dc.abs() <= 1);
            }
        }
    }

    #[test]
    fn four_by_four_order_starts_with_rows_then_columns() {
        let conditions = generate(size(4));
        assert_eq!(conditions[0], WinCondition::new([0, 1, 2]));
        assert_eq!(conditions[1], WinCondition::new([1, 2, 3]));
        assert_eq!(conditions[8], WinCondition::new([0, 4, 8]));
        assert_eq!(conditions[9], WinCondition::new([4, 8, 12]));
        assert_eq!(conditions[16], WinCondition::new([0, 5, 10]));
        assert_eq!(conditions[20], WinCondition::new([2, 5, 8]));
        assert_eq!(conditions[23], WinCondition::new([7, 10, 13]));
    }

    #[test]
    fn cached_table_matches_fresh_generation() {
        for n in GridSize::all() {
            assert_eq!(win_conditions(n), generate(n).as_slice());
            assert!(std::ptr::eq(win_conditions(n), win_conditions(n)));
        }
    }

    #[test]
    fn owner_requires_three_identical_marks() {
        let mut board = Board::new(size(3));
        let top_row = WinCondition::new([0, 1, 2]);
        board.place(0, Player::O);
        board.place(1, Player::O);
        assert_eq!(top_row.owner(&board), None);
        board.place(2, Player::X);
        assert_eq!(top_row.owner(&board), None);
        board.place(2, Player::O);
        assert_eq!(top_row.owner(&board), Some(Player::O));
    }
}

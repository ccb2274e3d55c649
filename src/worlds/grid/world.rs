//! Stochastic grid world implementation.

use serde::{Deserialize, Serialize};

use crate::core::{MctsError, Result, SearchRng};
use crate::env::{Environment, Step};

/// Grid cell coordinate, row 0 at the top.
///
/// Signed so that out-of-grid positions can be represented and rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    fn offset(self, dr: i32, dc: i32) -> Self {
        Self::new(self.row + dr, self.col + dc)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four grid moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GridAction {
    Up,
    Down,
    Left,
    Right,
}

impl GridAction {
    /// All actions in their fixed order.
    pub const ALL: [GridAction; 4] = [GridAction::Up, GridAction::Down, GridAction::Left, GridAction::Right];

    /// Short label (`AU`, `AD`, `AL`, `AR`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            GridAction::Up => "AU",
            GridAction::Down => "AD",
            GridAction::Left => "AL",
            GridAction::Right => "AR",
        }
    }

    /// Arrow glyph used when rendering policies.
    #[must_use]
    pub const fn arrow(self) -> char {
        match self {
            GridAction::Up => '↑',
            GridAction::Down => '↓',
            GridAction::Left => '←',
            GridAction::Right => '→',
        }
    }

    /// Row/column deltas for `[intended, veer right, veer left]`.
    const fn outcome_deltas(self) -> [(i32, i32); 3] {
        match self {
            GridAction::Up => [(-1, 0), (0, 1), (0, -1)],
            GridAction::Down => [(1, 0), (0, -1), (0, 1)],
            GridAction::Left => [(0, -1), (-1, 0), (1, 0)],
            GridAction::Right => [(0, 1), (1, 0), (-1, 0)],
        }
    }
}

impl std::fmt::Display for GridAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome probabilities of a move.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionModel {
    /// Move in the intended direction.
    pub success: f64,
    /// Veer 90 degrees to the right of the intended direction.
    pub veer_right: f64,
    /// Veer 90 degrees to the left of the intended direction.
    pub veer_left: f64,
    /// Stay in place.
    pub stay: f64,
}

impl TransitionModel {
    #[must_use]
    pub const fn new(success: f64, veer_right: f64, veer_left: f64, stay: f64) -> Self {
        Self { success, veer_right, veer_left, stay }
    }

    /// Moves always succeed.
    #[must_use]
    pub const fn deterministic() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// `[success, veer_right, veer_left, stay]`.
    #[must_use]
    pub fn probabilities(&self) -> [f64; 4] {
        [self.success, self.veer_right, self.veer_left, self.stay]
    }

    fn validate(&self) -> Result<()> {
        let probs = self.probabilities();
        if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(MctsError::InvalidEnvironment(format!(
                "transition probabilities must be non-negative, got {:?}",
                probs
            )));
        }
        let total: f64 = probs.iter().sum();
        if (total - 1.0).abs() > 1e-9 {
            return Err(MctsError::InvalidEnvironment(format!(
                "transition probabilities must sum to 1, got {}",
                total
            )));
        }
        Ok(())
    }
}

/// Rectangular grid world with obstacles, reward cells and one terminal goal.
///
/// Reward depends only on the cell entered: the goal reward, a hazard's
/// reward, or the per-step reward. Moves off the grid are clamped to the
/// border; moves into an obstacle leave the agent in place.
#[derive(Clone, Debug)]
pub struct GridWorld {
    rows: i32,
    cols: i32,
    start: Position,
    goal: Position,
    goal_reward: f64,
    step_reward: f64,
    obstacles: Vec<Position>,
    hazards: Vec<(Position, f64)>,
    discount: f64,
    transitions: TransitionModel,
    state: Position,
}

impl GridWorld {
    /// 2x2 test world: start (0,0), hazard (0,1) at -10, goal (1,1) at +10,
    /// discount 0.9.
    #[must_use]
    pub fn toy() -> Self {
        GridWorldBuilder::toy().assemble()
    }

    /// 5x5 world: obstacles (2,2) and (3,2), water (4,2) at -10, goal (4,4)
    /// at +10, discount 0.9.
    #[must_use]
    pub fn classic() -> Self {
        GridWorldBuilder::classic().assemble()
    }

    /// 5x5 world: furniture (2,1) (2,2) (2,3) (3,2), monsters (0,3) and
    /// (4,1) at -8, food (4,4) at +10, -0.05 per step, discount 0.925.
    #[must_use]
    pub fn cats_vs_monsters() -> Self {
        GridWorldBuilder::cats_vs_monsters().assemble()
    }

    /// `(rows, cols)`.
    #[must_use]
    pub fn dimensions(&self) -> (i32, i32) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn goal(&self) -> Position {
        self.goal
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Position] {
        &self.obstacles
    }

    #[must_use]
    pub fn hazards(&self) -> &[(Position, f64)] {
        &self.hazards
    }

    #[must_use]
    pub fn transitions(&self) -> TransitionModel {
        self.transitions
    }

    #[must_use]
    pub fn is_obstacle(&self, position: &Position) -> bool {
        self.obstacles.contains(position)
    }

    /// Reward for entering `next`.
    #[must_use]
    pub fn reward(&self, next: &Position) -> f64 {
        if *next == self.goal {
            return self.goal_reward;
        }
        self.hazards
            .iter()
            .find(|(cell, _)| cell == next)
            .map_or(self.step_reward, |&(_, reward)| reward)
    }

    /// Cell reached from `from` by `action` under outcome index
    /// `0..4` = `[success, veer right, veer left, stay]`.
    #[must_use]
    pub fn next_position(&self, from: Position, action: GridAction, outcome: usize) -> Position {
        let deltas = action.outcome_deltas();
        let Some(&(dr, dc)) = deltas.get(outcome) else {
            return from;
        };

        let moved = from.offset(dr, dc);
        let clamped = Position::new(moved.row.clamp(0, self.rows - 1), moved.col.clamp(0, self.cols - 1));

        if self.is_obstacle(&clamped) {
            from
        } else {
            clamped
        }
    }
}

impl Environment for GridWorld {
    type State = Position;
    type Action = GridAction;

    fn reset(&mut self) {
        self.state = self.start;
    }

    fn step(&mut self, action: GridAction, rng: &mut SearchRng) -> Step<Position> {
        if self.state == self.goal {
            return Step::new(self.state, 0.0, true);
        }

        let outcome = rng
            .choose_weighted(&self.transitions.probabilities())
            .unwrap_or(0);
        let next = self.next_position(self.state, action, outcome);
        self.state = next;

        Step::new(next, self.reward(&next), next == self.goal)
    }

    fn set_state(&mut self, state: Position) {
        self.state = state;
    }

    fn current_state(&self) -> Position {
        self.state
    }

    fn initial_state(&self) -> Position {
        self.start
    }

    fn discount(&self) -> f64 {
        self.discount
    }

    fn actions(&self) -> &[GridAction] {
        &GridAction::ALL
    }

    fn states(&self) -> Vec<Position> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Position::new(row, col)))
            .filter(|p| !self.is_obstacle(p))
            .collect()
    }

    fn is_terminal(&self, state: &Position) -> bool {
        *state == self.goal
    }

    /// Inside the grid and not an obstacle.
    fn in_bounds(&self, state: &Position) -> bool {
        (0..self.rows).contains(&state.row)
            && (0..self.cols).contains(&state.col)
            && !self.is_obstacle(state)
    }
}

/// Builder for creating a GridWorld.
#[derive(Clone, Debug)]
pub struct GridWorldBuilder {
    rows: i32,
    cols: i32,
    start: Position,
    goal: Position,
    goal_reward: f64,
    step_reward: f64,
    obstacles: Vec<Position>,
    hazards: Vec<(Position, f64)>,
    discount: f64,
    transitions: TransitionModel,
}

impl Default for GridWorldBuilder {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            start: Position::new(0, 0),
            goal: Position::new(4, 4),
            goal_reward: 10.0,
            step_reward: 0.0,
            obstacles: Vec::new(),
            hazards: Vec::new(),
            discount: 0.9,
            transitions: TransitionModel::new(0.8, 0.05, 0.05, 0.1),
        }
    }
}

impl GridWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset behind [`GridWorld::toy`].
    pub fn toy() -> Self {
        Self::new()
            .size(2, 2)
            .goal(Position::new(1, 1), 10.0)
            .hazard(Position::new(0, 1), -10.0)
            .transitions(TransitionModel::new(0.6, 0.15, 0.15, 0.1))
    }

    /// Preset behind [`GridWorld::classic`].
    pub fn classic() -> Self {
        Self::new()
            .obstacle(Position::new(2, 2))
            .obstacle(Position::new(3, 2))
            .hazard(Position::new(4, 2), -10.0)
    }

    /// Preset behind [`GridWorld::cats_vs_monsters`].
    pub fn cats_vs_monsters() -> Self {
        Self::new()
            .obstacle(Position::new(2, 1))
            .obstacle(Position::new(2, 2))
            .obstacle(Position::new(2, 3))
            .obstacle(Position::new(3, 2))
            .hazard(Position::new(0, 3), -8.0)
            .hazard(Position::new(4, 1), -8.0)
            .step_reward(-0.05)
            .discount(0.925)
            .transitions(TransitionModel::new(0.7, 0.12, 0.12, 0.06))
    }

    pub fn size(mut self, rows: i32, cols: i32) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn start(mut self, start: Position) -> Self {
        self.start = start;
        self
    }

    pub fn goal(mut self, goal: Position, reward: f64) -> Self {
        self.goal = goal;
        self.goal_reward = reward;
        self
    }

    pub fn step_reward(mut self, reward: f64) -> Self {
        self.step_reward = reward;
        self
    }

    pub fn obstacle(mut self, position: Position) -> Self {
        self.obstacles.push(position);
        self
    }

    /// Non-terminal cell with its own entry reward (water, monsters).
    pub fn hazard(mut self, position: Position, reward: f64) -> Self {
        self.hazards.push((position, reward));
        self
    }

    pub fn discount(mut self, discount: f64) -> Self {
        self.discount = discount;
        self
    }

    pub fn transitions(mut self, transitions: TransitionModel) -> Self {
        self.transitions = transitions;
        self
    }

    /// Make every move succeed.
    pub fn deterministic(self) -> Self {
        self.transitions(TransitionModel::deterministic())
    }

    /// Validate and build the world, positioned at its start cell.
    pub fn build(self) -> Result<GridWorld> {
        if self.rows <= 0 || self.cols <= 0 {
            return Err(MctsError::InvalidEnvironment(format!(
                "grid must be non-empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(MctsError::InvalidEnvironment(format!(
                "discount must be in (0, 1], got {}",
                self.discount
            )));
        }
        self.transitions.validate()?;

        let inside = |p: &Position| (0..self.rows).contains(&p.row) && (0..self.cols).contains(&p.col);
        let cells = [("start", self.start), ("goal", self.goal)];
        for (name, cell) in cells {
            if !inside(&cell) {
                return Err(MctsError::InvalidEnvironment(format!("{} {} is outside the grid", name, cell)));
            }
            if self.obstacles.contains(&cell) {
                return Err(MctsError::InvalidEnvironment(format!("{} {} is an obstacle", name, cell)));
            }
        }
        let placed = self.obstacles.iter().chain(self.hazards.iter().map(|(p, _)| p));
        if let Some(outside) = placed.into_iter().find(|&p| !inside(p)) {
            return Err(MctsError::InvalidEnvironment(format!("cell {} is outside the grid", outside)));
        }

        Ok(self.assemble())
    }

    fn assemble(self) -> GridWorld {
        GridWorld {
            rows: self.rows,
            cols: self.cols,
            start: self.start,
            goal: self.goal,
            goal_reward: self.goal_reward,
            step_reward: self.step_reward,
            obstacles: self.obstacles,
            hazards: self.hazards,
            discount: self.discount,
            transitions: self.transitions,
            state: self.start,
        }
    }
}

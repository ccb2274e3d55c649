//! Planner, policy extraction and evaluation tests.

use mdp_mcts::core::{MctsError, SearchRng};
use mdp_mcts::env::Environment;
use mdp_mcts::mcts::SearchConfig;
use mdp_mcts::planner::{
    evaluate_epsilon_soft_policy, evaluate_policy, greedy_policy, ActionValues, EvaluationConfig,
    Planner, PlannerConfig, ValueTable,
};
use mdp_mcts::worlds::{GridAction, GridWorld, GridWorldBuilder, Position};

fn classic_planner(parallel: bool) -> Planner<GridWorld> {
    let config = PlannerConfig::default()
        .with_search(SearchConfig::default().with_rollouts(60).with_seed(2024))
        .with_iterations(2)
        .with_parallel(parallel);
    Planner::new(GridWorld::classic(), config).unwrap()
}

// =============================================================================
// Planning Tests
// =============================================================================

#[test]
fn test_plan_covers_non_terminal_states() {
    let planner = classic_planner(false);
    let table = planner.plan().unwrap();
    let env = planner.env();

    // 25 cells, two obstacles, one goal
    assert_eq!(table.len(), 22);
    for state in env.states() {
        assert_eq!(table.contains(&state), !env.is_terminal(&state));
    }
    for (_, row) in table.iter() {
        assert!(!row.is_empty());
        assert_eq!(row.visits.iter().sum::<u32>(), 120);
    }
}

#[test]
fn test_parallel_and_sequential_tables_match() {
    let sequential = classic_planner(false).plan().unwrap();
    let parallel = classic_planner(true).plan().unwrap();

    assert_eq!(sequential.len(), parallel.len());
    for ((s1, r1), (s2, r2)) in sequential.iter().zip(parallel.iter()) {
        assert_eq!(s1, s2);
        assert_eq!(r1, r2);
    }
}

// =============================================================================
// Policy Extraction Tests
// =============================================================================

#[test]
fn test_greedy_policy_same_seed_same_table() {
    let table = classic_planner(false).plan().unwrap();

    let a = greedy_policy(&table, &mut SearchRng::new(8));
    let b = greedy_policy(&table, &mut SearchRng::new(8));

    let a: Vec<_> = a.iter().collect();
    let b: Vec<_> = b.iter().collect();
    assert_eq!(a, b);
}

#[test]
fn test_greedy_policy_tie_break_is_uniform() {
    let mut table = ValueTable::new();
    table.insert(
        Position::new(0, 0),
        ActionValues::from_pairs(GridAction::ALL.iter().map(|&a| (a, 1.0))),
    );

    let mut rng = SearchRng::new(77);
    let mut counts = [0u32; 4];
    let trials = 20_000u32;
    for _ in 0..trials {
        let policy = greedy_policy(&table, &mut rng);
        let action = *policy.get(&Position::new(0, 0)).unwrap();
        let idx = GridAction::ALL.iter().position(|&a| a == action).unwrap();
        counts[idx] += 1;
    }

    for count in counts {
        let freq = f64::from(count) / f64::from(trials);
        assert!((freq - 0.25).abs() < 0.02, "frequency {}", freq);
    }
}

// =============================================================================
// Evaluation Tests
// =============================================================================

fn goal_in_two_steps() -> ValueTable<Position, GridAction> {
    let mut table = ValueTable::new();
    table.insert(
        Position::new(0, 0),
        ActionValues::from_pairs([
            (GridAction::Up, 0.0),
            (GridAction::Down, 8.0),
            (GridAction::Left, 0.0),
            (GridAction::Right, -9.0),
        ]),
    );
    table.insert(
        Position::new(1, 0),
        ActionValues::from_pairs([
            (GridAction::Up, 1.0),
            (GridAction::Down, 2.0),
            (GridAction::Left, 2.0),
            (GridAction::Right, 9.5),
        ]),
    );
    table
}

#[test]
fn test_greedy_evaluation_returns_exact_value() {
    let mut env = GridWorldBuilder::toy().deterministic().build().unwrap();

    for seed in 0..10 {
        let mut rng = SearchRng::new(seed);
        let value = evaluate_epsilon_soft_policy(&mut env, &goal_in_two_steps(), 0.0, 0, &mut rng).unwrap();

        // Zero reward for the first step, then 0.9 * 10
        assert!((value - 9.0).abs() < 1e-12, "got {}", value);
    }
}

#[test]
fn test_evaluation_reports_missing_state() {
    let mut env = GridWorldBuilder::toy().deterministic().build().unwrap();
    let mut table = ValueTable::new();
    table.insert(
        Position::new(0, 0),
        ActionValues::from_pairs([(GridAction::Right, 1.0)]),
    );
    let mut rng = SearchRng::new(0);

    // Moving right enters the hazard cell, which has no row
    let result = evaluate_epsilon_soft_policy(&mut env, &table, 0.0, 0, &mut rng);

    match result {
        Err(MctsError::MissingState { state }) => assert!(state.contains("col: 1")),
        other => panic!("expected MissingState, got {:?}", other),
    }
}

#[test]
fn test_evaluation_summary_of_planned_table() {
    let planner = classic_planner(true);
    let table = planner.plan().unwrap();
    let mut env = planner.env().clone();

    let config = EvaluationConfig::default()
        .with_epsilon(0.2)
        .with_episodes(200)
        .with_max_episode_steps(200)
        .with_seed(3);
    let summary = evaluate_policy(&mut env, &table, &config).unwrap();

    assert_eq!(summary.episodes, 200);
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);
    assert!(summary.std_dev >= 0.0);
    // Rewards are bounded by 10 and discounted by 0.9
    assert!(summary.max <= 100.0 && summary.min >= -100.0);
}

#[test]
fn test_evaluation_is_reproducible() {
    let table = classic_planner(false).plan().unwrap();
    let config = EvaluationConfig::default()
        .with_episodes(50)
        .with_max_episode_steps(500)
        .with_seed(17);

    let mut env1 = GridWorld::classic();
    let mut env2 = GridWorld::classic();

    let a = evaluate_policy(&mut env1, &table, &config).unwrap();
    let b = evaluate_policy(&mut env2, &table, &config).unwrap();

    assert_eq!(a, b);
}

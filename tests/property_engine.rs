// tests/property_engine.rs

use std::time::Duration;

use proptest::prelude::*;
use waverun::TaskDescriptor;
use waverun::engine::{NoopLogger, Orchestrator};
use waverun::errors::WaverunError;
use waverun_test_utils::builders::{delayed_task, failing_task};
use waverun_test_utils::recorder::{Journal, Mark};

#[derive(Debug, Clone)]
struct TaskShape {
    /// Indices of earlier tasks, so every generated graph is acyclic.
    deps: Vec<usize>,
    sequential: bool,
    fails: bool,
    delay_ms: u64,
}

fn graph_strategy() -> impl Strategy<Value = Vec<TaskShape>> {
    (1usize..9).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                (
                    proptest::collection::vec(0..i.max(1), 0..=i.min(3)),
                    any::<bool>(),
                    proptest::bool::weighted(0.15),
                    0u64..4,
                )
                    .prop_map(move |(deps, sequential, fails, delay_ms)| TaskShape {
                        deps: if i == 0 { Vec::new() } else { deps },
                        sequential,
                        fails,
                        delay_ms,
                    })
            })
            .collect::<Vec<_>>()
    })
}

fn build(shapes: &[TaskShape], journal: &Journal) -> Vec<TaskDescriptor> {
    shapes
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            let name = format!("t{i}");
            let task = if shape.fails {
                failing_task(&name, journal)
            } else {
                delayed_task(&name, Duration::from_millis(shape.delay_ms), journal)
            };
            let task = task.with_dependencies(shape.deps.iter().map(|d| format!("t{d}")));
            if shape.sequential { task.sequential() } else { task }
        })
        .collect()
}

fn run_engine(tasks: Vec<TaskDescriptor>) -> Result<waverun::engine::RunSummary, WaverunError> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
        .block_on(Orchestrator::new(tasks, NoopLogger).run())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn no_body_starts_before_its_dependencies_finish(shapes in graph_strategy()) {
        let journal = Journal::new();
        let tasks = build(&shapes, &journal);
        let _ = run_engine(tasks);

        for (i, shape) in shapes.iter().enumerate() {
            let name = format!("t{i}");
            if !journal.ran(&name) {
                continue;
            }
            for dep in &shape.deps {
                let dep = format!("t{dep}");
                prop_assert!(
                    journal.finished_before_started(&dep, &name),
                    "{name} started before {dep} finished: {:?}",
                    journal.sequence()
                );
            }
        }
    }

    #[test]
    fn acyclic_graph_without_failures_completes(shapes in graph_strategy()) {
        let shapes: Vec<_> = shapes
            .into_iter()
            .map(|s| TaskShape { fails: false, ..s })
            .collect();
        let journal = Journal::new();
        let tasks = build(&shapes, &journal);

        let summary = run_engine(tasks).unwrap();

        prop_assert_eq!(summary.completed.len(), shapes.len());
        for i in 0..shapes.len() {
            let name = format!("t{i}");
            prop_assert_eq!(journal.index_of(&name, Mark::Start).is_some(), true);
        }
        prop_assert_eq!(journal.started().len(), shapes.len());
    }

    #[test]
    fn failures_are_reported_and_never_rerun(shapes in graph_strategy()) {
        let journal = Journal::new();
        let tasks = build(&shapes, &journal);
        let failing: Vec<String> = shapes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.fails)
            .map(|(i, _)| format!("t{i}"))
            .collect();

        let result = run_engine(tasks);

        // Each body runs at most once.
        let started = journal.started();
        let mut unique = started.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), started.len());

        match result {
            Ok(summary) => {
                prop_assert!(failing.is_empty());
                prop_assert_eq!(summary.completed.len(), shapes.len());
            }
            Err(WaverunError::TasksFailed { failed }) => {
                prop_assert!(!failed.is_empty());
                prop_assert!(failed.iter().all(|f| failing.contains(f)));
            }
            Err(WaverunError::Deadlock { failed, diagnosis, .. }) => {
                prop_assert!(!failed.is_empty());
                prop_assert!(diagnosis.cycles.is_empty());
                prop_assert!(diagnosis.missing.is_empty());
                prop_assert!(!diagnosis.blocked_by_failure.is_empty());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }
}

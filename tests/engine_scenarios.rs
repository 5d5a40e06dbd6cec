// tests/engine_scenarios.rs

use std::error::Error;
use std::time::{Duration, Instant};

use waverun::engine::{NoopLogger, Orchestrator, execute_tasks};
use waverun::errors::WaverunError;
use waverun_test_utils::builders::{delayed_task, failing_task, ok_task};
use waverun_test_utils::recorder::{Journal, LogEvent, Mark, RecordingLogger};
use waverun_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn dependent_task_starts_after_its_dependency_completes() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let tasks = vec![
            ok_task("a", &journal),
            ok_task("b", &journal).after("a"),
        ];

        execute_tasks(tasks, NoopLogger).await?;

        assert!(journal.finished_before_started("a", "b"));
        assert_eq!(journal.started(), vec!["a", "b"]);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn failing_task_does_not_stop_independent_sibling() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();
        let logger = RecordingLogger::new();

        let tasks = vec![failing_task("x", &journal), ok_task("y", &journal)];

        let err = execute_tasks(tasks, logger.clone())
            .await
            .expect_err("run with a failing task must fail");

        match err {
            WaverunError::TasksFailed { failed } => assert_eq!(failed, vec!["x"]),
            other => panic!("expected TasksFailed, got {other:?}"),
        }

        assert_eq!(logger.outcome_of("y"), Some(true));
        assert_eq!(logger.outcome_of("x"), Some(false));
        assert!(journal.index_of("y", Mark::Finish).is_some());
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn aggregated_error_names_every_failed_task() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let tasks = vec![
            failing_task("lint", &journal),
            ok_task("tokens", &journal),
            failing_task("types", &journal).sequential(),
            ok_task("css", &journal).after("tokens"),
        ];

        let err = execute_tasks(tasks, NoopLogger).await.unwrap_err();
        let message = err.to_string();

        assert_eq!(err.task_names(), ["lint", "types"]);
        assert!(message.contains("lint"), "{message}");
        assert!(message.contains("types"), "{message}");
        assert!(!message.contains("css"), "{message}");
        assert!(journal.ran("css"));
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn independent_parallel_tasks_overlap_in_time() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let delays = [50u64, 250, 120, 80, 200];
        let tasks = delays
            .iter()
            .enumerate()
            .map(|(i, ms)| delayed_task(&format!("t{i}"), Duration::from_millis(*ms), &journal))
            .collect();

        let started_at = Instant::now();
        execute_tasks(tasks, NoopLogger).await?;
        let elapsed = started_at.elapsed();

        // All five bodies start before any of them finishes.
        let sequence = journal.sequence();
        assert!(sequence[..5].iter().all(|(_, mark)| *mark == Mark::Start));

        let sum: u64 = delays.iter().sum();
        assert!(elapsed >= Duration::from_millis(250), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(sum - 150), "{elapsed:?}");
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn sequential_only_tasks_run_one_at_a_time_in_order() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let tasks = vec![
            delayed_task("A", Duration::from_millis(20), &journal).sequential(),
            delayed_task("B", Duration::from_millis(5), &journal).sequential(),
            delayed_task("C", Duration::from_millis(10), &journal).sequential(),
        ];

        execute_tasks(tasks, NoopLogger).await?;

        assert_eq!(
            journal.sequence(),
            vec![
                ("A".to_string(), Mark::Start),
                ("A".to_string(), Mark::Finish),
                ("B".to_string(), Mark::Start),
                ("B".to_string(), Mark::Finish),
                ("C".to_string(), Mark::Start),
                ("C".to_string(), Mark::Finish),
            ]
        );
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn parallel_share_settles_before_sequential_share_starts() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        // S is listed first so input order alone cannot explain the result.
        let tasks = vec![
            ok_task("S", &journal).sequential(),
            delayed_task("P", Duration::from_millis(30), &journal),
        ];

        execute_tasks(tasks, NoopLogger).await?;

        assert!(journal.finished_before_started("P", "S"));
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn logger_sees_start_end_and_error_for_each_task() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();
        let logger = RecordingLogger::new();

        let tasks = vec![
            ok_task("good", &journal).sequential(),
            failing_task("bad", &journal).sequential().after("good"),
        ];

        let _ = execute_tasks(tasks, logger.clone()).await;

        let events = logger.events();
        assert_eq!(events[0], LogEvent::Start("good".into()));
        assert_eq!(events[1], LogEvent::End("good".into(), true));
        assert_eq!(events[2], LogEvent::Start("bad".into()));
        assert_eq!(events[3], LogEvent::End("bad".into(), false));
        match &events[4] {
            LogEvent::Error(message, err) => {
                assert!(message.contains("bad"), "{message}");
                assert!(err.contains("bad exploded"), "{err}");
            }
            other => panic!("expected error event, got {other:?}"),
        }
        assert_eq!(events.len(), 5);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn abandoned_sequential_tasks_run_in_the_next_wave() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();
        let logger = RecordingLogger::new();

        let tasks = vec![
            failing_task("first", &journal).sequential(),
            ok_task("second", &journal).sequential(),
        ];

        let err = Orchestrator::new(tasks, logger.clone())
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.task_names(), ["first"]);
        assert_eq!(logger.started(), vec!["first", "second"]);
        assert_eq!(logger.outcome_of("second"), Some(true));
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn run_summary_counts_waves_of_a_diamond() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let tasks = vec![
            ok_task("root", &journal),
            ok_task("left", &journal).after("root"),
            ok_task("right", &journal).after("root").sequential(),
            ok_task("join", &journal).with_dependencies(["left", "right"]),
        ];

        let summary = Orchestrator::new(tasks, NoopLogger).run().await?;

        assert_eq!(summary.waves, 3);
        assert_eq!(summary.completed, vec!["root", "left", "right", "join"]);
        assert!(journal.finished_before_started("left", "right"));
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn panicking_body_is_a_task_failure() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();
        let logger = RecordingLogger::new();

        let tasks = vec![
            waverun_test_utils::builders::panicking_task("boom", &journal),
            delayed_task("calm", Duration::from_millis(10), &journal),
        ];

        let err = execute_tasks(tasks, logger.clone()).await.unwrap_err();

        assert_eq!(err.task_names(), ["boom"]);
        assert_eq!(logger.outcome_of("calm"), Some(true));
        let errors = logger.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("panicked"), "{:?}", errors[0]);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn empty_task_list_succeeds_without_waves() -> TestResult {
    with_timeout(async {
        init_tracing();

        let summary = Orchestrator::new(Vec::new(), NoopLogger).run().await?;

        assert_eq!(summary.waves, 0);
        assert!(summary.completed.is_empty());
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn duplicate_names_run_once() -> TestResult {
    with_timeout(async {
        init_tracing();
        let journal = Journal::new();

        let tasks = vec![
            ok_task("dup", &journal),
            ok_task("dup", &journal),
            ok_task("after", &journal).after("dup"),
        ];

        let summary = Orchestrator::new(tasks, NoopLogger).run().await?;

        assert_eq!(summary.completed, vec!["dup", "after"]);
        assert_eq!(journal.started(), vec!["dup", "after"]);
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

#[tokio::test]
async fn closure_bodies_are_accepted_directly() -> TestResult {
    with_timeout(async {
        init_tracing();

        let tasks = vec![
            waverun::TaskDescriptor::from_fn("inline", || async { anyhow::Ok(()) }),
        ];

        execute_tasks(tasks, NoopLogger).await?;
        Ok::<(), Box<dyn Error>>(())
    })
    .await
}

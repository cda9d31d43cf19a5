mod common;

use assetflow::dag::{Plan, PlanStep, Scheduler, TaskRunState};
use assetflow::engine::TaskOutcome;
use assetflow::tasks::TaskKind;

use common::TestResult;

fn names(ready: &[assetflow::dag::ScheduledTask]) -> Vec<TaskKind> {
    ready.iter().map(|s| s.task).collect()
}

#[test]
fn build_plan_runs_clean_before_every_transform() -> TestResult {
    let plan = Plan::build();
    plan.validate()?;

    assert_eq!(plan.roots(), vec![TaskKind::Clean]);
    let order = plan.topo_order()?;
    assert_eq!(order.first(), Some(&TaskKind::Clean));
    assert_eq!(order.len(), 8);

    for task in TaskKind::TRANSFORMS {
        assert!(plan.contains(task));
    }
    Ok(())
}

#[test]
fn cyclic_or_dangling_plans_are_rejected() {
    let cycle = Plan::from_steps(vec![
        PlanStep {
            task: TaskKind::MainCss,
            after: vec![TaskKind::Html],
        },
        PlanStep {
            task: TaskKind::Html,
            after: vec![TaskKind::MainCss],
        },
    ]);
    let err = cycle.validate().unwrap_err().to_string();
    assert!(err.contains("cycle"), "{err}");

    let dangling = Plan::from_steps(vec![PlanStep {
        task: TaskKind::Html,
        after: vec![TaskKind::Clean],
    }]);
    let err = dangling.validate().unwrap_err().to_string();
    assert!(err.contains("not part of this plan"), "{err}");
}

#[test]
fn transforms_start_together_once_clean_succeeds() -> TestResult {
    let mut scheduler = Scheduler::from_plan(&Plan::build());

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(TaskKind::Clean);
    assert_eq!(names(&ready), vec![TaskKind::Clean]);
    assert_eq!(scheduler.run_state_of(TaskKind::Html), Some(TaskRunState::Pending));

    let ready = scheduler.handle_completion(TaskKind::Clean, &TaskOutcome::Success);
    let mut started = names(&ready);
    started.sort();
    let mut expected = TaskKind::TRANSFORMS.to_vec();
    expected.sort();
    assert_eq!(started, expected);

    for task in TaskKind::TRANSFORMS {
        assert!(!scheduler.is_idle());
        scheduler.handle_completion(task, &TaskOutcome::Success);
    }
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn clean_failure_blocks_every_transform() -> TestResult {
    let mut scheduler = Scheduler::from_plan(&Plan::build());

    scheduler.start_new_run();
    scheduler.handle_trigger(TaskKind::Clean);
    let ready =
        scheduler.handle_completion(TaskKind::Clean, &TaskOutcome::Failed("busy".into()));

    assert!(ready.is_empty());
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.blocked_in_run().len(), 7);
    assert_eq!(
        scheduler.run_state_of(TaskKind::Clean),
        Some(TaskRunState::DoneFailed)
    );
    Ok(())
}

#[test]
fn watch_rerun_is_satisfied_by_earlier_clean() -> TestResult {
    let mut scheduler = Scheduler::from_plan(&Plan::build());

    scheduler.start_new_run();
    scheduler.handle_trigger(TaskKind::Clean);
    scheduler.handle_completion(TaskKind::Clean, &TaskOutcome::Success);
    for task in TaskKind::TRANSFORMS {
        scheduler.handle_completion(task, &TaskOutcome::Success);
    }
    assert!(scheduler.is_idle());

    // A later run that only touches html must not re-run clean.
    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(TaskKind::Html);
    assert_eq!(names(&ready), vec![TaskKind::Html]);
    assert_eq!(
        scheduler.run_state_of(TaskKind::Clean),
        Some(TaskRunState::NotInRun)
    );
    assert_eq!(
        scheduler.run_state_of(TaskKind::MainCss),
        Some(TaskRunState::NotInRun)
    );

    scheduler.handle_completion(TaskKind::Html, &TaskOutcome::Success);
    assert!(scheduler.is_idle());
    Ok(())
}

#[test]
fn transform_never_runs_when_clean_never_succeeded() -> TestResult {
    let mut scheduler = Scheduler::from_plan(&Plan::build());

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(TaskKind::Html);
    assert!(ready.is_empty());
    assert_eq!(scheduler.run_state_of(TaskKind::Html), Some(TaskRunState::Pending));
    Ok(())
}

#[test]
fn single_task_plan_has_no_dependencies() -> TestResult {
    let mut scheduler = Scheduler::from_plan(&Plan::single(TaskKind::Images));

    scheduler.start_new_run();
    let ready = scheduler.handle_trigger(TaskKind::Images);
    assert_eq!(names(&ready), vec![TaskKind::Images]);

    // Tasks outside the plan are ignored.
    assert!(scheduler.handle_trigger(TaskKind::Html).is_empty());
    assert_eq!(scheduler.run_state_of(TaskKind::Html), None);

    scheduler.handle_completion(TaskKind::Images, &TaskOutcome::Success);
    assert!(scheduler.is_idle());
    Ok(())
}

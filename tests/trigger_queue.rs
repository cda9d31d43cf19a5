mod common;

use assetflow::engine::{TriggerQueue, TriggerWhileRunningBehaviour};
use assetflow::tasks::TaskKind;

use common::TestResult;

#[test]
fn queue_mode_merges_triggers_into_single_batch() -> TestResult {
    let mut q = TriggerQueue::new(TriggerWhileRunningBehaviour::Queue, 1);

    q.record_trigger(TaskKind::Html);
    q.record_trigger(TaskKind::MainCss);
    q.record_trigger(TaskKind::Html);

    assert_eq!(q.drain_pending(), vec![TaskKind::MainCss, TaskKind::Html]);
    assert!(q.is_empty());
    Ok(())
}

#[test]
fn cancel_mode_keeps_only_latest_trigger() -> TestResult {
    let mut q = TriggerQueue::new(TriggerWhileRunningBehaviour::Cancel, 3);

    q.record_trigger(TaskKind::Scripts);
    q.record_trigger(TaskKind::MainCss);

    assert_eq!(q.drain_pending(), vec![TaskKind::MainCss]);
    Ok(())
}

#[test]
fn zero_length_queue_is_clamped() -> TestResult {
    let mut q = TriggerQueue::new(TriggerWhileRunningBehaviour::Queue, 0);
    q.record_trigger(TaskKind::Scripts);
    assert_eq!(q.drain_pending(), vec![TaskKind::Scripts]);
    Ok(())
}

//! Integration tests for the filter pipeline
//!
//! Tests verify that:
//! - Filters run in descending priority order, ties in insertion order
//! - Invalid, duplicate and missing filters are refused without side effects
//! - An empty pipeline behaves exactly like the terminal server
//! - Errors and short-circuits flow back to the caller unchanged
//! - Concurrent membership changes leave a consistent chain

use async_trait::async_trait;
use mbean_pipeline::error::{MBeanError, MBeanResult};
use mbean_pipeline::mbean::{Attribute, InMemoryMBeanServer, MBeanServer, ObjectName, SimpleMBean};
use mbean_pipeline::pipeline::{MBeanServerFilter, MBeanServerPipeline, PassThroughFilter};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Appends its label to a shared log before forwarding a count query.
struct RecordingFilter {
    label: String,
    priority: i32,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingFilter {
    fn new(label: &str, priority: i32, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn MBeanServerFilter> {
        Arc::new(Self {
            label: label.to_string(),
            priority,
            log: log.clone(),
        })
    }
}

#[async_trait]
impl MBeanServerFilter for RecordingFilter {
    fn name(&self) -> &str {
        &self.label
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn get_mbean_count(&self, next: &dyn MBeanServer) -> usize {
        self.log.lock().unwrap().push(self.label.clone());
        next.get_mbean_count().await
    }
}

/// Answers every attribute read itself.
struct CachedAttributeFilter {
    priority: i32,
}

#[async_trait]
impl MBeanServerFilter for CachedAttributeFilter {
    fn name(&self) -> &str {
        "cache"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn get_attribute(
        &self,
        _next: &dyn MBeanServer,
        _name: &ObjectName,
        _attribute: &str,
    ) -> MBeanResult<Value> {
        Ok(json!("cached"))
    }
}

fn name(s: &str) -> ObjectName {
    ObjectName::parse(s).unwrap()
}

async fn terminal_with_beans(count: usize) -> Arc<InMemoryMBeanServer> {
    let terminal = Arc::new(InMemoryMBeanServer::default());
    for i in 0..count {
        terminal
            .register_mbean(
                name(&format!("app:type=Worker,id={i}")),
                Arc::new(SimpleMBean::new("Worker").with_writable_attribute("Load", json!(i))),
            )
            .await
            .unwrap();
    }
    terminal
}

fn pass(priority: i32) -> Arc<dyn MBeanServerFilter> {
    Arc::new(PassThroughFilter::new(format!("pass-{priority}"), priority))
}

#[tokio::test]
async fn test_end_to_end_priority_order() {
    let terminal = terminal_with_beans(8).await;
    let pipeline = MBeanServerPipeline::new(terminal);
    let log = Arc::new(Mutex::new(Vec::new()));

    for priority in [7, 13, 9, 4, 15, 6, 12, 8] {
        let filter = RecordingFilter::new(&priority.to_string(), priority, &log);
        assert!(pipeline.insert(Some(filter)));
    }

    let count = pipeline.head().get_mbean_count().await;

    assert_eq!(count, 8);
    let visited: Vec<i32> = log.lock().unwrap().iter().map(|p| p.parse().unwrap()).collect();
    assert_eq!(visited, vec![15, 13, 12, 9, 8, 7, 6, 4]);
}

#[tokio::test]
async fn test_equal_priorities_run_in_insertion_order() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(1).await);
    let log = Arc::new(Mutex::new(Vec::new()));

    for label in ["first", "second", "third"] {
        assert!(pipeline.insert(Some(RecordingFilter::new(label, 5, &log))));
    }

    pipeline.head().get_mbean_count().await;
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_ties_interleaved_with_other_priorities() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(1).await);
    let log = Arc::new(Mutex::new(Vec::new()));

    for (label, priority) in [("5a", 5), ("9", 9), ("5b", 5), ("1", 1), ("5c", 5)] {
        assert!(pipeline.insert(Some(RecordingFilter::new(label, priority, &log))));
    }

    pipeline.head().get_mbean_count().await;
    assert_eq!(*log.lock().unwrap(), vec!["9", "5a", "5b", "5c", "1"]);
}

#[tokio::test]
async fn test_same_filter_inserted_once() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(0).await);
    let filter = pass(3);

    assert!(pipeline.insert(Some(filter.clone())));
    assert!(pipeline.contains(Some(&filter)));
    assert!(!pipeline.insert(Some(filter.clone())));
    assert_eq!(pipeline.len(), 1);

    assert!(pipeline.remove(Some(&filter)));
    assert!(pipeline.insert(Some(filter.clone())));
    assert!(pipeline.contains(Some(&filter)));
}

#[tokio::test]
async fn test_priority_floor() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(0).await);

    for priority in [0, -1, i32::MIN] {
        assert!(!pipeline.insert(Some(pass(priority))), "priority {priority}");
    }
    for priority in [1, 2, i32::MAX] {
        assert!(pipeline.insert(Some(pass(priority))), "priority {priority}");
    }
    assert_eq!(pipeline.len(), 3);
}

#[tokio::test]
async fn test_remove_symmetry() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(0).await);
    let filter = pass(4);

    assert!(!pipeline.remove(Some(&filter)));
    assert!(pipeline.insert(Some(filter.clone())));
    assert!(pipeline.remove(Some(&filter)));
    assert!(!pipeline.contains(Some(&filter)));
    assert!(!pipeline.remove(Some(&filter)));
}

#[tokio::test]
async fn test_missing_filter_arguments() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(0).await);

    assert!(!pipeline.insert(None));
    assert!(!pipeline.remove(None));
    assert!(!pipeline.contains(None));
    assert!(pipeline.is_empty());
}

#[tokio::test]
async fn test_empty_pipeline_passthrough() {
    let terminal = terminal_with_beans(3).await;
    let pipeline = MBeanServerPipeline::new(terminal.clone());
    let target = name("app:type=Worker,id=2");

    assert_eq!(
        pipeline.head().get_mbean_count().await,
        terminal.get_mbean_count().await
    );
    assert_eq!(
        pipeline.head().get_attribute(&target, "Load").await,
        terminal.get_attribute(&target, "Load").await
    );
    assert_eq!(
        pipeline.head().query_names(None).await,
        terminal.query_names(None).await
    );
}

#[tokio::test]
async fn test_inert_filters_do_not_change_results() {
    let terminal = terminal_with_beans(5).await;
    let pipeline = MBeanServerPipeline::new(terminal.clone());
    for priority in 1..=10 {
        assert!(pipeline.insert(Some(pass(priority))));
    }

    let head = pipeline.head();
    assert_eq!(head.get_mbean_count().await, terminal.get_mbean_count().await);
    assert_eq!(head.get_domains().await, terminal.get_domains().await);
    assert_eq!(
        head.query_names(Some(&name("app:type=Worker,*"))).await,
        terminal.query_names(Some(&name("app:type=Worker,*"))).await
    );
    assert_eq!(
        head.get_mbean_info(&name("app:type=Worker,id=0")).await,
        terminal.get_mbean_info(&name("app:type=Worker,id=0")).await
    );
}

#[tokio::test]
async fn test_writes_reach_terminal_through_filters() {
    let terminal = terminal_with_beans(1).await;
    let pipeline = MBeanServerPipeline::new(terminal.clone());
    pipeline.insert(Some(pass(2)));
    pipeline.insert(Some(pass(1)));
    let target = name("app:type=Worker,id=0");

    pipeline
        .set_attribute(&target, Attribute::new("Load", json!(42)))
        .await
        .unwrap();
    assert_eq!(terminal.get_attribute(&target, "Load").await.unwrap(), json!(42));
}

#[tokio::test]
async fn test_terminal_errors_propagate_unchanged() {
    let terminal = terminal_with_beans(1).await;
    let pipeline = MBeanServerPipeline::new(terminal.clone());
    pipeline.insert(Some(pass(2)));
    let missing = name("app:type=Worker,id=99");

    let direct = terminal.get_attribute(&missing, "Load").await;
    let chained = pipeline.head().get_attribute(&missing, "Load").await;

    assert_eq!(chained, Err(MBeanError::InstanceNotFound(missing)));
    assert_eq!(chained, direct);
}

#[tokio::test]
async fn test_short_circuit_skips_rest_of_chain() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(1).await);
    let log = Arc::new(Mutex::new(Vec::new()));

    pipeline.insert(Some(Arc::new(CachedAttributeFilter { priority: 10 })));
    pipeline.insert(Some(RecordingFilter::new("below", 5, &log)));

    // Not even registered: the cache answers before the terminal is asked.
    let value = pipeline
        .head()
        .get_attribute(&name("app:type=Nowhere"), "Anything")
        .await
        .unwrap();
    assert_eq!(value, json!("cached"));

    // Other operations still pass through every filter.
    assert_eq!(pipeline.head().get_mbean_count().await, 1);
    assert_eq!(*log.lock().unwrap(), vec!["below"]);
}

#[tokio::test]
async fn test_captured_head_keeps_its_chain() {
    let pipeline = MBeanServerPipeline::new(terminal_with_beans(1).await);
    let log = Arc::new(Mutex::new(Vec::new()));
    let early = RecordingFilter::new("early", 5, &log);
    pipeline.insert(Some(early.clone()));

    let old_head = pipeline.head();
    pipeline.insert(Some(RecordingFilter::new("late", 9, &log)));
    pipeline.remove(Some(&early));

    old_head.get_mbean_count().await;
    assert_eq!(*log.lock().unwrap(), vec!["early"]);

    log.lock().unwrap().clear();
    pipeline.head().get_mbean_count().await;
    assert_eq!(*log.lock().unwrap(), vec!["late"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_membership_changes() {
    let pipeline = Arc::new(MBeanServerPipeline::new(terminal_with_beans(4).await));

    let mut writers = Vec::new();
    for task in 0..8 {
        let pipeline = pipeline.clone();
        writers.push(tokio::spawn(async move {
            let mut kept = Vec::new();
            for i in 0..25 {
                let filter = pass(1 + (task * 25 + i) % 7);
                assert!(pipeline.insert(Some(filter.clone())));
                if i % 2 == 0 {
                    tokio::task::yield_now().await;
                    assert!(pipeline.remove(Some(&filter)));
                } else {
                    kept.push(filter);
                }
            }
            kept
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..4 {
        let pipeline = pipeline.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..100 {
                assert_eq!(pipeline.head().get_mbean_count().await, 4);
                tokio::task::yield_now().await;
            }
        }));
    }

    let mut kept = Vec::new();
    for writer in writers {
        kept.extend(writer.await.unwrap());
    }
    for reader in readers {
        reader.await.unwrap();
    }

    assert_eq!(pipeline.len(), 8 * 12);
    assert!(kept.iter().all(|f| pipeline.contains(Some(f))));

    let priorities: Vec<i32> = pipeline.filters().iter().map(|d| d.priority).collect();
    assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
}

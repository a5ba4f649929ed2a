pub mod builders;
pub mod mock_driver;
pub mod recording_observer;
pub mod strategies;

#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use mock_driver::*;
#[allow(unused_imports)]
pub use recording_observer::*;

use std::sync::Arc;

use taskflow_core::models::Task;
use taskflow_core::orchestration::{InMemoryTaskStore, LifecycleObserver, TaskExecutor};

/// Executor over a fresh in-memory store that already holds `task`.
#[allow(dead_code)]
pub fn executor_for(
    task: &Task,
    driver: Arc<ScriptedDriver>,
    observer: Option<Arc<dyn LifecycleObserver>>,
) -> (TaskExecutor, Arc<InMemoryTaskStore>) {
    let store = Arc::new(InMemoryTaskStore::new());
    store.insert(task).expect("task document should serialize");
    let mut executor = TaskExecutor::new(store.clone(), driver);
    if let Some(observer) = observer {
        executor = executor.with_observer(observer);
    }
    (executor, store)
}

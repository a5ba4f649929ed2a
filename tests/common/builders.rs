//! Test data builders for planned tasks.

#![allow(dead_code)]

use taskflow_core::models::{GenerationId, Sequence, Step, Task, TaskStarter};

/// Generation id used for a step named `name`.
pub fn generation_for(name: &str) -> GenerationId {
    GenerationId::new(format!("gen-{name}"))
}

/// Builder for planned tasks. Each step's generation id is derived from its
/// name with [`generation_for`], so drivers can be scripted by step name.
pub struct TaskBuilder {
    workspace_id: String,
    starter: TaskStarter,
    sequences: Vec<Vec<String>>,
}

impl TaskBuilder {
    pub fn new() -> Self {
        Self {
            workspace_id: "workspace-test".to_string(),
            starter: TaskStarter::Manual {
                user_id: "user-test".to_string(),
            },
            sequences: Vec::new(),
        }
    }

    pub fn with_workspace(mut self, workspace_id: &str) -> Self {
        self.workspace_id = workspace_id.to_string();
        self
    }

    pub fn with_starter(mut self, starter: TaskStarter) -> Self {
        self.starter = starter;
        self
    }

    pub fn with_sequence(mut self, step_names: &[&str]) -> Self {
        self.sequences
            .push(step_names.iter().map(|name| name.to_string()).collect());
        self
    }

    /// Sequences with the given step counts; steps are named `s{i}-{j}`.
    pub fn with_shape(mut self, shape: &[usize]) -> Self {
        for (i, count) in shape.iter().enumerate() {
            self.sequences
                .push((0..*count).map(|j| format!("s{i}-{j}")).collect());
        }
        self
    }

    pub fn build(self) -> Task {
        let sequences = self
            .sequences
            .into_iter()
            .map(|names| {
                Sequence::new(
                    names
                        .iter()
                        .map(|name| Step::new(name.clone(), generation_for(name)))
                        .collect(),
                )
            })
            .collect();
        Task::new(self.workspace_id, self.starter, sequences)
    }
}

impl Default for TaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

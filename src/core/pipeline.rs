use async_trait::async_trait;

/// A pipeline stage which may suspend, e.g. for outbound
/// http or a telemetry append
#[async_trait]
pub trait AsyncTask<C, E>: Send + Sync {
    async fn run(&self, context: &C) -> Result<(), E>;
}

/// A pipeline stage which is pure cpu work and must not block
pub trait BlockingTask<C, E>: Send + Sync {
    fn run(&self, context: &C) -> Result<(), E>;
}

enum Stage<C, E> {
    Async(Box<dyn AsyncTask<C, E>>),
    Blocking(Box<dyn BlockingTask<C, E>>),
}

/// An ordered list of tasks sharing a single context object.
/// Tasks run sequentially and the first error aborts the
/// remainder of the pipeline, leaving whatever state prior
/// tasks attached on the context
pub struct Pipeline<C, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C: Sync, E> Pipeline<C, E> {
    pub async fn run(&self, context: &C) -> Result<(), E> {
        for stage in &self.stages {
            match stage {
                Stage::Async(task) => task.run(context).await?,
                Stage::Blocking(task) => task.run(context)?,
            }
        }

        Ok(())
    }
}

pub struct PipelineBuilder<C, E> {
    stages: Vec<Stage<C, E>>,
}

impl<C, E> PipelineBuilder<C, E> {
    pub fn new() -> Self {
        PipelineBuilder { stages: Vec::new() }
    }

    pub fn with_async(mut self, task: Box<dyn AsyncTask<C, E>>) -> Self {
        self.stages.push(Stage::Async(task));
        self
    }

    pub fn with_blocking(mut self, task: Box<dyn BlockingTask<C, E>>) -> Self {
        self.stages.push(Stage::Blocking(task));
        self
    }

    pub fn add_async(&mut self, task: Box<dyn AsyncTask<C, E>>) {
        self.stages.push(Stage::Async(task));
    }

    pub fn add_blocking(&mut self, task: Box<dyn BlockingTask<C, E>>) {
        self.stages.push(Stage::Blocking(task));
    }

    /// Returns None when no tasks were added
    pub fn build(self) -> Option<Pipeline<C, E>> {
        if self.stages.is_empty() {
            return None;
        }

        Some(Pipeline {
            stages: self.stages,
        })
    }
}

impl<C, E> Default for PipelineBuilder<C, E> {
    fn default() -> Self {
        Self::new()
    }
}

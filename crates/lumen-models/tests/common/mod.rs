//! Stub pipelines shared by the backend integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use lumen_abstraction::{ModelError, Pipeline, PipelineLoader};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Produces the pipeline result for an input; the second argument is the
/// 1-based number of the inference call.
pub type Behavior<O> = Arc<dyn Fn(&str, usize) -> Result<O, ModelError> + Send + Sync>;

/// Wraps a closure as a [`Behavior`].
pub fn behavior<O, F>(f: F) -> Behavior<O>
where
    F: Fn(&str, usize) -> Result<O, ModelError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Shared counters observed by the tests.
#[derive(Clone, Default)]
pub struct Counters {
    loads: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl Counters {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub struct StubLoader<O> {
    counters: Counters,
    behavior: Behavior<O>,
    load_error: Option<String>,
}

impl<O: Send + 'static> StubLoader<O> {
    pub fn new(behavior: Behavior<O>) -> (Self, Counters) {
        let counters = Counters::default();
        (Self { counters: counters.clone(), behavior, load_error: None }, counters)
    }

    pub fn failing(reason: &str) -> (Self, Counters) {
        let (mut loader, counters) =
            Self::new(behavior(|_, _| Err(ModelError::InferenceFailure("never loaded".to_string()))));
        loader.load_error = Some(reason.to_string());
        (loader, counters)
    }
}

#[async_trait]
impl<O: Send + 'static> PipelineLoader<O> for StubLoader<O> {
    async fn load(&self) -> Result<Box<dyn Pipeline<O>>, ModelError> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.load_error {
            return Err(ModelError::LoadFailure(reason.clone()));
        }
        Ok(Box::new(StubPipeline {
            counters: self.counters.clone(),
            behavior: Arc::clone(&self.behavior),
        }))
    }
}

struct StubPipeline<O> {
    counters: Counters,
    behavior: Behavior<O>,
}

#[async_trait]
impl<O: Send + 'static> Pipeline<O> for StubPipeline<O> {
    async fn infer(&self, input: &str) -> Result<O, ModelError> {
        let call = self.counters.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.behavior)(input, call)
    }
}

/// Behavior that fails on the first call and succeeds with `ok` afterwards.
pub fn fail_once<O: Clone + Send + Sync + 'static>(ok: O) -> Behavior<O> {
    behavior(move |_, call| {
        if call == 1 {
            Err(ModelError::InferenceFailure("backend exploded".to_string()))
        } else {
            Ok(ok.clone())
        }
    })
}

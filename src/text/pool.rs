// Analyzer pool for concurrent pipelines.
//
// Analyzers can be expensive to build, so each worker checks one out,
// uses it for a whole work item and hands it back. New analyzers are only
// created when every existing one is checked out, so the pool never holds
// more instances than the peak number of concurrent workers.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use super::traits::TextAnalyzer;

type Factory = dyn Fn() -> Box<dyn TextAnalyzer> + Send + Sync;

#[derive(Clone)]
pub struct AnalyzerPool {
    idle: Arc<Mutex<Vec<Box<dyn TextAnalyzer>>>>,
    factory: Arc<Factory>,
}

impl AnalyzerPool {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn TextAnalyzer> + Send + Sync + 'static,
    {
        Self {
            idle: Arc::new(Mutex::new(Vec::new())),
            factory: Arc::new(factory),
        }
    }

    /// Take an idle analyzer, or build a new one if none is free.
    pub fn checkout(&self) -> Result<Box<dyn TextAnalyzer>> {
        let reused = self
            .idle
            .lock()
            .map_err(|_| anyhow!("analyzer pool lock poisoned"))?
            .pop();
        Ok(reused.unwrap_or_else(|| (self.factory)()))
    }

    /// Return an analyzer for reuse by the next worker.
    pub fn give_back(&self, analyzer: Box<dyn TextAnalyzer>) -> Result<()> {
        self.idle
            .lock()
            .map_err(|_| anyhow!("analyzer pool lock poisoned"))?
            .push(analyzer);
        Ok(())
    }

    /// Run `f` with a pooled analyzer, returning it afterwards even if `f` fails.
    pub fn with_analyzer<T>(&self, f: impl FnOnce(&dyn TextAnalyzer) -> T) -> Result<T> {
        let analyzer = self.checkout()?;
        let out = f(analyzer.as_ref());
        self.give_back(analyzer)?;
        Ok(out)
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|v| v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::token::AnalyzedToken;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Empty;

    impl TextAnalyzer for Empty {
        fn analyze(&self, _text: &str) -> Result<Vec<AnalyzedToken>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_pool_reuses_returned_analyzers() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();
        let pool = AnalyzerPool::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Empty)
        });

        for _ in 0..3 {
            pool.with_analyzer(|a| a.analyze("x").unwrap()).unwrap();
        }
        assert_eq!(built.load(Ordering::SeqCst), 1);
        assert_eq!(pool.idle_count(), 1);

        let a = pool.checkout().unwrap();
        let b = pool.checkout().unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        pool.give_back(a).unwrap();
        pool.give_back(b).unwrap();
        assert_eq!(pool.idle_count(), 2);
    }
}

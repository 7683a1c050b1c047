/// A unit of work submitted to a [`super::Pool`].
///
/// A run/cancel callback pair, each owning whatever it captured. Closures
/// are a natural fit here since a `FnOnce` already bundles its captured
/// argument with the code that consumes it, with no separate untyped `arg`
/// pointer needed. Exactly one of `run`/`cancel` is ever invoked.
pub struct WorkItem {
    run: Box<dyn FnOnce() + Send + 'static>,
    cancel: Box<dyn FnOnce() + Send + 'static>,
}

impl WorkItem {
    pub fn new<R, C>(run: R, cancel: C) -> Self
    where
        R: FnOnce() + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        WorkItem {
            run: Box::new(run),
            cancel: Box::new(cancel),
        }
    }

    pub fn run(self) {
        (self.run)();
    }

    pub fn cancel(self) {
        (self.cancel)();
    }
}

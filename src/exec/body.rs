// src/exec/body.rs

//! The opaque unit of work the engine runs.
//!
//! The engine never looks inside a body: it calls [`TaskBody::run`] once,
//! awaits the future, and treats `Err` (or a panic) as task failure.
//! Anything from a closure to a shell command can implement it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`TaskBody::run`].
pub type BodyFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// A single "run" capability, polymorphic over arbitrary side-effecting work.
pub trait TaskBody: Send + Sync {
    fn run(&self) -> BodyFuture<'_>;
}

/// Adapter turning `Fn() -> impl Future<Output = anyhow::Result<()>>` into a
/// [`TaskBody`].
pub struct FnBody<F> {
    f: F,
}

impl<F> FnBody<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> TaskBody for FnBody<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    fn run(&self) -> BodyFuture<'_> {
        Box::pin((self.f)())
    }
}

impl<F> fmt::Debug for FnBody<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnBody")
    }
}

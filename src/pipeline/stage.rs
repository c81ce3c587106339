//! Stage contract and a few ready-made stages.

use crossbeam_channel::{Receiver, bounded};
use std::thread;

/// A transformation from one sequence to another.
///
/// `apply` consumes the stage, so a stage can be wired at most once. A stage owns whatever thread
/// it spawns to pump its output; it should stop when its input closes and when its downstream
/// receiver is dropped, otherwise shutdown of the chain above it is not guaranteed to finish.
pub trait Stage<T> {
    fn apply(self: Box<Self>, input: Receiver<T>) -> Receiver<T>;
}

impl<T, F> Stage<T> for F
where
    F: FnOnce(Receiver<T>) -> Receiver<T>,
{
    fn apply(self: Box<Self>, input: Receiver<T>) -> Receiver<T> {
        (*self)(input)
    }
}

pub type BoxedStage<T> = Box<dyn Stage<T>>;

/// Box any `FnOnce(Receiver<T>) -> Receiver<T>` as a stage.
pub fn boxed_stage<T, F>(f: F) -> BoxedStage<T>
where
    F: FnOnce(Receiver<T>) -> Receiver<T> + 'static,
{
    Box::new(f)
}

/// Single worker: read `input` until closed, send whatever `step` yields. Exits early if the
/// downstream receiver is gone (dropping `input` then disconnects the upstream relay).
fn spawn_stage_worker<T, F>(input: Receiver<T>, mut step: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnMut(T) -> Option<T> + Send + 'static,
{
    let (tx, rx) = bounded::<T>(0);
    thread::spawn(move || {
        for value in input.iter() {
            if let Some(out) = step(value)
                && tx.send(out).is_err()
            {
                break;
            }
        }
    });
    rx
}

/// Stage applying `f` to every value.
pub fn map_stage<T, F>(f: F) -> BoxedStage<T>
where
    T: Send + 'static,
    F: Fn(T) -> T + Send + 'static,
{
    boxed_stage(move |input| spawn_stage_worker(input, move |v| Some(f(v))))
}

/// Stage keeping only values for which `keep` returns true.
pub fn filter_stage<T, F>(keep: F) -> BoxedStage<T>
where
    T: Send + 'static,
    F: Fn(&T) -> bool + Send + 'static,
{
    boxed_stage(move |input| spawn_stage_worker(input, move |v| keep(&v).then_some(v)))
}

/// Pass-through stage that lets `f` look at every value (logging, counters).
pub fn inspect_stage<T, F>(f: F) -> BoxedStage<T>
where
    T: Send + 'static,
    F: Fn(&T) + Send + 'static,
{
    boxed_stage(move |input| {
        spawn_stage_worker(input, move |v| {
            f(&v);
            Some(v)
        })
    })
}

use std::time::Duration;
use wavescape_render::{SceneError, SceneGraph};

/// Error returned by a failing animation callback.
#[derive(Debug, thiserror::Error)]
pub enum AnimationError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("{0}")]
    Failed(String),
}

pub type AnimationResult = Result<(), AnimationError>;

/// Index of a callback in the registry. Ids follow registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(usize);

impl AnimationId {
    pub fn index(self) -> usize {
        self.0
    }
}

type AnimationFn = Box<dyn FnMut(&mut AnimationFrame<'_>) -> AnimationResult>;

/// What a callback sees during one rendered frame.
pub struct AnimationFrame<'a> {
    elapsed: Duration,
    scene: &'a mut SceneGraph,
    staged: &'a mut Vec<AnimationFn>,
    first_staged_id: usize,
}

impl AnimationFrame<'_> {
    /// Seconds since the orchestrator's clock started. Identical for every
    /// callback of the same frame.
    pub fn elapsed(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn elapsed_duration(&self) -> Duration {
        self.elapsed
    }
}

/// Surface that scene content builds against: scene access plus callback
/// registration. Implemented by the world and by [`AnimationFrame`].
pub trait Stage {
    fn scene(&self) -> &SceneGraph;

    fn scene_mut(&mut self) -> &mut SceneGraph;

    fn add_animation<F>(&mut self, animation: F) -> AnimationId
    where
        F: FnMut(&mut AnimationFrame<'_>) -> AnimationResult + 'static;
}

impl Stage for AnimationFrame<'_> {
    fn scene(&self) -> &SceneGraph {
        self.scene
    }

    fn scene_mut(&mut self) -> &mut SceneGraph {
        self.scene
    }

    /// Callbacks added mid-frame are staged and first run on the next
    /// rendered frame.
    fn add_animation<F>(&mut self, animation: F) -> AnimationId
    where
        F: FnMut(&mut AnimationFrame<'_>) -> AnimationResult + 'static,
    {
        let id = AnimationId(self.first_staged_id + self.staged.len());
        self.staged.push(Box::new(animation));
        id
    }
}

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Ordered, append-only registry of per-frame callbacks.
///
/// Each pass runs a snapshot: the callbacks registered when the pass began,
/// in registration order. A failing callback is logged and skipped; the
/// rest of the pass still runs.
#[derive(Default)]
pub struct AnimationRegistry {
    entries: Vec<AnimationFn>,
    staged: Vec<AnimationFn>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, animation: F) -> AnimationId
    where
        F: FnMut(&mut AnimationFrame<'_>) -> AnimationResult + 'static,
    {
        let id = AnimationId(self.entries.len());
        self.entries.push(Box::new(animation));
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every registered callback once with the same `elapsed` value.
    pub fn run(&mut self, elapsed: Duration, scene: &mut SceneGraph) -> AnimationReport {
        let mut report = AnimationReport::default();
        let mut frame = AnimationFrame {
            elapsed,
            scene,
            staged: &mut self.staged,
            first_staged_id: self.entries.len(),
        };
        for (index, animation) in self.entries.iter_mut().enumerate() {
            match animation(&mut frame) {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(animation = index, "animation callback failed: {e}");
                }
            }
        }
        if !self.staged.is_empty() {
            tracing::trace!("{} animation(s) registered mid-frame", self.staged.len());
            self.entries.append(&mut self.staged);
        }
        report
    }
}

impl std::fmt::Debug for AnimationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRegistry")
            .field("len", &self.entries.len())
            .field("staged", &self.staged.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wavescape_common::Color;
    use wavescape_render::Node;

    fn scene() -> SceneGraph {
        SceneGraph::new(Color::BLACK)
    }

    #[test]
    fn runs_in_registration_order_with_shared_elapsed() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = AnimationRegistry::new();
        for name in ["a", "b", "c"] {
            let log = log.clone();
            registry.add(move |frame: &mut AnimationFrame<'_>| {
                log.borrow_mut().push((name, frame.elapsed()));
                Ok(())
            });
        }
        let report = registry.run(Duration::from_millis(1500), &mut scene());
        assert_eq!(report.succeeded, 3);
        assert_eq!(
            *log.borrow(),
            vec![("a", 1.5), ("b", 1.5), ("c", 1.5)]
        );
    }

    #[test]
    fn mid_frame_registration_starts_next_frame() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = AnimationRegistry::new();
        let outer_calls = calls.clone();
        let mut added = false;
        registry.add(move |frame: &mut AnimationFrame<'_>| {
            outer_calls.borrow_mut().push("outer");
            if !added {
                added = true;
                let inner_calls = outer_calls.clone();
                let id = frame.add_animation(move |_: &mut AnimationFrame<'_>| {
                    inner_calls.borrow_mut().push("inner");
                    Ok(())
                });
                assert_eq!(id.index(), 1);
            }
            Ok(())
        });

        let mut s = scene();
        registry.run(Duration::ZERO, &mut s);
        assert_eq!(*calls.borrow(), vec!["outer"]);
        assert_eq!(registry.len(), 2);

        registry.run(Duration::ZERO, &mut s);
        assert_eq!(*calls.borrow(), vec!["outer", "outer", "inner"]);
    }

    #[test]
    fn failing_callback_does_not_stop_the_pass() {
        let ran = Rc::new(RefCell::new(0));
        let mut registry = AnimationRegistry::new();
        registry.add(|_: &mut AnimationFrame<'_>| Err(AnimationError::Failed("boom".into())));
        let counter = ran.clone();
        registry.add(move |_: &mut AnimationFrame<'_>| {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        let report = registry.run(Duration::ZERO, &mut scene());
        assert_eq!(report, AnimationReport { succeeded: 1, failed: 1 });
        assert_eq!(*ran.borrow(), 1);
    }

    #[test]
    fn callbacks_can_mutate_the_scene() {
        let mut registry = AnimationRegistry::new();
        registry.add(|frame: &mut AnimationFrame<'_>| {
            frame.scene_mut().add(Node::group());
            Ok(())
        });
        let mut s = scene();
        registry.run(Duration::ZERO, &mut s);
        registry.run(Duration::ZERO, &mut s);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn scene_errors_convert() {
        let mut registry = AnimationRegistry::new();
        registry.add(|frame: &mut AnimationFrame<'_>| {
            let root = frame.scene().root();
            frame.scene_mut().remove(root)?;
            Ok(())
        });
        let report = registry.run(Duration::ZERO, &mut scene());
        assert_eq!(report.failed, 1);
    }
}

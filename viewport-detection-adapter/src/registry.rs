use viewport_detection::{Container, DetectorOptions, Error, Evaluation, Host};

use crate::key::{Entry, NodeKey, NodeMap};
use crate::{Controller, ScrollListener};

/// Controllers keyed by the root node they track.
///
/// Attaching a root that is already registered is a no-op returning the existing controller,
/// so setup code can run more than once without duplicating listeners or tracked elements.
/// Each controller keeps its own state; removing one never affects another.
pub struct Registry<N: NodeKey, L: ScrollListener<N>> {
    controllers: NodeMap<N, Controller<N, L>>,
}

impl<N: NodeKey, L: ScrollListener<N>> Default for Registry<N, L> {
    fn default() -> Self {
        Self {
            controllers: NodeMap::new(),
        }
    }
}

impl<N: NodeKey + Clone, L: ScrollListener<N>> Registry<N, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn is_attached(&self, root: &N) -> bool {
        self.controllers.contains_key(root)
    }

    /// Creates a controller for `root`, or returns the existing one.
    ///
    /// `options` and `listener` are only used when `root` is not registered yet.
    pub fn attach<H>(
        &mut self,
        host: &H,
        root: N,
        options: DetectorOptions<N>,
        listener: impl FnOnce() -> L,
    ) -> Result<&mut Controller<N, L>, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        match self.controllers.entry(root) {
            Entry::Occupied(entry) => {
                vtrace!("Registry::attach: already attached");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let controller = Controller::new(host, entry.key(), options, listener())?;
                vdebug!(
                    elements = controller.tracker().len(),
                    "Registry::attach"
                );
                Ok(entry.insert(controller))
            }
        }
    }

    pub fn get(&self, root: &N) -> Option<&Controller<N, L>> {
        self.controllers.get(root)
    }

    pub fn get_mut(&mut self, root: &N) -> Option<&mut Controller<N, L>> {
        self.controllers.get_mut(root)
    }

    /// Removes the controller for `root` and releases its listener.
    ///
    /// The returned controller keeps its final element state for inspection.
    pub fn detach(&mut self, root: &N) -> Option<Controller<N, L>> {
        let mut controller = self.controllers.remove(root)?;
        controller.detach();
        vdebug!(remaining = self.controllers.len(), "Registry::detach");
        Some(controller)
    }

    /// Forwards a scroll event from `container` to every controller tracking it.
    ///
    /// Returns the number of passes that ran. Every matching controller is visited even if
    /// one fails; the first host error is returned afterwards.
    pub fn on_scroll<H>(
        &mut self,
        host: &H,
        container: &Container<N>,
        now_ms: u64,
    ) -> Result<usize, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let mut passes = Passes::default();
        for controller in self.controllers.values_mut() {
            if controller.tracker().options().container != *container {
                continue;
            }
            passes.record(controller.on_scroll(host, now_ms));
        }
        passes.finish()
    }

    /// Advances every controller's debounce timer.
    ///
    /// Returns the number of trailing passes that ran. Every controller is visited even if one
    /// fails; the first host error is returned afterwards.
    pub fn tick<H>(&mut self, host: &H, now_ms: u64) -> Result<usize, Error>
    where
        H: Host<Node = N> + ?Sized,
    {
        let mut passes = Passes::default();
        for controller in self.controllers.values_mut() {
            passes.record(controller.tick(host, now_ms));
        }
        passes.finish()
    }

    /// The earliest armed debounce deadline across all controllers.
    pub fn next_deadline(&self) -> Option<u64> {
        self.controllers
            .values()
            .filter_map(Controller::next_deadline)
            .min()
    }
}

/// Pass count plus the first error seen while fanning out to controllers.
#[derive(Default)]
struct Passes {
    ran: usize,
    error: Option<Error>,
}

impl Passes {
    fn record(&mut self, res: Result<Option<Evaluation>, Error>) {
        match res {
            Ok(Some(_)) => self.ran += 1,
            Ok(None) => {}
            Err(err) => {
                vdebug!(error = %err, "controller pass failed");
                self.error.get_or_insert(err);
            }
        }
    }

    fn finish(self) -> Result<usize, Error> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.ran),
        }
    }
}

impl<N: NodeKey + core::fmt::Debug, L: ScrollListener<N> + core::fmt::Debug> core::fmt::Debug
    for Registry<N, L>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("controllers", &self.controllers)
            .finish()
    }
}

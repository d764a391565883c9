use viewport_detection::Container;

/// The host's scroll-event subscription for one container.
///
/// [`crate::Controller`] calls `attach` once when tracking starts and `detach` once when it
/// stops (completion, explicit detach, or drop). While attached, the host forwards scroll
/// events to the controller.
pub trait ScrollListener<N> {
    fn attach(&mut self, container: &Container<N>);
    fn detach(&mut self, container: &Container<N>);
}

/// No subscription to manage: the host forwards every scroll event unconditionally and the
/// controller filters them.
impl<N> ScrollListener<N> for () {
    fn attach(&mut self, _container: &Container<N>) {}
    fn detach(&mut self, _container: &Container<N>) {}
}

use super::Model;

/// Extra filtering or ordering applied by the caller to the relation query of each parent,
/// before the page window.
pub trait QueryDecorator<Q>: Send + Sync {
    fn decorate(&self, query: &mut Q, parent: &Model);
}

impl<Q, F> QueryDecorator<Q> for F
where
    F: Fn(&mut Q, &Model) + Send + Sync,
{
    fn decorate(&self, query: &mut Q, parent: &Model) {
        self(query, parent)
    }
}

/// Leaves the relation queries untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoration;

impl<Q> QueryDecorator<Q> for NoDecoration {
    fn decorate(&self, _query: &mut Q, _parent: &Model) {}
}

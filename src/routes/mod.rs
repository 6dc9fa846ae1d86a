//! Navigation seam and the protected-route guard.

pub mod guard;

pub use guard::{GuardDecision, RouteGuard};

/// Options for in-app navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

/// Browser navigation, abstracted so the guard and provider can be driven
/// without a page.
pub trait Navigator: Send + Sync {
    /// In-app navigation to a console path.
    fn navigate(&self, to: &str, options: NavigateOptions);

    /// Full-page navigation to an absolute URL; the current page unloads.
    fn assign(&self, url: &str);
}

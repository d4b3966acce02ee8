//! External identity-provider hook.
//!
//! When a session expires the client asks the identity provider (Google
//! sign-in on the web front end, a console hint in the CLI) to prompt the
//! user again. The hook is optional: a client built without one simply
//! skips that step.

/// Capability to re-trigger the identity provider's sign-in prompt.
///
/// Called on the thread that observed the authentication failure, so
/// implementations must return quickly and must not fail.
pub trait IdentityPrompt: Send + Sync {
    fn prompt(&self);
}

impl<F> IdentityPrompt for F
where
    F: Fn() + Send + Sync,
{
    fn prompt(&self) {
        self()
    }
}

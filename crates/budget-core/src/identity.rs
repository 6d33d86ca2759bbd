//! Owner identity.
//!
//! The rest of the crate only needs an opaque owner identifier and a way to
//! hear about sign-in/sign-out. How a user authenticates is out of scope.

use tokio::sync::watch;

/// Supplies the current owner and auth-state changes.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in owner, if any.
    fn current_owner(&self) -> Option<String>;

    /// Receiver that yields the owner after every auth-state change.
    fn subscribe(&self) -> watch::Receiver<Option<String>>;

    /// Owner to scope queries by; the empty string when signed out.
    fn owner_or_empty(&self) -> String {
        self.current_owner().unwrap_or_default()
    }
}

/// A fixed owner that never changes.
#[derive(Debug)]
pub struct StaticIdentity {
    state: watch::Sender<Option<String>>,
}

impl StaticIdentity {
    pub fn new(owner: Option<String>) -> Self {
        let owner = owner.filter(|o| !o.is_empty());
        Self {
            state: watch::channel(owner).0,
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.state.subscribe()
    }
}

/// A session that can be signed into and out of at runtime.
#[derive(Debug)]
pub struct SessionIdentity {
    state: watch::Sender<Option<String>>,
}

impl SessionIdentity {
    pub fn signed_out() -> Self {
        Self {
            state: watch::channel(None).0,
        }
    }

    pub fn sign_in(&self, owner: impl Into<String>) {
        let owner = owner.into();
        if owner.is_empty() {
            self.sign_out();
            return;
        }
        tracing::debug!("Signed in as {}", owner);
        self.state.send_replace(Some(owner));
    }

    pub fn sign_out(&self) {
        tracing::debug!("Signed out");
        self.state.send_replace(None);
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::signed_out()
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_owner(&self) -> Option<String> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity_treats_empty_as_signed_out() {
        assert_eq!(StaticIdentity::new(Some(String::new())).current_owner(), None);
        assert_eq!(
            StaticIdentity::new(Some("u1".to_string())).owner_or_empty(),
            "u1"
        );
        assert_eq!(StaticIdentity::new(None).owner_or_empty(), "");
    }

    #[tokio::test]
    async fn test_session_notifies_subscribers() {
        let session = SessionIdentity::signed_out();
        let mut rx = session.subscribe();

        session.sign_in("u1");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_deref(), Some("u1"));

        session.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
        assert_eq!(session.owner_or_empty(), "");
    }
}

//! Admin session guard.
//!
//! Auth events drive a small state machine per session token. Any event that carries
//! a user, except the initial restore, triggers the allow-list check raced against a
//! timeout. A denied, failed or timed-out check ends the session.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::gateway::Gateway;
use crate::models::AuthUser;

pub const TIMEOUT_REASON: &str = "Admin check timed out. Check your connection.";
pub const DENIED_REASON: &str = "Unauthorized: User not in admin_users table.";

/// Visible session state.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    SignedOut,
    CheckingAdmin { user: AuthUser },
    /// `verified` is false when admitted on the initial-session fast path.
    Admin { user: AuthUser, verified: bool },
    SignedOutForced { reason: String },
}

impl GuardState {
    pub fn name(&self) -> &'static str {
        match self {
            GuardState::SignedOut => "signedOut",
            GuardState::CheckingAdmin { .. } => "checkingAdmin",
            GuardState::Admin { .. } => "admin",
            GuardState::SignedOutForced { .. } => "signedOutForced",
        }
    }

    pub fn admin_user(&self) -> Option<&AuthUser> {
        match self {
            GuardState::Admin { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_signed_out(&self) -> bool {
        matches!(
            self,
            GuardState::SignedOut | GuardState::SignedOutForced { .. }
        )
    }
}

/// Session change notifications.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A stored session restored on page load.
    InitialSession(Option<AuthUser>),
    SignedIn(AuthUser),
    TokenRefreshed(AuthUser),
    SignedOut,
}

impl AuthEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AuthEvent::InitialSession(_) => "INITIAL_SESSION",
            AuthEvent::SignedIn(_) => "SIGNED_IN",
            AuthEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            AuthEvent::SignedOut => "SIGNED_OUT",
        }
    }
}

/// Result of racing the allow-list check against the timeout.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Confirmed,
    Denied,
    Failed(String),
    TimedOut,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    ShowAdmin { refresh: bool },
    CheckAdmin(AuthUser),
    ForceSignOut { reason: String },
    ShowSignedOut,
}

/// Transition on an auth event. Events replace whatever state came before.
pub fn on_event(event: &AuthEvent) -> (GuardState, Effect) {
    match event {
        AuthEvent::InitialSession(Some(user)) => (
            GuardState::Admin {
                user: user.clone(),
                verified: false,
            },
            Effect::ShowAdmin { refresh: true },
        ),
        AuthEvent::SignedIn(user) | AuthEvent::TokenRefreshed(user) => (
            GuardState::CheckingAdmin { user: user.clone() },
            Effect::CheckAdmin(user.clone()),
        ),
        AuthEvent::InitialSession(None) | AuthEvent::SignedOut => {
            (GuardState::SignedOut, Effect::ShowSignedOut)
        }
    }
}

/// Transition on a check outcome. Only a pending check can be resolved.
pub fn on_check(state: &GuardState, outcome: CheckOutcome) -> (GuardState, Effect) {
    let GuardState::CheckingAdmin { user } = state else {
        return (state.clone(), Effect::None);
    };
    let reason = match outcome {
        CheckOutcome::Confirmed => {
            return (
                GuardState::Admin {
                    user: user.clone(),
                    verified: true,
                },
                Effect::ShowAdmin { refresh: true },
            )
        }
        CheckOutcome::Denied => DENIED_REASON.to_string(),
        CheckOutcome::Failed(message) => message,
        CheckOutcome::TimedOut => TIMEOUT_REASON.to_string(),
    };
    (
        GuardState::SignedOutForced {
            reason: reason.clone(),
        },
        Effect::ForceSignOut { reason },
    )
}

/// Where a dispatched event left the session.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GuardState,
    /// The dashboard data should be reloaded.
    pub refresh: bool,
}

/// State machine driver for one session token.
pub struct SessionGuard {
    token: String,
    gateway: Gateway,
    timeout: Duration,
    state: RwLock<GuardState>,
    generation: AtomicU64,
    /// The in-flight check, tagged with the generation that started it.
    pending: Mutex<Option<(u64, AbortHandle)>>,
    activity: Mutex<Activity>,
}

#[derive(Debug, Clone, Copy)]
struct Activity {
    /// Last time the backend vouched for the token.
    validated: Instant,
    /// Last request or event for the token.
    used: Instant,
}

impl SessionGuard {
    pub fn new(token: String, gateway: Gateway, timeout: Duration) -> Self {
        Self {
            token,
            gateway,
            timeout,
            state: RwLock::new(GuardState::SignedOut),
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
            activity: Mutex::new(Activity {
                validated: Instant::now(),
                used: Instant::now(),
            }),
        }
    }

    pub async fn state(&self) -> GuardState {
        self.state.read().await.clone()
    }

    /// Apply an event and run the effects it requests.
    pub async fn handle(&self, event: AuthEvent) -> Transition {
        tracing::info!(event = event.name(), "Auth event");

        // Events come from the backend's own session reports
        self.mark_validated();

        let (next, mut effect) = on_event(&event);
        let generation = {
            let mut state = self.state.write().await;
            // A newer event supersedes any check still in flight
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.cancel_pending();
            *state = next;
            generation
        };

        loop {
            match effect {
                Effect::CheckAdmin(user) => {
                    let outcome = self.race_admin_check(&user, generation).await;
                    let follow = {
                        let mut state = self.state.write().await;
                        if self.generation.load(Ordering::SeqCst) != generation {
                            None
                        } else {
                            let (next, follow) = on_check(&state, outcome);
                            *state = next;
                            Some(follow)
                        }
                    };
                    match follow {
                        Some(follow) => effect = follow,
                        None => {
                            tracing::debug!("Discarding superseded admin check result");
                            return self.settled(false).await;
                        }
                    }
                }
                Effect::ForceSignOut { reason } => {
                    tracing::warn!(%reason, "Ending session");
                    self.force_sign_out().await;
                    return self.settled(false).await;
                }
                Effect::ShowAdmin { refresh } => {
                    if let Some(user) = self.state().await.admin_user() {
                        tracing::info!(user = %user.label(), "Admin authorized");
                    }
                    return self.settled(refresh).await;
                }
                Effect::ShowSignedOut | Effect::None => return self.settled(false).await,
            }
        }
    }

    async fn settled(&self, refresh: bool) -> Transition {
        Transition {
            state: self.state().await,
            refresh,
        }
    }

    /// Race the allow-list lookup against the timeout. The lookup runs as its own
    /// task and is aborted if the timer wins.
    async fn race_admin_check(&self, user: &AuthUser, generation: u64) -> CheckOutcome {
        let gateway = self.gateway.clone();
        let token = self.token.clone();
        let user_id = user.id.clone();
        let mut task =
            tokio::spawn(async move { gateway.check_admin_access(Some(&token), &user_id).await });

        if let Ok(mut pending) = self.pending.lock() {
            if self.generation.load(Ordering::SeqCst) == generation {
                *pending = Some((generation, task.abort_handle()));
            } else {
                // Superseded before it could be registered
                task.abort();
            }
        }

        let outcome = match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(true))) => CheckOutcome::Confirmed,
            Ok(Ok(Ok(false))) => CheckOutcome::Denied,
            Ok(Ok(Err(e))) => CheckOutcome::Failed(e.message()),
            Ok(Err(e)) => CheckOutcome::Failed(format!("Admin check did not complete: {}", e)),
            Err(_) => {
                task.abort();
                CheckOutcome::TimedOut
            }
        };

        // A newer check may already own the slot
        if let Ok(mut pending) = self.pending.lock() {
            if matches!(pending.as_ref(), Some((owner, _)) if *owner == generation) {
                pending.take();
            }
        }
        outcome
    }

    fn cancel_pending(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some((_, handle)) = pending.take() {
                handle.abort();
            }
        }
    }

    fn activity(&self) -> Option<Activity> {
        self.activity.lock().ok().map(|a| *a)
    }

    fn mark_validated(&self) {
        if let Ok(mut activity) = self.activity.lock() {
            let now = Instant::now();
            activity.validated = now;
            activity.used = now;
        }
    }

    fn mark_used(&self) {
        if let Ok(mut activity) = self.activity.lock() {
            activity.used = Instant::now();
        }
    }

    /// Clear the remote session, then every local trace, whatever the remote says.
    async fn force_sign_out(&self) {
        if let Err(e) = self.gateway.sign_out(&self.token).await {
            tracing::warn!("Sign-out request failed, forcing local cleanup: {}", e);
        }
        if let Err(e) = self.gateway.clear_auth_session().await {
            tracing::warn!("Failed to clear local auth session: {}", e);
        }
    }
}

/// How long admitted sessions are trusted without asking the backend again.
#[derive(Debug, Clone, Copy)]
pub struct SessionExpiry {
    /// An admitted token older than this is re-validated on its next request.
    pub revalidate_after: Duration,
    /// A token unused for this long is dropped.
    pub idle_ttl: Duration,
}

impl Default for SessionExpiry {
    fn default() -> Self {
        Self {
            revalidate_after: Duration::from_secs(300),
            idle_ttl: Duration::from_secs(12 * 60 * 60),
        }
    }
}

/// All live session guards, keyed by access token.
pub struct SessionRegistry {
    gateway: Gateway,
    timeout: Duration,
    expiry: SessionExpiry,
    sessions: RwLock<HashMap<String, Arc<SessionGuard>>>,
}

impl SessionRegistry {
    pub fn new(gateway: Gateway, timeout: Duration, expiry: SessionExpiry) -> Self {
        Self {
            gateway,
            timeout,
            expiry,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Route an event to the token's guard. Signed-out sessions are forgotten.
    pub async fn dispatch(&self, token: &str, event: AuthEvent) -> Transition {
        let guard = {
            let mut sessions = self.sessions.write().await;
            let idle_ttl = self.expiry.idle_ttl;
            let before = sessions.len();
            sessions.retain(|key, guard| {
                key == token || guard.activity().is_some_and(|a| a.used.elapsed() < idle_ttl)
            });
            if sessions.len() < before {
                tracing::debug!("Dropped {} idle sessions", before - sessions.len());
            }
            sessions
                .entry(token.to_string())
                .or_insert_with(|| {
                    Arc::new(SessionGuard::new(
                        token.to_string(),
                        self.gateway.clone(),
                        self.timeout,
                    ))
                })
                .clone()
        };

        let transition = guard.handle(event).await;
        if transition.state.is_signed_out() {
            self.sessions.write().await.remove(token);
        }
        transition
    }

    /// The admin behind `token`, if that session is currently admitted.
    ///
    /// A token the backend has not vouched for recently is looked up again. One the
    /// backend no longer knows is signed out and forgotten.
    pub async fn admin_user(&self, token: &str) -> Option<AuthUser> {
        let guard = self.sessions.read().await.get(token).cloned()?;
        let user = guard.state().await.admin_user().cloned()?;
        guard.mark_used();

        let stale = guard
            .activity()
            .is_some_and(|a| a.validated.elapsed() >= self.expiry.revalidate_after);
        if !stale {
            return Some(user);
        }

        match self.gateway.get_session(token).await {
            Ok(Some(_)) => {
                guard.mark_validated();
                Some(user)
            }
            Ok(None) => {
                tracing::info!(user = %user.label(), "Session expired");
                self.dispatch(token, AuthEvent::SignedOut).await;
                None
            }
            Err(e) => {
                tracing::warn!("Session lookup failed, keeping session: {}", e);
                Some(user)
            }
        }
    }

    /// User-initiated sign-out. Local traces are cleared even if the remote call fails.
    pub async fn sign_out(&self, token: &str) -> Transition {
        if let Err(e) = self.gateway.sign_out(token).await {
            tracing::warn!("Sign-out request failed, forcing local cleanup: {}", e);
        }
        if let Err(e) = self.gateway.clear_auth_session().await {
            tracing::warn!("Failed to clear local auth session: {}", e);
        }
        self.dispatch(token, AuthEvent::SignedOut).await
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::MockBackend;

    fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.to_string(),
            email: Some(format!("{}@zentura.in", id)),
        }
    }

    fn registry(backend: &Arc<MockBackend>) -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(
            Gateway::new(backend.clone()),
            Duration::from_millis(6000),
            SessionExpiry::default(),
        ))
    }

    #[test]
    fn test_check_outcome_only_resolves_pending_check() {
        let (state, effect) = on_check(&GuardState::SignedOut, CheckOutcome::Confirmed);
        assert_eq!(state, GuardState::SignedOut);
        assert_eq!(effect, Effect::None);

        let checking = GuardState::CheckingAdmin { user: user("a") };
        let (state, effect) = on_check(&checking, CheckOutcome::TimedOut);
        assert_eq!(
            state,
            GuardState::SignedOutForced {
                reason: TIMEOUT_REASON.to_string()
            }
        );
        assert!(matches!(effect, Effect::ForceSignOut { .. }));
    }

    #[tokio::test]
    async fn test_initial_session_fast_path_skips_check() {
        let backend = Arc::new(MockBackend::new());
        let sessions = registry(&backend);

        let t = sessions
            .dispatch("tok", AuthEvent::InitialSession(Some(user("a"))))
            .await;
        assert!(t.refresh);
        assert_eq!(
            t.state,
            GuardState::Admin {
                user: user("a"),
                verified: false
            }
        );
        assert_eq!(backend.admin_checks_started.load(Ordering::SeqCst), 0);
        assert!(sessions.admin_user("tok").await.is_some());
    }

    #[tokio::test]
    async fn test_confirmed_admin_is_admitted() {
        let backend = Arc::new(MockBackend::new());
        backend.allow_admin("a");
        let sessions = registry(&backend);

        let t = sessions.dispatch("tok", AuthEvent::SignedIn(user("a"))).await;
        assert_eq!(t.state.name(), "admin");
        assert!(t.refresh);
        assert_eq!(sessions.admin_user("tok").await, Some(user("a")));

        // A refreshed token is checked again
        let t = sessions
            .dispatch("tok", AuthEvent::TokenRefreshed(user("a")))
            .await;
        assert_eq!(t.state.name(), "admin");
        assert_eq!(backend.admin_checks_started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_admin_is_forced_out() {
        let backend = Arc::new(MockBackend::new());
        let sessions = registry(&backend);

        let t = sessions.dispatch("tok", AuthEvent::SignedIn(user("b"))).await;
        assert_eq!(
            t.state,
            GuardState::SignedOutForced {
                reason: DENIED_REASON.to_string()
            }
        );
        assert_eq!(backend.sign_outs.load(Ordering::SeqCst), 1);
        assert_eq!(backend.local_clears.load(Ordering::SeqCst), 1);
        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_times_out_and_is_cancelled() {
        let backend = Arc::new(MockBackend::new());
        backend.allow_admin("a");
        backend.set_admin_check_delay(Duration::from_secs(10));
        let sessions = registry(&backend);

        let t = sessions.dispatch("tok", AuthEvent::SignedIn(user("a"))).await;
        assert_eq!(
            t.state,
            GuardState::SignedOutForced {
                reason: TIMEOUT_REASON.to_string()
            }
        );
        assert_eq!(backend.sign_outs.load(Ordering::SeqCst), 1);
        assert_eq!(backend.local_clears.load(Ordering::SeqCst), 1);
        assert!(sessions.admin_user("tok").await.is_none());
        assert_eq!(sessions.len().await, 0);

        // The losing lookup was aborted, not left running
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.admin_checks_started.load(Ordering::SeqCst), 1);
        assert_eq!(backend.admin_checks_finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_check_is_discarded() {
        let backend = Arc::new(MockBackend::new());
        backend.set_admin_check_delay(Duration::from_secs(3));
        let sessions = registry(&backend);

        let pending = {
            let sessions = sessions.clone();
            tokio::spawn(async move { sessions.dispatch("tok", AuthEvent::SignedIn(user("b"))).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(backend.admin_checks_started.load(Ordering::SeqCst), 1);

        let t = sessions.dispatch("tok", AuthEvent::SignedOut).await;
        assert_eq!(t.state, GuardState::SignedOut);

        let stale = pending.await.unwrap();
        assert_eq!(stale.state, GuardState::SignedOut);
        // The denied result never arrived, so no forced sign-out happened
        assert_eq!(backend.sign_outs.load(Ordering::SeqCst), 0);
        assert_eq!(backend.admin_checks_finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_user_sign_out_clears_everything() {
        let backend = Arc::new(MockBackend::new());
        let sessions = registry(&backend);
        sessions
            .dispatch("tok", AuthEvent::InitialSession(Some(user("a"))))
            .await;

        let t = sessions.sign_out("tok").await;
        assert_eq!(t.state, GuardState::SignedOut);
        assert_eq!(backend.sign_outs.load(Ordering::SeqCst), 1);
        assert_eq!(backend.local_clears.load(Ordering::SeqCst), 1);
        assert!(sessions.admin_user("tok").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_check_leaves_newer_check_cancellable() {
        let backend = Arc::new(MockBackend::new());
        backend.allow_admin("a");
        backend.set_admin_check_delay(Duration::from_secs(3));
        let sessions = registry(&backend);

        let first = {
            let sessions = sessions.clone();
            tokio::spawn(async move { sessions.dispatch("tok", AuthEvent::SignedIn(user("a"))).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        let second = {
            let sessions = sessions.clone();
            tokio::spawn(async move {
                sessions
                    .dispatch("tok", AuthEvent::TokenRefreshed(user("a")))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.admin_checks_started.load(Ordering::SeqCst), 2);

        // The first check settled in between; signing out must still stop the second
        let t = sessions.dispatch("tok", AuthEvent::SignedOut).await;
        assert_eq!(t.state, GuardState::SignedOut);
        first.await.unwrap();
        second.await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.admin_checks_finished.load(Ordering::SeqCst), 0);
        assert!(sessions.admin_user("tok").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dead_token_is_dropped_on_revalidation() {
        let backend = Arc::new(MockBackend::new());
        let sessions = registry(&backend);

        // The mock backend only recognises "token-" tokens
        sessions
            .dispatch("token-a", AuthEvent::InitialSession(Some(user("a"))))
            .await;
        sessions
            .dispatch("revoked", AuthEvent::InitialSession(Some(user("b"))))
            .await;
        assert!(sessions.admin_user("revoked").await.is_some());

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(sessions.admin_user("token-a").await, Some(user("a")));
        assert!(sessions.admin_user("revoked").await.is_none());
        assert_eq!(sessions.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_swept() {
        let backend = Arc::new(MockBackend::new());
        let sessions = registry(&backend);
        for token in ["token-a", "token-b"] {
            sessions
                .dispatch(token, AuthEvent::InitialSession(Some(user("a"))))
                .await;
        }

        tokio::time::advance(Duration::from_secs(6 * 60 * 60)).await;
        assert!(sessions.admin_user("token-b").await.is_some());
        tokio::time::advance(Duration::from_secs(7 * 60 * 60)).await;

        sessions
            .dispatch("token-c", AuthEvent::InitialSession(Some(user("c"))))
            .await;
        assert_eq!(sessions.len().await, 2);
        assert!(sessions.admin_user("token-a").await.is_none());
        assert!(sessions.admin_user("token-b").await.is_some());
    }
}

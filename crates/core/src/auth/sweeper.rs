//! Periodic removal of expired sessions

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::SessionManager;
use crate::storage::{SessionRepository, UserRepository};

/// Sweep expired sessions every `every` until the handle is aborted.
///
/// Must be called from within a tokio runtime. The sweep itself is blocking
/// SQLite work and runs on the blocking pool.
pub fn spawn_session_sweeper<S>(manager: Arc<SessionManager<S>>, every: Duration) -> JoinHandle<()>
where
    S: UserRepository + SessionRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let manager = Arc::clone(&manager);
            match tokio::task::spawn_blocking(move || manager.sweep_expired()).await {
                Ok(Ok(0)) => debug!("No expired sessions"),
                Ok(Ok(removed)) => info!(removed, "Swept expired sessions"),
                Ok(Err(e)) => error!(error = %e, "Session sweep failed"),
                Err(e) => error!(error = %e, "Session sweep task panicked"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::AuthConfig;
    use crate::models::ClientInfo;
    use crate::storage::Database;

    #[tokio::test]
    async fn test_sweeper_removes_expired_sessions() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::starting_now());
        let manager = Arc::new(SessionManager::new(
            db.clone(),
            clock.clone(),
            AuthConfig::default(),
        ));
        let (_, session) = manager
            .register("sweepme", "Secret123!", "Sweep Me", ClientInfo::default())
            .unwrap();
        clock.advance(chrono::Duration::days(8));

        let handle = spawn_session_sweeper(manager, Duration::from_millis(10));
        let mut gone = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if db.find_session_by_token(&session.token).unwrap().is_none() {
                gone = true;
                break;
            }
        }
        handle.abort();
        assert!(gone, "expired session was never swept");
    }
}

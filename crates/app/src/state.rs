//! Application state management

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ledger_core::config::default_data_dir;
use ledger_core::{AuthEvent, Config, Database, Ledger, SystemClock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const DATABASE_FILE: &str = "ledger.db";
const SESSION_FILE: &str = "session";

/// Everything a command needs: the ledger and the stored session token
pub struct AppState {
    ledger: Ledger<Database>,
    session_path: PathBuf,
    events: broadcast::Receiver<AuthEvent>,
}

impl AppState {
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> ledger_core::Result<Self> {
        let config = match config_path {
            Some(path) => Config::load(path)?,
            None => Config::load(&Config::default_path()?)?,
        };
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&data_dir)?;

        let db_path = config
            .storage
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE));
        let db = Arc::new(Database::open(&db_path, &config.storage)?);
        info!(path = %db_path.display(), "Opened database");

        Ok(Self::with_database(db, &config, data_dir))
    }

    pub fn with_database(db: Arc<Database>, config: &Config, data_dir: PathBuf) -> Self {
        let ledger = Ledger::new(db, Arc::new(SystemClock), config);
        let events = ledger.subscribe();
        Self {
            ledger,
            session_path: data_dir.join(SESSION_FILE),
            events,
        }
    }

    pub fn ledger(&self) -> &Ledger<Database> {
        &self.ledger
    }

    /// Stored token, or `SessionExpired` if nobody is signed in
    pub fn token(&self) -> ledger_core::Result<String> {
        match fs::read_to_string(&self.session_path) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Ok(_) => Err(ledger_core::Error::SessionExpired),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ledger_core::Error::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the token, readable by the owner only
    pub fn store_token(&self, token: &str) -> ledger_core::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.session_path)?;
        file.write_all(token.as_bytes())?;
        Ok(())
    }

    /// Store a freshly issued token, ending the session it replaces.
    ///
    /// The revocation's `LoggedOut` event is consumed here so that
    /// `process_events` does not remove the new token.
    pub fn replace_token(&mut self, token: &str) -> ledger_core::Result<()> {
        if let Ok(previous) = self.token() {
            if previous != token {
                if let Err(e) = self.ledger.logout(&previous) {
                    warn!(error = %e, "Could not end the previous session");
                }
            }
        }
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "Auth event");
        }
        self.store_token(token)
    }

    pub fn clear_token(&self) -> ledger_core::Result<()> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// React to auth events raised while a command ran.
    ///
    /// An expired or ended session means the stored token is dead.
    pub fn process_events(&mut self) -> ledger_core::Result<()> {
        let mut forget_token = false;
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "Auth event");
            match event {
                AuthEvent::SessionExpired { .. }
                | AuthEvent::LoggedOut { .. }
                | AuthEvent::AccountDeleted { .. } => forget_token = true,
                AuthEvent::LoggedIn { .. } | AuthEvent::PasswordChanged { .. } => {}
            }
        }
        if forget_token {
            self.clear_token()?;
        }
        Ok(())
    }
}

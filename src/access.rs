//! Persistent authorization for the target directory.
//!
//! A sandboxed app may only write outside its container into directories the
//! user picked. The grant is kept as an opaque token (a security-scoped
//! bookmark on macOS) and revalidated before every use:
//!
//! ```text
//! stored token ──resolve──► fresh  ──────────────────────► AuthorizedDirectory
//!      │                    stale  ──re-create + persist──► AuthorizedDirectory
//!      │                    error ─┐
//!      └── none ───────────────────┴─► prompt ──► create + persist
//!                                        └─ cancel ──► AuthorizationDenied
//! ```
//!
//! Filesystem work against the directory happens inside a [`ScopedAccess`]
//! guard, which ends the access session when dropped.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::AccessError;

/// Storage for the single authorization token.
pub trait TokenStore {
    fn load_token(&self) -> Option<Vec<u8>>;
    fn store_token(&self, token: &[u8]) -> Result<(), AccessError>;
}

/// Result of resolving a token back into a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedToken {
    pub path: PathBuf,
    /// The token still works but should be re-created.
    pub stale: bool,
}

/// Creates and resolves directory tokens and opens access sessions.
pub trait Bookmarks {
    fn create_token(&self, dir: &Path) -> Result<Vec<u8>, AccessError>;
    fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken, AccessError>;
    /// Begin an access session. Returns false if the system refused.
    fn start_access(&self, dir: &AuthorizedDirectory) -> bool;
    fn stop_access(&self, dir: &AuthorizedDirectory);
}

/// Asks the user to pick a directory.
pub trait DirectoryPrompt {
    /// `None` when the user cancelled.
    fn choose_directory(&self, default: &Path) -> Option<PathBuf>;
}

/// A directory the user granted access to, with the token backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedDirectory {
    path: PathBuf,
    token: Vec<u8>,
}

impl AuthorizedDirectory {
    pub fn new(path: PathBuf, token: Vec<u8>) -> Self {
        Self { path, token }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> &[u8] {
        &self.token
    }
}

/// Authorizes the target directory through the injected seams.
pub struct DirectoryAccess<S, B, P> {
    store: S,
    bookmarks: B,
    prompt: P,
    default_dir: PathBuf,
}

impl<S: TokenStore, B: Bookmarks, P: DirectoryPrompt> DirectoryAccess<S, B, P> {
    pub fn new(store: S, bookmarks: B, prompt: P, default_dir: PathBuf) -> Self {
        Self {
            store,
            bookmarks,
            prompt,
            default_dir,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bookmarks(&self) -> &B {
        &self.bookmarks
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Returns the authorized directory, prompting only when no usable token
    /// is stored.
    pub fn authorize(&self) -> Result<AuthorizedDirectory, AccessError> {
        if let Some(dir) = self.restore() {
            return Ok(dir);
        }
        self.prompt_and_persist()
    }

    /// Begin a scoped access session for `dir`.
    pub fn session<'a>(&'a self, dir: &'a AuthorizedDirectory) -> ScopedAccess<'a, B> {
        ScopedAccess::begin(&self.bookmarks, dir)
    }

    fn restore(&self) -> Option<AuthorizedDirectory> {
        let token = self.store.load_token()?;
        let resolved = match self.bookmarks.resolve_token(&token) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Stored directory token unusable, prompting again");
                return None;
            }
        };

        if !resolved.stale {
            debug!(path = %resolved.path.display(), "Restored authorized directory");
            return Some(AuthorizedDirectory::new(resolved.path, token));
        }

        info!(path = %resolved.path.display(), "Directory token is stale, refreshing");
        match self.bookmarks.create_token(&resolved.path) {
            Ok(fresh) => {
                if let Err(e) = self.store.store_token(&fresh) {
                    warn!(error = %e, "Could not persist refreshed directory token");
                }
                Some(AuthorizedDirectory::new(resolved.path, fresh))
            }
            Err(e) => {
                warn!(error = %e, "Could not refresh stale directory token");
                Some(AuthorizedDirectory::new(resolved.path, token))
            }
        }
    }

    fn prompt_and_persist(&self) -> Result<AuthorizedDirectory, AccessError> {
        let Some(path) = self.prompt.choose_directory(&self.default_dir) else {
            info!("Directory prompt cancelled");
            return Err(AccessError::AuthorizationDenied);
        };
        let token = self.bookmarks.create_token(&path)?;
        self.store.store_token(&token)?;
        info!(path = %path.display(), "Authorized new directory");
        Ok(AuthorizedDirectory::new(path, token))
    }
}

/// An open access session; ends when dropped.
pub struct ScopedAccess<'a, B: Bookmarks> {
    bookmarks: &'a B,
    dir: &'a AuthorizedDirectory,
    active: bool,
}

impl<'a, B: Bookmarks> ScopedAccess<'a, B> {
    fn begin(bookmarks: &'a B, dir: &'a AuthorizedDirectory) -> Self {
        let active = bookmarks.start_access(dir);
        if !active {
            warn!(path = %dir.path().display(), "System refused scoped directory access");
        }
        Self {
            bookmarks,
            dir,
            active,
        }
    }

    /// Whether the system granted the session.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl<B: Bookmarks> Drop for ScopedAccess<'_, B> {
    fn drop(&mut self) {
        if self.active {
            self.bookmarks.stop_access(self.dir);
        }
    }
}

// ============================================================================
// Unsandboxed implementations
// ============================================================================

/// Token store held in memory.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<Vec<u8>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: Vec<u8>) -> Self {
        Self {
            token: RefCell::new(Some(token)),
        }
    }

    pub fn current(&self) -> Option<Vec<u8>> {
        self.token.borrow().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load_token(&self) -> Option<Vec<u8>> {
        self.current()
    }

    fn store_token(&self, token: &[u8]) -> Result<(), AccessError> {
        *self.token.borrow_mut() = Some(token.to_vec());
        Ok(())
    }
}

/// Tokens that are the UTF-8 directory path itself.
///
/// Used where no sandbox applies. A token whose directory no longer exists
/// fails to resolve. Open sessions are counted.
#[derive(Debug, Default)]
pub struct PathBookmarks {
    open_sessions: Cell<usize>,
    sessions_started: Cell<usize>,
}

impl PathBookmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.get()
    }

    pub fn sessions_started(&self) -> usize {
        self.sessions_started.get()
    }
}

impl Bookmarks for PathBookmarks {
    fn create_token(&self, dir: &Path) -> Result<Vec<u8>, AccessError> {
        dir.to_str()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| AccessError::Bookmark {
                path: dir.to_path_buf(),
                message: "path is not valid UTF-8".to_string(),
            })
    }

    fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken, AccessError> {
        let path = std::str::from_utf8(token)
            .map(PathBuf::from)
            .map_err(|e| AccessError::Resolve(e.to_string()))?;
        if !path.is_dir() {
            return Err(AccessError::Resolve(format!(
                "{} is not a directory",
                path.display()
            )));
        }
        Ok(ResolvedToken { path, stale: false })
    }

    fn start_access(&self, _dir: &AuthorizedDirectory) -> bool {
        self.open_sessions.set(self.open_sessions.get() + 1);
        self.sessions_started.set(self.sessions_started.get() + 1);
        true
    }

    fn stop_access(&self, _dir: &AuthorizedDirectory) {
        self.open_sessions.set(self.open_sessions.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Prompt that answers from a queue and counts calls.
    struct QueuedPrompt {
        answers: RefCell<Vec<Option<PathBuf>>>,
        calls: Cell<usize>,
        last_default: RefCell<Option<PathBuf>>,
    }

    impl QueuedPrompt {
        fn new(answers: Vec<Option<PathBuf>>) -> Self {
            Self {
                answers: RefCell::new(answers),
                calls: Cell::new(0),
                last_default: RefCell::new(None),
            }
        }
    }

    impl DirectoryPrompt for &QueuedPrompt {
        fn choose_directory(&self, default: &Path) -> Option<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            *self.last_default.borrow_mut() = Some(default.to_path_buf());
            let mut answers = self.answers.borrow_mut();
            if answers.is_empty() {
                None
            } else {
                answers.remove(0)
            }
        }
    }

    /// Bookmarks that report every resolution as stale.
    #[derive(Default)]
    struct StaleBookmarks {
        inner: PathBookmarks,
        created: Cell<usize>,
    }

    impl Bookmarks for StaleBookmarks {
        fn create_token(&self, dir: &Path) -> Result<Vec<u8>, AccessError> {
            self.created.set(self.created.get() + 1);
            let mut token = self.inner.create_token(dir)?;
            token.extend_from_slice(b"#fresh");
            Ok(token)
        }

        fn resolve_token(&self, token: &[u8]) -> Result<ResolvedToken, AccessError> {
            let text = std::str::from_utf8(token).unwrap();
            let path = text.trim_end_matches("#fresh");
            Ok(ResolvedToken {
                path: PathBuf::from(path),
                stale: true,
            })
        }

        fn start_access(&self, dir: &AuthorizedDirectory) -> bool {
            self.inner.start_access(dir)
        }

        fn stop_access(&self, dir: &AuthorizedDirectory) {
            self.inner.stop_access(dir)
        }
    }

    /// Store holding a fixed token that refuses every write.
    struct ReadOnlyStore {
        token: Vec<u8>,
        writes: Cell<usize>,
    }

    impl TokenStore for ReadOnlyStore {
        fn load_token(&self) -> Option<Vec<u8>> {
            Some(self.token.clone())
        }

        fn store_token(&self, _token: &[u8]) -> Result<(), AccessError> {
            self.writes.set(self.writes.get() + 1);
            Err(AccessError::Store("defaults unavailable".into()))
        }
    }

    #[test]
    fn test_prompt_then_restore_without_prompt() {
        let target = tempdir().unwrap();
        let prompt = QueuedPrompt::new(vec![Some(target.path().to_path_buf())]);
        let access = DirectoryAccess::new(
            MemoryTokenStore::new(),
            PathBookmarks::new(),
            &prompt,
            PathBuf::from("/default"),
        );

        let first = access.authorize().unwrap();
        assert_eq!(first.path(), target.path());
        assert_eq!(prompt.calls.get(), 1);
        assert_eq!(
            prompt.last_default.borrow().as_deref(),
            Some(Path::new("/default"))
        );

        let second = access.authorize().unwrap();
        assert_eq!(second.path(), target.path());
        assert_eq!(prompt.calls.get(), 1);
    }

    #[test]
    fn test_cancel_is_denied_and_stores_nothing() {
        let prompt = QueuedPrompt::new(vec![None]);
        let access = DirectoryAccess::new(
            MemoryTokenStore::new(),
            PathBookmarks::new(),
            &prompt,
            PathBuf::from("/default"),
        );

        let err = access.authorize().unwrap_err();
        assert!(matches!(err, AccessError::AuthorizationDenied));
        assert!(access.store().current().is_none());
    }

    #[test]
    fn test_unresolvable_token_prompts_again() {
        let target = tempdir().unwrap();
        let prompt = QueuedPrompt::new(vec![Some(target.path().to_path_buf())]);
        let access = DirectoryAccess::new(
            MemoryTokenStore::with_token(b"/definitely/not/here".to_vec()),
            PathBookmarks::new(),
            &prompt,
            PathBuf::from("/default"),
        );

        let dir = access.authorize().unwrap();
        assert_eq!(dir.path(), target.path());
        assert_eq!(prompt.calls.get(), 1);
        assert_eq!(
            access.store().current().unwrap(),
            target.path().to_str().unwrap().as_bytes()
        );
    }

    #[test]
    fn test_stale_token_is_refreshed_and_persisted() {
        let target = tempdir().unwrap();
        let old = target.path().to_str().unwrap().as_bytes().to_vec();
        let prompt = QueuedPrompt::new(vec![]);
        let access = DirectoryAccess::new(
            MemoryTokenStore::with_token(old.clone()),
            StaleBookmarks::default(),
            &prompt,
            PathBuf::from("/default"),
        );

        let dir = access.authorize().unwrap();
        assert_eq!(dir.path(), target.path());
        assert_eq!(prompt.calls.get(), 0);
        assert_eq!(access.bookmarks().created.get(), 1);

        let stored = access.store().current().unwrap();
        assert_ne!(stored, old);
        assert!(stored.ends_with(b"#fresh"));
        assert_eq!(dir.token(), stored.as_slice());
    }

    #[test]
    fn test_stale_token_used_when_refresh_cannot_be_persisted() {
        let target = tempdir().unwrap();
        let old = target.path().to_str().unwrap().as_bytes().to_vec();
        let prompt = QueuedPrompt::new(vec![]);
        let access = DirectoryAccess::new(
            ReadOnlyStore {
                token: old.clone(),
                writes: Cell::new(0),
            },
            StaleBookmarks::default(),
            &prompt,
            PathBuf::from("/default"),
        );

        let dir = access.authorize().unwrap();

        assert_eq!(dir.path(), target.path());
        assert_eq!(prompt.calls.get(), 0);
        assert_eq!(access.store().writes.get(), 1);
        assert!(dir.token().ends_with(b"#fresh"));
        assert_ne!(dir.token(), old.as_slice());
    }

    #[test]
    fn test_session_released_on_drop() {
        let target = tempdir().unwrap();
        let prompt = QueuedPrompt::new(vec![Some(target.path().to_path_buf())]);
        let access = DirectoryAccess::new(
            MemoryTokenStore::new(),
            PathBookmarks::new(),
            &prompt,
            PathBuf::from("/default"),
        );
        let dir = access.authorize().unwrap();

        {
            let session = access.session(&dir);
            assert!(session.is_active());
            assert_eq!(session.path(), target.path());
            assert_eq!(access.bookmarks().open_sessions(), 1);
        }
        assert_eq!(access.bookmarks().open_sessions(), 0);
        assert_eq!(access.bookmarks().sessions_started(), 1);
    }
}

//! # App State
//!
//! The single writable source of UI truth: selected tab, routing, session flags and the
//! adopter's swipe sets. It lives in an [`AppStore`] (a `tokio::sync::watch` channel), so
//! any number of observers can follow it while interactors write to it.
//!
//! Writes go through typed key paths ([`StatePath`]) or a whole-state closure. Nothing is
//! persisted; the session part is rebuilt from the adopter row on sign-in.

use crate::model::IdSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    Magazine,
    #[default]
    Discover,
    Profile,
}

/// A modal presented over the current tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sheet {
    SignIn,
    Preferences,
    Matches,
    Chat { match_id: Uuid },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Routing {
    pub sheet: Option<Sheet>,
    pub selected_dog: Option<Uuid>,
    /// Slug of the open Magazine article.
    pub selected_article: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub current_adopter_id: Option<Uuid>,
}

/// Swipe outcomes. Mutually exclusive by convention only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub liked: IdSet,
    pub disliked: IdSet,
    pub matched: IdSet,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub selected_tab: Tab,
    pub routing: Routing,
    pub session: SessionState,
    pub user_data: UserData,
}

/// A typed path to one writable field of [`AppState`].
pub struct StatePath<V> {
    pub name: &'static str,
    read: fn(&AppState) -> &V,
    write: fn(&mut AppState) -> &mut V,
}

impl<V> Clone for StatePath<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for StatePath<V> {}

impl<V> fmt::Debug for StatePath<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl<V> StatePath<V> {
    pub fn get<'a>(&self, state: &'a AppState) -> &'a V {
        (self.read)(state)
    }

    pub fn get_mut<'a>(&self, state: &'a mut AppState) -> &'a mut V {
        (self.write)(state)
    }
}

/// Every writable key path.
pub mod path {
    use super::{Sheet, StatePath, Tab};
    use crate::model::IdSet;
    use uuid::Uuid;

    pub const SELECTED_TAB: StatePath<Tab> = StatePath {
        name: "selected_tab",
        read: |s| &s.selected_tab,
        write: |s| &mut s.selected_tab,
    };
    pub const SHEET: StatePath<Option<Sheet>> = StatePath {
        name: "routing.sheet",
        read: |s| &s.routing.sheet,
        write: |s| &mut s.routing.sheet,
    };
    pub const SELECTED_DOG: StatePath<Option<Uuid>> = StatePath {
        name: "routing.selected_dog",
        read: |s| &s.routing.selected_dog,
        write: |s| &mut s.routing.selected_dog,
    };
    pub const SELECTED_ARTICLE: StatePath<Option<String>> = StatePath {
        name: "routing.selected_article",
        read: |s| &s.routing.selected_article,
        write: |s| &mut s.routing.selected_article,
    };
    pub const IS_AUTHENTICATED: StatePath<bool> = StatePath {
        name: "session.is_authenticated",
        read: |s| &s.session.is_authenticated,
        write: |s| &mut s.session.is_authenticated,
    };
    pub const CURRENT_ADOPTER_ID: StatePath<Option<Uuid>> = StatePath {
        name: "session.current_adopter_id",
        read: |s| &s.session.current_adopter_id,
        write: |s| &mut s.session.current_adopter_id,
    };
    pub const LIKED: StatePath<IdSet> = StatePath {
        name: "user_data.liked",
        read: |s| &s.user_data.liked,
        write: |s| &mut s.user_data.liked,
    };
    pub const DISLIKED: StatePath<IdSet> = StatePath {
        name: "user_data.disliked",
        read: |s| &s.user_data.disliked,
        write: |s| &mut s.user_data.disliked,
    };
    pub const MATCHED: StatePath<IdSet> = StatePath {
        name: "user_data.matched",
        read: |s| &s.user_data.matched,
        write: |s| &mut s.user_data.matched,
    };
}

/// Shared, observable holder of [`AppState`]. Clones refer to the same state.
#[derive(Clone)]
pub struct AppStore {
    sender: Arc<watch::Sender<AppState>>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl AppStore {
    pub fn new(initial: AppState) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn snapshot(&self) -> AppState {
        self.sender.borrow().clone()
    }

    pub fn get<V: Clone>(&self, path: StatePath<V>) -> V {
        path.get(&self.sender.borrow()).clone()
    }

    /// Observers are woken on every write that changes the state.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.sender.subscribe()
    }

    /// Writes `value` at `path`. Observers are not woken if the value is unchanged.
    pub fn set<V: PartialEq>(&self, path: StatePath<V>, value: V) {
        let changed = self.sender.send_if_modified(|state| {
            let slot = path.get_mut(state);
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        });
        debug!(path = path.name, changed, "State write");
    }

    /// Applies several writes as one change.
    pub fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.sender.send_modify(f);
        debug!("State update");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_through_paths() {
        let store = AppStore::default();
        let dog = Uuid::new_v4();

        store.set(path::SELECTED_TAB, Tab::Profile);
        store.set(path::LIKED, [dog].into_iter().collect());

        assert_eq!(store.get(path::SELECTED_TAB), Tab::Profile);
        assert!(store.snapshot().user_data.liked.contains(&dog));
        assert!(store.get(path::DISLIKED).is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_write_does_not_notify() {
        let store = AppStore::default();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.set(path::IS_AUTHENTICATED, false);
        assert!(!rx.has_changed().unwrap());

        store.set(path::IS_AUTHENTICATED, true);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().session.is_authenticated);
    }

    #[test]
    fn test_update_applies_all_writes() {
        let store = AppStore::default();
        let adopter = Uuid::new_v4();
        store.update(|state| {
            state.session.is_authenticated = true;
            state.session.current_adopter_id = Some(adopter);
            state.routing.sheet = Some(Sheet::Preferences);
        });
        let state = store.snapshot();
        assert_eq!(state.session.current_adopter_id, Some(adopter));
        assert_eq!(state.routing.sheet, Some(Sheet::Preferences));
        assert_eq!(format!("{:?}", path::SHEET), "routing.sheet");
    }
}

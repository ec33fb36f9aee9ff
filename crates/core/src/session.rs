//! Per-session application context.
//!
//! The current disaster selection and store root were module-level
//! mutable globals in earlier revisions of this system; they now live on
//! an explicit handle whose lifetime is the session's.

use std::sync::RwLock;

use crate::constants::{
    BACKUP_SCORE_ASSET_NAME, DEFAULT_DISASTER, GD_EE_PATH_PREFIX, SCORE_ASSET_NAME,
};
use crate::store::{DocumentPath, StoreRoot};

/// Shared, mutable session state: which disaster is being viewed and
/// which store root paths resolve against.
pub struct SessionContext {
    current_disaster: RwLock<String>,
    root: StoreRoot,
}

impl SessionContext {
    pub fn new(root: StoreRoot) -> Self {
        Self {
            current_disaster: RwLock::new(DEFAULT_DISASTER.to_string()),
            root,
        }
    }

    /// The disaster currently being viewed or edited.
    pub fn current_disaster(&self) -> String {
        self.current_disaster.read().unwrap().clone()
    }

    /// Switches the session to another disaster.
    pub fn set_current_disaster(&self, disaster_id: &str) {
        *self.current_disaster.write().unwrap() = disaster_id.to_string();
    }

    pub fn root(&self) -> &StoreRoot {
        &self.root
    }

    /// Path of the current disaster's metadata document.
    pub fn metadata_path(&self) -> DocumentPath {
        self.root.disaster_metadata().doc(&self.current_disaster())
    }

    /// Geospatial-backend path of the current disaster's score asset.
    ///
    /// The asset may be absent while it is being recreated; a previous
    /// version, if any, is at [`backup_score_asset_path`](Self::backup_score_asset_path).
    pub fn score_asset_path(&self) -> String {
        format!(
            "{GD_EE_PATH_PREFIX}{}/{SCORE_ASSET_NAME}",
            self.current_disaster()
        )
    }

    /// Path of the most recently superseded score asset.
    pub fn backup_score_asset_path(&self) -> String {
        format!(
            "{GD_EE_PATH_PREFIX}{}/{BACKUP_SCORE_ASSET_NAME}",
            self.current_disaster()
        )
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(StoreRoot::production())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_the_default_disaster() {
        let session = SessionContext::default();
        assert_eq!(session.current_disaster(), "2017-harvey");
        assert_eq!(
            session.metadata_path().to_string(),
            "disaster-metadata/2017-harvey"
        );
    }

    #[test]
    fn test_switching_disaster_moves_paths() {
        let session = SessionContext::new(StoreRoot::production());
        session.set_current_disaster("2018-michael");
        assert_eq!(
            session.score_asset_path(),
            "users/gd/2018-michael/poverty-damage-score"
        );
        assert_eq!(
            session.backup_score_asset_path(),
            "users/gd/2018-michael/score-asset-previous-version"
        );
    }
}

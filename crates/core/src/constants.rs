/// Store collection holding one metadata document per disaster.
pub const DISASTER_METADATA_COLLECTION: &str = "disaster-metadata";

/// Store collection holding user-drawn region documents.
pub const USER_SHAPES_COLLECTION: &str = "usershapes";

/// The disaster shown the very first time a session is created. Sessions
/// remember the last disaster they were on after that. Always in
/// `<year>-<name>` format, name all lowercase.
pub const DEFAULT_DISASTER: &str = "2017-harvey";

/// Geospatial-backend asset path prefix for this deployment's folder.
pub const GD_EE_PATH_PREFIX: &str = "users/gd/";

/// Legacy-style asset prefix required by the backend's listing APIs.
pub const EE_LEGACY_PREFIX: &str = "projects/earthengine-legacy/assets/";

/// Asset name of the computed poverty-damage score, under a disaster's
/// folder.
pub const SCORE_ASSET_NAME: &str = "poverty-damage-score";

/// Asset name the previous score version is moved to while a new one is
/// being created.
pub const BACKUP_SCORE_ASSET_NAME: &str = "score-asset-previous-version";

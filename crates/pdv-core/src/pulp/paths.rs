//! API paths, relative to the service base URL.

pub const REPO_PATH: &str = "/pulp/api/v3/repositories/";

pub const FILE_IMPORTER_PATH: &str = "/pulp/api/v3/importers/file/";

pub const FILE_PUBLISHER_PATH: &str = "/pulp/api/v3/publishers/file/";

pub const DISTRIBUTION_PATH: &str = "/pulp/api/v3/distributions/";

pub const STATUS_PATH: &str = "/pulp/api/v3/status/";

/// Manifest listing the files of a file feed.
pub const FILE_MANIFEST: &str = "PULP_MANIFEST";

/// Plugin providing file importers and publishers.
pub const FILE_PLUGIN: &str = "pulp_file";

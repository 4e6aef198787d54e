//! Request bodies for new resources. Names are random so repeated runs never
//! collide with leftovers.

use serde_json::{json, Value};

pub fn unique_name() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn gen_repo() -> Value {
    json!({ "name": unique_name() })
}

/// File importer syncing from `feed_url` (a `PULP_MANIFEST` URL).
pub fn gen_importer(feed_url: &str) -> Value {
    json!({
        "name": unique_name(),
        "download_policy": "immediate",
        "sync_mode": "mirror",
        "feed_url": feed_url,
    })
}

pub fn gen_publisher() -> Value {
    json!({ "name": unique_name() })
}

/// Distribution exposing `publication_href` under a random base path.
pub fn gen_distribution(publication_href: &str) -> Value {
    json!({
        "name": unique_name(),
        "base_path": unique_name(),
        "publication": publication_href,
    })
}

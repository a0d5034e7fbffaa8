//! API path construction
//!
//! Every endpoint lives under `/k/v1/`; a `preview/` segment addresses an
//! app's unreleased (draft) configuration instead of its live one, and apps
//! inside a guest space are served under `/k/guest/{space}/v1/`.

/// Build the path for an API endpoint.
///
/// `endpoint` is the bare endpoint name, e.g. `"records"` or
/// `"records/cursor"`; the `.json` suffix is appended here.
pub fn api_path(endpoint: &str, preview: bool, guest_space_id: Option<u64>) -> String {
    let prefix = match guest_space_id {
        Some(space) => format!("/k/guest/{space}/v1"),
        None => "/k/v1".to_string(),
    };
    if preview {
        format!("{prefix}/preview/{endpoint}.json")
    } else {
        format!("{prefix}/{endpoint}.json")
    }
}

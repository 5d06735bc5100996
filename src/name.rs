use std::path::Path;

/// Reduce a path to the identifier used on the command line: the final path
/// segment with its last extension removed.
///
/// `a/b/deploy.sh` becomes `deploy`, `a/b/run` stays `run`.
#[must_use]
pub fn to_name(path: impl AsRef<Path>) -> String {
    let base = path
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match base.rfind('.') {
        Some(idx) => base[..idx].to_string(),
        None => base,
    }
}

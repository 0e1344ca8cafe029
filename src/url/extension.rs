use std::collections::BTreeSet;

/// Checks whether a URL path ends with a blacklisted file extension
///
/// The comparison is case-insensitive, so "/IMG.PNG" matches ".png".
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use driftnet::url::has_disallowed_extension;
///
/// let blacklist: BTreeSet<String> = [".png".to_string()].into();
/// assert!(has_disallowed_extension("/images/Logo.PNG", &blacklist));
/// assert!(!has_disallowed_extension("/index.html", &blacklist));
/// ```
pub fn has_disallowed_extension(path: &str, extensions: &BTreeSet<String>) -> bool {
    let path = path.to_lowercase();
    extensions
        .iter()
        .any(|ext| path.ends_with(&ext.to_lowercase()))
}

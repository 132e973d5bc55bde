//! Wiki attachment handling
//!
//! Attachments are stored under a flattened filename; links in the page
//! body are rewritten to match, and anything left unlinked is listed in a
//! generated section at the end of the page.

/// Strip any directory component from an attachment name
pub fn flatten(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Percent-encode each segment of a path for use as a markdown link target
pub fn link_target(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Link forms that refer to `name`, each ending on its closing delimiter
fn link_patterns(name: &str) -> [String; 6] {
    [
        format!("]({})", name),
        format!("]({})", link_target(name)),
        format!("[attachment:{}]", name),
        format!("[attachment:{} ", name),
        format!("Image({})", name),
        format!("Image({},", name),
    ]
}

/// Point links at `original` to `flat` instead
pub fn rewrite_links(body: &str, original: &str, flat: &str) -> String {
    if original == flat {
        return body.to_string();
    }
    link_patterns(original)
        .into_iter()
        .zip(link_patterns(flat))
        .fold(body.to_string(), |body, (from, to)| body.replace(&from, &to))
}

/// Whether the body links to `filename` in markdown or Trac syntax
pub fn is_linked(body: &str, filename: &str) -> bool {
    link_patterns(filename)
        .iter()
        .any(|pattern| body.contains(pattern.as_str()))
}

/// Attachment stored for a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub filename: String,
    pub path: String,
}

/// Section listing attachments nothing links to, or None when all are linked
pub fn orphan_section(body: &str, heading: &str, stored: &[StoredAttachment]) -> Option<String> {
    let orphans: Vec<_> = stored
        .iter()
        .filter(|a| !is_linked(body, &a.filename))
        .collect();
    if orphans.is_empty() {
        return None;
    }

    let mut section = format!("\n\n## {}\n\n", heading);
    for orphan in orphans {
        section.push_str(&format!(
            "- [{}]({})\n",
            orphan.filename,
            link_target(&orphan.path)
        ));
    }
    Some(section)
}

//! Canonical request path construction.
//!
//! Joins a base path, a resource path, and a command path into one request
//! path with single forward slashes. The symbolic form keeps `{name}`
//! placeholders intact and exists only to enumerate required URL parameters
//! and label diagnostics; it must never be sent on the wire.

use crate::template::{PathTemplate, Substitutions};

/// Join path fragments with single slashes, normalizing `\` separators and
/// collapsing duplicate slashes. The result always leads with `/`.
#[must_use]
pub fn join(fragments: &[&str]) -> String {
    let mut out = String::from("/");
    for fragment in fragments {
        let fragment = fragment.replace('\\', "/");
        for piece in fragment.split('/').filter(|piece| !piece.is_empty()) {
            if !out.ends_with('/') {
                out.push('/');
            }
            out.push_str(piece);
        }
    }
    out
}

/// Relative resource path with placeholders left in, e.g.
/// `/campsites/{campsite_id}`.
#[must_use]
pub fn symbolic_path(resource_path: &str, command_path: &str) -> String {
    join(&[resource_path, command_path])
}

/// Fully substituted request path: base path joined with the applied
/// resource/command template. Contains no unresolved placeholders.
#[must_use]
pub fn full_path(base_path: &str, template: &PathTemplate, values: &Substitutions) -> String {
    let applied = template.apply(values);
    join(&[base_path, &applied])
}

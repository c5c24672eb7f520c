//! Rewrites the host's generated server entry so it imports the virtual
//! startup module.

use tracing::debug;

use super::virtual_module::PUBLIC_ID;
use crate::bundler::{SourceMapBuilder, TransformResult};

/// Id fragment of the server bootstrap module the host framework generates.
pub const SSR_ENTRY_MARKER: &str = "@astrojs-ssr-virtual-entry";

/// Whether `id` names the host's generated server entry.
///
/// A plain substring test: any id that happens to contain the marker is
/// treated as the entry too.
#[must_use]
pub fn is_generated_server_entry(id: &str) -> bool {
    id.contains(SSR_ENTRY_MARKER)
}

/// Outcome of a single transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Applied(TransformResult),
    NotApplicable,
}

/// Source transforms the startup plugin runs on server-side modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformer {
    /// Appends `import "virtual:startup-code";` to the generated server entry.
    ServerEntry,
}

impl Transformer {
    /// Every transformer, in the order they are tried.
    pub const ALL: &'static [Transformer] = &[Transformer::ServerEntry];

    #[must_use]
    pub fn apply(self, code: &str, id: &str) -> Transform {
        match self {
            Self::ServerEntry => inject_entry_import(code, id),
        }
    }

    /// Run the transformers in order; the first that applies wins.
    #[must_use]
    pub fn run_all(code: &str, id: &str) -> Option<TransformResult> {
        Self::ALL
            .iter()
            .find_map(|transformer| match transformer.apply(code, id) {
                Transform::Applied(result) => Some(result),
                Transform::NotApplicable => None,
            })
    }
}

/// Appends the virtual module import to the generated entry.
///
/// Not idempotent: each call appends another import. Hosts transform a
/// module once per compilation pass.
fn inject_entry_import(code: &str, id: &str) -> Transform {
    if !is_generated_server_entry(id) {
        return Transform::NotApplicable;
    }

    let mut out = String::with_capacity(code.len() + PUBLIC_ID.len() + 12);
    out.push_str(code);
    out.push_str("import ");
    out.push_str(&serde_json::Value::from(PUBLIC_ID).to_string());
    out.push_str(";\n");

    let mut map = SourceMapBuilder::new(id).with_content(code);
    map.add_identity_lines(code);

    debug!(id, "injected startup import into server entry");
    Transform::Applied(TransformResult::with_map(out, map.build()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY_ID: &str = "\0@astrojs-ssr-virtual-entry";

    #[test]
    fn test_marker_matching() {
        assert!(is_generated_server_entry(ENTRY_ID));
        assert!(is_generated_server_entry("/node_modules/@astrojs-ssr-virtual-entry.mjs"));
        assert!(!is_generated_server_entry("/proj/src/pages/index.astro"));
        assert!(!is_generated_server_entry("@astrojs-ssr-virtual"));
    }

    #[test]
    fn test_non_entry_not_applicable() {
        for id in ["/proj/src/a.ts", "virtual:startup-code", "", "\0astro:assets"] {
            assert_eq!(
                Transformer::ServerEntry.apply("export {};\n", id),
                Transform::NotApplicable
            );
            assert_eq!(Transformer::run_all("export {};\n", id), None);
        }
    }

    #[test]
    fn test_entry_gets_import_appended() {
        let code = "import { manifest } from './manifest.mjs';\nexport { manifest };\n";
        let result = Transformer::run_all(code, ENTRY_ID).unwrap();

        assert_eq!(
            result.code,
            format!("{code}import \"virtual:startup-code\";\n")
        );

        let map = result.map.unwrap();
        assert_eq!(map.version, 3);
        assert_eq!(map.sources, vec![ENTRY_ID.to_string()]);
        assert_eq!(map.sources_content, vec![Some(code.to_string())]);
        // Only the two original lines are mapped; the appended import is not.
        assert_eq!(map.mappings, "AAAA;AACA");
        assert_eq!(map.line_count(), 2);
        assert_eq!(result.code.lines().nth(2), Some("import \"virtual:startup-code\";"));
    }

    #[test]
    fn test_appended_line_unmapped_without_trailing_newline() {
        let result = Transformer::run_all("a;\nb;", ENTRY_ID).unwrap();
        assert_eq!(result.code, "a;\nb;import \"virtual:startup-code\";\n");
        assert_eq!(result.map.unwrap().mappings, "AAAA;AACA");
    }

    #[test]
    fn test_not_idempotent() {
        let once = Transformer::run_all("export {};\n", ENTRY_ID).unwrap().code;
        let twice = Transformer::run_all(&once, ENTRY_ID).unwrap().code;
        assert_eq!(twice.matches("virtual:startup-code").count(), 2);
    }

    #[test]
    fn test_coincidental_marker_still_fires() {
        let id = "/proj/src/notes-about-@astrojs-ssr-virtual-entry.ts";
        assert!(Transformer::run_all("", id).is_some());
    }
}

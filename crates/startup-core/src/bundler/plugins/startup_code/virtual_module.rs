//! The virtual module that imports the user's startup entrypoint.

use std::sync::OnceLock;

use crate::config::InjectionStrategy;
use crate::context::ResolvedEntrypoint;
use crate::error::Error;

/// Specifier the generated server entry imports.
pub const PUBLIC_ID: &str = "virtual:startup-code";

/// Resolved id; the `\0` prefix keeps every filesystem resolver away from it.
pub const RESOLVED_ID: &str = "\0virtual:startup-code";

/// Source text of the virtual module, rendered eagerly or on first use.
#[derive(Debug)]
enum Rendered {
    Eager(String),
    Lazy(OnceLock<String>),
}

/// Synthesizes `import "<entrypoint>";` for server-side loads.
#[derive(Debug)]
pub struct VirtualEntryModule {
    entrypoint: ResolvedEntrypoint,
    rendered: Rendered,
}

impl VirtualEntryModule {
    #[must_use]
    pub fn new(entrypoint: ResolvedEntrypoint, strategy: InjectionStrategy) -> Self {
        let rendered = match strategy {
            InjectionStrategy::Eager => Rendered::Eager(entrypoint.import_statement()),
            InjectionStrategy::Lazy => Rendered::Lazy(OnceLock::new()),
        };
        Self {
            entrypoint,
            rendered,
        }
    }

    /// Map the public specifier to the resolved id; anything else is not ours.
    #[must_use]
    pub fn resolve(id: &str) -> Option<&'static str> {
        (id == PUBLIC_ID).then_some(RESOLVED_ID)
    }

    /// Render the module source now if the strategy deferred it.
    pub fn prepare(&self) -> &str {
        match &self.rendered {
            Rendered::Eager(code) => code.as_str(),
            Rendered::Lazy(cell) => cell
                .get_or_init(|| self.entrypoint.import_statement())
                .as_str(),
        }
    }

    /// Whether the source text has been rendered yet.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        match &self.rendered {
            Rendered::Eager(_) => true,
            Rendered::Lazy(cell) => cell.get().is_some(),
        }
    }

    /// Source for `id`, or `None` when `id` is some other module.
    ///
    /// Loading the module for client-side code is a pipeline defect: nothing
    /// on the client imports it.
    pub fn load(&self, id: &str, ssr: bool) -> Result<Option<&str>, Error> {
        if id != RESOLVED_ID {
            return Ok(None);
        }
        if !ssr {
            return Err(Error::invariant(format!(
                "{PUBLIC_ID} was requested outside of a server-side build. This shouldn't happen."
            )));
        }
        Ok(Some(self.prepare()))
    }

    #[must_use]
    pub fn entrypoint(&self) -> &ResolvedEntrypoint {
        &self.entrypoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn module(strategy: InjectionStrategy) -> VirtualEntryModule {
        VirtualEntryModule::new(
            ResolvedEntrypoint::resolve(Path::new("/proj"), "./src/entry.ts"),
            strategy,
        )
    }

    #[test]
    fn test_resolve_only_public_id() {
        assert_eq!(VirtualEntryModule::resolve(PUBLIC_ID), Some(RESOLVED_ID));
        assert_eq!(VirtualEntryModule::resolve(RESOLVED_ID), None);
        assert_eq!(VirtualEntryModule::resolve("virtual:startup-code/x"), None);
        assert_eq!(VirtualEntryModule::resolve("./src/entry.ts"), None);
    }

    #[test]
    fn test_load_server_side() {
        let module = module(InjectionStrategy::Eager);
        assert_eq!(
            module.load(RESOLVED_ID, true).unwrap(),
            Some(r#"import "/proj/src/entry.ts";"#)
        );
    }

    #[test]
    fn test_load_other_ids_defer() {
        let module = module(InjectionStrategy::Eager);
        assert_eq!(module.load(PUBLIC_ID, true).unwrap(), None);
        assert_eq!(module.load("/proj/src/entry.ts", false).unwrap(), None);
    }

    #[test]
    fn test_load_client_side_is_invariant_violation() {
        let err = module(InjectionStrategy::Eager)
            .load(RESOLVED_ID, false)
            .unwrap_err();
        assert!(matches!(err, Error::InternalInvariant { .. }));
    }

    #[test]
    fn test_lazy_renders_on_demand() {
        let lazy = module(InjectionStrategy::Lazy);
        assert!(!lazy.is_rendered());
        let code = lazy.load(RESOLVED_ID, true).unwrap().map(str::to_string);
        assert!(lazy.is_rendered());

        let eager = module(InjectionStrategy::Eager);
        assert!(eager.is_rendered());
        assert_eq!(code.as_deref(), eager.load(RESOLVED_ID, true).unwrap());
    }
}

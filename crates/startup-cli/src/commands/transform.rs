//! `startup-code transform` command implementation.
//!
//! Sets the project up as a production build and pushes one module through
//! the resulting pipeline's `transform` hook, the way the bundler would.

use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use startup_core::bundler::ResolvedConfig;
use startup_core::integration::{ConfigSetup, PipelineHost};
use startup_core::{Command, Config, StartupCodeIntegration};
use startup_util::fs::{read_source, write_output};
use startup_util::path::{resolve_against, to_slash};
use std::path::PathBuf;

/// Transform command action.
#[derive(Debug, Clone)]
pub struct TransformAction {
    /// Module source file.
    pub file: PathBuf,
    /// Module id override.
    pub id: Option<String>,
    /// Server-side pass.
    pub ssr: bool,
    /// Where to write the source map.
    pub sourcemap: Option<PathBuf>,
    /// Where to write the code (stdout if None).
    pub outfile: Option<PathBuf>,
}

/// JSON output for the transform command.
#[derive(Serialize)]
struct TransformResultJson {
    ok: bool,
    id: String,
    ssr: bool,
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outfile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sourcemap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

/// Run the transform command.
pub async fn run(config: &Config, action: TransformAction) -> Result<()> {
    let (root, project) = super::load_project(&config.cwd, None)?;

    let file = resolve_against(&config.cwd, &action.file.to_string_lossy());
    let code = read_source(&file)
        .map_err(|e| miette!("Failed to read {}: {e}", file.display()))?;
    let id = action.id.clone().unwrap_or_else(|| to_slash(&file));

    let integration = StartupCodeIntegration::new(project.startup.clone());
    let adapter = project.adapter_info();
    let mut host = PipelineHost::new(&root);
    integration
        .config_setup(ConfigSetup {
            root: &root,
            adapter: adapter.as_ref(),
            command: Command::Build,
            host: &mut host,
        })
        .await
        .into_diagnostic()?;

    let plugins = host.plugins_mut();
    plugins
        .call_config_resolved(&ResolvedConfig {
            root: root.clone(),
            dev: false,
        })
        .into_diagnostic()?;
    plugins.set_ssr(action.ssr);
    let output = plugins.transform(&code, &id).into_diagnostic()?;
    let changed = output.code != code;
    tracing::debug!(%id, changed, ssr = action.ssr, "transformed module");

    if let Some(map_path) = &action.sourcemap {
        match output.maps.last() {
            Some(map) => {
                let map_json = map.to_json().into_diagnostic()?;
                write_output(map_path, map_json.as_bytes()).into_diagnostic()?;
            }
            None => tracing::warn!(%id, "module unchanged, no source map written"),
        }
    }

    if let Some(outfile) = &action.outfile {
        if let Some(parent) = outfile.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
        write_output(outfile, output.code.as_bytes()).into_diagnostic()?;
    }

    if config.json_logs {
        let result = TransformResultJson {
            ok: true,
            id,
            ssr: action.ssr,
            changed,
            outfile: action.outfile.as_ref().map(|p| p.display().to_string()),
            sourcemap: action
                .sourcemap
                .as_ref()
                .filter(|_| !output.maps.is_empty())
                .map(|p| p.display().to_string()),
            code: action.outfile.is_none().then(|| output.code.clone()),
        };
        println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    } else if action.outfile.is_none() {
        print!("{}", output.code);
    }

    Ok(())
}

//! `startup-code check` command implementation.
//!
//! Runs the config-setup phase against an in-process host and reports what
//! it registered, without starting anything.

use miette::Result;
use serde::Serialize;
use startup_core::dev::InjectedRoute;
use startup_core::integration::{ConfigSetup, PipelineHost};
use startup_core::{Command, Config, ConfigurationError, Error, StartupCodeIntegration};
use std::path::Path;

/// JSON output for the check command.
#[derive(Serialize)]
struct CheckReportJson {
    ok: bool,
    command: Command,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entrypoint: Option<String>,
    /// Whether the dev server would load the entrypoint at start.
    load_in_dev: bool,
    plugins: Vec<String>,
    routes: Vec<InjectedRoute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CheckErrorJson>,
}

#[derive(Serialize)]
struct CheckErrorJson {
    code: &'static str,
    message: String,
}

/// Run the check command.
pub async fn run(config: &Config, file: Option<&Path>, command: Command) -> Result<()> {
    let json = config.json_logs;

    let (root, project) = match super::load_project(&config.cwd, file) {
        Ok(loaded) => loaded,
        Err(e) => return fail(json, command, None, "E_CONFIG", e.to_string()),
    };

    let integration = StartupCodeIntegration::new(project.startup.clone());
    let adapter = project.adapter_info();
    let mut host = PipelineHost::new(&root);

    let setup = integration
        .config_setup(ConfigSetup {
            root: &root,
            adapter: adapter.as_ref(),
            command,
            host: &mut host,
        })
        .await;

    let context = match setup {
        Ok(context) => context,
        Err(e) => {
            return fail(
                json,
                command,
                Some(root.display().to_string()),
                error_code(&e),
                e.to_string(),
            )
        }
    };

    let report = CheckReportJson {
        ok: true,
        command,
        root: Some(root.display().to_string()),
        adapter: project.adapter.clone(),
        entrypoint: Some(context.entrypoint.to_string()),
        load_in_dev: context.dev,
        plugins: host
            .plugins()
            .plugin_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        routes: host.routes().to_vec(),
        error: None,
    };

    if json {
        println!("{}", serde_json::to_string(&report).unwrap_or_default());
        return Ok(());
    }

    println!("  startup-code: ok ({command})");
    if let Some(entrypoint) = &report.entrypoint {
        println!("    entrypoint  {entrypoint}");
        if !Path::new(entrypoint).exists() {
            println!("                (file does not exist yet)");
        }
    }
    if let Some(adapter) = &report.adapter {
        println!("    adapter     {adapter}");
    }
    for plugin in &report.plugins {
        println!("    plugin      {plugin} (post)");
    }
    for route in &report.routes {
        let mode = if route.prerender { "prerender" } else { "on demand" };
        println!("    route       {} ({mode})", route.pattern);
    }
    if command.is_dev() {
        let load = if report.load_in_dev { "yes" } else { "no (runInDev: false)" };
        println!("    dev load    {load}");
    }

    Ok(())
}

fn error_code(err: &Error) -> &'static str {
    match err {
        Error::Configuration(ConfigurationError::UnsupportedAdapter { .. }) => "E_ADAPTER",
        Error::Configuration(ConfigurationError::MissingEntrypoint) => "E_ENTRYPOINT",
        Error::Configuration(_) | Error::ConfigRead { .. } | Error::ConfigParse { .. } => {
            "E_CONFIG"
        }
        _ => "E_INTERNAL",
    }
}

fn fail(
    json: bool,
    command: Command,
    root: Option<String>,
    code: &'static str,
    message: String,
) -> Result<()> {
    if json {
        let report = CheckReportJson {
            ok: false,
            command,
            root,
            adapter: None,
            entrypoint: None,
            load_in_dev: false,
            plugins: Vec::new(),
            routes: Vec::new(),
            error: Some(CheckErrorJson { code, message }),
        };
        println!("{}", serde_json::to_string(&report).unwrap_or_default());
    } else {
        eprintln!("error: {message}");
    }
    std::process::exit(1);
}

//! Project configuration discovery and parsing.
//!
//! Loads `startup.config.json`, `startup.config.js` or `startup.config.mjs`
//! from the project root and extracts the adapter name and startup options.
//!
//! ## Supported config format
//!
//! ```js
//! // startup.config.mjs
//! export default {
//!   adapter: '@astrojs/node',
//!   startup: {
//!     entrypoint: './src/cron/example.ts',
//!     runInDev: true,
//!   },
//! };
//! ```
//!
//! JavaScript configs are read statically: only a literal `export default { ... }`
//! object is understood, never evaluated.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::StartupOptions;
use crate::error::Error;
use crate::integration::AdapterInfo;

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &[
    "startup.config.json",
    "startup.config.js",
    "startup.config.mjs",
];

/// Host-side project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Deployment adapter package name.
    #[serde(default)]
    pub adapter: Option<String>,
    pub startup: StartupOptions,
}

impl ProjectConfig {
    #[must_use]
    pub fn adapter_info(&self) -> Option<AdapterInfo> {
        self.adapter.as_deref().map(AdapterInfo::new)
    }
}

/// Find a config file in the given root directory.
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the project config.
///
/// If `config_path` is `Some`, that file must exist (relative paths are
/// taken from `root`). Otherwise the root is searched and `Ok(None)` means
/// no config file was found.
pub fn load_project_config(
    root: &Path,
    config_path: Option<&Path>,
) -> Result<Option<(PathBuf, ProjectConfig)>, Error> {
    let path = match config_path {
        Some(p) => {
            let abs = if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            };
            if !abs.is_file() {
                return Err(Error::ConfigRead {
                    path: abs,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                });
            }
            abs
        }
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(None),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    let parse_err = |message: String| Error::ConfigParse {
        path: path.clone(),
        message,
    };

    let value = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&source).map_err(|e| parse_err(e.to_string()))?
    } else {
        parse_config_module(&source).map_err(parse_err)?
    };

    let config: ProjectConfig =
        serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))?;
    Ok(Some((path, config)))
}

/// Read the `export default { ... }` object of a JS config module.
fn parse_config_module(source: &str) -> Result<Value, String> {
    let stripped = strip_comments(source);
    let object = default_export_object(&stripped)
        .ok_or_else(|| "No `export default { ... }` found in config file".to_string())?;
    ObjectLiteralParser::new(object).parse()
}

/// Slice of `source` holding the default-exported object, braces included.
fn default_export_object(source: &str) -> Option<&str> {
    const MARKER: &str = "export default";
    let start = source.find(MARKER)? + MARKER.len();
    let rest = source[start..].trim_start();
    if !rest.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, ch) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop `//` and `/* */` comments outside string literals. Newlines survive.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            out.push(ch);
            if ch == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            _ => {
                if matches!(ch, '"' | '\'' | '`') {
                    quote = Some(ch);
                }
                out.push(ch);
            }
        }
    }

    out
}

/// JSON5-flavoured object literal parser: unquoted keys, single quotes,
/// trailing commas.
struct ObjectLiteralParser {
    chars: Vec<char>,
    pos: usize,
}

impl ObjectLiteralParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Value, String> {
        let value = self.value()?;
        self.skip_ws();
        if self.pos < self.chars.len() {
            return Err(format!("Unexpected trailing input at position {}", self.pos));
        }
        Ok(value)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        let end = self.pos + word.chars().count();
        if end <= self.chars.len() && self.chars[self.pos..end].iter().copied().eq(word.chars()) {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn value(&mut self) -> Result<Value, String> {
        self.skip_ws();
        match self.peek() {
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('"' | '\'') => self.string().map(Value::String),
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.number(),
            Some(_) if self.eat_keyword("true") => Ok(Value::Bool(true)),
            Some(_) if self.eat_keyword("false") => Ok(Value::Bool(false)),
            Some(_) if self.eat_keyword("null") => Ok(Value::Null),
            Some(ch) => Err(format!("Unexpected character '{ch}' at position {}", self.pos)),
            None => Err("Unexpected end of input".to_string()),
        }
    }

    /// Consume a `,` separator, or stop at `close`.
    fn separator(&mut self, close: char, what: &str) -> Result<(), String> {
        self.skip_ws();
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                Ok(())
            }
            Some(ch) if ch == close => Ok(()),
            Some(ch) => Err(format!("Expected ',' or '{close}' in {what}, got '{ch}'")),
            None => Err(format!("Unterminated {what}")),
        }
    }

    fn object(&mut self) -> Result<Value, String> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                None => return Err("Unterminated object".to_string()),
                _ => {}
            }

            let key = self.key()?;
            self.skip_ws();
            if self.bump() != Some(':') {
                return Err(format!("Expected ':' after key '{key}'"));
            }
            let value = self.value()?;
            map.insert(key, value);
            self.separator('}', "object")?;
        }
    }

    fn array(&mut self) -> Result<Value, String> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err("Unterminated array".to_string()),
                _ => {}
            }
            items.push(self.value()?);
            self.separator(']', "array")?;
        }
    }

    fn key(&mut self) -> Result<String, String> {
        match self.peek() {
            Some('"' | '\'') => self.string(),
            Some(ch) if ch.is_alphabetic() || ch == '_' || ch == '$' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
                {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            other => Err(format!("Expected object key, got {other:?}")),
        }
    }

    fn string(&mut self) -> Result<String, String> {
        let quote = self.bump().ok_or("Unexpected end of input")?;
        let mut s = String::new();
        loop {
            match self.bump() {
                Some(ch) if ch == quote => return Ok(s),
                Some('\\') => match self.bump() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('r') => s.push('\r'),
                    Some(ch) => s.push(ch),
                    None => return Err("Unterminated string escape".to_string()),
                },
                Some(ch) => s.push(ch),
                None => return Err("Unterminated string".to_string()),
            }
        }
    }

    fn number(&mut self) -> Result<Value, String> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("Invalid number '{text}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InjectionStrategy;

    #[test]
    fn test_find_config_file_priority() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_file(dir.path()).is_none());

        std::fs::write(dir.path().join("startup.config.mjs"), "export default {}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("startup.config.mjs")
        );

        std::fs::write(dir.path().join("startup.config.json"), "{}").unwrap();
        assert_eq!(
            find_config_file(dir.path()).unwrap(),
            dir.path().join("startup.config.json")
        );
    }

    #[test]
    fn test_parse_module_config() {
        let source = r#"
            // startup config
            /* the adapter must keep a process alive */
            export default {
                adapter: '@astrojs/node',
                startup: {
                    entrypoint: './src/cron/example.ts', // relative to root
                    runInDev: false,
                    injection: "lazy",
                },
            };
        "#;
        let value = parse_config_module(source).unwrap();
        let config: ProjectConfig = serde_json::from_value(value).unwrap();

        assert_eq!(config.adapter.as_deref(), Some("@astrojs/node"));
        assert_eq!(config.startup.entrypoint, "./src/cron/example.ts");
        assert!(!config.startup.run_in_dev);
        assert_eq!(config.startup.injection, InjectionStrategy::Lazy);
        assert_eq!(config.adapter_info(), Some(AdapterInfo::new("@astrojs/node")));
    }

    #[test]
    fn test_comment_markers_inside_strings_survive() {
        let source = "export default { startup: { entrypoint: 'http://x/*y*/.ts' } }";
        let value = parse_config_module(source).unwrap();
        assert_eq!(value["startup"]["entrypoint"], "http://x/*y*/.ts");
    }

    #[test]
    fn test_parse_values() {
        let value = ObjectLiteralParser::new("{ a: [1, -2.5, null, true], 'b-c': \"x\\\"y\", }")
            .parse()
            .unwrap();
        assert_eq!(value["a"], serde_json::json!([1, -2.5, null, true]));
        assert_eq!(value["b-c"], "x\"y");
    }

    #[test]
    fn test_no_default_export() {
        assert!(parse_config_module("const config = {};").is_err());
        assert!(parse_config_module("export default defineConfig({})").is_err());
    }

    #[test]
    fn test_load_json_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("startup.config.json"),
            r#"{"adapter":"@deno/astro-adapter","startup":{"entrypoint":"boot.ts"}}"#,
        )
        .unwrap();

        let (path, config) = load_project_config(dir.path(), None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("startup.config.json"));
        assert_eq!(config.adapter.as_deref(), Some("@deno/astro-adapter"));
        assert!(config.startup.run_in_dev);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("custom.mjs"),
            "export default { startup: { entrypoint: './a.ts' } };",
        )
        .unwrap();

        let (_, config) = load_project_config(dir.path(), Some(Path::new("custom.mjs")))
            .unwrap()
            .unwrap();
        assert_eq!(config.adapter, None);
        assert_eq!(config.startup.entrypoint, "./a.ts");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project_config(dir.path(), Some(Path::new("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_load_without_startup_section() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("startup.config.json"), r#"{"adapter":"x"}"#).unwrap();
        let err = load_project_config(dir.path(), None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_no_config_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_project_config(dir.path(), None).unwrap().is_none());
    }
}

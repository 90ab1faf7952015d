//! Token substitution for static response bodies.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{NanoError, NanoResult};

/// Render the template at `path`, replacing every `%key%` with its value.
///
/// Each line of the output ends with `\n`. The file handle is dropped on
/// every return path, including a failed read halfway through.
pub fn render_template(path: &Path, vars: &HashMap<String, String>) -> NanoResult<String> {
    let file = File::open(path)
        .map_err(|e| NanoError::Template(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let tokens: Vec<(String, &String)> = vars
        .iter()
        .map(|(key, value)| (format!("%{}%", key), value))
        .collect();

    let mut out = String::new();
    for line in reader.lines() {
        let mut line =
            line.map_err(|e| NanoError::Template(format!("{}: {}", path.display(), e)))?;
        for (token, value) in &tokens {
            if line.contains(token.as_str()) {
                line = line.replace(token.as_str(), value);
            }
        }
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Directory of named templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Render template `name` from the store directory.
    pub fn render(&self, name: &str, vars: &HashMap<String, String>) -> NanoResult<String> {
        if name.contains("..") || Path::new(name).is_absolute() {
            return Err(NanoError::Template(format!("Invalid template name: {}", name)));
        }
        render_template(&self.dir.join(name), vars)
    }
}

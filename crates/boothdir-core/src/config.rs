use crate::error::{Error, Result};
use dirs::config_dir;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A registered configuration option, kept so the host can render a settings
/// UI and so unset keys fall back to a known default.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub section: String,
    pub key: String,
    pub default: String,
    pub description: String,
    pub label: String,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone)]
struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

/// In-memory view of the booth configuration file.
///
/// The file is an INI dialect: `[SECTION]` headers, `key = value` lines,
/// `#`/`;` comments. Values set here are visible immediately; nothing touches
/// the file until [`BoothConfig::save`] or
/// [`rewrite_key_on_disk`] runs, and both preserve every line they do not
/// have to change.
#[derive(Debug, Clone, Default)]
pub struct BoothConfig {
    path: Option<PathBuf>,
    sections: Vec<Section>,
    options: Vec<OptionSpec>,
}

impl BoothConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text without binding it to a file.
    pub fn from_text(text: &str) -> Self {
        Self {
            path: None,
            sections: parse_sections(text),
            options: Vec::new(),
        }
    }

    /// Load the configuration file; a missing file yields an empty store
    /// (first run, before any option has been persisted).
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(Error::Read { path, source: err }),
        };
        let mut cfg = Self::from_text(&text);
        cfg.path = Some(path);
        Ok(cfg)
    }

    /// Default location of the booth configuration file.
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|dir| dir.join("boothdir").join("booth.cfg"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Effective value: an explicit entry, else the registered default.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.lookup(section, key).or_else(|| {
            self.options
                .iter()
                .find(|opt| opt.section == section && opt.key == key)
                .map(|opt| opt.default.as_str())
        })
    }

    /// Integer read with an explicit fallback. A missing key falls back
    /// silently; a present but non-numeric value falls back with a warning.
    pub fn get_int_or(&self, section: &str, key: &str, fallback: i64) -> i64 {
        match self.get(section, key) {
            None => fallback,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    warn!("invalid {section}.{key} value {raw:?}; using default {fallback}");
                    fallback
                }
            },
        }
    }

    /// In-memory write; visible to every subsequent [`BoothConfig::get`].
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let idx = match self.sections.iter().position(|s| s.name == section) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section {
                    name: section.to_string(),
                    entries: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        let entries = &mut self.sections[idx].entries;
        match entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }

    /// Register an option with its default and UI metadata. Registering the
    /// same section/key twice keeps the first registration.
    pub fn add_option(&mut self, spec: OptionSpec) {
        if self
            .options
            .iter()
            .any(|opt| opt.section == spec.section && opt.key == spec.key)
        {
            return;
        }
        self.options.push(spec);
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Persist in-memory values and registered defaults into the backing
    /// file, touching only the lines that carry them. Unknown lines and
    /// comments survive untouched; the write is skipped when the resulting
    /// text equals what is already on disk.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::NoBackingFile);
        };
        let old = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
            Err(err) => {
                return Err(Error::Read {
                    path: path.clone(),
                    source: err,
                });
            }
        };
        let mut text = old.clone();
        for section in &self.sections {
            for (key, value) in &section.entries {
                text = upsert_key(&text, &section.name, key, value);
            }
        }
        for opt in &self.options {
            if self.lookup(&opt.section, &opt.key).is_none() {
                text = upsert_key(&text, &opt.section, &opt.key, &opt.default);
            }
        }
        if text == old {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::Write {
                path: path.clone(),
                source: err,
            })?;
        }
        fs::write(path, text).map_err(|err| Error::Write {
            path: path.clone(),
            source: err,
        })
    }

    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Rewrite a single `key = value` line in the file at `path`, preserving
/// everything else: the first matching key line in the target section is
/// replaced, a missing key is inserted right under its section header, and a
/// missing section is appended. Returns `false` without writing when the key
/// already carries `value`.
pub fn rewrite_key_on_disk(path: &Path, section: &str, key: &str, value: &str) -> Result<bool> {
    let old = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source: err,
            });
        }
    };
    if value_in_text(&old, section, key) == Some(value) {
        return Ok(false);
    }
    let text = upsert_key(&old, section, key, value);
    fs::write(path, text).map_err(|err| Error::Write {
        path: path.to_path_buf(),
        source: err,
    })?;
    Ok(true)
}

fn parse_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        if let Some(name) = section_header(trimmed) {
            current = Some(match sections.iter().position(|s| s.name == name) {
                Some(idx) => idx,
                None => {
                    sections.push(Section {
                        name: name.to_string(),
                        entries: Vec::new(),
                    });
                    sections.len() - 1
                }
            });
            continue;
        }
        let (Some(idx), Some((key, value))) = (current, split_kv(trimmed)) else {
            continue;
        };
        let entries = &mut sections[idx].entries;
        match entries.iter_mut().find(|(k, _)| k == key) {
            // configparser semantics: a later duplicate wins
            Some((_, v)) => *v = value.to_string(),
            None => entries.push((key.to_string(), value.to_string())),
        }
    }
    sections
}

fn section_header(line: &str) -> Option<&str> {
    let name = line.strip_prefix('[')?.strip_suffix(']')?.trim();
    (!name.is_empty()).then_some(name)
}

fn split_kv(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then(|| (key, value.trim()))
}

fn value_in_text<'a>(text: &'a str, section: &str, key: &str) -> Option<&'a str> {
    let mut in_target = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(name) = section_header(trimmed) {
            in_target = name == section;
            continue;
        }
        if in_target
            && let Some((k, v)) = split_kv(trimmed)
            && k == key
        {
            return Some(v);
        }
    }
    None
}

fn upsert_key(text: &str, section: &str, key: &str, value: &str) -> String {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let mut in_target = false;
    let mut header_idx: Option<usize> = None;
    for idx in 0..lines.len() {
        let trimmed = lines[idx].trim();
        if let Some(name) = section_header(trimmed) {
            in_target = name == section;
            if in_target && header_idx.is_none() {
                header_idx = Some(idx);
            }
            continue;
        }
        if in_target
            && let Some((k, _)) = split_kv(trimmed)
            && k == key
        {
            lines[idx] = format!("{key} = {value}");
            return rejoin(lines, text);
        }
    }
    match header_idx {
        Some(idx) => lines.insert(idx + 1, format!("{key} = {value}")),
        None => {
            if lines.last().is_some_and(|last| !last.trim().is_empty()) {
                lines.push(String::new());
            }
            lines.push(format!("[{section}]"));
            lines.push(format!("{key} = {value}"));
        }
    }
    rejoin(lines, text)
}

fn rejoin(lines: Vec<String>, original: &str) -> String {
    let mut out = lines.join("\n");
    if original.is_empty() || original.ends_with('\n') {
        out.push('\n');
    }
    out
}

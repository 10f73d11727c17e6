use std::{
    ffi::OsString,
    io::Write,
    path::{Path, PathBuf},
};

use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use super::Credentials;
use crate::{constants::BACKUP_EXTENSION, error::RefreshError};

const REGION_KEY: &str = "region";
const ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
const SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";
const SESSION_TOKEN_KEY: &str = "aws_session_token";

/// How a merged credentials store leaves the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOptions {
    /// Copy the current file to `<path>.bak` before overwriting it
    pub backup: bool,
    /// Render to the output stream instead of writing the file
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Written { backup: Option<PathBuf> },
    Previewed,
}

/// One `[name]` block: the header line followed by its body lines, verbatim
#[derive(Debug, Clone)]
struct Section {
    name: String,
    lines: Vec<String>,
}

impl Section {
    fn set(&mut self, key: &str, value: &str) {
        let mut found = false;

        for line in self.lines.iter_mut().skip(1) {
            if line_key(line) == Some(key) {
                *line = replace_value(line, value);
                found = true;
            }
        }

        if found {
            return;
        }

        let pos = self
            .lines
            .iter()
            .rposition(|line| line_key(line).is_some())
            .unwrap_or(0)
            + 1;

        let previous = &mut self.lines[pos - 1];
        if line_ending(previous).is_empty() {
            previous.push('\n');
        }
        let ending = line_ending(previous).to_string();

        self.lines.insert(pos, format!("{key} = {value}{ending}"));
    }
}

/// AWS shared credentials file, kept line for line so untouched sections are
/// written back byte-identical
#[derive(Debug, Clone)]
pub struct CredentialsStore {
    path: PathBuf,
    preamble: Vec<String>,
    sections: Vec<Section>,
}

impl CredentialsStore {
    /// Load the credentials file at `path`
    pub async fn load(path: &Path) -> Result<Self, RefreshError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| RefreshError::config(path, e.to_string()))?;

        Self::parse(path, &text).map_err(|reason| RefreshError::config(path, reason))
    }

    /// Parse credentials text that lives (or will live) at `path`
    pub fn parse(path: &Path, text: &str) -> Result<Self, String> {
        let mut preamble = Vec::new();
        let mut sections: Vec<Section> = Vec::new();

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let trimmed = line.trim();

            if let Some(rest) = trimmed.strip_prefix('[') {
                let (name, trailing) = rest
                    .split_once(']')
                    .ok_or_else(|| format!("line {}: unterminated section header", idx + 1))?;
                let name = name.trim();
                let trailing = trailing.trim();

                if name.is_empty() {
                    return Err(format!("line {}: empty section name", idx + 1));
                }
                if !trailing.is_empty() && !is_comment(trailing) {
                    return Err(format!("line {}: unexpected text after section header", idx + 1));
                }
                if sections.iter().any(|s| s.name == name) {
                    return Err(format!("line {}: duplicate section [{name}]", idx + 1));
                }

                sections.push(Section {
                    name: name.to_string(),
                    lines: vec![line.to_string()],
                });
                continue;
            }

            if !trimmed.is_empty() && !is_comment(trimmed) && !trimmed.contains('=') {
                return Err(format!("line {}: expected 'key = value'", idx + 1));
            }

            match sections.last_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None => preamble.push(line.to_string()),
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            preamble,
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Value of `key` in `[section]`, last occurrence wins
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .lines
            .iter()
            .skip(1)
            .filter(|line| line_key(line) == Some(key))
            .filter_map(|line| line.split_once('='))
            .map(|(_, value)| value.trim())
            .last()
    }

    /// Fail with `SectionNotFound` unless `[section]` exists
    pub fn ensure_section(&self, section: &str) -> Result<(), RefreshError> {
        if self.sections.iter().any(|s| s.name == section) {
            Ok(())
        } else {
            Err(self.section_not_found(section))
        }
    }

    fn section_not_found(&self, section: &str) -> RefreshError {
        RefreshError::SectionNotFound {
            section: section.to_string(),
            path: self.path.clone(),
        }
    }

    /// Set the four credential keys of `[section]`, leaving everything else untouched
    pub fn merge(&mut self, section: &str, creds: &Credentials) -> Result<(), RefreshError> {
        let Some(idx) = self.sections.iter().position(|s| s.name == section) else {
            return Err(self.section_not_found(section));
        };
        let target = &mut self.sections[idx];

        target.set(REGION_KEY, &creds.region);
        target.set(ACCESS_KEY_ID_KEY, &creds.access_key_id);
        target.set(SECRET_ACCESS_KEY_KEY, &creds.secret_access_key);
        target.set(SESSION_TOKEN_KEY, &creds.session_token);

        debug!("Merged credentials into section [{}]", section);
        Ok(())
    }

    /// Render the store in its native INI text
    pub fn render(&self) -> String {
        self.preamble
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.lines.iter()))
            .map(String::as_str)
            .collect()
    }

    /// Write the store back to its path, or preview it on `out` for a dry run
    pub async fn persist(
        &self,
        options: PersistOptions,
        out: &mut (dyn Write + Send),
    ) -> Result<PersistOutcome, RefreshError> {
        let rendered = self.render();

        if options.dry_run {
            info!("Found dry-run flag, writing to stdout...");
            out.write_all(rendered.as_bytes())
                .and_then(|()| out.flush())
                .map_err(|e| RefreshError::store_write("<stdout>", e))?;
            return Ok(PersistOutcome::Previewed);
        }

        let backup = if options.backup {
            let backup_path = sibling(&self.path, BACKUP_EXTENSION);
            info!(
                "Making backup {} => {}",
                self.path.display(),
                backup_path.display()
            );

            fs::copy(&self.path, &backup_path)
                .await
                .map_err(|e| RefreshError::store_write(&backup_path, e))?;
            restrict_permissions(&backup_path).await?;
            Some(backup_path)
        } else {
            None
        };

        // A symlinked store is updated through the link
        let target = fs::canonicalize(&self.path)
            .await
            .map_err(|e| RefreshError::store_write(&self.path, e))?;
        info!("Updating credentials file {}", target.display());

        let temp_path = sibling(&target, "tmp");
        if let Err(e) = replace_file(&temp_path, &target, rendered.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(PersistOutcome::Written { backup })
    }
}

/// Merge `creds` into `[short_name]` and persist the result
pub async fn merge_and_persist(
    store: &mut CredentialsStore,
    short_name: &str,
    creds: &Credentials,
    options: PersistOptions,
    out: &mut (dyn Write + Send),
) -> Result<PersistOutcome, RefreshError> {
    store.merge(short_name, creds)?;
    store.persist(options, out).await
}

fn is_comment(trimmed: &str) -> bool {
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if is_comment(trimmed) {
        return None;
    }
    trimmed.split_once('=').map(|(key, _)| key.trim())
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Keep everything up to the value (indent, key, `=`, spacing) and swap the value
fn replace_value(line: &str, value: &str) -> String {
    let ending = line_ending(line);
    let Some(eq) = line.find('=') else {
        return line.to_string();
    };

    let after = &line[eq + 1..];
    let spacing = after.len() - after.trim_start_matches([' ', '\t']).len();
    let prefix = &line[..eq + 1 + spacing];

    format!("{prefix}{value}{ending}")
}

/// `/a/credentials` + `bak` => `/a/credentials.bak`
fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Write `contents` to `temp_path` (owner-only from creation) and rename it over `target`
async fn replace_file(temp_path: &Path, target: &Path, contents: &[u8]) -> Result<(), RefreshError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(temp_path)
        .await
        .map_err(|e| RefreshError::store_write(temp_path, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| RefreshError::store_write(temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| RefreshError::store_write(temp_path, e))?;
    drop(file);

    // mode() only applies when the file is created
    restrict_permissions(temp_path).await?;

    fs::rename(temp_path, target)
        .await
        .map_err(|e| RefreshError::store_write(target, e))
}

async fn restrict_permissions(path: &Path) -> Result<(), RefreshError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| RefreshError::store_write(path, e))?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

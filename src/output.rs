//! Rendering and writing results
//!
//! Profiles are rendered in one of four formats and written to stdout, a
//! single file, an auto-named file, or one file per profile in a directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::encoder::{to_uri, to_uri_batch};
use crate::generator::{
    DEFAULT_LOCAL_PORT, generate_batch_config, generate_config, generate_hysteria2_config,
};
use crate::model::Profile;

/// Longest file stem produced by [`sanitize_filename`], in characters
const MAX_FILENAME_CHARS: usize = 100;

// ============================================================================
// Formats
// ============================================================================

#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Canonical profile JSON
    #[default]
    Json,
    /// Xray outbound config
    Xray,
    /// Native Hysteria2 client config
    Hy2,
    /// Share link
    Uri,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    /// Local listener port for Hysteria2 output
    pub local_port: u16,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Json,
            pretty: true,
            local_port: DEFAULT_LOCAL_PORT,
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to serialize output")
}

/// Renders one profile
pub fn format_single(profile: &Profile, options: &OutputOptions) -> Result<String> {
    match options.format {
        OutputFormat::Json => to_json(profile, options.pretty),
        OutputFormat::Xray => to_json(&generate_config(profile, options.local_port)?, options.pretty),
        OutputFormat::Hy2 => to_json(
            &generate_hysteria2_config(profile, options.local_port)?,
            options.pretty,
        ),
        OutputFormat::Uri => to_uri(profile),
    }
}

/// Renders many profiles as one document.
///
/// Xray output wraps every outbound in one config, Hysteria2 output is an
/// array, links are newline-joined. Profiles a format cannot express are
/// skipped with a warning.
pub fn format_batch(profiles: &[Profile], options: &OutputOptions) -> Result<String> {
    match options.format {
        OutputFormat::Json => to_json(&profiles, options.pretty),
        OutputFormat::Xray => to_json(
            &generate_batch_config(profiles, options.local_port),
            options.pretty,
        ),
        OutputFormat::Hy2 => {
            let configs: Vec<_> = profiles
                .iter()
                .filter_map(|profile| {
                    match generate_hysteria2_config(profile, options.local_port) {
                        Ok(config) => Some(config),
                        Err(e) => {
                            warn!("Skipping '{}': {:#}", profile.remarks, e);
                            None
                        }
                    }
                })
                .collect();
            to_json(&configs, options.pretty)
        }
        OutputFormat::Uri => Ok(to_uri_batch(profiles).join("\n")),
    }
}

pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Uri => ".txt",
        _ => ".json",
    }
}

/// Makes a remarks value safe to use as a file name on every platform
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c => c,
        })
        .filter(|c| (*c as u32) >= 0x20)
        .take(MAX_FILENAME_CHARS)
        .collect();
    cleaned.trim().to_string()
}

/// File name for the profile at `index` when writing one file per profile
pub fn dir_file_name(remarks: &str, index: usize, format: OutputFormat) -> String {
    let mut stem = sanitize_filename(remarks);
    if stem.is_empty() {
        stem = format!("node_{}", index + 1);
    }
    stem + file_extension(format)
}

// ============================================================================
// Paths
// ============================================================================

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &str) -> String {
    if (path.starts_with("~/") || path == "~")
        && let Some(home) = dirs_home()
    {
        return path.replacen('~', &home, 1);
    }
    path.to_string()
}

fn dirs_home() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok()
    }
}

// ============================================================================
// Writers
// ============================================================================

/// Where rendered output goes.
///
/// Precedence: directory (one file per profile), then auto-naming from
/// remarks, then the explicit file, then stdout.
#[derive(Clone, Debug, Default)]
pub struct OutputTarget {
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub auto_name: bool,
}

impl OutputTarget {
    /// Writes an already-rendered document; `remarks` drives auto-naming and
    /// is empty for batch documents
    pub async fn write(&self, content: &str, remarks: &str, format: OutputFormat) -> Result<()> {
        if self.auto_name && !remarks.is_empty() {
            let name = sanitize_filename(remarks) + file_extension(format);
            return write_file(Path::new(&name), content).await;
        }
        match &self.file {
            Some(path) => write_file(path, content).await,
            None => write_stdout(content).await,
        }
    }

    /// Renders and writes a single profile
    pub async fn emit_single(&self, profile: &Profile, options: &OutputOptions) -> Result<()> {
        if let Some(dir) = &self.dir {
            write_dir(dir, std::slice::from_ref(profile), options).await?;
            return Ok(());
        }
        let content = format_single(profile, options)?;
        self.write(&content, &profile.remarks, options.format).await
    }

    /// Renders and writes many profiles
    pub async fn emit_batch(&self, profiles: &[Profile], options: &OutputOptions) -> Result<()> {
        if let Some(dir) = &self.dir {
            write_dir(dir, profiles, options).await?;
            return Ok(());
        }
        let content = format_batch(profiles, options)?;
        self.write(&content, "", options.format).await
    }
}

/// Writes `content` to `path`, creating parent directories
pub async fn write_file(path: &Path, content: &str) -> Result<()> {
    let expanded = PathBuf::from(expand_tilde(&path.to_string_lossy()));
    if let Some(parent) = expanded.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    tokio::fs::write(&expanded, content)
        .await
        .with_context(|| format!("Failed to write file: {}", expanded.display()))?;
    info!("Written: {}", expanded.display());
    Ok(())
}

/// Writes one file per profile into `dir` and returns how many were written.
///
/// Per-profile failures are logged and skipped.
pub async fn write_dir(dir: &Path, profiles: &[Profile], options: &OutputOptions) -> Result<usize> {
    let dir = PathBuf::from(expand_tilde(&dir.to_string_lossy()));
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut written = 0;
    for (index, profile) in profiles.iter().enumerate() {
        let content = match format_single(profile, options) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to format '{}': {:#}", profile.remarks, e);
                continue;
            }
        };

        let path = dir.join(dir_file_name(&profile.remarks, index, options.format));
        match tokio::fs::write(&path, content).await {
            Ok(()) => {
                info!("Written: {}", path.display());
                written += 1;
            }
            Err(e) => warn!("Failed to write {}: {}", path.display(), e),
        }
    }
    Ok(written)
}

async fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(content.as_bytes())
        .await
        .context("Failed to write to stdout")?;
    stdout.write_all(b"\n").await.context("Failed to write to stdout")?;
    stdout.flush().await.context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConfigType;
    use crate::parser::parse;

    fn profiles() -> Vec<Profile> {
        vec![
            parse("hysteria2://pw@hy.example.com:443#HY").unwrap(),
            parse("socks://127.0.0.1:1080#local").unwrap(),
        ]
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*j"), "a_b_c_d_e_f_g_h_i_j");
        assert_eq!(sanitize_filename("  tab\there  "), "tabhere");
        assert_eq!(sanitize_filename("香港 01"), "香港 01");
        assert_eq!(sanitize_filename(&"节".repeat(150)).chars().count(), 100);
    }

    #[test]
    fn test_dir_file_name_fallback() {
        assert_eq!(dir_file_name("HK 01", 0, OutputFormat::Json), "HK 01.json");
        assert_eq!(dir_file_name("\u{1}", 2, OutputFormat::Uri), "node_3.txt");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(OutputFormat::Uri), ".txt");
        assert_eq!(file_extension(OutputFormat::Xray), ".json");
        assert_eq!(file_extension(OutputFormat::Hy2), ".json");
    }

    #[test]
    fn test_format_single_json_compact() {
        let options = OutputOptions {
            pretty: false,
            ..Default::default()
        };
        let json = format_single(&profiles()[1], &options).unwrap();
        assert!(json.starts_with("{\"configType\":\"socks\""));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_format_batch_hy2_skips_other_kinds() {
        let options = OutputOptions {
            format: OutputFormat::Hy2,
            local_port: 2080,
            ..Default::default()
        };
        let json = format_batch(&profiles(), &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["socks5"]["listen"], "127.0.0.1:2080");
    }

    #[test]
    fn test_format_batch_xray_and_uri() {
        let options = OutputOptions {
            format: OutputFormat::Xray,
            ..Default::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_batch(&profiles(), &options).unwrap()).unwrap();
        assert_eq!(value["outbounds"].as_array().unwrap().len(), 2);

        let options = OutputOptions {
            format: OutputFormat::Uri,
            ..Default::default()
        };
        let uris = format_batch(&profiles(), &options).unwrap();
        assert_eq!(uris.lines().count(), 2);
        assert_eq!(uris.lines().nth(1), Some("socks://127.0.0.1:1080#local"));
    }

    #[test]
    fn test_format_single_hy2_rejects_other_kinds() {
        let options = OutputOptions {
            format: OutputFormat::Hy2,
            ..Default::default()
        };
        assert!(format_single(&profiles()[1], &options).is_err());
        assert_eq!(profiles()[0].config_type, ConfigType::Hysteria2);
        assert!(format_single(&profiles()[0], &options).is_ok());
    }

    #[test]
    fn test_expand_tilde_no_tilde() {
        assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
        assert_eq!(expand_tilde("/some/~/path"), "/some/~/path");
    }
}

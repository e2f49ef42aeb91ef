use crate::error::OrganizerError;
use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Explicit run configuration for the whole engine.
///
/// Classification rules, the judgment-ID prefix and the simulate flag are
/// all carried here and passed into the orchestrator, never read from
/// ambient process state mid-run. Resolution order: built-in defaults,
/// then the optional TOML file, then `EXPEDIENTES_*` env vars, then CLI
/// flags (applied by the command layer).
#[derive(Debug, Clone)]
pub struct OrganizerConfig {
    pub organize_root: PathBuf,
    pub judgment_prefix: String,
    pub keywords_path: PathBuf,
    pub reports_dir: PathBuf,
    pub principal_category: String,
    pub orphan_container: String,
    pub apply: bool,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        let config_home = config_home_dir();
        Self {
            organize_root: PathBuf::new(),
            judgment_prefix: "056314".to_string(),
            keywords_path: config_home.join("keywords.json"),
            reports_dir: PathBuf::from("reports"),
            principal_category: "Principal".to_string(),
            orphan_container: "01PrimeraInstancia/Principal".to_string(),
            apply: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialOrganizerConfig {
    organize_root: Option<PathBuf>,
    judgment_prefix: Option<String>,
    keywords_path: Option<PathBuf>,
    reports_dir: Option<PathBuf>,
    principal_category: Option<String>,
    orphan_container: Option<String>,
    apply: Option<bool>,
}

fn config_home_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".expedientes"),
        None => PathBuf::from(".expedientes"),
    }
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

fn env_or_bool(var: &str, fallback: bool) -> bool {
    match env::var(var) {
        Ok(v) => match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "on" => true,
            "0" | "false" | "FALSE" | "no" | "off" => false,
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("EXPEDIENTES_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    Some(config_home_dir().join("organizer.toml"))
}

fn apply_partial(base: &mut OrganizerConfig, partial: PartialOrganizerConfig) {
    if let Some(organize_root) = partial.organize_root {
        base.organize_root = organize_root;
    }
    if let Some(judgment_prefix) = partial.judgment_prefix {
        base.judgment_prefix = judgment_prefix;
    }
    if let Some(keywords_path) = partial.keywords_path {
        base.keywords_path = keywords_path;
    }
    if let Some(reports_dir) = partial.reports_dir {
        base.reports_dir = reports_dir;
    }
    if let Some(principal_category) = partial.principal_category {
        base.principal_category = principal_category;
    }
    if let Some(orphan_container) = partial.orphan_container {
        base.orphan_container = orphan_container;
    }
    if let Some(apply) = partial.apply {
        base.apply = apply;
    }
}

fn merge_file_config(base: &mut OrganizerConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let partial: PartialOrganizerConfig = toml::from_str(&raw).map_err(|err| {
        OrganizerError::InvalidConfig(format!("{}: {err}", path.display()))
    })?;
    apply_partial(base, partial);
    Ok(())
}

fn validate(cfg: &OrganizerConfig) -> Result<()> {
    if cfg.judgment_prefix.trim().is_empty() {
        return Err(anyhow!("invalid judgment prefix: cannot be empty"));
    }
    if cfg.principal_category.trim().is_empty() {
        return Err(anyhow!("invalid principal category: cannot be empty"));
    }
    if Path::new(&cfg.principal_category).components().count() != 1 {
        return Err(anyhow!(
            "invalid principal category: must be a single folder name"
        ));
    }
    let container = Path::new(&cfg.orphan_container);
    if cfg.orphan_container.trim().is_empty() || container.is_absolute() {
        return Err(anyhow!(
            "invalid orphan container: must be a relative path inside the case root"
        ));
    }
    if container
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(anyhow!("invalid orphan container: `..` is not allowed"));
    }
    if cfg.reports_dir.as_os_str().is_empty() {
        return Err(anyhow!("invalid reports dir: cannot be empty"));
    }
    Ok(())
}

pub fn load_config() -> Result<OrganizerConfig> {
    let mut cfg = OrganizerConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.organize_root = env_or_path("EXPEDIENTES_ROOT", cfg.organize_root);
    cfg.judgment_prefix = env_or_string("EXPEDIENTES_JUDGMENT_PREFIX", &cfg.judgment_prefix);
    cfg.keywords_path = env_or_path("EXPEDIENTES_KEYWORDS_PATH", cfg.keywords_path);
    cfg.reports_dir = env_or_path("EXPEDIENTES_REPORTS_DIR", cfg.reports_dir);
    cfg.principal_category =
        env_or_string("EXPEDIENTES_PRINCIPAL_CATEGORY", &cfg.principal_category);
    cfg.orphan_container = env_or_string("EXPEDIENTES_ORPHAN_CONTAINER", &cfg.orphan_container);
    cfg.apply = env_or_bool("EXPEDIENTES_APPLY", cfg.apply);

    validate(&cfg)?;
    Ok(cfg)
}

/// Re-validate after the command layer has applied CLI overrides.
pub fn validate_overridden(cfg: &OrganizerConfig) -> Result<()> {
    validate(cfg)
}

#[cfg(test)]
mod tests {
    use super::{OrganizerConfig, PartialOrganizerConfig, apply_partial, validate};
    use std::path::PathBuf;

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let mut cfg = OrganizerConfig::default();
        let partial: PartialOrganizerConfig = toml::from_str(
            r#"
            judgment_prefix = "05380"
            reports_dir = "salidas"
            "#,
        )
        .expect("parse");
        apply_partial(&mut cfg, partial);

        assert_eq!(cfg.judgment_prefix, "05380");
        assert_eq!(cfg.reports_dir, PathBuf::from("salidas"));
        assert_eq!(cfg.principal_category, "Principal");
    }

    #[test]
    fn validate_rejects_empty_prefix() {
        let cfg = OrganizerConfig {
            judgment_prefix: "  ".to_string(),
            ..OrganizerConfig::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn validate_rejects_escaping_orphan_container() {
        let cfg = OrganizerConfig {
            orphan_container: "../fuera".to_string(),
            ..OrganizerConfig::default()
        };
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn validate_rejects_nested_principal_category() {
        let cfg = OrganizerConfig {
            principal_category: "a/b".to_string(),
            ..OrganizerConfig::default()
        };
        assert!(validate(&cfg).is_err());
    }
}

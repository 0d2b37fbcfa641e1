use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 產生類別名稱時使用的預設前綴。 / Default prefix applied to generated class names.
pub const DEFAULT_STYLE_PREFIX: &str = "gjs-";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read page manager config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse page manager config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse inline page manager config: {0}")]
    Inline(#[source] serde_json::Error),
}

/// 頁面分類的種子描述，可為字串或物件。 / Category given either as a bare name or as an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategorySeed {
    Name(String),
    Labeled {
        #[serde(default)]
        id: Option<String>,
        label: String,
    },
}

/// 初次載入時預設建立的頁面。 / A page created by `on_load` when the registry starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PageSeed {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub category: Option<CategorySeed>,
    #[serde(default, alias = "isCurrentPage")]
    pub is_current_page: bool,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub disable: bool,
}

/// Page manager configuration, usually embedded in the editor configuration.
/// 頁面管理器設定，一般由編輯器初始化時提供。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageManagerConfig {
    /// Selector of the element the container is mounted into by `post_render`.
    #[serde(default, alias = "appendTo")]
    pub append_to: Option<String>,
    #[serde(default)]
    pub blocks: Vec<PageSeed>,
    #[serde(default = "default_style_prefix", alias = "pStylePrefix")]
    pub p_style_prefix: String,
    #[serde(default, alias = "ignoreCategories")]
    pub ignore_categories: bool,
    /// Makes every `render` detached unless a call overrides it.
    #[serde(default)]
    pub external: bool,
}

fn default_style_prefix() -> String {
    DEFAULT_STYLE_PREFIX.to_string()
}

impl Default for PageManagerConfig {
    fn default() -> Self {
        Self {
            append_to: None,
            blocks: Vec::new(),
            p_style_prefix: default_style_prefix(),
            ignore_categories: false,
            external: false,
        }
    }
}

impl PageManagerConfig {
    /// 從 JSON 檔案載入；檔案不存在時回傳預設值。 / Loads from a JSON file, falling back to defaults when missing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "page manager config missing, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.sanitize();
        Ok(config)
    }

    /// 由 JSON 字串解析設定。 / Parses a configuration from inline JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(raw).map_err(ConfigError::Inline)?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        let trimmed = self.p_style_prefix.trim();
        if trimmed.len() != self.p_style_prefix.len() {
            self.p_style_prefix = trimmed.to_string();
        }
        if let Some(target) = &self.append_to {
            if target.trim().is_empty() {
                self.append_to = None;
            }
        }
        let before = self.blocks.len();
        self.blocks.retain(|seed| !seed.id.trim().is_empty());
        if self.blocks.len() != before {
            debug!(
                dropped = before - self.blocks.len(),
                "dropped seed pages without an id"
            );
        }
    }

    /// 套用單次渲染選項（淺層合併）。 / Shallow-merges per-call render options into this config.
    pub fn merge(&mut self, options: &RenderOptions) {
        if let Some(external) = options.external {
            self.external = external;
        }
        if let Some(ignore) = options.ignore_categories {
            self.ignore_categories = ignore;
        }
    }

    /// 回傳合併後的新設定。 / Returns a copy with the options merged in.
    pub fn merged(&self, options: &RenderOptions) -> Self {
        let mut next = self.clone();
        next.merge(options);
        next
    }
}

/// 單次 `render` 呼叫的選項。 / Options accepted by a single `render` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub external: Option<bool>,
    #[serde(default, alias = "ignoreCategories")]
    pub ignore_categories: Option<bool>,
}

impl RenderOptions {
    pub fn external() -> Self {
        Self {
            external: Some(true),
            ignore_categories: None,
        }
    }

    pub fn with_ignore_categories(mut self, ignore: bool) -> Self {
        self.ignore_categories = Some(ignore);
        self
    }
}

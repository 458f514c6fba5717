//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `PYTUTOR__*` 覆盖
//! （双下划线表示嵌套，如 `PYTUTOR__GENERATION__MODEL=gpt-4o-mini`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::sandbox::SandboxLimits;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub reference: ReferenceSection,
    pub sandbox: SandboxSection,
    pub generation: GenerationSection,
    pub store: StoreSection,
}

/// [app] 段：应用名、历史轮数上限、输入字符上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 会话历史保留轮数（每轮 user + bot 各一条）
    pub max_history_exchanges: usize,
    /// 表示层拒绝的输入长度上限（字符）
    pub max_input_chars: usize,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            max_history_exchanges: 3,
            max_input_chars: 200,
        }
    }
}

/// [reference] 段：外部检索的超时与摘要截断
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReferenceSection {
    pub timeout_secs: u64,
    /// 摘要截断长度（字符），超出追加 "..."
    pub max_summary_chars: usize,
}

impl Default for ReferenceSection {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_summary_chars: 400,
        }
    }
}

/// [sandbox] 段：受限求值的资源上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxSection {
    pub timeout_ms: u64,
    pub fuel: u64,
    pub max_render_chars: usize,
}

impl Default for SandboxSection {
    fn default() -> Self {
        let limits = SandboxLimits::default();
        Self {
            timeout_ms: limits.timeout.as_millis() as u64,
            fuel: limits.fuel,
            max_render_chars: limits.max_render_chars,
        }
    }
}

impl SandboxSection {
    pub fn limits(&self) -> SandboxLimits {
        SandboxLimits {
            timeout: Duration::from_millis(self.timeout_ms),
            fuel: self.fuel,
            max_render_chars: self.max_render_chars,
        }
    }
}

/// [generation] 段：生成式 fallback（OpenAI 兼容端点）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    /// 未启用时 fallback 直接走固定帮助文案
    pub enabled: bool,
    pub model: String,
    pub base_url: Option<String>,
    /// 生成长度上限（token 数，传给后端）
    pub max_length: u32,
    pub request_timeout_secs: u64,
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            max_length: 60,
            request_timeout_secs: 30,
        }
    }
}

/// [store] 段：facts / code_examples 的 SQLite 路径（未设置则不启用）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreSection {
    pub path: Option<PathBuf>,
}

/// 从 config 目录加载配置，环境变量 PYTUTOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 PYTUTOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("PYTUTOR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.max_history_exchanges, 3);
        assert_eq!(cfg.app.max_input_chars, 200);
        assert_eq!(cfg.reference.max_summary_chars, 400);
        assert!(!cfg.generation.enabled);
        assert!(cfg.store.path.is_none());
    }

    #[test]
    fn test_sandbox_limits_roundtrip() {
        let section = SandboxSection {
            timeout_ms: 250,
            fuel: 1_000,
            max_render_chars: 100,
        };
        let limits = section.limits();
        assert_eq!(limits.timeout, Duration::from_millis(250));
        assert_eq!(limits.fuel, 1_000);
    }
}

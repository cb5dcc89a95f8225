//! 端点配置
//!
//! JSON 文件保存，命令行参数可覆盖其中的字段。

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use protocol::{CONNECT_ATTEMPTS, DEFAULT_PORT};

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// EnvFilter 指令中使用的级别名
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// 端点配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    /// 主机模式监听地址
    pub bind_addr: String,
    /// 监听端口，也是连接时未指定端口的默认值
    pub port: u16,
    /// 客户端连接尝试次数
    pub connect_attempts: u32,
    pub log_level: LogLevel,
    /// 退出时写入对局记录的位置（文件或目录）
    pub record_path: Option<PathBuf>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            connect_attempts: CONNECT_ATTEMPTS,
            log_level: LogLevel::default(),
            record_path: None,
        }
    }
}

impl PeerConfig {
    /// 从文件加载配置，文件缺失或无效时使用默认配置
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("配置文件不存在，使用默认配置: {:?}", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    tracing::info!("已加载配置: {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("配置文件格式无效: {}，使用默认配置", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("无法读取配置文件: {}，使用默认配置", e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("序列化配置失败")?;
        std::fs::write(path, content)
            .with_context(|| format!("写入配置文件失败: {:?}", path))?;

        tracing::info!("配置已保存: {:?}", path);
        Ok(())
    }

    /// 主机模式的监听地址
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// 对方地址，未带端口时补上配置的端口
    pub fn peer_addr(&self, host: &str) -> String {
        if host.contains(':') {
            host.to_string()
        } else {
            format!("{}:{}", host, self.port)
        }
    }

    /// 对局记录文件路径
    ///
    /// `record_path` 是目录时按开始时间生成文件名。
    pub fn record_file(&self, started_at: &DateTime<Utc>) -> Option<PathBuf> {
        let path = self.record_path.as_ref()?;
        if path.is_dir() {
            Some(path.join(format!("game_{}.json", started_at.format("%Y%m%d_%H%M%S"))))
        } else {
            Some(path.clone())
        }
    }
}

//! 命令行参数

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::config::{LogLevel, PeerConfig};

pub const USAGE: &str = "\
Usage:
  chess-peer host [options]
  chess-peer connect <ip[:port]> [options]

Options:
  --config <path>   config file (default: chess-peer.json)
  --port <n>        listen port / default peer port
  --record <path>   write the move record here on exit (file or directory)
  --log <level>     error | warn | info | debug | trace";

/// 默认配置文件
pub const DEFAULT_CONFIG_FILE: &str = "chess-peer.json";

/// 启动方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// 监听并等待对手（执白）
    Host,
    /// 连接到对方（执黑）
    Connect(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub mode: Mode,
    pub config_path: PathBuf,
    pub port: Option<u16>,
    pub record_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// 解析参数（不含程序名）
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut mode = None;
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        let mut port = None;
        let mut record_path = None;
        let mut log_level = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "host" => mode = Some(Mode::Host),
                "connect" => {
                    let host = value_of(args, i, "connect")?;
                    mode = Some(Mode::Connect(host.to_string()));
                    i += 1;
                }
                "--config" | "-c" => {
                    config_path = PathBuf::from(value_of(args, i, "--config")?);
                    i += 1;
                }
                "--port" | "-p" => {
                    let value = value_of(args, i, "--port")?;
                    port = Some(
                        value
                            .parse()
                            .with_context(|| format!("无效端口: {}", value))?,
                    );
                    i += 1;
                }
                "--record" => {
                    record_path = Some(PathBuf::from(value_of(args, i, "--record")?));
                    i += 1;
                }
                "--log" => {
                    let value = value_of(args, i, "--log")?;
                    log_level = Some(
                        LogLevel::parse(value)
                            .with_context(|| format!("无效日志级别: {}", value))?,
                    );
                    i += 1;
                }
                other => bail!("未知参数: {}", other),
            }
            i += 1;
        }

        let mode = mode.context("需要指定 host 或 connect <ip[:port]>")?;
        Ok(Self {
            mode,
            config_path,
            port,
            record_path,
            log_level,
        })
    }

    /// 命令行参数覆盖配置文件
    pub fn apply(&self, config: &mut PeerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = &self.record_path {
            config.record_path = Some(path.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .with_context(|| format!("{} 缺少参数值", flag))
}

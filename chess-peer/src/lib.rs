//! 国际象棋双人对战端
//!
//! 包含:
//! - 对局控制（本地走子入口）
//! - 回合同步通道（TCP 点对点，主机执白）
//! - 对局通知
//! - 配置与命令行

pub mod channel;
pub mod cli;
pub mod command;
pub mod config;
pub mod controller;
pub mod game;
pub mod notice;

pub use channel::{LinkState, Role, TurnSyncChannel};
pub use cli::{CliArgs, Mode, USAGE};
pub use command::{Command, CommandError, HELP};
pub use config::{LogLevel, PeerConfig};
pub use controller::GameController;
pub use game::{Game, SharedGame};
pub use notice::{GameNotice, NoticeReceiver, NoticeSender};

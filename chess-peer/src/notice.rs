//! 对局通知
//!
//! 连接状态变化、对方走子、将军/将死都通过同一条通道推送给界面层。

use std::fmt;

use tokio::sync::mpsc;

use protocol::{Color, Move, Verdict};

pub type NoticeSender = mpsc::UnboundedSender<GameNotice>;
pub type NoticeReceiver = mpsc::UnboundedReceiver<GameNotice>;

/// 界面层需要展示的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameNotice {
    /// 连接建立，本地执 `color`
    Connected { color: Color },
    /// 第 `attempt` 次连接失败
    ConnectAttemptFailed { attempt: u32, reason: String },
    /// 所有连接尝试均失败
    ConnectFailed { attempts: u32 },
    /// 连接中断（终局）
    ConnectionLost,
    /// 对方走了一步
    OpponentMoved(Move),
    /// 被将军的阵营
    Check(Vec<Color>),
    /// 被将死的阵营（终局）
    Checkmate(Vec<Color>),
}

impl GameNotice {
    /// 局面判定对应的通知，平静局面没有通知
    pub fn from_verdict(verdict: &Verdict) -> Option<Self> {
        match verdict {
            Verdict::Quiet => None,
            Verdict::Check(colors) => Some(GameNotice::Check(colors.clone())),
            Verdict::Checkmate(colors) => Some(GameNotice::Checkmate(colors.clone())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameNotice::Checkmate(_) | GameNotice::ConnectionLost | GameNotice::ConnectFailed { .. }
        )
    }
}

fn join_colors(colors: &[Color]) -> String {
    colors
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(" and ")
}

impl fmt::Display for GameNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameNotice::Connected { color } => write!(f, "Connected. You play {}.", color),
            GameNotice::ConnectAttemptFailed { attempt, reason } => {
                write!(f, "Connection attempt {} failed: {}", attempt, reason)
            }
            GameNotice::ConnectFailed { attempts } => {
                write!(f, "Could not connect after {} attempts.", attempts)
            }
            GameNotice::ConnectionLost => write!(f, "Connection lost."),
            GameNotice::OpponentMoved(mv) => write!(f, "Opponent moved {}.", mv),
            GameNotice::Check(colors) => write!(f, "Check: {}", join_colors(colors)),
            GameNotice::Checkmate(colors) => write!(f, "Checkmate: {}", join_colors(colors)),
        }
    }
}

//! 错误类型定义

use thiserror::Error;

/// 国际象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 坐标越界（调用方缺陷，不做恢复）
    #[error("Coordinate out of range: ({x}, {y})")]
    OutOfRange { x: i32, y: i32 },

    /// 没有棋子
    #[error("No piece at position ({x}, {y})")]
    NoPiece { x: u8, y: u8 },

    /// 不是你的回合
    #[error("Not your turn")]
    NotYourTurn,

    /// 尚未建立连接
    #[error("Not connected to a peer")]
    NotConnected,
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误（bincode）
    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 帧长度不正确
    #[error("Invalid frame: {size} bytes (expected: {expected})")]
    InvalidFrame { size: usize, expected: usize },

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 连接丢失（发送或接收失败，不会自动重连）
    #[error("Connection lost")]
    ConnectionLost,

    /// 多次尝试后仍无法连接
    #[error("Connection failed after {attempts} attempts")]
    ConnectFailed { attempts: u32 },

    /// 象棋规则错误
    #[error("Chess error: {0}")]
    Chess(#[from] ChessError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

//! 对局记录
//!
//! 记录双方走法（本地/对方来源、时间戳），支持 JSON 导出。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::moves::Move;
use crate::piece::{Color, Piece, Square};

/// 记录版本
pub const RECORD_VERSION: &str = "1.0";

/// 走法来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOrigin {
    /// 本地玩家走出
    Local,
    /// 对方发来（未经验证直接落子）
    Remote,
}

/// 走法记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 起始位置 [x, y]
    pub from: [u8; 2],
    /// 目标位置 [x, y]
    pub to: [u8; 2],
    /// 格子名表示，如 `E2-E4`
    pub notation: String,
    /// 走子的棋子，如 `pawn_white`
    pub piece: String,
    /// 被吃的棋子
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    pub origin: MoveOrigin,
    pub timestamp: DateTime<Utc>,
}

impl MoveRecord {
    /// 创建新的走法记录
    pub fn new(mv: Move, piece: &Piece, captured: Option<&Piece>, origin: MoveOrigin) -> Self {
        Self {
            from: [mv.from.x, mv.from.y],
            to: [mv.to.x, mv.to.y],
            notation: mv.to_string(),
            piece: piece.asset_name(),
            captured: captured.map(Piece::asset_name),
            origin,
            timestamp: Utc::now(),
        }
    }

    /// 还原为走法
    pub fn to_move(&self) -> Option<Move> {
        let from = Square::new(self.from[0] as i32, self.from[1] as i32).ok()?;
        let to = Square::new(self.to[0] as i32, self.to[1] as i32).ok()?;
        Some(Move::new(from, to))
    }
}

/// 完整的对局记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 本地玩家执子颜色（连接建立前未知）
    pub local_color: Option<Color>,
    /// 开始时间
    pub started_at: DateTime<Utc>,
    /// 走法列表
    pub moves: Vec<MoveRecord>,
}

impl GameRecord {
    /// 创建新的对局记录
    pub fn new() -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            local_color: None,
            started_at: Utc::now(),
            moves: Vec::new(),
        }
    }

    /// 添加走法
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    /// 清空走法并重置开始时间（本地颜色保留）
    pub fn restart(&mut self) {
        self.moves.clear();
        self.started_at = Utc::now();
    }

    /// 最后一步
    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// 导出为 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 导入
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new()
    }
}

//! 棋子与坐标定义

use serde::{Deserialize, Serialize};

use crate::constants::BOARD_SIZE;
use crate::error::ChessError;

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// 王
    King,
    /// 后
    Queen,
    /// 象
    Bishop,
    /// 马
    Knight,
    /// 车
    Rook,
    /// 兵
    Pawn,
}

impl PieceKind {
    /// 底线摆放顺序（x = 0..7）
    pub const BACK_RANK: [PieceKind; BOARD_SIZE] = [
        PieceKind::Rook,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Queen,
        PieceKind::King,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    /// 小写名称
    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Rook => "rook",
            PieceKind::Pawn => "pawn",
        }
    }

    /// 字母表示（白方大写，黑方小写）
    pub fn to_char(&self, color: Color) -> char {
        let c = match self {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Rook => 'r',
            PieceKind::Pawn => 'p',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手，在 y = 0 一侧）
    White,
    /// 黑方（后手，在 y = 7 一侧）
    Black,
}

impl Color {
    /// 两个阵营，白方在前
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 兵的前进方向
    pub fn forward(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// 底线所在行
    pub fn back_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// 兵的初始行
    pub fn pawn_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 棋子标识，由棋盘分配
pub type PieceId = u32;

/// 棋子
///
/// 棋子归棋盘独占；`id` 区分同类型同颜色的不同实例，
/// 两个值表示同一个棋子当且仅当 `id` 相同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: Color,
    /// 已走步数（兵用来判断能否走两格）
    pub moves: u32,
}

impl Piece {
    /// 创建新棋子（由棋盘分配 id）
    pub(crate) fn new(id: PieceId, kind: PieceKind, color: Color) -> Self {
        Self {
            id,
            kind,
            color,
            moves: 0,
        }
    }

    /// 是否与另一个值是同一个棋子
    pub fn same_piece(&self, other: &Piece) -> bool {
        self.id == other.id
    }

    /// 棋子资源名，如 `rook_white`
    pub fn asset_name(&self) -> String {
        format!("{}_{}", self.kind.name(), self.color.name())
    }

    /// 字母表示
    pub fn to_char(&self) -> char {
        self.kind.to_char(self.color)
    }
}

/// 棋盘坐标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 列 (0-7)
    pub x: u8,
    /// 行 (0-7)
    pub y: u8,
}

impl Square {
    /// 从原始整数创建坐标，越界时返回 `OutOfRange`
    pub fn new(x: i32, y: i32) -> Result<Self, ChessError> {
        if Self::in_range(x) && Self::in_range(y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(ChessError::OutOfRange { x, y })
        }
    }

    /// 创建新坐标（不检查边界，内部使用）
    pub const fn new_unchecked(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    fn in_range(v: i32) -> bool {
        (0..BOARD_SIZE as i32).contains(&v)
    }

    /// 检查坐标是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.x as usize) < BOARD_SIZE && (self.y as usize) < BOARD_SIZE
    }

    /// 获取偏移后的坐标
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Square> {
        let new_x = self.x as i32 + dx as i32;
        let new_y = self.y as i32 + dy as i32;
        Square::new(new_x, new_y).ok()
    }

    /// 转换为数组索引
    pub fn to_index(&self) -> usize {
        self.y as usize * BOARD_SIZE + self.x as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_SIZE * BOARD_SIZE {
            Some(Square {
                x: (index % BOARD_SIZE) as u8,
                y: (index / BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 遍历全部 64 个格子（先行后列）
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE * BOARD_SIZE).filter_map(Square::from_index)
    }

    /// 格子名称，如 `A1`、`H8`
    pub fn name(&self) -> String {
        let file = (b'A' + self.x) as char;
        let rank = (b'1' + self.y) as char;
        format!("{file}{rank}")
    }

    /// 从格子名称解析（大小写不敏感）
    pub fn from_name(name: &str) -> Option<Square> {
        let bytes = name.trim().as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let x = bytes[0].to_ascii_uppercase() as i32 - b'A' as i32;
        let y = bytes[1] as i32 - b'1' as i32;
        Square::new(x, y).ok()
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

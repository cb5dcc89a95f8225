//! 棋盘状态
//!
//! 棋盘是全部棋子的唯一所有者，每次改动格子都会向订阅者发送带坐标的变更通知。

use tokio::sync::mpsc;

use crate::constants::{BOARD_SIZE, SQUARE_COUNT};
use crate::error::ChessError;
use crate::moves::MoveGenerator;
use crate::piece::{Color, Piece, PieceId, PieceKind, Square};

/// 格子变更通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareChanged {
    pub square: Square,
}

/// 棋盘
#[derive(Debug)]
pub struct Board {
    /// 8x8 棋盘，索引为 y * 8 + x
    squares: [Option<Piece>; SQUARE_COUNT],
    /// 被吃掉的白方棋子（按吃子顺序）
    captured_white: Vec<Piece>,
    /// 被吃掉的黑方棋子（按吃子顺序）
    captured_black: Vec<Piece>,
    /// 下一个棋子 id
    next_id: PieceId,
    /// 变更通知订阅者
    listeners: Vec<mpsc::UnboundedSender<SquareChanged>>,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: [None; SQUARE_COUNT],
            captured_white: Vec::new(),
            captured_black: Vec::new(),
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.reset();
        board
    }

    /// 复制一份不带订阅者的棋盘，用于走法模拟
    pub fn detached(&self) -> Self {
        Self {
            squares: self.squares,
            captured_white: self.captured_white.clone(),
            captured_black: self.captured_black.clone(),
            next_id: self.next_id,
            listeners: Vec::new(),
        }
    }

    /// 订阅格子变更通知
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SquareChanged> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    /// 恢复开局局面
    ///
    /// 旧棋子全部丢弃，重新创建（新 id，步数清零），吃子记录清空。
    pub fn reset(&mut self) {
        self.captured_white.clear();
        self.captured_black.clear();

        for color in Color::ALL {
            for (x, kind) in PieceKind::BACK_RANK.into_iter().enumerate() {
                let piece = self.new_piece(kind, color);
                self.put(Square::new_unchecked(x as u8, color.back_rank()), Some(piece));
            }
            for x in 0..BOARD_SIZE as u8 {
                let piece = self.new_piece(PieceKind::Pawn, color);
                self.put(Square::new_unchecked(x, color.pawn_rank()), Some(piece));
            }
        }

        // 清空中间四行
        for y in 2..6 {
            for x in 0..BOARD_SIZE as u8 {
                self.put(Square::new_unchecked(x, y), None);
            }
        }
    }

    /// 清空全部格子（用于构造局面）
    pub fn clear(&mut self) {
        for sq in Square::all() {
            self.put(sq, None);
        }
        self.captured_white.clear();
        self.captured_black.clear();
    }

    /// 在指定位置放置一个新棋子（用于构造局面）
    pub fn place(
        &mut self,
        x: i32,
        y: i32,
        kind: PieceKind,
        color: Color,
    ) -> Result<Piece, ChessError> {
        let sq = Square::new(x, y)?;
        let piece = self.new_piece(kind, color);
        self.put(sq, Some(piece));
        Ok(piece)
    }

    fn new_piece(&mut self, kind: PieceKind, color: Color) -> Piece {
        let id = self.next_id;
        self.next_id += 1;
        Piece::new(id, kind, color)
    }

    /// 获取指定坐标的棋子，越界返回 `OutOfRange`
    pub fn get(&self, x: i32, y: i32) -> Result<Option<Piece>, ChessError> {
        let sq = Square::new(x, y)?;
        Ok(self.at(sq))
    }

    /// 设置指定坐标的棋子
    pub(crate) fn set(&mut self, x: i32, y: i32, piece: Option<Piece>) -> Result<(), ChessError> {
        let sq = Square::new(x, y)?;
        self.put(sq, piece);
        Ok(())
    }

    /// 获取指定位置的棋子
    pub fn at(&self, sq: Square) -> Option<Piece> {
        if sq.is_valid() {
            self.squares[sq.to_index()]
        } else {
            None
        }
    }

    /// 写入格子；内容未变化时不做任何事，否则发送变更通知
    pub(crate) fn put(&mut self, sq: Square, piece: Option<Piece>) {
        if !sq.is_valid() {
            return;
        }
        let slot = &mut self.squares[sq.to_index()];
        if *slot == piece {
            return;
        }
        *slot = piece;
        self.notify(sq);
    }

    fn notify(&mut self, square: Square) {
        self.listeners
            .retain(|tx| tx.send(SquareChanged { square }).is_ok());
    }

    /// 检查走法是否合法（原始整数坐标版本）
    pub fn can_move_to(
        &self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    ) -> Result<bool, ChessError> {
        let from = Square::new(from_x, from_y)?;
        let to = Square::new(to_x, to_y)?;
        Ok(MoveGenerator::can_move_to(self, from, to))
    }

    /// 执行一步经过规则验证的走法，返回是否成功
    ///
    /// 目标格的棋子被吃掉并记入吃子记录；起点和终点各发送一次变更通知。
    pub fn move_to(&mut self, from: Square, to: Square) -> bool {
        if !MoveGenerator::can_move_to(self, from, to) {
            return false;
        }
        self.apply_unchecked(from, to);
        true
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    ///
    /// 对方发来的走法直接通过此方法落子。起点为空时什么也不做。
    pub fn apply_unchecked(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.at(from)?;
        if from == to {
            return None;
        }

        let captured = self.at(to);
        if let Some(victim) = captured {
            self.capture(victim);
        }

        piece.moves += 1;
        self.put(from, None);
        self.put(to, Some(piece));
        captured
    }

    fn capture(&mut self, victim: Piece) {
        tracing::debug!("captured {}", victim.asset_name());
        match victim.color {
            Color::White => self.captured_white.push(victim),
            Color::Black => self.captured_black.push(victim),
        }
    }

    /// 被吃掉的指定阵营棋子
    pub fn captured(&self, color: Color) -> &[Piece] {
        match color {
            Color::White => &self.captured_white,
            Color::Black => &self.captured_black,
        }
    }

    /// 查找指定阵营的王
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.all_pieces()
            .into_iter()
            .find(|(_, piece)| piece.kind == PieceKind::King && piece.color == color)
            .map(|(sq, _)| sq)
    }

    /// 查找棋子当前所在位置
    pub fn locate(&self, id: PieceId) -> Option<Square> {
        self.all_pieces()
            .into_iter()
            .find(|(_, piece)| piece.id == id)
            .map(|(sq, _)| sq)
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, color: Color) -> Vec<(Square, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.color == color)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Square, Piece)> {
        Square::all()
            .filter_map(|sq| self.at(sq).map(|piece| (sq, piece)))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Board {
    /// 文本棋盘，黑方在上
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in (0..BOARD_SIZE as u8).rev() {
            write!(f, "{} ", y + 1)?;
            for x in 0..BOARD_SIZE as u8 {
                let c = self
                    .at(Square::new_unchecked(x, y))
                    .map(|p| p.to_char())
                    .unwrap_or('.');
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for x in 0..BOARD_SIZE as u8 {
            write!(f, " {}", (b'A' + x) as char)?;
        }
        Ok(())
    }
}

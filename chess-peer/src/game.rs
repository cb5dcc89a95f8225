//! 对局状态
//!
//! 棋盘与走法记录放在同一把锁后面，本地走子和接收循环落子互斥。

use std::sync::Arc;

use tokio::sync::Mutex;

use protocol::{
    Board, CheckDetector, Color, GameRecord, Move, MoveGenerator, MoveOrigin, MoveRecord, Verdict,
};

/// 两端共享的对局句柄
pub type SharedGame = Arc<Mutex<Game>>;

/// 一局棋
#[derive(Debug)]
pub struct Game {
    pub board: Board,
    pub record: GameRecord,
}

impl Game {
    /// 标准开局
    pub fn new() -> Self {
        Self {
            board: Board::initial(),
            record: GameRecord::new(),
        }
    }

    pub fn shared(self) -> SharedGame {
        Arc::new(Mutex::new(self))
    }

    /// 恢复开局并清空走法记录
    pub fn reset(&mut self) {
        self.board.reset();
        self.record.restart();
    }

    /// 本地走子
    ///
    /// 只能走 `color` 一方的棋子，且走完后己方王不能处于可被吃的位置。
    /// 不满足时棋盘保持不变并返回 false。
    pub fn play_local(&mut self, mv: Move, color: Color) -> bool {
        let Some(piece) = self.board.at(mv.from) else {
            return false;
        };
        if piece.color != color {
            return false;
        }
        if MoveGenerator::would_be_own_king_capturable(&self.board, mv.from, mv.to) {
            return false;
        }

        let captured = self.board.at(mv.to);
        if !self.board.move_to(mv.from, mv.to) {
            return false;
        }

        self.record.add_move(MoveRecord::new(
            mv,
            &piece,
            captured.as_ref(),
            MoveOrigin::Local,
        ));
        true
    }

    /// 对方走子，不做任何规则检查
    ///
    /// 起点为空或起点与终点相同时返回 false，棋盘和记录不变。
    pub fn apply_remote(&mut self, mv: Move) -> bool {
        if mv.from == mv.to {
            return false;
        }
        let Some(piece) = self.board.at(mv.from) else {
            return false;
        };

        let captured = self.board.apply_unchecked(mv.from, mv.to);
        self.record.add_move(MoveRecord::new(
            mv,
            &piece,
            captured.as_ref(),
            MoveOrigin::Remote,
        ));
        true
    }

    pub fn verdict(&self) -> Verdict {
        CheckDetector::check_or_checkmate(&self.board)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

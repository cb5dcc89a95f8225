//! 将军与将死检测

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::MoveGenerator;
use crate::piece::{Color, PieceKind};

/// 局面判定结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// 无事发生
    Quiet,
    /// 被将军的阵营（非终局）
    Check(Vec<Color>),
    /// 被将死的阵营（终局）
    Checkmate(Vec<Color>),
}

impl Verdict {
    /// 是否终局
    pub fn is_terminal(&self) -> bool {
        matches!(self, Verdict::Checkmate(_))
    }
}

/// 将军/将死检测器
pub struct CheckDetector;

impl CheckDetector {
    /// 王可被吃的阵营（可能为空、一方或双方）
    pub fn check(board: &Board) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|&color| {
                board.pieces(color).into_iter().any(|(sq, piece)| {
                    piece.kind == PieceKind::King && MoveGenerator::is_capturable(board, sq)
                })
            })
            .collect()
    }

    /// 没有任何合法走法的阵营
    ///
    /// 困毙与将死不作区分，两者都会被报告。
    pub fn checkmate(board: &Board) -> Vec<Color> {
        Color::ALL
            .into_iter()
            .filter(|&color| !MoveGenerator::has_escape(board, color))
            .collect()
    }

    /// 先判断将死；无人被将死时再判断将军
    pub fn check_or_checkmate(board: &Board) -> Verdict {
        let mated = Self::checkmate(board);
        if !mated.is_empty() {
            return Verdict::Checkmate(mated);
        }

        let checked = Self::check(board);
        if !checked.is_empty() {
            return Verdict::Check(checked);
        }

        Verdict::Quiet
    }
}

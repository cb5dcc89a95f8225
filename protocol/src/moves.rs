//! 走法验证
//!
//! 每种棋子的合法目标判断，以及直线/斜线射线检测等共用函数。

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::piece::{Color, PieceKind, Square};

/// 走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Square,
    /// 目标位置
    pub to: Square,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from.name(), self.to.name())
    }
}

/// 目标格类型（用于高亮）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// 移动到空格
    Movement,
    /// 吃子
    Capture,
}

/// 可走目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub square: Square,
    pub kind: TargetKind,
}

/// 两格是否相邻（八个方向）
pub fn is_adjacent(from: Square, to: Square) -> bool {
    let dx = (to.x as i8 - from.x as i8).abs();
    let dy = (to.y as i8 - from.y as i8).abs();
    dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
}

/// 是否为马步（2+1）
pub fn is_knight_jump(from: Square, to: Square) -> bool {
    let dx = (to.x as i8 - from.x as i8).abs();
    let dy = (to.y as i8 - from.y as i8).abs();
    (dx == 2 && dy == 1) || (dx == 1 && dy == 2)
}

/// 目标格为空或为对方棋子
pub fn empty_or_enemy(board: &Board, to: Square, color: Color) -> bool {
    match board.at(to) {
        Some(target) => target.color != color,
        None => true,
    }
}

/// 起点与终点之间（不含两端）的格子是否全部为空
///
/// 调用方保证两点在同一直线或同一斜线上。
fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let dx = (to.x as i8 - from.x as i8).signum();
    let dy = (to.y as i8 - from.y as i8).signum();

    let mut current = from;
    while let Some(next) = current.offset(dx, dy) {
        if next == to {
            return true;
        }
        if board.at(next).is_some() {
            return false;
        }
        current = next;
    }
    false
}

/// 直线射线：同行或同列、中间无子、终点为空或可吃
pub fn straight_ray_clear(board: &Board, from: Square, to: Square, color: Color) -> bool {
    if from == to || (from.x != to.x && from.y != to.y) {
        return false;
    }
    path_clear(board, from, to) && empty_or_enemy(board, to, color)
}

/// 斜线射线：同一斜线、中间无子、终点为空或可吃
pub fn diagonal_ray_clear(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let dx = (to.x as i8 - from.x as i8).abs();
    let dy = (to.y as i8 - from.y as i8).abs();
    if from == to || dx != dy {
        return false;
    }
    path_clear(board, from, to) && empty_or_enemy(board, to, color)
}

/// 走法验证器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 检查 `from` 上的棋子能否走到 `to`（不考虑自己的王是否被将）
    pub fn can_move_to(board: &Board, from: Square, to: Square) -> bool {
        let Some(piece) = board.at(from) else {
            return false;
        };
        if from == to || !to.is_valid() {
            return false;
        }

        match piece.kind {
            PieceKind::King => is_adjacent(from, to) && empty_or_enemy(board, to, piece.color),
            PieceKind::Queen => {
                diagonal_ray_clear(board, from, to, piece.color)
                    || straight_ray_clear(board, from, to, piece.color)
            }
            PieceKind::Bishop => diagonal_ray_clear(board, from, to, piece.color),
            PieceKind::Rook => straight_ray_clear(board, from, to, piece.color),
            PieceKind::Knight => is_knight_jump(from, to) && empty_or_enemy(board, to, piece.color),
            PieceKind::Pawn => Self::can_pawn_move(board, from, to, piece.color, piece.moves),
        }
    }

    /// 兵：向前一格；从未走过时可向前两格；斜前一格吃子
    fn can_pawn_move(board: &Board, from: Square, to: Square, color: Color, moves: u32) -> bool {
        let forward = color.forward();
        let dx = to.x as i8 - from.x as i8;
        let dy = to.y as i8 - from.y as i8;

        if dx == 0 {
            if dy == forward {
                return board.at(to).is_none();
            }
            if dy == 2 * forward && moves == 0 {
                let between = from.offset(0, forward);
                return board.at(to).is_none() && between.is_some_and(|sq| board.at(sq).is_none());
            }
            return false;
        }

        dx.abs() == 1
            && dy == forward
            && board.at(to).is_some_and(|target| target.color != color)
    }

    /// 是否有任意棋子能走到该格
    ///
    /// 不区分颜色：棋盘上任何一枚棋子（包括同色）能走到此格即视为可被吃。
    pub fn is_capturable(board: &Board, square: Square) -> bool {
        board
            .all_pieces()
            .into_iter()
            .any(|(sq, _)| Self::can_move_to(board, sq, square))
    }

    /// 模拟走棋后，走子方自己的王是否可被吃
    ///
    /// 模拟在副本上进行，原棋盘不变。走法本身不合法、起点为空或
    /// 找不到己方王时返回 false。
    pub fn would_be_own_king_capturable(board: &Board, from: Square, to: Square) -> bool {
        let Some(mover) = board.at(from) else {
            return false;
        };
        if !Self::can_move_to(board, from, to) {
            return false;
        }

        let mut scratch = board.detached();
        scratch.put(to, Some(mover));
        scratch.put(from, None);

        match scratch.find_king(mover.color) {
            Some(king) => Self::is_capturable(&scratch, king),
            None => false,
        }
    }

    /// 可走且不会暴露己方王的所有目标格
    pub fn legal_destinations(board: &Board, from: Square) -> Vec<Target> {
        Square::all()
            .filter(|&to| {
                Self::can_move_to(board, from, to)
                    && !Self::would_be_own_king_capturable(board, from, to)
            })
            .map(|square| Target {
                square,
                kind: if board.at(square).is_some() {
                    TargetKind::Capture
                } else {
                    TargetKind::Movement
                },
            })
            .collect()
    }

    /// 指定阵营的所有合法走法
    pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
        board
            .pieces(color)
            .into_iter()
            .flat_map(|(from, _)| {
                Self::legal_destinations(board, from)
                    .into_iter()
                    .map(move |target| Move::new(from, target.square))
            })
            .collect()
    }

    /// 指定阵营是否至少有一步合法走法
    pub fn has_escape(board: &Board, color: Color) -> bool {
        board.pieces(color).into_iter().any(|(from, _)| {
            Square::all().any(|to| {
                Self::can_move_to(board, from, to)
                    && !Self::would_be_own_king_capturable(board, from, to)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(x: u8, y: u8) -> Square {
        Square::new_unchecked(x, y)
    }

    #[test]
    fn test_knight_alone() {
        let mut board = Board::empty();
        board.place(1, 0, PieceKind::Knight, Color::White).unwrap();

        assert!(board.can_move_to(1, 0, 0, 2).unwrap());
        assert!(board.can_move_to(1, 0, 2, 2).unwrap());
        assert!(board.can_move_to(1, 0, 3, 1).unwrap());
        assert!(!board.can_move_to(1, 0, 1, 1).unwrap());
        assert!(!board.can_move_to(1, 0, 1, 0).unwrap());
    }

    #[test]
    fn test_knight_jumps_over_pieces() {
        let board = Board::initial();
        // 开局马可以越过兵
        assert!(MoveGenerator::can_move_to(&board, sq(1, 0), sq(2, 2)));
        assert!(MoveGenerator::can_move_to(&board, sq(6, 7), sq(5, 5)));
        // 不能落在己方棋子上
        assert!(!MoveGenerator::can_move_to(&board, sq(1, 0), sq(3, 1)));
    }

    #[test]
    fn test_rook_blocked_by_own_bishop() {
        let mut board = Board::empty();
        board.place(0, 0, PieceKind::Rook, Color::White).unwrap();
        board.place(0, 3, PieceKind::Bishop, Color::White).unwrap();

        assert!(!board.can_move_to(0, 0, 0, 5).unwrap());
        assert!(board.can_move_to(0, 0, 0, 2).unwrap());
        assert!(!board.can_move_to(0, 0, 0, 3).unwrap());
        assert!(board.can_move_to(0, 0, 7, 0).unwrap());
        assert!(!board.can_move_to(0, 0, 1, 1).unwrap());
    }

    #[test]
    fn test_rook_captures_enemy_but_not_beyond() {
        let mut board = Board::empty();
        board.place(4, 4, PieceKind::Rook, Color::Black).unwrap();
        board.place(1, 4, PieceKind::Pawn, Color::White).unwrap();

        assert!(MoveGenerator::can_move_to(&board, sq(4, 4), sq(1, 4)));
        assert!(!MoveGenerator::can_move_to(&board, sq(4, 4), sq(0, 4)));
    }

    #[test]
    fn test_bishop_diagonals() {
        let mut board = Board::empty();
        board.place(2, 0, PieceKind::Bishop, Color::White).unwrap();
        board.place(4, 2, PieceKind::Pawn, Color::Black).unwrap();

        // 向右上被黑兵挡住，但可以吃它
        assert!(MoveGenerator::can_move_to(&board, sq(2, 0), sq(3, 1)));
        assert!(MoveGenerator::can_move_to(&board, sq(2, 0), sq(4, 2)));
        assert!(!MoveGenerator::can_move_to(&board, sq(2, 0), sq(5, 3)));
        // 向左上畅通
        assert!(MoveGenerator::can_move_to(&board, sq(2, 0), sq(0, 2)));
        // 不能直走
        assert!(!MoveGenerator::can_move_to(&board, sq(2, 0), sq(2, 3)));
    }

    #[test]
    fn test_queen_combines_rays() {
        let mut board = Board::empty();
        board.place(3, 3, PieceKind::Queen, Color::Black).unwrap();

        assert!(MoveGenerator::can_move_to(&board, sq(3, 3), sq(3, 7)));
        assert!(MoveGenerator::can_move_to(&board, sq(3, 3), sq(0, 0)));
        assert!(MoveGenerator::can_move_to(&board, sq(3, 3), sq(7, 7)));
        assert!(MoveGenerator::can_move_to(&board, sq(3, 3), sq(6, 0)));
        assert!(!MoveGenerator::can_move_to(&board, sq(3, 3), sq(4, 5)));

        let board = Board::initial();
        // 开局后被完全包围
        assert!(MoveGenerator::legal_destinations(&board, sq(3, 0)).is_empty());
    }

    #[test]
    fn test_king_moves() {
        let mut board = Board::empty();
        board.place(4, 4, PieceKind::King, Color::White).unwrap();
        board.place(5, 5, PieceKind::Pawn, Color::White).unwrap();
        board.place(3, 3, PieceKind::Pawn, Color::Black).unwrap();

        let targets: Vec<Target> = Square::all()
            .filter(|&to| MoveGenerator::can_move_to(&board, sq(4, 4), to))
            .map(|square| Target { square, kind: TargetKind::Movement })
            .collect();
        // 8 个相邻格减去己方兵所在的一格
        assert_eq!(targets.len(), 7);
        assert!(MoveGenerator::can_move_to(&board, sq(4, 4), sq(3, 3)));
        assert!(!MoveGenerator::can_move_to(&board, sq(4, 4), sq(5, 5)));
        assert!(!MoveGenerator::can_move_to(&board, sq(4, 4), sq(4, 6)));
    }

    #[test]
    fn test_pawn_double_step_then_single() {
        let mut board = Board::empty();
        board.place(3, 1, PieceKind::Pawn, Color::White).unwrap();

        assert!(board.can_move_to(3, 1, 3, 2).unwrap());
        assert!(board.can_move_to(3, 1, 3, 3).unwrap());
        assert!(!board.can_move_to(3, 1, 3, 4).unwrap());
        assert!(!board.can_move_to(3, 1, 3, 0).unwrap());

        assert!(board.move_to(sq(3, 1), sq(3, 2)));
        let pawn = board.at(sq(3, 2)).unwrap();
        assert_eq!(pawn.moves, 1);

        assert!(!board.can_move_to(3, 2, 3, 4).unwrap());
        assert!(board.can_move_to(3, 2, 3, 3).unwrap());
    }

    #[test]
    fn test_pawn_double_step_blocked() {
        let mut board = Board::empty();
        board.place(3, 6, PieceKind::Pawn, Color::Black).unwrap();
        board.place(3, 5, PieceKind::Knight, Color::White).unwrap();

        // 中间格被占，不能走两格，也不能直走吃子
        assert!(!board.can_move_to(3, 6, 3, 4).unwrap());
        assert!(!board.can_move_to(3, 6, 3, 5).unwrap());
    }

    #[test]
    fn test_pawn_double_step_gated_by_counter() {
        // 步数计数决定能否走两格，与所在行无关
        let mut board = Board::empty();
        board.place(0, 4, PieceKind::Pawn, Color::White).unwrap();
        assert!(board.can_move_to(0, 4, 0, 6).unwrap());
    }

    #[test]
    fn test_pawn_diagonal_capture() {
        let mut board = Board::empty();
        board.place(4, 6, PieceKind::Pawn, Color::Black).unwrap();
        board.place(3, 5, PieceKind::Knight, Color::White).unwrap();
        board.place(5, 5, PieceKind::Knight, Color::Black).unwrap();

        // 黑兵向 -y 方向吃子
        assert!(board.can_move_to(4, 6, 3, 5).unwrap());
        // 不能吃己方
        assert!(!board.can_move_to(4, 6, 5, 5).unwrap());
        // 斜后方不行
        board.place(3, 7, PieceKind::Knight, Color::White).unwrap();
        assert!(!board.can_move_to(4, 6, 3, 7).unwrap());
        // 斜前方空格不能走
        assert!(!board.can_move_to(4, 6, 5, 7).unwrap());
    }

    #[test]
    fn test_empty_origin() {
        let board = Board::empty();
        assert!(!MoveGenerator::can_move_to(&board, sq(0, 0), sq(0, 1)));
        assert!(!MoveGenerator::would_be_own_king_capturable(&board, sq(0, 0), sq(0, 1)));
    }

    #[test]
    fn test_capturable_literal() {
        let mut board = Board::empty();
        board.place(4, 0, PieceKind::King, Color::White).unwrap();
        board.place(4, 7, PieceKind::Rook, Color::Black).unwrap();

        assert!(MoveGenerator::is_capturable(&board, sq(4, 0)));

        // 中间挡一个子后不再可被吃
        board.place(4, 3, PieceKind::Pawn, Color::White).unwrap();
        assert!(!MoveGenerator::is_capturable(&board, sq(4, 0)));

        // 空格也可以查询：任何棋子能走到即为 true
        assert!(MoveGenerator::is_capturable(&board, sq(4, 4)));
    }

    #[test]
    fn test_would_be_own_king_capturable() {
        let mut board = Board::empty();
        board.place(4, 0, PieceKind::King, Color::White).unwrap();
        board.place(4, 1, PieceKind::Bishop, Color::White).unwrap();
        board.place(4, 7, PieceKind::Rook, Color::Black).unwrap();

        // 象离开 e 线会暴露王
        assert!(MoveGenerator::would_be_own_king_capturable(&board, sq(4, 1), sq(5, 2)));
        // 王横走一格安全
        assert!(!MoveGenerator::would_be_own_king_capturable(&board, sq(4, 0), sq(3, 0)));
        // 不合法的走法直接返回 false
        assert!(!MoveGenerator::would_be_own_king_capturable(&board, sq(4, 1), sq(4, 2)));
    }

    #[test]
    fn test_simulation_restores_every_square() {
        let mut board = Board::initial();
        board.apply_unchecked(sq(3, 7), sq(7, 3)); // 黑后到 h4
        board.apply_unchecked(sq(5, 1), sq(5, 2)); // 白兵 f3

        let before: Vec<_> = Square::all().map(|s| board.at(s)).collect();
        let mut rx = board.subscribe();

        for from in Square::all() {
            for to in Square::all() {
                let _ = MoveGenerator::would_be_own_king_capturable(&board, from, to);
            }
        }

        let after: Vec<_> = Square::all().map(|s| board.at(s)).collect();
        assert_eq!(before, after);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_simulated_capture_restores_victim() {
        let mut board = Board::empty();
        board.place(0, 0, PieceKind::King, Color::White).unwrap();
        board.place(0, 1, PieceKind::Rook, Color::White).unwrap();
        let victim = board.place(0, 6, PieceKind::Queen, Color::Black).unwrap();

        assert!(!MoveGenerator::would_be_own_king_capturable(&board, sq(0, 1), sq(0, 6)));
        assert_eq!(board.at(sq(0, 6)), Some(victim));
        assert!(board.captured(Color::Black).is_empty());
    }

    #[test]
    fn test_legal_destinations_tags() {
        let mut board = Board::empty();
        board.place(0, 0, PieceKind::King, Color::White).unwrap();
        board.place(2, 2, PieceKind::Knight, Color::White).unwrap();
        board.place(3, 4, PieceKind::Pawn, Color::Black).unwrap();

        let targets = MoveGenerator::legal_destinations(&board, sq(2, 2));
        assert_eq!(targets.len(), 8);
        let capture = targets.iter().find(|t| t.square == sq(3, 4)).unwrap();
        assert_eq!(capture.kind, TargetKind::Capture);
        assert!(targets
            .iter()
            .filter(|t| t.square != sq(3, 4))
            .all(|t| t.kind == TargetKind::Movement));
    }

    #[test]
    fn test_initial_legal_moves() {
        let board = Board::initial();
        // 16 步兵 + 4 步马
        assert_eq!(MoveGenerator::legal_moves(&board, Color::White).len(), 20);
        assert_eq!(MoveGenerator::legal_moves(&board, Color::Black).len(), 20);
        assert!(MoveGenerator::has_escape(&board, Color::White));
    }

    #[test]
    fn test_move_display() {
        let mv = Move::new(sq(4, 1), sq(4, 3));
        assert_eq!(mv.to_string(), "E2-E4");
    }
}

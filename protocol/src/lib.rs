//! 国际象棋共享协议库
//!
//! 包含:
//! - 棋子、棋盘、坐标等核心数据结构
//! - 走法规则验证与将军/将死检测
//! - 16 字节走法帧 (MoveFrame)
//! - 传输层抽象 (Connector, Connection, Listener traits)
//! - 对局记录 (JSON)

mod board;
mod constants;
mod error;
mod message;
mod moves;
mod piece;
mod record;
mod status;
mod transport;

pub use board::{Board, SquareChanged};
pub use constants::*;
pub use error::{ChessError, ProtocolError, Result};
pub use message::MoveFrame;
pub use moves::{
    diagonal_ray_clear, empty_or_enemy, is_adjacent, is_knight_jump, straight_ray_clear,
    Move, MoveGenerator, Target, TargetKind,
};
pub use piece::{Color, Piece, PieceId, PieceKind, Square};
pub use record::{GameRecord, MoveOrigin, MoveRecord, RECORD_VERSION};
pub use status::{CheckDetector, Verdict};
pub use transport::{
    Connection, Connector, FrameReader, FrameWriter, Listener, TcpConnection, TcpConnector,
    TcpListener,
};

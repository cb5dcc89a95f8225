//! 走法消息定义
//!
//! 每条消息是固定 16 字节的帧：四个网络字节序 int32
//! `[from_x, from_y, to_x, to_y]`。

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_SIZE, NO_COORD};
use crate::error::{ProtocolError, Result};
use crate::moves::Move;
use crate::piece::Square;

/// 走法帧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveFrame {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
}

/// 定长整数 + 大端序，保证每帧恰好 16 字节
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
}

impl MoveFrame {
    /// 创建新帧
    pub fn new(from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> Self {
        Self {
            from_x,
            from_y,
            to_x,
            to_y,
        }
    }

    /// 哨兵帧（所有字段为 -1）
    pub fn sentinel() -> Self {
        Self::new(NO_COORD, NO_COORD, NO_COORD, NO_COORD)
    }

    /// 转换为走法；任一字段越界（含哨兵值）时返回 None
    pub fn to_move(&self) -> Option<Move> {
        let from = Square::new(self.from_x, self.from_y).ok()?;
        let to = Square::new(self.to_x, self.to_y).ok()?;
        Some(Move::new(from, to))
    }

    /// 编码为 16 字节
    pub fn encode(&self) -> Result<[u8; FRAME_SIZE]> {
        let bytes = codec().serialize(self)?;
        let size = bytes.len();
        bytes.try_into().map_err(|_| ProtocolError::InvalidFrame {
            size,
            expected: FRAME_SIZE,
        })
    }

    /// 从 16 字节解码
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_SIZE {
            return Err(ProtocolError::InvalidFrame {
                size: bytes.len(),
                expected: FRAME_SIZE,
            });
        }
        Ok(codec().deserialize(bytes)?)
    }
}

impl From<Move> for MoveFrame {
    fn from(mv: Move) -> Self {
        Self::new(
            mv.from.x as i32,
            mv.from.y as i32,
            mv.to.x as i32,
            mv.to.y as i32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_byte_order() {
        let frame = MoveFrame::new(1, 2, 3, 258);
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes, [0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 1, 2]);
        assert_eq!(MoveFrame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_sentinel_encoding() {
        let bytes = MoveFrame::sentinel().encode().unwrap();
        assert!(bytes.iter().all(|&b| b == 0xFF));
        assert!(MoveFrame::decode(&bytes).unwrap().to_move().is_none());
    }

    #[test]
    fn test_to_move() {
        let frame = MoveFrame::new(4, 1, 4, 3);
        let mv = frame.to_move().unwrap();
        assert_eq!(mv.from, Square::new_unchecked(4, 1));
        assert_eq!(mv.to, Square::new_unchecked(4, 3));
        assert_eq!(MoveFrame::from(mv), frame);

        assert!(MoveFrame::new(0, 0, 8, 0).to_move().is_none());
        assert!(MoveFrame::new(0, -1, 0, 0).to_move().is_none());
    }

    #[test]
    fn test_decode_wrong_length() {
        let err = MoveFrame::decode(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFrame { size: 12, expected: 16 }));
    }
}

//! 协议常量定义

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 8;

/// 棋盘格子总数
pub const SQUARE_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// 默认监听/连接端口
pub const DEFAULT_PORT: u16 = 9000;

/// 客户端连接最大尝试次数
pub const CONNECT_ATTEMPTS: u32 = 5;

/// 走法帧大小：4 个 int32（网络字节序）
pub const FRAME_SIZE: usize = 16;

/// 无效坐标哨兵值
pub const NO_COORD: i32 = -1;

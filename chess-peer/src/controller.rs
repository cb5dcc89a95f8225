//! 对局控制器
//!
//! 界面层唯一的入口：查询棋盘、判断可选棋子、提交本地走法。
//! 走法通过通道发给对方，对方的走法由通道的接收循环直接落子。

use std::path::PathBuf;

use anyhow::Context;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use protocol::{ChessError, Move, MoveGenerator, Piece, Result, Square, Target};

use crate::channel::TurnSyncChannel;
use crate::config::PeerConfig;
use crate::game::{Game, SharedGame};
use crate::notice::{GameNotice, NoticeReceiver, NoticeSender};

pub struct GameController {
    game: SharedGame,
    channel: Option<TurnSyncChannel>,
    notices: NoticeSender,
    receiver: Option<NoticeReceiver>,
    /// 从回合检查到发送完成期间持有，同一回合只能提交一步
    move_lock: Mutex<()>,
    running: bool,
}

impl GameController {
    pub fn new() -> Self {
        let (notices, receiver) = mpsc::unbounded_channel();
        Self {
            game: Game::new().shared(),
            channel: None,
            notices,
            receiver: Some(receiver),
            move_lock: Mutex::new(()),
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        info!("Game started");
    }

    /// 棋盘回到开局，走法记录清空
    pub async fn stop(&mut self) {
        self.game.lock().await.reset();
        self.running = false;
        info!("Game stopped, board reset");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn game(&self) -> SharedGame {
        self.game.clone()
    }

    /// 取走通知接收端（只能取一次）
    pub fn take_notices(&mut self) -> Option<NoticeReceiver> {
        self.receiver.take()
    }

    /// 用本控制器的棋盘和通知通道创建一个新通道
    pub fn new_channel(&self) -> TurnSyncChannel {
        TurnSyncChannel::new(self.game.clone(), self.notices.clone())
    }

    /// 安装通道
    ///
    /// 已有的通道创建过连接后不能再替换，返回 false。
    pub fn attach(&mut self, channel: TurnSyncChannel) -> bool {
        if self.channel.as_ref().is_some_and(|current| current.is_created()) {
            warn!("Channel already created, refusing to replace it");
            return false;
        }
        self.channel = Some(channel);
        true
    }

    pub fn channel(&self) -> Option<&TurnSyncChannel> {
        self.channel.as_ref()
    }

    fn ensure_channel(&mut self) -> TurnSyncChannel {
        self.channel
            .get_or_insert_with(|| TurnSyncChannel::new(self.game.clone(), self.notices.clone()))
            .clone()
    }

    /// 作为主机等待对手
    pub async fn host(&mut self, config: &PeerConfig) -> Result<bool> {
        self.ensure_channel().create_host(config).await
    }

    /// 连接到主机
    pub fn connect(&mut self, host: &str, config: &PeerConfig) -> bool {
        self.ensure_channel().create_client(host, config)
    }

    pub async fn occupant(&self, x: i32, y: i32) -> std::result::Result<Option<Piece>, ChessError> {
        self.game.lock().await.board.get(x, y)
    }

    /// 本地玩家此刻能否选中该格的棋子
    pub async fn selectable(&self, x: i32, y: i32) -> std::result::Result<bool, ChessError> {
        let piece = self.occupant(x, y).await?;
        let Some(channel) = self.channel.as_ref() else {
            return Ok(false);
        };
        if !channel.is_connected() || !channel.my_turn() {
            return Ok(false);
        }
        Ok(piece.is_some_and(|p| Some(p.color) == channel.color()))
    }

    /// 该格棋子的可达目标格（已排除会暴露己方王的走法）
    pub async fn legal_destinations(
        &self,
        x: i32,
        y: i32,
    ) -> std::result::Result<Vec<Target>, ChessError> {
        let from = Square::new(x, y)?;
        let game = self.game.lock().await;
        if game.board.at(from).is_none() {
            return Err(ChessError::NoPiece {
                x: from.x,
                y: from.y,
            });
        }
        Ok(MoveGenerator::legal_destinations(&game.board, from))
    }

    /// 提交本地走法
    ///
    /// 不合法或会让己方王被吃时返回 `Ok(false)`，棋盘不变。
    /// 走子成功后发送给对方，并发布将军/将死通知。
    /// 并发提交时只有第一步能在本回合生效，其余返回 `NotYourTurn`。
    pub async fn try_move(&self, from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> Result<bool> {
        let from = Square::new(from_x, from_y)?;
        let to = Square::new(to_x, to_y)?;

        let channel = self
            .channel
            .as_ref()
            .filter(|channel| channel.is_connected())
            .ok_or(ChessError::NotConnected)?;
        let color = channel.color().ok_or(ChessError::NotConnected)?;

        let _turn = self.move_lock.lock().await;
        if !channel.my_turn() {
            return Err(ChessError::NotYourTurn.into());
        }

        let mv = Move::new(from, to);
        let verdict = {
            let mut game = self.game.lock().await;
            match game.board.at(from) {
                None => return Err(ChessError::NoPiece { x: from.x, y: from.y }.into()),
                Some(piece) if piece.color != color => return Err(ChessError::NotYourTurn.into()),
                Some(_) => {}
            }
            if !game.play_local(mv, color) {
                debug!("Rejected move {}", mv);
                return Ok(false);
            }
            game.verdict()
        };

        channel.send_move(mv).await?;
        info!("Played {}", mv);

        if let Some(notice) = GameNotice::from_verdict(&verdict) {
            info!("{}", notice);
            self.notify(notice);
        }
        Ok(true)
    }

    fn notify(&self, notice: GameNotice) {
        if self.notices.send(notice).is_err() {
            debug!("Notice receiver dropped");
        }
    }

    /// 当前对局记录（JSON）
    pub async fn record_json(&self) -> serde_json::Result<String> {
        self.game.lock().await.record.to_json()
    }

    /// 按配置写出对局记录，未配置路径或没有走法时不写
    pub async fn save_record(&self, config: &PeerConfig) -> anyhow::Result<Option<PathBuf>> {
        let game = self.game.lock().await;
        if game.record.moves.is_empty() {
            return Ok(None);
        }
        let Some(path) = config.record_file(&game.record.started_at) else {
            return Ok(None);
        };

        let json = game.record.to_json().context("序列化对局记录失败")?;
        std::fs::write(&path, json)
            .with_context(|| format!("写入对局记录失败: {:?}", path))?;

        info!("对局记录已保存: {:?}", path);
        Ok(Some(path))
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

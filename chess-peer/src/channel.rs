//! 回合同步通道
//!
//! 两个端点通过一条 TCP 连接交替发送 16 字节走法帧：
//! 轮到自己时本地走子并发送，然后等待对方；对方发来的走法不做验证，直接落子。
//!
//! 主机执白先走，客户端执黑。连接断开后不会重连。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use protocol::{
    ChessError, Color, Connection, Connector, FrameReader, FrameWriter, Listener, Move, MoveFrame,
    ProtocolError, Result, TcpConnection, TcpConnector, TcpListener,
};

use crate::config::PeerConfig;
use crate::game::SharedGame;
use crate::notice::{GameNotice, NoticeSender};

/// 端点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// 监听方，执白
    Server,
    /// 连接方，执黑
    Client,
}

impl Role {
    pub fn color(&self) -> Color {
        match self {
            Role::Server => Color::White,
            Role::Client => Color::Black,
        }
    }
}

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Disconnected,
    /// 主机等待对方连入
    Listening,
    /// 客户端正在尝试连接
    Connecting,
    Connected,
    /// 收发失败后的终止状态
    Lost,
}

struct ChannelInner {
    game: SharedGame,
    notices: NoticeSender,
    state: StdMutex<LinkState>,
    created: AtomicBool,
    my_turn: AtomicBool,
    role: OnceLock<Role>,
    local_addr: OnceLock<String>,
    reader: Mutex<Option<FrameReader<OwnedReadHalf>>>,
    writer: Mutex<Option<FrameWriter<OwnedWriteHalf>>>,
}

/// 回合同步通道
///
/// 克隆得到的是同一个通道的句柄。
#[derive(Clone)]
pub struct TurnSyncChannel {
    inner: Arc<ChannelInner>,
}

impl TurnSyncChannel {
    pub fn new(game: SharedGame, notices: NoticeSender) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                game,
                notices,
                state: StdMutex::new(LinkState::Disconnected),
                created: AtomicBool::new(false),
                my_turn: AtomicBool::new(false),
                role: OnceLock::new(),
                local_addr: OnceLock::new(),
                reader: Mutex::new(None),
                writer: Mutex::new(None),
            }),
        }
    }

    /// 作为主机监听，等待一个对手连入
    ///
    /// 绑定完成后立即返回，接受连接在后台任务中进行。
    /// 通道已创建过时忽略本次调用并返回 `Ok(false)`。
    pub async fn create_host(&self, config: &PeerConfig) -> Result<bool> {
        if self.inner.created.swap(true, Ordering::SeqCst) {
            debug!("Channel already created, ignoring host request");
            return Ok(false);
        }

        let mut listener = match TcpListener::bind(&config.listen_addr()).await {
            Ok(listener) => listener,
            Err(e) => {
                self.inner.created.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        if let Some(addr) = listener.local_addr() {
            info!("Listening on {}", addr);
            let _ = self.inner.local_addr.set(addr);
        }
        self.inner.set_state(LinkState::Listening);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match listener.accept().await {
                Ok(conn) => inner.establish(conn, Role::Server).await,
                Err(e) => {
                    error!("Accept failed: {}", e);
                    inner.set_state(LinkState::Disconnected);
                    inner.notify(GameNotice::ConnectFailed { attempts: 1 });
                }
            }
            // listener 在此释放，只接受一个对手
        });

        Ok(true)
    }

    /// 作为客户端连接主机，失败时重试
    ///
    /// 需在 tokio 运行时内调用。通道已创建过时返回 false。
    pub fn create_client(&self, host: &str, config: &PeerConfig) -> bool {
        if self.inner.created.swap(true, Ordering::SeqCst) {
            debug!("Channel already created, ignoring connect request");
            return false;
        }

        let addr = config.peer_addr(host);
        let attempts = config.connect_attempts;
        self.inner.set_state(LinkState::Connecting);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            match inner.connect_with_retry(&addr, attempts).await {
                Ok(conn) => inner.establish(conn, Role::Client).await,
                Err(e) => {
                    error!("{}", e);
                    inner.set_state(LinkState::Disconnected);
                    inner.notify(GameNotice::ConnectFailed { attempts });
                }
            }
        });

        true
    }

    /// 发送一步走法，成功后交出回合
    ///
    /// 发送失败时连接进入 `Lost` 状态。
    pub async fn send_move(&self, mv: Move) -> Result<()> {
        let frame = MoveFrame::from(mv);
        let mut guard = self.inner.writer.lock().await;
        let writer = guard.as_mut().ok_or(ChessError::NotConnected)?;

        match writer.write_frame(&frame).await {
            Ok(()) => {
                self.inner.my_turn.store(false, Ordering::SeqCst);
                debug!("Sent move {} ({:?})", mv, frame);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send move {}: {}", mv, e);
                *guard = None;
                drop(guard);
                self.inner.mark_lost();
                Err(ProtocolError::ConnectionLost)
            }
        }
    }

    /// 读取下一帧（阻塞直到收到完整一帧）
    ///
    /// 连接建立后由接收循环调用。
    pub async fn receive_move(&self) -> Result<MoveFrame> {
        self.inner.receive_move().await
    }

    pub fn state(&self) -> LinkState {
        self.inner.state()
    }

    pub fn is_created(&self) -> bool {
        self.inner.created.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// 是否轮到本地走子
    pub fn my_turn(&self) -> bool {
        self.inner.my_turn.load(Ordering::SeqCst)
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.role.get().copied()
    }

    /// 本地执子颜色，连接建立前为 None
    pub fn color(&self) -> Option<Color> {
        self.role().map(|role| role.color())
    }

    /// 主机实际监听的地址
    pub fn local_addr(&self) -> Option<String> {
        self.inner.local_addr.get().cloned()
    }
}

impl ChannelInner {
    fn state(&self) -> LinkState {
        self.state
            .lock()
            .map(|state| *state)
            .unwrap_or(LinkState::Lost)
    }

    fn set_state(&self, state: LinkState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    fn notify(&self, notice: GameNotice) {
        if self.notices.send(notice).is_err() {
            debug!("Notice receiver dropped");
        }
    }

    /// 进入 `Lost` 状态，只通知一次
    fn mark_lost(&self) {
        let already_lost = match self.state.lock() {
            Ok(mut state) => {
                std::mem::replace(&mut *state, LinkState::Lost) == LinkState::Lost
            }
            Err(_) => true,
        };
        self.my_turn.store(false, Ordering::SeqCst);

        if !already_lost {
            error!("Connection lost");
            self.notify(GameNotice::ConnectionLost);
        }
    }

    /// 逐次尝试连接，单次尝试没有超时
    async fn connect_with_retry(&self, addr: &str, attempts: u32) -> Result<TcpConnection> {
        for attempt in 1..=attempts {
            info!("Connecting to {} (attempt {}/{})", addr, attempt, attempts);
            match TcpConnector.connect(addr).await {
                Ok(conn) => return Ok(conn),
                Err(e) => {
                    warn!("Connection attempt {}/{} failed: {}", attempt, attempts, e);
                    self.notify(GameNotice::ConnectAttemptFailed {
                        attempt,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Err(ProtocolError::ConnectFailed { attempts })
    }

    async fn establish(self: &Arc<Self>, conn: TcpConnection, role: Role) {
        let peer = conn.peer_addr().unwrap_or_else(|| "unknown".to_string());
        let (reader, writer) = conn.split();
        *self.reader.lock().await = Some(reader);
        *self.writer.lock().await = Some(writer);

        let _ = self.role.set(role);
        self.game.lock().await.record.local_color = Some(role.color());
        self.my_turn.store(role == Role::Server, Ordering::SeqCst);
        self.set_state(LinkState::Connected);

        info!("Connected to {} as {:?}, playing {}", peer, role, role.color());
        self.notify(GameNotice::Connected {
            color: role.color(),
        });

        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.receive_loop().await });
    }

    async fn receive_move(&self) -> Result<MoveFrame> {
        let mut guard = self.reader.lock().await;
        let reader = guard.as_mut().ok_or(ChessError::NotConnected)?;
        reader.read_frame().await
    }

    async fn receive_loop(self: Arc<Self>) {
        loop {
            match self.receive_move().await {
                Ok(frame) => self.apply_inbound(frame).await,
                Err(e) => {
                    error!("Receive failed: {}", e);
                    self.mark_lost();
                    break;
                }
            }
        }
        debug!("Receive loop terminated");
    }

    /// 落子、交还回合、记录、重新判定局面
    async fn apply_inbound(&self, frame: MoveFrame) {
        let Some(mv) = frame.to_move() else {
            warn!("Ignoring malformed frame {:?}", frame);
            return;
        };

        let verdict = {
            let mut game = self.game.lock().await;
            if !game.apply_remote(mv) {
                warn!("Ignoring move {}: empty origin or null move", mv);
                return;
            }
            self.my_turn.store(true, Ordering::SeqCst);
            game.verdict()
        };

        debug!("Opponent moved {}", mv);
        self.notify(GameNotice::OpponentMoved(mv));
        if let Some(notice) = GameNotice::from_verdict(&verdict) {
            info!("{}", notice);
            self.notify(notice);
        }
    }
}

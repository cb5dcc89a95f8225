//! 两个端点通过本机回环连接对弈

use std::time::Duration;

use chess_peer::{GameController, GameNotice, NoticeReceiver, PeerConfig};
use protocol::{ChessError, Color, Move, PieceKind, ProtocolError, Square};

fn loopback() -> PeerConfig {
    PeerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

async fn next_notice(rx: &mut NoticeReceiver) -> GameNotice {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for notice")
        .expect("notice channel closed")
}

fn mv(fx: u8, fy: u8, tx: u8, ty: u8) -> Move {
    Move::new(Square::new_unchecked(fx, fy), Square::new_unchecked(tx, ty))
}

/// 建立一对已连接的控制器：(白方主机, 白方通知, 黑方客户端, 黑方通知)
async fn connected_pair() -> (GameController, NoticeReceiver, GameController, NoticeReceiver) {
    let mut host = GameController::new();
    let mut host_rx = host.take_notices().unwrap();
    assert!(host.host(&loopback()).await.unwrap());
    let addr = host.channel().unwrap().local_addr().unwrap();

    let mut client = GameController::new();
    let mut client_rx = client.take_notices().unwrap();
    assert!(client.connect(&addr, &PeerConfig::default()));

    assert_eq!(
        next_notice(&mut host_rx).await,
        GameNotice::Connected {
            color: Color::White
        }
    );
    assert_eq!(
        next_notice(&mut client_rx).await,
        GameNotice::Connected {
            color: Color::Black
        }
    );

    (host, host_rx, client, client_rx)
}

#[tokio::test]
async fn test_turns_alternate() {
    let (host, _host_rx, client, mut client_rx) = connected_pair().await;
    let host_channel = host.channel().unwrap();
    let client_channel = client.channel().unwrap();

    assert!(host_channel.my_turn());
    assert!(!client_channel.my_turn());
    assert!(host.selectable(4, 1).await.unwrap());
    assert!(!host.selectable(4, 6).await.unwrap());
    assert!(!client.selectable(4, 6).await.unwrap());

    // 黑方抢先走被拒绝
    assert!(matches!(
        client.try_move(4, 6, 4, 4).await,
        Err(ProtocolError::Chess(ChessError::NotYourTurn))
    ));

    // 不合法的走法不消耗回合
    assert!(!host.try_move(4, 1, 4, 4).await.unwrap());
    assert!(host_channel.my_turn());

    assert!(host.try_move(4, 1, 4, 3).await.unwrap());
    assert!(!host_channel.my_turn());
    assert!(matches!(
        host.try_move(3, 1, 3, 3).await,
        Err(ProtocolError::Chess(ChessError::NotYourTurn))
    ));

    assert_eq!(
        next_notice(&mut client_rx).await,
        GameNotice::OpponentMoved(mv(4, 1, 4, 3))
    );
    assert!(client_channel.my_turn());

    let pawn = client.occupant(4, 3).await.unwrap().unwrap();
    assert_eq!(pawn.kind, PieceKind::Pawn);
    assert_eq!(pawn.color, Color::White);
    assert!(client.occupant(4, 1).await.unwrap().is_none());

    // 只能选中自己的棋子
    assert!(matches!(
        client.try_move(4, 3, 4, 4).await,
        Err(ProtocolError::Chess(ChessError::NotYourTurn))
    ));
    assert!(client.try_move(4, 6, 4, 4).await.unwrap());
    assert!(!client_channel.my_turn());
}

#[tokio::test]
async fn test_fools_mate_reported_on_both_sides() {
    let (host, mut host_rx, client, mut client_rx) = connected_pair().await;

    assert!(host.try_move(5, 1, 5, 2).await.unwrap());
    assert_eq!(
        next_notice(&mut client_rx).await,
        GameNotice::OpponentMoved(mv(5, 1, 5, 2))
    );

    assert!(client.try_move(4, 6, 4, 4).await.unwrap());
    assert_eq!(
        next_notice(&mut host_rx).await,
        GameNotice::OpponentMoved(mv(4, 6, 4, 4))
    );

    assert!(host.try_move(6, 1, 6, 3).await.unwrap());
    assert_eq!(
        next_notice(&mut client_rx).await,
        GameNotice::OpponentMoved(mv(6, 1, 6, 3))
    );

    // Qd8-h4
    assert!(client.try_move(3, 7, 7, 3).await.unwrap());
    assert_eq!(
        next_notice(&mut client_rx).await,
        GameNotice::Checkmate(vec![Color::White])
    );

    assert_eq!(
        next_notice(&mut host_rx).await,
        GameNotice::OpponentMoved(mv(3, 7, 7, 3))
    );
    let mate = next_notice(&mut host_rx).await;
    assert_eq!(mate, GameNotice::Checkmate(vec![Color::White]));
    assert!(mate.is_terminal());

    // 双方都记下了四步
    for controller in [&host, &client] {
        let game = controller.game();
        let game = game.lock().await;
        assert_eq!(game.record.moves.len(), 4);
        assert_eq!(game.record.last_move().unwrap().notation, "D8-H4");
    }
    let json = host.record_json().await.unwrap();
    assert!(json.contains("\"local_color\": \"White\""));
}

#[tokio::test]
async fn test_connect_failure_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let mut client = GameController::new();
    let mut rx = client.take_notices().unwrap();
    assert!(client.connect(&addr, &PeerConfig::default()));

    for attempt in 1..=5 {
        assert!(matches!(
            next_notice(&mut rx).await,
            GameNotice::ConnectAttemptFailed { attempt: a, .. } if a == attempt
        ));
    }
    assert_eq!(
        next_notice(&mut rx).await,
        GameNotice::ConnectFailed { attempts: 5 }
    );
    assert!(!client.channel().unwrap().is_connected());
    assert!(matches!(
        client.try_move(4, 6, 4, 4).await,
        Err(ProtocolError::Chess(ChessError::NotConnected))
    ));
}

use std::io::BufRead;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_peer::{
    CliArgs, Command, CommandError, GameController, GameNotice, LogLevel, Mode, PeerConfig, HELP,
    USAGE,
};
use protocol::{Color, TargetKind};

fn init_tracing(level: LogLevel) -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("chess_peer={}", level.as_str()).parse()?)
                .add_directive(format!("protocol={}", level.as_str()).parse()?),
        )
        .init();
    Ok(())
}

/// 标准输入在独立线程中读取，主循环退出时不必等待阻塞的读操作
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("读取标准输入失败: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

async fn print_board(controller: &GameController) {
    let game = controller.game();
    let game = game.lock().await;
    println!("{}", game.board);

    for color in Color::ALL {
        let captured = game.board.captured(color);
        if !captured.is_empty() {
            let pieces: String = captured.iter().map(|p| p.to_char()).collect();
            println!("captured {}: {}", color, pieces);
        }
    }

    if let Some(channel) = controller.channel() {
        if channel.is_connected() {
            let status = if channel.my_turn() { "your move" } else { "waiting for opponent" };
            println!("[{}]", status);
        }
    }
}

async fn handle(controller: &GameController, command: Command) {
    match command {
        Command::Move { from, to } => match controller.try_move(from.0, from.1, to.0, to.1).await {
            Ok(true) => print_board(controller).await,
            Ok(false) => println!("Illegal move."),
            Err(e) => println!("{}", e),
        },
        Command::Moves((x, y)) => match controller.legal_destinations(x, y).await {
            Ok(targets) if targets.is_empty() => println!("No legal moves."),
            Ok(targets) => {
                let names: Vec<String> = targets
                    .iter()
                    .map(|t| match t.kind {
                        TargetKind::Movement => t.square.name(),
                        TargetKind::Capture => format!("x{}", t.square.name()),
                    })
                    .collect();
                println!("{}", names.join(" "));
            }
            Err(e) => println!("{}", e),
        },
        Command::Board => print_board(controller).await,
        Command::Record => match controller.record_json().await {
            Ok(json) => println!("{}", json),
            Err(e) => println!("{}", e),
        },
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {:#}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let mut config = PeerConfig::load(&cli.config_path);
    cli.apply(&mut config);
    init_tracing(config.log_level)?;

    info!("国际象棋对战端启动中...");

    let mut controller = GameController::new();
    let mut notices = controller
        .take_notices()
        .context("通知接收端已被取走")?;

    match &cli.mode {
        Mode::Host => {
            controller
                .host(&config)
                .await
                .with_context(|| format!("无法监听 {}", config.listen_addr()))?;
            let addr = controller
                .channel()
                .and_then(|channel| channel.local_addr())
                .unwrap_or_else(|| config.listen_addr());
            println!("Waiting for an opponent on {} ...", addr);
        }
        Mode::Connect(host) => {
            controller.connect(host, &config);
            println!("Connecting to {} ...", config.peer_addr(host));
        }
    }

    controller.start();
    print_board(&controller).await;
    println!("{}", HELP);

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            notice = notices.recv() => {
                let Some(notice) = notice else { break };
                println!("{}", notice);
                if let GameNotice::OpponentMoved(_) = notice {
                    print_board(&controller).await;
                }
                if notice.is_terminal() {
                    break;
                }
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(&controller, command).await,
                    Err(CommandError::Empty) => {}
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    if let Some(path) = controller.save_record(&config).await? {
        println!("Record saved to {}", path.display());
    }
    controller.stop().await;

    info!("国际象棋对战端已退出");
    Ok(())
}

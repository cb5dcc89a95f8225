//! 终端命令解析

use thiserror::Error;

use protocol::Square;

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid coordinate: {0}")]
    InvalidNumber(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),
}

/// 终端命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 走子，坐标未经范围检查
    Move { from: (i32, i32), to: (i32, i32) },
    /// 列出某格棋子的可达格
    Moves((i32, i32)),
    Board,
    Record,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  e2 e4          move a piece (or four numbers: 4 1 4 3)
  moves e2       list legal destinations
  board          print the board
  record         print the move record
  help           show this help
  quit           leave the game";

fn parse_square(token: &str) -> Result<(i32, i32), CommandError> {
    Square::from_name(token)
        .map(|sq| (sq.x as i32, sq.y as i32))
        .ok_or_else(|| CommandError::InvalidSquare(token.to_string()))
}

fn parse_number(token: &str) -> Result<i32, CommandError> {
    token
        .parse()
        .map_err(|_| CommandError::InvalidNumber(token.to_string()))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&head) = tokens.first() else {
            return Err(CommandError::Empty);
        };

        match head.to_ascii_lowercase().as_str() {
            "board" => Ok(Command::Board),
            "record" => Ok(Command::Record),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "moves" => {
                let token = tokens.get(1).ok_or(CommandError::MissingArgument("moves"))?;
                Ok(Command::Moves(parse_square(token)?))
            }
            _ => match tokens.as_slice() {
                [from, to] => Ok(Command::Move {
                    from: parse_square(from)?,
                    to: parse_square(to)?,
                }),
                [fx, fy, tx, ty] => Ok(Command::Move {
                    from: (parse_number(fx)?, parse_number(fy)?),
                    to: (parse_number(tx)?, parse_number(ty)?),
                }),
                _ => Err(CommandError::Unknown(line.trim().to_string())),
            },
        }
    }
}

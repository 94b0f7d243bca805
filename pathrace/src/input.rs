//! Line-oriented command syntax: `size 12`, `wall 3 4`, `seek 10`, `quit`.

use std::error::Error;
use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use pathrace_core::{Command, Msg, Point};

/// One parsed input line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Quit,
}

impl From<Input> for Msg {
    fn from(input: Input) -> Self {
        match input {
            Input::Command(c) => Msg::Command(c),
            Input::Quit => Msg::Quit,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    UnknownVerb(String),
    MissingArgument { verb: &'static str, name: &'static str },
    InvalidNumber { verb: &'static str, value: String },
    TrailingInput { verb: &'static str },
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::UnknownVerb(v) => write!(f, "unknown command `{v}`"),
            Self::MissingArgument { verb, name } => write!(f, "`{verb}` needs <{name}>"),
            Self::InvalidNumber { verb, value } => {
                write!(f, "`{verb}`: `{value}` is not a valid number")
            }
            Self::TrailingInput { verb } => write!(f, "`{verb}`: too many arguments"),
        }
    }
}

impl Error for ParseCommandError {}

struct Args<'a> {
    verb: &'static str,
    words: SplitWhitespace<'a>,
}

impl Args<'_> {
    fn next<T: FromStr>(&mut self, name: &'static str) -> Result<T, ParseCommandError> {
        let word = self.words.next().ok_or(ParseCommandError::MissingArgument {
            verb: self.verb,
            name,
        })?;
        word.parse().map_err(|_| ParseCommandError::InvalidNumber {
            verb: self.verb,
            value: word.to_string(),
        })
    }

    fn point(&mut self) -> Result<Point, ParseCommandError> {
        Ok(Point::new(self.next("x")?, self.next("y")?))
    }

    fn end(mut self, input: Input) -> Result<Input, ParseCommandError> {
        match self.words.next() {
            Some(_) => Err(ParseCommandError::TrailingInput { verb: self.verb }),
            None => Ok(input),
        }
    }
}

impl FromStr for Input {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let verb = match first.to_ascii_lowercase().as_str() {
            "size" => "size",
            "start" => "start",
            "end" => "end",
            "wall" => "wall",
            "clear" => "clear",
            "scatter" => "scatter",
            "next" | "n" => "next",
            "prev" | "p" => "prev",
            "seek" => "seek",
            "play" => "play",
            "stop" => "stop",
            "reset" => "reset",
            "quit" | "q" | "exit" => "quit",
            _ => return Err(ParseCommandError::UnknownVerb(first.to_string())),
        };
        let mut args = Args { verb, words };
        let command = match verb {
            "size" => Command::SetGridSize(args.next("n")?),
            "start" => Command::SetStart(args.point()?),
            "end" => Command::SetEnd(args.point()?),
            "wall" => Command::ToggleObstacle(args.point()?),
            "clear" => Command::ClearObstacles,
            "scatter" => Command::ScatterObstacles {
                count: args.next("count")?,
                seed: args.next("seed")?,
            },
            "next" => Command::StepForward,
            "prev" => Command::StepBackward,
            "seek" => Command::SetProgress(args.next("step")?),
            "play" => Command::StartPlayback,
            "stop" => Command::StopPlayback,
            "reset" => Command::Reset,
            _ => return args.end(Input::Quit),
        };
        args.end(Input::Command(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Input, ParseCommandError> {
        s.parse()
    }

    #[test]
    fn parses_every_verb() {
        let cases = [
            ("size 12", Command::SetGridSize(12)),
            ("start 1 2", Command::SetStart(Point::new(1, 2))),
            ("end 9 9", Command::SetEnd(Point::new(9, 9))),
            ("wall 3 4", Command::ToggleObstacle(Point::new(3, 4))),
            ("clear", Command::ClearObstacles),
            ("scatter 40 7", Command::ScatterObstacles { count: 40, seed: 7 }),
            ("next", Command::StepForward),
            ("prev", Command::StepBackward),
            ("seek 12", Command::SetProgress(12)),
            ("play", Command::StartPlayback),
            ("stop", Command::StopPlayback),
            ("reset", Command::Reset),
        ];
        for (line, command) in cases {
            assert_eq!(parse(line), Ok(Input::Command(command)), "{line}");
            assert_eq!(parse(&command.to_string()), Ok(Input::Command(command)));
        }
        assert_eq!(parse("  QUIT "), Ok(Input::Quit));
        assert_eq!(parse("n"), Ok(Input::Command(Command::StepForward)));
    }

    #[test]
    fn reports_malformed_lines() {
        assert_eq!(parse("   "), Err(ParseCommandError::Empty));
        assert_eq!(
            parse("jump 3"),
            Err(ParseCommandError::UnknownVerb("jump".into()))
        );
        assert_eq!(
            parse("wall 3"),
            Err(ParseCommandError::MissingArgument { verb: "wall", name: "y" })
        );
        assert_eq!(
            parse("seek -1"),
            Err(ParseCommandError::InvalidNumber {
                verb: "seek",
                value: "-1".into()
            })
        );
        assert_eq!(
            parse("clear all"),
            Err(ParseCommandError::TrailingInput { verb: "clear" })
        );
        assert_eq!(
            parse("size x").unwrap_err().to_string(),
            "`size`: `x` is not a valid number"
        );
    }

    #[test]
    fn input_converts_to_msg() {
        assert!(matches!(Msg::from(Input::Quit), Msg::Quit));
        assert!(matches!(
            Msg::from(Input::Command(Command::Reset)),
            Msg::Command(Command::Reset)
        ));
    }
}

use crate::carriage::{CarriageId, CarriageType};
use log::*;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Append {
        id: CarriageId,
        kind: CarriageType,
        capacity: i64,
    },
    Insert {
        position: i64,
        id: CarriageId,
        kind: CarriageType,
        capacity: i64,
    },
    PrintTrain,
    Seat {
        id: CarriageId,
        count: i64,
    },
    Disembark {
        id: CarriageId,
        count: i64,
    },
    Total,
    Count {
        start: CarriageId,
        end: CarriageId,
    },
    Move {
        source: CarriageId,
        destination: CarriageId,
        count: i64,
    },
    NewTrain,
    Next,
    Previous,
    PrintAll,
    RemoveCarriage {
        id: CarriageId,
    },
    RemoveTrain,
    Merge,
    /// `ids` is empty when `count` is not positive.
    Split {
        count: i64,
        ids: Vec<CarriageId>,
    },
    Unknown(char),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Append { .. } => "append",
            Command::Insert { .. } => "insert",
            Command::PrintTrain => "print_train",
            Command::Seat { .. } => "seat",
            Command::Disembark { .. } => "disembark",
            Command::Total => "total",
            Command::Count { .. } => "count",
            Command::Move { .. } => "move",
            Command::NewTrain => "new_train",
            Command::Next => "next",
            Command::Previous => "previous",
            Command::PrintAll => "print_all",
            Command::RemoveCarriage { .. } => "remove_carriage",
            Command::RemoveTrain => "remove_train",
            Command::Merge => "merge",
            Command::Split { .. } => "split",
            Command::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected an integer, found '{0}'")]
    NotAnInteger(String),
    #[error("carriage id '{0}' is too long")]
    IdTooLong(String),
    #[error("input ended in the middle of a command")]
    EndOfInput,
    #[error("could not read input: {0}")]
    Io(#[from] io::Error),
}

/// Whitespace-separated tokens read line by line from `input`.
pub struct Scanner<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(input: R) -> Scanner<R> {
        Scanner {
            input,
            pending: VecDeque::new(),
        }
    }

    pub fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(|t| t.to_string()));
        }
        Ok(self.pending.pop_front())
    }

    /// Takes a single character. The rest of its token stays in the input.
    pub fn next_char(&mut self) -> io::Result<Option<char>> {
        let token = match self.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        let mut chars = token.chars();
        let c = chars.next();
        let rest = chars.as_str();
        if !rest.is_empty() {
            self.pending.push_front(rest.to_string());
        }
        Ok(c)
    }

    /// Drops what is left of the current line.
    pub fn discard_line(&mut self) {
        if !self.pending.is_empty() {
            trace!("Discarding {} leftover tokens", self.pending.len());
            self.pending.clear();
        }
    }

    fn token(&mut self) -> Result<String, ParseError> {
        self.next_token()?.ok_or(ParseError::EndOfInput)
    }

    pub fn int(&mut self) -> Result<i64, ParseError> {
        let token = self.token()?;
        token.parse().map_err(|_| ParseError::NotAnInteger(token))
    }

    pub fn id(&mut self) -> Result<CarriageId, ParseError> {
        let token = self.token()?;
        CarriageId::new(&token).ok_or(ParseError::IdTooLong(token))
    }

    pub fn kind(&mut self) -> Result<CarriageType, ParseError> {
        let token = self.token()?;
        Ok(token
            .parse::<CarriageType>()
            .unwrap_or(CarriageType::Invalid))
    }
}

/// Reads the next command and its arguments. Returns `Ok(None)` at end of input.
///
/// `prompt` receives the `Enter ids:` request of the split command. When an
/// argument is rejected the rest of its line is dropped, so none of its
/// tokens are read as commands.
pub fn parse_command<R: BufRead>(
    scanner: &mut Scanner<R>,
    prompt: &mut impl Write,
) -> Result<Option<Command>, ParseError> {
    let code = match scanner.next_char()? {
        Some(code) => code,
        None => return Ok(None),
    };

    match parse_arguments(code, scanner, prompt) {
        Ok(command) => Ok(Some(command)),
        Err(e @ ParseError::NotAnInteger(_)) | Err(e @ ParseError::IdTooLong(_)) => {
            scanner.discard_line();
            Err(e)
        }
        Err(e) => Err(e),
    }
}

fn parse_arguments<R: BufRead>(
    code: char,
    scanner: &mut Scanner<R>,
    prompt: &mut impl Write,
) -> Result<Command, ParseError> {
    let command = match code {
        '?' => Command::Help,
        'a' => Command::Append {
            id: scanner.id()?,
            kind: scanner.kind()?,
            capacity: scanner.int()?,
        },
        'i' => Command::Insert {
            position: scanner.int()?,
            id: scanner.id()?,
            kind: scanner.kind()?,
            capacity: scanner.int()?,
        },
        'p' => Command::PrintTrain,
        's' => Command::Seat {
            id: scanner.id()?,
            count: scanner.int()?,
        },
        'd' => Command::Disembark {
            id: scanner.id()?,
            count: scanner.int()?,
        },
        'T' => Command::Total,
        'c' => Command::Count {
            start: scanner.id()?,
            end: scanner.id()?,
        },
        'm' => Command::Move {
            source: scanner.id()?,
            destination: scanner.id()?,
            count: scanner.int()?,
        },
        'N' => Command::NewTrain,
        '>' => Command::Next,
        '<' => Command::Previous,
        'P' => Command::PrintAll,
        'r' => Command::RemoveCarriage { id: scanner.id()? },
        'R' => Command::RemoveTrain,
        'M' => Command::Merge,
        'S' => {
            let count = scanner.int()?;
            let mut ids = Vec::new();
            if count > 0 {
                writeln!(prompt, "Enter ids: ")?;
                prompt.flush()?;
                for _ in 0..count {
                    ids.push(scanner.id()?);
                }
            }
            Command::Split { count, ids }
        }
        other => {
            trace!("Ignoring unknown command code {:?}", other);
            Command::Unknown(other)
        }
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CarriageId {
        CarriageId::new(s).unwrap()
    }

    fn parse_all(input: &str) -> Vec<Command> {
        let mut scanner = Scanner::new(input.as_bytes());
        let mut sink = io::sink();
        let mut commands = vec![];
        while let Some(c) = parse_command(&mut scanner, &mut sink).unwrap() {
            commands.push(c);
        }
        commands
    }

    #[test]
    fn arguments_may_span_lines() {
        assert_eq!(
            parse_all("a N100\n passenger\n50\np"),
            vec![
                Command::Append {
                    id: id("N100"),
                    kind: CarriageType::Passenger,
                    capacity: 50
                },
                Command::PrintTrain
            ]
        );
    }

    #[test]
    fn code_can_touch_next_token() {
        assert_eq!(
            parse_all("rN1 >< M"),
            vec![
                Command::RemoveCarriage { id: id("N1") },
                Command::Next,
                Command::Previous,
                Command::Merge
            ]
        );
    }

    #[test]
    fn insert_and_move_arguments() {
        assert_eq!(
            parse_all("i -1 A buffet 10\nm A B 3"),
            vec![
                Command::Insert {
                    position: -1,
                    id: id("A"),
                    kind: CarriageType::Buffet,
                    capacity: 10
                },
                Command::Move {
                    source: id("A"),
                    destination: id("B"),
                    count: 3
                }
            ]
        );
    }

    #[test]
    fn invalid_type_is_kept_for_validation() {
        assert_eq!(
            parse_all("a X sleeper 10"),
            vec![Command::Append {
                id: id("X"),
                kind: CarriageType::Invalid,
                capacity: 10
            }]
        );
    }

    #[test]
    fn split_prompts_and_reads_ids() {
        let mut scanner = Scanner::new("S 2 A B S 0 T".as_bytes());
        let mut prompt = Vec::new();
        let split = parse_command(&mut scanner, &mut prompt).unwrap();
        assert_eq!(
            split,
            Some(Command::Split {
                count: 2,
                ids: vec![id("A"), id("B")]
            })
        );
        assert_eq!(String::from_utf8(prompt).unwrap(), "Enter ids: \n");

        let mut prompt = Vec::new();
        let split = parse_command(&mut scanner, &mut prompt).unwrap();
        assert_eq!(split, Some(Command::Split { count: 0, ids: vec![] }));
        assert!(prompt.is_empty());
        assert_eq!(
            parse_command(&mut scanner, &mut prompt).unwrap(),
            Some(Command::Total)
        );
    }

    #[test]
    fn unknown_codes_parse() {
        assert_eq!(parse_all("x"), vec![Command::Unknown('x')]);
    }

    #[test]
    fn bad_tokens_are_errors() {
        let mut sink = io::sink();
        let mut scanner = Scanner::new("s A lots".as_bytes());
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Err(ParseError::NotAnInteger(t)) if t == "lots"
        ));
        let mut scanner = Scanner::new("r TOOLONG".as_bytes());
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Err(ParseError::IdTooLong(_))
        ));
        let mut scanner = Scanner::new("c A".as_bytes());
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Err(ParseError::EndOfInput)
        ));
    }

    #[test]
    fn rejected_arguments_drop_the_rest_of_the_line() {
        let mut sink = io::sink();
        let mut scanner = Scanner::new("a N1 passenger 5\nc LONGID N1\nT\ns A 1x 9 >\n<".as_bytes());
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Ok(Some(Command::Append { .. }))
        ));
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Err(ParseError::IdTooLong(t)) if t == "LONGID"
        ));
        assert_eq!(
            parse_command(&mut scanner, &mut sink).unwrap(),
            Some(Command::Total)
        );
        assert!(matches!(
            parse_command(&mut scanner, &mut sink),
            Err(ParseError::NotAnInteger(t)) if t == "1x"
        ));
        assert_eq!(
            parse_command(&mut scanner, &mut sink).unwrap(),
            Some(Command::Previous)
        );
        assert_eq!(parse_command(&mut scanner, &mut sink).unwrap(), None);
    }
}

use std::fmt;

pub const PORT: u16 = 58474;
pub const MAX_NAME: usize = 30;
pub const MAX_BUF: usize = 256;
pub const MAX_WORD: usize = 30;
pub const NUM_LETTERS: usize = 26;
pub const MAX_GUESSES: u32 = 4;

/// Byte that terminates every client line. Clients conventionally follow it with `\n`.
pub const DELIMITER: u8 = b'\r';
pub const LINE_END: &str = "\r\n";
/// Marks an unrevealed position in the masked word.
pub const PLACEHOLDER: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    Empty,
    TooLong,
    Taken,
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRejection::Empty => write!(f, "name is empty"),
            NameRejection::TooLong => write!(f, "name is longer than {} characters", MAX_NAME - 1),
            NameRejection::Taken => write!(f, "name is already taken"),
        }
    }
}

/// Every line the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Welcome,
    NameRejected(NameRejection),
    Joined {
        name: String,
    },
    Left {
        name: String,
    },
    Status {
        masked: String,
        guesses_left: u32,
        guessed: String,
    },
    Turn {
        name: String,
    },
    YourTurn,
    Prompt,
    NotYourTurn,
    InvalidGuess,
    Guessed {
        name: String,
        letter: char,
    },
    Hit {
        letter: char,
    },
    Miss {
        letter: char,
    },
    Won {
        name: String,
        word: String,
    },
    YouWon {
        word: String,
    },
    Lost {
        word: String,
    },
    NewRound,
}

impl Notice {
    /// Renders the notice with the network line terminator appended.
    pub fn to_wire(&self) -> Vec<u8> {
        format!("{}{}", self, LINE_END).into_bytes()
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Welcome => write!(f, "Welcome to our word game. What is your name?"),
            Notice::NameRejected(reason) => {
                write!(f, "Unacceptable name ({}). Please enter your name:", reason)
            }
            Notice::Joined { name } => write!(f, "{} has joined the game.", name),
            Notice::Left { name } => write!(f, "Goodbye {}", name),
            Notice::Status {
                masked,
                guesses_left,
                guessed,
            } => {
                let rule = "***************";
                write!(f, "{rule}{LINE_END}")?;
                write!(f, "Word to guess: {masked}{LINE_END}")?;
                write!(f, "Guesses remaining: {guesses_left}{LINE_END}")?;
                write!(f, "Letters guessed: {guessed}{LINE_END}")?;
                write!(f, "{rule}")
            }
            Notice::Turn { name } => write!(f, "It's {}'s turn.", name),
            Notice::YourTurn => write!(f, "It's your turn."),
            Notice::Prompt => write!(f, "Your guess?"),
            Notice::NotYourTurn => write!(f, "It's not your turn."),
            Notice::InvalidGuess => write!(f, "Invalid guess."),
            Notice::Guessed { name, letter } => write!(f, "{} guesses: {}", name, letter),
            Notice::Hit { letter } => write!(f, "{} is in the word.", letter),
            Notice::Miss { letter } => write!(f, "{} is not in the word.", letter),
            Notice::Won { name, word } => {
                write!(f, "Game over! {} won. The word was {}.", name, word)
            }
            Notice::YouWon { word } => write!(f, "Game over! You won. The word was {}.", word),
            Notice::Lost { word } => write!(
                f,
                "Game over! No more guesses left. The word was {}.",
                word
            ),
            Notice::NewRound => write!(f, "Let's start a new game."),
        }
    }
}

use crate::client_manager::ClientId;
use log::info;
use shared::{Notice, NUM_LETTERS, PLACEHOLDER};

/// Why a guess line was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessError {
    /// Sender does not hold the turn
    OutOfTurn,
    /// Not a single lowercase letter, or already guessed
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Hit,
    Miss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Won,
    Lost,
}

/// State of the current round plus the turn holder, which outlives rounds
#[derive(Debug, Clone)]
pub struct GameState {
    word: Vec<u8>,
    reveal: Vec<u8>,
    /// Letters in the order they were guessed
    guessed: Vec<u8>,
    guesses_left: u32,
    max_guesses: u32,
    turn: Option<ClientId>,
    round: u32,
}

impl GameState {
    pub fn new(word: &str, max_guesses: u32) -> Self {
        let mut state = Self {
            word: Vec::new(),
            reveal: Vec::new(),
            guessed: Vec::with_capacity(NUM_LETTERS),
            guesses_left: max_guesses,
            max_guesses,
            turn: None,
            round: 0,
        };
        state.reset(word);
        state
    }

    /// Starts a new round in place; the turn holder is kept
    pub fn reset(&mut self, word: &str) {
        self.word = word.as_bytes().to_vec();
        self.reveal = vec![PLACEHOLDER as u8; self.word.len()];
        self.guessed.clear();
        self.guesses_left = self.max_guesses;
        self.round += 1;
        info!("Round {} started", self.round);
    }

    /// Rounds started so far, counting the current one
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn word(&self) -> String {
        String::from_utf8_lossy(&self.word).into_owned()
    }

    /// The target with unguessed positions replaced by the placeholder
    pub fn masked(&self) -> String {
        String::from_utf8_lossy(&self.reveal).into_owned()
    }

    pub fn guesses_left(&self) -> u32 {
        self.guesses_left
    }

    pub fn max_guesses(&self) -> u32 {
        self.max_guesses
    }

    pub fn turn(&self) -> Option<ClientId> {
        self.turn
    }

    pub fn set_turn(&mut self, turn: Option<ClientId>) {
        self.turn = turn;
    }

    pub fn has_guessed(&self, letter: char) -> bool {
        letter.is_ascii() && self.guessed.contains(&(letter as u8))
    }

    /// Guessed letters separated by spaces, in guess order
    pub fn guessed_letters(&self) -> String {
        self.guessed
            .iter()
            .map(|&b| (b as char).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validates a guess line from `sender` without changing any state
    ///
    /// The turn check comes first, so an out-of-turn player learns nothing
    /// about whether the letter would have been accepted.
    pub fn check_guess(&self, sender: ClientId, line: &str) -> Result<char, GuessError> {
        if self.turn != Some(sender) {
            return Err(GuessError::OutOfTurn);
        }

        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) if letter.is_ascii_lowercase() && !self.has_guessed(letter) => {
                Ok(letter)
            }
            _ => Err(GuessError::Invalid),
        }
    }

    /// Records an accepted letter and reveals or charges for it
    pub fn apply_guess(&mut self, letter: char) -> GuessOutcome {
        let letter = letter as u8;
        if self.guessed.len() < NUM_LETTERS && !self.guessed.contains(&letter) {
            self.guessed.push(letter);
        }

        let mut hit = false;
        for (slot, &target) in self.reveal.iter_mut().zip(&self.word) {
            if target == letter {
                *slot = target;
                hit = true;
            }
        }

        if hit {
            GuessOutcome::Hit
        } else {
            self.guesses_left = self.guesses_left.saturating_sub(1);
            GuessOutcome::Miss
        }
    }

    pub fn is_solved(&self) -> bool {
        self.reveal == self.word
    }

    /// Whether the round is over; a solved word wins even on the last guess
    pub fn round_result(&self) -> Option<RoundResult> {
        if self.is_solved() {
            Some(RoundResult::Won)
        } else if self.guesses_left == 0 {
            Some(RoundResult::Lost)
        } else {
            None
        }
    }

    /// Status block shown with every turn announcement
    pub fn status(&self) -> Notice {
        Notice::Status {
            masked: self.masked(),
            guesses_left: self.guesses_left,
            guessed: self.guessed_letters(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with_turn(word: &str, max_guesses: u32, turn: ClientId) -> GameState {
        let mut game = GameState::new(word, max_guesses);
        game.set_turn(Some(turn));
        game
    }

    /// Every revealed position must be a guessed letter of the target
    fn assert_reveal_consistent(game: &GameState) {
        for (i, &shown) in game.reveal.iter().enumerate() {
            if shown == PLACEHOLDER as u8 {
                assert!(!game.guessed.contains(&game.word[i]));
            } else {
                assert_eq!(shown, game.word[i]);
                assert!(game.guessed.contains(&shown));
            }
        }
    }

    #[test]
    fn test_new_round_is_masked() {
        let game = GameState::new("cat", 7);
        assert_eq!(game.masked(), "---");
        assert_eq!(game.guesses_left(), 7);
        assert_eq!(game.turn(), None);
        assert_eq!(game.round(), 1);
        assert!(game.guessed_letters().is_empty());
    }

    #[test]
    fn test_hit_reveals_every_position() {
        let mut game = GameState::new("banana", 4);

        assert_eq!(game.apply_guess('a'), GuessOutcome::Hit);
        assert_eq!(game.masked(), "-a-a-a");
        assert_eq!(game.guesses_left(), 4);
        assert_reveal_consistent(&game);
    }

    #[test]
    fn test_miss_costs_a_guess() {
        let mut game = GameState::new("cat", 7);

        assert_eq!(game.apply_guess('z'), GuessOutcome::Miss);
        assert_eq!(game.guesses_left(), 6);
        assert_eq!(game.masked(), "---");
        assert!(game.has_guessed('z'));
    }

    #[test]
    fn test_out_of_turn_checked_first() {
        let game = game_with_turn("cat", 7, 1);

        assert_eq!(game.check_guess(2, "c"), Err(GuessError::OutOfTurn));
        assert_eq!(game.check_guess(2, "not a letter"), Err(GuessError::OutOfTurn));
    }

    #[test]
    fn test_no_turn_holder_rejects_everyone() {
        let game = GameState::new("cat", 7);
        assert_eq!(game.check_guess(1, "c"), Err(GuessError::OutOfTurn));
    }

    #[test]
    fn test_invalid_guesses() {
        let mut game = game_with_turn("cat", 7, 1);
        game.apply_guess('c');

        for line in ["", "ab", "A", "1", " ", "é", "c"] {
            assert_eq!(
                game.check_guess(1, line),
                Err(GuessError::Invalid),
                "line {:?} should be invalid",
                line
            );
        }
        assert_eq!(game.check_guess(1, "a"), Ok('a'));
    }

    #[test]
    fn test_win_detection() {
        let mut game = GameState::new("cat", 7);
        for letter in ['c', 'a'] {
            game.apply_guess(letter);
            assert_eq!(game.round_result(), None);
        }
        game.apply_guess('t');
        assert_eq!(game.round_result(), Some(RoundResult::Won));
    }

    #[test]
    fn test_loss_on_exhaustion() {
        let mut game = GameState::new("dog", 1);
        game.apply_guess('x');

        assert_eq!(game.guesses_left(), 0);
        assert_eq!(game.round_result(), Some(RoundResult::Lost));
        assert_eq!(game.word(), "dog");
    }

    #[test]
    fn test_win_checked_before_exhaustion() {
        let mut game = GameState::new("a", 1);
        game.apply_guess('a');
        game.guesses_left = 0;

        assert_eq!(game.round_result(), Some(RoundResult::Won));
    }

    #[test]
    fn test_reset_keeps_turn_and_restores_budget() {
        let mut game = game_with_turn("dog", 2, 5);
        game.apply_guess('x');
        game.apply_guess('o');

        game.reset("emu");
        assert_eq!(game.turn(), Some(5));
        assert_eq!(game.guesses_left(), 2);
        assert_eq!(game.masked(), "---");
        assert!(!game.has_guessed('x'));
        assert_eq!(game.round(), 2);
    }

    #[test]
    fn test_reveal_invariant_over_guess_sequences() {
        let orders = [
            "etaoinshrdlucmfwypvbgkqjxz",
            "zyxwvutsrqponmlkjihgfedcba",
            "qazwsxedcrfvtgbyhnujmikolp",
        ];

        for word in ["hangman", "mississippi", "rhythm", "a"] {
            for order in orders {
                let mut game = game_with_turn(word, 26, 1);
                let mut previous = game.guesses_left();

                for letter in order.chars() {
                    if game.round_result().is_some() {
                        break;
                    }
                    assert_eq!(game.check_guess(1, &letter.to_string()), Ok(letter));
                    game.apply_guess(letter);

                    assert_reveal_consistent(&game);
                    assert!(game.guesses_left() <= previous);
                    previous = game.guesses_left();
                }

                assert_eq!(game.round_result(), Some(RoundResult::Won));
            }
        }
    }

    #[test]
    fn test_exhausting_every_other_letter_loses_with_word() {
        let mut game = game_with_turn("cab", 23, 1);

        for letter in ('a'..='z').filter(|l| !"cab".contains(*l)) {
            game.apply_guess(letter);
        }

        assert_eq!(game.round_result(), Some(RoundResult::Lost));
        assert_eq!(game.masked(), "---");
        let notice = Notice::Lost { word: game.word() };
        assert!(notice.to_string().contains("cab"));
    }

    #[test]
    fn test_status_notice() {
        let mut game = GameState::new("cat", 7);
        game.apply_guess('c');
        game.apply_guess('z');

        assert_eq!(
            game.status(),
            Notice::Status {
                masked: "c--".to_string(),
                guesses_left: 6,
                guessed: "c z".to_string(),
            }
        );
    }
}

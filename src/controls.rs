//! Control commands queued by the window and applied at tick boundaries.

use std::collections::VecDeque;
use std::fmt;

/// Something the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Mask the spectrum with the template at this scale degree (0-based)
    SelectTemplate(usize),
    /// Pass the spectrum through unmasked
    ClearTemplate,
    /// Redraw every weight and bias
    Reseed,
    ToggleMelody,
    TogglePercussion,
}

impl Command {
    /// Digit key mapping: 1-9 pick scale degrees 0-8, 0 clears.
    pub fn for_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Command::ClearTemplate),
            1..=9 => Some(Command::SelectTemplate(digit as usize - 1)),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SelectTemplate(i) => write!(f, "select template {}", i),
            Command::ClearTemplate => f.write_str("clear template"),
            Command::Reseed => f.write_str("reseed"),
            Command::ToggleMelody => f.write_str("toggle melody"),
            Command::TogglePercussion => f.write_str("toggle percussion"),
        }
    }
}

/// FIFO of commands waiting for the next tick
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Oldest pending command
    pub fn pop(&mut self) -> Option<Command> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_mapping() {
        assert_eq!(Command::for_digit(0), Some(Command::ClearTemplate));
        assert_eq!(Command::for_digit(1), Some(Command::SelectTemplate(0)));
        assert_eq!(Command::for_digit(9), Some(Command::SelectTemplate(8)));
        assert_eq!(Command::for_digit(10), None);
    }

    #[test]
    fn test_queue_preserves_order() {
        let mut queue = CommandQueue::new();
        queue.push(Command::Reseed);
        queue.push(Command::SelectTemplate(2));
        queue.push(Command::ToggleMelody);
        assert_eq!(queue.len(), 3);

        let drained: Vec<_> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(
            drained,
            vec![
                Command::Reseed,
                Command::SelectTemplate(2),
                Command::ToggleMelody
            ]
        );
        assert!(queue.is_empty());
    }
}

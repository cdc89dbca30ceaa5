//! The read/write head: a cursor over the tape it has exclusive write access to.

use crate::tape::Tape;
use crate::types::{Direction, Symbol};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    position: i64,
    tape: Tape,
}

impl Head {
    /// Places a head at `position` over `tape`. Any position is valid.
    pub fn new(tape: Tape, position: i64) -> Self {
        Self { position, tape }
    }

    /// Reads the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.tape.read(self.position)
    }

    /// Writes `symbol` under the head.
    pub fn write(&mut self, symbol: Symbol) {
        self.tape.write(self.position, symbol);
    }

    /// Moves the head by one cell (or not at all for [`Direction::Stay`]).
    ///
    /// The head stops at `i64::MIN` and `i64::MAX`, the ends of the addressable tape.
    pub fn move_to(&mut self, direction: Direction) {
        self.position = match direction {
            Direction::Left => self.position.saturating_sub(1),
            Direction::Right => self.position.saturating_add(1),
            Direction::Stay => self.position,
        };
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    /// Read-only view of the tape, e.g. for rendering.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn into_tape(self) -> Tape {
        self.tape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_left_right() {
        let mut head = Head::new(Tape::new('_'), 0);
        head.move_to(Direction::Left);
        head.move_to(Direction::Left);
        head.move_to(Direction::Right);

        assert_eq!(head.position(), -1);
    }

    #[test]
    fn test_stay_does_not_move() {
        let mut head = Head::new(Tape::new('_'), 5);
        head.move_to(Direction::Stay);

        assert_eq!(head.position(), 5);
    }

    #[test]
    fn test_stops_at_ends_of_range() {
        let mut head = Head::new(Tape::new('_'), i64::MIN);
        head.move_to(Direction::Left);
        assert_eq!(head.position(), i64::MIN);

        let mut head = Head::new(Tape::new('_'), i64::MAX);
        head.move_to(Direction::Right);
        assert_eq!(head.position(), i64::MAX);

        head.move_to(Direction::Left);
        assert_eq!(head.position(), i64::MAX - 1);
    }

    #[test]
    fn test_read_write_at_position() {
        let mut head = Head::new(Tape::from_symbols('_', 0, "abc".chars()), 1);
        assert_eq!(head.read(), 'b');

        head.write('x');
        assert_eq!(head.tape().render(), "axc");

        head.move_to(Direction::Right);
        head.move_to(Direction::Right);
        assert_eq!(head.read(), '_');
    }

    #[test]
    fn test_unbounded_movement() {
        let mut head = Head::new(Tape::new('_'), 0);
        for _ in 0..10 {
            head.move_to(Direction::Left);
        }
        head.write('1');

        assert_eq!(head.position(), -10);
        assert_eq!(head.into_tape().leftmost_occupied_position(), -10);
    }
}

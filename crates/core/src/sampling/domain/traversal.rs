use crate::shared::direction::Direction;

/// Walk over logical frame indices for one direction.
///
/// Each step advances the index before it is used, so a forward walk from 0
/// yields `1..=N` and a reverse walk from `N` yields `N-1..=0`. Either way
/// there is exactly one logical index per sequential decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Traversal {
    start: usize,
    step: isize,
    flip: bool,
}

impl Traversal {
    pub fn new(direction: Direction, frame_count: usize) -> Self {
        match direction {
            Direction::Forward => Self {
                start: 0,
                step: 1,
                flip: false,
            },
            Direction::Reverse => Self {
                start: frame_count,
                step: -1,
                flip: true,
            },
        }
    }

    /// Whether saved frames are mirrored horizontally.
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// Logical indices in processing order, one per decoded frame.
    pub fn indices(&self, frame_count: usize) -> impl Iterator<Item = usize> {
        let start = self.start as isize;
        let step = self.step;
        (1..=frame_count as isize).map(move |k| (start + step * k) as usize)
    }
}

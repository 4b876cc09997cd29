mod optimistic_counter;

pub use optimistic_counter::*;

mod deque;
pub use deque::Deque;

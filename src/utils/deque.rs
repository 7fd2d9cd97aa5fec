use alloc::boxed::Box;

/// A fixed-size double-ended queue holding the samples of a rolling window
///
/// New samples enter at the front and the oldest sample leaves from the back.
#[derive(Debug, Clone)]
pub struct Deque<T> {
    /// The buffer with fixed capacity and allocated on the heap.
    buf: Box<[T]>,
    /// The capacity of the deque
    cap: usize,
    /// The index of the front (newest) element in the buffer
    front: usize,
    /// One past the index of the back (oldest) element in the buffer
    back: usize,
    /// The current number of elements stored in the deque
    len: usize,
}

impl<T> Deque<T>
where
    T: Default + Clone,
{
    /// Creates a new `Deque` instance with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The capacity of the deque
    ///
    /// # Returns
    ///
    /// * `Self` - The `Deque` instance
    #[inline]
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "capacity must be > 0");
        Self {
            buf: vec![T::default(); cap].into_boxed_slice(),
            cap,
            front: 0,
            back: 0,
            len: 0,
        }
    }

    /// Returns true if the deque is empty
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if the deque is full
    #[inline]
    pub const fn is_full(&self) -> bool {
        self.len == self.cap
    }

    /// Pushes a new element to the front of the deque
    ///
    /// If the deque is full, the back element is evicted first
    ///
    /// # Arguments
    ///
    /// * `value` - The value to push to the front of the deque
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The evicted element if the deque was full, otherwise None
    #[inline]
    pub fn push_front(&mut self, value: T) -> Option<T> {
        let evicted = if self.is_full() {
            self.pop_back()
        } else {
            None
        };

        self.front = if self.front == 0 {
            self.cap - 1
        } else {
            self.front - 1
        };
        self.buf[self.front] = value;
        self.len += 1;

        evicted
    }

    /// Pops the element from the back of the deque
    ///
    /// If the deque is empty, returns None
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The oldest element of the deque, if it exists
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.back = if self.back == 0 {
            self.cap - 1
        } else {
            self.back - 1
        };

        self.len -= 1;
        Some(core::mem::take(&mut self.buf[self.back]))
    }

    /// Iterates from the newest element to the oldest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).map(move |i| &self.buf[(self.front + i) % self.cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn contents(deque: &Deque<i32>) -> Vec<i32> {
        deque.iter().copied().collect()
    }

    #[test]
    fn test_push_front_pop_back() {
        let mut deque = Deque::new(3);

        deque.push_front(1);
        deque.push_front(2);
        deque.push_front(3);
        assert_eq!(contents(&deque), vec![3, 2, 1]);

        assert_eq!(deque.pop_back(), Some(1));
        assert_eq!(deque.pop_back(), Some(2));
        assert_eq!(deque.pop_back(), Some(3));
        assert!(deque.is_empty());
    }

    #[test]
    fn test_evicts_oldest_on_full() {
        let mut deque = Deque::new(2);

        assert_eq!(deque.push_front(10), None);
        assert_eq!(deque.push_front(20), None);
        assert_eq!(deque.push_front(30), Some(10));
        assert_eq!(deque.push_front(40), Some(20));

        assert!(deque.is_full());
        assert_eq!(contents(&deque), vec![40, 30]);
    }

    #[test]
    fn test_iter_newest_first() {
        let mut deque = Deque::new(3);
        deque.push_front(1);
        deque.push_front(2);
        assert_eq!(contents(&deque), vec![2, 1]);

        deque.push_front(3);
        deque.push_front(4);
        assert_eq!(contents(&deque), vec![4, 3, 2]);
    }

    #[test]
    fn test_pop_then_push_wraps() {
        let mut deque = Deque::new(3);
        deque.push_front(1);
        deque.push_front(2);
        deque.push_front(3);

        for i in 0..10 {
            assert_eq!(deque.pop_back(), Some(i + 1));
            assert_eq!(deque.push_front(i + 4), None);
        }

        assert!(deque.is_full());
        assert_eq!(contents(&deque), vec![13, 12, 11]);
    }

    #[test]
    fn test_capacity_one() {
        let mut deque = Deque::new(1);

        assert_eq!(deque.push_front(10), None);
        assert!(deque.is_full());
        assert_eq!(contents(&deque), vec![10]);

        assert_eq!(deque.push_front(20), Some(10));
        assert_eq!(deque.pop_back(), Some(20));
        assert!(deque.is_empty());
    }

    #[test]
    fn test_empty() {
        let mut deque = Deque::<i32>::new(2);
        assert!(contents(&deque).is_empty());
        assert_eq!(deque.pop_back(), None);
        assert!(!deque.is_full());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn test_zero_capacity_panics() {
        let _ = Deque::<f64>::new(0);
    }
}

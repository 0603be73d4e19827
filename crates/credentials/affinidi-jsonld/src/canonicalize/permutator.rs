use std::collections::HashMap;

/// Every ordering of a list of labels, starting from the sorted order.
///
/// Successive permutations differ by one adjacent swap (Steinhaus-Johnson-Trotter).
/// An empty list yields a single empty permutation.
pub(crate) struct Permutator {
    list: Vec<String>,
    /// Direction each element is looking: `true` for left.
    left: HashMap<String, bool>,
    done: bool,
}

impl Permutator {
    pub(crate) fn new(mut list: Vec<String>) -> Self {
        list.sort();
        let left = list.iter().map(|e| (e.clone(), true)).collect();
        Self {
            list,
            left,
            done: false,
        }
    }

    fn is_left(&self, element: &str) -> bool {
        self.left.get(element).copied().unwrap_or(true)
    }

    /// Position of the largest element that is greater than the neighbour it faces.
    fn largest_mobile(&self) -> Option<usize> {
        let last = self.list.len().saturating_sub(1);
        let mut mobile: Option<usize> = None;
        for (i, element) in self.list.iter().enumerate() {
            if let Some(k) = mobile
                && *element <= self.list[k]
            {
                continue;
            }
            let movable = if self.is_left(element) {
                i > 0 && *element > self.list[i - 1]
            } else {
                i < last && *element > self.list[i + 1]
            };
            if movable {
                mobile = Some(i);
            }
        }
        mobile
    }
}

impl Iterator for Permutator {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.list.clone();

        match self.largest_mobile() {
            None => self.done = true,
            Some(pos) => {
                let k = self.list[pos].clone();
                let target = if self.is_left(&k) { pos - 1 } else { pos + 1 };
                self.list.swap(pos, target);
                for element in &self.list {
                    if *element > k
                        && let Some(direction) = self.left.get_mut(element)
                    {
                        *direction = !*direction;
                    }
                }
            }
        }
        Some(current)
    }
}

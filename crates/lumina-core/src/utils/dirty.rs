// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A value paired with a "needs upload" flag.
//!
//! [`DirtyCell`] is the building block for every CPU-side aggregate that mirrors a
//! GPU constant buffer. Setters store the new value and raise the flag; the upload
//! step consumes the flag only after the write succeeded:
//!
//! ```text
//! Clean --set/modify--> Dirty --consume(Ok)--> Clean
//!                         ^          |
//!                         +--Err-----+
//! ```

/// A value that remembers whether it changed since it was last consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyCell<T> {
    value: T,
    dirty: bool,
}

impl<T> DirtyCell<T> {
    /// Wraps `value` as dirty: it has never been uploaded.
    pub const fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    /// Wraps `value` as clean.
    pub const fn new_clean(value: T) -> Self {
        Self {
            value,
            dirty: false,
        }
    }

    /// Returns the current value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value and marks the cell dirty.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    /// Mutates the value in place and marks the cell dirty.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.dirty = true;
        f(&mut self.value)
    }

    /// Returns `true` if the value changed since the last successful consume.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Forces the next consume to run even if the value did not change.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Clears the flag without running an upload.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Runs `upload` if the cell is dirty and clears the flag when it succeeds.
    ///
    /// Returns `Ok(true)` when an upload ran, `Ok(false)` when the cell was clean.
    /// On error the cell stays dirty so the next frame retries.
    pub fn consume<E>(&mut self, upload: impl FnOnce(&T) -> Result<(), E>) -> Result<bool, E> {
        if !self.dirty {
            return Ok(false);
        }
        upload(&self.value)?;
        self.dirty = false;
        Ok(true)
    }
}

impl<T: Default> Default for DirtyCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_starts_dirty() {
        let cell = DirtyCell::new(1u32);
        assert!(cell.is_dirty());
        assert!(!DirtyCell::new_clean(1u32).is_dirty());
    }

    #[test]
    fn consume_runs_once_per_change() {
        let mut cell = DirtyCell::new(1u32);
        let mut uploads = Vec::new();

        cell.set(2);
        cell.set(3);
        let ran = cell
            .consume(|v| {
                uploads.push(*v);
                Ok::<(), ()>(())
            })
            .unwrap();
        assert!(ran);

        let ran_again = cell
            .consume(|v| {
                uploads.push(*v);
                Ok::<(), ()>(())
            })
            .unwrap();
        assert!(!ran_again);
        assert_eq!(uploads, vec![3]);
    }

    #[test]
    fn failed_consume_keeps_dirty() {
        let mut cell = DirtyCell::new("plane");
        let result = cell.consume(|_| Err("device lost"));
        assert_eq!(result, Err("device lost"));
        assert!(cell.is_dirty());
    }

    #[test]
    fn modify_marks_dirty() {
        let mut cell = DirtyCell::new_clean([0.0f32; 4]);
        let previous = cell.modify(|v| std::mem::replace(&mut v[3], 10.0));
        assert_eq!(previous, 0.0);
        assert!(cell.is_dirty());
        assert_eq!(cell.get()[3], 10.0);
    }
}

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Typed, generation-checked reference into a [`Pool`].
///
/// Generation `0` is never handed out by a pool, so `Handle::default()` acts as
/// the null handle for every resource kind.
pub struct Handle<T> {
    pub slot: u16,
    pub generation: u16,
    phantom: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub const fn new(slot: u16, generation: u16) -> Self {
        Self {
            slot,
            generation,
            phantom: PhantomData,
        }
    }

    /// `false` for the null handle.
    pub fn valid(&self) -> bool {
        self.generation != 0
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
        self.generation.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// Slot allocator storing `T` and handing out `Handle<Tag>`.
///
/// Releasing a slot bumps its generation, so handles to released items stop
/// resolving instead of aliasing whatever is inserted next. A slot whose
/// generation is exhausted is never handed out again.
pub struct Pool<T, Tag = T> {
    items: Vec<Option<T>>,
    empty: Vec<usize>,
    generation: Vec<u16>,
    exhausted: usize,
    phantom: PhantomData<fn() -> Tag>,
}

const INITIAL_SIZE: usize = 64;
const MAX_SLOTS: usize = u16::MAX as usize + 1;

impl<T, Tag> Default for Pool<T, Tag> {
    fn default() -> Self {
        Self::new(INITIAL_SIZE)
    }
}

impl<T, Tag> Pool<T, Tag> {
    pub fn new(initial_size: usize) -> Self {
        let initial_size = initial_size.min(MAX_SLOTS);
        let mut items = Vec::with_capacity(initial_size);
        items.resize_with(initial_size, || None);

        Pool {
            items,
            empty: (0..initial_size).rev().collect(),
            generation: vec![1; initial_size],
            exhausted: 0,
            phantom: PhantomData,
        }
    }

    fn grow(&mut self) -> Option<usize> {
        if self.items.len() >= MAX_SLOTS {
            return None;
        }

        self.items.push(None);
        self.generation.push(1);
        Some(self.items.len() - 1)
    }

    /// Store `item`, returning `None` once all 65536 slots are occupied.
    pub fn insert(&mut self, item: T) -> Option<Handle<Tag>> {
        let slot = match self.empty.pop() {
            Some(slot) => slot,
            None => self.grow()?,
        };

        self.items[slot] = Some(item);

        Some(Handle::new(slot as u16, self.generation[slot]))
    }

    /// Remove the item behind `item` and retire the handle.
    pub fn release(&mut self, item: Handle<Tag>) -> Option<T> {
        if !self.contains(item) {
            return None;
        }

        let slot = item.slot as usize;
        let value = self.items[slot].take();
        match self.generation[slot].checked_add(1) {
            Some(next) => {
                self.generation[slot] = next;
                self.empty.push(slot);
            }
            None => self.exhausted += 1,
        }
        value
    }

    /// `true` if [`insert`](Self::insert) would succeed.
    pub fn has_room(&self) -> bool {
        !self.empty.is_empty() || self.items.len() < MAX_SLOTS
    }

    pub fn contains(&self, item: Handle<Tag>) -> bool {
        let slot = item.slot as usize;
        item.valid()
            && self.generation.get(slot) == Some(&item.generation)
            && self.items[slot].is_some()
    }

    /// `true` when `item` once referred to a slot that has since been released.
    pub fn is_retired(&self, item: Handle<Tag>) -> bool {
        item.valid() && (item.slot as usize) < self.items.len() && !self.contains(item)
    }

    pub fn get_ref(&self, item: Handle<Tag>) -> Option<&T> {
        if self.contains(item) {
            self.items[item.slot as usize].as_ref()
        } else {
            None
        }
    }

    pub fn get_mut_ref(&mut self, item: Handle<Tag>) -> Option<&mut T> {
        if self.contains(item) {
            self.items[item.slot as usize].as_mut()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len() - self.empty.len() - self.exhausted
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn for_each_occupied<F: FnMut(Handle<Tag>, &T)>(&self, mut f: F) {
        for (slot, item) in self.items.iter().enumerate() {
            if let Some(item) = item {
                f(Handle::new(slot as u16, self.generation[slot]), item);
            }
        }
    }

    /// Release every occupied slot.
    pub fn clear(&mut self) {
        let mut live = Vec::with_capacity(self.len());
        self.for_each_occupied(|handle, _| live.push(handle));
        for handle in live {
            self.release(handle);
        }
    }
}

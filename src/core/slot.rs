/// Write-once storage for a remotely fetched value.
///
/// Transitions:
///
/// - `NotFetched` → `Ready` or `Unavailable`
/// - `Unavailable` → `Ready` or `Unavailable` (another attempt)
/// - `Ready` is final
#[derive(Debug)]
pub enum Slot<T> {
    NotFetched,
    Unavailable,
    Ready(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::NotFetched
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum SlotError {
    #[error("the value has already been attached and cannot be replaced")]
    AlreadyAttached,
}

impl<T> Slot<T> {
    pub const fn get(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NotFetched | Self::Unavailable => None,
        }
    }

    pub const fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NotFetched | Self::Unavailable => None,
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn attach(&mut self, value: T) -> Result<(), SlotError> {
        if self.is_ready() {
            return Err(SlotError::AlreadyAttached);
        }
        *self = Self::Ready(value);
        Ok(())
    }

    pub fn mark_unavailable(&mut self) -> Result<(), SlotError> {
        if self.is_ready() {
            return Err(SlotError::AlreadyAttached);
        }
        *self = Self::Unavailable;
        Ok(())
    }
}

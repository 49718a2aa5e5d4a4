//! Specialized collection types
//!
//! Objects and components live in generational arenas. A handle stays valid
//! until its slot is removed, after which lookups return `None` instead of
//! aliasing whatever reuses the slot.

pub use slotmap::{SlotMap, Key};

slotmap::new_key_type! {
    /// Handle of a simulated object inside its scene
    pub struct ObjectId;

    /// Handle of a component inside its scene
    ///
    /// Component-reference fields store `Option<ComponentId>`.
    pub struct ComponentId;
}

/// Handle-based map using slot map for stable references
pub type HandleMap<K, T> = SlotMap<K, T>;

//! # Capabilities Module
//!
//! Passive records an [`Object`](crate::Object) can carry. Combat, item use
//! and AI decisions live elsewhere; these types only hold the data and know
//! which object they were attached to.

use crate::EntityId;
use serde::{Deserialize, Serialize};

/// Non-owning back-reference from a capability to the object carrying it.
///
/// Bound once when the capability is attached and never reassigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerHandle(Option<EntityId>);

impl OwnerHandle {
    /// The owning object, if attached.
    pub fn get(&self) -> Option<EntityId> {
        self.0
    }

    /// Binds the owner. Returns `false` if an owner was already bound.
    pub(crate) fn bind(&mut self, owner: EntityId) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(owner);
        true
    }
}

/// Implemented by every capability record so [`Object`](crate::Object) can
/// bind owners uniformly.
pub trait Capability {
    fn owner_handle(&self) -> &OwnerHandle;
    fn owner_handle_mut(&mut self) -> &mut OwnerHandle;

    /// The object this capability is attached to.
    fn owner(&self) -> Option<EntityId> {
        self.owner_handle().get()
    }
}

macro_rules! impl_capability {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Capability for $ty {
                fn owner_handle(&self) -> &OwnerHandle {
                    &self.owner
                }

                fn owner_handle_mut(&mut self) -> &mut OwnerHandle {
                    &mut self.owner
                }
            }
        )*
    };
}

impl_capability!(Fighter, Ai, Item, Inventory, Stairs, Level);

/// Combat statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub defense: i32,
    pub power: i32,
    /// Experience awarded to whoever defeats this fighter
    pub xp: u32,
    owner: OwnerHandle,
}

impl Fighter {
    pub fn new(max_hp: i32, defense: i32, power: i32, xp: u32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            defense,
            power,
            xp,
            owner: OwnerHandle::default(),
        }
    }
}

/// Which decision routine drives a monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiKind {
    /// Chases the player when visible and attacks when adjacent
    BasicMonster,
    /// Stumbles randomly, then reverts to `previous`
    Confused {
        previous: Box<AiKind>,
        turns_remaining: u32,
    },
}

/// Marks an object as computer-controlled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ai {
    pub kind: AiKind,
    owner: OwnerHandle,
}

impl Ai {
    pub fn new(kind: AiKind) -> Self {
        Self {
            kind,
            owner: OwnerHandle::default(),
        }
    }

    pub fn basic() -> Self {
        Self::new(AiKind::BasicMonster)
    }
}

/// Something that can be picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Name of the effect triggered on use, if any
    pub use_effect: Option<String>,
    /// Whether using the item asks for a target tile
    pub targeting: bool,
    owner: OwnerHandle,
}

impl Item {
    pub fn new(use_effect: Option<String>, targeting: bool) -> Self {
        Self {
            use_effect,
            targeting,
            owner: OwnerHandle::default(),
        }
    }
}

/// Items carried by an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<EntityId>,
    owner: OwnerHandle,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
            owner: OwnerHandle::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

/// A staircase leading to another floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub floor: u32,
    owner: OwnerHandle,
}

impl Stairs {
    pub fn new(floor: u32) -> Self {
        Self {
            floor,
            owner: OwnerHandle::default(),
        }
    }
}

/// Character level and experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub current_level: u32,
    pub current_xp: u32,
    pub level_up_base: u32,
    pub level_up_factor: u32,
    owner: OwnerHandle,
}

impl Level {
    pub fn new(current_level: u32, current_xp: u32, level_up_base: u32, level_up_factor: u32) -> Self {
        Self {
            current_level,
            current_xp,
            level_up_base,
            level_up_factor,
            owner: OwnerHandle::default(),
        }
    }

    /// Experience needed to reach the next level.
    pub fn experience_to_next_level(&self) -> u32 {
        self.level_up_base + self.current_level * self.level_up_factor
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new(1, 0, 200, 150)
    }
}

//! # Object Module
//!
//! The generic dungeon object. Players, monsters, items and stairs are all an
//! [`Object`]; what an object can do is decided by which capability slots are
//! filled, not by its type.

use crate::{
    new_entity_id, Ai, Capability, EntityId, Fighter, Inventory, Item, Level, Occupant, Position,
    Stairs,
};

/// A player, monster, item or staircase on the grid.
///
/// The position is only changed through the move operations
/// ([`move_by`](Object::move_by), [`move_towards`](Object::move_towards),
/// [`move_astar`](Object::move_astar)).
///
/// # Examples
///
/// ```
/// use delver::{Ai, Capability, Fighter, Object};
///
/// let orc = Object::new(3, 4, 'o', "orc", true)
///     .with_fighter(Fighter::new(10, 0, 3, 35))
///     .with_ai(Ai::basic());
///
/// assert_eq!(orc.fighter().unwrap().owner(), Some(orc.id()));
/// assert_eq!(orc.distance(0, 0), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    id: EntityId,
    x: i32,
    y: i32,
    /// Map glyph
    pub glyph: char,
    pub name: String,
    /// Keeps other blocking objects out of this tile
    pub blocks: bool,
    fighter: Option<Fighter>,
    ai: Option<Ai>,
    item: Option<Item>,
    inventory: Option<Inventory>,
    stairs: Option<Stairs>,
    level: Option<Level>,
}

impl Object {
    /// Creates an object with no capabilities.
    pub fn new(x: i32, y: i32, glyph: char, name: impl Into<String>, blocks: bool) -> Self {
        Self {
            id: new_entity_id(),
            x,
            y,
            glyph,
            name: name.into(),
            blocks,
            fighter: None,
            ai: None,
            item: None,
            inventory: None,
            stairs: None,
            level: None,
        }
    }

    pub fn with_fighter(mut self, fighter: Fighter) -> Self {
        self.fighter = Some(self.attach(fighter));
        self
    }

    pub fn with_ai(mut self, ai: Ai) -> Self {
        self.ai = Some(self.attach(ai));
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(self.attach(item));
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(self.attach(inventory));
        self
    }

    pub fn with_stairs(mut self, stairs: Stairs) -> Self {
        self.stairs = Some(self.attach(stairs));
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(self.attach(level));
        self
    }

    fn attach<C: Capability>(&self, mut capability: C) -> C {
        if !capability.owner_handle_mut().bind(self.id) {
            log::warn!(
                "{} already belongs to {:?}, keeping the original owner",
                self.name,
                capability.owner()
            );
        }
        capability
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub(crate) fn set_position(&mut self, pos: Position) {
        self.x = pos.x;
        self.y = pos.y;
    }

    /// Euclidean distance to another object.
    pub fn distance_to(&self, other: &Object) -> f64 {
        self.position().euclidean_distance(other.position())
    }

    /// Euclidean distance to a tile.
    pub fn distance(&self, x: i32, y: i32) -> f64 {
        self.position().euclidean_distance(Position::new(x, y))
    }

    pub fn fighter(&self) -> Option<&Fighter> {
        self.fighter.as_ref()
    }

    pub fn fighter_mut(&mut self) -> Option<&mut Fighter> {
        self.fighter.as_mut()
    }

    pub fn ai(&self) -> Option<&Ai> {
        self.ai.as_ref()
    }

    pub fn ai_mut(&mut self) -> Option<&mut Ai> {
        self.ai.as_mut()
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.inventory.as_ref()
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.inventory.as_mut()
    }

    pub fn stairs(&self) -> Option<&Stairs> {
        self.stairs.as_ref()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn level_mut(&mut self) -> Option<&mut Level> {
        self.level.as_mut()
    }
}

impl Occupant for Object {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    fn blocks(&self) -> bool {
        self.blocks
    }
}

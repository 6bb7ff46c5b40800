//! # Occupants Module
//!
//! Who is standing where. Movement only ever asks two questions of the
//! occupant list: which occupants block movement, and is one of them on a
//! given tile. [`ObjectRegistry`] is the stock owner of live objects and also
//! applies moves by id, so the mover never has to be borrowed out of the
//! list it is checked against.

use crate::{
    plan_astar_move, plan_steer, DelverError, DelverResult, EntityId, MapView, MoveOutcome,
    Object, PathPlanner, Position,
};
use std::collections::HashMap;

/// Anything that occupies a tile.
pub trait Occupant {
    fn id(&self) -> EntityId;
    fn position(&self) -> Position;
    /// Whether other occupants are kept out of this tile.
    fn blocks(&self) -> bool;
}

/// Read access to the live occupants of a level.
pub trait OccupantRegistry {
    /// Every movement-blocking occupant, in registry order.
    fn blockers(&self) -> impl Iterator<Item = (EntityId, Position)> + '_;

    /// The first blocking occupant on `pos`, if any.
    fn blocking_occupant_at(&self, pos: Position) -> Option<EntityId> {
        self.blockers()
            .find(|(_, at)| *at == pos)
            .map(|(id, _)| id)
    }

    /// Blocking occupants other than the ones named in `exclude`.
    fn blockers_excluding<'a>(
        &'a self,
        exclude: &'a [EntityId],
    ) -> impl Iterator<Item = (EntityId, Position)> + 'a {
        self.blockers().filter(move |(id, _)| !exclude.contains(id))
    }
}

impl<T: Occupant> OccupantRegistry for [T] {
    fn blockers(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.iter()
            .filter(|occupant| occupant.blocks())
            .map(|occupant| (occupant.id(), occupant.position()))
    }
}

impl<T: Occupant> OccupantRegistry for Vec<T> {
    fn blockers(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.as_slice().blockers()
    }
}

/// Owns the objects on a level and moves them by id.
///
/// # Examples
///
/// ```
/// use delver::{GameMap, Object, ObjectRegistry, OccupantRegistry, Position};
///
/// let map = GameMap::new(10, 10);
/// let mut objects = ObjectRegistry::new();
/// let orc = objects.add(Object::new(0, 0, 'o', "orc", true));
/// let hero = objects.add(Object::new(5, 0, '@', "hero", true));
///
/// objects.move_astar(orc, hero, &map).unwrap();
/// assert_eq!(objects.position_of(orc).unwrap(), Position::new(1, 0));
/// assert_eq!(objects.blocking_occupant_at(Position::new(5, 0)), Some(hero));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: Vec<Object>,
    index: HashMap<EntityId, usize>,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an object and returns its id.
    pub fn add(&mut self, object: Object) -> EntityId {
        let id = object.id();
        if let Some(&slot) = self.index.get(&id) {
            self.objects[slot] = object;
        } else {
            self.index.insert(id, self.objects.len());
            self.objects.push(object);
        }
        id
    }

    /// Removes an object, returning it.
    pub fn remove(&mut self, id: EntityId) -> DelverResult<Object> {
        let slot = self.index.remove(&id).ok_or(DelverError::UnknownEntity(id))?;
        let removed = self.objects.remove(slot);
        for object in &self.objects[slot..] {
            if let Some(entry) = self.index.get_mut(&object.id()) {
                *entry -= 1;
            }
        }
        Ok(removed)
    }

    pub fn get(&self, id: EntityId) -> Option<&Object> {
        self.index.get(&id).map(|&slot| &self.objects[slot])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Object> {
        self.index.get(&id).map(|&slot| &mut self.objects[slot])
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Gets an object's position.
    pub fn position_of(&self, id: EntityId) -> DelverResult<Position> {
        self.lookup(id).map(Object::position)
    }

    /// Shifts an object by `(dx, dy)` without any checks.
    pub fn move_by(&mut self, id: EntityId, dx: i32, dy: i32) -> DelverResult<()> {
        self.lookup_mut(id)?.move_by(dx, dy);
        Ok(())
    }

    /// Steers an object one step toward `target`.
    pub fn move_towards<M: MapView + ?Sized>(
        &mut self,
        id: EntityId,
        target: Position,
        map: &M,
    ) -> DelverResult<MoveOutcome> {
        let from = self.position_of(id)?;
        let outcome = plan_steer(from, target, map, &*self);
        self.apply(id, &outcome)?;
        Ok(outcome)
    }

    /// Moves `mover` one step along a path toward `target` with the default
    /// planner, steering when no usable path exists.
    pub fn move_astar<M: MapView + ?Sized>(
        &mut self,
        mover: EntityId,
        target: EntityId,
        map: &M,
    ) -> DelverResult<MoveOutcome> {
        self.move_astar_with(&PathPlanner::default(), mover, target, map)
    }

    /// Same as [`move_astar`](Self::move_astar) with a caller-supplied planner.
    pub fn move_astar_with<M: MapView + ?Sized>(
        &mut self,
        planner: &PathPlanner,
        mover: EntityId,
        target: EntityId,
        map: &M,
    ) -> DelverResult<MoveOutcome> {
        let from = self.position_of(mover)?;
        let goal = self.position_of(target)?;
        let outcome = plan_astar_move(planner, (mover, from), (target, goal), &*self, map);
        self.apply(mover, &outcome)?;
        Ok(outcome)
    }

    fn apply(&mut self, id: EntityId, outcome: &MoveOutcome) -> DelverResult<()> {
        if let Some(destination) = outcome.destination() {
            self.lookup_mut(id)?.set_position(destination);
        }
        Ok(())
    }

    fn lookup(&self, id: EntityId) -> DelverResult<&Object> {
        self.get(id).ok_or(DelverError::UnknownEntity(id))
    }

    fn lookup_mut(&mut self, id: EntityId) -> DelverResult<&mut Object> {
        self.get_mut(id).ok_or(DelverError::UnknownEntity(id))
    }
}

impl OccupantRegistry for ObjectRegistry {
    fn blockers(&self) -> impl Iterator<Item = (EntityId, Position)> + '_ {
        self.objects.as_slice().blockers()
    }
}

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

use log::debug;

use crate::error::Result;
use crate::mapping::{Entity, EntityMapper};

type SharedMapper = Arc<dyn Any + Send + Sync>;

/// Process-wide cache of built [`EntityMapper`]s, one per record type.
///
/// A record type is described once, the first time a mapper is asked for, and
/// every later caller gets a handle to the same immutable mapper. A failed
/// build is not cached, so the next call tries again and reports the same
/// error.
pub struct MapperRegistry {
    registry: RwLock<HashMap<TypeId, SharedMapper>>,
}

impl MapperRegistry {
    pub fn new() -> MapperRegistry {
        MapperRegistry {
            registry: RwLock::new(HashMap::new()),
        }
    }

    pub fn global() -> &'static MapperRegistry {
        //! The registry backing [`mapper_for`].

        static GLOBAL: OnceLock<MapperRegistry> = OnceLock::new();
        GLOBAL.get_or_init(MapperRegistry::new)
    }

    pub fn get_or_build<R: Entity>(&self) -> Result<Arc<EntityMapper<R>>> {
        let key = TypeId::of::<R>();

        if let Some(mapper) = self.lookup::<R>(&key) {
            return Ok(mapper);
        }

        // Two callers can race to here; both build, the first insert wins and
        // the loser's mapper is dropped.
        let built = Arc::new(EntityMapper::<R>::new()?);

        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let shared = registry.entry(key).or_insert_with(|| {
            debug!("registered mapper for {}", R::NAME);
            Arc::clone(&built) as SharedMapper
        });

        Ok(downcast::<R>(Arc::clone(shared)).unwrap_or(built))
    }

    pub fn contains<R: Entity>(&self) -> bool {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.registry.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<R: Entity>(&self, key: &TypeId) -> Option<Arc<EntityMapper<R>>> {
        let registry = self.registry.read().unwrap_or_else(|e| e.into_inner());
        registry
            .get(key)
            .and_then(|shared| downcast::<R>(Arc::clone(shared)))
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        MapperRegistry::new()
    }
}

fn downcast<R: Entity>(shared: SharedMapper) -> Option<Arc<EntityMapper<R>>> {
    // Entries are keyed by the TypeId of the exact type they were built for,
    // so this only fails on a corrupted entry, which is then bypassed.
    shared.downcast::<EntityMapper<R>>().ok()
}

pub fn mapper_for<R: Entity>() -> Result<Arc<EntityMapper<R>>> {
    //! The shared mapper for `R`, built on first use.

    MapperRegistry::global().get_or_build::<R>()
}

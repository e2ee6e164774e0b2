use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::DataError;
use crate::row::Row;

/// Maps one result row to a typed value.
///
/// Called once per row, in result order. Implementations only read column
/// values; they must not have other side effects.
pub trait RowMapper<T>: Send + Sync {
    fn map_row(&self, row: &dyn Row) -> Result<T, DataError>;
}

impl<T, F> RowMapper<T> for F
where
    F: Fn(&dyn Row) -> Result<T, DataError> + Send + Sync,
{
    fn map_row(&self, row: &dyn Row) -> Result<T, DataError> {
        self(row)
    }
}

/// A type that knows how to build itself from a result row.
///
/// ```ignore
/// impl Entity for User {
///     fn from_row(row: &dyn Row) -> Result<Self, DataError> {
///         Ok(User {
///             id: row.require_i64("id")?,
///             name: row.require_string("name")?,
///             email: row.opt_string("email")?,
///         })
///     }
/// }
/// ```
pub trait Entity: Sized + Send + Sync + 'static {
    fn from_row(row: &dyn Row) -> Result<Self, DataError>;
}

/// [`RowMapper`] that delegates to [`Entity::from_row`].
pub struct EntityMapper<T>(PhantomData<fn() -> T>);

impl<T> EntityMapper<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for EntityMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> RowMapper<T> for EntityMapper<T> {
    fn map_row(&self, row: &dyn Row) -> Result<T, DataError> {
        T::from_row(row)
    }
}

/// Type -> row mapper table, built once at startup.
///
/// ```ignore
/// let mappers = MapperRegistry::builder()
///     .register::<User>()
///     .register_mapper::<UserSummary>(|row: &dyn Row| { ... })
///     .build();
/// ```
#[derive(Default)]
pub struct MapperRegistry {
    mappers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MapperRegistry {
    pub fn builder() -> MapperRegistryBuilder {
        MapperRegistryBuilder {
            registry: MapperRegistry::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.mappers.contains_key(&TypeId::of::<T>())
    }

    /// Look up the mapper registered for `T`.
    ///
    /// A missing entry means the type was never registered at startup; the
    /// error is a [`DataError::Configuration`].
    pub fn resolve<T: 'static>(&self) -> Result<Arc<dyn RowMapper<T>>, DataError> {
        self.mappers
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<dyn RowMapper<T>>>())
            .cloned()
            .ok_or_else(|| {
                DataError::configuration(format!(
                    "no row mapper registered for `{}`",
                    type_name::<T>()
                ))
            })
    }
}

impl std::fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("mappers", &self.mappers.len())
            .finish()
    }
}

pub struct MapperRegistryBuilder {
    registry: MapperRegistry,
}

impl MapperRegistryBuilder {
    /// Register an [`Entity`] with its own `from_row`.
    pub fn register<T: Entity>(self) -> Self {
        self.register_mapper::<T>(EntityMapper::<T>::new())
    }

    /// Register an explicit mapper for `T`. A later registration for the
    /// same type replaces the earlier one.
    pub fn register_mapper<T: 'static>(mut self, mapper: impl RowMapper<T> + 'static) -> Self {
        let mapper: Arc<dyn RowMapper<T>> = Arc::new(mapper);
        if self
            .registry
            .mappers
            .insert(TypeId::of::<T>(), Box::new(mapper))
            .is_some()
        {
            tracing::warn!(ty = type_name::<T>(), "Row mapper registered twice, keeping the last one");
        }
        self
    }

    pub fn build(self) -> MapperRegistry {
        tracing::debug!(count = self.registry.len(), "Mapper registry built");
        self.registry
    }
}

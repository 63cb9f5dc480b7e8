use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

use crate::domain::errors::ContainerError;

type Instance = Arc<dyn Any + Send + Sync>;
type BoxError = Box<dyn std::error::Error + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> Result<Instance, BoxError> + Send + Sync>;

struct Binding {
    type_name: &'static str,
    factory: Option<Factory>,
    // Held across the factory call so concurrent first resolutions build once.
    instance: Mutex<Option<Instance>>,
}

/// Explicit service registry.
///
/// Maps a type (and optional string aliases) to a lazily constructed shared
/// instance. Every successful resolution of the same binding returns the same
/// `Arc` until [`Container::forget_instance`] is called.
#[derive(Default)]
pub struct Container {
    bindings: RwLock<HashMap<TypeId, Arc<Binding>>>,
    aliases: RwLock<HashMap<String, TypeId>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `T` to a factory that runs at most once per cached instance.
    /// Re-binding replaces the previous factory and drops its instance.
    pub fn singleton<T, F, E>(&self, factory: F)
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |container| {
            factory(container)
                .map(|value| Arc::new(value) as Instance)
                .map_err(|e| Box::new(e) as BoxError)
        });

        self.insert_binding::<T>(Binding {
            type_name: type_name::<T>(),
            factory: Some(factory),
            instance: Mutex::new(None),
        });
    }

    /// Bind an already constructed value
    pub fn instance<T>(&self, value: T) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let value = Arc::new(value);
        self.insert_binding::<T>(Binding {
            type_name: type_name::<T>(),
            factory: None,
            instance: Mutex::new(Some(value.clone() as Instance)),
        });
        value
    }

    /// Register `alias` as another name for `T`'s binding
    pub fn alias<T: 'static>(&self, alias: impl Into<String>) {
        let alias = alias.into();
        debug!("Aliasing {} as {}", type_name::<T>(), alias);
        self.aliases
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(alias, TypeId::of::<T>());
    }

    pub fn make<T>(&self) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let binding = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned()
            .ok_or_else(|| ContainerError::Unbound {
                key: type_name::<T>().to_string(),
            })?;

        let instance = self.resolve_binding(&binding)?;
        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                key: binding.type_name.to_string(),
                expected: type_name::<T>().to_string(),
            })
    }

    /// Resolve through a string alias; the alias must point at `T`
    pub fn make_alias<T>(&self, alias: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let target = self
            .aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(alias)
            .copied()
            .ok_or_else(|| ContainerError::UnknownAlias {
                alias: alias.to_string(),
            })?;

        if target != TypeId::of::<T>() {
            return Err(ContainerError::TypeMismatch {
                key: alias.to_string(),
                expected: type_name::<T>().to_string(),
            });
        }

        self.make::<T>()
    }

    pub fn bound<T: 'static>(&self) -> bool {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.aliases
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(alias)
    }

    /// Drop the cached instance of `T`; the next resolution rebuilds it.
    /// Bindings created with [`Container::instance`] have nothing to rebuild
    /// from and are removed.
    pub fn forget_instance<T: 'static>(&self) {
        let binding = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<T>())
            .cloned();
        let Some(binding) = binding else {
            return;
        };

        if binding.factory.is_some() {
            *binding.instance.lock().unwrap_or_else(PoisonError::into_inner) = None;
        } else {
            self.bindings
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&TypeId::of::<T>());
        }
        debug!("Forgot instance of {}", binding.type_name);
    }

    fn insert_binding<T: 'static>(&self, binding: Binding) {
        debug!("Binding {}", binding.type_name);
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<T>(), Arc::new(binding));
    }

    fn resolve_binding(&self, binding: &Binding) -> Result<Instance, ContainerError> {
        let mut slot = binding.instance.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = slot.as_ref() {
            return Ok(instance.clone());
        }

        let factory = binding.factory.as_ref().ok_or_else(|| ContainerError::Unbound {
            key: binding.type_name.to_string(),
        })?;

        debug!("Constructing shared instance of {}", binding.type_name);
        let instance = factory(self).map_err(|source| ContainerError::Resolution {
            key: binding.type_name.to_string(),
            source,
        })?;
        *slot = Some(instance.clone());
        Ok(instance)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bindings: Vec<&'static str> = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|b| b.type_name)
            .collect();
        f.debug_struct("Container")
            .field("bindings", &bindings)
            .finish_non_exhaustive()
    }
}

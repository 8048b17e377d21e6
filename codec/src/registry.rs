//! Codec registry keyed on (domain type, wire type).
//!
//! The registry is assembled through [`CodecRegistryBuilder`], which is
//! consumed by `build()`. The built [`CodecRegistry`] has no mutating methods,
//! so it can be shared behind `&` or `Arc` and read from any number of threads
//! without locking.
//!
//! Keys are exact: a codec registered for `JsonStructure` answers lookups for
//! `JsonStructure` only, never for `serde_json::Map` or any other type the
//! runtime value could be narrowed to.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use crate::codecs::{Codec, JsonStructureCodec, RawJsonCodec};
use crate::error::CodecError;
use crate::wire::{WireText, WireType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CodecKey {
    domain: TypeId,
    wire: WireType,
}

/// A registered codec, type-erased for storage.
struct CodecEntry {
    domain_name: &'static str,
    /// Always an `Arc<dyn Codec<Value = T>>` where `T` matches the key's `TypeId`.
    codec: Box<dyn Any + Send + Sync>,
}

/// Single-threaded construction phase of a [`CodecRegistry`].
#[derive(Default)]
pub struct CodecRegistryBuilder {
    entries: HashMap<CodecKey, CodecEntry>,
}

impl CodecRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for its domain type against `wire`.
    ///
    /// # Errors
    /// `DuplicateRegistration` if a codec already holds the same key.
    pub fn register<C>(&mut self, wire: WireType, codec: C) -> Result<&mut Self, CodecError>
    where
        C: Codec + 'static,
    {
        let domain_name = type_name::<C::Value>();
        let key = CodecKey {
            domain: TypeId::of::<C::Value>(),
            wire,
        };

        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(CodecError::DuplicateRegistration {
                domain: domain_name,
                wire,
            }),
            Entry::Vacant(slot) => {
                let codec: Arc<dyn Codec<Value = C::Value>> = Arc::new(codec);
                slot.insert(CodecEntry {
                    domain_name,
                    codec: Box::new(codec),
                });
                debug!(domain = domain_name, %wire, "registered codec");
                Ok(self)
            }
        }
    }

    /// Register the structure and raw-text codecs against both wire types.
    pub fn with_builtin_codecs(mut self) -> Result<Self, CodecError> {
        for wire in [WireType::Text, WireType::Json] {
            self.register(wire, JsonStructureCodec)?;
            self.register(wire, RawJsonCodec)?;
        }
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            entries: self.entries,
        }
    }
}

/// Read-only mapping from (domain type, wire type) to a codec.
pub struct CodecRegistry {
    entries: HashMap<CodecKey, CodecEntry>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::new()
    }

    /// Find the codec registered for exactly `T` against `wire`.
    ///
    /// # Errors
    /// `CodecNotFound` when nothing is registered for the key. There is no
    /// fallback: callers wanting raw text ask for [`WireText`].
    pub fn lookup<T: 'static>(&self, wire: WireType) -> Result<Arc<dyn Codec<Value = T>>, CodecError> {
        let key = CodecKey {
            domain: TypeId::of::<T>(),
            wire,
        };
        self.entries
            .get(&key)
            .and_then(|entry| entry.codec.downcast_ref::<Arc<dyn Codec<Value = T>>>())
            .cloned()
            .ok_or(CodecError::CodecNotFound {
                domain: type_name::<T>(),
                wire,
            })
    }

    pub fn contains<T: 'static>(&self, wire: WireType) -> bool {
        self.entries.contains_key(&CodecKey {
            domain: TypeId::of::<T>(),
            wire,
        })
    }

    /// Resolve the codec for `T` and encode `value`.
    pub fn encode<T: 'static>(&self, value: &T, wire: WireType) -> Result<WireText, CodecError> {
        self.lookup::<T>(wire)?.encode(value)
    }

    /// Resolve the codec for `T` and decode `text`.
    pub fn decode<T: 'static>(&self, text: &str, wire: WireType) -> Result<T, CodecError> {
        self.lookup::<T>(wire)?.decode(text)
    }

    /// Registered keys as (domain type name, wire type), sorted.
    pub fn entries(&self) -> Vec<(&'static str, WireType)> {
        let mut keys: Vec<_> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.domain_name, key.wire))
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("entries", &self.entries())
            .finish()
    }
}

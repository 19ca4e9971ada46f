//! The named-declaration namespace: abstract data types, constructors,
//! aliases, annotations and keyword fields, registered by name.
//!
//! A store is mutated at declaration time and read-only during lattice
//! operations; declarations racing an in-flight reification must be
//! serialized by the caller.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ecow::EcoString;
use hashbrown::HashMap;

use crate::errors::{Error, Result};
use crate::types::types::{Type, TypeKind};

#[derive(Default)]
struct StoreInner {
    adts: HashMap<EcoString, Type>,
    aliases: HashMap<EcoString, Type>,
    /// Constructors by constructor name (overloading is allowed across
    /// abstract data types and across arities).
    constructors: HashMap<EcoString, Vec<Type>>,
    /// Constructors by the name of the abstract data type they construct.
    adt_constructors: HashMap<EcoString, Vec<Type>>,
    /// Annotation types by (abstract data type name, label).
    annotations: HashMap<(EcoString, EcoString), Type>,
    /// Keyword field types by (abstract data type name, label).
    keyword_fields: HashMap<(EcoString, EcoString), Type>,
}

pub struct TypeStore {
    inner: RwLock<StoreInner>,
}

impl TypeStore {
    pub fn new() -> Self {
        TypeStore {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an abstract data type. Re-declaring the same name with the
    /// same parameter count is a no-op (the first declaration wins, which
    /// keeps the open, most general form in the store); a name collision
    /// with an alias or a different parameter count is an error.
    pub fn declare_abstract_data_type(&self, adt: &Type) -> Result<()> {
        let TypeKind::AbstractData { name, params } = adt.kind() else {
            return Err(Error::declaration(format!(
                "{adt} is not an abstract data type"
            )));
        };
        let mut inner = self.write();
        if inner.aliases.contains_key(name) {
            return Err(Error::declaration(format!(
                "`{name}` is already declared as an alias"
            )));
        }
        if let Some(existing) = inner.adts.get(name) {
            let existing_arity = match existing.kind() {
                TypeKind::AbstractData { params, .. } => params.len(),
                _ => 0,
            };
            if existing_arity != params.len() {
                return Err(Error::declaration(format!(
                    "`{name}` re-declared with {} type parameters, previously {}",
                    params.len(),
                    existing_arity
                )));
            }
            return Ok(());
        }
        tracing::debug!(%name, "declared abstract data type");
        inner.adts.insert(name.clone(), adt.clone());
        Ok(())
    }

    /// Register a constructor. Its abstract data type must have been
    /// declared first. Overloading a name is fine; re-declaring the exact
    /// same constructor is a no-op; declaring a different constructor for
    /// the same (adt, name, arity) is an error.
    pub fn declare_constructor(&self, cons: &Type) -> Result<()> {
        let TypeKind::Constructor { name, adt, fields } = cons.kind() else {
            return Err(Error::declaration(format!("{cons} is not a constructor")));
        };
        let adt_name = adt.name()?;
        let arity = fields.arity()?;
        let mut inner = self.write();
        if !inner.adts.contains_key(&adt_name) {
            return Err(Error::declaration(format!(
                "constructor `{name}` declared for undeclared abstract data type `{adt_name}`"
            )));
        }
        let overloads = inner.constructors.entry(name.clone()).or_default();
        for existing in overloads.iter() {
            if existing == cons {
                return Ok(());
            }
            let same_adt = existing
                .get_abstract_data_type()
                .and_then(|a| a.name())
                .map(|n| n == adt_name)
                .unwrap_or(false);
            if same_adt && existing.arity()? == arity {
                return Err(Error::declaration(format!(
                    "constructor `{adt_name}::{name}` with arity {arity} is already declared \
                     with different fields"
                )));
            }
        }
        overloads.push(cons.clone());
        inner
            .adt_constructors
            .entry(adt_name.clone())
            .or_default()
            .push(cons.clone());
        tracing::debug!(name = %name, adt = %adt_name, "declared constructor");
        Ok(())
    }

    /// Register an alias. Idempotent for the identical alias; a collision
    /// with an abstract data type or a different aliased type is an error.
    pub fn declare_alias(&self, alias: &Type) -> Result<()> {
        let TypeKind::Alias { name, aliased, .. } = alias.kind() else {
            return Err(Error::declaration(format!("{alias} is not an alias")));
        };
        let mut inner = self.write();
        if inner.adts.contains_key(name) {
            return Err(Error::declaration(format!(
                "`{name}` is already declared as an abstract data type"
            )));
        }
        if let Some(existing) = inner.aliases.get(name) {
            if existing == alias || existing.get_aliased()?.equivalent(aliased) {
                return Ok(());
            }
            return Err(Error::declaration(format!(
                "alias `{name}` re-declared for a different type"
            )));
        }
        tracing::debug!(%name, "declared alias");
        inner.aliases.insert(name.clone(), alias.clone());
        Ok(())
    }

    /// Declare an annotation `label` of type `ty` on an abstract data
    /// type.
    pub fn declare_annotation(&self, on: &Type, label: impl Into<EcoString>, ty: Type) -> Result<()> {
        let adt_name = annotation_host_name(on)?;
        let label = label.into();
        let mut inner = self.write();
        let key = (adt_name, label);
        if let Some(existing) = inner.annotations.get(&key) {
            if *existing == ty {
                return Ok(());
            }
            return Err(Error::declaration(format!(
                "annotation `{}` on `{}` re-declared with a different type",
                key.1, key.0
            )));
        }
        inner.annotations.insert(key, ty);
        Ok(())
    }

    /// Declare a keyword field `label` of type `ty` on an abstract data
    /// type.
    pub fn declare_keyword_field(
        &self,
        on: &Type,
        label: impl Into<EcoString>,
        ty: Type,
    ) -> Result<()> {
        let adt_name = annotation_host_name(on)?;
        let label = label.into();
        let mut inner = self.write();
        let key = (adt_name, label);
        if let Some(existing) = inner.keyword_fields.get(&key) {
            if *existing == ty {
                return Ok(());
            }
            return Err(Error::declaration(format!(
                "keyword field `{}` on `{}` re-declared with a different type",
                key.1, key.0
            )));
        }
        inner.keyword_fields.insert(key, ty);
        Ok(())
    }

    pub fn lookup_abstract_data_type(&self, name: &str) -> Option<Type> {
        self.read().adts.get(name).cloned()
    }

    pub fn lookup_alias(&self, name: &str) -> Option<Type> {
        self.read().aliases.get(name).cloned()
    }

    /// All constructors declared under `name`, across abstract data types.
    pub fn lookup_constructors(&self, name: &str) -> Vec<Type> {
        self.read()
            .constructors
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// The constructor `name` of the given abstract data type, if any.
    pub fn lookup_constructor(&self, adt: &Type, name: &str) -> Option<Type> {
        let adt_name = adt.name().ok()?;
        self.read().constructors.get(name)?.iter().find_map(|cons| {
            let owner = cons.get_abstract_data_type().ok()?.name().ok()?;
            (owner == adt_name).then(|| cons.clone())
        })
    }

    /// All constructors of the given abstract data type.
    pub fn constructors_of(&self, adt: &Type) -> Vec<Type> {
        adt.name()
            .ok()
            .and_then(|name| self.read().adt_constructors.get(&name).cloned())
            .unwrap_or_default()
    }

    /// Resolve a field label through the constructors of an abstract data
    /// type; the first constructor declaring the label wins.
    pub fn lookup_field_type(&self, adt: &Type, field: &str) -> Result<Type> {
        for cons in self.constructors_of(adt) {
            if cons.has_field(field) {
                return cons.field_type_by_name(field);
            }
        }
        Err(Error::declaration(format!(
            "no constructor of {adt} declares a field `{field}`"
        )))
    }

    pub fn has_field(&self, adt: &Type, field: &str) -> bool {
        self.lookup_field_type(adt, field).is_ok()
    }

    pub fn declares_annotation(&self, on: &Type, label: &str) -> bool {
        self.annotation_type(on, label).is_ok()
    }

    pub fn annotation_type(&self, on: &Type, label: &str) -> Result<Type> {
        let adt_name = annotation_host_name(on)?;
        self.read()
            .annotations
            .get(&(adt_name.clone(), EcoString::from(label)))
            .cloned()
            .ok_or_else(|| {
                Error::declaration(format!("no annotation `{label}` on `{adt_name}`"))
            })
    }

    pub fn has_keyword_field(&self, on: &Type, label: &str) -> bool {
        self.keyword_field_type(on, label).is_ok()
    }

    pub fn keyword_field_type(&self, on: &Type, label: &str) -> Result<Type> {
        let adt_name = annotation_host_name(on)?;
        self.read()
            .keyword_fields
            .get(&(adt_name.clone(), EcoString::from(label)))
            .cloned()
            .ok_or_else(|| {
                Error::declaration(format!("no keyword field `{label}` on `{adt_name}`"))
            })
    }
}

impl Default for TypeStore {
    fn default() -> Self {
        TypeStore::new()
    }
}

/// Annotations and keyword fields hang off an abstract data type; a
/// constructor resolves through its owner.
fn annotation_host_name(on: &Type) -> Result<EcoString> {
    match on.resolved().kind() {
        TypeKind::AbstractData { name, .. } => Ok(name.clone()),
        TypeKind::Constructor { adt, .. } => adt.name(),
        _ => Err(Error::declaration(format!(
            "{on} cannot declare annotations or keyword fields"
        ))),
    }
}

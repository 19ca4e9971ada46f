//! Bidirectional reification of types to and from a generic tree value.
//!
//! Every type serializes to a "symbol": a [`Value`] node whose tag names
//! the variant. Serializing also emits, as a side effect, one "production"
//! node per constructor reachable from the receiver, so the resulting
//! grammar set is self-contained and `from_symbol` can re-declare the
//! reachable abstract data types into a fresh store.

use ecow::EcoString;
use hashbrown::{HashMap, HashSet};
use once_cell::sync::Lazy;

use crate::errors::{Error, Result};
use crate::types::store::TypeStore;
use crate::types::types::{Fields, Labels, Type, TypeKind};
use crate::values::{Value, ValueFactory, ValueKind};

/// The distinguishing tree tags, one per type variant, plus the `label`
/// field wrapper and the `prod` grammar entry.
pub mod tag {
    pub const VOID: &str = "void";
    pub const VALUE: &str = "value";
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const REAL: &str = "real";
    pub const RAT: &str = "rat";
    pub const NUM: &str = "num";
    pub const STR: &str = "str";
    pub const LOC: &str = "loc";
    pub const DATETIME: &str = "datetime";
    pub const NODE: &str = "node";
    pub const TUPLE: &str = "tuple";
    pub const LIST: &str = "list";
    pub const SET: &str = "set";
    pub const MAP: &str = "map";
    pub const ADT: &str = "adt";
    pub const CONS: &str = "cons";
    pub const ALIAS: &str = "alias";
    pub const PARAMETER: &str = "parameter";
    pub const EXT: &str = "ext";
    pub const LABEL: &str = "label";
    pub const PROD: &str = "prod";
}

/// Everything `from_symbol` needs to rebuild a type: a value factory (and
/// through it the type factory), the store to declare into, and a lookup
/// producing the productions of an abstract data type's symbol.
pub struct ReifyEnv<'a> {
    pub vf: &'a ValueFactory,
    pub store: &'a TypeStore,
    pub grammar: &'a (dyn Fn(&Value) -> im::HashSet<Value> + 'a),
}

impl Type {
    /// Serialize the receiver to its symbol, emitting into `grammar` one
    /// production per constructor reachable from it. `done` guards the
    /// recursion over self-referential and mutually-recursive abstract
    /// data types; it is keyed by the declaration's own symbol.
    pub fn as_symbol(
        &self,
        vf: &ValueFactory,
        store: &TypeStore,
        grammar: &mut im::HashSet<Value>,
        done: &mut HashSet<Value>,
    ) -> Value {
        match self.kind() {
            TypeKind::Void => vf.node(tag::VOID, []),
            TypeKind::Value => vf.node(tag::VALUE, []),
            TypeKind::Bool => vf.node(tag::BOOL, []),
            TypeKind::Integer => vf.node(tag::INT, []),
            TypeKind::Real => vf.node(tag::REAL, []),
            TypeKind::Rational => vf.node(tag::RAT, []),
            TypeKind::Number => vf.node(tag::NUM, []),
            TypeKind::Str => vf.node(tag::STR, []),
            TypeKind::SourceLocation => vf.node(tag::LOC, []),
            TypeKind::DateTime => vf.node(tag::DATETIME, []),
            TypeKind::Node => vf.node(tag::NODE, []),
            TypeKind::Tuple { .. } => {
                let children = field_symbols(self, vf, store, grammar, done);
                vf.node(tag::TUPLE, children)
            }
            TypeKind::List { elem } => {
                let elem = elem.as_symbol(vf, store, grammar, done);
                vf.node(tag::LIST, [elem])
            }
            TypeKind::Set { elem } => {
                let elem = elem.as_symbol(vf, store, grammar, done);
                vf.node(tag::SET, [elem])
            }
            TypeKind::Map { key, value } => {
                let key = key.as_symbol(vf, store, grammar, done);
                let value = value.as_symbol(vf, store, grammar, done);
                vf.node(tag::MAP, [key, value])
            }
            TypeKind::AbstractData { name, params } => {
                let mut children = vec![vf.string(name.clone())];
                for param in params {
                    children.push(param.as_symbol(vf, store, grammar, done));
                }
                let symbol = vf.node(tag::ADT, children);
                if done.insert(symbol.clone()) {
                    for cons in store.constructors_of(self) {
                        let production = production_symbol(&cons, &symbol, vf, store, grammar, done);
                        grammar.insert(production);
                    }
                }
                symbol
            }
            TypeKind::Constructor { name, adt, .. } => {
                let adt_symbol = adt.as_symbol(vf, store, grammar, done);
                let mut children = vec![adt_symbol, vf.string(name.clone())];
                children.extend(field_symbols(self, vf, store, grammar, done));
                vf.node(tag::CONS, children)
            }
            TypeKind::Alias {
                name,
                params,
                aliased,
            } => {
                let mut children = vec![
                    vf.string(name.clone()),
                    aliased.as_symbol(vf, store, grammar, done),
                ];
                for param in params {
                    children.push(param.as_symbol(vf, store, grammar, done));
                }
                vf.node(tag::ALIAS, children)
            }
            TypeKind::Parameter { name, bound } => {
                let bound = bound.as_symbol(vf, store, grammar, done);
                vf.node(tag::PARAMETER, [vf.string(name.clone()), bound])
            }
            TypeKind::External(ext) => vf.node(tag::EXT, [vf.string(ext.0.name())]),
        }
    }
}

/// The field symbols of a tuple or constructor, each wrapped in a `label`
/// node when the fields are labelled.
fn field_symbols(
    ty: &Type,
    vf: &ValueFactory,
    store: &TypeStore,
    grammar: &mut im::HashSet<Value>,
    done: &mut HashSet<Value>,
) -> Vec<Value> {
    let fields = ty.field_types().unwrap_or_default();
    let mut symbols = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let symbol = field.as_symbol(vf, store, grammar, done);
        let symbol = match ty.field_name(i) {
            Ok(label) => vf.node(tag::LABEL, [vf.string(label), symbol]),
            Err(_) => symbol,
        };
        symbols.push(symbol);
    }
    symbols
}

fn production_symbol(
    cons: &Type,
    adt_symbol: &Value,
    vf: &ValueFactory,
    store: &TypeStore,
    grammar: &mut im::HashSet<Value>,
    done: &mut HashSet<Value>,
) -> Value {
    let name = cons.name().unwrap_or_default();
    let mut children = vec![adt_symbol.clone(), vf.string(name)];
    children.extend(field_symbols(cons, vf, store, grammar, done));
    vf.node(tag::PROD, children)
}

/// Filter a grammar set down to the productions of one abstract data
/// type's symbol; the shape callers usually wrap into a `ReifyEnv` lookup.
pub fn productions_for(grammar: &im::HashSet<Value>, adt_symbol: &Value) -> im::HashSet<Value> {
    grammar
        .iter()
        .filter(|prod| match prod.kind() {
            ValueKind::Node { children, .. } => children.front() == Some(adt_symbol),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Rebuild a type from a symbol produced by [`Type::as_symbol`],
/// re-declaring every reachable abstract data type, constructor and alias
/// into `env.store` as a side effect.
pub fn from_symbol(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let (name, _) = symbol
        .as_node()
        .map_err(|_| Error::reification(format!("{symbol} is not a reified type symbol")))?;
    let routine = registry()
        .get(name.as_str())
        .ok_or_else(|| Error::reification(format!("`{name}` is not a reified type symbol")))?;
    routine(symbol, env)
}

/// Rebuild a tuple type from a sequence of symbols. A labelled tuple is
/// produced iff *every* element carries a `label` wrapper; a partially
/// labelled sequence reconstructs unlabelled.
pub fn from_symbols(symbols: &[Value], env: &ReifyEnv<'_>) -> Result<Type> {
    let (fields, labels) = fields_from_symbols(symbols, env)?;
    Ok(env
        .vf
        .types()
        .tuple_with_labels(fields, labels))
}

type FromSymbolFn = fn(&Value, &ReifyEnv<'_>) -> Result<Type>;

fn registry() -> &'static HashMap<&'static str, FromSymbolFn> {
    // One registration per variant, installed before first use and
    // read-only afterwards.
    static REGISTRY: Lazy<HashMap<&'static str, FromSymbolFn>> = Lazy::new(|| {
        let mut routines: HashMap<&'static str, FromSymbolFn> = HashMap::new();
        routines.insert(tag::VOID, reconstruct_void);
        routines.insert(tag::VALUE, reconstruct_value);
        routines.insert(tag::BOOL, reconstruct_bool);
        routines.insert(tag::INT, reconstruct_int);
        routines.insert(tag::REAL, reconstruct_real);
        routines.insert(tag::RAT, reconstruct_rat);
        routines.insert(tag::NUM, reconstruct_num);
        routines.insert(tag::STR, reconstruct_str);
        routines.insert(tag::LOC, reconstruct_loc);
        routines.insert(tag::DATETIME, reconstruct_datetime);
        routines.insert(tag::NODE, reconstruct_node);
        routines.insert(tag::TUPLE, reconstruct_tuple);
        routines.insert(tag::LIST, reconstruct_list);
        routines.insert(tag::SET, reconstruct_set);
        routines.insert(tag::MAP, reconstruct_map);
        routines.insert(tag::ADT, reconstruct_adt);
        routines.insert(tag::CONS, reconstruct_cons);
        routines.insert(tag::ALIAS, reconstruct_alias);
        routines.insert(tag::PARAMETER, reconstruct_parameter);
        routines.insert(tag::EXT, reconstruct_ext);
        routines
    });
    &REGISTRY
}

fn children_of<'v>(symbol: &'v Value) -> Result<&'v im::Vector<Value>> {
    symbol
        .as_node()
        .map(|(_, children)| children)
        .map_err(|_| Error::reification(format!("{symbol} is not a reified type symbol")))
}

fn child<'v>(symbol: &'v Value, i: usize) -> Result<&'v Value> {
    children_of(symbol)?.get(i).ok_or_else(|| {
        Error::reification(format!("malformed type symbol, missing child {i}: {symbol}"))
    })
}

fn child_str(symbol: &Value, i: usize) -> Result<EcoString> {
    child(symbol, i)?
        .as_str()
        .map(EcoString::from)
        .map_err(|_| Error::reification(format!("malformed type symbol, child {i} is not a string: {symbol}")))
}

fn rest(symbol: &Value, from: usize) -> Result<Vec<Value>> {
    Ok(children_of(symbol)?.iter().skip(from).cloned().collect())
}

fn fields_from_symbols(
    symbols: &[Value],
    env: &ReifyEnv<'_>,
) -> Result<(Fields, Option<Labels>)> {
    let mut fields: Fields = Fields::new();
    let mut labels: Labels = Labels::new();
    let mut all_labelled = !symbols.is_empty();
    for symbol in symbols {
        let mut inner = symbol;
        if let ValueKind::Node { name, .. } = symbol.kind() {
            if name == tag::LABEL {
                labels.push(child_str(symbol, 0)?);
                inner = child(symbol, 1)?;
                fields.push(from_symbol(inner, env)?);
                continue;
            }
        }
        all_labelled = false;
        fields.push(from_symbol(inner, env)?);
    }
    Ok((fields, all_labelled.then_some(labels)))
}

fn reconstruct_void(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().void_type())
}

fn reconstruct_value(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().value_type())
}

fn reconstruct_bool(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().bool_type())
}

fn reconstruct_int(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().integer())
}

fn reconstruct_real(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().real())
}

fn reconstruct_rat(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().rational())
}

fn reconstruct_num(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().number())
}

fn reconstruct_str(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().string())
}

fn reconstruct_loc(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().source_location())
}

fn reconstruct_datetime(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().date_time())
}

fn reconstruct_node(_: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    Ok(env.vf.types().node())
}

fn reconstruct_tuple(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let symbols = rest(symbol, 0)?;
    from_symbols(&symbols, env)
}

fn reconstruct_list(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let elem = from_symbol(child(symbol, 0)?, env)?;
    Ok(env.vf.types().list(elem))
}

fn reconstruct_set(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let elem = from_symbol(child(symbol, 0)?, env)?;
    Ok(env.vf.types().set(elem))
}

fn reconstruct_map(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let key = from_symbol(child(symbol, 0)?, env)?;
    let value = from_symbol(child(symbol, 1)?, env)?;
    Ok(env.vf.types().map(key, value))
}

fn reconstruct_adt(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let tf = env.vf.types();
    let name = child_str(symbol, 0)?;
    let mut params = Vec::new();
    for param in rest(symbol, 1)? {
        params.push(from_symbol(&param, env)?);
    }
    let adt = tf.abstract_data(name.clone(), params);

    // If the store already knows this data type we are either revisiting
    // it through recursion or re-reifying into a warm store; either way
    // its productions have been processed.
    let already_declared = env.store.lookup_abstract_data_type(&name).is_some();
    env.store.declare_abstract_data_type(&adt)?;
    if !already_declared {
        for production in (env.grammar)(symbol) {
            reconstruct_production(&production, env)?;
        }
    }
    Ok(adt)
}

fn reconstruct_production(production: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let (name, _) = production
        .as_node()
        .map_err(|_| Error::reification(format!("{production} is not a production")))?;
    if name != tag::PROD {
        return Err(Error::reification(format!(
            "`{name}` is not a production tag"
        )));
    }
    let adt = from_symbol(child(production, 0)?, env)?;
    let cons_name = child_str(production, 1)?;
    let symbols = rest(production, 2)?;
    let fields = from_symbols(&symbols, env)?;
    let cons = env
        .vf
        .types()
        .constructor_from_tuple(adt, cons_name, fields);
    env.store.declare_constructor(&cons)?;
    Ok(cons)
}

fn reconstruct_cons(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let adt = from_symbol(child(symbol, 0)?, env)?;
    let name = child_str(symbol, 1)?;
    let symbols = rest(symbol, 2)?;
    let fields = from_symbols(&symbols, env)?;
    let cons = env
        .vf
        .types()
        .constructor_from_tuple(adt, name, fields);
    env.store.declare_constructor(&cons)?;
    Ok(cons)
}

fn reconstruct_alias(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let name = child_str(symbol, 0)?;
    let aliased = from_symbol(child(symbol, 1)?, env)?;
    let mut params = Vec::new();
    for param in rest(symbol, 2)? {
        params.push(from_symbol(&param, env)?);
    }
    let alias = env.vf.types().alias(name, aliased, params);
    env.store.declare_alias(&alias)?;
    Ok(alias)
}

fn reconstruct_parameter(symbol: &Value, env: &ReifyEnv<'_>) -> Result<Type> {
    let name = child_str(symbol, 0)?;
    let bound = from_symbol(child(symbol, 1)?, env)?;
    Ok(env.vf.types().parameter(name, bound))
}

fn reconstruct_ext(symbol: &Value, _: &ReifyEnv<'_>) -> Result<Type> {
    // The behavior behind an external type lives in the host; a symbol
    // alone cannot bring it back.
    Err(Error::reification(format!(
        "external type symbol {symbol} cannot be reconstructed"
    )))
}

//! # Assembler Engine
//!
//! An assembler turns loosely-typed input into a target type through adapter
//! methods it declares once:
//!
//! ```rust,ignore
//! impl Assembler for UserDtoAssembler {
//!     fn declare(methods: &mut MethodTable<Self>) {
//!         methods
//!             .to(Self::to_user_dto)          // registered as `toUserDto`
//!             .to(Self::to_full_name_dto);    // registered as `toFullNameDto`
//!     }
//! }
//!
//! let user: UserDto = UserDtoAssembler::assemble(json!({"display_name": "jdoe"}), None)?;
//! ```
//!
//! ## Flow
//!
//! 1. Resolve the method for `(Self, target)` through the cached resolver.
//! 2. Normalize the input into a [`Record`] (maps and objects only).
//! 3. Call the method. Static methods run directly; bound methods need the
//!    assembler instance, otherwise [`DtoError::UnboundMethodCall`].
//!
//! Errors returned by adapter methods propagate unchanged.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, instrument};

use super::convert::{Collection, FromValue};
use super::error::DtoError;
use super::object::{Model, TypeKey};
use super::resolver::{method_table, resolve_cached};
use super::value::{Attributes, Value};

// =============================================================================
// 1. RECORDS
// =============================================================================

/// Uniform input shape handed to adapter methods.
#[derive(Debug, Clone)]
pub enum Record {
    Map(Attributes),
    Object(Arc<dyn Model>),
}

impl Record {
    /// Maps become map records, objects pass through. Anything else is rejected.
    pub fn normalize(input: Value) -> Result<Self, DtoError> {
        match input {
            Value::Map(attributes) => Ok(Self::Map(attributes)),
            Value::Model(model) => Ok(Self::Object(model)),
            other => Err(DtoError::InvalidInput(format!(
                "cannot assemble from {}, expected a map or an object",
                other.kind()
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Map(attributes) => attributes.get(key).cloned(),
            Self::Object(model) => model.read_attribute(key),
        }
    }

    /// The value under `key`, or `Null` when absent.
    pub fn value(&self, key: &str) -> Value {
        self.get(key).unwrap_or_default()
    }

    /// The value under `key`, or `default` when absent or null.
    pub fn value_or(&self, key: &str, default: impl Into<Value>) -> Value {
        match self.get(key) {
            Some(value) if !value.is_null() => value,
            _ => default.into(),
        }
    }

    /// The value under `key` as a string. Absent and null read as `""`.
    pub fn string(&self, key: &str) -> Result<String, DtoError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(String::new()),
            Some(value) => String::from_value(value),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The wrapped object, for object records.
    pub fn object(&self) -> Option<&dyn Model> {
        match self {
            Self::Object(model) => Some(model.as_ref()),
            Self::Map(_) => None,
        }
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Self::Map(attributes)
    }
}

// =============================================================================
// 2. METHOD TABLES
// =============================================================================

/// Naming convention prefix of an adapter method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    To,
    From,
}

impl Direction {
    pub fn method_name(self, target: &str) -> String {
        match self {
            Self::To => format!("to{target}"),
            Self::From => format!("from{target}"),
        }
    }
}

type StaticMethod = Box<dyn Fn(&Record) -> Result<Box<dyn Model>, DtoError> + Send + Sync>;
type BoundMethod<A> = Box<dyn Fn(&A, &Record) -> Result<Box<dyn Model>, DtoError> + Send + Sync>;

/// A declared adapter method.
pub enum AdapterMethod<A> {
    /// Callable without an assembler instance.
    Static(StaticMethod),
    /// Needs the assembler instance it was declared on.
    Bound(BoundMethod<A>),
}

impl<A> AdapterMethod<A> {
    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

/// Adapter methods declared by assembler `A`, by convention name.
pub struct MethodTable<A> {
    methods: IndexMap<String, AdapterMethod<A>>,
    index: HashMap<(Direction, TypeId), String>,
}

impl<A: Assembler> MethodTable<A> {
    pub(crate) fn declared() -> Self {
        let mut table = Self {
            methods: IndexMap::new(),
            index: HashMap::new(),
        };
        A::declare(&mut table);
        table
    }

    fn register<T: Model>(&mut self, direction: Direction, method: AdapterMethod<A>) -> &mut Self {
        let target = TypeKey::of::<T>();
        let name = direction.method_name(target.name());
        self.index.insert((direction, target.id()), name.clone());
        self.methods.insert(name, method);
        self
    }

    /// Declares a static `to<T>` method.
    pub fn to<T: Model>(&mut self, method: fn(&Record) -> Result<T, DtoError>) -> &mut Self {
        self.register::<T>(Direction::To, erase_static(method))
    }

    /// Declares a static `from<T>` method.
    pub fn from<T: Model>(&mut self, method: fn(&Record) -> Result<T, DtoError>) -> &mut Self {
        self.register::<T>(Direction::From, erase_static(method))
    }

    /// Declares a `to<T>` method bound to the assembler instance.
    pub fn to_bound<T: Model>(&mut self, method: fn(&A, &Record) -> Result<T, DtoError>) -> &mut Self {
        self.register::<T>(Direction::To, erase_bound(method))
    }

    /// Declares a `from<T>` method bound to the assembler instance.
    pub fn from_bound<T: Model>(&mut self, method: fn(&A, &Record) -> Result<T, DtoError>) -> &mut Self {
        self.register::<T>(Direction::From, erase_bound(method))
    }

    /// Convention name registered for `(direction, target)`.
    pub fn lookup(&self, direction: Direction, target: TypeId) -> Option<&str> {
        self.index.get(&(direction, target)).map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&AdapterMethod<A>> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Declared method names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}

fn erase_static<A, T: Model>(method: fn(&Record) -> Result<T, DtoError>) -> AdapterMethod<A> {
    AdapterMethod::Static(Box::new(move |record| {
        method(record).map(|model| Box::new(model) as Box<dyn Model>)
    }))
}

fn erase_bound<A: 'static, T: Model>(method: fn(&A, &Record) -> Result<T, DtoError>) -> AdapterMethod<A> {
    AdapterMethod::Bound(Box::new(move |assembler, record| {
        method(assembler, record).map(|model| Box::new(model) as Box<dyn Model>)
    }))
}

fn downcast_model<T: Model>(model: Box<dyn Model>) -> Result<T, DtoError> {
    let produced = model.model_name();
    model.into_any_box().downcast::<T>().map(|model| *model).map_err(|_| {
        DtoError::InvalidInput(format!(
            "adapter produced {produced}, expected {}",
            TypeKey::of::<T>().name()
        ))
    })
}

// =============================================================================
// 3. THE ASSEMBLER TRAIT
// =============================================================================

/// A type that transforms untyped input into target types.
///
/// Implementors only provide [`Assembler::declare`]; every entry point is a
/// provided method.
pub trait Assembler: Sized + Send + Sync + 'static {
    /// Registers the adapter methods of this assembler.
    fn declare(methods: &mut MethodTable<Self>);

    /// Type-erased assembly, the form nested-assembler bindings use.
    #[instrument(level = "debug", skip_all, fields(assembler = TypeKey::of::<Self>().name(), target = %target))]
    fn assemble_model(input: Value, target: TypeKey, bound: Option<&Self>) -> Result<Box<dyn Model>, DtoError> {
        let method = resolve_cached::<Self>(target)?;
        let record = Record::normalize(input)?;
        let table = method_table::<Self>();
        let adapter = table.get(&method).ok_or_else(|| {
            DtoError::Custom(format!(
                "method {method} is not declared on [{}]",
                TypeKey::of::<Self>().name()
            ))
        })?;

        match (adapter, bound) {
            (AdapterMethod::Static(call), _) => {
                debug!(%method, "Calling static adapter");
                call(&record)
            }
            (AdapterMethod::Bound(call), Some(assembler)) => {
                debug!(%method, "Calling bound adapter");
                call(assembler, &record)
            }
            (AdapterMethod::Bound(_), None) => Err(DtoError::UnboundMethodCall {
                method: method.to_string(),
                assembler: TypeKey::of::<Self>().name().to_string(),
            }),
        }
    }

    /// Assembles `input` into a `T`.
    fn assemble<T: Model>(input: impl Into<Value>, bound: Option<&Self>) -> Result<T, DtoError> {
        let model = Self::assemble_model(input.into(), TypeKey::of::<T>(), bound)?;
        downcast_model(model)
    }

    /// Assembles `input` into an object value of the given target type.
    fn assemble_value(input: Value, target: TypeKey, bound: Option<&Self>) -> Result<Value, DtoError> {
        Self::assemble_model(input, target, bound).map(|model| Value::Model(Arc::from(model)))
    }

    /// Assembles every input in order.
    fn assemble_many<T, I>(inputs: I, bound: Option<&Self>) -> Result<Collection<T>, DtoError>
    where
        T: Model,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        inputs
            .into_iter()
            .map(|input| Self::assemble::<T>(input, bound))
            .collect()
    }

    /// [`Assembler::assemble_many`] over an ordered sequence.
    fn from_array<T: Model>(items: Vec<Value>, bound: Option<&Self>) -> Result<Collection<T>, DtoError> {
        Self::assemble_many(items, bound)
    }

    /// [`Assembler::assemble_many`] over a collection.
    fn from_collection<T: Model>(items: Collection<Value>, bound: Option<&Self>) -> Result<Collection<T>, DtoError> {
        Self::assemble_many(items, bound)
    }

    /// Assembles from an attribute map.
    fn assemble_from_record_map<T: Model>(map: Attributes, bound: Option<&Self>) -> Result<T, DtoError> {
        Self::assemble(Value::Map(map), bound)
    }

    /// Assembles with `self` as the bound instance.
    fn assemble_instance<T: Model>(&self, input: impl Into<Value>) -> Result<T, DtoError> {
        Self::assemble(input, Some(self))
    }
}

use std::fmt::Formatter;
use std::ops::Deref;

use async_graphql_parser::types as ast;
use async_graphql_value::Name;

/// Type to represent GraphQL type usage with modifiers
/// [spec](https://spec.graphql.org/October2021/#sec-Wrapping-Types)
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named {
        /// Name of the type
        name: String,
        /// Flag to indicate the type is required.
        non_null: bool,
    },
    List {
        /// Type is a list
        of_type: Box<Type>,
        /// Flag to indicate the type is required.
        non_null: bool,
    },
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named { name, non_null } => {
                if *non_null {
                    write!(f, "{}!", name)
                } else {
                    write!(f, "{}", name)
                }
            }
            Type::List { of_type, non_null } => {
                if *non_null {
                    write!(f, "[{:?}]!", of_type)
                } else {
                    write!(f, "[{:?}]", of_type)
                }
            }
        }
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::Named { name: "JSON".to_string(), non_null: false }
    }
}

impl Type {
    /// nullable named type
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named { name: name.into(), non_null: false }
    }

    /// gets the name of the type
    pub fn name(&self) -> &str {
        match self {
            Type::Named { name, .. } => name,
            Type::List { of_type, .. } => of_type.name(),
        }
    }

    /// checks if the type is nullable
    pub fn is_nullable(&self) -> bool {
        !match self {
            Type::Named { non_null, .. } => *non_null,
            Type::List { non_null, .. } => *non_null,
        }
    }

    /// checks if the type is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Type::List { .. })
    }

    /// element type of a list, or the type itself for named types
    pub fn of_type(&self) -> &Type {
        match self {
            Type::List { of_type, .. } => of_type,
            Type::Named { .. } => self,
        }
    }

    /// convert this type into NonNull type
    pub fn into_required(self) -> Self {
        match self {
            Type::Named { name, .. } => Self::Named { name, non_null: true },
            Type::List { of_type, .. } => Self::List { of_type, non_null: true },
        }
    }

    /// convert this into nullable type
    pub fn into_nullable(self) -> Self {
        match self {
            Type::Named { name, .. } => Self::Named { name, non_null: false },
            Type::List { of_type, .. } => Self::List { of_type, non_null: false },
        }
    }

    /// create a nullable list type from this type
    pub fn into_list(self) -> Self {
        Type::List { of_type: Box::new(self), non_null: false }
    }
}

impl From<&ast::Type> for Type {
    fn from(value: &ast::Type) -> Self {
        let non_null = !value.nullable;

        match &value.base {
            ast::BaseType::Named(name) => Self::Named { name: name.to_string(), non_null },
            ast::BaseType::List(type_) => {
                Self::List { of_type: Box::new(type_.as_ref().into()), non_null }
            }
        }
    }
}

impl From<&Type> for ast::Type {
    fn from(value: &Type) -> Self {
        let nullable = value.is_nullable();

        let base = match value {
            Type::Named { name, .. } => ast::BaseType::Named(Name::new(name)),
            Type::List { of_type, .. } => {
                ast::BaseType::List(Box::new(ast::Type::from(of_type.deref())))
            }
        };

        ast::Type { base, nullable }
    }
}

impl From<&str> for Type {
    fn from(value: &str) -> Self {
        Self::named(value)
    }
}

use async_graphql_parser::types::{
    FieldDefinition as SdlField, InputValueDefinition, SchemaDefinition, ServiceDocument,
    TypeKind, TypeSystemDefinition,
};
use async_graphql_parser::Positioned;

use super::{Definition, FieldDefinition, Index, InputFieldDefinition};
use crate::core::{Error, Result, Type};

const DEFAULT_QUERY: &str = "Query";
const DEFAULT_MUTATION: &str = "Mutation";

impl Index {
    /// Builds an index from schema definition language. Interfaces are
    /// indexed like objects; unions and input objects carry no selectable
    /// fields of their own and are skipped.
    pub fn from_sdl(sdl: &str) -> Result<Self> {
        let doc = async_graphql_parser::parse_schema(sdl)?;
        Self::from_document(&doc)
    }

    fn from_document(doc: &ServiceDocument) -> Result<Self> {
        let mut index = Index::new(DEFAULT_QUERY);

        for def in doc.definitions.iter() {
            let TypeSystemDefinition::Type(type_def) = def else {
                continue;
            };
            let type_def = &type_def.node;
            let name = type_def.name.node.to_string();
            let definition = match &type_def.kind {
                TypeKind::Object(object) => to_object(&object.fields),
                TypeKind::Interface(interface) => to_object(&interface.fields),
                TypeKind::Scalar => Definition::Scalar,
                TypeKind::Enum(en) => Definition::Enum {
                    values: en
                        .values
                        .iter()
                        .map(|v| v.node.value.node.to_string())
                        .collect(),
                },
                TypeKind::Union(_) | TypeKind::InputObject(_) => continue,
            };
            index.insert(name, definition);
        }

        let schema = doc.definitions.iter().find_map(|def| match def {
            TypeSystemDefinition::Schema(schema) => Some(&schema.node),
            _ => None,
        });

        let (query, mutation) = roots(schema, &index);
        if !index.contains(&query) {
            return Err(Error::Build(format!("Query type `{}` is not defined", query)));
        }
        index.set_query(query);
        index.set_mutation(mutation);
        Ok(index)
    }
}

fn roots(schema: Option<&SchemaDefinition>, index: &Index) -> (String, Option<String>) {
    match schema {
        Some(schema) => (
            schema
                .query
                .as_ref()
                .map(|q| q.node.to_string())
                .unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            schema.mutation.as_ref().map(|m| m.node.to_string()),
        ),
        None => (
            DEFAULT_QUERY.to_string(),
            index
                .contains(DEFAULT_MUTATION)
                .then(|| DEFAULT_MUTATION.to_string()),
        ),
    }
}

fn to_object(fields: &[Positioned<SdlField>]) -> Definition {
    let fields = fields
        .iter()
        .map(|field| {
            let field = &field.node;
            let name = field.name.node.to_string();
            let args = field
                .arguments
                .iter()
                .map(|arg| {
                    let arg = to_input_field(&arg.node);
                    (arg.name.clone(), arg)
                })
                .collect();
            let of_type = Type::from(&field.ty.node);
            (name.clone(), FieldDefinition { name, of_type, args })
        })
        .collect();
    Definition::Object { fields }
}

fn to_input_field(arg: &InputValueDefinition) -> InputFieldDefinition {
    InputFieldDefinition {
        name: arg.name.node.to_string(),
        of_type: Type::from(&arg.ty.node),
        default_value: arg.default_value.as_ref().map(|v| v.node.clone()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SDL: &str = r#"
        schema { query: Root }

        type Root {
            album(id: ID!, limit: Int = 5): Album
        }

        type Album {
            title: String!
            tracks: [Track!]
            format: Format
        }

        type Track {
            name: String
        }

        enum Format { VINYL CD }
    "#;

    #[test]
    fn test_from_sdl() {
        let index = Index::from_sdl(SDL).unwrap();
        assert_eq!(index.get_query(), "Root");
        assert_eq!(index.get_mutation(), None);

        let album = index.get_field("Root", "album").unwrap();
        assert_eq!(album.of_type, Type::named("Album"));
        assert_eq!(
            album.get_arg("id").map(|a| a.of_type.clone()),
            Some(Type::named("ID").into_required())
        );
        assert_eq!(
            album.get_arg("limit").and_then(|a| a.default_value.clone()),
            Some(async_graphql_value::ConstValue::from(5))
        );

        let tracks = index.get_field("Album", "tracks").unwrap();
        assert_eq!(tracks.of_type.to_string(), "[Track!]");
        assert!(index.type_is_enum("Format"));
    }

    #[test]
    fn test_default_roots() {
        let index = Index::from_sdl(
            "type Query { a: Int } type Mutation { b: Int }",
        )
        .unwrap();
        assert_eq!(index.get_query(), "Query");
        assert_eq!(index.get_mutation(), Some("Mutation"));
    }

    #[test]
    fn test_missing_query() {
        let result = Index::from_sdl("type Album { title: String }");
        assert!(matches!(result, Err(Error::Build(_))));
    }
}

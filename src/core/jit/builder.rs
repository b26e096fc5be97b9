use std::cell::Cell;
use std::collections::HashMap;

use async_graphql_parser::types::{
    Directive, DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition,
    OperationType, Selection, SelectionSet,
};
use async_graphql_parser::Positioned;
use async_graphql_value::{ConstValue, Value};
use indexmap::IndexMap;

use super::model::*;
use crate::core::blueprint::{Definition, Index};
use crate::core::{Error, Result, Type};

const TYPENAME: &str = "__typename";

/// Turns a parsed document into an [`OperationPlan`] for one operation.
pub struct Builder<'a> {
    index: &'a Index,
    document: ExecutableDocument,
    field_id: Cell<usize>,
}

type Fragments<'a> = HashMap<&'a str, &'a FragmentDefinition>;

impl<'a> Builder<'a> {
    pub fn new(index: &'a Index, document: ExecutableDocument) -> Self {
        Self { index, document, field_id: Cell::new(0) }
    }

    fn next_id(&self) -> FieldId {
        let id = self.field_id.get();
        self.field_id.set(id + 1);
        FieldId::new(id)
    }

    /// Returns `None` when a constant directive removes the selection.
    #[inline(always)]
    fn conditions(directives: &[Positioned<Directive>]) -> Option<Vec<Condition>> {
        let mut conditions = vec![];
        for directive in directives.iter().map(|d| &d.node) {
            let is_include = match directive.name.node.as_str() {
                "include" => true,
                "skip" => false,
                _ => continue,
            };
            match directive.get_argument("if").map(|arg| &arg.node) {
                Some(Value::Boolean(flag)) if *flag != is_include => return None,
                Some(Value::Variable(name)) => {
                    let variable = Variable::new(name.as_str());
                    conditions.push(if is_include {
                        Condition::Include(variable)
                    } else {
                        Condition::Skip(variable)
                    });
                }
                _ => {}
            }
        }
        Some(conditions)
    }

    fn iter<'b>(
        &self,
        selection: &'b SelectionSet,
        type_name: &str,
        inherited: &[Condition],
        fragments: &Fragments<'b>,
        visiting: &mut Vec<&'b str>,
    ) -> Result<Vec<Field>> {
        let mut fields: Vec<Field> = vec![];
        for selection in &selection.items {
            match &selection.node {
                Selection::Field(Positioned { node: gql_field, pos }) => {
                    let Some(mut conditions) = Self::conditions(&gql_field.directives) else {
                        continue;
                    };
                    conditions.extend(inherited.iter().cloned());

                    let name = gql_field.name.node.to_string();
                    let output_name = gql_field
                        .alias
                        .as_ref()
                        .map(|alias| alias.node.to_string())
                        .unwrap_or_else(|| name.clone());

                    let field = if name == TYPENAME {
                        Field {
                            id: self.next_id(),
                            name,
                            output_name,
                            parent_type: type_name.to_string(),
                            type_of: Type::named("String").into_required(),
                            is_scalar: true,
                            args: vec![],
                            conditions,
                            pos: (*pos).into(),
                            selection: vec![],
                        }
                    } else {
                        let field_def = self.index.get_field(type_name, &name).ok_or_else(|| {
                            Error::Build(format!(
                                "Cannot query field `{}` on type `{}`",
                                name, type_name
                            ))
                        })?;

                        let provided: HashMap<&str, &Value> = gql_field
                            .arguments
                            .iter()
                            .map(|(k, v)| (k.node.as_str(), &v.node))
                            .collect();
                        if let Some(unknown) =
                            provided.keys().find(|k| field_def.get_arg(k).is_none())
                        {
                            return Err(Error::Build(format!(
                                "Unknown argument `{}` on field `{}.{}`",
                                unknown, type_name, name
                            )));
                        }
                        let args = field_def
                            .args
                            .values()
                            .map(|arg| Arg {
                                name: arg.name.clone(),
                                type_of: arg.of_type.clone(),
                                value: provided.get(arg.name.as_str()).map(|v| (*v).clone()),
                                default_value: arg.default_value.clone(),
                            })
                            .collect();

                        let type_of = field_def.of_type.clone();
                        let id = self.next_id();
                        let selection = self.iter(
                            &gql_field.selection_set.node,
                            type_of.name(),
                            &[],
                            fragments,
                            visiting,
                        )?;
                        Field {
                            id,
                            name,
                            output_name,
                            parent_type: type_name.to_string(),
                            is_scalar: self.index.type_is_leaf(type_of.name()),
                            type_of,
                            args,
                            conditions,
                            pos: (*pos).into(),
                            selection,
                        }
                    };
                    merge(&mut fields, field);
                }
                Selection::FragmentSpread(Positioned { node: spread, .. }) => {
                    let Some(mut conditions) = Self::conditions(&spread.directives) else {
                        continue;
                    };
                    conditions.extend(inherited.iter().cloned());

                    let name = spread.fragment_name.node.as_str();
                    let fragment = fragments.get(name).ok_or_else(|| {
                        Error::Build(format!("Unknown fragment `{}`", name))
                    })?;
                    if visiting.contains(&name) {
                        return Err(Error::Build(format!("Fragment `{}` spreads itself", name)));
                    }
                    if fragment.type_condition.node.on.node.as_str() != type_name {
                        continue;
                    }

                    visiting.push(name);
                    let children = self.iter(
                        &fragment.selection_set.node,
                        type_name,
                        &conditions,
                        fragments,
                        visiting,
                    )?;
                    visiting.pop();
                    children.into_iter().for_each(|child| merge(&mut fields, child));
                }
                Selection::InlineFragment(Positioned { node: fragment, .. }) => {
                    let Some(mut conditions) = Self::conditions(&fragment.directives) else {
                        continue;
                    };
                    conditions.extend(inherited.iter().cloned());

                    let applies = fragment
                        .type_condition
                        .as_ref()
                        .map_or(true, |cond| cond.node.on.node.as_str() == type_name);
                    if !applies {
                        continue;
                    }

                    let children = self.iter(
                        &fragment.selection_set.node,
                        type_name,
                        &conditions,
                        fragments,
                        visiting,
                    )?;
                    children.into_iter().for_each(|child| merge(&mut fields, child));
                }
            }
        }

        Ok(fields)
    }

    #[inline(always)]
    fn get_type(&self, ty: OperationType) -> Result<&str> {
        match ty {
            OperationType::Query => Ok(self.index.get_query()),
            OperationType::Mutation => self
                .index
                .get_mutation()
                .ok_or_else(|| Error::Build("Mutation root type is not defined".to_string())),
            OperationType::Subscription => {
                Err(Error::Build("Subscriptions are not supported".to_string()))
            }
        }
    }

    fn operation(&self, operation_name: Option<&str>) -> Result<&OperationDefinition> {
        match (&self.document.operations, operation_name) {
            (DocumentOperations::Single(single), _) => Ok(&single.node),
            (DocumentOperations::Multiple(multiple), Some(name)) => multiple
                .iter()
                .find(|(op_name, _)| op_name.as_str() == name)
                .map(|(_, op)| &op.node)
                .ok_or_else(|| Error::Build(format!("Unknown operation `{}`", name))),
            (DocumentOperations::Multiple(multiple), None) if multiple.len() == 1 => multiple
                .values()
                .next()
                .map(|op| &op.node)
                .ok_or_else(|| Error::Build("Document has no operation".to_string())),
            (DocumentOperations::Multiple(_), None) => Err(Error::Build(
                "Operation name is required when the document has several operations"
                    .to_string(),
            )),
        }
    }

    fn collect_enums(&self, fields: &[Field], enums: &mut HashMap<String, Vec<String>>) {
        for field in fields {
            let type_name = field.type_of.name();
            if let Some(Definition::Enum { values }) = self.index.get_definition(type_name) {
                enums.insert(type_name.to_string(), values.clone());
            }
            self.collect_enums(&field.selection, enums);
        }
    }

    #[inline(always)]
    pub fn build(&self, operation_name: Option<&str>) -> Result<OperationPlan> {
        let fragments: Fragments = self
            .document
            .fragments
            .iter()
            .map(|(name, fragment)| (name.as_str(), &fragment.node))
            .collect();

        let operation = self.operation(operation_name)?;
        let root_name = self.get_type(operation.ty)?;

        let selection = match Self::conditions(&operation.directives) {
            Some(conditions) => self.iter(
                &operation.selection_set.node,
                root_name,
                &conditions,
                &fragments,
                &mut vec![],
            )?,
            None => vec![],
        };

        let variable_defaults: IndexMap<String, ConstValue> = operation
            .variable_definitions
            .iter()
            .filter_map(|def| {
                let def = &def.node;
                def.default_value
                    .as_ref()
                    .map(|value| (def.name.node.to_string(), value.node.clone()))
            })
            .collect();

        let mut enums = HashMap::new();
        self.collect_enums(&selection, &mut enums);

        Ok(OperationPlan::new(
            operation.ty,
            root_name,
            selection,
            variable_defaults,
            enums,
            self.field_id.get(),
        ))
    }
}

/// Fields sharing a response key are requested once, with their
/// sub-selections combined. When the copies carry different conditions, the
/// merged field keeps the shared ones plus an [`Condition::Any`] over the
/// rest, and every child inherits the conditions of the copy it came from.
fn merge(fields: &mut Vec<Field>, field: Field) {
    let Some(existing) = fields
        .iter_mut()
        .find(|f| f.output_name == field.output_name)
    else {
        fields.push(field);
        return;
    };

    if existing.conditions == field.conditions {
        for child in field.selection {
            merge(&mut existing.selection, child);
        }
        return;
    }

    let common: Vec<Condition> = existing
        .conditions
        .iter()
        .filter(|c| field.conditions.contains(c))
        .cloned()
        .collect();
    let rest = |conditions: &[Condition]| -> Vec<Condition> {
        conditions
            .iter()
            .filter(|c| !common.contains(c))
            .cloned()
            .collect()
    };
    let existing_rest = rest(existing.conditions.as_slice());
    let field_rest = rest(field.conditions.as_slice());

    for child in existing.selection.iter_mut() {
        child.conditions.extend(existing_rest.iter().cloned());
    }
    existing.conditions = common;
    if !existing_rest.is_empty() && !field_rest.is_empty() {
        existing
            .conditions
            .push(Condition::Any(vec![existing_rest, field_rest.clone()]));
    }

    for mut child in field.selection {
        child.conditions.extend(field_rest.iter().cloned());
        merge(&mut existing.selection, child);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::blueprint::FieldDefinition;

    fn index() -> Index {
        Index::new("Query")
            .with_mutation("Mutation")
            .object(
                "Query",
                [
                    FieldDefinition::new("album", Type::named("Album"))
                        .arg("id", Type::named("ID").into_required(), None),
                    FieldDefinition::new("albums", Type::named("Album").into_list()),
                ],
            )
            .object(
                "Mutation",
                [FieldDefinition::new("rename", Type::named("Album"))
                    .arg("title", Type::named("String"), None)],
            )
            .object(
                "Album",
                [
                    FieldDefinition::new("title", Type::named("String").into_required()),
                    FieldDefinition::new("artist", Type::named("Artist")),
                    FieldDefinition::new("format", Type::named("Format")),
                ],
            )
            .enumeration("Format", ["VINYL", "CD"])
            .object(
                "Artist",
                [
                    FieldDefinition::new("name", Type::named("String")),
                    FieldDefinition::new("born", Type::named("Int")),
                ],
            )
    }

    fn plan(query: &str) -> Result<OperationPlan> {
        let index = index();
        let document = async_graphql_parser::parse_query(query)?;
        Builder::new(&index, document).build(None)
    }

    fn names(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.output_name.as_str()).collect()
    }

    #[test]
    fn test_simple_query() {
        let plan = plan(r#"{ album(id: "1") { title artist { name } } }"#).unwrap();
        assert!(plan.is_query());
        assert_eq!(plan.root_name, "Query");
        assert_eq!(plan.size(), 4);

        let album = &plan.selection[0];
        assert_eq!(album.parent_type, "Query");
        assert_eq!(album.args[0].value, Some(Value::String("1".to_string())));
        assert!(!album.is_scalar);
        assert_eq!(names(&album.selection), vec!["title", "artist"]);
        assert!(album.selection[0].is_scalar);
        assert_eq!(album.selection[0].type_of.to_string(), "String!");
    }

    #[test]
    fn test_alias() {
        let plan = plan(r#"{ first: album(id: "1") { name: title } }"#).unwrap();
        let field = plan.find_field_path(&["first", "name"]).unwrap();
        assert_eq!(field.name, "title");
        assert_eq!(field.parent_type, "Album");
    }

    #[test]
    fn test_fragments_are_flattened_and_merged() {
        let plan = plan(
            r#"
            query {
                albums {
                    ...AlbumParts
                    artist { born }
                    ... on Album { title }
                }
            }
            fragment AlbumParts on Album { title artist { name } }
        "#,
        )
        .unwrap();
        let albums = &plan.selection[0];
        assert_eq!(names(&albums.selection), vec!["title", "artist"]);
        assert_eq!(names(&albums.selection[1].selection), vec!["name", "born"]);
    }

    #[test]
    fn test_constant_conditions() {
        let plan = plan(
            r#"
            query($flag: Boolean = true) {
                albums {
                    title @skip(if: true)
                    artist @include(if: false) { name }
                    a: title @include(if: true)
                    b: title @skip(if: $flag)
                }
            }
        "#,
        )
        .unwrap();
        let albums = &plan.selection[0];
        assert_eq!(names(&albums.selection), vec!["a", "b"]);
        assert_eq!(
            albums.selection[1].conditions,
            vec![Condition::Skip(Variable::new("flag"))]
        );
        assert_eq!(
            plan.variable_defaults.get("flag"),
            Some(&ConstValue::Boolean(true))
        );
    }

    #[test]
    fn test_conditional_copies_are_merged() {
        let plan = plan(
            r#"
            query($x: Boolean!, $y: Boolean!) {
                album(id: "1") { title }
                album(id: "1") @include(if: $x) { artist { name } }
                albums @include(if: $x) { title }
                albums @skip(if: $y) { format }
            }
        "#,
        )
        .unwrap();
        assert_eq!(names(&plan.selection), vec!["album", "albums"]);

        let album = &plan.selection[0];
        assert!(album.conditions.is_empty());
        assert_eq!(names(&album.selection), vec!["title", "artist"]);
        assert!(album.selection[0].conditions.is_empty());
        assert_eq!(
            album.selection[1].conditions,
            vec![Condition::Include(Variable::new("x"))]
        );

        let albums = &plan.selection[1];
        let include = Condition::Include(Variable::new("x"));
        let skip = Condition::Skip(Variable::new("y"));
        assert_eq!(
            albums.conditions,
            vec![Condition::Any(vec![vec![include.clone()], vec![skip.clone()]])]
        );
        assert_eq!(albums.selection[0].conditions, vec![include]);
        assert_eq!(albums.selection[1].conditions, vec![skip]);
    }

    #[test]
    fn test_enum_values() {
        let plan = plan("{ albums { format } }").unwrap();
        assert!(plan.selection[0].selection[0].is_scalar);
        assert_eq!(
            plan.enum_values("Format"),
            Some(&["VINYL".to_string(), "CD".to_string()][..])
        );
        assert_eq!(plan.enum_values("Album"), None);
    }

    #[test]
    fn test_mutation() {
        let plan = plan(r#"mutation { rename(title: "x") { title } }"#).unwrap();
        assert!(!plan.is_query());
        assert_eq!(plan.root_name, "Mutation");
    }

    #[test]
    fn test_typename() {
        let plan = plan("{ albums { __typename } }").unwrap();
        let field = &plan.selection[0].selection[0];
        assert!(field.is_typename());
        assert_eq!(field.parent_type, "Album");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(plan("{ artist { name } }"), Err(Error::Build(_))));
        assert!(matches!(
            plan(r#"{ album(id: "1", year: 1959) { title } }"#),
            Err(Error::Build(_))
        ));
        assert!(matches!(plan("subscription { albums { title } }"), Err(Error::Build(_))));
        assert!(matches!(
            plan("query A { albums { title } } query B { albums { title } }"),
            Err(Error::Build(_))
        ));
        assert!(matches!(
            plan("{ albums { ...Parts } } fragment Parts on Album { ...Parts }"),
            Err(Error::Build(_))
        ));
    }

    #[test]
    fn test_named_operation() {
        let index = index();
        let document =
            async_graphql_parser::parse_query("query A { albums { title } } query B { album(id: 1) { title } }")
                .unwrap();
        let plan = Builder::new(&index, document).build(Some("B")).unwrap();
        assert_eq!(names(&plan.selection), vec!["album"]);
    }
}

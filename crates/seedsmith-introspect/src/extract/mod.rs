//! Metadata extractor: type metadata in, entity descriptors out.
//!
//! Extraction is best-effort. Members or annotations that cannot be
//! interpreted are skipped silently and never fail the entity.

mod constraints;

use std::collections::BTreeSet;

use tracing::{debug, info};

use seedsmith_core::{
    Accessibility, AnnotationValue, EntityDescriptor, EnumMember, MemberMetadata,
    PropertyDescriptor, TypeKind, TypeMetadata, find_annotation, has_annotation,
};

use crate::adapter::TypeMetadataProvider;
use crate::cache::TypeCache;
use crate::options::ExtractOptions;

pub use constraints::{apply_constraints, is_database_generated};

const KEY_SUFFIX: &str = "Id";

/// Analyze a set of types, one descriptor per distinct resolvable type.
///
/// Unknown type names are skipped; duplicates (by qualified name) are
/// analyzed once, in first-seen order.
pub fn analyze_entities<P, S>(
    provider: &P,
    type_names: &[S],
    options: &ExtractOptions,
) -> Vec<EntityDescriptor>
where
    P: TypeMetadataProvider + ?Sized,
    S: AsRef<str>,
{
    let mut cache = TypeCache::new(provider);
    let mut seen = BTreeSet::new();
    let mut entities = Vec::new();

    for name in type_names {
        let Some(metadata) = cache.resolve(name.as_ref()) else {
            debug!(type_name = %name.as_ref(), "type not found, skipping");
            continue;
        };
        if !seen.insert(metadata.qualified_name()) {
            continue;
        }
        entities.push(extract_entity(metadata, &mut cache, options));
    }

    info!(
        requested = type_names.len(),
        entities = entities.len(),
        cache_hits = cache.hits(),
        cache_misses = cache.misses(),
        "entities analyzed"
    );

    entities
}

/// Extract a descriptor for one type, walking its base-type chain.
pub fn extract_entity<'p, P>(
    metadata: &'p TypeMetadata,
    cache: &mut TypeCache<'p, P>,
    options: &ExtractOptions,
) -> EntityDescriptor
where
    P: TypeMetadataProvider + ?Sized,
{
    let chain = inheritance_chain(metadata, cache, options);
    let members = collect_members(&chain);

    let mut entity = EntityDescriptor::new(metadata.name.clone(), metadata.qualified_name());
    entity.namespace_hint = metadata.namespace.clone();
    entity.is_abstract = metadata.is_abstract;
    entity.table_hint = find_annotation(&metadata.annotations, "Table")
        .and_then(|annotation| annotation.argument(0, "Name"))
        .and_then(AnnotationValue::as_str)
        .map(str::to_string);
    entity.base_type_name = metadata
        .base_type
        .clone()
        .filter(|base| !options.is_root_type(base));

    let explicit_key = members
        .iter()
        .any(|collected| has_annotation(&collected.member.annotations, "Key"));
    let has_plain_id = members
        .iter()
        .any(|collected| collected.member.name.eq_ignore_ascii_case(KEY_SUFFIX));

    for collected in &members {
        let mut property = classify_member(collected, cache, options);
        property.is_key = if explicit_key {
            has_annotation(&collected.member.annotations, "Key")
        } else {
            is_conventional_key(&collected.member.name, &metadata.name, has_plain_id)
        };
        if property.is_key {
            property.is_required = true;
        }
        entity.properties.push(property);
    }

    resolve_foreign_keys(&mut entity, &members, cache, options);

    debug!(
        entity = %entity.name,
        properties = entity.properties.len(),
        chain = chain.len(),
        "entity extracted"
    );
    entity
}

/// `type`, then its base, and so on; stops at a root type or a revisited name.
fn inheritance_chain<'p, P>(
    metadata: &'p TypeMetadata,
    cache: &mut TypeCache<'p, P>,
    options: &ExtractOptions,
) -> Vec<&'p TypeMetadata>
where
    P: TypeMetadataProvider + ?Sized,
{
    let mut chain = Vec::new();
    let mut visited = BTreeSet::new();
    let mut current = Some(metadata);

    while let Some(ty) = current {
        let qualified = ty.qualified_name();
        if options.is_root_type(&qualified) || options.is_root_type(&ty.name) {
            break;
        }
        if !visited.insert(qualified) {
            debug!(type_name = %ty.name, "inheritance cycle detected");
            break;
        }
        chain.push(ty);
        current = ty
            .base_type
            .as_deref()
            .filter(|base| !options.is_root_type(base))
            .and_then(|base| cache.resolve(base));
    }

    chain
}

struct CollectedMember<'a> {
    member: &'a MemberMetadata,
    declaring_type: &'a TypeMetadata,
    notes: Vec<String>,
}

/// Eligible members, derived declarations first; base duplicates become notes.
fn collect_members<'a>(chain: &[&'a TypeMetadata]) -> Vec<CollectedMember<'a>> {
    let mut collected: Vec<CollectedMember<'a>> = Vec::new();

    for (depth, ty) in chain.iter().enumerate() {
        for member in &ty.members {
            if !is_eligible(member) {
                continue;
            }
            if let Some(existing) = collected
                .iter_mut()
                .find(|existing| existing.member.name.eq_ignore_ascii_case(&member.name))
            {
                existing.notes.push(format!("inherited from {}", ty.name));
                continue;
            }
            let mut notes = Vec::new();
            if depth > 0 {
                notes.push(format!("inherited from {}", ty.name));
            }
            collected.push(CollectedMember {
                member,
                declaring_type: ty,
                notes,
            });
        }
    }

    collected
}

/// Instance member with a readable and writable accessor pair, where the
/// setter is at least as visible as the getter.
fn is_eligible(member: &MemberMetadata) -> bool {
    if member.is_static || has_annotation(&member.annotations, "NotMapped") {
        return false;
    }
    match (member.getter, member.setter) {
        (Some(getter), Some(setter)) => {
            getter > Accessibility::Private && setter > Accessibility::Private && setter >= getter
        }
        _ => false,
    }
}

fn is_conventional_key(member_name: &str, type_name: &str, has_plain_id: bool) -> bool {
    if member_name.eq_ignore_ascii_case(KEY_SUFFIX) {
        return true;
    }
    !has_plain_id && member_name.eq_ignore_ascii_case(&format!("{type_name}{KEY_SUFFIX}"))
}

fn classify_member<P>(
    collected: &CollectedMember<'_>,
    cache: &mut TypeCache<'_, P>,
    options: &ExtractOptions,
) -> PropertyDescriptor
where
    P: TypeMetadataProvider + ?Sized,
{
    let member = collected.member;
    let type_ref = member.type_ref.unwrap_nullable();
    let mut property = PropertyDescriptor::new(
        member.name.clone(),
        member.type_ref.display_name(),
        collected.declaring_type.qualified_name(),
    );
    property.notes = collected.notes.clone();
    property.is_nullable = type_ref.nullable;
    property.is_auto_generated = is_database_generated(&member.annotations);

    let is_collection =
        options.is_collection_type(&type_ref.name) && type_ref.type_arguments.len() == 1;
    if is_collection {
        property.is_collection = true;
        property.element_type_name = type_ref
            .type_arguments
            .first()
            .map(|element| element.unwrap_nullable().name);
    }

    let is_reference_shape = matches!(type_ref.kind, TypeKind::Class | TypeKind::Interface)
        && !type_ref.is_primitive()
        && !type_ref.is_in_namespace(&options.core_namespace)
        && !is_collection;
    if is_reference_shape {
        property.element_type_name = Some(type_ref.name.clone());
    }
    if member.is_virtual && (is_collection || is_reference_shape) {
        property.is_navigation = true;
    }

    let resolved = cache.resolve_ref(&type_ref);
    let is_enum = type_ref.kind == TypeKind::Enum
        || resolved.is_some_and(|ty| ty.kind == TypeKind::Enum);
    if is_enum && !is_collection {
        property.is_enum = true;
        if let Some(enum_type) = resolved {
            property.enum_members = enum_type
                .enum_members
                .iter()
                .map(|member| EnumMember {
                    name: member.name.clone(),
                    value: member.value,
                    description: enum_member_description(&member.annotations),
                })
                .collect();
        }
    }

    apply_constraints(&member.annotations, &mut property);
    property
}

fn enum_member_description(annotations: &[seedsmith_core::Annotation]) -> Option<String> {
    if let Some(text) = find_annotation(annotations, "Description")
        .and_then(|annotation| annotation.argument(0, "Description"))
        .and_then(AnnotationValue::as_str)
    {
        return Some(text.to_string());
    }
    find_annotation(annotations, "Display")
        .and_then(|annotation| {
            annotation
                .named("Description")
                .or_else(|| annotation.named("Name"))
        })
        .and_then(AnnotationValue::as_str)
        .map(str::to_string)
}

/// Foreign-key detection: explicit annotations first, then the `...Id` convention.
fn resolve_foreign_keys<P>(
    entity: &mut EntityDescriptor,
    members: &[CollectedMember<'_>],
    cache: &mut TypeCache<'_, P>,
    options: &ExtractOptions,
) where
    P: TypeMetadataProvider + ?Sized,
{
    let navigations: Vec<(String, Option<String>)> = entity
        .properties
        .iter()
        .filter(|property| property.is_navigation && !property.is_collection)
        .map(|property| (property.name.clone(), property.element_type_name.clone()))
        .collect();

    // Navigation members naming their foreign-key properties: `[ForeignKey("CustomerId")]`.
    let mut named_by_navigation: Vec<(String, Option<String>)> = Vec::new();
    for (property, collected) in entity.properties.iter().zip(members) {
        if !property.is_navigation || property.is_collection {
            continue;
        }
        if let Some(names) = find_annotation(&collected.member.annotations, "ForeignKey")
            .and_then(|annotation| annotation.argument(0, "Name"))
            .and_then(AnnotationValue::as_str)
        {
            for name in names.split(',') {
                named_by_navigation
                    .push((name.trim().to_string(), property.element_type_name.clone()));
            }
        }
    }

    for (property, collected) in entity.properties.iter_mut().zip(members) {
        if property.is_key || property.is_navigation || property.is_collection {
            continue;
        }

        let explicit_target = find_annotation(&collected.member.annotations, "ForeignKey")
            .and_then(|annotation| annotation.argument(0, "Name"))
            .and_then(AnnotationValue::as_str)
            .and_then(|navigation| {
                navigations
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(navigation))
                    .and_then(|(_, target)| target.clone())
            })
            .or_else(|| {
                named_by_navigation
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(&property.name))
                    .and_then(|(_, target)| target.clone())
            });

        let target = explicit_target.or_else(|| conventional_target(&property.name));
        let Some(target) = target else {
            continue;
        };

        property.is_foreign_key = true;
        property.foreign_key_target_property = Some(
            target_key_name(&target, cache, options).unwrap_or_else(|| KEY_SUFFIX.to_string()),
        );
        property.foreign_key_target_entity = Some(target);
    }
}

/// `CustomerId` -> `Customer`; `Id` alone is never a foreign key.
fn conventional_target(name: &str) -> Option<String> {
    let stem = name
        .strip_suffix(KEY_SUFFIX)
        .or_else(|| name.strip_suffix("ID"))?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// Key member name of a referenced type, following its base chain.
fn target_key_name<P>(
    target: &str,
    cache: &mut TypeCache<'_, P>,
    options: &ExtractOptions,
) -> Option<String>
where
    P: TypeMetadataProvider + ?Sized,
{
    let metadata = cache.resolve(target)?;
    let chain = inheritance_chain(metadata, cache, options);
    let members = collect_members(&chain);

    if let Some(explicit) = members
        .iter()
        .find(|collected| has_annotation(&collected.member.annotations, "Key"))
    {
        return Some(explicit.member.name.clone());
    }
    let has_plain_id = members
        .iter()
        .any(|collected| collected.member.name.eq_ignore_ascii_case(KEY_SUFFIX));
    members
        .iter()
        .find(|collected| is_conventional_key(&collected.member.name, &metadata.name, has_plain_id))
        .map(|collected| collected.member.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[test]
    fn eligibility_requires_visible_setter() {
        let member = |getter, setter, is_static| MemberMetadata {
            name: "Name".to_string(),
            type_ref: seedsmith_core::TypeRef::named("string"),
            is_static,
            is_virtual: false,
            getter,
            setter,
            annotations: Vec::new(),
        };

        assert!(is_eligible(&member(
            Some(Accessibility::Public),
            Some(Accessibility::Public),
            false
        )));
        assert!(!is_eligible(&member(
            Some(Accessibility::Public),
            Some(Accessibility::Protected),
            false
        )));
        assert!(!is_eligible(&member(Some(Accessibility::Public), None, false)));
        assert!(!is_eligible(&member(
            Some(Accessibility::Public),
            Some(Accessibility::Public),
            true
        )));
        assert!(is_eligible(&member(
            Some(Accessibility::Internal),
            Some(Accessibility::Public),
            false
        )));
    }

    #[test]
    fn conventional_targets_strip_the_suffix() {
        assert_eq!(conventional_target("CustomerId").as_deref(), Some("Customer"));
        assert_eq!(conventional_target("CustomerID").as_deref(), Some("Customer"));
        assert_eq!(conventional_target("Id"), None);
        assert_eq!(conventional_target("Name"), None);
    }

    #[test]
    fn inheritance_cycles_terminate() {
        let catalog = InMemoryCatalog::from_json(
            r#"[
                {"name":"A","namespace":"Loop","base_type":"Loop.B","members":[
                    {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"}
                ]},
                {"name":"B","namespace":"Loop","base_type":"Loop.A","members":[
                    {"name":"Label","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public"}
                ]}
            ]"#,
        )
        .expect("parse catalog");

        let entities = analyze_entities(&catalog, &["Loop.A"], &ExtractOptions::default());
        assert_eq!(entities.len(), 1);
        let names: Vec<&str> = entities[0]
            .properties
            .iter()
            .map(|property| property.name.as_str())
            .collect();
        assert_eq!(names, vec!["Id", "Label"]);
        assert_eq!(entities[0].base_type_name.as_deref(), Some("Loop.B"));
    }
}

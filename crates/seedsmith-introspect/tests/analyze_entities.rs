use anyhow::{Context, Result, anyhow};
use schemars::schema_for;
use seedsmith_core::{
    Detector, EntityDescriptor, RelationshipKind, resolve_dependency_order, validate_descriptors,
};
use seedsmith_introspect::{
    ExtractOptions, InMemoryCatalog, InferenceOptions, analyze_entities, discover_entities,
    infer_relationships,
};

const SHOP_TYPES: &[&str] = &[
    "Shop.Customer",
    "Shop.Order",
    "Shop.Product",
    "Shop.Invoice",
];

fn shop_catalog() -> Result<InMemoryCatalog> {
    let json = r#"{
      "types": [
        {"name":"EntityBase","namespace":"Shop","is_abstract":true,"members":[
          {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"DatabaseGenerated","positional":[1]}]},
          {"name":"Code","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"CreatedAt","type_ref":{"name":"DateTime","namespace":"System","kind":"struct"},"getter":"public","setter":"protected"}
        ]},
        {"name":"Customer","namespace":"Shop","base_type":"Shop.EntityBase","members":[
          {"name":"Name","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"Required"},{"name":"System.ComponentModel.DataAnnotations.MaxLengthAttribute","positional":[80]}]},
          {"name":"Email","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"Code","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"Orders","type_ref":{"name":"ICollection","kind":"interface","type_arguments":[{"name":"Order","namespace":"Shop"}]},
           "is_virtual":true,"getter":"public","setter":"public"},
          {"name":"Cache","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"NotMapped"}]}
        ]},
        {"name":"Order","namespace":"Shop","base_type":"Shop.EntityBase",
         "annotations":[{"name":"Table","named":{"Name":"orders"}}],
         "members":[
          {"name":"CustomerId","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"Customer","type_ref":{"name":"Customer","namespace":"Shop"},"is_virtual":true,"getter":"public","setter":"public"},
          {"name":"Status","type_ref":{"name":"OrderStatus","namespace":"Shop","kind":"enum"},"getter":"public","setter":"public"},
          {"name":"Total","type_ref":{"name":"decimal","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"Range","positional":[0,10000]}]},
          {"name":"Count","type_ref":{"name":"int","kind":"primitive"},"is_static":true,"getter":"public","setter":"public"}
        ]},
        {"name":"OrderStatus","namespace":"Shop","kind":"enum","enum_members":[
          {"name":"Pending","value":0,"annotations":[{"name":"Description","positional":["Awaiting payment"]}]},
          {"name":"Shipped","value":1,"annotations":[{"name":"Display","named":{"Name":"On its way"}}]},
          {"name":"Cancelled","value":2}
        ]},
        {"name":"Product","namespace":"Shop","members":[
          {"name":"ProductId","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"Sku","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"RegularExpression","positional":["[A-Z]{3}-[0-9]{4}"]}]},
          {"name":"ReplacementRefId","type_ref":{"name":"Nullable","type_arguments":[{"name":"int","kind":"primitive"}]},"getter":"public","setter":"public"}
        ]},
        {"name":"Replacement","namespace":"Shop","members":[
          {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"}
        ]},
        {"name":"Invoice","namespace":"Shop","members":[
          {"name":"Number","type_ref":{"name":"string","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"Key"}]},
          {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
          {"name":"BillToId","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public",
           "annotations":[{"name":"ForeignKey","positional":["BillTo"]}]},
          {"name":"BillTo","type_ref":{"name":"Customer","namespace":"Shop"},"is_virtual":true,"getter":"public","setter":"public"},
          {"name":"OrderId","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"}
        ]}
      ]
    }"#;
    InMemoryCatalog::from_json(json).context("parsing shop catalog")
}

fn entity<'a>(entities: &'a [EntityDescriptor], name: &str) -> Result<&'a EntityDescriptor> {
    entities
        .iter()
        .find(|entity| entity.name == name)
        .ok_or_else(|| anyhow!("expected entity {name}"))
}

fn analyzed_shop() -> Result<Vec<EntityDescriptor>> {
    let catalog = shop_catalog()?;
    let mut entities = analyze_entities(&catalog, SHOP_TYPES, &ExtractOptions::default());
    infer_relationships(&mut entities, &InferenceOptions::default());
    Ok(entities)
}

#[test]
fn analysis_is_idempotent() -> Result<()> {
    let catalog = shop_catalog()?;
    let options = ExtractOptions::default();

    let first = analyze_entities(&catalog, SHOP_TYPES, &options);
    let second = analyze_entities(&catalog, SHOP_TYPES, &options);
    assert_eq!(first, second);

    let names: Vec<&str> = first.iter().map(|entity| entity.name.as_str()).collect();
    assert_eq!(names, vec!["Customer", "Order", "Product", "Invoice"]);
    Ok(())
}

#[test]
fn unknown_and_duplicate_type_names_are_skipped() -> Result<()> {
    let catalog = shop_catalog()?;
    let entities = analyze_entities(
        &catalog,
        &["Shop.Customer", "Customer", "Shop.Missing"],
        &ExtractOptions::default(),
    );
    assert_eq!(entities.len(), 1);
    Ok(())
}

#[test]
fn derived_members_shadow_base_members() -> Result<()> {
    let entities = analyzed_shop()?;
    let customer = entity(&entities, "Customer")?;

    let codes: Vec<_> = customer
        .properties
        .iter()
        .filter(|property| property.name == "Code")
        .collect();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].declaring_type, "Shop.Customer");
    assert_eq!(codes[0].notes, vec!["inherited from EntityBase"]);

    let id = customer.property("id").context("inherited key")?;
    assert!(id.is_key);
    assert!(id.is_required);
    assert!(id.is_auto_generated);
    assert_eq!(id.declaring_type, "Shop.EntityBase");
    assert_eq!(id.notes, vec!["inherited from EntityBase"]);

    assert!(customer.property("CreatedAt").is_none(), "setter narrower than getter");
    assert!(customer.property("Cache").is_none(), "not mapped");
    assert_eq!(customer.base_type_name.as_deref(), Some("Shop.EntityBase"));

    let name = customer.property("Name").context("name")?;
    assert!(name.is_required);
    assert_eq!(name.max_length, Some(80));
    Ok(())
}

#[test]
fn member_classification() -> Result<()> {
    let entities = analyzed_shop()?;
    let customer = entity(&entities, "Customer")?;
    let orders = customer.property("Orders").context("orders")?;
    assert!(orders.is_collection);
    assert!(orders.is_navigation);
    assert_eq!(orders.element_type_name.as_deref(), Some("Order"));
    assert_eq!(orders.declared_type_name, "ICollection<Order>");

    let order = entity(&entities, "Order")?;
    assert_eq!(order.storage_name(), "orders");
    assert!(order.property("Count").is_none());

    let status = order.property("Status").context("status")?;
    assert!(status.is_enum);
    let members: Vec<(&str, i64, Option<&str>)> = status
        .enum_members
        .iter()
        .map(|member| {
            (
                member.name.as_str(),
                member.value,
                member.description.as_deref(),
            )
        })
        .collect();
    assert_eq!(
        members,
        vec![
            ("Pending", 0, Some("Awaiting payment")),
            ("Shipped", 1, Some("On its way")),
            ("Cancelled", 2, None),
        ]
    );

    let total = order.property("Total").context("total")?;
    assert_eq!(total.min_value, Some(0.0));
    assert_eq!(total.max_value, Some(10000.0));

    let product = entity(&entities, "Product")?;
    let key: Vec<&str> = product
        .key_properties()
        .map(|property| property.name.as_str())
        .collect();
    assert_eq!(key, vec!["ProductId"]);
    let sku = product.property("Sku").context("sku")?;
    assert_eq!(sku.regex_pattern.as_deref(), Some("[A-Z]{3}-[0-9]{4}"));
    let replacement = product.property("ReplacementRefId").context("replacement")?;
    assert!(replacement.is_nullable);
    assert_eq!(replacement.declared_type_name, "int?");
    Ok(())
}

#[test]
fn explicit_key_and_foreign_key_annotations_win() -> Result<()> {
    let entities = analyzed_shop()?;
    let invoice = entity(&entities, "Invoice")?;

    let keys: Vec<&str> = invoice
        .key_properties()
        .map(|property| property.name.as_str())
        .collect();
    assert_eq!(keys, vec!["Number"]);

    let bill_to = invoice.property("BillToId").context("bill to")?;
    assert!(bill_to.is_foreign_key);
    assert_eq!(bill_to.foreign_key_target_entity.as_deref(), Some("Customer"));
    assert_eq!(bill_to.foreign_key_target_property.as_deref(), Some("Id"));

    let order_fk = invoice.property("OrderId").context("order id")?;
    assert!(order_fk.is_foreign_key);
    assert!(!order_fk.is_key);
    assert_eq!(order_fk.foreign_key_target_entity.as_deref(), Some("Order"));

    let plain_id = invoice.property("Id").context("id")?;
    assert!(!plain_id.is_key);
    assert!(!plain_id.is_foreign_key);
    Ok(())
}

#[test]
fn foreign_key_convention_relates_order_to_customer() -> Result<()> {
    let entities = analyzed_shop()?;
    let order = entity(&entities, "Order")?;

    let to_customer: Vec<_> = order
        .relationships
        .iter()
        .filter(|relationship| relationship.target_entity == "Customer")
        .collect();
    assert_eq!(to_customer.len(), 1, "detectors must not duplicate the edge");
    assert_eq!(to_customer[0].kind, RelationshipKind::ManyToOne);
    assert_eq!(
        to_customer[0].foreign_key_property_name.as_deref(),
        Some("CustomerId")
    );
    assert_eq!(to_customer[0].detected_by, Detector::NamingConvention);

    let customer = entity(&entities, "Customer")?;
    let orders = customer
        .relationships
        .iter()
        .find(|relationship| relationship.kind == RelationshipKind::OneToMany)
        .context("customer orders")?;
    assert_eq!(orders.target_entity, "Order");
    assert_eq!(orders.target_navigation_property.as_deref(), Some("Customer"));
    assert_eq!(orders.foreign_key_property_name.as_deref(), Some("CustomerId"));
    Ok(())
}

#[test]
fn reference_segment_is_stripped() -> Result<()> {
    let catalog = shop_catalog()?;
    let mut entities = analyze_entities(
        &catalog,
        &["Shop.Product", "Shop.Replacement"],
        &ExtractOptions::default(),
    );
    infer_relationships(&mut entities, &InferenceOptions::default());

    let product = entity(&entities, "Product")?;
    assert_eq!(product.relationships.len(), 1);
    assert_eq!(product.relationships[0].target_entity, "Replacement");
    assert_eq!(
        product.relationships[0].foreign_key_property_name.as_deref(),
        Some("ReplacementRefId")
    );
    Ok(())
}

#[test]
fn resolution_leaves_an_acyclic_parent_assignment() -> Result<()> {
    let mut entities = analyzed_shop()?;
    let resolution = resolve_dependency_order(&mut entities);

    assert_eq!(resolution.parent_of("Order"), Some("Customer"));
    assert_eq!(resolution.parent_of("Invoice"), Some("Customer"));
    assert_eq!(resolution.parent_of("Customer"), None);
    assert!(resolution.broken_edges.is_empty());

    let position = |name: &str| resolution.order.iter().position(|entry| entry == name);
    assert!(position("Customer") < position("Order"));
    assert!(position("Order") < position("Invoice"));
    Ok(())
}

#[test]
fn descriptors_are_consistent_and_match_the_schema() -> Result<()> {
    let entities = analyzed_shop()?;
    validate_descriptors(&entities)?;

    let schema = serde_json::to_value(schema_for!(Vec<EntityDescriptor>))?;
    let compiled = jsonschema::JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("schema failed to compile: {err}"))?;
    let instance = serde_json::to_value(&entities)?;
    assert!(compiled.is_valid(&instance));
    Ok(())
}

#[test]
fn discovery_finds_keyed_and_referenced_types() -> Result<()> {
    let catalog = shop_catalog()?;
    let names: Vec<String> = discover_entities(&catalog, &ExtractOptions::default())
        .into_iter()
        .map(|entity| entity.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "EntityBase",
            "Customer",
            "Order",
            "Product",
            "Replacement",
            "Invoice"
        ]
    );
    Ok(())
}

#[test]
fn mutual_references_form_a_cycle_that_is_broken_once() -> Result<()> {
    let catalog = InMemoryCatalog::from_json(
        r#"[
          {"name":"User","namespace":"App","members":[
            {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
            {"name":"Profile","type_ref":{"name":"Profile","namespace":"App"},"is_virtual":true,"getter":"public","setter":"public"}
          ]},
          {"name":"Profile","namespace":"App","members":[
            {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
            {"name":"User","type_ref":{"name":"User","namespace":"App"},"is_virtual":true,"getter":"public","setter":"public"}
          ]}
        ]"#,
    )
    .context("parsing user catalog")?;
    let mut entities = analyze_entities(&catalog, &["User", "Profile"], &ExtractOptions::default());
    infer_relationships(&mut entities, &InferenceOptions::default());

    for entity in &entities {
        assert!(
            entity
                .relationships
                .iter()
                .all(|relationship| relationship.kind == RelationshipKind::ManyToOne),
            "{} should only reference its counterpart",
            entity.name
        );
    }

    let resolution = resolve_dependency_order(&mut entities);
    assert_eq!(resolution.broken_edges.len(), 1);
    let parents: Vec<Option<&str>> = ["User", "Profile"]
        .iter()
        .map(|name| resolution.parent_of(name))
        .collect();
    assert_eq!(parents.iter().filter(|parent| parent.is_some()).count(), 1);
    Ok(())
}

#[test]
fn non_virtual_entity_reference_still_relates() -> Result<()> {
    let catalog = InMemoryCatalog::from_json(
        r#"[
          {"name":"Customer","namespace":"Shop","members":[
            {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"}
          ]},
          {"name":"Order","namespace":"Shop","members":[
            {"name":"Id","type_ref":{"name":"int","kind":"primitive"},"getter":"public","setter":"public"},
            {"name":"Buyer","type_ref":{"name":"Customer","namespace":"Shop"},"getter":"public","setter":"public"}
          ]}
        ]"#,
    )
    .context("parsing buyer catalog")?;
    let mut entities = analyze_entities(
        &catalog,
        &["Shop.Customer", "Shop.Order"],
        &ExtractOptions::default(),
    );
    infer_relationships(&mut entities, &InferenceOptions::default());

    let order = entity(&entities, "Order")?;
    assert!(!order.property("Buyer").context("buyer")?.is_navigation);
    assert_eq!(order.relationships.len(), 1);
    assert_eq!(order.relationships[0].target_entity, "Customer");
    assert_eq!(order.relationships[0].kind, RelationshipKind::ManyToOne);
    assert_eq!(order.relationships[0].detected_by, Detector::NavigationShape);
    Ok(())
}

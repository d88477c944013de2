use chrono::NaiveDate;
use serde_json::{Value, json};

use seedsmith_core::{
    Detector, EntityDescriptor, PropertyDescriptor, RelationshipDescriptor, RelationshipKind,
};
use seedsmith_generate::{
    GenerateOptions, GenerationError, SourceStyle, deterministic_uuid, generate,
};
use seedsmith_plan::{EntityConfig, OutputFormat};

fn property(entity: &str, name: &str, declared: &str) -> PropertyDescriptor {
    PropertyDescriptor::new(name, declared, format!("Shop.{entity}"))
}

fn key(entity: &str, declared: &str) -> PropertyDescriptor {
    let mut key = property(entity, "Id", declared);
    key.is_key = true;
    key
}

fn product() -> EntityDescriptor {
    let mut product = EntityDescriptor::new("Product", "Shop.Product");
    product.properties = vec![
        key("Product", "int"),
        property("Product", "Name", "string"),
        property("Product", "Price", "decimal"),
    ];
    product
}

/// Customer (Guid key) <- Order (CustomerId by convention) <- OrderLine.
fn shop() -> Vec<EntityDescriptor> {
    let mut customer = EntityDescriptor::new("Customer", "Shop.Customer");
    customer.table_hint = Some("customers".to_string());
    customer.properties = vec![
        key("Customer", "Guid"),
        property("Customer", "Email", "string"),
        property("Customer", "IsActive", "bool"),
    ];

    let mut order = EntityDescriptor::new("Order", "Shop.Order");
    let mut customer_id = property("Order", "CustomerId", "Guid");
    customer_id.is_foreign_key = true;
    customer_id.foreign_key_target_entity = Some("Customer".to_string());
    customer_id.foreign_key_target_property = Some("Id".to_string());
    let mut navigation = property("Order", "Customer", "Customer");
    navigation.is_navigation = true;
    order.properties = vec![
        key("Order", "int"),
        customer_id,
        navigation,
        property("Order", "Notes", "string"),
    ];
    order.relationships.push(RelationshipDescriptor {
        source_entity: "Order".to_string(),
        source_navigation_property: Some("Customer".to_string()),
        target_entity: "Customer".to_string(),
        target_navigation_property: None,
        foreign_key_property_name: Some("CustomerId".to_string()),
        kind: RelationshipKind::ManyToOne,
        detected_by: Detector::NavigationShape,
    });

    let mut line = EntityDescriptor::new("OrderLine", "Shop.OrderLine");
    line.properties = vec![
        key("OrderLine", "int"),
        property("OrderLine", "OrderId", "int"),
        property("OrderLine", "Quantity", "int"),
    ];
    line.relationships.push(RelationshipDescriptor {
        source_entity: "OrderLine".to_string(),
        source_navigation_property: None,
        target_entity: "Order".to_string(),
        target_navigation_property: None,
        foreign_key_property_name: Some("OrderId".to_string()),
        kind: RelationshipKind::ManyToOne,
        detected_by: Detector::NamingConvention,
    });

    vec![customer, order, line]
}

fn shop_configs() -> Vec<EntityConfig> {
    vec![
        EntityConfig::child("OrderLine", "Order", 2),
        EntityConfig::child("Order", "Customer", 2),
        EntityConfig::root("Customer", 2),
    ]
}

fn options(format: OutputFormat) -> GenerateOptions {
    GenerateOptions {
        base_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        ..GenerateOptions::with_format(format)
    }
}

#[test]
fn product_json_has_sequential_ids_in_property_order() {
    let mut config = EntityConfig::root("Product", 2);
    config.total_record_count = 2;

    let result =
        generate(&[product()], &[config], &options(OutputFormat::Json)).expect("generate json");
    let parsed: Value = serde_json::from_str(&result.text).expect("parse json output");
    let records = parsed.as_array().expect("array of records");
    assert_eq!(records.len(), 2);

    for (position, record) in records.iter().enumerate() {
        let object = record.as_object().expect("record object");
        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Id", "Name", "Price"]);
        assert_eq!(object["Id"], json!(position + 1));
        assert!(object["Name"].is_string());
    }
    assert_eq!(records[0]["Price"], json!(19.99));
    assert_eq!(records[1]["Price"], json!(29.99));
}

#[test]
fn foreign_keys_follow_parent_blocks() {
    let entities = shop();
    let result =
        generate(&entities, &shop_configs(), &options(OutputFormat::Json)).expect("generate json");
    let parsed: Value = serde_json::from_str(&result.text).expect("parse json output");

    let groups: Vec<&str> = parsed
        .as_object()
        .expect("grouped by entity")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(groups, vec!["Customer", "Order", "OrderLine"]);

    let customers = parsed["Customer"].as_array().expect("customers");
    let orders = parsed["Order"].as_array().expect("orders");
    let lines = parsed["OrderLine"].as_array().expect("lines");
    assert_eq!((customers.len(), orders.len(), lines.len()), (2, 4, 8));

    let first_customer = deterministic_uuid("Customer", 1).hyphenated().to_string();
    let second_customer = deterministic_uuid("Customer", 2).hyphenated().to_string();
    assert_eq!(customers[0]["Id"], json!(first_customer));
    let order_parents: Vec<&Value> = orders.iter().map(|order| &order["CustomerId"]).collect();
    assert_eq!(
        order_parents,
        vec![
            &json!(first_customer),
            &json!(first_customer),
            &json!(second_customer),
            &json!(second_customer)
        ]
    );
    assert!(orders[0].get("Customer").is_none());

    let line_parents: Vec<i64> = lines
        .iter()
        .filter_map(|line| line["OrderId"].as_i64())
        .collect();
    assert_eq!(line_parents, vec![1, 1, 2, 2, 3, 3, 4, 4]);
}

#[test]
fn sql_output_uses_storage_names_inside_one_transaction() {
    let entities = shop();
    let result =
        generate(&entities, &shop_configs(), &options(OutputFormat::Sql)).expect("generate sql");

    assert!(result.text.starts_with("BEGIN TRANSACTION;\n"));
    assert!(result.text.ends_with("COMMIT TRANSACTION;\n"));
    assert_eq!(result.text.matches("INSERT INTO [customers]").count(), 2);
    assert_eq!(result.text.matches("INSERT INTO [Order] ").count(), 4);
    assert_eq!(result.text.matches("INSERT INTO [OrderLine]").count(), 8);
    assert!(result.text.contains("'user1@example.com', 1);"));

    let customers = result.text.find("-- Customer").expect("customer section");
    let lines = result.text.find("-- OrderLine").expect("line section");
    assert!(customers < lines);
}

#[test]
fn csv_and_xml_cover_every_entity() {
    let entities = shop();

    let csv = generate(&entities, &shop_configs(), &options(OutputFormat::Csv))
        .expect("generate csv")
        .text;
    let sections: Vec<&str> = csv.split("\n\n").collect();
    assert_eq!(sections.len(), 3);
    assert!(sections[0].starts_with("Id,Email,IsActive\n"));
    assert!(sections[1].starts_with("Id,CustomerId,Notes\n1,"));
    assert!(sections[2].starts_with("Id,OrderId,Quantity\n1,1,1\n2,1,2\n"));

    let xml = generate(&entities, &shop_configs(), &options(OutputFormat::Xml))
        .expect("generate xml")
        .text;
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<SeedData>\n"));
    assert!(xml.contains("  <Customers>\n"));
    assert!(xml.contains("<OrderLine Id=\"8\" OrderId=\"4\" Quantity=\"8\" />"));
    assert!(xml.ends_with("</SeedData>\n"));
}

#[test]
fn source_code_styles_build_the_same_records() {
    let mut config = EntityConfig::root("Product", 1);
    config.total_record_count = 1;

    let mut opts = options(OutputFormat::SourceCode);
    let initializer = generate(&[product()], &[config.clone()], &opts)
        .expect("object initializer")
        .text;
    assert!(initializer.starts_with("public static List<Product> GenerateProducts()"));
    assert!(initializer.contains("            Id = 1,\n"));
    assert!(initializer.contains("            Price = 19.99m,\n"));

    opts.source_style = SourceStyle::Assignment;
    let assignment = generate(&[product()], &[config], &opts)
        .expect("assignment")
        .text;
    assert!(assignment.contains("    product1.Id = 1;\n"));
    assert!(assignment.contains("    product1.Price = 19.99m;\n"));
    assert!(assignment.contains("    products.Add(product1);\n"));
}

#[test]
fn generation_is_deterministic_and_checks_inputs_first() {
    let entities = shop();
    let first = generate(&entities, &shop_configs(), &options(OutputFormat::Csv))
        .expect("first run");
    let second = generate(&entities, &shop_configs(), &options(OutputFormat::Csv))
        .expect("second run");
    assert_eq!(first.text, second.text);
    assert_eq!(first.entities, second.entities);

    let mut configs = shop_configs();
    configs.push(EntityConfig::root("Invoice", 1));
    let err = generate(&entities, &configs, &options(OutputFormat::Csv))
        .expect_err("unknown entity");
    assert!(matches!(err, GenerationError::InvalidPlan(message) if message.contains("Invoice")));
}

use std::collections::HashSet;

use jsonschema::JSONSchema;
use serde_json::Value;

use seedsmith_core::EntityDescriptor;

use crate::errors::{PlanError, ValidationIssue, ValidationReport};
use crate::model::{EntityConfig, GenerationPlan, PLAN_VERSION};

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: GenerationPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Validate a parsed plan against analyzed entity descriptors.
pub fn validate_plan_against_entities(
    plan: &GenerationPlan,
    entities: &[EntityDescriptor],
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.plan_version != PLAN_VERSION {
        report.push_warning(ValidationIssue::new(
            "plan_version_mismatch",
            "/plan_version",
            format!(
                "plan_version '{}' differs from supported version '{PLAN_VERSION}'",
                plan.plan_version
            ),
        )
        .with_hint(format!("set plan_version to '{PLAN_VERSION}'")));
    }

    if plan.entities.is_empty() {
        report.push_error(ValidationIssue::new(
            "entities_empty",
            "/entities",
            "plan requires at least one entity",
        )
        .with_hint("add at least one entity config"));
        return report;
    }

    if plan.preview_limit == Some(0) {
        report.push_warning(ValidationIssue::new(
            "preview_limit_zero",
            "/preview_limit",
            "preview_limit of zero emits no records",
        )
        .with_hint("remove preview_limit or set a positive value"));
    }

    let selected: HashSet<String> = plan
        .entities
        .iter()
        .map(|config| config.entity.to_lowercase())
        .collect();
    let mut seen = HashSet::new();

    for (idx, config) in plan.entities.iter().enumerate() {
        let base_path = format!("/entities/{idx}");

        if !seen.insert(config.entity.to_lowercase()) {
            report.push_error(ValidationIssue::new(
                "duplicate_entity",
                base_path.clone(),
                format!("entity '{}' is configured more than once", config.entity),
            )
            .with_hint("merge duplicate configs into a single entry"));
        }

        let Some(entity) = entities
            .iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(&config.entity))
        else {
            report.push_error(ValidationIssue::new(
                "unknown_entity",
                format!("{base_path}/entity"),
                format!("entity '{}' not found in analysis", config.entity),
            ));
            continue;
        };

        validate_counts(config, &selected, &base_path, &mut report);
        validate_properties(config, entity, &base_path, &mut report);
    }

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
    entities: &[EntityDescriptor],
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = match validate_plan_json(plan_json, plan_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: GenerationPlan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                "invalid_plan_json",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    let semantic = validate_plan_against_entities(&plan, entities);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: semantic.warnings,
    })
}

fn validate_counts(
    config: &EntityConfig,
    selected: &HashSet<String>,
    base_path: &str,
    report: &mut ValidationReport,
) {
    let parent = config
        .parent_entity_name
        .as_ref()
        .filter(|parent| !parent.eq_ignore_ascii_case(&config.entity));

    match parent {
        Some(parent) if !selected.contains(&parent.to_lowercase()) => {
            report.push_warning(ValidationIssue::new(
                "unknown_parent",
                format!("{base_path}/parent_entity_name"),
                format!(
                    "parent '{}' is not configured; '{}' is generated as a root",
                    parent, config.entity
                ),
            )
            .with_hint("add the parent entity to the plan or clear parent_entity_name"));
            push_zero_record_count(config, base_path, report);
        }
        Some(_) => {
            if config.records_per_parent == 0 {
                report.push_warning(ValidationIssue::new(
                    "records_per_parent_zero",
                    format!("{base_path}/records_per_parent"),
                    format!("'{}' will generate no records", config.entity),
                )
                .with_hint("set records_per_parent to a positive integer"));
            }
        }
        None => push_zero_record_count(config, base_path, report),
    }
}

fn push_zero_record_count(config: &EntityConfig, base_path: &str, report: &mut ValidationReport) {
    if config.record_count == 0 {
        report.push_warning(ValidationIssue::new(
            "record_count_zero",
            format!("{base_path}/record_count"),
            format!("root entity '{}' will generate no records", config.entity),
        )
        .with_hint("set record_count to a positive integer"));
    }
}

fn validate_properties(
    config: &EntityConfig,
    entity: &EntityDescriptor,
    base_path: &str,
    report: &mut ValidationReport,
) {
    for (name, value) in &config.properties {
        let path = format!("{base_path}/properties/{name}");
        let Some(property) = entity.property(name) else {
            report.push_error(ValidationIssue::new(
                "unknown_property",
                path,
                format!("property '{}.{}' not found in analysis", entity.name, name),
            ));
            continue;
        };

        if !property.is_scalar() {
            report.push_warning(ValidationIssue::new(
                "navigation_override",
                path.clone(),
                format!(
                    "'{}.{}' is a navigation property and is never emitted",
                    entity.name, property.name
                ),
            ));
        }

        if value.exclude && !value.fixed_values.is_empty() {
            report.push_warning(ValidationIssue::new(
                "fixed_values_ignored",
                format!("{path}/fixed_values"),
                format!(
                    "'{}.{}' is excluded; its fixed values are ignored",
                    entity.name, property.name
                ),
            )
            .with_hint("remove exclude or the fixed values"));
        }
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedsmith_core::PropertyDescriptor;

    fn entities() -> Vec<EntityDescriptor> {
        let mut customer = EntityDescriptor::new("Customer", "Shop.Customer");
        customer
            .properties
            .push(PropertyDescriptor::new("Name", "string", "Shop.Customer"));
        let mut orders = PropertyDescriptor::new("Orders", "ICollection<Order>", "Shop.Customer");
        orders.is_collection = true;
        orders.is_navigation = true;
        customer.properties.push(orders);
        vec![customer]
    }

    #[test]
    fn reports_unknown_entities_and_properties() {
        let plan = GenerationPlan::new(vec![
            EntityConfig::root("Customer", 5).exclude("Nickname"),
            EntityConfig::root("Invoice", 5),
        ]);
        let report = validate_plan_against_entities(&plan, &entities());

        let codes: Vec<&str> = report.errors.iter().map(|issue| issue.code).collect();
        assert_eq!(codes, vec!["unknown_property", "unknown_entity"]);
        assert_eq!(report.errors[1].path, "/entities/1/entity");
    }

    #[test]
    fn zero_counts_and_unknown_parents_warn() {
        let plan = GenerationPlan::new(vec![
            EntityConfig::root("Customer", 0)
                .exclude("Orders")
                .with_fixed_values("Orders", vec![serde_json::json!(1)]),
        ]);
        let report = validate_plan_against_entities(&plan, &entities());
        assert!(report.is_ok());
        let codes: Vec<&str> = report
            .warnings
            .iter()
            .map(|issue| issue.code)
            .collect();
        assert_eq!(
            codes,
            vec!["record_count_zero", "navigation_override", "fixed_values_ignored"]
        );

        let plan = GenerationPlan::new(vec![EntityConfig::child("Customer", "Region", 2)]);
        let report = validate_plan_against_entities(&plan, &entities());
        assert_eq!(report.warnings[0].code, "unknown_parent");
    }

    #[test]
    fn duplicate_configs_are_errors() {
        let plan = GenerationPlan::new(vec![
            EntityConfig::root("Customer", 1),
            EntityConfig::root("customer", 2),
        ]);
        let report = validate_plan_against_entities(&plan, &entities());
        assert_eq!(report.errors[0].code, "duplicate_entity");
        assert_eq!(
            report.errors[0].to_string(),
            "[duplicate_entity] /entities/1: entity 'customer' is configured more than once \
             (merge duplicate configs into a single entry)"
        );
    }
}

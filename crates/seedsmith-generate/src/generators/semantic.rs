use seedsmith_core::{PropertyDescriptor, ScalarKind};

/// Value family chosen from a property's name and declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Key,
    ForeignKey,
    PersonName,
    Email,
    Date,
    Flag,
    Money,
    Enum,
    Guid,
    Integer,
    Pattern(String),
    Char,
    Text,
}

/// Pick the value family for a property.
///
/// Name-based guesses come first, then typed fallbacks, then plain text.
pub fn classify(property: &PropertyDescriptor, is_foreign: bool) -> ValueKind {
    let name = property.name.to_lowercase();
    let scalar = ScalarKind::from_type_name(&property.declared_type_name);

    if is_foreign {
        return ValueKind::ForeignKey;
    }
    if property.is_key || has_id_suffix(&property.name) {
        return ValueKind::Key;
    }
    if name.contains("name") {
        return ValueKind::PersonName;
    }
    if name.contains("email") {
        return ValueKind::Email;
    }
    if name.contains("date")
        || name.contains("time")
        || matches!(
            scalar,
            ScalarKind::DateTime | ScalarKind::Date | ScalarKind::Time
        )
    {
        return ValueKind::Date;
    }
    if name.contains("is")
        || name.contains("enabled")
        || name.contains("active")
        || scalar == ScalarKind::Bool
    {
        return ValueKind::Flag;
    }
    if name.contains("price")
        || name.contains("amount")
        || name.contains("cost")
        || scalar == ScalarKind::Decimal
    {
        return ValueKind::Money;
    }

    if property.is_enum {
        return ValueKind::Enum;
    }
    match scalar {
        ScalarKind::Guid => ValueKind::Guid,
        ScalarKind::Integer => ValueKind::Integer,
        ScalarKind::Char => ValueKind::Char,
        _ => match &property.regex_pattern {
            Some(pattern) => ValueKind::Pattern(pattern.clone()),
            None => ValueKind::Text,
        },
    }
}

fn has_id_suffix(name: &str) -> bool {
    name.eq_ignore_ascii_case("id") || name.ends_with("Id") || name.ends_with("ID")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str, type_name: &str) -> ValueKind {
        classify(&PropertyDescriptor::new(name, type_name, "Thing"), false)
    }

    #[test]
    fn names_win_over_types() {
        assert_eq!(kind("ExternalId", "string"), ValueKind::Key);
        assert_eq!(kind("IsPaid", "bool"), ValueKind::Flag);
        assert_eq!(kind("UserName", "string"), ValueKind::PersonName);
        assert_eq!(kind("Email", "string"), ValueKind::Email);
        assert_eq!(kind("Birthday", "DateOnly"), ValueKind::Date);
        assert_eq!(kind("Enabled", "string"), ValueKind::Flag);
        assert_eq!(kind("TotalCost", "int"), ValueKind::Money);
        assert_eq!(kind("Ratio", "double"), ValueKind::Money);
    }

    #[test]
    fn flag_names_match_anywhere_in_the_name() {
        assert_eq!(kind("ShowIsVisible", "string"), ValueKind::Flag);
        assert_eq!(kind("AccountActive", "string"), ValueKind::Flag);
        assert_eq!(kind("Summary", "string"), ValueKind::Text);
    }

    #[test]
    fn typed_fallbacks() {
        assert_eq!(kind("Token", "Guid"), ValueKind::Guid);
        assert_eq!(kind("Quantity", "long"), ValueKind::Integer);
        assert_eq!(kind("Grade", "char"), ValueKind::Char);
        assert_eq!(kind("Summary", "string"), ValueKind::Text);

        let mut code = PropertyDescriptor::new("Code", "string", "Thing");
        code.regex_pattern = Some("[0-9]+".to_string());
        assert_eq!(classify(&code, false), ValueKind::Pattern("[0-9]+".to_string()));

        assert_eq!(
            classify(&PropertyDescriptor::new("OwnerId", "int", "Thing"), true),
            ValueKind::ForeignKey
        );
    }
}

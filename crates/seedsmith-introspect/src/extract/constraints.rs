use seedsmith_core::{Annotation, AnnotationValue, PropertyDescriptor, find_annotation};

/// Identity and computed generation-strategy codes.
const GENERATED_CODES: &[i64] = &[1, 2];
const GENERATED_NAMES: &[&str] = &["Identity", "Computed"];

/// Copy annotation-derived constraints onto a property.
///
/// Arguments are read defensively: a missing or wrong-typed argument leaves
/// the corresponding field untouched.
pub fn apply_constraints(annotations: &[Annotation], property: &mut PropertyDescriptor) {
    for annotation in annotations {
        match annotation.simple_name() {
            name if name.eq_ignore_ascii_case("MaxLength") => {
                if let Some(length) = length_argument(annotation, 0, "Length") {
                    property.max_length = Some(length);
                }
            }
            name if name.eq_ignore_ascii_case("MinLength") => {
                if let Some(length) = length_argument(annotation, 0, "Length") {
                    property.min_length = Some(length);
                }
            }
            name if name.eq_ignore_ascii_case("StringLength") => {
                if let Some(length) = length_argument(annotation, 0, "MaximumLength") {
                    property.max_length = Some(length);
                }
                if let Some(length) = annotation
                    .named("MinimumLength")
                    .and_then(AnnotationValue::as_i64)
                    .and_then(|value| u32::try_from(value).ok())
                {
                    property.min_length = Some(length);
                }
            }
            name if name.eq_ignore_ascii_case("Range") => {
                let (min, max) = range_bounds(annotation);
                if min.is_some() {
                    property.min_value = min;
                }
                if max.is_some() {
                    property.max_value = max;
                }
            }
            name if name.eq_ignore_ascii_case("RegularExpression") => {
                if let Some(pattern) = annotation
                    .argument(0, "Pattern")
                    .and_then(AnnotationValue::as_str)
                {
                    property.regex_pattern = Some(pattern.to_string());
                }
            }
            name if name.eq_ignore_ascii_case("Column") => {
                if let Some(column) = annotation
                    .argument(0, "Name")
                    .and_then(AnnotationValue::as_str)
                    .filter(|column| !column.is_empty())
                {
                    property.column_hint = column.to_string();
                }
            }
            name if name.eq_ignore_ascii_case("DefaultValue") => {
                if let Some(value) = annotation.argument(0, "Value") {
                    property.default_value = Some(value.clone());
                }
            }
            name if name.eq_ignore_ascii_case("Required") => {
                property.is_required = true;
            }
            _ => {}
        }
    }
}

/// True when a `DatabaseGenerated` annotation selects identity or computed generation.
pub fn is_database_generated(annotations: &[Annotation]) -> bool {
    let Some(annotation) = find_annotation(annotations, "DatabaseGenerated") else {
        return false;
    };
    let Some(argument) = annotation.argument(0, "DatabaseGeneratedOption") else {
        return false;
    };
    if let Some(code) = argument.as_i64() {
        return GENERATED_CODES.contains(&code);
    }
    argument
        .as_enum_member()
        .is_some_and(|member| GENERATED_NAMES.contains(&member))
}

fn length_argument(annotation: &Annotation, index: usize, key: &str) -> Option<u32> {
    annotation
        .argument(index, key)
        .and_then(AnnotationValue::as_i64)
        .and_then(|value| u32::try_from(value).ok())
}

/// Accepts `Range(min, max)`, `Range(Minimum = .., Maximum = ..)` and the
/// typed form `Range(typeof(decimal), "1", "100")`.
fn range_bounds(annotation: &Annotation) -> (Option<f64>, Option<f64>) {
    let typed = annotation.positional.len() == 3
        && matches!(annotation.positional(0), Some(AnnotationValue::Text(_)));
    let (min_index, max_index) = if typed { (1, 2) } else { (0, 1) };

    let bound = |index: usize, key: &str| {
        annotation
            .argument(index, key)
            .and_then(|value| match value {
                AnnotationValue::Text(text) => text.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            })
            .filter(|value| value.is_finite())
    };

    (bound(min_index, "Minimum"), bound(max_index, "Maximum"))
}

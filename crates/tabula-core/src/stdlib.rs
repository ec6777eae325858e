//! The standard library of traits, predicates and properties.
//!
//! # Traits
//!
//! - `Date` - epoch milliseconds, a subtype of `unknown`
//! - `URL`, `Email`, `Phone` - subtypes of `string`
//!
//! # Predicates
//!
//! - `Is empty` / `Is not empty` on any value
//! - `Is`, `Is not`, `Contains`, `Does not contain`, `Starts with`,
//!   `Ends with`, `Matches` and `Characters less than` on strings
//! - `>`, `>=`, `<`, `<=`, `==`, `!=` on numbers
//! - `Is`, `Is before`, `Is after` on dates
//! - `Is inside` and `Includes` between a value and a list of its type
//!
//! # Properties
//!
//! - `Length` of a string, `Count` of a list
//! - `Year`, `Month`, `Day of month`, `Day of week` of a date (UTC)
//!
//! Implementations never fail on a value of the wrong runtime shape: a
//! predicate answers `false` and a property answers `0`.

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use tabula_types::{FunctionType, TType, TypeVar};

use crate::eval::{EvalError, Value};
use crate::typesystem::{FunctionDef, TypeError, Typesystem};

/// The traits registered by [`install`].
#[derive(Debug, Clone)]
pub struct StandardTraits {
    pub date: TType,
    pub url: TType,
    pub email: TType,
    pub phone: TType,
}

/// Register the standard traits, predicates and properties.
pub fn install(typesystem: &mut Typesystem) -> Result<StandardTraits, TypeError> {
    let traits = StandardTraits {
        date: typesystem.register_trait("Date", vec![TType::Unknown])?,
        url: typesystem.register_trait("URL", vec![TType::String, TType::Unknown])?,
        email: typesystem.register_trait("Email", vec![TType::String, TType::Unknown])?,
        phone: typesystem.register_trait("Phone", vec![TType::String, TType::Unknown])?,
    };
    for def in predicates(&traits) {
        typesystem.register_function(def)?;
    }
    for def in properties(&traits) {
        typesystem.register_property(def)?;
    }
    tracing::debug!(
        functions = typesystem.functions().len(),
        properties = typesystem.properties().len(),
        "installed standard library"
    );
    Ok(traits)
}

// ==================== Helpers ====================

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Null)
}

fn binary(left: TType, right: TType) -> FunctionType {
    FunctionType::new(vec![left, right], TType::Boolean)
}

/// A predicate over two strings; any other shape is `false`.
fn on_strings(
    test: fn(&str, &str) -> bool,
) -> impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static {
    move |args: &[Value]| {
        let result = match (arg(args, 0).as_str(), arg(args, 1).as_str()) {
            (Some(value), Some(target)) => test(value, target),
            _ => false,
        };
        Ok(Value::Bool(result))
    }
}

/// A predicate over two numbers; any other shape is `false`.
fn on_numbers(
    test: fn(f64, f64) -> bool,
) -> impl Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static {
    move |args: &[Value]| {
        let result = match (arg(args, 0).as_number(), arg(args, 1).as_number()) {
            (Some(value), Some(target)) => test(value, target),
            _ => false,
        };
        Ok(Value::Bool(result))
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        _ => false,
    }
}

fn to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let millis = value.as_number()?;
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

fn contains(list: &Value, item: &Value) -> bool {
    list.as_list().is_some_and(|items| items.contains(item))
}

// ==================== Predicates ====================

/// Date `Is`: both dates fall on the same UTC calendar day.
///
/// The time of day is ignored, so `Is` holds for 09:00 and 17:30 of one day
/// even though the stored millisecond values differ. Use `Is before` and
/// `Is after` for exact comparisons.
fn same_day(args: &[Value]) -> Result<Value, EvalError> {
    let result = match (to_datetime(arg(args, 0)), to_datetime(arg(args, 1))) {
        (Some(value), Some(target)) => value.date_naive() == target.date_naive(),
        _ => false,
    };
    Ok(Value::Bool(result))
}

fn predicates(traits: &StandardTraits) -> Vec<FunctionDef> {
    let date = &traits.date;
    let t = || TType::type_ref("T");
    let generic = || vec![TypeVar::new("T", TType::Unknown)];
    let numbers = || binary(TType::Number, TType::Number);

    vec![
        // Is empty: (unknown) -> boolean
        FunctionDef::function(
            "Is empty",
            FunctionType::new(vec![TType::Unknown], TType::Boolean),
            |args| Ok(Value::Bool(is_empty(arg(args, 0)))),
        ),
        FunctionDef::function(
            "Is not empty",
            FunctionType::new(vec![TType::Unknown], TType::Boolean),
            |args| Ok(Value::Bool(!is_empty(arg(args, 0)))),
        ),
        // String predicates: (string, string) -> boolean
        FunctionDef::function(
            "Is",
            binary(TType::String, TType::String),
            on_strings(|value, target| value == target),
        ),
        FunctionDef::function(
            "Is not",
            binary(TType::String, TType::String),
            on_strings(|value, target| value != target),
        ),
        FunctionDef::function(
            "Contains",
            binary(TType::String, TType::String),
            on_strings(|value, target| value.contains(target)),
        ),
        FunctionDef::function(
            "Does not contain",
            binary(TType::String, TType::String),
            on_strings(|value, target| !value.contains(target)),
        ),
        FunctionDef::function(
            "Starts with",
            binary(TType::String, TType::String),
            on_strings(|value, target| value.starts_with(target)),
        ),
        FunctionDef::function(
            "Ends with",
            binary(TType::String, TType::String),
            on_strings(|value, target| value.ends_with(target)),
        ),
        // Matches: an invalid pattern is an error, not a mismatch
        FunctionDef::function("Matches", binary(TType::String, TType::String), |args| {
            let (Some(value), Some(pattern)) = (arg(args, 0).as_str(), arg(args, 1).as_str())
            else {
                return Ok(Value::Bool(false));
            };
            let re = Regex::new(pattern)
                .map_err(|e| EvalError::invalid_argument(format!("invalid pattern: {}", e)))?;
            Ok(Value::Bool(re.is_match(value)))
        }),
        // Characters less than: (string, number) -> boolean
        FunctionDef::function(
            "Characters less than",
            binary(TType::String, TType::Number),
            |args| {
                let result = match (arg(args, 0).as_str(), arg(args, 1).as_number()) {
                    (Some(value), Some(limit)) => (value.chars().count() as f64) < limit,
                    _ => false,
                };
                Ok(Value::Bool(result))
            },
        ),
        // Number comparisons: (number, number) -> boolean
        FunctionDef::function(">", numbers(), on_numbers(|a, b| a > b)),
        FunctionDef::function(">=", numbers(), on_numbers(|a, b| a >= b)),
        FunctionDef::function("<", numbers(), on_numbers(|a, b| a < b)),
        FunctionDef::function("<=", numbers(), on_numbers(|a, b| a <= b)),
        FunctionDef::function("==", numbers(), on_numbers(|a, b| a == b)),
        FunctionDef::function("!=", numbers(), on_numbers(|a, b| a != b)),
        // Date predicates: (Date, Date) -> boolean
        FunctionDef::function("Is", binary(date.clone(), date.clone()), same_day),
        FunctionDef::function(
            "Is before",
            binary(date.clone(), date.clone()),
            on_numbers(|a, b| a < b),
        ),
        FunctionDef::function(
            "Is after",
            binary(date.clone(), date.clone()),
            on_numbers(|a, b| a > b),
        ),
        // Is inside: <T>(T, Array<T>) -> boolean
        FunctionDef::function(
            "Is inside",
            FunctionType::new(vec![t(), TType::array(t())], TType::Boolean)
                .with_type_vars(generic()),
            |args| Ok(Value::Bool(contains(arg(args, 1), arg(args, 0)))),
        ),
        // Includes: <T>(Array<T>, T) -> boolean
        FunctionDef::function(
            "Includes",
            FunctionType::new(vec![TType::array(t()), t()], TType::Boolean)
                .with_type_vars(generic()),
            |args| Ok(Value::Bool(contains(arg(args, 0), arg(args, 1)))),
        ),
    ]
}

// ==================== Properties ====================

fn date_part(
    part: fn(&DateTime<Utc>) -> u32,
) -> impl Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static {
    move |value: &Value| Ok(Value::from(to_datetime(value).map_or(0.0, |dt| f64::from(part(&dt)))))
}

fn properties(traits: &StandardTraits) -> Vec<FunctionDef> {
    let date = &traits.date;
    vec![
        FunctionDef::property("Length", TType::String, TType::Number, |value| {
            Ok(Value::from(value.as_str().map_or(0, |s| s.chars().count())))
        }),
        FunctionDef::property(
            "Count",
            TType::array(TType::Unknown),
            TType::Number,
            |value| Ok(Value::from(value.as_list().map_or(0, <[Value]>::len))),
        ),
        FunctionDef::property("Year", date.clone(), TType::Number, |value| {
            Ok(Value::from(to_datetime(value).map_or(0, |dt| i64::from(dt.year()))))
        }),
        // Month: 1 to 12
        FunctionDef::property("Month", date.clone(), TType::Number, date_part(|dt| dt.month())),
        FunctionDef::property(
            "Day of month",
            date.clone(),
            TType::Number,
            date_part(|dt| dt.day()),
        ),
        // Day of week: 0 is Sunday
        FunctionDef::property(
            "Day of week",
            date.clone(),
            TType::Number,
            date_part(|dt| dt.weekday().num_days_from_sunday()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    // 2024-03-15T12:00:00Z, a Friday
    const MARCH_15: f64 = 1_710_504_000_000.0;

    fn installed() -> (Typesystem, StandardTraits) {
        let mut ts = Typesystem::new();
        let traits = install(&mut ts).unwrap();
        (ts, traits)
    }

    fn call(ts: &Typesystem, id: &str, args: &[Value]) -> Result<Value, EvalError> {
        ts.function(id)
            .unwrap_or_else(|| panic!("missing function {}", id))
            .call(args)
    }

    fn holds(ts: &Typesystem, id: &str, args: &[Value]) -> bool {
        call(ts, id, args) == Ok(Value::Bool(true))
    }

    fn prop(ts: &Typesystem, name: &str, value: Value) -> Value {
        ts.property(name).unwrap().call(&[value]).unwrap()
    }

    #[test]
    fn test_install_twice_fails() {
        let (mut ts, _) = installed();
        assert!(matches!(install(&mut ts), Err(TypeError::DuplicateTrait { .. })));
    }

    #[test]
    fn test_ids() {
        let (ts, _) = installed();
        for id in [
            "is_empty_unknown",
            "is_string_string",
            "is_date_date",
            "does_not_contain_string_string",
            "characters_less_than_string_number",
            "gt_eq_number_number",
            "not_eq_number_number",
            "is_before_date_date",
            "is_inside_unknown_array_unknown",
            "includes_array_unknown_unknown",
        ] {
            assert!(ts.function(id).is_some(), "missing {}", id);
        }
        assert_eq!(ts.functions_named("Is").count(), 2);
    }

    #[test]
    fn test_emptiness() {
        let (ts, _) = installed();
        assert!(holds(&ts, "is_empty_unknown", &[Value::Null]));
        assert!(holds(&ts, "is_empty_unknown", &[Value::from("")]));
        assert!(holds(&ts, "is_empty_unknown", &[Value::from(Vec::<Value>::new())]));
        assert!(!holds(&ts, "is_empty_unknown", &[Value::from(0)]));
        assert!(holds(&ts, "is_not_empty_unknown", &[Value::from("x")]));
        assert!(!holds(&ts, "is_not_empty_unknown", &[Value::Null]));
    }

    #[test]
    fn test_string_predicates() {
        let (ts, _) = installed();
        let s = |v: &str| Value::from(v);
        assert!(holds(&ts, "contains_string_string", &[s("hello"), s("ell")]));
        assert!(!holds(&ts, "does_not_contain_string_string", &[s("hello"), s("ell")]));
        assert!(holds(&ts, "starts_with_string_string", &[s("hello"), s("he")]));
        assert!(holds(&ts, "ends_with_string_string", &[s("hello"), s("lo")]));
        assert!(holds(&ts, "is_not_string_string", &[s("a"), s("b")]));
        assert!(holds(
            &ts,
            "characters_less_than_string_number",
            &[s("héllo"), Value::from(6)]
        ));
    }

    #[test]
    fn test_wrong_shape_is_false() {
        let (ts, _) = installed();
        assert!(!holds(&ts, "is_string_string", &[Value::from(3), Value::from("3")]));
        assert!(!holds(&ts, "gt_number_number", &[Value::from("9"), Value::from(1)]));
        assert_eq!(call(&ts, "gt_number_number", &[]), Ok(Value::Bool(false)));

        let mut entries = BTreeMap::new();
        entries.insert("k".to_string(), Value::from(1));
        let map = Value::from(entries);
        assert!(!holds(&ts, "is_empty_unknown", &[map.clone()]));
        assert!(!holds(&ts, "is_string_string", &[map.clone(), Value::from("k")]));
        assert!(!holds(&ts, "contains_string_string", &[map.clone(), Value::from("k")]));
        assert!(!holds(&ts, "includes_array_unknown_unknown", &[map.clone(), Value::from(1)]));
        assert_eq!(prop(&ts, "Count", map), Value::from(0));
    }

    #[test]
    fn test_matches() {
        let (ts, _) = installed();
        let pattern = Value::from(r"^\w+\d+$");
        assert!(holds(&ts, "matches_string_string", &[Value::from("abc123"), pattern]));

        let err = call(&ts, "matches_string_string", &[Value::from("a"), Value::from("(")])
            .unwrap_err();
        assert_eq!(err.kind, crate::eval::EvalErrorKind::InvalidArgument);
    }

    #[test]
    fn test_numbers() {
        let (ts, _) = installed();
        let n = |v: i32| Value::from(v);
        assert!(holds(&ts, "gt_number_number", &[n(3), n(2)]));
        assert!(holds(&ts, "gt_eq_number_number", &[n(2), n(2)]));
        assert!(!holds(&ts, "lt_number_number", &[n(2), n(2)]));
        assert!(holds(&ts, "lt_eq_number_number", &[n(2), n(2)]));
        assert!(holds(&ts, "eq_eq_number_number", &[n(2), n(2)]));
        assert!(!holds(&ts, "not_eq_number_number", &[n(2), n(2)]));
    }

    #[test]
    fn test_dates() {
        let (ts, _) = installed();
        let day = Value::from(MARCH_15);
        let later_that_day = Value::from(MARCH_15 + 3_600_000.0);
        let next_day = Value::from(MARCH_15 + 86_400_000.0);
        let pair = [day.clone(), later_that_day];
        assert!(holds(&ts, "is_date_date", &pair));
        assert!(holds(&ts, "is_before_date_date", &pair));
        assert!(!holds(&ts, "is_after_date_date", &pair));
        assert!(!holds(&ts, "is_date_date", &[day, next_day]));
    }

    #[test]
    fn test_membership() {
        let (ts, _) = installed();
        let options = Value::from(vec![Value::from("A"), Value::from("B")]);
        let is_inside = "is_inside_unknown_array_unknown";
        let includes = "includes_array_unknown_unknown";
        assert!(holds(&ts, is_inside, &[Value::from("B"), options.clone()]));
        assert!(!holds(&ts, includes, &[options, Value::from("C")]));
        assert!(!holds(&ts, includes, &[Value::from("A"), Value::from("A")]));
    }

    #[test]
    fn test_properties() {
        let (ts, _) = installed();
        assert_eq!(prop(&ts, "Length", Value::from("héllo")), Value::from(5));
        assert_eq!(prop(&ts, "Length", Value::from(12)), Value::from(0));
        assert_eq!(
            prop(&ts, "Count", Value::from(vec![Value::from(1), Value::from(2)])),
            Value::from(2)
        );
        assert_eq!(prop(&ts, "Year", Value::from(MARCH_15)), Value::from(2024));
        assert_eq!(prop(&ts, "Month", Value::from(MARCH_15)), Value::from(3));
        assert_eq!(prop(&ts, "Day of month", Value::from(MARCH_15)), Value::from(15));
        assert_eq!(prop(&ts, "Day of week", Value::from(MARCH_15)), Value::from(5));
        assert_eq!(prop(&ts, "Year", Value::from("soon")), Value::from(0));
    }

    #[test]
    fn test_properties_by_type() {
        let (ts, traits) = installed();
        let names = |ty: &TType| -> Vec<String> {
            ts.get_properties(ty).iter().map(|p| p.name().to_string()).collect()
        };
        assert_eq!(names(&traits.url), vec!["Length"]);
        assert_eq!(names(&traits.date), vec!["Year", "Month", "Day of month", "Day of week"]);
        assert_eq!(names(&TType::array(TType::String)), vec!["Count"]);
    }
}

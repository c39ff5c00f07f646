use crate::{
    model::{ColumnType, EntityModel},
    query::{QueryError, filter::Argument},
    value::Value,
};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

///
/// Type-directed value coercion
///
/// Raw wire values are coerced against the declared type of the field
/// they compare to. Only temporal columns have coercion rules; every
/// other declared type passes through and is judged by the data layer.
/// Fields that cannot be typed here (unknown names, relation-qualified
/// paths) also pass through; compilation resolves and re-coerces them
/// once the owning entity is known.
///

/// Marker strings that coerce to the server clock instead of parsing.
pub const CURRENT_TIME_MARKERS: &[&str] =
    &["CURRENT_TIMESTAMP", "CURRENT_DATE", "LOCALTIMESTAMP"];

/// Coerce one raw wire argument for a comparison against `field`.
///
/// JSON null (or an absent value) yields `None`, which downstream arity
/// checks turn into `ComparisonToNull` or `ArityMismatch`. JSON objects
/// are kept raw: they are `has`/`any` sub-filters, parsed later against
/// the related entity.
pub fn coerce_argument(
    entity: &EntityModel,
    field: &str,
    raw: &serde_json::Value,
) -> Result<Option<Argument>, QueryError> {
    let argument = match raw {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Object(_) => Argument::Nested(raw.clone()),
        serde_json::Value::Array(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(coerce_value(entity, field, Value::from_json(item))?);
            }
            Argument::List(values)
        }
        _ => Argument::Value(coerce_value(entity, field, Value::from_json(raw))?),
    };

    Ok(Some(argument))
}

/// Coerce an already-converted runtime value against `field`'s declared
/// type. Values for untypeable fields pass through unchanged.
pub fn coerce_value(entity: &EntityModel, field: &str, value: Value) -> Result<Value, QueryError> {
    let Some(column_type) = column_type_of(entity, field) else {
        return Ok(value);
    };

    match column_type {
        ColumnType::Date | ColumnType::Time | ColumnType::DateTime => {
            coerce_temporal(column_type, field, value)
        }
        ColumnType::Duration => Ok(coerce_duration(value)),
        _ => Ok(value),
    }
}

// Relation-qualified paths carry no type information on this entity.
fn column_type_of(entity: &EntityModel, field: &str) -> Option<ColumnType> {
    if field.contains("__") {
        return None;
    }

    entity.field(field)?.column_type()
}

fn coerce_temporal(target: ColumnType, field: &str, value: Value) -> Result<Value, QueryError> {
    let Value::Text(text) = value else {
        // Non-string inputs for temporal columns are the data layer's
        // problem; coercion is only defined over strings.
        return Ok(value);
    };

    let trimmed = text.trim();

    // An empty string carries no temporal information.
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    if CURRENT_TIME_MARKERS.contains(&trimmed) {
        return Ok(now_for(target));
    }

    let Some(parsed) = parse_temporal(trimmed) else {
        return Err(parse_error(target, field, &text));
    };

    // Truncate toward the declared type: a datetime supplied for a date
    // column keeps its date component, and so on.
    let coerced = match (target, parsed) {
        (ColumnType::Date, Temporal::Date(d)) => Value::Date(d),
        (ColumnType::Date, Temporal::DateTime(dt)) => Value::Date(dt.date()),
        (ColumnType::Time, Temporal::Time(t)) => Value::Time(t),
        (ColumnType::Time, Temporal::DateTime(dt)) => Value::Time(dt.time()),
        (ColumnType::DateTime, Temporal::DateTime(dt)) => Value::DateTime(dt),
        (ColumnType::DateTime, Temporal::Date(d)) => Value::DateTime(d.and_time(NaiveTime::MIN)),
        (ColumnType::DateTime, Temporal::Time(t)) => {
            Value::DateTime(Local::now().date_naive().and_time(t))
        }
        _ => return Err(parse_error(target, field, &text)),
    };

    Ok(coerced)
}

// An integer count of whole seconds; anything else passes through.
fn coerce_duration(value: Value) -> Value {
    match value {
        Value::Int(seconds) => Value::Duration(TimeDelta::seconds(seconds)),
        other => other,
    }
}

fn now_for(target: ColumnType) -> Value {
    let now = Local::now().naive_local();

    match target {
        ColumnType::Date => Value::Date(now.date()),
        ColumnType::Time => Value::Time(now.time()),
        _ => Value::DateTime(now),
    }
}

fn parse_error(target: ColumnType, field: &str, value: &str) -> QueryError {
    let target = match target {
        ColumnType::Date => "date",
        ColumnType::Time => "time",
        _ => "datetime",
    };

    QueryError::DateTimeParse {
        field: field.to_string(),
        value: value.to_string(),
        target,
    }
}

///
/// Temporal
/// What a temporal string parsed into, before type-directed truncation.
///

enum Temporal {
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d %b %Y %H:%M:%S",
    "%d %B %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Permissive temporal parse: an ordered ladder of ISO forms, then
/// English date forms with ordinal day suffixes stripped.
fn parse_temporal(input: &str) -> Option<Temporal> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(Temporal::DateTime(dt.naive_utc()));
    }

    let normalized = strip_ordinal_suffixes(input);

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Some(Temporal::DateTime(dt));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&normalized, format) {
            return Some(Temporal::Date(d));
        }
    }
    for format in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(&normalized, format) {
            return Some(Temporal::Time(t));
        }
    }

    None
}

// "2nd Jan 1900" becomes "2 Jan 1900"; trailing punctuation on the day
// token is preserved so comma forms still parse.
fn strip_ordinal_suffixes(input: &str) -> String {
    input
        .split_whitespace()
        .map(strip_ordinal_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_ordinal_token(token: &str) -> String {
    let (body, tail) = match token.strip_suffix(',') {
        Some(body) => (body, ","),
        None => (token, ""),
    };

    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(digits) = body.strip_suffix(suffix) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return format!("{digits}{tail}");
            }
        }
    }

    token.to_string()
}

#[cfg(test)]
mod tests {
    use super::{coerce_value, parse_temporal, strip_ordinal_suffixes};
    use crate::{query::QueryError, test_fixtures, value::Value};
    use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

    fn person() -> &'static crate::model::EntityModel {
        test_fixtures::registry().entity("person").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_date_coerces_to_calendar_date() {
        let value = coerce_value(person(), "birth_date", Value::Text("1900-01-02".into())).unwrap();

        assert_eq!(value, Value::Date(date(1900, 1, 2)));
    }

    #[test]
    fn english_date_coerces_to_the_same_date() {
        let value = coerce_value(person(), "birth_date", Value::Text("2nd Jan 1900".into())).unwrap();

        assert_eq!(value, Value::Date(date(1900, 1, 2)));
    }

    #[test]
    fn datetime_string_truncates_to_date_column() {
        let value = coerce_value(
            person(),
            "birth_date",
            Value::Text("1900-01-02T10:20:30".into()),
        )
        .unwrap();

        assert_eq!(value, Value::Date(date(1900, 1, 2)));
    }

    #[test]
    fn empty_string_coerces_to_null() {
        let value = coerce_value(person(), "birth_date", Value::Text("   ".into())).unwrap();

        assert_eq!(value, Value::Null);
    }

    #[test]
    fn current_timestamp_marker_is_close_to_now() {
        let computer = test_fixtures::registry().entity("computer").unwrap();
        let value =
            coerce_value(computer, "buy_date", Value::Text("CURRENT_TIMESTAMP".into())).unwrap();

        let Value::DateTime(dt) = value else {
            panic!("expected a datetime, got {value:?}");
        };
        let delta = Local::now().naive_local() - dt;
        assert!(delta.num_seconds().abs() < 5);
    }

    #[test]
    fn unparseable_date_is_an_error() {
        let err =
            coerce_value(person(), "birth_date", Value::Text("not a date".into())).unwrap_err();

        assert!(matches!(err, QueryError::DateTimeParse { .. }));
    }

    #[test]
    fn duration_accepts_whole_seconds() {
        let event = test_fixtures::registry().entity("satellite").unwrap();
        let value = coerce_value(event, "period", Value::Int(300)).unwrap();

        assert_eq!(value, Value::Duration(chrono::TimeDelta::seconds(300)));
    }

    #[test]
    fn non_temporal_fields_pass_through() {
        let value = coerce_value(person(), "name", Value::Text("1900-01-02".into())).unwrap();

        assert_eq!(value, Value::Text("1900-01-02".into()));
    }

    #[test]
    fn ordinal_suffixes_strip_only_day_tokens() {
        assert_eq!(strip_ordinal_suffixes("2nd Jan 1900"), "2 Jan 1900");
        assert_eq!(strip_ordinal_suffixes("21st March, 2020"), "21 March, 2020");
        assert_eq!(strip_ordinal_suffixes("north"), "north");
    }

    #[test]
    fn time_strings_parse_with_and_without_seconds() {
        assert!(matches!(
            parse_temporal("10:30:15"),
            Some(super::Temporal::Time(t)) if t == NaiveTime::from_hms_opt(10, 30, 15).unwrap()
        ));
        assert!(matches!(
            parse_temporal("1900-01-02 10:20:30"),
            Some(super::Temporal::DateTime(dt))
                if dt == NaiveDateTime::parse_from_str("1900-01-02 10:20:30", "%Y-%m-%d %H:%M:%S").unwrap()
        ));
    }
}

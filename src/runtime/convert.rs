//! Host <-> wire conversions used by generated statement builders and row parsers.
//!
//! Every `*_to_wire` function has a `*_from_wire` inverse. Arrays and nullable
//! values are handled by the `array_*` and `nullable_*` combinators, which take
//! the scalar conversion as a closure.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{Error, WireValue};

/// Numeric <-> symbolic conversion implemented by generated enums.
pub trait WireEnum: Sized {
    fn to_number(&self) -> i32;
    fn from_number(number: i32) -> Option<Self>;
}

/// Serialize/deserialize pair implemented by generated messages.
pub trait WireMessage: Sized {
    fn serialize(&self) -> Vec<u8>;
    fn deserialize(bytes: &[u8]) -> Result<Self, Error>;
}

fn mismatch(expected: &'static str, value: &WireValue) -> Error {
    Error::Conversion {
        message: format!("expected {}, got {}", expected, value.kind()),
    }
}

pub fn bool_to_wire(value: &bool) -> WireValue {
    WireValue::Bool(*value)
}

pub fn bool_from_wire(value: &WireValue) -> Result<bool, Error> {
    match value {
        WireValue::Bool(b) => Ok(*b),
        other => Err(mismatch("bool", other)),
    }
}

pub fn int_to_wire(value: &i64) -> WireValue {
    WireValue::Int(*value)
}

pub fn int_from_wire(value: &WireValue) -> Result<i64, Error> {
    match value {
        WireValue::Int(i) => Ok(*i),
        // INT64 cells are commonly delivered as decimal strings.
        WireValue::String(s) => s.parse().map_err(|_| Error::Conversion {
            message: format!("invalid int64 {:?}", s),
        }),
        other => Err(mismatch("int", other)),
    }
}

pub fn float_to_wire(value: &f64) -> WireValue {
    WireValue::Float(*value)
}

pub fn float_from_wire(value: &WireValue) -> Result<f64, Error> {
    match value {
        WireValue::Float(f) => Ok(*f),
        WireValue::Int(i) => Ok(*i as f64),
        other => Err(mismatch("float", other)),
    }
}

pub fn timestamp_to_wire(value: &DateTime<Utc>) -> WireValue {
    WireValue::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn timestamp_from_wire(value: &WireValue) -> Result<DateTime<Utc>, Error> {
    match value {
        WireValue::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::Conversion {
                message: format!("invalid timestamp {:?}: {}", s, e),
            }),
        other => Err(mismatch("timestamp string", other)),
    }
}

pub fn string_to_wire(value: &str) -> WireValue {
    WireValue::String(value.to_string())
}

pub fn string_from_wire(value: &WireValue) -> Result<String, Error> {
    match value {
        WireValue::String(s) => Ok(s.clone()),
        other => Err(mismatch("string", other)),
    }
}

pub fn enum_to_wire<E: WireEnum>(value: &E) -> WireValue {
    WireValue::Float(f64::from(value.to_number()))
}

pub fn enum_from_wire<E: WireEnum>(value: &WireValue) -> Result<E, Error> {
    let number = float_from_wire(value)?;
    if number.fract() != 0.0 || number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
        return Err(Error::Conversion {
            message: format!("{} is not an enum number", number),
        });
    }
    E::from_number(number as i32).ok_or_else(|| Error::Conversion {
        message: format!("{} is not a known enum value", number),
    })
}

pub fn message_to_wire<M: WireMessage>(value: &M) -> WireValue {
    WireValue::Bytes(value.serialize())
}

pub fn message_from_wire<M: WireMessage>(value: &WireValue) -> Result<M, Error> {
    match value {
        WireValue::Bytes(bytes) => M::deserialize(bytes),
        other => Err(mismatch("bytes", other)),
    }
}

pub fn array_to_wire<T>(values: &[T], to_wire: impl Fn(&T) -> WireValue) -> WireValue {
    WireValue::Array(values.iter().map(to_wire).collect())
}

pub fn array_from_wire<T>(
    value: &WireValue,
    from_wire: impl Fn(&WireValue) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    match value {
        WireValue::Array(values) => values.iter().map(from_wire).collect(),
        other => Err(mismatch("array", other)),
    }
}

pub fn nullable_to_wire<T: ?Sized>(
    value: Option<&T>,
    to_wire: impl FnOnce(&T) -> WireValue,
) -> WireValue {
    match value {
        Some(v) => to_wire(v),
        None => WireValue::Null,
    }
}

pub fn nullable_from_wire<T>(
    value: &WireValue,
    from_wire: impl FnOnce(&WireValue) -> Result<T, Error>,
) -> Result<Option<T>, Error> {
    match value {
        WireValue::Null => Ok(None),
        other => from_wire(other).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Color {
        Red = 1,
        Blue = 2,
    }

    impl WireEnum for Color {
        fn to_number(&self) -> i32 {
            *self as i32
        }

        fn from_number(number: i32) -> Option<Self> {
            match number {
                1 => Some(Color::Red),
                2 => Some(Color::Blue),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        text: String,
    }

    impl WireMessage for Note {
        fn serialize(&self) -> Vec<u8> {
            self.text.as_bytes().to_vec()
        }

        fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
            String::from_utf8(bytes.to_vec())
                .map(|text| Note { text })
                .map_err(|e| Error::Conversion {
                    message: e.to_string(),
                })
        }
    }

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 17, 45, 2).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[rstest]
    fn test_timestamp_marshals_as_rfc3339() {
        assert_eq!(
            timestamp_to_wire(&sample_time()),
            WireValue::String("2024-03-09T17:45:02.123Z".to_string())
        );
    }

    #[rstest]
    fn test_enum_round_trip() {
        let wire = enum_to_wire(&Color::Blue);
        assert_eq!(wire, WireValue::Float(2.0));
        let back: Color = enum_from_wire(&wire).unwrap();
        assert_eq!(back, Color::Blue);
    }

    #[rstest]
    #[case(WireValue::Float(7.0))]
    #[case(WireValue::Float(1.5))]
    #[case(WireValue::String("1".to_string()))]
    fn test_enum_from_wire_rejects(#[case] wire: WireValue) {
        assert!(enum_from_wire::<Color>(&wire).is_err());
    }

    #[rstest]
    fn test_message_round_trip() {
        let note = Note {
            text: "fragile".to_string(),
        };
        let wire = message_to_wire(&note);
        assert_eq!(wire, WireValue::Bytes(b"fragile".to_vec()));
        let back: Note = message_from_wire(&wire).unwrap();
        assert_eq!(back, note);
    }

    #[rstest]
    fn test_array_of_enums_round_trip() {
        let colors = vec![Color::Red, Color::Blue, Color::Red];
        let wire = array_to_wire(&colors, |v| enum_to_wire(v));
        let back: Vec<Color> = array_from_wire(&wire, |v| enum_from_wire(v)).unwrap();
        assert_eq!(back, colors);
    }

    #[rstest]
    fn test_nullable_array_of_messages_round_trip() {
        let notes = Some(vec![
            Note {
                text: "a".to_string(),
            },
            Note {
                text: "b".to_string(),
            },
        ]);
        let wire = nullable_to_wire(notes.as_ref(), |v| array_to_wire(v, |v| message_to_wire(v)));
        let back: Option<Vec<Note>> =
            nullable_from_wire(&wire, |v| array_from_wire(v, |v| message_from_wire(v))).unwrap();
        assert_eq!(back, notes);

        let none: Option<Vec<Note>> = None;
        let wire = nullable_to_wire(none.as_ref(), |v| array_to_wire(v, |v| message_to_wire(v)));
        assert_eq!(wire, WireValue::Null);
        let back: Option<Vec<Note>> =
            nullable_from_wire(&wire, |v| array_from_wire(v, |v| message_from_wire(v))).unwrap();
        assert_eq!(back, None);
    }

    #[rstest]
    fn test_nullable_timestamp_round_trip() {
        let value = Some(sample_time());
        let wire = nullable_to_wire(value.as_ref(), |v| timestamp_to_wire(v));
        let back = nullable_from_wire(&wire, |v| timestamp_from_wire(v)).unwrap();
        assert_eq!(back, value);
    }

    #[rstest]
    fn test_scalar_round_trips() {
        assert!(bool_from_wire(&bool_to_wire(&true)).unwrap());
        assert_eq!(int_from_wire(&int_to_wire(&-42)).unwrap(), -42);
        assert_eq!(float_from_wire(&float_to_wire(&2.5)).unwrap(), 2.5);
        assert_eq!(string_from_wire(&string_to_wire("hi")).unwrap(), "hi");
    }

    #[rstest]
    fn test_int_accepts_decimal_string() {
        assert_eq!(
            int_from_wire(&WireValue::String("9007199254740993".to_string())).unwrap(),
            9_007_199_254_740_993
        );
    }

    #[rstest]
    fn test_type_mismatch_message() {
        let err = string_from_wire(&WireValue::Int(3)).unwrap_err();
        assert_eq!(err.to_string(), "Conversion failed: expected string, got int");
    }
}

use std::panic::{AssertUnwindSafe, catch_unwind};

use crossing::{Any, AnyCodec, Array, Error, Expected, Function, error::kinds, ffi_error};

fn safe_divide(a: i64, b: i64) -> Expected<i64> {
    if b == 0 {
        return Expected::failure(Error::new(kinds::VALUE_ERROR, "Division by zero"));
    }
    Expected::success(a / b)
}

fn parse_csv(input: String) -> Expected<Array<String>> {
    if input.is_empty() {
        return Expected::failure(Error::new(kinds::VALUE_ERROR, "Empty input"));
    }
    Expected::success(input.split(',').map(str::to_string).collect())
}

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("invalid value for `{key}`: {value}")]
    Invalid { key: String, value: String },
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        let kind = match error {
            ConfigError::MissingKey(_) => kinds::KEY_ERROR,
            ConfigError::Invalid { .. } => kinds::VALUE_ERROR,
        };
        Error::new(kind, error.to_string())
    }
}

// Construction and access

#[test]
fn test_basic_success() {
    let result = Expected::success(42_i64);
    assert!(result.is_success());
    assert!(!result.is_failure());
    assert!(result.has_value());
    assert_eq!(result.value(), 42);
    assert_eq!(result.value_or(0), 42);
}

#[test]
fn test_basic_failure() {
    let result = Expected::<i64>::failure(Error::new(kinds::RUNTIME_ERROR, "test error"));
    assert!(!result.is_success());
    assert!(result.is_failure());
    assert!(!result.has_value());

    let error = result.error();
    assert_eq!(error.kind(), "RuntimeError");
    assert_eq!(error.message(), "test error");
    assert_eq!(result.value_or(99), 99);
}

#[test]
fn test_string_payloads_move_out() {
    let result = Expected::success(String::from("test"));
    let value: String = result.unwrap();
    assert_eq!(value, "test");

    let failed = Expected::<String>::failure(Error::new(kinds::VALUE_ERROR, "bad string"));
    assert!(failed.is_failure());
    assert_eq!(failed.unwrap_or(String::from("default")), "default");
}

#[test]
fn test_bad_access_raises_an_error() {
    let result = Expected::<i64>::failure(Error::new(kinds::RUNTIME_ERROR, "error"));
    let payload = catch_unwind(AssertUnwindSafe(|| result.value())).unwrap_err();
    let error = payload
        .downcast_ref::<Error>()
        .expect("bad access panics with an `Error` payload");
    assert_eq!(error.kind(), kinds::RUNTIME_ERROR);
    assert_eq!(error.message(), "Bad expected access: contains error");
}

// Transparent encoding through `Any`

#[test]
fn test_success_round_trips_through_any() {
    let any = Any::new(Expected::success(42_i64));
    assert_eq!(any.cast::<i64>(), Ok(42));

    let recovered = any.cast::<Expected<i64>>().unwrap();
    assert!(recovered.is_success());
    assert_eq!(recovered.value(), 42);
}

#[test]
fn test_failure_round_trips_through_any() {
    let original = Expected::<i64>::failure(Error::new(kinds::TYPE_ERROR, "conversion failed"));
    let any = Any::from_ref(&original);
    assert!(any.get::<Error>().is_some());

    let recovered = any.cast::<Expected<i64>>().unwrap();
    assert!(recovered.is_failure());
    assert_eq!(recovered.error().kind(), "TypeError");
    assert_eq!(recovered, original);
}

#[test]
fn test_move_extraction_empties_the_slot() {
    let mut any = Any::new(Expected::success(String::from("payload")));
    let moved = any.take().into_cast::<Expected<String>>().unwrap();
    assert_eq!(moved.value(), "payload");
    assert!(any.is_none());
    assert_eq!(any.try_cast::<Expected<String>>(), None);
}

#[test]
fn test_incompatible_values_are_rejected() {
    let any = Any::from("hello");
    assert_eq!(any.try_cast::<Expected<i64>>(), None);

    let error = any.cast::<Expected<i64>>().unwrap_err();
    assert_eq!(error.kind(), kinds::TYPE_ERROR);
    assert_eq!(
        error.message(),
        "Cannot convert from type `ffi.String` to `Expected<int>`"
    );
}

#[test]
fn test_conversion_prefers_the_success_type() {
    let any = Any::new(true);
    assert!(!Expected::<i64>::check_any_strict(&any));

    let converted = any.try_cast::<Expected<i64>>().unwrap();
    assert!(converted.is_success());
    assert_eq!(converted.value(), 1);
}

// Composition with other containers

#[test]
fn test_nested_optional() {
    let result = Expected::success(Some(42_i64));
    assert!(result.is_success());
    assert_eq!(result.value(), Some(42));

    let none = Expected::success(None::<i64>);
    assert!(none.is_success());
    assert_eq!(none.value(), None);

    let any = Any::new(none);
    assert!(any.is_none());
    let recovered = any.cast::<Expected<Option<i64>>>().unwrap();
    assert!(recovered.is_success());
    assert_eq!(recovered.value(), None);
}

#[test]
fn test_nested_array() {
    let result = Expected::success(Array::from([1_i64, 2, 3]));
    assert!(result.is_success());
    assert_eq!(result.value().len(), 3);
    assert_eq!(result.value().get(0), Some(1));

    let empty = Any::new(Expected::success(Array::<String>::new()));
    let recovered = empty.cast::<Expected<Array<String>>>().unwrap();
    assert!(recovered.is_success());
    assert!(recovered.value().is_empty());
}

#[test]
fn test_arrays_of_expected_values() {
    let mixed: Array<Expected<i64>> = [
        Expected::success(1),
        Expected::failure(Error::new(kinds::VALUE_ERROR, "two")),
        Expected::success(3),
    ]
    .into_iter()
    .collect();

    let collected: Vec<Result<i64, Error>> = mixed.iter().map(Expected::into_result).collect();
    assert_eq!(collected[0], Ok(1));
    assert_eq!(collected[1].as_ref().unwrap_err().message(), "two");
    assert_eq!(collected[2], Ok(3));

    let slot = Any::new(mixed);
    assert!(slot.is::<Array<Expected<i64>>>());
    assert!(!slot.is::<Array<i64>>());
    assert_eq!(slot.try_cast::<Array<i64>>(), None);
}

// Introspection

#[test]
fn test_type_strings() {
    assert_eq!(Expected::<i64>::type_str(), "Expected<int>");
    assert_eq!(
        Expected::<Array<String>>::type_str(),
        "Expected<Array<str>>"
    );
    assert_eq!(
        Expected::<Option<f64>>::type_str(),
        "Expected<Optional<float>>"
    );
}

#[test]
fn test_type_schemas_are_json() {
    let schema: serde_json::Value =
        serde_json::from_str(&Expected::<Array<Option<i64>>>::type_schema()).unwrap();
    assert_eq!(
        schema,
        serde_json::json!({
            "type": "Expected",
            "args": [{
                "type": "ffi.Array",
                "args": [{"type": "Optional", "args": [{"type": "int"}]}],
            }],
        })
    );

    let schema: serde_json::Value = serde_json::from_str(&Error::type_schema()).unwrap();
    assert_eq!(schema, serde_json::json!({"type": "ffi.Error"}));
}

// Calling conventions

#[test]
fn test_call_expected_on_plain_function() {
    let func = Function::from_typed(|a: i64, b: i64| a + b);
    let result = func.call_expected::<i64>((5_i64, 3_i64));
    assert!(result.is_success());
    assert_eq!(result.value(), 8);
}

#[test]
fn test_call_expected_translates_raised_errors() {
    let func = Function::from_typed(|a: i64| -> i64 {
        if a < 0 {
            ffi_error!(ValueError, "Negative value not allowed").raise();
        }
        a * 2
    });

    let ok = func.call_expected::<i64>((5_i64,));
    assert_eq!(ok.value(), 10);

    let err = func.call_expected::<i64>((-1_i64,));
    assert!(err.is_failure());
    assert_eq!(err.error().kind(), "ValueError");
    assert_eq!(err.error().message(), "Negative value not allowed");
    assert!(err.error().trace().contains(file!()));
}

#[test]
fn test_default_convention_keeps_unwinding() {
    let func = Function::from_typed(|| -> i64 {
        Error::new(kinds::VALUE_ERROR, "bad input").raise();
    });

    let payload = catch_unwind(AssertUnwindSafe(|| func.call(()))).unwrap_err();
    let error = payload.downcast_ref::<Error>().unwrap();
    assert_eq!(error.message(), "bad input");
}

#[test]
fn test_panic_messages_become_runtime_errors() {
    let func = Function::from_typed(|index: i64| -> i64 {
        let values = [1_i64, 2, 3];
        values[usize::try_from(index).unwrap()]
    });

    let result = func.call_expected::<i64>((7_i64,));
    assert!(result.is_failure());
    assert_eq!(result.error().kind(), kinds::RUNTIME_ERROR);
    assert!(result.error().message().contains("index out of bounds"));
}

#[test]
fn test_unrepresentable_panics_are_fatal() {
    #[derive(Debug)]
    struct Opaque;

    let func = Function::from_typed(|| -> i64 { std::panic::panic_any(Opaque) });
    let payload = catch_unwind(AssertUnwindSafe(|| func.call_expected::<i64>(()))).unwrap_err();
    assert!(payload.is::<Opaque>());
}

#[test]
fn test_direct_expected_passes_through() {
    let func = Function::from_typed(safe_divide);
    assert!(func.returns_expected());
    assert_eq!(
        func.signature(),
        Some("(0: int, 1: int) -> Expected<int>")
    );

    assert_eq!(func.call_expected::<i64>((10_i64, 2_i64)), safe_divide(10, 2));
    assert_eq!(func.call_expected::<i64>((10_i64, 0_i64)), safe_divide(10, 0));
}

#[test]
fn test_registered_expected_function() {
    Function::set_global("test.safe_divide3", Function::from_typed(safe_divide), false).unwrap();
    let func = Function::get_global_required("test.safe_divide3").unwrap();

    let error = func.call((10_i64, 0_i64)).unwrap_err();
    assert_eq!(error.kind(), kinds::VALUE_ERROR);
    assert_eq!(func.call_as::<i64>((10_i64, 2_i64)), Ok(5));

    let ok = func.call_expected::<i64>((10_i64, 2_i64));
    assert!(ok.is_success());
    assert_eq!(ok.value(), 5);

    let err = func.call_expected::<i64>((10_i64, 0_i64));
    assert!(err.is_failure());
    assert_eq!(err.error().message(), "Division by zero");
}

#[test]
fn test_registered_csv_parser() {
    Function::set_global("test.parse_csv", Function::from_typed(parse_csv), false).unwrap();
    let func = Function::get_global_required("test.parse_csv").unwrap();

    let ok = func.call_expected::<Array<String>>((String::from("a,b,c"),));
    assert!(ok.is_success());
    assert_eq!(ok.value().to_vec(), ["a", "b", "c"]);

    let err = func.call_expected::<Array<String>>((String::new(),));
    assert!(err.is_failure());
    assert_eq!(err.error().message(), "Empty input");
}

#[test]
fn test_user_error_types_convert() {
    let lookup = Function::from_typed(|key: String| -> Result<i64, ConfigError> {
        match key.as_str() {
            "workers" => Ok(4),
            "threads" => Err(ConfigError::Invalid {
                key,
                value: String::from("-1"),
            }),
            _ => Err(ConfigError::MissingKey(key)),
        }
    });

    assert_eq!(lookup.call_as::<i64>((String::from("workers"),)), Ok(4));

    let missing = lookup.call_expected::<i64>((String::from("port"),));
    assert_eq!(missing.error().kind(), kinds::KEY_ERROR);
    assert_eq!(missing.error().message(), "missing key `port`");

    let invalid = lookup.call_expected::<i64>((String::from("threads"),));
    assert_eq!(invalid.error().kind(), kinds::VALUE_ERROR);
    assert_eq!(invalid.error().message(), "invalid value for `threads`: -1");
}

#[test]
fn test_send_sync() {
    static_assertions::assert_impl_all!(Expected<i64>: Send, Sync, Clone);
    static_assertions::assert_impl_all!(Expected<Array<String>>: Send, Sync);
    static_assertions::assert_impl_all!(Function: Send, Sync, Clone);
    static_assertions::assert_impl_all!(Error: Send, Sync, std::error::Error);
}

//! End-to-end resolution tests over the fixture catalog.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autowire::{
    Callable, Category, ConfigurationError, Definition, ErrorKind, InjectorError, Invokable,
    Object, ParamSpec, Value,
};
use rstest::rstest;

use common::{injector, Bag, Boom, Holder, Mailer, Pipeline, Reporter, Service, Settings};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_make_without_constructor() {
    let mut injector = injector();

    let logger = injector.make("app::Logger").unwrap();

    assert_eq!(logger.class(), "app::Logger");
}

#[test]
fn test_make_is_case_insensitive() {
    let mut injector = injector();
    injector.define_param("from", "noreply@example.com");
    injector.alias("APP::TRANSPORT", "app::Smtp").unwrap();

    let mailer = injector.make("::App::Mailer").unwrap();

    assert_eq!(mailer.class(), "app::Mailer");
}

#[test]
fn test_make_builds_dependencies_recursively() {
    let mut injector = injector();
    injector.alias("app::Transport", "app::Smtp").unwrap();
    injector.define_param("from", "noreply@example.com");

    let mailer = injector.make("app::Mailer").unwrap();
    let mailer = mailer.downcast_ref::<Mailer>().unwrap();

    assert_eq!(mailer.transport.class(), "app::Smtp");
    assert_eq!(mailer.from, "noreply@example.com");
}

#[test]
fn test_make_unknown_class() {
    let mut injector = injector();

    let err = injector.make("app::Nope").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ClassNotFound);
    assert!(matches!(err, InjectorError::ClassNotFound { ref class, .. } if class == "app::Nope"));
    assert_eq!(err.dependency_chain(), ["app::nope"]);
}

#[test]
fn test_make_interface_needs_definition() {
    let mut injector = injector();

    let err = injector.make("app::Transport").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NonInstantiable);
    assert_eq!(
        err.to_string(),
        "Injection definition required for interface app::Transport"
    );
    assert_eq!(err.dependency_chain(), ["app::transport"]);
}

#[test]
fn test_make_abstract_class_needs_definition() {
    let mut injector = injector();

    let err = injector.make("app::Repository").unwrap_err();

    assert!(matches!(
        err,
        InjectorError::NeedsDefinition { kind: "abstract class", .. }
    ));
}

#[test]
fn test_make_non_public_constructor() {
    let mut injector = injector();

    let err = injector.make("app::Singleton").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NonInstantiable);
    assert!(matches!(err, InjectorError::NonPublicConstructor { ref class, .. } if class == "app::Singleton"));
}

#[test]
fn test_dependency_failure_reports_chain() {
    let mut injector = injector();

    let err = injector.make("app::Mailer").unwrap_err();

    assert!(matches!(err, InjectorError::NeedsDefinition { ref class, .. } if class == "app::Transport"));
    assert_eq!(err.dependency_chain(), ["app::mailer", "app::transport"]);
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_undefined_parameter() {
    let mut injector = injector();

    let err = injector.make("app::Holder").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UndefinedParameter);
    assert_eq!(
        err.to_string(),
        "No definition available to provision typeless parameter $value at position 0 in app::Holder::new() declared in app::Holder"
    );
}

#[test]
fn test_undefined_parameter_names_declaring_ancestor() {
    let mut injector = injector();

    let err = injector.make("app::ChildService").unwrap_err();

    assert!(matches!(
        err,
        InjectorError::UndefinedParameter { ref function, ref declared_in, position: 0, .. }
            if function == "app::ChildService::new"
                && declared_in.as_deref() == Some("app::BaseService")
    ));
}

#[test]
fn test_declared_default_and_global_param() {
    let mut injector = injector();

    let settings = injector.make("app::Settings").unwrap();
    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "sqlite::memory:");

    injector.define_param("dsn", "postgres://localhost/app");
    let settings = injector.make("app::Settings").unwrap();
    assert_eq!(
        settings.downcast_ref::<Settings>().unwrap().dsn,
        "postgres://localhost/app"
    );
}

#[test]
fn test_call_time_override_beats_definition() {
    let mut injector = injector();
    injector.define("app::Settings", Definition::new().raw("dsn", "defined"));

    let settings = injector
        .make_with("app::Settings", &Definition::new().raw("dsn", "call-time"))
        .unwrap();

    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "call-time");
}

#[test]
fn test_positional_override_beats_named() {
    let mut injector = injector();

    let settings = injector
        .make_with(
            "app::Settings",
            &Definition::new().raw("dsn", "named").at(0, "positional"),
        )
        .unwrap();

    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "positional");
}

#[test]
fn test_definition_class_injection() {
    let mut injector = injector();
    injector.define(
        "app::Mailer",
        Definition::new()
            .class("transport", "app::Sendmail")
            .raw("from", "ops@example.com"),
    );

    let mailer = injector.make("app::Mailer").unwrap();
    let mailer = mailer.downcast_ref::<Mailer>().unwrap();

    assert_eq!(mailer.transport.class(), "app::Sendmail");
    assert_eq!(mailer.from, "ops@example.com");
}

#[test]
fn test_define_injection_uses_nested_overrides() {
    let mut injector = injector();

    let wrapper = injector
        .make_with(
            "app::Wrapper",
            &Definition::new().define("holder", "app::Holder", Definition::new().raw("value", 42i64)),
        )
        .unwrap();
    let inner: Object = wrapper.downcast_ref::<Holder>().unwrap().value.as_object().cloned().unwrap();

    assert_eq!(inner.downcast_ref::<Holder>().unwrap().value, Value::Int(42));
    assert!(injector.inspect(None, Category::DEFINITIONS).definitions.unwrap().is_empty());
}

#[test]
fn test_delegate_injection_receives_param_name() {
    let mut injector = injector();
    let delegate = Invokable::closure([ParamSpec::untyped("param")], |args| {
        Ok(format!("via {}", args.get::<String>(0)?))
    });

    let settings = injector
        .make_with("app::Settings", &Definition::new().delegate("dsn", delegate))
        .unwrap();

    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "via dsn");
}

#[test]
fn test_call_time_overrides_are_not_passed_to_dependencies() {
    let mut injector = injector();

    let err = injector
        .make_with("app::Wrapper", &Definition::new().raw("value", 1i64))
        .unwrap_err();

    assert!(matches!(err, InjectorError::UndefinedParameter { ref param, .. } if param == "value"));
    assert_eq!(err.dependency_chain(), ["app::wrapper", "app::holder"]);
}

#[test]
fn test_subtype_inherits_ancestor_definition() {
    let mut injector = injector();
    injector.define("app::BaseService", Definition::new().raw("name", "base"));

    let child = injector.make("app::ChildService").unwrap();
    assert_eq!(child.downcast_ref::<Service>().unwrap().name, "base");

    injector.define("app::ChildService", Definition::new().raw("name", "child"));
    let child = injector.make("app::ChildService").unwrap();
    assert_eq!(child.downcast_ref::<Service>().unwrap().name, "child");
}

#[test]
fn test_nullable_parameter_falls_back_to_null() {
    let mut injector = injector();

    let reporter = injector.make("app::Reporter").unwrap();

    assert!(reporter.downcast_ref::<Reporter>().unwrap().sink.is_none());
}

#[test]
fn test_required_parameter_propagates_failure() {
    let mut injector = injector();

    let err = injector.make("app::StrictReporter").unwrap_err();

    assert!(matches!(err, InjectorError::ClassNotFound { ref class, .. } if class == "app::Missing"));
    assert_eq!(err.dependency_chain(), ["app::strictreporter", "app::missing"]);
}

#[rstest]
#[case::string(Value::from("text"))]
#[case::integer(Value::Int(-3))]
#[case::float(Value::Float(2.5))]
#[case::boolean(Value::Bool(false))]
#[case::null(Value::Null)]
#[case::empty_list(Value::List(Vec::new()))]
fn test_raw_values_are_injected_unchanged(#[case] value: Value) {
    let mut injector = injector();

    let holder = injector
        .make_with("app::Holder", &Definition::new().raw("value", value.clone()))
        .unwrap();

    assert_eq!(holder.downcast_ref::<Holder>().unwrap().value, value);
}

#[test]
fn test_raw_object_is_injected_by_reference() {
    let mut injector = injector();
    let opaque = Object::new("app::Opaque", 5u8);

    let holder = injector
        .make_with("app::Holder", &Definition::new().raw("value", opaque.clone()))
        .unwrap();

    let value = &holder.downcast_ref::<Holder>().unwrap().value;
    assert!(value.as_object().unwrap().ptr_eq(&opaque));
}

// ============================================================================
// Variadics
// ============================================================================

#[test]
fn test_variadic_takes_positional_tail() {
    let mut injector = injector();

    let bag = injector
        .make_with("app::Bag", &Definition::new().at(0, 1i64).at(1, 2i64).at(2, 3i64))
        .unwrap();

    assert_eq!(
        bag.downcast_ref::<Bag>().unwrap().items,
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_variadic_without_values_is_empty() {
    let mut injector = injector();

    let bag = injector.make("app::Bag").unwrap();
    assert!(bag.downcast_ref::<Bag>().unwrap().items.is_empty());

    injector.define_param("items", "only");
    let bag = injector.make("app::Bag").unwrap();
    assert_eq!(bag.downcast_ref::<Bag>().unwrap().items, vec![Value::from("only")]);
}

#[test]
fn test_typed_variadic() {
    let mut injector = injector();

    let pipeline = injector.make("app::Pipeline").unwrap();
    assert!(pipeline.downcast_ref::<Pipeline>().unwrap().stages.is_empty());

    injector.alias("app::Stage", "app::Trim").unwrap();
    let pipeline = injector.make("app::Pipeline").unwrap();
    let stages = &pipeline.downcast_ref::<Pipeline>().unwrap().stages;
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].class(), "app::Trim");
}

// ============================================================================
// Aliases and shares
// ============================================================================

#[test]
fn test_alias_builds_target() {
    let mut injector = injector();
    injector.alias("app::Transport", "app::Smtp").unwrap();

    let transport = injector.make("app::Transport").unwrap();

    assert_eq!(transport.class(), "app::Smtp");
}

#[test]
fn test_realias_after_share_fails() {
    let mut injector = injector();
    injector.alias("app::Transport", "app::Smtp").unwrap();
    injector.share("app::Transport").unwrap();
    injector.make("app::Transport").unwrap();

    let err = injector.alias("app::Transport", "app::Sendmail").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadConfiguration);
    assert!(matches!(
        err,
        InjectorError::Configuration(ConfigurationError::SharedCannotAlias { .. })
    ));
}

#[test]
fn test_empty_alias_and_share_rejected() {
    let mut injector = injector();

    assert!(matches!(
        injector.alias("", "app::Smtp"),
        Err(InjectorError::Configuration(ConfigurationError::EmptyAlias))
    ));
    assert!(matches!(
        injector.share(""),
        Err(InjectorError::Configuration(ConfigurationError::EmptyShare))
    ));
}

#[test]
fn test_share_returns_same_instance() {
    let mut injector = injector();
    injector.share("app::Logger").unwrap();

    let first = injector.make("app::Logger").unwrap();
    let second = injector.make("APP::logger").unwrap();

    assert!(first.ptr_eq(&second));
}

#[test]
fn test_unshare_builds_distinct_instances() {
    let mut injector = injector();
    injector.share("app::Logger").unwrap();
    injector.make("app::Logger").unwrap();

    injector.unshare("app::Logger");
    let first = injector.make("app::Logger").unwrap();
    let second = injector.make("app::Logger").unwrap();

    assert!(!first.ptr_eq(&second));
}

#[test]
fn test_refresh_rebuilds_but_keeps_sharing() {
    let mut injector = injector();
    injector.share("app::Logger").unwrap();
    let original = injector.make("app::Logger").unwrap();

    injector.refresh("app::Logger");
    let refreshed = injector.make("app::Logger").unwrap();
    let again = injector.make("app::Logger").unwrap();

    assert!(!original.ptr_eq(&refreshed));
    assert!(refreshed.ptr_eq(&again));
}

#[test]
fn test_share_instance() {
    let mut injector = injector();
    let logger = Object::new("app::Logger", ());
    injector.share_instance(&logger).unwrap();

    assert!(injector.make("app::Logger").unwrap().ptr_eq(&logger));

    let err = injector
        .share_instance(&Object::new("app::Logger", ()))
        .unwrap_err();
    assert!(matches!(
        err,
        InjectorError::Configuration(ConfigurationError::DoubleShare { .. })
    ));

    injector.unshare_instance(&logger);
    assert!(!injector.make("app::Logger").unwrap().ptr_eq(&logger));
}

#[test]
fn test_shared_dependency_is_reused() {
    let mut injector = injector();
    injector
        .alias("app::Transport", "app::Smtp")
        .unwrap()
        .share("app::Smtp")
        .unwrap()
        .define_param("from", "a@example.com");

    let first = injector.make("app::Mailer").unwrap();
    let second = injector.make("app::Mailer").unwrap();

    let first = &first.downcast_ref::<Mailer>().unwrap().transport;
    let second = &second.downcast_ref::<Mailer>().unwrap().transport;
    assert!(first.ptr_eq(second));
}

#[test]
fn test_alias_to_shared_class_returns_its_instance() {
    let mut injector = injector();
    injector.share("app::Smtp").unwrap();
    let smtp = injector.make("app::Smtp").unwrap();

    injector.alias("app::Transport", "app::Smtp").unwrap();

    assert!(injector.make("app::Transport").unwrap().ptr_eq(&smtp));
}

#[test]
fn test_alias_keeps_shared_instance_of_target() {
    let mut injector = injector();
    let smtp = Object::new("app::Smtp", ());
    injector
        .share_instance(&smtp)
        .unwrap()
        .share("app::Transport")
        .unwrap()
        .alias("app::Transport", "app::Smtp")
        .unwrap();

    assert!(injector.make("app::Smtp").unwrap().ptr_eq(&smtp));
    assert!(injector.make("app::Transport").unwrap().ptr_eq(&smtp));
}

#[test]
fn test_unshare_and_refresh_through_alias() {
    let mut injector = injector();
    injector
        .alias("app::Transport", "app::Smtp")
        .unwrap()
        .share("app::Transport")
        .unwrap();
    let shared = injector.make("app::Transport").unwrap();

    injector.refresh("app::Transport");
    let refreshed = injector.make("app::Transport").unwrap();
    assert!(!shared.ptr_eq(&refreshed));
    assert!(refreshed.ptr_eq(&injector.make("app::Smtp").unwrap()));

    injector.unshare("app::Transport");
    let first = injector.make("app::Transport").unwrap();
    let second = injector.make("app::Transport").unwrap();
    assert!(!first.ptr_eq(&second));
}

// ============================================================================
// Delegates
// ============================================================================

#[test]
fn test_delegate_replaces_construction() {
    let mut injector = injector();
    injector
        .delegate(
            "app::Transport",
            Invokable::closure([], |_| Ok(Object::new("app::Sendmail", ()))),
        )
        .unwrap();

    let transport = injector.make("app::Transport").unwrap();

    assert_eq!(transport.class(), "app::Sendmail");
}

#[test]
fn test_delegate_with_preset_args() {
    let mut injector = injector();
    let factory = Callable::new([ParamSpec::untyped("dsn")], |args| {
        let dsn: String = args.get(0)?;
        Ok(Object::new("app::Settings", Settings { dsn }))
    });
    injector
        .delegate_with("app::Settings", factory, Definition::new().raw("dsn", "preset"))
        .unwrap();

    let settings = injector.make("app::Settings").unwrap();
    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "preset");

    let settings = injector
        .make_with("app::Settings", &Definition::new().raw("dsn", "override"))
        .unwrap();
    assert_eq!(settings.downcast_ref::<Settings>().unwrap().dsn, "override");
}

#[test]
fn test_delegate_must_return_object() {
    let mut injector = injector();
    injector
        .delegate("app::Transport", Invokable::closure([], |_| Ok(42i64)))
        .unwrap();

    let err = injector.make("app::Transport").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidConstructionResult);
    assert_eq!(
        err.to_string(),
        "Making app::transport did not result in an object, instead result is of type 'integer'"
    );
}

#[test]
fn test_invalid_delegate_rejected() {
    let mut injector = injector();

    let err = injector
        .delegate("app::Transport", "app::Nothing::here")
        .unwrap_err();

    assert!(matches!(
        err,
        InjectorError::Configuration(ConfigurationError::InvalidDelegate { ref target })
            if target == "app::Nothing::here"
    ));
}

// ============================================================================
// Cycles and failures
// ============================================================================

#[rstest]
#[case::self_reference("cycle::Selfish", "cycle::selfish", &["cycle::selfish"])]
#[case::two_types("cycle::A", "cycle::a", &["cycle::a", "cycle::b"])]
#[case::three_types("cycle::X", "cycle::x", &["cycle::x", "cycle::y", "cycle::z"])]
fn test_cyclic_dependency(#[case] requested: &str, #[case] repeated: &str, #[case] chain: &[&str]) {
    let mut injector = injector();

    let err = injector.make(requested).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CyclicDependency);
    assert!(matches!(err, InjectorError::CyclicDependency { ref class, .. } if class == repeated));
    assert_eq!(err.dependency_chain(), chain);
}

#[test]
fn test_constructor_error_propagates_unchanged() {
    let mut injector = injector();

    let err = injector.make("app::NeedsFailing").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Raised);
    let boom = err.raised().and_then(|raised| raised.downcast_ref::<Boom>());
    assert_eq!(boom, Some(&Boom("constructor")));
    assert_eq!(err.to_string(), "boom: constructor");
}

#[test]
fn test_delegate_error_propagates_unchanged() {
    let mut injector = injector();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    injector
        .delegate(
            "app::Transport",
            Invokable::closure([], move |_| -> Result<Object, autowire::BoxError> {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Box::new(Boom("delegate")))
                } else {
                    Ok(Object::new("app::Sendmail", ()))
                }
            }),
        )
        .unwrap();

    let err = injector.make("app::Transport").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Raised);
    let boom = err.raised().and_then(|raised| raised.downcast_ref::<Boom>());
    assert_eq!(boom, Some(&Boom("delegate")));

    let transport = injector.make("app::Transport").unwrap();
    assert_eq!(transport.class(), "app::Sendmail");
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_prepare_error_propagates_unchanged() {
    let mut injector = injector();
    injector
        .prepare(
            "app::Transport",
            Invokable::closure(
                [ParamSpec::untyped("object")],
                |_| -> Result<Value, autowire::BoxError> { Err(Box::new(Boom("prepare"))) },
            ),
        )
        .unwrap();

    let err = injector.make("app::Smtp").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Raised);
    let boom = err.raised().and_then(|raised| raised.downcast_ref::<Boom>());
    assert_eq!(boom, Some(&Boom("prepare")));
    assert_eq!(err.to_string(), "boom: prepare");
}

#[test]
fn test_failure_leaves_no_residual_state() {
    let mut injector = injector();
    assert!(injector.make("app::NeedsFailing").is_err());

    assert_eq!(injector.make("app::Failing").unwrap_err().kind(), ErrorKind::Raised);
    assert!(injector.make("app::Logger").is_ok());
}

// ============================================================================
// Prepares
// ============================================================================

#[test]
fn test_prepare_runs_for_class_and_capabilities() {
    let mut injector = injector();
    let calls = Arc::new(AtomicUsize::new(0));
    for key in ["app::Smtp", "app::Transport"] {
        let calls = Arc::clone(&calls);
        injector
            .prepare(
                key,
                Invokable::closure([ParamSpec::untyped("object")], move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();
    }

    injector.make("app::Smtp").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    injector.make("app::Logger").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_prepare_replacement_must_satisfy_requested_type() {
    let mut injector = injector();
    let replacement = Object::new("app::Smtp", "replacement");
    let expected = replacement.clone();
    injector
        .prepare(
            "app::Smtp",
            Invokable::closure([], move |_| Ok(replacement.clone())),
        )
        .unwrap();
    injector
        .prepare(
            "app::Logger",
            Invokable::closure([], |_| Ok(Object::new("app::Smtp", ()))),
        )
        .unwrap();

    assert!(injector.make("app::Smtp").unwrap().ptr_eq(&expected));
    assert_eq!(injector.make("app::Logger").unwrap().class(), "app::Logger");
}

#[test]
fn test_prepared_instance_is_shared() {
    let mut injector = injector();
    let replacement = Object::new("app::Logger", "prepared");
    let expected = replacement.clone();
    injector.share("app::Logger").unwrap();
    injector
        .prepare(
            "app::Logger",
            Invokable::closure([], move |_| Ok(replacement.clone())),
        )
        .unwrap();

    injector.make("app::Logger").unwrap();

    assert!(injector.make("app::Logger").unwrap().ptr_eq(&expected));
}

#[test]
fn test_invalid_prepare_rejected() {
    let mut injector = injector();

    let err = injector.prepare("app::Logger", "not_a_function").unwrap_err();

    assert!(matches!(
        err,
        InjectorError::Configuration(ConfigurationError::InvalidPrepare { .. })
    ));
}

// ============================================================================
// Inspection
// ============================================================================

#[test]
fn test_inspect_reports_configuration() {
    let mut injector = injector();
    injector
        .alias("app::Transport", "app::Smtp")
        .unwrap()
        .share("app::Logger")
        .unwrap()
        .define("app::Settings", Definition::new().raw("dsn", "x"));

    let all = injector.inspect(None, Category::ALL);
    assert_eq!(all.non_empty_count(), 3);

    let filtered = injector.inspect(Some("app::Transport"), Category::ALIASES | Category::SHARES);
    assert_eq!(filtered.aliases.map(|a| a.len()), Some(1));
    assert_eq!(filtered.shares.map(|s| s.len()), Some(0));
    assert!(filtered.definitions.is_none());
}

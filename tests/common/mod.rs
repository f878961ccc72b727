//! Fixture descriptors shared by the integration tests.

#![allow(dead_code)]

use autowire::{
    Catalog, ClassDef, FunctionDef, Injector, Object, ParamSpec, Value, Visibility,
};

pub struct Mailer {
    pub transport: Object,
    pub from: String,
}

pub struct Settings {
    pub dsn: String,
}

pub struct Reporter {
    pub sink: Option<Object>,
}

pub struct Pipeline {
    pub stages: Vec<Object>,
}

pub struct Bag {
    pub items: Vec<Value>,
}

pub struct Service {
    pub name: String,
}

pub struct Holder {
    pub value: Value,
}

pub struct Cycle;

/// Domain error raised by the failing constructor.
#[derive(Debug, PartialEq)]
pub struct Boom(pub &'static str);

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom: {}", self.0)
    }
}

impl std::error::Error for Boom {}

/// Interfaces, concrete types and constructors used across the engine tests.
pub fn catalog() -> Catalog {
    Catalog::new()
        .with_class(ClassDef::interface("app::Transport"))
        .with_class(ClassDef::concrete("app::Smtp").implements("app::Transport"))
        .with_class(ClassDef::concrete("app::Sendmail").implements("app::Transport"))
        .with_class(ClassDef::concrete("app::Logger"))
        .with_class(
            ClassDef::concrete("app::Mailer")
                .constructor([
                    ParamSpec::typed("transport", "app::Transport"),
                    ParamSpec::untyped("from"),
                ])
                .instantiate(|args| {
                    Ok(Mailer {
                        transport: args.get(0)?,
                        from: args.get(1)?,
                    })
                }),
        )
        .with_class(
            ClassDef::concrete("app::Settings")
                .constructor([ParamSpec::untyped("dsn").default_value("sqlite::memory:")])
                .instantiate(|args| Ok(Settings { dsn: args.get(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::Reporter")
                .constructor([ParamSpec::typed("sink", "app::Missing").nullable()])
                .instantiate(|args| Ok(Reporter { sink: args.get(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::StrictReporter")
                .constructor([ParamSpec::typed("sink", "app::Missing")])
                .instantiate(|args| Ok(Reporter { sink: args.get(0)? })),
        )
        .with_class(ClassDef::interface("app::Stage"))
        .with_class(ClassDef::concrete("app::Trim").implements("app::Stage"))
        .with_class(
            ClassDef::concrete("app::Pipeline")
                .constructor([ParamSpec::typed("stages", "app::Stage").variadic()])
                .instantiate(|args| Ok(Pipeline { stages: args.rest(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::Bag")
                .constructor([ParamSpec::untyped("items").variadic()])
                .instantiate(|args| Ok(Bag { items: args.rest(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::BaseService")
                .constructor([ParamSpec::untyped("name")])
                .instantiate(|args| Ok(Service { name: args.get(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::ChildService")
                .extends("app::BaseService")
                .instantiate(|args| Ok(Service { name: args.get(0)? })),
        )
        .with_class(ClassDef::abstract_class("app::Repository"))
        .with_class(ClassDef::concrete("app::SqlRepository").extends("app::Repository"))
        .with_class(ClassDef::concrete("app::Singleton").constructor_with(Visibility::Private, []))
        .with_class(
            ClassDef::concrete("app::Holder")
                .constructor([ParamSpec::untyped("value")])
                .instantiate(|args| Ok(Holder { value: args.get(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::Wrapper")
                .constructor([ParamSpec::typed("holder", "app::Holder")])
                .instantiate(|args| Ok(Holder { value: args.get(0)? })),
        )
        .with_class(
            ClassDef::concrete("app::Failing").instantiate(
                |_| -> Result<Cycle, autowire::BoxError> { Err(Box::new(Boom("constructor"))) },
            ),
        )
        .with_class(
            ClassDef::concrete("app::NeedsFailing")
                .constructor([ParamSpec::typed("failing", "app::Failing")])
                .instantiate(|_| Ok(Cycle)),
        )
        // Cycles
        .with_class(
            ClassDef::concrete("cycle::Selfish")
                .constructor([ParamSpec::typed("me", "cycle::Selfish")])
                .instantiate(|_| Ok(Cycle)),
        )
        .with_class(
            ClassDef::concrete("cycle::A")
                .constructor([ParamSpec::typed("b", "cycle::B")])
                .instantiate(|_| Ok(Cycle)),
        )
        .with_class(
            ClassDef::concrete("cycle::B")
                .constructor([ParamSpec::typed("a", "cycle::A")])
                .instantiate(|_| Ok(Cycle)),
        )
        .with_class(
            ClassDef::concrete("cycle::X")
                .constructor([ParamSpec::typed("y", "cycle::Y")])
                .instantiate(|_| Ok(Cycle)),
        )
        .with_class(
            ClassDef::concrete("cycle::Y")
                .constructor([ParamSpec::typed("z", "cycle::Z")])
                .instantiate(|_| Ok(Cycle)),
        )
        .with_class(
            ClassDef::concrete("cycle::Z")
                .constructor([ParamSpec::typed("x", "cycle::X")])
                .instantiate(|_| Ok(Cycle)),
        )
}

/// Functions and classes with methods used by the execution tests.
pub fn executables() -> Catalog {
    catalog()
        .with_function(FunctionDef::new(
            "app::greet",
            [ParamSpec::untyped("name")],
            |args| Ok(format!("hello {}", args.get::<String>(0)?)),
        ))
        .with_class(
            ClassDef::concrete("app::Job")
                .method("run", [ParamSpec::typed("logger", "app::Logger")], |_, args| {
                    let logger: Object = args.get(0)?;
                    Ok(format!("ran with {}", logger.class()))
                })
                .static_method("create", [], |_| Ok(7i64))
                .with_method(
                    autowire::MethodDef::new("secret", [], |_, _| Ok("hidden"))
                        .visibility(Visibility::Private),
                ),
        )
        .with_class(
            ClassDef::concrete("app::Doubler")
                .invoke([ParamSpec::untyped("x")], |_, args| Ok(args.get::<i64>(0)? * 2)),
        )
        .with_class(
            ClassDef::concrete("app::StaticHandler")
                .with_method(autowire::MethodDef::new_static(
                    "invoke",
                    [],
                    |_| Ok("static invoke"),
                )),
        )
        .with_class(
            ClassDef::concrete("app::BaseJob").method("describe", [], |this, _| {
                Ok(format!("base on {}", this.class()))
            }),
        )
        .with_class(
            ClassDef::concrete("app::ChildJob")
                .extends("app::BaseJob")
                .method("describe", [], |this, _| Ok(format!("child on {}", this.class()))),
        )
        .with_class(ClassDef::abstract_class("app::AbstractJob").method(
            "describe",
            [],
            |this, _| Ok(format!("abstract on {}", this.class())),
        ))
        .with_class(
            ClassDef::concrete("app::ConcreteJob")
                .extends("app::AbstractJob")
                .method("describe", [], |this, _| {
                    Ok(format!("concrete on {}", this.class()))
                }),
        )
        .with_class(
            ClassDef::concrete("plugins::parent::Task")
                .method("describe", [], |this, _| Ok(format!("task on {}", this.class()))),
        )
}

pub fn injector() -> Injector {
    Injector::new(catalog())
}

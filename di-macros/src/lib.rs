//! Descriptor derive for autowire.
//!
//! This crate provides `#[derive(Injectable)]`, which generates the
//! `autowire::Injectable` implementation of a struct: its class name, its
//! ancestry and a constructor whose parameters are the struct's fields.
//!
//! Generated code references `::autowire`, so the derive is meant to be used
//! through the `autowire` crate's re-export.

use proc_macro::TokenStream;

mod injectable;

/// Derive macro for types the container can build.
///
/// Each named field becomes a constructor parameter, in declaration order:
///
/// - `Arc<T>` fields are typed with `T`'s class name (`T: Injectable`)
/// - `Option<Arc<T>>` fields are typed and nullable
/// - `#[inject(class = "...")]` sets the type explicitly, for fields holding
///   an `Object` (e.g. an interface implementation)
/// - any other field is untyped and resolved by name
///
/// # Attributes
///
/// ```ignore
/// #[injectable(
///     name = "app::Mailer",          // class name, defaults to the Rust path
///     extends = "app::BaseMailer",   // parent class
///     implements("app::Transport"),  // implemented interfaces
/// )]
/// ```
///
/// Field attributes: `#[inject(default = <expr>)]`, `#[inject(nullable)]`,
/// `#[inject(variadic)]` (on the last field, a `Vec<_>`) and
/// `#[inject(skip)]` (not a parameter, filled with `Default::default()`).
///
/// # Example
///
/// ```ignore
/// use autowire::Injectable;
///
/// #[derive(Injectable)]
/// #[injectable(name = "app::Mailer", implements("app::Transport"))]
/// pub struct Mailer {
///     logger: Arc<Logger>,
///     #[inject(default = "noreply@example.com")]
///     from: String,
/// }
///
/// // Generated implementation:
/// // impl autowire::Injectable for Mailer {
/// //     const CLASS: &'static str = "app::Mailer";
/// //     fn class_def() -> ClassDef {
/// //         ClassDef::concrete("app::Mailer")
/// //             .implements("app::Transport")
/// //             .constructor([
/// //                 ParamSpec::typed("logger", <Logger as Injectable>::CLASS),
/// //                 ParamSpec::untyped("from").default_value("noreply@example.com"),
/// //             ])
/// //             .instantiate(|args| Ok(Self { logger: args.get(0)?, from: args.get(1)? }))
/// //     }
/// // }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable_impl(input)
}

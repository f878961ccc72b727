//! Implementation of #[derive(Injectable)] proc-macro.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Expr, Field, Fields, GenericArgument, LitStr,
    PathArguments, Token, Type,
};

pub fn derive_injectable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Options from `#[injectable(...)]`.
#[derive(Default)]
struct TypeOptions {
    name: Option<LitStr>,
    extends: Option<LitStr>,
    implements: Vec<LitStr>,
}

/// Options from `#[inject(...)]`.
#[derive(Default)]
struct FieldOptions {
    class: Option<LitStr>,
    default: Option<Expr>,
    nullable: bool,
    variadic: bool,
    skip: bool,
}

fn parse_type_options(input: &DeriveInput) -> syn::Result<TypeOptions> {
    let mut options = TypeOptions::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("injectable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                options.name = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("extends") {
                options.extends = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let names = content.parse_terminated(|input| input.parse::<LitStr>(), Token![,])?;
                options.implements.extend(names);
            } else {
                return Err(meta.error("expected `name`, `extends` or `implements`"));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn parse_field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                options.class = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("default") {
                options.default = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("nullable") {
                options.nullable = true;
            } else if meta.path.is_ident("variadic") {
                options.variadic = true;
            } else if meta.path.is_ident("skip") {
                options.skip = true;
            } else {
                return Err(meta.error(
                    "expected `class`, `default`, `nullable`, `variadic` or `skip`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

/// The single generic argument of `ty` if its last path segment is `wrapper`.
fn unwrap_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Class name expression of a field, and whether the field type itself makes
/// it nullable.
fn field_class(ty: &Type, options: &FieldOptions) -> (Option<TokenStream2>, bool) {
    if let Some(class) = &options.class {
        return (Some(quote! { #class }), false);
    }

    let (ty, nullable) = match unwrap_type(ty, "Option") {
        Some(inner) => (inner, true),
        None => (ty, false),
    };
    let ty = if options.variadic {
        unwrap_type(ty, "Vec").unwrap_or(ty)
    } else {
        ty
    };

    match unwrap_type(ty, "Arc") {
        Some(inner) => (
            Some(quote! { <#inner as ::autowire::Injectable>::CLASS }),
            nullable,
        ),
        None => (None, false),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let options = parse_type_options(input)?;

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs",
            ))
        }
    };

    let class = match &options.name {
        Some(class) => quote! { #class },
        None => quote! { ::std::concat!(::std::module_path!(), "::", ::std::stringify!(#name)) },
    };
    let extends = options.extends.iter();
    let implements = options.implements.iter();

    let body = match fields {
        Fields::Named(named) => {
            let mut params = Vec::new();
            let mut inits = Vec::new();
            let mut position = 0usize;
            let count = named.named.len();

            for (index, field) in named.named.iter().enumerate() {
                let ident = field.ident.as_ref().ok_or_else(|| {
                    syn::Error::new_spanned(field, "Injectable fields must be named")
                })?;
                let field_options = parse_field_options(field)?;

                if field_options.skip {
                    inits.push(quote! { #ident: ::std::default::Default::default() });
                    continue;
                }
                if field_options.variadic && index + 1 != count {
                    return Err(syn::Error::new_spanned(
                        field,
                        "a variadic field must be the last field",
                    ));
                }

                let param_name = ident.to_string();
                let (param_class, implied_nullable) = field_class(&field.ty, &field_options);
                let mut param = match param_class {
                    Some(class) => quote! { ::autowire::ParamSpec::typed(#param_name, #class) },
                    None => quote! { ::autowire::ParamSpec::untyped(#param_name) },
                };
                if let Some(default) = &field_options.default {
                    param = quote! { #param.default_value(#default) };
                }
                if field_options.nullable || implied_nullable {
                    param = quote! { #param.nullable() };
                }
                if field_options.variadic {
                    param = quote! { #param.variadic() };
                    inits.push(quote! { #ident: args.rest(#position)? });
                } else {
                    inits.push(quote! { #ident: args.get(#position)? });
                }
                params.push(param);
                position += 1;
            }

            quote! {
                .constructor([#(#params),*])
                .instantiate(|args: ::autowire::Arguments| -> ::std::result::Result<Self, ::autowire::BoxError> {
                    ::std::result::Result::Ok(Self { #(#inits),* })
                })
            }
        }
        Fields::Unit => quote! {
            .instantiate(|_: ::autowire::Arguments| -> ::std::result::Result<Self, ::autowire::BoxError> {
                ::std::result::Result::Ok(Self)
            })
        },
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs with named fields or unit structs",
            ))
        }
    };

    Ok(quote! {
        impl #impl_generics ::autowire::Injectable for #name #ty_generics #where_clause {
            const CLASS: &'static str = #class;

            fn class_def() -> ::autowire::ClassDef {
                ::autowire::ClassDef::concrete(<Self as ::autowire::Injectable>::CLASS)
                    #(.extends(#extends))*
                    #(.implements(#implements))*
                    #body
            }
        }
    })
}
